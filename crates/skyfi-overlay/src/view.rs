#![forbid(unsafe_code)]

//! Renderable overlay content.

use crate::frame::Frame;
use crate::geometry::Rect;

/// A `View` is renderable overlay content.
///
/// Views render themselves into a `Frame` within the area their shell lays
/// out. Hardware-backed content (camera, video recorder) owns its session
/// and releases it on drop; the host drops a view when its overlay leaves.
pub trait View {
    /// Render the view into the frame at the given area.
    fn render(&self, area: Rect, frame: &mut Frame);

    /// Height the view would like inside a dialog, if it has one.
    ///
    /// Shells clamp this to their own limits. `None` lets the shell pick.
    fn preferred_height(&self) -> Option<f32> {
        None
    }
}

impl<V: View + ?Sized> View for Box<V> {
    fn render(&self, area: Rect, frame: &mut Frame) {
        (**self).render(area, frame);
    }

    fn preferred_height(&self) -> Option<f32> {
        (**self).preferred_height()
    }
}
