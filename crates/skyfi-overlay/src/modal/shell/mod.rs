#![forbid(unsafe_code)]

//! Presentation shells: the chrome around overlay content.
//!
//! A shell is driven only by `set_visible`, its [`ShellOptions`] and the
//! host's [`OverlayConfig`]. It owns the entrance/exit animation, draws the
//! backdrop and surface, and translates raw input into [`ShellAction`]s that
//! the host turns into `close()` calls.
//!
//! # Visibility contract
//!
//! - `visible` going `true → false` plays the exit animation before content
//!   stops rendering.
//! - While closing, content is drawn non-interactive and input is ignored.
//! - Hidden with a finished exit, a shell draws nothing.

mod bottom_sheet;
mod dialog;

use std::time::Duration;

use crate::config::OverlayConfig;
use crate::frame::Frame;
use crate::geometry::{Point, Rect};
use crate::modal::animation::ModalAnimationPhase;
use crate::modal::request::{ModalKind, ShellOptions};
use crate::view::View;

pub use bottom_sheet::BottomSheetShell;
pub use dialog::DialogShell;

/// Raw input routed to the topmost overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShellEvent {
    /// Single tap at a screen position.
    Tap(Point),
    /// A drag gesture began at a screen position.
    DragStart(Point),
    /// The drag moved; `dy` is the total vertical travel since the start.
    DragMove { dy: f32 },
    /// The drag ended with total travel `dy` and release velocity in
    /// points per millisecond (positive is downward).
    DragRelease { dy: f32, velocity: f32 },
    /// Platform back / request-close.
    Back,
}

/// A shell-level request to close the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellAction {
    BackdropTapped,
    BackPressed,
    CloseButtonTapped,
    DraggedAway,
}

/// Chrome selected by [`ModalKind`].
#[derive(Debug, Clone)]
pub enum PresentationShell {
    Dialog(DialogShell),
    BottomSheet(BottomSheetShell),
}

impl PresentationShell {
    /// Build a hidden shell for `kind`.
    pub fn new(
        kind: ModalKind,
        options: &ShellOptions,
        close_button: bool,
        config: &OverlayConfig,
    ) -> Self {
        match kind {
            ModalKind::Dialog => Self::Dialog(DialogShell::new(options, close_button, &config.dialog)),
            ModalKind::BottomSheet => {
                Self::BottomSheet(BottomSheetShell::new(options, &config.bottom_sheet))
            }
        }
    }

    pub fn kind(&self) -> ModalKind {
        match self {
            Self::Dialog(_) => ModalKind::Dialog,
            Self::BottomSheet(_) => ModalKind::BottomSheet,
        }
    }

    /// Start the entrance (`true`) or exit (`false`) transition.
    pub fn set_visible(&mut self, visible: bool) {
        match self {
            Self::Dialog(shell) => shell.set_visible(visible),
            Self::BottomSheet(shell) => shell.set_visible(visible),
        }
    }

    pub fn phase(&self) -> ModalAnimationPhase {
        match self {
            Self::Dialog(shell) => shell.phase(),
            Self::BottomSheet(shell) => shell.phase(),
        }
    }

    /// Opening or open.
    pub fn is_showing(&self) -> bool {
        matches!(
            self.phase(),
            ModalAnimationPhase::Opening | ModalAnimationPhase::Open
        )
    }

    /// Entrance or exit in progress.
    pub fn is_animating(&self) -> bool {
        matches!(
            self.phase(),
            ModalAnimationPhase::Opening | ModalAnimationPhase::Closing
        )
    }

    /// Anything left to draw.
    pub fn is_rendering(&self) -> bool {
        self.phase() != ModalAnimationPhase::Closed
    }

    /// Advance the animation. Returns `true` if anything changed.
    pub fn tick(&mut self, dt: Duration) -> bool {
        match self {
            Self::Dialog(shell) => shell.tick(dt),
            Self::BottomSheet(shell) => shell.tick(dt),
        }
    }

    /// Area the content is laid out in, at the current animation progress.
    pub fn content_rect(&self, screen: Rect, content: &dyn View) -> Rect {
        match self {
            Self::Dialog(shell) => shell.content_rect(screen, content),
            Self::BottomSheet(shell) => shell.content_rect(screen),
        }
    }

    pub fn render(&self, content: &dyn View, screen: Rect, frame: &mut Frame) {
        match self {
            Self::Dialog(shell) => shell.render(content, screen, frame),
            Self::BottomSheet(shell) => shell.render(content, screen, frame),
        }
    }

    /// Interpret input. `None` means the event belongs to the content.
    pub fn handle_event(
        &mut self,
        event: &ShellEvent,
        screen: Rect,
        content: &dyn View,
    ) -> Option<ShellAction> {
        match self {
            Self::Dialog(shell) => shell.handle_event(event, screen, content),
            Self::BottomSheet(shell) => shell.handle_event(event, screen),
        }
    }
}
