#![forbid(unsafe_code)]

//! Bottom sheet shell.
//!
//! The sheet spans the screen width, takes `max_height` of the screen height
//! and is anchored to the bottom edge. It slides up and fades in on entrance,
//! and follows downward drags started inside it.
//!
//! On release, a drag that traveled past `dismiss_distance_fraction` of the
//! sheet height, or was released faster than `dismiss_velocity`, dismisses
//! the sheet when `drag_to_dismiss` is enabled. Every other release snaps
//! back.

use std::time::Duration;

use tracing::trace;

use crate::config::BottomSheetConfig;
use crate::frame::{DrawCommand, Frame};
use crate::geometry::Rect;
use crate::modal::animation::{ModalAnimationConfig, ModalAnimationPhase, ModalAnimationState};
use crate::modal::request::ShellOptions;
use crate::modal::shell::{ShellAction, ShellEvent};
use crate::view::View;

/// Bottom sheet chrome, animation, and drag state.
#[derive(Debug, Clone)]
pub struct BottomSheetShell {
    animation: ModalAnimationState,
    close_on_backdrop: bool,
    height_fraction: f32,
    config: BottomSheetConfig,
    dragging: bool,
    /// Downward displacement from the drag gesture, in points.
    drag_offset: f32,
}

impl BottomSheetShell {
    pub fn new(options: &ShellOptions, config: &BottomSheetConfig) -> Self {
        if let Some(requested) = options.max_height.filter(|f| !in_unit_range(*f)) {
            trace!(requested, "sheet height out of range; using configured height");
        }
        let height_fraction = options
            .max_height
            .filter(|f| in_unit_range(*f))
            .or_else(|| Some(config.max_height).filter(|f| in_unit_range(*f)))
            .unwrap_or_else(|| BottomSheetConfig::default().max_height);
        Self {
            animation: ModalAnimationState::new(ModalAnimationConfig::symmetric(
                config.transition(),
            )),
            close_on_backdrop: options.close_on_backdrop,
            height_fraction,
            config: config.clone(),
            dragging: false,
            drag_offset: 0.0,
        }
    }

    pub fn set_visible(&mut self, visible: bool) {
        if visible {
            self.drag_offset = 0.0;
            self.animation.start_opening();
        } else {
            self.dragging = false;
            self.animation.start_closing();
        }
    }

    #[inline]
    pub fn phase(&self) -> ModalAnimationPhase {
        self.animation.phase()
    }

    pub fn tick(&mut self, dt: Duration) -> bool {
        self.animation.tick(dt)
    }

    #[inline]
    pub fn drag_offset(&self) -> f32 {
        self.drag_offset
    }

    /// Fully shown sheet rectangle.
    fn resting_rect(&self, screen: Rect) -> Rect {
        let height = screen.height * self.height_fraction;
        Rect::new(screen.x, screen.bottom() - height, screen.width, height)
    }

    pub fn content_rect(&self, screen: Rect) -> Rect {
        let resting = self.resting_rect(screen);
        let hidden = (1.0 - self.animation.value()) * resting.height;
        resting.offset_y(hidden + self.drag_offset)
    }

    pub fn render(&self, content: &dyn View, screen: Rect, frame: &mut Frame) {
        if !self.animation.is_rendering() {
            return;
        }
        let t = self.animation.value();
        let area = self.content_rect(screen);
        let interactive = self.animation.is_showing() && frame.is_interactive();

        frame.push(DrawCommand::Backdrop {
            area: screen,
            opacity: self.config.backdrop_opacity * t,
        });
        frame.push(DrawCommand::Surface {
            area,
            opacity: t,
            interactive,
        });
        frame.with_interactivity(interactive, |frame| content.render(area, frame));
    }

    pub fn handle_event(&mut self, event: &ShellEvent, screen: Rect) -> Option<ShellAction> {
        if !self.animation.is_showing() {
            return None;
        }
        match *event {
            ShellEvent::Back => Some(ShellAction::BackPressed),
            ShellEvent::Tap(point) => {
                let outside = !self.content_rect(screen).contains(point);
                (outside && self.close_on_backdrop).then_some(ShellAction::BackdropTapped)
            }
            ShellEvent::DragStart(point) => {
                self.dragging = self.content_rect(screen).contains(point);
                None
            }
            ShellEvent::DragMove { dy } => {
                if self.dragging {
                    self.drag_offset = dy.max(0.0);
                }
                None
            }
            ShellEvent::DragRelease { dy, velocity } => {
                if !std::mem::take(&mut self.dragging) {
                    return None;
                }
                self.release(dy.max(0.0), velocity, self.resting_rect(screen).height)
            }
        }
    }

    fn release(&mut self, distance: f32, velocity: f32, height: f32) -> Option<ShellAction> {
        let past_distance = distance >= height * self.config.dismiss_distance_fraction;
        let past_velocity = velocity >= self.config.dismiss_velocity;
        if self.config.drag_to_dismiss && (past_distance || past_velocity) {
            trace!(distance, velocity, "sheet drag dismissed");
            self.drag_offset = distance;
            Some(ShellAction::DraggedAway)
        } else {
            trace!(distance, velocity, "sheet drag snapped back");
            self.drag_offset = 0.0;
            None
        }
    }
}

/// `(0, 1]`; NaN is rejected.
fn in_unit_range(fraction: f32) -> bool {
    fraction > 0.0 && fraction <= 1.0
}
