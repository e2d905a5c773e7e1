#![forbid(unsafe_code)]

//! Centered dialog shell.
//!
//! Lays content out in a fixed-width box centered on screen, capped by the
//! configured width and height fractions. Content may report a preferred
//! height; otherwise the box takes the full height cap.
//!
//! # Failure Modes
//!
//! - An empty screen rect yields an empty surface; content still renders
//!   into it.

use std::time::Duration;

use crate::config::DialogConfig;
use crate::frame::{DrawCommand, Frame};
use crate::geometry::{Point, Rect, Size};
use crate::modal::animation::{
    AnimationKind, ModalAnimationConfig, ModalAnimationPhase, ModalAnimationState,
};
use crate::modal::request::ShellOptions;
use crate::modal::shell::{ShellAction, ShellEvent};
use crate::view::View;

/// Dialog chrome and animation state.
#[derive(Debug, Clone)]
pub struct DialogShell {
    animation: ModalAnimationState,
    style: AnimationKind,
    close_on_backdrop: bool,
    close_button: bool,
    config: DialogConfig,
}

impl DialogShell {
    pub fn new(options: &ShellOptions, close_button: bool, config: &DialogConfig) -> Self {
        let style = options.animation.unwrap_or(config.animation);
        let timing = match style {
            AnimationKind::None => ModalAnimationConfig::instant(),
            AnimationKind::Fade | AnimationKind::Slide => {
                ModalAnimationConfig::symmetric(config.transition())
            }
        };
        Self {
            animation: ModalAnimationState::new(timing),
            style,
            close_on_backdrop: options.close_on_backdrop,
            close_button,
            config: config.clone(),
        }
    }

    pub fn set_visible(&mut self, visible: bool) {
        if visible {
            self.animation.start_opening();
        } else {
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

    pub fn style(&self) -> AnimationKind {
        self.style
    }

    /// Resting dialog box, before animation offsets.
    fn resting_rect(&self, screen: Rect, content: &dyn View) -> Rect {
        let width = self
            .config
            .width
            .min(screen.width * self.config.max_width_fraction);
        let max_height = screen.height * self.config.max_height_fraction;
        let height = content
            .preferred_height()
            .map_or(max_height, |h| h.min(max_height));
        screen.center(Size::new(width, height))
    }

    /// Surface opacity and vertical offset at the current progress.
    fn transform(&self, screen: Rect) -> (f32, f32) {
        let t = self.animation.value();
        match self.style {
            AnimationKind::None => (1.0, 0.0),
            AnimationKind::Fade => (t, 0.0),
            AnimationKind::Slide => (1.0, (1.0 - t) * screen.height),
        }
    }

    pub fn content_rect(&self, screen: Rect, content: &dyn View) -> Rect {
        let (_, dy) = self.transform(screen);
        self.resting_rect(screen, content).offset_y(dy)
    }

    fn close_button_rect(&self, surface: Rect) -> Rect {
        let size = self.config.close_button_size;
        Rect::new(surface.right() - size, surface.y, size, size)
    }

    pub fn render(&self, content: &dyn View, screen: Rect, frame: &mut Frame) {
        if !self.animation.is_rendering() {
            return;
        }
        let (opacity, dy) = self.transform(screen);
        let surface = self.resting_rect(screen, content).offset_y(dy);
        let interactive = self.animation.is_showing() && frame.is_interactive();

        frame.push(DrawCommand::Backdrop {
            area: screen,
            opacity: self.config.backdrop_opacity * self.animation.value(),
        });
        frame.push(DrawCommand::Surface {
            area: surface,
            opacity,
            interactive,
        });
        frame.with_interactivity(interactive, |frame| content.render(surface, frame));
        if self.close_button {
            frame.push(DrawCommand::CloseButton {
                area: self.close_button_rect(surface),
            });
        }
    }

    pub fn handle_event(
        &mut self,
        event: &ShellEvent,
        screen: Rect,
        content: &dyn View,
    ) -> Option<ShellAction> {
        if !self.animation.is_showing() {
            return None;
        }
        match *event {
            ShellEvent::Back => Some(ShellAction::BackPressed),
            ShellEvent::Tap(point) => self.classify_tap(point, self.content_rect(screen, content)),
            ShellEvent::DragStart(_)
            | ShellEvent::DragMove { .. }
            | ShellEvent::DragRelease { .. } => None,
        }
    }

    fn classify_tap(&self, point: Point, surface: Rect) -> Option<ShellAction> {
        if self.close_button && self.close_button_rect(surface).contains(point) {
            return Some(ShellAction::CloseButtonTapped);
        }
        if !surface.contains(point) && self.close_on_backdrop {
            return Some(ShellAction::BackdropTapped);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Body(Option<f32>);

    impl View for Body {
        fn render(&self, area: Rect, frame: &mut Frame) {
            frame.node(area, "body");
        }

        fn preferred_height(&self) -> Option<f32> {
            self.0
        }
    }

    const SCREEN: Rect = Rect::new(0.0, 0.0, 400.0, 800.0);

    fn open_dialog(options: ShellOptions, close_button: bool) -> DialogShell {
        let mut shell = DialogShell::new(&options, close_button, &DialogConfig::default());
        shell.set_visible(true);
        shell.tick(Duration::from_secs(1));
        shell
    }

    #[test]
    fn centered_with_width_cap() {
        let shell = open_dialog(ShellOptions::default(), false);
        let rect = shell.content_rect(SCREEN, &Body(Some(200.0)));
        assert_eq!(rect, Rect::new(30.0, 300.0, 340.0, 200.0));

        let narrow = Rect::new(0.0, 0.0, 300.0, 600.0);
        let rect = shell.content_rect(narrow, &Body(Some(200.0)));
        assert!((rect.width - 270.0).abs() < 1e-3);
    }

    #[test]
    fn height_capped_by_fraction() {
        let shell = open_dialog(ShellOptions::default(), false);
        let rect = shell.content_rect(SCREEN, &Body(Some(5000.0)));
        assert!((rect.height - 680.0).abs() < 1e-3);
        let rect = shell.content_rect(SCREEN, &Body(None));
        assert!((rect.height - 680.0).abs() < 1e-3);
    }

    #[test]
    fn fade_scales_opacity() {
        let mut shell = DialogShell::new(&ShellOptions::default(), false, &DialogConfig::default());
        shell.set_visible(true);
        shell.tick(Duration::from_millis(50));

        let mut frame = Frame::new();
        shell.render(&Body(Some(100.0)), SCREEN, &mut frame);
        match &frame.commands()[1] {
            DrawCommand::Surface { opacity, .. } => assert!(*opacity > 0.0 && *opacity < 1.0),
            other => panic!("expected surface, got {other:?}"),
        }
    }

    #[test]
    fn slide_offsets_until_open() {
        let options = ShellOptions::default().animation(AnimationKind::Slide);
        let mut shell = DialogShell::new(&options, false, &DialogConfig::default());
        shell.set_visible(true);
        let resting = Rect::new(30.0, 350.0, 340.0, 100.0);
        assert!(shell.content_rect(SCREEN, &Body(Some(100.0))).y > resting.y);
        shell.tick(Duration::from_secs(1));
        assert_eq!(shell.content_rect(SCREEN, &Body(Some(100.0))), resting);
    }

    #[test]
    fn no_animation_opens_immediately() {
        let options = ShellOptions::default().animation(AnimationKind::None);
        let mut shell = DialogShell::new(&options, false, &DialogConfig::default());
        shell.set_visible(true);
        assert_eq!(shell.phase(), ModalAnimationPhase::Open);
        shell.set_visible(false);
        assert_eq!(shell.phase(), ModalAnimationPhase::Closed);
    }

    #[test]
    fn taps_are_classified() {
        let mut shell = open_dialog(ShellOptions::default(), true);
        let content = Body(Some(200.0));
        // Surface spans x 30..370, y 300..500.
        let inside = ShellEvent::Tap(Point::new(200.0, 400.0));
        let outside = ShellEvent::Tap(Point::new(10.0, 10.0));
        let close = ShellEvent::Tap(Point::new(360.0, 310.0));

        assert_eq!(shell.handle_event(&inside, SCREEN, &content), None);
        assert_eq!(
            shell.handle_event(&outside, SCREEN, &content),
            Some(ShellAction::BackdropTapped)
        );
        assert_eq!(
            shell.handle_event(&close, SCREEN, &content),
            Some(ShellAction::CloseButtonTapped)
        );
    }

    #[test]
    fn close_button_drawn_on_request() {
        let shell = open_dialog(ShellOptions::default(), true);
        let mut frame = Frame::new();
        shell.render(&Body(Some(200.0)), SCREEN, &mut frame);
        assert!(frame.commands().iter().any(|c| matches!(
            c,
            DrawCommand::CloseButton { area } if *area == Rect::new(338.0, 300.0, 32.0, 32.0)
        )));
    }
}
