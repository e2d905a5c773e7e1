#![forbid(unsafe_code)]

//! Display list produced by overlay rendering.
//!
//! Shells and content append [`DrawCommand`]s to a [`Frame`]; the embedding
//! toolkit replays them in order (later commands paint over earlier ones).
//! Content commands are tagged with the interactivity of the surface they
//! were drawn into, so a toolkit can route touches only to live overlays.

use crate::geometry::Rect;

/// One painting instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Full-screen dimming layer.
    Backdrop { area: Rect, opacity: f32 },
    /// Overlay chrome (dialog box or sheet body).
    Surface {
        area: Rect,
        opacity: f32,
        interactive: bool,
    },
    /// Dialog close ("X") affordance.
    CloseButton { area: Rect },
    /// A content node drawn by a [`View`](crate::View).
    Node {
        area: Rect,
        label: String,
        interactive: bool,
    },
}

/// Ordered display list for one rendered frame.
#[derive(Debug, Clone)]
pub struct Frame {
    commands: Vec<DrawCommand>,
    interactive: bool,
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

impl Frame {
    /// Create an empty frame.
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            interactive: true,
        }
    }

    /// Append a raw command.
    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    /// Append a content node, tagged with the current surface interactivity.
    pub fn node(&mut self, area: Rect, label: impl Into<String>) {
        self.commands.push(DrawCommand::Node {
            area,
            label: label.into(),
            interactive: self.interactive,
        });
    }

    /// Run `draw` with content interactivity forced to `interactive`.
    pub fn with_interactivity(&mut self, interactive: bool, draw: impl FnOnce(&mut Frame)) {
        let previous = self.interactive;
        self.interactive = interactive;
        draw(self);
        self.interactive = previous;
    }

    /// Whether content drawn now would receive input.
    #[inline]
    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// All commands in paint order.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Whether nothing has been drawn.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Drop all commands, keeping the allocation.
    pub fn clear(&mut self) {
        self.commands.clear();
        self.interactive = true;
    }

    /// Labels of interactive content nodes, in paint order.
    pub fn interactive_labels(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Node {
                    label,
                    interactive: true,
                    ..
                } => Some(label.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Labels of every content node, in paint order.
    pub fn labels(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Node { label, .. } => Some(label.as_str()),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nodes_inherit_interactivity() {
        let mut frame = Frame::new();
        let area = Rect::new(0.0, 0.0, 10.0, 10.0);
        frame.node(area, "live");
        frame.with_interactivity(false, |f| f.node(area, "ghost"));
        frame.node(area, "live-again");

        assert_eq!(frame.labels(), vec!["live", "ghost", "live-again"]);
        assert_eq!(frame.interactive_labels(), vec!["live", "live-again"]);
    }

    #[test]
    fn clear_resets() {
        let mut frame = Frame::new();
        frame.push(DrawCommand::Backdrop {
            area: Rect::new(0.0, 0.0, 1.0, 1.0),
            opacity: 0.5,
        });
        assert!(!frame.is_empty());
        frame.clear();
        assert!(frame.is_empty());
        assert!(frame.is_interactive());
    }
}
