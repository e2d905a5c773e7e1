#![forbid(unsafe_code)]

//! Overlay presentation defaults.
//!
//! [`OverlayConfig`] holds the values shells fall back to when a request's
//! [`ShellOptions`](crate::ShellOptions) leave a field unset: sizes,
//! backdrop opacity, animation timing, and bottom-sheet drag thresholds.
//!
//! With the `policy-config` feature, a config can be loaded from TOML:
//!
//! ```toml
//! [dialog]
//! width = 320.0
//! animation = "slide"
//!
//! [bottom_sheet]
//! max_height = 0.6
//! drag_to_dismiss = false
//! ```
//!
//! Missing keys keep their defaults.

use std::fmt;
use std::time::Duration;

use crate::modal::AnimationKind;

/// Configuration could not be loaded or failed validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The source text did not parse.
    Parse(String),
    /// A field is outside its allowed range.
    OutOfRange { field: &'static str, value: f32 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "config parse error: {msg}"),
            Self::OutOfRange { field, value } => {
                write!(f, "config field '{field}' out of range: {value}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Centered dialog defaults.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "policy-config",
    derive(serde::Deserialize),
    serde(default, deny_unknown_fields)
)]
pub struct DialogConfig {
    /// Preferred dialog width in points.
    pub width: f32,
    /// Width cap as a fraction of screen width.
    pub max_width_fraction: f32,
    /// Height cap as a fraction of screen height.
    pub max_height_fraction: f32,
    /// Backdrop opacity when fully shown, in `[0.0, 1.0]`.
    pub backdrop_opacity: f32,
    /// Transition used when the request does not pick one.
    pub animation: AnimationKind,
    /// Entrance/exit duration in milliseconds.
    pub duration_ms: u64,
    /// Side length of the close button hit area.
    pub close_button_size: f32,
}

impl Default for DialogConfig {
    fn default() -> Self {
        Self {
            width: 340.0,
            max_width_fraction: 0.9,
            max_height_fraction: 0.85,
            backdrop_opacity: 0.5,
            animation: AnimationKind::Fade,
            duration_ms: 250,
            close_button_size: 32.0,
        }
    }
}

impl DialogConfig {
    pub fn width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }

    pub fn animation(mut self, animation: AnimationKind) -> Self {
        self.animation = animation;
        self
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration_ms = duration.as_millis() as u64;
        self
    }

    pub fn backdrop_opacity(mut self, opacity: f32) -> Self {
        self.backdrop_opacity = opacity;
        self
    }

    /// Transition duration.
    pub fn transition(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

/// Bottom sheet defaults.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "policy-config",
    derive(serde::Deserialize),
    serde(default, deny_unknown_fields)
)]
pub struct BottomSheetConfig {
    /// Sheet height as a fraction of screen height.
    pub max_height: f32,
    /// Backdrop opacity when fully shown, in `[0.0, 1.0]`.
    pub backdrop_opacity: f32,
    /// Translate+fade duration in milliseconds.
    pub duration_ms: u64,
    /// Whether a drag release past the thresholds closes the sheet.
    /// When false, every release snaps back.
    pub drag_to_dismiss: bool,
    /// Drag distance, as a fraction of sheet height, that dismisses.
    pub dismiss_distance_fraction: f32,
    /// Downward release velocity (points per millisecond) that dismisses.
    pub dismiss_velocity: f32,
}

impl Default for BottomSheetConfig {
    fn default() -> Self {
        Self {
            max_height: 0.5,
            backdrop_opacity: 0.5,
            duration_ms: 300,
            drag_to_dismiss: true,
            dismiss_distance_fraction: 0.25,
            dismiss_velocity: 0.8,
        }
    }
}

impl BottomSheetConfig {
    pub fn max_height(mut self, fraction: f32) -> Self {
        self.max_height = fraction;
        self
    }

    pub fn drag_to_dismiss(mut self, enabled: bool) -> Self {
        self.drag_to_dismiss = enabled;
        self
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration_ms = duration.as_millis() as u64;
        self
    }

    pub fn dismiss_thresholds(mut self, distance_fraction: f32, velocity: f32) -> Self {
        self.dismiss_distance_fraction = distance_fraction;
        self.dismiss_velocity = velocity;
        self
    }

    /// Transition duration.
    pub fn transition(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

/// Presentation defaults for every shell a host creates.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(
    feature = "policy-config",
    derive(serde::Deserialize),
    serde(default, deny_unknown_fields)
)]
pub struct OverlayConfig {
    pub dialog: DialogConfig,
    pub bottom_sheet: BottomSheetConfig,
}

impl OverlayConfig {
    pub fn dialog(mut self, dialog: DialogConfig) -> Self {
        self.dialog = dialog;
        self
    }

    pub fn bottom_sheet(mut self, bottom_sheet: BottomSheetConfig) -> Self {
        self.bottom_sheet = bottom_sheet;
        self
    }

    /// Check every fraction, opacity, and size for a usable range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fractions = [
            ("dialog.max_width_fraction", self.dialog.max_width_fraction),
            ("dialog.max_height_fraction", self.dialog.max_height_fraction),
            ("bottom_sheet.max_height", self.bottom_sheet.max_height),
            (
                "bottom_sheet.dismiss_distance_fraction",
                self.bottom_sheet.dismiss_distance_fraction,
            ),
        ];
        for (field, value) in fractions {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ConfigError::OutOfRange { field, value });
            }
        }

        let opacities = [
            ("dialog.backdrop_opacity", self.dialog.backdrop_opacity),
            (
                "bottom_sheet.backdrop_opacity",
                self.bottom_sheet.backdrop_opacity,
            ),
        ];
        for (field, value) in opacities {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfRange { field, value });
            }
        }

        let positives = [
            ("dialog.width", self.dialog.width),
            ("dialog.close_button_size", self.dialog.close_button_size),
            ("bottom_sheet.dismiss_velocity", self.bottom_sheet.dismiss_velocity),
        ];
        for (field, value) in positives {
            if !(value > 0.0) {
                return Err(ConfigError::OutOfRange { field, value });
            }
        }

        Ok(())
    }

    /// Parse and validate a TOML policy document.
    #[cfg(feature = "policy-config")]
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}
