#![forbid(unsafe_code)]

//! Entrance/exit animation state for presentation shells.
//!
//! [`ModalAnimationState`] tracks a normalized progress value where `0.0` is
//! fully hidden and `1.0` is fully shown. Shells map the eased value onto
//! opacity and translation.
//!
//! # Invariants
//!
//! - `progress` stays within `[0.0, 1.0]`.
//! - `Closed` implies `progress == 0.0`; `Open` implies `progress == 1.0`.
//! - Reversing direction mid-flight continues from the current progress
//!   instead of restarting, so a quick close/open never jumps.
//! - A zero duration completes the transition immediately.

use std::time::Duration;

/// Transition style requested for a dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "policy-config",
    derive(serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum AnimationKind {
    /// Appear and disappear instantly.
    None,
    /// Cross-fade surface and backdrop.
    #[default]
    Fade,
    /// Slide up from the bottom edge while the backdrop fades.
    Slide,
}

/// Lifecycle phase of a shell animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalAnimationPhase {
    /// Hidden; nothing is rendered.
    #[default]
    Closed,
    /// Entrance in progress.
    Opening,
    /// Fully shown.
    Open,
    /// Exit in progress; content is still drawn but not interactive.
    Closing,
}

/// Easing curve applied to raw progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalEasing {
    Linear,
    #[default]
    EaseOutCubic,
    EaseInOutCubic,
}

impl ModalEasing {
    /// Map `t` in `[0, 1]` onto the curve.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Self::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

/// Timing for one shell's transitions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModalAnimationConfig {
    pub entrance: Duration,
    pub exit: Duration,
    pub easing: ModalEasing,
}

impl ModalAnimationConfig {
    /// Same duration in both directions.
    pub fn symmetric(duration: Duration) -> Self {
        Self {
            entrance: duration,
            exit: duration,
            easing: ModalEasing::default(),
        }
    }

    /// No animation at all.
    pub fn instant() -> Self {
        Self::symmetric(Duration::ZERO)
    }

    pub fn easing(mut self, easing: ModalEasing) -> Self {
        self.easing = easing;
        self
    }
}

impl Default for ModalAnimationConfig {
    fn default() -> Self {
        Self::symmetric(Duration::from_millis(250))
    }
}

/// Progress tracker for a shell's show/hide transitions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModalAnimationState {
    phase: ModalAnimationPhase,
    progress: f32,
    config: ModalAnimationConfig,
}

impl Default for ModalAnimationState {
    fn default() -> Self {
        Self::new(ModalAnimationConfig::default())
    }
}

impl ModalAnimationState {
    /// Create a closed animation.
    pub fn new(config: ModalAnimationConfig) -> Self {
        Self {
            phase: ModalAnimationPhase::Closed,
            progress: 0.0,
            config,
        }
    }

    /// Begin (or resume) the entrance transition.
    pub fn start_opening(&mut self) {
        if matches!(
            self.phase,
            ModalAnimationPhase::Open | ModalAnimationPhase::Opening
        ) {
            return;
        }
        self.phase = ModalAnimationPhase::Opening;
        if self.config.entrance.is_zero() {
            self.progress = 1.0;
            self.phase = ModalAnimationPhase::Open;
        }
    }

    /// Begin (or resume) the exit transition.
    pub fn start_closing(&mut self) {
        if matches!(
            self.phase,
            ModalAnimationPhase::Closed | ModalAnimationPhase::Closing
        ) {
            return;
        }
        self.phase = ModalAnimationPhase::Closing;
        if self.config.exit.is_zero() {
            self.progress = 0.0;
            self.phase = ModalAnimationPhase::Closed;
        }
    }

    /// Advance by `dt`. Returns `true` if progress or phase changed.
    pub fn tick(&mut self, dt: Duration) -> bool {
        match self.phase {
            ModalAnimationPhase::Opening => {
                self.progress += fraction(dt, self.config.entrance);
                if self.progress >= 1.0 {
                    self.progress = 1.0;
                    self.phase = ModalAnimationPhase::Open;
                }
                true
            }
            ModalAnimationPhase::Closing => {
                self.progress -= fraction(dt, self.config.exit);
                if self.progress <= 0.0 {
                    self.progress = 0.0;
                    self.phase = ModalAnimationPhase::Closed;
                }
                true
            }
            ModalAnimationPhase::Open | ModalAnimationPhase::Closed => false,
        }
    }

    #[inline]
    pub fn phase(&self) -> ModalAnimationPhase {
        self.phase
    }

    /// Raw linear progress in `[0.0, 1.0]`.
    #[inline]
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Eased progress in `[0.0, 1.0]`.
    pub fn value(&self) -> f32 {
        self.config.easing.apply(self.progress)
    }

    /// Whether anything should be drawn (everything except `Closed`).
    #[inline]
    pub fn is_rendering(&self) -> bool {
        self.phase != ModalAnimationPhase::Closed
    }

    /// Whether the shell is heading toward (or at) fully shown.
    #[inline]
    pub fn is_showing(&self) -> bool {
        matches!(
            self.phase,
            ModalAnimationPhase::Opening | ModalAnimationPhase::Open
        )
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        matches!(
            self.phase,
            ModalAnimationPhase::Opening | ModalAnimationPhase::Closing
        )
    }
}

fn fraction(dt: Duration, total: Duration) -> f32 {
    if total.is_zero() {
        1.0
    } else {
        dt.as_secs_f32() / total.as_secs_f32()
    }
}
