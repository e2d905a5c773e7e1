#![forbid(unsafe_code)]

//! Imperative overlay orchestration.
//!
//! # Pieces
//!
//! - [`ModalRegistry`]: id → request map with synchronous change
//!   notification. Call sites open overlays here.
//! - [`ModalHost`]: subscribes to the registry, materializes content once
//!   per registration, and drives one [`PresentationShell`] per overlay.
//! - [`shell`]: dialog and bottom sheet chrome with entrance/exit
//!   animation, backdrop and drag handling.
//! - [`launch`]: helpers that wrap a registration into a future.
//!
//! # Lifecycle
//!
//! ```text
//! open ─► registered+visible ─► close/done ─► registered+hidden ─► removed
//!                                              (on_close runs /        │
//!                                               on_done awaited)       ▼
//!                                                            shell retires after
//!                                                            its exit animation
//! ```
//!
//! Exactly one of `on_close`/`on_done` runs per registration.

pub mod animation;
mod controls;
mod host;
mod id;
pub mod launch;
mod registry;
mod request;
pub mod shell;

pub use animation::{
    AnimationKind, ModalAnimationConfig, ModalAnimationPhase, ModalAnimationState, ModalEasing,
};
pub use controls::{Controls, ModalControls};
pub use host::ModalHost;
pub use id::ModalId;
pub use launch::{Cancellation, Launch};
pub use registry::{ModalRegistry, Registration, RegistryEvent};
pub use request::{Content, ContentFactory, ModalKind, ModalRequest, ShellOptions};
pub use shell::{BottomSheetShell, DialogShell, PresentationShell, ShellAction, ShellEvent};
