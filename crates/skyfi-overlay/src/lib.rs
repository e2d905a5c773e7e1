#![forbid(unsafe_code)]

//! Imperative modal/overlay orchestration for SkyFi.
//!
//! Any call site can request an overlay through a [`ModalRegistry`] handle;
//! a single [`ModalHost`] mounted near the UI root turns registry state into
//! animated [`PresentationShell`]s and hands each piece of content its own
//! `close`/`done` controls. The [`modal::launch`] helpers wrap the whole
//! round trip into a future.
//!
//! Rendering is toolkit-agnostic: shells and content write a display list
//! into a [`Frame`], expressed in logical points.
//!
//! # Example
//!
//! ```ignore
//! use skyfi_overlay::{ModalHost, ModalRegistry, OverlayConfig};
//! use skyfi_overlay::modal::launch;
//!
//! let registry = ModalRegistry::new();
//! let host = ModalHost::mount(&registry, OverlayConfig::default());
//!
//! let answer = launch::confirm(&registry, |controls| ConfirmView::new(controls));
//! // ... drive host.render / host.handle_event / host.tick from the UI loop ...
//! let confirmed = answer.await?;
//! ```

pub mod config;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod modal;
pub mod view;

pub use config::{BottomSheetConfig, ConfigError, DialogConfig, OverlayConfig};
pub use error::{BoxError, ModalError};
pub use frame::{DrawCommand, Frame};
pub use geometry::{Point, Rect, Size};
pub use modal::{
    AnimationKind, Content, Controls, Launch, ModalControls, ModalHost, ModalId, ModalKind,
    ModalRegistry, ModalRequest, PresentationShell, Registration, RegistryEvent, ShellAction,
    ShellEvent, ShellOptions,
};
pub use view::View;
