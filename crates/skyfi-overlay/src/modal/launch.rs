#![forbid(unsafe_code)]

//! Future-returning overlay launchers.
//!
//! Each helper registers one overlay and returns a [`Launch`] that settles
//! exactly once: with the mapped payload when the content calls `done`, or
//! with the helper's cancellation outcome when the overlay is closed.
//!
//! | Helper | Shell | Completes with | On close |
//! |--------|-------|----------------|----------|
//! | [`capture_photo`] | dialog | `Some(CapturedPhoto)` | `Ok(None)` |
//! | [`scan_qr`] | dialog | scanned text | `Err(ModalError::Cancelled)` |
//! | [`view_pdf`] | dialog | `true` | `Ok(false)` |
//! | [`record_video`] | dialog | `Some(RecordedVideo)` | `Ok(None)` |
//! | [`select_address`] | bottom sheet | `Some(Address)` | `Ok(None)` |
//! | [`confirm`] | dialog | the chosen `bool` | `Ok(false)` |
//!
//! If the registry is dropped before the overlay settles, the launch yields
//! [`ModalError::Abandoned`]. Launching under an id that is already open
//! yields [`ModalError::AlreadyOpen`] at once and leaves the open overlay
//! alone. Hardware sessions (camera, recorder) belong to
//! the content view and end when the host drops it.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use skyfi_runtime::{Deferred, Pending, SettleOnce};
use tracing::debug;

use crate::error::ModalError;
use crate::modal::controls::ModalControls;
use crate::modal::registry::{ModalRegistry, Registration};
use crate::modal::request::{ModalKind, ModalRequest};
use crate::view::View;

/// A photo taken by the camera content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedPhoto {
    pub uri: String,
    pub width: u32,
    pub height: u32,
}

/// A clip recorded by the video content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedVideo {
    pub uri: String,
    pub duration: Duration,
}

/// A delivery address picked in the address sheet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Address {
    pub line: String,
    pub ward: String,
    pub district: String,
    pub province: String,
}

/// What a launch settles with when its overlay is closed.
#[derive(Debug, Clone, PartialEq)]
pub enum Cancellation<R> {
    /// Resolve with this value.
    Resolve(R),
    /// Fail with [`ModalError::Cancelled`].
    Reject,
}

impl<R> Cancellation<R> {
    fn into_result(self) -> Result<R, ModalError> {
        match self {
            Self::Resolve(value) => Ok(value),
            Self::Reject => Err(ModalError::Cancelled),
        }
    }
}

/// Outcome of a launched overlay.
#[must_use = "the overlay outcome is only observable by awaiting the launch"]
pub struct Launch<R> {
    registration: Registration,
    pending: Pending<Result<R, ModalError>>,
}

impl<R> Launch<R> {
    /// Which id the overlay was registered under.
    pub fn registration(&self) -> &Registration {
        &self.registration
    }
}

impl<R> fmt::Debug for Launch<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Launch")
            .field("registration", &self.registration)
            .finish_non_exhaustive()
    }
}

impl<R> Future for Launch<R> {
    type Output = Result<R, ModalError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.pending)
            .poll(cx)
            .map(|outcome| outcome.unwrap_or_else(|abandoned| Err(abandoned.into())))
    }
}

/// Register `request` and adapt its callbacks into a [`Launch`].
///
/// Any `on_done`/`on_close` already set on the request are replaced.
pub fn present<T, R>(
    registry: &ModalRegistry,
    request: ModalRequest<T>,
    on_done: impl FnOnce(T) -> R + 'static,
    on_cancel: Cancellation<R>,
) -> Launch<R>
where
    T: 'static,
    R: 'static,
{
    let (settler, pending) = Deferred::new();
    let done_slot = SettleOnce::new(settler);
    let close_slot = done_slot.clone();

    let request = request
        .on_done(move |payload| {
            done_slot.settle(Ok(on_done(payload)));
        })
        .on_close(move || {
            close_slot.settle(on_cancel.into_result());
        });

    let registration = registry.open(request);
    if registration.is_opened() {
        return Launch {
            registration,
            pending,
        };
    }

    debug!(modal_id = %registration.id(), "launch rejected: id already open");
    let (settler, pending) = Deferred::new();
    settler.settle(Err(ModalError::AlreadyOpen {
        id: registration.id().clone(),
    }));
    Launch {
        registration,
        pending,
    }
}

/// Camera capture. Closing resolves `None`.
pub fn capture_photo<V, F>(registry: &ModalRegistry, content: F) -> Launch<Option<CapturedPhoto>>
where
    V: View + 'static,
    F: FnOnce(ModalControls<CapturedPhoto>) -> V + 'static,
{
    present(
        registry,
        ModalRequest::factory(content),
        Some,
        Cancellation::Resolve(None),
    )
}

/// QR scan. Closing rejects with [`ModalError::Cancelled`].
pub fn scan_qr<V, F>(registry: &ModalRegistry, content: F) -> Launch<String>
where
    V: View + 'static,
    F: FnOnce(ModalControls<String>) -> V + 'static,
{
    present(
        registry,
        ModalRequest::factory(content),
        |code| code,
        Cancellation::Reject,
    )
}

/// PDF viewer with a close button. Resolves `true` when acknowledged.
pub fn view_pdf<V, F>(registry: &ModalRegistry, content: F) -> Launch<bool>
where
    V: View + 'static,
    F: FnOnce(ModalControls<()>) -> V + 'static,
{
    present(
        registry,
        ModalRequest::factory(content).close_button(true),
        |()| true,
        Cancellation::Resolve(false),
    )
}

/// Video recording. Closing resolves `None`.
pub fn record_video<V, F>(registry: &ModalRegistry, content: F) -> Launch<Option<RecordedVideo>>
where
    V: View + 'static,
    F: FnOnce(ModalControls<RecordedVideo>) -> V + 'static,
{
    present(
        registry,
        ModalRequest::factory(content),
        Some,
        Cancellation::Resolve(None),
    )
}

/// Address picker in a bottom sheet. Closing resolves `None`.
pub fn select_address<V, F>(registry: &ModalRegistry, content: F) -> Launch<Option<Address>>
where
    V: View + 'static,
    F: FnOnce(ModalControls<Address>) -> V + 'static,
{
    present(
        registry,
        ModalRequest::factory(content).kind(ModalKind::BottomSheet),
        Some,
        Cancellation::Resolve(None),
    )
}

/// Yes/no confirmation. Closing resolves `false`.
pub fn confirm<V, F>(registry: &ModalRegistry, content: F) -> Launch<bool>
where
    V: View + 'static,
    F: FnOnce(ModalControls<bool>) -> V + 'static,
{
    present(
        registry,
        ModalRequest::factory(content),
        |confirmed| confirmed,
        Cancellation::Resolve(false),
    )
}
