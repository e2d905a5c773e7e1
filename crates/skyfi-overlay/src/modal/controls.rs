#![forbid(unsafe_code)]

//! `close`/`done` controls handed to factory content.
//!
//! Controls are synthesized by the host when it materializes an overlay and
//! hold only weak references, so content that keeps them alive never keeps
//! the host or registry alive.
//!
//! # Settlement
//!
//! The first `close` or `done` takes both callbacks out of the descriptor;
//! every later call is a logged no-op. Settling hides the overlay, runs the
//! matching callback, then removes the descriptor. Removal happens in a
//! drop guard so it runs whether `on_done` succeeds, fails, or its future is
//! dropped early.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Weak;

use futures::FutureExt;
use futures::future::{LocalBoxFuture, ready};
use tracing::debug;

use crate::error::ModalError;
use crate::modal::host::HostShared;
use crate::modal::id::ModalId;
use crate::modal::registry::{ModalRegistry, WeakRegistry};
use crate::modal::request::Callbacks;

/// Untyped controls for one overlay.
#[derive(Clone)]
pub struct Controls {
    id: ModalId,
    host: Weak<HostShared>,
    registry: WeakRegistry,
}

impl fmt::Debug for Controls {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controls").field("id", &self.id).finish()
    }
}

impl Controls {
    pub(crate) fn new(id: ModalId, host: Weak<HostShared>, registry: WeakRegistry) -> Self {
        Self { id, host, registry }
    }

    pub fn id(&self) -> &ModalId {
        &self.id
    }

    /// Dismiss without completing. Runs `on_close` if nothing settled yet.
    pub fn close(&self) {
        let Some((registry, callbacks)) = self.begin("close") else {
            return;
        };
        let _settlement = Settlement {
            id: self.id.clone(),
            registry,
        };
        self.hide();

        let Callbacks { on_close, on_done } = callbacks;
        drop(on_done);
        if let Some(on_close) = on_close {
            on_close();
        }
    }

    /// Complete with a type-erased payload.
    ///
    /// The hide and the `on_done` call happen before this returns; the
    /// future resolves once an asynchronous handler finishes. Dropping the
    /// future still removes the overlay.
    pub fn done_any(&self, payload: Box<dyn Any>) -> LocalBoxFuture<'static, Result<(), ModalError>> {
        let Some((registry, callbacks)) = self.begin("done") else {
            return ready(Ok(())).boxed_local();
        };
        let settlement = Settlement {
            id: self.id.clone(),
            registry,
        };
        self.hide();

        let Callbacks { on_close, on_done } = callbacks;
        drop(on_close);
        match on_done {
            Some(on_done) => {
                let pending = on_done(payload);
                async move {
                    let _settlement = settlement;
                    pending.await
                }
                .boxed_local()
            }
            None => {
                drop(settlement);
                ready(Ok(())).boxed_local()
            }
        }
    }

    fn begin(&self, action: &'static str) -> Option<(ModalRegistry, Callbacks)> {
        let Some(registry) = self.registry.upgrade() else {
            debug!(modal_id = %self.id, action, "settle ignored: registry dropped");
            return None;
        };
        match registry.begin_settle(&self.id) {
            Some(callbacks) => Some((registry, callbacks)),
            None => {
                debug!(modal_id = %self.id, action, "settle ignored: already settled");
                None
            }
        }
    }

    fn hide(&self) {
        if let Some(host) = self.host.upgrade() {
            host.hide(&self.id);
        }
    }
}

/// Removes the descriptor when dropped.
struct Settlement {
    id: ModalId,
    registry: ModalRegistry,
}

impl Drop for Settlement {
    fn drop(&mut self) {
        self.registry.remove(&self.id);
    }
}

/// Typed controls passed to factory content of a `ModalRequest<T>`.
pub struct ModalControls<T> {
    raw: Controls,
    _payload: PhantomData<fn(T)>,
}

impl<T> Clone for ModalControls<T> {
    fn clone(&self) -> Self {
        Self {
            raw: self.raw.clone(),
            _payload: PhantomData,
        }
    }
}

impl<T> fmt::Debug for ModalControls<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalControls")
            .field("id", &self.raw.id)
            .finish()
    }
}

impl<T: 'static> ModalControls<T> {
    pub(crate) fn new(raw: Controls) -> Self {
        Self {
            raw,
            _payload: PhantomData,
        }
    }

    pub fn id(&self) -> &ModalId {
        self.raw.id()
    }

    /// Dismiss without completing.
    pub fn close(&self) {
        self.raw.close();
    }

    /// Complete with `payload`. See [`Controls::done_any`].
    pub fn done(&self, payload: T) -> LocalBoxFuture<'static, Result<(), ModalError>> {
        self.raw.done_any(Box::new(payload))
    }

    /// The untyped controls, e.g. for wiring a shell-level button.
    pub fn untyped(&self) -> &Controls {
        &self.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use crate::frame::Frame;
    use crate::geometry::Rect;
    use crate::modal::request::ModalRequest;
    use crate::view::View;
    use futures::executor::block_on;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Stub;

    impl View for Stub {
        fn render(&self, _area: Rect, _frame: &mut Frame) {}
    }

    fn controls_for(registry: &ModalRegistry, id: &ModalId) -> Controls {
        Controls::new(id.clone(), Weak::new(), registry.downgrade())
    }

    #[test]
    fn close_runs_on_close_and_removes() {
        let registry = ModalRegistry::new();
        let closed = Rc::new(Cell::new(0));
        let c = Rc::clone(&closed);
        let id = registry
            .open(ModalRequest::<()>::view(Stub).on_close(move || c.set(c.get() + 1)))
            .id()
            .clone();

        let controls = controls_for(&registry, &id);
        controls.close();
        controls.close();
        assert_eq!(closed.get(), 1);
        assert!(!registry.contains(&id));
    }

    #[test]
    fn done_after_close_is_noop() {
        let registry = ModalRegistry::new();
        let done = Rc::new(Cell::new(false));
        let d = Rc::clone(&done);
        let id = registry
            .open(ModalRequest::<u8>::view(Stub).on_done(move |_| d.set(true)))
            .id()
            .clone();

        let controls = ModalControls::<u8>::new(controls_for(&registry, &id));
        controls.close();
        assert!(block_on(controls.done(1)).is_ok());
        assert!(!done.get());
    }

    #[test]
    fn descriptor_present_while_async_done_pending() {
        let registry = ModalRegistry::new();
        let (tx, rx) = futures::channel::oneshot::channel::<()>();
        let id = registry
            .open(ModalRequest::<()>::view(Stub).on_done_async(move |()| async move {
                let _ = rx.await;
                Ok::<(), BoxError>(())
            }))
            .id()
            .clone();

        let controls = controls_for(&registry, &id);
        let mut pending = controls.done_any(Box::new(()));
        assert!((&mut pending).now_or_never().is_none());
        assert!(registry.contains(&id));

        tx.send(()).expect("receiver alive");
        assert!(block_on(pending).is_ok());
        assert!(!registry.contains(&id));
    }

    #[test]
    fn failed_done_still_removes() {
        let registry = ModalRegistry::new();
        let id = registry
            .open(
                ModalRequest::<()>::view(Stub)
                    .on_done_async(|()| async { Err::<(), BoxError>("payment declined".into()) }),
            )
            .id()
            .clone();

        let result = block_on(controls_for(&registry, &id).done_any(Box::new(())));
        assert!(matches!(result, Err(ModalError::Done(_))));
        assert!(!registry.contains(&id));
    }

    #[test]
    fn dropping_done_future_removes() {
        let registry = ModalRegistry::new();
        let id = registry
            .open(ModalRequest::<()>::view(Stub).on_done_async(|()| futures::future::pending::<Result<(), BoxError>>()))
            .id()
            .clone();

        let pending = controls_for(&registry, &id).done_any(Box::new(()));
        assert!(registry.contains(&id));
        drop(pending);
        assert!(!registry.contains(&id));
    }

    #[test]
    fn controls_outliving_registry_are_inert() {
        let registry = ModalRegistry::new();
        let id = registry.open(ModalRequest::<()>::view(Stub)).id().clone();
        let controls = controls_for(&registry, &id);
        drop(registry);
        controls.close();
        assert!(block_on(controls.done_any(Box::new(()))).is_ok());
    }
}
