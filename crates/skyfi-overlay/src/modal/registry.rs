#![forbid(unsafe_code)]

//! Modal registry: the single source of truth for requested overlays.
//!
//! The registry maps modal ids to type-erased descriptors and notifies
//! subscribers synchronously on every change. It knows nothing about
//! rendering; the [`ModalHost`](crate::ModalHost) subscribes and turns
//! descriptors into shells.
//!
//! # Invariants
//!
//! - At most one descriptor per id. Opening under a present id is a no-op
//!   and the original descriptor wins.
//! - Insertion happens before `open` returns, so two back-to-back opens with
//!   the same id can never both register.
//! - Descriptors are kept in registration order.
//! - Generated ids are never reused within one registry.
//!
//! # Failure Modes
//!
//! - Duplicate id: `open` returns [`Registration::AlreadyOpen`] and logs at
//!   debug level; listeners are not notified.
//! - `remove` of an absent id: returns `false`, no notification.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use skyfi_runtime::{Notifier, Subscription};
use tracing::debug;

use crate::modal::id::ModalId;
use crate::modal::request::{Callbacks, Descriptor, ModalKind, ModalRequest, PendingContent};

/// Change notification emitted by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
    /// A new descriptor was registered.
    Opened(ModalId),
    /// A descriptor was removed after settling.
    Removed(ModalId),
}

impl RegistryEvent {
    pub fn id(&self) -> &ModalId {
        match self {
            Self::Opened(id) | Self::Removed(id) => id,
        }
    }
}

/// Outcome of an `open` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// The request was registered under this id.
    Opened(ModalId),
    /// A descriptor with this id already existed; the request was dropped.
    AlreadyOpen(ModalId),
}

impl Registration {
    pub fn id(&self) -> &ModalId {
        match self {
            Self::Opened(id) | Self::AlreadyOpen(id) => id,
        }
    }

    pub fn is_opened(&self) -> bool {
        matches!(self, Self::Opened(_))
    }
}

struct RegistryState {
    entries: Vec<Descriptor>,
    next_generated: u64,
    next_serial: u64,
}

impl RegistryState {
    fn position(&self, id: &ModalId) -> Option<usize> {
        self.entries.iter().position(|d| &d.id == id)
    }

    fn generate_id(&mut self) -> ModalId {
        loop {
            self.next_generated += 1;
            let candidate = ModalId::from(format!("modal-{}", self.next_generated));
            if self.position(&candidate).is_none() {
                return candidate;
            }
        }
    }
}

struct RegistryInner {
    state: RefCell<RegistryState>,
    changes: Notifier<RegistryEvent>,
}

/// Shared handle to the overlay registry.
///
/// Clones refer to the same registry. Inject one instance where overlays are
/// requested and mount one [`ModalHost`](crate::ModalHost) on it.
#[derive(Clone)]
pub struct ModalRegistry {
    inner: Rc<RegistryInner>,
}

impl Default for ModalRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ModalRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalRegistry")
            .field("ids", &self.ids())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl ModalRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RegistryInner {
                state: RefCell::new(RegistryState {
                    entries: Vec::new(),
                    next_generated: 0,
                    next_serial: 0,
                }),
                changes: Notifier::new(),
            }),
        }
    }

    // --- Registration ---

    /// Register an overlay request and notify listeners.
    ///
    /// Completion is observed through the request's own `on_close`/`on_done`
    /// callbacks; the return value only reports which id was used.
    pub fn open<T: 'static>(&self, request: ModalRequest<T>) -> Registration {
        let kind = request.kind;
        let id = {
            let mut state = self.inner.state.borrow_mut();
            let id = match request.id.clone() {
                Some(id) => {
                    if state.position(&id).is_some() {
                        debug!(modal_id = %id, "open ignored: id already registered");
                        return Registration::AlreadyOpen(id);
                    }
                    id
                }
                None => state.generate_id(),
            };
            state.next_serial += 1;
            let serial = state.next_serial;
            state.entries.push(request.into_descriptor(id.clone(), serial));
            id
        };

        debug!(modal_id = %id, ?kind, "modal opened");
        self.inner.changes.notify(&RegistryEvent::Opened(id.clone()));
        Registration::Opened(id)
    }

    /// [`open`](Self::open) with the bottom-sheet shell forced.
    pub fn show_bottom_sheet<T: 'static>(&self, request: ModalRequest<T>) -> Registration {
        self.open(request.kind(ModalKind::BottomSheet))
    }

    /// Listen for registry changes. Dropping the guard unsubscribes.
    pub fn subscribe(&self, listener: impl Fn(&RegistryEvent) + 'static) -> Subscription {
        self.inner.changes.subscribe(listener)
    }

    // --- Queries ---

    pub fn contains(&self, id: &ModalId) -> bool {
        self.inner.state.borrow().position(id).is_some()
    }

    /// Registered ids in registration order.
    pub fn ids(&self) -> Vec<ModalId> {
        self.inner
            .state
            .borrow()
            .entries
            .iter()
            .map(|d| d.id.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.state.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.state.borrow().entries.is_empty()
    }

    pub fn kind_of(&self, id: &ModalId) -> Option<ModalKind> {
        let state = self.inner.state.borrow();
        state.position(id).map(|idx| state.entries[idx].kind)
    }

    pub fn listener_count(&self) -> usize {
        self.inner.changes.listener_count()
    }

    // --- Host-facing ---

    pub(crate) fn downgrade(&self) -> WeakRegistry {
        WeakRegistry {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// `(id, serial)` of every descriptor, in registration order.
    pub(crate) fn snapshot(&self) -> Vec<(ModalId, u64)> {
        self.inner
            .state
            .borrow()
            .entries
            .iter()
            .map(|d| (d.id.clone(), d.serial))
            .collect()
    }

    /// Take the content of a descriptor that has not been materialized yet.
    pub(crate) fn take_pending(&self, id: &ModalId) -> Option<PendingContent> {
        let mut state = self.inner.state.borrow_mut();
        let idx = state.position(id)?;
        let descriptor = &mut state.entries[idx];
        let materializer = descriptor.materializer.take()?;
        Some(PendingContent {
            serial: descriptor.serial,
            kind: descriptor.kind,
            options: descriptor.options,
            close_button: descriptor.close_button,
            materializer,
        })
    }

    /// Whether the registration `serial` under `id` is still present.
    pub(crate) fn is_live(&self, id: &ModalId, serial: u64) -> bool {
        let state = self.inner.state.borrow();
        state
            .position(id)
            .is_some_and(|idx| state.entries[idx].serial == serial)
    }

    /// Start settling: hand out both callbacks exactly once.
    pub(crate) fn begin_settle(&self, id: &ModalId) -> Option<Callbacks> {
        let mut state = self.inner.state.borrow_mut();
        let idx = state.position(id)?;
        state.entries[idx].callbacks.take()
    }

    /// Remove a descriptor and notify. Returns `false` if it was absent.
    pub(crate) fn remove(&self, id: &ModalId) -> bool {
        let removed = {
            let mut state = self.inner.state.borrow_mut();
            state.position(id).map(|idx| state.entries.remove(idx))
        };
        let Some(descriptor) = removed else {
            return false;
        };
        // Captured callbacks may re-enter the registry when dropped.
        drop(descriptor);

        debug!(modal_id = %id, "modal removed");
        self.inner.changes.notify(&RegistryEvent::Removed(id.clone()));
        true
    }
}

/// Non-owning registry handle held by controls and the host listener.
#[derive(Clone)]
pub(crate) struct WeakRegistry {
    inner: Weak<RegistryInner>,
}

impl WeakRegistry {
    pub(crate) fn upgrade(&self) -> Option<ModalRegistry> {
        self.inner.upgrade().map(|inner| ModalRegistry { inner })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Frame;
    use crate::geometry::Rect;
    use crate::view::View;
    use proptest::prelude::*;
    use std::cell::Cell;
    use tracing_test::traced_test;

    struct Stub;

    impl View for Stub {
        fn render(&self, _area: Rect, _frame: &mut Frame) {}
    }

    fn request() -> ModalRequest<()> {
        ModalRequest::view(Stub)
    }

    #[test]
    fn open_registers_and_notifies() {
        let registry = ModalRegistry::new();
        let events = Rc::new(RefCell::new(Vec::new()));
        let e = Rc::clone(&events);
        let _sub = registry.subscribe(move |ev| e.borrow_mut().push(ev.clone()));

        let reg = registry.open(request().id("otp"));
        assert_eq!(reg, Registration::Opened(ModalId::from("otp")));
        assert!(registry.contains(&ModalId::from("otp")));
        assert_eq!(registry.kind_of(&ModalId::from("otp")), Some(ModalKind::Dialog));
        assert_eq!(
            *events.borrow(),
            vec![RegistryEvent::Opened(ModalId::from("otp"))]
        );
    }

    #[traced_test]
    #[test]
    fn duplicate_id_is_noop() {
        let registry = ModalRegistry::new();
        let notified = Rc::new(Cell::new(0));
        let n = Rc::clone(&notified);
        let _sub = registry.subscribe(move |_| n.set(n.get() + 1));

        let first_closed = Rc::new(Cell::new(false));
        let f = Rc::clone(&first_closed);
        registry.open(request().id("addr").on_close(move || f.set(true)));
        let second = registry.open(request().id("addr").kind(ModalKind::BottomSheet));

        assert_eq!(second, Registration::AlreadyOpen(ModalId::from("addr")));
        assert!(!second.is_opened());
        assert_eq!(registry.len(), 1);
        assert_eq!(notified.get(), 1);
        assert_eq!(registry.kind_of(&ModalId::from("addr")), Some(ModalKind::Dialog));
        assert!(logs_contain("open ignored: id already registered"));

        // The surviving descriptor still carries the first request's callbacks.
        let callbacks = registry
            .begin_settle(&ModalId::from("addr"))
            .expect("callbacks available");
        (callbacks.on_close.expect("first on_close"))();
        assert!(first_closed.get());
    }

    #[test]
    fn show_bottom_sheet_forces_kind() {
        let registry = ModalRegistry::new();
        let reg = registry.show_bottom_sheet(request());
        assert_eq!(registry.kind_of(reg.id()), Some(ModalKind::BottomSheet));
    }

    #[test]
    fn generated_ids_skip_caller_ids() {
        let registry = ModalRegistry::new();
        registry.open(request().id("modal-1"));
        let reg = registry.open(request());
        assert_eq!(reg.id().as_str(), "modal-2");
    }

    #[test]
    fn take_pending_only_once() {
        let registry = ModalRegistry::new();
        let id = registry.open(request()).id().clone();
        let pending = registry.take_pending(&id).expect("fresh descriptor");
        assert!(registry.take_pending(&id).is_none());
        assert!(registry.is_live(&id, pending.serial));

        assert!(registry.remove(&id));
        registry.open(request().id(id.clone()));
        assert!(!registry.is_live(&id, pending.serial));
    }

    #[test]
    fn begin_settle_only_once() {
        let registry = ModalRegistry::new();
        let id = registry.open(request()).id().clone();
        assert!(registry.begin_settle(&id).is_some());
        assert!(registry.begin_settle(&id).is_none());
    }

    #[test]
    fn remove_notifies_once() {
        let registry = ModalRegistry::new();
        let events = Rc::new(RefCell::new(Vec::new()));
        let e = Rc::clone(&events);
        let _sub = registry.subscribe(move |ev| e.borrow_mut().push(ev.clone()));

        let id = registry.open(request()).id().clone();
        assert!(registry.remove(&id));
        assert!(!registry.remove(&id));
        assert!(registry.is_empty());
        assert_eq!(events.borrow().len(), 2);
        assert_eq!(events.borrow()[1], RegistryEvent::Removed(id));
    }

    #[test]
    fn listener_may_open_during_notification() {
        let registry = ModalRegistry::new();
        let r = registry.clone();
        let _sub = registry.subscribe(move |ev| {
            if ev.id().as_str() == "outer" {
                r.open(ModalRequest::<()>::view(Stub).id("inner"));
            }
        });

        registry.open(request().id("outer"));
        assert_eq!(
            registry.ids(),
            vec![ModalId::from("outer"), ModalId::from("inner")]
        );
    }

    #[test]
    fn weak_handle_does_not_keep_registry_alive() {
        let registry = ModalRegistry::new();
        let weak = registry.downgrade();
        assert!(weak.upgrade().is_some());
        drop(registry);
        assert!(weak.upgrade().is_none());
    }

    proptest! {
        #[test]
        fn generated_ids_are_distinct(n in 1usize..64) {
            let registry = ModalRegistry::new();
            let ids: Vec<ModalId> = (0..n).map(|_| registry.open(request()).id().clone()).collect();
            let mut unique = ids.clone();
            unique.sort();
            unique.dedup();
            prop_assert_eq!(unique.len(), n);
            prop_assert_eq!(registry.len(), n);
        }

        #[test]
        fn repeated_opens_keep_first(extra in 1usize..16) {
            let registry = ModalRegistry::new();
            let winner = Rc::new(Cell::new(usize::MAX));
            for i in 0..=extra {
                let w = Rc::clone(&winner);
                registry.open(request().id("kyc").on_close(move || w.set(i)));
            }
            prop_assert_eq!(registry.len(), 1);
            let callbacks = registry.begin_settle(&ModalId::from("kyc")).expect("present");
            (callbacks.on_close.expect("on_close"))();
            prop_assert_eq!(winner.get(), 0);
        }
    }
}
