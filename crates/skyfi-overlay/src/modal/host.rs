#![forbid(unsafe_code)]

//! Modal host: turns registry state into rendered overlays.
//!
//! Mount exactly one host per registry near the UI root. On every registry
//! notification the host reconciles its render cache:
//!
//! 1. Entries whose registration left the registry are dropped from the
//!    cache and the visibility map. Their shell moves to an id-less retiring
//!    list and keeps drawing, non-interactive, until its exit animation ends.
//! 2. Registrations without an entry are materialized: content is built
//!    once, bound to fresh [`Controls`], and its shell starts the entrance.
//!
//! # Invariants
//!
//! - A registration is materialized at most once; re-registering an id after
//!   removal materializes the new registration.
//! - No host borrow is held while user code runs (factories, view drops,
//!   `on_close`). Notifications arriving mid-sync are coalesced into one
//!   more reconciliation pass.
//! - Once removed from the registry an id has no cache entry and no
//!   visibility flag; only its anonymous retiring shell may remain.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use ahash::{AHashMap, AHashSet};
use skyfi_runtime::Subscription;
use tracing::{debug, trace, trace_span};
use web_time::Instant;

use crate::config::OverlayConfig;
use crate::frame::Frame;
use crate::geometry::Rect;
use crate::modal::controls::Controls;
use crate::modal::id::ModalId;
use crate::modal::registry::ModalRegistry;
use crate::modal::shell::{PresentationShell, ShellEvent};
use crate::view::View;

struct RenderEntry {
    id: ModalId,
    serial: u64,
    view: Box<dyn View>,
    shell: PresentationShell,
    controls: Controls,
}

struct RetiringShell {
    view: Box<dyn View>,
    shell: PresentationShell,
}

struct HostState {
    entries: Vec<RenderEntry>,
    visibility: AHashMap<ModalId, bool>,
    retiring: Vec<RetiringShell>,
    config: OverlayConfig,
    last_tick: Option<Instant>,
}

impl HostState {
    fn entry_mut(&mut self, id: &ModalId) -> Option<&mut RenderEntry> {
        self.entries.iter_mut().find(|e| &e.id == id)
    }

    fn hide(&mut self, id: &ModalId) {
        if let Some(visible) = self.visibility.get_mut(id) {
            *visible = false;
        }
        if let Some(entry) = self.entry_mut(id) {
            entry.shell.set_visible(false);
            trace!(modal_id = %id, "overlay hidden");
        }
    }
}

/// Host state shared with the registry listener and every [`Controls`].
pub(crate) struct HostShared {
    state: RefCell<HostState>,
    syncing: Cell<bool>,
    dirty: Cell<bool>,
    /// Hides requested while `state` was borrowed (e.g. from `View::render`).
    deferred_hides: RefCell<Vec<ModalId>>,
}

impl HostShared {
    fn new(config: OverlayConfig) -> Self {
        Self {
            state: RefCell::new(HostState {
                entries: Vec::new(),
                visibility: AHashMap::new(),
                retiring: Vec::new(),
                config,
                last_tick: None,
            }),
            syncing: Cell::new(false),
            dirty: Cell::new(false),
            deferred_hides: RefCell::new(Vec::new()),
        }
    }

    /// Flip an id's visibility to `false` and start its shell's exit.
    pub(crate) fn hide(&self, id: &ModalId) {
        let Ok(mut state) = self.state.try_borrow_mut() else {
            debug!(modal_id = %id, "hide deferred: host busy");
            self.deferred_hides.borrow_mut().push(id.clone());
            return;
        };
        state.hide(id);
    }

    /// Reconcile with the registry, or mark dirty if that cannot happen now.
    fn sync(self: &Rc<Self>, registry: &ModalRegistry) {
        if self.syncing.get() || self.state.try_borrow_mut().is_err() {
            self.dirty.set(true);
            return;
        }
        let _guard = SyncGuard::enter(&self.syncing);
        let _span = trace_span!("modal_host.sync").entered();
        loop {
            self.dirty.set(false);
            self.reconcile(registry);
            if !self.dirty.get() {
                break;
            }
        }
    }

    /// Apply hides and run a sync that were deferred because the host was
    /// busy. A no-op while the state is still borrowed.
    fn flush(self: &Rc<Self>, registry: &ModalRegistry) {
        if !self.deferred_hides.borrow().is_empty() {
            let Ok(mut state) = self.state.try_borrow_mut() else {
                return;
            };
            let hides = std::mem::take(&mut *self.deferred_hides.borrow_mut());
            for id in &hides {
                state.hide(id);
            }
        }
        if self.dirty.get() {
            self.sync(registry);
        }
    }

    fn reconcile(self: &Rc<Self>, registry: &ModalRegistry) {
        let live = registry.snapshot();
        self.retire_departed(&live);
        for (id, _) in live {
            self.materialize(registry, id);
        }
    }

    fn retire_departed(&self, live: &[(ModalId, u64)]) {
        let live: AHashSet<(&ModalId, u64)> = live.iter().map(|(id, s)| (id, *s)).collect();
        let mut finished = Vec::new();
        {
            let mut state = self.state.borrow_mut();
            let (kept, departed): (Vec<_>, Vec<_>) = std::mem::take(&mut state.entries)
                .into_iter()
                .partition(|e| live.contains(&(&e.id, e.serial)));
            state.entries = kept;

            for mut entry in departed {
                state.visibility.remove(&entry.id);
                entry.shell.set_visible(false);
                trace!(modal_id = %entry.id, "render entry retired");
                if entry.shell.is_rendering() {
                    state.retiring.push(RetiringShell {
                        view: entry.view,
                        shell: entry.shell,
                    });
                } else {
                    finished.push(entry.view);
                }
            }
        }
        drop(finished);
    }

    fn materialize(self: &Rc<Self>, registry: &ModalRegistry, id: ModalId) {
        if self.state.borrow().visibility.contains_key(&id) {
            return;
        }
        let Some(pending) = registry.take_pending(&id) else {
            return;
        };

        let controls = Controls::new(id.clone(), Rc::downgrade(self), registry.downgrade());
        let view = (pending.materializer)(controls.clone());
        if !registry.is_live(&id, pending.serial) {
            trace!(modal_id = %id, "overlay settled while building; view discarded");
            drop(view);
            return;
        }

        let mut state = self.state.borrow_mut();
        let mut shell = PresentationShell::new(
            pending.kind,
            &pending.options,
            pending.close_button,
            &state.config,
        );
        shell.set_visible(true);
        state.visibility.insert(id.clone(), true);
        state.entries.push(RenderEntry {
            id: id.clone(),
            serial: pending.serial,
            view,
            shell,
            controls,
        });
        trace!(modal_id = %id, kind = ?pending.kind, "overlay materialized");
    }
}

struct SyncGuard<'a>(&'a Cell<bool>);

impl<'a> SyncGuard<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self(flag)
    }
}

impl Drop for SyncGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Renders every registered overlay and routes input to the topmost one.
///
/// Dropping the host unsubscribes it from the registry and drops all cached
/// content. Overlays still registered at that point never settle; their
/// launch futures resolve to [`ModalError::Abandoned`](crate::ModalError)
/// once the registry is dropped too.
pub struct ModalHost {
    shared: Rc<HostShared>,
    registry: ModalRegistry,
    _subscription: Subscription,
}

impl fmt::Debug for ModalHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalHost")
            .field("visible", &self.visible_ids())
            .field("entries", &self.entry_count())
            .field("retiring", &self.retiring_count())
            .finish()
    }
}

impl ModalHost {
    /// Subscribe to `registry` and materialize anything already registered.
    pub fn mount(registry: &ModalRegistry, config: OverlayConfig) -> Self {
        let shared = Rc::new(HostShared::new(config));
        let weak_host = Rc::downgrade(&shared);
        let weak_registry = registry.downgrade();
        let subscription = registry.subscribe(move |_event| {
            if let (Some(host), Some(registry)) = (weak_host.upgrade(), weak_registry.upgrade()) {
                host.sync(&registry);
            }
        });
        shared.sync(registry);
        debug!(entries = shared.state.borrow().entries.len(), "modal host mounted");

        Self {
            shared,
            registry: registry.clone(),
            _subscription: subscription,
        }
    }

    pub fn registry(&self) -> &ModalRegistry {
        &self.registry
    }

    // --- Frame driving ---

    /// Draw every cached overlay in registration order, then retiring shells.
    ///
    /// Content may settle itself while drawing; the resulting hide and
    /// removal are applied once the pass ends.
    pub fn render(&self, screen: Rect, frame: &mut Frame) {
        self.shared.flush(&self.registry);
        {
            let state = self.shared.state.borrow();
            for entry in &state.entries {
                entry.shell.render(entry.view.as_ref(), screen, frame);
            }
            for retiring in &state.retiring {
                retiring.shell.render(retiring.view.as_ref(), screen, frame);
            }
        }
        self.shared.flush(&self.registry);
    }

    /// Route input to the topmost visible overlay.
    ///
    /// Returns `true` if an overlay captured the event. A shell close action
    /// (backdrop tap, back, close button, drag-away) closes that overlay.
    pub fn handle_event(&self, event: &ShellEvent, screen: Rect) -> bool {
        self.shared.flush(&self.registry);
        let closing = {
            let mut state = self.shared.state.borrow_mut();
            let HostState {
                entries,
                visibility,
                ..
            } = &mut *state;
            let Some(entry) = entries
                .iter_mut()
                .rev()
                .find(|e| visibility.get(&e.id).copied().unwrap_or(false))
            else {
                return false;
            };
            entry
                .shell
                .handle_event(event, screen, entry.view.as_ref())
                .map(|action| (action, entry.controls.clone()))
        };

        if let Some((action, controls)) = closing {
            debug!(modal_id = %controls.id(), ?action, "shell requested close");
            controls.close();
        }
        self.shared.flush(&self.registry);
        true
    }

    /// Advance every shell animation by `dt`.
    ///
    /// Retiring shells whose exit finished are dropped. Returns `true` while
    /// anything is still animating.
    pub fn tick(&self, dt: Duration) -> bool {
        self.shared.flush(&self.registry);
        let (animating, finished) = {
            let mut state = self.shared.state.borrow_mut();
            let mut animating = false;
            for entry in &mut state.entries {
                entry.shell.tick(dt);
                animating |= entry.shell.is_animating();
            }
            for retiring in &mut state.retiring {
                retiring.shell.tick(dt);
            }
            let (live, finished): (Vec<_>, Vec<_>) = std::mem::take(&mut state.retiring)
                .into_iter()
                .partition(|r| r.shell.is_rendering());
            animating |= !live.is_empty();
            state.retiring = live;
            (animating, finished)
        };
        if !finished.is_empty() {
            trace!(count = finished.len(), "retiring shells finished");
        }
        drop(finished);
        animating
    }

    /// [`tick`](Self::tick) by the time elapsed since the previous call.
    pub fn advance_to(&self, now: Instant) -> bool {
        let dt = {
            let mut state = self.shared.state.borrow_mut();
            let dt = state
                .last_tick
                .map_or(Duration::ZERO, |last| now.saturating_duration_since(last));
            state.last_tick = Some(now);
            dt
        };
        self.tick(dt)
    }

    // --- Queries ---
    //
    // Each query applies pending work first, so answers match the registry.

    /// Whether `id` has a render entry.
    pub fn is_cached(&self, id: &ModalId) -> bool {
        self.shared.flush(&self.registry);
        self.shared.state.borrow().entries.iter().any(|e| &e.id == id)
    }

    /// Visibility flag for `id`; `None` once the id is gone.
    pub fn visibility(&self, id: &ModalId) -> Option<bool> {
        self.shared.flush(&self.registry);
        self.shared.state.borrow().visibility.get(id).copied()
    }

    pub fn entry_count(&self) -> usize {
        self.shared.flush(&self.registry);
        self.shared.state.borrow().entries.len()
    }

    pub fn retiring_count(&self) -> usize {
        self.shared.flush(&self.registry);
        self.shared.state.borrow().retiring.len()
    }

    /// Visible ids, bottom to top.
    pub fn visible_ids(&self) -> Vec<ModalId> {
        self.shared.flush(&self.registry);
        let state = self.shared.state.borrow();
        state
            .entries
            .iter()
            .filter(|e| state.visibility.get(&e.id).copied().unwrap_or(false))
            .map(|e| e.id.clone())
            .collect()
    }
}
