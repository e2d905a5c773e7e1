#![forbid(unsafe_code)]

//! Synchronous change notification for overlay state.
//!
//! - [`Notifier`]: a shared listener list that dispatches events in
//!   registration order.
//! - [`Subscription`]: RAII guard that removes its listener on drop.
//!
//! # Architecture
//!
//! `Notifier<E>` uses `Rc<RefCell<..>>` for single-threaded shared ownership.
//! Dispatch snapshots the listener list and releases the borrow before any
//! callback runs, so listeners may subscribe, unsubscribe, or trigger nested
//! notifications on the same notifier.
//!
//! # Invariants
//!
//! 1. Listeners are notified in registration order.
//! 2. Every listener registered before `notify()` starts is called exactly
//!    once for that event, even if it unsubscribes during dispatch.
//! 3. Dropping a [`Subscription`] removes the listener before the next
//!    notification cycle.
//! 4. A subscription outliving its notifier is inert (drop is a no-op).

mod notifier;

pub use notifier::{Notifier, Subscription};
