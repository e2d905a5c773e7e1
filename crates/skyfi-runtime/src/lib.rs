#![forbid(unsafe_code)]

//! Runtime primitives shared by the SkyFi overlay stack.
//!
//! This crate provides:
//! - [`reactive`]: synchronous change notification with RAII [`Subscription`]s
//! - [`deferred`]: single-settlement values that can be awaited
//!   ([`Deferred`], [`Pending`], [`SettleOnce`])
//! - [`logging`]: tracing subscriber bootstrap (feature `log-init`)
//!
//! Everything here is single-threaded (`Rc`-based) and matches the
//! cooperative event-loop model of a UI thread.

pub mod deferred;
#[cfg(feature = "log-init")]
pub mod logging;
pub mod reactive;

pub use deferred::{Abandoned, Deferred, Pending, SettleOnce, Settler};
pub use reactive::{Notifier, Subscription};
