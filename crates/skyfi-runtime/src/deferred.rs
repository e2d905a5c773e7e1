#![forbid(unsafe_code)]

//! Single-settlement values that can be awaited.
//!
//! A [`Deferred`] splits into a [`Settler`] (write side) and a [`Pending`]
//! future (read side). It is the building block for call sites that want to
//! `await` the outcome of a callback-driven interaction.
//!
//! # Invariants
//!
//! 1. A value is delivered at most once: [`Settler::settle`] consumes the
//!    settler, and [`SettleOnce`] ignores every settle after the first.
//! 2. [`Pending`] resolves exactly once: with the settled value, or with
//!    [`Abandoned`] when every settler is dropped without settling.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Settler dropped | Owner torn down before settling | `Pending` yields `Err(Abandoned)` |
//! | Pending dropped | Caller stopped waiting | `settle` returns `false` |
//! | Second settle | Duplicate callback | `SettleOnce::settle` returns `false` |

use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use futures::channel::oneshot;

/// The settling side went away without delivering a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Abandoned;

impl fmt::Display for Abandoned {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("deferred value abandoned before settlement")
    }
}

impl std::error::Error for Abandoned {}

/// Constructor namespace for a settler/pending pair.
pub struct Deferred;

impl Deferred {
    /// Create a linked settler and pending future.
    #[must_use]
    pub fn new<T>() -> (Settler<T>, Pending<T>) {
        let (tx, rx) = oneshot::channel();
        (Settler { tx }, Pending { rx })
    }
}

/// Write side of a deferred value.
pub struct Settler<T> {
    tx: oneshot::Sender<T>,
}

impl<T> Settler<T> {
    /// Deliver the value. Returns `false` if nobody is waiting anymore.
    pub fn settle(self, value: T) -> bool {
        self.tx.send(value).is_ok()
    }

    /// Whether the pending side has been dropped.
    #[must_use]
    pub fn is_abandoned(&self) -> bool {
        self.tx.is_canceled()
    }
}

impl<T> fmt::Debug for Settler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settler")
            .field("abandoned", &self.is_abandoned())
            .finish()
    }
}

/// Read side of a deferred value.
#[must_use = "futures do nothing unless awaited"]
pub struct Pending<T> {
    rx: oneshot::Receiver<T>,
}

impl<T> Future for Pending<T> {
    type Output = Result<T, Abandoned>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map_err(|_| Abandoned)
    }
}

impl<T> fmt::Debug for Pending<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pending").finish_non_exhaustive()
    }
}

/// Shareable settler where only the first `settle` wins.
///
/// Clones share the same slot, so several callbacks (for example a "done"
/// and a "cancel" path) can race to settle one [`Pending`].
pub struct SettleOnce<T> {
    slot: Rc<RefCell<Option<Settler<T>>>>,
}

impl<T> Clone for SettleOnce<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
        }
    }
}

impl<T> SettleOnce<T> {
    /// Wrap a settler for shared use.
    #[must_use]
    pub fn new(settler: Settler<T>) -> Self {
        Self {
            slot: Rc::new(RefCell::new(Some(settler))),
        }
    }

    /// Settle with `value` if nothing settled yet.
    ///
    /// Returns `true` only when this call delivered the value.
    pub fn settle(&self, value: T) -> bool {
        let settler = self.slot.borrow_mut().take();
        match settler {
            Some(settler) => settler.settle(value),
            None => false,
        }
    }

    /// Whether a settle already happened (or was attempted).
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.slot.borrow().is_none()
    }
}

impl<T> fmt::Debug for SettleOnce<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettleOnce")
            .field("settled", &self.is_settled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use futures::executor::block_on;
    use proptest::prelude::*;

    #[test]
    fn settled_value_is_delivered() {
        let (settler, pending) = Deferred::new::<u32>();
        assert!(settler.settle(42));
        assert_eq!(block_on(pending), Ok(42));
    }

    #[test]
    fn dropped_settler_abandons() {
        let (settler, pending) = Deferred::new::<u32>();
        drop(settler);
        assert_eq!(block_on(pending), Err(Abandoned));
    }

    #[test]
    fn settle_after_pending_dropped_reports_false() {
        let (settler, pending) = Deferred::new::<u32>();
        drop(pending);
        assert!(settler.is_abandoned());
        assert!(!settler.settle(1));
    }

    #[test]
    fn pending_is_not_ready_before_settle() {
        let (settler, mut pending) = Deferred::new::<&str>();
        assert!((&mut pending).now_or_never().is_none());
        settler.settle("ok");
        assert_eq!(pending.now_or_never(), Some(Ok("ok")));
    }

    #[test]
    fn settle_once_first_wins() {
        let (settler, pending) = Deferred::new::<&str>();
        let once = SettleOnce::new(settler);
        let other = once.clone();

        assert!(once.settle("done"));
        assert!(!other.settle("cancel"));
        assert!(other.is_settled());
        assert_eq!(block_on(pending), Ok("done"));
    }

    #[test]
    fn settle_once_dropped_unsettled_abandons() {
        let (settler, pending) = Deferred::new::<()>();
        let once = SettleOnce::new(settler);
        let clone = once.clone();
        drop(once);
        drop(clone);
        assert_eq!(block_on(pending), Err(Abandoned));
    }

    proptest! {
        #[test]
        fn settle_once_delivers_exactly_first(values in proptest::collection::vec(any::<i32>(), 1..16)) {
            let (settler, pending) = Deferred::new::<i32>();
            let once = SettleOnce::new(settler);

            let delivered: Vec<bool> = values.iter().map(|v| once.settle(*v)).collect();
            prop_assert!(delivered[0]);
            prop_assert!(delivered[1..].iter().all(|d| !d));
            prop_assert_eq!(block_on(pending), Ok(values[0]));
        }
    }
}
