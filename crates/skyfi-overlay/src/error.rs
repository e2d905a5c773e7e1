#![forbid(unsafe_code)]

//! Errors surfaced by overlay interactions.
//!
//! The registry and host never fail loudly: duplicate ids and repeated
//! closes are logged no-ops. Errors only reach code that awaits an outcome,
//! either a `done()` future or a [`Launch`](crate::Launch) future.

use std::fmt;

use crate::modal::ModalId;

/// Boxed error returned by asynchronous `on_done` handlers.
pub type BoxError = Box<dyn std::error::Error + 'static>;

/// Errors from awaiting an overlay outcome.
#[derive(Debug)]
pub enum ModalError {
    /// The overlay was dismissed and the launcher rejects on cancel.
    Cancelled,
    /// The overlay went away without settling (host or registry dropped,
    /// or an asynchronous `on_done` dropped before it finished).
    Abandoned,
    /// The `on_done` handler failed. The overlay was still removed.
    Done(BoxError),
    /// A completion payload did not match the request's payload type.
    PayloadMismatch { id: ModalId },
    /// A launch targeted an id that already had an overlay; the existing
    /// overlay was left untouched.
    AlreadyOpen { id: ModalId },
}

impl ModalError {
    /// True for [`ModalError::Cancelled`].
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl fmt::Display for ModalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => f.write_str("overlay dismissed without completing"),
            Self::Abandoned => f.write_str("overlay removed before settling"),
            Self::Done(err) => write!(f, "completion handler failed: {err}"),
            Self::PayloadMismatch { id } => {
                write!(f, "completion payload type mismatch for modal '{id}'")
            }
            Self::AlreadyOpen { id } => write!(f, "modal '{id}' is already open"),
        }
    }
}

impl std::error::Error for ModalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Done(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<skyfi_runtime::Abandoned> for ModalError {
    fn from(_: skyfi_runtime::Abandoned) -> Self {
        Self::Abandoned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn done_exposes_source() {
        let inner: BoxError = "activation rejected".into();
        let err = ModalError::Done(inner);
        assert_eq!(
            err.to_string(),
            "completion handler failed: activation rejected"
        );
        assert_eq!(
            err.source().map(|s| s.to_string()),
            Some("activation rejected".to_string())
        );
    }

    #[test]
    fn mismatch_names_modal() {
        let err = ModalError::PayloadMismatch {
            id: ModalId::from("kyc-camera"),
        };
        assert!(err.to_string().contains("kyc-camera"));
        assert!(err.source().is_none());
    }

    #[test]
    fn abandoned_converts() {
        let err: ModalError = skyfi_runtime::Abandoned.into();
        assert!(matches!(err, ModalError::Abandoned));
        assert!(!err.is_cancelled());
        assert!(ModalError::Cancelled.is_cancelled());
    }
}
