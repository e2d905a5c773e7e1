#![forbid(unsafe_code)]

//! Overlay requests and their type-erased registry form.
//!
//! A [`ModalRequest<T>`] is built by the caller with a payload type `T`
//! (what `done` delivers). When registered, the request is erased into a
//! descriptor so one registry can hold requests of any payload type; the
//! payload type is restored with a checked downcast when `done` fires.

use std::any::Any;
use std::fmt;
use std::future::Future;

use futures::FutureExt;
use futures::future::LocalBoxFuture;

use crate::error::{BoxError, ModalError};
use crate::modal::AnimationKind;
use crate::modal::controls::{Controls, ModalControls};
use crate::modal::id::ModalId;
use crate::view::View;

/// Which presentation shell renders the content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalKind {
    /// Centered dialog box.
    #[default]
    Dialog,
    /// Sheet anchored to the bottom edge.
    BottomSheet,
}

/// Shell configuration carried by a request.
///
/// Registry and host pass this through untouched; only the shell reads it.
/// Unset fields fall back to the host's [`OverlayConfig`](crate::OverlayConfig).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShellOptions {
    /// Whether tapping the backdrop closes the overlay.
    pub close_on_backdrop: bool,
    /// Bottom-sheet height as a fraction of screen height.
    pub max_height: Option<f32>,
    /// Dialog transition style.
    pub animation: Option<AnimationKind>,
}

impl Default for ShellOptions {
    fn default() -> Self {
        Self {
            close_on_backdrop: true,
            max_height: None,
            animation: None,
        }
    }
}

impl ShellOptions {
    pub fn close_on_backdrop(mut self, close: bool) -> Self {
        self.close_on_backdrop = close;
        self
    }

    pub fn max_height(mut self, fraction: f32) -> Self {
        self.max_height = Some(fraction);
        self
    }

    pub fn animation(mut self, animation: AnimationKind) -> Self {
        self.animation = Some(animation);
        self
    }
}

/// Factory form of content: receives the overlay's controls once.
pub type ContentFactory<T> = Box<dyn FnOnce(ModalControls<T>) -> Box<dyn View>>;

/// Overlay content, resolved at registration time.
pub enum Content<T: 'static> {
    /// A fixed render tree. It cannot close itself; only the shell can.
    Static(Box<dyn View>),
    /// Built exactly once, when the host first materializes the overlay.
    Factory(ContentFactory<T>),
}

impl<T: 'static> Content<T> {
    pub fn view(view: impl View + 'static) -> Self {
        Self::Static(Box::new(view))
    }

    pub fn factory<V, F>(factory: F) -> Self
    where
        V: View + 'static,
        F: FnOnce(ModalControls<T>) -> V + 'static,
    {
        Self::Factory(Box::new(
            move |controls: ModalControls<T>| -> Box<dyn View> { Box::new(factory(controls)) },
        ))
    }
}

impl<T: 'static> fmt::Debug for Content<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(_) => f.write_str("Content::Static"),
            Self::Factory(_) => f.write_str("Content::Factory"),
        }
    }
}

type DoneHandler<T> = Box<dyn FnOnce(T) -> LocalBoxFuture<'static, Result<(), BoxError>>>;

/// A request to show an overlay, with payload type `T`.
///
/// # Example
///
/// ```ignore
/// let request = ModalRequest::<String>::factory(|controls| QrScannerView::new(controls))
///     .id("kyc-qr")
///     .on_done(|code| println!("scanned {code}"))
///     .on_close(|| println!("cancelled"));
/// registry.open(request);
/// ```
pub struct ModalRequest<T: 'static = ()> {
    pub(crate) id: Option<ModalId>,
    pub(crate) kind: ModalKind,
    content: Content<T>,
    on_close: Option<Box<dyn FnOnce()>>,
    on_done: Option<DoneHandler<T>>,
    close_button: bool,
    options: ShellOptions,
}

impl<T: 'static> ModalRequest<T> {
    /// Create a dialog request for `content`.
    pub fn new(content: Content<T>) -> Self {
        Self {
            id: None,
            kind: ModalKind::Dialog,
            content,
            on_close: None,
            on_done: None,
            close_button: false,
            options: ShellOptions::default(),
        }
    }

    /// Request with static content.
    pub fn view(view: impl View + 'static) -> Self {
        Self::new(Content::view(view))
    }

    /// Request with factory content.
    pub fn factory<V, F>(factory: F) -> Self
    where
        V: View + 'static,
        F: FnOnce(ModalControls<T>) -> V + 'static,
    {
        Self::new(Content::factory(factory))
    }

    /// Use a caller-chosen id. Opening twice under one id is a no-op.
    pub fn id(mut self, id: impl Into<ModalId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn kind(mut self, kind: ModalKind) -> Self {
        self.kind = kind;
        self
    }

    /// Called when the overlay is dismissed without completing.
    pub fn on_close(mut self, on_close: impl FnOnce() + 'static) -> Self {
        self.on_close = Some(Box::new(on_close));
        self
    }

    /// Called with the payload when the content completes.
    pub fn on_done(mut self, on_done: impl FnOnce(T) + 'static) -> Self {
        self.on_done = Some(Box::new(move |payload: T| {
            on_done(payload);
            futures::future::ready(Ok::<(), BoxError>(())).boxed_local()
        }));
        self
    }

    /// Asynchronous completion handler. The overlay is removed after the
    /// returned future settles, whether it succeeds or fails.
    pub fn on_done_async<F, Fut>(mut self, on_done: F) -> Self
    where
        F: FnOnce(T) -> Fut + 'static,
        Fut: Future<Output = Result<(), BoxError>> + 'static,
    {
        self.on_done = Some(Box::new(move |payload: T| on_done(payload).boxed_local()));
        self
    }

    /// Ask the dialog shell to draw a close button.
    pub fn close_button(mut self, show: bool) -> Self {
        self.close_button = show;
        self
    }

    pub fn options(mut self, options: ShellOptions) -> Self {
        self.options = options;
        self
    }

    /// Erase the payload type for storage in the registry.
    pub(crate) fn into_descriptor(self, id: ModalId, serial: u64) -> Descriptor {
        let Self {
            id: _,
            kind,
            content,
            on_close,
            on_done,
            close_button,
            options,
        } = self;

        let materializer: Materializer = match content {
            Content::Static(view) => Box::new(move |_controls: Controls| view),
            Content::Factory(factory) => {
                Box::new(move |controls: Controls| factory(ModalControls::new(controls)))
            }
        };

        let on_done = on_done.map(|handler| -> ErasedDone {
            let id = id.clone();
            Box::new(move |payload: Box<dyn Any>| match payload.downcast::<T>() {
                Ok(value) => handler(*value)
                    .map(|result| result.map_err(ModalError::Done))
                    .boxed_local(),
                Err(_) => futures::future::ready(Err(ModalError::PayloadMismatch { id }))
                    .boxed_local(),
            })
        });

        Descriptor {
            id,
            serial,
            kind,
            options,
            close_button,
            materializer: Some(materializer),
            callbacks: Some(Callbacks { on_close, on_done }),
        }
    }
}

impl<T: 'static> fmt::Debug for ModalRequest<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalRequest")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("content", &self.content)
            .field("on_close", &self.on_close.is_some())
            .field("on_done", &self.on_done.is_some())
            .field("close_button", &self.close_button)
            .field("options", &self.options)
            .finish()
    }
}

pub(crate) type Materializer = Box<dyn FnOnce(Controls) -> Box<dyn View>>;
pub(crate) type ErasedDone =
    Box<dyn FnOnce(Box<dyn Any>) -> LocalBoxFuture<'static, Result<(), ModalError>>>;

/// Completion callbacks, taken together when the overlay starts settling.
pub(crate) struct Callbacks {
    pub(crate) on_close: Option<Box<dyn FnOnce()>>,
    pub(crate) on_done: Option<ErasedDone>,
}

/// Type-erased registry entry.
pub(crate) struct Descriptor {
    pub(crate) id: ModalId,
    /// Distinguishes successive registrations under one id.
    pub(crate) serial: u64,
    pub(crate) kind: ModalKind,
    pub(crate) options: ShellOptions,
    pub(crate) close_button: bool,
    /// `None` once the host has materialized the content.
    pub(crate) materializer: Option<Materializer>,
    /// `None` once a close/done has started settling.
    pub(crate) callbacks: Option<Callbacks>,
}

/// What the host needs to build a render entry.
pub(crate) struct PendingContent {
    pub(crate) serial: u64,
    pub(crate) kind: ModalKind,
    pub(crate) options: ShellOptions,
    pub(crate) close_button: bool,
    pub(crate) materializer: Materializer,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Frame;
    use crate::geometry::Rect;
    use futures::executor::block_on;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Stub;

    impl View for Stub {
        fn render(&self, _area: Rect, _frame: &mut Frame) {}
    }

    #[test]
    fn defaults() {
        let request = ModalRequest::<()>::view(Stub);
        assert_eq!(request.kind, ModalKind::Dialog);
        assert!(request.id.is_none());
        assert!(request.options.close_on_backdrop);
        assert_eq!(request.options.max_height, None);
    }

    #[test]
    fn builder_sets_fields() {
        let request = ModalRequest::<u8>::view(Stub)
            .id("addr")
            .kind(ModalKind::BottomSheet)
            .close_button(true)
            .options(ShellOptions::default().close_on_backdrop(false).max_height(0.7));
        assert_eq!(request.id, Some(ModalId::from("addr")));
        assert_eq!(request.kind, ModalKind::BottomSheet);
        assert!(request.close_button);
        assert!(!request.options.close_on_backdrop);
        assert_eq!(request.options.max_height, Some(0.7));
    }

    #[test]
    fn erased_done_restores_payload() {
        let seen = Rc::new(RefCell::new(None));
        let s = Rc::clone(&seen);
        let descriptor = ModalRequest::<u32>::view(Stub)
            .on_done(move |v| *s.borrow_mut() = Some(v))
            .into_descriptor(ModalId::from("m"), 1);

        let on_done = descriptor
            .callbacks
            .and_then(|c| c.on_done)
            .expect("handler registered");
        assert!(block_on(on_done(Box::new(42u32))).is_ok());
        assert_eq!(*seen.borrow(), Some(42));
    }

    #[test]
    fn erased_done_rejects_wrong_payload_type() {
        let descriptor = ModalRequest::<u32>::view(Stub)
            .on_done(|_| {})
            .into_descriptor(ModalId::from("m"), 1);
        let on_done = descriptor
            .callbacks
            .and_then(|c| c.on_done)
            .expect("handler registered");

        let result = block_on(on_done(Box::new("not a u32")));
        assert!(matches!(result, Err(ModalError::PayloadMismatch { .. })));
    }

    #[test]
    fn async_done_error_is_wrapped() {
        let descriptor = ModalRequest::<()>::view(Stub)
            .on_done_async(|()| async { Err::<(), BoxError>("backend down".into()) })
            .into_descriptor(ModalId::from("m"), 1);
        let on_done = descriptor
            .callbacks
            .and_then(|c| c.on_done)
            .expect("handler registered");

        match block_on(on_done(Box::new(()))) {
            Err(ModalError::Done(err)) => assert_eq!(err.to_string(), "backend down"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn debug_hides_closures() {
        let request = ModalRequest::<()>::view(Stub).on_close(|| {});
        let debug = format!("{request:?}");
        assert!(debug.contains("on_close: true"));
        assert!(debug.contains("Content::Static"));
    }
}
