//! Handler shapes accepted by a dispatcher.

use std::fmt;
use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::dispatch::dispatcher::Dispatcher;
use crate::dispatch::next::Next;
use crate::error::{DispatchError, HandlerResult};
use crate::http::{Request, Response};

/// Which mode an entry runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    /// Invoked while no error is pending.
    Request,
    /// Invoked only while an error is pending.
    Error,
}

impl HandlerKind {
    /// Whether an entry of this kind runs given the current pending-error state.
    pub fn accepts(self, error_pending: bool) -> bool {
        match self {
            HandlerKind::Request => !error_pending,
            HandlerKind::Error => error_pending,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HandlerKind::Request => "request",
            HandlerKind::Error => "error",
        }
    }
}

impl fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a handler is given for one step of the chain.
pub struct Exchange<'a> {
    pub req: &'a mut Request,
    pub res: &'a mut Response,
    /// The pending error. Always `Some` for error handlers, `None` otherwise.
    pub error: Option<DispatchError>,
}

/// Anything that can sit in a dispatcher's chain.
///
/// Implemented by leaf handlers and by [`Dispatcher`] itself, so sub-dispatchers
/// mount exactly like plain handlers.
pub trait Routable: Send + Sync {
    /// Handle one step. Call `next` to pass control to the following matching entry;
    /// returning an error without calling it makes that error pending.
    fn dispatch<'a>(&'a self, cx: Exchange<'a>, next: Next) -> BoxFuture<'a, HandlerResult>;
}

/// Request-mode handler built from a closure.
struct RequestFn<F>(F);

impl<F> Routable for RequestFn<F>
where
    F: for<'a> Fn(&'a mut Request, &'a mut Response, Next) -> BoxFuture<'a, HandlerResult>
        + Send
        + Sync,
{
    fn dispatch<'a>(&'a self, cx: Exchange<'a>, next: Next) -> BoxFuture<'a, HandlerResult> {
        (self.0)(cx.req, cx.res, next)
    }
}

/// Error-mode handler built from a closure.
struct ErrorFn<F>(F);

impl<F> Routable for ErrorFn<F>
where
    F: for<'a> Fn(DispatchError, &'a mut Request, &'a mut Response, Next) -> BoxFuture<'a, HandlerResult>
        + Send
        + Sync,
{
    fn dispatch<'a>(&'a self, cx: Exchange<'a>, next: Next) -> BoxFuture<'a, HandlerResult> {
        match cx.error {
            Some(err) => (self.0)(err, cx.req, cx.res, next),
            // Not reachable through a dispatcher; behave like a pass-through.
            None => Box::pin(async move {
                next.run(cx.req, cx.res).await;
                Ok(())
            }),
        }
    }
}

pub(crate) enum Target {
    Leaf(Arc<dyn Routable>),
    Dispatcher(Dispatcher),
}

/// A registration: a routable target tagged with the mode it runs in.
pub struct Handler {
    pub(crate) kind: HandlerKind,
    pub(crate) target: Target,
}

impl Handler {
    /// Tag an existing routable.
    pub fn new(kind: HandlerKind, routable: Arc<dyn Routable>) -> Self {
        Self {
            kind,
            target: Target::Leaf(routable),
        }
    }

    /// Request-mode handler from a closure.
    ///
    /// ```ignore
    /// Handler::request(|req, res, next| Box::pin(async move {
    ///     next.run(req, res).await;
    ///     Ok(())
    /// }))
    /// ```
    pub fn request<F>(f: F) -> Self
    where
        F: for<'a> Fn(&'a mut Request, &'a mut Response, Next) -> BoxFuture<'a, HandlerResult>
            + Send
            + Sync
            + 'static,
    {
        Self::new(HandlerKind::Request, Arc::new(RequestFn(f)))
    }

    /// Error-mode handler from a closure. It receives the pending error by value;
    /// calling `next.run` clears it, `next.fail` passes it (or another) along.
    pub fn error<F>(f: F) -> Self
    where
        F: for<'a> Fn(DispatchError, &'a mut Request, &'a mut Response, Next) -> BoxFuture<'a, HandlerResult>
            + Send
            + Sync
            + 'static,
    {
        Self::new(HandlerKind::Error, Arc::new(ErrorFn(f)))
    }

    pub fn kind(&self) -> HandlerKind {
        self.kind
    }
}

impl From<Dispatcher> for Handler {
    fn from(dispatcher: Dispatcher) -> Self {
        Self {
            kind: HandlerKind::Request,
            target: Target::Dispatcher(dispatcher),
        }
    }
}
