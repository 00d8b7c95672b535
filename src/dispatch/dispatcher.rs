//! Ordered handler chain with mount paths.
//!
//! # Responsibilities
//! - Register handlers and sub-dispatchers under normalized mount paths
//! - Start a chain walker for each request
//! - Act as a handler itself when mounted inside another dispatcher
//!
//! # Design Decisions
//! - Entries are append-only and kept in registration order
//! - Registration is copy-on-write: a request keeps the chain it started with
//! - Registration is expected to finish before traffic starts

use std::fmt;
use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::dispatch::events::{DispatchEvent, Observer};
use crate::dispatch::final_handler::{DefaultFinalHandler, FinalHandler};
use crate::dispatch::handler::{Exchange, Handler, HandlerKind, Routable, Target};
use crate::dispatch::next::{Next, Out, Walker};
use crate::error::HandlerResult;
use crate::http::{Request, Response};
use crate::routing::normalize_route;

/// One registered handler.
#[derive(Clone)]
pub(crate) struct Entry {
    pub(crate) route: String,
    pub(crate) kind: HandlerKind,
    pub(crate) handler: Arc<dyn Routable>,
}

/// Entries plus the observers told about them.
#[derive(Clone, Default)]
pub(crate) struct Stack {
    pub(crate) entries: Vec<Entry>,
    observers: Vec<Arc<dyn Observer>>,
}

impl Stack {
    pub(crate) fn notify(&self, event: &DispatchEvent<'_>) {
        for observer in &self.observers {
            observer.notify(event);
        }
    }
}

/// Request dispatcher.
#[derive(Clone)]
pub struct Dispatcher {
    mount_path: String,
    stack: Arc<Stack>,
    final_handler: Arc<dyn FinalHandler>,
}

impl Dispatcher {
    /// Empty dispatcher mounted at `/`, finishing with [`DefaultFinalHandler`].
    pub fn new() -> Self {
        Self {
            mount_path: "/".to_string(),
            stack: Arc::new(Stack::default()),
            final_handler: Arc::new(DefaultFinalHandler::from_env()),
        }
    }

    /// Replace the final handler used by [`Dispatcher::handle`].
    pub fn with_final_handler(mut self, final_handler: impl FinalHandler + 'static) -> Self {
        self.final_handler = Arc::new(final_handler);
        self
    }

    /// Where this dispatcher is mounted inside its parent (`/` at top level).
    pub fn mount_path(&self) -> &str {
        &self.mount_path
    }

    /// Registered routes and kinds, in order.
    pub fn routes(&self) -> impl Iterator<Item = (&str, HandlerKind)> {
        self.stack
            .entries
            .iter()
            .map(|entry| (entry.route.as_str(), entry.kind))
    }

    /// Register `handler` under `route`.
    pub fn mount(&mut self, route: &str, handler: impl Into<Handler>) -> &mut Self {
        let handler = handler.into();
        let routable: Arc<dyn Routable> = match handler.target {
            Target::Leaf(routable) => routable,
            Target::Dispatcher(mut sub) => {
                sub.mount_path = route.to_string();
                Arc::new(sub) as Arc<dyn Routable>
            }
        };

        let entry = Entry {
            route: normalize_route(route),
            kind: handler.kind,
            handler: routable,
        };

        tracing::debug!(route = %entry.route, kind = %entry.kind, "Handler registered");

        let stack = Arc::make_mut(&mut self.stack);
        stack.notify(&DispatchEvent::Registered {
            route: &entry.route,
            kind: entry.kind,
        });
        stack.entries.push(entry);
        self
    }

    /// Register `handler` at the root.
    pub fn add(&mut self, handler: impl Into<Handler>) -> &mut Self {
        self.mount("/", handler)
    }

    /// Attach an observer. It sees events from this point on.
    pub fn observe(&mut self, observer: Arc<dyn Observer>) -> &mut Self {
        Arc::make_mut(&mut self.stack).observers.push(observer);
        self
    }

    /// Dispatch a request, finishing with the configured final handler.
    pub async fn handle(&self, req: &mut Request, res: &mut Response) {
        self.handle_with(req, res, Arc::clone(&self.final_handler))
            .await;
    }

    /// Dispatch a request, finishing with `final_handler`.
    pub async fn handle_with(
        &self,
        req: &mut Request,
        res: &mut Response,
        final_handler: Arc<dyn FinalHandler>,
    ) {
        req.snapshot_original_url();
        let walker = Walker::new(Arc::clone(&self.stack), req, Out::Final(final_handler));
        walker.advance(req, res, None).await;
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("mount_path", &self.mount_path)
            .field("routes", &self.routes().collect::<Vec<_>>())
            .finish()
    }
}

impl Routable for Dispatcher {
    fn dispatch<'a>(&'a self, cx: Exchange<'a>, next: Next) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            cx.req.snapshot_original_url();
            let walker = Walker::new(Arc::clone(&self.stack), cx.req, Out::Parent(next));
            walker.advance(cx.req, cx.res, None).await;
            Ok(())
        })
    }
}
