//! Per-request chain walker and its continuation.
//!
//! # Flow
//! ```text
//! advance(err)
//!     → restore URL to this dispatcher's mount depth
//!     → next entry (none left → yield, then final handler / parent continuation)
//!     → kind gate (request vs error mode), path match, boundary check
//!     → strip the route from the URL
//!     → invoke handler with a fresh `Next`
//!     → handler returned an error without continuing → advance(that error)
//! ```
//!
//! # Design Decisions
//! - Skipped entries are walked in a loop; the call depth only grows with
//!   handlers that actually continue the chain
//! - Panics inside a handler become the pending error
//! - Reaching the end always yields to the scheduler before finishing

use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::future::BoxFuture;
use futures_util::FutureExt;

use crate::dispatch::dispatcher::Stack;
use crate::dispatch::events::DispatchEvent;
use crate::dispatch::final_handler::FinalHandler;
use crate::dispatch::handler::Exchange;
use crate::error::DispatchError;
use crate::http::{Request, Response};
use crate::routing::{pathname, protohost, route_matches};

/// Where control goes once a dispatcher runs out of entries.
pub(crate) enum Out {
    Final(Arc<dyn FinalHandler>),
    Parent(Next),
}

/// Cursor over one dispatcher's entries for one request.
pub(crate) struct Walker {
    stack: Arc<Stack>,
    index: usize,
    protohost: Option<String>,
    base_depth: usize,
    out: Out,
}

impl Walker {
    pub(crate) fn new(stack: Arc<Stack>, req: &Request, out: Out) -> Self {
        Self {
            stack,
            index: 0,
            protohost: protohost(req.url()).map(str::to_string),
            base_depth: req.mount_depth(),
            out,
        }
    }

    pub(crate) async fn advance(
        self,
        req: &mut Request,
        res: &mut Response,
        mut err: Option<DispatchError>,
    ) {
        let mut walker = self;
        req.unmount_to(walker.base_depth);

        loop {
            let Some(entry) = walker.stack.entries.get(walker.index).cloned() else {
                walker.finish(req, res, err).await;
                return;
            };
            walker.index += 1;

            if !entry.kind.accepts(err.is_some()) {
                continue;
            }

            let host = walker.protohost.as_deref();
            if !route_matches(&entry.route, pathname(req.url(), host)) {
                tracing::trace!(route = %entry.route, url = %req.url(), "Entry skipped, no match");
                continue;
            }

            if !entry.route.is_empty() && entry.route != "/" {
                req.push_mount(host.unwrap_or(""), entry.route.len());
            }

            tracing::debug!(
                route = %entry.route,
                kind = %entry.kind,
                url = %req.url(),
                "Invoking handler"
            );
            walker.stack.notify(&DispatchEvent::Invoked {
                route: &entry.route,
                kind: entry.kind,
            });

            let base_depth = walker.base_depth;
            let slot = Arc::new(Mutex::new(Some(walker)));
            let next = Next {
                slot: Arc::clone(&slot),
            };
            let cx = Exchange {
                req: &mut *req,
                res: &mut *res,
                error: err.take(),
            };

            let outcome = AssertUnwindSafe(entry.handler.dispatch(cx, next))
                .catch_unwind()
                .await;
            let raised = match outcome {
                Ok(Ok(())) => None,
                Ok(Err(e)) => Some(e),
                Err(payload) => {
                    let e = DispatchError::from_panic(payload);
                    tracing::debug!(route = %entry.route, error = %e, "Handler panicked");
                    Some(e)
                }
            };

            let reclaimed = lock(&slot).take();
            match (reclaimed, raised) {
                (Some(w), Some(e)) => {
                    walker = w;
                    req.unmount_to(walker.base_depth);
                    err = Some(e);
                }
                (None, Some(e)) => {
                    tracing::warn!(
                        route = %entry.route,
                        error = %e,
                        "Handler failed after passing control on; error dropped"
                    );
                    req.unmount_to(base_depth);
                    return;
                }
                (_, None) => {
                    req.unmount_to(base_depth);
                    return;
                }
            }
        }
    }

    async fn finish(self, req: &mut Request, res: &mut Response, err: Option<DispatchError>) {
        // Never finish inside the frame that discovered exhaustion.
        tokio::task::yield_now().await;

        tracing::debug!(
            url = %req.url(),
            error = err.as_ref().map(tracing::field::display),
            "Dispatcher exhausted"
        );
        self.stack
            .notify(&DispatchEvent::Exhausted { error: err.as_ref() });

        match self.out {
            Out::Final(done) => done.finish(req, res, err),
            Out::Parent(next) => next.resume(req, res, err).await,
        }
    }
}

/// Continuation for one step of the chain.
///
/// Consumed by value: a handler passes control on at most once.
pub struct Next {
    slot: Arc<Mutex<Option<Walker>>>,
}

impl Next {
    /// Continue with the next matching request handler.
    pub async fn run(self, req: &mut Request, res: &mut Response) {
        self.resume(req, res, None).await;
    }

    /// Continue in error mode with `err` pending.
    pub async fn fail(self, req: &mut Request, res: &mut Response, err: DispatchError) {
        self.resume(req, res, Some(err)).await;
    }

    /// Continue with an optional pending error.
    ///
    /// While downstream entries run the URL is restored to this dispatcher's view;
    /// when this returns the caller's mounted view is back in place.
    pub fn resume<'a>(
        self,
        req: &'a mut Request,
        res: &'a mut Response,
        err: Option<DispatchError>,
    ) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            let walker = lock(&self.slot).take();
            let Some(walker) = walker else {
                tracing::warn!(url = %req.url(), "Continuation resumed after its step completed");
                return;
            };

            let base_depth = walker.base_depth;
            let held = req.unmount_to(base_depth);
            walker.advance(req, res, err).await;
            req.unmount_to(base_depth);
            req.remount(held);
        })
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
