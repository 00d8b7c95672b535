//! Prefix-mounted request dispatch.
//!
//! A [`Dispatcher`] holds an ordered chain of handlers, each mounted at a
//! path prefix. A request walks the chain in registration order; only
//! entries whose prefix matches the request path run, and each sees the
//! URL with its prefix stripped. Handlers pass control on through [`Next`],
//! optionally with an error, which switches the rest of the walk to error
//! handlers only. Dispatchers mount inside dispatchers.
//!
//! ```text
//!     request ──▶ Dispatcher::handle
//!                   │
//!                   ├─ "/"      logger          (request)
//!                   ├─ "/api"   Dispatcher ─────┬─ "/users"  handler
//!                   │                           └─ "/"       error handler
//!                   ├─ "/"      error handler   (error)
//!                   └─ end ──▶ FinalHandler (404 / error page)
//! ```

pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::ServerConfig;
pub use dispatch::{
    DefaultFinalHandler, DispatchEvent, Dispatcher, Exchange, FinalHandler, Handler, HandlerKind,
    Next, Observer, Routable,
};
pub use error::{BoxError, DispatchError, HandlerResult};
pub use http::{HttpServer, Request, Response};
pub use lifecycle::Shutdown;
