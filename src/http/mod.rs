//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum setup, request ID, tracing, timeout)
//!     → request.rs (build the dispatch request context)
//!     → Dispatcher::handle
//!     → response.rs (collected response → axum response)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{Mount, Request, X_REQUEST_ID};
pub use response::Response;
pub use server::HttpServer;
