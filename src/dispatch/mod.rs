//! Dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! Setup:
//!     Dispatcher::mount(route, Handler)
//!     → route normalized, entry appended (registration order is dispatch order)
//!     → sub-dispatchers take the route as their mount path
//!
//! Per request:
//!     Dispatcher::handle(req, res)
//!     → original URL recorded (first dispatcher only)
//!     → next.rs walks entries: match → strip route → invoke
//!     → handler calls Next::run / Next::fail, returns an error, or finishes
//!     → entries exhausted → final_handler.rs (or parent dispatcher's Next)
//! ```
//!
//! # Design Decisions
//! - Handler mode is an explicit tag, not inferred from signatures
//! - Leaf handlers and sub-dispatchers share the `Routable` interface
//! - Strictly sequential: one step of the chain runs at a time per request

pub mod dispatcher;
pub mod events;
pub mod final_handler;
pub mod handler;
pub mod next;

pub use dispatcher::Dispatcher;
pub use events::{DispatchEvent, Observer};
pub use final_handler::{DefaultFinalHandler, FinalHandler};
pub use handler::{Exchange, Handler, HandlerKind, Routable};
pub use next::Next;
