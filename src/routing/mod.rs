//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration:
//!     mount path
//!     → matcher.rs (normalize: strip one trailing slash, "/" → "")
//!     → stored on the entry
//!
//! Per request:
//!     request URL
//!     → url.rs (protohost for absolute-form URLs, pathname)
//!     → matcher.rs (case-insensitive prefix + segment boundary)
//!     → match / skip
//! ```
//!
//! # Design Decisions
//! - Literal prefixes only, no wildcards or regex
//! - ASCII case-insensitive comparison
//! - A prefix only matches at a `/` or `.` boundary

pub mod matcher;
pub mod url;

pub use matcher::{normalize_route, route_matches};
pub use url::{pathname, protohost};
