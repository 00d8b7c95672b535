//! Pending-error type threaded through a dispatch chain.

use std::any::Any;

use axum::http::StatusCode;
use thiserror::Error;

/// Boxed error accepted from application handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result returned by every handler.
pub type HandlerResult = Result<(), DispatchError>;

/// Errors that travel down the chain once a handler signals failure.
///
/// A pending error is modelled as `Option<DispatchError>`; `None` is the only
/// "no error" state.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Application error that chose its own HTTP status.
    #[error("{message}")]
    Status { status: StatusCode, message: String },

    /// A handler panicked while it was being invoked.
    #[error("handler panicked: {0}")]
    Panicked(String),

    /// Any other application error.
    #[error(transparent)]
    Handler(BoxError),
}

impl DispatchError {
    /// Error carrying an explicit status.
    pub fn status(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    /// Wrap an arbitrary application error.
    pub fn other(err: impl Into<BoxError>) -> Self {
        Self::Handler(err.into())
    }

    /// Convert a caught panic payload.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self::Panicked(message)
    }

    /// The status this error asks for, if it is a client or server error status.
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } if status.is_client_error() || status.is_server_error() => {
                Some(*status)
            }
            _ => None,
        }
    }
}

impl From<serde_json::Error> for DispatchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Handler(Box::new(err))
    }
}
