//! Response under construction.
//!
//! # Responsibilities
//! - Collect status, headers and body written by handlers
//! - Track whether the exchange has been finalized
//! - Convert into an axum response once the chain is done
//!
//! # Design Decisions
//! - Bodies are buffered; handlers in a middleware chain write whole responses
//! - Once finished, further writes are ignored and logged

use axum::body::{Body, Bytes};
use axum::http::header::{self, HeaderName, HeaderValue};
use axum::http::{HeaderMap, StatusCode};
use serde::Serialize;

use crate::error::DispatchError;

/// Response written by handlers.
#[derive(Debug, Default)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    finished: bool,
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) -> &mut Self {
        self.status = status;
        self
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Insert a header, replacing any previous value.
    pub fn insert_header(&mut self, name: HeaderName, value: HeaderValue) -> &mut Self {
        self.headers.insert(name, value);
        self
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// True once a handler (or the final handler) has completed the response.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Write the body and finish the response.
    pub fn send(&mut self, body: impl Into<Bytes>) {
        if self.finished {
            tracing::warn!(status = %self.status, "Write to finished response ignored");
            return;
        }
        self.body = body.into();
        self.finished = true;
    }

    /// Finish the response without a body.
    pub fn end(&mut self) {
        self.send(Bytes::new());
    }

    /// Serialize `value` as the JSON body and finish the response.
    pub fn json<T: Serialize>(&mut self, value: &T) -> Result<(), DispatchError> {
        if self.finished {
            tracing::warn!("json body ignored, response already finished");
            return Ok(());
        }
        let body = serde_json::to_vec(value)?;
        self.headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        self.send(body);
        Ok(())
    }

    /// Convert into an HTTP response.
    pub fn into_http(self) -> axum::response::Response {
        let mut response = axum::response::Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}
