//! End-of-chain handling.
//!
//! # Responsibilities
//! - Finalize responses no handler completed (404)
//! - Turn unhandled errors into an error status page
//! - Log unhandled errors outside of test runs
//!
//! # Design Decisions
//! - Production responses never reveal error detail, only the status reason
//! - A response that is already finished is left alone
//! - The 404 message names the path the client asked for, not the mounted view

use axum::http::header::{self, HeaderValue};
use axum::http::{Method, StatusCode};

use crate::config::Environment;
use crate::error::DispatchError;
use crate::http::{Request, Response};
use crate::routing::{pathname, protohost};

/// Invoked once when a chain runs out of entries.
///
/// Must fully finalize the response and must not panic.
pub trait FinalHandler: Send + Sync {
    fn finish(&self, req: &mut Request, res: &mut Response, err: Option<DispatchError>);
}

impl<F> FinalHandler for F
where
    F: Fn(&mut Request, &mut Response, Option<DispatchError>) + Send + Sync,
{
    fn finish(&self, req: &mut Request, res: &mut Response, err: Option<DispatchError>) {
        self(req, res, err)
    }
}

/// Writes a 404 or error page.
#[derive(Debug, Clone, Copy)]
pub struct DefaultFinalHandler {
    environment: Environment,
}

impl DefaultFinalHandler {
    pub fn new(environment: Environment) -> Self {
        Self { environment }
    }

    /// Use the environment named by `DISPATCH_ENV`.
    pub fn from_env() -> Self {
        Self::new(Environment::from_env().unwrap_or_default())
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    fn status_and_message(
        &self,
        req: &Request,
        res: &Response,
        err: Option<&DispatchError>,
    ) -> (StatusCode, String) {
        let Some(err) = err else {
            let url = req.original_url().unwrap_or(req.url());
            let resource = pathname(url, protohost(url));
            return (
                StatusCode::NOT_FOUND,
                format!("Cannot {} {}", req.method(), resource),
            );
        };

        let status = err
            .status_code()
            .or_else(|| {
                let current = res.status();
                (current.is_client_error() || current.is_server_error()).then_some(current)
            })
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let message = match self.environment {
            Environment::Production => status
                .canonical_reason()
                .unwrap_or("Error")
                .to_string(),
            _ => error_chain(err),
        };
        (status, message)
    }
}

impl Default for DefaultFinalHandler {
    fn default() -> Self {
        Self::new(Environment::default())
    }
}

impl FinalHandler for DefaultFinalHandler {
    fn finish(&self, req: &mut Request, res: &mut Response, err: Option<DispatchError>) {
        if let Some(e) = &err {
            if self.environment != Environment::Test {
                tracing::error!(
                    request_id = req.request_id().unwrap_or("unknown"),
                    url = req.original_url().unwrap_or(req.url()),
                    error = %error_chain(e),
                    "Unhandled error"
                );
            }
        }

        if res.is_finished() {
            tracing::debug!(url = %req.url(), "Response already finished");
            return;
        }

        let (status, message) = self.status_and_message(req, res, err.as_ref());
        tracing::debug!(status = %status, url = %req.url(), "Final handler responding");

        let body = error_page(&message);
        res.set_status(status)
            .insert_header(
                header::CONTENT_SECURITY_POLICY,
                HeaderValue::from_static("default-src 'none'"),
            )
            .insert_header(
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            )
            .insert_header(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/html; charset=utf-8"),
            );

        if *req.method() == Method::HEAD {
            res.end();
        } else {
            res.send(body);
        }
    }
}

fn error_chain(err: &DispatchError) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str("\ncaused by: ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn error_page(message: &str) -> String {
    let escaped = escape_html(message).replace('\n', "<br>");
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>Error</title>\n</head>\n<body>\n<pre>{escaped}</pre>\n</body>\n</html>\n"
    )
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
