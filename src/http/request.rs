//! Request context passed through a dispatch chain.
//!
//! # Responsibilities
//! - Hold the mutable request URL and the write-once original URL
//! - Strip and restore mount segments as the chain walks entries
//! - Carry method, headers, extensions and body for handlers
//!
//! # Design Decisions
//! - Mount segments live on an explicit stack; restoring is a pop, not string guessing
//! - The stripped text is kept verbatim so restoration preserves the client's casing
//! - The scheme/authority of absolute-form URLs is never part of a stripped segment

use axum::body::Body;
use axum::http::{Extensions, HeaderMap, Method};

use crate::routing::pathname;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// One stripped mount segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mount {
    /// Scheme and authority kept in front of the URL (empty for origin-form URLs).
    host: String,
    /// Text removed from the URL, exactly as it appeared.
    segment: String,
    /// A `/` was synthesized after stripping and must be removed on restore.
    slash_added: bool,
}

impl Mount {
    /// The stripped segment.
    pub fn segment(&self) -> &str {
        &self.segment
    }
}

/// An in-flight request as seen by handlers.
#[derive(Debug)]
pub struct Request {
    method: Method,
    url: String,
    original_url: Option<String>,
    headers: HeaderMap,
    extensions: Extensions,
    body: Body,
    mounts: Vec<Mount>,
}

impl Request {
    /// Create a request with an empty body.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            original_url: None,
            headers: HeaderMap::new(),
            extensions: Extensions::new(),
            body: Body::empty(),
            mounts: Vec::new(),
        }
    }

    /// Build from an incoming HTTP request. The URL is the request target as sent.
    pub fn from_http(req: axum::http::Request<Body>) -> Self {
        let (parts, body) = req.into_parts();
        let url = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| "/".to_string());
        // Absolute-form targets keep their scheme and authority.
        let url = match (parts.uri.scheme_str(), parts.uri.authority()) {
            (Some(scheme), Some(authority)) => format!("{scheme}://{authority}{url}"),
            _ => url,
        };

        Self {
            method: parts.method,
            url,
            original_url: None,
            headers: parts.headers,
            extensions: parts.extensions,
            body,
            mounts: Vec::new(),
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Current URL, relative to the active mount point.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Replace the current URL.
    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    /// The URL the request arrived with, once a dispatcher has seen it.
    pub fn original_url(&self) -> Option<&str> {
        self.original_url.as_deref()
    }

    /// Record the current URL as the original one unless one is already recorded.
    pub fn snapshot_original_url(&mut self) {
        if self.original_url.is_none() {
            self.original_url = Some(self.url.clone());
        }
    }

    /// Path component of the current URL.
    pub fn path(&self) -> &str {
        pathname(&self.url, crate::routing::protohost(&self.url))
    }

    /// Concatenation of every segment stripped so far.
    pub fn base_url(&self) -> String {
        self.mounts.iter().map(|m| m.segment.as_str()).collect()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }

    /// Take the body, leaving an empty one behind.
    pub fn take_body(&mut self) -> Body {
        std::mem::replace(&mut self.body, Body::empty())
    }

    /// Request ID assigned by the server layer, if any.
    pub fn request_id(&self) -> Option<&str> {
        self.headers.get(X_REQUEST_ID).and_then(|v| v.to_str().ok())
    }

    /// Number of mount segments currently stripped.
    pub fn mount_depth(&self) -> usize {
        self.mounts.len()
    }

    /// Strip `len` bytes following `host` from the URL.
    ///
    /// Returns false and leaves the URL untouched if the range does not exist.
    pub fn push_mount(&mut self, host: &str, len: usize) -> bool {
        let end = host.len() + len;
        let Some(segment) = self.url.get(host.len()..end) else {
            return false;
        };
        let segment = segment.to_string();
        let rest = &self.url[end..];

        // The path must start with `/` so the authority stays intact.
        let slash_added = !rest.starts_with('/') && (host.is_empty() || !rest.is_empty());
        let mut url = String::with_capacity(host.len() + rest.len() + 1);
        url.push_str(host);
        if slash_added {
            url.push('/');
        }
        url.push_str(rest);

        self.url = url;
        self.mounts.push(Mount {
            host: host.to_string(),
            segment,
            slash_added,
        });
        true
    }

    /// Restore stripped segments until only `depth` remain.
    ///
    /// Returns the removed mounts, innermost first.
    pub fn unmount_to(&mut self, depth: usize) -> Vec<Mount> {
        let mut removed = Vec::new();
        while self.mounts.len() > depth {
            let Some(mount) = self.mounts.pop() else {
                break;
            };
            let host_len = mount.host.len();
            if mount.slash_added && self.url.get(host_len..).is_some_and(|r| r.starts_with('/')) {
                self.url.remove(host_len);
            }
            let rest = self.url.get(host_len..).unwrap_or("");
            self.url = format!("{}{}{}", mount.host, mount.segment, rest);
            removed.push(mount);
        }
        removed
    }

    /// Re-apply mounts returned by [`Request::unmount_to`].
    pub fn remount(&mut self, mounts: Vec<Mount>) {
        for mount in mounts.into_iter().rev() {
            self.push_mount(&mount.host, mount.segment.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_restore() {
        let mut req = Request::new(Method::GET, "/api/users?id=1");
        assert!(req.push_mount("", 4));
        assert_eq!(req.url(), "/users?id=1");
        assert_eq!(req.base_url(), "/api");

        req.unmount_to(0);
        assert_eq!(req.url(), "/api/users?id=1");
        assert_eq!(req.mount_depth(), 0);
    }

    #[test]
    fn test_synthetic_slash() {
        let mut req = Request::new(Method::GET, "/admin?x=1");
        assert!(req.push_mount("", 6));
        assert_eq!(req.url(), "/?x=1");

        req.unmount_to(0);
        assert_eq!(req.url(), "/admin?x=1");

        let mut req = Request::new(Method::GET, "/admin");
        req.push_mount("", 6);
        assert_eq!(req.url(), "/");
        req.unmount_to(0);
        assert_eq!(req.url(), "/admin");
    }

    #[test]
    fn test_absolute_form() {
        let mut req = Request::new(Method::GET, "http://example.com/api/x");
        assert!(req.push_mount("http://example.com", 4));
        assert_eq!(req.url(), "http://example.com/x");
        assert_eq!(req.path(), "/x");

        req.unmount_to(0);
        assert_eq!(req.url(), "http://example.com/api/x");
    }

    #[test]
    fn test_absolute_form_no_slash_synthesized() {
        let mut req = Request::new(Method::GET, "http://example.com/api");
        req.push_mount("http://example.com", 4);
        assert_eq!(req.url(), "http://example.com");
        req.unmount_to(0);
        assert_eq!(req.url(), "http://example.com/api");
    }

    #[test]
    fn test_absolute_form_dot_boundary_keeps_authority() {
        let mut req = Request::new(Method::GET, "http://example.com/api.json?v=2");
        assert!(req.push_mount("http://example.com", 4));
        assert_eq!(req.url(), "http://example.com/.json?v=2");
        assert_eq!(req.path(), "/.json");
        assert_eq!(crate::routing::protohost(req.url()), Some("http://example.com"));

        req.unmount_to(0);
        assert_eq!(req.url(), "http://example.com/api.json?v=2");
    }

    #[test]
    fn test_nested_mounts_and_remount() {
        let mut req = Request::new(Method::GET, "/Api/V1/items");
        req.push_mount("", 4);
        req.push_mount("", 3);
        assert_eq!(req.url(), "/items");
        assert_eq!(req.base_url(), "/Api/V1");

        let held = req.unmount_to(0);
        assert_eq!(req.url(), "/Api/V1/items");
        assert_eq!(held.len(), 2);
        assert_eq!(held[0].segment(), "/V1");

        req.remount(held);
        assert_eq!(req.url(), "/items");
        assert_eq!(req.mount_depth(), 2);
    }

    #[test]
    fn test_push_out_of_range() {
        let mut req = Request::new(Method::GET, "/a");
        assert!(!req.push_mount("", 10));
        assert_eq!(req.url(), "/a");
        assert_eq!(req.mount_depth(), 0);
    }

    #[test]
    fn test_original_url_set_once() {
        let mut req = Request::new(Method::GET, "/first");
        req.snapshot_original_url();
        req.set_url("/second");
        req.snapshot_original_url();
        assert_eq!(req.original_url(), Some("/first"));
    }

    #[test]
    fn test_from_http_absolute_form() {
        let http = axum::http::Request::builder()
            .uri("http://example.com/api/x?y=1")
            .body(Body::empty())
            .unwrap();
        let req = Request::from_http(http);
        assert_eq!(req.url(), "http://example.com/api/x?y=1");

        let http = axum::http::Request::builder()
            .uri("/plain?q")
            .body(Body::empty())
            .unwrap();
        let req = Request::from_http(http);
        assert_eq!(req.url(), "/plain?q");
    }
}
