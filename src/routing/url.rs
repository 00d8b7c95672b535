//! Request URL helpers.
//!
//! A request target is either origin-form (`/path?query`) or, when the
//! request went through a forward proxy, absolute-form
//! (`http://host:port/path?query`). The scheme and authority of an
//! absolute-form target are held aside while mount segments are stripped
//! and restored.

/// Scheme and authority of an absolute-form URL.
///
/// Returns `None` for origin-form URLs and for URLs where `://` does not
/// appear before the first `/` or `?`.
pub fn protohost(url: &str) -> Option<&str> {
    if url.is_empty() || url.starts_with('/') {
        return None;
    }

    let scheme_end = url.find("://")?;
    if url[..scheme_end].contains(['?', '/']) {
        return None;
    }

    let authority_start = scheme_end + 3;
    let end = url[authority_start..]
        .find(['/', '?', '#'])
        .map_or(url.len(), |i| authority_start + i);

    Some(&url[..end])
}

/// Path component of `url` with the protohost, query and fragment removed.
///
/// An empty path is reported as `"/"`.
pub fn pathname<'a>(url: &'a str, protohost: Option<&str>) -> &'a str {
    let rest = protohost
        .and_then(|host| url.strip_prefix(host))
        .unwrap_or(url);

    let path = rest.find(['?', '#']).map_or(rest, |i| &rest[..i]);
    if path.is_empty() {
        "/"
    } else {
        path
    }
}
