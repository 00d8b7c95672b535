//! Mount path matching.
//!
//! # Responsibilities
//! - Normalize mount paths at registration time
//! - Decide whether a request path falls under a mount path
//!
//! # Design Decisions
//! - Matching ignores ASCII case only; non-ASCII characters must match exactly
//! - Stripping keeps the request's own casing
//! - `/admin` matches `/admin`, `/admin/x`, `/admin.json` but never `/administration`
//! - The empty route is the root and matches every path starting with `/` or `.`

/// Normalize a mount path: a single trailing `/` is removed, so `"/"` becomes `""`.
pub fn normalize_route(path: &str) -> String {
    path.strip_suffix('/').unwrap_or(path).to_string()
}

/// Returns true if `path` is served by an entry mounted at `route`.
pub fn route_matches(route: &str, path: &str) -> bool {
    let route = route.as_bytes();
    let path = path.as_bytes();

    if path.len() < route.len() || !path[..route.len()].eq_ignore_ascii_case(route) {
        return false;
    }

    // Reject false positives such as "/admin" vs "/administration".
    matches!(path.get(route.len()), None | Some(b'/') | Some(b'.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_route() {
        assert_eq!(normalize_route("/"), "");
        assert_eq!(normalize_route(""), "");
        assert_eq!(normalize_route("/api/"), "/api");
        assert_eq!(normalize_route("/api"), "/api");
        // Only one slash is stripped.
        assert_eq!(normalize_route("/api//"), "/api/");
    }

    #[test]
    fn test_boundary() {
        for path in ["/admin", "/admin/", "/admin/x", "/admin.json"] {
            assert!(route_matches("/admin", path), "{path} should match");
        }
        assert!(!route_matches("/admin", "/administration"));
        assert!(!route_matches("/admin", "/adm"));
        assert!(!route_matches("/admin", "/other"));
    }

    #[test]
    fn test_case_insensitive() {
        assert!(route_matches("/api", "/API/v1"));
        assert!(route_matches("/Api", "/api"));
        assert!(route_matches("/caf\u{e9}", "/CAF\u{e9}/menu"));
        assert!(!route_matches("/caf\u{e9}", "/caf\u{c9}"));
    }

    #[test]
    fn test_root_route() {
        assert!(route_matches("", "/"));
        assert!(route_matches("", "/anything/at/all"));
        // Asterisk-form targets never reach root handlers.
        assert!(!route_matches("", "*"));
    }
}
