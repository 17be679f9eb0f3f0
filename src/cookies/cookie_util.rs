//! Matching helpers shared by cookie derivation and selection.
//!
//! Mirrors the free functions of Chromium's `net/cookies/cookie_util.cc`
//! and the algorithms of RFC 6265 §5.1.3 (domain matching), §5.1.4 (paths).

use url::Host;

/// Canonicalize a request host: IDNA to ASCII and lowercase.
///
/// Hosts that are not valid domains (for example bare IPv6 literals without
/// brackets) fall back to plain ASCII lowercasing.
pub fn canonicalize_host(host: &str) -> String {
    match Host::parse(host) {
        Ok(Host::Domain(domain)) => domain,
        Ok(other) => other.to_string(),
        Err(_) => host.to_ascii_lowercase(),
    }
}

/// RFC 6265 domain-match: `host` equals `domain`, or ends with it at a dot boundary.
pub fn domain_matches(host: &str, domain: &str) -> bool {
    if host == domain {
        return true;
    }

    host.len() > domain.len()
        && host.ends_with(domain)
        && host.as_bytes()[host.len() - domain.len() - 1] == b'.'
}

/// RFC 6265 path-match. Any query string on `request_path` is ignored.
pub fn path_matches(request_path: &str, cookie_path: &str) -> bool {
    let request_path = strip_query(request_path);

    if request_path == cookie_path {
        return true;
    }

    if let Some(rest) = request_path.strip_prefix(cookie_path) {
        return cookie_path.ends_with('/') || rest.starts_with('/');
    }

    false
}

/// The default-path of a request URI (RFC 6265 §5.1.4).
pub fn default_path(uri_path: &str) -> String {
    let path = strip_query(uri_path);

    if !path.starts_with('/') || path.matches('/').count() == 1 {
        return "/".to_string();
    }

    match path.rfind('/') {
        Some(last) => path[..last].to_string(),
        None => "/".to_string(),
    }
}

fn strip_query(path: &str) -> &str {
    path.split_once('?').map_or(path, |(before, _)| before)
}
