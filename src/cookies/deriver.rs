//! Turning parsed `Set-Cookie` attributes into store-ready cookies.
//!
//! Applies the storage model of RFC 6265 §5.3 with the secure-shadowing and
//! name-prefix rules of RFC 6265bis. The store is only read here; merging the
//! survivors is [`CookieMonster::merge`](crate::cookies::monster::CookieMonster::merge).

use crate::cookies::canonical_cookie::CanonicalCookie;
use crate::cookies::cookie_util::{canonicalize_host, default_path, domain_matches, path_matches};
use crate::cookies::parsed_cookie::ParsedCookie;
use crate::cookies::psl::SuffixMatcher;
use time::{Duration, OffsetDateTime};

/// Lifetime given to cookies without `Expires` or `Max-Age`.
/// They stay non-persistent; the expiry only bounds them in memory.
pub const SESSION_COOKIE_LIFETIME: Duration = Duration::hours(24);

/// The request a response was received for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieOrigin {
    pub host: String,
    pub secure: bool,
}

impl CookieOrigin {
    pub fn new(host: impl Into<String>, secure: bool) -> Self {
        Self {
            host: host.into(),
            secure,
        }
    }
}

/// Derive candidate cookies from one response's parsed `Set-Cookie` headers.
///
/// `response_path` is the path (query included) of the response URL and
/// supplies the default-path. `store` is consulted for secure-shadowing only.
pub fn derive_cookies(
    origin: &CookieOrigin,
    response_path: &str,
    parsed: Vec<ParsedCookie>,
    store: &[CanonicalCookie],
    suffixes: &dyn SuffixMatcher,
    now: OffsetDateTime,
) -> Vec<CanonicalCookie> {
    let canon_host = canonicalize_host(&origin.host);

    parsed
        .into_iter()
        .filter_map(|attrs| {
            derive_one(origin, &canon_host, response_path, attrs, store, suffixes, now)
        })
        .collect()
}

fn derive_one(
    origin: &CookieOrigin,
    canon_host: &str,
    response_path: &str,
    attrs: ParsedCookie,
    store: &[CanonicalCookie],
    suffixes: &dyn SuffixMatcher,
    now: OffsetDateTime,
) -> Option<CanonicalCookie> {
    let mut cookie = CanonicalCookie::new(attrs.name, attrs.value, "", "", now);

    match attrs.max_age.or(attrs.expires) {
        Some(expiry) => {
            cookie.persistent = true;
            cookie.expiry_time = Some(expiry);
        }
        None => {
            cookie.persistent = false;
            cookie.expiry_time = Some(now + SESSION_COOKIE_LIFETIME);
        }
    }

    let mut domain_attribute = attrs.domain;
    if let Some(domain) = domain_attribute.as_deref() {
        if suffixes.is_public_suffix(domain) {
            if domain != canon_host {
                tracing::debug!(cookie = %cookie.name, domain, "rejecting cookie scoped to a public suffix");
                return None;
            }
            domain_attribute = None;
        }
    }

    match domain_attribute {
        Some(domain) => {
            if !domain_matches(canon_host, &domain) {
                tracing::debug!(cookie = %cookie.name, domain = %domain, host = canon_host, "rejecting cookie for foreign domain");
                return None;
            }
            cookie.host_only = false;
            cookie.domain = domain;
        }
        None => {
            cookie.host_only = true;
            cookie.domain = canon_host.to_string();
        }
    }

    cookie.path = attrs.path.unwrap_or_else(|| default_path(response_path));

    cookie.secure = attrs.secure;
    if cookie.secure && !origin.secure {
        tracing::debug!(cookie = %cookie.name, "rejecting Secure cookie from insecure origin");
        return None;
    }
    cookie.http_only = attrs.http_only;

    if !cookie.secure && !origin.secure && is_shadowed_by_secure(&cookie, store) {
        tracing::debug!(cookie = %cookie.name, "rejecting cookie shadowed by a secure cookie");
        return None;
    }

    if cookie.validate_prefix().is_err() {
        tracing::debug!(cookie = %cookie.name, "rejecting cookie violating its name prefix");
        return None;
    }

    Some(cookie)
}

/// A secure cookie with the same name already claims this domain and path.
fn is_shadowed_by_secure(cookie: &CanonicalCookie, store: &[CanonicalCookie]) -> bool {
    store.iter().any(|existing| {
        existing.name == cookie.name
            && existing.secure
            && domain_matches(&cookie.domain, &existing.domain)
            && domain_matches(&existing.domain, &cookie.domain)
            && path_matches(&cookie.path, &existing.path)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookies::parsed_cookie::parse_set_cookie_headers;
    use crate::cookies::psl::PublicSuffixList;
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2024-05-01 12:00 UTC);
    const RESPONSE_PATH: &str = "/foo/bar?key=value#text";

    fn suffixes() -> PublicSuffixList {
        PublicSuffixList::new(["com", "org", "co.uk"])
    }

    fn derive(origin: &CookieOrigin, lines: &[&str], store: &[CanonicalCookie]) -> Vec<CanonicalCookie> {
        let parsed = parse_set_cookie_headers(lines.iter().copied(), RESPONSE_PATH, NOW);
        derive_cookies(origin, RESPONSE_PATH, parsed, store, &suffixes(), NOW)
    }

    fn secure_origin() -> CookieOrigin {
        CookieOrigin::new("www.example.com", true)
    }

    fn plain_origin() -> CookieOrigin {
        CookieOrigin::new("www.example.com", false)
    }

    #[test]
    fn test_expiry_and_persistence() {
        let out = derive(
            &secure_origin(),
            &[
                "a=session",
                "b=max; Max-Age=3600",
                r#"c=exp; Expires="Sun, 01-Jan-35 11:12:13 GMT""#,
                r#"d=both; Max-Age=60; Expires="Sun, 01-Jan-35 11:12:13 GMT""#,
            ],
            &[],
        );
        assert_eq!(out.len(), 4);

        assert!(!out[0].persistent);
        assert_eq!(out[0].expiry_time, Some(NOW + Duration::hours(24)));
        assert!(out[1].persistent);
        assert_eq!(out[1].expiry_time, Some(NOW + Duration::hours(1)));
        assert!(out[2].persistent);
        assert_eq!(out[2].expiry_time, Some(datetime!(2035-01-01 11:12:13 UTC)));
        assert_eq!(out[3].expiry_time, Some(NOW + Duration::minutes(1)));
    }

    #[test]
    fn test_domain_rules() {
        let out = derive(
            &secure_origin(),
            &[
                "host=v",
                "parent=v; Domain=example.com",
                "dotted=v; Domain=.WWW.example.com",
                "suffix=v; Domain=com",
                "foreign=v; Domain=www.foobar.com",
                "child=v; Domain=sub.www.example.com",
                "lookalike=v; Domain=ample.com",
            ],
            &[],
        );
        let names: Vec<_> = out.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["host", "parent", "dotted"]);

        assert_eq!(out[0].domain, "www.example.com");
        assert!(out[0].host_only);
        assert_eq!(out[1].domain, "example.com");
        assert!(!out[1].host_only);
        assert_eq!(out[2].domain, "www.example.com");
        assert!(!out[2].host_only);
    }

    #[test]
    fn test_public_suffix_equal_to_host_becomes_host_only() {
        let origin = CookieOrigin::new("CO.UK", true);
        let out = derive(&origin, &["a=v; Domain=co.uk"], &[]);
        assert_eq!(out.len(), 1);
        assert!(out[0].host_only);
        assert_eq!(out[0].domain, "co.uk");
    }

    #[test]
    fn test_path_defaults_to_response_directory() {
        let out = derive(&secure_origin(), &["a=v; Path=/path", "b=v"], &[]);
        assert_eq!(out[0].path, "/path");
        assert_eq!(out[1].path, "/foo");
    }

    #[test]
    fn test_secure_requires_secure_origin() {
        assert_eq!(derive(&secure_origin(), &["a=v; Secure; HttpOnly"], &[]).len(), 1);
        assert!(derive(&plain_origin(), &["a=v; Secure"], &[]).is_empty());

        let out = derive(&secure_origin(), &["a=v; Secure; HttpOnly"], &[]);
        assert!(out[0].secure);
        assert!(out[0].http_only);
    }

    #[test]
    fn test_secure_shadowing() {
        let mut existing = CanonicalCookie::new("cookie", "secure", "www.example.com", "/foo", NOW);
        existing.secure = true;
        let store = vec![existing];

        let out = derive(
            &plain_origin(),
            &["cookie=shadowed; Path=/foo", "cookie=nested; Path=/foo/deeper", "cookie=free; Path=/bar"],
            &store,
        );
        let values: Vec<_> = out.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(values, vec!["free"]);

        // A secure origin may overwrite its own secure cookie with an insecure one.
        assert_eq!(derive(&secure_origin(), &["cookie=v; Path=/foo"], &store).len(), 1);
    }

    #[test]
    fn test_name_prefixes() {
        let out = derive(
            &secure_origin(),
            &[
                "__Secure-a=v; Secure",
                "__Secure-b=v",
                "__Host-c=v; Path=/; Secure",
                "__Host-d=v; Path=/sub; Secure",
                "__Host-e=v; Path=/; Secure; Domain=example.com",
                "__Host-f=v; Secure",
            ],
            &[],
        );
        let names: Vec<_> = out.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["__Secure-a", "__Host-c"]);
    }

    #[test]
    fn test_timestamps_use_now() {
        let out = derive(&secure_origin(), &["a=v"], &[]);
        assert_eq!(out[0].creation_time, NOW);
        assert_eq!(out[0].last_access_time, NOW);
    }
}
