use crate::cookies::canonical_cookie::CanonicalCookie;
use crate::cookies::cookie_util::{canonicalize_host, domain_matches, path_matches};
use crate::cookies::deriver::{derive_cookies, CookieOrigin};
use crate::cookies::parsed_cookie::parse_set_cookie_headers;
use crate::cookies::psl::SuffixMatcher;
use time::OffsetDateTime;

/// The cookie store of one client session.
/// Modeled after Chromium's `net::CookieMonster`.
///
/// Entries are kept in insertion order, one per (name, domain, path).
/// Expired entries are dropped lazily, before a `Cookie` header is built.
#[derive(Debug, Clone, Default)]
pub struct CookieMonster {
    cookies: Vec<CanonicalCookie>,
}

impl CookieMonster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store, e.g. from the persistent backend. Later duplicates replace earlier ones.
    pub fn from_cookies(cookies: Vec<CanonicalCookie>) -> Self {
        let mut store = Self::new();
        store.merge(cookies);
        store
    }

    /// Insert derived cookies, replacing entries with the same key.
    ///
    /// A replaced entry hands its `creation_time` to its successor, so the
    /// cookie keeps its position in the selection order.
    pub fn merge(&mut self, candidates: Vec<CanonicalCookie>) {
        for mut candidate in candidates {
            if let Some(idx) = self.cookies.iter().position(|c| c.same_key(&candidate)) {
                let replaced = self.cookies.remove(idx);
                candidate.creation_time = replaced.creation_time;
            }
            self.cookies.push(candidate);
        }
    }

    /// Drop every cookie whose expiry lies before `now`.
    pub fn evict_expired(&mut self, now: OffsetDateTime) -> usize {
        let before = self.cookies.len();
        self.cookies.retain(|c| !c.is_expired(now));
        let evicted = before - self.cookies.len();
        if evicted > 0 {
            tracing::debug!(evicted, "evicted expired cookies");
        }
        evicted
    }

    /// Cookies to attach to a request, in `Cookie` header order.
    ///
    /// Evicts expired entries first and stamps `last_access_time` on every
    /// returned cookie. A secure request receives only secure cookies and a
    /// plain request only non-secure ones.
    pub fn get_cookies_for_request(
        &mut self,
        host: &str,
        path: &str,
        secure: bool,
        now: OffsetDateTime,
    ) -> Vec<CanonicalCookie> {
        self.evict_expired(now);
        let canon_host = canonicalize_host(host);

        let mut matched: Vec<&mut CanonicalCookie> = self
            .cookies
            .iter_mut()
            .filter(|c| {
                let domain_ok = if c.host_only {
                    c.domain == canon_host
                } else {
                    domain_matches(&canon_host, &c.domain)
                };
                domain_ok && path_matches(path, &c.path) && c.secure == secure
            })
            .collect();

        // Longest path first, then oldest first.
        matched.sort_by(|a, b| {
            b.path
                .len()
                .cmp(&a.path.len())
                .then_with(|| a.creation_time.cmp(&b.creation_time))
        });

        matched
            .into_iter()
            .map(|c| {
                c.last_access_time = now;
                c.clone()
            })
            .collect()
    }

    /// The serialized `Cookie` header value; empty when nothing matches.
    pub fn get_cookie_header(
        &mut self,
        host: &str,
        path: &str,
        secure: bool,
        now: OffsetDateTime,
    ) -> String {
        self.get_cookies_for_request(host, path, secure, now)
            .iter()
            .map(CanonicalCookie::to_header_pair)
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Parse, derive and merge the `Set-Cookie` values of one response.
    /// Returns how many cookies were stored.
    pub fn set_cookies_from_response<'a, I>(
        &mut self,
        origin: &CookieOrigin,
        response_path: &str,
        lines: I,
        suffixes: &dyn SuffixMatcher,
        now: OffsetDateTime,
    ) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        let parsed = parse_set_cookie_headers(lines, response_path, now);
        let derived = derive_cookies(origin, response_path, parsed, &self.cookies, suffixes, now);
        let stored = derived.len();
        self.merge(derived);
        stored
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    /// Get total cookie count.
    pub fn total_cookie_count(&self) -> usize {
        self.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Clear all cookies.
    pub fn clear(&mut self) {
        self.cookies.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &CanonicalCookie> {
        self.cookies.iter()
    }

    /// Cookies that outlive the session (for persistence).
    pub fn persistent_cookies(&self) -> Vec<CanonicalCookie> {
        self.cookies.iter().filter(|c| c.persistent).cloned().collect()
    }
}
