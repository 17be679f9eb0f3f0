//! RFC 6265 cookie state management.
//!
//! This module turns `Set-Cookie` response headers into stored cookies and
//! stored cookies back into `Cookie` request headers:
//!
//! - **Dates**: the RFC 6265 §5.1.1 cookie-date algorithm ([`cookie_date`])
//! - **Parsing**: `Set-Cookie` attribute extraction ([`parsed_cookie`])
//! - **Derivation**: domain, path, secure and prefix policy ([`deriver`])
//! - **Storage**: merge, eviction and request selection ([`CookieMonster`](monster::CookieMonster))
//! - **Persistence**: SQLite-backed cookie and suffix-list cache ([`persistence`])
//!
//! # Architecture
//!
//! | Chromium (C++) | cookienet (Rust) | Responsibility |
//! |----------------|------------------|----------------|
//! | `net::ParsedCookie` | [`ParsedCookie`](parsed_cookie::ParsedCookie) | One header's attributes |
//! | `net::CanonicalCookie` | [`CanonicalCookie`](canonical_cookie::CanonicalCookie) | Single cookie representation |
//! | `net::CookieMonster` | [`CookieMonster`](monster::CookieMonster) | Cookie jar |
//! | `SqlitePersistentCookieStore` | [`persistence`] | Disk persistence |
//!
//! # Round trip
//!
//! ```rust
//! use cookienet::cookies::deriver::CookieOrigin;
//! use cookienet::cookies::monster::CookieMonster;
//! use cookienet::cookies::psl::PublicSuffixList;
//! use time::OffsetDateTime;
//!
//! let suffixes = PublicSuffixList::new(["com"]);
//! let origin = CookieOrigin::new("www.example.com", true);
//! let now = OffsetDateTime::now_utc();
//!
//! let mut jar = CookieMonster::new();
//! jar.set_cookies_from_response(&origin, "/login", ["sid=abc; Path=/; Secure"], &suffixes, now);
//! assert_eq!(jar.get_cookie_header("www.example.com", "/home", true, now), "sid=abc");
//! ```
//!
//! # Chromium References
//!
//! - Cookie monster: `net/cookies/cookie_monster.cc`
//! - Matching helpers: `net/cookies/cookie_util.cc`
//! - Database schema: `net/extras/sqlite/sqlite_persistent_cookie_store.cc`

pub mod canonical_cookie;
pub mod cookie_date;
pub mod cookie_util;
pub mod deriver;
pub mod error;
pub mod monster;
pub mod parsed_cookie;
pub mod persistence;
pub mod psl;
