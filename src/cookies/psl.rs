//! Public Suffix List (PSL) validation for cookie domain security.
//!
//! Prevents supercookie attacks by rejecting cookies whose `Domain`
//! attribute names a public suffix like `com` or `co.uk`.
//!
//! The list used by a client session is loaded from the persisted cache or
//! fetched from publicsuffix.org and matched exactly. A compiled-in matcher
//! backed by the `psl` crate is available for offline use.

use psl::{List, Psl};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use time::{Duration, OffsetDateTime};

/// Where the upstream list is fetched from.
pub const PUBLIC_SUFFIX_LIST_URL: &str = "https://publicsuffix.org/list/public_suffix_list.dat";

/// A cached list older than this is refetched at bootup.
pub const REFRESH_INTERVAL: Duration = Duration::hours(24);

/// Answers "is this domain a public suffix?".
pub trait SuffixMatcher: Send + Sync {
    fn is_public_suffix(&self, domain: &str) -> bool;
}

/// A set of suffix strings, queried by exact match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicSuffixList {
    suffixes: HashSet<String>,
}

impl PublicSuffixList {
    pub fn new<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            suffixes: suffixes.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse the upstream `.dat` format: one rule per line, `//` comments,
    /// blank lines ignored, each line read up to its first whitespace.
    pub fn parse(text: &str) -> Self {
        let suffixes = text
            .lines()
            .filter_map(|line| line.split_whitespace().next())
            .filter(|rule| !rule.starts_with("//"))
            .map(str::to_string)
            .collect();
        Self { suffixes }
    }

    pub fn contains(&self, domain: &str) -> bool {
        self.suffixes.contains(domain)
    }

    pub fn len(&self) -> usize {
        self.suffixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suffixes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.suffixes.iter().map(String::as_str)
    }
}

impl SuffixMatcher for PublicSuffixList {
    fn is_public_suffix(&self, domain: &str) -> bool {
        self.contains(domain)
    }
}

/// A suffix list as persisted, stamped with the time it was fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedSuffixes {
    pub fetched_at: OffsetDateTime,
    pub list: PublicSuffixList,
}

impl CachedSuffixes {
    pub fn is_stale(&self, now: OffsetDateTime) -> bool {
        now - self.fetched_at > REFRESH_INTERVAL
    }
}

/// True when there is no cached list or the cached one is older than a day.
pub fn needs_refresh(cached: Option<&CachedSuffixes>, now: OffsetDateTime) -> bool {
    cached.map_or(true, |c| c.is_stale(now))
}

/// Mozilla's list as compiled into the `psl` crate, including wildcard rules.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinSuffixList;

impl SuffixMatcher for BuiltinSuffixList {
    fn is_public_suffix(&self, domain: &str) -> bool {
        let domain_lower = domain.to_lowercase();
        let domain_bytes = domain_lower.as_bytes();

        // The domain is a public suffix if it equals its own suffix
        List.suffix(domain_bytes)
            .is_some_and(|suffix| suffix.as_bytes() == domain_bytes)
    }
}
