use crate::base::neterror::NetError;
use time::OffsetDateTime;

/// Represents a cookie.
/// Modeled after Chromium's `net::CanonicalCookie`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    pub creation_time: OffsetDateTime,
    pub last_access_time: OffsetDateTime,
    pub expiry_time: Option<OffsetDateTime>,
    pub persistent: bool,
    pub host_only: bool,
    pub secure: bool,
    pub http_only: bool,
}

impl CanonicalCookie {
    /// A host-only, non-persistent cookie with no expiry. Flags are set by the caller.
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        domain: impl Into<String>,
        path: impl Into<String>,
        creation_time: OffsetDateTime,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: domain.into(),
            path: path.into(),
            creation_time,
            last_access_time: creation_time,
            expiry_time: None,
            persistent: false,
            host_only: true,
            secure: false,
            http_only: false,
        }
    }

    /// The (name, domain, path) triple that identifies a cookie within a store.
    pub fn key(&self) -> (&str, &str, &str) {
        (&self.name, &self.domain, &self.path)
    }

    pub fn same_key(&self, other: &CanonicalCookie) -> bool {
        self.key() == other.key()
    }

    pub fn is_expired(&self, current_time: OffsetDateTime) -> bool {
        self.expiry_time.is_some_and(|expiry| expiry < current_time)
    }

    /// Validate __Secure- and __Host- cookie prefixes.
    /// - __Secure- cookies MUST have the Secure attribute
    /// - __Host- cookies MUST have Secure, Path="/", and no Domain attribute
    pub fn validate_prefix(&self) -> Result<(), NetError> {
        if self.name.starts_with("__Secure-") && !self.secure {
            return Err(NetError::CookieInvalidPrefix);
        }

        if self.name.starts_with("__Host-") && (!self.secure || !self.host_only || self.path != "/")
        {
            return Err(NetError::CookieInvalidPrefix);
        }

        Ok(())
    }

    /// `name=value` as sent in a `Cookie` request header.
    pub fn to_header_pair(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}
