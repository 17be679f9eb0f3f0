use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum NetError {
    // Connection Errors
    #[error("Connection closed (TCP FIN)")]
    ConnectionClosed,
    #[error("Connection reset (TCP RST)")]
    ConnectionReset,
    #[error("Connection refused")]
    ConnectionRefused,
    #[error("Connection failed")]
    ConnectionFailed,
    #[error("Connection to {host}:{port} failed: {message}")]
    ConnectionFailedTo {
        host: String,
        port: u16,
        message: String,
    },
    #[error("Name not resolved")]
    NameNotResolved,
    #[error("Name {domain} not resolved: {message}")]
    NameNotResolvedFor { domain: String, message: String },
    #[error("SSL protocol error")]
    SslProtocolError,
    #[error("Connection timed out")]
    ConnectionTimedOut,

    // HTTP Errors
    #[error("Invalid URL")]
    InvalidUrl,
    #[error("Unknown URL scheme")]
    UnknownUrlScheme,
    #[error("Invalid redirect")]
    InvalidRedirect,
    #[error("Too many redirects")]
    TooManyRedirects,
    #[error("Invalid HTTP response")]
    InvalidHttpResponse,
    #[error("Too many retries")]
    TooManyRetries,
    #[error("Response body is not valid UTF-8")]
    InvalidUtf8,
    #[error("Response body is not valid JSON")]
    JsonParseError,
    #[error("Unexpected HTTP status {0}")]
    HttpStatus(u16),

    // Cookie Errors
    #[error("Cookie prefix validation failed")]
    CookieInvalidPrefix,
    #[error("Cookie database locked")]
    CookieDatabaseLocked,
    #[error("Cookie database error: {message}")]
    CookieDatabaseError { message: String },
    #[error("Public suffix list unavailable: {reason}")]
    PublicSuffixListUnavailable { reason: String },
    #[error("Client used before bootup")]
    NotBootstrapped,

    // Configuration Errors
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Unknown error: {0}")]
    Unknown(i32),
}

impl NetError {
    pub fn as_i32(&self) -> i32 {
        match self {
            NetError::ConnectionClosed => -100,
            NetError::ConnectionReset => -101,
            NetError::ConnectionRefused => -102,
            NetError::ConnectionFailed => -104,
            NetError::ConnectionFailedTo { .. } => -104,
            NetError::NameNotResolved => -105,
            NetError::NameNotResolvedFor { .. } => -105,
            NetError::SslProtocolError => -107,
            NetError::ConnectionTimedOut => -118,

            NetError::InvalidUrl => -300,
            NetError::UnknownUrlScheme => -302,
            NetError::InvalidRedirect => -303,
            NetError::TooManyRedirects => -310,
            NetError::InvalidHttpResponse => -370,
            NetError::TooManyRetries => -375,
            // Custom codes start at -900
            NetError::CookieInvalidPrefix => -903,
            NetError::InvalidUtf8 => -911,
            NetError::JsonParseError => -912,
            NetError::HttpStatus(_) => -913,
            NetError::CookieDatabaseLocked => -920,
            NetError::CookieDatabaseError { .. } => -921,
            NetError::PublicSuffixListUnavailable { .. } => -922,
            NetError::NotBootstrapped => -923,
            NetError::InvalidConfig { .. } => -930,
            NetError::Unknown(code) => *code,
        }
    }

    /// Create a connection error carrying the target and the underlying cause.
    pub fn connection_failed_to(host: &str, port: u16, err: impl std::fmt::Display) -> Self {
        NetError::ConnectionFailedTo {
            host: host.to_string(),
            port,
            message: err.to_string(),
        }
    }

    /// Create a DNS error carrying the domain and the underlying cause.
    pub fn dns_failed(domain: &str, err: impl std::fmt::Display) -> Self {
        NetError::NameNotResolvedFor {
            domain: domain.to_string(),
            message: err.to_string(),
        }
    }

    pub fn cookie_database(err: impl std::fmt::Display) -> Self {
        NetError::CookieDatabaseError {
            message: err.to_string(),
        }
    }

    pub fn suffix_list_unavailable(reason: impl Into<String>) -> Self {
        NetError::PublicSuffixListUnavailable {
            reason: reason.into(),
        }
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        NetError::InvalidConfig {
            message: message.into(),
        }
    }
}

impl From<i32> for NetError {
    fn from(code: i32) -> Self {
        match code {
            -100 => NetError::ConnectionClosed,
            -101 => NetError::ConnectionReset,
            -102 => NetError::ConnectionRefused,
            -104 => NetError::ConnectionFailed,
            -105 => NetError::NameNotResolved,
            -107 => NetError::SslProtocolError,
            -118 => NetError::ConnectionTimedOut,

            -300 => NetError::InvalidUrl,
            -302 => NetError::UnknownUrlScheme,
            -303 => NetError::InvalidRedirect,
            -310 => NetError::TooManyRedirects,
            -370 => NetError::InvalidHttpResponse,
            -375 => NetError::TooManyRetries,
            -903 => NetError::CookieInvalidPrefix,
            -911 => NetError::InvalidUtf8,
            -912 => NetError::JsonParseError,
            -920 => NetError::CookieDatabaseLocked,
            -923 => NetError::NotBootstrapped,
            _ => NetError::Unknown(code),
        }
    }
}

// Conversion from rusqlite errors
impl From<rusqlite::Error> for NetError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(e, _)
                if e.code == rusqlite::ffi::ErrorCode::DatabaseBusy
                    || e.code == rusqlite::ffi::ErrorCode::DatabaseLocked =>
            {
                NetError::CookieDatabaseLocked
            }
            _ => NetError::cookie_database(err),
        }
    }
}
