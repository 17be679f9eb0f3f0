//! The seam between the client session and the network.
//!
//! [`Transport`] sends one fully prepared request and yields one response.
//! The session never talks to sockets directly, so tests can script
//! responses with an in-memory implementation.

use crate::base::neterror::NetError;
use crate::http::response::HttpResponse;
use bytes::Bytes;
use http::{HeaderMap, Method};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use url::Url;

/// `http` or `https`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn from_url(url: &Url) -> Result<Self, NetError> {
        match url.scheme() {
            "http" => Ok(Scheme::Http),
            "https" => Ok(Scheme::Https),
            _ => Err(NetError::UnknownUrlScheme),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            Scheme::Http => 80,
            Scheme::Https => 443,
        }
    }

    pub fn is_secure(&self) -> bool {
        matches!(self, Scheme::Https)
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request as handed to the transport, headers already final.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub scheme: Scheme,
    pub host: String,
    pub port: u16,
    /// Path plus query, e.g. `/search?q=1`.
    pub path: String,
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
    /// Skip reading the body; the response carries an empty one.
    pub headers_only: bool,
}

impl TransportRequest {
    /// Build a bodyless request for `url`.
    pub fn from_url(method: Method, url: &Url) -> Result<Self, NetError> {
        let scheme = Scheme::from_url(url)?;
        let host = url.host_str().ok_or(NetError::InvalidUrl)?.to_string();
        let port = url.port().unwrap_or_else(|| scheme.default_port());

        Ok(Self {
            scheme,
            host,
            port,
            path: path_and_query(url),
            method,
            headers: HeaderMap::new(),
            body: None,
            headers_only: false,
        })
    }

    /// Value for the `Host` header; the port is omitted when it is the scheme default.
    pub fn host_header(&self) -> String {
        if self.port == self.scheme.default_port() {
            self.host.clone()
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// The absolute URL this request targets.
    pub fn url(&self) -> Result<Url, NetError> {
        Url::parse(&format!("{}://{}{}", self.scheme, self.host_header(), self.path))
            .map_err(|_| NetError::InvalidUrl)
    }
}

/// The request target of `url`: its path followed by `?query` when present.
pub fn path_and_query(url: &Url) -> String {
    match url.query() {
        Some(q) => format!("{}?{}", url.path(), q),
        None => url.path().to_string(),
    }
}

/// Alias for the `Future` type returned by a transport.
pub type Sending = Pin<Box<dyn Future<Output = Result<HttpResponse, NetError>> + Send>>;

/// Sends HTTP requests.
///
/// Implementations must be thread-safe; the session holds one behind an `Arc`.
pub trait Transport: Send + Sync {
    fn send(&self, request: TransportRequest) -> Sending;
}

/// Blanket implementation for Arc-wrapped transports.
impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, request: TransportRequest) -> Sending {
        (**self).send(request)
    }
}
