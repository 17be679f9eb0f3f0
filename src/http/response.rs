//! HTTP Response with body access.

use crate::base::neterror::NetError;
use bytes::Bytes;
use http::{header, HeaderMap, StatusCode};
use std::borrow::Cow;
use url::Url;

/// HTTP Response with its body already read.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    status: StatusCode,
    headers: HeaderMap,
    url: Url,
    body: Bytes,
}

impl HttpResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, url: Url, body: Bytes) -> Self {
        Self {
            status,
            headers,
            url,
            body,
        }
    }

    /// Get the status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Get a reference to the headers. Repeated `Set-Cookie` fields are all kept.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The URL the response was received for.
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn into_body(self) -> Bytes {
        self.body
    }

    /// Every `Set-Cookie` value, in order. Non-ASCII bytes are decoded as
    /// UTF-8, with invalid sequences replaced.
    pub fn set_cookie_headers(&self) -> impl Iterator<Item = Cow<'_, str>> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()))
    }

    pub fn location(&self) -> Option<&str> {
        self.headers.get(header::LOCATION).and_then(|v| v.to_str().ok())
    }

    /// Body as UTF-8 string.
    pub fn text(&self) -> Result<String, NetError> {
        String::from_utf8(self.body.to_vec()).map_err(|_| NetError::InvalidUtf8)
    }

    /// Body as JSON, deserializing to type T.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, NetError> {
        serde_json::from_slice(&self.body).map_err(|_| NetError::JsonParseError)
    }
}
