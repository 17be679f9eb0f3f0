//! HTTP client session with a persistent cookie store.
//!
//! A [`Client`] owns one cookie jar. [`Client::bootup`] loads the public
//! suffix list and the persisted cookies, every request attaches matching
//! cookies and stores the ones the server sets, and [`Client::teardown`]
//! writes persistent cookies back.
//!
//! # Example
//!
//! ```rust,no_run
//! use cookienet::Client;
//! use cookienet::client::RequestOptions;
//!
//! # async fn run() -> Result<(), cookienet::base::neterror::NetError> {
//! let mut client = Client::builder().build()?;
//! client.bootup().await?;
//!
//! let resp = client.get("https://example.com/login").await?;
//! println!("{}", resp.status());
//!
//! let resp = client
//!     .request(RequestOptions::post("https://example.com/search", "q=rust").header("X-Trace", "1"))
//!     .await?;
//! println!("{}", resp.text()?);
//!
//! client.teardown()?;
//! # Ok(())
//! # }
//! ```

use crate::base::clock::{Clock, SystemClock};
use crate::base::neterror::NetError;
use crate::config::ClientConfig;
use crate::cookies::deriver::CookieOrigin;
use crate::cookies::monster::CookieMonster;
use crate::cookies::persistence::{PersistentCookieStore, SqlitePersistentStore};
use crate::cookies::psl::{needs_refresh, CachedSuffixes, PublicSuffixList, SuffixMatcher};
use crate::http::streamfactory::HttpTransport;
use crate::http::transport::{path_and_query, Scheme, Transport, TransportRequest};
use crate::http::HttpResponse;
use bytes::Bytes;
use http::header::{self, HeaderMap, HeaderName, HeaderValue};
use http::{Method, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Options for a single request.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    method: Method,
    url: String,
    headers: HeaderMap,
    body: Option<Bytes>,
    timeout: Option<Duration>,
    headers_only: bool,
    use_cookies: bool,
}

impl RequestOptions {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
            timeout: None,
            headers_only: false,
            use_cookies: true,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self::new(Method::POST, url).body(body)
    }

    /// Add a header. Caller headers override the client defaults.
    /// Invalid values are ignored.
    pub fn header<K, V>(mut self, key: K, value: V) -> Self
    where
        K: header::IntoHeaderName,
        V: TryInto<HeaderValue>,
    {
        if let Ok(val) = value.try_into() {
            self.headers.insert(key, val);
        }
        self
    }

    /// Set request body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set JSON body.
    #[cfg(feature = "json")]
    pub fn json<T: serde::Serialize>(mut self, json: &T) -> Self {
        if let Ok(bytes) = serde_json::to_vec(json) {
            self.body = Some(Bytes::from(bytes));
            self.headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
        }
        self
    }

    /// Pause for `delay` after a successful response before returning it.
    pub fn timeout(mut self, delay: Duration) -> Self {
        self.timeout = Some(delay);
        self
    }

    /// Return as soon as the headers arrive; the body is not read.
    pub fn headers_only(mut self, headers_only: bool) -> Self {
        self.headers_only = headers_only;
        self
    }

    /// Send the request without a `Cookie` header. `Set-Cookie` is still honoured.
    pub fn use_cookies(mut self, use_cookies: bool) -> Self {
        self.use_cookies = use_cookies;
        self
    }
}

/// HTTP client session.
///
/// Use [`Client::builder()`] to configure and create a client.
pub struct Client {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    persistence: Box<dyn PersistentCookieStore>,
    clock: Arc<dyn Clock>,
    suffixes: Option<Arc<dyn SuffixMatcher>>,
    cookies: CookieMonster,
    default_headers: HeaderMap,
    booted: bool,
}

impl Client {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Load the public suffix list and the persisted cookies.
    ///
    /// The suffix list comes from the persisted cache when it is younger
    /// than a day and from upstream otherwise. Failing to fetch it is fatal.
    pub async fn bootup(&mut self) -> Result<(), NetError> {
        if self.suffixes.is_none() {
            let list = self.load_public_suffixes().await?;
            self.suffixes = Some(Arc::new(list));
        }

        let stored = self.persistence.load_all_cookies()?;
        self.cookies = CookieMonster::from_cookies(stored);
        self.booted = true;

        tracing::info!(cookies = self.cookies.len(), "client booted");
        Ok(())
    }

    async fn load_public_suffixes(&mut self) -> Result<PublicSuffixList, NetError> {
        let now = self.clock.now();
        let cached = self.persistence.load_suffix_cache()?;

        if !needs_refresh(cached.as_ref(), now) {
            if let Some(cached) = cached {
                tracing::debug!(suffixes = cached.list.len(), "using cached public suffix list");
                return Ok(cached.list);
            }
        }

        tracing::info!(url = %self.config.public_suffix_url, "public suffix list missing or outdated; fetching upstream");
        let url = Url::parse(&self.config.public_suffix_url).map_err(|_| NetError::InvalidUrl)?;
        let mut request = TransportRequest::from_url(Method::GET, &url)?;
        request.headers = self.default_headers.clone();

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| NetError::suffix_list_unavailable(e.to_string()))?;
        if !response.status().is_success() {
            return Err(NetError::suffix_list_unavailable(format!(
                "upstream answered {}",
                response.status()
            )));
        }

        let text = response
            .text()
            .map_err(|e| NetError::suffix_list_unavailable(e.to_string()))?;
        let list = PublicSuffixList::parse(&text);
        if list.is_empty() {
            return Err(NetError::suffix_list_unavailable("upstream list is empty"));
        }

        self.persistence.store_suffix_cache(&CachedSuffixes {
            fetched_at: now,
            list: list.clone(),
        })?;
        tracing::info!(suffixes = list.len(), "public suffix list refreshed");
        Ok(list)
    }

    /// Send a GET request.
    pub async fn get(&mut self, url: &str) -> Result<HttpResponse, NetError> {
        self.request(RequestOptions::get(url)).await
    }

    /// Send a request, following redirects and retrying throttled or reset
    /// exchanges.
    ///
    /// Resolves with the first 2xx response. `403` and any other status that
    /// is neither handled nor successful surface as [`NetError::HttpStatus`].
    pub async fn request(&mut self, options: RequestOptions) -> Result<HttpResponse, NetError> {
        if !self.booted {
            return Err(NetError::NotBootstrapped);
        }
        let suffixes = self.suffixes.clone().ok_or(NetError::NotBootstrapped)?;

        let mut url = Url::parse(&options.url).map_err(|_| NetError::InvalidUrl)?;
        let mut method = options.method.clone();
        let mut body = options.body.clone();
        let mut redirects = 0u32;
        let mut retries = 0u32;

        loop {
            let request = self.prepare(&options, &url, method.clone(), body.clone())?;
            let secure = request.scheme.is_secure();

            let response = match self.transport.send(request).await {
                Ok(response) => response,
                Err(NetError::ConnectionReset) => {
                    self.take_retry(&mut retries)?;
                    let delay = self.config.retry.reset_retry_delay();
                    tracing::warn!(url = %url, ?delay, "connection reset before the response; retrying");
                    tokio::time::sleep(delay).await;
                    continue;
                }
                Err(e) => return Err(e),
            };

            self.ingest(&url, secure, &response, suffixes.as_ref());

            let status = response.status();
            if status.is_success() {
                if let Some(delay) = options.timeout {
                    tokio::time::sleep(delay).await;
                }
                return Ok(response);
            }

            if status.is_redirection() {
                if let Some(location) = response.location() {
                    if redirects >= self.config.retry.max_redirects {
                        return Err(NetError::TooManyRedirects);
                    }
                    redirects += 1;

                    let next = url.join(location).map_err(|_| NetError::InvalidRedirect)?;
                    Scheme::from_url(&next).map_err(|_| NetError::InvalidRedirect)?;
                    if self.config.debug.summaries() {
                        tracing::info!(from = %url, to = %next, "following redirect");
                    }

                    if status == StatusCode::SEE_OTHER {
                        method = Method::GET;
                        body = None;
                    }
                    url = next;
                    continue;
                }
            }

            match status {
                StatusCode::TOO_MANY_REQUESTS => {
                    self.take_retry(&mut retries)?;
                    let delay = self.config.retry.throttle_delay();
                    tracing::warn!(url = %url, ?delay, "server returned 429; waiting");
                    tokio::time::sleep(delay).await;
                }
                StatusCode::FORBIDDEN => return Err(NetError::HttpStatus(403)),
                other => return Err(NetError::HttpStatus(other.as_u16())),
            }
        }
    }

    fn take_retry(&self, retries: &mut u32) -> Result<(), NetError> {
        if *retries >= self.config.retry.max_retries {
            return Err(NetError::TooManyRetries);
        }
        *retries += 1;
        Ok(())
    }

    /// Build the wire request: defaults, then `Cookie`, then caller headers.
    fn prepare(
        &mut self,
        options: &RequestOptions,
        url: &Url,
        method: Method,
        body: Option<Bytes>,
    ) -> Result<TransportRequest, NetError> {
        let mut request = TransportRequest::from_url(method, url)?;
        let mut headers = self.default_headers.clone();

        if options.use_cookies {
            let now = self.clock.now();
            let cookie = self.cookies.get_cookie_header(
                &request.host,
                &request.path,
                request.scheme.is_secure(),
                now,
            );
            if !cookie.is_empty() {
                match HeaderValue::from_str(&cookie) {
                    Ok(value) => {
                        headers.insert(header::COOKIE, value);
                    }
                    Err(e) => {
                        tracing::warn!(
                            url = %url,
                            error = %e,
                            "stored cookies do not form a valid header; sending none"
                        );
                    }
                }
            }
        }

        for key in options.headers.keys() {
            headers.remove(key);
        }
        for (key, value) in options.headers.iter() {
            headers.append(key.clone(), value.clone());
        }

        if self.config.debug.summaries() {
            tracing::info!(method = %request.method, url = %url, headers = ?headers, "sending request");
        }

        request.headers = headers;
        request.body = body;
        request.headers_only = options.headers_only;
        Ok(request)
    }

    /// Store the cookies a response sets.
    fn ingest(&mut self, url: &Url, secure: bool, response: &HttpResponse, suffixes: &dyn SuffixMatcher) {
        let debug = self.config.debug;
        if debug.summaries() {
            tracing::info!(
                url = %url,
                status = response.status().as_u16(),
                headers = ?response.headers(),
                "received response"
            );
        }

        let lines: Vec<_> = response.set_cookie_headers().collect();
        if !lines.is_empty() {
            let Some(host) = url.host_str() else {
                return;
            };
            let origin = CookieOrigin::new(host, secure);
            let stored = self.cookies.set_cookies_from_response(
                &origin,
                &path_and_query(url),
                lines.iter().map(|line| &**line),
                suffixes,
                self.clock.now(),
            );
            tracing::debug!(received = lines.len(), stored, "processed Set-Cookie headers");
        }

        if debug.store_dumps() {
            let pairs: Vec<String> = self.cookies.iter().map(|c| c.to_header_pair()).collect();
            tracing::debug!(cookies = ?pairs, "cookies in store");
        }
    }

    /// Persist the persistent cookies. The client must be booted again before reuse.
    pub fn teardown(&mut self) -> Result<(), NetError> {
        self.cookies.evict_expired(self.clock.now());
        self.persistence.replace_all(&self.cookies.persistent_cookies())?;
        self.booted = false;
        tracing::info!(cookies = self.cookies.len(), "client torn down");
        Ok(())
    }

    pub fn cookie_store(&self) -> &CookieMonster {
        &self.cookies
    }

    pub fn cookie_store_mut(&mut self) -> &mut CookieMonster {
        &mut self.cookies
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn is_booted(&self) -> bool {
        self.booted
    }
}

/// Builder for creating a [`Client`].
#[derive(Default)]
pub struct ClientBuilder {
    config: Option<ClientConfig>,
    transport: Option<Arc<dyn Transport>>,
    persistence: Option<Box<dyn PersistentCookieStore>>,
    clock: Option<Arc<dyn Clock>>,
    suffixes: Option<Arc<dyn SuffixMatcher>>,
}

impl ClientBuilder {
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Replace the network transport.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Replace the persistence backend chosen from `config.storage`.
    pub fn persistence(mut self, store: Box<dyn PersistentCookieStore>) -> Self {
        self.persistence = Some(store);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Use this suffix list; bootup then skips loading one.
    pub fn suffix_list(self, list: PublicSuffixList) -> Self {
        self.suffix_matcher(Arc::new(list))
    }

    /// Use any suffix matcher, e.g. [`BuiltinSuffixList`](crate::cookies::psl::BuiltinSuffixList).
    pub fn suffix_matcher(mut self, matcher: Arc<dyn SuffixMatcher>) -> Self {
        self.suffixes = Some(matcher);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<Client, NetError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let default_headers = default_headers(&config)?;
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(&config.transport)),
        };
        let persistence = match self.persistence {
            Some(store) => store,
            None => match &config.storage.database_path {
                Some(path) => Box::new(SqlitePersistentStore::open(path)?),
                None => Box::new(SqlitePersistentStore::open_in_memory()?),
            },
        };

        Ok(Client {
            transport,
            persistence,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            suffixes: self.suffixes,
            cookies: CookieMonster::new(),
            default_headers,
            booted: false,
            config,
        })
    }
}

/// Headers a desktop Firefox sends on a top-level navigation.
fn default_headers(config: &ClientConfig) -> Result<HeaderMap, NetError> {
    let mut headers = HeaderMap::new();
    let mut set = |name: HeaderName, value: &str| -> Result<(), NetError> {
        let value = HeaderValue::from_str(value)
            .map_err(|_| NetError::invalid_config(format!("invalid value for {}: {:?}", name, value)))?;
        headers.insert(name, value);
        Ok(())
    };

    set(
        header::ACCEPT,
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
    )?;
    set(header::ACCEPT_LANGUAGE, &config.accept_language)?;
    set(header::DNT, "1")?;
    set(HeaderName::from_static("sec-fetch-dest"), "document")?;
    set(HeaderName::from_static("sec-fetch-mode"), "no-cors")?;
    set(HeaderName::from_static("sec-fetch-site"), "none")?;
    set(HeaderName::from_static("sec-fetch-user"), "?1")?;
    set(HeaderName::from_static("sec-gpc"), "1")?;
    set(header::UPGRADE_INSECURE_REQUESTS, "1")?;
    set(header::USER_AGENT, &config.user_agent)?;
    if config.transport.keep_alive {
        set(header::CONNECTION, "keep-alive")?;
    }

    Ok(headers)
}
