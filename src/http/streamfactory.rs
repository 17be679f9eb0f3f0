use crate::base::neterror::NetError;
use crate::config::TransportOptions;
use crate::http::response::HttpResponse;
use crate::http::transport::{Sending, Transport, TransportRequest};
use crate::socket::client::SocketType;
use crate::socket::connectjob::ConnectJob;
use crate::socket::tls::TlsConfig;
use bytes::Bytes;
use http::{header, HeaderValue, Request, Response};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::client::conn::http1;
use hyper_util::rt::TokioIo;
use std::sync::Arc;
use std::time::Duration;
use tokio::spawn;
use tokio::sync::Semaphore;

/// Wraps one HTTP/1.1 connection.
/// Equivalent to net::HttpStream.
pub struct HttpStream {
    sender: http1::SendRequest<Full<Bytes>>,
}

impl HttpStream {
    /// Run the HTTP/1.1 handshake over a connected socket and spawn its driver.
    pub async fn handshake(socket: SocketType) -> Result<Self, NetError> {
        let io = TokioIo::new(socket);
        let (sender, conn) = http1::handshake(io).await.map_err(map_hyper_error)?;

        spawn(async move {
            if let Err(e) = conn.await {
                tracing::debug!(error = %e, "connection driver exited");
            }
        });

        Ok(Self { sender })
    }

    pub async fn send_request(
        &mut self,
        req: Request<Full<Bytes>>,
    ) -> Result<Response<Incoming>, NetError> {
        self.sender.send_request(req).await.map_err(map_hyper_error)
    }
}

/// Translate a hyper failure into the closest net error.
pub fn map_hyper_error(e: hyper::Error) -> NetError {
    if e.is_incomplete_message() || is_connection_reset(&e) {
        NetError::ConnectionReset
    } else if e.is_parse() || e.is_parse_status() {
        NetError::InvalidHttpResponse
    } else if e.is_closed() || e.is_canceled() {
        NetError::ConnectionClosed
    } else if e.is_timeout() {
        NetError::ConnectionTimedOut
    } else {
        NetError::ConnectionFailed
    }
}

/// Whether an `io::Error` of kind `ConnectionReset` appears anywhere in the source chain.
fn is_connection_reset(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(io) = e.downcast_ref::<std::io::Error>() {
            if io.kind() == std::io::ErrorKind::ConnectionReset {
                return true;
            }
        }
        current = e.source();
    }
    false
}

/// The network [`Transport`]: DNS, TCP, optional TLS, then one HTTP/1.1 exchange.
///
/// Each request gets a fresh connection. A semaphore caps how many are
/// open at once.
#[derive(Clone)]
pub struct HttpTransport {
    sockets: Arc<Semaphore>,
    connect_timeout: Duration,
    tls: TlsConfig,
}

impl HttpTransport {
    pub fn new(options: &TransportOptions) -> Self {
        Self::with_tls(options, TlsConfig::default())
    }

    pub fn with_tls(options: &TransportOptions, tls: TlsConfig) -> Self {
        Self {
            sockets: Arc::new(Semaphore::new(options.max_sockets.max(1))),
            connect_timeout: options.connect_timeout(),
            tls,
        }
    }

    /// Sockets that could be opened right now.
    pub fn available_sockets(&self) -> usize {
        self.sockets.available_permits()
    }

    fn build_request(request: &TransportRequest) -> Result<Request<Full<Bytes>>, NetError> {
        let mut req = Request::builder()
            .method(request.method.clone())
            .uri(request.path.as_str())
            .body(Full::new(request.body.clone().unwrap_or_default()))
            .map_err(|_| NetError::InvalidUrl)?;

        *req.headers_mut() = request.headers.clone();
        if !req.headers().contains_key(header::HOST) {
            let host = HeaderValue::from_str(&request.host_header()).map_err(|_| NetError::InvalidUrl)?;
            req.headers_mut().insert(header::HOST, host);
        }
        Ok(req)
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: TransportRequest) -> Sending {
        let this = self.clone();
        Box::pin(async move {
            let _permit = this
                .sockets
                .clone()
                .acquire_owned()
                .await
                .map_err(|_| NetError::ConnectionClosed)?;

            let socket = tokio::time::timeout(
                this.connect_timeout,
                ConnectJob::connect(request.scheme, &request.host, request.port, &this.tls),
            )
            .await
            .map_err(|_| NetError::ConnectionTimedOut)??;

            tracing::trace!(
                host = %request.host,
                port = request.port,
                secure = socket.is_secure(),
                alpn = ?socket.negotiated_protocol().map(String::from_utf8_lossy),
                "connected"
            );

            let url = request.url()?;
            let mut stream = HttpStream::handshake(socket).await?;
            let response = stream.send_request(Self::build_request(&request)?).await?;
            let (parts, body) = response.into_parts();

            let body = if request.headers_only {
                Bytes::new()
            } else {
                body.collect().await.map_err(map_hyper_error)?.to_bytes()
            };

            Ok(HttpResponse::new(parts.status, parts.headers, url, body))
        })
    }
}
