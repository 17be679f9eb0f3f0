use crate::base::context::IoResultExt;
use crate::base::neterror::NetError;
use crate::http::transport::Scheme;
use crate::socket::client::SocketType;
use crate::socket::tls::TlsConfig;
use tokio::net::TcpStream;

/// Manages the connection process: DNS -> TCP -> SSL.
/// Roughly equivalent to net::ConnectJob.
pub struct ConnectJob;

impl ConnectJob {
    pub async fn connect(
        scheme: Scheme,
        host: &str,
        port: u16,
        tls: &TlsConfig,
    ) -> Result<SocketType, NetError> {
        // 1. DNS Resolution
        // URL hosts keep IPv6 literals bracketed.
        let bare = host.trim_start_matches('[').trim_end_matches(']');
        let addrs = tokio::net::lookup_host((bare, port)).await.dns_context(host)?;

        // 2. TCP Connect, first address that accepts wins
        let mut last_err = NetError::NameNotResolved;
        let mut stream = None;
        for addr in addrs {
            match TcpStream::connect(addr).await.connection_context(host, port) {
                Ok(s) => {
                    stream = Some(s);
                    break;
                }
                Err(e) => {
                    tracing::debug!(%addr, error = %e, "connect attempt failed");
                    last_err = e;
                }
            }
        }
        let stream = stream.ok_or(last_err)?;
        // Nagle only delays small request writes.
        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!(host, error = %e, "could not disable Nagle's algorithm");
        }

        match scheme {
            Scheme::Http => Ok(SocketType::Tcp(stream)),
            // 3. SSL Handshake
            Scheme::Https => {
                let config = tls.connect_configuration(bare)?;
                let tls_stream = tokio_boring::connect(config, bare, stream).await.map_err(|e| {
                    tracing::debug!(host, error = ?e, "TLS handshake failed");
                    NetError::SslProtocolError
                })?;

                Ok(SocketType::Ssl(tls_stream))
            }
        }
    }
}
