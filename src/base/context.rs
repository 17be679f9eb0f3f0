//! Error context helpers.
//!
//! Extension traits that turn bare `io::Error`s into `NetError` variants
//! carrying the host, domain or file the operation was aimed at.

use crate::base::neterror::NetError;
use std::io;
use std::path::Path;

/// Extension trait for adding context to IO Results.
pub trait IoResultExt<T> {
    /// Add connection context to an IO error.
    ///
    /// # Example
    /// ```ignore
    /// use cookienet::base::context::IoResultExt;
    ///
    /// let stream = TcpStream::connect(addr).await
    ///     .connection_context("example.com", 443)?;
    /// // Error: "Connection to example.com:443 failed: connection refused"
    /// ```
    fn connection_context(self, host: &str, port: u16) -> Result<T, NetError>;

    /// Add DNS resolution context to an IO error.
    fn dns_context(self, domain: &str) -> Result<T, NetError>;

    /// Add the offending file to an error raised while reading configuration.
    fn config_context(self, path: &Path) -> Result<T, NetError>;
}

impl<T> IoResultExt<T> for Result<T, io::Error> {
    fn connection_context(self, host: &str, port: u16) -> Result<T, NetError> {
        self.map_err(|e| {
            if e.kind() == io::ErrorKind::ConnectionReset {
                NetError::ConnectionReset
            } else {
                NetError::connection_failed_to(host, port, e)
            }
        })
    }

    fn dns_context(self, domain: &str) -> Result<T, NetError> {
        self.map_err(|e| NetError::dns_failed(domain, e))
    }

    fn config_context(self, path: &Path) -> Result<T, NetError> {
        self.map_err(|e| NetError::invalid_config(format!("{}: {}", path.display(), e)))
    }
}
