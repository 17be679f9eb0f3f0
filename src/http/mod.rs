pub mod response;
pub mod streamfactory;
pub mod transport;

// Re-exports for convenience
pub use response::HttpResponse;
pub use streamfactory::HttpTransport;
pub use transport::{Scheme, Transport, TransportRequest};
