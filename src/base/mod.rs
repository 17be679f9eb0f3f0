//! Base types and error handling.
//!
//! - [`NetError`](neterror::NetError): crate-wide error codes modeled on `net_error_list.h`
//! - [`Clock`](clock::Clock): injectable time source for the cookie engine

pub mod clock;
pub mod context;
pub mod neterror;
