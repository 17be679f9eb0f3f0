//! # cookienet
//!
//! An HTTP(S) client that keeps browser-grade cookie state.
//!
//! `cookienet` pairs a small HTTP/1.1 client with an RFC 6265 cookie engine:
//! `Set-Cookie` headers are parsed, validated against the public suffix list,
//! merged into a per-session store and replayed on later requests. Persistent
//! cookies survive sessions in SQLite.
//!
//! ## Features
//!
//! - **Cookie Management**: RFC 6265 date parsing, domain/path matching,
//!   secure-shadowing and `__Secure-`/`__Host-` prefixes
//! - **Public Suffix List**: fetched from publicsuffix.org and cached for a day
//! - **Persistence**: cookies and the suffix list stored with `rusqlite`
//! - **Transport**: tokio + hyper HTTP/1.1 over BoringSSL
//! - **Session Policy**: redirects, `429` throttling and reset retries
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cookienet::Client;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), cookienet::base::neterror::NetError> {
//!     let mut client = Client::builder().build()?;
//!     client.bootup().await?;
//!     let response = client.get("https://example.com").await?;
//!     println!("Status: {}", response.status());
//!     client.teardown()
//! }
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Core types, error definitions and the clock
//! - [`cookies`] - Cookie parsing, derivation, storage and persistence
//! - [`http`] - Transport trait, responses and the hyper transport
//! - [`socket`] - DNS, TCP and TLS connection setup
//! - [`config`] - Session configuration
//! - [`client`] - The client session

pub mod base;
pub mod client;
pub mod config;
pub mod cookies;
pub mod http;
pub mod socket;

pub use client::{Client, ClientBuilder, RequestOptions};
pub use config::ClientConfig;
