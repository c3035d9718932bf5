//! JSON-RPC client for Odoo-style business servers.
//!
//! Provides the envelope types, an HTTP transport with cookie-based
//! session propagation, the [`OdooClient`] with whitelist-enforcing
//! read/search/write operations and session-expiry recovery, and the
//! grouped-write and verification steps built on it.

pub mod batch;
pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod session;
pub mod testing;
pub mod transport;
pub mod verify;

pub use client::{Kwargs, OdooClient};
pub use config::ClientConfig;
pub use error::{RpcError, RpcResult};
