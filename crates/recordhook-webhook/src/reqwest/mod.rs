//! HTTP delivery backed by reqwest.
//!
//! ```rust,ignore
//! use recordhook_webhook::reqwest::{ReqwestClient, ReqwestConfig};
//!
//! let config = ReqwestConfig::default().with_timeout(10);
//! let service = ReqwestClient::new(config)?.into_service();
//! ```

mod client;
mod config;
mod error;

pub use client::ReqwestClient;
pub use config::{DEFAULT_TIMEOUT_SECS, ReqwestConfig};
pub use error::{Error, Result};

/// Tracing target for HTTP delivery.
pub const TRACING_TARGET: &str = "recordhook_webhook::reqwest";
