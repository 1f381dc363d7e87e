//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── subscriptions: PathBuf   # JSON file of subscription records
//! ├── http: ReqwestConfig      # Timeout, user agent
//! └── command: Command         # validate | dispatch
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//!
//! ```bash
//! recordhook --subscriptions hooks.json --http-timeout 10 validate
//! RECORDHOOK_SUBSCRIPTIONS=hooks.json HTTP_TIMEOUT=10 recordhook validate
//! ```

mod provider;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use recordhook_core::Operation;
use recordhook_webhook::reqwest::ReqwestConfig;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub use provider::{create_store, create_webhook_service, parse_record};

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "recordhook")]
#[command(about = "Forward record changes to webhook subscribers")]
#[command(version)]
pub struct Cli {
    /// Path to the JSON file holding subscription records.
    #[arg(long, env = "RECORDHOOK_SUBSCRIPTIONS")]
    pub subscriptions: PathBuf,

    /// HTTP client configuration for webhook delivery.
    #[clap(flatten)]
    pub http: ReqwestConfig,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Debug, Clone, Subcommand, Serialize, Deserialize)]
pub enum Command {
    /// Load the subscriptions file and report every entry.
    Validate,

    /// Fire the after-commit hook for one record change.
    Dispatch {
        /// Collection the record belongs to.
        #[arg(long)]
        collection: String,

        /// Mutation kind: insert, update or delete.
        #[arg(long)]
        op: Operation,

        /// Record as a JSON object; must carry an `id`.
        #[arg(long)]
        record: String,
    },
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Initializes tracing with environment-based filtering.
    pub fn init_tracing() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    /// Logs configuration at debug level.
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            subscriptions = %self.subscriptions.display(),
            http_timeout_secs = ?self.http.timeout().map(|timeout| timeout.as_secs()),
            user_agent = %self.http.user_agent(),
            "Configuration"
        );
    }

    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_dispatch() {
        let cli = Cli::try_parse_from([
            "recordhook",
            "--subscriptions",
            "hooks.json",
            "--http-timeout",
            "5",
            "dispatch",
            "--collection",
            "orders",
            "--op",
            "update",
            "--record",
            r#"{"id":"o1"}"#,
        ])
        .unwrap();

        assert_eq!(cli.subscriptions, PathBuf::from("hooks.json"));
        assert_eq!(cli.http.timeout_secs, 5);

        let Command::Dispatch { collection, op, record } = cli.command else {
            panic!("expected dispatch command");
        };
        assert_eq!(collection, "orders");
        assert_eq!(op, Operation::Update);
        assert_eq!(record, r#"{"id":"o1"}"#);
    }

    #[test]
    fn test_parse_rejects_unknown_operation() {
        let result = Cli::try_parse_from([
            "recordhook",
            "--subscriptions",
            "hooks.json",
            "dispatch",
            "--collection",
            "orders",
            "--op",
            "upsert",
            "--record",
            "{}",
        ]);

        assert!(result.is_err());
    }
}
