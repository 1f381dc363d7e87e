//! HTTP client settings.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use reqwest::ClientBuilder;
use serde::{Deserialize, Serialize};

use super::{Error, Result};

/// Client-wide request timeout used when none is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings of the HTTP client that POSTs envelopes.
///
/// This timeout is the only deadline a dispatch is subject to. A timeout of
/// zero leaves the client without one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct ReqwestConfig {
    /// Webhook request timeout in seconds (0 disables the timeout)
    #[cfg_attr(
        feature = "config",
        arg(long = "http-timeout", env = "HTTP_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS)
    )]
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent sent with every webhook request
    #[cfg_attr(
        feature = "config",
        arg(long = "http-user-agent", env = "HTTP_USER_AGENT")
    )]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ReqwestConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: None,
        }
    }
}

impl ReqwestConfig {
    #[must_use]
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Request timeout, or `None` when set to zero.
    pub fn timeout(&self) -> Option<Duration> {
        match self.timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Configured user agent, or `recordhook/<version>`.
    pub fn user_agent(&self) -> String {
        match &self.user_agent {
            Some(user_agent) => user_agent.clone(),
            None => concat!("recordhook/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self.user_agent.as_deref() {
            Some(ua) if ua.trim().is_empty() => {
                Err(Error::Config("user agent must not be blank".to_owned()))
            }
            _ => Ok(()),
        }
    }

    /// Applies these settings to a client builder.
    pub(crate) fn apply(&self, builder: ClientBuilder) -> ClientBuilder {
        let builder = builder.user_agent(self.user_agent());
        match self.timeout() {
            Some(timeout) => builder.timeout(timeout),
            None => builder,
        }
    }
}
