//! Transport configuration.

use std::time::Duration;

/// Tuning knobs for [`crate::HttpTransport`].
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Whole-request timeout. The adapter imposes none of its own.
    pub timeout: Option<Duration>,
    /// Connect timeout, applied separately from `timeout`.
    pub connect_timeout: Option<Duration>,
    /// `User-Agent` header sent with every trace.
    pub user_agent: String,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            connect_timeout: Some(Duration::from_secs(10)),
            user_agent: concat!("utility-trace/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ChannelConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
