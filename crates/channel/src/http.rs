//! reqwest-backed [`Transport`] and [`Channel`].

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{debug, warn};

use adapter::{Channel, ChannelRequest, ChannelResponse, TraceError, Transport};

use crate::ChannelConfig;

/// Opens one [`HttpChannel`] per trace over a shared connection pool.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build the underlying client from `config`.
    ///
    /// # Errors
    /// [`TraceError::Transport`] if the TLS backend cannot be initialised.
    pub fn new(config: &ChannelConfig) -> Result<Self, TraceError> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(connect_timeout) = config.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }

        let client = builder
            .build()
            .map_err(|e| TraceError::transport(format!("cannot build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    pub fn channel(&self) -> HttpChannel {
        HttpChannel::new(self.client.clone())
    }
}

impl Transport for HttpTransport {
    fn open(&self) -> Box<dyn Channel> {
        Box::new(self.channel())
    }
}

/// A single POST exchange that can be aborted from another task.
///
/// Cancelling drops the in-flight reqwest future, which closes the
/// connection. Once cancelled the channel refuses further sends.
#[derive(Debug)]
pub struct HttpChannel {
    client: reqwest::Client,
    cancelled: watch::Sender<bool>,
}

impl HttpChannel {
    pub fn new(client: reqwest::Client) -> Self {
        let (cancelled, _) = watch::channel(false);
        Self { client, cancelled }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancelled.borrow()
    }

    async fn exchange(&self, request: ChannelRequest) -> Result<ChannelResponse, TraceError> {
        let response = self
            .client
            .post(&request.url)
            .json(&request.body)
            .send()
            .await
            .map_err(|e| TraceError::transport(format!("request to {} failed: {e}", request.url)))?;

        let status = response.status().as_u16();
        let payload = response
            .bytes()
            .await
            .map_err(|e| TraceError::transport(format!("cannot read response body: {e}")))?;

        debug!(status, bytes = payload.len(), "trace response received");
        Ok(ChannelResponse::new(status, payload.to_vec()))
    }
}

#[async_trait]
impl Channel for HttpChannel {
    async fn send(&self, request: ChannelRequest) -> Result<ChannelResponse, TraceError> {
        let mut cancelled = self.cancelled.subscribe();
        let url = request.url.clone();

        tokio::select! {
            biased;

            _ = cancelled.wait_for(|flag| *flag) => {
                warn!(%url, "HTTP exchange aborted");
                Err(TraceError::Cancelled)
            }

            response = self.exchange(request) => response,
        }
    }

    fn cancel(&self) {
        self.cancelled.send_replace(true);
    }
}
