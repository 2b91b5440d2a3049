//! Collaborator seams supplied by the host: the request channel and the
//! factory that opens one per invocation.

use async_trait::async_trait;
use serde_json::Value;

use crate::TraceError;

/// A JSON POST aimed at a trace endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelRequest {
    pub url: String,
    pub body: Value,
}

/// Raw response handed back by a [`Channel`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelResponse {
    pub status: u16,
    pub payload: Vec<u8>,
}

impl ChannelResponse {
    pub fn new(status: u16, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            payload: payload.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the payload as JSON.
    ///
    /// # Errors
    /// [`TraceError::Transport`] when the payload is not valid JSON.
    pub fn json(&self) -> Result<Value, TraceError> {
        serde_json::from_slice(&self.payload)
            .map_err(|e| TraceError::transport(format!("malformed JSON response: {e}")))
    }

    /// Payload as lossy UTF-8, truncated for log and error messages.
    pub fn snippet(&self) -> String {
        const MAX: usize = 256;
        let text = String::from_utf8_lossy(&self.payload);
        let cut = text.char_indices().nth(MAX).map(|(index, _)| index);
        match cut {
            Some(cut) => format!("{}...", &text[..cut]),
            None => text.into_owned(),
        }
    }
}

/// One request/response exchange.
///
/// A channel carries a single trace; `cancel` must be idempotent and safe to
/// call after `send` has completed.
#[async_trait]
pub trait Channel: Send + Sync {
    /// POST `request.body` as JSON to `request.url` and wait for the reply.
    async fn send(&self, request: ChannelRequest) -> Result<ChannelResponse, TraceError>;

    /// Abort the in-flight request, if any.
    fn cancel(&self);
}

/// Opens a fresh [`Channel`] for each trace.
pub trait Transport: Send + Sync {
    fn open(&self) -> Box<dyn Channel>;
}
