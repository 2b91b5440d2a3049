//! `MockChannel` / `MockTransport` — recording test doubles for [`Channel`]
//! and [`Transport`].
//!
//! Useful wherever a real HTTP round trip is unavailable or irrelevant.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::transport::{Channel, ChannelRequest, ChannelResponse, Transport};
use crate::TraceError;

/// What a mock channel does when `send` is called.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Answer with the given status and JSON payload.
    Json(u16, Value),
    /// Answer with the given status and raw bytes.
    Raw(u16, Vec<u8>),
    /// Fail with the given error.
    Fail(TraceError),
    /// Never answer; only cancellation ends the exchange.
    Hang,
}

/// Call log shared between a transport and every channel it opens.
#[derive(Debug, Default)]
struct Recorder {
    sent: Mutex<Vec<ChannelRequest>>,
    cancels: AtomicUsize,
}

/// A channel that records what it is asked to do.
pub struct MockChannel {
    reply: MockReply,
    recorder: Arc<Recorder>,
}

impl MockChannel {
    pub fn new(reply: MockReply) -> Self {
        Self {
            reply,
            recorder: Arc::new(Recorder::default()),
        }
    }

    /// Succeed with HTTP 200 and `payload`.
    pub fn returning(payload: Value) -> Self {
        Self::new(MockReply::Json(200, payload))
    }

    pub fn failing(error: TraceError) -> Self {
        Self::new(MockReply::Fail(error))
    }

    pub fn hanging() -> Self {
        Self::new(MockReply::Hang)
    }

    /// All requests seen by this channel (in call order).
    pub fn sent(&self) -> Vec<ChannelRequest> {
        self.recorder.sent.lock().unwrap().clone()
    }

    pub fn send_count(&self) -> usize {
        self.recorder.sent.lock().unwrap().len()
    }

    pub fn cancel_count(&self) -> usize {
        self.recorder.cancels.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Channel for MockChannel {
    async fn send(&self, request: ChannelRequest) -> Result<ChannelResponse, TraceError> {
        self.recorder.sent.lock().unwrap().push(request);

        match &self.reply {
            MockReply::Json(status, payload) => {
                Ok(ChannelResponse::new(*status, payload.to_string()))
            }
            MockReply::Raw(status, bytes) => Ok(ChannelResponse::new(*status, bytes.clone())),
            MockReply::Fail(error) => Err(error.clone()),
            MockReply::Hang => std::future::pending().await,
        }
    }

    fn cancel(&self) {
        self.recorder.cancels.fetch_add(1, Ordering::SeqCst);
    }
}

/// A transport whose channels all share one reply and one call log.
pub struct MockTransport {
    reply: MockReply,
    recorder: Arc<Recorder>,
    opened: AtomicUsize,
}

impl MockTransport {
    pub fn new(reply: MockReply) -> Self {
        Self {
            reply,
            recorder: Arc::new(Recorder::default()),
            opened: AtomicUsize::new(0),
        }
    }

    pub fn returning(payload: Value) -> Self {
        Self::new(MockReply::Json(200, payload))
    }

    /// Number of channels opened so far.
    pub fn open_count(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<ChannelRequest> {
        self.recorder.sent.lock().unwrap().clone()
    }

    pub fn send_count(&self) -> usize {
        self.recorder.sent.lock().unwrap().len()
    }

    pub fn cancel_count(&self) -> usize {
        self.recorder.cancels.load(Ordering::SeqCst)
    }
}

impl Transport for MockTransport {
    fn open(&self) -> Box<dyn Channel> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        Box::new(MockChannel {
            reply: self.reply.clone(),
            recorder: Arc::clone(&self.recorder),
        })
    }
}
