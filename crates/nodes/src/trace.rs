//! Trace activities: one node per utility network.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, instrument};

use adapter::{run_trace, Network, TraceError, TraceRequest, Transport};

use crate::traits::ExecutionContext;
use crate::{ExecutableNode, NodeError};

/// Runs an ArcFM trace with its JSON input and emits `{ "results": [...] }`.
pub struct TraceNode {
    network: Network,
    transport: Arc<dyn Transport>,
}

impl TraceNode {
    pub fn new(network: Network, transport: Arc<dyn Transport>) -> Self {
        Self { network, transport }
    }

    pub fn electric(transport: Arc<dyn Transport>) -> Self {
        Self::new(Network::Electric, transport)
    }

    pub fn gas(transport: Arc<dyn Transport>) -> Self {
        Self::new(Network::Gas, transport)
    }

    pub fn water(transport: Arc<dyn Transport>) -> Self {
        Self::new(Network::Water, transport)
    }

    pub fn network(&self) -> Network {
        self.network
    }
}

#[async_trait]
impl ExecutableNode for TraceNode {
    #[instrument(
        skip_all,
        fields(
            network = %self.network,
            workflow_id = %ctx.workflow_id,
            execution_id = %ctx.execution_id,
        )
    )]
    async fn execute(&self, input: Value, ctx: &ExecutionContext) -> Result<Value, NodeError> {
        let request: TraceRequest = serde_json::from_value(input)
            .map_err(|e| TraceError::invalid_input(format!("malformed trace request: {e}")))?;

        let channel = self.transport.open();
        let response = run_trace(&request, self.network, channel.as_ref(), &ctx.cancellation).await?;

        info!(
            result_sets = response.results.len(),
            "{} trace activity finished",
            self.network
        );

        serde_json::to_value(&response)
            .map_err(|e| NodeError::Fatal(format!("cannot encode trace response: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adapter::mock::{MockReply, MockTransport};
    use serde_json::json;

    fn input() -> Value {
        json!({
            "serviceUrl": "https://gis.example.com/arcgis/rest/services/Electric/MapServer",
            "startPoint": { "x": 10.0, "y": 20.0 },
            "protectiveDevices": [501, 502]
        })
    }

    #[tokio::test]
    async fn emits_normalised_results() {
        let transport = Arc::new(MockTransport::returning(json!({
            "data": { "results": [{ "name": "Fuses", "id": 1, "features": [] }] }
        })));
        let node = TraceNode::electric(transport.clone());

        let output = node.execute(input(), &ExecutionContext::detached()).await.unwrap();

        assert_eq!(output, json!({ "results": [{ "name": "Fuses", "id": 1, "features": [] }] }));
        let sent = transport.sent();
        assert_eq!(
            sent[0].url,
            "https://gis.example.com/arcgis/rest/services/Electric/MapServer/exts/ArcFMMapServer/Electric%20Trace"
        );
        assert_eq!(sent[0].body["protectiveDevices"], json!([501, 502]));
        assert_eq!(sent[0].body["phasesToTrace"], json!("Any"));
        assert_eq!(sent[0].body["traceType"], json!("Downstream"));
    }

    #[tokio::test]
    async fn opens_a_fresh_channel_per_execution() {
        let transport = Arc::new(MockTransport::returning(json!({ "results": [] })));
        let node = TraceNode::water(transport.clone());
        let ctx = ExecutionContext::detached();

        let first = node.execute(input(), &ctx).await.unwrap();
        let second = node.execute(input(), &ctx).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(transport.open_count(), 2);
        assert_eq!(transport.send_count(), 2);
    }

    #[tokio::test]
    async fn missing_service_url_is_fatal_without_io() {
        let transport = Arc::new(MockTransport::returning(json!({ "results": [] })));
        let node = TraceNode::gas(transport.clone());

        let err = node
            .execute(json!({ "startPoint": { "x": 0, "y": 0 } }), &ExecutionContext::detached())
            .await
            .unwrap_err();

        assert!(matches!(err, NodeError::Fatal(_)));
        assert_eq!(transport.send_count(), 0);
    }

    #[tokio::test]
    async fn malformed_input_is_fatal() {
        let transport = Arc::new(MockTransport::returning(json!({ "results": [] })));
        let node = TraceNode::water(transport.clone());

        let err = node
            .execute(json!({ "serviceUrl": "https://x", "startPoint": "here" }), &ExecutionContext::detached())
            .await
            .unwrap_err();

        assert!(matches!(err, NodeError::Fatal(_)));
        assert_eq!(transport.open_count(), 0);
    }

    #[tokio::test]
    async fn transport_failures_are_retryable() {
        let transport = Arc::new(MockTransport::new(MockReply::Json(502, json!({}))));
        let node = TraceNode::water(transport.clone());

        let err = node.execute(input(), &ExecutionContext::detached()).await.unwrap_err();

        assert!(matches!(err, NodeError::Retryable(_)));
        assert_eq!(transport.send_count(), 1);
    }

    #[tokio::test]
    async fn host_cancellation_aborts_the_channel() {
        let transport = Arc::new(MockTransport::new(MockReply::Hang));
        let node = TraceNode::gas(transport.clone());
        let ctx = ExecutionContext::detached();

        let (result, ()) = tokio::join!(node.execute(input(), &ctx), async {
            tokio::task::yield_now().await;
            ctx.cancellation.cancel();
        });

        assert_eq!(result, Err(NodeError::Cancelled));
        assert_eq!(transport.cancel_count(), 1);
    }
}
