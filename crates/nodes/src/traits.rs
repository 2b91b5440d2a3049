//! The `ExecutableNode` trait — the contract every activity must fulfil.

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use adapter::CancellationSignal;

use crate::NodeError;

/// Per-run context handed to a node by the host.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// ID of the parent workflow.
    pub workflow_id: Uuid,
    /// ID of the current execution run.
    pub execution_id: Uuid,
    /// Fired by the host when the run is aborted.
    pub cancellation: CancellationSignal,
}

impl ExecutionContext {
    pub fn new(workflow_id: Uuid, execution_id: Uuid) -> Self {
        Self {
            workflow_id,
            execution_id,
            cancellation: CancellationSignal::new(),
        }
    }

    /// Context for a one-off run outside any workflow.
    pub fn detached() -> Self {
        Self::new(Uuid::new_v4(), Uuid::new_v4())
    }
}

/// The core node trait.
#[async_trait]
pub trait ExecutableNode: Send + Sync {
    /// Execute the node, receive the *previous* node's JSON output as `input`,
    /// and return this node's JSON output.
    async fn execute(&self, input: Value, ctx: &ExecutionContext) -> Result<Value, NodeError>;
}
