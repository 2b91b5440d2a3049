//! Registration of the trace activities with a host.

use std::collections::HashMap;
use std::sync::Arc;

use adapter::{Network, Transport};

use crate::trace::TraceNode;
use crate::ExecutableNode;

/// Maps `node_type` strings to boxed `ExecutableNode` implementations.
pub type NodeRegistry = HashMap<String, Arc<dyn ExecutableNode>>;

/// Every trace activity, keyed by [`Network::node_type`], sharing `transport`.
pub fn registry(transport: Arc<dyn Transport>) -> NodeRegistry {
    Network::ALL
        .into_iter()
        .map(|network| {
            let node: Arc<dyn ExecutableNode> =
                Arc::new(TraceNode::new(network, Arc::clone(&transport)));
            (network.node_type().to_owned(), node)
        })
        .collect()
}
