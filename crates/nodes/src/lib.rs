//! `nodes` crate — the `ExecutableNode` trait and the trace activities.
//!
//! A host registers the nodes returned by [`registry`] and dispatches
//! through the trait object; each node wraps one utility network trace.

pub mod error;
pub mod registry;
pub mod trace;
pub mod traits;

pub use error::NodeError;
pub use registry::{registry, NodeRegistry};
pub use trace::TraceNode;
pub use traits::{ExecutableNode, ExecutionContext};
