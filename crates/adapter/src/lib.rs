//! `adapter` crate — trace request/response mapping for the ArcFM utility
//! network trace REST extension (electric, gas and water).
//!
//! The adapter is stateless: every call to [`run_trace`] builds its request
//! from scratch, sends it through a host-supplied [`Channel`], and reshapes
//! the reply into a [`TraceResponse`].

pub mod cancel;
pub mod error;
pub mod mock;
pub mod models;
pub mod network;
pub mod response;
pub mod runner;
pub mod transport;

pub use cancel::CancellationSignal;
pub use error::TraceError;
pub use models::{IdList, PhaseFilter, Point, SpatialReference, TraceParameters, TraceRequest};
pub use network::Network;
pub use response::{Feature, Field, TraceResponse, TraceResultSet};
pub use runner::{build_body, endpoint_url, extract_results, run_trace, TraceState};
pub use transport::{Channel, ChannelRequest, ChannelResponse, Transport};
