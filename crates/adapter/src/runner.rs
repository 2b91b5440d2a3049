//! The trace request adapter.
//!
//! [`run_trace`] is the only operation with I/O:
//! 1. Validates and normalises `serviceUrl` (no I/O on failure).
//! 2. Composes `{serviceUrl}/exts/ArcFMMapServer/{Network}%20Trace`.
//! 3. Builds the flat JSON body with per-network defaults.
//! 4. POSTs through the supplied [`Channel`], racing the caller's
//!    [`CancellationSignal`].
//! 5. Normalises whichever results layout the server returned.

use std::fmt;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, error, info, instrument, warn};

use crate::cancel::CancellationSignal;
use crate::models::TraceRequest;
use crate::response::{TraceResponse, TraceResultSet};
use crate::transport::{Channel, ChannelRequest, ChannelResponse};
use crate::{Network, TraceError};

/// Path of the ArcFM map server extension below the service URL.
pub const EXTENSION_PATH: &str = "exts/ArcFMMapServer";

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Where a single trace invocation stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceState {
    Idle,
    InFlight,
    Completed,
    Cancelled,
    Failed,
}

impl TraceState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TraceState::Completed | TraceState::Cancelled | TraceState::Failed
        )
    }

    /// Terminal state reached by an in-flight trace that ended with `outcome`.
    pub fn settled<T>(outcome: &Result<T, TraceError>) -> Self {
        match outcome {
            Ok(_) => TraceState::Completed,
            Err(TraceError::Cancelled) => TraceState::Cancelled,
            Err(_) => TraceState::Failed,
        }
    }
}

impl fmt::Display for TraceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TraceState::Idle => "idle",
            TraceState::InFlight => "in_flight",
            TraceState::Completed => "completed",
            TraceState::Cancelled => "cancelled",
            TraceState::Failed => "failed",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Request building
// ---------------------------------------------------------------------------

/// Compose the trace endpoint for `network`.
///
/// # Errors
/// [`TraceError::InvalidInput`] if `service_url` is missing or blank.
pub fn endpoint_url(service_url: Option<&str>, network: Network) -> Result<String, TraceError> {
    let base = service_url
        .map(|url| url.trim().trim_end_matches('/'))
        .filter(|url| !url.is_empty())
        .ok_or_else(|| TraceError::invalid_input("serviceUrl is required"))?;

    Ok(format!(
        "{base}/{EXTENSION_PATH}/{}",
        network.endpoint_segment()
    ))
}

/// Build the POST body for `request`.
///
/// Every supplied parameter is forwarded; `traceType` (and `phasesToTrace`
/// for electric traces) fall back to the network's defaults; `f=json` is
/// always set and `serviceUrl` never is.
pub fn build_body(request: &TraceRequest, network: Network) -> Result<Value, TraceError> {
    let mut body = match serde_json::to_value(&request.parameters) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            return Err(TraceError::invalid_input(format!(
                "trace parameters must encode to an object, got {other}"
            )))
        }
        Err(e) => {
            return Err(TraceError::invalid_input(format!(
                "cannot encode trace parameters: {e}"
            )))
        }
    };

    let start_point = serde_json::to_value(&request.start_point)
        .map_err(|e| TraceError::invalid_input(format!("cannot encode startPoint: {e}")))?;

    body.remove("serviceUrl");
    body.insert("startPoint".into(), start_point);
    body.insert(
        "traceType".into(),
        Value::String(
            request
                .trace_type
                .clone()
                .unwrap_or_else(|| network.default_trace_type().to_owned()),
        ),
    );
    if network == Network::Electric {
        body.entry("phasesToTrace")
            .or_insert_with(|| Value::String("Any".into()));
    }
    body.insert("f".into(), Value::String("json".into()));

    Ok(Value::Object(body))
}

// ---------------------------------------------------------------------------
// Response normalisation
// ---------------------------------------------------------------------------

/// Pull the result sets out of a trace payload.
///
/// Servers put them at `results` or, on some versions, `data.results`. A
/// payload with neither is a valid empty answer.
///
/// # Errors
/// [`TraceError::Transport`] if a results array is present but malformed.
pub fn extract_results(payload: &Value) -> Result<Vec<TraceResultSet>, TraceError> {
    let located = [payload.get("results"), payload.pointer("/data/results")]
        .into_iter()
        .flatten()
        .find(|candidate| candidate.is_array());

    let Some(results) = located else {
        if let Some(err) = payload.get("error") {
            warn!("trace payload carries an error object and no results: {err}");
        }
        return Ok(Vec::new());
    };

    Vec::<TraceResultSet>::deserialize(results)
        .map_err(|e| TraceError::transport(format!("cannot decode trace results: {e}")))
}

fn normalise(response: ChannelResponse) -> Result<TraceResponse, TraceError> {
    if !response.is_success() {
        return Err(TraceError::transport(format!(
            "HTTP {}: {}",
            response.status,
            response.snippet()
        )));
    }

    let payload = response.json()?;
    let results = extract_results(&payload)?;
    Ok(TraceResponse { results })
}

// ---------------------------------------------------------------------------
// run_trace
// ---------------------------------------------------------------------------

/// Run one trace against `network`.
///
/// # Errors
/// - [`TraceError::InvalidInput`] before any I/O if `serviceUrl` is missing.
/// - [`TraceError::Transport`] for network, status, or decoding failures.
/// - [`TraceError::Cancelled`] if `signal` fires first; the channel's
///   `cancel` is then called exactly once.
#[instrument(skip_all, fields(network = %network))]
pub async fn run_trace(
    request: &TraceRequest,
    network: Network,
    channel: &dyn Channel,
    signal: &CancellationSignal,
) -> Result<TraceResponse, TraceError> {
    let url = endpoint_url(request.service_url.as_deref(), network)?;
    let body = build_body(request, network)?;

    if signal.is_cancelled() {
        info!(state = %TraceState::Idle, "trace cancelled before dispatch");
        return Err(TraceError::Cancelled);
    }

    debug!(state = %TraceState::InFlight, %url, "dispatching trace request");

    let outcome = tokio::select! {
        biased;

        _ = signal.cancelled() => {
            channel.cancel();
            Err(TraceError::Cancelled)
        }

        response = channel.send(ChannelRequest { url, body }) => {
            response.and_then(normalise)
        }
    };

    let state = TraceState::settled(&outcome);
    match &outcome {
        Ok(response) => info!(
            %state,
            result_sets = response.results.len(),
            features = response.feature_count(),
            exceeded_threshold = response.exceeded_threshold(),
            "trace finished"
        ),
        Err(TraceError::Cancelled) => warn!(%state, "trace aborted by caller"),
        Err(e) => error!(%state, "trace failed: {e}"),
    }

    outcome
}

/// Build a request body without sending it, keyed for display.
pub fn preview(request: &TraceRequest, network: Network) -> Result<Map<String, Value>, TraceError> {
    let url = endpoint_url(request.service_url.as_deref(), network)?;
    let mut preview = Map::new();
    preview.insert("url".into(), Value::String(url));
    preview.insert("body".into(), build_body(request, network)?);
    Ok(preview)
}
