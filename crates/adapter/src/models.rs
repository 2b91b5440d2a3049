//! Trace request models.
//!
//! A [`TraceRequest`] is decoded straight from the activity's JSON input
//! (camelCase keys, as the ArcFM REST extension names them) and encoded
//! back into the POST body by [`crate::runner::build_body`]. Numeric
//! fields are held as [`Number`] so `5` goes back out as `5`, not `5.0`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

// ---------------------------------------------------------------------------
// Spatial reference / point
// ---------------------------------------------------------------------------

/// Coordinate system descriptor: a well-known ID, a WKT string, or both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpatialReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wkid: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_wkid: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wkt: Option<String>,
}

impl SpatialReference {
    pub fn wkid(wkid: i64) -> Self {
        Self {
            wkid: Some(wkid.into()),
            ..Self::default()
        }
    }
}

/// Location the trace starts from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Point {
    pub x: Number,
    pub y: Number,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spatial_reference: Option<SpatialReference>,
}

impl Point {
    pub fn new(x: impl Into<Number>, y: impl Into<Number>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
            spatial_reference: None,
        }
    }

    /// `None` if either coordinate is NaN or infinite.
    pub fn from_f64(x: f64, y: f64) -> Option<Self> {
        Some(Self {
            x: Number::from_f64(x)?,
            y: Number::from_f64(y)?,
            spatial_reference: None,
        })
    }

    pub fn with_spatial_reference(mut self, spatial_reference: SpatialReference) -> Self {
        self.spatial_reference = Some(spatial_reference);
        self
    }
}

// ---------------------------------------------------------------------------
// Flexible parameter types
// ---------------------------------------------------------------------------

/// Element IDs as the REST API accepts them.
///
/// The server takes a bare number, an array, or a comma-separated string;
/// whichever form the caller supplied is sent back out untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdList {
    Single(Number),
    Many(Vec<Number>),
    Text(String),
}

/// Electric phase filter: a phase designation (`"Any"`, `"ABC"`) or the
/// numeric phase mask some server versions expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PhaseFilter {
    Named(String),
    Mask(Number),
}

// ---------------------------------------------------------------------------
// TraceParameters
// ---------------------------------------------------------------------------

/// Optional trace parameters.
///
/// Fields for every network live side by side; whichever ones the caller
/// set are forwarded, whatever the target network. Keys not modelled here
/// land in `extra` and are forwarded verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_edges: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_junctions: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_attributes: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_geometries: Option<bool>,
    /// Search tolerance around the start point, in map units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_spatial_reference: Option<SpatialReference>,

    // Water / gas
    #[serde(rename = "valveEIDs", default, skip_serializing_if = "Option::is_none")]
    pub valve_eids: Option<IdList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barrier_types: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_disabled_valves: Option<bool>,

    // Electric
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protective_devices: Option<IdList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phases_to_trace: Option<PhaseFilter>,

    #[serde(rename = "barrierEIDs", default, skip_serializing_if = "Option::is_none")]
    pub barrier_eids: Option<IdList>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ---------------------------------------------------------------------------
// TraceRequest
// ---------------------------------------------------------------------------

/// One trace invocation's input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceRequest {
    /// Base map server URL. Checked when the trace runs, so a missing value
    /// is reported as invalid input rather than a decode failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_url: Option<String>,
    pub start_point: Point,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_type: Option<String>,
    #[serde(flatten)]
    pub parameters: TraceParameters,
}

impl TraceRequest {
    pub fn new(service_url: impl Into<String>, start_point: Point) -> Self {
        Self {
            service_url: Some(service_url.into()),
            start_point,
            trace_type: None,
            parameters: TraceParameters::default(),
        }
    }

    pub fn with_trace_type(mut self, trace_type: impl Into<String>) -> Self {
        self.trace_type = Some(trace_type.into());
        self
    }

    pub fn with_parameters(mut self, parameters: TraceParameters) -> Self {
        self.parameters = parameters;
        self
    }
}
