//! Normalised trace output.
//!
//! The extension has shipped several response layouts over the years and
//! its field types drift between versions (`id` as a number or a string,
//! `attributes: null`, ...). Result sets are therefore kept as the JSON
//! objects the server sent, so they re-encode unchanged, and typed access
//! goes through lenient accessors that never fail.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Canonical output of every trace activity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraceResponse {
    pub results: Vec<TraceResultSet>,
}

impl TraceResponse {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Total number of features across all result sets.
    pub fn feature_count(&self) -> usize {
        self.results.iter().map(TraceResultSet::feature_count).sum()
    }

    /// True when any result set, or any feature, reports that the server
    /// stopped at its configured result limit.
    pub fn exceeded_threshold(&self) -> bool {
        self.results.iter().any(TraceResultSet::exceeded_threshold)
    }
}

// ---------------------------------------------------------------------------
// TraceResultSet
// ---------------------------------------------------------------------------

/// One named layer of trace results, exactly as the server returned it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraceResultSet(Map<String, Value>);

impl TraceResultSet {
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }

    /// Layer ID; accepts both numeric and string encodings.
    pub fn id(&self) -> Option<i64> {
        self.0.get("id").and_then(lenient_i64)
    }

    pub fn display_field_name(&self) -> Option<&str> {
        self.0.get("displayFieldName").and_then(Value::as_str)
    }

    pub fn geometry_type(&self) -> Option<&str> {
        self.0.get("geometryType").and_then(Value::as_str)
    }

    /// Column descriptions; entries without a `name` are skipped.
    pub fn fields(&self) -> Vec<Field<'_>> {
        self.0
            .get("fields")
            .and_then(Value::as_array)
            .map(|fields| fields.iter().filter_map(Field::from_value).collect())
            .unwrap_or_default()
    }

    pub fn features(&self) -> Vec<Feature<'_>> {
        self.0
            .get("features")
            .and_then(Value::as_array)
            .map(|features| features.iter().filter_map(Feature::from_value).collect())
            .unwrap_or_default()
    }

    pub fn feature_count(&self) -> usize {
        self.0
            .get("features")
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    }

    /// Older servers flag the limit per feature rather than per layer.
    pub fn exceeded_threshold(&self) -> bool {
        self.0.get("exceededThreshold").is_some_and(lenient_bool)
            || self.features().iter().any(Feature::exceeded_threshold)
    }

    /// Display alias for `field`, falling back to the field name itself.
    pub fn alias_for<'a>(&'a self, field: &'a str) -> &'a str {
        self.0
            .get("fieldAliases")
            .and_then(|aliases| aliases.get(field))
            .and_then(Value::as_str)
            .or_else(|| {
                self.fields()
                    .into_iter()
                    .find(|f| f.name == field)
                    .and_then(|f| f.alias)
            })
            .unwrap_or(field)
    }
}

// ---------------------------------------------------------------------------
// Field / Feature views
// ---------------------------------------------------------------------------

/// Attribute column description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field<'a> {
    pub name: &'a str,
    pub alias: Option<&'a str>,
    pub field_type: Option<&'a str>,
    pub length: Option<i64>,
}

impl<'a> Field<'a> {
    fn from_value(value: &'a Value) -> Option<Self> {
        Some(Self {
            name: value.get("name")?.as_str()?,
            alias: value.get("alias").and_then(Value::as_str),
            field_type: value.get("type").and_then(Value::as_str),
            length: value.get("length").and_then(lenient_i64),
        })
    }
}

/// A single traced network element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Feature<'a>(&'a Map<String, Value>);

impl<'a> Feature<'a> {
    fn from_value(value: &'a Value) -> Option<Self> {
        value.as_object().map(Feature)
    }

    /// Attribute values; `None` when the server sent none (or `null`).
    pub fn attributes(&self) -> Option<&'a Map<String, Value>> {
        self.0.get("attributes").and_then(Value::as_object)
    }

    pub fn attribute(&self, name: &str) -> Option<&'a Value> {
        self.attributes().and_then(|attributes| attributes.get(name))
    }

    /// Esri JSON geometry, untouched.
    pub fn geometry(&self) -> Option<&'a Map<String, Value>> {
        self.0.get("geometry").and_then(Value::as_object)
    }

    pub fn id(&self) -> Option<i64> {
        self.0.get("id").and_then(lenient_i64)
    }

    pub fn name(&self) -> Option<&'a str> {
        self.0.get("name").and_then(Value::as_str)
    }

    pub fn exceeded_threshold(&self) -> bool {
        self.0.get("exceededThreshold").is_some_and(lenient_bool)
    }
}

fn lenient_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn lenient_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}
