//! The three utility networks served by the trace extension.

use std::fmt;
use std::str::FromStr;

use crate::TraceError;

/// Which trace endpoint of the ArcFM map server extension to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    Electric,
    Gas,
    Water,
}

impl Network {
    pub const ALL: [Network; 3] = [Network::Electric, Network::Gas, Network::Water];

    /// URL-encoded path segment appended after `/exts/ArcFMMapServer/`.
    pub fn endpoint_segment(self) -> &'static str {
        match self {
            Network::Electric => "Electric%20Trace",
            Network::Gas => "Gas%20Trace",
            Network::Water => "Water%20Trace",
        }
    }

    /// `traceType` sent when the caller leaves it out.
    pub fn default_trace_type(self) -> &'static str {
        match self {
            Network::Electric => "Downstream",
            Network::Gas | Network::Water => "ValveIsolation",
        }
    }

    /// Node type under which the matching activity is registered.
    pub fn node_type(self) -> &'static str {
        match self {
            Network::Electric => "electric_trace",
            Network::Gas => "gas_trace",
            Network::Water => "water_trace",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Network::Electric => "electric",
            Network::Gas => "gas",
            Network::Water => "water",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = TraceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "electric" => Ok(Network::Electric),
            "gas" => Ok(Network::Gas),
            "water" => Ok(Network::Water),
            other => Err(TraceError::invalid_input(format!(
                "unknown network '{other}' (expected electric, gas or water)"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_are_url_encoded() {
        for network in Network::ALL {
            let segment = network.endpoint_segment();
            assert!(segment.ends_with("%20Trace"), "{segment}");
            assert!(!segment.contains(' '));
        }
    }

    #[test]
    fn default_trace_types() {
        assert_eq!(Network::Electric.default_trace_type(), "Downstream");
        assert_eq!(Network::Gas.default_trace_type(), "ValveIsolation");
        assert_eq!(Network::Water.default_trace_type(), "ValveIsolation");
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Water".parse::<Network>().unwrap(), Network::Water);
        assert_eq!(" GAS ".parse::<Network>().unwrap(), Network::Gas);
        assert!(matches!(
            "sewer".parse::<Network>(),
            Err(TraceError::InvalidInput(_))
        ));
    }
}
