use serde::{Deserialize, Serialize};

use crate::parsers::StructuredRow;

/// One route from a router's BGP table.
///
/// `as_path` is kept as the raw whitespace-delimited string the device printed, nearest
/// upstream AS first and originating AS last.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingTableRow {
    pub network: String,
    pub as_path: String,
    pub status: Option<String>,
    pub next_hop: Option<String>,
    pub metric: Option<u32>,
    pub local_pref: Option<u32>,
    pub weight: Option<u32>,
    pub origin: Option<String>,
}

impl RoutingTableRow {
    #[allow(dead_code)]
    pub fn new(network: impl Into<String>, as_path: impl Into<String>) -> Self {
        Self {
            network: network.into(),
            as_path: as_path.into(),
            ..Default::default()
        }
    }

    /// Builds a row from a structured command output row.
    /// Missing `network`/`as_path` default to the empty string, missing or non-numeric
    /// numeric columns to `None`.
    pub fn from_structured(row: &StructuredRow) -> Self {
        let text = |key: &str| row.get(key).cloned().unwrap_or_default();
        let optional = |key: &str| row.get(key).filter(|v| !v.is_empty()).cloned();
        let number = |key: &str| row.get(key).and_then(|v| v.parse::<u32>().ok());

        Self {
            network: text("network"),
            as_path: text("as_path"),
            status: optional("status"),
            next_hop: optional("next_hop"),
            metric: number("metric"),
            local_pref: number("local_pref"),
            weight: number("weight"),
            origin: optional("origin"),
        }
    }

    /// The AS-path split into its hops. Empty when the route was originated locally.
    pub fn path_hops(&self) -> Vec<&str> {
        self.as_path.split_whitespace().collect()
    }
}
