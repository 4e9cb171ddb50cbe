use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Identifier of an autonomous system exactly as it appeared in the routing table.
///
/// No validation happens here: `65000`, `4200000000` and even an AS-set token like `{100,200}`
/// are all accepted so the graph shows what the router reported.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AsId(String);

impl AsId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[allow(dead_code)]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name shown on the rendered node, e.g. `AS65000`.
    pub fn display_name(&self) -> String {
        format!("AS{}", self.0)
    }
}

impl Display for AsId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl From<&str> for AsId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    /// The AS the queried router belongs to.
    Local,
    /// Learned from an AS-path.
    Inferred,
}

impl ToString for NodeType {
    fn to_string(&self) -> String {
        use NodeType::*;
        match self {
            Local => "local".to_string(),
            Inferred => "inferred".to_string(),
        }
    }
}

/// Represents an autonomous system in the topology graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsNode {
    pub id: AsId,
    pub node_type: NodeType,
    /// Prefixes this AS originates, in the order the table listed them. Duplicates are kept.
    pub prefixes: Vec<String>,
}

impl AsNode {
    pub fn new(id: AsId, node_type: NodeType) -> Self {
        Self {
            id,
            node_type,
            prefixes: Vec::new(),
        }
    }

    pub fn is_local(&self) -> bool {
        self.node_type == NodeType::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_prefixes_as() {
        let id = AsId::from("65000");
        assert_eq!(id.display_name(), "AS65000");
        assert_eq!(id.to_string(), "AS65000");
        assert_eq!(id.as_str(), "65000");
    }

    #[test]
    fn test_new_node_has_no_prefixes() {
        let node = AsNode::new(AsId::from("100"), NodeType::Inferred);
        assert!(node.prefixes.is_empty());
        assert!(!node.is_local());
        assert_eq!(node.node_type.to_string(), "inferred");
    }
}
