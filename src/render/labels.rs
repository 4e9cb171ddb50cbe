use std::fmt::Display;

use crate::network::autonomous_system::AsNode;

/// Prefixes listed on a node before the rest is summarized.
pub const MAX_LISTED_PREFIXES: usize = 3;

/// Multi-line label drawn on a node: the AS name, then up to [`MAX_LISTED_PREFIXES`] prefixes,
/// then `...(N more)` when some were left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeLabel {
    pub lines: Vec<String>,
}

pub fn node_label(node: &AsNode) -> NodeLabel {
    let mut lines = Vec::with_capacity(MAX_LISTED_PREFIXES + 2);
    lines.push(node.id.display_name());
    lines.extend(node.prefixes.iter().take(MAX_LISTED_PREFIXES).cloned());
    let hidden = node.prefixes.len().saturating_sub(MAX_LISTED_PREFIXES);
    if hidden > 0 {
        lines.push(format!("...({hidden} more)"));
    }
    NodeLabel { lines }
}

impl Display for NodeLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.lines.join("\n"))
    }
}
