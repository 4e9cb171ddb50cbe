use crate::network::autonomous_system::AsId;

/// Directed adjacency between two autonomous systems, pointing in AS-path order.
/// The graph keeps at most one edge per ordered pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AdjacencyEdge {
    pub source_id: AsId,
    pub destination_id: AsId,
}

impl AdjacencyEdge {
    pub fn new(source_id: AsId, destination_id: AsId) -> Self {
        Self {
            source_id,
            destination_id,
        }
    }

    /// AS prepending (`100 100 200`) produces edges from an AS to itself.
    pub fn is_self_loop(&self) -> bool {
        self.source_id == self.destination_id
    }
}
