use crate::network::{
    autonomous_system::AsId, route::RoutingTableRow, topology_graph::TopologyGraph,
};

/// Builds the AS-level topology for one BGP table.
///
/// Every call returns a fresh graph, nothing from a previous table carries over.
/// For each row with a non-empty AS-path:
/// - the prefix is attributed to the last AS of the path (the originating AS),
/// - consecutive ASes are linked in path order,
/// - the local AS is linked to the first AS of the path.
///
/// Rows with an empty path are skipped. Tokens are never validated.
pub fn build(rows: &[RoutingTableRow], local_as: &str) -> TopologyGraph {
    let local_as = AsId::new(local_as);
    let mut graph = TopologyGraph::with_local_as(local_as.clone());

    for row in rows {
        let hops: Vec<AsId> = row.path_hops().into_iter().map(AsId::new).collect();
        let (Some(first), Some(origin)) = (hops.first(), hops.last()) else {
            continue;
        };

        graph.attribute_prefix(origin, &row.network);

        for pair in hops.windows(2) {
            graph.add_adjacency(&pair[0], &pair[1]);
        }

        graph.add_adjacency(&local_as, first);
    }

    log::debug!(
        "[topology] build: {} rows -> {} nodes, {} edges ({} self-loops)",
        rows.len(),
        graph.node_count(),
        graph.edge_count(),
        graph.edges().filter(|e| e.is_self_loop()).count()
    );
    graph
}
