/*
 * This module defines the graph format produced from a router's BGP table.
 * Autonomous systems are nodes, AS-path adjacencies are directed edges.
 */

pub mod autonomous_system;
pub mod edge;
pub mod route;
pub mod topology_graph;
