/*!
Topology module

Turns a BGP table into the AS-level graph that gets rendered.

- `builder`: `build(rows, local_as)`, a pure function returning a fresh `TopologyGraph`.
*/

pub mod builder;

pub use builder::build;
