/*!
Parsers for Cisco BGP command output.

- `show_ip_bgp`: the BGP table as structured rows.
- `running_config`: the local AS number from the running configuration.
- `table`: fixed-width column helpers shared by the above.
*/

pub mod running_config;
pub mod show_ip_bgp;
pub mod table;

pub use running_config::local_as_from_output;
