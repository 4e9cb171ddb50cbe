//! Structured rows from the Cisco IOS / IOS-XE `show ip bgp` table.

use crate::parsers::{
    ParseError, StructuredRow,
    bgp_parser::table::{TableHeader, Token, tokens},
};

const HEADERS: [(&str, bool); 6] = [
    ("Network", false),
    ("Next Hop", false),
    ("Metric", true),
    ("LocPrf", true),
    ("Weight", true),
    ("Path", false),
];

const STATUS_CHARS: &str = "*>=sdhirSmbfxacRVINLt";
const ORIGIN_CODES: [&str; 3] = ["i", "e", "?"];

/// Field names of every produced row.
pub const FIELDS: [&str; 8] = [
    "status",
    "network",
    "next_hop",
    "metric",
    "local_pref",
    "weight",
    "as_path",
    "origin",
];

/// Rows carry state across lines: multipath rows omit the network, and a network too long for
/// its column is printed alone with the rest of the route on the next line.
#[derive(Default)]
struct CarryState {
    last_network: Option<String>,
    wrapped: Option<(String, String)>,
}

/// Parses the output of `show ip bgp` into one row per path.
pub fn parse_rows(output: &str) -> Result<Vec<StructuredRow>, ParseError> {
    let output = output.replace('\r', "");
    if output.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut lines = output.lines();
    let header = loop {
        let Some(line) = lines.next() else {
            return no_table(&output);
        };
        if let Some(header) = TableHeader::locate(line, &HEADERS) {
            break header;
        }
    };

    let mut state = CarryState::default();
    let mut rows = Vec::new();
    for line in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.starts_with("Total number of prefixes") || trimmed.starts_with("Displayed ") {
            break;
        }
        if let Some(row) = parse_route_line(&header, line, &mut state) {
            rows.push(row);
        }
    }

    log::trace!("[show_ip_bgp] parse_rows: {} rows", rows.len());
    Ok(rows)
}

/// Output without a table header is either an empty table, or a device error.
fn no_table(output: &str) -> Result<Vec<StructuredRow>, ParseError> {
    if let Some(error) = output.lines().find(|l| l.trim_start().starts_with('%')) {
        return Err(ParseError::DeviceError(error.trim().to_string()));
    }
    if output.contains("BGP table version") {
        return Ok(Vec::new());
    }
    let first = output.lines().find(|l| !l.trim().is_empty()).unwrap_or_default();
    Err(ParseError::InvalidHeader(first.trim().to_string()))
}

fn is_status(token: &str) -> bool {
    token.chars().all(|c| STATUS_CHARS.contains(c))
}

/// Length of the status code run at the start of `token`, at most `max` bytes.
fn glued_status_len(token: &str, max: usize) -> usize {
    token
        .char_indices()
        .take_while(|&(i, c)| i < max && STATUS_CHARS.contains(c))
        .map(|(i, c)| i + c.len_utf8())
        .last()
        .unwrap_or(0)
}

fn parse_route_line(header: &TableHeader, line: &str, state: &mut CarryState) -> Option<StructuredRow> {
    let network_col = header.start_of("Network");
    let next_hop_col = header.start_of("Next Hop");
    let path_col = header.start_of("Path");

    let toks = tokens(line);
    let mut rest: &[Token<'_>] = &toks;

    let mut status = String::new();
    while let Some((tok, tail)) = rest.split_first() {
        if tok.start >= network_col || !is_status(tok.text) {
            break;
        }
        status.push_str(tok.text);
        rest = tail;
    }

    let mut network = None;
    if let Some((tok, tail)) = rest.split_first() {
        if tok.start < next_hop_col {
            // older IOS prints the status glued to the network (`*>i10.0.0.0`)
            let glued = if tok.start < network_col {
                glued_status_len(tok.text, network_col - tok.start)
            } else {
                0
            };
            status.push_str(&tok.text[..glued]);
            network = Some(tok.text[glued..].to_string());
            rest = tail;
        }
    }

    if let Some(network) = &network {
        state.last_network = Some(network.clone());
        if rest.is_empty() {
            state.wrapped = Some((status, network.clone()));
            return None;
        }
        state.wrapped = None;
    } else if let Some((wrapped_status, wrapped_network)) = state.wrapped.take() {
        if status.is_empty() {
            status = wrapped_status;
        }
        network = Some(wrapped_network);
    }

    let network = network.or_else(|| state.last_network.clone())?;

    let mut next_hop = String::new();
    if let Some((tok, tail)) = rest.split_first() {
        if tok.start < path_col {
            next_hop = tok.text.to_string();
            rest = tail;
        }
    }

    let mut row: StructuredRow = FIELDS.iter().map(|f| (f.to_string(), String::new())).collect();
    row.insert("status".to_string(), status);
    row.insert("network".to_string(), network);
    row.insert("next_hop".to_string(), next_hop);

    let mut path = Vec::new();
    for tok in rest {
        if tok.start >= path_col {
            path.push(tok.text);
            continue;
        }
        let field = match header.nearest_right_aligned(tok.end).map(|c| c.name) {
            Some("Metric") => "metric",
            Some("LocPrf") => "local_pref",
            Some("Weight") => "weight",
            _ => continue,
        };
        row.insert(field.to_string(), tok.text.to_string());
    }

    if let Some(last) = path.last() {
        if ORIGIN_CODES.contains(last) {
            row.insert("origin".to_string(), last.to_string());
            path.pop();
        }
    }
    row.insert("as_path".to_string(), path.join(" "));

    Some(row)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn field<'a>(row: &'a StructuredRow, key: &str) -> &'a str {
        row.get(key).map(String::as_str).unwrap_or("<missing>")
    }

    #[test]
    fn test_parse_fixture() {
        let output = include_str!("../../../test_data/show_ip_bgp.txt");
        let rows = parse_rows(output).unwrap();
        assert_eq!(rows.len(), 6);

        let summary: Vec<(&str, &str, &str)> = rows
            .iter()
            .map(|r| (field(r, "network"), field(r, "as_path"), field(r, "origin")))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("10.1.0.0/16", "65001", "i"),
                ("10.1.0.0/16", "65002 65001", "i"),
                ("10.2.0.0/16", "65001 65003", "?"),
                ("172.16.0.0/12", "", "i"),
                ("192.168.100.128/25", "65001 65004 65005", "e"),
                ("0.0.0.0", "", "i"),
            ]
        );
    }

    #[test]
    fn test_parse_numeric_columns() {
        let output = include_str!("../../../test_data/show_ip_bgp.txt");
        let rows = parse_rows(output).unwrap();

        assert_eq!(field(&rows[0], "status"), "*>");
        assert_eq!(field(&rows[0], "next_hop"), "192.168.1.2");
        assert_eq!(field(&rows[0], "metric"), "0");
        assert_eq!(field(&rows[0], "local_pref"), "");
        assert_eq!(field(&rows[0], "weight"), "0");

        assert_eq!(field(&rows[1], "status"), "*");
        assert_eq!(field(&rows[1], "next_hop"), "192.168.2.2");
        assert_eq!(field(&rows[1], "metric"), "");

        assert_eq!(field(&rows[3], "status"), "*>i");
        assert_eq!(field(&rows[3], "local_pref"), "100");

        assert_eq!(field(&rows[4], "status"), "*>");
        assert_eq!(field(&rows[4], "next_hop"), "192.168.1.2");

        assert_eq!(field(&rows[5], "weight"), "32768");
        assert_eq!(field(&rows[5], "metric"), "0");
    }

    #[test]
    fn test_parse_status_glued_to_network() {
        let output = include_str!("../../../test_data/show_ip_bgp_classic.txt");
        let rows = parse_rows(output).unwrap();

        let summary: Vec<(&str, &str, &str, &str)> = rows
            .iter()
            .map(|r| {
                (
                    field(r, "status"),
                    field(r, "network"),
                    field(r, "next_hop"),
                    field(r, "as_path"),
                )
            })
            .collect();
        assert_eq!(
            summary,
            vec![
                ("*>", "10.1.0.0/16", "0.0.0.0", ""),
                ("*>i", "10.2.0.0/16", "10.0.0.2", "65002"),
                ("*i", "10.3.0.0/16", "10.0.0.3", "65003 65010"),
                ("*>i", "10.3.0.0/16", "10.0.0.2", "65002 65010"),
                ("r>i", "10.4.0.0/16", "10.0.0.2", "65002 65020"),
            ]
        );
        assert_eq!(field(&rows[1], "local_pref"), "100");
        assert_eq!(field(&rows[4], "metric"), "");
        assert_eq!(field(&rows[4], "origin"), "?");
    }

    #[test]
    fn test_glued_status_stops_at_network_column() {
        let output = "   Network          Next Hop            Metric LocPrf Weight Path\n\
                      *>ifd00::/8         10.0.0.2                 0    100      0 65002 i\n";
        let rows = parse_rows(output).unwrap();
        assert_eq!(field(&rows[0], "status"), "*>i");
        assert_eq!(field(&rows[0], "network"), "fd00::/8");

        assert_eq!(glued_status_len("*>i10.2.0.0/16", 3), 3);
        assert_eq!(glued_status_len("*>ifd00::/8", 3), 3);
        assert_eq!(glued_status_len("i10.3.0.0/16", 1), 1);
        assert_eq!(glued_status_len("10.0.0.0/8", 3), 0);
    }

    #[test]
    fn test_empty_output_has_no_rows() {
        assert!(parse_rows("").unwrap().is_empty());
        assert!(parse_rows("\r\n  \n").unwrap().is_empty());
        assert!(
            parse_rows("BGP table version is 1, local router ID is 10.0.0.1\n")
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn test_device_error() {
        let err = parse_rows("% BGP not active\n").unwrap_err();
        assert!(matches!(err, ParseError::DeviceError(ref line) if line == "% BGP not active"));
    }

    #[test]
    fn test_unrecognised_output() {
        let err = parse_rows("something else entirely\n").unwrap_err();
        assert!(matches!(err, ParseError::InvalidHeader(_)));
    }

    #[test]
    fn test_crlf_output() {
        let output = include_str!("../../../test_data/show_ip_bgp.txt").replace('\n', "\r\n");
        assert_eq!(parse_rows(&output).unwrap().len(), 6);
    }
}
