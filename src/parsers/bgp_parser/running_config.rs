use crate::parsers::ParseError;

/// Extracts the local AS number from the output of `show run | include router bgp`.
///
/// Uses the `router bgp <asn>` line when present, otherwise the last token of the output.
pub fn local_as_from_output(output: &str) -> Result<String, ParseError> {
    let from_router_line = output
        .lines()
        .map(str::trim)
        .filter(|l| l.starts_with("router bgp"))
        .find_map(|l| l.split_whitespace().nth(2));

    from_router_line
        .or_else(|| output.split_whitespace().last())
        .map(str::to_string)
        .ok_or_else(|| ParseError::NoLocalAs(output.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_router_bgp_line() {
        let output = include_str!("../../../test_data/show_run_router_bgp.txt");
        assert_eq!(local_as_from_output(output).unwrap(), "65000");
    }

    #[test]
    fn test_router_line_wins_over_trailing_text() {
        let output = "Building configuration...\nrouter bgp 4200000001\n bgp log-neighbor-changes\n";
        assert_eq!(local_as_from_output(output).unwrap(), "4200000001");
    }

    #[test]
    fn test_falls_back_to_last_token() {
        assert_eq!(local_as_from_output("bgp 65010\n").unwrap(), "65010");
    }

    #[test]
    fn test_empty_output_is_an_error() {
        assert!(matches!(
            local_as_from_output("  \n"),
            Err(ParseError::NoLocalAs(_))
        ));
    }
}
