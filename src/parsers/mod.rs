use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;
use thiserror::Error;

use crate::data_aquisition::core::DeviceType;

pub mod bgp_parser;

/// One row of structured command output, keyed by lower-case field name.
pub type StructuredRow = BTreeMap<String, String>;

/// Turns raw command output into structured rows.
pub type TemplateFn = fn(&str) -> Result<Vec<StructuredRow>, ParseError>;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("No structured template for `{command}` on {device_type}")]
    NoTemplate {
        device_type: String,
        command: String,
    },
    #[error("Invalid table header: {0}")]
    InvalidHeader(String),
    #[error("Device rejected the command: {0}")]
    DeviceError(String),
    #[error("No local AS number in output: {0:?}")]
    NoLocalAs(String),
}

/// Templates keyed by (device family, normalized command).
static TEMPLATES: Lazy<HashMap<(&'static str, String), TemplateFn>> = Lazy::new(|| {
    let mut templates: HashMap<(&'static str, String), TemplateFn> = HashMap::new();
    for command in ["show ip bgp", "sh ip bgp", "show bgp ipv4 unicast"] {
        templates.insert(
            ("cisco_ios", command.to_string()),
            bgp_parser::show_ip_bgp::parse_rows,
        );
    }
    templates
});

fn normalize_command(command: &str) -> String {
    command
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Looks up the template for `command` on `device_type`.
pub fn template_for(device_type: &DeviceType, command: &str) -> Result<TemplateFn, ParseError> {
    let no_template = || ParseError::NoTemplate {
        device_type: device_type.to_string(),
        command: command.to_string(),
    };
    let family = device_type.template_family().ok_or_else(no_template)?;
    TEMPLATES
        .get(&(family, normalize_command(command)))
        .copied()
        .ok_or_else(no_template)
}

/// Parses `output` of `command` into structured rows.
pub fn parse_structured(
    device_type: &DeviceType,
    command: &str,
    output: &str,
) -> Result<Vec<StructuredRow>, ParseError> {
    let template = template_for(device_type, command)?;
    template(output)
}
