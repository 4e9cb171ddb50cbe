use std::fmt::Display;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    config::RouterConnectionConfig,
    data_aquisition::ssh::SshError,
    parsers::{ParseError, StructuredRow},
};

/// Platform of a network device, named the way netmiko names them (`cisco_ios`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DeviceType {
    CiscoIos,
    CiscoXe,
    CiscoNxos,
    Other(String),
}

impl DeviceType {
    /// Family used to pick structured output templates. IOS and IOS-XE print identical tables.
    pub fn template_family(&self) -> Option<&'static str> {
        match self {
            DeviceType::CiscoIos | DeviceType::CiscoXe => Some("cisco_ios"),
            DeviceType::CiscoNxos | DeviceType::Other(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            DeviceType::CiscoIos => "cisco_ios",
            DeviceType::CiscoXe => "cisco_xe",
            DeviceType::CiscoNxos => "cisco_nxos",
            DeviceType::Other(name) => name,
        }
    }
}

impl Default for DeviceType {
    fn default() -> Self {
        DeviceType::CiscoIos
    }
}

impl From<String> for DeviceType {
    fn from(value: String) -> Self {
        match value.to_lowercase().as_str() {
            "cisco_ios" | "cisco_ios_ssh" => DeviceType::CiscoIos,
            "cisco_xe" => DeviceType::CiscoXe,
            "cisco_nxos" | "cisco_nxos_ssh" => DeviceType::CiscoNxos,
            _ => DeviceType::Other(value),
        }
    }
}

impl From<DeviceType> for String {
    fn from(value: DeviceType) -> Self {
        value.as_str().to_string()
    }
}

impl Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How command output should be returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Raw,
    Structured,
}

/// Output of a command, raw text or parsed rows depending on the requested [`OutputMode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutput {
    Text(String),
    Rows(Vec<StructuredRow>),
}

impl CommandOutput {
    pub fn into_text(self) -> Result<String, SessionError> {
        match self {
            CommandOutput::Text(text) => Ok(text),
            CommandOutput::Rows(_) => Err(SessionError::UnexpectedOutput("rows", "text")),
        }
    }

    pub fn into_rows(self) -> Result<Vec<StructuredRow>, SessionError> {
        match self {
            CommandOutput::Rows(rows) => Ok(rows),
            CommandOutput::Text(_) => Err(SessionError::UnexpectedOutput("text", "rows")),
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{0}")]
    Transport(#[from] SshError),
    #[error("Failed to parse command output: {0}")]
    Parse(#[from] ParseError),
    #[error("Got {0} output where {1} was expected")]
    UnexpectedOutput(&'static str, &'static str),
}

/// An open CLI session with one network device.
#[async_trait]
pub trait DeviceSession: Send {
    /// Runs `command` and returns its output in the requested mode.
    async fn send_command(
        &mut self,
        command: &str,
        mode: OutputMode,
    ) -> Result<CommandOutput, SessionError>;

    /// Closes the session. Calling it on a closed session is a no-op.
    async fn disconnect(&mut self) -> Result<(), SessionError>;
}

/// Opens [`DeviceSession`]s from connection parameters.
#[async_trait]
pub trait DeviceConnector: Send + Sync {
    async fn connect(
        &self,
        config: &RouterConnectionConfig,
    ) -> Result<Box<dyn DeviceSession>, SessionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_type_from_string() {
        assert_eq!(DeviceType::from("cisco_ios".to_string()), DeviceType::CiscoIos);
        assert_eq!(DeviceType::from("CISCO_XE".to_string()), DeviceType::CiscoXe);
        assert_eq!(
            DeviceType::from("juniper_junos".to_string()),
            DeviceType::Other("juniper_junos".to_string())
        );
        assert_eq!(DeviceType::default().to_string(), "cisco_ios");
    }

    #[test]
    fn test_device_type_serde() {
        let parsed: DeviceType = serde_json::from_str("\"cisco_nxos\"").unwrap();
        assert_eq!(parsed, DeviceType::CiscoNxos);
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "\"cisco_nxos\"");
    }

    #[test]
    fn test_command_output_conversions() {
        let text = CommandOutput::Text("router bgp 1".to_string());
        assert_eq!(text.clone().into_text().unwrap(), "router bgp 1");
        assert!(matches!(
            text.into_rows(),
            Err(SessionError::UnexpectedOutput("text", "rows"))
        ));
        assert!(CommandOutput::Rows(Vec::new()).into_rows().unwrap().is_empty());
    }
}
