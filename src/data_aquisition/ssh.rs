use std::io::{ErrorKind, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use ssh2::{Channel, Session};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::{
    config::RouterConnectionConfig,
    data_aquisition::core::{
        CommandOutput, DeviceConnector, DeviceSession, DeviceType, OutputMode, SessionError,
    },
    parsers,
};

/// Columns requested for the PTY, wide enough that Cisco does not wrap table rows.
const TERMINAL_WIDTH: u32 = 511;
/// How long a single blocking read may wait before the deadline is checked again.
const READ_POLL_MS: u32 = 250;
/// Bytes at the end of the buffer inspected for prompts.
const PROMPT_WINDOW: usize = 512;
const PAGER_MARKER: &str = "--More--";

/// SSH client driving the interactive CLI of a network device.
pub struct SshClient {
    username: String,
    host: String,
    password: Option<String>,
    secret: Option<String>,
    port: u16,
    timeout: Duration,
    device_type: DeviceType,
    shell: Option<Arc<Mutex<CliShell>>>,
}

#[derive(Debug, Error)]
pub enum SshError {
    #[error("TCP error: {0}")]
    TcpError(String),
    #[error("SSH error: {0}")]
    SshError(String),
    #[error("SSH authentication error: {0}")]
    SshAuthError(String),
    #[error("Could not enter enable mode: {0}")]
    EnableError(String),
    #[error("Command execution error: {0}")]
    CommandError(String),
    #[error("Timed out waiting for the device prompt, last output: {0:?}")]
    Timeout(String),
    #[error("The device closed the session")]
    ChannelClosed,
    #[error("Async error: {0}")]
    AsyncError(String),
    #[error("Session not initialized")]
    NotConnected,
}

impl SshClient {
    #[allow(dead_code)]
    pub fn new_with_password(username: String, host: String, password: String, port: u16) -> Self {
        Self {
            username,
            host,
            secret: Some(password.clone()),
            password: Some(password),
            port,
            timeout: Duration::from_secs(30),
            device_type: DeviceType::default(),
            shell: None,
        }
    }

    pub fn from_config(config: &RouterConnectionConfig) -> Self {
        Self {
            username: config.username.clone(),
            host: config.host.clone(),
            password: Some(config.password.clone()),
            secret: Some(config.enable_secret().to_string()),
            port: config.port,
            timeout: config.timeout(),
            device_type: config.device_type.clone(),
            shell: None,
        }
    }

    fn connect_sync_inner(
        username: String,
        host: String,
        password: Option<String>,
        secret: Option<String>,
        port: u16,
        timeout: Duration,
    ) -> Result<CliShell, SshError> {
        let address = (host.as_str(), port)
            .to_socket_addrs()
            .map_err(|e| SshError::TcpError(e.to_string()))?
            .next()
            .ok_or_else(|| SshError::TcpError(format!("{host}:{port} did not resolve")))?;
        let tcp = TcpStream::connect_timeout(&address, timeout)
            .map_err(|e| SshError::TcpError(e.to_string()))?;

        let mut session = Session::new().map_err(|e| SshError::SshError(e.to_string()))?;
        session.set_tcp_stream(tcp);
        session.set_timeout(timeout.as_millis().min(u32::MAX as u128) as u32);
        session
            .handshake()
            .map_err(|e| SshError::SshError(e.to_string()))?;
        if let Some(password) = password {
            session
                .userauth_password(&username, &password)
                .map_err(|e| SshError::SshAuthError(e.to_string()))?;
        }
        if !session.authenticated() {
            return Err(SshError::SshAuthError("Authentication failed".to_string()));
        }

        CliShell::open(session, secret.as_deref(), timeout)
    }

    pub async fn connect(&mut self) -> Result<(), SshError> {
        if self.shell.is_some() {
            return Err(SshError::SshError("Already connected".to_string()));
        }
        log::debug!("[SshClient] connect: {}@{}:{}", self.username, self.host, self.port);
        let username = self.username.clone();
        let host = self.host.clone();
        let password = self.password.clone();
        let secret = self.secret.clone();
        let port = self.port;
        let timeout = self.timeout;
        let shell = tokio::task::spawn_blocking(move || {
            SshClient::connect_sync_inner(username, host, password, secret, port, timeout)
        })
        .await
        .map_err(|e| SshError::AsyncError(e.to_string()))??;
        log::debug!("[SshClient] connect: prompt is {:?}", shell.prompt);
        self.shell = Some(Arc::new(Mutex::new(shell)));
        Ok(())
    }

    pub async fn execute_command(&self, command: &str) -> Result<String, SshError> {
        let command = command.to_string();
        let shell_mutex = match &self.shell {
            Some(s) => s.clone(),
            None => return Err(SshError::NotConnected),
        };
        tokio::task::spawn_blocking(move || {
            let mut shell = shell_mutex.blocking_lock();
            shell.run(&command)
        })
        .await
        .map_err(|e| SshError::AsyncError(e.to_string()))?
    }

    pub fn is_connected(&self) -> bool {
        self.shell.is_some()
    }

    pub async fn close(&mut self) -> Result<(), SshError> {
        let Some(shell) = self.shell.take() else {
            return Ok(());
        };
        tokio::task::spawn_blocking(move || {
            let mut shell = shell.blocking_lock();
            shell.close()
        })
        .await
        .map_err(|e| SshError::AsyncError(e.to_string()))?
    }
}

#[async_trait]
impl DeviceSession for SshClient {
    async fn send_command(
        &mut self,
        command: &str,
        mode: OutputMode,
    ) -> Result<CommandOutput, SessionError> {
        let output = self.execute_command(command).await?;
        log::trace!("[SshClient] send_command: {command:?} returned {} bytes", output.len());
        match mode {
            OutputMode::Raw => Ok(CommandOutput::Text(output)),
            OutputMode::Structured => {
                let rows = parsers::parse_structured(&self.device_type, command, &output)?;
                Ok(CommandOutput::Rows(rows))
            }
        }
    }

    async fn disconnect(&mut self) -> Result<(), SessionError> {
        Ok(self.close().await?)
    }
}

/// Opens SSH sessions to configured routers.
#[derive(Debug, Default, Clone, Copy)]
pub struct SshConnector;

#[async_trait]
impl DeviceConnector for SshConnector {
    async fn connect(
        &self,
        config: &RouterConnectionConfig,
    ) -> Result<Box<dyn DeviceSession>, SessionError> {
        let mut client = SshClient::from_config(config);
        client.connect().await?;
        Ok(Box::new(client))
    }
}

/// Interactive shell on the device, with paging disabled and in enable mode.
struct CliShell {
    session: Session,
    channel: Channel,
    /// Hostname part of the prompt, without the trailing `#` or `>`.
    prompt: String,
    timeout: Duration,
}

impl CliShell {
    fn open(session: Session, secret: Option<&str>, timeout: Duration) -> Result<Self, SshError> {
        let mut channel = session
            .channel_session()
            .map_err(|e| SshError::SshError(e.to_string()))?;
        channel
            .request_pty("vt100", None, Some((TERMINAL_WIDTH, 24, 0, 0)))
            .map_err(|e| SshError::SshError(e.to_string()))?;
        channel
            .shell()
            .map_err(|e| SshError::SshError(e.to_string()))?;
        session.set_timeout(READ_POLL_MS);

        let mut shell = Self {
            session,
            channel,
            prompt: String::new(),
            timeout,
        };

        let banner = shell.read_until(|tail| trailing_prompt(tail).is_some())?;
        let prompt = trailing_prompt(&banner).unwrap_or_default().to_string();
        if prompt.ends_with('>') {
            shell.enable(secret)?;
        } else {
            shell.prompt = base_prompt(&prompt).to_string();
        }

        shell.run("terminal length 0")?;
        shell.run(&format!("terminal width {TERMINAL_WIDTH}"))?;
        Ok(shell)
    }

    fn enable(&mut self, secret: Option<&str>) -> Result<(), SshError> {
        let Some(secret) = secret else {
            return Err(SshError::EnableError(
                "device is in user mode and no enable secret is configured".to_string(),
            ));
        };
        self.write_line("enable")?;
        let reply = self.read_until(|tail| {
            tail.trim_end().ends_with("assword:") || trailing_prompt(tail).is_some()
        })?;
        let reply = if reply.trim_end().ends_with("assword:") {
            self.write_line(secret)?;
            self.read_until(|tail| trailing_prompt(tail).is_some())?
        } else {
            reply
        };

        match trailing_prompt(&reply) {
            Some(prompt) if prompt.ends_with('#') => {
                self.prompt = base_prompt(prompt).to_string();
                Ok(())
            }
            _ => Err(SshError::EnableError("enable secret rejected".to_string())),
        }
    }

    fn run(&mut self, command: &str) -> Result<String, SshError> {
        self.write_line(command)?;
        let prompt = self.prompt.clone();
        let raw = self.read_until(|tail| ends_with_prompt(tail, &prompt))?;
        Ok(clean_output(&raw, command))
    }

    fn write_line(&mut self, line: &str) -> Result<(), SshError> {
        self.channel
            .write_all(format!("{line}\n").as_bytes())
            .and_then(|_| self.channel.flush())
            .map_err(|e| SshError::CommandError(e.to_string()))
    }

    /// Reads until `done` holds for the tail of the output, answering pager prompts on the way.
    fn read_until(&mut self, done: impl Fn(&str) -> bool) -> Result<String, SshError> {
        let deadline = Instant::now() + self.timeout;
        let mut buffer = Vec::new();
        let mut chunk = [0u8; 4096];
        // buffer length when the last pager prompt was answered
        let mut paged_at = None;
        loop {
            let tail_start = buffer.len().saturating_sub(PROMPT_WINDOW);
            let tail = String::from_utf8_lossy(&buffer[tail_start..]).replace('\r', "");
            if done(&tail) {
                return Ok(String::from_utf8_lossy(&buffer).replace('\r', ""));
            }
            if pager_waiting(&tail, buffer.len(), paged_at) {
                self.channel
                    .write_all(b" ")
                    .map_err(|e| SshError::CommandError(e.to_string()))?;
                paged_at = Some(buffer.len());
            }
            if Instant::now() >= deadline {
                return Err(SshError::Timeout(tail.trim().to_string()));
            }
            match self.channel.read(&mut chunk) {
                Ok(0) if self.channel.eof() => return Err(SshError::ChannelClosed),
                Ok(n) => buffer.extend_from_slice(&chunk[..n]),
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {}
                Err(e) => return Err(SshError::CommandError(e.to_string())),
            }
        }
    }

    fn close(&mut self) -> Result<(), SshError> {
        let _ = self.write_line("exit");
        let _ = self.channel.close();
        self.session
            .disconnect(Some(ssh2::DisconnectCode::ByApplication), "", None)
            .map_err(|e| SshError::SshError(e.to_string()))
    }
}

/// The prompt on the last line of `output`, e.g. `R1#` or `R1>`.
fn trailing_prompt(output: &str) -> Option<&str> {
    let last = output.rsplit('\n').next()?.trim();
    let valid = (last.ends_with('#') || last.ends_with('>'))
        && !base_prompt(last).is_empty()
        && !last.contains(char::is_whitespace);
    valid.then_some(last)
}

/// Whether the output ends in a pager prompt that has not been answered yet.
/// `paged_at` is the buffer length when the last one was answered.
fn pager_waiting(tail: &str, buffer_len: usize, paged_at: Option<usize>) -> bool {
    tail.trim_end().ends_with(PAGER_MARKER) && paged_at != Some(buffer_len)
}

fn base_prompt(prompt: &str) -> &str {
    prompt.trim_end_matches(['#', '>'])
}

fn ends_with_prompt(output: &str, base: &str) -> bool {
    trailing_prompt(output).is_some_and(|p| base_prompt(p) == base)
}

/// Strips the echoed command, pager leftovers and the trailing prompt from raw shell output.
fn clean_output(raw: &str, command: &str) -> String {
    let raw = raw.replace('\x08', "").replace(PAGER_MARKER, "");
    let mut lines: Vec<&str> = raw.lines().collect();
    if lines.first().is_some_and(|l| l.trim() == command.trim()) {
        lines.remove(0);
    }
    if lines.last().is_some_and(|l| trailing_prompt(l).is_some()) {
        lines.pop();
    }
    lines
        .into_iter()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_prompt() {
        assert_eq!(trailing_prompt("banner\nR1>"), Some("R1>"));
        assert_eq!(trailing_prompt("output\nR1# "), Some("R1#"));
        assert_eq!(trailing_prompt("show ip bgp"), None);
        assert_eq!(trailing_prompt("Password: "), None);
        assert_eq!(trailing_prompt("R1#\n"), None);
        assert_eq!(trailing_prompt("#"), None);
        assert_eq!(trailing_prompt("Welcome\n#####"), None);
        assert_eq!(trailing_prompt(">>"), None);
    }

    #[test]
    fn test_pager_answered_once() {
        let tail = "line one\n --More-- ";
        assert!(pager_waiting(tail, 120, None));
        assert!(!pager_waiting(tail, 120, Some(120)));
        // the next page ends in a new marker
        assert!(pager_waiting(tail, 480, Some(120)));
        assert!(!pager_waiting("line one\nR1#", 120, None));
    }

    #[test]
    fn test_base_prompt() {
        assert_eq!(base_prompt("R1#"), "R1");
        assert_eq!(base_prompt("edge-rtr>"), "edge-rtr");
        assert!(ends_with_prompt("foo\nR1#", "R1"));
        assert!(!ends_with_prompt("foo\nR2#", "R1"));
    }

    #[test]
    fn test_clean_output() {
        let raw = "show run | include router bgp\nrouter bgp 65000\nR1#";
        assert_eq!(
            clean_output(raw, "show run | include router bgp"),
            "router bgp 65000"
        );
    }

    #[test]
    fn test_clean_output_strips_pager() {
        let raw = "show ip bgp\nline one\n --More-- \x08\x08\x08\x08\x08\x08\x08\x08\x08\x08line two\nR1#";
        assert_eq!(clean_output(raw, "show ip bgp"), "line one\n  line two");
    }

    #[test]
    fn test_from_config() {
        let config: RouterConnectionConfig = serde_json::from_str(
            r#"{"host": "192.0.2.1", "username": "admin", "password": "pw", "location": "lab"}"#,
        )
        .unwrap();
        let client = SshClient::from_config(&config);
        assert_eq!(client.port, 22);
        assert_eq!(client.secret.as_deref(), Some("pw"));
        assert_eq!(client.device_type, DeviceType::CiscoIos);
        assert!(!client.is_connected());
    }

    #[tokio::test]
    async fn test_execute_without_connect() {
        let client = SshClient::new_with_password(
            "client".to_string(),
            "localhost".to_string(),
            "password".to_string(),
            2221,
        );
        assert!(matches!(
            client.execute_command("show ip bgp").await,
            Err(SshError::NotConnected)
        ));
    }

    #[tokio::test]
    #[ignore = "requires a reachable Cisco device on localhost:2221"]
    async fn test_connect_and_show_bgp() {
        let mut client = SshClient::new_with_password(
            "client".to_string(),
            "localhost".to_string(),
            "password".to_string(),
            2221,
        );
        client.connect().await.unwrap();
        let output = client
            .send_command("show ip bgp", OutputMode::Structured)
            .await;
        assert!(output.is_ok());
        client.disconnect().await.unwrap();
        assert!(!client.is_connected());
    }
}
