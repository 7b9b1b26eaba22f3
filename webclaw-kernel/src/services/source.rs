//! Raw socket enumeration
//!
//! The detector never talks to the OS directly: it asks a `SocketSource` for the
//! text printed by a listening-socket tool and for process command lines.
//! `CommandSource` is the real implementation (subprocess + procfs).

use std::future::Future;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command as AsyncCommand;
use tracing::{debug, warn};

use crate::config::ScanConf;

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("invalid scan command {command:?}: {reason}")]
    InvalidCommand { command: String, reason: String },
    #[error("failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{tool} timed out after {timeout_ms}ms")]
    Timeout { tool: String, timeout_ms: u64 },
    #[error("{tool} exited with status {code:?}")]
    ExitStatus { tool: String, code: Option<i32> },
    #[error("no scan tool available")]
    NoTool,
}

/// Text printed by one scan tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOutput {
    pub tool: String,
    pub text: String,
}

pub trait SocketSource: Send + Sync + 'static {
    /// Output of the first scan tool that succeeds.
    fn list_sockets(&self) -> impl Future<Output = Result<ScanOutput, ScanError>> + Send;

    /// Full command line of a process, arguments joined by spaces.
    fn command_line(&self, pid: u32) -> impl Future<Output = Option<String>> + Send;
}

/// Runs the configured tools in order (`ss`, then `netstat` by default).
#[derive(Debug, Clone)]
pub struct CommandSource {
    commands: Vec<String>,
    timeout: Duration,
    proc_root: PathBuf,
}

impl CommandSource {
    pub fn new(conf: &ScanConf) -> Self {
        Self {
            commands: conf.commands.clone(),
            timeout: Duration::from_millis(conf.timeout_ms),
            proc_root: PathBuf::from(&conf.proc_root),
        }
    }

    async fn run(&self, command: &str) -> Result<ScanOutput, ScanError> {
        let words = shell_words::split(command).map_err(|e| ScanError::InvalidCommand {
            command: command.to_string(),
            reason: e.to_string(),
        })?;
        let Some((program, args)) = words.split_first() else {
            return Err(ScanError::InvalidCommand {
                command: command.to_string(),
                reason: "empty command".into(),
            });
        };

        debug!("running scan tool: {}", command);
        let output = tokio::time::timeout(
            self.timeout,
            AsyncCommand::new(program)
                .args(args)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::null())
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| ScanError::Timeout {
            tool: program.clone(),
            timeout_ms: self.timeout.as_millis() as u64,
        })?
        .map_err(|source| ScanError::Spawn { tool: program.clone(), source })?;

        if !output.status.success() {
            return Err(ScanError::ExitStatus { tool: program.clone(), code: output.status.code() });
        }

        Ok(ScanOutput {
            tool: program.clone(),
            text: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }
}

impl SocketSource for CommandSource {
    async fn list_sockets(&self) -> Result<ScanOutput, ScanError> {
        for command in &self.commands {
            match self.run(command).await {
                Ok(output) => return Ok(output),
                Err(e) => warn!("scan tool failed, trying next: {}", e),
            }
        }
        Err(ScanError::NoTool)
    }

    async fn command_line(&self, pid: u32) -> Option<String> {
        let raw = tokio::fs::read(self.proc_root.join(pid.to_string()).join("cmdline")).await.ok()?;
        Some(String::from_utf8_lossy(&raw).replace('\0', " ").trim().to_string())
    }
}
