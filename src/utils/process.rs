//! Runner for the external tools every pipeline stage shells out to.
//!
//! Invocations are argument vectors, never shell strings. Secrets travel
//! through the environment (`PGPASSWORD`) or the child's stdin (gpg
//! passphrases), so they never show up in a process listing.

use anyhow::{Context, Result};
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::errors::AppError;

/// One external process invocation, fully described before it is spawned.
#[derive(Debug)]
pub struct ToolInvocation {
    program: PathBuf,
    args: Vec<OsString>,
    envs: Vec<(String, String)>,
    stdin_payload: Option<Vec<u8>>,
}

impl ToolInvocation {
    pub fn new(program: PathBuf) -> Self {
        ToolInvocation {
            program,
            args: Vec::new(),
            envs: Vec::new(),
            stdin_payload: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Secret-bearing environment variable, scoped to this one invocation.
    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.envs.push((key.to_string(), value.to_string()));
        self
    }

    /// Bytes written to the child's stdin after spawn (e.g. a passphrase).
    pub fn stdin_payload(mut self, payload: Vec<u8>) -> Self {
        self.stdin_payload = Some(payload);
        self
    }

    pub fn tool_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.display().to_string())
    }

    /// Command line for verbose output. Secrets are never part of the
    /// argument vector, so this is safe to print.
    pub fn display_line(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }

    /// Spawns the tool, waits for it under `timeout`, and checks its exit
    /// status. Non-zero exit and timeout both abort the whole command.
    pub async fn run(self, timeout: Duration) -> crate::errors::Result<()> {
        let tool = self.tool_name();

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(if self.stdin_payload.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        for (key, value) in &self.envs {
            command.env(key, value);
        }

        let mut child = command
            .spawn()
            .with_context(|| format!("Failed to spawn {}", tool))?;

        if let Some(payload) = self.stdin_payload {
            let mut stdin = child
                .stdin
                .take()
                .context("Child process stdin was not captured")?;
            stdin
                .write_all(&payload)
                .await
                .with_context(|| format!("Failed to write to stdin of {}", tool))?;
            // Dropping closes the pipe so the child sees EOF.
            drop(stdin);
        }

        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(result) => result.with_context(|| format!("Failed to wait for {}", tool))?,
            Err(_) => {
                return Err(AppError::Timeout {
                    tool,
                    secs: timeout.as_secs(),
                });
            }
        };

        if !output.status.success() {
            return Err(AppError::ExternalTool {
                tool,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}

/// Locates an external tool on PATH, failing with an actionable message.
pub fn find_tool(name: &str) -> Result<PathBuf> {
    which::which(name).with_context(|| {
        format!(
            "{} executable not found in PATH. Please ensure it is installed and in your PATH.",
            name
        )
    })
}
