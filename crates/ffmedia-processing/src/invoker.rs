//! External process invoker
//!
//! Every ffmpeg/ffprobe call goes through [`ProcessInvoker`]. The production
//! implementation spawns a tokio child process; tests swap in a recording stub.

use async_trait::async_trait;
use ffmedia_core::ToolError;
use std::ffi::OsString;
use std::fmt;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// A program and its argument vector. Arguments are passed verbatim, never through a shell.
///
/// Arguments are `OsString`s so paths that are not valid UTF-8 reach the child unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<OsString>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
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
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }

    /// Short reason for an unsuccessful run, without parsing stderr.
    pub fn failure_reason(&self, program: &str) -> String {
        match self.exit_code {
            Some(code) => format!("{} exited with status {}", program, code),
            None => format!("{} was terminated by a signal", program),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InvokeError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} timed out after {}s", .after.as_secs())]
    Timeout { program: String, after: Duration },

    #[error("IO error while waiting for {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<InvokeError> for ToolError {
    fn from(err: InvokeError) -> Self {
        match err {
            InvokeError::Timeout { program, after } => ToolError::Timeout {
                program,
                seconds: after.as_secs(),
            },
            other => ToolError::ExecutionFailure(other.to_string()),
        }
    }
}

/// Runs a command to completion and reports exit status and captured output.
#[async_trait]
pub trait ProcessInvoker: Send + Sync {
    async fn run(
        &self,
        command: &CommandSpec,
        timeout: Option<Duration>,
    ) -> Result<CommandOutput, InvokeError>;
}

/// Invoker backed by `tokio::process`. On timeout the child is killed.
#[derive(Debug, Clone, Default)]
pub struct TokioInvoker;

impl TokioInvoker {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessInvoker for TokioInvoker {
    #[tracing::instrument(skip(self, command), fields(
        process.executable.name = %command.program,
        process.args_count = command.args.len()
    ))]
    async fn run(
        &self,
        command: &CommandSpec,
        timeout: Option<Duration>,
    ) -> Result<CommandOutput, InvokeError> {
        let start = std::time::Instant::now();

        let child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| InvokeError::Spawn {
                program: command.program.clone(),
                source,
            })?;

        // Dropping the wait future on expiry drops the child, which kills it.
        let waited = match timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| InvokeError::Timeout {
                    program: command.program.clone(),
                    after: limit,
                })?,
            None => child.wait_with_output().await,
        };

        let output = waited.map_err(|source| InvokeError::Io {
            program: command.program.clone(),
            source,
        })?;

        tracing::debug!(
            duration_ms = start.elapsed().as_millis(),
            exit_code = ?output.status.code(),
            "Process finished"
        );

        Ok(CommandOutput {
            exit_code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}
