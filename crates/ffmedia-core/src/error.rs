//! Error types module
//!
//! Every failure a tool call can produce is a `ToolError`. Validation variants
//! are raised before any external process is started; the remaining variants
//! describe what happened to the ffmpeg/ffprobe subprocess. None of them are
//! propagated across the tool-call boundary: the dispatcher turns them into a
//! failed `InvocationResult`.

use std::path::PathBuf;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for caller mistakes like missing or invalid arguments
    Debug,
    /// Warning level - for external process failures
    Warn,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToolError {
    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    #[error("missing required argument: {0}")]
    MissingArgument(String),

    #[error("invalid argument '{name}': {reason}")]
    InvalidArgument { name: String, reason: String },

    #[error("input not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("execution error: {0}")]
    ExecutionFailure(String),

    #[error("media probe failed: {0}")]
    ProbeFailure(String),

    #[error("{program} timed out after {seconds}s")]
    Timeout { program: String, seconds: u64 },
}

impl ToolError {
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ToolError::InvalidArgument {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Machine-readable error code (e.g., "MISSING_ARGUMENT")
    pub fn error_code(&self) -> &'static str {
        match self {
            ToolError::UnknownOperation(_) => "UNKNOWN_OPERATION",
            ToolError::MissingArgument(_) => "MISSING_ARGUMENT",
            ToolError::InvalidArgument { .. } => "INVALID_ARGUMENT",
            ToolError::InputNotFound(_) => "INPUT_NOT_FOUND",
            ToolError::ExecutionFailure(_) => "EXECUTION_FAILURE",
            ToolError::ProbeFailure(_) => "PROBE_FAILURE",
            ToolError::Timeout { .. } => "TIMEOUT",
        }
    }

    /// True for failures detected before any subprocess was started.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ToolError::UnknownOperation(_)
                | ToolError::MissingArgument(_)
                | ToolError::InvalidArgument { .. }
                | ToolError::InputNotFound(_)
        )
    }

    pub fn log_level(&self) -> LogLevel {
        if self.is_validation() {
            LogLevel::Debug
        } else {
            LogLevel::Warn
        }
    }
}

impl From<std::io::Error> for ToolError {
    fn from(err: std::io::Error) -> Self {
        ToolError::ExecutionFailure(format!("IO error: {}", err))
    }
}
