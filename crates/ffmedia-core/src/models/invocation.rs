use crate::error::ToolError;

/// Outcome of one tool call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationResult {
    Success(String),
    Failure(ToolError),
}

impl InvocationResult {
    pub fn success(message: impl Into<String>) -> Self {
        InvocationResult::Success(message.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, InvocationResult::Success(_))
    }

    pub fn error(&self) -> Option<&ToolError> {
        match self {
            InvocationResult::Success(_) => None,
            InvocationResult::Failure(err) => Some(err),
        }
    }

    /// Human-readable text returned to the caller.
    pub fn message(&self) -> String {
        match self {
            InvocationResult::Success(message) => message.clone(),
            InvocationResult::Failure(err) => err.to_string(),
        }
    }
}

impl From<Result<String, ToolError>> for InvocationResult {
    fn from(result: Result<String, ToolError>) -> Self {
        match result {
            Ok(message) => InvocationResult::Success(message),
            Err(err) => InvocationResult::Failure(err),
        }
    }
}
