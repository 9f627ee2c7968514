//! Test helpers: a scripted [`ProcessInvoker`] that records every command.

use crate::invoker::{CommandOutput, CommandSpec, InvokeError, ProcessInvoker};
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

type Responder = Box<dyn Fn(&CommandSpec) -> Result<CommandOutput, InvokeError> + Send + Sync>;

pub struct MockInvoker {
    calls: Mutex<Vec<CommandSpec>>,
    responder: Responder,
}

impl MockInvoker {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&CommandSpec) -> Result<CommandOutput, InvokeError> + Send + Sync + 'static,
    {
        Self {
            calls: Mutex::new(Vec::new()),
            responder: Box::new(responder),
        }
    }

    /// Every command exits 0 with empty output.
    pub fn succeeding() -> Self {
        Self::exiting_with(0)
    }

    pub fn exiting_with(code: i32) -> Self {
        Self::new(move |_| Ok(exit(code)))
    }

    /// Exits 0 with `stdout` for every command.
    pub fn printing(stdout: impl Into<Vec<u8>>) -> Self {
        let stdout = stdout.into();
        Self::new(move |_| {
            Ok(CommandOutput {
                exit_code: Some(0),
                stdout: stdout.clone(),
                stderr: Vec::new(),
            })
        })
    }

    /// Exits 1 when any argument contains `needle`, 0 otherwise.
    pub fn failing_when_arg_contains(needle: &'static str) -> Self {
        Self::new(move |cmd| {
            let fail = cmd.args.iter().any(|arg| arg.to_string_lossy().contains(needle));
            Ok(exit(if fail { 1 } else { 0 }))
        })
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_default()
    }
}

pub fn exit(code: i32) -> CommandOutput {
    CommandOutput {
        exit_code: Some(code),
        ..Default::default()
    }
}

#[async_trait]
impl ProcessInvoker for MockInvoker {
    async fn run(
        &self,
        command: &CommandSpec,
        _timeout: Option<Duration>,
    ) -> Result<CommandOutput, InvokeError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(command.clone());
        }
        (self.responder)(command)
    }
}
