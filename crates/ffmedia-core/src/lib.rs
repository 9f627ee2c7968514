//! ffmedia Core Library
//!
//! This crate provides the configuration, error taxonomy and data model
//! shared by the processing and MCP crates.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{Config, LogFormat};
pub use error::{LogLevel, ToolError};
pub use models::{BatchResult, InvocationResult, MediaKind};
