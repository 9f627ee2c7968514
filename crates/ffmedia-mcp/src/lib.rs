//! ffmedia MCP Server
//!
//! Model Context Protocol server that exposes ffmpeg-backed image and video
//! operations as tools for AI assistants (Claude Desktop, Cursor, etc.)

pub mod dispatcher;
pub mod registry;
pub mod server;

pub use dispatcher::Dispatcher;
pub use registry::{OperationDescriptor, OperationKind, OperationRegistry, ValidatedArgs};
pub use server::FfmediaService;
