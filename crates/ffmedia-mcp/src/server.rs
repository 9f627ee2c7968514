//! MCP server using rmcp SDK
//!
//! Exposes the operation registry as MCP tools over stdio. Tool schemas come
//! from the registry's parameter descriptors, and every call goes through the
//! dispatcher. Failed operations are reported as tool results with
//! `is_error` set, never as protocol errors.

use crate::dispatcher::Dispatcher;
use crate::registry::OperationDescriptor;
use ffmedia_core::constants::SERVER_NAME;
use ffmedia_core::InvocationResult;
use rmcp::model::*;
use rmcp::service::{RequestContext, RoleServer};
use rmcp::ServerHandler;
use std::future::Future;
use std::sync::Arc;

fn text_content(s: impl Into<String>) -> Content {
    Content {
        raw: RawContent::Text(RawTextContent { text: s.into() }),
        annotations: None,
    }
}

fn tool_from_descriptor(descriptor: &OperationDescriptor) -> Tool {
    Tool::new(
        descriptor.name,
        descriptor.description,
        Arc::new(descriptor.input_schema()),
    )
}

#[derive(Clone)]
pub struct FfmediaService {
    dispatcher: Arc<Dispatcher>,
}

impl FfmediaService {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Advertised tools, in registry order.
    pub fn tools(&self) -> Vec<Tool> {
        self.dispatcher
            .registry()
            .list_operations()
            .iter()
            .map(tool_from_descriptor)
            .collect()
    }

    pub async fn call(&self, request: CallToolRequestParam) -> CallToolResult {
        let arguments = request.arguments.unwrap_or_default();
        match self.dispatcher.dispatch(&request.name, &arguments).await {
            InvocationResult::Success(message) => CallToolResult::success(vec![text_content(message)]),
            failure => CallToolResult::error(vec![text_content(failure.message())]),
        }
    }
}

impl ServerHandler for FfmediaService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.into(),
                version: env!("CARGO_PKG_VERSION").into(),
            },
            instructions: Some(
                "FFmpeg media tools: compress, convert and resize images and videos, \
                 batch-compress directories, inspect media files. \
                 Requires ffmpeg and ffprobe (FFMPEG_PATH / FFPROBE_PATH)."
                    .to_string(),
            ),
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListToolsResult, ErrorData>> + Send + '_ {
        std::future::ready(Ok(ListToolsResult {
            next_cursor: None,
            tools: self.tools(),
        }))
    }

    fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<CallToolResult, ErrorData>> + Send + '_ {
        async move { Ok(self.call(request).await) }
    }
}
