//! ffmedia MCP Server
//!
//! Model Context Protocol server for ffmpeg media processing
//! Run with: FFMPEG_PATH=/usr/bin/ffmpeg ffmedia-mcp

use anyhow::Context;
use ffmedia_core::{Config, LogFormat};
use ffmedia_mcp::{Dispatcher, FfmediaService, OperationRegistry};
use ffmedia_processing::TokioInvoker;
use rmcp::service::ServiceExt;
use rmcp::transport::io::stdio;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // stdout carries the MCP stream
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.with_ansi(false).init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Invalid configuration")?;
    init_tracing(config.log_format);

    let registry = Arc::new(OperationRegistry::builtin());
    let dispatcher = Dispatcher::new(registry, Arc::new(TokioInvoker), &config);

    if dispatcher.probe().ffmpeg_available().await {
        tracing::info!(ffmpeg = %config.ffmpeg_path, "FFmpeg available");
    } else {
        tracing::warn!(
            ffmpeg = %config.ffmpeg_path,
            "FFmpeg not available; tool calls will fail until it is installed"
        );
    }

    tracing::info!(
        tools = dispatcher.registry().list_operations().len(),
        batch_concurrency = config.batch_concurrency,
        "Starting MCP server on stdio"
    );

    let service = FfmediaService::new(dispatcher);
    let running = service.serve(stdio()).await.context("MCP transport failed")?;
    running.waiting().await.context("MCP server error")?;

    Ok(())
}
