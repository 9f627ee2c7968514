//! Dispatcher tests against a recording invoker: no real ffmpeg is started.

use ffmedia_core::{Config, InvocationResult, ToolError};
use ffmedia_mcp::registry::ParamType;
use ffmedia_mcp::{Dispatcher, OperationRegistry};
use ffmedia_processing::test_support::MockInvoker;
use serde_json::{json, Map, Value};
use std::path::Path;
use std::sync::Arc;

fn dispatcher(invoker: Arc<MockInvoker>) -> Dispatcher {
    Dispatcher::new(
        Arc::new(OperationRegistry::builtin()),
        invoker,
        &Config::default(),
    )
}

fn args(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("arguments must be a JSON object"),
    }
}

fn touch(dir: &Path, name: &str) {
    std::fs::write(dir.join(name), b"data").unwrap();
}

#[tokio::test]
async fn test_unknown_operation() {
    let invoker = Arc::new(MockInvoker::succeeding());
    let result = dispatcher(invoker.clone())
        .dispatch("sharpen_image", &Map::new())
        .await;

    assert_eq!(
        result.error(),
        Some(&ToolError::UnknownOperation("sharpen_image".to_string()))
    );
    assert_eq!(invoker.call_count(), 0);
}

#[tokio::test]
async fn test_missing_argument_starts_no_process() {
    let invoker = Arc::new(MockInvoker::succeeding());
    let result = dispatcher(invoker.clone())
        .dispatch("compress_image", &args(json!({ "input_path": "photo.jpg" })))
        .await;

    assert_eq!(
        result.error(),
        Some(&ToolError::MissingArgument("output_path".to_string()))
    );
    assert_eq!(result.message(), "missing required argument: output_path");
    assert_eq!(invoker.call_count(), 0);
}

#[tokio::test]
async fn test_every_required_argument_is_enforced() {
    let registry = OperationRegistry::builtin();
    let invoker = Arc::new(MockInvoker::succeeding());
    let dispatcher = dispatcher(invoker.clone());
    let mut checked = 0;

    for operation in registry.list_operations() {
        let required: Vec<_> = operation.params.iter().filter(|p| p.required).collect();
        for dropped in &required {
            let arguments: Map<String, Value> = required
                .iter()
                .filter(|p| p.name != dropped.name)
                .map(|p| {
                    let value = match p.ty {
                        ParamType::Integer => json!(10),
                        ParamType::String | ParamType::Path => json!("media.mp4"),
                    };
                    (p.name.to_string(), value)
                })
                .collect();

            let result = dispatcher.dispatch(operation.name, &arguments).await;
            assert_eq!(
                result.error(),
                Some(&ToolError::MissingArgument(dropped.name.to_string())),
                "{} without {}",
                operation.name,
                dropped.name
            );
            checked += 1;
        }
    }

    assert_eq!(checked, 21);
    assert_eq!(invoker.call_count(), 0);
}

#[tokio::test]
async fn test_media_info_on_missing_path() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.mp4");
    let invoker = Arc::new(MockInvoker::succeeding());

    let result = dispatcher(invoker.clone())
        .dispatch("get_media_info", &args(json!({ "file_path": missing })))
        .await;

    assert_eq!(result.error(), Some(&ToolError::InputNotFound(missing)));
    assert_eq!(invoker.call_count(), 0);
}

#[tokio::test]
async fn test_invalid_video_arguments() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "clip.mp4");
    let input = dir.path().join("clip.mp4");
    let output = dir.path().join("out.mp4");
    let invoker = Arc::new(MockInvoker::succeeding());
    let dispatcher = dispatcher(invoker.clone());

    let result = dispatcher
        .dispatch(
            "compress_video",
            &args(json!({ "input_path": input, "output_path": output, "crf": 51 })),
        )
        .await;
    assert_eq!(
        result.error(),
        Some(&ToolError::invalid("crf", "must be between 18 and 28"))
    );

    let result = dispatcher
        .dispatch(
            "compress_video",
            &args(json!({ "input_path": input, "output_path": output, "preset": "ludicrous" })),
        )
        .await;
    assert!(matches!(
        result.error(),
        Some(ToolError::InvalidArgument { name, .. }) if name == "preset"
    ));

    assert_eq!(invoker.call_count(), 0);
}

#[tokio::test]
async fn test_resize_passes_exact_scale() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "photo.jpg");
    let input = dir.path().join("photo.jpg");
    let output = dir.path().join("small/photo.jpg");
    let invoker = Arc::new(MockInvoker::succeeding());

    let result = dispatcher(invoker.clone())
        .dispatch(
            "resize_image",
            &args(json!({ "input_path": input, "output_path": output, "width": 100, "height": 50 })),
        )
        .await;

    assert_eq!(
        result,
        InvocationResult::success(format!(
            "Image resize succeeded: {} -> {} (100x50)",
            input.display(),
            output.display()
        ))
    );
    let calls = invoker.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].args.iter().any(|arg| arg == "scale=100:50"));
    assert!(dir.path().join("small").is_dir());
}

#[tokio::test]
async fn test_compress_video_defaults() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "clip.mov");
    let input = dir.path().join("clip.mov");
    let output = dir.path().join("clip.mp4");
    let invoker = Arc::new(MockInvoker::succeeding());

    let result = dispatcher(invoker.clone())
        .dispatch(
            "compress_video",
            &args(json!({ "input_path": input, "output_path": output })),
        )
        .await;

    assert!(result.is_success());
    let calls = invoker.calls();
    let call = &calls[0];
    let crf = call.args.iter().position(|a| a == "-crf").unwrap();
    assert_eq!(call.args[crf + 1], "23");
    let preset = call.args.iter().position(|a| a == "-preset").unwrap();
    assert_eq!(call.args[preset + 1], "medium");
}

#[tokio::test]
async fn test_ffmpeg_failure_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "photo.jpg");
    let input = dir.path().join("photo.jpg");
    let invoker = Arc::new(MockInvoker::exiting_with(1));

    let result = dispatcher(invoker)
        .dispatch(
            "compress_image",
            &args(json!({ "input_path": input, "output_path": dir.path().join("out.jpg") })),
        )
        .await;

    assert_eq!(
        result.error(),
        Some(&ToolError::ExecutionFailure(format!(
            "Image compression failed: {} (ffmpeg exited with status 1)",
            input.display()
        )))
    );
}

#[tokio::test]
async fn test_media_info_returns_probe_document() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "clip.mp4");
    let invoker = Arc::new(MockInvoker::printing(
        r#"{"format":{"duration":"12.5"},"streams":[]}"#,
    ));

    let result = dispatcher(invoker)
        .dispatch(
            "get_media_info",
            &args(json!({ "file_path": dir.path().join("clip.mp4") })),
        )
        .await;

    assert!(result.is_success());
    let parsed: Value = serde_json::from_str(&result.message()).unwrap();
    assert_eq!(parsed["format"]["duration"], "12.5");
}

#[tokio::test]
async fn test_empty_batch() {
    let src = tempfile::tempdir().unwrap();
    let dst = tempfile::tempdir().unwrap();
    let invoker = Arc::new(MockInvoker::succeeding());

    let result = dispatcher(invoker.clone())
        .dispatch(
            "batch_compress_images",
            &args(json!({ "input_dir": src.path(), "output_dir": dst.path() })),
        )
        .await;

    assert_eq!(
        result,
        InvocationResult::success(
            "Batch image compression complete!\nTotal: 0 files\nSucceeded: 0\nFailed: 0"
        )
    );
    assert_eq!(invoker.call_count(), 0);
}

#[tokio::test]
async fn test_batch_skips_non_media_files() {
    let src = tempfile::tempdir().unwrap();
    let dst = tempfile::tempdir().unwrap();
    touch(src.path(), "photo.jpg");
    touch(src.path(), "doc.txt");
    let invoker = Arc::new(MockInvoker::succeeding());

    let result = dispatcher(invoker.clone())
        .dispatch(
            "batch_compress_images",
            &args(json!({ "input_dir": src.path(), "output_dir": dst.path(), "quality": 70 })),
        )
        .await;

    assert!(result.message().contains("Total: 1 files"));
    assert_eq!(invoker.call_count(), 1);
}

#[tokio::test]
async fn test_batch_counts_failures() {
    let src = tempfile::tempdir().unwrap();
    let dst = tempfile::tempdir().unwrap();
    for name in ["a.mp4", "corrupt.mkv", "c.webm"] {
        touch(src.path(), name);
    }
    let invoker = Arc::new(MockInvoker::failing_when_arg_contains("corrupt"));

    let result = dispatcher(invoker)
        .dispatch(
            "batch_compress_videos",
            &args(json!({ "input_dir": src.path(), "output_dir": dst.path(), "crf": 28 })),
        )
        .await;

    assert!(result.is_success());
    let message = result.message();
    assert!(message.starts_with("Batch video compression complete!"));
    assert!(message.contains("Total: 3 files\nSucceeded: 2\nFailed: 1"));
    assert!(message.contains("Failed files: corrupt.mkv: execution error: ffmpeg exited with status 1"));
}

#[tokio::test]
async fn test_batch_on_missing_directory() {
    let dst = tempfile::tempdir().unwrap();
    let missing = dst.path().join("nowhere");
    let invoker = Arc::new(MockInvoker::succeeding());

    let result = dispatcher(invoker.clone())
        .dispatch(
            "batch_compress_videos",
            &args(json!({ "input_dir": missing, "output_dir": dst.path() })),
        )
        .await;

    assert_eq!(result.error(), Some(&ToolError::InputNotFound(missing)));
    assert_eq!(invoker.call_count(), 0);
}
