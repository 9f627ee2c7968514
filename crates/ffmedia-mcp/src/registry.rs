//! Operation registry
//!
//! The fixed catalog of tools, each with an ordered parameter schema. The
//! schema drives both the JSON Schema advertised to clients and the argument
//! validation that runs before any operation is invoked.

use ffmedia_core::constants::{
    DEFAULT_IMAGE_QUALITY, DEFAULT_VIDEO_CRF, DEFAULT_VIDEO_PRESET, MAX_IMAGE_QUALITY,
    MAX_VIDEO_CRF, MIN_IMAGE_QUALITY, MIN_VIDEO_CRF,
};
use ffmedia_core::ToolError;
use ffmedia_processing::X264Preset;
use serde_json::{json, Map, Value};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Integer,
    /// A filesystem path, advertised as a string
    Path,
}

impl ParamType {
    fn json_type(&self) -> &'static str {
        match self {
            ParamType::String | ParamType::Path => "string",
            ParamType::Integer => "integer",
        }
    }
}

/// What a path parameter points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathRole {
    InputFile,
    InputDir,
    OutputFile,
    OutputDir,
}

impl PathRole {
    pub fn is_input(&self) -> bool {
        matches!(self, PathRole::InputFile | PathRole::InputDir)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    Range { min: i64, max: Option<i64> },
    OneOf(&'static [&'static str]),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub ty: ParamType,
    pub required: bool,
    pub default: Option<Value>,
    pub description: &'static str,
    pub constraint: Option<Constraint>,
    pub role: Option<PathRole>,
}

impl ParamSpec {
    fn new(name: &'static str, ty: ParamType, description: &'static str) -> Self {
        Self {
            name,
            ty,
            required: true,
            default: None,
            description,
            constraint: None,
            role: None,
        }
    }

    pub fn path(name: &'static str, role: PathRole, description: &'static str) -> Self {
        Self {
            role: Some(role),
            ..Self::new(name, ParamType::Path, description)
        }
    }

    pub fn integer(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamType::Integer, description)
    }

    pub fn string(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamType::String, description)
    }

    /// Makes the parameter optional.
    pub fn with_default(mut self, default: Value) -> Self {
        self.required = false;
        self.default = Some(default);
        self
    }

    pub fn range(mut self, min: i64, max: Option<i64>) -> Self {
        self.constraint = Some(Constraint::Range { min, max });
        self
    }

    pub fn one_of(mut self, allowed: &'static [&'static str]) -> Self {
        self.constraint = Some(Constraint::OneOf(allowed));
        self
    }

    fn schema(&self) -> Value {
        let mut prop = Map::new();
        prop.insert("type".into(), json!(self.ty.json_type()));
        prop.insert("description".into(), json!(self.description));
        if let Some(default) = &self.default {
            prop.insert("default".into(), default.clone());
        }
        match &self.constraint {
            Some(Constraint::Range { min, max }) => {
                prop.insert("minimum".into(), json!(min));
                if let Some(max) = max {
                    prop.insert("maximum".into(), json!(max));
                }
            }
            Some(Constraint::OneOf(allowed)) => {
                prop.insert("enum".into(), json!(allowed));
            }
            None => {}
        }
        Value::Object(prop)
    }

    fn check(&self, value: &Value) -> Result<Value, ToolError> {
        match self.ty {
            ParamType::String => {
                let s = value
                    .as_str()
                    .ok_or_else(|| ToolError::invalid(self.name, "expected a string"))?;
                self.check_constraint_str(s)?;
            }
            ParamType::Path => {
                let s = value
                    .as_str()
                    .ok_or_else(|| ToolError::invalid(self.name, "expected a path string"))?;
                if s.trim().is_empty() {
                    return Err(ToolError::invalid(self.name, "path must not be empty"));
                }
            }
            ParamType::Integer => {
                let n = value
                    .as_i64()
                    .ok_or_else(|| ToolError::invalid(self.name, "expected an integer"))?;
                self.check_constraint_int(n)?;
            }
        }
        Ok(value.clone())
    }

    fn check_constraint_int(&self, n: i64) -> Result<(), ToolError> {
        match &self.constraint {
            Some(Constraint::Range { min, max: Some(max) }) if n < *min || n > *max => Err(
                ToolError::invalid(self.name, format!("must be between {} and {}", min, max)),
            ),
            Some(Constraint::Range { min, max: None }) if n < *min => Err(ToolError::invalid(
                self.name,
                format!("must be at least {}", min),
            )),
            _ => Ok(()),
        }
    }

    fn check_constraint_str(&self, s: &str) -> Result<(), ToolError> {
        match &self.constraint {
            Some(Constraint::OneOf(allowed)) if !allowed.contains(&s) => Err(ToolError::invalid(
                self.name,
                format!("'{}' is not one of: {}", s, allowed.join(", ")),
            )),
            _ => Ok(()),
        }
    }
}

/// Which underlying operation a descriptor routes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    CompressImage,
    BatchCompressImages,
    ConvertImageFormat,
    ResizeImage,
    CompressVideo,
    BatchCompressVideos,
    ConvertVideoFormat,
    ResizeVideo,
    GetMediaInfo,
    CheckFfmpegStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OperationDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: OperationKind,
    pub params: Vec<ParamSpec>,
}

impl OperationDescriptor {
    /// JSON Schema object for the tool's arguments.
    pub fn input_schema(&self) -> Map<String, Value> {
        let properties: Map<String, Value> = self
            .params
            .iter()
            .map(|p| (p.name.to_string(), p.schema()))
            .collect();
        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name)
            .collect();

        let mut schema = Map::new();
        schema.insert("type".into(), json!("object"));
        schema.insert("properties".into(), Value::Object(properties));
        schema.insert("required".into(), json!(required));
        schema
    }

    /// Check `arguments` against the parameter list and fill in defaults.
    ///
    /// Missing required arguments are reported before type errors, each in
    /// declaration order. `null` counts as absent; unknown keys are ignored.
    pub fn validate(&self, arguments: &Map<String, Value>) -> Result<ValidatedArgs, ToolError> {
        let present = |name: &str| arguments.get(name).filter(|v| !v.is_null());

        if let Some(missing) = self
            .params
            .iter()
            .find(|p| p.required && present(p.name).is_none())
        {
            return Err(ToolError::MissingArgument(missing.name.to_string()));
        }

        let mut values = Map::new();
        for param in &self.params {
            match (present(param.name), &param.default) {
                (Some(value), _) => {
                    values.insert(param.name.to_string(), param.check(value)?);
                }
                (None, Some(default)) => {
                    values.insert(param.name.to_string(), default.clone());
                }
                (None, None) => {}
            }
        }

        Ok(ValidatedArgs { values })
    }

    pub fn input_params(&self) -> impl Iterator<Item = (&ParamSpec, PathRole)> {
        self.params
            .iter()
            .filter_map(|p| p.role.filter(PathRole::is_input).map(|role| (p, role)))
    }
}

/// Arguments that passed validation, with defaults applied
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedArgs {
    values: Map<String, Value>,
}

impl ValidatedArgs {
    fn get(&self, name: &str) -> Result<&Value, ToolError> {
        self.values
            .get(name)
            .ok_or_else(|| ToolError::MissingArgument(name.to_string()))
    }

    pub fn str(&self, name: &str) -> Result<&str, ToolError> {
        self.get(name)?
            .as_str()
            .ok_or_else(|| ToolError::invalid(name, "expected a string"))
    }

    pub fn path(&self, name: &str) -> Result<PathBuf, ToolError> {
        self.str(name).map(PathBuf::from)
    }

    pub fn integer(&self, name: &str) -> Result<i64, ToolError> {
        self.get(name)?
            .as_i64()
            .ok_or_else(|| ToolError::invalid(name, "expected an integer"))
    }

    pub fn u8(&self, name: &str) -> Result<u8, ToolError> {
        u8::try_from(self.integer(name)?).map_err(|_| ToolError::invalid(name, "out of range"))
    }

    pub fn u32(&self, name: &str) -> Result<u32, ToolError> {
        u32::try_from(self.integer(name)?).map_err(|_| ToolError::invalid(name, "out of range"))
    }
}

/// Immutable catalog of operations, in advertised order
#[derive(Debug, Clone)]
pub struct OperationRegistry {
    operations: Vec<OperationDescriptor>,
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl OperationRegistry {
    pub fn builtin() -> Self {
        Self {
            operations: builtin_operations(),
        }
    }

    pub fn list_operations(&self) -> &[OperationDescriptor] {
        &self.operations
    }

    pub fn get(&self, name: &str) -> Option<&OperationDescriptor> {
        self.operations.iter().find(|op| op.name == name)
    }
}

fn quality_param() -> ParamSpec {
    ParamSpec::integer("quality", "Compression quality (1-100, higher is better)")
        .range(MIN_IMAGE_QUALITY, Some(MAX_IMAGE_QUALITY))
        .with_default(json!(DEFAULT_IMAGE_QUALITY))
}

fn crf_param() -> ParamSpec {
    ParamSpec::integer(
        "crf",
        "Constant rate factor (18-28, lower means higher quality)",
    )
    .range(MIN_VIDEO_CRF, Some(MAX_VIDEO_CRF))
    .with_default(json!(DEFAULT_VIDEO_CRF))
}

fn preset_param() -> ParamSpec {
    ParamSpec::string("preset", "x264 encoding speed preset")
        .one_of(X264Preset::NAMES)
        .with_default(json!(DEFAULT_VIDEO_PRESET))
}

fn dimension_params() -> [ParamSpec; 2] {
    [
        ParamSpec::integer("width", "Target width in pixels").range(1, None),
        ParamSpec::integer("height", "Target height in pixels").range(1, None),
    ]
}

fn single_file(
    name: &'static str,
    description: &'static str,
    kind: OperationKind,
    noun: &'static str,
    extra: Vec<ParamSpec>,
) -> OperationDescriptor {
    let (input_desc, output_desc) = match noun {
        "image" => ("Input image file path", "Output image file path"),
        _ => ("Input video file path", "Output video file path"),
    };
    let mut params = vec![
        ParamSpec::path("input_path", PathRole::InputFile, input_desc),
        ParamSpec::path("output_path", PathRole::OutputFile, output_desc),
    ];
    params.extend(extra);
    OperationDescriptor {
        name,
        description,
        kind,
        params,
    }
}

fn batch(
    name: &'static str,
    description: &'static str,
    kind: OperationKind,
    extra: Vec<ParamSpec>,
) -> OperationDescriptor {
    let mut params = vec![
        ParamSpec::path("input_dir", PathRole::InputDir, "Input directory path"),
        ParamSpec::path("output_dir", PathRole::OutputDir, "Output directory path"),
    ];
    params.extend(extra);
    OperationDescriptor {
        name,
        description,
        kind,
        params,
    }
}

fn builtin_operations() -> Vec<OperationDescriptor> {
    vec![
        single_file(
            "compress_image",
            "Compress a single image file",
            OperationKind::CompressImage,
            "image",
            vec![quality_param()],
        ),
        batch(
            "batch_compress_images",
            "Compress every image in a directory",
            OperationKind::BatchCompressImages,
            vec![quality_param()],
        ),
        single_file(
            "convert_image_format",
            "Convert an image to the format implied by the output file extension",
            OperationKind::ConvertImageFormat,
            "image",
            vec![],
        ),
        single_file(
            "resize_image",
            "Resize an image to exactly width x height (aspect ratio is not preserved)",
            OperationKind::ResizeImage,
            "image",
            dimension_params().into(),
        ),
        single_file(
            "compress_video",
            "Compress a single video file with H.264",
            OperationKind::CompressVideo,
            "video",
            vec![crf_param(), preset_param()],
        ),
        batch(
            "batch_compress_videos",
            "Compress every video in a directory",
            OperationKind::BatchCompressVideos,
            vec![crf_param(), preset_param()],
        ),
        single_file(
            "convert_video_format",
            "Convert a video to the container implied by the output file extension",
            OperationKind::ConvertVideoFormat,
            "video",
            vec![],
        ),
        single_file(
            "resize_video",
            "Resize a video to exactly width x height, copying the audio stream",
            OperationKind::ResizeVideo,
            "video",
            dimension_params().into(),
        ),
        OperationDescriptor {
            name: "get_media_info",
            description: "Get format and stream information for a media file",
            kind: OperationKind::GetMediaInfo,
            params: vec![ParamSpec::path(
                "file_path",
                PathRole::InputFile,
                "Media file path",
            )],
        },
        OperationDescriptor {
            name: "check_ffmpeg_status",
            description: "Check whether FFmpeg is installed and available",
            kind: OperationKind::CheckFfmpegStatus,
            params: vec![],
        },
    ]
}
