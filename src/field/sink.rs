//! The Render-Sink Planner: turns a `RenderSinkRequest` into a plan of
//! per-input materialization requests, then an executed `RenderOutput`.

use std::collections::HashMap;

use crate::error::MaterializeError;
use crate::field::format::{BufferFormat, Layout};
use crate::field::ir::{MaterializationRequest, RenderSinkRequest};

/// Infer `(format, layout)` for an input from its usage-tag name
/// (`spec.md §4.2`'s heuristic table).
pub fn format_for_usage_tag(name: &str) -> (BufferFormat, Layout) {
    match name {
        "pos" | "position" => (BufferFormat::Vec2F32, Layout::Vec2),
        "size" | "radius" => (BufferFormat::F32, Layout::Scalar),
        "fill" | "color" => (BufferFormat::Rgba8, Layout::Color),
        "velocity" => (BufferFormat::Vec2F32, Layout::Vec2),
        "rotation" => (BufferFormat::F32, Layout::Scalar),
        _ => (BufferFormat::F32, Layout::Scalar),
    }
}

fn layout_name(layout: Layout) -> &'static str {
    match layout {
        Layout::Scalar => "scalar",
        Layout::Vec2 => "vec2",
        Layout::Color => "color",
    }
}

fn format_name(format: BufferFormat) -> &'static str {
    match format {
        BufferFormat::F32 => "f32",
        BufferFormat::F64 => "f64",
        BufferFormat::I32 => "i32",
        BufferFormat::U32 => "u32",
        BufferFormat::U8 => "u8",
        BufferFormat::Vec2F32 => "vec2f32",
        BufferFormat::Vec3F32 => "vec3f32",
        BufferFormat::Vec4F32 => "vec4f32",
        BufferFormat::QuatF32 => "quatf32",
        BufferFormat::Mat4F32 => "mat4f32",
        BufferFormat::Rgba8 => "rgba8",
    }
}

/// Step 1-2: one materialization request per named field input, in the
/// request's `BTreeMap` key order (stable iteration, `spec.md §4.2`/§6).
pub fn plan(request: &RenderSinkRequest) -> Vec<MaterializationRequest> {
    request
        .field_inputs
        .iter()
        .map(|(usage_tag, field_id)| {
            let (format, layout) = format_for_usage_tag(usage_tag);
            MaterializationRequest {
                field_id: *field_id,
                domain_id: request.domain_id,
                format: format_name(format).to_string(),
                layout: layout_name(layout).to_string(),
                usage_tag: usage_tag.clone(),
            }
        })
        .collect()
}

/// The executed render-sink output (`spec.md §6`): `{kind, instanceCount,
/// buffers, uniforms}`.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub kind: String,
    pub instance_count: usize,
    pub buffers: HashMap<String, std::rc::Rc<crate::field::format::BufferView>>,
    pub uniforms: HashMap<String, f64>,
}

impl RenderOutput {
    pub(crate) fn new(kind: String, instance_count: usize) -> Self {
        Self {
            kind,
            instance_count,
            buffers: HashMap::new(),
            uniforms: HashMap::new(),
        }
    }
}

/// Resolve a planned materialization's string `format` back into a
/// [`BufferFormat`] for the materializer to execute against.
pub fn resolve_format(request: &MaterializationRequest) -> Result<BufferFormat, MaterializeError> {
    BufferFormat::parse(&request.format)
}
