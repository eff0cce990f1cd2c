use log::debug;

pub use crate::error::ShaderStage;
use crate::error::ShaderError;
use crate::geometry::VertexLayout;
use crate::uniforms::{UniformLayout, LAMP_UNIFORMS, LIT_UNIFORMS};

/// WGSL text for the two stages of a program.
#[derive(Debug, Clone, Copy)]
pub struct ProgramSource<'a> {
    pub vertex: &'a str,
    pub fragment: &'a str,
}

/// Output and vertex formats a program is linked against.
#[derive(Debug, Clone, Copy)]
pub struct ProgramTargets {
    pub color_format: wgpu::TextureFormat,
    pub depth_format: Option<wgpu::TextureFormat>,
    pub vertex_layout: VertexLayout,
}

/// The two programs the scene is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgramKind {
    /// Textured, Phong-lit surfaces.
    Lit,
    /// Flat white light-source marker.
    Lamp,
}

impl ProgramKind {
    pub fn label(self) -> &'static str {
        match self {
            ProgramKind::Lit => "lit",
            ProgramKind::Lamp => "lamp",
        }
    }

    pub fn source(self) -> ProgramSource<'static> {
        match self {
            ProgramKind::Lit => ProgramSource {
                vertex: LIT_VERTEX,
                fragment: LIT_FRAGMENT,
            },
            ProgramKind::Lamp => ProgramSource {
                vertex: LAMP_VERTEX,
                fragment: LAMP_FRAGMENT,
            },
        }
    }

    pub fn uniform_layout(self) -> UniformLayout {
        match self {
            ProgramKind::Lit => LIT_UNIFORMS,
            ProgramKind::Lamp => LAMP_UNIFORMS,
        }
    }

    /// Whether the program samples a texture from bind group 1.
    pub fn is_textured(self) -> bool {
        matches!(self, ProgramKind::Lit)
    }
}

/// A vertex and fragment stage linked into a render pipeline.
pub struct ShaderProgram {
    pipeline: wgpu::RenderPipeline,
    label: String,
}

impl ShaderProgram {
    /// Compiles both stages, then links them.
    ///
    /// Each step runs in its own validation error scope so a bad program is
    /// reported as an error instead of reaching the device's uncaptured error
    /// handler. A stage that compiled before a later failure is dropped.
    pub async fn compile(
        device: &wgpu::Device,
        source: &ProgramSource<'_>,
        targets: &ProgramTargets,
        label: &str,
    ) -> Result<Self, ShaderError> {
        let vertex = compile_stage(device, ShaderStage::Vertex, source.vertex, label).await?;
        let fragment =
            compile_stage(device, ShaderStage::Fragment, source.fragment, label).await?;

        let attributes = targets.vertex_layout.wgpu_attributes();
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: None,
            vertex: wgpu::VertexState {
                module: &vertex,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: targets.vertex_layout.stride(),
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &attributes,
                }],
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                ..Default::default()
            },
            depth_stencil: targets.depth_format.map(|format| wgpu::DepthStencilState {
                format,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &fragment,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: targets.color_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            multiview: None,
            cache: None,
        });
        if let Some(err) = device.pop_error_scope().await {
            return Err(ShaderError::LinkFailed {
                log: err.to_string(),
            });
        }

        debug!("linked {label} program");
        Ok(Self {
            pipeline,
            label: label.to_string(),
        })
    }

    pub fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Layout derived from the shader interface for bind group `index`.
    pub fn bind_group_layout(&self, index: u32) -> wgpu::BindGroupLayout {
        self.pipeline.get_bind_group_layout(index)
    }

    pub fn release(self) {
        debug!("released {} program", self.label);
    }
}

async fn compile_stage(
    device: &wgpu::Device,
    stage: ShaderStage,
    source: &str,
    label: &str,
) -> Result<wgpu::ShaderModule, ShaderError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&format!("{label}-{stage}")),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    match device.pop_error_scope().await {
        Some(err) => Err(ShaderError::CompileFailed {
            stage,
            log: err.to_string(),
        }),
        None => Ok(module),
    }
}

pub const LIT_VERTEX: &str = r#"
struct LitUniforms {
    model: mat4x4<f32>,
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
    normal_matrix: mat3x3<f32>,
    object_color: vec3<f32>,
    light_color: vec3<f32>,
    light_pos: vec3<f32>,
    view_position: vec3<f32>,
}

@group(0) @binding(0)
var<uniform> uniforms: LitUniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) color: vec3<f32>,
    @location(2) uv: vec2<f32>,
    @location(3) normal: vec3<f32>,
}

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) uv: vec2<f32>,
    @location(2) normal: vec3<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    let world = uniforms.model * vec4<f32>(input.position, 1.0);
    out.clip_position = uniforms.projection * uniforms.view * world;
    out.world_position = world.xyz;
    out.uv = input.uv;
    // inverse-transpose of the model matrix, computed on the CPU
    out.normal = uniforms.normal_matrix * input.normal;
    return out;
}
"#;

pub const LIT_FRAGMENT: &str = r#"
const AMBIENT_STRENGTH: f32 = 0.1;
const SPECULAR_INTENSITY: f32 = 0.8;
const HIGHLIGHT_SIZE: f32 = 16.0;

struct LitUniforms {
    model: mat4x4<f32>,
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
    normal_matrix: mat3x3<f32>,
    object_color: vec3<f32>,
    light_color: vec3<f32>,
    light_pos: vec3<f32>,
    view_position: vec3<f32>,
}

@group(0) @binding(0)
var<uniform> uniforms: LitUniforms;

@group(1) @binding(0)
var surface_texture: texture_2d<f32>;
@group(1) @binding(1)
var surface_sampler: sampler;

struct FragmentInput {
    @location(0) world_position: vec3<f32>,
    @location(1) uv: vec2<f32>,
    @location(2) normal: vec3<f32>,
}

@fragment
fn fs_main(input: FragmentInput) -> @location(0) vec4<f32> {
    let ambient = AMBIENT_STRENGTH * uniforms.light_color;

    let norm = normalize(input.normal);
    let light_dir = normalize(uniforms.light_pos - input.world_position);
    let diffuse = max(dot(norm, light_dir), 0.0) * uniforms.light_color;

    let view_dir = normalize(uniforms.view_position - input.world_position);
    let reflect_dir = reflect(-light_dir, norm);
    let highlight = pow(max(dot(view_dir, reflect_dir), 0.0), HIGHLIGHT_SIZE);
    let specular = SPECULAR_INTENSITY * highlight * uniforms.light_color;

    let phong = (ambient + diffuse + specular) * uniforms.object_color;
    return textureSample(surface_texture, surface_sampler, input.uv) * vec4<f32>(phong, 1.0);
}
"#;

pub const LAMP_VERTEX: &str = r#"
struct LampUniforms {
    model: mat4x4<f32>,
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
}

@group(0) @binding(0)
var<uniform> uniforms: LampUniforms;

@vertex
fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return uniforms.projection * uniforms.view * uniforms.model * vec4<f32>(position, 1.0);
}
"#;

pub const LAMP_FRAGMENT: &str = r#"
@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0);
}
"#;
