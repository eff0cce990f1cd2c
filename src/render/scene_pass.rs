use std::path::Path;

use log::{info, warn};

use super::depth::DepthBuffer;
use crate::error::StartupError;
use crate::frame::{FramePlan, CLEAR_COLOR};
use crate::geometry::VertexLayout;
use crate::mesh::MeshSet;
use crate::scene::Scene;
use crate::shader::{ProgramKind, ProgramTargets, ShaderProgram};
use crate::texture::Texture;
use crate::uniforms::UniformBlock;

/// Everything uploaded for one scene, plus the pass that draws it.
///
/// The pass renders into any color view of the format it was built for, so
/// the same code path serves the window surface and offscreen targets.
pub struct ScenePass {
    meshes: MeshSet,
    textures: Vec<Texture>,
    lit: ShaderProgram,
    lamp: ShaderProgram,
    draws: Vec<DrawSlot>,
}

/// Uniform storage and bindings for one draw of the plan.
struct DrawSlot {
    block: UniformBlock,
    uniform_buffer: wgpu::Buffer,
    uniform_group: wgpu::BindGroup,
    texture_group: Option<wgpu::BindGroup>,
}

impl ScenePass {
    /// Uploads meshes, loads textures, builds both programs and the per-draw
    /// bindings, in that order. Slot `i` serves draw `i` of every plan built
    /// from `scene`: one lit draw per object, then the lamp.
    pub async fn load(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        scene: &Scene,
        asset_dir: &Path,
        color_format: wgpu::TextureFormat,
    ) -> Result<Self, StartupError> {
        let meshes = MeshSet::upload_all(device).map_err(|(mesh, source)| StartupError::Mesh {
            mesh: mesh.label(),
            source,
        })?;

        let mut textures = Vec::with_capacity(scene.objects.len());
        for object in &scene.objects {
            let path = asset_dir.join(&object.texture);
            let texture = Texture::load(device, queue, &path)
                .map_err(|source| StartupError::TextureLoad { path, source })?;
            textures.push(texture);
        }

        let lit_layout = scene
            .objects
            .first()
            .map_or(VertexLayout::LIT, |object| object.mesh.layout());
        let lit = compile(device, ProgramKind::Lit, lit_layout, color_format).await?;
        let lamp = compile(device, ProgramKind::Lamp, scene.lamp_mesh.layout(), color_format).await?;

        let mut draws = Vec::with_capacity(textures.len() + 1);
        for texture in &textures {
            draws.push(DrawSlot::new(device, ProgramKind::Lit, &lit, Some(texture)));
        }
        draws.push(DrawSlot::new(device, ProgramKind::Lamp, &lamp, None));

        info!(
            "scene loaded: {} mesh(es), {} texture(s), {} draw(s)",
            meshes.len(),
            textures.len(),
            draws.len()
        );
        Ok(Self {
            meshes,
            textures,
            lit,
            lamp,
            draws,
        })
    }

    pub fn draw_count(&self) -> usize {
        self.draws.len()
    }

    /// Stages uniforms for every draw of `plan`, then records a pass that
    /// clears `color` and `depth` and issues the draws in plan order.
    pub fn encode(
        &mut self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        color: &wgpu::TextureView,
        depth: &wgpu::TextureView,
        plan: &FramePlan,
    ) {
        if plan.draws.len() != self.draws.len() {
            warn!(
                "frame plan has {} draw(s) but {} were prepared; extra draws are skipped",
                plan.draws.len(),
                self.draws.len()
            );
        }
        for (draw, slot) in plan.draws.iter().zip(self.draws.iter_mut()) {
            draw.write_uniforms(plan, &mut slot.block);
            queue.write_buffer(&slot.uniform_buffer, 0, slot.block.as_bytes());
        }

        let mut pass = begin_clear_pass(encoder, color, depth);
        for (draw, slot) in plan.draws.iter().zip(self.draws.iter()) {
            let Some(mesh) = self.meshes.get(draw.mesh) else {
                continue;
            };
            let program = match draw.program {
                ProgramKind::Lit => &self.lit,
                ProgramKind::Lamp => &self.lamp,
            };
            pass.set_pipeline(program.pipeline());
            pass.set_bind_group(0, &slot.uniform_group, &[]);
            if let Some(group) = slot.texture_group.as_ref() {
                pass.set_bind_group(1, group, &[]);
            }
            pass.set_vertex_buffer(0, mesh.vertex_buffer().slice(..));
            pass.draw(0..mesh.vertex_count(), 0..1);
        }
    }

    /// Frees meshes, textures and programs.
    pub fn release(self) {
        drop(self.draws);
        self.meshes.destroy();
        for texture in self.textures {
            texture.destroy();
        }
        self.lit.release();
        self.lamp.release();
    }
}

impl DrawSlot {
    fn new(
        device: &wgpu::Device,
        kind: ProgramKind,
        program: &ShaderProgram,
        texture: Option<&Texture>,
    ) -> Self {
        let block = UniformBlock::new(kind.uniform_layout());
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{}-uniforms", kind.label())),
            size: block.as_bytes().len() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{}-uniform-group", kind.label())),
            layout: &program.bind_group_layout(0),
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });
        let texture_group = texture.filter(|_| kind.is_textured()).map(|texture| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(&format!("{}-texture-group", kind.label())),
                layout: &program.bind_group_layout(1),
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(texture.view()),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(texture.sampler()),
                    },
                ],
            })
        });
        Self {
            block,
            uniform_buffer,
            uniform_group,
            texture_group,
        }
    }
}

async fn compile(
    device: &wgpu::Device,
    kind: ProgramKind,
    vertex_layout: VertexLayout,
    color_format: wgpu::TextureFormat,
) -> Result<ShaderProgram, StartupError> {
    let targets = ProgramTargets {
        color_format,
        depth_format: Some(DepthBuffer::FORMAT),
        vertex_layout,
    };
    Ok(ShaderProgram::compile(device, &kind.source(), &targets, kind.label()).await?)
}

/// Clears color to the frame clear color and depth to 1.0.
pub(crate) fn begin_clear_pass<'e>(
    encoder: &'e mut wgpu::CommandEncoder,
    color: &wgpu::TextureView,
    depth: &wgpu::TextureView,
) -> wgpu::RenderPass<'e> {
    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("scene-pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: color,
            depth_slice: None,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
            view: depth,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(1.0),
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }),
        timestamp_writes: None,
        occlusion_query_set: None,
    })
}
