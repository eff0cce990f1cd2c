use std::path::Path;
use std::sync::Arc;

use log::{debug, info};
use winit::dpi::PhysicalSize;
use winit::window::{Window, WindowId};

use super::depth::DepthBuffer;
use super::scene_pass::{begin_clear_pass, ScenePass};
use crate::error::StartupError;
use crate::frame::{aspect_ratio, FramePlan};
use crate::scene::Scene;

/// GPU renderer backed by wgpu that replays a [`FramePlan`] every frame.
pub struct Renderer {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    /// Non-sRGB format the pipelines write; shaded values reach the screen
    /// without an extra encode.
    render_format: wgpu::TextureFormat,
    depth: DepthBuffer,
    scene: Option<ScenePass>,
}

/// Picks the surface format and the linear format frames are rendered in.
///
/// A non-sRGB surface format is preferred. When the surface only offers sRGB
/// formats, frames are rendered through a view of its linear counterpart.
pub(crate) fn choose_formats(
    formats: &[wgpu::TextureFormat],
) -> Option<(wgpu::TextureFormat, wgpu::TextureFormat)> {
    let surface = formats
        .iter()
        .find(|format| !format.is_srgb())
        .or_else(|| formats.first())
        .copied()?;
    Some((surface, surface.remove_srgb_suffix()))
}

impl Renderer {
    /// Creates the surface, device and depth buffer for `window`.
    pub async fn new(window: Arc<Window>) -> Result<Self, StartupError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            flags: wgpu::InstanceFlags::default(),
            memory_budget_thresholds: Default::default(),
            backend_options: Default::default(),
        });
        let surface = instance
            .create_surface(Arc::clone(&window))
            .map_err(|err| StartupError::init("surface", err))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|err| StartupError::init("GPU adapter", err))?;
        let adapter_info = adapter.get_info();
        info!(
            "GPU adapter: {} ({:?}, driver {})",
            adapter_info.name, adapter_info.backend, adapter_info.driver_info
        );

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("desk-scene-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                experimental_features: Default::default(),
                memory_hints: Default::default(),
                trace: Default::default(),
            })
            .await
            .map_err(|err| StartupError::init("GPU device", err))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let (surface_format, render_format) = choose_formats(&surface_caps.formats)
            .ok_or_else(|| StartupError::init("surface", "adapter reports no surface formats"))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps
                .present_modes
                .iter()
                .copied()
                .find(|mode| {
                    matches!(
                        mode,
                        wgpu::PresentMode::Mailbox | wgpu::PresentMode::Immediate
                    )
                })
                .unwrap_or(wgpu::PresentMode::Fifo),
            desired_maximum_frame_latency: 2,
            alpha_mode,
            view_formats: if render_format == surface_format {
                vec![]
            } else {
                vec![render_format]
            },
        };
        surface.configure(&device, &config);
        debug!(
            "surface configured: {}x{} {:?} (rendering {:?}) {:?}",
            config.width, config.height, config.format, render_format, config.present_mode
        );

        let depth = DepthBuffer::create(&device, config.width, config.height);

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            render_format,
            depth,
            scene: None,
        })
    }

    /// Loads `scene` through [`ScenePass::load`], replacing any previously
    /// loaded scene.
    pub async fn load_scene(&mut self, scene: &Scene, asset_dir: &Path) -> Result<(), StartupError> {
        self.release_scene();
        let pass =
            ScenePass::load(&self.device, &self.queue, scene, asset_dir, self.render_format).await?;
        self.scene = Some(pass);
        Ok(())
    }

    /// Returns the identifier of the window owned by the renderer.
    pub fn window_id(&self) -> WindowId {
        self.window.id()
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Current surface width over height.
    pub fn aspect(&self) -> f32 {
        aspect_ratio(self.config.width, self.config.height)
    }

    /// Resizes the swap chain to match the new dimensions.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
        self.depth = DepthBuffer::create(&self.device, new_size.width, new_size.height);
    }

    /// Clears, draws every call of `plan` in order, then presents.
    pub fn render(&mut self, plan: &FramePlan) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor {
            format: Some(self.render_format),
            ..Default::default()
        });
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame-encoder"),
            });

        match self.scene.as_mut() {
            Some(scene) => scene.encode(&self.queue, &mut encoder, &view, self.depth.view(), plan),
            None => drop(begin_clear_pass(&mut encoder, &view, self.depth.view())),
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    /// Frees meshes, textures and programs. The surface stays usable.
    pub fn shutdown(&mut self) {
        if self.release_scene() {
            info!("released scene resources");
        }
    }

    fn release_scene(&mut self) -> bool {
        let Some(scene) = self.scene.take() else {
            return false;
        };
        scene.release();
        true
    }
}

#[cfg(test)]
mod tests {
    use wgpu::TextureFormat;

    use super::*;

    #[test]
    fn prefers_a_linear_surface_format() {
        let formats = [TextureFormat::Bgra8UnormSrgb, TextureFormat::Bgra8Unorm];
        assert_eq!(
            choose_formats(&formats),
            Some((TextureFormat::Bgra8Unorm, TextureFormat::Bgra8Unorm))
        );
    }

    #[test]
    fn srgb_only_surface_renders_through_linear_view() {
        let formats = [TextureFormat::Rgba8UnormSrgb];
        assert_eq!(
            choose_formats(&formats),
            Some((TextureFormat::Rgba8UnormSrgb, TextureFormat::Rgba8Unorm))
        );
    }

    #[test]
    fn no_formats_means_no_surface() {
        assert_eq!(choose_formats(&[]), None);
    }
}
