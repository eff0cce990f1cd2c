use std::any::Any;
use std::env;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use glam::Vec2;
use log::{info, warn};
use pollster::block_on;
use winit::application::ApplicationHandler;
use winit::event::{
    DeviceEvent, DeviceId, ElementState, MouseButton as WinitMouseButton, MouseScrollDelta,
    WindowEvent,
};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode as WinitKeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowId};

use desk_scene::app::{AppSummary, CliOptions, WindowConfig};
use desk_scene::time::FrameClock;
use desk_scene::{
    plan_frame, Camera, InputState, KeyCode, LookSource, MouseButton, MouseLook, Renderer, Scene,
    StartupError,
};

/// Pixel scroll deltas are converted to lines at this rate.
const PIXELS_PER_SCROLL_LINE: f64 = 40.0;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse(env::args().skip(1))?;
    let scene = options.load_scene()?;

    if options.summary_only {
        let summary = AppSummary::collect(&scene, &options.assets)
            .context("scene assets failed validation")?;
        println!("{summary}");
        return Ok(());
    }

    run_interactive(scene, options.assets, WindowConfig::default())
}

fn run_interactive(scene: Scene, assets: PathBuf, window: WindowConfig) -> Result<()> {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let event_loop = panic::catch_unwind(AssertUnwindSafe(EventLoop::new));
    panic::set_hook(default_hook);
    let event_loop = event_loop
        .map_err(|panic| StartupError::init("event loop", panic_message(panic.as_ref())))?
        .map_err(|err| StartupError::init("event loop", err))?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = DeskApp::new(scene, assets, window);
    event_loop
        .run_app(&mut app)
        .context("event loop terminated with an error")?;

    if let Some(err) = app.last_error {
        return Err(err);
    }
    Ok(())
}

struct DeskApp {
    scene: Scene,
    assets: PathBuf,
    window_config: WindowConfig,
    renderer: Option<Renderer>,
    camera: Camera,
    input: InputState,
    look: MouseLook,
    clock: FrameClock,
    last_error: Option<anyhow::Error>,
}

impl DeskApp {
    fn new(scene: Scene, assets: PathBuf, window_config: WindowConfig) -> Self {
        Self {
            scene,
            assets,
            window_config,
            renderer: None,
            camera: Camera::default(),
            input: InputState::new(),
            look: MouseLook::default(),
            clock: FrameClock::new(),
            last_error: None,
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attributes = Window::default_attributes()
            .with_title(self.window_config.title.clone())
            .with_inner_size(self.window_config.size);
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .map_err(|err| StartupError::init("window", err))?,
        );
        self.look.set_source(if capture_cursor(&window) {
            LookSource::Motion
        } else {
            LookSource::Cursor
        });

        let mut renderer = block_on(Renderer::new(Arc::clone(&window)))?;
        block_on(renderer.load_scene(&self.scene, &self.assets))?;
        self.renderer = Some(renderer);
        self.clock.reset();
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        self.last_error = Some(err);
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let dt = self.clock.tick();
        for movement in self.input.movements() {
            self.camera.process_keyboard(movement, dt);
        }
        if self.input.close_requested() {
            event_loop.exit();
            return Ok(());
        }

        let Some(renderer) = self.renderer.as_mut() else {
            return Ok(());
        };
        let plan = plan_frame(&self.scene, &self.camera, renderer.aspect());
        if let Err(err) = renderer.render(&plan) {
            match err {
                wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                    let size = renderer.window().inner_size();
                    renderer.resize(size);
                }
                wgpu::SurfaceError::OutOfMemory => {
                    return Err(anyhow!("GPU is out of memory"));
                }
                wgpu::SurfaceError::Timeout => {
                    info!("Surface timeout; retrying next frame");
                }
                other => {
                    warn!("Skipping frame: {other}");
                }
            }
        }
        Ok(())
    }

    fn handle_keyboard(&mut self, code: PhysicalKey, state: ElementState) {
        let Some(key) = map_keycode(code) else {
            return;
        };
        match state {
            ElementState::Pressed => self.input.set_key_down(key),
            ElementState::Released => self.input.set_key_up(key),
        }
    }

    fn handle_mouse_button(&self, state: ElementState, button: WinitMouseButton) {
        let button = match button {
            WinitMouseButton::Left => MouseButton::LEFT,
            WinitMouseButton::Right => MouseButton::RIGHT,
            WinitMouseButton::Middle => MouseButton::MIDDLE,
            WinitMouseButton::Back => MouseButton::new(3),
            WinitMouseButton::Forward => MouseButton::new(4),
            WinitMouseButton::Other(value) => MouseButton::new(value.min(u8::MAX as u16) as u8),
        };
        match (button.name(), state) {
            (Some(name), ElementState::Pressed) => info!("{name} mouse button pressed"),
            (Some(name), ElementState::Released) => info!("{name} mouse button released"),
            (None, _) => info!("Unhandled mouse button event"),
        }
    }

    fn shutdown(&mut self) {
        if let Some(mut renderer) = self.renderer.take() {
            renderer.shutdown();
        }
    }
}

impl ApplicationHandler for DeskApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.renderer.is_some() {
            return;
        }
        if let Err(err) = self.start(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        if window_id != renderer.window_id() {
            return;
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => renderer.resize(size),
            WindowEvent::ScaleFactorChanged { .. } => {
                let size = renderer.window().inner_size();
                renderer.resize(size);
            }
            WindowEvent::Focused(false) => self.look.reset(),
            WindowEvent::Focused(true) => self.clock.reset(),
            WindowEvent::KeyboardInput { event, .. } => {
                self.handle_keyboard(event.physical_key, event.state);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.handle_mouse_button(state, button);
            }
            WindowEvent::CursorMoved { position, .. } => {
                let position = Vec2::new(position.x as f32, position.y as f32);
                if let Some(delta) = self.look.on_cursor(position) {
                    self.camera.process_mouse_movement(delta.x, delta.y);
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(position) => {
                        (position.y / PIXELS_PER_SCROLL_LINE) as f32
                    }
                };
                self.camera.process_mouse_scroll(lines);
            }
            WindowEvent::RedrawRequested => {
                if let Err(err) = self.redraw(event_loop) {
                    self.fail(event_loop, err);
                }
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if self.renderer.is_none() {
            return;
        }
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            if let Some(delta) = self.look.on_motion(dx, dy) {
                self.camera.process_mouse_movement(delta.x, delta.y);
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(renderer) = self.renderer.as_ref() {
            renderer.window().request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown();
    }
}

/// Hides and grabs the cursor. Returns whether the grab took hold.
fn capture_cursor(window: &Window) -> bool {
    window.set_cursor_visible(false);
    match window
        .set_cursor_grab(CursorGrabMode::Locked)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined))
    {
        Ok(()) => true,
        Err(err) => {
            warn!("cursor grab unavailable, looking with cursor positions: {err}");
            false
        }
    }
}

fn map_keycode(code: PhysicalKey) -> Option<KeyCode> {
    let PhysicalKey::Code(code) = code else {
        return None;
    };
    Some(match code {
        WinitKeyCode::KeyW => KeyCode::W,
        WinitKeyCode::KeyA => KeyCode::A,
        WinitKeyCode::KeyS => KeyCode::S,
        WinitKeyCode::KeyD => KeyCode::D,
        WinitKeyCode::Escape => KeyCode::Escape,
        _ => return None,
    })
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic")
}
