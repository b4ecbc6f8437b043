mod config;

use anyhow::{Context, Result};
use clap::Parser;
use gallery_assets::load_obj;
use gallery_common::SimpleMesh;
use gallery_input::{CameraController, InputSnapshot, Movement};
use gallery_render::SceneRenderer;
use gallery_render_wgpu::{GpuDevice, TextureSet, WgpuRenderer};
use glam::IVec2;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "gallery-desktop", about = "Fly around two loaded models")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Mesh held in front of the camera
    #[arg(long)]
    main_mesh: Option<PathBuf>,

    /// Mesh drawn for the animated props
    #[arg(long)]
    prop_mesh: Option<PathBuf>,

    /// Texture directory
    #[arg(long)]
    texture_dir: Option<PathBuf>,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,
}

impl Cli {
    fn settings(&self) -> Result<AppConfig> {
        let mut cfg = match &self.config {
            Some(path) => AppConfig::load(path)?,
            None => AppConfig::default(),
        };
        if let Some(path) = &self.main_mesh {
            cfg.assets.main_mesh = path.clone();
        }
        if let Some(path) = &self.prop_mesh {
            cfg.assets.prop_mesh = path.clone();
        }
        if let Some(dir) = &self.texture_dir {
            cfg.assets.texture_dir = Some(dir.clone());
        }
        if let Some(width) = self.width {
            cfg.window.width = width;
        }
        if let Some(height) = self.height {
            cfg.window.height = height;
        }
        Ok(cfg)
    }
}

fn movement_for(key: KeyCode) -> Option<Movement> {
    match key {
        KeyCode::KeyW => Some(Movement::Forward),
        KeyCode::KeyS => Some(Movement::Backward),
        KeyCode::KeyA => Some(Movement::Left),
        KeyCode::KeyD => Some(Movement::Right),
        _ => None,
    }
}

fn window_center(width: u32, height: u32) -> IVec2 {
    IVec2::new((width / 2) as i32, (height / 2) as i32)
}

/// Loaded meshes. A main mesh that fails to load leaves the scene inert
/// rather than aborting.
struct Meshes {
    main: Option<SimpleMesh>,
    prop: SimpleMesh,
}

impl Meshes {
    fn load(cfg: &AppConfig) -> Result<Self> {
        let main = match load_obj(&cfg.assets.main_mesh) {
            Ok(mesh) => Some(mesh),
            Err(e) => {
                tracing::error!(error = %e, "main mesh unavailable; scene will not draw");
                None
            }
        };
        let prop = load_obj(&cfg.assets.prop_mesh)
            .with_context(|| format!("loading prop mesh {}", cfg.assets.prop_mesh.display()))?;
        Ok(Self { main, prop })
    }
}

struct Gpu {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    backend: WgpuRenderer,
    scene: SceneRenderer<Arc<wgpu::Buffer>>,
}

struct GalleryApp {
    settings: AppConfig,
    meshes: Meshes,
    textures: TextureSet,
    camera: CameraController,
    input: InputSnapshot,
    last_frame: Instant,
    window: Option<Arc<Window>>,
    gpu: Option<Gpu>,
    failure: Option<anyhow::Error>,
}

impl GalleryApp {
    fn new(settings: AppConfig, meshes: Meshes, textures: TextureSet) -> Self {
        let camera = CameraController::new(settings.camera);
        Self {
            settings,
            meshes,
            textures,
            camera,
            input: InputSnapshot::default(),
            last_frame: Instant::now(),
            window: None,
            gpu: None,
            failure: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        tracing::error!("{error:#}");
        self.failure = Some(error);
        event_loop.exit();
    }

    fn init_gpu(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.settings.window.title.clone())
            .with_inner_size(PhysicalSize::new(
                self.settings.window.width,
                self.settings.window.height,
            ));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window.clone())?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no compatible GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("gallery_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let size = window.inner_size();
        let caps = surface.get_capabilities(&adapter);
        let surface_format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first())
            .copied()
            .context("surface reports no formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let backend = WgpuRenderer::new(
            &device,
            &queue,
            surface_format,
            config.width,
            config.height,
            &self.textures,
        );
        let scene = SceneRenderer::new(
            &mut GpuDevice::new(&device),
            self.meshes.main.as_ref(),
            &self.meshes.prop,
            self.settings.scene,
            config.width,
            config.height,
        )?;

        self.input.window_center = window_center(config.width, config.height);
        self.input.cursor = self.input.window_center;
        tracing::info!(
            backend = adapter.get_info().backend.to_str(),
            "GPU initialized"
        );

        self.window = Some(window);
        self.gpu = Some(Gpu {
            surface,
            device,
            queue,
            config,
            backend,
            scene,
        });
        Ok(())
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };
        gpu.config.width = size.width.max(1);
        gpu.config.height = size.height.max(1);
        gpu.surface.configure(&gpu.device, &gpu.config);
        gpu.backend
            .resize(&gpu.device, gpu.config.width, gpu.config.height);
        gpu.scene.resize(gpu.config.width, gpu.config.height);
        self.input.window_center = window_center(gpu.config.width, gpu.config.height);
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        let dt = now.saturating_duration_since(self.last_frame);
        self.last_frame = now;

        let update = self.camera.update(&self.input, dt);
        if let Some(center) = update.recenter {
            if let Some(window) = &self.window {
                if let Err(e) = window.set_cursor_position(PhysicalPosition::new(center.x, center.y)) {
                    tracing::debug!(error = %e, "cursor warp unsupported");
                }
            }
            self.input.cursor = center;
        }

        let Some(gpu) = &mut self.gpu else {
            return;
        };
        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut recorder = gpu.backend.begin_frame();
        let rendered = gpu.scene.render_frame(&mut recorder, self.camera.view(), now);
        let frame = recorder.finish();
        if let Err(e) = rendered {
            self.fail(event_loop, e.into());
            return;
        }

        let clear = self.settings.clear_color();
        if let Err(e) = gpu
            .backend
            .submit(&gpu.device, &gpu.queue, frame, &view, clear)
        {
            if e.is_fatal() {
                self.fail(event_loop, e.into());
                return;
            }
            tracing::warn!(error = %e, "frame dropped");
        }
        output.present();
    }
}

impl ApplicationHandler for GalleryApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init_gpu(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                self.resize(new_size);
            }
            WindowEvent::Focused(focused) => {
                self.input.focused = focused;
                if !focused {
                    self.input.moves = Default::default();
                    self.input.look_held = false;
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                let pressed = key_state == ElementState::Pressed;
                if let Some(movement) = movement_for(key) {
                    self.input.moves.set(movement, pressed);
                } else if key == KeyCode::Escape && pressed {
                    event_loop.exit();
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.input.cursor = IVec2::new(position.x as i32, position.y as i32);
            }
            WindowEvent::MouseInput {
                button: MouseButton::Right,
                state: btn_state,
                ..
            } => {
                self.input.look_held = btn_state == ElementState::Pressed;
                if let Some(window) = &self.window {
                    window.set_cursor_visible(!self.input.look_held);
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    tracing::info!("gallery-desktop starting");

    let settings = cli.settings()?;
    let meshes = Meshes::load(&settings)?;
    let textures = TextureSet::load_dir(settings.assets.texture_dir.as_deref());

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GalleryApp::new(settings, meshes, textures);
    event_loop.run_app(&mut app)?;

    match app.failure.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
