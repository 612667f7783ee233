use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use driftgrid_common::Viewport;
use driftgrid_input::{Action, DeltaMode, InputNormalizer, Platform, WheelNormalizer};
use driftgrid_kernel::Scene;
use driftgrid_layout::{GridSpec, LayoutManifest};
use driftgrid_render_wgpu::{OrthoCamera, PlaneRenderer, TextureLoader};
use driftgrid_tools::SceneInspector;
use egui::Context as EguiContext;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalPosition, LogicalSize, PhysicalSize};
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "driftgrid-desktop", about = "Infinite drifting image grid")]
#[command(group(ArgGroup::new("source").required(true).args(["layout", "images"])))]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Layout manifest (.yaml, .yml or .json)
    #[arg(long)]
    layout: Option<PathBuf>,

    /// Directory of images to lay out on a regular grid
    #[arg(long)]
    images: Option<PathBuf>,

    /// Grid columns when laying out a directory
    #[arg(long, default_value = "5")]
    columns: u32,

    /// Treat the host as Windows when scaling wheel deltas
    #[arg(long)]
    windows_wheel: bool,

    /// Apply the line-scaled multiplier to line wheel deltas
    #[arg(long)]
    line_scaled_wheel: bool,
}

impl Cli {
    fn load_layout(&self) -> Result<LayoutManifest> {
        if let Some(path) = &self.layout {
            return LayoutManifest::load(path)
                .with_context(|| format!("loading layout {}", path.display()));
        }
        let Some(dir) = &self.images else {
            anyhow::bail!("either --layout or --images is required");
        };
        let spec = GridSpec {
            columns: self.columns,
            ..GridSpec::default()
        };
        LayoutManifest::from_image_dir(dir, &spec)
            .with_context(|| format!("laying out images in {}", dir.display()))
    }

    fn platform(&self) -> Platform {
        let detected = Platform::detect();
        Platform {
            windows: detected.windows || self.windows_wheel,
            line_scaled_engine: self.line_scaled_wheel,
        }
    }
}

/// Application state.
struct AppState {
    scene: Scene,
    input: InputNormalizer,
    camera: OrthoCamera,
    loader: TextureLoader,
    viewport: Viewport,
    /// Frustum slider bounds, fixed at startup like the initial frustum.
    frustum_range: std::ops::RangeInclusive<f32>,
    cursor: LogicalPosition<f64>,
    show_panel: bool,
}

impl AppState {
    fn new(layout: &LayoutManifest, platform: Platform) -> Self {
        let viewport = Viewport::default();
        let scene = Scene::new(layout, viewport);
        let input = InputNormalizer::new(WheelNormalizer::new(platform), scene.tuning());
        tracing::info!("wheel platform: {:?}", input.wheel().platform());

        Self {
            scene,
            input,
            camera: OrthoCamera::new(viewport.width as f32, viewport.aspect() as f32),
            loader: TextureLoader::new(),
            viewport,
            frustum_range: OrthoCamera::frustum_range(viewport.width as f32),
            cursor: LogicalPosition::new(0.0, 0.0),
            show_panel: true,
        }
    }

    /// First real window size: the frustum starts as wide as the viewport.
    fn init_viewport(&mut self, viewport: Viewport) {
        self.camera.frustum_size = viewport.width as f32;
        self.frustum_range = OrthoCamera::frustum_range(viewport.width as f32);
        self.resize(viewport);
    }

    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.camera.aspect = viewport.aspect() as f32;
        self.scene.resize(viewport);
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::TogglePlayback => {
                let playing = self.scene.toggle_playing();
                tracing::info!("playback {}", if playing { "resumed" } else { "paused" });
            }
            a if a.is_motion() => {
                self.input.apply(&a);
            }
            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyCode, event_loop: &ActiveEventLoop) {
        match key {
            KeyCode::Space => self.apply(Action::TogglePlayback),
            KeyCode::F1 => self.show_panel = !self.show_panel,
            KeyCode::Escape => event_loop.exit(),
            _ => {}
        }
    }

    fn draw_ui(&mut self, ctx: &EguiContext, textures_loaded: usize) {
        if !self.show_panel {
            return;
        }

        let summary = SceneInspector::summary(&self.scene);

        egui::Window::new("Settings")
            .default_width(260.0)
            .show(ctx, |ui| {
                ui.add(
                    egui::Slider::new(&mut self.camera.frustum_size, self.frustum_range.clone())
                        .step_by(10.0)
                        .text("cameraFrustum"),
                );
                let mut playing = self.scene.is_playing();
                if ui.checkbox(&mut playing, "Playing (Space)").changed() {
                    self.scene.set_playing(playing);
                }
                ui.separator();
                ui.label(format!("Frame: {}", summary.frame));
                ui.label(format!(
                    "Offset: ({:.2}, {:.2})",
                    summary.current[0], summary.current[1]
                ));
                ui.label(format!(
                    "Target: ({:.2}, {:.2})",
                    summary.target[0], summary.target[1]
                ));
                ui.label(format!("Diff: {:.5}", summary.diff));
                ui.label(format!(
                    "Viewport: {:.0}x{:.0}",
                    self.viewport.width, self.viewport.height
                ));
                ui.label(format!(
                    "Planes: {}  Textures: {}  Failed: {}",
                    summary.plane_count,
                    textures_loaded,
                    self.loader.failed()
                ));
                ui.separator();
                ui.small("Drag or scroll to move | F1: Toggle panel | Esc: Quit");
            });
    }
}

/// Window and GPU resources, created on `resumed`.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: PlaneRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

struct GpuApp {
    state: AppState,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
}

impl GpuApp {
    fn new(state: AppState) -> Self {
        Self {
            state,
            gpu: None,
            egui_ctx: EguiContext::default(),
        }
    }

    fn init_gpu(&mut self, event_loop: &ActiveEventLoop) -> Result<Gpu> {
        let attrs = Window::default_attributes()
            .with_title("driftgrid")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
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
                label: Some("driftgrid_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .context("surface reports no formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        self.state.init_viewport(logical_viewport(&window, size));

        let renderer = PlaneRenderer::new(&device, &queue, surface_format, &self.state.scene);
        renderer.request_textures(&self.state.scene, &mut self.state.loader);

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        Ok(Gpu {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    fn redraw(&mut self) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };

        gpu.renderer
            .process_textures(&gpu.device, &gpu.queue, &mut self.state.loader);
        let frame = self.state.scene.tick(self.state.input.target());

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

        gpu.renderer.render(
            &gpu.device,
            &gpu.queue,
            &view,
            &self.state.camera,
            &self.state.scene,
            &frame,
        );

        let textures_loaded = gpu.renderer.textures_loaded();
        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            self.state.draw_ui(ctx, textures_loaded);
        });

        gpu.egui_winit
            .handle_platform_output(&gpu.window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            gpu.egui_renderer
                .update_texture(&gpu.device, &gpu.queue, *id, image_delta);
        }
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        gpu.egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            gpu.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        gpu.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            gpu.egui_renderer.free_texture(id);
        }

        output.present();
        gpu.window.request_redraw();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match self.init_gpu(event_loop) {
            Ok(gpu) => self.gpu = Some(gpu),
            Err(e) => {
                tracing::error!("failed to initialize window: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let egui_consumed = match &mut self.gpu {
            Some(gpu) => gpu.egui_winit.on_window_event(&gpu.window, &event).consumed,
            None => false,
        };

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.config.width = new_size.width.max(1);
                    gpu.config.height = new_size.height.max(1);
                    gpu.surface.configure(&gpu.device, &gpu.config);
                    self.state.resize(logical_viewport(&gpu.window, new_size));
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } if !egui_consumed => {
                self.state.handle_key(key, event_loop);
            }
            WindowEvent::CursorMoved { position, .. } => {
                let Some(gpu) = &self.gpu else {
                    return;
                };
                self.state.cursor = position.to_logical(gpu.window.scale_factor());
                let action = Action::PointerMove {
                    x: self.state.cursor.x,
                    y: self.state.cursor.y,
                };
                if let Some(action) = route_past_ui(action, egui_consumed) {
                    self.state.apply(action);
                }
            }
            WindowEvent::MouseInput { button, state, .. } => {
                let action = mouse_action(button, state, self.state.cursor);
                if let Some(action) = route_past_ui(action, egui_consumed) {
                    self.state.apply(action);
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scale = self
                    .gpu
                    .as_ref()
                    .map(|g| g.window.scale_factor())
                    .unwrap_or(1.0);
                if let Some(action) = route_past_ui(wheel_action(delta, scale), egui_consumed) {
                    self.state.apply(action);
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn logical_viewport(window: &Window, size: PhysicalSize<u32>) -> Viewport {
    let logical: LogicalSize<f64> = size.to_logical(window.scale_factor());
    Viewport::new(logical.width.max(1.0), logical.height.max(1.0))
}

/// Primary button press and release; other buttons do nothing.
fn mouse_action(button: MouseButton, state: ElementState, cursor: LogicalPosition<f64>) -> Action {
    match (button, state) {
        (MouseButton::Left, ElementState::Pressed) => Action::PointerDown {
            x: cursor.x,
            y: cursor.y,
        },
        (MouseButton::Left, ElementState::Released) => Action::PointerUp,
        _ => Action::Noop,
    }
}

/// Drop actions the debug panel consumed. A release always gets through so a
/// drag that ends over the panel does not stay latched.
fn route_past_ui(action: Action, ui_consumed: bool) -> Option<Action> {
    (!ui_consumed || action == Action::PointerUp).then_some(action)
}

/// winit reports content motion; flip to scroll direction, pixels to logical.
fn wheel_action(delta: MouseScrollDelta, scale_factor: f64) -> Action {
    match delta {
        MouseScrollDelta::LineDelta(x, y) => Action::Wheel {
            delta_x: -f64::from(x),
            delta_y: -f64::from(y),
            mode: DeltaMode::Line,
        },
        MouseScrollDelta::PixelDelta(pos) => Action::Wheel {
            delta_x: -pos.x / scale_factor,
            delta_y: -pos.y / scale_factor,
            mode: DeltaMode::Pixel,
        },
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("driftgrid-desktop starting");

    let layout = cli.load_layout()?;
    let state = AppState::new(&layout, cli.platform());

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(state);
    event_loop.run_app(&mut app)?;

    Ok(())
}
