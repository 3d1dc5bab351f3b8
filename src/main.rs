//! Double-Slit Experiment Visualizer
//!
//! Protons, a light wave and electrons travel from a generator through two
//! slits onto a detection screen, with an optional which-path observer.

mod gui;

use gui::{Gui, UiAction, UiState};
use particle_physics::Phase;
use particle_renderer::{
    project_labels, scene_labels, ApparatusMesh, ApparatusRenderer, Camera, ParticleRenderer,
    PartVisibility, PatternRenderer, RenderError, RenderResult, ResponsiveLayout, ScenePalette,
};
use particle_simulation::{Experiment, PatternKind, SimulationParams};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

/// Longest frame fed to the fade timer, so a stalled window does not skip the animation
const MAX_FRAME_DT: f32 = 0.1;

struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,

    experiment: Experiment,
    renderer: ParticleRenderer,
    apparatus_renderer: ApparatusRenderer,
    pattern_renderer: PatternRenderer,
    /// Image currently held by the overlay texture
    overlay_kind: PatternKind,
    palette: ScenePalette,
    camera: Camera,

    gui: Gui,
    ui_state: UiState,

    frame_times: VecDeque<f32>,
    last_frame_time: Instant,
}

impl GpuState {
    async fn new(window: Arc<Window>) -> RenderResult<Self> {
        let size = window.inner_size();
        let (width, height) = (size.width.max(1), size.height.max(1));

        // Create wgpu instance
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        // Request adapter
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        log::info!("✓ Using GPU: {}", adapter.get_info().name);

        // Create device and queue
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        // Configure surface
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(RenderError::NoSurfaceFormat)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            // Motion is integrated per frame, so frames are paced by the display
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let experiment = Experiment::new(SimulationParams::default());
        log::info!(
            "✓ Experiment initialized ({} {} particles)",
            experiment.particle_count(),
            experiment.phase().label()
        );

        let renderer = ParticleRenderer::new(&device, &config);
        log::info!("✓ Renderer initialized");

        let palette = ScenePalette::default();
        let mesh = ApparatusMesh::build(experiment.geometry(), &palette);
        let apparatus_renderer =
            ApparatusRenderer::new(&device, config.format, &renderer.camera_buffer, mesh);
        log::info!("✓ Apparatus Renderer initialized");

        let overlay_kind = PatternKind::Interference;
        let pattern = experiment.pattern(overlay_kind);
        let pattern_renderer = PatternRenderer::new(
            &device,
            &queue,
            config.format,
            &renderer.camera_buffer,
            &experiment.geometry().screen,
            (pattern.width, pattern.height, &pattern.pixels),
        );

        let mut camera = Camera::new(width, height);
        camera.apply_layout(&ResponsiveLayout::for_window(width, height));

        let gui = Gui::new(&device, config.format, &window);
        let ui_state = UiState {
            params: experiment.params,
            ..Default::default()
        };

        Ok(Self {
            surface,
            device,
            queue,
            config,
            experiment,
            renderer,
            apparatus_renderer,
            pattern_renderer,
            overlay_kind,
            palette,
            camera,
            gui,
            ui_state,
            frame_times: VecDeque::with_capacity(100),
            last_frame_time: Instant::now(),
        })
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.renderer.resize(&self.device, &self.config);
            self.camera.resize(new_size.width, new_size.height);
            self.camera
                .apply_layout(&ResponsiveLayout::for_window(new_size.width, new_size.height));
        }
    }

    fn apply_actions(&mut self) {
        for action in std::mem::take(&mut self.ui_state.actions) {
            match action {
                UiAction::SetPhase(phase) => self.experiment.set_phase(phase),
                UiAction::Reset => self.experiment.reset(),
                UiAction::ClearMarks => {
                    self.experiment.clear_marks();
                }
                UiAction::TogglePause => self.experiment.toggle_pause(),
                UiAction::StepOnce => self.experiment.step_once(),
                UiAction::ResetCamera => {
                    self.camera.reset();
                    self.camera.apply_layout(&ResponsiveLayout::for_window(
                        self.config.width,
                        self.config.height,
                    ));
                }
            }
        }
    }

    fn render(&mut self, window: &Window) -> Result<(f32, f32), wgpu::SurfaceError> {
        // Track frame time
        let now = Instant::now();
        let frame_time = (now - self.last_frame_time).as_secs_f32() * 1000.0;
        self.last_frame_time = now;

        self.frame_times.push_back(frame_time);
        if self.frame_times.len() > 100 {
            self.frame_times.pop_front();
        }
        let avg_frame_time = self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32;
        let fps = 1000.0 / avg_frame_time;

        // Simulation
        self.experiment.params = self.ui_state.params;
        self.apply_actions();
        self.experiment
            .tick((frame_time * 0.001).clamp(0.0, MAX_FRAME_DT));

        let visuals = self.experiment.visuals();
        let visibility = PartVisibility {
            light_cone: visuals.light_cone,
            trapezoids: visuals.trapezoids,
            observer: visuals.observer,
        };

        // Upload
        self.renderer
            .update_camera(&self.queue, &self.camera, self.ui_state.particle_scale);
        self.renderer.upload(
            &self.device,
            &self.queue,
            self.experiment.scene().instances(),
        );
        if let Some(kind) = visuals.pattern.filter(|kind| *kind != self.overlay_kind) {
            let pattern = self.experiment.pattern(kind);
            if self
                .pattern_renderer
                .set_image(&self.queue, (pattern.width, pattern.height, &pattern.pixels))
            {
                log::debug!("Overlay switched to {:?}", kind);
                self.overlay_kind = kind;
            }
        }
        self.pattern_renderer
            .set_opacity(&self.queue, visuals.pattern_opacity);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        {
            let mut encoder = self
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Scene Encoder"),
                });

            {
                let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Scene Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(self.palette.clear_color()),
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                        view: &self.renderer.depth_texture,
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Clear(1.0),
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }),
                    timestamp_writes: None,
                    occlusion_query_set: None,
                });

                // Opaque first, translucent panels last so particles show through them
                self.apparatus_renderer
                    .draw_opaque(&mut render_pass, &visibility);
                self.renderer.draw(&mut render_pass);
                self.pattern_renderer.draw(&mut render_pass);
                self.apparatus_renderer
                    .draw_translucent(&mut render_pass, &visibility);
            }

            self.queue.submit(std::iter::once(encoder.finish()));
        }

        // UI snapshot
        let stats = self.experiment.statistics();
        self.ui_state.fps = fps;
        self.ui_state.frame_time = avg_frame_time;
        self.ui_state.phase = self.experiment.phase();
        self.ui_state.description = self.experiment.description();
        self.ui_state.is_paused = self.experiment.is_paused();
        self.ui_state.particle_count = self.experiment.particle_count();
        self.ui_state.mark_count = self.experiment.mark_count();
        self.ui_state.statistics = stats;
        self.ui_state.pattern_opacity = visuals.pattern_opacity;
        let labels = scene_labels(self.experiment.generator_label(), visuals.observer);
        self.ui_state.labels = project_labels(
            &labels,
            &self.camera,
            self.config.width as f32,
            self.config.height as f32,
        );

        // Render GUI
        {
            let mut encoder = self
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("GUI Encoder"),
                });

            self.gui.render(
                &self.device,
                &self.queue,
                &mut encoder,
                window,
                &view,
                &mut self.ui_state,
            );

            self.queue.submit(std::iter::once(encoder.finish()));
        }

        output.present();
        Ok((fps, avg_frame_time))
    }
}

struct App {
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    mouse_pressed: bool,
    last_mouse_pos: Option<(f64, f64)>,
}

impl App {
    fn key_action(key_code: KeyCode) -> Option<UiAction> {
        let action = match key_code {
            KeyCode::Digit1 => UiAction::SetPhase(Phase::Proton),
            KeyCode::Digit2 => UiAction::SetPhase(Phase::LightWave),
            KeyCode::Digit3 => UiAction::SetPhase(Phase::Electron),
            KeyCode::Digit4 => UiAction::SetPhase(Phase::Observer),
            KeyCode::KeyR => UiAction::Reset,
            KeyCode::KeyX => UiAction::ClearMarks,
            KeyCode::Space => UiAction::TogglePause,
            KeyCode::KeyN => UiAction::StepOnce,
            KeyCode::KeyC => UiAction::ResetCamera,
            _ => return None,
        };
        Some(action)
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attributes = Window::default_attributes()
            .with_title("Double-Slit Experiment")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 800));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        match pollster::block_on(GpuState::new(window.clone())) {
            Ok(gpu_state) => {
                self.window = Some(window);
                self.gpu_state = Some(gpu_state);
            }
            Err(e) => {
                log::error!("GPU initialization failed: {}", e);
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
        // Handle GUI events
        if let (Some(gpu_state), Some(window)) = (&mut self.gpu_state, &self.window) {
            if gpu_state.gui.handle_event(window, &event) {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => event_loop.exit(),

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key_code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                if let (Some(gpu_state), Some(action)) =
                    (&mut self.gpu_state, Self::key_action(key_code))
                {
                    gpu_state.ui_state.actions.push(action);
                }
            }

            WindowEvent::Resized(physical_size) => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.resize(physical_size);
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                if button == MouseButton::Left || button == MouseButton::Right {
                    self.mouse_pressed = state == ElementState::Pressed;
                    if !self.mouse_pressed {
                        self.last_mouse_pos = None;
                    }
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                if self.mouse_pressed {
                    if let Some(last_pos) = self.last_mouse_pos {
                        let delta_x = (position.x - last_pos.0) as f32;
                        let delta_y = (position.y - last_pos.1) as f32;

                        if let Some(gpu_state) = &mut self.gpu_state {
                            gpu_state.camera.rotate(-delta_x * 0.005, delta_y * 0.005);
                        }
                    }
                    self.last_mouse_pos = Some((position.x, position.y));
                }
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_x, y) => y * 10.0,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.1,
                };

                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state
                        .camera
                        .zoom(-scroll * gpu_state.camera.distance / 100.0);
                }
            }

            WindowEvent::RedrawRequested => {
                if let (Some(window), Some(gpu_state)) = (&self.window, &mut self.gpu_state) {
                    match gpu_state.render(window) {
                        Ok((fps, frame_time)) => {
                            window.set_title(&format!(
                                "Double-Slit Experiment - {} - {:.0} FPS ({:.2}ms) - {} particles",
                                gpu_state.experiment.phase().label(),
                                fps,
                                frame_time,
                                gpu_state.experiment.particle_count()
                            ));
                        }
                        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                            gpu_state.resize(window.inner_size())
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            log::error!("Surface out of memory");
                            event_loop.exit()
                        }
                        Err(e) => log::warn!("Render error: {:?}", e),
                    }
                }
            }

            _ => {}
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<(), winit::error::EventLoopError> {
    // Initialize logger (RUST_LOG=debug for verbose output)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting double-slit experiment...");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App {
        window: None,
        gpu_state: None,
        mouse_pressed: false,
        last_mouse_pos: None,
    };

    event_loop.run_app(&mut app)
}
