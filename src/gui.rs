use egui::Context;
use egui_wgpu::Renderer;
use egui_winit::State;
use particle_physics::Phase;
use particle_renderer::ScreenLabel;
use particle_simulation::{SimulationParams, Statistics};
use wgpu::{Device, TextureFormat};
use winit::{event::WindowEvent, window::Window};

/// Request raised by the UI or keyboard, applied before the next tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UiAction {
    SetPhase(Phase),
    Reset,
    ClearMarks,
    TogglePause,
    StepOnce,
    ResetCamera,
}

pub struct UiState {
    pub fps: f32,
    pub frame_time: f32,
    pub phase: Phase,
    pub description: &'static str,
    pub is_paused: bool,
    pub particle_count: usize,
    pub mark_count: usize,
    pub statistics: Statistics,
    pub pattern_opacity: f32,
    pub labels: Vec<ScreenLabel>,
    pub params: SimulationParams,
    /// Multiplier on particle radius for visibility
    pub particle_scale: f32,
    pub actions: Vec<UiAction>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            fps: 0.0,
            frame_time: 0.0,
            phase: Phase::default(),
            description: Phase::default().description(),
            is_paused: false,
            particle_count: 0,
            mark_count: 0,
            statistics: Statistics::default(),
            pattern_opacity: 0.0,
            labels: Vec::new(),
            params: SimulationParams::default(),
            particle_scale: 2.0,
            actions: Vec::new(),
        }
    }
}

pub struct Gui {
    context: Context,
    state: State,
    renderer: Renderer,
}

impl Gui {
    pub fn new(device: &Device, output_color_format: TextureFormat, window: &Window) -> Self {
        let context = Context::default();
        let id = context.viewport_id();

        let state = State::new(
            context.clone(),
            id,
            window,
            Some(window.scale_factor() as f32),
            None,
            Some(device.limits().max_texture_dimension_2d as usize),
        );

        let renderer = Renderer::new(
            device,
            output_color_format,
            egui_wgpu::RendererOptions::default(),
        );

        Self {
            context,
            state,
            renderer,
        }
    }

    pub fn handle_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        let response = self.state.on_window_event(window, event);
        response.consumed
    }

    pub fn render(
        &mut self,
        device: &Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        window: &Window,
        view: &wgpu::TextureView,
        ui_state: &mut UiState,
    ) {
        let raw_input = self.state.take_egui_input(window);

        let full_output = self.context.run(raw_input, |ctx| {
            Self::ui(ctx, ui_state);
        });

        self.state
            .handle_platform_output(window, full_output.platform_output);

        let clipped_primitives = self
            .context
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let size = window.inner_size();
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [size.width, size.height],
            pixels_per_point: window.scale_factor() as f32,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.renderer
                .update_texture(device, queue, *id, image_delta);
        }

        self.renderer.update_buffers(
            device,
            queue,
            encoder,
            &clipped_primitives,
            &screen_descriptor,
        );

        let mut render_pass = encoder
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Egui Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            })
            .forget_lifetime();

        self.renderer
            .render(&mut render_pass, &clipped_primitives, &screen_descriptor);
        drop(render_pass);

        for id in &full_output.textures_delta.free {
            self.renderer.free_texture(id);
        }
    }

    fn ui(ctx: &Context, state: &mut UiState) {
        Self::scene_labels(ctx, state);

        // Experiment Panel (Top Left)
        egui::Window::new("Experiment")
            .anchor(egui::Align2::LEFT_TOP, [10.0, 10.0])
            .resizable(false)
            .collapsible(true)
            .default_width(320.0)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    for (index, phase) in Phase::ALL.into_iter().enumerate() {
                        let text = format!("{} {}", index + 1, phase.label());
                        if ui.selectable_label(state.phase == phase, text).clicked() {
                            state.actions.push(UiAction::SetPhase(phase));
                        }
                    }
                });
                ui.separator();
                ui.label(state.description);
                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("Reset (R)").clicked() {
                        state.actions.push(UiAction::Reset);
                    }
                    if ui.button("Clear Marks (X)").clicked() {
                        state.actions.push(UiAction::ClearMarks);
                    }
                    let pause_text = if state.is_paused {
                        "Resume (Space)"
                    } else {
                        "Pause (Space)"
                    };
                    if ui.button(pause_text).clicked() {
                        state.actions.push(UiAction::TogglePause);
                    }
                    if state.is_paused && ui.button("Step (N)").clicked() {
                        state.actions.push(UiAction::StepOnce);
                    }
                });
            });

        // Statistics Panel (Top Right)
        egui::Window::new("Statistics")
            .anchor(egui::Align2::RIGHT_TOP, [-10.0, 10.0])
            .resizable(false)
            .collapsible(true)
            .show(ctx, |ui| {
                ui.label(format!("FPS: {:.1}", state.fps));
                ui.label(format!("Frame Time: {:.2} ms", state.frame_time));
                ui.separator();
                ui.heading("Particles");
                ui.label(format!("In scene: {}", state.particle_count));
                ui.label(format!("Marks: {}", state.mark_count));
                ui.separator();
                ui.heading("Slits");
                ui.label(format!("Left: {}", state.statistics.transmitted[0]));
                ui.label(format!("Right: {}", state.statistics.transmitted[1]));
                ui.label(format!("Absorbed: {}", state.statistics.absorbed));
                ui.separator();
                ui.heading("Screen");
                ui.label(format!("Detections: {}", state.statistics.detections));
                if state.pattern_opacity > 0.0 {
                    ui.label(format!("Pattern: {:.0}%", state.pattern_opacity * 100.0));
                }
            });

        // Controls (Bottom Left)
        egui::Window::new("Controls")
            .anchor(egui::Align2::LEFT_BOTTOM, [10.0, -10.0])
            .resizable(false)
            .collapsible(true)
            .default_open(false)
            .show(ctx, |ui| {
                let params = &mut state.params;

                ui.heading("Protons");
                population_sliders(ui, &mut params.protons);
                ui.separator();
                ui.heading("Electrons");
                population_sliders(ui, &mut params.electrons);

                ui.separator();
                ui.heading("Emission");
                ui.add(
                    egui::Slider::new(&mut params.lateral_speed, 0.0..=0.5).text("Lateral Spread"),
                );
                ui.add(
                    egui::Slider::new(&mut params.forward_speed.0, 0.1..=1.5).text("Min Speed"),
                );
                ui.add(
                    egui::Slider::new(&mut params.forward_speed.1, 0.1..=1.5).text("Max Speed"),
                );
                if params.forward_speed.1 < params.forward_speed.0 {
                    params.forward_speed.1 = params.forward_speed.0;
                }

                ui.separator();
                ui.heading("Screen");
                let mut expire = params.mark_lifetime.is_some();
                ui.checkbox(&mut expire, "Marks expire");
                if expire {
                    let lifetime = params.mark_lifetime.get_or_insert(10.0);
                    ui.add(egui::Slider::new(lifetime, 1.0..=60.0).text("Mark Lifetime (s)"));
                } else {
                    params.mark_lifetime = None;
                }
                ui.add(
                    egui::Slider::new(&mut params.pattern_fade_duration, 0.0..=30.0)
                        .text("Pattern Fade (s)"),
                );

                ui.separator();
                ui.heading("Rendering");
                ui.add(
                    egui::Slider::new(&mut state.particle_scale, 0.5..=6.0).text("Particle Scale"),
                );
            });
    }

    /// Labels anchored in the 3D scene, behind every window
    fn scene_labels(ctx: &Context, state: &UiState) {
        let painter = ctx.layer_painter(egui::LayerId::new(
            egui::Order::Background,
            egui::Id::new("scene_labels"),
        ));
        let pixels_per_point = ctx.pixels_per_point();
        for label in &state.labels {
            let pos = egui::pos2(
                label.position.x / pixels_per_point,
                label.position.y / pixels_per_point,
            );
            painter.text(
                pos,
                egui::Align2::CENTER_BOTTOM,
                label.text,
                egui::FontId::proportional(16.0),
                egui::Color32::WHITE,
            );
        }
    }
}

fn population_sliders(ui: &mut egui::Ui, population: &mut particle_simulation::Population) {
    ui.add(egui::Slider::new(&mut population.initial_batch, 0..=200).text("Initial Batch"));
    ui.add(egui::Slider::new(&mut population.target, 0..=400).text("Target"));
    ui.add(egui::Slider::new(&mut population.max_per_frame, 0..=20).text("Max Per Frame"));
}
