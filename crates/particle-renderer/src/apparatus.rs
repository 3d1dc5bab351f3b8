//! Static apparatus mesh: generator, slit panel, screen and the per-phase extras

use crate::palette::ScenePalette;
use crate::renderer::DEPTH_FORMAT;
use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};
use particle_physics::{ExperimentGeometry, LateralRect, LIGHT_CONE_RADIUS, OBSERVER_POSITION};
use std::f32::consts::{PI, TAU};
use std::ops::Range;
use wgpu::util::DeviceExt;

/// Screen sits slightly behind its depth so marks at the depth stay visible
const SCREEN_INSET: f32 = 0.02;
const OBSERVER_RADIUS: f32 = 0.8;
const CONE_SEGMENTS: usize = 16;
/// Half-width the diffraction fans reach at the screen
const TRAPEZOID_SPREAD: f32 = 6.0;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ApparatusVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
}

impl ApparatusVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x4];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Named pieces of the apparatus, each a contiguous vertex range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Part {
    Generator,
    Screen,
    Observer,
    Panel,
    LightCone,
    Trapezoids,
}

impl Part {
    pub const ALL: [Part; 6] = [
        Part::Generator,
        Part::Screen,
        Part::Observer,
        Part::Panel,
        Part::LightCone,
        Part::Trapezoids,
    ];

    /// Drawn after particles without writing depth
    pub fn is_translucent(self) -> bool {
        matches!(self, Part::Panel | Part::LightCone | Part::Trapezoids)
    }
}

/// Which optional parts are drawn this frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PartVisibility {
    pub light_cone: bool,
    pub trapezoids: bool,
    pub observer: bool,
}

impl PartVisibility {
    pub fn shows(&self, part: Part) -> bool {
        match part {
            Part::Generator | Part::Screen | Part::Panel => true,
            Part::Observer => self.observer,
            Part::LightCone => self.light_cone,
            Part::Trapezoids => self.trapezoids,
        }
    }
}

/// CPU-side triangle list with a vertex range per part
#[derive(Debug, Clone, Default)]
pub struct ApparatusMesh {
    pub vertices: Vec<ApparatusVertex>,
    ranges: Vec<(Part, Range<u32>)>,
}

impl ApparatusMesh {
    pub fn build(geometry: &ExperimentGeometry, palette: &ScenePalette) -> Self {
        let mut mesh = Self::default();

        mesh.part(Part::Generator, |m| {
            m.cuboid(Vec3::ZERO, Vec3::splat(0.5), palette.generator);
        });

        mesh.part(Part::Screen, |m| {
            let depth = geometry.screen.depth + SCREEN_INSET;
            m.rect_at_depth(&geometry.screen.bounds, depth, palette.screen);
        });

        mesh.part(Part::Observer, |m| {
            m.sphere(Vec3::from(OBSERVER_POSITION), OBSERVER_RADIUS, palette.observer);
        });

        mesh.part(Part::Panel, |m| {
            for piece in geometry.panel.pieces() {
                m.rect_at_depth(&piece, geometry.panel.depth, palette.panel);
            }
        });

        mesh.part(Part::LightCone, |m| {
            // Apex at the generator, base on the panel
            m.open_cone(Vec3::ZERO, geometry.panel.depth, LIGHT_CONE_RADIUS, palette.light_cone);
        });

        mesh.part(Part::Trapezoids, |m| {
            let screen_depth = geometry.screen.depth - SCREEN_INSET;
            for slit in &geometry.panel.apertures {
                let centre = slit.center().x;
                m.quad(
                    [
                        Vec3::new(slit.min.x, 0.0, geometry.panel.depth),
                        Vec3::new(slit.max.x, 0.0, geometry.panel.depth),
                        Vec3::new(centre + TRAPEZOID_SPREAD, 0.0, screen_depth),
                        Vec3::new(centre - TRAPEZOID_SPREAD, 0.0, screen_depth),
                    ],
                    Vec3::Y,
                    palette.trapezoid,
                );
            }
        });

        mesh
    }

    pub fn range(&self, part: Part) -> Range<u32> {
        self.ranges
            .iter()
            .find(|(p, _)| *p == part)
            .map(|(_, range)| range.clone())
            .unwrap_or(0..0)
    }

    fn part(&mut self, part: Part, build: impl FnOnce(&mut Self)) {
        let start = self.vertices.len() as u32;
        build(self);
        let end = self.vertices.len() as u32;
        self.ranges.push((part, start..end));
    }

    fn triangle(&mut self, corners: [Vec3; 3], normal: Vec3, color: [f32; 4]) {
        for corner in corners {
            self.vertices.push(ApparatusVertex {
                position: corner.to_array(),
                normal: normal.to_array(),
                color,
            });
        }
    }

    /// Quad from four corners in winding order
    fn quad(&mut self, [a, b, c, d]: [Vec3; 4], normal: Vec3, color: [f32; 4]) {
        self.triangle([a, b, c], normal, color);
        self.triangle([a, c, d], normal, color);
    }

    /// Flat rectangle facing the generator at a given depth
    fn rect_at_depth(&mut self, rect: &LateralRect, depth: f32, color: [f32; 4]) {
        let corner = |p: Vec2| p.extend(depth);
        self.quad(
            [
                corner(rect.min),
                corner(Vec2::new(rect.max.x, rect.min.y)),
                corner(rect.max),
                corner(Vec2::new(rect.min.x, rect.max.y)),
            ],
            Vec3::NEG_Z,
            color,
        );
    }

    fn cuboid(&mut self, centre: Vec3, half: Vec3, color: [f32; 4]) {
        for axis in [Vec3::X, Vec3::Y, Vec3::Z] {
            for sign in [1.0, -1.0] {
                let normal = axis * sign;
                // Two axes spanning the face
                let u = normal.any_orthonormal_vector();
                let v = normal.cross(u);
                let face = centre + normal * half;
                let (u, v) = (u * half, v * half);
                self.quad([face - u - v, face + u - v, face + u + v, face - u + v], normal, color);
            }
        }
    }

    fn sphere(&mut self, centre: Vec3, radius: f32, color: [f32; 4]) {
        const RINGS: usize = 8;
        const SEGMENTS: usize = 12;
        let point = |ring: usize, segment: usize| {
            let theta = PI * ring as f32 / RINGS as f32;
            let phi = TAU * segment as f32 / SEGMENTS as f32;
            Vec3::new(theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin())
        };
        for ring in 0..RINGS {
            for segment in 0..SEGMENTS {
                let corners = [
                    point(ring, segment),
                    point(ring, segment + 1),
                    point(ring + 1, segment + 1),
                    point(ring + 1, segment),
                ];
                let normal = (corners[0] + corners[2]).normalize_or_zero();
                self.quad(corners.map(|c| centre + c * radius), normal, color);
            }
        }
    }

    /// Cone opening along +z from `apex` to a base circle at `base_depth`
    fn open_cone(&mut self, apex: Vec3, base_depth: f32, radius: f32, color: [f32; 4]) {
        let rim = |i: usize| {
            let angle = TAU * i as f32 / CONE_SEGMENTS as f32;
            Vec3::new(angle.cos() * radius, angle.sin() * radius, base_depth)
        };
        for i in 0..CONE_SEGMENTS {
            let (a, b) = (rim(i), rim(i + 1));
            let normal = (a + b).with_z(0.0).normalize_or_zero();
            self.triangle([apex, a, b], normal, color);
        }
    }
}

/// Draws the apparatus mesh in an opaque and a translucent pass
pub struct ApparatusRenderer {
    opaque_pipeline: wgpu::RenderPipeline,
    translucent_pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    mesh: ApparatusMesh,
}

impl ApparatusRenderer {
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        camera_buffer: &wgpu::Buffer,
        mesh: ApparatusMesh,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Apparatus Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/apparatus.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Apparatus Bind Group Layout"),
            entries: &[
                // Camera (Uniform) - Binding 0
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Apparatus Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Apparatus Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = |label: &str, depth_write_enabled: bool| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[ApparatusVertex::layout()],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None, // Panels are seen from both sides
                    unclipped_depth: false,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    conservative: false,
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };

        let opaque_pipeline = pipeline("Apparatus Opaque Pipeline", true);
        let translucent_pipeline = pipeline("Apparatus Translucent Pipeline", false);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Apparatus Vertex Buffer"),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        log::debug!("Apparatus mesh: {} vertices", mesh.vertices.len());

        Self {
            opaque_pipeline,
            translucent_pipeline,
            vertex_buffer,
            bind_group,
            mesh,
        }
    }

    pub fn draw_opaque(&self, render_pass: &mut wgpu::RenderPass<'_>, visibility: &PartVisibility) {
        self.draw_parts(render_pass, &self.opaque_pipeline, visibility, false);
    }

    pub fn draw_translucent(
        &self,
        render_pass: &mut wgpu::RenderPass<'_>,
        visibility: &PartVisibility,
    ) {
        self.draw_parts(render_pass, &self.translucent_pipeline, visibility, true);
    }

    fn draw_parts(
        &self,
        render_pass: &mut wgpu::RenderPass<'_>,
        pipeline: &wgpu::RenderPipeline,
        visibility: &PartVisibility,
        translucent: bool,
    ) {
        render_pass.set_pipeline(pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));

        for part in Part::ALL {
            if part.is_translucent() != translucent || !visibility.shows(part) {
                continue;
            }
            let range = self.mesh.range(part);
            if !range.is_empty() {
                render_pass.draw(range, 0..1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mesh() -> ApparatusMesh {
        ApparatusMesh::build(&ExperimentGeometry::default(), &ScenePalette::default())
    }

    #[test]
    fn every_part_is_whole_triangles() {
        let mesh = mesh();
        let mut covered = 0;
        for part in Part::ALL {
            let range = mesh.range(part);
            assert!(!range.is_empty(), "{:?} has no vertices", part);
            assert_eq!(range.len() % 3, 0);
            covered += range.len();
        }
        assert_eq!(covered, mesh.vertices.len());
    }

    #[test]
    fn ranges_do_not_overlap() {
        let mesh = mesh();
        let mut ranges: Vec<_> = Part::ALL.iter().map(|p| mesh.range(*p)).collect();
        ranges.sort_by_key(|r| r.start);
        for pair in ranges.windows(2) {
            assert!(pair[0].end <= pair[1].start);
        }
    }

    #[test]
    fn panel_leaves_slits_open() {
        let geometry = ExperimentGeometry::default();
        let mesh = mesh();
        let panel = mesh.range(Part::Panel);
        // Five quads
        assert_eq!(panel.len(), 30);

        for tri in mesh.vertices[panel.start as usize..panel.end as usize].chunks(3) {
            assert!(tri.iter().all(|v| v.position[2] == geometry.panel.depth));
            let centroid = tri
                .iter()
                .fold(Vec2::ZERO, |acc, v| acc + Vec2::new(v.position[0], v.position[1]))
                / 3.0;
            assert!(!geometry.panel.transmits(centroid));
        }
    }

    #[test]
    fn screen_sits_behind_marks() {
        let geometry = ExperimentGeometry::default();
        let mesh = mesh();
        let screen = mesh.range(Part::Screen);
        for v in &mesh.vertices[screen.start as usize..screen.end as usize] {
            assert!(v.position[2] > geometry.screen.depth);
        }
    }

    #[test]
    fn visibility_follows_phase_flags() {
        let hidden = PartVisibility::default();
        assert!(hidden.shows(Part::Panel));
        assert!(!hidden.shows(Part::LightCone));
        assert!(!hidden.shows(Part::Observer));

        let wave = PartVisibility {
            light_cone: true,
            trapezoids: true,
            observer: false,
        };
        assert!(wave.shows(Part::Trapezoids));
        assert!(Part::LightCone.is_translucent());
        assert!(!Part::Screen.is_translucent());
    }
}
