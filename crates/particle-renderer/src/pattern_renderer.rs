//! Interference overlay drawn just in front of the detection screen

use crate::renderer::DEPTH_FORMAT;
use bytemuck::{Pod, Zeroable};
use particle_physics::DetectionScreen;

/// Distance the overlay floats in front of the screen
const OVERLAY_OFFSET: f32 = 0.01;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct OverlayUniform {
    pub min: [f32; 2],
    pub max: [f32; 2],
    pub depth: f32,
    pub opacity: f32,
    pub _padding: [f32; 2],
}

impl OverlayUniform {
    pub fn covering(screen: &DetectionScreen, opacity: f32) -> Self {
        Self {
            min: screen.bounds.min.to_array(),
            max: screen.bounds.max.to_array(),
            depth: screen.depth - OVERLAY_OFFSET,
            opacity: opacity.clamp(0.0, 1.0),
            _padding: [0.0; 2],
        }
    }
}

pub struct PatternRenderer {
    pipeline: wgpu::RenderPipeline,
    texture: wgpu::Texture,
    size: wgpu::Extent3d,
    overlay_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    uniform: OverlayUniform,
}

impl PatternRenderer {
    /// Upload an RGBA8 pattern image and build the overlay pipeline
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        format: wgpu::TextureFormat,
        camera_buffer: &wgpu::Buffer,
        screen: &DetectionScreen,
        (width, height, pixels): (u32, u32, &[u8]),
    ) -> Self {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Interference Pattern Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        write_image(queue, &texture, size, pixels);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Interference Pattern Sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let uniform = OverlayUniform::covering(screen, 0.0);
        let overlay_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Overlay Buffer"),
            size: std::mem::size_of::<OverlayUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        queue.write_buffer(&overlay_buffer, 0, bytemuck::cast_slice(&[uniform]));

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Pattern Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/pattern.wgsl").into()),
        });

        let uniform_entry = |binding: u32, visibility: wgpu::ShaderStages| wgpu::BindGroupLayoutEntry {
            binding,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Pattern Bind Group Layout"),
            entries: &[
                // Camera (Uniform) - Binding 0
                uniform_entry(0, wgpu::ShaderStages::VERTEX),
                // Overlay (Uniform) - Binding 1
                uniform_entry(1, wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT),
                // Pattern texture - Binding 2
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                // Sampler - Binding 3
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Pattern Bind Group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: overlay_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Pattern Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Pattern Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
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
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false, // Overlay never hides marks behind it
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        log::info!("✓ Interference pattern uploaded ({}x{})", width, height);

        Self {
            pipeline,
            texture,
            size,
            overlay_buffer,
            bind_group,
            uniform,
        }
    }

    /// Replace the overlay image. Images of a different size are rejected.
    pub fn set_image(
        &mut self,
        queue: &wgpu::Queue,
        (width, height, pixels): (u32, u32, &[u8]),
    ) -> bool {
        if width != self.size.width || height != self.size.height {
            log::warn!(
                "Pattern image {}x{} does not match overlay texture {}x{}",
                width,
                height,
                self.size.width,
                self.size.height
            );
            return false;
        }
        write_image(queue, &self.texture, self.size, pixels);
        true
    }

    /// Write the overlay opacity if it changed
    pub fn set_opacity(&mut self, queue: &wgpu::Queue, opacity: f32) {
        let opacity = opacity.clamp(0.0, 1.0);
        if self.uniform.opacity == opacity {
            return;
        }
        self.uniform.opacity = opacity;
        queue.write_buffer(&self.overlay_buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }

    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        if self.uniform.opacity <= 0.0 {
            return;
        }
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.draw(0..6, 0..1);
    }
}

fn write_image(
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    size: wgpu::Extent3d,
    pixels: &[u8],
) {
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        pixels,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * size.width),
            rows_per_image: Some(size.height),
        },
        size,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_floats_in_front_of_screen() {
        let screen = DetectionScreen::default();
        let uniform = OverlayUniform::covering(&screen, 2.0);
        assert!(uniform.depth < screen.depth);
        assert_eq!(uniform.opacity, 1.0);
        assert_eq!(uniform.min, [-10.0, -7.5]);
        assert_eq!(uniform.max, [10.0, 7.5]);
        assert_eq!(std::mem::size_of::<OverlayUniform>() % 16, 0);
    }
}
