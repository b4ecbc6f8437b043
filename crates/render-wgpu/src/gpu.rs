use std::num::NonZeroU64;

use bytemuck::{Pod, Zeroable};
use gallery_common::Vertex;
use gallery_render::{FrameParams, SubmitError, TextureSlot};
use tracing::{debug, info};
use wgpu::util::DeviceExt;

use crate::device::DeviceHealth;
use crate::frame::{FrameRecorder, MAX_PARAM_BLOCKS, RecordedFrame};
use crate::pipeline::PipelineSet;
use crate::shaders;
use crate::textures::{TextureImage, TextureSet};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct GpuVertex {
    pub position: [f32; 4],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl From<&Vertex> for GpuVertex {
    fn from(v: &Vertex) -> Self {
        Self {
            position: v.position.to_array(),
            normal: v.normal.to_array(),
            uv: v.uv.to_array(),
        }
    }
}

/// Uniform block matching `Params` in the scene shader. Matrices are stored
/// column-major, which is what WGSL expects.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ParamBlock {
    pub world: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub light_direction: [f32; 4],
    pub light_color: [f32; 4],
    pub tint: [f32; 4],
    pub time: f32,
    _pad: [f32; 3],
}

pub const PARAM_BLOCK_SIZE: u64 = std::mem::size_of::<ParamBlock>() as u64;

impl From<&FrameParams> for ParamBlock {
    fn from(p: &FrameParams) -> Self {
        Self {
            world: p.world.to_cols_array_2d(),
            view: p.view.to_cols_array_2d(),
            projection: p.projection.to_cols_array_2d(),
            light_direction: p.light_direction.to_array(),
            light_color: p.light_color.to_array(),
            tint: p.tint.to_array(),
            time: p.time,
            _pad: [0.0; 3],
        }
    }
}

/// Pipelines, the parameter ring, textures and the depth target.
pub struct WgpuRenderer {
    pipelines: PipelineSet,
    params_buffer: wgpu::Buffer,
    params_bind_group: wgpu::BindGroup,
    texture_bind_groups: Vec<wgpu::BindGroup>,
    depth_texture: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
    health: DeviceHealth,
    carried_block: Option<ParamBlock>,
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        textures: &TextureSet,
    ) -> Self {
        let health = DeviceHealth::watch(device);

        let params_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("params_buffer"),
            size: PARAM_BLOCK_SIZE * MAX_PARAM_BLOCKS as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let params_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("params_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(PARAM_BLOCK_SIZE),
                },
                count: None,
            }],
        });

        let params_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("params_bind_group"),
            layout: &params_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &params_buffer,
                    offset: 0,
                    size: NonZeroU64::new(PARAM_BLOCK_SIZE),
                }),
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("texture_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("linear_repeat"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let texture_bind_groups = TextureSlot::ALL
            .iter()
            .map(|slot| {
                let view = upload_texture(device, queue, slot.name(), textures.get(*slot));
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(slot.name()),
                    layout: &texture_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::TextureView(&view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::Sampler(&sampler),
                        },
                    ],
                })
            })
            .collect();

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pipeline_layout"),
            bind_group_layouts: &[&params_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SCENE_SHADER.into()),
        });

        let pipelines = PipelineSet::build(device, &pipeline_layout, &module, surface_format);
        info!(pipelines = pipelines.keys().len(), ?surface_format, "wgpu renderer ready");

        Self {
            pipelines,
            params_buffer,
            params_bind_group,
            texture_bind_groups,
            depth_texture: Self::create_depth_texture(device, width, height),
            surface_format,
            health,
            carried_block: None,
        }
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    pub fn health(&self) -> &DeviceHealth {
        &self.health
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    pub fn begin_frame(&self) -> FrameRecorder<'_, std::sync::Arc<wgpu::Buffer>> {
        FrameRecorder::new(self.pipelines.keys(), &self.health, self.carried_block)
    }

    /// Clears `target` and depth, then replays the recorded draws.
    pub fn submit(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        frame: RecordedFrame<std::sync::Arc<wgpu::Buffer>>,
        target: &wgpu::TextureView,
        clear: wgpu::Color,
    ) -> Result<(), SubmitError> {
        self.health.check()?;
        if !frame.blocks.is_empty() {
            queue.write_buffer(&self.params_buffer, 0, bytemuck::cast_slice(&frame.blocks));
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("scene_encoder"),
        });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            for draw in &frame.draws {
                let Some(pipeline) = self.pipelines.get(draw.pipeline) else {
                    continue;
                };
                pass.set_pipeline(pipeline);
                pass.set_bind_group(
                    0,
                    &self.params_bind_group,
                    &[(u64::from(draw.block) * PARAM_BLOCK_SIZE) as u32],
                );
                pass.set_bind_group(1, &self.texture_bind_groups[draw.texture.index()], &[]);
                pass.set_vertex_buffer(0, draw.vertices.slice(..));
                pass.set_index_buffer(draw.indices.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..draw.index_count, 0, 0..1);
            }
        }
        queue.submit(std::iter::once(encoder.finish()));
        debug!(draws = frame.draws.len(), blocks = frame.blocks.len(), "frame submitted");

        self.carried_block = frame.blocks.last().copied();
        self.health.check()
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

fn upload_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    image: &TextureImage,
) -> wgpu::TextureView {
    let texture = device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: image.width,
                height: image.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        &image.rgba,
    );
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
