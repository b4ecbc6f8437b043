use gallery_render::{
    DepthPolicy, InputLayout, PropAnimator, ShaderSet, VERTEX_STRIDE, scene_passes,
};

/// Everything that selects a distinct render pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineKey {
    pub shaders: ShaderSet,
    pub depth: DepthPolicy,
    pub layout: InputLayout,
}

/// Unique pipeline keys used by the scene's passes, in first-use order.
pub fn scene_pipeline_keys() -> Vec<PipelineKey> {
    let mut keys = Vec::new();
    for pass in scene_passes(&PropAnimator::new()) {
        let key = PipelineKey {
            shaders: pass.shaders,
            depth: pass.depth,
            layout: pass.layout,
        };
        if !keys.contains(&key) {
            keys.push(key);
        }
    }
    keys
}

fn depth_compare(policy: DepthPolicy) -> wgpu::CompareFunction {
    match policy {
        DepthPolicy::Less => wgpu::CompareFunction::Less,
        DepthPolicy::FarPlane => wgpu::CompareFunction::LessEqual,
        DepthPolicy::Always => wgpu::CompareFunction::Always,
    }
}

pub(crate) struct PipelineSet {
    keys: Vec<PipelineKey>,
    pipelines: Vec<wgpu::RenderPipeline>,
}

impl PipelineSet {
    pub(crate) fn build(
        device: &wgpu::Device,
        layout: &wgpu::PipelineLayout,
        module: &wgpu::ShaderModule,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let keys = scene_pipeline_keys();
        let pipelines = keys
            .iter()
            .map(|key| build_pipeline(device, layout, module, surface_format, key))
            .collect();
        Self { keys, pipelines }
    }

    pub(crate) fn keys(&self) -> &[PipelineKey] {
        &self.keys
    }

    pub(crate) fn get(&self, index: usize) -> Option<&wgpu::RenderPipeline> {
        self.pipelines.get(index)
    }
}

fn build_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    module: &wgpu::ShaderModule,
    surface_format: wgpu::TextureFormat,
    key: &PipelineKey,
) -> wgpu::RenderPipeline {
    let label = format!(
        "{}+{}/{:?}/{:?}",
        key.shaders.vertex.entry_point(),
        key.shaders.pixel.entry_point(),
        key.depth,
        key.layout
    );
    // Both input layouts read the same vertex format.
    let attributes = &wgpu::vertex_attr_array![
        0 => Float32x4,
        1 => Float32x3,
        2 => Float32x2,
    ];
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(&label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module,
            entry_point: Some(key.shaders.vertex.entry_point()),
            compilation_options: Default::default(),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: VERTEX_STRIDE as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes,
            }],
        },
        fragment: Some(wgpu::FragmentState {
            module,
            entry_point: Some(key.shaders.pixel.entry_point()),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face: wgpu::FrontFace::Cw,
            cull_mode: Some(wgpu::Face::Back),
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: wgpu::TextureFormat::Depth32Float,
            depth_write_enabled: true,
            depth_compare: depth_compare(key.depth),
            stencil: Default::default(),
            bias: Default::default(),
        }),
        multisample: Default::default(),
        multiview: None,
        cache: None,
    })
}
