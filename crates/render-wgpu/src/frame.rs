use gallery_render::{
    DepthPolicy, FrameParams, InputLayout, RenderContext, ShaderSet, SubmitError, TextureSlot,
};
use tracing::trace;

use crate::device::DeviceHealth;
use crate::gpu::ParamBlock;
use crate::pipeline::PipelineKey;

/// Parameter blocks one frame may push.
pub const MAX_PARAM_BLOCKS: usize = 64;

pub(crate) struct DrawCall<B> {
    pub pipeline: usize,
    pub vertices: B,
    pub indices: B,
    pub texture: TextureSlot,
    pub block: u32,
    pub index_count: u32,
}

/// Draws and parameter blocks collected for one frame.
pub struct RecordedFrame<B> {
    pub(crate) blocks: Vec<ParamBlock>,
    pub(crate) draws: Vec<DrawCall<B>>,
}

impl<B> RecordedFrame<B> {
    pub fn draw_count(&self) -> usize {
        self.draws.len()
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }
}

/// Immediate-style command sink that resolves bound state into draw calls.
///
/// State persists between draws the way a device context's does. The block
/// last pushed in the previous frame is carried in as block zero.
pub struct FrameRecorder<'a, B> {
    keys: &'a [PipelineKey],
    health: &'a DeviceHealth,
    layout: InputLayout,
    depth: DepthPolicy,
    shaders: Option<ShaderSet>,
    mesh: Option<(B, B)>,
    texture: TextureSlot,
    blocks: Vec<ParamBlock>,
    draws: Vec<DrawCall<B>>,
}

impl<'a, B: Clone> FrameRecorder<'a, B> {
    pub(crate) fn new(
        keys: &'a [PipelineKey],
        health: &'a DeviceHealth,
        carried: Option<ParamBlock>,
    ) -> Self {
        Self {
            keys,
            health,
            layout: InputLayout::Standard,
            depth: DepthPolicy::Less,
            shaders: None,
            mesh: None,
            texture: TextureSlot::Ground,
            blocks: carried.into_iter().collect(),
            draws: Vec::new(),
        }
    }

    pub fn finish(self) -> RecordedFrame<B> {
        RecordedFrame {
            blocks: self.blocks,
            draws: self.draws,
        }
    }
}

impl<B: Clone> RenderContext for FrameRecorder<'_, B> {
    type Buffer = B;

    fn set_input_layout(&mut self, layout: InputLayout) {
        self.layout = layout;
    }

    fn set_mesh(&mut self, vertices: &B, indices: &B) {
        self.mesh = Some((vertices.clone(), indices.clone()));
    }

    fn set_shaders(&mut self, shaders: ShaderSet) {
        self.shaders = Some(shaders);
    }

    fn bind_texture(&mut self, slot: TextureSlot) {
        self.texture = slot;
    }

    fn set_depth_policy(&mut self, policy: DepthPolicy) {
        self.depth = policy;
    }

    fn clear_geometry_stage(&mut self) {
        trace!("no geometry stage to clear");
    }

    fn update_params(&mut self, params: &FrameParams) -> Result<(), SubmitError> {
        self.health.check()?;
        if self.blocks.len() >= MAX_PARAM_BLOCKS {
            return Err(SubmitError::Rejected(format!(
                "more than {MAX_PARAM_BLOCKS} parameter blocks in one frame"
            )));
        }
        self.blocks.push(ParamBlock::from(params));
        Ok(())
    }

    fn draw_indexed(&mut self, index_count: u32) -> Result<(), SubmitError> {
        self.health.check()?;
        let (vertices, indices) = self
            .mesh
            .clone()
            .ok_or_else(|| SubmitError::Rejected("no mesh bound".into()))?;
        let shaders = self
            .shaders
            .ok_or_else(|| SubmitError::Rejected("no shaders bound".into()))?;
        let key = PipelineKey {
            shaders,
            depth: self.depth,
            layout: self.layout,
        };
        let pipeline = self
            .keys
            .iter()
            .position(|k| *k == key)
            .ok_or_else(|| SubmitError::Rejected(format!("no pipeline for {key:?}")))?;
        let block = self
            .blocks
            .len()
            .checked_sub(1)
            .ok_or_else(|| SubmitError::Rejected("no parameters pushed".into()))?;
        self.draws.push(DrawCall {
            pipeline,
            vertices,
            indices,
            texture: self.texture,
            block: block as u32,
            index_count,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::scene_pipeline_keys;
    use gallery_render::{
        PixelStage, SceneConfig, SceneRenderer, VertexStage,
        geometry::{plane_mesh, skybox_mesh},
        recording::RecordingDevice,
    };
    use glam::Mat4;
    use std::time::Instant;

    fn lit() -> ShaderSet {
        ShaderSet::new(VertexStage::Standard, PixelStage::SolidTexture)
    }

    #[test]
    fn draw_needs_mesh_and_params() {
        let keys = scene_pipeline_keys();
        let health = DeviceHealth::default();
        let mut rec: FrameRecorder<'_, u32> = FrameRecorder::new(&keys, &health, None);
        rec.set_shaders(lit());
        assert!(matches!(rec.draw_indexed(6), Err(SubmitError::Rejected(_))));
        rec.set_mesh(&1, &2);
        assert!(matches!(rec.draw_indexed(6), Err(SubmitError::Rejected(_))));
        rec.update_params(&FrameParams::default()).unwrap();
        rec.draw_indexed(6).unwrap();
        let frame = rec.finish();
        assert_eq!(frame.draw_count(), 1);
        assert_eq!(frame.draws[0].block, 0);
    }

    #[test]
    fn carried_block_serves_first_draw() {
        let keys = scene_pipeline_keys();
        let health = DeviceHealth::default();
        let carried = ParamBlock::from(&FrameParams::default());
        let mut rec: FrameRecorder<'_, u32> = FrameRecorder::new(&keys, &health, Some(carried));
        rec.set_shaders(lit());
        rec.set_mesh(&1, &2);
        rec.draw_indexed(6).unwrap();
        assert_eq!(rec.finish().block_count(), 1);
    }

    #[test]
    fn unknown_pipeline_is_rejected() {
        let keys = scene_pipeline_keys();
        let health = DeviceHealth::default();
        let mut rec: FrameRecorder<'_, u32> = FrameRecorder::new(&keys, &health, None);
        rec.set_shaders(ShaderSet::new(VertexStage::Skybox, PixelStage::Specular));
        rec.set_mesh(&1, &2);
        rec.update_params(&FrameParams::default()).unwrap();
        assert!(matches!(rec.draw_indexed(6), Err(SubmitError::Rejected(_))));
    }

    #[test]
    fn lost_device_is_fatal() {
        let keys = scene_pipeline_keys();
        let health = DeviceHealth::default();
        health.mark_lost("gone");
        let mut rec: FrameRecorder<'_, u32> = FrameRecorder::new(&keys, &health, None);
        let err = rec.update_params(&FrameParams::default()).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn block_limit_rejects_excess_pushes() {
        let keys = scene_pipeline_keys();
        let health = DeviceHealth::default();
        let mut rec: FrameRecorder<'_, u32> = FrameRecorder::new(&keys, &health, None);
        for _ in 0..MAX_PARAM_BLOCKS {
            rec.update_params(&FrameParams::default()).unwrap();
        }
        let err = rec.update_params(&FrameParams::default()).unwrap_err();
        assert!(!err.is_fatal());
    }

    #[test]
    fn full_scene_resolves_every_draw() {
        let mut device = RecordingDevice::new();
        let mut scene = SceneRenderer::new(
            &mut device,
            Some(&skybox_mesh()),
            &plane_mesh(),
            SceneConfig::default(),
            800,
            600,
        )
        .unwrap();
        let keys = scene_pipeline_keys();
        let health = DeviceHealth::default();
        let mut rec = FrameRecorder::new(&keys, &health, None);
        let report = scene
            .render_frame(&mut rec, Mat4::IDENTITY, Instant::now())
            .unwrap();
        assert_eq!(report.skipped, 0);
        let frame = rec.finish();
        assert_eq!(frame.draw_count(), 7);
        assert!(frame.block_count() <= MAX_PARAM_BLOCKS);
        let pipelines: Vec<usize> = frame.draws.iter().map(|d| d.pipeline).collect();
        assert_eq!(pipelines, [0, 1, 1, 1, 2, 3, 4]);
        assert_eq!(frame.draws[4].texture, TextureSlot::Skybox);
        assert_eq!(frame.draws[1].texture, TextureSlot::Ground);
    }
}
