//! In-memory backend that records every call instead of talking to a GPU.
//!
//! Used by tests and by the CLI's dry-run frame command. Both the device and
//! the context accept injected failures.

use std::collections::HashMap;

use gallery_common::Vertex;

use crate::device::{
    DepthPolicy, InputLayout, RenderContext, RenderDevice, ShaderSet, TextureSlot, VERTEX_STRIDE,
};
use crate::error::{DeviceError, SubmitError};
use crate::frame::FrameParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub u32);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub id: BufferId,
    pub label: String,
    pub bytes: usize,
}

#[derive(Debug, Default)]
pub struct RecordingDevice {
    uploads: Vec<Upload>,
    fail_label: Option<String>,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every later upload whose label contains `pattern` fails as out of
    /// memory.
    pub fn fail_uploads_matching(&mut self, pattern: impl Into<String>) {
        self.fail_label = Some(pattern.into());
    }

    pub fn uploads(&self) -> &[Upload] {
        &self.uploads
    }

    pub fn total_bytes(&self) -> usize {
        self.uploads.iter().map(|u| u.bytes).sum()
    }

    fn create(&mut self, label: &str, bytes: usize) -> Result<BufferId, DeviceError> {
        if bytes == 0 {
            return Err(DeviceError::EmptyBuffer(label.to_string()));
        }
        if self.fail_label.as_deref().is_some_and(|p| label.contains(p)) {
            return Err(DeviceError::OutOfMemory(label.to_string()));
        }
        let id = BufferId(self.uploads.len() as u32);
        self.uploads.push(Upload {
            id,
            label: label.to_string(),
            bytes,
        });
        Ok(id)
    }
}

impl RenderDevice for RecordingDevice {
    type Buffer = BufferId;

    fn create_vertex_buffer(&mut self, label: &str, vertices: &[Vertex]) -> Result<BufferId, DeviceError> {
        self.create(label, vertices.len() * VERTEX_STRIDE)
    }

    fn create_index_buffer(&mut self, label: &str, indices: &[u32]) -> Result<BufferId, DeviceError> {
        self.create(label, std::mem::size_of_val(indices))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    InputLayout(InputLayout),
    Mesh { vertices: BufferId, indices: BufferId },
    Shaders(ShaderSet),
    Texture(TextureSlot),
    Depth(DepthPolicy),
    ClearGeometryStage,
    UpdateParams(FrameParams),
    Draw(u32),
}

/// Pipeline state captured at a successful draw.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawRecord {
    pub mesh: Option<(BufferId, BufferId)>,
    pub shaders: Option<ShaderSet>,
    pub texture: Option<TextureSlot>,
    pub depth: DepthPolicy,
    pub layout: InputLayout,
    pub params: Option<FrameParams>,
    pub index_count: u32,
}

#[derive(Debug, Default)]
pub struct RecordingContext {
    commands: Vec<Command>,
    draws: Vec<DrawRecord>,
    state: DrawRecord,
    draw_attempts: usize,
    update_attempts: usize,
    draw_failures: HashMap<usize, SubmitError>,
    update_failures: HashMap<usize, SubmitError>,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// The `n`th draw call (counting from zero, across frames) fails.
    pub fn fail_draw(&mut self, n: usize, error: SubmitError) {
        self.draw_failures.insert(n, error);
    }

    /// The `n`th parameter push (counting from zero, across frames) fails.
    pub fn fail_update(&mut self, n: usize, error: SubmitError) {
        self.update_failures.insert(n, error);
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn draws(&self) -> &[DrawRecord] {
        &self.draws
    }

    pub fn param_updates(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, Command::UpdateParams(_)))
            .count()
    }

    /// Forget recorded commands and draws; bound state and pending failures
    /// are kept.
    pub fn clear(&mut self) {
        self.commands.clear();
        self.draws.clear();
    }
}

impl RenderContext for RecordingContext {
    type Buffer = BufferId;

    fn set_input_layout(&mut self, layout: InputLayout) {
        self.state.layout = layout;
        self.commands.push(Command::InputLayout(layout));
    }

    fn set_mesh(&mut self, vertices: &BufferId, indices: &BufferId) {
        self.state.mesh = Some((*vertices, *indices));
        self.commands.push(Command::Mesh {
            vertices: *vertices,
            indices: *indices,
        });
    }

    fn set_shaders(&mut self, shaders: ShaderSet) {
        self.state.shaders = Some(shaders);
        self.commands.push(Command::Shaders(shaders));
    }

    fn bind_texture(&mut self, slot: TextureSlot) {
        self.state.texture = Some(slot);
        self.commands.push(Command::Texture(slot));
    }

    fn set_depth_policy(&mut self, policy: DepthPolicy) {
        self.state.depth = policy;
        self.commands.push(Command::Depth(policy));
    }

    fn clear_geometry_stage(&mut self) {
        self.commands.push(Command::ClearGeometryStage);
    }

    fn update_params(&mut self, params: &FrameParams) -> Result<(), SubmitError> {
        let attempt = self.update_attempts;
        self.update_attempts += 1;
        if let Some(err) = self.update_failures.remove(&attempt) {
            return Err(err);
        }
        self.state.params = Some(*params);
        self.commands.push(Command::UpdateParams(*params));
        Ok(())
    }

    fn draw_indexed(&mut self, index_count: u32) -> Result<(), SubmitError> {
        let attempt = self.draw_attempts;
        self.draw_attempts += 1;
        if let Some(err) = self.draw_failures.remove(&attempt) {
            return Err(err);
        }
        self.commands.push(Command::Draw(index_count));
        self.draws.push(DrawRecord {
            index_count,
            ..self.state.clone()
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec3};

    #[test]
    fn empty_buffers_are_rejected() {
        let mut device = RecordingDevice::new();
        let err = device.create_index_buffer("empty", &[]).unwrap_err();
        assert!(matches!(err, DeviceError::EmptyBuffer(label) if label == "empty"));
    }

    #[test]
    fn uploads_record_sizes() {
        let mut device = RecordingDevice::new();
        let v = Vertex::new(Vec3::ZERO, Vec3::Y, Vec2::ZERO);
        device.create_vertex_buffer("v", &[v, v]).unwrap();
        device.create_index_buffer("i", &[0, 1, 1]).unwrap();
        assert_eq!(device.uploads()[0].bytes, 72);
        assert_eq!(device.uploads()[1].bytes, 12);
        assert_eq!(device.total_bytes(), 84);
    }

    #[test]
    fn draw_captures_bound_state() {
        let mut ctx = RecordingContext::new();
        ctx.set_depth_policy(DepthPolicy::Always);
        ctx.bind_texture(TextureSlot::Crosshair);
        ctx.draw_indexed(6).unwrap();
        let draw = &ctx.draws()[0];
        assert_eq!(draw.depth, DepthPolicy::Always);
        assert_eq!(draw.texture, Some(TextureSlot::Crosshair));
        assert_eq!(draw.index_count, 6);
    }

    #[test]
    fn injected_failure_fires_once() {
        let mut ctx = RecordingContext::new();
        ctx.fail_draw(1, SubmitError::Rejected("busy".into()));
        assert!(ctx.draw_indexed(3).is_ok());
        assert_eq!(ctx.draw_indexed(3), Err(SubmitError::Rejected("busy".into())));
        assert!(ctx.draw_indexed(3).is_ok());
        assert_eq!(ctx.draws().len(), 2);
    }
}
