//! Seams between the scene renderer and a graphics backend.

use gallery_common::Vertex;

use crate::error::{DeviceError, SubmitError};
use crate::frame::FrameParams;

/// Bytes per vertex on the device: position (4), normal (3), uv (2) floats.
pub const VERTEX_STRIDE: usize = 9 * std::mem::size_of::<f32>();

/// Vertex programs available to passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexStage {
    Standard,
    /// Standard transform plus a time-driven displacement.
    Wave,
    /// Pins depth to the far plane.
    Skybox,
}

impl VertexStage {
    pub fn entry_point(self) -> &'static str {
        match self {
            VertexStage::Standard => "vs_main",
            VertexStage::Wave => "vs_wave",
            VertexStage::Skybox => "vs_skybox",
        }
    }
}

/// Pixel programs available to passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelStage {
    /// Diffuse lighting over the bound texture.
    Lit,
    Specular,
    SolidTexture,
    Skybox,
    Crosshair,
}

impl PixelStage {
    pub fn entry_point(self) -> &'static str {
        match self {
            PixelStage::Lit => "fs_lit",
            PixelStage::Specular => "fs_specular",
            PixelStage::SolidTexture => "fs_solid_texture",
            PixelStage::Skybox => "fs_skybox",
            PixelStage::Crosshair => "fs_crosshair",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderSet {
    pub vertex: VertexStage,
    pub pixel: PixelStage,
}

impl ShaderSet {
    pub const fn new(vertex: VertexStage, pixel: PixelStage) -> Self {
        Self { vertex, pixel }
    }
}

/// Depth test applied to subsequent draws. Depth writes stay enabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DepthPolicy {
    /// Nearer fragments win.
    #[default]
    Less,
    /// Passes wherever nothing nearer than the far plane was drawn. Used with
    /// [`VertexStage::Skybox`], which clamps depth to the far plane.
    FarPlane,
    /// Always passes; draws on top of everything before it.
    Always,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum InputLayout {
    #[default]
    Standard,
    Skybox,
}

/// Texture table entries, in binding order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    Ground,
    MainMesh,
    Skybox,
    Crosshair,
}

impl TextureSlot {
    pub const ALL: [TextureSlot; 4] = [
        TextureSlot::Ground,
        TextureSlot::MainMesh,
        TextureSlot::Skybox,
        TextureSlot::Crosshair,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            TextureSlot::Ground => "ground",
            TextureSlot::MainMesh => "mesh",
            TextureSlot::Skybox => "sky",
            TextureSlot::Crosshair => "crosshair",
        }
    }
}

/// Creates immutable device buffers.
pub trait RenderDevice {
    type Buffer;

    fn create_vertex_buffer(
        &mut self,
        label: &str,
        vertices: &[Vertex],
    ) -> Result<Self::Buffer, DeviceError>;

    fn create_index_buffer(
        &mut self,
        label: &str,
        indices: &[u32],
    ) -> Result<Self::Buffer, DeviceError>;
}

/// Per-frame command sink. State set here persists until changed.
pub trait RenderContext {
    type Buffer;

    fn set_input_layout(&mut self, layout: InputLayout);
    fn set_mesh(&mut self, vertices: &Self::Buffer, indices: &Self::Buffer);
    fn set_shaders(&mut self, shaders: ShaderSet);
    fn bind_texture(&mut self, slot: TextureSlot);
    fn set_depth_policy(&mut self, policy: DepthPolicy);
    /// Unbinds any geometry-stage program. Backends without that stage
    /// treat this as a no-op.
    fn clear_geometry_stage(&mut self);
    fn update_params(&mut self, params: &FrameParams) -> Result<(), SubmitError>;
    fn draw_indexed(&mut self, index_count: u32) -> Result<(), SubmitError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texture_slots_are_dense() {
        for (i, slot) in TextureSlot::ALL.iter().enumerate() {
            assert_eq!(slot.index(), i);
        }
    }

    #[test]
    fn stride_matches_vertex_fields() {
        assert_eq!(VERTEX_STRIDE, 36);
    }
}
