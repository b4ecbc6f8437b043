use glam::{Mat4, Vec4};

/// The per-draw parameter block shared by every shader stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameParams {
    pub world: Mat4,
    /// World-to-camera transform.
    pub view: Mat4,
    pub projection: Mat4,
    pub light_direction: Vec4,
    pub light_color: Vec4,
    pub tint: Vec4,
    /// Scene clock, seconds since its last reset.
    pub time: f32,
}

impl Default for FrameParams {
    fn default() -> Self {
        Self {
            world: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            light_direction: Vec4::ZERO,
            light_color: Vec4::ONE,
            tint: Vec4::ONE,
            time: 0.0,
        }
    }
}
