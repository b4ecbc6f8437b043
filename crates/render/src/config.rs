use glam::{Mat4, Vec4};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            fov_y: 75.0_f32.to_radians(),
            near: 0.1,
            far: 600.0,
        }
    }
}

impl ProjectionConfig {
    /// Left-handed perspective for a `width` x `height` viewport. A zero
    /// dimension is treated as one pixel.
    pub fn matrix(&self, width: u32, height: u32) -> Mat4 {
        let aspect = width.max(1) as f32 / height.max(1) as f32;
        Mat4::perspective_lh(self.fov_y, aspect, self.near, self.far)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    pub direction: Vec4,
    pub color: Vec4,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            direction: Vec4::new(1.0, -1.0, 1.0, 1.0),
            color: Vec4::ONE,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub projection: ProjectionConfig,
    pub lighting: LightingConfig,
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn default_projection_is_75_degrees() {
        let p = ProjectionConfig::default();
        assert!((p.fov_y - 1.309).abs() < 1e-3);
        assert_eq!(p.far, 600.0);
    }

    #[test]
    fn projection_maps_near_and_far_to_unit_depth() {
        let m = ProjectionConfig::default().matrix(1280, 720);
        let near = m.project_point3(Vec3::new(0.0, 0.0, 0.1));
        let far = m.project_point3(Vec3::new(0.0, 0.0, 600.0));
        assert!(near.z.abs() < 1e-4);
        assert!((far.z - 1.0).abs() < 1e-4);
    }

    #[test]
    fn zero_height_does_not_divide_by_zero() {
        let m = ProjectionConfig::default().matrix(800, 0);
        assert!(m.is_finite());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: SceneConfig =
            serde_json::from_str(r#"{ "projection": { "far": 100.0 } }"#).unwrap();
        assert_eq!(cfg.projection.far, 100.0);
        assert_eq!(cfg.projection.near, 0.1);
        assert_eq!(cfg.lighting, LightingConfig::default());
    }
}
