use glam::{Mat4, Vec3, Vec4};

/// Per-frame displacement of an animated prop at scene time `t`.
pub fn prop_offset(t: f32) -> f32 {
    (2.0 * t).sin() / 10.0
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Balloon {
    pub position: Vec3,
    /// Direction the offset is applied along each frame.
    pub axis: Vec3,
    pub tint: Vec4,
}

/// The three bobbing props. Offsets accumulate frame over frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PropAnimator {
    balloons: [Balloon; 3],
    scale: f32,
}

impl Default for PropAnimator {
    fn default() -> Self {
        Self {
            balloons: [
                Balloon {
                    position: Vec3::new(-5.0, 4.0, -2.0),
                    axis: Vec3::NEG_X,
                    tint: Vec4::new(1.0, 0.0, 0.0, 1.0),
                },
                Balloon {
                    position: Vec3::new(0.0, 4.0, -2.0),
                    axis: Vec3::Y,
                    tint: Vec4::new(0.0, 1.0, 0.0, 1.0),
                },
                Balloon {
                    position: Vec3::new(5.0, 4.0, -2.0),
                    axis: Vec3::X,
                    tint: Vec4::new(0.0, 0.0, 1.0, 1.0),
                },
            ],
            scale: 0.3,
        }
    }
}

impl PropAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balloons(&self) -> &[Balloon] {
        &self.balloons
    }

    pub fn len(&self) -> usize {
        self.balloons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balloons.is_empty()
    }

    pub fn advance(&mut self, t: f32) {
        let offset = prop_offset(t);
        for balloon in &mut self.balloons {
            balloon.position += balloon.axis * offset;
        }
    }

    /// Translate then scale, so the position is scaled along with the mesh.
    /// Out-of-range indices yield identity.
    pub fn world(&self, index: usize) -> Mat4 {
        match self.balloons.get(index) {
            Some(b) => {
                Mat4::from_scale(Vec3::splat(self.scale)) * Mat4::from_translation(b.position)
            }
            None => Mat4::IDENTITY,
        }
    }

    pub fn tint(&self, index: usize) -> Vec4 {
        self.balloons.get(index).map_or(Vec4::ONE, |b| b.tint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    #[test]
    fn offset_is_periodic() {
        for t in [0.0, 0.3, 1.7, 4.0, 6.1] {
            assert!((prop_offset(t) - prop_offset(t + TAU)).abs() < 1e-5);
        }
    }

    #[test]
    fn each_balloon_moves_on_its_axis() {
        let mut props = PropAnimator::new();
        let t = 0.5;
        props.advance(t);
        let d = prop_offset(t);
        let b = props.balloons();
        assert!((b[0].position.x - (-5.0 - d)).abs() < 1e-6);
        assert_eq!(b[0].position.y, 4.0);
        assert!((b[1].position.y - (4.0 + d)).abs() < 1e-6);
        assert_eq!(b[1].position.x, 0.0);
        assert!((b[2].position.x - (5.0 + d)).abs() < 1e-6);
    }

    #[test]
    fn world_translates_before_scaling() {
        let props = PropAnimator::new();
        let origin = props.world(0).transform_point3(Vec3::ZERO);
        assert!(origin.abs_diff_eq(Vec3::new(-1.5, 1.2, -0.6), 1e-6));
        let unit = props.world(0).transform_point3(Vec3::X);
        assert!(unit.abs_diff_eq(Vec3::new(-1.2, 1.2, -0.6), 1e-6));
    }

    #[test]
    fn tints_are_red_green_blue() {
        let props = PropAnimator::new();
        assert_eq!(props.tint(0).x, 1.0);
        assert_eq!(props.tint(1).y, 1.0);
        assert_eq!(props.tint(2).z, 1.0);
        assert_eq!(props.tint(7), Vec4::ONE);
    }
}
