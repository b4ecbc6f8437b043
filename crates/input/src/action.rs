use glam::Vec3;

/// A translation the user can request with a held key.
///
/// Directions are in the camera's local left-handed frame: +Z forward, +X right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Movement {
    Forward,
    Backward,
    Left,
    Right,
}

impl Movement {
    /// Application order within one frame.
    pub const ALL: [Movement; 4] = [
        Movement::Forward,
        Movement::Backward,
        Movement::Left,
        Movement::Right,
    ];

    pub fn local_direction(self) -> Vec3 {
        match self {
            Movement::Forward => Vec3::Z,
            Movement::Backward => Vec3::NEG_Z,
            Movement::Left => Vec3::NEG_X,
            Movement::Right => Vec3::X,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_movements_cancel() {
        let sum = Movement::Forward.local_direction() + Movement::Backward.local_direction();
        assert_eq!(sum, Vec3::ZERO);
        let sum = Movement::Left.local_direction() + Movement::Right.local_direction();
        assert_eq!(sum, Vec3::ZERO);
    }

    #[test]
    fn directions_are_unit_length() {
        for m in Movement::ALL {
            assert_eq!(m.local_direction().length(), 1.0);
        }
    }
}
