use crate::action::Movement;
use glam::IVec2;

/// Held state of the four movement keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveKeys {
    forward: bool,
    backward: bool,
    left: bool,
    right: bool,
}

impl MoveKeys {
    pub fn set(&mut self, movement: Movement, held: bool) {
        *self.slot(movement) = held;
    }

    pub fn is_held(&self, movement: Movement) -> bool {
        match movement {
            Movement::Forward => self.forward,
            Movement::Backward => self.backward,
            Movement::Left => self.left,
            Movement::Right => self.right,
        }
    }

    /// Held movements in application order.
    pub fn held(&self) -> impl Iterator<Item = Movement> + '_ {
        Movement::ALL.into_iter().filter(|m| self.is_held(*m))
    }

    fn slot(&mut self, movement: Movement) -> &mut bool {
        match movement {
            Movement::Forward => &mut self.forward,
            Movement::Backward => &mut self.backward,
            Movement::Left => &mut self.left,
            Movement::Right => &mut self.right,
        }
    }
}

/// Input sampled once per frame. Not debounced.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    /// Whether the window has focus. Nothing else is read when false.
    pub focused: bool,
    /// Right mouse button held.
    pub look_held: bool,
    /// Absolute cursor position, pixels.
    pub cursor: IVec2,
    /// Visual center of the window in the same coordinate space as `cursor`.
    pub window_center: IVec2,
    pub moves: MoveKeys,
}

impl InputSnapshot {
    /// Offset of the window center from the cursor.
    pub fn look_offset(&self) -> IVec2 {
        self.window_center - self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn held_keys_follow_application_order() {
        let mut keys = MoveKeys::default();
        keys.set(Movement::Right, true);
        keys.set(Movement::Forward, true);
        let held: Vec<_> = keys.held().collect();
        assert_eq!(held, vec![Movement::Forward, Movement::Right]);

        keys.set(Movement::Forward, false);
        assert!(!keys.is_held(Movement::Forward));
        assert_eq!(keys.held().count(), 1);
    }

    #[test]
    fn look_offset_is_center_minus_cursor() {
        let snapshot = InputSnapshot {
            cursor: IVec2::new(700, 300),
            window_center: IVec2::new(640, 384),
            ..Default::default()
        };
        assert_eq!(snapshot.look_offset(), IVec2::new(-60, 84));
    }
}
