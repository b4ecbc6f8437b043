use crate::action::Movement;
use crate::state::InputSnapshot;
use glam::{EulerRot, IVec2, Mat4, Vec3};
use serde::Deserialize;
use std::time::Duration;

/// Camera height written into the view translation on every focused frame.
pub const HEIGHT_GUARD: f32 = 1.0;

/// How far a held movement key moves the camera each frame.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveStep {
    /// Fixed distance per frame, independent of frame time.
    PerFrame(f32),
    /// Distance per second, scaled by the frame delta.
    PerSecond(f32),
}

impl MoveStep {
    pub fn distance(self, dt: Duration) -> f32 {
        match self {
            MoveStep::PerFrame(d) => d,
            MoveStep::PerSecond(speed) => speed * dt.as_secs_f32(),
        }
    }
}

/// Camera tuning. Defaults reproduce the stock demo.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub eye: Vec3,
    pub target: Vec3,
    pub move_step: MoveStep,
    /// Pixels of cursor offset per radian of rotation.
    pub look_divisor: f32,
    /// Look offsets must be strictly inside this many pixels on both axes.
    pub deadzone: i32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 3.0, -8.0),
            target: Vec3::new(0.0, 2.0, 0.0),
            move_step: MoveStep::PerFrame(0.05),
            look_divisor: 150.0,
            deadzone: 125,
        }
    }
}

/// What one [`CameraController::update`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CameraUpdate {
    pub looked: bool,
    pub moved: bool,
    /// Where the caller should warp the cursor to, if anywhere.
    pub recenter: Option<IVec2>,
}

/// Free-fly camera holding its view matrix in camera-to-world form.
///
/// Keeping the inverse lets rotations and translations be composed on the
/// right as local-space moves of the camera. Renderers invert it back to
/// world-to-camera before upload.
#[derive(Debug, Clone)]
pub struct CameraController {
    view: Mat4,
    config: CameraConfig,
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(CameraConfig::default())
    }
}

impl CameraController {
    pub fn new(config: CameraConfig) -> Self {
        let view = Mat4::look_at_lh(config.eye, config.target, Vec3::Y).inverse();
        Self { view, config }
    }

    pub fn from_view(view: Mat4, config: CameraConfig) -> Self {
        Self { view, config }
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    /// Camera-to-world matrix.
    pub fn view(&self) -> Mat4 {
        self.view
    }

    /// World-to-camera matrix.
    pub fn world_to_camera(&self) -> Mat4 {
        self.view.inverse()
    }

    pub fn position(&self) -> Vec3 {
        self.view.w_axis.truncate()
    }

    pub fn forward(&self) -> Vec3 {
        self.view.z_axis.truncate()
    }

    /// Apply one frame of polled input.
    ///
    /// Every focused frame ends with the height guard, whether or not either
    /// channel changed the view.
    pub fn update(&mut self, input: &InputSnapshot, dt: Duration) -> CameraUpdate {
        let mut update = CameraUpdate::default();
        if !input.focused {
            return update;
        }

        if input.look_held {
            update.looked = self.look(input.look_offset());
            update.recenter = Some(input.window_center);
        }

        let step = self.config.move_step.distance(dt);
        for movement in input.moves.held() {
            self.translate(movement, step);
            update.moved = true;
        }

        self.apply_height_guard();
        if update.looked || update.moved {
            tracing::trace!(position = ?self.position(), "camera updated");
        }
        update
    }

    /// Rotate by a cursor offset from the window center.
    ///
    /// Returns `false` and leaves the view untouched when the offset is not
    /// strictly inside the deadzone on both axes.
    pub fn look(&mut self, offset: IVec2) -> bool {
        let deadzone = self.config.deadzone;
        if offset.x.abs() >= deadzone || offset.y.abs() >= deadzone {
            tracing::trace!(?offset, "look offset outside deadzone");
            return false;
        }

        let yaw = -(offset.x as f32) / self.config.look_divisor;
        let pitch = -(offset.y as f32) / self.config.look_divisor;
        let rotation = Mat4::from_euler(EulerRot::YXZ, yaw, pitch, 0.0);
        self.view *= rotation;
        self.orthonormalize();
        true
    }

    /// Rebuild the right and up axes from the forward axis and world up.
    ///
    /// Removes roll and drift accumulated by repeated rotations. The w
    /// components of the basis and the translation are kept. Returns `false`
    /// without changes when forward is parallel to world up.
    pub fn orthonormalize(&mut self) -> bool {
        let z = self.view.z_axis.truncate();
        let Some(x) = Vec3::Y.cross(z).try_normalize() else {
            return false;
        };
        let Some(y) = z.cross(x).try_normalize() else {
            return false;
        };
        let z = z.normalize();

        self.view.x_axis = x.extend(self.view.x_axis.w);
        self.view.y_axis = y.extend(self.view.y_axis.w);
        self.view.z_axis = z.extend(self.view.z_axis.w);
        true
    }

    /// Move along a local axis.
    pub fn translate(&mut self, movement: Movement, distance: f32) {
        self.view *= Mat4::from_translation(movement.local_direction() * distance);
    }

    /// Force the homogeneous translation's y entry (row 1 of the w column)
    /// to [`HEIGHT_GUARD`].
    pub fn apply_height_guard(&mut self) {
        self.view.w_axis.y = HEIGHT_GUARD;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::MoveKeys;

    const EPS: f32 = 1e-5;

    fn focused(cursor: IVec2) -> InputSnapshot {
        InputSnapshot {
            focused: true,
            look_held: true,
            cursor,
            window_center: IVec2::new(640, 384),
            moves: MoveKeys::default(),
        }
    }

    fn assert_orthonormal(m: Mat4) {
        let (x, y, z) = (
            m.x_axis.truncate(),
            m.y_axis.truncate(),
            m.z_axis.truncate(),
        );
        for v in [x, y, z] {
            assert!((v.length() - 1.0).abs() < EPS, "{v}");
        }
        assert!(x.dot(y).abs() < EPS);
        assert!(y.dot(z).abs() < EPS);
        assert!(z.dot(x).abs() < EPS);
    }

    #[test]
    fn default_camera_sits_at_eye_looking_at_target() {
        let cam = CameraController::default();
        assert!(cam.position().abs_diff_eq(Vec3::new(0.0, 3.0, -8.0), EPS));
        let expected = (Vec3::new(0.0, 2.0, 0.0) - Vec3::new(0.0, 3.0, -8.0)).normalize();
        assert!(cam.forward().abs_diff_eq(expected, EPS));
        assert!((cam.world_to_camera() * cam.view()).abs_diff_eq(Mat4::IDENTITY, EPS));
    }

    #[test]
    fn offset_outside_deadzone_keeps_orientation_but_guards_height() {
        let mut cam = CameraController::default();
        let before = cam.view();
        let center = IVec2::new(640, 384);
        let update = cam.update(&focused(center - IVec2::new(640, 384)), Duration::ZERO);
        assert!(!update.looked);
        assert!(!update.moved);
        assert_eq!(update.recenter, Some(center));

        let after = cam.view();
        assert_eq!(after.x_axis, before.x_axis);
        assert_eq!(after.y_axis, before.y_axis);
        assert_eq!(after.z_axis, before.z_axis);
        assert_eq!(after.w_axis.x, before.w_axis.x);
        assert_eq!(after.w_axis.z, before.w_axis.z);
        assert_eq!(cam.position().y, HEIGHT_GUARD);
    }

    #[test]
    fn idle_focused_frame_applies_height_guard() {
        let mut cam = CameraController::default();
        assert!((cam.position().y - 3.0).abs() < EPS);

        let mut input = focused(IVec2::ZERO);
        input.look_held = false;
        let update = cam.update(&input, Duration::from_millis(16));

        assert_eq!(update, CameraUpdate::default());
        assert_eq!(cam.position().y, HEIGHT_GUARD);
        assert!((cam.position().z + 8.0).abs() < EPS);
    }

    #[test]
    fn offset_on_deadzone_edge_is_rejected() {
        let mut cam = CameraController::default();
        assert!(!cam.look(IVec2::new(0, 125)));
        assert!(!cam.look(IVec2::new(-125, 0)));
        assert!(cam.look(IVec2::new(124, -124)));
    }

    #[test]
    fn offset_inside_deadzone_rotates() {
        let mut cam = CameraController::default();
        let before = cam.view();
        let center = IVec2::new(640, 384);
        let update = cam.update(&focused(center - IVec2::new(50, 0)), Duration::ZERO);
        assert!(update.looked);
        assert_ne!(cam.view(), before);
        assert_orthonormal(cam.view());
    }

    #[test]
    fn positive_offset_yaws_left() {
        let mut cam = CameraController::default();
        let before = cam.forward();
        // Cursor left of center: yaw = -offset/150 < 0 turns toward -X.
        assert!(cam.look(IVec2::new(60, 0)));
        let after = cam.forward();
        assert!(after.x < before.x);
        assert!(after.y < 0.0);
    }

    #[test]
    fn unfocused_input_is_ignored() {
        let mut cam = CameraController::default();
        let before = cam.view();
        let mut input = focused(IVec2::new(600, 384));
        input.focused = false;
        input.moves.set(Movement::Forward, true);
        let update = cam.update(&input, Duration::from_millis(16));
        assert_eq!(update, CameraUpdate::default());
        assert_eq!(cam.view(), before);
    }

    #[test]
    fn orthonormalize_removes_skew() {
        let skewed = Mat4::from_cols(
            Vec3::new(1.0, 0.2, 0.0).extend(0.0),
            Vec3::new(0.1, 0.9, 0.3).extend(0.0),
            Vec3::new(0.0, -0.2, 2.0).extend(0.0),
            Vec3::new(4.0, 5.0, 6.0).extend(1.0),
        );
        let mut cam = CameraController::from_view(skewed, CameraConfig::default());
        assert!(cam.orthonormalize());
        let view = cam.view();
        assert_orthonormal(view);
        // Forward keeps its direction, right stays level with the horizon.
        let forward = Vec3::new(0.0, -0.2, 2.0).normalize();
        assert!(view.z_axis.truncate().abs_diff_eq(forward, EPS));
        assert!(view.x_axis.y.abs() < EPS);
        assert_eq!(view.w_axis, glam::Vec4::new(4.0, 5.0, 6.0, 1.0));
    }

    #[test]
    fn orthonormalize_skips_degenerate_forward() {
        let straight_up = Mat4::from_cols(
            glam::Vec4::X,
            glam::Vec4::NEG_Z,
            glam::Vec4::Y,
            glam::Vec4::W,
        );
        let mut cam = CameraController::from_view(straight_up, CameraConfig::default());
        assert!(!cam.orthonormalize());
        assert_eq!(cam.view(), straight_up);
    }

    #[test]
    fn forward_moves_along_local_axis_then_height_is_guarded() {
        let mut cam = CameraController::default();
        let start = cam.position();
        let forward = cam.forward();

        let mut input = focused(IVec2::ZERO);
        input.look_held = false;
        input.moves.set(Movement::Forward, true);
        let update = cam.update(&input, Duration::from_millis(16));

        assert!(update.moved);
        assert_eq!(update.recenter, None);
        let moved = cam.position() - start;
        assert!((moved.x - forward.x * 0.05).abs() < EPS);
        assert!((moved.z - forward.z * 0.05).abs() < EPS);
        assert_eq!(cam.position().y, HEIGHT_GUARD);
        assert_eq!(cam.view().w_axis.y, 1.0);
    }

    #[test]
    fn all_four_keys_apply_in_one_frame() {
        let mut cam = CameraController::default();
        let start = cam.position();
        let mut input = focused(IVec2::ZERO);
        input.look_held = false;
        for m in Movement::ALL {
            input.moves.set(m, true);
        }
        cam.update(&input, Duration::from_millis(16));
        let moved = cam.position() - start;
        assert!(moved.x.abs() < EPS);
        assert!(moved.z.abs() < EPS);
    }

    #[test]
    fn per_second_step_scales_with_frame_time() {
        assert_eq!(MoveStep::PerFrame(0.05).distance(Duration::from_secs(3)), 0.05);
        assert_eq!(MoveStep::PerSecond(2.0).distance(Duration::from_millis(500)), 1.0);
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: CameraConfig =
            serde_json::from_str(r#"{ "move_step": { "per_second": 3.0 }, "deadzone": 90 }"#)
                .unwrap();
        assert_eq!(config.move_step, MoveStep::PerSecond(3.0));
        assert_eq!(config.deadzone, 90);
        assert_eq!(config.look_divisor, 150.0);
        assert_eq!(config.eye, Vec3::new(0.0, 3.0, -8.0));
    }
}
