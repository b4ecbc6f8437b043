//! Camera and input controller.
//!
//! Input is polled once per frame into an [`InputSnapshot`]; the
//! [`CameraController`] turns it into changes to a camera-to-world view
//! matrix.
//!
//! # Invariants
//! - No input is applied while the window is unfocused.
//! - A look offset outside the deadzone on either axis is discarded.
//! - The view basis is re-orthogonalized after every applied rotation.

pub mod action;
mod camera;
mod state;

pub use action::Movement;
pub use camera::{CameraConfig, CameraController, CameraUpdate, HEIGHT_GUARD, MoveStep};
pub use state::{InputSnapshot, MoveKeys};
