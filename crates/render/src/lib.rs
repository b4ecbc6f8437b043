//! Rendering Adapter: backend-agnostic scene renderer.
//!
//! The scene is a fixed list of [`DrawPass`]es (ground plane, three animated
//! props, skybox, the held main mesh, crosshair) issued every frame against a
//! [`RenderContext`]. Buffers are created once, up front, through a
//! [`RenderDevice`].
//!
//! # Invariants
//! - Scene construction is all-or-nothing: any failed buffer aborts it.
//! - Pass order is fixed and every pass restores the default depth policy
//!   and input layout it changed.
//! - The parameter block is pushed only when it differs from the last push.
//! - A renderer built without a main mesh renders nothing.

mod clock;
mod config;
mod device;
mod error;
mod frame;
pub mod geometry;
mod pass;
mod props;
pub mod recording;
mod renderer;

pub use clock::{CLOCK_PERIOD, SceneClock};
pub use config::{LightingConfig, ProjectionConfig, SceneConfig};
pub use device::{
    DepthPolicy, InputLayout, PixelStage, RenderContext, RenderDevice, ShaderSet, TextureSlot,
    VERTEX_STRIDE, VertexStage,
};
pub use error::{DeviceError, RenderError, SubmitError};
pub use frame::FrameParams;
pub use geometry::{MeshBuffers, SceneGeometry, Shape};
pub use pass::{DrawInstance, DrawPass, PassTransform, scene_passes};
pub use props::{Balloon, PropAnimator, prop_offset};
pub use renderer::{FrameReport, SceneRenderer};

pub fn crate_info() -> &'static str {
    "gallery-render v0.1.0"
}
