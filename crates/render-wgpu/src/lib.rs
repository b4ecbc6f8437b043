//! wgpu render backend for the gallery scene.
//!
//! [`GpuDevice`] creates the scene's buffers; each frame a
//! [`FrameRecorder`] collects the scene renderer's state changes and draws,
//! and [`WgpuRenderer::submit`] encodes them into one render pass.
//!
//! # Invariants
//! - Every pipeline a scene pass can ask for is built up front.
//! - A lost device turns every later submission into a fatal error.
//! - Parameter blocks are 256 bytes, the dynamic uniform offset alignment.

mod device;
mod frame;
mod gpu;
mod pipeline;
mod shaders;
mod textures;

pub use device::{DeviceHealth, GpuDevice};
pub use frame::{FrameRecorder, MAX_PARAM_BLOCKS, RecordedFrame};
pub use gpu::{GpuVertex, PARAM_BLOCK_SIZE, ParamBlock, WgpuRenderer};
pub use pipeline::{PipelineKey, scene_pipeline_keys};
pub use textures::{TextureError, TextureImage, TextureSet};
