use gallery_common::MeshError;
use thiserror::Error;

/// Failure creating a GPU resource.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("buffer `{0}` would be empty")]
    EmptyBuffer(String),
    #[error("out of device memory creating `{0}`")]
    OutOfMemory(String),
    #[error("device rejected `{label}`: {reason}")]
    Rejected { label: String, reason: String },
    #[error("invalid mesh: {0}")]
    InvalidMesh(#[from] MeshError),
}

/// Failure pushing parameters or issuing a draw.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubmitError {
    #[error("device lost: {0}")]
    DeviceLost(String),
    #[error("submission rejected: {0}")]
    Rejected(String),
}

impl SubmitError {
    /// A fatal error ends the frame loop; anything else skips one draw.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SubmitError::DeviceLost(_))
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to create {resource}: {source}")]
    Resource {
        resource: String,
        #[source]
        source: DeviceError,
    },
    #[error("{0}")]
    DeviceLost(SubmitError),
}
