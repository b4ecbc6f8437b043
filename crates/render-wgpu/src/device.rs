use std::sync::{Arc, Mutex};

use gallery_common::Vertex;
use gallery_render::{DeviceError, RenderDevice, SubmitError};
use tracing::error;
use wgpu::util::DeviceExt;

use crate::gpu::GpuVertex;

/// Shared flag set once the device reports itself lost.
#[derive(Debug, Clone, Default)]
pub struct DeviceHealth {
    lost: Arc<Mutex<Option<String>>>,
}

impl DeviceHealth {
    /// Hooks the device's loss and uncaptured-error callbacks.
    pub fn watch(device: &wgpu::Device) -> Self {
        let health = Self::default();
        let flag = health.clone();
        device.set_device_lost_callback(move |reason, message| {
            error!(?reason, %message, "device lost");
            flag.mark_lost(format!("{reason:?}: {message}"));
        });
        device.on_uncaptured_error(Box::new(|e| {
            error!(error = %e, "uncaptured device error");
        }));
        health
    }

    pub fn mark_lost(&self, reason: impl Into<String>) {
        let mut lost = self.lost.lock().unwrap_or_else(|e| e.into_inner());
        lost.get_or_insert_with(|| reason.into());
    }

    pub fn lost_reason(&self) -> Option<String> {
        self.lost.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn check(&self) -> Result<(), SubmitError> {
        match self.lost_reason() {
            Some(reason) => Err(SubmitError::DeviceLost(reason)),
            None => Ok(()),
        }
    }
}

/// Creates immutable buffers, reporting allocation and validation failures
/// through error scopes.
pub struct GpuDevice<'a> {
    device: &'a wgpu::Device,
}

impl<'a> GpuDevice<'a> {
    pub fn new(device: &'a wgpu::Device) -> Self {
        Self { device }
    }

    fn create(
        &self,
        label: &str,
        contents: &[u8],
        usage: wgpu::BufferUsages,
    ) -> Result<Arc<wgpu::Buffer>, DeviceError> {
        if contents.is_empty() {
            return Err(DeviceError::EmptyBuffer(label.to_string()));
        }
        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents,
            usage,
        });
        let validation = pollster::block_on(self.device.pop_error_scope());
        let out_of_memory = pollster::block_on(self.device.pop_error_scope());
        if out_of_memory.is_some() {
            return Err(DeviceError::OutOfMemory(label.to_string()));
        }
        if let Some(e) = validation {
            return Err(DeviceError::Rejected {
                label: label.to_string(),
                reason: e.to_string(),
            });
        }
        Ok(Arc::new(buffer))
    }
}

impl RenderDevice for GpuDevice<'_> {
    type Buffer = Arc<wgpu::Buffer>;

    fn create_vertex_buffer(
        &mut self,
        label: &str,
        vertices: &[Vertex],
    ) -> Result<Self::Buffer, DeviceError> {
        let gpu: Vec<GpuVertex> = vertices.iter().map(GpuVertex::from).collect();
        self.create(label, bytemuck::cast_slice(&gpu), wgpu::BufferUsages::VERTEX)
    }

    fn create_index_buffer(
        &mut self,
        label: &str,
        indices: &[u32],
    ) -> Result<Self::Buffer, DeviceError> {
        self.create(label, bytemuck::cast_slice(indices), wgpu::BufferUsages::INDEX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_starts_ok() {
        assert!(DeviceHealth::default().check().is_ok());
    }

    #[test]
    fn first_loss_reason_sticks() {
        let health = DeviceHealth::default();
        let shared = health.clone();
        shared.mark_lost("driver reset");
        health.mark_lost("second");
        assert_eq!(
            health.check(),
            Err(SubmitError::DeviceLost("driver reset".into()))
        );
    }
}
