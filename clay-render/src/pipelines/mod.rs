//! Render pipelines and their shared plumbing.
//!
//! - [`rect`]: rounded-rectangle SDF program
//! - [`text`]: atlas-sampled glyph program and per-font atlas textures

pub mod rect;
pub mod text;

use thiserror::Error;
use wgpu::{Buffer, BufferDescriptor, BufferUsages, Device, ErrorFilter, Queue};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("failed to build {label}:\n{log}")]
    Compile { label: &'static str, log: String },
}

/// Run `build` inside a validation error scope.
///
/// Shader compile and pipeline link diagnostics surface here instead of
/// reaching the device's uncaptured-error handler.
pub(crate) fn checked<T>(
    device: &Device,
    label: &'static str,
    build: impl FnOnce() -> T,
) -> Result<T, PipelineError> {
    device.push_error_scope(ErrorFilter::Validation);
    let value = build();
    if let Some(error) = pollster::block_on(device.pop_error_scope()) {
        let log = error.to_string();
        log::error!("{} failed to compile:\n{}", label, log);
        return Err(PipelineError::Compile { label, log });
    }
    log::info!("Built {}", label);
    Ok(value)
}

/// Vertex buffer fully replaced every frame; recreated at the next
/// power of two when a frame outgrows it.
pub struct VertexBuffer {
    label: &'static str,
    buffer: Buffer,
    capacity: u64,
}

impl VertexBuffer {
    const MIN_BYTES: u64 = 4096;

    pub fn new(device: &Device, label: &'static str) -> Self {
        Self {
            label,
            buffer: Self::allocate(device, label, Self::MIN_BYTES),
            capacity: Self::MIN_BYTES,
        }
    }

    fn allocate(device: &Device, label: &'static str, size: u64) -> Buffer {
        device.create_buffer(&BufferDescriptor {
            label: Some(label),
            size,
            usage: BufferUsages::VERTEX | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    /// Replace the contents with `bytes`.
    pub fn write(&mut self, device: &Device, queue: &Queue, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        let len = bytes.len() as u64;
        if len > self.capacity {
            let size = len.next_power_of_two().max(Self::MIN_BYTES);
            log::debug!("Growing {} from {} to {} bytes", self.label, self.capacity, size);
            self.buffer = Self::allocate(device, self.label, size);
            self.capacity = size;
        }
        queue.write_buffer(&self.buffer, 0, bytes);
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BackendPreference, RendererConfig};
    use crate::context::GpuContext;

    fn headless() -> Option<GpuContext> {
        let config = RendererConfig {
            backend: BackendPreference::All,
            ..Default::default()
        };
        pollster::block_on(GpuContext::new_headless(&config)).ok()
    }

    fn shader(device: &Device, source: &'static str) -> wgpu::ShaderModule {
        device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("test_shader"),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        })
    }

    #[test]
    fn test_checked_reports_compile_log() {
        let Some(gpu) = headless() else { return };
        let result = checked(&gpu.device, "broken_shader", || {
            shader(&gpu.device, "@vertex fn vs_main( -> @builtin(position) vec4<f32> {")
        });
        match result {
            Err(PipelineError::Compile { label, log }) => {
                assert_eq!(label, "broken_shader");
                assert!(!log.is_empty());
            }
            Ok(_) => panic!("invalid WGSL compiled"),
        }
    }

    #[test]
    fn test_checked_passes_valid_module() {
        let Some(gpu) = headless() else { return };
        let result = checked(&gpu.device, "valid_shader", || {
            shader(
                &gpu.device,
                "@vertex fn vs_main() -> @builtin(position) vec4<f32> { return vec4<f32>(0.0); }",
            )
        });
        assert!(result.is_ok());
    }

    #[test]
    fn test_vertex_buffer_grows_to_power_of_two() {
        let Some(gpu) = headless() else { return };
        let mut buffer = VertexBuffer::new(&gpu.device, "test_vertices");
        assert_eq!(buffer.capacity(), 4096);
        buffer.write(&gpu.device, &gpu.queue, &[0u8; 5000]);
        assert_eq!(buffer.capacity(), 8192);
        buffer.write(&gpu.device, &gpu.queue, &[0u8; 64]);
        assert_eq!(buffer.capacity(), 8192);
    }
}
