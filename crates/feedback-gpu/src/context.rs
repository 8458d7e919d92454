use wgpu::{Device, Instance, Queue};

use crate::error::RenderError;

pub struct GpuContext {
    pub instance: Instance,
    pub device: Device,
    pub queue: Queue,
}

impl GpuContext {
    /// Create a headless GPU context (no surface). Used by the readback
    /// harness and tests. The surface-aware variant is created by
    /// `feedback-app`, which must pass its surface for adapter selection.
    pub async fn new_headless() -> Result<Self, RenderError> {
        let instance = Instance::default();

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::NoAdapter)?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("feedback-gpu device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        Ok(Self {
            instance,
            device,
            queue,
        })
    }
}

/// All per-draw data uploaded to the GPU as a single uniform buffer write, so
/// the shader never observes a partially updated set.
/// Must match the `FrameUniforms` struct in `shaders/feedback.wgsl`; the
/// layout is verified against the shader at setup (`UniformInterface`).
/// `repr(C)` + `bytemuck` ensures safe casting to `&[u8]`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniforms {
    /// Destination resolution in pixels.
    pub resolution: [f32; 2],
    /// Seconds since loop start.
    pub time: f32,
    /// Frame index, starting at 0.
    pub frame: u32,
    /// `PassMode::shader_index()` value for this draw.
    pub mode: i32,
    pub _pad: [u32; 3], // keep 16-byte alignment
}
