use std::mem;

use wgpu::{BindGroup, BindGroupLayout, Buffer, Device, Queue};

use crate::context::FrameUniforms;
use crate::error::RenderError;

// ---------------------------------------------------------------------------
// UniformInterface — setup-time reflection of the shader's uniform block
// ---------------------------------------------------------------------------

/// The resolved uniform interface of the shader: block name plus each
/// member's byte offset, extracted once at setup with naga.
///
/// A missing member or an offset that disagrees with the host-side
/// `FrameUniforms` layout would make every draw upload incoherent values
/// un-diagnosably, so both are configuration errors caught here, never
/// per-frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformInterface {
    block: String,
    members: Vec<(String, u32)>,
}

impl UniformInterface {
    /// Required member names and the offsets the host struct uploads them at.
    fn required() -> [(&'static str, u32); 4] {
        [
            ("resolution", mem::offset_of!(FrameUniforms, resolution) as u32),
            ("time", mem::offset_of!(FrameUniforms, time) as u32),
            ("frame", mem::offset_of!(FrameUniforms, frame) as u32),
            ("mode", mem::offset_of!(FrameUniforms, mode) as u32),
        ]
    }

    /// Parse `source` and resolve the uniform block's member table, verifying
    /// every required member exists at the expected offset.
    pub fn resolve(source: &str) -> Result<Self, RenderError> {
        let module = naga::front::wgsl::parse_str(source)
            .map_err(|err| RenderError::ShaderParse(err.emit_to_string(source)))?;

        for (_, var) in module.global_variables.iter() {
            if var.space != naga::AddressSpace::Uniform {
                continue;
            }
            let ty = &module.types[var.ty];
            if let naga::TypeInner::Struct { members, .. } = &ty.inner {
                let block = ty
                    .name
                    .clone()
                    .unwrap_or_else(|| "<anonymous>".to_string());
                let members = members
                    .iter()
                    .map(|m| (m.name.clone().unwrap_or_default(), m.offset))
                    .collect();
                let interface = Self { block, members };
                interface.verify()?;
                return Ok(interface);
            }
        }
        Err(RenderError::MissingUniformBlock)
    }

    fn verify(&self) -> Result<(), RenderError> {
        for (name, host_offset) in Self::required() {
            let shader_offset = self.offset_of(name).ok_or_else(|| {
                RenderError::MissingUniform {
                    block: self.block.clone(),
                    name: name.to_string(),
                }
            })?;
            if shader_offset != host_offset {
                return Err(RenderError::UniformLayoutMismatch {
                    name: name.to_string(),
                    shader_offset,
                    host_offset,
                });
            }
        }
        Ok(())
    }

    /// Byte offset of a member within the uniform block, if present.
    pub fn offset_of(&self, name: &str) -> Option<u32> {
        self.members
            .iter()
            .find(|(member, _)| member == name)
            .map(|(_, offset)| *offset)
    }

    pub fn block_name(&self) -> &str {
        &self.block
    }
}

// ---------------------------------------------------------------------------
// UniformBinder — one buffer + bind group per pass
// ---------------------------------------------------------------------------

/// Owns one uniform buffer and its bind group. The driver keeps a binder per
/// pass (effect, present) so both passes of a single submission read their
/// own values; each frame writes the whole struct in one upload, so no
/// partial-write state is ever observable by the shader.
pub struct UniformBinder {
    buffer: Buffer,
    pub bind_group: BindGroup,
}

impl UniformBinder {
    pub fn new(device: &Device, layout: &BindGroupLayout, label: &str) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        Self { buffer, bind_group }
    }

    /// Upload all per-draw values at once.
    pub fn set_frame(&self, queue: &Queue, uniforms: &FrameUniforms) {
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(uniforms));
    }
}

// ---------------------------------------------------------------------------
// Tests (reflection is pure — no GPU required)
// ---------------------------------------------------------------------------
