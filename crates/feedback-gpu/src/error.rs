use feedback_core::extent::Extent;
use feedback_core::TargetRole;
use thiserror::Error;

/// Failures of the render stack.
///
/// Setup variants (`NoAdapter` through `UniformLayoutMismatch`) indicate an
/// unusable configuration and abort startup. `IncompleteTarget` raised
/// mid-loop aborts the loop: render state is no longer verifiable. There is
/// no silent fallback for either category.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no suitable GPU adapter found")]
    NoAdapter,

    #[error("failed to create GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("offscreen target {} rejected at {extent}: {reason}", .role.label())]
    IncompleteTarget {
        role: TargetRole,
        extent: Extent,
        reason: String,
    },

    #[error("failed to parse shader: {0}")]
    ShaderParse(String),

    #[error("shader declares no uniform block")]
    MissingUniformBlock,

    #[error("uniform block `{block}` is missing required member `{name}`")]
    MissingUniform { block: String, name: String },

    #[error(
        "uniform member `{name}` sits at offset {shader_offset} in the shader \
         but {host_offset} on the host"
    )]
    UniformLayoutMismatch {
        name: String,
        shader_offset: u32,
        host_offset: u32,
    },

    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    #[error("pixel readback failed: {0}")]
    Readback(String),
}
