use feedback_core::extent::Extent;
use wgpu::{Device, Queue};

use crate::error::RenderError;

// ---------------------------------------------------------------------------
// Pixel readback — headless verification of rendered output
// ---------------------------------------------------------------------------

/// Copy an rgba8 texture back to the CPU as tightly packed bytes
/// (width × height × 4, row-major).
///
/// Copy rows must be 256-byte aligned on the GPU side, so the staging buffer
/// is padded per row and the padding stripped after mapping.
pub fn read_rgba8(
    device: &Device,
    queue: &Queue,
    texture: &wgpu::Texture,
    extent: Extent,
) -> Result<Vec<u8>, RenderError> {
    let row_bytes = extent.width * 4;
    let padded_row_bytes = wgpu::util::align_to(row_bytes, wgpu::COPY_BYTES_PER_ROW_ALIGNMENT);

    let staging = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("readback staging"),
        size: u64::from(padded_row_bytes) * u64::from(extent.height),
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("readback encoder"),
    });
    encoder.copy_texture_to_buffer(
        texture.as_image_copy(),
        wgpu::ImageCopyBuffer {
            buffer: &staging,
            layout: wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(padded_row_bytes),
                rows_per_image: Some(extent.height),
            },
        },
        wgpu::Extent3d {
            width: extent.width,
            height: extent.height,
            depth_or_array_layers: 1,
        },
    );
    queue.submit(Some(encoder.finish()));

    let slice = staging.slice(..);
    let (tx, rx) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });
    let _ = device.poll(wgpu::Maintain::Wait);
    rx.recv()
        .map_err(|_| RenderError::Readback("map callback never ran".into()))?
        .map_err(|err| RenderError::Readback(err.to_string()))?;

    let mapped = slice.get_mapped_range();
    let mut pixels = Vec::with_capacity((row_bytes * extent.height) as usize);
    for row in 0..extent.height as usize {
        let start = row * padded_row_bytes as usize;
        pixels.extend_from_slice(&mapped[start..start + row_bytes as usize]);
    }
    drop(mapped);
    staging.unmap();

    Ok(pixels)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
