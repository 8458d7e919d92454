use feedback_core::geometry::{QuadVertex, FULLSCREEN_QUAD};
use glam::{Vec2, Vec3};
use wgpu::util::DeviceExt;
use wgpu::Device;

// ---------------------------------------------------------------------------
// Vertex — GPU-side layout of the quad geometry
// ---------------------------------------------------------------------------

/// Interleaved vertex as uploaded: position (3), color (3), tex coords (2).
/// 32 bytes per vertex; matches the `VertexInput` struct in the shader.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl Vertex {
    const ATTRIBS: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    pub fn new(position: Vec3, color: Vec3, tex_coords: Vec2) -> Self {
        Self {
            position: position.to_array(),
            color: color.to_array(),
            tex_coords: tex_coords.to_array(),
        }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

impl From<QuadVertex> for Vertex {
    fn from(v: QuadVertex) -> Self {
        Self::new(v.position, v.color, v.tex_coords)
    }
}

// ---------------------------------------------------------------------------
// QuadBuffer — the one static piece of geometry
// ---------------------------------------------------------------------------

/// The full-screen quad's vertex buffer: four vertices drawn as a triangle
/// strip. Created once at setup, shared by both passes, immutable after.
pub struct QuadBuffer {
    buffer: wgpu::Buffer,
    vertex_count: u32,
}

impl QuadBuffer {
    pub fn new(device: &Device) -> Self {
        let vertices: Vec<Vertex> = FULLSCREEN_QUAD.into_iter().map(Vertex::from).collect();
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad vertices"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        Self {
            buffer,
            vertex_count: vertices.len() as u32,
        }
    }

    /// Record the quad into an open render pass. Stateless: pipeline and
    /// bind groups must already be set.
    pub fn draw<'pass>(&'pass self, pass: &mut wgpu::RenderPass<'pass>) {
        pass.set_vertex_buffer(0, self.buffer.slice(..));
        pass.draw(0..self.vertex_count, 0..1);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_is_32_bytes() {
        // 8 floats: the stride the attribute offsets are computed against.
        assert_eq!(std::mem::size_of::<Vertex>(), 32);
    }

    #[test]
    fn layout_matches_shader_locations() {
        let layout = Vertex::layout();
        assert_eq!(layout.array_stride, 32);
        assert_eq!(layout.attributes.len(), 3);
        assert_eq!(layout.attributes[0].shader_location, 0);
        assert_eq!(layout.attributes[1].offset, 12);
        assert_eq!(layout.attributes[2].offset, 24);
    }

    #[test]
    fn quad_converts_to_four_vertices() {
        let vertices: Vec<Vertex> = FULLSCREEN_QUAD.into_iter().map(Vertex::from).collect();
        assert_eq!(vertices.len(), 4);
        assert_eq!(vertices[0].position, [-1.0, -1.0, 0.0]);
        assert_eq!(vertices[3].tex_coords, [1.0, 1.0]);
    }

    #[test]
    fn quad_buffer_uploads_once() {
        let Some(ctx) = crate::testing::context() else { return };
        let quad = QuadBuffer::new(&ctx.device);
        assert_eq!(quad.vertex_count, 4);
        assert_eq!(quad.buffer.size(), 4 * 32);
    }
}
