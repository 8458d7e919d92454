use glam::{Vec2, Vec3};

// ---------------------------------------------------------------------------
// Full-screen quad — the one piece of geometry in the whole system
// ---------------------------------------------------------------------------

/// One vertex of the full-screen quad: clip-space position, corner color,
/// texture coordinate. The GPU layer flattens these into its interleaved
/// vertex buffer; the layout (3 + 3 + 2 floats) is part of the geometry
/// contract with the vertex shader.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadVertex {
    pub position: Vec3,
    pub color: Vec3,
    pub tex_coords: Vec2,
}

/// The four vertices of the clip-space square, wound for a triangle strip:
/// bottom-left, bottom-right, top-left, top-right. Corner colors give the
/// effect shader a stable gradient to seed from.
pub const FULLSCREEN_QUAD: [QuadVertex; 4] = [
    QuadVertex {
        position: Vec3::new(-1.0, -1.0, 0.0),
        color: Vec3::new(1.0, 0.0, 0.0),
        tex_coords: Vec2::new(0.0, 0.0),
    },
    QuadVertex {
        position: Vec3::new(1.0, -1.0, 0.0),
        color: Vec3::new(0.0, 1.0, 0.0),
        tex_coords: Vec2::new(1.0, 0.0),
    },
    QuadVertex {
        position: Vec3::new(-1.0, 1.0, 0.0),
        color: Vec3::new(0.0, 0.0, 1.0),
        tex_coords: Vec2::new(0.0, 1.0),
    },
    QuadVertex {
        position: Vec3::new(1.0, 1.0, 0.0),
        color: Vec3::new(1.0, 1.0, 1.0),
        tex_coords: Vec2::new(1.0, 1.0),
    },
];

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
