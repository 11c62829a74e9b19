//! Vertex types for UI rendering

use bytemuck::{Pod, Zeroable};

/// Interleaved vertex for unlit UI geometry
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct UIVertex {
    /// Position in panel space
    pub position: [f32; 3],
    /// Texture coordinates
    pub uv: [f32; 2],
    /// RGBA8 color with the widget's cumulative alpha applied
    pub color: [u8; 4],
}

/// Interleaved vertex for panels that generate normals and tangents
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct UIVertexLit {
    /// Position in panel space
    pub position: [f32; 3],
    /// Surface normal
    pub normal: [f32; 3],
    /// Tangent with handedness in `w`
    pub tangent: [f32; 4],
    /// Texture coordinates
    pub uv: [f32; 2],
    /// RGBA8 color
    pub color: [u8; 4],
}

/// Index buffer for `vertex_count` vertices laid out as consecutive quads
/// (bottom-left, top-left, top-right, bottom-right).
pub fn quad_indices(vertex_count: usize) -> Vec<u32> {
    let quads = vertex_count / 4;
    let mut indices = Vec::with_capacity(quads * 6);
    for q in 0..quads {
        // Quad counts are bounded by GPU buffer sizes well under u32::MAX
        #[allow(clippy::cast_possible_truncation)]
        let base = (q * 4) as u32;
        indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    indices
}
