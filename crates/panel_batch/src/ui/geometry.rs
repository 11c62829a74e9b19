//! Widget geometry sources and the shared scratch buffers they write into
//!
//! The batcher decides *whether* a widget is written and *into which*
//! draw call; the widget's [`WidgetGeometry`] decides what it writes.

use crate::foundation::math::{Vec2, Vec3, Vec4};
use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// 8-bit RGBA color
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize)]
pub struct Color32 {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
    /// Alpha
    pub a: u8,
}

impl Color32 {
    /// Opaque white
    pub const WHITE: Self = Self::new(255, 255, 255, 255);

    /// Create a color from components
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Multiply the alpha channel by `alpha` (clamped to 0..=1)
    #[must_use]
    pub fn scale_alpha(self, alpha: f32) -> Self {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let a = (f32::from(self.a) * alpha.clamp(0.0, 1.0)).round() as u8;
        Self { a, ..self }
    }

    /// Components as an array
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Color32 {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Normal written for every vertex when a panel generates normals
pub const UI_NORMAL: [f32; 3] = [0.0, 0.0, -1.0];

/// Tangent written for every vertex when a panel generates normals
pub const UI_TANGENT: [f32; 4] = [1.0, 0.0, 0.0, 1.0];

/// Scratch vertex streams shared by every fill.
///
/// Reused across fills to avoid reallocating; always cleared after the
/// contents are copied into a draw call.
#[derive(Debug, Default, Clone)]
pub struct GeometryBuffers {
    /// Positions in panel space
    pub positions: Vec<Vec3>,
    /// Texture coordinates
    pub uvs: Vec<Vec2>,
    /// Vertex colors
    pub colors: Vec<Color32>,
    /// Normals (only filled when `generate_normals` is set)
    pub normals: Vec<Vec3>,
    /// Tangents (only filled when `generate_normals` is set)
    pub tangents: Vec<Vec4>,
    generate_normals: bool,
}

impl GeometryBuffers {
    /// Create empty buffers
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a batch; decides whether normals and tangents are written
    pub fn begin(&mut self, generate_normals: bool) {
        self.generate_normals = generate_normals;
    }

    /// Whether normals and tangents are being written
    pub fn generates_normals(&self) -> bool {
        self.generate_normals
    }

    /// Append one vertex to every active stream
    pub fn push_vertex(&mut self, position: Vec3, uv: Vec2, color: Color32) {
        self.positions.push(position);
        self.uvs.push(uv);
        self.colors.push(color);
        if self.generate_normals {
            self.normals.push(Vec3::from(UI_NORMAL));
            self.tangents.push(Vec4::from(UI_TANGENT));
        }
    }

    /// Number of vertices written since the last clear
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Whether nothing has been written since the last clear
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Drop contents, keep capacity
    pub fn clear(&mut self) {
        self.positions.clear();
        self.uvs.clear();
        self.colors.clear();
        self.normals.clear();
        self.tangents.clear();
    }
}

/// A widget's placement as seen by its geometry source
#[derive(Debug, Clone, Copy)]
pub struct WidgetQuad {
    /// Corners in panel space: bottom-left, top-left, top-right, bottom-right
    pub corners: [Vec3; 4],
    /// Tint with the cumulative alpha already applied
    pub color: Color32,
}

impl WidgetQuad {
    /// Point at normalized coordinates `(u, v)` across the quad
    pub fn lerp(&self, u: f32, v: f32) -> Vec3 {
        let [bl, tl, _, br] = self.corners;
        bl + (br - bl) * u + (tl - bl) * v
    }

    /// Width along the bottom edge
    pub fn width(&self) -> f32 {
        (self.corners[3] - self.corners[0]).norm()
    }

    /// Height along the left edge
    pub fn height(&self) -> f32 {
        (self.corners[1] - self.corners[0]).norm()
    }
}

/// Capability implemented by every kind of widget that produces geometry
pub trait WidgetGeometry: std::fmt::Debug {
    /// Write this widget's vertices into `buffers`
    fn emit_geometry(&self, quad: &WidgetQuad, buffers: &mut GeometryBuffers);
}

/// One textured quad
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteGeometry {
    /// UV of the bottom-left corner
    pub uv_min: Vec2,
    /// UV of the top-right corner
    pub uv_max: Vec2,
}

impl SpriteGeometry {
    /// Sprite covering the whole texture
    pub fn full() -> Self {
        Self {
            uv_min: Vec2::new(0.0, 0.0),
            uv_max: Vec2::new(1.0, 1.0),
        }
    }
}

impl Default for SpriteGeometry {
    fn default() -> Self {
        Self::full()
    }
}

impl WidgetGeometry for SpriteGeometry {
    fn emit_geometry(&self, quad: &WidgetQuad, buffers: &mut GeometryBuffers) {
        let uvs = [
            Vec2::new(self.uv_min.x, self.uv_min.y),
            Vec2::new(self.uv_min.x, self.uv_max.y),
            Vec2::new(self.uv_max.x, self.uv_max.y),
            Vec2::new(self.uv_max.x, self.uv_min.y),
        ];
        for (corner, uv) in quad.corners.iter().zip(uvs) {
            buffers.push_vertex(*corner, uv, quad.color);
        }
    }
}

/// Nine-slice sprite: fixed-size borders with a stretched center
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlicedGeometry {
    /// Border sizes in panel units: left, bottom, right, top
    pub border: Vec4,
    /// UV of the outer bottom-left corner
    pub uv_min: Vec2,
    /// UV of the outer top-right corner
    pub uv_max: Vec2,
    /// Border sizes in UV space: left, bottom, right, top
    pub uv_border: Vec4,
}

impl SlicedGeometry {
    /// Fractions along one axis, scaling both borders down if they overlap
    fn cuts(size: f32, lo: f32, hi: f32) -> [f32; 4] {
        if size <= f32::EPSILON {
            return [0.0, 0.0, 0.0, 0.0];
        }
        let total = lo + hi;
        let scale = if total > size { size / total } else { 1.0 };
        [0.0, lo * scale / size, 1.0 - hi * scale / size, 1.0]
    }
}

impl WidgetGeometry for SlicedGeometry {
    fn emit_geometry(&self, quad: &WidgetQuad, buffers: &mut GeometryBuffers) {
        let xs = Self::cuts(quad.width(), self.border.x, self.border.z);
        let ys = Self::cuts(quad.height(), self.border.y, self.border.w);

        let us = [
            self.uv_min.x,
            self.uv_min.x + self.uv_border.x,
            self.uv_max.x - self.uv_border.z,
            self.uv_max.x,
        ];
        let vs = [
            self.uv_min.y,
            self.uv_min.y + self.uv_border.y,
            self.uv_max.y - self.uv_border.w,
            self.uv_max.y,
        ];

        for row in 0..3 {
            for col in 0..3 {
                let cells = [(col, row), (col, row + 1), (col + 1, row + 1), (col + 1, row)];
                for (c, r) in cells {
                    buffers.push_vertex(quad.lerp(xs[c], ys[r]), Vec2::new(us[c], vs[r]), quad.color);
                }
            }
        }
    }
}
