//! Draw calls: one batched submission per run of compatible widgets

use super::clipping::Clipping;
use super::geometry::GeometryBuffers;
use super::material::BatchKey;
use super::panel::Panel;
use super::vertex::{quad_indices, UIVertex, UIVertexLit};
use crate::foundation::collections::PanelId;
use crate::foundation::math::{Vec2, Vec4};

/// A batched draw call.
///
/// Covers the inclusive depth range `[depth_start, depth_end]` of one
/// panel's widgets that share a [`BatchKey`]. Vertex data is in panel space.
#[derive(Debug, Clone)]
pub struct DrawCall {
    pub(crate) panel: PanelId,
    pub(crate) key: BatchKey,
    pub(crate) depth_start: i32,
    pub(crate) depth_end: i32,
    pub(crate) is_dirty: bool,
    pub(crate) clipping: Clipping,
    pub(crate) clip_region: Vec4,
    pub(crate) clip_softness: Vec2,
    pub(crate) layer: u32,
    pub(crate) render_queue: i32,
    pub(crate) always_on_screen: bool,
    pub(crate) buffers: GeometryBuffers,
    pub(crate) widget_count: usize,
}

impl DrawCall {
    /// Create an empty call for `panel` covering the single depth `depth`
    pub fn new(panel: PanelId, key: BatchKey, depth: i32) -> Self {
        Self {
            panel,
            key,
            depth_start: depth,
            depth_end: depth,
            is_dirty: false,
            clipping: Clipping::None,
            clip_region: Vec4::zeros(),
            clip_softness: Vec2::zeros(),
            layer: 0,
            render_queue: 0,
            always_on_screen: false,
            buffers: GeometryBuffers::new(),
            widget_count: 0,
        }
    }

    /// Owning panel
    pub fn panel(&self) -> PanelId {
        self.panel
    }

    /// Material / texture / shader shared by every widget in the call
    pub fn key(&self) -> BatchKey {
        self.key
    }

    /// Lowest widget depth covered
    pub fn depth_start(&self) -> i32 {
        self.depth_start
    }

    /// Highest widget depth covered
    pub fn depth_end(&self) -> i32 {
        self.depth_end
    }

    /// Whether the call will be refilled at the end of the frame
    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    /// Clip mode copied from the panel
    pub fn clipping(&self) -> Clipping {
        self.clipping
    }

    /// Final clip region copied from the panel
    pub fn clip_region(&self) -> Vec4 {
        self.clip_region
    }

    /// Soft-clip border copied from the panel
    pub fn clip_softness(&self) -> Vec2 {
        self.clip_softness
    }

    /// Render layer
    pub fn layer(&self) -> u32 {
        self.layer
    }

    /// Render queue ordinal
    pub fn render_queue(&self) -> i32 {
        self.render_queue
    }

    /// Backend hint that bounds need not be tracked
    pub fn always_on_screen(&self) -> bool {
        self.always_on_screen
    }

    /// Raw vertex streams
    pub fn buffers(&self) -> &GeometryBuffers {
        &self.buffers
    }

    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.buffers.vertex_count()
    }

    /// Number of widgets written at the last fill
    pub fn widget_count(&self) -> usize {
        self.widget_count
    }

    /// Whether `depth` lies inside `[depth_start, depth_end]`
    pub fn covers(&self, depth: i32) -> bool {
        depth >= self.depth_start && depth <= self.depth_end
    }

    /// Whether `depth` sits on either end of the range
    pub fn is_boundary(&self, depth: i32) -> bool {
        depth == self.depth_start || depth == self.depth_end
    }

    /// Grow the depth range to include `depth`
    pub(crate) fn extend_to(&mut self, depth: i32) {
        self.depth_start = self.depth_start.min(depth);
        self.depth_end = self.depth_end.max(depth);
    }

    /// Copy the scratch buffers into this call
    pub(crate) fn set(&mut self, scratch: &GeometryBuffers, widget_count: usize) {
        self.buffers.clone_from(scratch);
        self.widget_count = widget_count;
    }

    /// Take clip state, layer and the always-on-screen hint from the panel
    pub(crate) fn update_clip(&mut self, panel: &Panel) {
        self.clipping = panel.clipping();
        self.clip_region = panel.final_clip_region();
        self.clip_softness = panel.clip_softness();
        self.layer = panel.layer();
        self.always_on_screen = panel.always_on_screen();
    }

    /// Interleaved vertices for upload
    pub fn vertices(&self) -> Vec<UIVertex> {
        let b = &self.buffers;
        b.positions
            .iter()
            .zip(&b.uvs)
            .zip(&b.colors)
            .map(|((p, uv), c)| UIVertex {
                position: [p.x, p.y, p.z],
                uv: [uv.x, uv.y],
                color: c.to_array(),
            })
            .collect()
    }

    /// Interleaved vertices with normals and tangents, or `None` when the
    /// panel does not generate them
    pub fn lit_vertices(&self) -> Option<Vec<UIVertexLit>> {
        let b = &self.buffers;
        if b.normals.len() != b.positions.len() || b.positions.is_empty() {
            return None;
        }

        Some(
            b.positions
                .iter()
                .zip(&b.normals)
                .zip(&b.tangents)
                .zip(&b.uvs)
                .zip(&b.colors)
                .map(|((((p, n), t), uv), c)| UIVertexLit {
                    position: [p.x, p.y, p.z],
                    normal: [n.x, n.y, n.z],
                    tangent: [t.x, t.y, t.z, t.w],
                    uv: [uv.x, uv.y],
                    color: c.to_array(),
                })
                .collect(),
        )
    }

    /// Vertex data as raw bytes, ready for a GPU buffer
    pub fn upload_bytes(&self) -> Vec<u8> {
        match self.lit_vertices() {
            Some(lit) => bytemuck::cast_slice(&lit).to_vec(),
            None => bytemuck::cast_slice(&self.vertices()).to_vec(),
        }
    }

    /// Triangle indices for the vertex data
    pub fn indices(&self) -> Vec<u32> {
        quad_indices(self.vertex_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::ui::geometry::Color32;
    use crate::ui::material::MaterialId;
    use slotmap::KeyData;

    fn call() -> DrawCall {
        DrawCall::new(PanelId::from(KeyData::from_ffi(1)), BatchKey::material(MaterialId(1)), 5)
    }

    fn quad(buffers: &mut GeometryBuffers) {
        for (x, y) in [(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)] {
            buffers.push_vertex(Vec3::new(x, y, 0.0), Vec2::new(x, y), Color32::WHITE);
        }
    }

    #[test]
    fn test_depth_range_helpers() {
        let mut dc = call();
        assert!(dc.covers(5));
        assert!(dc.is_boundary(5));

        dc.extend_to(9);
        dc.extend_to(2);
        assert_eq!((dc.depth_start(), dc.depth_end()), (2, 9));
        assert!(dc.covers(7));
        assert!(!dc.is_boundary(7));
        assert!(dc.is_boundary(9));
        assert!(!dc.covers(10));
    }

    #[test]
    fn test_set_copies_scratch() {
        let mut scratch = GeometryBuffers::new();
        quad(&mut scratch);

        let mut dc = call();
        dc.set(&scratch, 1);
        scratch.clear();

        assert_eq!(dc.vertex_count(), 4);
        assert_eq!(dc.widget_count(), 1);
        assert_eq!(dc.indices(), vec![0, 1, 2, 2, 3, 0]);
    }

    #[test]
    fn test_upload_bytes_match_vertex_layout() {
        let mut scratch = GeometryBuffers::new();
        quad(&mut scratch);
        let mut dc = call();
        dc.set(&scratch, 1);

        assert!(dc.lit_vertices().is_none());
        assert_eq!(dc.upload_bytes().len(), 4 * std::mem::size_of::<UIVertex>());
        assert_eq!(dc.vertices()[2].position, [1.0, 1.0, 0.0]);

        scratch.clear();
        scratch.begin(true);
        quad(&mut scratch);
        dc.set(&scratch, 1);
        assert_eq!(dc.upload_bytes().len(), 4 * std::mem::size_of::<UIVertexLit>());
    }
}
