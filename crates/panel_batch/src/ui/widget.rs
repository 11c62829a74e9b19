//! Widgets: the visual leaves that get batched into draw calls

use super::geometry::{Color32, SpriteGeometry, WidgetGeometry, WidgetQuad};
use super::material::{BatchKey, MaterialId, ShaderId, TextureId};
use crate::foundation::collections::{DrawCallId, PanelId};
use crate::foundation::math::{transform_point, Mat4, Vec3};

/// A single UI widget.
///
/// Built with the `with_*` methods and then handed to
/// [`UIContext::add_widget`](crate::ui::UIContext::add_widget); after that
/// every change goes through the context so batching stays consistent.
#[derive(Debug)]
pub struct Widget {
    pub(crate) panel: PanelId,
    pub(crate) depth: i32,
    pub(crate) key: BatchKey,
    pub(crate) enabled: bool,
    pub(crate) alpha: f32,
    pub(crate) cumulative_alpha: f32,
    pub(crate) color: Color32,
    pub(crate) hide_if_off_screen: bool,
    pub(crate) corners: [Vec3; 4],
    pub(crate) is_visible: bool,
    pub(crate) geometry_changed: bool,
    pub(crate) draw_call: Option<DrawCallId>,
    pub(crate) geometry: Box<dyn WidgetGeometry>,
}

impl Widget {
    /// Create a widget under `panel` drawing a full-texture sprite
    pub fn new(panel: PanelId, depth: i32) -> Self {
        Self {
            panel,
            depth,
            key: BatchKey::default(),
            enabled: true,
            alpha: 1.0,
            cumulative_alpha: 1.0,
            color: Color32::WHITE,
            hide_if_off_screen: false,
            corners: rect_corners(0.0, 0.0, 100.0, 100.0),
            is_visible: false,
            geometry_changed: true,
            draw_call: None,
            geometry: Box::new(SpriteGeometry::full()),
        }
    }

    /// Builder: material
    #[must_use]
    pub fn with_material(mut self, material: MaterialId) -> Self {
        self.key.material = Some(material);
        self
    }

    /// Builder: main texture
    #[must_use]
    pub fn with_texture(mut self, texture: TextureId) -> Self {
        self.key.texture = Some(texture);
        self
    }

    /// Builder: shader
    #[must_use]
    pub fn with_shader(mut self, shader: ShaderId) -> Self {
        self.key.shader = Some(shader);
        self
    }

    /// Builder: whole batch key at once
    #[must_use]
    pub fn with_key(mut self, key: BatchKey) -> Self {
        self.key = key;
        self
    }

    /// Builder: axis-aligned world rectangle (bottom-left origin)
    #[must_use]
    pub fn with_rect(mut self, x: f32, y: f32, width: f32, height: f32) -> Self {
        self.corners = rect_corners(x, y, width, height);
        self
    }

    /// Builder: explicit world corners (bottom-left, top-left, top-right, bottom-right)
    #[must_use]
    pub fn with_corners(mut self, corners: [Vec3; 4]) -> Self {
        self.corners = corners;
        self
    }

    /// Builder: tint
    #[must_use]
    pub fn with_color(mut self, color: Color32) -> Self {
        self.color = color;
        self
    }

    /// Builder: own alpha
    #[must_use]
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha.clamp(0.0, 1.0);
        self
    }

    /// Builder: cull even when the panel does not clip
    #[must_use]
    pub fn hide_if_off_screen(mut self, hide: bool) -> Self {
        self.hide_if_off_screen = hide;
        self
    }

    /// Builder: geometry source
    #[must_use]
    pub fn with_geometry(mut self, geometry: impl WidgetGeometry + 'static) -> Self {
        self.geometry = Box::new(geometry);
        self
    }

    /// Owning panel
    pub fn panel(&self) -> PanelId {
        self.panel
    }

    /// Depth inside the panel (draw order and raycast priority)
    pub fn depth(&self) -> i32 {
        self.depth
    }

    /// Material / texture / shader identity
    pub fn key(&self) -> BatchKey {
        self.key
    }

    /// Whether the widget is active
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Own alpha
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Own alpha times the panel's final alpha, as of the last update
    pub fn cumulative_alpha(&self) -> f32 {
        self.cumulative_alpha
    }

    /// Tint
    pub fn color(&self) -> Color32 {
        self.color
    }

    /// World-space corners
    pub fn corners(&self) -> &[Vec3; 4] {
        &self.corners
    }

    /// Visibility as of the last update
    pub fn is_visible(&self) -> bool {
        self.is_visible
    }

    /// Whether geometry must be rewritten at the next fill
    pub fn is_geometry_dirty(&self) -> bool {
        self.geometry_changed
    }

    /// Draw call currently holding this widget's geometry
    pub fn draw_call(&self) -> Option<DrawCallId> {
        self.draw_call
    }

    /// Flag the geometry as stale
    pub(crate) fn invalidate(&mut self) {
        self.geometry_changed = true;
    }

    /// Apply this frame's visibility. Returns true when the widget's draw
    /// call needs refilling: visibility flipped, or it is visible with
    /// stale geometry.
    pub(crate) fn update_geometry(&mut self, visible: bool) -> bool {
        let visibility_changed = self.is_visible != visible;
        self.is_visible = visible;

        if !visible {
            return visibility_changed;
        }

        let changed = visibility_changed || self.geometry_changed;
        self.geometry_changed = false;
        changed
    }

    /// Write geometry into `buffers`, in the space given by `world_to_local`
    pub(crate) fn write_to_buffers(&self, world_to_local: &Mat4, buffers: &mut super::GeometryBuffers) {
        let quad = WidgetQuad {
            corners: self.corners.map(|c| transform_point(world_to_local, &c)),
            color: self.color.scale_alpha(self.cumulative_alpha),
        };
        self.geometry.emit_geometry(&quad, buffers);
    }
}

/// Corners of an axis-aligned rectangle at z = 0
pub fn rect_corners(x: f32, y: f32, width: f32, height: f32) -> [Vec3; 4] {
    [
        Vec3::new(x, y, 0.0),
        Vec3::new(x, y + height, 0.0),
        Vec3::new(x + width, y + height, 0.0),
        Vec3::new(x + width, y, 0.0),
    ]
}
