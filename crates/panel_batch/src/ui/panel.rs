//! Panels: clip regions that own a slice of the draw order
//!
//! A panel caches its world-to-local matrix and the min/max of its clip
//! region once per frame. Visibility queries read those cached bounds, so
//! the frame loop refreshes every panel before it evaluates any widget.

use std::cmp::Ordering;

use approx::abs_diff_eq;

use super::clipping::{Clipping, RenderQueueMode};
use super::widget::Widget;
use crate::foundation::math::{constrain_rect, transform_point, xy_extent, Mat4, Vec2, Vec3, Vec4};

/// Smallest change to a clip region or offset that counts as a move
pub const CLIP_EPSILON: f32 = 0.001;

/// Smallest clip size `fit_clip_to` will produce, before softness
pub const MIN_CLIP_SIZE: f32 = 20.0;

/// A clip/draw-order grouping of widgets
#[derive(Debug, Clone)]
pub struct Panel {
    pub(crate) instance_id: u64,
    pub(crate) enabled: bool,
    alpha: f32,
    clipping: Clipping,
    clip_range: Vec4,
    clip_softness: Vec2,
    clip_offset: Vec2,
    depth: i32,
    render_queue: RenderQueueMode,
    starting_render_queue: i32,
    generate_normals: bool,
    always_on_screen: bool,
    cull_while_dragging: bool,
    layer: u32,
    applied_layer: Option<u32>,

    // Frame cache
    world_to_local: Mat4,
    matrix_frame: Option<u64>,
    min: Vec2,
    max: Vec2,
    cull_time: f32,
    update_time: f32,

    // Copied from the context's config when the panel is added
    pub(crate) screen_size: Vec2,
    pub(crate) visibility_epsilon: f32,
}

impl Default for Panel {
    fn default() -> Self {
        Self::new()
    }
}

impl Panel {
    /// A fully opaque, unclipped panel at depth 0
    pub fn new() -> Self {
        Self {
            instance_id: 0,
            enabled: false,
            alpha: 1.0,
            clipping: Clipping::None,
            clip_range: Vec4::new(0.0, 0.0, 300.0, 200.0),
            clip_softness: Vec2::new(4.0, 4.0),
            clip_offset: Vec2::zeros(),
            depth: 0,
            render_queue: RenderQueueMode::Automatic,
            starting_render_queue: 3000,
            generate_normals: false,
            always_on_screen: false,
            cull_while_dragging: false,
            layer: 0,
            applied_layer: None,
            world_to_local: Mat4::identity(),
            matrix_frame: None,
            min: Vec2::zeros(),
            max: Vec2::zeros(),
            cull_time: 0.0,
            update_time: 0.0,
            screen_size: Vec2::new(1280.0, 720.0),
            visibility_epsilon: 0.001,
        }
    }

    /// Builder: depth
    #[must_use]
    pub fn with_depth(mut self, depth: i32) -> Self {
        self.depth = depth;
        self
    }

    /// Builder: clip mode and region (center x, center y, width, height)
    #[must_use]
    pub fn with_clipping(mut self, clipping: Clipping, region: Vec4) -> Self {
        self.clipping = clipping;
        self.clip_range = region;
        self
    }

    /// Builder: soft-clip border
    #[must_use]
    pub fn with_softness(mut self, softness: Vec2) -> Self {
        self.clip_softness = softness;
        self
    }

    /// Builder: alpha
    #[must_use]
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha.clamp(0.0, 1.0);
        self
    }

    /// Builder: render queue assignment
    #[must_use]
    pub fn with_render_queue(mut self, mode: RenderQueueMode, starting_queue: i32) -> Self {
        self.render_queue = mode;
        self.starting_render_queue = starting_queue;
        self
    }

    /// Builder: write normals and tangents for every vertex
    #[must_use]
    pub fn with_generate_normals(mut self, generate: bool) -> Self {
        self.generate_normals = generate;
        self
    }

    /// Builder: keep culling while the clip region is being dragged
    #[must_use]
    pub fn with_cull_while_dragging(mut self, cull: bool) -> Self {
        self.cull_while_dragging = cull;
        self
    }

    /// Builder: assume geometry is always on screen (skips bounds upkeep in the backend)
    #[must_use]
    pub fn with_always_on_screen(mut self, always: bool) -> Self {
        self.always_on_screen = always;
        self
    }

    /// Builder: render layer
    #[must_use]
    pub fn with_layer(mut self, layer: u32) -> Self {
        self.layer = layer;
        self
    }

    /// Whether the panel is in the active list
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Stable identity used to break depth ties
    pub fn instance_id(&self) -> u64 {
        self.instance_id
    }

    /// Own alpha
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Alpha applied to every widget (panels do not nest here)
    pub fn final_alpha(&self) -> f32 {
        self.alpha
    }

    /// Clip mode
    pub fn clipping(&self) -> Clipping {
        self.clipping
    }

    /// Clip region before the offset: center xy, size zw
    pub fn base_clip_region(&self) -> Vec4 {
        self.clip_range
    }

    /// Soft-clip border
    pub fn clip_softness(&self) -> Vec2 {
        self.clip_softness
    }

    /// Scroll offset applied to the clip region
    pub fn clip_offset(&self) -> Vec2 {
        self.clip_offset
    }

    /// Draw order among panels
    pub fn depth(&self) -> i32 {
        self.depth
    }

    /// Render queue assignment mode
    pub fn render_queue(&self) -> RenderQueueMode {
        self.render_queue
    }

    /// Queue used by `StartAt` and `Explicit` modes
    pub fn starting_render_queue(&self) -> i32 {
        self.starting_render_queue
    }

    /// Whether normals and tangents are generated
    pub fn generate_normals(&self) -> bool {
        self.generate_normals
    }

    /// Whether the always-on-screen hint applies to this panel's draw calls
    pub fn always_on_screen(&self) -> bool {
        self.always_on_screen
            && matches!(self.clipping, Clipping::None | Clipping::ConstrainButDontClip)
    }

    /// Render layer
    pub fn layer(&self) -> u32 {
        self.layer
    }

    /// World-to-local matrix as of the last transform update
    pub fn world_to_local(&self) -> &Mat4 {
        &self.world_to_local
    }

    /// Clip bounds in panel space as of the last transform update
    pub fn clip_bounds(&self) -> (Vec2, Vec2) {
        (self.min, self.max)
    }

    /// Size of the area the panel draws into: the clip size when
    /// clipping, the screen otherwise
    pub fn view_size(&self) -> Vec2 {
        if self.clipping.has_region() {
            Vec2::new(self.clip_range.z, self.clip_range.w)
        } else {
            self.screen_size
        }
    }

    /// Clip region after the offset has been applied
    pub fn final_clip_region(&self) -> Vec4 {
        let size = self.view_size();
        if self.clipping.has_region() {
            Vec4::new(
                self.clip_range.x + self.clip_offset.x,
                self.clip_range.y + self.clip_offset.y,
                size.x,
                size.y,
            )
        } else {
            Vec4::new(0.0, 0.0, size.x, size.y)
        }
    }

    /// Panel-space corners of the clip rectangle: bottom-left, top-left,
    /// top-right, bottom-right. Unclipped panels report the screen
    /// centered on the origin.
    pub fn local_corners(&self) -> [Vec3; 4] {
        let region = self.final_clip_region();
        let x0 = region.x - 0.5 * region.z;
        let y0 = region.y - 0.5 * region.w;
        let x1 = x0 + region.z;
        let y1 = y0 + region.w;
        [
            Vec3::new(x0, y0, 0.0),
            Vec3::new(x0, y1, 0.0),
            Vec3::new(x1, y1, 0.0),
            Vec3::new(x1, y0, 0.0),
        ]
    }

    /// Offset needed to move `[min, max]` (panel space) inside the clip
    /// region, which is shrunk by the softness border for `SoftClip`.
    pub fn calculate_constrain_offset(&self, min: Vec2, max: Vec2) -> Vec2 {
        let region = self.final_clip_region();
        let half = Vec2::new(region.z * 0.5, region.w * 0.5);

        let mut min_area = Vec2::new(region.x, region.y) - half;
        let mut max_area = Vec2::new(region.x, region.y) + half;

        if self.clipping == Clipping::SoftClip {
            min_area += self.clip_softness;
            max_area -= self.clip_softness;
        }

        constrain_rect(min, max, min_area, max_area)
    }

    /// Recompute the cached world-to-local matrix and clip bounds.
    ///
    /// Memoized on `frame`; calling again in the same frame is a no-op.
    /// Returns true when the world-to-local matrix moved, which means every
    /// widget's panel-space geometry is stale.
    pub fn update_transform(&mut self, frame: u64, local_to_world: &Mat4) -> bool {
        if self.matrix_frame == Some(frame) {
            return false;
        }
        self.matrix_frame = Some(frame);

        let world_to_local = local_to_world.try_inverse().unwrap_or_else(|| {
            log::warn!("Panel {} has a singular transform; using identity", self.instance_id);
            Mat4::identity()
        });
        let moved = !abs_diff_eq!(world_to_local, self.world_to_local, epsilon = 1e-6);
        self.world_to_local = world_to_local;

        let half = self.view_size() * 0.5;
        let x = self.clip_offset.x + self.clip_range.x;
        let y = self.clip_offset.y + self.clip_range.y;

        self.min = Vec2::new(x - half.x, y - half.y);
        self.max = Vec2::new(x + half.x, y + half.y);

        moved
    }

    /// Forget the memoized transform so the next update recomputes it
    pub(crate) fn invalidate_transform(&mut self) {
        self.matrix_frame = None;
    }

    /// Whether a world-space point lies inside the clip bounds
    pub fn is_visible_point(&self, world_pos: &Vec3) -> bool {
        if self.alpha < self.visibility_epsilon {
            return false;
        }
        if !self.clipping.has_region() {
            return true;
        }

        let pos = transform_point(&self.world_to_local, world_pos);
        pos.x >= self.min.x && pos.y >= self.min.y && pos.x <= self.max.x && pos.y <= self.max.y
    }

    /// Whether a world-space quad overlaps the clip bounds
    pub fn is_visible_quad(&self, corners: &[Vec3; 4]) -> bool {
        if self.alpha < self.visibility_epsilon {
            return false;
        }
        if !self.clipping.has_region() {
            return true;
        }

        self.overlaps(corners, self.min, self.max)
    }

    /// Whether a widget overlaps the clip bounds. Widgets that hide when
    /// off screen are tested against the screen rectangle when the panel
    /// does not clip.
    pub fn is_visible_widget(&self, widget: &Widget) -> bool {
        if widget.hide_if_off_screen && !self.clipping.has_region() {
            if self.alpha < self.visibility_epsilon {
                return false;
            }
            let half = self.screen_size * 0.5;
            return self.overlaps(&widget.corners, -half, half);
        }
        self.is_visible_quad(&widget.corners)
    }

    fn overlaps(&self, corners: &[Vec3; 4], min: Vec2, max: Vec2) -> bool {
        let local = corners.map(|c| transform_point(&self.world_to_local, &c));
        let (lo, hi) = xy_extent(&local);

        !(hi.x < min.x || hi.y < min.y || lo.x > max.x || lo.y > max.y)
    }

    /// Whether widgets are currently forced visible because the clip region
    /// moved recently
    pub fn force_visible(&self) -> bool {
        !self.cull_while_dragging && self.cull_time > self.update_time
    }

    pub(crate) fn set_update_time(&mut self, now: f32) {
        self.update_time = now;
    }

    /// The first move only nudges the deadline; later moves hold culling
    /// off for `delay` seconds.
    fn start_cull_delay(&mut self, now: f32, delay: f32) {
        self.cull_time = if self.cull_time == 0.0 { 0.001 } else { now + delay };
    }

    pub(crate) fn set_alpha(&mut self, alpha: f32) -> bool {
        let alpha = alpha.clamp(0.0, 1.0);
        if abs_diff_eq!(self.alpha, alpha) {
            return false;
        }
        self.alpha = alpha;
        true
    }

    pub(crate) fn set_depth(&mut self, depth: i32) -> bool {
        if self.depth == depth {
            return false;
        }
        self.depth = depth;
        true
    }

    pub(crate) fn set_clipping(&mut self, clipping: Clipping) -> bool {
        if self.clipping == clipping {
            return false;
        }
        self.clipping = clipping;
        self.invalidate_transform();
        true
    }

    pub(crate) fn set_clip_offset(&mut self, offset: Vec2, now: f32, cull_delay: f32) -> bool {
        if abs_diff_eq!(self.clip_offset, offset, epsilon = CLIP_EPSILON) {
            return false;
        }
        self.start_cull_delay(now, cull_delay);
        self.clip_offset = offset;
        self.invalidate_transform();
        true
    }

    pub(crate) fn set_base_clip_region(&mut self, region: Vec4, now: f32, cull_delay: f32) -> bool {
        if abs_diff_eq!(self.clip_range, region, epsilon = CLIP_EPSILON) {
            return false;
        }
        self.start_cull_delay(now, cull_delay);
        self.clip_range = region;
        self.invalidate_transform();
        true
    }

    pub(crate) fn set_clip_softness(&mut self, softness: Vec2) -> bool {
        if self.clip_softness == softness {
            return false;
        }
        self.clip_softness = softness;
        true
    }

    pub(crate) fn set_render_queue(&mut self, mode: RenderQueueMode, starting_queue: i32) {
        self.render_queue = mode;
        self.starting_render_queue = starting_queue;
    }

    pub(crate) fn set_generate_normals(&mut self, generate: bool) -> bool {
        let changed = self.generate_normals != generate;
        self.generate_normals = generate;
        changed
    }

    pub(crate) fn set_layer(&mut self, layer: u32) {
        self.layer = layer;
    }

    /// Record the current layer as applied; true when it changed since the
    /// last call
    pub(crate) fn sync_layer(&mut self) -> bool {
        if self.applied_layer == Some(self.layer) {
            return false;
        }
        self.applied_layer = Some(self.layer);
        true
    }

    /// Fit the clip region to a panel-space rectangle given by its left,
    /// bottom, right and top edges (used by anchoring). The size never
    /// drops below [`MIN_CLIP_SIZE`] or the softness.
    pub(crate) fn fit_clip_to(&mut self, left: f32, bottom: f32, right: f32, top: f32, now: f32, cull_delay: f32) -> bool {
        if !self.clipping.has_region() {
            return false;
        }

        let l = left - self.clip_offset.x;
        let r = right - self.clip_offset.x;
        let b = bottom - self.clip_offset.y;
        let t = top - self.clip_offset.y;

        let w = (r - l).max(MIN_CLIP_SIZE.max(self.clip_softness.x));
        let h = (t - b).max(MIN_CLIP_SIZE.max(self.clip_softness.y));

        let region = Vec4::new((l + r) * 0.5, (b + t) * 0.5, w, h);
        self.set_base_clip_region(region, now, cull_delay)
    }
}

/// Panel draw order: depth ascending, ties broken by instance id
pub fn compare_panels(a: &Panel, b: &Panel) -> Ordering {
    a.depth
        .cmp(&b.depth)
        .then_with(|| a.instance_id.cmp(&b.instance_id))
}
