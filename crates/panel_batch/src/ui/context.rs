//! The UI context: owner of every panel, widget and draw call
//!
//! Everything the batcher touches lives here and is passed explicitly, so
//! independent UI worlds can coexist (one per test, for instance).

use super::clipping::{Clipping, RenderQueueMode};
use super::draw_call::DrawCall;
use super::geometry::{Color32, GeometryBuffers};
use super::material::{MaterialId, ShaderId, TextureId};
use super::panel::{compare_panels, Panel};
use super::registry::WidgetRegistry;
use super::scene::SceneTransforms;
use super::stats::{BatchStats, RebuildReason};
use super::widget::Widget;
use crate::config::BatcherConfig;
use crate::foundation::collections::{DrawCallId, DrawCallMap, InstanceCounter, PanelId, PanelMap, WidgetId};
use crate::foundation::math::{Vec2, Vec3, Vec4};
use crate::foundation::time::FrameClock;

/// UI system errors
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UIError {
    /// Panel id is not registered
    #[error("Unknown panel: {0:?}")]
    UnknownPanel(PanelId),

    /// Widget id is not registered
    #[error("Unknown widget: {0:?}")]
    UnknownWidget(WidgetId),

    /// A scene description referred to a panel name it never declared
    #[error("Unknown panel name: {0}")]
    UnknownPanelName(String),
}

/// Result type for UI operations
pub type UIResult<T> = Result<T, UIError>;

/// Owner of all batching state
#[derive(Debug)]
pub struct UIContext {
    pub(crate) config: BatcherConfig,
    pub(crate) panels: PanelMap<Panel>,
    /// Enabled panels sorted by depth, then instance id
    pub(crate) panel_order: Vec<PanelId>,
    pub(crate) registry: WidgetRegistry,
    pub(crate) draw_calls: DrawCallMap<DrawCall>,
    /// Live draw calls in panel order, then depth order
    pub(crate) active_draw_calls: Vec<DrawCallId>,
    pub(crate) scratch: GeometryBuffers,
    pub(crate) rebuild: RebuildReason,
    pub(crate) clock: FrameClock,
    pub(crate) stats: BatchStats,
    instance_ids: InstanceCounter,
}

impl Default for UIContext {
    fn default() -> Self {
        Self::new(BatcherConfig::default())
    }
}

impl UIContext {
    /// Create an empty context
    pub fn new(config: BatcherConfig) -> Self {
        log::debug!(
            "Creating UI context ({}x{}, base render queue {})",
            config.screen_width,
            config.screen_height,
            config.base_render_queue
        );
        Self {
            config,
            panels: PanelMap::with_key(),
            panel_order: Vec::new(),
            registry: WidgetRegistry::new(),
            draw_calls: DrawCallMap::with_key(),
            active_draw_calls: Vec::new(),
            scratch: GeometryBuffers::new(),
            rebuild: RebuildReason::empty(),
            clock: FrameClock::new(),
            stats: BatchStats::default(),
            instance_ids: InstanceCounter::new(),
        }
    }

    /// Configuration this context was built with
    pub fn config(&self) -> &BatcherConfig {
        &self.config
    }

    // ---------------------------------------------------------------------
    // Panels
    // ---------------------------------------------------------------------

    /// Register and enable a panel
    pub fn add_panel(&mut self, mut panel: Panel) -> PanelId {
        panel.instance_id = self.instance_ids.next_id();
        panel.screen_size = Vec2::new(self.config.screen_width, self.config.screen_height);
        panel.visibility_epsilon = self.config.visibility_epsilon;
        if self.config.generate_normals {
            panel.set_generate_normals(true);
        }
        panel.enabled = false;

        let id = self.panels.insert(panel);
        self.enable_panel(id);
        id
    }

    /// Disable and unregister a panel, destroying its widgets
    pub fn remove_panel(&mut self, id: PanelId) -> UIResult<Panel> {
        self.set_panel_enabled(id, false)?;

        for widget in self.registry.ids_for_panel(id) {
            self.registry.remove(widget);
        }
        self.registry.prune();

        self.panels.remove(id).ok_or(UIError::UnknownPanel(id))
    }

    /// Look up a panel
    pub fn panel(&self, id: PanelId) -> Option<&Panel> {
        self.panels.get(id)
    }

    /// Enabled panels in draw order
    pub fn panel_order(&self) -> &[PanelId] {
        &self.panel_order
    }

    /// Enable or disable a panel
    pub fn set_panel_enabled(&mut self, id: PanelId, enabled: bool) -> UIResult<()> {
        let panel = self.panels.get(id).ok_or(UIError::UnknownPanel(id))?;
        if panel.enabled == enabled {
            return Ok(());
        }
        if enabled {
            self.enable_panel(id);
        } else {
            self.disable_panel(id);
        }
        Ok(())
    }

    fn enable_panel(&mut self, id: PanelId) {
        if let Some(panel) = self.panels.get_mut(id) {
            panel.enabled = true;
            panel.invalidate_transform();
        }
        self.panel_order.push(id);
        self.sort_panels();
        self.request_rebuild(RebuildReason::PANEL_ENABLED);
    }

    fn disable_panel(&mut self, id: PanelId) {
        if let Some(panel) = self.panels.get_mut(id) {
            panel.enabled = false;
        }

        let owned: Vec<DrawCallId> = self
            .active_draw_calls
            .iter()
            .copied()
            .filter(|dc| self.draw_calls.get(*dc).is_some_and(|dc| dc.panel == id))
            .collect();
        for dc in owned {
            self.destroy_draw_call(dc);
        }

        self.panel_order.retain(|p| *p != id);
        if self.panel_order.is_empty() {
            self.release_all_draw_calls();
        }
        self.sort_widgets();
        log::debug!("Panel {:?} disabled; {} panels remain", id, self.panel_order.len());
    }

    /// Next depth that puts a new panel above every existing one
    pub fn next_unused_depth(&self) -> i32 {
        self.panels
            .values()
            .map(|p| p.depth().saturating_add(1))
            .max()
            .unwrap_or(0)
    }

    /// Change a panel's depth. Re-sorts panels and widgets and rebuilds
    /// every draw call.
    pub fn set_panel_depth(&mut self, id: PanelId, depth: i32) -> UIResult<()> {
        let panel = self.panels.get_mut(id).ok_or(UIError::UnknownPanel(id))?;
        if !panel.set_depth(depth) {
            return Ok(());
        }

        self.sort_panels();
        for widget in self.registry.widgets.values_mut() {
            widget.invalidate();
        }
        for dc in self.draw_calls.values_mut() {
            dc.is_dirty = true;
        }
        self.request_rebuild(RebuildReason::PANEL_DEPTH);
        Ok(())
    }

    /// Change a panel's alpha (clamped to 0..=1); dirties the panel on change
    pub fn set_panel_alpha(&mut self, id: PanelId, alpha: f32) -> UIResult<()> {
        let panel = self.panels.get_mut(id).ok_or(UIError::UnknownPanel(id))?;
        if panel.set_alpha(alpha) {
            self.set_panel_dirty(id)?;
        }
        Ok(())
    }

    /// Change a panel's clip mode; forces a rebuild on change
    pub fn set_panel_clipping(&mut self, id: PanelId, clipping: Clipping) -> UIResult<()> {
        let panel = self.panels.get_mut(id).ok_or(UIError::UnknownPanel(id))?;
        if panel.set_clipping(clipping) {
            self.request_rebuild(RebuildReason::CLIPPING_CHANGED);
        }
        Ok(())
    }

    /// Change a panel's base clip region (center xy, size zw)
    pub fn set_panel_clip_region(&mut self, id: PanelId, region: Vec4) -> UIResult<()> {
        let now = self.clock.now();
        let delay = self.config.cull_delay;
        let panel = self.panels.get_mut(id).ok_or(UIError::UnknownPanel(id))?;
        panel.set_base_clip_region(region, now, delay);
        Ok(())
    }

    /// Scroll a panel's clip region
    pub fn set_panel_clip_offset(&mut self, id: PanelId, offset: Vec2) -> UIResult<()> {
        let now = self.clock.now();
        let delay = self.config.cull_delay;
        let panel = self.panels.get_mut(id).ok_or(UIError::UnknownPanel(id))?;
        panel.set_clip_offset(offset, now, delay);
        Ok(())
    }

    /// Fit a panel's clip region to a rectangle given by its left, bottom,
    /// right and top edges in panel space
    pub fn fit_panel_clip(&mut self, id: PanelId, left: f32, bottom: f32, right: f32, top: f32) -> UIResult<()> {
        let now = self.clock.now();
        let delay = self.config.cull_delay;
        let panel = self.panels.get_mut(id).ok_or(UIError::UnknownPanel(id))?;
        panel.fit_clip_to(left, bottom, right, top, now, delay);
        Ok(())
    }

    /// Change a panel's soft-clip border
    pub fn set_panel_clip_softness(&mut self, id: PanelId, softness: Vec2) -> UIResult<()> {
        let panel = self.panels.get_mut(id).ok_or(UIError::UnknownPanel(id))?;
        panel.set_clip_softness(softness);
        Ok(())
    }

    /// Change a panel's render layer; copied to its draw calls next frame
    pub fn set_panel_layer(&mut self, id: PanelId, layer: u32) -> UIResult<()> {
        let panel = self.panels.get_mut(id).ok_or(UIError::UnknownPanel(id))?;
        panel.set_layer(layer);
        Ok(())
    }

    /// Change how a panel's draw calls get render queues
    pub fn set_panel_render_queue(&mut self, id: PanelId, mode: RenderQueueMode, starting_queue: i32) -> UIResult<()> {
        let panel = self.panels.get_mut(id).ok_or(UIError::UnknownPanel(id))?;
        panel.set_render_queue(mode, starting_queue);
        Ok(())
    }

    /// Toggle normal/tangent generation; refills the panel on change
    pub fn set_panel_generate_normals(&mut self, id: PanelId, generate: bool) -> UIResult<()> {
        let panel = self.panels.get_mut(id).ok_or(UIError::UnknownPanel(id))?;
        if panel.set_generate_normals(generate) {
            self.set_panel_dirty(id)?;
        }
        Ok(())
    }

    /// Invalidate every widget of a panel and mark its draw calls dirty
    pub fn set_panel_dirty(&mut self, id: PanelId) -> UIResult<()> {
        if !self.panels.contains_key(id) {
            return Err(UIError::UnknownPanel(id));
        }
        for dc in self.draw_calls.values_mut().filter(|dc| dc.panel == id) {
            dc.is_dirty = true;
        }
        self.invalidate_panel_widgets(id);
        Ok(())
    }

    pub(crate) fn invalidate_panel_widgets(&mut self, id: PanelId) {
        for widget in self.registry.widgets.values_mut().filter(|w| w.panel == id) {
            widget.invalidate();
        }
    }

    /// Whether a world-space point is inside a panel's clip bounds, using
    /// this frame's transform from `scene`
    pub fn is_visible_point(&mut self, id: PanelId, point: &Vec3, scene: &dyn SceneTransforms) -> UIResult<bool> {
        let frame = self.clock.frame();
        let panel = self.panels.get_mut(id).ok_or(UIError::UnknownPanel(id))?;
        let moved = panel.update_transform(frame, &scene.panel_to_world(id));
        let visible = panel.is_visible_point(point);
        // The cached transform is now current, so the frame loop will not see this move
        if moved {
            self.invalidate_panel_widgets(id);
        }
        Ok(visible)
    }

    /// Offset that moves `[min, max]` (panel space) inside the panel's clip region
    pub fn calculate_constrain_offset(&self, id: PanelId, min: Vec2, max: Vec2) -> UIResult<Vec2> {
        let panel = self.panels.get(id).ok_or(UIError::UnknownPanel(id))?;
        Ok(panel.calculate_constrain_offset(min, max))
    }

    // ---------------------------------------------------------------------
    // Widgets
    // ---------------------------------------------------------------------

    /// Register a widget under its panel
    pub fn add_widget(&mut self, mut widget: Widget) -> UIResult<WidgetId> {
        if !self.panels.contains_key(widget.panel) {
            return Err(UIError::UnknownPanel(widget.panel));
        }
        widget.draw_call = None;
        widget.is_visible = false;
        widget.invalidate();

        let id = self.registry.insert(widget);
        self.sort_widgets();
        Ok(id)
    }

    /// Detach a widget from its draw call and unregister it
    pub fn destroy_widget(&mut self, id: WidgetId) -> UIResult<Widget> {
        self.remove_widget(id)?;
        self.registry.remove(id).ok_or(UIError::UnknownWidget(id))
    }

    /// Look up a widget
    pub fn widget(&self, id: WidgetId) -> Option<&Widget> {
        self.registry.get(id)
    }

    /// Live widgets in batching order
    pub fn widget_order(&self) -> Vec<WidgetId> {
        self.registry.iter_ordered().map(|(id, _)| id).collect()
    }

    /// Number of live widgets
    pub fn widget_count(&self) -> usize {
        self.registry.len()
    }

    /// Enable or disable a widget. Disabled widgets leave their draw call.
    pub fn set_widget_enabled(&mut self, id: WidgetId, enabled: bool) -> UIResult<()> {
        let widget = self.registry.get(id).ok_or(UIError::UnknownWidget(id))?;
        if widget.enabled == enabled {
            return Ok(());
        }
        if !enabled {
            self.remove_widget(id)?;
        }
        let widget = self.widget_mut(id)?;
        widget.enabled = enabled;
        widget.is_visible = false;
        widget.invalidate();
        Ok(())
    }

    /// Move a widget to another depth
    pub fn set_widget_depth(&mut self, id: WidgetId, depth: i32) -> UIResult<()> {
        if self.widget_ref(id)?.depth == depth {
            return Ok(());
        }
        self.rekey_widget(id, |w| w.depth = depth)
    }

    /// Change a widget's material
    pub fn set_widget_material(&mut self, id: WidgetId, material: Option<MaterialId>) -> UIResult<()> {
        if self.widget_ref(id)?.key.material == material {
            return Ok(());
        }
        self.rekey_widget(id, |w| w.key.material = material)
    }

    /// Change a widget's main texture
    pub fn set_widget_texture(&mut self, id: WidgetId, texture: Option<TextureId>) -> UIResult<()> {
        if self.widget_ref(id)?.key.texture == texture {
            return Ok(());
        }
        self.rekey_widget(id, |w| w.key.texture = texture)
    }

    /// Change a widget's shader
    pub fn set_widget_shader(&mut self, id: WidgetId, shader: Option<ShaderId>) -> UIResult<()> {
        if self.widget_ref(id)?.key.shader == shader {
            return Ok(());
        }
        self.rekey_widget(id, |w| w.key.shader = shader)
    }

    /// Detach, apply `edit`, re-sort and invalidate. The widget is
    /// re-inserted on the next frame.
    fn rekey_widget(&mut self, id: WidgetId, edit: impl FnOnce(&mut Widget)) -> UIResult<()> {
        self.remove_widget(id)?;
        let widget = self.widget_mut(id)?;
        edit(widget);
        widget.is_visible = false;
        widget.invalidate();
        self.sort_widgets();
        Ok(())
    }

    /// Change a widget's own alpha (clamped to 0..=1)
    pub fn set_widget_alpha(&mut self, id: WidgetId, alpha: f32) -> UIResult<()> {
        let widget = self.widget_mut(id)?;
        let alpha = alpha.clamp(0.0, 1.0);
        if widget.alpha != alpha {
            widget.alpha = alpha;
            widget.invalidate();
        }
        Ok(())
    }

    /// Change a widget's tint
    pub fn set_widget_color(&mut self, id: WidgetId, color: Color32) -> UIResult<()> {
        let widget = self.widget_mut(id)?;
        if widget.color != color {
            widget.color = color;
            widget.invalidate();
        }
        Ok(())
    }

    /// Move a widget: new world-space corners
    pub fn set_widget_corners(&mut self, id: WidgetId, corners: [Vec3; 4]) -> UIResult<()> {
        let widget = self.widget_mut(id)?;
        if widget.corners != corners {
            widget.corners = corners;
            widget.invalidate();
        }
        Ok(())
    }

    /// Toggle culling against the screen for unclipped panels
    pub fn set_widget_hide_if_off_screen(&mut self, id: WidgetId, hide: bool) -> UIResult<()> {
        let widget = self.widget_mut(id)?;
        widget.hide_if_off_screen = hide;
        Ok(())
    }

    fn widget_ref(&self, id: WidgetId) -> UIResult<&Widget> {
        self.registry.get(id).ok_or(UIError::UnknownWidget(id))
    }

    fn widget_mut(&mut self, id: WidgetId) -> UIResult<&mut Widget> {
        self.registry.get_mut(id).ok_or(UIError::UnknownWidget(id))
    }

    // ---------------------------------------------------------------------
    // Draw calls
    // ---------------------------------------------------------------------

    /// Live draw calls in submission order
    pub fn draw_calls(&self) -> impl Iterator<Item = (DrawCallId, &DrawCall)> {
        self.active_draw_calls
            .iter()
            .filter_map(move |&id| self.draw_calls.get(id).map(|dc| (id, dc)))
    }

    /// Look up a draw call
    pub fn draw_call(&self, id: DrawCallId) -> Option<&DrawCall> {
        self.draw_calls.get(id)
    }

    /// Number of live draw calls
    pub fn draw_call_count(&self) -> usize {
        self.active_draw_calls.len()
    }

    /// Number of live draw calls owned by `panel`
    pub fn panel_draw_call_count(&self, panel: PanelId) -> usize {
        self.draw_calls().filter(|(_, dc)| dc.panel == panel).count()
    }

    /// Draw calls of one panel in ascending depth order
    pub(crate) fn panel_draw_calls(&self, panel: PanelId) -> Vec<DrawCallId> {
        self.draw_calls()
            .filter(|(_, dc)| dc.panel == panel)
            .map(|(id, _)| id)
            .collect()
    }

    /// Force a full rebuild on the next frame
    pub fn rebuild_all_draw_calls(&mut self) {
        self.request_rebuild(RebuildReason::EXPLICIT);
    }

    /// Whether a full rebuild is pending
    pub fn needs_rebuild(&self) -> bool {
        !self.rebuild.is_empty()
    }

    /// Reasons accumulated for the pending rebuild
    pub fn pending_rebuild(&self) -> RebuildReason {
        self.rebuild
    }

    pub(crate) fn request_rebuild(&mut self, reason: RebuildReason) {
        if !self.rebuild.contains(reason) {
            log::debug!("Draw call rebuild requested: {:?}", reason);
        }
        self.rebuild |= reason;
    }

    /// Batching counters
    pub fn stats(&self) -> &BatchStats {
        &self.stats
    }

    /// Current frame number
    pub fn frame(&self) -> u64 {
        self.clock.frame()
    }

    // ---------------------------------------------------------------------
    // Ordering
    // ---------------------------------------------------------------------

    fn sort_panels(&mut self) {
        let panels = &self.panels;
        self.panel_order.sort_by(|a, b| compare_panels(&panels[*a], &panels[*b]));
        self.sort_widgets();
    }

    pub(crate) fn sort_widgets(&mut self) {
        let order = &self.panel_order;
        self.registry.sort(|p| order.iter().position(|x| *x == p));
    }
}
