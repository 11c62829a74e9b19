//! Per-frame update loop
//!
//! One pass per frame, in this order:
//!
//! 1. Every enabled panel refreshes its transform and clip bounds, then
//!    re-evaluates its widgets' visibility and geometry. Changed widgets
//!    dirty their draw call, or try to join one if they have none.
//! 2. A pending rebuild refills everything; otherwise only dirty draw
//!    calls are refilled, and calls left empty are destroyed.
//! 3. Clip state, layers and render queues are pushed to every call.

use super::clipping::RenderQueueMode;
use super::context::UIContext;
use super::scene::SceneTransforms;
use super::stats::RebuildReason;
use crate::foundation::collections::{DrawCallId, PanelId, WidgetId};

/// What happened during one frame
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Frame number
    pub frame: u64,
    /// Whether every draw call was rebuilt
    pub rebuilt: bool,
    /// Why the rebuild was requested (empty when not rebuilt)
    pub rebuild_reasons: RebuildReason,
    /// Draw calls refilled incrementally
    pub filled: usize,
    /// Draw calls destroyed because they were left empty
    pub destroyed: usize,
    /// Panels with at least one widget whose visibility or geometry changed
    pub changed_panels: Vec<PanelId>,
    /// Live draw calls at the end of the frame
    pub draw_call_count: usize,
}

impl UIContext {
    /// Run one frame at real time `now` (seconds)
    pub fn update(&mut self, scene: &dyn SceneTransforms, now: f32) -> FrameReport {
        let frame = self.clock.begin_frame(now);
        let order = self.panel_order.clone();

        let mut changed_panels = Vec::new();
        for &panel in &order {
            self.update_panel_transform(panel, frame, scene);
            self.update_layer(panel);
            if self.update_widgets(panel, now) {
                changed_panels.push(panel);
            }
        }

        let rebuild_reasons = self.rebuild;
        let rebuilt = !rebuild_reasons.is_empty();
        let mut filled = 0;
        let mut destroyed = 0;

        if rebuilt {
            self.rebuild = RebuildReason::empty();
            self.fill_all();
        } else {
            let dirty: Vec<DrawCallId> = self
                .draw_calls()
                .filter(|(_, dc)| dc.is_dirty())
                .map(|(id, _)| id)
                .collect();
            for dc in dirty {
                if self.fill_one(dc) {
                    filled += 1;
                } else {
                    self.destroy_draw_call(dc);
                    destroyed += 1;
                }
            }
        }

        self.update_clip_state();

        let report = FrameReport {
            frame,
            rebuilt,
            rebuild_reasons,
            filled,
            destroyed,
            changed_panels,
            draw_call_count: self.draw_call_count(),
        };
        if rebuilt || filled > 0 || destroyed > 0 {
            log::trace!("{:?}", report);
        }
        report
    }

    /// Run the frame only when `panel` is the first in draw order. Lets
    /// every panel call this each frame while the work happens once.
    pub fn late_update(&mut self, panel: PanelId, scene: &dyn SceneTransforms, now: f32) -> Option<FrameReport> {
        if self.panel_order.first() != Some(&panel) {
            return None;
        }
        Some(self.update(scene, now))
    }

    /// Request a rebuild and run a frame immediately
    pub fn refresh(&mut self, scene: &dyn SceneTransforms, now: f32) -> FrameReport {
        self.request_rebuild(RebuildReason::EXPLICIT);
        self.update(scene, now)
    }

    fn update_panel_transform(&mut self, id: PanelId, frame: u64, scene: &dyn SceneTransforms) {
        let local_to_world = scene.panel_to_world(id);
        let moved = match self.panels.get_mut(id) {
            Some(panel) => panel.update_transform(frame, &local_to_world),
            None => return,
        };
        // Vertex data is in panel space, so every widget must be rewritten
        if moved {
            self.invalidate_panel_widgets(id);
        }
    }

    fn update_layer(&mut self, id: PanelId) {
        let Some(panel) = self.panels.get_mut(id) else {
            return;
        };
        if panel.sync_layer() {
            log::debug!("Panel {:?} moved to layer {}", id, panel.layer());
        }
    }

    /// Re-evaluate visibility and geometry for one panel's widgets.
    /// Returns true when any widget changed.
    fn update_widgets(&mut self, id: PanelId, now: f32) -> bool {
        let Some(panel) = self.panels.get_mut(id) else {
            return false;
        };
        panel.set_update_time(now);

        let panel = &self.panels[id];
        let force_visible = panel.force_visible();
        let clipped = panel.clipping().has_region();
        let final_alpha = panel.final_alpha();
        let epsilon = self.config.visibility_epsilon;
        let rebuilding = !self.rebuild.is_empty();

        let mut changed = false;
        let mut dirty_calls: Vec<DrawCallId> = Vec::new();
        let mut inserts: Vec<WidgetId> = Vec::new();

        for &wid in &self.registry.order {
            let Some(widget) = self.registry.widgets.get_mut(wid) else {
                continue;
            };
            if widget.panel != id || !widget.enabled {
                continue;
            }

            widget.cumulative_alpha = widget.alpha * final_alpha;
            let visible = force_visible
                || (!clipped && !widget.hide_if_off_screen)
                || (widget.cumulative_alpha > epsilon && panel.is_visible_widget(widget));

            if !widget.update_geometry(visible) {
                continue;
            }
            changed = true;
            if rebuilding {
                continue;
            }
            match widget.draw_call {
                Some(dc) => dirty_calls.push(dc),
                None if visible && widget.key.is_drawable() => inserts.push(wid),
                None => {}
            }
        }

        for dc in dirty_calls {
            if let Some(dc) = self.draw_calls.get_mut(dc) {
                dc.is_dirty = true;
            }
        }
        for wid in inserts {
            if self.needs_rebuild() {
                break;
            }
            if self.insert_widget(wid).is_none() {
                self.request_rebuild(RebuildReason::UNBATCHED_WIDGET);
            }
        }

        changed
    }

    /// Copy clip state and layers to every draw call and number render queues
    fn update_clip_state(&mut self) {
        let mut queue = self.config.base_render_queue;

        for &panel_id in &self.panel_order {
            let Some(panel) = self.panels.get(panel_id) else {
                continue;
            };
            let mode = panel.render_queue();
            let start = match mode {
                RenderQueueMode::Automatic => queue,
                RenderQueueMode::StartAt | RenderQueueMode::Explicit => panel.starting_render_queue(),
            };

            let mut count = 0;
            for dc_id in &self.active_draw_calls {
                let Some(dc) = self.draw_calls.get_mut(*dc_id) else {
                    continue;
                };
                if dc.panel != panel_id {
                    continue;
                }
                dc.update_clip(panel);
                dc.render_queue = if mode == RenderQueueMode::Explicit { start } else { start + count };
                count += 1;
            }

            queue = match mode {
                RenderQueueMode::Automatic => queue + count,
                RenderQueueMode::StartAt if count > 0 => queue.max(start + count),
                RenderQueueMode::Explicit if count > 0 => queue.max(start + 1),
                _ => queue,
            };
        }
    }
}
