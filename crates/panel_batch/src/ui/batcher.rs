//! Draw-call allocation
//!
//! Two paths keep draw calls in step with widgets:
//!
//! - **Incremental**: a widget that becomes visible is slotted into the
//!   existing call whose open depth interval contains it, and that call is
//!   refilled on its own. Removal just dirties the call.
//! - **Full rebuild**: every call is released and the sorted widget list is
//!   walked once, cutting a new call whenever the panel or batch key changes.
//!
//! Any ambiguity in the incremental path (no interval, wrong key, removal
//! on a range boundary) falls back to the full rebuild.

use std::time::Instant;

use super::context::{UIContext, UIError, UIResult};
use super::draw_call::DrawCall;
use super::material::BatchKey;
use super::stats::RebuildReason;
use crate::foundation::collections::{DrawCallId, PanelId, WidgetId};

/// Run of widgets waiting to become one draw call
struct PendingBatch {
    panel: PanelId,
    key: BatchKey,
    depth_start: i32,
    depth_end: i32,
    widgets: Vec<WidgetId>,
}

impl UIContext {
    /// Place a visible widget into an existing draw call of its panel.
    ///
    /// The panel's calls are scanned in depth order; each owns the open
    /// interval between its neighbours' ranges. A widget landing in a call
    /// with the same batch key joins it and the call is marked dirty.
    /// Otherwise a rebuild is requested and `None` returned. Widgets of
    /// inactive panels also get `None`, without a rebuild. A widget that is
    /// already linked keeps its call.
    pub fn insert_widget(&mut self, id: WidgetId) -> Option<DrawCallId> {
        let widget = self.registry.get(id)?;
        if let Some(dc_id) = widget.draw_call {
            return Some(dc_id);
        }
        let (panel, depth, key, visible) = (widget.panel, widget.depth, widget.key, widget.is_visible);
        if !self.panels.get(panel).is_some_and(|p| p.enabled) {
            return None;
        }

        let calls = self.panel_draw_calls(panel);
        for (i, &dc_id) in calls.iter().enumerate() {
            let lower = match i.checked_sub(1).and_then(|prev| self.draw_calls.get(calls[prev])) {
                Some(prev) => prev.depth_end.saturating_add(1),
                None => i32::MIN,
            };
            let upper = match calls.get(i + 1).and_then(|next| self.draw_calls.get(*next)) {
                Some(next) => next.depth_start.saturating_sub(1),
                None => i32::MAX,
            };
            if depth < lower || depth > upper {
                continue;
            }

            let dc = self.draw_calls.get_mut(dc_id)?;
            if dc.key != key {
                self.stats.insert_fallbacks += 1;
                self.request_rebuild(RebuildReason::MATERIAL_MISMATCH);
                return None;
            }
            if !visible {
                return None;
            }

            dc.is_dirty = true;
            dc.extend_to(depth);
            if let Some(w) = self.registry.get_mut(id) {
                w.draw_call = Some(dc_id);
            }
            self.stats.widgets_inserted += 1;
            log::trace!("Widget {:?} joined draw call {:?} at depth {}", id, dc_id, depth);
            return Some(dc_id);
        }

        self.stats.insert_fallbacks += 1;
        self.request_rebuild(RebuildReason::NO_INTERVAL);
        None
    }

    /// Detach a widget from its draw call.
    ///
    /// The call is marked dirty; removing a widget that sits on either end
    /// of the call's depth range also requests a rebuild, since the range
    /// can no longer be trusted to be tight.
    pub fn remove_widget(&mut self, id: WidgetId) -> UIResult<()> {
        let widget = self.registry.get_mut(id).ok_or(UIError::UnknownWidget(id))?;
        let Some(dc_id) = widget.draw_call.take() else {
            return Ok(());
        };
        let depth = widget.depth;

        if let Some(dc) = self.draw_calls.get_mut(dc_id) {
            dc.is_dirty = true;
            if dc.is_boundary(depth) {
                self.request_rebuild(RebuildReason::BOUNDARY_REMOVAL);
            }
        }
        Ok(())
    }

    /// Release every draw call and rebuild them from the sorted widget list
    pub fn fill_all(&mut self) {
        let started = Instant::now();
        self.release_all_draw_calls();
        self.scratch.clear();

        let mut pending: Option<PendingBatch> = None;
        let mut i = 0;
        while i < self.registry.order.len() {
            let id = self.registry.order[i];
            let Some(widget) = self.registry.widgets.get(id) else {
                self.registry.order.remove(i);
                continue;
            };
            i += 1;

            let panel_active = self.panels.get(widget.panel).is_some_and(|p| p.enabled);
            if !(widget.is_visible && widget.enabled && panel_active && widget.key.is_drawable()) {
                if let Some(w) = self.registry.widgets.get_mut(id) {
                    w.draw_call = None;
                }
                continue;
            }

            let (panel, key, depth) = (widget.panel, widget.key, widget.depth);
            let continues = pending.as_ref().is_some_and(|b| b.panel == panel && b.key == key);
            if !continues {
                if let Some(batch) = pending.take() {
                    self.submit_batch(batch);
                }
                let generate_normals = self.panels.get(panel).is_some_and(|p| p.generate_normals());
                self.scratch.begin(generate_normals);
                pending = Some(PendingBatch {
                    panel,
                    key,
                    depth_start: depth,
                    depth_end: depth,
                    widgets: Vec::new(),
                });
            }

            if let Some(batch) = pending.as_mut() {
                batch.depth_start = batch.depth_start.min(depth);
                batch.depth_end = batch.depth_end.max(depth);
                batch.widgets.push(id);
                self.write_widget(id, panel);
            }
        }
        if let Some(batch) = pending.take() {
            self.submit_batch(batch);
        }

        #[allow(clippy::cast_possible_truncation)]
        let elapsed_us = started.elapsed().as_micros() as u64;
        self.stats.record_rebuild(elapsed_us);
        log::debug!(
            "Rebuilt {} draw calls from {} widgets in {}us",
            self.active_draw_calls.len(),
            self.registry.len(),
            elapsed_us
        );
        if self.config.log_stats {
            log::info!("Batch stats: {:?}", self.stats);
        }
    }

    /// Refill one dirty draw call from the widgets linked to it.
    ///
    /// Invisible widgets are unlinked. Returns false when nothing was
    /// written, in which case the caller destroys the call.
    pub fn fill_one(&mut self, dc_id: DrawCallId) -> bool {
        let Some(dc) = self.draw_calls.get_mut(dc_id) else {
            return false;
        };
        dc.is_dirty = false;
        let panel = dc.panel;

        let generate_normals = self.panels.get(panel).is_some_and(|p| p.generate_normals());
        self.scratch.clear();
        self.scratch.begin(generate_normals);

        let mut written = 0;
        let mut depth_range: Option<(i32, i32)> = None;
        let mut i = 0;
        while i < self.registry.order.len() {
            let id = self.registry.order[i];
            let Some(widget) = self.registry.widgets.get_mut(id) else {
                self.registry.order.remove(i);
                continue;
            };
            i += 1;

            if widget.draw_call != Some(dc_id) {
                continue;
            }
            if !widget.is_visible {
                widget.draw_call = None;
                continue;
            }

            let depth = widget.depth;
            depth_range = Some(match depth_range {
                Some((lo, hi)) => (lo.min(depth), hi.max(depth)),
                None => (depth, depth),
            });
            written += 1;
            self.write_widget(id, panel);
        }

        if self.scratch.is_empty() {
            return false;
        }

        if let Some(dc) = self.draw_calls.get_mut(dc_id) {
            if let Some((lo, hi)) = depth_range {
                dc.depth_start = lo;
                dc.depth_end = hi;
            }
            dc.set(&self.scratch, written);
        }
        self.scratch.clear();
        self.stats.incremental_fills += 1;
        true
    }

    /// Destroy a draw call and unlink every widget pointing at it
    pub(crate) fn destroy_draw_call(&mut self, dc_id: DrawCallId) {
        if self.draw_calls.remove(dc_id).is_none() {
            return;
        }
        self.active_draw_calls.retain(|id| *id != dc_id);
        for widget in self.registry.widgets.values_mut() {
            if widget.draw_call == Some(dc_id) {
                widget.draw_call = None;
            }
        }
        self.stats.draw_calls_destroyed += 1;
        log::trace!("Destroyed draw call {:?}", dc_id);
    }

    /// Drop every draw call and every widget link
    pub(crate) fn release_all_draw_calls(&mut self) {
        self.stats.draw_calls_destroyed += self.draw_calls.len();
        self.draw_calls.clear();
        self.active_draw_calls.clear();
        for widget in self.registry.widgets.values_mut() {
            widget.draw_call = None;
        }
    }

    /// Write a widget into the scratch buffers using its panel's transform
    fn write_widget(&mut self, id: WidgetId, panel: PanelId) {
        let (Some(widget), Some(panel)) = (self.registry.widgets.get(id), self.panels.get(panel)) else {
            return;
        };
        widget.write_to_buffers(panel.world_to_local(), &mut self.scratch);
    }

    /// Turn the scratch buffers into a draw call for `batch`. Nothing is
    /// created when the batch wrote no geometry.
    fn submit_batch(&mut self, batch: PendingBatch) {
        if self.scratch.is_empty() {
            return;
        }
        let Some(panel) = self.panels.get(batch.panel) else {
            self.scratch.clear();
            return;
        };

        let mut dc = DrawCall::new(batch.panel, batch.key, batch.depth_start);
        dc.depth_end = batch.depth_end;
        dc.update_clip(panel);
        dc.set(&self.scratch, batch.widgets.len());
        self.scratch.clear();

        let dc_id = self.draw_calls.insert(dc);
        self.active_draw_calls.push(dc_id);
        self.stats.draw_calls_created += 1;

        for id in batch.widgets {
            if let Some(w) = self.registry.widgets.get_mut(id) {
                w.draw_call = Some(dc_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BatcherConfig;
    use crate::ui::material::MaterialId;
    use crate::ui::panel::Panel;
    use crate::ui::scene::IdentityScene;
    use crate::ui::widget::Widget;

    fn ranges(ui: &UIContext) -> Vec<(i32, i32)> {
        ui.draw_calls().map(|(_, dc)| (dc.depth_start(), dc.depth_end())).collect()
    }

    fn setup(depths: &[i32]) -> (UIContext, PanelId, Vec<WidgetId>) {
        let mut ui = UIContext::new(BatcherConfig::default());
        let panel = ui.add_panel(Panel::new());
        let widgets = depths
            .iter()
            .map(|&d| ui.add_widget(Widget::new(panel, d).with_material(MaterialId(1))).unwrap())
            .collect();
        ui.update(&IdentityScene, 0.0);
        (ui, panel, widgets)
    }

    #[test]
    fn test_fill_all_groups_same_material() {
        let (ui, _, widgets) = setup(&[1, 2, 3]);
        assert_eq!(ranges(&ui), vec![(1, 3)]);

        let dc = ui.widget(widgets[0]).and_then(Widget::draw_call);
        assert!(dc.is_some());
        assert!(widgets.iter().all(|w| ui.widget(*w).and_then(Widget::draw_call) == dc));
        assert_eq!(ui.draw_call(dc.unwrap()).unwrap().vertex_count(), 12);
    }

    #[test]
    fn test_insert_into_matching_interval() {
        let (mut ui, panel, _) = setup(&[1, 5]);
        let w = ui.add_widget(Widget::new(panel, 3).with_material(MaterialId(1))).unwrap();
        ui.registry.get_mut(w).unwrap().is_visible = true;

        let dc = ui.insert_widget(w);
        assert!(dc.is_some());
        assert!(!ui.needs_rebuild());
        assert!(ui.draw_call(dc.unwrap()).unwrap().is_dirty());
    }

    #[test]
    fn test_insert_with_wrong_material_requests_rebuild() {
        let (mut ui, panel, _) = setup(&[1, 5]);
        let w = ui.add_widget(Widget::new(panel, 3).with_material(MaterialId(2))).unwrap();
        ui.registry.get_mut(w).unwrap().is_visible = true;

        assert_eq!(ui.insert_widget(w), None);
        assert!(ui.pending_rebuild().contains(RebuildReason::MATERIAL_MISMATCH));
    }

    #[test]
    fn test_insert_without_calls_requests_rebuild() {
        let mut ui = UIContext::new(BatcherConfig::default());
        let panel = ui.add_panel(Panel::new());
        ui.update(&IdentityScene, 0.0);

        let w = ui.add_widget(Widget::new(panel, 3).with_material(MaterialId(1))).unwrap();
        ui.registry.get_mut(w).unwrap().is_visible = true;
        assert_eq!(ui.insert_widget(w), None);
        assert!(ui.pending_rebuild().contains(RebuildReason::NO_INTERVAL));
    }

    #[test]
    fn test_insert_linked_widget_keeps_its_call() {
        let (mut ui, _, widgets) = setup(&[1, 2, 3]);
        let dc = ui.widget(widgets[1]).and_then(Widget::draw_call);
        let inserted = ui.stats().widgets_inserted;

        assert_eq!(ui.insert_widget(widgets[1]), dc);
        assert_eq!(ui.stats().widgets_inserted, inserted);
        assert!(!ui.needs_rebuild());
        assert!(ui.draw_calls().all(|(_, c)| !c.is_dirty()));
    }

    #[test]
    fn test_insert_for_disabled_panel_is_silent() {
        let (mut ui, panel, widgets) = setup(&[1]);
        ui.set_panel_enabled(panel, false).unwrap();
        assert_eq!(ui.insert_widget(widgets[0]), None);
        assert!(!ui.needs_rebuild());
    }

    #[test]
    fn test_remove_boundary_vs_interior() {
        let (mut ui, _, widgets) = setup(&[1, 2, 3]);

        ui.remove_widget(widgets[1]).unwrap();
        assert!(!ui.needs_rebuild());
        assert!(ui.draw_calls().all(|(_, dc)| dc.is_dirty()));

        ui.remove_widget(widgets[2]).unwrap();
        assert!(ui.pending_rebuild().contains(RebuildReason::BOUNDARY_REMOVAL));
    }

    #[test]
    fn test_fill_one_reports_empty_call() {
        let (mut ui, _, widgets) = setup(&[1]);
        let dc = ui.widget(widgets[0]).and_then(Widget::draw_call).unwrap();

        ui.registry.get_mut(widgets[0]).unwrap().is_visible = false;
        assert!(!ui.fill_one(dc));
        assert_eq!(ui.widget(widgets[0]).and_then(Widget::draw_call), None);
    }

    #[test]
    fn test_fill_all_prunes_tombstones() {
        let (mut ui, _, widgets) = setup(&[1, 2]);
        ui.registry.remove(widgets[0]);
        assert_eq!(ui.registry.order().len(), 2);

        ui.fill_all();
        assert_eq!(ui.registry.order(), &[widgets[1]]);
        assert_eq!(ranges(&ui), vec![(2, 2)]);
    }
}
