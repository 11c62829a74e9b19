//! Widget registry: storage plus the global draw order

use super::widget::Widget;
use crate::foundation::collections::{PanelId, WidgetId, WidgetMap};

/// Every registered widget, plus the order the batcher walks them in.
///
/// The order is sorted by (panel rank, widget depth, material). Destroyed
/// widgets leave their id behind in `order` as a tombstone; walks prune
/// tombstones in place when they meet them.
#[derive(Debug, Default)]
pub struct WidgetRegistry {
    pub(crate) widgets: WidgetMap<Widget>,
    pub(crate) order: Vec<WidgetId>,
}

impl WidgetRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a widget; call [`sort`](Self::sort) afterwards
    pub fn insert(&mut self, widget: Widget) -> WidgetId {
        let id = self.widgets.insert(widget);
        self.order.push(id);
        id
    }

    /// Unregister a widget; its slot in the order becomes a tombstone
    pub fn remove(&mut self, id: WidgetId) -> Option<Widget> {
        self.widgets.remove(id)
    }

    /// Look up a widget
    pub fn get(&self, id: WidgetId) -> Option<&Widget> {
        self.widgets.get(id)
    }

    /// Look up a widget mutably
    pub fn get_mut(&mut self, id: WidgetId) -> Option<&mut Widget> {
        self.widgets.get_mut(id)
    }

    /// Whether `id` refers to a live widget
    pub fn contains(&self, id: WidgetId) -> bool {
        self.widgets.contains_key(id)
    }

    /// Number of live widgets
    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    /// Whether no widgets are registered
    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Draw order, possibly containing tombstones
    pub fn order(&self) -> &[WidgetId] {
        &self.order
    }

    /// Live widgets in draw order
    pub fn iter_ordered(&self) -> impl Iterator<Item = (WidgetId, &Widget)> {
        self.order
            .iter()
            .filter_map(move |&id| self.widgets.get(id).map(|w| (id, w)))
    }

    /// Live widgets of one panel in draw order
    pub fn ids_for_panel(&self, panel: PanelId) -> Vec<WidgetId> {
        self.iter_ordered()
            .filter(|(_, w)| w.panel == panel)
            .map(|(id, _)| id)
            .collect()
    }

    /// Drop every tombstone from the order
    pub fn prune(&mut self) {
        let widgets = &self.widgets;
        self.order.retain(|id| widgets.contains_key(*id));
    }

    /// Re-sort the draw order. `rank` maps a panel to its position in the
    /// active panel list; widgets of inactive panels sort last.
    pub fn sort(&mut self, rank: impl Fn(PanelId) -> Option<usize>) {
        self.prune();
        let widgets = &self.widgets;
        self.order.sort_by_key(|id| {
            let w = &widgets[*id];
            (rank(w.panel).unwrap_or(usize::MAX), w.depth, w.key.material)
        });
    }
}
