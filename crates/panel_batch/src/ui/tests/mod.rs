//! Scenario and invariant tests for the batching core

mod frame_scenarios;

use super::{IdentityScene, MaterialId, Panel, UIContext, Widget};
use crate::config::BatcherConfig;
use crate::foundation::collections::{PanelId, WidgetId};

/// Depth ranges of every live draw call, in submission order
fn ranges(ui: &UIContext) -> Vec<(i32, i32)> {
    ui.draw_calls()
        .map(|(_, dc)| (dc.depth_start(), dc.depth_end()))
        .collect()
}

/// One unclipped panel holding a material-1 widget per depth, after one frame
fn single_panel(depths: &[i32]) -> (UIContext, PanelId, Vec<WidgetId>) {
    crate::foundation::logging::init_for_tests();
    let mut ui = UIContext::new(BatcherConfig::default());
    let panel = ui.add_panel(Panel::new());
    let widgets = depths
        .iter()
        .map(|&depth| {
            ui.add_widget(Widget::new(panel, depth).with_material(MaterialId(1)))
                .unwrap()
        })
        .collect();
    ui.update(&IdentityScene, 0.0);
    (ui, panel, widgets)
}
