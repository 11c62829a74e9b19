//! Frame-by-frame scenarios through the public context API

use super::{ranges, single_panel};
use crate::config::BatcherConfig;
use crate::foundation::math::{Vec2, Vec3, Vec4};
use crate::ui::{
    Clipping, IdentityScene, MaterialId, Panel, RebuildReason, RenderQueueMode, StaticTransforms, TextureId,
    UIContext, Widget,
};
use approx::assert_relative_eq;

#[test]
fn test_same_material_run_becomes_one_call() {
    let (ui, _, _) = single_panel(&[1, 2, 3]);
    assert_eq!(ranges(&ui), vec![(1, 3)]);
    assert_eq!(ui.stats().full_rebuilds, 1);
}

#[test]
fn test_material_change_in_the_middle_splits_the_run() {
    let (mut ui, _, widgets) = single_panel(&[1, 2, 3]);

    ui.set_widget_material(widgets[1], Some(MaterialId(2))).unwrap();
    // Interior removal alone does not force a rebuild
    assert!(!ui.needs_rebuild());

    // Re-insertion lands inside the [1, 3] call with the wrong material
    assert_eq!(ui.insert_widget(widgets[1]), None);

    let report = ui.update(&IdentityScene, 0.1);
    assert!(report.rebuilt);
    assert!(report.rebuild_reasons.contains(RebuildReason::MATERIAL_MISMATCH));
    assert_eq!(ranges(&ui), vec![(1, 1), (2, 2), (3, 3)]);
}

#[test]
fn test_material_change_is_picked_up_by_the_frame_loop() {
    let (mut ui, _, widgets) = single_panel(&[1, 2, 3]);
    ui.set_widget_material(widgets[1], Some(MaterialId(2))).unwrap();

    let report = ui.update(&IdentityScene, 0.1);
    assert!(report.rebuilt);
    assert_eq!(ranges(&ui), vec![(1, 1), (2, 2), (3, 3)]);
}

#[test]
fn test_shrinking_clip_culls_without_deleting() {
    let mut ui = UIContext::new(BatcherConfig::default());
    let panel = ui.add_panel(Panel::new().with_clipping(Clipping::HardClip, Vec4::new(0.0, 0.0, 200.0, 200.0)));
    let inner = ui
        .add_widget(Widget::new(panel, 1).with_material(MaterialId(1)).with_rect(-40.0, -5.0, 10.0, 10.0))
        .unwrap();
    let outer = ui
        .add_widget(Widget::new(panel, 2).with_material(MaterialId(1)).with_rect(60.0, -5.0, 10.0, 10.0))
        .unwrap();
    ui.update(&IdentityScene, 0.0);
    assert_eq!(ranges(&ui), vec![(1, 2)]);

    ui.set_panel_clip_region(panel, Vec4::new(0.0, 0.0, 100.0, 100.0)).unwrap();
    let report = ui.update(&IdentityScene, 1.0);

    assert!(!report.rebuilt);
    assert_eq!(report.filled, 1);
    assert_eq!(report.changed_panels, vec![panel]);

    let culled = ui.widget(outer).unwrap();
    assert!(!culled.is_visible());
    assert_eq!(culled.draw_call(), None);
    assert!(ui.widget(inner).unwrap().is_visible());

    let (_, dc) = ui.draw_calls().next().unwrap();
    assert_eq!(dc.vertex_count(), 4);
    assert_eq!(dc.widget_count(), 1);
    assert_eq!(dc.clip_region(), Vec4::new(0.0, 0.0, 100.0, 100.0));
}

#[test]
fn test_scrolling_holds_culling_off_for_the_cull_delay() {
    let mut ui = UIContext::new(BatcherConfig::default());
    let panel = ui.add_panel(Panel::new().with_clipping(Clipping::SoftClip, Vec4::new(0.0, 0.0, 100.0, 100.0)));
    let w = ui
        .add_widget(Widget::new(panel, 0).with_material(MaterialId(1)).with_rect(-10.0, -10.0, 20.0, 20.0))
        .unwrap();
    ui.update(&IdentityScene, 1.0);

    // First scroll only nudges the deadline, later ones hold culling off
    ui.set_panel_clip_offset(panel, Vec2::new(10.0, 0.0)).unwrap();
    ui.set_panel_clip_offset(panel, Vec2::new(500.0, 0.0)).unwrap();

    ui.update(&IdentityScene, 1.1);
    assert!(ui.widget(w).unwrap().is_visible());

    ui.update(&IdentityScene, 1.2);
    assert!(!ui.widget(w).unwrap().is_visible());
    assert_eq!(ui.draw_call_count(), 0);
}

#[test]
fn test_transparent_widget_empties_and_destroys_its_call() {
    let mut ui = UIContext::new(BatcherConfig::default());
    let panel = ui.add_panel(Panel::new().with_clipping(Clipping::HardClip, Vec4::new(0.0, 0.0, 500.0, 500.0)));
    let a = ui.add_widget(Widget::new(panel, 0).with_material(MaterialId(1))).unwrap();
    let b = ui.add_widget(Widget::new(panel, 1).with_material(MaterialId(2))).unwrap();
    ui.update(&IdentityScene, 0.0);
    assert_eq!(ui.draw_call_count(), 2);

    ui.set_widget_alpha(b, 0.0).unwrap();
    let report = ui.update(&IdentityScene, 0.1);

    assert_eq!(report.destroyed, 1);
    assert_eq!(ui.draw_call_count(), 1);
    assert!(ui.widget(a).unwrap().draw_call().is_some());
    assert!(ui.widget(b).is_some());
}

#[test]
fn test_disabling_interior_widget_patches_incrementally() {
    let (mut ui, _, widgets) = single_panel(&[1, 2, 3]);

    ui.set_widget_enabled(widgets[1], false).unwrap();
    let report = ui.update(&IdentityScene, 0.1);

    assert!(!report.rebuilt);
    assert_eq!(report.filled, 1);
    assert_eq!(ranges(&ui), vec![(1, 3)]);
    assert_eq!(ui.draw_calls().next().unwrap().1.vertex_count(), 8);

    ui.set_widget_enabled(widgets[1], true).unwrap();
    let report = ui.update(&IdentityScene, 0.2);
    assert!(!report.rebuilt);
    assert_eq!(ui.draw_calls().next().unwrap().1.vertex_count(), 12);
    assert_eq!(ui.stats().widgets_inserted, 1);
}

#[test]
fn test_disabling_boundary_widget_rebuilds() {
    let (mut ui, _, widgets) = single_panel(&[1, 2, 3]);

    ui.set_widget_enabled(widgets[2], false).unwrap();
    let report = ui.update(&IdentityScene, 0.1);

    assert!(report.rebuild_reasons.contains(RebuildReason::BOUNDARY_REMOVAL));
    assert_eq!(ranges(&ui), vec![(1, 2)]);
}

#[test]
fn test_new_widget_between_calls_joins_matching_neighbour() {
    let mut ui = UIContext::new(BatcherConfig::default());
    let panel = ui.add_panel(Panel::new());
    ui.add_widget(Widget::new(panel, 0).with_material(MaterialId(1))).unwrap();
    ui.add_widget(Widget::new(panel, 10).with_material(MaterialId(2))).unwrap();
    ui.update(&IdentityScene, 0.0);
    assert_eq!(ranges(&ui), vec![(0, 0), (10, 10)]);

    // Depth 5 lies in the first call's open interval (.., 9]
    ui.add_widget(Widget::new(panel, 5).with_material(MaterialId(1))).unwrap();
    let report = ui.update(&IdentityScene, 0.1);

    assert!(!report.rebuilt);
    assert_eq!(ranges(&ui), vec![(0, 5), (10, 10)]);
}

#[test]
fn test_texture_difference_breaks_batches() {
    let mut ui = UIContext::new(BatcherConfig::default());
    let panel = ui.add_panel(Panel::new());
    for (depth, texture) in [(0, 1), (1, 1), (2, 2)] {
        ui.add_widget(
            Widget::new(panel, depth)
                .with_material(MaterialId(1))
                .with_texture(TextureId(texture)),
        )
        .unwrap();
    }
    ui.update(&IdentityScene, 0.0);
    assert_eq!(ranges(&ui), vec![(0, 1), (2, 2)]);
}

#[test]
fn test_widgets_without_material_are_never_batched() {
    let mut ui = UIContext::new(BatcherConfig::default());
    let panel = ui.add_panel(Panel::new());
    let w = ui.add_widget(Widget::new(panel, 0)).unwrap();

    ui.update(&IdentityScene, 0.0);
    let report = ui.update(&IdentityScene, 0.1);

    assert!(!report.rebuilt);
    assert_eq!(ui.draw_call_count(), 0);
    assert!(ui.widget(w).unwrap().is_visible());
}

#[test]
fn test_disabling_panel_destroys_its_calls() {
    let mut ui = UIContext::new(BatcherConfig::default());
    let a = ui.add_panel(Panel::new().with_depth(0));
    let b = ui.add_panel(Panel::new().with_depth(1));
    let wa = ui.add_widget(Widget::new(a, 0).with_material(MaterialId(1))).unwrap();
    let wb = ui.add_widget(Widget::new(b, 0).with_material(MaterialId(1))).unwrap();
    ui.update(&IdentityScene, 0.0);
    assert_eq!(ui.draw_call_count(), 2);

    ui.set_panel_enabled(a, false).unwrap();
    assert_eq!(ui.draw_call_count(), 1);
    assert_eq!(ui.panel_draw_call_count(a), 0);
    assert_eq!(ui.widget(wa).unwrap().draw_call(), None);
    assert!(ui.widget(wb).unwrap().draw_call().is_some());

    // Last panel gone: everything released
    ui.set_panel_enabled(b, false).unwrap();
    assert_eq!(ui.draw_call_count(), 0);

    ui.set_panel_enabled(a, true).unwrap();
    let report = ui.update(&IdentityScene, 0.1);
    assert!(report.rebuild_reasons.contains(RebuildReason::PANEL_ENABLED));
    assert_eq!(ui.draw_call_count(), 1);
    assert_eq!(ui.panel_draw_call_count(a), 1);
}

#[test]
fn test_panel_depth_change_reorders_calls_and_queues() {
    let mut ui = UIContext::new(BatcherConfig::default());
    let a = ui.add_panel(Panel::new().with_depth(0));
    let b = ui.add_panel(Panel::new().with_depth(1));
    ui.add_widget(Widget::new(a, 0).with_material(MaterialId(1))).unwrap();
    ui.add_widget(Widget::new(b, 0).with_material(MaterialId(1))).unwrap();
    ui.update(&IdentityScene, 0.0);

    let queue_of = |ui: &UIContext, panel| {
        ui.draw_calls()
            .find(|(_, dc)| dc.panel() == panel)
            .map(|(_, dc)| dc.render_queue())
    };
    assert_eq!(queue_of(&ui, a), Some(3000));
    assert_eq!(queue_of(&ui, b), Some(3001));

    ui.set_panel_depth(a, 5).unwrap();
    let report = ui.update(&IdentityScene, 0.1);

    assert!(report.rebuild_reasons.contains(RebuildReason::PANEL_DEPTH));
    assert_eq!(ui.panel_order(), &[b, a]);
    assert_eq!(queue_of(&ui, b), Some(3000));
    assert_eq!(queue_of(&ui, a), Some(3001));
}

#[test]
fn test_explicit_render_queue_is_shared() {
    let mut ui = UIContext::new(BatcherConfig::default());
    let panel = ui.add_panel(Panel::new().with_render_queue(RenderQueueMode::Explicit, 4000));
    ui.add_widget(Widget::new(panel, 0).with_material(MaterialId(1))).unwrap();
    ui.add_widget(Widget::new(panel, 1).with_material(MaterialId(2))).unwrap();
    let after = ui.add_panel(Panel::new().with_depth(1));
    ui.add_widget(Widget::new(after, 0).with_material(MaterialId(1))).unwrap();
    ui.update(&IdentityScene, 0.0);

    let queues: Vec<i32> = ui.draw_calls().map(|(_, dc)| dc.render_queue()).collect();
    assert_eq!(queues, vec![4000, 4000, 4001]);
}

#[test]
fn test_moving_panel_rewrites_geometry_in_panel_space() {
    let mut ui = UIContext::new(BatcherConfig::default());
    let panel = ui.add_panel(Panel::new());
    ui.add_widget(Widget::new(panel, 0).with_material(MaterialId(1)).with_rect(100.0, 0.0, 10.0, 10.0))
        .unwrap();

    let mut scene = StaticTransforms::new();
    ui.update(&scene, 0.0);
    assert_relative_eq!(ui.draw_calls().next().unwrap().1.buffers().positions[0].x, 100.0);

    scene.set_translation(panel, Vec3::new(30.0, 0.0, 0.0));
    let report = ui.update(&scene, 0.1);

    assert!(!report.rebuilt);
    assert_eq!(report.filled, 1);
    assert_relative_eq!(ui.draw_calls().next().unwrap().1.buffers().positions[0].x, 70.0);
}

#[test]
fn test_visibility_query_after_move_still_rewrites_geometry() {
    let mut ui = UIContext::new(BatcherConfig::default());
    let panel = ui.add_panel(Panel::new().with_clipping(Clipping::SoftClip, Vec4::new(0.0, 0.0, 1000.0, 1000.0)));
    ui.add_widget(Widget::new(panel, 0).with_material(MaterialId(1)).with_rect(100.0, 0.0, 10.0, 10.0))
        .unwrap();

    let mut scene = StaticTransforms::new();
    ui.update(&scene, 0.0);
    assert_relative_eq!(ui.draw_calls().next().unwrap().1.buffers().positions[0].x, 100.0);

    // Clip changes drop the cached transform, so the query recomputes it
    ui.set_panel_clip_offset(panel, Vec2::new(0.0, 5.0)).unwrap();
    scene.set_translation(panel, Vec3::new(30.0, 0.0, 0.0));
    ui.is_visible_point(panel, &Vec3::new(30.0, 0.0, 0.0), &scene).unwrap();

    let report = ui.update(&scene, 0.1);
    assert_eq!(report.filled, 1);
    assert_relative_eq!(ui.draw_calls().next().unwrap().1.buffers().positions[0].x, 70.0);
}

#[test]
fn test_panel_alpha_scales_vertex_colors() {
    let (mut ui, panel, _) = single_panel(&[0]);
    ui.set_panel_alpha(panel, 0.5).unwrap();
    ui.update(&IdentityScene, 0.1);

    let (_, dc) = ui.draw_calls().next().unwrap();
    assert!(dc.buffers().colors.iter().all(|c| c.a == 128));
}

#[test]
fn test_generate_normals_produces_lit_vertices() {
    let (mut ui, panel, _) = single_panel(&[0]);
    assert!(ui.draw_calls().next().unwrap().1.lit_vertices().is_none());

    ui.set_panel_generate_normals(panel, true).unwrap();
    ui.update(&IdentityScene, 0.1);

    let lit = ui.draw_calls().next().unwrap().1.lit_vertices().unwrap();
    assert_eq!(lit.len(), 4);
    assert_eq!(lit[0].normal, [0.0, 0.0, -1.0]);
}

#[test]
fn test_late_update_runs_only_for_first_panel() {
    let mut ui = UIContext::new(BatcherConfig::default());
    let first = ui.add_panel(Panel::new().with_depth(0));
    let second = ui.add_panel(Panel::new().with_depth(1));

    assert!(ui.late_update(second, &IdentityScene, 0.0).is_none());
    assert_eq!(ui.frame(), 0);

    let report = ui.late_update(first, &IdentityScene, 0.0).unwrap();
    assert_eq!(report.frame, 1);
}

#[test]
fn test_refresh_forces_rebuild() {
    let (mut ui, _, _) = single_panel(&[1, 2]);
    let report = ui.refresh(&IdentityScene, 0.1);
    assert!(report.rebuilt);
    assert_eq!(report.rebuild_reasons, RebuildReason::EXPLICIT);
    assert_eq!(ui.stats().full_rebuilds, 2);
}

#[test]
fn test_steady_state_frame_does_nothing() {
    let (mut ui, _, _) = single_panel(&[1, 2, 3]);
    let report = ui.update(&IdentityScene, 0.1);

    assert!(!report.rebuilt);
    assert_eq!(report.filled, 0);
    assert!(report.changed_panels.is_empty());
    assert_eq!(report.draw_call_count, 1);
}

#[test]
fn test_layer_is_copied_to_draw_calls() {
    let (mut ui, panel, _) = single_panel(&[0]);
    ui.set_panel_layer(panel, 5).unwrap();
    ui.update(&IdentityScene, 0.1);
    assert_eq!(ui.draw_calls().next().unwrap().1.layer(), 5);
}

#[test]
fn test_point_visibility_and_constrain_through_context() {
    let mut ui = UIContext::new(BatcherConfig::default());
    let panel = ui.add_panel(Panel::new().with_clipping(Clipping::HardClip, Vec4::new(0.0, 0.0, 100.0, 100.0)));

    let mut scene = StaticTransforms::new();
    scene.set_translation(panel, Vec3::new(200.0, 0.0, 0.0));

    assert!(ui.is_visible_point(panel, &Vec3::new(220.0, 0.0, 0.0), &scene).unwrap());
    assert!(!ui.is_visible_point(panel, &Vec3::new(20.0, 0.0, 0.0), &scene).unwrap());

    let offset = ui
        .calculate_constrain_offset(panel, Vec2::new(40.0, 0.0), Vec2::new(60.0, 10.0))
        .unwrap();
    assert_relative_eq!(offset, Vec2::new(-10.0, 0.0));
}
