//! Scripted batching demo
//!
//! Loads a batcher config and a scene, then plays a fixed sequence of edits
//! (scrolling a clipped list, swapping a material, hiding widgets, raising a
//! panel) and logs what the batcher did each frame.

use std::path::PathBuf;

use panel_batch::config::{Config, ConfigError, SceneDescription, SceneHandles};
use panel_batch::prelude::*;
use panel_batch::ui::BackendError;
use rand::rngs::StdRng;
use rand::seq::IteratorRandom;
use rand::SeedableRng;

/// Errors surfaced by the demo
#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("UI error: {0}")]
    Ui(#[from] UIError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Scene has no {kind} named '{name}'")]
    Missing { kind: &'static str, name: &'static str },
}

const FRAME_TIME: f32 = 1.0 / 60.0;

fn assets_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets")
}

fn panel(handles: &SceneHandles, name: &'static str) -> Result<PanelId, DemoError> {
    handles
        .panels
        .get(name)
        .copied()
        .ok_or(DemoError::Missing { kind: "panel", name })
}

fn widget(handles: &SceneHandles, name: &'static str) -> Result<WidgetId, DemoError> {
    handles
        .widgets
        .get(name)
        .copied()
        .ok_or(DemoError::Missing { kind: "widget", name })
}

/// Runs frames and keeps the clock
struct Demo {
    ui: UIContext,
    handles: SceneHandles,
    backend: LoggingBackend,
    now: f32,
}

impl Demo {
    fn step(&mut self, label: &str) -> Result<FrameReport, DemoError> {
        self.now += FRAME_TIME;
        let report = self.ui.update(&self.handles.transforms, self.now);
        let submitted = self.ui.render(&mut self.backend)?;

        log::info!(
            "[frame {:>3}] {:<28} rebuilt={:<5} filled={} destroyed={} calls={} submitted={} ({} bytes)",
            report.frame,
            label,
            report.rebuilt,
            report.filled,
            report.destroyed,
            report.draw_call_count,
            submitted,
            self.backend.uploaded_bytes
        );
        if report.rebuilt {
            log::info!("            rebuild reasons: {:?}", report.rebuild_reasons);
        }
        Ok(report)
    }

    fn settle(&mut self, frames: usize, label: &str) -> Result<(), DemoError> {
        for _ in 0..frames {
            self.step(label)?;
        }
        Ok(())
    }
}

fn run() -> Result<(), DemoError> {
    let assets = assets_dir();
    let config = BatcherConfig::load_or_default(assets.join("batcher.toml"))?;
    let scene = SceneDescription::load_from_file(assets.join("demo_scene.ron"))?;

    let mut ui = UIContext::new(config);
    let handles = scene.instantiate(&mut ui)?;
    let mut demo = Demo {
        ui,
        handles,
        backend: LoggingBackend::new(),
        now: 0.0,
    };

    demo.step("initial build")?;
    demo.step("steady state")?;

    // Scroll the inventory list; culling waits for the scroll to settle
    let list = panel(&demo.handles, "inventory")?;
    for i in 1..=12 {
        let offset = Vec2::new(0.0, 15.0 * i as f32);
        demo.ui.set_panel_clip_offset(list, offset)?;
        demo.step("scroll inventory")?;
    }
    demo.settle(12, "scroll settled")?;

    // Swap one slot to a different atlas: lands mid-call, forcing a rebuild
    let slot = widget(&demo.handles, "slot_2")?;
    demo.ui.set_widget_material(slot, Some(MaterialId(7)))?;
    demo.step("material swap")?;

    // Hide a few random slots: interior ones patch in place
    let mut rng = StdRng::seed_from_u64(42);
    let mut slots: Vec<&String> = demo
        .handles
        .widgets
        .keys()
        .filter(|name| name.starts_with("slot_"))
        .collect();
    slots.sort();
    let names: Vec<String> = slots.into_iter().cloned().choose_multiple(&mut rng, 3);
    for name in &names {
        if let Some(&id) = demo.handles.widgets.get(name) {
            demo.ui.set_widget_enabled(id, false)?;
            demo.step(&format!("hide {}", name))?;
        }
    }

    // Fade the HUD
    let hud = panel(&demo.handles, "hud")?;
    demo.ui.set_panel_alpha(hud, 0.5)?;
    demo.step("fade hud")?;

    // Raise the inventory above the HUD
    let top = demo.ui.next_unused_depth();
    demo.ui.set_panel_depth(list, top)?;
    demo.step("raise inventory")?;

    let stats = demo.ui.stats();
    log::info!(
        "Done: {} full rebuilds (avg {:.1}us), {} incremental fills, {} insertions ({:.0}% hit rate)",
        stats.full_rebuilds,
        stats.avg_rebuild_us(),
        stats.incremental_fills,
        stats.widgets_inserted,
        stats.insert_hit_rate() * 100.0
    );
    Ok(())
}

fn main() {
    panel_batch::foundation::logging::init_with_default("info");

    log::info!("Starting panel batching demo");
    if let Err(e) = run() {
        log::error!("Demo failed: {}", e);
        std::process::exit(1);
    }
}
