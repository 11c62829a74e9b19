//! # Panel Batch
//!
//! Draw-call batching and clipping for retained-mode UI.
//!
//! ## Features
//!
//! - **Depth-ordered batching**: widgets sharing a panel, material, texture
//!   and shader across a contiguous depth range collapse into one draw call
//! - **Incremental repair**: widgets that appear, disappear or change are
//!   patched into existing calls; only ambiguous edits force a rebuild
//! - **Clip panels**: hard, soft and constrain-only clip regions with
//!   per-frame culling
//! - **Backend agnostic**: draw calls expose `bytemuck` vertex data for any
//!   renderer implementing [`ui::UIRenderBackend`]
//!
//! ## Quick Start
//!
//! ```rust
//! use panel_batch::prelude::*;
//!
//! let mut ui = UIContext::new(BatcherConfig::default());
//! let panel = ui.add_panel(Panel::new());
//! for depth in 1..=3 {
//!     ui.add_widget(Widget::new(panel, depth).with_material(MaterialId(1)))?;
//! }
//!
//! let report = ui.update(&IdentityScene, 0.0);
//! assert!(report.rebuilt);
//! assert_eq!(ui.draw_call_count(), 1);
//! # Ok::<(), UIError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod ui;

/// Common imports for crate users
pub mod prelude {
    pub use crate::{
        config::{BatcherConfig, Config, ConfigError, SceneDescription},
        foundation::{
            collections::{DrawCallId, PanelId, WidgetId},
            math::{Mat4, Vec2, Vec3, Vec4},
        },
        ui::{
            BatchKey, Clipping, Color32, DrawCall, FrameReport, IdentityScene, LoggingBackend, MaterialId, Panel,
            RenderQueueMode, SceneTransforms, ShaderId, StaticTransforms, TextureId, UIContext, UIError,
            UIRenderBackend, UIResult, Widget,
        },
    };
}
