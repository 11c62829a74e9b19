//! UI Batching Module
//!
//! Turns a dynamic set of widgets into a small, depth-ordered set of draw
//! calls and keeps them up to date frame by frame.
//!
//! Architecture:
//! - context: `UIContext`, owner of panels, widgets and draw calls
//! - panel / widget: clip groups and the leaves they contain
//! - batcher: incremental insertion/removal and full rebuilds
//! - frame: the per-frame update loop
//! - backend: the rendering backend boundary

pub mod backend;
pub mod batcher;
pub mod clipping;
pub mod context;
pub mod draw_call;
pub mod frame;
pub mod geometry;
pub mod material;
pub mod panel;
pub mod registry;
pub mod scene;
pub mod stats;
pub mod vertex;
pub mod widget;

#[cfg(test)]
mod tests;

pub use backend::{BackendError, LoggingBackend, UIRenderBackend};
pub use clipping::{Clipping, RenderQueueMode};
pub use context::{UIContext, UIError, UIResult};
pub use draw_call::DrawCall;
pub use frame::FrameReport;
pub use geometry::{Color32, GeometryBuffers, SlicedGeometry, SpriteGeometry, WidgetGeometry, WidgetQuad};
pub use material::{BatchKey, MaterialId, ShaderId, TextureId};
pub use panel::Panel;
pub use registry::WidgetRegistry;
pub use scene::{IdentityScene, SceneTransforms, StaticTransforms};
pub use stats::{BatchStats, RebuildReason};
pub use vertex::{UIVertex, UIVertexLit};
pub use widget::{rect_corners, Widget};
