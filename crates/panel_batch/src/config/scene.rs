//! Declarative scene files: panels and widgets by name

use std::collections::HashMap;

use super::Config;
use crate::foundation::collections::{PanelId, WidgetId};
use crate::foundation::math::{Vec2, Vec3, Vec4};
use crate::ui::{
    rect_corners, BatchKey, Clipping, Color32, MaterialId, Panel, RenderQueueMode, ShaderId, SlicedGeometry,
    SpriteGeometry, StaticTransforms, TextureId, UIContext, UIError, UIResult, Widget,
};
use serde::{Deserialize, Serialize};

/// A panel as written in a scene file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelDescription {
    /// Name widgets refer to
    pub name: String,
    /// Draw order among panels
    pub depth: i32,
    /// Clip mode
    pub clipping: Clipping,
    /// Clip center xy and size zw
    pub clip_region: [f32; 4],
    /// Soft-clip border
    pub softness: [f32; 2],
    /// Panel alpha
    pub alpha: f32,
    /// Render queue assignment
    pub render_queue: RenderQueueMode,
    /// Queue used by `StartAt` / `Explicit`
    pub starting_render_queue: i32,
    /// World position of the panel origin
    pub position: [f32; 3],
    /// Write normals and tangents
    pub generate_normals: bool,
    /// Keep culling while the clip region moves
    pub cull_while_dragging: bool,
    /// Render layer
    pub layer: u32,
}

impl Default for PanelDescription {
    fn default() -> Self {
        Self {
            name: String::new(),
            depth: 0,
            clipping: Clipping::None,
            clip_region: [0.0, 0.0, 300.0, 200.0],
            softness: [4.0, 4.0],
            alpha: 1.0,
            render_queue: RenderQueueMode::Automatic,
            starting_render_queue: 3000,
            position: [0.0, 0.0, 0.0],
            generate_normals: false,
            cull_while_dragging: false,
            layer: 0,
        }
    }
}

impl PanelDescription {
    /// Build the runtime panel
    pub fn to_panel(&self) -> Panel {
        let [x, y, z, w] = self.clip_region;
        Panel::new()
            .with_depth(self.depth)
            .with_clipping(self.clipping, Vec4::new(x, y, z, w))
            .with_softness(Vec2::new(self.softness[0], self.softness[1]))
            .with_alpha(self.alpha)
            .with_render_queue(self.render_queue, self.starting_render_queue)
            .with_generate_normals(self.generate_normals)
            .with_cull_while_dragging(self.cull_while_dragging)
            .with_layer(self.layer)
    }
}

/// How a widget produces its geometry
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum WidgetKind {
    /// One quad over the whole texture
    #[default]
    Sprite,
    /// Nine-slice with borders in panel units (left, bottom, right, top)
    /// and in UV space
    Sliced {
        /// Border sizes in panel units
        border: [f32; 4],
        /// Border sizes in UV space
        uv_border: [f32; 4],
    },
}

/// A widget as written in a scene file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetDescription {
    /// Name used by scripts and logs
    pub name: String,
    /// Name of the owning panel
    pub panel: String,
    /// Depth inside the panel
    pub depth: i32,
    /// Material id
    pub material: Option<u32>,
    /// Texture id
    pub texture: Option<u32>,
    /// Shader id
    pub shader: Option<u32>,
    /// x, y, width, height relative to the panel origin
    pub rect: [f32; 4],
    /// Tint
    pub color: Color32,
    /// Own alpha
    pub alpha: f32,
    /// Cull against the screen even when the panel does not clip
    pub hide_if_off_screen: bool,
    /// Geometry source
    pub kind: WidgetKind,
}

impl Default for WidgetDescription {
    fn default() -> Self {
        Self {
            name: String::new(),
            panel: String::new(),
            depth: 0,
            material: None,
            texture: None,
            shader: None,
            rect: [0.0, 0.0, 100.0, 100.0],
            color: Color32::WHITE,
            alpha: 1.0,
            hide_if_off_screen: false,
            kind: WidgetKind::Sprite,
        }
    }
}

impl WidgetDescription {
    /// Batch key from the optional ids
    pub fn key(&self) -> BatchKey {
        BatchKey {
            material: self.material.map(MaterialId),
            texture: self.texture.map(TextureId),
            shader: self.shader.map(ShaderId),
        }
    }

    /// Build the runtime widget under `panel`, offset by the panel's position
    pub fn to_widget(&self, panel: PanelId, origin: Vec3) -> Widget {
        let [x, y, w, h] = self.rect;
        let corners = rect_corners(x, y, w, h).map(|c| c + origin);
        let widget = Widget::new(panel, self.depth)
            .with_key(self.key())
            .with_corners(corners)
            .with_color(self.color)
            .with_alpha(self.alpha)
            .hide_if_off_screen(self.hide_if_off_screen);

        match self.kind {
            WidgetKind::Sprite => widget.with_geometry(SpriteGeometry::full()),
            WidgetKind::Sliced { border, uv_border } => widget.with_geometry(SlicedGeometry {
                border: Vec4::from(border),
                uv_min: Vec2::new(0.0, 0.0),
                uv_max: Vec2::new(1.0, 1.0),
                uv_border: Vec4::from(uv_border),
            }),
        }
    }
}

/// Panels and widgets to load into a `UIContext`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneDescription {
    /// Panels, in any order
    pub panels: Vec<PanelDescription>,
    /// Widgets, each naming its panel
    pub widgets: Vec<WidgetDescription>,
}

impl Config for SceneDescription {}

/// Ids created by [`SceneDescription::instantiate`], keyed by name
#[derive(Debug, Default)]
pub struct SceneHandles {
    /// Panel ids by name
    pub panels: HashMap<String, PanelId>,
    /// Widget ids by name
    pub widgets: HashMap<String, WidgetId>,
    /// Panel placements
    pub transforms: StaticTransforms,
}

impl SceneDescription {
    /// Register every panel and widget with `ui`
    pub fn instantiate(&self, ui: &mut UIContext) -> UIResult<SceneHandles> {
        let mut handles = SceneHandles::default();
        let mut origins: HashMap<&str, Vec3> = HashMap::new();

        for desc in &self.panels {
            let id = ui.add_panel(desc.to_panel());
            let origin = Vec3::from(desc.position);
            handles.transforms.set_translation(id, origin);
            handles.panels.insert(desc.name.clone(), id);
            origins.insert(desc.name.as_str(), origin);
        }

        for desc in &self.widgets {
            let panel = *handles
                .panels
                .get(&desc.panel)
                .ok_or_else(|| UIError::UnknownPanelName(desc.panel.clone()))?;
            let origin = origins.get(desc.panel.as_str()).copied().unwrap_or_else(Vec3::zeros);
            let id = ui.add_widget(desc.to_widget(panel, origin))?;
            handles.widgets.insert(desc.name.clone(), id);
        }

        log::info!(
            "Scene loaded: {} panels, {} widgets",
            handles.panels.len(),
            handles.widgets.len()
        );
        Ok(handles)
    }
}
