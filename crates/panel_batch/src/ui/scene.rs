//! Scene/transform provider boundary
//!
//! The batcher does not own a scene graph. Panel placement comes from a
//! [`SceneTransforms`] implementation supplied by the host each frame.

use crate::foundation::collections::{PanelId, SecondaryMap};
use crate::foundation::math::{Mat4, Vec3};

/// Supplies each panel's local-to-world matrix
pub trait SceneTransforms {
    /// Local-to-world matrix of `panel`
    fn panel_to_world(&self, panel: PanelId) -> Mat4;
}

/// Every panel sits at the world origin
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityScene;

impl SceneTransforms for IdentityScene {
    fn panel_to_world(&self, _panel: PanelId) -> Mat4 {
        Mat4::identity()
    }
}

/// Map-backed transforms; panels without an entry use identity
#[derive(Debug, Clone, Default)]
pub struct StaticTransforms {
    transforms: SecondaryMap<PanelId, Mat4>,
}

impl StaticTransforms {
    /// Create an empty provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a panel's local-to-world matrix
    pub fn set(&mut self, panel: PanelId, local_to_world: Mat4) {
        self.transforms.insert(panel, local_to_world);
    }

    /// Place a panel at a pure translation
    pub fn set_translation(&mut self, panel: PanelId, translation: Vec3) {
        self.set(panel, Mat4::new_translation(&translation));
    }

    /// Forget a panel's transform
    pub fn remove(&mut self, panel: PanelId) {
        self.transforms.remove(panel);
    }
}

impl SceneTransforms for StaticTransforms {
    fn panel_to_world(&self, panel: PanelId) -> Mat4 {
        self.transforms
            .get(panel)
            .copied()
            .unwrap_or_else(Mat4::identity)
    }
}
