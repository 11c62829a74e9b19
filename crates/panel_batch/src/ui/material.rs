//! Render-state identities that widgets are batched on

use serde::{Deserialize, Serialize};

/// Unique identifier for materials
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MaterialId(pub u32);

/// Handle for a texture owned by the rendering backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextureId(pub u32);

/// Handle for a shader owned by the rendering backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShaderId(pub u32);

/// The render state a draw call is keyed on (the panel is tracked separately).
///
/// Two widgets can only share a draw call when their keys are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct BatchKey {
    /// Material
    pub material: Option<MaterialId>,
    /// Main texture
    pub texture: Option<TextureId>,
    /// Shader override
    pub shader: Option<ShaderId>,
}

impl BatchKey {
    /// Key with only a material set
    pub fn material(material: MaterialId) -> Self {
        Self {
            material: Some(material),
            ..Self::default()
        }
    }

    /// Builder: set the texture
    #[must_use]
    pub fn with_texture(mut self, texture: TextureId) -> Self {
        self.texture = Some(texture);
        self
    }

    /// Builder: set the shader
    #[must_use]
    pub fn with_shader(mut self, shader: ShaderId) -> Self {
        self.shader = Some(shader);
        self
    }

    /// A widget with no material, texture or shader has nothing to draw with
    pub fn is_drawable(&self) -> bool {
        self.material.is_some() || self.texture.is_some() || self.shader.is_some()
    }
}
