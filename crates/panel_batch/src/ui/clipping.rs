//! Panel clipping and render-queue modes

use serde::{Deserialize, Serialize};

/// How a panel restricts the widgets it draws
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Clipping {
    /// No clip region; everything on screen is drawn
    #[default]
    None,
    /// Pixels outside the region are discarded
    HardClip,
    /// Pixels fade out over the softness border
    SoftClip,
    /// Region is used for culling and constraining, but the shader does not clip
    ConstrainButDontClip,
}

impl Clipping {
    /// Whether the panel has a clip region at all (culling applies)
    pub fn has_region(self) -> bool {
        self != Self::None
    }

    /// Whether draw calls need a clipping shader
    pub fn clips_in_shader(self) -> bool {
        matches!(self, Self::HardClip | Self::SoftClip)
    }
}

/// How a panel assigns render queues to its draw calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RenderQueueMode {
    /// Continue numbering after the previous panel
    #[default]
    Automatic,
    /// Number draw calls upward from the panel's starting queue
    StartAt,
    /// Every draw call uses the panel's starting queue
    Explicit,
}
