//! Tunables for the batching core

use super::Config;
use serde::{Deserialize, Serialize};

/// Settings shared by every panel in a `UIContext`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatcherConfig {
    /// Screen width in pixels; the view size of unclipped panels
    pub screen_width: f32,

    /// Screen height in pixels
    pub screen_height: f32,

    /// Alpha at or below which panels and widgets count as invisible
    pub visibility_epsilon: f32,

    /// Seconds widgets stay force-visible after a clip region or offset moves
    pub cull_delay: f32,

    /// First render queue handed out to `Automatic` panels
    pub base_render_queue: i32,

    /// Whether new panels generate normals and tangents by default
    pub generate_normals: bool,

    /// Log a stats summary after every full rebuild
    pub log_stats: bool,
}

impl Default for BatcherConfig {
    fn default() -> Self {
        Self {
            screen_width: 1280.0,
            screen_height: 720.0,
            visibility_epsilon: 0.001,
            cull_delay: 0.15,
            base_render_queue: 3000,
            generate_normals: false,
            log_stats: false,
        }
    }
}

impl Config for BatcherConfig {}
