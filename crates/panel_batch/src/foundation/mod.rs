//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the crate:
//! - Math types and clip-rectangle helpers
//! - Typed slot-map handles for widgets, panels and draw calls
//! - Frame clock used to memoize per-frame work
//! - Logging utilities

pub mod math;
pub mod collections;
pub mod time;
pub mod logging;
