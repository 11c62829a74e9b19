//! Batching statistics and rebuild bookkeeping

use bitflags::bitflags;

bitflags! {
    /// Why a full rebuild was requested this frame.
    ///
    /// Empty means no rebuild is pending.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RebuildReason: u32 {
        /// `rebuild_all_draw_calls` or `refresh`
        const EXPLICIT = 1 << 0;
        /// A panel was enabled or added
        const PANEL_ENABLED = 1 << 1;
        /// A panel's depth changed
        const PANEL_DEPTH = 1 << 2;
        /// A panel's clip mode changed
        const CLIPPING_CHANGED = 1 << 3;
        /// A widget fell inside a call with a different batch key
        const MATERIAL_MISMATCH = 1 << 4;
        /// A widget's depth fell in no open interval
        const NO_INTERVAL = 1 << 5;
        /// A widget on the edge of a call's depth range was removed
        const BOUNDARY_REMOVAL = 1 << 6;
        /// A visible widget could not be placed in any call
        const UNBATCHED_WIDGET = 1 << 7;
    }
}

/// Counters for monitoring how often the batcher falls back to full rebuilds
#[derive(Debug, Clone, Default)]
pub struct BatchStats {
    /// Frames that ran a full rebuild
    pub full_rebuilds: usize,

    /// Dirty draw calls refilled without a rebuild
    pub incremental_fills: usize,

    /// Draw calls created
    pub draw_calls_created: usize,

    /// Draw calls destroyed
    pub draw_calls_destroyed: usize,

    /// Widgets placed into an existing call
    pub widgets_inserted: usize,

    /// Insertions that fell back to a rebuild
    pub insert_fallbacks: usize,

    /// Time spent in the last full rebuild (microseconds)
    pub last_rebuild_us: u64,

    /// Time spent in all full rebuilds (microseconds)
    pub total_rebuild_us: u64,
}

impl BatchStats {
    /// Average full rebuild time in microseconds
    pub fn avg_rebuild_us(&self) -> f32 {
        if self.full_rebuilds == 0 {
            0.0
        } else {
            self.total_rebuild_us as f32 / self.full_rebuilds as f32
        }
    }

    /// Fraction of insertions that succeeded without a rebuild
    pub fn insert_hit_rate(&self) -> f32 {
        let attempts = self.widgets_inserted + self.insert_fallbacks;
        if attempts == 0 {
            1.0
        } else {
            self.widgets_inserted as f32 / attempts as f32
        }
    }

    /// Record a finished full rebuild
    pub(crate) fn record_rebuild(&mut self, elapsed_us: u64) {
        self.full_rebuilds += 1;
        self.last_rebuild_us = elapsed_us;
        self.total_rebuild_us += elapsed_us;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_averages() {
        let mut stats = BatchStats::default();
        assert_relative_eq!(stats.avg_rebuild_us(), 0.0);
        assert_relative_eq!(stats.insert_hit_rate(), 1.0);

        stats.record_rebuild(100);
        stats.record_rebuild(300);
        stats.widgets_inserted = 3;
        stats.insert_fallbacks = 1;

        assert_eq!(stats.last_rebuild_us, 300);
        assert_relative_eq!(stats.avg_rebuild_us(), 200.0);
        assert_relative_eq!(stats.insert_hit_rate(), 0.75);
    }

    #[test]
    fn test_rebuild_reasons_accumulate() {
        let mut reasons = RebuildReason::empty();
        reasons |= RebuildReason::NO_INTERVAL;
        reasons |= RebuildReason::MATERIAL_MISMATCH;
        assert!(reasons.contains(RebuildReason::NO_INTERVAL));
        assert!(!reasons.contains(RebuildReason::EXPLICIT));
    }
}
