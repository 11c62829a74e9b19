//! Handle types for stable references into the UI context

use slotmap::new_key_type;

pub use slotmap::{SecondaryMap, SlotMap};

new_key_type! {
    /// Handle to a widget registered with a `UIContext`
    pub struct WidgetId;

    /// Handle to a panel registered with a `UIContext`
    pub struct PanelId;

    /// Handle to a live draw call
    pub struct DrawCallId;
}

/// Handle-based map for widgets
pub type WidgetMap<T> = SlotMap<WidgetId, T>;

/// Handle-based map for panels
pub type PanelMap<T> = SlotMap<PanelId, T>;

/// Handle-based map for draw calls
pub type DrawCallMap<T> = SlotMap<DrawCallId, T>;

/// Monotonic source of instance ids.
///
/// Slot-map keys get recycled and carry no creation order, so panels take
/// one of these as the stable tie-breaker for depth sorting.
#[derive(Debug, Default)]
pub struct InstanceCounter {
    next: u64,
}

impl InstanceCounter {
    /// Create a counter starting at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the next id
    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_counter_is_monotonic() {
        let mut counter = InstanceCounter::new();
        assert_eq!(counter.next_id(), 0);
        assert_eq!(counter.next_id(), 1);
        assert_eq!(counter.next_id(), 2);
    }

    #[test]
    fn test_removed_keys_are_detected() {
        let mut map: WidgetMap<u32> = WidgetMap::with_key();
        let a = map.insert(1);
        map.remove(a);
        let b = map.insert(2);
        assert!(!map.contains_key(a));
        assert_eq!(map.get(b), Some(&2));
    }
}
