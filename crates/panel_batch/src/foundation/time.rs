//! Frame timing for the UI update loop

/// Frame counter plus the caller-supplied real time.
///
/// The UI loop never reads the wall clock itself: the host passes the
/// current time into every update, which keeps frames reproducible in
/// tests. The frame number is what panels memoize their transforms on.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    frame: u64,
    now: f32,
}

impl FrameClock {
    /// Create a clock sitting before the first frame
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance to the next frame at time `now` (seconds)
    pub fn begin_frame(&mut self, now: f32) -> u64 {
        self.frame += 1;
        self.now = now;
        self.frame
    }

    /// Current frame number (0 before the first frame)
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Real time of the current frame in seconds
    pub fn now(&self) -> f32 {
        self.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_clock_advances() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.frame(), 0);
        assert_eq!(clock.begin_frame(0.5), 1);
        assert_eq!(clock.begin_frame(0.75), 2);
        assert!((clock.now() - 0.75).abs() < f32::EPSILON);
    }
}
