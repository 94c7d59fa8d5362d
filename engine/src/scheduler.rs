use std::time::Duration;

use crate::constants::FRAMES_PER_SECOND;

const NANOS_PER_SECOND: u128 = 1_000_000_000;

/// # Frame clock
/// Converts wall-clock time since the machine started into whole 1/60 s frames.
///
/// Frames are counted from the total elapsed time rather than accumulated from
/// deltas, so a slow iteration of the run loop is caught up on the next one
/// instead of drifting.
#[derive(Debug, Default)]
pub struct FrameClock {
    frames_done: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames that came due since the last call.
    ///
    /// # Arguments
    /// * `elapsed` time since the machine started running
    pub fn frames_due(&mut self, elapsed: Duration) -> u64 {
        let total = elapsed.as_nanos() * u128::from(FRAMES_PER_SECOND) / NANOS_PER_SECOND;
        let total = u64::try_from(total).unwrap_or(u64::MAX);
        let due = total.saturating_sub(self.frames_done);
        self.frames_done += due;
        due
    }

    pub fn frames_done(&self) -> u64 {
        self.frames_done
    }
}

/// Sample frames played over `frames` 1/60 s frames.
pub fn samples_for(frames: u64, sample_rate: u32) -> u32 {
    let samples = frames * u64::from(sample_rate) / u64::from(FRAMES_PER_SECOND);
    u32::try_from(samples).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_frames_before_first_tick() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.frames_due(Duration::from_millis(16)), 0);
        assert_eq!(clock.frames_done(), 0);
    }

    #[test]
    fn test_frames_are_floored() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.frames_due(Duration::from_millis(17)), 1);
        assert_eq!(clock.frames_due(Duration::from_millis(33)), 0);
        assert_eq!(clock.frames_due(Duration::from_millis(34)), 1);
    }

    #[test]
    fn test_catches_up_after_a_stall() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.frames_due(Duration::from_millis(17)), 1);
        assert_eq!(clock.frames_due(Duration::from_secs(1)), 59);
        assert_eq!(clock.frames_done(), 60);
    }

    #[test]
    fn test_time_going_backwards_is_no_frames() {
        let mut clock = FrameClock::new();
        clock.frames_due(Duration::from_secs(2));
        assert_eq!(clock.frames_due(Duration::from_secs(1)), 0);
        assert_eq!(clock.frames_done(), 120);
    }

    #[test]
    fn test_samples_for() {
        assert_eq!(samples_for(1, 44_100), 735);
        assert_eq!(samples_for(3, 48_000), 2_400);
        assert_eq!(samples_for(0, 44_100), 0);
    }
}
