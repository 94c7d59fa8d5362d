/// Tunables for a running machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// Execution cycles allowed per 1/60 s frame.
    pub instructions_per_frame: usize,
    /// Output rate of the audio sink, in sample frames per second.
    pub sample_rate: u32,
    /// Pitch of the buzzer.
    pub tone_hz: u32,
    /// Peak amplitude of the square wave.
    pub volume: i16,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            instructions_per_frame: 10,
            sample_rate: 44_100,
            tone_hz: 440,
            volume: 3_000,
        }
    }
}
