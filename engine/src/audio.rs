use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::Config;

/// A run of output sample frames that are either all tone or all silence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub samples: u32,
    pub tone: bool,
}

/// # Audio Queue
/// A FIFO of [`Segment`]s shared between the frame scheduler, which appends,
/// and the audio device callback, which drains from the front.
///
/// Cloning gives another handle to the same queue. The lock is only held
/// to push or to pop a single segment; synthesis happens outside of it.
#[derive(Debug, Clone, Default)]
pub struct AudioQueue {
    segments: Arc<Mutex<VecDeque<Segment>>>,
}

impl AudioQueue {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the lock can't leave a VecDeque half-updated,
    // so a poisoned queue is still usable.
    fn lock(&self) -> MutexGuard<'_, VecDeque<Segment>> {
        self.segments.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends a segment. Empty segments are dropped.
    pub fn push(&self, segment: Segment) {
        if segment.samples > 0 {
            self.lock().push_back(segment);
        }
    }

    /// Removes up to `wanted` samples from the front of the queue.
    ///
    /// A front segment longer than `wanted` is shortened in place rather than removed.
    pub fn take(&self, wanted: u32) -> Option<Segment> {
        let mut segments = self.lock();
        let front = segments.front_mut()?;
        if front.samples > wanted {
            front.samples -= wanted;
            Some(Segment {
                samples: wanted,
                tone: front.tone,
            })
        } else {
            segments.pop_front()
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Total sample frames waiting to be played.
    pub fn queued_samples(&self) -> u64 {
        self.lock().iter().map(|s| u64::from(s.samples)).sum()
    }
}

/// # Tone synthesis
/// Turns queued segments into interleaved i16 samples: a square wave for tone
/// segments and silence otherwise. Every channel of a frame gets the same value.
///
/// This is the state an audio device callback owns.
pub struct ToneSynth {
    queue: AudioQueue,
    channels: usize,
    half_period: u32,
    phase: u32,
    volume: i16,
}

impl ToneSynth {
    /// # Arguments
    /// * `queue` the queue fed by the frame scheduler
    /// * `config` supplies the sample rate, pitch and volume
    /// * `channels` interleaved channels per output frame
    pub fn new(queue: AudioQueue, config: &Config, channels: usize) -> Self {
        let half_period = config.sample_rate / (2 * config.tone_hz.max(1));
        ToneSynth {
            queue,
            channels: channels.max(1),
            half_period: half_period.max(1),
            phase: 0,
            volume: config.volume,
        }
    }

    fn next_tone_sample(&mut self) -> i16 {
        let high = self.phase < self.half_period;
        self.phase = (self.phase + 1) % (2 * self.half_period);
        if high {
            self.volume
        } else {
            -self.volume
        }
    }

    /// Fills `out` from the queue, padding with silence once the queue runs dry.
    pub fn fill(&mut self, out: &mut [i16]) {
        out.fill(0);

        let wanted = out.len() / self.channels;
        let mut frames = out.chunks_exact_mut(self.channels);
        let mut written = 0;

        while written < wanted {
            let Some(segment) = self.queue.take((wanted - written) as u32) else {
                break;
            };
            let count = segment.samples as usize;
            for frame in frames.by_ref().take(count) {
                let sample = if segment.tone {
                    self.next_tone_sample()
                } else {
                    0
                };
                frame.fill(sample);
            }
            written += count;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synth(queue: &AudioQueue, channels: usize) -> ToneSynth {
        let config = Config {
            sample_rate: 8,
            tone_hz: 2,
            volume: 100,
            ..Config::default()
        };
        ToneSynth::new(queue.clone(), &config, channels)
    }

    #[test]
    fn test_push_drops_empty_segments() {
        let queue = AudioQueue::new();
        queue.push(Segment {
            samples: 0,
            tone: true,
        });
        assert!(queue.is_empty());
    }

    #[test]
    fn test_take_is_fifo() {
        let queue = AudioQueue::new();
        queue.push(Segment {
            samples: 3,
            tone: true,
        });
        queue.push(Segment {
            samples: 4,
            tone: false,
        });
        assert_eq!(
            queue.take(10),
            Some(Segment {
                samples: 3,
                tone: true
            })
        );
        assert_eq!(
            queue.take(10),
            Some(Segment {
                samples: 4,
                tone: false
            })
        );
        assert_eq!(queue.take(10), None);
    }

    #[test]
    fn test_take_shortens_long_segment_in_place() {
        let queue = AudioQueue::new();
        queue.push(Segment {
            samples: 10,
            tone: true,
        });
        assert_eq!(
            queue.take(4),
            Some(Segment {
                samples: 4,
                tone: true
            })
        );
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.queued_samples(), 6);
    }

    #[test]
    fn test_clones_share_queue() {
        let queue = AudioQueue::new();
        let other = queue.clone();
        queue.push(Segment {
            samples: 5,
            tone: false,
        });
        assert_eq!(other.queued_samples(), 5);
    }

    #[test]
    fn test_fill_pads_empty_queue_with_silence() {
        let queue = AudioQueue::new();
        let mut synth = synth(&queue, 2);
        let mut out = [7i16; 8];
        synth.fill(&mut out);
        assert_eq!(out, [0; 8]);
    }

    #[test]
    fn test_fill_synthesizes_square_wave() {
        let queue = AudioQueue::new();
        queue.push(Segment {
            samples: 4,
            tone: true,
        });
        // 8 Hz output at 2 Hz gives a half period of 2 samples
        let mut synth = synth(&queue, 1);
        let mut out = [0i16; 6];
        synth.fill(&mut out);
        assert_eq!(out, [100, 100, -100, -100, 0, 0]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_fill_duplicates_channels() {
        let queue = AudioQueue::new();
        queue.push(Segment {
            samples: 2,
            tone: true,
        });
        let mut synth = synth(&queue, 2);
        let mut out = [0i16; 4];
        synth.fill(&mut out);
        assert_eq!(out, [100, 100, 100, 100]);
    }

    #[test]
    fn test_fill_respects_silence_then_tone() {
        let queue = AudioQueue::new();
        queue.push(Segment {
            samples: 2,
            tone: false,
        });
        queue.push(Segment {
            samples: 2,
            tone: true,
        });
        let mut synth = synth(&queue, 1);
        let mut out = [0i16; 4];
        synth.fill(&mut out);
        assert_eq!(out, [0, 0, 100, 100]);
    }

    #[test]
    fn test_fill_leaves_remainder_queued() {
        let queue = AudioQueue::new();
        queue.push(Segment {
            samples: 10,
            tone: true,
        });
        let mut synth = synth(&queue, 2);
        let mut out = [0i16; 8];
        synth.fill(&mut out);
        assert_eq!(queue.queued_samples(), 6);
        synth.fill(&mut out);
        assert_eq!(out, [100, 100, 100, 100, -100, -100, -100, -100]);
        assert_eq!(queue.queued_samples(), 2);
    }
}
