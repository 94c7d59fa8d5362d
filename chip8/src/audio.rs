use log::info;
use sdl2::audio::{AudioCallback, AudioDevice, AudioSpecDesired};

use engine::{AudioQueue, Config, ToneSynth};

const CHANNELS: u8 = 2;

/// Plays the engine's audio queue from the sdl2 audio thread.
pub struct Buzzer {
    synth: ToneSynth,
}

impl AudioCallback for Buzzer {
    type Channel = i16;

    fn callback(&mut self, out: &mut [i16]) {
        self.synth.fill(out);
    }
}

/// 1/20 s of buffering, saturating at the largest buffer sdl2 can be asked for.
fn buffer_samples(sample_rate: u32) -> u16 {
    u16::try_from(sample_rate / 20).unwrap_or(u16::MAX)
}

/// Opens and starts the default playback device.
///
/// The device may not honour the requested rate; the machine feeding `queue`
/// must be configured with `device.spec().freq`.
pub fn open(
    sdl: &sdl2::Sdl,
    queue: AudioQueue,
    config: &Config,
) -> Result<AudioDevice<Buzzer>, String> {
    let audio_subsystem = sdl.audio()?;
    let desired = AudioSpecDesired {
        freq: Some(config.sample_rate as i32),
        channels: Some(CHANNELS),
        samples: Some(buffer_samples(config.sample_rate)),
    };

    let device = audio_subsystem.open_playback(None, &desired, |spec| {
        let obtained = Config {
            sample_rate: spec.freq as u32,
            ..*config
        };
        Buzzer {
            synth: ToneSynth::new(queue, &obtained, spec.channels as usize),
        }
    })?;
    info!(
        "opened audio at {} Hz, {} channel(s)",
        device.spec().freq,
        device.spec().channels
    );
    device.resume();
    Ok(device)
}
