use std::io::Read;
use std::time::Duration;

use log::{debug, info, trace, warn};

use crate::audio::{AudioQueue, Segment};
use crate::config::Config;
use crate::constants::{MAX_PROGRAM_SIZE, PROGRAM_START};
use crate::error::Chip8Error;
use crate::instruction::Instruction;
use crate::opcode::fetch;
use crate::scheduler::{samples_for, FrameClock};
use crate::state::{FrameBuffer, State};

/// The outcome of reconciling the machine against wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTick {
    /// Frames that came due; the display should be presented when this is non-zero.
    pub frames: u64,
    /// Execution cycles that may run before the next reconciliation.
    pub budget: usize,
}

/// # Chip-8
/// Chip-8 is a virtual machine and corresponding interpreted language.
///
/// Tracks:
///  - current `state`
///  - a frame `clock` pacing the 60Hz timers against wall-clock time
///  - an optional `audio` queue fed while the sound timer runs
///
/// Supplies interfaces for:
/// - loading programs
/// - pressing and releasing keys
/// - stepping the CPU, alone or in frame-sized batches
/// - reconciling timers and audio with elapsed time
/// - inspecting its frame buffer for rendering by some display
pub struct Chip8 {
    state: State,
    clock: FrameClock,
    audio: Option<AudioQueue>,
    config: Config,
}

impl Chip8 {
    /// A machine with no audio sink; the sound timer still counts down.
    pub fn new(config: Config) -> Self {
        Chip8 {
            state: State::new(),
            clock: FrameClock::new(),
            audio: None,
            config,
        }
    }

    /// A machine that feeds `audio` every frame.
    /// `config.sample_rate` must match the rate the queue is played back at.
    pub fn with_audio(config: Config, audio: AudioQueue) -> Self {
        Chip8 {
            audio: Some(audio),
            ..Chip8::new(config)
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Copies a program image into memory at 0x200.
    ///
    /// # Arguments
    /// * `program` the raw bytes of a ROM, no header
    pub fn load(&mut self, program: &[u8]) -> Result<(), Chip8Error> {
        if program.len() > MAX_PROGRAM_SIZE {
            return Err(Chip8Error::ProgramTooLarge {
                size: program.len(),
                max: MAX_PROGRAM_SIZE,
            });
        }
        self.state.memory[PROGRAM_START..PROGRAM_START + program.len()].copy_from_slice(program);
        info!("loaded {} byte program", program.len());
        Ok(())
    }

    /// Load a rom from a source file
    ///
    /// # Arguments
    /// * `reader` a file reader that contains a ROM
    pub fn load_rom(&mut self, reader: &mut dyn Read) -> Result<(), Chip8Error> {
        let mut program = Vec::new();
        reader.read_to_end(&mut program)?;
        self.load(&program)
    }

    /// Set the pressed status of key
    ///
    /// A press while Fx0A is suspended releases the suspension; the instruction
    /// then runs again and latches the key.
    ///
    /// # Arguments
    /// * `key` the 4-bit representation of the key
    /// * `pressed` whether the key is now down
    pub fn set_key(&mut self, key: u8, pressed: bool) {
        let Some(slot) = self.state.keys.get_mut(key as usize) else {
            warn!("ignoring out of range key {:#X}", key);
            return;
        };
        *slot = pressed;
        if pressed {
            if let Some(register) = self.state.waiting_for_key.take() {
                debug!("key {:X} resumes wait into V{:X}", key, register);
            }
        }
    }

    /// Whether execution is suspended on Fx0A.
    pub fn is_waiting_for_key(&self) -> bool {
        self.state.waiting_for_key.is_some()
    }

    /// Advances the CPU by a single fetch-decode-execute cycle.
    ///
    /// An illegal instruction leaves the state untouched and is reported with
    /// its address and opcode.
    pub fn step(&mut self) -> Result<(), Chip8Error> {
        let pc = self.state.pc;
        let op = fetch(&self.state.memory, pc);
        trace!(
            "{:04X} v{:02X?} i{:04X} pc{:04X}",
            op,
            self.state.v,
            self.state.i,
            pc
        );
        let instruction =
            Instruction::decode(op).ok_or(Chip8Error::IllegalInstruction { pc, opcode: op })?;
        instruction.execute(&mut self.state)
    }

    /// Runs up to `budget` cycles, stopping early while waiting for a key.
    /// Returns the number of cycles run.
    pub fn run(&mut self, budget: usize) -> Result<usize, Chip8Error> {
        for cycles in 0..budget {
            if self.is_waiting_for_key() {
                return Ok(cycles);
            }
            self.step()?;
        }
        Ok(budget)
    }

    /// Reconciles timers and audio with wall-clock time.
    ///
    /// For every frame due since the last call the delay and sound timers drop
    /// by one, stopping at zero. The frames' audio is queued as a tone for the
    /// ticks the sound timer was running followed by silence for the rest.
    ///
    /// # Arguments
    /// * `elapsed` time since the machine started running
    pub fn tick_frame(&mut self, elapsed: Duration) -> FrameTick {
        let frames = self.clock.frames_due(elapsed);

        if frames > 0 {
            let sound_ticks = frames.min(u64::from(self.state.sound_timer));
            let delay_ticks = frames.min(u64::from(self.state.delay_timer));
            self.state.sound_timer -= sound_ticks as u8;
            self.state.delay_timer -= delay_ticks as u8;

            if let Some(audio) = &self.audio {
                let rate = self.config.sample_rate;
                audio.push(Segment {
                    samples: samples_for(sound_ticks, rate),
                    tone: true,
                });
                audio.push(Segment {
                    samples: samples_for(frames - sound_ticks, rate),
                    tone: false,
                });
            }
            debug!(
                "frame {}: {} due, dt {} st {}",
                self.clock.frames_done(),
                frames,
                self.state.delay_timer,
                self.state.sound_timer
            );
        }

        let budget = self.config.instructions_per_frame * frames.max(1) as usize;
        FrameTick { frames, budget }
    }

    /// The current display bitmap
    pub fn get_display(&self) -> &FrameBuffer {
        &self.state.frame_buffer
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Elapsed time that lands just inside frame `n`.
    fn frames(n: u64) -> Duration {
        Duration::from_millis(n * 1000 / 60 + 1)
    }

    fn with_program(program: &[u8]) -> Chip8 {
        let mut chip8 = Chip8::default();
        chip8.load(program).unwrap();
        chip8
    }

    #[test]
    fn test_load_places_program() {
        let chip8 = with_program(&[0x12, 0x34, 0x56]);
        assert_eq!(chip8.state.memory[0x200..0x203], [0x12, 0x34, 0x56]);
        assert_eq!(chip8.state.memory[0x203], 0x0);
    }

    #[test]
    fn test_load_accepts_full_memory() {
        let mut chip8 = Chip8::default();
        chip8.load(&[0xAB; MAX_PROGRAM_SIZE]).unwrap();
        assert_eq!(chip8.state.memory[0xFFF], 0xAB);
    }

    #[test]
    fn test_load_rejects_oversize_program() {
        let mut chip8 = Chip8::default();
        let err = chip8.load(&[0; MAX_PROGRAM_SIZE + 1]).unwrap_err();
        assert!(matches!(
            err,
            Chip8Error::ProgramTooLarge { size, max } if size == MAX_PROGRAM_SIZE + 1 && max == MAX_PROGRAM_SIZE
        ));
    }

    #[test]
    fn test_load_rom_reads_everything() {
        let mut chip8 = Chip8::default();
        let mut rom: &[u8] = &[0x00, 0xE0, 0x12, 0x00];
        chip8.load_rom(&mut rom).unwrap();
        assert_eq!(chip8.state.memory[0x200..0x204], [0x00, 0xE0, 0x12, 0x00]);
    }

    #[test]
    fn test_step_executes_at_pc() {
        let mut chip8 = with_program(&[0x60, 0x2A, 0x71, 0x01]);
        chip8.step().unwrap();
        chip8.step().unwrap();
        assert_eq!(chip8.state.v[0x0], 0x2A);
        assert_eq!(chip8.state.v[0x1], 0x01);
        assert_eq!(chip8.state.pc, 0x204);
    }

    #[test]
    fn test_step_reports_illegal_instruction() {
        let mut chip8 = with_program(&[0x60, 0x01, 0xFF, 0xFF]);
        chip8.step().unwrap();
        let err = chip8.step().unwrap_err();
        assert!(matches!(
            err,
            Chip8Error::IllegalInstruction {
                pc: 0x202,
                opcode: 0xFFFF
            }
        ));
        assert_eq!(chip8.state.pc, 0x202);
    }

    #[test]
    fn test_empty_memory_is_illegal() {
        let mut chip8 = Chip8::default();
        assert!(matches!(
            chip8.step(),
            Err(Chip8Error::IllegalInstruction {
                pc: 0x200,
                opcode: 0x0000
            })
        ));
    }

    #[test]
    fn test_step_keeps_pc_even_after_offset_jump() {
        let mut chip8 = with_program(&[0x60, 0x01, 0xB3, 0x00]);
        chip8.step().unwrap();
        chip8.step().unwrap();
        assert_eq!(chip8.state.pc, 0x300);
    }

    #[test]
    fn test_run_propagates_errors() {
        let mut chip8 = with_program(&[0x00, 0xEE]);
        assert!(matches!(
            chip8.run(10),
            Err(Chip8Error::StackUnderflow { sp: 0 })
        ));
    }

    #[test]
    fn test_run_spends_budget() {
        // 0x200: jump to self
        let mut chip8 = with_program(&[0x12, 0x00]);
        assert_eq!(chip8.run(25).unwrap(), 25);
        assert_eq!(chip8.state.pc, 0x200);
    }

    #[test]
    fn test_wait_for_key_spins_then_latches() {
        let mut chip8 = with_program(&[0xF3, 0x0A, 0x12, 0x02]);
        for _ in 0..10 {
            chip8.step().unwrap();
            assert_eq!(chip8.state.pc, 0x200);
            assert!(chip8.is_waiting_for_key());
        }
        chip8.set_key(0x7, true);
        assert!(!chip8.is_waiting_for_key());
        chip8.step().unwrap();
        assert_eq!(chip8.state.v[0x3], 0x7);
        assert_eq!(chip8.state.pc, 0x202);
    }

    #[test]
    fn test_run_suspends_while_waiting() {
        let mut chip8 = with_program(&[0xF0, 0x0A, 0x12, 0x02]);
        assert_eq!(chip8.run(10).unwrap(), 1);
        assert_eq!(chip8.run(10).unwrap(), 0);
        chip8.set_key(0xB, true);
        assert_eq!(chip8.run(10).unwrap(), 10);
        assert_eq!(chip8.state.v[0x0], 0xB);
    }

    #[test]
    fn test_key_release_doesnt_resume() {
        let mut chip8 = with_program(&[0xF0, 0x0A]);
        chip8.step().unwrap();
        chip8.set_key(0x1, false);
        assert!(chip8.is_waiting_for_key());
    }

    #[test]
    fn test_set_key_ignores_out_of_range() {
        let mut chip8 = Chip8::default();
        chip8.set_key(0x10, true);
        assert!(chip8.state.keys.iter().all(|&k| !k));
    }

    #[test]
    fn test_delay_timer_decays_to_zero() {
        let mut chip8 = Chip8::default();
        chip8.state.delay_timer = 5;
        for frame in 1..=5 {
            assert_eq!(chip8.tick_frame(frames(frame)).frames, 1);
        }
        assert_eq!(chip8.state.delay_timer, 0);
        for frame in 6..=10 {
            chip8.tick_frame(frames(frame));
            assert_eq!(chip8.state.delay_timer, 0);
        }
    }

    #[test]
    fn test_timers_catch_up_many_frames() {
        let mut chip8 = Chip8::default();
        chip8.state.delay_timer = 30;
        chip8.state.sound_timer = 3;
        let tick = chip8.tick_frame(frames(10));
        assert_eq!(tick.frames, 10);
        assert_eq!(chip8.state.delay_timer, 20);
        assert_eq!(chip8.state.sound_timer, 0);
    }

    #[test]
    fn test_timers_hold_between_frames() {
        let mut chip8 = Chip8::default();
        chip8.state.delay_timer = 5;
        let tick = chip8.tick_frame(Duration::from_millis(5));
        assert_eq!(tick.frames, 0);
        assert_eq!(chip8.state.delay_timer, 5);
    }

    #[test]
    fn test_budget_scales_with_frames_due() {
        let config = Config {
            instructions_per_frame: 7,
            ..Config::default()
        };
        let mut chip8 = Chip8::new(config);
        assert_eq!(chip8.tick_frame(Duration::ZERO).budget, 7);
        assert_eq!(chip8.tick_frame(frames(3)).budget, 21);
    }

    #[test]
    fn test_sound_timer_queues_tone_then_silence() {
        let audio = AudioQueue::new();
        let mut chip8 = Chip8::with_audio(Config::default(), audio.clone());
        chip8.state.sound_timer = 2;
        chip8.tick_frame(frames(3));
        assert_eq!(
            audio.take(u32::MAX),
            Some(Segment {
                samples: 1470,
                tone: true
            })
        );
        assert_eq!(
            audio.take(u32::MAX),
            Some(Segment {
                samples: 735,
                tone: false
            })
        );
        assert!(audio.is_empty());
    }

    #[test]
    fn test_silent_frames_queue_silence() {
        let audio = AudioQueue::new();
        let mut chip8 = Chip8::with_audio(Config::default(), audio.clone());
        chip8.tick_frame(frames(1));
        assert_eq!(audio.len(), 1);
        assert_eq!(audio.queued_samples(), 735);
    }

    #[test]
    fn test_no_frame_queues_nothing() {
        let audio = AudioQueue::new();
        let mut chip8 = Chip8::with_audio(Config::default(), audio.clone());
        chip8.state.sound_timer = 9;
        chip8.tick_frame(Duration::from_millis(1));
        assert!(audio.is_empty());
    }

    #[test]
    fn test_display_reflects_draws() {
        // V0 = 0; I = font glyph 0; draw 5 rows at (V0, V0)
        let mut chip8 = with_program(&[0x60, 0x00, 0xA0, 0x00, 0xD0, 0x05]);
        chip8.run(3).unwrap();
        assert_eq!(chip8.get_display()[0][0..4], [1, 1, 1, 1]);
        assert_eq!(chip8.get_display()[1][0..4], [1, 0, 0, 1]);
    }
}
