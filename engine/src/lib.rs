pub use audio::{AudioQueue, Segment, ToneSynth};
pub use chip8::{Chip8, FrameTick};
pub use config::Config;
pub use error::Chip8Error;
pub use state::FrameBuffer;

mod audio;
mod chip8;
mod config;
pub mod constants;
mod error;
mod instruction;
mod opcode;
mod operations;
mod scheduler;
pub mod state;
