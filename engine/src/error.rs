use std::io;

use thiserror::Error;

/// Everything that can stop the interpreter.
///
/// All runtime variants are fatal: the machine state is left as it was when
/// the condition was detected and no further cycles should be run.
#[derive(Debug, Error)]
pub enum Chip8Error {
    #[error("illegal instruction {opcode:#06X} at {pc:#05X}")]
    IllegalInstruction { pc: u16, opcode: u16 },

    #[error("stack overflow: call with sp = {sp} and a full stack")]
    StackOverflow { sp: usize },

    #[error("stack underflow: return with sp = {sp}")]
    StackUnderflow { sp: usize },

    #[error("program is {size} bytes but at most {max} bytes fit in memory")]
    ProgramTooLarge { size: usize, max: usize },

    #[error("unable to read program")]
    Io(#[from] io::Error),
}
