use crate::error::Chip8Error;
use crate::opcode::Opcode;
use crate::operations::*;
use crate::state::State;

/// A decoded instruction, carrying the operands its handler needs.
///
/// Register operands are always in 0..=15 since they come from a single nibble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Clr,
    Rts,
    Jump { addr: u16 },
    Call { addr: u16 },
    Ske { x: usize, kk: u8 },
    Skne { x: usize, kk: u8 },
    Skre { x: usize, y: usize },
    Load { x: usize, kk: u8 },
    Add { x: usize, kk: u8 },
    Mv { x: usize, y: usize },
    Or { x: usize, y: usize },
    And { x: usize, y: usize },
    Xor { x: usize, y: usize },
    Addr { x: usize, y: usize },
    Sub { x: usize, y: usize },
    Shr { x: usize },
    Subn { x: usize, y: usize },
    Shl { x: usize },
    Skrne { x: usize, y: usize },
    Loadi { addr: u16 },
    Jumpi { addr: u16 },
    Rand { x: usize, kk: u8 },
    Draw { x: usize, y: usize, n: u8 },
    Skpr { x: usize },
    Skup { x: usize },
    Moved { x: usize },
    Keyd { x: usize },
    Loads { x: usize },
    Ld { x: usize },
    Addi { x: usize },
    Ldspr { x: usize },
    Bcd { x: usize },
    Stor { x: usize },
    Read { x: usize },
}

impl Instruction {
    /// Selects the correct Instruction for a given Opcode.
    /// Returns `None` when the opcode's key has no mapping.
    pub fn decode(op: u16) -> Option<Self> {
        let (x, y, n, kk, addr) = (op.x(), op.y(), op.n(), op.kk(), op.addr());
        let instruction = match op.key() {
            0x00E0 => Instruction::Clr,
            0x00EE => Instruction::Rts,
            0x1000 => Instruction::Jump { addr },
            0x2000 => Instruction::Call { addr },
            0x3000 => Instruction::Ske { x, kk },
            0x4000 => Instruction::Skne { x, kk },
            0x5000 => Instruction::Skre { x, y },
            0x6000 => Instruction::Load { x, kk },
            0x7000 => Instruction::Add { x, kk },
            0x8000 => Instruction::Mv { x, y },
            0x8001 => Instruction::Or { x, y },
            0x8002 => Instruction::And { x, y },
            0x8003 => Instruction::Xor { x, y },
            0x8004 => Instruction::Addr { x, y },
            0x8005 => Instruction::Sub { x, y },
            0x8006 => Instruction::Shr { x },
            0x8007 => Instruction::Subn { x, y },
            0x800E => Instruction::Shl { x },
            0x9000 => Instruction::Skrne { x, y },
            0xA000 => Instruction::Loadi { addr },
            0xB000 => Instruction::Jumpi { addr },
            0xC000 => Instruction::Rand { x, kk },
            0xD000 => Instruction::Draw { x, y, n },
            0xE09E => Instruction::Skpr { x },
            0xE0A1 => Instruction::Skup { x },
            0xF007 => Instruction::Moved { x },
            0xF00A => Instruction::Keyd { x },
            0xF015 => Instruction::Loads { x },
            0xF018 => Instruction::Ld { x },
            0xF01E => Instruction::Addi { x },
            0xF029 => Instruction::Ldspr { x },
            0xF033 => Instruction::Bcd { x },
            0xF055 => Instruction::Stor { x },
            0xF065 => Instruction::Read { x },
            _ => return None,
        };
        Some(instruction)
    }

    /// Runs the instruction's handler against `state`.
    pub fn execute(self, state: &mut State) -> Result<(), Chip8Error> {
        match self {
            Instruction::Clr => clr(state),
            Instruction::Rts => rts(state)?,
            Instruction::Jump { addr } => jump(state, addr),
            Instruction::Call { addr } => call(state, addr)?,
            Instruction::Ske { x, kk } => ske(state, x, kk),
            Instruction::Skne { x, kk } => skne(state, x, kk),
            Instruction::Skre { x, y } => skre(state, x, y),
            Instruction::Load { x, kk } => load(state, x, kk),
            Instruction::Add { x, kk } => add(state, x, kk),
            Instruction::Mv { x, y } => mv(state, x, y),
            Instruction::Or { x, y } => or(state, x, y),
            Instruction::And { x, y } => and(state, x, y),
            Instruction::Xor { x, y } => xor(state, x, y),
            Instruction::Addr { x, y } => addr(state, x, y),
            Instruction::Sub { x, y } => sub(state, x, y),
            Instruction::Shr { x } => shr(state, x),
            Instruction::Subn { x, y } => subn(state, x, y),
            Instruction::Shl { x } => shl(state, x),
            Instruction::Skrne { x, y } => skrne(state, x, y),
            Instruction::Loadi { addr } => loadi(state, addr),
            Instruction::Jumpi { addr } => jumpi(state, addr),
            Instruction::Rand { x, kk } => rand(state, x, kk),
            Instruction::Draw { x, y, n } => draw(state, x, y, n),
            Instruction::Skpr { x } => skpr(state, x),
            Instruction::Skup { x } => skup(state, x),
            Instruction::Moved { x } => moved(state, x),
            Instruction::Keyd { x } => keyd(state, x),
            Instruction::Loads { x } => loads(state, x),
            Instruction::Ld { x } => ld(state, x),
            Instruction::Addi { x } => addi(state, x),
            Instruction::Ldspr { x } => ldspr(state, x),
            Instruction::Bcd { x } => bcd(state, x),
            Instruction::Stor { x } => stor(state, x),
            Instruction::Read { x } => read(state, x),
        }
        Ok(())
    }
}
