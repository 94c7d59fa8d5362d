/// # Opcodes
///
/// Chip-8 opcodes are 16 bits, stored big-endian. Their behavior is cased on some combination of:
/// - `(n, _, _, _)` the family; enough on its own for 0x1..=0x7, 0x9 and 0xA..=0xD
/// - `(n, _, _, n)` the ALU family 0x8 is split on its last nibble
/// - `(n, _, n, n)` the key (0xE) and misc (0xF) families are split on their low byte
/// - `(0, _, n, n)` the system family 0x0 is split on its low byte alone
///
/// Nibbles not used to determine the operation often (but not always) carry important data.
/// - `(_, n, n, n)` represent a 12-bit address
/// - `(_, _, n, n)` encodes some data that is assigned to and/or compared with Vx
/// - `(_, n, _, _)` refers either to the register Vx or a range of registers V0..Vx
/// - `(_, _, n, _)` refers to the the register Vy
/// - `(_, _, _, n)` is the height of a sprite
///
/// Decoding never fails; whether a key maps to an instruction is up to the dispatcher.
pub trait Opcode {
    /// Returns the Opcode's component nibbles.
    fn nibbles(&self) -> (u8, u8, u8, u8);

    /// The Opcode's most significant nibble.
    /// `[f___]`
    fn family(&self) -> u8;

    /// The Opcode's second nibble.
    /// `[_x__]`
    fn x(&self) -> usize;

    /// The Opcode's third nibble.
    /// `[__y_]`
    fn y(&self) -> usize;

    /// The Opcode's fourth nibble.
    /// `[___n]`
    fn n(&self) -> u8;

    /// The Opcode's least significant byte.
    /// `[__kk]`
    fn kk(&self) -> u8;

    /// The Opcode without its most significant nibble.
    /// `[_adr]`
    fn addr(&self) -> u16;

    /// The Opcode with every operand bit masked out; what the dispatcher matches on.
    fn key(&self) -> u16;
}

impl Opcode for u16 {
    fn nibbles(&self) -> (u8, u8, u8, u8) {
        (self.family(), self.x() as u8, self.y() as u8, self.n())
    }

    fn family(&self) -> u8 {
        ((self & 0xF000) >> 12) as u8
    }

    fn x(&self) -> usize {
        ((self & 0x0F00) >> 8) as usize
    }

    fn y(&self) -> usize {
        ((self & 0x00F0) >> 4) as usize
    }

    fn n(&self) -> u8 {
        (self & 0x000F) as u8
    }

    fn kk(&self) -> u8 {
        (self & 0x00FF) as u8
    }

    fn addr(&self) -> u16 {
        self & 0x0FFF
    }

    fn key(&self) -> u16 {
        match self.family() {
            0x0 => self & 0x00FF,
            0x8 => self & 0xF00F,
            0xE | 0xF => self & 0xF0FF,
            _ => self & 0xF000,
        }
    }
}

/// Gets the opcode at `pc`.
/// Memory is stored as bytes, but opcodes are 16 bits so we combine two subsequent bytes.
pub fn fetch(memory: &[u8], pc: u16) -> u16 {
    let pc = pc as usize;
    let left = u16::from(memory[pc % memory.len()]);
    let right = u16::from(memory[(pc + 1) % memory.len()]);
    left << 8 | right
}
