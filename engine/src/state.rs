use crate::constants::{
    DISPLAY_HEIGHT, DISPLAY_WIDTH, MEMORY_SIZE, PROGRAM_START, SPRITE_SHEET, STACK_SIZE,
};

/// The complete Chip-8 machine state
///
/// ## CPU
/// Registers
/// - (v) 16 primary 8-bit registers (V0..VF)
///     - the first 15 (V0..VE) are general purpose registers
///     - the 16th (VF) is the carry/borrow/collision flag
/// - (i) a 16-bit memory address register
///
/// Counter
/// - (pc) a 16-bit program counter, starting at 0x200
///
/// Stack
/// - (stack) 16 return addresses
/// - (sp) the number of addresses currently on the stack
///
/// Timers
/// - 2 8-bit timers (delay & sound), both decremented at 60Hz
///
/// ## Memory
/// - 4096 bytes of addressable memory, the font lives in 0x000..0x050
/// - 64x32 frame buffer of 0/1 pixels
///
/// ## Input
/// - 16 booleans tracking the pressed status of keys 0..F
/// - `waiting_for_key` holds the destination register while Fx0A is suspended
#[derive(Clone)]
pub struct State {
    pub v: [u8; 16],
    pub i: u16,
    pub pc: u16,
    pub sp: usize,
    pub stack: [u16; STACK_SIZE],
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub memory: [u8; MEMORY_SIZE],
    pub frame_buffer: FrameBuffer,
    pub keys: [bool; 16],
    pub waiting_for_key: Option<u8>,
}

impl State {
    pub fn new() -> Self {
        let mut memory = [0; MEMORY_SIZE];
        memory[..SPRITE_SHEET.len()].copy_from_slice(&SPRITE_SHEET);

        State {
            v: [0; 16],
            i: 0,
            pc: PROGRAM_START as u16,
            sp: 0,
            stack: [0; STACK_SIZE],
            delay_timer: 0,
            sound_timer: 0,
            memory,
            frame_buffer: [[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
            keys: [false; 16],
            waiting_for_key: None,
        }
    }

    /// Reads the byte at `addr`, wrapping past the end of memory.
    pub fn read(&self, addr: usize) -> u8 {
        self.memory[addr % MEMORY_SIZE]
    }

    /// Writes the byte at `addr`, wrapping past the end of memory.
    pub fn write(&mut self, addr: usize, value: u8) {
        self.memory[addr % MEMORY_SIZE] = value;
    }

    /// Moves the program counter forward by `by` bytes.
    pub fn advance(&mut self, by: u16) {
        self.jump(self.pc.wrapping_add(by));
    }

    /// Sets the program counter, keeping it even and inside the 12-bit address space.
    /// An odd target is rounded down to the instruction containing it.
    pub fn jump(&mut self, addr: u16) {
        self.pc = addr & 0x0FFE;
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

/// The FrameBuffer is indexed as [y][x]
pub type FrameBuffer = [[u8; DISPLAY_WIDTH]; DISPLAY_HEIGHT];
