use log::debug;

use crate::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH, SPRITE_HEIGHT, STACK_SIZE};
use crate::error::Chip8Error;
use crate::state::State;

// Every handler owns program counter movement: +2 to fall through, +4 to skip,
// or an absolute address for jumps, calls and returns.

/// clear
pub fn clr(state: &mut State) {
    state.frame_buffer = [[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT];
    state.advance(2);
}

/// PC = STACK.pop() + 2
pub fn rts(state: &mut State) -> Result<(), Chip8Error> {
    if state.sp == 0 {
        return Err(Chip8Error::StackUnderflow { sp: state.sp });
    }
    state.sp -= 1;
    state.jump(state.stack[state.sp]);
    state.advance(2);
    Ok(())
}

/// PC = addr
pub fn jump(state: &mut State, addr: u16) {
    state.jump(addr);
}

/// STACK.push(PC); PC = addr
pub fn call(state: &mut State, addr: u16) -> Result<(), Chip8Error> {
    if state.sp == STACK_SIZE {
        return Err(Chip8Error::StackOverflow { sp: state.sp });
    }
    state.stack[state.sp] = state.pc;
    state.sp += 1;
    state.jump(addr);
    Ok(())
}

fn skip_if(state: &mut State, condition: bool) {
    state.advance(if condition { 4 } else { 2 });
}

/// if Vx == kk then pc += 2
pub fn ske(state: &mut State, x: usize, kk: u8) {
    skip_if(state, state.v[x] == kk);
}

/// if Vx != kk then pc += 2
pub fn skne(state: &mut State, x: usize, kk: u8) {
    skip_if(state, state.v[x] != kk);
}

/// if Vx == Vy then pc += 2
pub fn skre(state: &mut State, x: usize, y: usize) {
    skip_if(state, state.v[x] == state.v[y]);
}

/// Vx = kk
pub fn load(state: &mut State, x: usize, kk: u8) {
    state.v[x] = kk;
    state.advance(2);
}

/// Vx += kk
/// Add kk to Vx; allow for overflow but implicitly drop it, VF is untouched
pub fn add(state: &mut State, x: usize, kk: u8) {
    state.v[x] = state.v[x].wrapping_add(kk);
    state.advance(2);
}

/// Vx = Vy
pub fn mv(state: &mut State, x: usize, y: usize) {
    state.v[x] = state.v[y];
    state.advance(2);
}

/// Vx |= Vy
pub fn or(state: &mut State, x: usize, y: usize) {
    state.v[x] |= state.v[y];
    state.advance(2);
}

/// Vx &= Vy
pub fn and(state: &mut State, x: usize, y: usize) {
    state.v[x] &= state.v[y];
    state.advance(2);
}

/// Vx ^= Vy
pub fn xor(state: &mut State, x: usize, y: usize) {
    state.v[x] ^= state.v[y];
    state.advance(2);
}

/// Writes an ALU result and its flag. The flag is written last so it wins when x is F.
fn set_with_flag(state: &mut State, x: usize, result: u8, flag: bool) {
    state.v[x] = result;
    state.v[0xF] = u8::from(flag);
    state.advance(2);
}

/// Vx += Vy; VF = carry
pub fn addr(state: &mut State, x: usize, y: usize) {
    let (res, carry) = state.v[x].overflowing_add(state.v[y]);
    set_with_flag(state, x, res, carry);
}

/// Vx -= Vy; VF = !borrow
pub fn sub(state: &mut State, x: usize, y: usize) {
    let (vx, vy) = (state.v[x], state.v[y]);
    set_with_flag(state, x, vx.wrapping_sub(vy), vx >= vy);
}

/// Vx >>= 1; VF = bit shifted out
pub fn shr(state: &mut State, x: usize) {
    let vx = state.v[x];
    set_with_flag(state, x, vx >> 1, vx & 0x1 == 0x1);
}

/// Vx = Vy - Vx; VF = !borrow
pub fn subn(state: &mut State, x: usize, y: usize) {
    let (vx, vy) = (state.v[x], state.v[y]);
    set_with_flag(state, x, vy.wrapping_sub(vx), vy >= vx);
}

/// Vx <<= 1; VF = bit shifted out
pub fn shl(state: &mut State, x: usize) {
    let vx = state.v[x];
    set_with_flag(state, x, vx << 1, vx >> 7 == 0x1);
}

/// if Vx != Vy then pc += 2
pub fn skrne(state: &mut State, x: usize, y: usize) {
    skip_if(state, state.v[x] != state.v[y]);
}

/// I = addr
pub fn loadi(state: &mut State, addr: u16) {
    state.i = addr;
    state.advance(2);
}

/// PC = V0 + addr
pub fn jumpi(state: &mut State, addr: u16) {
    state.jump(addr + u16::from(state.v[0x0]));
}

/// Vx = rand_byte & kk
pub fn rand(state: &mut State, x: usize, kk: u8) {
    let rand_byte: u8 = rand::random();
    state.v[x] = rand_byte & kk;
    state.advance(2);
}

/// draw_sprite(x=Vx y=Vy size=n)
/// XORs a sprite from memory i..i+n at position Vx, Vy on the FrameBuffer.
/// The origin wraps around the screen; rows and columns past the edges are clipped.
/// Sets VF if any lit pixel is erased
pub fn draw(state: &mut State, x: usize, y: usize, n: u8) {
    let origin_x = state.v[x] as usize % DISPLAY_WIDTH;
    let origin_y = state.v[y] as usize % DISPLAY_HEIGHT;
    let mut collision = false;

    for row in 0..n as usize {
        let py = origin_y + row;
        if py >= DISPLAY_HEIGHT {
            break;
        }
        let sprite = state.read(state.i as usize + row);
        for bit in 0..8 {
            let px = origin_x + bit;
            if px >= DISPLAY_WIDTH {
                break;
            }
            let pixel_value = (sprite >> (7 - bit)) & 1;
            let cell = &mut state.frame_buffer[py][px];
            collision |= pixel_value & *cell == 1;
            *cell ^= pixel_value;
        }
    }

    state.v[0xF] = u8::from(collision);
    state.advance(2);
}

/// Only the low nibble of Vx names a key.
fn key_in(state: &State, x: usize) -> bool {
    state.keys[(state.v[x] & 0xF) as usize]
}

/// if Vx.pressed then pc += 2
pub fn skpr(state: &mut State, x: usize) {
    skip_if(state, key_in(state, x));
}

/// if !Vx.pressed then pc += 2
pub fn skup(state: &mut State, x: usize) {
    skip_if(state, !key_in(state, x));
}

/// Vx = DT
pub fn moved(state: &mut State, x: usize) {
    state.v[x] = state.delay_timer;
    state.advance(2);
}

/// await keypress for Vx
/// Latches the lowest pressed key. With no key down the pc is left alone so the
/// same instruction runs again next cycle.
pub fn keyd(state: &mut State, x: usize) {
    match state.keys.iter().position(|&pressed| pressed) {
        Some(key) => {
            state.v[x] = key as u8;
            state.waiting_for_key = None;
            debug!("latched key {:X} into V{:X}", key, x);
            state.advance(2);
        }
        None => {
            if state.waiting_for_key.is_none() {
                debug!("waiting for a key press into V{:X}", x);
            }
            state.waiting_for_key = Some(x as u8);
        }
    }
}

/// DT = Vx
pub fn loads(state: &mut State, x: usize) {
    state.delay_timer = state.v[x];
    state.advance(2);
}

/// ST = Vx
pub fn ld(state: &mut State, x: usize) {
    state.sound_timer = state.v[x];
    state.advance(2);
}

/// I += Vx
pub fn addi(state: &mut State, x: usize) {
    state.i = state.i.wrapping_add(u16::from(state.v[x]));
    state.advance(2);
}

/// I = Vx * 5
/// Set I to the memory address of the font glyph for the low nibble of Vx
/// See constants::SPRITE_SHEET for more details
pub fn ldspr(state: &mut State, x: usize) {
    state.i = u16::from(state.v[x] & 0xF) * SPRITE_HEIGHT;
    state.advance(2);
}

/// mem[I..I+3] = bcd(Vx)
/// Store BCD repr of Vx in memory starting at address i
pub fn bcd(state: &mut State, x: usize) {
    let vx = state.v[x];
    let i = state.i as usize;
    state.write(i, vx / 100);
    state.write(i + 1, vx / 10 % 10);
    state.write(i + 2, vx % 10);
    state.advance(2);
}

/// mem[I..=I+x] = V0..=Vx; I += x + 1
pub fn stor(state: &mut State, x: usize) {
    let i = state.i as usize;
    for register in 0..=x {
        state.write(i + register, state.v[register]);
    }
    state.i = state.i.wrapping_add(x as u16 + 1);
    state.advance(2);
}

/// V0..=Vx = mem[I..=I+x]; I += x + 1
pub fn read(state: &mut State, x: usize) {
    let i = state.i as usize;
    for register in 0..=x {
        state.v[register] = state.read(i + register);
    }
    state.i = state.i.wrapping_add(x as u16 + 1);
    state.advance(2);
}
