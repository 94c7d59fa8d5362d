use sdl2::keyboard::Keycode;

/// What a host key means to the emulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// A key on the hexadecimal pad
    Key(u8),
    Quit,
}

/// # Keymap
/// Chip-8 input is generated with a hexadecimal keypad.
///
/// This original layout is mapped to the left 4 alphanumeric columns.
/// ```text
/// |1|2|3|C|      |1|2|3|4|
/// |4|5|6|D|  ->  |Q|W|E|R|
/// |7|8|9|E|  ->  |A|S|D|F|
/// |A|0|B|F|      |Z|X|C|V|
/// ```
/// The rest of the number row types its own digit, and Escape quits.
pub fn keymap(key: Keycode) -> Option<Input> {
    let pad = match key {
        Keycode::X | Keycode::Num0 => 0x0,
        Keycode::Num1 => 0x1,
        Keycode::Num2 => 0x2,
        Keycode::Num3 => 0x3,
        Keycode::Q => 0x4,
        Keycode::W | Keycode::Num5 => 0x5,
        Keycode::E | Keycode::Num6 => 0x6,
        Keycode::A | Keycode::Num7 => 0x7,
        Keycode::S | Keycode::Num8 => 0x8,
        Keycode::D | Keycode::Num9 => 0x9,
        Keycode::Z => 0xA,
        Keycode::C => 0xB,
        Keycode::Num4 => 0xC,
        Keycode::R => 0xD,
        Keycode::F => 0xE,
        Keycode::V => 0xF,
        Keycode::Escape => return Some(Input::Quit),
        _ => return None,
    };
    Some(Input::Key(pad))
}
