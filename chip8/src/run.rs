use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use log::info;
use sdl2::event::Event;

use display::Display;
use engine::Chip8;

use crate::keymap::{keymap, Input};

/// How long to idle when no frame is due or the program is waiting for a key.
const IDLE: Duration = Duration::from_micros(1_000_000 / 60);

/// Drives `chip8` until the window is closed, Escape is pressed, or execution halts.
///
/// Each iteration runs the current instruction budget, applies input, then
/// reconciles timers and audio against wall-clock time and presents the
/// display if at least one frame came due.
pub fn run(sdl: &sdl2::Sdl, chip8: &mut Chip8, display: &mut Display) -> anyhow::Result<()> {
    let mut events = sdl.event_pump().map_err(anyhow::Error::msg)?;

    let start = Instant::now();
    let mut budget = chip8.config().instructions_per_frame;

    'event: loop {
        chip8.run(budget).context("execution halted")?;

        // Handle input
        for event in events.poll_iter() {
            match event {
                Event::Quit { .. } => break 'event,
                Event::KeyDown {
                    keycode: Some(key), ..
                } => match keymap(key) {
                    Some(Input::Key(pad)) => chip8.set_key(pad, true),
                    Some(Input::Quit) => break 'event,
                    None => continue,
                },
                Event::KeyUp {
                    keycode: Some(key), ..
                } => {
                    if let Some(Input::Key(pad)) = keymap(key) {
                        chip8.set_key(pad, false);
                    }
                }
                _ => continue,
            };
        }

        // Timers, audio and presentation all come from the same reconciliation
        let tick = chip8.tick_frame(start.elapsed());
        if tick.frames > 0 {
            display.render(chip8.get_display())?;
        }
        budget = tick.budget;

        if chip8.is_waiting_for_key() || tick.frames == 0 {
            thread::sleep(IDLE);
        }
    }

    info!("stopped after {:.1}s", start.elapsed().as_secs_f64());
    Ok(())
}
