use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::Parser;
use log::{error, info};

use display::{Display, Palette};
use engine::{AudioQueue, Chip8, Config};

mod audio;
mod keymap;
mod run;

#[derive(Parser, Debug)]
#[command(version, about = "A Chip-8 interpreter", long_about = None)]
struct Args {
    /// Path to the ROM file to run
    rom: PathBuf,

    /// Instructions executed per 1/60 s frame
    #[arg(short, long, default_value_t = Config::default().instructions_per_frame)]
    ipf: usize,

    /// Size multiplier for each display pixel
    #[arg(short, long, default_value_t = 10)]
    scale: u32,

    /// Requested audio sample rate in Hz
    #[arg(long, default_value_t = Config::default().sample_rate)]
    sample_rate: u32,

    /// Don't open an audio device
    #[arg(long)]
    mute: bool,

    /// Draw dark pixels on a light background
    #[arg(long)]
    invert: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if let Err(e) = emulate(&args) {
        error!("{:#}", e);
        process::exit(1);
    }
}

fn emulate(args: &Args) -> anyhow::Result<()> {
    let sdl = sdl2::init()
        .map_err(anyhow::Error::msg)
        .context("unable to initialise sdl2")?;

    let config = Config {
        instructions_per_frame: args.ipf,
        sample_rate: args.sample_rate,
        ..Config::default()
    };

    // The device has to outlive the run loop or the callback stops
    let (mut chip8, _device) = if args.mute {
        (Chip8::new(config), None)
    } else {
        let queue = AudioQueue::new();
        let device = audio::open(&sdl, queue.clone(), &config)
            .map_err(anyhow::Error::msg)
            .context("unable to open audio device")?;
        let config = Config {
            sample_rate: device.spec().freq as u32,
            ..config
        };
        (Chip8::with_audio(config, queue), Some(device))
    };

    // Load ROM
    let file = File::open(&args.rom)
        .with_context(|| format!("unable to open {}", args.rom.display()))?;
    chip8
        .load_rom(&mut BufReader::new(file))
        .with_context(|| format!("unable to load {}", args.rom.display()))?;
    info!("running {}", args.rom.display());

    let title = args
        .rom
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| String::from("Emu-8"));
    let mut display = Display::new(&sdl, &title, args.scale)?;
    if args.invert {
        display = display.with_palette(Palette::default().inverted());
    }

    run::run(&sdl, &mut chip8, &mut display)
}
