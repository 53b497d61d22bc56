use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::info;

use emu8_core::constants::{CYCLES_PER_FRAME, TIMER_HZ};
use emu8_core::{Chip8, Config};

mod headless;
#[cfg(any(test, feature = "sdl"))]
mod keymap;
#[cfg(feature = "sdl")]
mod run;

#[derive(Parser, Debug)]
#[command(version, about = "A Chip-8 interpreter", long_about = None)]
struct Args {
    /// Path to the ROM file to run
    rom: PathBuf,

    /// Instructions executed per frame
    #[arg(short, long, default_value_t = CYCLES_PER_FRAME)]
    cycles_per_frame: u32,

    /// Rate at which the delay and sound timers count down
    #[arg(long, default_value_t = TIMER_HZ)]
    timer_hz: u32,

    /// Seed for the random number instruction
    #[arg(long)]
    seed: Option<u64>,

    /// Number of past cycles kept for rewinding
    #[arg(long, default_value_t = 0)]
    history: usize,

    /// Run without a window for this many frames, then print the screen
    #[arg(long)]
    frames: Option<u32>,

    /// Size multiplier for each pixel of the window
    #[cfg(feature = "sdl")]
    #[arg(long, default_value_t = 10)]
    scale: u32,
}

impl Args {
    fn config(&self) -> Config {
        let config = Config::default()
            .with_cycles_per_frame(self.cycles_per_frame)
            .with_timer_hz(self.timer_hz)
            .with_history_capacity(self.history);
        match self.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        }
    }
}

/// Frames run when there is no window to drive the loop
const DEFAULT_HEADLESS_FRAMES: u32 = 600;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut chip8 = Chip8::with_config(args.config());
    let file = File::open(&args.rom)
        .with_context(|| format!("unable to open {}", args.rom.display()))?;
    chip8
        .load_rom(&mut BufReader::new(file))
        .with_context(|| format!("unable to load {}", args.rom.display()))?;
    info!("successfully loaded {}", args.rom.display());

    #[cfg(feature = "sdl")]
    if args.frames.is_none() {
        return run::run(&mut chip8, args.scale);
    }

    let frames = args.frames.unwrap_or(DEFAULT_HEADLESS_FRAMES);
    println!("{}", headless::run(&mut chip8, frames));
    Ok(())
}
