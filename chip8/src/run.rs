use std::time::{Duration, Instant};

use anyhow::anyhow;
use log::debug;
use sdl2::event::Event;
use sdl2::keyboard::Keycode;

use emu8_core::Chip8;
use emu8_display::Display;

use crate::keymap::keymap;

/// Keypad key for an SDL keycode, if it has one
fn keypad(key: Keycode) -> Option<u8> {
    let name = key.name();
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => keymap(c),
        _ => None,
    }
}

/// Runs `chip8` in a window until it is closed.
///
/// Space fast-forwards and Escape rewinds while held.
pub fn run(chip8: &mut Chip8, scale: u32) -> anyhow::Result<()> {
    // Get SDL2 context
    let sdl: sdl2::Sdl = sdl2::init().map_err(|e| anyhow!(e))?;
    let mut display: Display = Display::new(&sdl, scale)?;
    let mut events = sdl.event_pump().map_err(|e| anyhow!(e))?;

    // Set initial timing, one frame per timer tick
    let frame_time: Duration = Duration::from_secs(1) / chip8.config().timer_hz.max(1);
    let mut last_frame: Instant = Instant::now();
    let cycles = chip8.config().cycles_per_frame;

    // Whether or not the default clock speed should be respected
    let mut fast_forward: bool = false;
    // Whether the game's state should be cycled forwards or backwards
    let mut rewind: bool = false;
    let mut tone: bool = false;

    'event: loop {
        // Handle input
        for event in events.poll_iter() {
            match event {
                Event::Quit { .. } => break 'event,
                Event::KeyDown {
                    keycode: Some(key), ..
                } => match (key, keypad(key)) {
                    (_, Some(kc)) => chip8.key_press(kc)?,
                    (Keycode::Space, _) => fast_forward = true,
                    (Keycode::Escape, _) => rewind = true,
                    _ => continue,
                },
                Event::KeyUp {
                    keycode: Some(key), ..
                } => match (key, keypad(key)) {
                    (_, Some(kc)) => chip8.key_release(kc)?,
                    (Keycode::Space, _) => fast_forward = false,
                    (Keycode::Escape, _) => rewind = false,
                    _ => continue,
                },
                _ => continue,
            };
        }

        // Update state
        let current_time = Instant::now();
        if rewind {
            for _ in 0..cycles {
                chip8.reverse_cpu();
            }
            // Restored states may predate their own draw
            display.render(chip8.frame())?;
        } else {
            chip8.run_cycles(cycles);
            chip8.advance_timers(current_time - last_frame);
        }

        if chip8.tone_requested() != tone {
            tone = !tone;
            debug!("tone {}", if tone { "on" } else { "off" });
        }

        // Only redraw when the frame changed
        if let Some(frame) = chip8.take_frame() {
            display.render(&frame)?;
        }

        // Handle timing
        let elapsed_frame_time = current_time.elapsed();
        if !fast_forward && frame_time > elapsed_frame_time {
            std::thread::sleep(frame_time - elapsed_frame_time);
        }
        last_frame = current_time;
    }
    Ok(())
}
