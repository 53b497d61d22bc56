use log::info;

use emu8_core::Chip8;
use emu8_display::frame_to_ascii;

/// Runs `frames` frames as fast as possible with no input, then returns the
/// final screen as text.
pub fn run(chip8: &mut Chip8, frames: u32) -> String {
    let mut errors = 0;
    let mut tone_frames = 0;
    for _ in 0..frames {
        errors += chip8.run_frame().len();
        if chip8.tone_requested() {
            tone_frames += 1;
        }
    }
    info!(
        "ran {} frames: {} errors, tone requested for {} frames",
        frames, errors, tone_frames
    );
    frame_to_ascii(chip8.frame())
}
