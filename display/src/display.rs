use emu8_core::state::FrameBuffer;

#[cfg(feature = "sdl")]
pub use window::{Display, DisplayError};

/// Formats a Chip-8 FrameBuffer for rendering as an SDL2 RGB24 texture.
///
/// An SDL2 texture is a 1D array of ints that represent concatenated rows of RGB pixels.
///
/// This creates a black and white rendering by:
/// - Flattening the 2D frame buffer into a 1D array by concatenating its rows
/// - Triplicating each element of that 1D array to represent the RGB values of each pixel
/// - Mapping lit pixels to full intensity
///
/// # Arguments
/// * `frame` a Chip-8 FrameBuffer
pub fn frame_to_sdl_texture(frame: &FrameBuffer) -> Vec<u8> {
    frame
        .iter()
        .flat_map(|row| row.iter())
        .flat_map(|lit| std::iter::repeat(if *lit { 255 } else { 0 }).take(3))
        .collect()
}

/// Renders a FrameBuffer as text, one line per row, `#` for lit pixels
pub fn frame_to_ascii(frame: &FrameBuffer) -> String {
    frame
        .iter()
        .map(|row| {
            row.iter()
                .map(|lit| if *lit { '#' } else { '.' })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(feature = "sdl")]
mod window {
    use sdl2::pixels::PixelFormatEnum;
    use thiserror::Error;

    use emu8_core::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH};
    use emu8_core::state::FrameBuffer;

    use super::frame_to_sdl_texture;

    /// SDL reports its failures as strings
    #[derive(Debug, Error)]
    #[error("SDL error: {0}")]
    pub struct DisplayError(String);

    fn sdl_error(e: impl ToString) -> DisplayError {
        DisplayError(e.to_string())
    }

    /// # Display
    /// The Chip-8 display is composed of 64x32 black/white pixels.
    /// The display only gets a call to `render` when the Chip-8 FrameBuffer is updated.
    pub struct Display {
        canvas: sdl2::render::WindowCanvas,
    }

    impl Display {
        /// Creates a new display object bound to an sdl2 context.
        ///
        /// # Arguments
        /// * `sdl` an sdl2 context with which to draw
        /// * `scale` the size multiplier for each pixel
        pub fn new(sdl: &sdl2::Sdl, scale: u32) -> Result<Self, DisplayError> {
            let video_subsystem = sdl.video().map_err(sdl_error)?;
            let window = video_subsystem
                .window(
                    "Emu-8",
                    DISPLAY_WIDTH as u32 * scale,
                    DISPLAY_HEIGHT as u32 * scale,
                )
                .position_centered()
                .opengl()
                .build()
                .map_err(sdl_error)?;
            let canvas = window.into_canvas().build().map_err(sdl_error)?;

            Ok(Display { canvas })
        }

        /// Formats the Chip-8 FrameBuffer as an SDL2 RGB24 texture and renders it.
        ///
        /// # Arguments
        /// * `frame` a Chip-8 FrameBuffer
        pub fn render(&mut self, frame: &FrameBuffer) -> Result<(), DisplayError> {
            let texture_creator = self.canvas.texture_creator();

            let mut texture = texture_creator
                .create_texture_streaming(
                    PixelFormatEnum::RGB24,
                    DISPLAY_WIDTH as u32,
                    DISPLAY_HEIGHT as u32,
                )
                .map_err(sdl_error)?;

            let pixels = frame_to_sdl_texture(frame);
            texture
                .with_lock(None, |buffer: &mut [u8], pitch: usize| {
                    for (row, line) in pixels.chunks(DISPLAY_WIDTH * 3).enumerate() {
                        buffer[row * pitch..row * pitch + line.len()].copy_from_slice(line);
                    }
                })
                .map_err(sdl_error)?;

            self.canvas.copy(&texture, None, None).map_err(sdl_error)?;
            self.canvas.present();
            Ok(())
        }
    }
}
