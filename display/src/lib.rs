pub use display::{frame_to_ascii, frame_to_sdl_texture};
#[cfg(feature = "sdl")]
pub use display::{Display, DisplayError};

mod display;
