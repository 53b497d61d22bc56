/// Bytes of addressable memory
pub const MEMORY_SIZE: usize = 4096;

/// Addresses are 12 bits wide; anything derived from the index register or the
/// program counter is masked with this before touching memory.
pub const ADDRESS_MASK: u16 = 0x0FFF;

/// ROMs are loaded (and execution starts) here
pub const PROGRAM_START: u16 = 0x200;

/// The largest ROM that fits between `PROGRAM_START` and the end of memory
pub const MAX_ROM_SIZE: usize = MEMORY_SIZE - PROGRAM_START as usize;

/// Where the built-in hexadecimal font lives
pub const FONT_START: u16 = 0x050;

/// Each font glyph is 5 rows tall
pub const FONT_GLYPH_SIZE: u16 = 5;

pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;

/// Maximum depth of nested subroutine calls
pub const STACK_SIZE: usize = 16;

/// Instructions executed per 60Hz frame by default
pub const CYCLES_PER_FRAME: u32 = 8;

/// Rate at which the delay and sound timers count down
pub const TIMER_HZ: u32 = 60;

/// # Sprite sheet
/// Sprites for the hexadecimal digits 0..F, each 4 pixels wide and 5 tall.
/// ```text
/// 0xF0  ****
/// 0x90  *  *
/// 0x90  *  *
/// 0x90  *  *
/// 0xF0  ****
/// ```
pub const SPRITE_SHEET: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];
