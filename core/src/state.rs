use crate::constants::{
    ADDRESS_MASK, DISPLAY_HEIGHT, DISPLAY_WIDTH, FONT_START, MEMORY_SIZE, PROGRAM_START,
    SPRITE_SHEET, STACK_SIZE,
};

/// The FrameBuffer is indexed as [y][x]; `true` means the pixel is lit
pub type FrameBuffer = [[bool; DISPLAY_WIDTH]; DISPLAY_HEIGHT];

/// Pressed status of the keys 0..F
pub type Keys = [bool; 16];

/// Progress of an `FX0A` key wait.
///
/// A key only counts once it has been pressed *and* released, otherwise a key
/// still held from the previous frame would satisfy the wait instantly.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum KeyWait {
    /// Normal execution
    Idle,
    /// `FX0A` ran while no key was down
    AwaitingPress { register: u8 },
    /// `key` went down; it gets written to `register` once it comes back up
    AwaitingRelease { register: u8, key: u8 },
}

/// A snapshot of the Chip8 internal state
///
/// ## CPU
/// Registers
/// - (v) 16 primary 8-bit registers (V0..VF)
///     - VF doubles as the carry, borrow and collision flag
/// - (i) a 16-bit memory address register
///
/// Counter
/// - (pc) a 16-bit program counter
///
/// Pointer
/// - (sp) the number of return addresses on the stack
///
/// Timers
/// - 2 8-bit timers (delay & sound), decremented at 60Hz
/// - a tone is requested while the sound timer is non-zero
///
/// ## Memory
/// - 16 entry stack of return addresses
/// - 4096 bytes of addressable memory
///     - 0x050..0x0A0 holds the font
///     - 0x200.. holds the program
/// - 64x32 frame buffer
///
/// ## Input
/// - `key_wait` tracks an in-flight `FX0A`; emulation doesn't fetch new
///   instructions until it is back to `Idle`
#[derive(Copy, Clone, PartialEq)]
pub struct State {
    pub v: [u8; 16],
    pub i: u16,
    pub pc: u16,
    pub sp: u8,
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub stack: [u16; STACK_SIZE],
    pub memory: [u8; MEMORY_SIZE],
    pub frame_buffer: FrameBuffer,
    pub draw_flag: bool,
    pub key_wait: KeyWait,
}

impl State {
    pub fn new() -> Self {
        let mut memory = [0; MEMORY_SIZE];
        let font = FONT_START as usize;
        memory[font..font + SPRITE_SHEET.len()].copy_from_slice(&SPRITE_SHEET);

        State {
            v: [0; 16],
            i: 0,
            pc: PROGRAM_START,
            sp: 0,
            delay_timer: 0,
            sound_timer: 0,
            stack: [0; STACK_SIZE],
            memory,
            frame_buffer: [[false; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
            draw_flag: false,
            key_wait: KeyWait::Idle,
        }
    }

    /// Reads a byte, wrapping the address onto the 12-bit address space
    pub fn read_byte(&self, address: u16) -> u8 {
        self.memory[(address & ADDRESS_MASK) as usize]
    }

    /// Writes a byte, wrapping the address onto the 12-bit address space
    pub fn write_byte(&mut self, address: u16, value: u8) {
        self.memory[(address & ADDRESS_MASK) as usize] = value;
    }

    /// Whether the pixel at (x, y) is lit; coordinates off the screen are never lit
    pub fn pixel_at(&self, x: usize, y: usize) -> bool {
        x < DISPLAY_WIDTH && y < DISPLAY_HEIGHT && self.frame_buffer[y][x]
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}
