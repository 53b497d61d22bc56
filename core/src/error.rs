use std::io;

use thiserror::Error;

/// Everything that can go wrong while loading or running a program.
///
/// None of these are fatal: after any of them the machine is still in a
/// well-defined state and can keep stepping.
#[derive(Debug, Error)]
pub enum MachineError {
    #[error("ROM is {size} bytes but at most {max} fit in program memory")]
    RomTooLarge { size: usize, max: usize },

    #[error("unable to read ROM")]
    RomRead(#[from] io::Error),

    #[error("call at {address:#05X} with a full stack; call ignored")]
    StackOverflow { address: u16 },

    #[error("return at {address:#05X} with an empty stack; return ignored")]
    StackUnderflow { address: u16 },

    #[error("{0:#X} is not a key on the hexadecimal keypad")]
    InvalidKey(u8),
}
