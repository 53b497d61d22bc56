pub use chip8::Chip8;
pub use config::Config;
pub use error::MachineError;
pub use instruction::Instruction;
pub use timer::TimerClock;

mod chip8;
pub mod config;
pub mod constants;
mod error;
mod instruction;
mod opcode;
mod operations;
pub mod state;
mod timer;
