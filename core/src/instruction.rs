use rand::Rng;

use crate::error::MachineError;
use crate::opcode::Opcode;
use crate::operations::*;
use crate::state::{Keys, State};

/// A decoded Chip-8 instruction with its operands pulled out of the opcode.
///
/// `x` and `y` are register indices, `nn` an 8-bit immediate and `addr` a
/// 12-bit address.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// 0NNN: machine code routine; ignored
    Sys(u16),
    /// 00E0
    Clear,
    /// 00EE
    Return,
    /// 1NNN
    Jump(u16),
    /// 2NNN
    Call(u16),
    /// 3XNN
    SkipEqImm { x: u8, nn: u8 },
    /// 4XNN
    SkipNeImm { x: u8, nn: u8 },
    /// 5XY0
    SkipEqReg { x: u8, y: u8 },
    /// 6XNN
    LoadImm { x: u8, nn: u8 },
    /// 7XNN
    AddImm { x: u8, nn: u8 },
    /// 8XY0
    Move { x: u8, y: u8 },
    /// 8XY1
    Or { x: u8, y: u8 },
    /// 8XY2
    And { x: u8, y: u8 },
    /// 8XY3
    Xor { x: u8, y: u8 },
    /// 8XY4
    AddReg { x: u8, y: u8 },
    /// 8XY5
    Sub { x: u8, y: u8 },
    /// 8XY6
    ShiftRight { x: u8 },
    /// 8XY7
    SubN { x: u8, y: u8 },
    /// 8XYE
    ShiftLeft { x: u8 },
    /// 9XY0
    SkipNeReg { x: u8, y: u8 },
    /// ANNN
    LoadIndex(u16),
    /// BNNN
    JumpOffset(u16),
    /// CXNN
    Random { x: u8, nn: u8 },
    /// DXYN
    Draw { x: u8, y: u8, n: u8 },
    /// EX9E
    SkipKeyPressed { x: u8 },
    /// EXA1
    SkipKeyReleased { x: u8 },
    /// FX07
    LoadDelay { x: u8 },
    /// FX0A
    WaitKey { x: u8 },
    /// FX15
    SetDelay { x: u8 },
    /// FX18
    SetSound { x: u8 },
    /// FX1E
    AddIndex { x: u8 },
    /// FX29
    LoadGlyph { x: u8 },
    /// FX33
    StoreBcd { x: u8 },
    /// FX55
    StoreRegisters { x: u8 },
    /// FX65
    LoadRegisters { x: u8 },
    /// Anything else; executes as a no-op
    Unknown(u16),
}

impl Instruction {
    /// Selects the correct Instruction for a given Opcode
    pub fn decode(op: u16) -> Self {
        let (x, y, n, nn, addr) = (op.x(), op.y(), op.n(), op.nn(), op.nnn());
        match op.nibbles() {
            (0x0, 0x0, 0xE, 0x0) => Instruction::Clear,
            (0x0, 0x0, 0xE, 0xE) => Instruction::Return,
            (0x0, ..) => Instruction::Sys(addr),
            (0x1, ..) => Instruction::Jump(addr),
            (0x2, ..) => Instruction::Call(addr),
            (0x3, ..) => Instruction::SkipEqImm { x, nn },
            (0x4, ..) => Instruction::SkipNeImm { x, nn },
            (0x5, .., 0x0) => Instruction::SkipEqReg { x, y },
            (0x6, ..) => Instruction::LoadImm { x, nn },
            (0x7, ..) => Instruction::AddImm { x, nn },
            (0x8, .., 0x0) => Instruction::Move { x, y },
            (0x8, .., 0x1) => Instruction::Or { x, y },
            (0x8, .., 0x2) => Instruction::And { x, y },
            (0x8, .., 0x3) => Instruction::Xor { x, y },
            (0x8, .., 0x4) => Instruction::AddReg { x, y },
            (0x8, .., 0x5) => Instruction::Sub { x, y },
            (0x8, .., 0x6) => Instruction::ShiftRight { x },
            (0x8, .., 0x7) => Instruction::SubN { x, y },
            (0x8, .., 0xE) => Instruction::ShiftLeft { x },
            (0x9, .., 0x0) => Instruction::SkipNeReg { x, y },
            (0xA, ..) => Instruction::LoadIndex(addr),
            (0xB, ..) => Instruction::JumpOffset(addr),
            (0xC, ..) => Instruction::Random { x, nn },
            (0xD, ..) => Instruction::Draw { x, y, n },
            (0xE, .., 0x9, 0xE) => Instruction::SkipKeyPressed { x },
            (0xE, .., 0xA, 0x1) => Instruction::SkipKeyReleased { x },
            (0xF, .., 0x0, 0x7) => Instruction::LoadDelay { x },
            (0xF, .., 0x0, 0xA) => Instruction::WaitKey { x },
            (0xF, .., 0x1, 0x5) => Instruction::SetDelay { x },
            (0xF, .., 0x1, 0x8) => Instruction::SetSound { x },
            (0xF, .., 0x1, 0xE) => Instruction::AddIndex { x },
            (0xF, .., 0x2, 0x9) => Instruction::LoadGlyph { x },
            (0xF, .., 0x3, 0x3) => Instruction::StoreBcd { x },
            (0xF, .., 0x5, 0x5) => Instruction::StoreRegisters { x },
            (0xF, .., 0x6, 0x5) => Instruction::LoadRegisters { x },
            _ => Instruction::Unknown(op),
        }
    }

    /// Applies the instruction to `state`.
    ///
    /// `state.pc` must already point past this instruction; jumps, calls and
    /// skips set it relative to that.
    pub fn execute<R: Rng>(
        self,
        state: &State,
        keys: &Keys,
        rng: &mut R,
    ) -> Result<State, MachineError> {
        let next = match self {
            Instruction::Sys(_) | Instruction::Unknown(_) => *state,
            Instruction::Clear => clr(state),
            Instruction::Return => rts(state)?,
            Instruction::Jump(nnn) => jump(nnn, state),
            Instruction::Call(nnn) => call(nnn, state)?,
            Instruction::SkipEqImm { x, nn } => skip_if(state, state.v[x as usize] == nn),
            Instruction::SkipNeImm { x, nn } => skip_if(state, state.v[x as usize] != nn),
            Instruction::SkipEqReg { x, y } => {
                skip_if(state, state.v[x as usize] == state.v[y as usize])
            }
            Instruction::LoadImm { x, nn } => load(x, nn, state),
            Instruction::AddImm { x, nn } => add(x, nn, state),
            Instruction::Move { x, y } => mv(x, y, state),
            Instruction::Or { x, y } => or(x, y, state),
            Instruction::And { x, y } => and(x, y, state),
            Instruction::Xor { x, y } => xor(x, y, state),
            Instruction::AddReg { x, y } => addr(x, y, state),
            Instruction::Sub { x, y } => sub(x, y, state),
            Instruction::ShiftRight { x } => shr(x, state),
            Instruction::SubN { x, y } => subn(x, y, state),
            Instruction::ShiftLeft { x } => shl(x, state),
            Instruction::SkipNeReg { x, y } => {
                skip_if(state, state.v[x as usize] != state.v[y as usize])
            }
            Instruction::LoadIndex(nnn) => loadi(nnn, state),
            Instruction::JumpOffset(nnn) => jumpi(nnn, state),
            Instruction::Random { x, nn } => rnd(x, nn, rng.gen(), state),
            Instruction::Draw { x, y, n } => draw(x, y, n, state),
            Instruction::SkipKeyPressed { x } => {
                skip_if(state, key_down(keys, state.v[x as usize]))
            }
            Instruction::SkipKeyReleased { x } => {
                skip_if(state, !key_down(keys, state.v[x as usize]))
            }
            Instruction::LoadDelay { x } => moved(x, state),
            Instruction::WaitKey { x } => keyd(x, state, keys),
            Instruction::SetDelay { x } => loads(x, state),
            Instruction::SetSound { x } => ld(x, state),
            Instruction::AddIndex { x } => addi(x, state),
            Instruction::LoadGlyph { x } => ldspr(x, state),
            Instruction::StoreBcd { x } => bcd(x, state),
            Instruction::StoreRegisters { x } => stor(x, state),
            Instruction::LoadRegisters { x } => read(x, state),
        };
        Ok(next)
    }
}

/// Only keys 0..F exist; anything else in Vx is never pressed
fn key_down(keys: &Keys, key: u8) -> bool {
    keys.get(key as usize).copied().unwrap_or(false)
}
