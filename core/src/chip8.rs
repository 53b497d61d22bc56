use std::collections::VecDeque;
use std::io::Read;
use std::time::Duration;

use log::{debug, trace, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::Config;
use crate::constants::{ADDRESS_MASK, MAX_ROM_SIZE, PROGRAM_START};
use crate::error::MachineError;
use crate::instruction::Instruction;
use crate::opcode;
use crate::operations;
use crate::state::{FrameBuffer, KeyWait, Keys, State};
use crate::timer::TimerClock;

/// # Chip-8
/// Chip-8 is a virtual machine and corresponding interpreted language.
///
/// Tracks:
///  - current `state`
///  - `previous_states` for rewinding
///  - `pressed_keys`, the latest snapshot reported by the frontend
///
/// Supplies interfaces for:
/// - loading roms
/// - pressing and releasing keys
/// - advancing and reversing the CPU
/// - advancing its timers
/// - inspecting its frame buffer for rendering by some display
pub struct Chip8 {
    state: State,
    previous_states: VecDeque<State>,
    pressed_keys: Keys,
    config: Config,
    rng: StdRng,
    timer_clock: TimerClock,
}

impl Chip8 {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Chip8 {
            state: State::new(),
            previous_states: VecDeque::with_capacity(config.history_capacity),
            pressed_keys: [false; 16],
            timer_clock: TimerClock::new(config.timer_hz),
            config,
            rng,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Read-only view of the machine state
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Load a rom from some source
    ///
    /// Memory is left untouched if the source can't be read or holds more than
    /// `MAX_ROM_SIZE` bytes.
    ///
    /// # Arguments
    /// * `reader` a reader over the raw ROM bytes
    pub fn load_rom(&mut self, reader: &mut dyn Read) -> Result<(), MachineError> {
        // One byte past the limit is enough to tell the ROM is too large
        let mut rom = Vec::with_capacity(MAX_ROM_SIZE + 1);
        reader.take(MAX_ROM_SIZE as u64 + 1).read_to_end(&mut rom)?;
        self.load_rom_bytes(&rom)
    }

    /// Copies `rom` into memory starting at `PROGRAM_START`
    pub fn load_rom_bytes(&mut self, rom: &[u8]) -> Result<(), MachineError> {
        if rom.len() > MAX_ROM_SIZE {
            return Err(MachineError::RomTooLarge {
                size: rom.len(),
                max: MAX_ROM_SIZE,
            });
        }
        let start = PROGRAM_START as usize;
        self.state.memory[start..start + rom.len()].copy_from_slice(rom);
        debug!("loaded {} byte ROM at {:#05X}", rom.len(), PROGRAM_START);
        Ok(())
    }

    /// Whether the pixel at (x, y) is lit
    pub fn pixel_at(&self, x: usize, y: usize) -> bool {
        self.state.pixel_at(x, y)
    }

    /// The current frame, whether or not it changed
    pub fn frame(&self) -> &FrameBuffer {
        &self.state.frame_buffer
    }

    /// Returns the FrameBuffer if the display should be redrawn and clears the
    /// draw flag, so each change is handed out once
    pub fn take_frame(&mut self) -> Option<FrameBuffer> {
        if self.state.draw_flag {
            self.state.draw_flag = false;
            Some(self.state.frame_buffer)
        } else {
            None
        }
    }

    /// Whether a tone should currently be playing
    pub fn tone_requested(&self) -> bool {
        self.state.sound_timer > 0
    }

    /// Whether execution is stalled on an `FX0A`
    pub fn is_waiting_for_key(&self) -> bool {
        self.state.key_wait != KeyWait::Idle
    }

    /// Replaces the key snapshot with a single pressed key, or none
    ///
    /// # Arguments
    /// * `key` the 4-bit representation of the pressed key
    pub fn set_key(&mut self, key: Option<u8>) -> Result<(), MachineError> {
        let mut pressed_keys = [false; 16];
        if let Some(key) = key {
            pressed_keys[Self::key_index(key)?] = true;
        }
        self.pressed_keys = pressed_keys;
        Ok(())
    }

    /// Set the pressed status of key
    ///
    /// # Arguments
    /// * `key` the 4-bit representation of the key that was pressed
    pub fn key_press(&mut self, key: u8) -> Result<(), MachineError> {
        self.pressed_keys[Self::key_index(key)?] = true;
        Ok(())
    }

    /// Unset the pressed status of key
    ///
    /// # Arguments
    /// * `key` the 4-bit representation of the key that was released
    pub fn key_release(&mut self, key: u8) -> Result<(), MachineError> {
        self.pressed_keys[Self::key_index(key)?] = false;
        Ok(())
    }

    fn key_index(key: u8) -> Result<usize, MachineError> {
        if key > 0xF {
            return Err(MachineError::InvalidKey(key));
        }
        Ok(key as usize)
    }

    /// Advances the CPU by a single cycle
    /// - polls the keys instead if awaiting a key press/release
    /// - otherwise gets and executes the next opcode
    ///
    /// Errors are reported after the faulting instruction has been skipped;
    /// the machine can keep stepping.
    pub fn advance_cpu(&mut self) -> Result<(), MachineError> {
        let previous = self.state;
        let result = if self.state.key_wait == KeyWait::Idle {
            self.execute_next()
        } else {
            self.state = operations::poll_key(&self.state, &self.pressed_keys);
            if self.state.key_wait != previous.key_wait {
                debug!("key wait {:?} -> {:?}", previous.key_wait, self.state.key_wait);
            }
            Ok(())
        };
        self.save_state(previous);
        result
    }

    fn execute_next(&mut self) -> Result<(), MachineError> {
        let op = self.get_op();
        let instruction = Instruction::decode(op);
        trace!(
            "{:04X} v{:02X?} i{:04X} pc{:04X}",
            op,
            self.state.v,
            self.state.i,
            self.state.pc
        );
        match instruction {
            Instruction::Unknown(_) => debug!("ignoring unknown opcode {:04X}", op),
            Instruction::Sys(addr) => debug!("ignoring machine code call to {:03X}", addr),
            _ => {}
        }

        let fetched = State {
            pc: self.state.pc.wrapping_add(0x2) & ADDRESS_MASK,
            ..self.state
        };
        match instruction.execute(&fetched, &self.pressed_keys, &mut self.rng) {
            Ok(state) => {
                self.state = state;
                Ok(())
            }
            Err(e) => {
                warn!("{}", e);
                self.state = fetched;
                Err(e)
            }
        }
    }

    /// Runs one frame's worth of cycles then ticks the timers once.
    ///
    /// Errors don't stop the frame; every one raised is returned.
    pub fn run_frame(&mut self) -> Vec<MachineError> {
        let errors = self.run_cycles(self.config.cycles_per_frame);
        self.tick_timers();
        errors
    }

    /// Runs `cycles` cycles without touching the timers
    pub fn run_cycles(&mut self, cycles: u32) -> Vec<MachineError> {
        (0..cycles)
            .filter_map(|_| self.advance_cpu().err())
            .collect()
    }

    /// Reverses the CPU by a single cycle if possible
    /// - if there are previous_states, pops the last one and restores it
    ///
    /// Returns whether a state was restored
    pub fn reverse_cpu(&mut self) -> bool {
        match self.previous_states.pop_front() {
            Some(state) => {
                self.state = state;
                true
            }
            None => false,
        }
    }

    /// Puts `state` in previous_states
    /// - if there are already `history_capacity` saved then the oldest is dropped
    fn save_state(&mut self, state: State) {
        if self.config.history_capacity == 0 {
            return;
        }
        if self.previous_states.len() == self.config.history_capacity {
            self.previous_states.pop_back();
        }
        self.previous_states.push_front(state);
    }

    /// Decrements both timers once, stopping at zero
    pub fn tick_timers(&mut self) {
        self.state.delay_timer = self.state.delay_timer.saturating_sub(1);
        self.state.sound_timer = self.state.sound_timer.saturating_sub(1);
    }

    /// Ticks the timers once for every full timer period in `elapsed`.
    /// Keeps the timers at their rate when frames and cycles aren't 60Hz.
    ///
    /// Returns the number of ticks applied
    pub fn advance_timers(&mut self, elapsed: Duration) -> u32 {
        let ticks = self.timer_clock.advance(elapsed);
        for _ in 0..ticks {
            self.tick_timers();
        }
        ticks
    }

    /// Gets the opcode currently pointed at by the pc.
    /// Memory is stored as bytes, but opcodes are 16 bits so we combine two subsequent bytes.
    fn get_op(&self) -> u16 {
        let pc = self.state.pc;
        opcode::from_bytes(
            self.state.read_byte(pc),
            self.state.read_byte(pc.wrapping_add(1)),
        )
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_program(program: &[u8]) -> Chip8 {
        let mut chip8 = Chip8::with_config(Config::default().with_seed(0));
        chip8.load_rom_bytes(program).unwrap();
        chip8
    }

    #[test]
    fn test_chip8_gets_op() {
        let mut chip8 = Chip8::new();
        chip8.state.memory[0x200..0x202].copy_from_slice(&[0xAA, 0xBB]);
        assert_eq!(chip8.get_op(), 0xAABB);
    }

    #[test]
    fn test_chip8_gets_op_across_end_of_memory() {
        let mut chip8 = Chip8::new();
        chip8.state.pc = 0xFFF;
        chip8.state.memory[0xFFF] = 0x12;
        chip8.state.memory[0x000] = 0x34;
        assert_eq!(chip8.get_op(), 0x1234);
    }

    #[test]
    fn test_cycles_while_no_key_wait() {
        let mut chip8 = with_program(&[0x00, 0xE0]);
        let starting_pc = chip8.state.pc;
        chip8.advance_cpu().unwrap();
        assert_eq!(chip8.state.pc, starting_pc + 0x2);
    }

    #[test]
    fn test_doesnt_fetch_while_waiting_for_key() {
        let mut chip8 = with_program(&[0x61, 0x01]);
        chip8.state.key_wait = KeyWait::AwaitingPress { register: 0x1 };
        chip8.advance_cpu().unwrap();
        assert_eq!(chip8.state.pc, 0x200);
        assert_eq!(chip8.state.v[0x1], 0x0);
    }

    #[test]
    fn test_failed_instruction_is_skipped() {
        // RET with nothing on the stack, then LD V1, 0x01
        let mut chip8 = with_program(&[0x00, 0xEE, 0x61, 0x01]);
        let result = chip8.advance_cpu();
        assert!(matches!(
            result,
            Err(MachineError::StackUnderflow { address: 0x200 })
        ));
        assert_eq!(chip8.state.pc, 0x202);
        chip8.advance_cpu().unwrap();
        assert_eq!(chip8.state.v[0x1], 0x1);
    }

    #[test]
    fn test_take_frame_clears_draw_flag() {
        let mut chip8 = with_program(&[0x00, 0xE0]);
        assert!(chip8.take_frame().is_none());
        chip8.advance_cpu().unwrap();
        assert!(chip8.take_frame().is_some());
        assert!(chip8.take_frame().is_none());
    }

    #[test]
    fn test_rejects_invalid_keys() {
        let mut chip8 = Chip8::new();
        assert!(matches!(
            chip8.key_press(0x10),
            Err(MachineError::InvalidKey(0x10))
        ));
        assert!(chip8.set_key(Some(0x20)).is_err());
    }

    #[test]
    fn test_set_key_replaces_snapshot() {
        let mut chip8 = Chip8::new();
        chip8.key_press(0x1).unwrap();
        chip8.set_key(Some(0x2)).unwrap();
        assert!(!chip8.pressed_keys[0x1]);
        assert!(chip8.pressed_keys[0x2]);
        chip8.set_key(None).unwrap();
        assert_eq!(chip8.pressed_keys, [false; 16]);
    }

    #[test]
    fn test_tick_timers_stops_at_zero() {
        let mut chip8 = Chip8::new();
        chip8.state.delay_timer = 1;
        chip8.state.sound_timer = 2;
        assert!(chip8.tone_requested());
        chip8.tick_timers();
        chip8.tick_timers();
        chip8.tick_timers();
        assert_eq!(chip8.state.delay_timer, 0);
        assert_eq!(chip8.state.sound_timer, 0);
        assert!(!chip8.tone_requested());
    }

    #[test]
    fn test_advance_timers_follows_wall_clock() {
        let mut chip8 = Chip8::new();
        chip8.state.delay_timer = 100;
        assert_eq!(chip8.advance_timers(Duration::from_millis(500)), 30);
        assert_eq!(chip8.state.delay_timer, 70);
    }

    #[test]
    fn test_advance_timers_uses_configured_rate() {
        let mut chip8 = Chip8::with_config(Config::default().with_timer_hz(120));
        chip8.state.sound_timer = 100;
        assert_eq!(chip8.advance_timers(Duration::from_millis(500)), 60);
        assert_eq!(chip8.state.sound_timer, 40);
    }

    #[test]
    fn test_no_history_by_default() {
        let mut chip8 = with_program(&[0x00, 0xE0]);
        chip8.advance_cpu().unwrap();
        assert!(chip8.previous_states.is_empty());
        assert!(!chip8.reverse_cpu());
    }

    #[test]
    fn test_chip8_drops_old_saved_states() {
        let mut chip8 = Chip8::with_config(Config::default().with_history_capacity(4));
        for _ in 0..4 {
            chip8.save_state(chip8.state);
        }
        assert_eq!(chip8.previous_states.len(), 4);
        chip8.save_state(chip8.state);
        assert_eq!(chip8.previous_states.len(), 4);
    }

    #[test]
    fn test_chip8_reverses_cycles() {
        let mut chip8 = Chip8::with_config(Config::default().with_history_capacity(8));
        chip8.load_rom_bytes(&[0x61, 0x01, 0x62, 0x02]).unwrap();
        chip8.advance_cpu().unwrap();
        chip8.advance_cpu().unwrap();
        assert_eq!(chip8.state.v[0x2], 0x2);
        assert!(chip8.reverse_cpu());
        assert_eq!(chip8.state.pc, 0x202);
        assert_eq!(chip8.state.v[0x2], 0x0);
        assert!(chip8.reverse_cpu());
        assert_eq!(chip8.state.pc, 0x200);
        assert!(!chip8.reverse_cpu());
    }
}
