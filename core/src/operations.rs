use crate::constants::{
    ADDRESS_MASK, DISPLAY_HEIGHT, DISPLAY_WIDTH, FONT_GLYPH_SIZE, FONT_START, STACK_SIZE,
};
use crate::error::MachineError;
use crate::state::{KeyWait, Keys, State};

// Every operation receives the state with `pc` already pointing at the next
// instruction and returns the state after execution.

/// Address of the instruction currently executing
fn current_address(state: &State) -> u16 {
    state.pc.wrapping_sub(0x2) & ADDRESS_MASK
}

/// if condition then pc += 2
pub fn skip_if(state: &State, condition: bool) -> State {
    let pc = if condition {
        state.pc.wrapping_add(0x2) & ADDRESS_MASK
    } else {
        state.pc
    };
    State { pc, ..*state }
}

/// clear
pub fn clr(state: &State) -> State {
    State {
        frame_buffer: [[false; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
        draw_flag: true,
        ..*state
    }
}

/// PC = STACK.pop()
pub fn rts(state: &State) -> Result<State, MachineError> {
    if state.sp == 0 {
        return Err(MachineError::StackUnderflow {
            address: current_address(state),
        });
    }
    let sp = state.sp - 0x1;
    Ok(State {
        pc: state.stack[sp as usize],
        sp,
        ..*state
    })
}

/// PC = addr
pub fn jump(addr: u16, state: &State) -> State {
    State { pc: addr, ..*state }
}

/// STACK.push(PC); PC = addr
pub fn call(addr: u16, state: &State) -> Result<State, MachineError> {
    if state.sp as usize >= STACK_SIZE {
        return Err(MachineError::StackOverflow {
            address: current_address(state),
        });
    }
    let mut stack = state.stack;
    stack[state.sp as usize] = state.pc;
    Ok(State {
        pc: addr,
        sp: state.sp + 0x1,
        stack,
        ..*state
    })
}

/// Vx = nn
pub fn load(x: u8, nn: u8, state: &State) -> State {
    let mut v = state.v;
    v[x as usize] = nn;
    State { v, ..*state }
}

/// Vx += nn
/// Overflow wraps and VF is left alone
pub fn add(x: u8, nn: u8, state: &State) -> State {
    let mut v = state.v;
    v[x as usize] = v[x as usize].wrapping_add(nn);
    State { v, ..*state }
}

/// Vx = Vy
pub fn mv(x: u8, y: u8, state: &State) -> State {
    let mut v = state.v;
    v[x as usize] = v[y as usize];
    State { v, ..*state }
}

/// Vx |= Vy
pub fn or(x: u8, y: u8, state: &State) -> State {
    let mut v = state.v;
    v[x as usize] |= v[y as usize];
    State { v, ..*state }
}

/// Vx &= Vy
pub fn and(x: u8, y: u8, state: &State) -> State {
    let mut v = state.v;
    v[x as usize] &= v[y as usize];
    State { v, ..*state }
}

/// Vx ^= Vy
pub fn xor(x: u8, y: u8, state: &State) -> State {
    let mut v = state.v;
    v[x as usize] ^= v[y as usize];
    State { v, ..*state }
}

/// Vx += Vy; VF = overflow
pub fn addr(x: u8, y: u8, state: &State) -> State {
    let (res, over) = state.v[x as usize].overflowing_add(state.v[y as usize]);
    let mut v = state.v;
    v[0xF] = u8::from(over);
    v[x as usize] = res;
    State { v, ..*state }
}

/// Vx -= Vy; VF = !borrow
pub fn sub(x: u8, y: u8, state: &State) -> State {
    let (res, borrow) = state.v[x as usize].overflowing_sub(state.v[y as usize]);
    let mut v = state.v;
    v[0xF] = u8::from(!borrow);
    v[x as usize] = res;
    State { v, ..*state }
}

/// Vx >>= 1; VF = the bit shifted out
pub fn shr(x: u8, state: &State) -> State {
    let mut v = state.v;
    let vx = v[x as usize];
    v[0xF] = vx & 0x1;
    v[x as usize] = vx >> 1;
    State { v, ..*state }
}

/// Vx = Vy - Vx; VF = !borrow
pub fn subn(x: u8, y: u8, state: &State) -> State {
    let (res, borrow) = state.v[y as usize].overflowing_sub(state.v[x as usize]);
    let mut v = state.v;
    v[0xF] = u8::from(!borrow);
    v[x as usize] = res;
    State { v, ..*state }
}

/// Vx <<= 1; VF = the bit shifted out
pub fn shl(x: u8, state: &State) -> State {
    let mut v = state.v;
    let vx = v[x as usize];
    v[0xF] = vx >> 7;
    v[x as usize] = vx << 1;
    State { v, ..*state }
}

/// I = addr
pub fn loadi(addr: u16, state: &State) -> State {
    State { i: addr, ..*state }
}

/// PC = V0 + addr
pub fn jumpi(addr: u16, state: &State) -> State {
    State {
        pc: (addr + u16::from(state.v[0x0])) & ADDRESS_MASK,
        ..*state
    }
}

/// Vx = random_byte & nn
pub fn rnd(x: u8, nn: u8, random_byte: u8, state: &State) -> State {
    let mut v = state.v;
    v[x as usize] = random_byte & nn;
    State { v, ..*state }
}

/// draw_sprite(x=Vx y=Vy size=n)
/// XORs the n-byte sprite at memory I onto the FrameBuffer at (Vx, Vy).
///
/// The origin wraps onto the screen but the sprite itself is clipped at the
/// right and bottom edges. VF is set if any lit pixel gets erased.
pub fn draw(x: u8, y: u8, n: u8, state: &State) -> State {
    let mut v = state.v;
    let mut frame_buffer = state.frame_buffer;
    let origin_x = state.v[x as usize] as usize % DISPLAY_WIDTH;
    let origin_y = state.v[y as usize] as usize % DISPLAY_HEIGHT;

    // Reset the carry flag (used for collision detection)
    v[0xF] = 0x0;

    for row in 0..n as usize {
        let py = origin_y + row;
        if py >= DISPLAY_HEIGHT {
            break;
        }
        let sprite = state.read_byte(state.i.wrapping_add(row as u16));
        for bit in 0..8 {
            let px = origin_x + bit;
            if px >= DISPLAY_WIDTH {
                break;
            }
            if sprite & (0x80 >> bit) == 0 {
                continue;
            }
            let pixel = &mut frame_buffer[py][px];
            if *pixel {
                v[0xF] = 0x1;
            }
            *pixel = !*pixel;
        }
    }

    State {
        draw_flag: true,
        v,
        frame_buffer,
        ..*state
    }
}

/// Vx = DT
pub fn moved(x: u8, state: &State) -> State {
    let mut v = state.v;
    v[x as usize] = state.delay_timer;
    State { v, ..*state }
}

/// await a key press and release for Vx
/// A key that is already down when this runs is captured straight away.
pub fn keyd(x: u8, state: &State, keys: &Keys) -> State {
    let key_wait = match first_pressed(keys) {
        Some(key) => KeyWait::AwaitingRelease { register: x, key },
        None => KeyWait::AwaitingPress { register: x },
    };
    State { key_wait, ..*state }
}

/// Advances an in-flight key wait against the latest key snapshot.
/// Vx is only written once the captured key has been released.
pub fn poll_key(state: &State, keys: &Keys) -> State {
    match state.key_wait {
        KeyWait::Idle => *state,
        KeyWait::AwaitingPress { register } => match first_pressed(keys) {
            Some(key) => State {
                key_wait: KeyWait::AwaitingRelease { register, key },
                ..*state
            },
            None => *state,
        },
        KeyWait::AwaitingRelease { register, key } => {
            if keys[key as usize] {
                return *state;
            }
            let mut v = state.v;
            v[register as usize] = key;
            State {
                v,
                key_wait: KeyWait::Idle,
                ..*state
            }
        }
    }
}

fn first_pressed(keys: &Keys) -> Option<u8> {
    keys.iter().position(|pressed| *pressed).map(|key| key as u8)
}

/// DT = Vx
pub fn loads(x: u8, state: &State) -> State {
    State {
        delay_timer: state.v[x as usize],
        ..*state
    }
}

/// ST = Vx
pub fn ld(x: u8, state: &State) -> State {
    State {
        sound_timer: state.v[x as usize],
        ..*state
    }
}

/// I += Vx
pub fn addi(x: u8, state: &State) -> State {
    State {
        i: state.i.wrapping_add(u16::from(state.v[x as usize])),
        ..*state
    }
}

/// I = FONT_START + Vx * 5
/// Set I to the memory address of the glyph for Vx
pub fn ldspr(x: u8, state: &State) -> State {
    State {
        i: FONT_START + u16::from(state.v[x as usize]) * FONT_GLYPH_SIZE,
        ..*state
    }
}

/// mem[I..I+3] = bcd(Vx)
pub fn bcd(x: u8, state: &State) -> State {
    let vx = state.v[x as usize];
    let digits = [vx / 100, vx / 10 % 10, vx % 10];
    let mut next = *state;
    for (offset, digit) in digits.iter().enumerate() {
        next.write_byte(state.i.wrapping_add(offset as u16), *digit);
    }
    next
}

/// mem[I..=I+x] = V0..=Vx
pub fn stor(x: u8, state: &State) -> State {
    let mut next = *state;
    for register in 0..=x {
        next.write_byte(state.i.wrapping_add(u16::from(register)), state.v[register as usize]);
    }
    next
}

/// V0..=Vx = mem[I..=I+x]
pub fn read(x: u8, state: &State) -> State {
    let mut v = state.v;
    for register in 0..=x {
        v[register as usize] = state.read_byte(state.i.wrapping_add(u16::from(register)));
    }
    State { v, ..*state }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_key_waits_for_press() {
        let state = State {
            key_wait: KeyWait::AwaitingPress { register: 0x3 },
            ..State::new()
        };
        let state = poll_key(&state, &[false; 16]);
        assert_eq!(state.key_wait, KeyWait::AwaitingPress { register: 0x3 });
    }

    #[test]
    fn test_poll_key_captures_lowest_key() {
        let state = State {
            key_wait: KeyWait::AwaitingPress { register: 0x3 },
            ..State::new()
        };
        let mut keys = [false; 16];
        keys[0x9] = true;
        keys[0x4] = true;
        let state = poll_key(&state, &keys);
        assert_eq!(
            state.key_wait,
            KeyWait::AwaitingRelease {
                register: 0x3,
                key: 0x4
            }
        );
        assert_eq!(state.v[0x3], 0x0);
    }

    #[test]
    fn test_poll_key_holds_until_release() {
        let state = State {
            key_wait: KeyWait::AwaitingRelease {
                register: 0x3,
                key: 0x4,
            },
            ..State::new()
        };
        let mut keys = [false; 16];
        keys[0x4] = true;
        let held = poll_key(&state, &keys);
        assert_eq!(held.key_wait, state.key_wait);

        // Other keys don't matter once one is captured
        let mut keys = [false; 16];
        keys[0x7] = true;
        let released = poll_key(&held, &keys);
        assert_eq!(released.key_wait, KeyWait::Idle);
        assert_eq!(released.v[0x3], 0x4);
    }

    #[test]
    fn test_skip_if_wraps_pc() {
        let state = State {
            pc: 0xFFE,
            ..State::new()
        };
        assert_eq!(skip_if(&state, true).pc, 0x000);
        assert_eq!(skip_if(&state, false).pc, 0xFFE);
    }

    #[test]
    fn test_jumpi_wraps_pc() {
        let mut state = State::new();
        state.v[0x0] = 0x10;
        assert_eq!(jumpi(0xFF8, &state).pc, 0x008);
    }

    #[test]
    fn test_addr_flag_written_before_result() {
        // With x = F the sum wins over the carry
        let mut state = State::new();
        state.v[0xF] = 0xFF;
        state.v[0x1] = 0x03;
        let state = addr(0xF, 0x1, &state);
        assert_eq!(state.v[0xF], 0x02);
    }
}
