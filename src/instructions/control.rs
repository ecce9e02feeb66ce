//! Conditional/unconditional flow control: conditional JMP/CALL/RET, RST,
//! and the interrupt-enable flip-flop. Unconditional JMP/CALL are handled
//! directly in [`crate::cpu::Machine::step`] so the BDOS trap and warm-boot
//! addresses can be intercepted before this module sees them.

use crate::cpu::Machine;

/// Decodes the 3-bit condition field (bits 3..5) shared by JCC/CCC/RCC.
fn condition_met(m: &Machine, bits: u8) -> bool {
    match (bits >> 3) & 0x07 {
        0b000 => !m.flags.zero(),
        0b001 => m.flags.zero(),
        0b010 => !m.flags.carry(),
        0b011 => m.flags.carry(),
        0b100 => !m.flags.parity(),
        0b101 => m.flags.parity(),
        0b110 => !m.flags.sign(),
        0b111 => m.flags.sign(),
        _ => unreachable!(),
    }
}

/// Conditional jump: always 10 cycles, whether or not the branch is taken.
pub fn jcc(m: &mut Machine, opcode: u8) -> u32 {
    let addr = m.fetch_word();
    if condition_met(m, opcode) {
        m.pc = addr;
    }
    10
}

/// Conditional call: 17 cycles taken, 11 not taken.
pub fn ccc(m: &mut Machine, opcode: u8) -> u32 {
    let addr = m.fetch_word();
    if condition_met(m, opcode) {
        m.push(m.pc);
        m.pc = addr;
        17
    } else {
        11
    }
}

/// Conditional return: 11 cycles taken, 5 not taken.
pub fn rcc(m: &mut Machine, opcode: u8) -> u32 {
    if condition_met(m, opcode) {
        m.pc = m.pop();
        11
    } else {
        5
    }
}

pub fn ret(m: &mut Machine) -> u32 {
    m.pc = m.pop();
    10
}

/// RST n: call to the fixed address `n * 8`.
pub fn rst(m: &mut Machine, opcode: u8) -> u32 {
    let vector = ((opcode >> 3) & 0x07) as u16 * 8;
    m.push(m.pc);
    m.pc = vector;
    11
}

pub fn di(m: &mut Machine) -> u32 {
    m.interrupts_enabled = false;
    4
}

pub fn ei(m: &mut Machine) -> u32 {
    m.interrupts_enabled = true;
    4
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(code: &[u8]) -> Machine {
        let mut m = Machine::new();
        m.mem.load(0, code);
        for _ in 0..code.len() + 1 {
            if m.halted {
                break;
            }
            m.step();
        }
        m
    }

    #[test]
    fn untaken_conditional_call_does_not_push() {
        // XRA A (Z=1) ; CNZ 0x0100 ; HLT
        let m = run(&[0xAF, 0xC4, 0x00, 0x01, 0x76]);
        assert_eq!(m.sp, 0xF000);
    }

    #[test]
    fn rst_pushes_return_address_and_jumps_to_vector() {
        let mut m = Machine::new();
        m.pc = 0x0200;
        m.mem.write_8(0x0200, 0xCF); // RST 1 -> 0x0008
        m.step();
        assert_eq!(m.pc, 0x0008);
        assert_eq!(m.pop(), 0x0201);
    }

    #[test]
    fn ei_then_di_round_trips_the_flag() {
        let m = run(&[0xFB, 0xF3]);
        assert!(!m.interrupts_enabled);
    }
}
