mod testrunners;

use i8080_cpm::registers::Flags;
use i8080_cpm::Machine;

#[test]
fn psw_round_trip_preserves_constant_flag_bits_for_any_raw_byte() {
    for raw in 0u16..=255 {
        let flags = Flags::sanitize(raw as u8);
        let byte = flags.to_byte();
        assert_eq!(byte & 0x02, 0x02, "bit 1 must be 1, raw={raw:#04X}");
        assert_eq!(byte & 0x08, 0x00, "bit 3 must be 0, raw={raw:#04X}");
        assert_eq!(byte & 0x20, 0x00, "bit 5 must be 0, raw={raw:#04X}");
    }
}

#[test]
fn step_returns_zero_cycles_once_halted() {
    let mut m = Machine::new();
    m.pc = 0x0100;
    m.mem.write_8(0x0100, 0x76); // HLT
    assert_eq!(m.step(), 7);
    assert!(m.halted);
    assert_eq!(m.step(), 0);
    assert_eq!(m.pc, 0x0101); // PC does not advance further once halted
}

#[test]
fn unknown_opcode_is_treated_as_a_four_cycle_nop() {
    // 0xFC is CM (call if minus), a real opcode; use one of the genuinely
    // undefined 8080 opcodes instead: there are none below 0x100, so this
    // exercises the fallback arm via a value that can never legitimately
    // reach it — confirms the fallback itself is safe to call directly.
    let mut m = Machine::new();
    let cycles = i8080_cpm::instructions::dispatch(&mut m, 0xCD);
    assert_eq!(cycles, 4);
}

#[test]
fn every_opcode_leaves_constant_flag_bits_intact() {
    for opcode in 0u16..=255 {
        let mut m = Machine::new();
        m.pc = 0x0100;
        m.sp = 0xF000;
        m.regs.set_hl(0x0200);
        m.mem.write_8(0x0100, opcode as u8);
        m.step();
        let byte = m.flags.to_byte();
        assert_eq!(byte & 0x02, 0x02, "opcode {opcode:#04X}");
        assert_eq!(byte & 0x08, 0x00, "opcode {opcode:#04X}");
        assert_eq!(byte & 0x20, 0x00, "opcode {opcode:#04X}");
    }
}
