//! Boolean/compare ALU ops, rotates, and the carry-flag instructions.

use super::{read_field, reg_or_mem_cycles};
use crate::alu;
use crate::cpu::Machine;
use crate::registers::Flags;

pub fn ana(m: &mut Machine, opcode: u8) -> u32 {
    let value = read_field(m, opcode);
    m.regs.a = alu::and(&mut m.flags, m.regs.a, value);
    reg_or_mem_cycles(opcode, 4, 7)
}

pub fn xra(m: &mut Machine, opcode: u8) -> u32 {
    let value = read_field(m, opcode);
    m.regs.a = alu::or_xor(&mut m.flags, m.regs.a ^ value);
    reg_or_mem_cycles(opcode, 4, 7)
}

pub fn ora(m: &mut Machine, opcode: u8) -> u32 {
    let value = read_field(m, opcode);
    m.regs.a = alu::or_xor(&mut m.flags, m.regs.a | value);
    reg_or_mem_cycles(opcode, 4, 7)
}

pub fn cmp(m: &mut Machine, opcode: u8) -> u32 {
    let value = read_field(m, opcode);
    alu::sub8(&mut m.flags, m.regs.a, value, 0);
    reg_or_mem_cycles(opcode, 4, 7)
}

pub fn ani(m: &mut Machine) -> u32 {
    let value = m.fetch_byte();
    m.regs.a = alu::and(&mut m.flags, m.regs.a, value);
    7
}

pub fn xri(m: &mut Machine) -> u32 {
    let value = m.fetch_byte();
    m.regs.a = alu::or_xor(&mut m.flags, m.regs.a ^ value);
    7
}

pub fn ori(m: &mut Machine) -> u32 {
    let value = m.fetch_byte();
    m.regs.a = alu::or_xor(&mut m.flags, m.regs.a | value);
    7
}

pub fn cpi(m: &mut Machine) -> u32 {
    let value = m.fetch_byte();
    alu::sub8(&mut m.flags, m.regs.a, value, 0);
    7
}

pub fn rlc(m: &mut Machine) -> u32 {
    let high_bit = m.regs.a & 0x80 != 0;
    m.regs.a = m.regs.a.rotate_left(1);
    m.flags.set(Flags::CARRY, high_bit);
    4
}

pub fn rrc(m: &mut Machine) -> u32 {
    let low_bit = m.regs.a & 0x01 != 0;
    m.regs.a = m.regs.a.rotate_right(1);
    m.flags.set(Flags::CARRY, low_bit);
    4
}

pub fn ral(m: &mut Machine) -> u32 {
    let high_bit = m.regs.a & 0x80 != 0;
    m.regs.a = (m.regs.a << 1) | (m.flags.carry() as u8);
    m.flags.set(Flags::CARRY, high_bit);
    4
}

pub fn rar(m: &mut Machine) -> u32 {
    let low_bit = m.regs.a & 0x01 != 0;
    m.regs.a = (m.regs.a >> 1) | ((m.flags.carry() as u8) << 7);
    m.flags.set(Flags::CARRY, low_bit);
    4
}

pub fn cma(m: &mut Machine) -> u32 {
    m.regs.a = !m.regs.a;
    4
}

pub fn stc(m: &mut Machine) -> u32 {
    m.flags.set(Flags::CARRY, true);
    4
}

pub fn cmc(m: &mut Machine) -> u32 {
    let carry = m.flags.carry();
    m.flags.set(Flags::CARRY, !carry);
    4
}
