use crate::bdos::{self, BdosState};
use crate::instructions;
use crate::memory::Memory;
use crate::registers::{Flags, RegPair, Registers};

/// The CP/M low-memory entry point BDOS calls are vectored through.
pub const BDOS_ENTRY: u16 = 0x0005;
/// CP/M warm boot: `JMP 0x0000` terminates the running program.
pub const WARM_BOOT: u16 = 0x0000;

/// All process-scoped emulator state: memory, registers, flags, the
/// program counter and stack pointer, and the BDOS shim's own state
/// (DMA address, current disk, open-file table). Bundled into one value
/// (rather than a family of globals) so opcode semantics can be unit
/// tested in isolation.
pub struct Machine {
    pub mem: Memory,
    pub regs: Registers,
    pub flags: Flags,
    pub pc: u16,
    pub sp: u16,
    pub halted: bool,
    pub interrupts_enabled: bool,
    pub bdos: BdosState,
}

impl Default for Machine {
    fn default() -> Self {
        Machine {
            mem: Memory::new(),
            regs: Registers::default(),
            flags: Flags::reset(),
            pc: 0,
            sp: 0xF000,
            halted: false,
            interrupts_enabled: false,
            bdos: BdosState::new(),
        }
    }
}

impl Machine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fetch_byte(&mut self) -> u8 {
        let byte = self.mem.read_8(self.pc);
        self.pc = self.pc.wrapping_add(1);
        byte
    }

    pub fn fetch_word(&mut self) -> u16 {
        let word = self.mem.read_16(self.pc);
        self.pc = self.pc.wrapping_add(2);
        word
    }

    /// `M` as in the 8080 manual: the byte addressed by HL.
    pub fn read_m(&self) -> u8 {
        self.mem.read_8(self.regs.hl())
    }

    pub fn write_m(&mut self, value: u8) {
        self.mem.write_8(self.regs.hl(), value);
    }

    pub fn push(&mut self, value: u16) {
        self.sp = self.sp.wrapping_sub(1);
        self.mem.write_8(self.sp, (value >> 8) as u8);
        self.sp = self.sp.wrapping_sub(1);
        self.mem.write_8(self.sp, (value & 0xFF) as u8);
    }

    pub fn pop(&mut self) -> u16 {
        let low = self.mem.read_8(self.sp) as u16;
        self.sp = self.sp.wrapping_add(1);
        let high = self.mem.read_8(self.sp) as u16;
        self.sp = self.sp.wrapping_add(1);
        (high << 8) | low
    }

    pub fn get_rp(&self, rp: RegPair) -> u16 {
        match rp {
            RegPair::Bc => self.regs.bc(),
            RegPair::De => self.regs.de(),
            RegPair::Hl => self.regs.hl(),
            RegPair::Sp => self.sp,
            RegPair::Psw => ((self.regs.a as u16) << 8) | self.flags.to_byte() as u16,
        }
    }

    pub fn set_rp(&mut self, rp: RegPair, value: u16) {
        match rp {
            RegPair::Bc => self.regs.set_bc(value),
            RegPair::De => self.regs.set_de(value),
            RegPair::Hl => self.regs.set_hl(value),
            RegPair::Sp => self.sp = value,
            RegPair::Psw => {
                self.regs.a = (value >> 8) as u8;
                self.flags = Flags::sanitize(value as u8);
            }
        }
    }

    /// Executes one instruction and returns its T-state count, or `0` if
    /// the machine is halted. Unknown opcodes are logged and treated as a
    /// 4-cycle NOP so a degraded binary can't crash the emulator.
    pub fn step(&mut self) -> u32 {
        if self.halted {
            return 0;
        }

        let opcode = self.fetch_byte();

        match opcode {
            // CALL and its undocumented duplicates (0xDD/0xED/0xFD). A call
            // to the BDOS entry point is intercepted inline: the shim runs
            // to completion and PC ends up just past the 3-byte CALL, as
            // if the guest's CALL had immediately returned.
            0xCD | 0xDD | 0xED | 0xFD => {
                let addr = self.fetch_word();
                if addr == BDOS_ENTRY {
                    bdos::dispatch(self);
                } else {
                    self.push(self.pc);
                    self.pc = addr;
                }
                17
            }
            // JMP and its undocumented duplicate 0xCB. JMP 0x0000 is CP/M
            // warm boot: program termination.
            0xC3 | 0xCB => {
                let addr = self.fetch_word();
                if addr == WARM_BOOT {
                    self.halted = true;
                } else {
                    self.pc = addr;
                }
                10
            }
            _ => instructions::dispatch(self, opcode),
        }
    }
}
