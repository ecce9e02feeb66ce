use bitflags::bitflags;

bitflags! {
    /// The 8080 flags byte. Bit 1 is architecturally fixed at 1, bits 3 and 5
    /// are fixed at 0; this type never represents those as unset/set the
    /// "wrong" way because [`Flags::sanitize`] is the only path that builds
    /// one from a raw byte (e.g. on PSW pop).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Flags: u8 {
        const CARRY      = 0b0000_0001;
        const UNUSED_ONE = 0b0000_0010;
        const PARITY     = 0b0000_0100;
        const AUX_CARRY  = 0b0001_0000;
        const ZERO       = 0b0100_0000;
        const SIGN       = 0b1000_0000;
    }
}

/// Bits 1 (constant 1), 3 and 5 (constant 0) of any PSW byte.
const SANITIZE_MASK: u8 = Flags::CARRY.bits()
    | Flags::PARITY.bits()
    | Flags::AUX_CARRY.bits()
    | Flags::ZERO.bits()
    | Flags::SIGN.bits();

impl Flags {
    pub fn reset() -> Self {
        Flags::UNUSED_ONE
    }

    /// Masks a raw byte (e.g. popped off the stack) down to the bits the
    /// 8080 actually defines, then forces bit 1 on.
    pub fn sanitize(byte: u8) -> Self {
        Flags::from_bits_truncate((byte & SANITIZE_MASK) | Flags::UNUSED_ONE.bits())
    }

    pub fn to_byte(self) -> u8 {
        self.bits() | Flags::UNUSED_ONE.bits()
    }

    pub fn set(&mut self, mask: Flags, value: bool) {
        self.set_inner(mask, value);
    }

    fn set_inner(&mut self, mask: Flags, value: bool) {
        if value {
            self.insert(mask);
        } else {
            self.remove(mask);
        }
    }

    pub fn carry(self) -> bool {
        self.contains(Flags::CARRY)
    }
    pub fn zero(self) -> bool {
        self.contains(Flags::ZERO)
    }
    pub fn sign(self) -> bool {
        self.contains(Flags::SIGN)
    }
    pub fn parity(self) -> bool {
        self.contains(Flags::PARITY)
    }
    pub fn aux_carry(self) -> bool {
        self.contains(Flags::AUX_CARRY)
    }
}

/// One of the seven 8-bit general registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reg8 {
    A,
    B,
    C,
    D,
    E,
    H,
    L,
}

impl Reg8 {
    /// Decodes a 3-bit field from an opcode (000=B .. 111=A) as used by
    /// MOV/MVI/INR/DCR/ALU instructions. Field value 110 ("M") has no
    /// register and is handled by callers before reaching this decode.
    pub fn decode(bits: u8) -> Reg8 {
        match bits & 0x07 {
            0b000 => Reg8::B,
            0b001 => Reg8::C,
            0b010 => Reg8::D,
            0b011 => Reg8::E,
            0b100 => Reg8::H,
            0b101 => Reg8::L,
            0b111 => Reg8::A,
            other => panic!("Reg8::decode called with M field {other:#o}"),
        }
    }
}

/// A 16-bit register pair, named rather than computed by arithmetic on an
/// index, so callers can't introduce an off-by-one while addressing BC/DE/HL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegPair {
    Bc,
    De,
    Hl,
    Sp,
    Psw,
}

impl RegPair {
    /// Decodes the 2-bit `rp` field used by LXI/INX/DCX/DAD (SP as the
    /// fourth pair).
    pub fn decode_sp(bits: u8) -> RegPair {
        match bits & 0x03 {
            0b00 => RegPair::Bc,
            0b01 => RegPair::De,
            0b10 => RegPair::Hl,
            _ => RegPair::Sp,
        }
    }

    /// Decodes the 2-bit `rp` field used by PUSH/POP (PSW as the fourth
    /// pair).
    pub fn decode_psw(bits: u8) -> RegPair {
        match bits & 0x03 {
            0b00 => RegPair::Bc,
            0b01 => RegPair::De,
            0b10 => RegPair::Hl,
            _ => RegPair::Psw,
        }
    }
}

/// The seven general-purpose 8080 registers. Register pairs (BC, DE, HL)
/// are exposed as named accessors rather than being addressed by computed
/// offsets into this struct.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Registers {
    pub a: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
}

impl Registers {
    pub fn get(&self, reg: Reg8) -> u8 {
        match reg {
            Reg8::A => self.a,
            Reg8::B => self.b,
            Reg8::C => self.c,
            Reg8::D => self.d,
            Reg8::E => self.e,
            Reg8::H => self.h,
            Reg8::L => self.l,
        }
    }

    pub fn set(&mut self, reg: Reg8, value: u8) {
        match reg {
            Reg8::A => self.a = value,
            Reg8::B => self.b = value,
            Reg8::C => self.c = value,
            Reg8::D => self.d = value,
            Reg8::E => self.e = value,
            Reg8::H => self.h = value,
            Reg8::L => self.l = value,
        }
    }

    pub fn bc(&self) -> u16 {
        u16::from_be_bytes([self.b, self.c])
    }
    pub fn set_bc(&mut self, value: u16) {
        let [b, c] = value.to_be_bytes();
        self.b = b;
        self.c = c;
    }

    pub fn de(&self) -> u16 {
        u16::from_be_bytes([self.d, self.e])
    }
    pub fn set_de(&mut self, value: u16) {
        let [d, e] = value.to_be_bytes();
        self.d = d;
        self.e = e;
    }

    pub fn hl(&self) -> u16 {
        u16::from_be_bytes([self.h, self.l])
    }
    pub fn set_hl(&mut self, value: u16) {
        let [h, l] = value.to_be_bytes();
        self.h = h;
        self.l = l;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_pair_round_trip() {
        let mut regs = Registers::default();
        regs.set_bc(0x1234);
        assert_eq!(regs.b, 0x12);
        assert_eq!(regs.c, 0x34);
        assert_eq!(regs.bc(), 0x1234);
    }

    #[test]
    fn flags_sanitize_forces_constant_bits() {
        let f = Flags::sanitize(0xFF);
        assert_eq!(f.to_byte(), 0xD7);
        let f = Flags::sanitize(0x00);
        assert_eq!(f.to_byte(), 0x02);
    }
}
