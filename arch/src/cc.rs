use num_enum::IntoPrimitive;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

/// Condition code bits, valued by their position in the CC register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, EnumIter, Display)]
#[repr(u8)]
pub enum Flag {
    C = 0,
    V = 1,
    Z = 2,
    N = 3,
    I = 4,
    H = 5,
}

impl Flag {
    pub fn mask(self) -> u8 {
        1 << u8::from(self)
    }
}

/// Bits 6 and 7 of CC always read as one.
pub const CC_FIXED: u8 = 0xC0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    Byte,
    Word,
}

impl Width {
    pub fn mask(self) -> u32 {
        match self {
            Width::Byte => 0xFF,
            Width::Word => 0xFFFF,
        }
    }

    pub fn sign(self) -> u32 {
        match self {
            Width::Byte => 0x80,
            Width::Word => 0x8000,
        }
    }

    /// Mask of the low nibble that feeds the half-carry.
    fn half(self) -> u32 {
        match self {
            Width::Byte => 0x0F,
            Width::Word => 0x0FFF,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flags {
    pub h: bool,
    pub i: bool,
    pub n: bool,
    pub z: bool,
    pub v: bool,
    pub c: bool,
}

impl Flags {
    pub fn get(&self, flag: Flag) -> bool {
        match flag {
            Flag::C => self.c,
            Flag::V => self.v,
            Flag::Z => self.z,
            Flag::N => self.n,
            Flag::I => self.i,
            Flag::H => self.h,
        }
    }

    pub fn set(&mut self, flag: Flag, value: bool) {
        match flag {
            Flag::C => self.c = value,
            Flag::V => self.v = value,
            Flag::Z => self.z = value,
            Flag::N => self.n = value,
            Flag::I => self.i = value,
            Flag::H => self.h = value,
        }
    }

    pub fn pack(&self) -> u8 {
        Flag::iter()
            .filter(|f| self.get(*f))
            .fold(CC_FIXED, |cc, f| cc | f.mask())
    }

    pub fn unpack(cc: u8) -> Self {
        let mut flags = Flags::default();
        for f in Flag::iter() {
            flags.set(f, cc & f.mask() != 0);
        }
        flags
    }

    pub fn update_nz(&mut self, value: u16, width: Width) {
        let value = value as u32 & width.mask();
        self.n = value & width.sign() != 0;
        self.z = value == 0;
    }

    /// Flags after `result = op1 + op2 + carry_in`. `result` is already
    /// truncated to `width`.
    pub fn update_arithmetic(
        &mut self,
        op1: u16,
        op2: u16,
        result: u16,
        carry_in: bool,
        width: Width,
    ) {
        let (a, b, r) = (op1 as u32, op2 as u32, result as u32);
        let cin = carry_in as u32;
        self.c = a + b + cin > width.mask();
        self.v = (a ^ r) & (b ^ r) & width.sign() != 0;
        self.h = (a & width.half()) + (b & width.half()) + cin > width.half();
        self.update_nz(result, width);
    }

    /// Flags after `result = minuend - subtrahend - borrow_in`.
    pub fn update_subtraction(
        &mut self,
        minuend: u16,
        subtrahend: u16,
        result: u16,
        borrow_in: bool,
        width: Width,
    ) {
        let (a, b, r) = (minuend as u32, subtrahend as u32, result as u32);
        self.c = b + borrow_in as u32 > a;
        self.v = (a ^ b) & (a ^ r) & width.sign() != 0;
        self.update_nz(result, width);
    }
}
