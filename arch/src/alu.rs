use crate::{
    cc::{Flags, Width},
    op::Mnemonic,
};

/// Two-operand accumulator operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::upper_case_acronyms)]
pub enum ALU {
    ADD,
    ADC,
    SUB,
    SBC,
    CMP,
    AND,
    BIT,
    EOR,
    ORA,
}

impl ALU {
    /// Whether the result is written back to the accumulator.
    pub fn stores(self) -> bool {
        !matches!(self, ALU::CMP | ALU::BIT)
    }
}

impl TryFrom<Mnemonic> for ALU {
    type Error = ();
    fn try_from(m: Mnemonic) -> Result<Self, ()> {
        Ok(match m {
            Mnemonic::ADD => ALU::ADD,
            Mnemonic::ADC => ALU::ADC,
            Mnemonic::SUB => ALU::SUB,
            Mnemonic::SBC => ALU::SBC,
            Mnemonic::CMP => ALU::CMP,
            Mnemonic::AND => ALU::AND,
            Mnemonic::BIT => ALU::BIT,
            Mnemonic::EOR => ALU::EOR,
            Mnemonic::ORA => ALU::ORA,
            _ => return Err(()),
        })
    }
}

pub fn valu(op: ALU, f: &mut Flags, a: u8, b: u8) -> u8 {
    use ALU::*;
    match op {
        ADD => add8(f, a, b, false),
        ADC => {
            let c = f.c;
            add8(f, a, b, c)
        }
        SUB | CMP => sub8(f, a, b, false),
        SBC => {
            let c = f.c;
            sub8(f, a, b, c)
        }
        AND | BIT => logic(f, a & b),
        EOR => logic(f, a ^ b),
        ORA => logic(f, a | b),
    }
}

/// Single-operand read-modify-write operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::upper_case_acronyms)]
pub enum Unary {
    ASL,
    ASR,
    LSR,
    ROL,
    ROR,
    NEG,
    COM,
    INC,
    DEC,
    CLR,
    TST,
}

impl Unary {
    pub fn stores(self) -> bool {
        self != Unary::TST
    }
}

impl TryFrom<Mnemonic> for Unary {
    type Error = ();
    fn try_from(m: Mnemonic) -> Result<Self, ()> {
        Ok(match m {
            Mnemonic::ASL => Unary::ASL,
            Mnemonic::ASR => Unary::ASR,
            Mnemonic::LSR => Unary::LSR,
            Mnemonic::ROL => Unary::ROL,
            Mnemonic::ROR => Unary::ROR,
            Mnemonic::NEG => Unary::NEG,
            Mnemonic::COM => Unary::COM,
            Mnemonic::INC => Unary::INC,
            Mnemonic::DEC => Unary::DEC,
            Mnemonic::CLR => Unary::CLR,
            Mnemonic::TST => Unary::TST,
            _ => return Err(()),
        })
    }
}

pub fn unary(op: Unary, f: &mut Flags, m: u8) -> u8 {
    use Unary::*;
    let r = match op {
        ASL => {
            f.c = m & 0x80 != 0;
            m << 1
        }
        ASR => {
            f.c = m & 0x01 != 0;
            (m >> 1) | (m & 0x80)
        }
        LSR => {
            f.c = m & 0x01 != 0;
            m >> 1
        }
        ROL => {
            let r = (m << 1) | f.c as u8;
            f.c = m & 0x80 != 0;
            r
        }
        ROR => {
            let r = (m >> 1) | (f.c as u8) << 7;
            f.c = m & 0x01 != 0;
            r
        }
        NEG => {
            let r = 0u8.wrapping_sub(m);
            f.c = r != 0;
            f.v = r == 0x80;
            r
        }
        COM => {
            f.c = true;
            f.v = false;
            !m
        }
        INC => {
            f.v = m == 0x7F;
            m.wrapping_add(1)
        }
        DEC => {
            f.v = m == 0x80;
            m.wrapping_sub(1)
        }
        CLR => {
            f.c = false;
            f.v = false;
            0
        }
        TST => {
            f.c = false;
            f.v = false;
            m
        }
    };
    f.update_nz(r as u16, Width::Byte);
    match op {
        ASL | ASR | ROL | ROR => f.v = f.n ^ f.c,
        LSR => f.v = false,
        _ => {}
    }
    r
}

pub fn add8(f: &mut Flags, a: u8, b: u8, carry: bool) -> u8 {
    let r = a.wrapping_add(b).wrapping_add(carry as u8);
    f.update_arithmetic(a as u16, b as u16, r as u16, carry, Width::Byte);
    r
}

pub fn sub8(f: &mut Flags, a: u8, b: u8, borrow: bool) -> u8 {
    let r = a.wrapping_sub(b).wrapping_sub(borrow as u8);
    f.update_subtraction(a as u16, b as u16, r as u16, borrow, Width::Byte);
    r
}

/// Half-carry is set from bit 11.
pub fn add16(f: &mut Flags, a: u16, b: u16) -> u16 {
    let r = a.wrapping_add(b);
    f.update_arithmetic(a, b, r, false, Width::Word);
    r
}

pub fn sub16(f: &mut Flags, a: u16, b: u16) -> u16 {
    let r = a.wrapping_sub(b);
    f.update_subtraction(a, b, r, false, Width::Word);
    r
}

/// Logic results, loads and stores: N and Z from the value, V cleared.
pub fn logic(f: &mut Flags, r: u8) -> u8 {
    f.update_nz(r as u16, Width::Byte);
    f.v = false;
    r
}

pub fn logic16(f: &mut Flags, r: u16) -> u16 {
    f.update_nz(r, Width::Word);
    f.v = false;
    r
}

pub fn asld(f: &mut Flags, d: u16) -> u16 {
    let r = d << 1;
    f.c = d & 0x8000 != 0;
    f.update_nz(r, Width::Word);
    f.v = f.n ^ f.c;
    r
}

pub fn lsrd(f: &mut Flags, d: u16) -> u16 {
    let r = d >> 1;
    f.c = d & 0x0001 != 0;
    f.update_nz(r, Width::Word);
    f.v = false;
    r
}

/// Decimal adjust after a BCD addition. V is left as is.
pub fn daa(f: &mut Flags, a: u8) -> u8 {
    let (hi, lo) = (a >> 4, a & 0x0F);
    let mut correction = 0u8;
    let mut carry = f.c;
    if f.h || lo > 9 {
        correction |= 0x06;
    }
    if f.c || hi > 9 || (hi > 8 && lo > 9) {
        correction |= 0x60;
        carry = true;
    }
    let r = a.wrapping_add(correction);
    f.update_nz(r as u16, Width::Byte);
    f.c = carry;
    r
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_alu {
        ($name:ident, $op:expr, $a:expr, $b:expr, $cin:expr => $r:expr, [$($flag:ident = $val:expr),*]) => {
            #[test]
            fn $name() {
                let mut f = Flags { c: $cin, ..Default::default() };
                assert_eq!(valu($op, &mut f, $a, $b), $r);
                $(assert_eq!(f.$flag, $val, stringify!($flag));)*
            }
        };
    }

    test_alu!(add_half_carry, ALU::ADD, 0x0F, 0x01, false => 0x10, [h = true, c = false, v = false]);
    test_alu!(add_overflow, ALU::ADD, 0x7F, 0x01, false => 0x80, [v = true, n = true]);
    test_alu!(add_carry_out, ALU::ADD, 0xFF, 0x01, false => 0x00, [c = true, z = true]);
    test_alu!(adc_uses_carry, ALU::ADC, 0x01, 0x01, true => 0x03, [c = false]);
    test_alu!(sub_borrow, ALU::SUB, 0x00, 0x01, false => 0xFF, [c = true, n = true]);
    test_alu!(sbc_uses_carry, ALU::SBC, 0x05, 0x01, true => 0x03, [c = false]);
    test_alu!(cmp_equal, ALU::CMP, 0x55, 0x55, false => 0x00, [z = true, c = false]);
    test_alu!(and_clears_v, ALU::AND, 0xF0, 0x8F, false => 0x80, [n = true, v = false]);
    test_alu!(eor, ALU::EOR, 0xFF, 0xFF, false => 0x00, [z = true]);
    test_alu!(ora, ALU::ORA, 0x0F, 0xF0, false => 0xFF, [n = true]);

    macro_rules! test_unary {
        ($name:ident, $op:expr, $m:expr, $cin:expr => $r:expr, [$($flag:ident = $val:expr),*]) => {
            #[test]
            fn $name() {
                let mut f = Flags { c: $cin, ..Default::default() };
                assert_eq!(unary($op, &mut f, $m), $r);
                $(assert_eq!(f.$flag, $val, stringify!($flag));)*
            }
        };
    }

    test_unary!(asl, Unary::ASL, 0x81, false => 0x02, [c = true, v = true, n = false]);
    test_unary!(asr_keeps_sign, Unary::ASR, 0x81, false => 0xC0, [c = true, n = true, v = false]);
    test_unary!(lsr, Unary::LSR, 0x01, false => 0x00, [c = true, z = true, v = false]);
    test_unary!(rol_through_carry, Unary::ROL, 0x80, true => 0x01, [c = true]);
    test_unary!(ror_through_carry, Unary::ROR, 0x01, true => 0x80, [c = true, n = true]);
    test_unary!(neg, Unary::NEG, 0x01, false => 0xFF, [c = true, n = true, v = false]);
    test_unary!(neg_zero, Unary::NEG, 0x00, true => 0x00, [c = false, z = true]);
    test_unary!(neg_min, Unary::NEG, 0x80, false => 0x80, [v = true]);
    test_unary!(com, Unary::COM, 0x0F, false => 0xF0, [c = true, v = false, n = true]);
    test_unary!(inc_overflow, Unary::INC, 0x7F, true => 0x80, [v = true, c = true]);
    test_unary!(dec_overflow, Unary::DEC, 0x80, false => 0x7F, [v = true, c = false]);
    test_unary!(clr, Unary::CLR, 0x55, true => 0x00, [z = true, c = false, n = false]);
    test_unary!(tst, Unary::TST, 0x80, true => 0x80, [n = true, c = false]);

    #[test]
    fn wide() {
        let mut f = Flags::default();
        assert_eq!(add16(&mut f, 0x0FFF, 0x0001), 0x1000);
        assert!(f.h && !f.c);
        assert_eq!(sub16(&mut f, 0x1000, 0x2000), 0xF000);
        assert!(f.c && f.n);
        assert_eq!(asld(&mut f, 0x8001), 0x0002);
        assert!(f.c && f.v);
        assert_eq!(lsrd(&mut f, 0x0003), 0x0001);
        assert!(f.c && !f.v && !f.n);
    }

    #[test]
    fn daa_adjusts() {
        let mut f = Flags::default();
        let r = add8(&mut f, 0x19, 0x28, false);
        assert_eq!(daa(&mut f, r), 0x47);
        let r = add8(&mut f, 0x99, 0x01, false);
        assert_eq!(daa(&mut f, r), 0x00);
        assert!(f.c && f.z);
    }

    #[test]
    fn mnemonic_mapping() {
        assert_eq!(ALU::try_from(Mnemonic::CMP), Ok(ALU::CMP));
        assert!(!ALU::CMP.stores());
        assert_eq!(Unary::try_from(Mnemonic::TST), Ok(Unary::TST));
        assert!(Unary::try_from(Mnemonic::LDA).is_err());
    }
}
