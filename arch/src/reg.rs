use num_enum::IntoPrimitive;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Accumulator selected by a register-keyed opcode.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    IntoPrimitive,
    EnumString,
    EnumIter,
    Display,
)]
#[repr(u8)]
pub enum Acc {
    A,
    B,
}

impl Acc {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.trim().to_ascii_uppercase().parse::<Self>() {
            Ok(a) => Ok(a),
            Err(_) => Err(format!("Unknown accumulator: {s}")),
        }
    }
}

/// Programmer-visible register, addressable by name.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, EnumIter, Display,
)]
pub enum Reg {
    A,
    B,
    X,
    Y,
    SP,
    PC,
    CC,
}

impl Reg {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.trim().to_ascii_uppercase().parse::<Self>() {
            Ok(r) => Ok(r),
            Err(_) => Err(format!("Unknown reg name: {s}")),
        }
    }

    pub fn is_wide(self) -> bool {
        matches!(self, Reg::X | Reg::Y | Reg::SP | Reg::PC)
    }
}

impl From<Acc> for Reg {
    fn from(acc: Acc) -> Self {
        match acc {
            Acc::A => Reg::A,
            Acc::B => Reg::B,
        }
    }
}

#[test]
fn test() {
    assert_eq!(Acc::parse("b"), Ok(Acc::B));
    assert!(Acc::parse("x").is_err());
    assert_eq!(Reg::parse("sp"), Ok(Reg::SP));
    assert_eq!(Reg::parse(" cc "), Ok(Reg::CC));
    assert!(Reg::parse("hoge").is_err());
    assert!(Reg::PC.is_wide());
    assert!(!Reg::CC.is_wide());
    assert_eq!(u8::from(Acc::B), 1);
    assert_eq!(Reg::from(Acc::A), Reg::A);
}
