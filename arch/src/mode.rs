use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Addressing mode of an instruction.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    EnumString,
    EnumIter,
    Display,
)]
#[allow(clippy::upper_case_acronyms)]
pub enum Mode {
    /// Inherent: no operand bytes, or an accumulator chosen by the opcode.
    INH,
    /// Immediate: `#value`, one or two bytes.
    IMM,
    /// Direct: an address on page zero, one byte.
    DIR,
    /// Extended: a full 16-bit address, big-endian.
    EXT,
    /// Indexed: `offset,X`, one unsigned offset byte.
    IDX,
    /// Relative: signed 8-bit displacement from the next instruction.
    REL,
}

impl Mode {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_ascii_uppercase().parse::<Self>() {
            Ok(m) => Ok(m),
            Err(_) => Err(format!("Unknown addressing mode: {s}")),
        }
    }
}
