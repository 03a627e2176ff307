use crate::{
    mode::Mode,
    op::Mnemonic,
    reg::Acc,
    table::{self, Encoding, OpKey},
};
use color_print::cformat;
use std::fmt;

/// Longest instruction in the table, in bytes.
pub const MAX_LEN: usize = 4;

/// One decoded instruction with its raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub key: OpKey,
    pub bytes: Vec<u8>,
    opcode_len: usize,
}

impl Instruction {
    /// Decode from the bytes at the program counter. `None` when the
    /// opcode is not in the table or the window is too short.
    pub fn decode(window: &[u8]) -> Option<Self> {
        let (key, opcode_len) = table::decode(window)?;
        let len = opcode_len + key.operand_len();
        let bytes = window.get(..len)?.to_vec();
        Some(Instruction {
            key,
            bytes,
            opcode_len,
        })
    }

    pub fn mnemonic(&self) -> Mnemonic {
        self.key.mnemonic
    }

    pub fn mode(&self) -> Mode {
        self.key.mode
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn operands(&self) -> &[u8] {
        &self.bytes[self.opcode_len..]
    }

    /// Operand byte `i`, zero when absent.
    pub fn byte(&self, i: usize) -> u8 {
        self.operands().get(i).copied().unwrap_or(0)
    }

    /// Big-endian operand word starting at byte `i`.
    pub fn word(&self, i: usize) -> u16 {
        u16::from_be_bytes([self.byte(i), self.byte(i + 1)])
    }

    fn acc_text(&self) -> Option<Acc> {
        match self.key.mnemonic.encoding(self.key.mode)? {
            Encoding::ByRegister { .. } => self.key.acc,
            Encoding::Fixed(_) => None,
        }
    }

    fn branch_target(&self, addr: u16, offset: u8) -> u16 {
        addr.wrapping_add(self.len() as u16)
            .wrapping_add(offset as i8 as u16)
    }

    /// Operand text in assembler syntax. `addr` resolves relative targets.
    pub fn operand_text(&self, addr: u16) -> String {
        let m = self.key.mnemonic;
        let wide = m.wide_immediate();
        let base = match self.key.mode {
            Mode::INH => String::new(),
            Mode::IMM if wide => format!("#${:04X}", self.word(0)),
            Mode::IMM => format!("#${:02X}", self.byte(0)),
            Mode::DIR => format!("${:02X}", self.byte(0)),
            Mode::EXT => format!("${:04X}", self.word(0)),
            Mode::IDX => format!("${:02X},X", self.byte(0)),
            Mode::REL => format!("${:04X}", self.branch_target(addr, self.byte(0))),
        };
        if !m.is_bit_op() {
            return base;
        }
        let mask = format!("#${:02X}", self.byte(1));
        if m.is_bit_branch() {
            let target = self.branch_target(addr, self.byte(2));
            format!("{base},{mask},${target:04X}")
        } else {
            format!("{base},{mask}")
        }
    }

    /// Source line that reassembles to the same bytes.
    pub fn text(&self, addr: u16) -> String {
        let operand = self.operand_text(addr);
        match (self.acc_text(), operand.is_empty()) {
            (Some(acc), true) => format!("{} {acc}", self.key.mnemonic),
            (Some(acc), false) => format!("{} {acc} {operand}", self.key.mnemonic),
            (None, true) => self.key.mnemonic.to_string(),
            (None, false) => format!("{} {operand}", self.key.mnemonic),
        }
    }

    pub fn cformat(&self, addr: u16) -> String {
        let acc = self
            .acc_text()
            .map(|a| a.to_string())
            .unwrap_or_default();
        cformat!(
            "<red>{:<5}</><blue>{:<2}</><yellow>{}</>",
            self.key.mnemonic.to_string(),
            acc,
            self.operand_text(addr)
        )
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex: Vec<String> = self.bytes.iter().map(|b| format!("{b:02X}")).collect();
        write!(f, "{}", hex.join(" "))
    }
}
