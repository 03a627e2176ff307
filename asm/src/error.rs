use crate::number::NumberError;
use color_print::cprintln;
use m68arch::{EncodeError, Mnemonic};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Number(#[from] NumberError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error("Empty operand")]
    EmptyOperand,

    #[error("Instruction {0} requires operands")]
    MissingOperand(String),

    #[error("Direct address out of range: ${0:X}")]
    DirectOutOfRange(u16),

    #[error("Index offset out of range: ${0:X}")]
    IndexOffsetOutOfRange(u16),

    #[error("Immediate value too large: ${0:X}")]
    ImmediateTooLarge(u16),

    #[error("Byte value out of range: ${0:X}")]
    ByteOutOfRange(u16),

    #[error("Branch target out of range: {0}")]
    BranchOutOfRange(i32),

    #[error("Undefined label: {0}")]
    UndefinedLabel(String),

    #[error("Duplicate label: {name} (first defined on line {line})")]
    DuplicateLabel { name: String, line: usize },

    #[error("Invalid ORG address: {0}")]
    InvalidOrg(String),

    #[error("Bit mask must be immediate (#value): {0}")]
    BitMask(String),

    #[error("{mnemonic} requires {expected} operands")]
    BitOperands { mnemonic: Mnemonic, expected: usize },

    #[error("Failed to read file: {path}: {reason}")]
    ReadFile { path: String, reason: String },

    #[error("Failed to write file: {path}: {reason}")]
    WriteFile { path: String, reason: String },
}

impl Error {
    pub fn read_file(path: &str, e: impl std::fmt::Display) -> Self {
        Error::ReadFile {
            path: path.to_string(),
            reason: e.to_string(),
        }
    }

    pub fn write_file(path: &str, e: impl std::fmt::Display) -> Self {
        Error::WriteFile {
            path: path.to_string(),
            reason: e.to_string(),
        }
    }
}

/// Error with the 1-based source line it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub error: Error,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Line {}: {}", self.line, self.error)
    }
}

impl Diagnostic {
    /// Print error with the offending source line.
    pub fn print_diag(&self, lines: &[&str], file: &str) {
        cprintln!("<red,bold>error</>: {}", self.error);
        cprintln!("     <blue>--></> <underline>{}:{}</>", file, self.line);
        cprintln!("      <blue>|</>");
        let content = lines.get(self.line.wrapping_sub(1)).copied().unwrap_or("");
        cprintln!(" <blue>{:>4} |</> {}", self.line, content);
        cprintln!("      <blue>|</>");
    }
}
