use m68arch::Mnemonic;
use serde::Serialize;
use thiserror::Error;

/// Why execution stopped.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Halt {
    #[error("No program loaded")]
    NoProgram,

    #[error("Execution reached empty memory at ${0:04X}")]
    Unprogrammed(u16),

    #[error("Unknown opcode ${1:02X} at ${0:04X}")]
    UnknownOpcode(u16, u8),

    #[error("Halted by {0}")]
    Halted(Mnemonic),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to open file: {path}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML in {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Assembly of {0} failed")]
    Assemble(String),

    #[error("Invalid memory range `{0}` (expected START:LEN)")]
    Range(String),
}
