use crate::{mode::Mode, op::Mnemonic};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("Unknown instruction: {0}")]
    UnknownInstruction(String),
    #[error("Addressing mode {mode} not supported for {mnemonic}")]
    UnsupportedMode { mnemonic: Mnemonic, mode: Mode },
    #[error("Instruction {0} requires register specification")]
    RegisterRequired(Mnemonic),
    #[error("Register {register} not supported for {mnemonic} with {mode} mode")]
    UnknownRegister {
        mnemonic: Mnemonic,
        mode: Mode,
        register: String,
    },
}
