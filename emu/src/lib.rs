//! Instruction-set simulator for the 6800/6801/6811 family.

pub mod error;
mod exec;
pub mod hooks;
pub mod model;
pub mod sim;

pub use error::{Error, Halt};
pub use model::{CpuState, Registers};
pub use sim::{Simulator, Snapshot};
