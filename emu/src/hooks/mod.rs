use crate::model::CpuState;
use m68arch::Instruction;

pub mod dump;
pub mod trace;

/// Side effect run around the fetch-execute loop. Hooks receive the state
/// by value and hand it back, possibly modified.
pub trait Hook {
    fn init(&mut self, state: CpuState) -> CpuState;
    fn exec(&mut self, time: u64, addr: u16, inst: &Instruction, state: CpuState) -> CpuState;
}
