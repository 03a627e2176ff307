use color_print::cformat;
use m68arch::Instruction;

use super::Hook;
use crate::model::CpuState;

/// One line per executed instruction.
#[derive(Debug, Default)]
pub struct Trace {
    enabled: bool,
}

impl Trace {
    pub fn arg(enabled: bool) -> Self {
        Trace { enabled }
    }

    pub fn line(time: u64, addr: u16, inst: &Instruction, cpu: &CpuState) -> String {
        let f = cpu.flags;
        let flag = |set: bool, c: char| if set { c } else { '-' };
        cformat!(
            "[{:>5}] <c>{:04X}</>: {:<11} {:<20} A={:02X} B={:02X} X={:04X} Y={:04X} SP={:04X} <m>{}{}{}{}{}{}</>",
            time,
            addr,
            inst.to_string(),
            inst.cformat(addr),
            cpu.a,
            cpu.b,
            cpu.x,
            cpu.y,
            cpu.sp,
            flag(f.h, 'H'),
            flag(f.i, 'I'),
            flag(f.n, 'N'),
            flag(f.z, 'Z'),
            flag(f.v, 'V'),
            flag(f.c, 'C'),
        )
    }
}

impl Hook for Trace {
    fn init(&mut self, state: CpuState) -> CpuState {
        if self.enabled {
            println!(" * Trace");
        }
        state
    }

    fn exec(&mut self, time: u64, addr: u16, inst: &Instruction, cpu: CpuState) -> CpuState {
        if self.enabled {
            println!("{}", Trace::line(time, addr, inst, &cpu));
        }
        cpu
    }
}
