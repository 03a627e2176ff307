use crate::{
    error::Halt,
    model::{CpuState, Registers},
};
use m68arch::{Flags, Instruction, ObjectImage};
use serde::Serialize;
use std::collections::BTreeMap;

/// Dump start when nothing is loaded.
pub const DEFAULT_DUMP_START: u16 = 0x1000;
pub const DEFAULT_DUMP_LENGTH: usize = 256;

/// Serializable view of the simulator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub registers: Registers,
    pub flags: Flags,
    pub halted: bool,
    pub halt: Option<String>,
    pub instruction_count: u64,
    pub program_loaded: bool,
    pub program_start: u16,
}

/// CPU state plus the program image it was loaded from.
#[derive(Debug, Default)]
pub struct Simulator {
    state: CpuState,
    program: BTreeMap<u16, u8>,
    program_start: u16,
}

impl Simulator {
    pub fn new() -> Self {
        Simulator::default()
    }

    /// Copy `data` into memory and point PC at its lowest address.
    pub fn load_program(&mut self, data: &BTreeMap<u16, u8>) {
        self.program = data.clone();
        self.state.halt = None;
        for (&addr, &byte) in data {
            self.state.set(addr, byte);
        }
        if let Some(&start) = data.keys().next() {
            self.program_start = start;
            self.state.pc = start;
        }
    }

    pub fn load_image(&mut self, image: &ObjectImage) {
        self.load_program(&image.data);
    }

    /// Fresh CPU with the last loaded program reloaded.
    pub fn reset(&mut self) {
        self.state = CpuState::new();
        if self.program.is_empty() {
            self.program_start = 0;
            return;
        }
        for (&addr, &byte) in &self.program {
            self.state.set(addr, byte);
        }
        self.state.pc = self.program_start;
    }

    fn fetch(&self) -> Result<Instruction, Halt> {
        let pc = self.state.pc;
        if self.program.is_empty() {
            return Err(Halt::NoProgram);
        }
        if !self.program.contains_key(&pc) && self.state.get(pc) == 0 {
            return Err(Halt::Unprogrammed(pc));
        }
        self.state
            .decode_at(pc)
            .ok_or(Halt::UnknownOpcode(pc, self.state.get(pc)))
    }

    /// Fetch, decode and execute one instruction. Returns its address and
    /// decoding, or `None` once halted.
    pub fn exec(&mut self) -> Option<(u16, Instruction)> {
        if self.state.is_halted() {
            return None;
        }
        match self.fetch() {
            Ok(inst) => {
                let pc = self.state.pc;
                self.state.execute(&inst);
                self.state.instruction_count += 1;
                Some((pc, inst))
            }
            Err(halt) => {
                self.state.halt = Some(halt);
                None
            }
        }
    }

    pub fn step(&mut self) -> bool {
        self.exec().is_some()
    }

    /// Step until halted or `max` instructions have run.
    pub fn run(&mut self, max: u64) -> u64 {
        let mut count = 0;
        while count < max && self.step() {
            count += 1;
        }
        count
    }

    /// Hand the state to `f` by value and keep what it returns.
    pub fn map_state(&mut self, f: impl FnOnce(CpuState) -> CpuState) {
        let state = std::mem::take(&mut self.state);
        self.state = f(state);
    }

    pub fn state(&self) -> &CpuState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut CpuState {
        &mut self.state
    }

    pub fn get_state(&self) -> Snapshot {
        Snapshot {
            registers: self.state.registers(),
            flags: self.state.flags,
            halted: self.state.is_halted(),
            halt: self.state.halt.map(|h| h.to_string()),
            instruction_count: self.state.instruction_count,
            program_loaded: !self.program.is_empty(),
            program_start: self.program_start,
        }
    }

    pub fn program_start(&self) -> u16 {
        self.program_start
    }

    pub fn is_halted(&self) -> bool {
        self.state.is_halted()
    }

    pub fn instruction_count(&self) -> u64 {
        self.state.instruction_count
    }

    /// Memory dump. Without `start`, begins at the program start aligned
    /// down to 16, or at $1000 when nothing is loaded.
    pub fn memory_dump(&self, start: Option<u16>, length: usize) -> String {
        let start = start.unwrap_or_else(|| match self.program.keys().next() {
            Some(&addr) => addr & 0xFFF0,
            None => DEFAULT_DUMP_START,
        });
        self.state.dump(start, length)
    }

    pub fn get_memory_value(&self, addr: u16) -> u8 {
        self.state.get(addr)
    }

    pub fn set_memory_value(&mut self, addr: u16, value: u8) {
        self.state.set(addr, value);
    }

    pub fn get_register_value(&self, name: &str) -> u16 {
        self.state.register(name)
    }

    pub fn set_register_value(&mut self, name: &str, value: u32) {
        self.state.set_register(name, value);
    }

    pub fn search_memory(&self, pattern: &[u8]) -> Vec<u16> {
        self.state.search(pattern)
    }

    pub fn decode_at(&self, addr: u16) -> Option<Instruction> {
        self.state.decode_at(addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program(origin: u16, bytes: &[u8]) -> Simulator {
        let data = bytes
            .iter()
            .enumerate()
            .map(|(i, b)| (origin + i as u16, *b))
            .collect();
        let mut sim = Simulator::new();
        sim.load_program(&data);
        sim
    }

    macro_rules! test_exec {
        ($name:ident, [$($byte:expr),*], $steps:expr, |$cpu:ident| $check:expr) => {
            #[test]
            fn $name() {
                let mut sim = program(0x1000, &[$($byte),*]);
                assert_eq!(sim.run($steps), $steps);
                let $cpu = sim.state();
                $check
            }
        };
    }

    test_exec!(lda_imm, [0x86, 0x55], 1, |cpu| {
        assert_eq!(cpu.a, 0x55);
        assert!(!cpu.flags.z && !cpu.flags.n);
        assert_eq!(cpu.pc, 0x1002);
    });
    test_exec!(lda_zero_sets_z, [0x86, 0x00], 1, |cpu| assert!(cpu.flags.z));
    test_exec!(ldx_imm, [0xCE, 0x80, 0x00], 1, |cpu| {
        assert_eq!(cpu.x, 0x8000);
        assert!(cpu.flags.n);
    });
    test_exec!(ldy_prefixed, [0x18, 0xCE, 0x12, 0x34], 1, |cpu| {
        assert_eq!(cpu.y, 0x1234);
        assert_eq!(cpu.pc, 0x1004);
    });
    test_exec!(add_b_carry, [0xC6, 0xFF, 0xCB, 0x01], 2, |cpu| {
        assert_eq!(cpu.b, 0x00);
        assert!(cpu.flags.c && cpu.flags.z && cpu.flags.h);
    });
    test_exec!(cmp_keeps_a, [0x86, 0x10, 0x81, 0x20], 2, |cpu| {
        assert_eq!(cpu.a, 0x10);
        assert!(cpu.flags.c && cpu.flags.n);
    });
    test_exec!(sta_ext, [0x86, 0x42, 0xB7, 0x20, 0x00], 2, |cpu| {
        assert_eq!(cpu.get(0x2000), 0x42);
    });
    test_exec!(std_idx, [0xCE, 0x20, 0x00, 0xCC, 0xBE, 0xEF, 0xED, 0x02], 3, |cpu| {
        assert_eq!(cpu.get_word(0x2002), 0xBEEF);
    });
    test_exec!(clr_ext, [0x7F, 0x20, 0x00], 1, |cpu| {
        assert_eq!(cpu.get(0x2000), 0);
        assert!(cpu.flags.z && !cpu.flags.c);
    });
    test_exec!(inc_b, [0x5C], 1, |cpu| assert_eq!(cpu.b, 1));
    test_exec!(neg_a, [0x86, 0x01, 0x40], 2, |cpu| {
        assert_eq!(cpu.a, 0xFF);
        assert!(cpu.flags.c && cpu.flags.n);
    });
    test_exec!(asld, [0xCC, 0x80, 0x01, 0x05], 2, |cpu| {
        assert_eq!(cpu.d(), 0x0002);
        assert!(cpu.flags.c && cpu.flags.v);
    });
    test_exec!(mul, [0x86, 0x10, 0xC6, 0x90, 0x3D], 3, |cpu| {
        assert_eq!(cpu.d(), 0x0900);
        assert!(!cpu.flags.c);
    });
    test_exec!(mul_carry_from_b7, [0x86, 0x01, 0xC6, 0x80, 0x3D], 3, |cpu| {
        assert_eq!(cpu.d(), 0x0080);
        assert!(cpu.flags.c);
    });
    test_exec!(idiv, [0xCC, 0x00, 0x64, 0xCE, 0x00, 0x07, 0x02], 3, |cpu| {
        assert_eq!(cpu.x, 14);
        assert_eq!(cpu.d(), 2);
        assert!(!cpu.flags.c && !cpu.flags.v && !cpu.flags.z);
    });
    test_exec!(idiv_by_zero, [0xCC, 0x12, 0x34, 0xCE, 0x00, 0x00, 0x02], 3, |cpu| {
        assert_eq!(cpu.d(), 0x1234);
        assert_eq!(cpu.x, 0);
        assert!(cpu.flags.c && cpu.flags.v);
    });
    test_exec!(fdiv, [0xCC, 0x00, 0x01, 0xCE, 0x00, 0x02, 0x03], 3, |cpu| {
        assert_eq!(cpu.x, 0x8000);
        assert_eq!(cpu.d(), 0);
        assert!(!cpu.flags.c);
    });
    test_exec!(fdiv_overflow, [0xCC, 0x00, 0x05, 0xCE, 0x00, 0x02, 0x03], 3, |cpu| {
        assert_eq!(cpu.x, 2);
        assert_eq!(cpu.d(), 5);
        assert!(cpu.flags.c && cpu.flags.v);
    });
    test_exec!(xgdx, [0xCC, 0x12, 0x34, 0xCE, 0x56, 0x78, 0x8F], 3, |cpu| {
        assert_eq!(cpu.d(), 0x5678);
        assert_eq!(cpu.x, 0x1234);
    });
    test_exec!(psh_pul, [0x86, 0x33, 0x36, 0x33], 3, |cpu| {
        assert_eq!(cpu.b, 0x33);
        assert_eq!(cpu.sp, 0x01FF);
    });
    test_exec!(pshx_layout, [0xCE, 0x12, 0x34, 0x3C], 2, |cpu| {
        assert_eq!(cpu.get(0x01FE), 0x12);
        assert_eq!(cpu.get(0x01FF), 0x34);
        assert_eq!(cpu.sp, 0x01FD);
    });
    test_exec!(tsx_txs, [0x30, 0x35], 2, |cpu| {
        assert_eq!(cpu.x, 0x0200);
        assert_eq!(cpu.sp, 0x01FF);
    });
    test_exec!(tap_tpa, [0x86, 0x01, 0x06, 0x07], 3, |cpu| {
        assert!(cpu.flags.c);
        assert_eq!(cpu.a, 0xC1);
    });
    test_exec!(bne_taken, [0x86, 0x01, 0x26, 0x10], 2, |cpu| assert_eq!(cpu.pc, 0x1014));
    test_exec!(beq_not_taken, [0x86, 0x01, 0x27, 0x10], 2, |cpu| assert_eq!(cpu.pc, 0x1004));
    test_exec!(bra_backward, [0x01, 0x20, 0xFD], 2, |cpu| assert_eq!(cpu.pc, 0x1000));
    test_exec!(jsr_rts, [0xBD, 0x10, 0x04, 0x01, 0x39], 2, |cpu| {
        assert_eq!(cpu.pc, 0x1003);
        assert_eq!(cpu.sp, 0x01FF);
    });
    test_exec!(jsr_direct, [0x9D, 0x80], 1, |cpu| {
        assert_eq!(cpu.pc, 0x0080);
        assert_eq!(cpu.get(0x01FF), 0x10);
        assert_eq!(cpu.get(0x01FE), 0x02);
    });
    test_exec!(bsr, [0x8D, 0x02], 1, |cpu| {
        assert_eq!(cpu.pc, 0x1004);
        assert_eq!(cpu.sp, 0x01FD);
    });
    test_exec!(jmp_idx, [0xCE, 0x20, 0x00, 0x6E, 0x10], 2, |cpu| assert_eq!(cpu.pc, 0x2010));
    test_exec!(bset_bclr, [0x14, 0x40, 0x81, 0x15, 0x40, 0x01], 2, |cpu| {
        assert_eq!(cpu.get(0x0040), 0x80);
        assert!(cpu.flags.n);
    });
    test_exec!(brset_taken, [0x14, 0x40, 0x03, 0x12, 0x40, 0x03, 0x10], 2, |cpu| {
        assert_eq!(cpu.pc, 0x1017);
    });
    test_exec!(brclr_not_taken, [0x14, 0x40, 0x01, 0x13, 0x40, 0x01, 0x10], 2, |cpu| {
        assert_eq!(cpu.pc, 0x1007);
    });

    // LDA #cc; TAP; Bxx +$10. Taken lands on $1015, not taken on $1005.
    macro_rules! test_branch {
        ($name:ident, $op:expr, $cc:expr, $taken:expr) => {
            test_exec!($name, [0x86, $cc, 0x06, $op, 0x10], 3, |cpu| {
                let target = if $taken { 0x1015 } else { 0x1005 };
                assert_eq!(cpu.pc, target, "CC={:02X}", cpu.cc());
            });
        };
    }

    const C: u8 = 0x01;
    const V: u8 = 0x02;
    const Z: u8 = 0x04;
    const N: u8 = 0x08;

    test_branch!(bhi_clear, 0x22, 0, true);
    test_branch!(bhi_carry, 0x22, C, false);
    test_branch!(bhi_zero, 0x22, Z, false);
    test_branch!(bls_carry, 0x23, C, true);
    test_branch!(bls_zero, 0x23, Z, true);
    test_branch!(bls_clear, 0x23, 0, false);
    test_branch!(bcc_clear, 0x24, 0, true);
    test_branch!(bcc_carry, 0x24, C, false);
    test_branch!(bcs_carry, 0x25, C, true);
    test_branch!(bcs_clear, 0x25, 0, false);
    test_branch!(bvc_clear, 0x28, 0, true);
    test_branch!(bvc_overflow, 0x28, V, false);
    test_branch!(bvs_overflow, 0x29, V, true);
    test_branch!(bvs_clear, 0x29, 0, false);
    test_branch!(bpl_clear, 0x2A, 0, true);
    test_branch!(bpl_negative, 0x2A, N, false);
    test_branch!(bmi_negative, 0x2B, N, true);
    test_branch!(bmi_clear, 0x2B, 0, false);
    test_branch!(bge_clear, 0x2C, 0, true);
    test_branch!(bge_n_and_v, 0x2C, N | V, true);
    test_branch!(bge_negative, 0x2C, N, false);
    test_branch!(blt_negative, 0x2D, N, true);
    test_branch!(blt_overflow, 0x2D, V, true);
    test_branch!(blt_n_and_v, 0x2D, N | V, false);
    test_branch!(bgt_clear, 0x2E, 0, true);
    test_branch!(bgt_zero, 0x2E, Z, false);
    test_branch!(bgt_negative, 0x2E, N, false);
    test_branch!(ble_zero, 0x2F, Z, true);
    test_branch!(ble_overflow, 0x2F, V, true);
    test_branch!(ble_clear, 0x2F, 0, false);

    // $FF - 1 = $FE: N set, Z V C clear.
    test_exec!(blt_after_cmp, [0x86, 0xFF, 0x81, 0x01, 0x2D, 0x10], 3, |cpu| {
        assert_eq!(cpu.pc, 0x1016);
    });
    test_exec!(bge_after_cmp, [0x86, 0xFF, 0x81, 0x01, 0x2C, 0x10], 3, |cpu| {
        assert_eq!(cpu.pc, 0x1006);
    });

    test_exec!(cpx_equal, [0xCE, 0x10, 0x00, 0x8C, 0x10, 0x00], 2, |cpu| {
        assert_eq!(cpu.x, 0x1000);
        assert!(cpu.flags.z && !cpu.flags.c && !cpu.flags.n);
    });
    test_exec!(cpx_less, [0xCE, 0x00, 0x01, 0x8C, 0x00, 0x02], 2, |cpu| {
        assert!(cpu.flags.c && cpu.flags.n && !cpu.flags.z);
    });
    test_exec!(cpd_less, [0xCC, 0x00, 0x05, 0x1A, 0x83, 0x00, 0x06], 2, |cpu| {
        assert_eq!(cpu.d(), 5);
        assert!(cpu.flags.c && cpu.flags.n && !cpu.flags.z);
    });
    test_exec!(cpy_overflow, [0x18, 0xCE, 0x80, 0x00, 0x18, 0x8C, 0x00, 0x01], 2, |cpu| {
        assert_eq!(cpu.y, 0x8000);
        assert!(cpu.flags.v && !cpu.flags.n && !cpu.flags.c);
    });
    test_exec!(sbc_with_borrow, [0x0D, 0x86, 0x10, 0x82, 0x05], 3, |cpu| {
        assert_eq!(cpu.a, 0x0A);
        assert!(!cpu.flags.c && !cpu.flags.n);
    });
    test_exec!(bit_keeps_a, [0x86, 0xF0, 0x85, 0x0F], 2, |cpu| {
        assert_eq!(cpu.a, 0xF0);
        assert!(cpu.flags.z && !cpu.flags.v);
    });
    test_exec!(eor_b, [0xC6, 0xFF, 0xC8, 0x0F], 2, |cpu| {
        assert_eq!(cpu.b, 0xF0);
        assert!(cpu.flags.n && !cpu.flags.z);
    });
    test_exec!(lds_sts, [0x8E, 0x01, 0x50, 0xBF, 0x20, 0x00], 2, |cpu| {
        assert_eq!(cpu.sp, 0x0150);
        assert_eq!(cpu.get_word(0x2000), 0x0150);
    });
    test_exec!(sty_ext, [0x18, 0xCE, 0xAB, 0xCD, 0x18, 0xFF, 0x20, 0x02], 2, |cpu| {
        assert_eq!(cpu.get_word(0x2002), 0xABCD);
        assert!(cpu.flags.n);
    });
    test_exec!(des_ins, [0x8E, 0x01, 0x00, 0x34, 0x34, 0x31], 4, |cpu| {
        assert_eq!(cpu.sp, 0x00FF);
    });
    test_exec!(sei, [0x0F], 1, |cpu| assert!(cpu.flags.i));
    test_exec!(sei_cli, [0x0F, 0x0E], 2, |cpu| assert!(!cpu.flags.i));
    test_exec!(daa_half_carry, [0x86, 0x09, 0x8B, 0x08, 0x19], 3, |cpu| {
        assert_eq!(cpu.a, 0x17);
        assert!(!cpu.flags.c);
    });
    test_exec!(daa_wraps, [0x86, 0x99, 0x8B, 0x01, 0x19], 3, |cpu| {
        assert_eq!(cpu.a, 0x00);
        assert!(cpu.flags.c && cpu.flags.z);
    });

    #[test]
    fn swi_saves_state_and_halts() {
        let mut sim = program(0x1000, &[0x86, 0xAA, 0xCE, 0x12, 0x34, 0x3F]);
        assert_eq!(sim.run(10), 3);
        let cpu = sim.state();
        assert_eq!(cpu.halt, Some(Halt::Halted(m68arch::Mnemonic::SWI)));
        assert_eq!(cpu.pc, 0x1005);
        assert!(cpu.flags.i);
        assert_eq!(cpu.sp, 0x01FF - 7);
        // PC+1, X, A, B, CC from high to low addresses.
        assert_eq!(cpu.get_word(0x01FE), 0x1006);
        assert_eq!(cpu.get_word(0x01FC), 0x1234);
        assert_eq!(cpu.get(0x01FB), 0xAA);
        assert_eq!(cpu.get(0x01FA), 0x00);
        assert_eq!(cpu.get(0x01F9), 0xC0);
        assert!(!sim.step());
    }

    #[test]
    fn rti_restores_swi_frame() {
        let mut sim = program(0x1000, &[0x3F]);
        sim.state_mut().a = 0x11;
        sim.state_mut().x = 0x2222;
        assert!(sim.step());
        let sp = sim.state().sp;
        sim.state_mut().a = 0;
        sim.state_mut().x = 0;
        // Resume at the RTI placed after the SWI.
        sim.set_memory_value(0x1001, 0x3B);
        sim.state_mut().pc = 0x1001;
        sim.state_mut().halt = None;
        assert!(sim.step());
        let cpu = sim.state();
        assert_eq!(cpu.sp, sp + 7);
        assert_eq!(cpu.a, 0x11);
        assert_eq!(cpu.x, 0x2222);
        assert_eq!(cpu.pc, 0x1001);
    }

    #[test]
    fn halts_without_program() {
        let mut sim = Simulator::new();
        assert!(!sim.step());
        assert_eq!(sim.state().halt, Some(Halt::NoProgram));
        assert_eq!(sim.instruction_count(), 0);
    }

    #[test]
    fn halts_on_empty_memory() {
        let mut sim = program(0x1000, &[0x01]);
        assert_eq!(sim.run(10), 1);
        assert_eq!(sim.state().halt, Some(Halt::Unprogrammed(0x1001)));
        assert!(sim.get_state().halted);
    }

    #[test]
    fn halts_on_unknown_opcode() {
        let mut sim = program(0x1000, &[0x41]);
        assert!(!sim.step());
        assert_eq!(sim.state().halt, Some(Halt::UnknownOpcode(0x1000, 0x41)));
        assert_eq!(sim.instruction_count(), 0);
    }

    #[test]
    fn run_stops_at_max() {
        let mut sim = program(0x1000, &[0x20, 0xFE]);
        assert_eq!(sim.run(25), 25);
        assert!(!sim.is_halted());
        assert_eq!(sim.instruction_count(), 25);
    }

    #[test]
    fn reset_reloads_program() {
        let mut sim = program(0x1000, &[0x86, 0x55, 0xB7, 0x10, 0x00]);
        sim.run(10);
        assert_eq!(sim.get_memory_value(0x1000), 0x55);
        sim.reset();
        let snap = sim.get_state();
        assert_eq!(snap.registers.pc, 0x1000);
        assert_eq!(snap.registers.a, 0);
        assert_eq!(snap.registers.sp, 0x01FF);
        assert_eq!(snap.instruction_count, 0);
        assert!(snap.program_loaded && !snap.halted);
        assert_eq!(sim.get_memory_value(0x1000), 0x86);
    }

    #[test]
    fn load_clears_halt() {
        let mut sim = Simulator::new();
        sim.step();
        assert!(sim.is_halted());
        sim.load_program(&BTreeMap::from([(0x2000, 0x01)]));
        assert!(!sim.is_halted());
        assert_eq!(sim.program_start(), 0x2000);
        assert!(sim.step());
    }

    #[test]
    fn dump_defaults_to_program_page() {
        let sim = program(0x1234, &[0xAB]);
        assert!(sim
            .memory_dump(None, DEFAULT_DUMP_LENGTH)
            .starts_with("Memory Dump ($1230 - $132F):"));
        assert!(Simulator::new()
            .memory_dump(None, 16)
            .starts_with("Memory Dump ($1000 - $100F):"));
    }
}
