use crate::error::Halt;
use m68arch::{inst::MAX_LEN, Acc, Flags, Instruction, Reg};
use serde::{Deserialize, Serialize};

pub const MEMORY_SIZE: usize = 0x10000;

/// Stack pointer after reset: top of page 1.
pub const INITIAL_SP: u16 = 0x01FF;

/// Register file as seen from outside. `cc` is packed from the flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registers {
    pub a: u8,
    pub b: u8,
    pub x: u16,
    pub y: u16,
    pub sp: u16,
    pub pc: u16,
    pub cc: u8,
}

/// Processor registers, flags and the 64K address space.
///
/// CC is never stored on its own: it is packed from `flags` on read and
/// unpacked into `flags` on write, so the two cannot drift apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpuState {
    pub a: u8,
    pub b: u8,
    pub x: u16,
    pub y: u16,
    pub sp: u16,
    pub pc: u16,
    pub flags: Flags,
    memory: Vec<u8>,
    pub instruction_count: u64,
    pub halt: Option<Halt>,
}

impl Default for CpuState {
    fn default() -> Self {
        CpuState::new()
    }
}

// Registers
impl CpuState {
    pub fn new() -> Self {
        CpuState {
            a: 0,
            b: 0,
            x: 0,
            y: 0,
            sp: INITIAL_SP,
            pc: 0,
            flags: Flags::default(),
            memory: vec![0; MEMORY_SIZE],
            instruction_count: 0,
            halt: None,
        }
    }

    pub fn is_halted(&self) -> bool {
        self.halt.is_some()
    }

    pub fn cc(&self) -> u8 {
        self.flags.pack()
    }

    pub fn set_cc(&mut self, cc: u8) {
        self.flags = Flags::unpack(cc);
    }

    /// A:B as one 16-bit register.
    pub fn d(&self) -> u16 {
        u16::from_be_bytes([self.a, self.b])
    }

    pub fn set_d(&mut self, d: u16) {
        [self.a, self.b] = d.to_be_bytes();
    }

    pub fn acc(&self, acc: Acc) -> u8 {
        match acc {
            Acc::A => self.a,
            Acc::B => self.b,
        }
    }

    pub fn set_acc(&mut self, acc: Acc, value: u8) {
        match acc {
            Acc::A => self.a = value,
            Acc::B => self.b = value,
        }
    }

    pub fn registers(&self) -> Registers {
        Registers {
            a: self.a,
            b: self.b,
            x: self.x,
            y: self.y,
            sp: self.sp,
            pc: self.pc,
            cc: self.cc(),
        }
    }

    /// Register by name. Unknown names read as zero.
    pub fn register(&self, name: &str) -> u16 {
        match Reg::parse(name) {
            Ok(Reg::A) => self.a as u16,
            Ok(Reg::B) => self.b as u16,
            Ok(Reg::X) => self.x,
            Ok(Reg::Y) => self.y,
            Ok(Reg::SP) => self.sp,
            Ok(Reg::PC) => self.pc,
            Ok(Reg::CC) => self.cc() as u16,
            Err(_) => 0,
        }
    }

    /// Write a register by name, masked to its width. Unknown names are
    /// ignored.
    pub fn set_register(&mut self, name: &str, value: u32) {
        let Ok(reg) = Reg::parse(name) else {
            return;
        };
        let mask = if reg.is_wide() { 0xFFFF } else { 0xFF };
        let value = (value & mask) as u16;
        match reg {
            Reg::A => self.a = value as u8,
            Reg::B => self.b = value as u8,
            Reg::CC => self.set_cc(value as u8),
            Reg::X => self.x = value,
            Reg::Y => self.y = value,
            Reg::SP => self.sp = value,
            Reg::PC => self.pc = value,
        }
    }
}

// Memory access
impl CpuState {
    pub fn get(&self, addr: u16) -> u8 {
        self.memory[addr as usize]
    }

    pub fn set(&mut self, addr: u16, value: u8) {
        self.memory[addr as usize] = value;
    }

    /// Big-endian word. The address wraps at $FFFF.
    pub fn get_word(&self, addr: u16) -> u16 {
        u16::from_be_bytes([self.get(addr), self.get(addr.wrapping_add(1))])
    }

    pub fn set_word(&mut self, addr: u16, value: u16) {
        let [hi, lo] = value.to_be_bytes();
        self.set(addr, hi);
        self.set(addr.wrapping_add(1), lo);
    }

    pub fn memory(&self) -> &[u8] {
        &self.memory
    }

    /// Decode the instruction at `addr` without executing it.
    pub fn decode_at(&self, addr: u16) -> Option<Instruction> {
        let window: Vec<u8> = (0..MAX_LEN as u16)
            .map(|i| self.get(addr.wrapping_add(i)))
            .collect();
        Instruction::decode(&window)
    }

    /// Every address where `pattern` starts.
    pub fn search(&self, pattern: &[u8]) -> Vec<u16> {
        if pattern.is_empty() {
            return vec![];
        }
        self.memory
            .windows(pattern.len())
            .enumerate()
            .filter(|(_, w)| *w == pattern)
            .map(|(addr, _)| addr as u16)
            .collect()
    }

    /// Hex and ASCII dump of `length` bytes from `start`, 16 per row.
    pub fn dump(&self, start: u16, length: usize) -> String {
        let start = start as usize;
        let end = start.saturating_add(length).min(MEMORY_SIZE);
        if end == start {
            return format!("Memory Dump (${start:04X}, empty)\n");
        }
        let mut dump = format!(
            "Memory Dump (${:04X} - ${:04X}):\n",
            start,
            end.saturating_sub(1)
        );
        dump += "Address  +0 +1 +2 +3 +4 +5 +6 +7 +8 +9 +A +B +C +D +E +F  ASCII\n";
        dump += &"-".repeat(70);
        dump += "\n";
        for row in (start..end).step_by(16) {
            let mut hex = String::new();
            let mut ascii = String::new();
            for addr in row..row + 16 {
                if addr < end {
                    let byte = self.memory[addr];
                    hex += &format!("{byte:02X} ");
                    ascii.push(if (0x20..=0x7E).contains(&byte) {
                        byte as char
                    } else {
                        '.'
                    });
                } else {
                    hex += "   ";
                    ascii.push(' ');
                }
            }
            dump += &format!("{row:04X}:   {hex} {ascii}\n");
            if dump.len() > 4000 {
                dump += "... (truncated)\n";
                break;
            }
        }
        dump
    }
}

// Stack
impl CpuState {
    /// Write at SP, then decrement.
    pub fn push(&mut self, value: u8) {
        self.set(self.sp, value);
        self.sp = self.sp.wrapping_sub(1);
    }

    /// Increment SP, then read.
    pub fn pull(&mut self) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        self.get(self.sp)
    }

    /// Low byte first, so the high byte ends up at the lower address.
    pub fn push_word(&mut self, value: u16) {
        let [hi, lo] = value.to_be_bytes();
        self.push(lo);
        self.push(hi);
    }

    pub fn pull_word(&mut self) -> u16 {
        let hi = self.pull();
        let lo = self.pull();
        u16::from_be_bytes([hi, lo])
    }

    /// Subroutine return address: high byte first.
    pub fn push_return(&mut self, addr: u16) {
        let [hi, lo] = addr.to_be_bytes();
        self.push(hi);
        self.push(lo);
    }

    pub fn pull_return(&mut self) -> u16 {
        let lo = self.pull();
        let hi = self.pull();
        u16::from_be_bytes([hi, lo])
    }
}
