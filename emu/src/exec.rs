use crate::{error::Halt, model::CpuState};
use m68arch::{
    alu::{self, Unary, ALU},
    Acc, Instruction, Mnemonic, Mode,
};

fn branch_taken(m: Mnemonic, c: bool, v: bool, z: bool, n: bool) -> bool {
    use Mnemonic::*;
    match m {
        BRA | BSR => true,
        BHI => !(c || z),
        BLS => c || z,
        BCC => !c,
        BCS => c,
        BNE => !z,
        BEQ => z,
        BVC => !v,
        BVS => v,
        BPL => !n,
        BMI => n,
        BGE => n == v,
        BLT => n != v,
        BGT => !z && n == v,
        BLE => z || n != v,
        _ => false,
    }
}

fn relative(next: u16, offset: u8) -> u16 {
    next.wrapping_add(offset as i8 as u16)
}

// Operand access
impl CpuState {
    /// Effective address for memory modes. Indexed offsets are unsigned.
    fn address(&self, inst: &Instruction) -> u16 {
        match inst.mode() {
            Mode::DIR => inst.byte(0) as u16,
            Mode::EXT => inst.word(0),
            Mode::IDX => self.x.wrapping_add(inst.byte(0) as u16),
            _ => 0,
        }
    }

    fn read8(&self, inst: &Instruction) -> u8 {
        match inst.mode() {
            Mode::IMM => inst.byte(0),
            _ => self.get(self.address(inst)),
        }
    }

    fn read16(&self, inst: &Instruction) -> u16 {
        match inst.mode() {
            Mode::IMM => inst.word(0),
            _ => self.get_word(self.address(inst)),
        }
    }

    fn accumulator(inst: &Instruction) -> Acc {
        inst.key.acc.unwrap_or(Acc::A)
    }
}

impl CpuState {
    /// Execute one decoded instruction located at `self.pc`.
    pub(crate) fn execute(&mut self, inst: &Instruction) {
        use Mnemonic::*;
        let pc = self.pc;
        let next = pc.wrapping_add(inst.len() as u16);
        self.pc = next;

        let m = inst.mnemonic();
        if let Ok(op) = ALU::try_from(m) {
            return self.calc(op, inst);
        }
        if let Ok(op) = Unary::try_from(m) {
            return self.modify(op, inst);
        }
        if m.is_branch() {
            if m == BSR {
                self.push_return(next);
            }
            let f = self.flags;
            if branch_taken(m, f.c, f.v, f.z, f.n) {
                self.pc = relative(next, inst.byte(0));
            }
            return;
        }
        if m.is_bit_op() {
            return self.bit(m, inst, next);
        }

        match m {
            // Loads and stores
            LDA => self.a = self.read8_logic(inst),
            LDB => self.b = self.read8_logic(inst),
            LDD => {
                let v = self.read16_logic(inst);
                self.set_d(v);
            }
            LDX => self.x = self.read16_logic(inst),
            LDY => self.y = self.read16_logic(inst),
            LDS => self.sp = self.read16_logic(inst),
            STA => self.store8(inst, self.a),
            STB => self.store8(inst, self.b),
            STD => self.store16(inst, self.d()),
            STX => self.store16(inst, self.x),
            STY => self.store16(inst, self.y),
            STS => self.store16(inst, self.sp),

            // Accumulator to accumulator
            ABA => self.a = alu::add8(&mut self.flags, self.a, self.b, false),
            SBA => self.a = alu::sub8(&mut self.flags, self.a, self.b, false),
            CBA => {
                alu::sub8(&mut self.flags, self.a, self.b, false);
            }
            TAB => self.b = alu::logic(&mut self.flags, self.a),
            TBA => self.a = alu::logic(&mut self.flags, self.b),
            DAA => self.a = alu::daa(&mut self.flags, self.a),

            // 16-bit arithmetic
            ADDD => {
                let (d, v) = (self.d(), self.read16(inst));
                let r = alu::add16(&mut self.flags, d, v);
                self.set_d(r);
            }
            CPD => self.compare16(inst, self.d()),
            CPX => self.compare16(inst, self.x),
            CPY => self.compare16(inst, self.y),
            ASLD => {
                let d = self.d();
                let r = alu::asld(&mut self.flags, d);
                self.set_d(r);
            }
            LSRD => {
                let d = self.d();
                let r = alu::lsrd(&mut self.flags, d);
                self.set_d(r);
            }
            ABX => self.x = self.x.wrapping_add(self.b as u16),
            ABY => self.y = self.y.wrapping_add(self.b as u16),
            MUL => {
                let r = self.a as u16 * self.b as u16;
                self.set_d(r);
                self.flags.c = self.b & 0x80 != 0;
            }
            IDIV => self.idiv(),
            FDIV => self.fdiv(),

            // Index and stack registers
            INX => {
                self.x = self.x.wrapping_add(1);
                self.flags.z = self.x == 0;
            }
            DEX => {
                self.x = self.x.wrapping_sub(1);
                self.flags.z = self.x == 0;
            }
            INY => {
                self.y = self.y.wrapping_add(1);
                self.flags.z = self.y == 0;
            }
            DEY => {
                self.y = self.y.wrapping_sub(1);
                self.flags.z = self.y == 0;
            }
            INS => self.sp = self.sp.wrapping_add(1),
            DES => self.sp = self.sp.wrapping_sub(1),
            TSX => self.x = self.sp.wrapping_add(1),
            TXS => self.sp = self.x.wrapping_sub(1),
            TSY => self.y = self.sp.wrapping_add(1),
            TYS => self.sp = self.y.wrapping_sub(1),
            XGDX => {
                let d = self.d();
                self.set_d(self.x);
                self.x = d;
            }
            XGDY => {
                let d = self.d();
                self.set_d(self.y);
                self.y = d;
            }
            PSH => self.push(self.acc(Self::accumulator(inst))),
            PUL => {
                let v = self.pull();
                self.set_acc(Self::accumulator(inst), v);
            }
            PSHX => self.push_word(self.x),
            PULX => self.x = self.pull_word(),
            PSHY => self.push_word(self.y),
            PULY => self.y = self.pull_word(),

            // Condition codes
            CLC => self.flags.c = false,
            SEC => self.flags.c = true,
            CLV => self.flags.v = false,
            SEV => self.flags.v = true,
            CLI => self.flags.i = false,
            SEI => self.flags.i = true,
            TAP => self.set_cc(self.a),
            TPA => self.a = self.cc(),

            // Control flow
            JMP => self.pc = self.address(inst),
            JSR => {
                let target = self.address(inst);
                self.push_return(next);
                self.pc = target;
            }
            RTS => self.pc = self.pull_return(),
            RTI => {
                let cc = self.pull();
                self.set_cc(cc);
                self.b = self.pull();
                self.a = self.pull();
                self.x = self.pull_word();
                self.pc = self.pull_word();
            }
            SWI => {
                self.push_word(next);
                self.push_word(self.x);
                self.push(self.a);
                self.push(self.b);
                self.push(self.cc());
                self.flags.i = true;
                self.pc = pc;
                self.halt = Some(Halt::Halted(SWI));
            }
            WAI => {
                self.pc = pc;
                self.halt = Some(Halt::Halted(WAI));
            }
            NOP => {}

            // Handled above.
            _ => {}
        }
    }

    fn calc(&mut self, op: ALU, inst: &Instruction) {
        let acc = Self::accumulator(inst);
        let (cur, operand) = (self.acc(acc), self.read8(inst));
        let r = alu::valu(op, &mut self.flags, cur, operand);
        if op.stores() {
            self.set_acc(acc, r);
        }
    }

    fn modify(&mut self, op: Unary, inst: &Instruction) {
        if inst.mode() == Mode::INH {
            let acc = Self::accumulator(inst);
            let cur = self.acc(acc);
            let r = alu::unary(op, &mut self.flags, cur);
            if op.stores() {
                self.set_acc(acc, r);
            }
        } else {
            let addr = self.address(inst);
            let cur = self.get(addr);
            let r = alu::unary(op, &mut self.flags, cur);
            if op.stores() {
                self.set(addr, r);
            }
        }
    }

    fn bit(&mut self, m: Mnemonic, inst: &Instruction, next: u16) {
        let addr = match inst.mode() {
            Mode::IDX => self.x.wrapping_add(inst.byte(0) as u16),
            _ => inst.byte(0) as u16,
        };
        let mask = inst.byte(1);
        let value = self.get(addr);
        match m {
            Mnemonic::BSET => {
                let r = alu::logic(&mut self.flags, value | mask);
                self.set(addr, r);
            }
            Mnemonic::BCLR => {
                let r = alu::logic(&mut self.flags, value & !mask);
                self.set(addr, r);
            }
            Mnemonic::BRSET if !value & mask == 0 => self.pc = relative(next, inst.byte(2)),
            Mnemonic::BRCLR if value & mask == 0 => self.pc = relative(next, inst.byte(2)),
            _ => {}
        }
    }

    fn read8_logic(&mut self, inst: &Instruction) -> u8 {
        let v = self.read8(inst);
        alu::logic(&mut self.flags, v)
    }

    fn read16_logic(&mut self, inst: &Instruction) -> u16 {
        let v = self.read16(inst);
        alu::logic16(&mut self.flags, v)
    }

    fn store8(&mut self, inst: &Instruction, value: u8) {
        let addr = self.address(inst);
        let value = alu::logic(&mut self.flags, value);
        self.set(addr, value);
    }

    fn store16(&mut self, inst: &Instruction, value: u16) {
        let addr = self.address(inst);
        let value = alu::logic16(&mut self.flags, value);
        self.set_word(addr, value);
    }

    fn compare16(&mut self, inst: &Instruction, reg: u16) {
        let v = self.read16(inst);
        alu::sub16(&mut self.flags, reg, v);
    }

    /// D / X: quotient to X, remainder to D.
    fn idiv(&mut self) {
        let (d, x) = (self.d(), self.x);
        if x == 0 {
            self.flags.c = true;
            self.flags.v = true;
            return;
        }
        self.x = d / x;
        self.set_d(d % x);
        self.flags.z = self.x == 0;
        self.flags.c = false;
        self.flags.v = false;
    }

    /// (D << 16) / X for D < X: fractional quotient to X, remainder to D.
    fn fdiv(&mut self) {
        let (d, x) = (self.d(), self.x);
        if x == 0 || d >= x {
            self.flags.c = true;
            self.flags.v = true;
            return;
        }
        let shifted = (d as u32) << 16;
        self.x = (shifted / x as u32) as u16;
        self.set_d((shifted % x as u32) as u16);
        self.flags.z = self.x == 0;
        self.flags.c = false;
        self.flags.v = false;
    }
}
