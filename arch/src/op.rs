use crate::reg::Acc;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    EnumString,
    EnumIter,
    Display,
)]
#[allow(clippy::upper_case_acronyms)]
pub enum Mnemonic {
    ABA,
    ABX,
    ABY,
    ADC,
    ADD,
    ADDD,
    AND,
    ASL,
    ASLD,
    ASR,
    BCC,
    BCLR,
    BCS,
    BEQ,
    BGE,
    BGT,
    BHI,
    BIT,
    BLE,
    BLS,
    BLT,
    BMI,
    BNE,
    BPL,
    BRA,
    BRCLR,
    BRSET,
    BSET,
    BSR,
    BVC,
    BVS,
    CBA,
    CLC,
    CLI,
    CLR,
    CLV,
    CMP,
    COM,
    CPD,
    CPX,
    CPY,
    DAA,
    DEC,
    DES,
    DEX,
    DEY,
    EOR,
    FDIV,
    IDIV,
    INC,
    INS,
    INX,
    INY,
    JMP,
    JSR,
    LDA,
    LDB,
    LDD,
    LDS,
    LDX,
    LDY,
    LSR,
    LSRD,
    MUL,
    NEG,
    NOP,
    ORA,
    PSH,
    PSHX,
    PSHY,
    PUL,
    PULX,
    PULY,
    ROL,
    ROR,
    RTI,
    RTS,
    SBA,
    SBC,
    SEC,
    SEI,
    SEV,
    STA,
    STB,
    STD,
    STS,
    STX,
    STY,
    SUB,
    SWI,
    TAB,
    TAP,
    TBA,
    TPA,
    TST,
    TSX,
    TSY,
    TXS,
    TYS,
    WAI,
    XGDX,
    XGDY,
}

impl Mnemonic {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_uppercase().parse::<Self>() {
            Ok(m) => Ok(m),
            Err(_) => Err(format!("Unknown instruction: {}", s.to_uppercase())),
        }
    }

    /// Conditional and unconditional relative branches.
    pub fn is_branch(self) -> bool {
        use Mnemonic::*;
        matches!(
            self,
            BRA | BSR
                | BCC
                | BCS
                | BEQ
                | BGE
                | BGT
                | BHI
                | BLE
                | BLS
                | BLT
                | BMI
                | BNE
                | BPL
                | BVC
                | BVS
        )
    }

    /// Bit manipulation with a memory operand, a mask and, for the
    /// branching forms, a relative target.
    pub fn is_bit_op(self) -> bool {
        use Mnemonic::*;
        matches!(self, BSET | BCLR | BRSET | BRCLR)
    }

    pub fn is_bit_branch(self) -> bool {
        matches!(self, Mnemonic::BRSET | Mnemonic::BRCLR)
    }

    /// Immediate operand is 16 bits wide.
    pub fn wide_immediate(self) -> bool {
        use Mnemonic::*;
        matches!(self, LDX | LDS | LDD | LDY | CPX | CPY | CPD | ADDD)
    }

    /// Two-operand arithmetic and logic that works on either accumulator.
    /// The assembler picks A when no register is written.
    pub fn register_ambiguous(self) -> bool {
        use Mnemonic::*;
        matches!(self, ADD | ADC | AND | BIT | CMP | EOR | ORA | SBC | SUB)
    }

    /// Register-keyed inherent forms that act on A when written without a
    /// register. Stack operations must always name one.
    pub fn inherent_defaults_to_a(self) -> bool {
        !matches!(self, Mnemonic::PSH | Mnemonic::PUL)
    }

    /// Load/store written with an explicit accumulator (`LDA B`) maps to the
    /// mnemonic for that accumulator. Everything else is unchanged.
    pub fn for_register(self, acc: Option<Acc>) -> Self {
        use Mnemonic::*;
        match (self, acc) {
            (LDA, Some(Acc::B)) => LDB,
            (LDB, Some(Acc::A)) => LDA,
            (STA, Some(Acc::B)) => STB,
            (STB, Some(Acc::A)) => STA,
            (m, _) => m,
        }
    }
}
