use crate::{error::EncodeError, mode::Mode, op::Mnemonic, reg::Acc};
use bimap::BiMap;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use strum::IntoEnumIterator;

/// Opcode prefixes that select the 68HC11 second page.
pub const PREFIXES: [u8; 2] = [0x18, 0x1A];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    Fixed(u32),
    ByRegister { a: u32, b: u32 },
}

impl Encoding {
    pub fn select(self, acc: Acc) -> u32 {
        match self {
            Encoding::Fixed(code) => code,
            Encoding::ByRegister { a, .. } if acc == Acc::A => a,
            Encoding::ByRegister { b, .. } => b,
        }
    }
}

/// Encoded opcode, one or two bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Opcode(pub u32);

impl Opcode {
    pub fn len(self) -> usize {
        match self.0 {
            0..=0xFF => 1,
            0x100..=0xFFFF => 2,
            _ => 3,
        }
    }

    pub fn bytes(self) -> Vec<u8> {
        let len = self.len();
        (0..len)
            .rev()
            .map(|i| (self.0 >> (8 * i)) as u8)
            .collect()
    }
}

type Entries = &'static [(Mode, Encoding)];

impl Mnemonic {
    /// Every addressing mode this mnemonic accepts and how it encodes.
    pub fn encodings(self) -> Entries {
        use Encoding::{ByRegister as R, Fixed as F};
        use Mnemonic::*;
        use Mode::*;
        match self {
            ABA => &[(INH, F(0x1B))],
            ABX => &[(INH, F(0x3A))],
            ABY => &[(INH, F(0x183A))],
            ADC => &[
                (IMM, R { a: 0x89, b: 0xC9 }),
                (DIR, R { a: 0x99, b: 0xD9 }),
                (EXT, R { a: 0xB9, b: 0xF9 }),
                (IDX, R { a: 0xA9, b: 0xE9 }),
            ],
            ADD => &[
                (IMM, R { a: 0x8B, b: 0xCB }),
                (DIR, R { a: 0x9B, b: 0xDB }),
                (EXT, R { a: 0xBB, b: 0xFB }),
                (IDX, R { a: 0xAB, b: 0xEB }),
            ],
            ADDD => &[
                (IMM, F(0xC3)),
                (DIR, F(0xD3)),
                (EXT, F(0xF3)),
                (IDX, F(0xE3)),
            ],
            AND => &[
                (IMM, R { a: 0x84, b: 0xC4 }),
                (DIR, R { a: 0x94, b: 0xD4 }),
                (EXT, R { a: 0xB4, b: 0xF4 }),
                (IDX, R { a: 0xA4, b: 0xE4 }),
            ],
            ASL => &[
                (INH, R { a: 0x48, b: 0x58 }),
                (EXT, F(0x78)),
                (IDX, F(0x68)),
            ],
            ASLD => &[(INH, F(0x05))],
            ASR => &[
                (INH, R { a: 0x47, b: 0x57 }),
                (EXT, F(0x77)),
                (IDX, F(0x67)),
            ],
            BCC => &[(REL, F(0x24))],
            BCLR => &[(DIR, F(0x15)), (IDX, F(0x1D))],
            BCS => &[(REL, F(0x25))],
            BEQ => &[(REL, F(0x27))],
            BGE => &[(REL, F(0x2C))],
            BGT => &[(REL, F(0x2E))],
            BHI => &[(REL, F(0x22))],
            BIT => &[
                (IMM, R { a: 0x85, b: 0xC5 }),
                (DIR, R { a: 0x95, b: 0xD5 }),
                (EXT, R { a: 0xB5, b: 0xF5 }),
                (IDX, R { a: 0xA5, b: 0xE5 }),
            ],
            BLE => &[(REL, F(0x2F))],
            BLS => &[(REL, F(0x23))],
            BLT => &[(REL, F(0x2D))],
            BMI => &[(REL, F(0x2B))],
            BNE => &[(REL, F(0x26))],
            BPL => &[(REL, F(0x2A))],
            BRA => &[(REL, F(0x20))],
            BRCLR => &[(DIR, F(0x13)), (IDX, F(0x1F))],
            BRSET => &[(DIR, F(0x12)), (IDX, F(0x1E))],
            BSET => &[(DIR, F(0x14)), (IDX, F(0x1C))],
            BSR => &[(REL, F(0x8D))],
            BVC => &[(REL, F(0x28))],
            BVS => &[(REL, F(0x29))],
            CBA => &[(INH, F(0x11))],
            CLC => &[(INH, F(0x0C))],
            CLI => &[(INH, F(0x0E))],
            CLR => &[
                (INH, R { a: 0x4F, b: 0x5F }),
                (EXT, F(0x7F)),
                (IDX, F(0x6F)),
            ],
            CLV => &[(INH, F(0x0A))],
            CMP => &[
                (IMM, R { a: 0x81, b: 0xC1 }),
                (DIR, R { a: 0x91, b: 0xD1 }),
                (EXT, R { a: 0xB1, b: 0xF1 }),
                (IDX, R { a: 0xA1, b: 0xE1 }),
            ],
            COM => &[
                (INH, R { a: 0x43, b: 0x53 }),
                (EXT, F(0x73)),
                (IDX, F(0x63)),
            ],
            CPD => &[
                (IMM, F(0x1A83)),
                (DIR, F(0x1A93)),
                (EXT, F(0x1AB3)),
                (IDX, F(0x1AA3)),
            ],
            CPX => &[
                (IMM, F(0x8C)),
                (DIR, F(0x9C)),
                (EXT, F(0xBC)),
                (IDX, F(0xAC)),
            ],
            CPY => &[
                (IMM, F(0x188C)),
                (DIR, F(0x189C)),
                (EXT, F(0x18BC)),
                (IDX, F(0x18AC)),
            ],
            DAA => &[(INH, F(0x19))],
            DEC => &[
                (INH, R { a: 0x4A, b: 0x5A }),
                (EXT, F(0x7A)),
                (IDX, F(0x6A)),
            ],
            DES => &[(INH, F(0x34))],
            DEX => &[(INH, F(0x09))],
            DEY => &[(INH, F(0x1809))],
            EOR => &[
                (IMM, R { a: 0x88, b: 0xC8 }),
                (DIR, R { a: 0x98, b: 0xD8 }),
                (EXT, R { a: 0xB8, b: 0xF8 }),
                (IDX, R { a: 0xA8, b: 0xE8 }),
            ],
            FDIV => &[(INH, F(0x03))],
            IDIV => &[(INH, F(0x02))],
            INC => &[
                (INH, R { a: 0x4C, b: 0x5C }),
                (EXT, F(0x7C)),
                (IDX, F(0x6C)),
            ],
            INS => &[(INH, F(0x31))],
            INX => &[(INH, F(0x08))],
            INY => &[(INH, F(0x1808))],
            JMP => &[(EXT, F(0x7E)), (IDX, F(0x6E))],
            JSR => &[(DIR, F(0x9D)), (EXT, F(0xBD)), (IDX, F(0xAD))],
            LDA => &[
                (IMM, F(0x86)),
                (DIR, F(0x96)),
                (EXT, F(0xB6)),
                (IDX, F(0xA6)),
            ],
            LDB => &[
                (IMM, F(0xC6)),
                (DIR, F(0xD6)),
                (EXT, F(0xF6)),
                (IDX, F(0xE6)),
            ],
            LDD => &[
                (IMM, F(0xCC)),
                (DIR, F(0xDC)),
                (EXT, F(0xFC)),
                (IDX, F(0xEC)),
            ],
            LDS => &[
                (IMM, F(0x8E)),
                (DIR, F(0x9E)),
                (EXT, F(0xBE)),
                (IDX, F(0xAE)),
            ],
            LDX => &[
                (IMM, F(0xCE)),
                (DIR, F(0xDE)),
                (EXT, F(0xFE)),
                (IDX, F(0xEE)),
            ],
            LDY => &[
                (IMM, F(0x18CE)),
                (DIR, F(0x18DE)),
                (EXT, F(0x18FE)),
                (IDX, F(0x18EE)),
            ],
            LSR => &[
                (INH, R { a: 0x44, b: 0x54 }),
                (EXT, F(0x74)),
                (IDX, F(0x64)),
            ],
            LSRD => &[(INH, F(0x04))],
            MUL => &[(INH, F(0x3D))],
            NEG => &[
                (INH, R { a: 0x40, b: 0x50 }),
                (EXT, F(0x70)),
                (IDX, F(0x60)),
            ],
            NOP => &[(INH, F(0x01))],
            ORA => &[
                (IMM, R { a: 0x8A, b: 0xCA }),
                (DIR, R { a: 0x9A, b: 0xDA }),
                (EXT, R { a: 0xBA, b: 0xFA }),
                (IDX, R { a: 0xAA, b: 0xEA }),
            ],
            PSH => &[(INH, R { a: 0x36, b: 0x37 })],
            PSHX => &[(INH, F(0x3C))],
            PSHY => &[(INH, F(0x183C))],
            PUL => &[(INH, R { a: 0x32, b: 0x33 })],
            PULX => &[(INH, F(0x38))],
            PULY => &[(INH, F(0x1838))],
            ROL => &[
                (INH, R { a: 0x49, b: 0x59 }),
                (EXT, F(0x79)),
                (IDX, F(0x69)),
            ],
            ROR => &[
                (INH, R { a: 0x46, b: 0x56 }),
                (EXT, F(0x76)),
                (IDX, F(0x66)),
            ],
            RTI => &[(INH, F(0x3B))],
            RTS => &[(INH, F(0x39))],
            SBA => &[(INH, F(0x10))],
            SBC => &[
                (IMM, R { a: 0x82, b: 0xC2 }),
                (DIR, R { a: 0x92, b: 0xD2 }),
                (EXT, R { a: 0xB2, b: 0xF2 }),
                (IDX, R { a: 0xA2, b: 0xE2 }),
            ],
            SEC => &[(INH, F(0x0D))],
            SEI => &[(INH, F(0x0F))],
            SEV => &[(INH, F(0x0B))],
            STA => &[(DIR, F(0x97)), (EXT, F(0xB7)), (IDX, F(0xA7))],
            STB => &[(DIR, F(0xD7)), (EXT, F(0xF7)), (IDX, F(0xE7))],
            STD => &[(DIR, F(0xDD)), (EXT, F(0xFD)), (IDX, F(0xED))],
            STS => &[(DIR, F(0x9F)), (EXT, F(0xBF)), (IDX, F(0xAF))],
            STX => &[(DIR, F(0xDF)), (EXT, F(0xFF)), (IDX, F(0xEF))],
            STY => &[(DIR, F(0x18DF)), (EXT, F(0x18FF)), (IDX, F(0x18EF))],
            SUB => &[
                (IMM, R { a: 0x80, b: 0xC0 }),
                (DIR, R { a: 0x90, b: 0xD0 }),
                (EXT, R { a: 0xB0, b: 0xF0 }),
                (IDX, R { a: 0xA0, b: 0xE0 }),
            ],
            SWI => &[(INH, F(0x3F))],
            TAB => &[(INH, F(0x16))],
            TAP => &[(INH, F(0x06))],
            TBA => &[(INH, F(0x17))],
            TPA => &[(INH, F(0x07))],
            TST => &[
                (INH, R { a: 0x4D, b: 0x5D }),
                (EXT, F(0x7D)),
                (IDX, F(0x6D)),
            ],
            TSX => &[(INH, F(0x30))],
            TSY => &[(INH, F(0x1830))],
            TXS => &[(INH, F(0x35))],
            TYS => &[(INH, F(0x1835))],
            WAI => &[(INH, F(0x3E))],
            XGDX => &[(INH, F(0x8F))],
            XGDY => &[(INH, F(0x188F))],
        }
    }

    pub fn encoding(self, mode: Mode) -> Option<Encoding> {
        self.encodings()
            .iter()
            .find(|(m, _)| *m == mode)
            .map(|(_, e)| *e)
    }

    pub fn supports(self, mode: Mode) -> bool {
        self.encoding(mode).is_some()
    }

    /// Supported addressing modes in table order.
    pub fn addressing_modes(self) -> Vec<Mode> {
        self.encodings().iter().map(|(m, _)| *m).collect()
    }

    /// Opcode for `mode`, choosing the accumulator for register-keyed
    /// entries. Fixed entries ignore `acc`.
    pub fn encode(self, mode: Mode, acc: Option<Acc>) -> Result<Opcode, EncodeError> {
        let encoding = self.encoding(mode).ok_or(EncodeError::UnsupportedMode {
            mnemonic: self,
            mode,
        })?;
        match (encoding, acc) {
            (Encoding::Fixed(code), _) => Ok(Opcode(code)),
            (Encoding::ByRegister { .. }, Some(acc)) => Ok(Opcode(encoding.select(acc))),
            (Encoding::ByRegister { .. }, None) => Err(EncodeError::RegisterRequired(self)),
        }
    }

    /// Number of bytes following the opcode.
    pub fn operand_len(self, mode: Mode) -> usize {
        let base = match mode {
            Mode::INH => 0,
            Mode::IMM if self.wide_immediate() => 2,
            Mode::IMM | Mode::DIR | Mode::IDX | Mode::REL => 1,
            Mode::EXT => 2,
        };
        match self {
            Mnemonic::BSET | Mnemonic::BCLR => base + 1,
            Mnemonic::BRSET | Mnemonic::BRCLR => base + 2,
            _ => base,
        }
    }
}

/// Name-based encode, as used from source text.
pub fn encode(name: &str, mode: Mode, register: Option<&str>) -> Result<Opcode, EncodeError> {
    let mnemonic = lookup(name).ok_or_else(|| EncodeError::UnknownInstruction(name.to_uppercase()))?;
    let acc = match register {
        Some(r) => Some(Acc::parse(r).map_err(|_| EncodeError::UnknownRegister {
            mnemonic,
            mode,
            register: r.to_uppercase(),
        })?),
        None => None,
    };
    mnemonic.encode(mode, acc)
}

pub fn lookup(name: &str) -> Option<Mnemonic> {
    Mnemonic::parse(name).ok()
}

static ALIASES: Lazy<HashMap<String, (Mnemonic, Acc)>> = Lazy::new(|| {
    use Acc::*;
    use Mnemonic::*;
    let mut aliases = HashMap::new();
    for (base, m) in [
        ("ASL", ASL),
        ("ASR", ASR),
        ("CLR", CLR),
        ("COM", COM),
        ("DEC", DEC),
        ("INC", INC),
        ("NEG", NEG),
        ("TST", TST),
        ("LSR", LSR),
        ("ROL", ROL),
        ("ROR", ROR),
        ("PSH", PSH),
        ("PUL", PUL),
        ("ADD", ADD),
        ("ADC", ADC),
        ("AND", AND),
        ("BIT", BIT),
        ("CMP", CMP),
        ("EOR", EOR),
        ("ORA", ORA),
        ("SBC", SBC),
        ("SUB", SUB),
    ] {
        aliases.insert(format!("{base}A"), (m, A));
        aliases.insert(format!("{base}B"), (m, B));
    }
    for (name, m, acc) in [
        ("LDAA", LDA, A),
        ("LDAB", LDB, B),
        ("STAA", STA, A),
        ("STAB", STB, B),
        ("ORB", ORA, B),
    ] {
        aliases.insert(name.to_string(), (m, acc));
    }
    aliases
});

/// Motorola style names such as `LDAA` or `CLRB`.
pub fn resolve_alias(name: &str) -> Option<(Mnemonic, Acc)> {
    ALIASES.get(&name.to_uppercase()).copied()
}

pub fn is_alias(name: &str) -> bool {
    resolve_alias(name).is_some()
}

/// Every alias, sorted by name.
pub fn aliases() -> Vec<(&'static str, Mnemonic, Acc)> {
    let mut list: Vec<_> = ALIASES
        .iter()
        .map(|(name, &(m, acc))| (name.as_str(), m, acc))
        .collect();
    list.sort_by_key(|(name, _, _)| *name);
    list
}

/// One row of the opcode map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OpKey {
    pub mnemonic: Mnemonic,
    pub mode: Mode,
    pub acc: Option<Acc>,
}

impl OpKey {
    pub fn operand_len(&self) -> usize {
        self.mnemonic.operand_len(self.mode)
    }
}

static OPCODES: Lazy<BiMap<OpKey, u32>> = Lazy::new(|| {
    let mut map = BiMap::new();
    for key in keys() {
        let code = match (key.mnemonic.encoding(key.mode), key.acc) {
            (Some(e), Some(acc)) => e.select(acc),
            (Some(Encoding::Fixed(code)), None) => code,
            _ => continue,
        };
        map.insert(key, code);
    }
    map
});

/// Every (mnemonic, mode, accumulator) combination in the table.
pub fn keys() -> Vec<OpKey> {
    let mut keys = Vec::new();
    for mnemonic in Mnemonic::iter() {
        for &(mode, encoding) in mnemonic.encodings() {
            match encoding {
                Encoding::Fixed(_) => keys.push(OpKey {
                    mnemonic,
                    mode,
                    acc: None,
                }),
                Encoding::ByRegister { .. } => {
                    for acc in Acc::iter() {
                        keys.push(OpKey {
                            mnemonic,
                            mode,
                            acc: Some(acc),
                        })
                    }
                }
            }
        }
    }
    keys
}

pub fn opcode_of(key: &OpKey) -> Option<Opcode> {
    OPCODES.get_by_left(key).map(|c| Opcode(*c))
}

/// Decode the opcode at the start of `bytes`, returning the table row and
/// the opcode length.
pub fn decode(bytes: &[u8]) -> Option<(OpKey, usize)> {
    let first = *bytes.first()?;
    let (code, len) = if PREFIXES.contains(&first) {
        ((first as u32) << 8 | *bytes.get(1)? as u32, 2)
    } else {
        (first as u32, 1)
    };
    OPCODES.get_by_right(&code).map(|key| (*key, len))
}
