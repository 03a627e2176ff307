use crate::{
    error::Error,
    number::{parse_value, Scope, Value},
    parser::{split_bit_operands, split_register},
};
use m68arch::{Acc, Mnemonic, Mode, Opcode};

// ----------------------------------------------------------------------------
// Operand

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    None,
    /// 8-bit immediate or direct address.
    Byte(Value),
    /// 16-bit immediate or extended address.
    Word(Value),
    /// Unsigned index offset.
    Offset(Value),
    /// Branch target address.
    Relative(Value),
    /// Bit manipulation: address or offset, mask, and branch target.
    Bit {
        base: Value,
        mask: Value,
        target: Option<Value>,
    },
}

/// Resolve an operand value. With a final-pass scope an unknown label is an
/// error instead of a placeholder.
fn value(text: &str, scope: &Scope) -> Result<Value, Error> {
    let v = parse_value(text, scope)?;
    match v {
        Value::Forward(None) if scope.resolve => {
            Err(Error::UndefinedLabel(text.trim().to_uppercase()))
        }
        _ => Ok(v),
    }
}

/// `offset,X` without the index suffix. An empty offset means zero.
fn strip_index(text: &str) -> Option<&str> {
    let split = text.len().checked_sub(2)?;
    let suffix = text.get(split..)?;
    if suffix.eq_ignore_ascii_case(",X") {
        let offset = text[..split].trim();
        Some(if offset.is_empty() { "0" } else { offset })
    } else {
        None
    }
}

/// Page-zero values get the direct form, everything else extended. Forward
/// references always take the extended form so both passes agree on size.
fn memory(v: Value) -> (Mode, Operand) {
    match v {
        Value::Literal(x) | Value::Symbol(x) if x <= 0xFF => (Mode::DIR, Operand::Byte(v)),
        _ => (Mode::EXT, Operand::Word(v)),
    }
}

/// Classify an operand field by its syntax.
pub fn parse_operand(
    text: &str,
    mnemonic: Mnemonic,
    scope: &Scope,
) -> Result<(Mode, Operand, Option<Acc>), Error> {
    let text = text.trim();
    if text.is_empty() {
        return Err(Error::EmptyOperand);
    }
    if let Some(imm) = text.strip_prefix('#') {
        let v = value(imm, scope)?;
        let operand = if mnemonic.wide_immediate() {
            Operand::Word(v)
        } else {
            Operand::Byte(v)
        };
        return Ok((Mode::IMM, operand, None));
    }
    if let Some(offset) = strip_index(text) {
        return Ok((Mode::IDX, Operand::Offset(value(offset, scope)?), None));
    }
    if let Ok(acc) = Acc::parse(text) {
        return Ok((Mode::INH, Operand::None, Some(acc)));
    }
    if mnemonic.is_branch() {
        return Ok((Mode::REL, Operand::Relative(value(text, scope)?), None));
    }
    let (mode, operand) = memory(value(text, scope)?);
    Ok((mode, operand, None))
}

// ----------------------------------------------------------------------------
// Code

/// An instruction with its addressing mode and opcode chosen. Sizing and
/// emission both go through this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Code {
    pub mnemonic: Mnemonic,
    pub mode: Mode,
    pub opcode: Opcode,
    pub operand: Operand,
}

impl Code {
    pub fn prepare(mnemonic: Mnemonic, operands: &[String], scope: &Scope) -> Result<Code, Error> {
        if mnemonic.is_bit_op() {
            return Code::prepare_bit(mnemonic, &operands.join(","), scope);
        }

        if operands.is_empty() {
            if !mnemonic.supports(Mode::INH) {
                return Err(Error::MissingOperand(mnemonic.to_string()));
            }
            let acc = mnemonic.inherent_defaults_to_a().then_some(Acc::A);
            let opcode = mnemonic.encode(Mode::INH, acc)?;
            return Ok(Code {
                mnemonic,
                mode: Mode::INH,
                opcode,
                operand: Operand::None,
            });
        }

        let (mut acc, rest) = split_register(operands);
        if acc.is_none() && mnemonic.register_ambiguous() {
            acc = Some(Acc::A);
        }
        let (mut mode, mut operand, named) = parse_operand(&rest.concat(), mnemonic, scope)?;
        if named.is_some() {
            acc = named;
        }
        let mnemonic = mnemonic.for_register(acc);
        if mode == Mode::DIR && !mnemonic.supports(Mode::DIR) && mnemonic.supports(Mode::EXT) {
            if let Operand::Byte(v) = operand {
                mode = Mode::EXT;
                operand = Operand::Word(v);
            }
        }
        let opcode = mnemonic.encode(mode, acc)?;
        Ok(Code {
            mnemonic,
            mode,
            opcode,
            operand,
        })
    }

    fn prepare_bit(mnemonic: Mnemonic, text: &str, scope: &Scope) -> Result<Code, Error> {
        let expected = if mnemonic.is_bit_branch() { 3 } else { 2 };
        let parts = split_bit_operands(text);
        if text.trim().is_empty() || parts.len() != expected {
            return Err(Error::BitOperands { mnemonic, expected });
        }
        let (mode, base) = match strip_index(&parts[0]) {
            Some(offset) => (Mode::IDX, value(offset, scope)?),
            None => (Mode::DIR, value(&parts[0], scope)?),
        };
        let mask = match parts[1].strip_prefix('#') {
            Some(mask) => value(mask, scope)?,
            None => return Err(Error::BitMask(parts[1].clone())),
        };
        let target = match parts.get(2) {
            Some(t) if expected == 3 => Some(value(t, scope)?),
            _ => None,
        };
        Ok(Code {
            mnemonic,
            mode,
            opcode: mnemonic.encode(mode, None)?,
            operand: Operand::Bit { base, mask, target },
        })
    }

    pub fn size(&self) -> usize {
        self.opcode.len() + self.mnemonic.operand_len(self.mode)
    }

    /// Encode at `addr`. Operand values must be resolved by now.
    pub fn emit(&self, addr: u16) -> Result<Vec<u8>, Error> {
        let mut bytes = self.opcode.bytes();
        let next = addr as i32 + self.size() as i32;
        let byte = |v: Value, err: fn(u16) -> Error| -> Result<u8, Error> {
            let v = v.or_placeholder();
            u8::try_from(v).map_err(|_| err(v))
        };
        let relative = |v: Value| -> Result<u8, Error> {
            let offset = v.or_placeholder() as i32 - next;
            i8::try_from(offset)
                .map(|o| o as u8)
                .map_err(|_| Error::BranchOutOfRange(offset))
        };
        match self.operand {
            Operand::None => {}
            Operand::Byte(v) if self.mode == Mode::IMM => {
                bytes.push(byte(v, Error::ImmediateTooLarge)?)
            }
            Operand::Byte(v) => bytes.push(byte(v, Error::DirectOutOfRange)?),
            Operand::Word(v) => bytes.extend(v.or_placeholder().to_be_bytes()),
            Operand::Offset(v) => bytes.push(byte(v, Error::IndexOffsetOutOfRange)?),
            Operand::Relative(v) => bytes.push(relative(v)?),
            Operand::Bit { base, mask, target } => {
                let err: fn(u16) -> Error = match self.mode {
                    Mode::IDX => Error::IndexOffsetOutOfRange,
                    _ => Error::DirectOutOfRange,
                };
                bytes.push(byte(base, err)?);
                bytes.push(byte(mask, Error::ImmediateTooLarge)?);
                if let Some(t) = target {
                    bytes.push(relative(t)?);
                }
            }
        }
        debug_assert_eq!(bytes.len(), self.size());
        Ok(bytes)
    }
}
