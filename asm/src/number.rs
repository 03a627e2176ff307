//! Numeric literals and symbol references in operand fields.

use crate::label::{is_valid_label, Labels};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NumberError {
    #[error("Empty number")]
    Empty,
    #[error("Missing digits after prefix: {0}")]
    Incomplete(String),
    #[error("Invalid digit for base {base}: {text}")]
    InvalidDigit { text: String, base: u32 },
    #[error("Negative value not allowed: {0}")]
    Negative(String),
    #[error("Value out of range: {0}")]
    Overflow(String),
    #[error("Invalid number: {0}")]
    Invalid(String),
}

/// A parsed operand value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    /// Numeric literal.
    Literal(u16),
    /// Symbol defined at or before the referencing line.
    Symbol(u16),
    /// Symbol defined after the referencing line, or not (yet) defined.
    /// Sized as if it needs a full 16-bit address.
    Forward(Option<u16>),
}

impl Value {
    pub fn get(self) -> Option<u16> {
        match self {
            Value::Literal(v) | Value::Symbol(v) => Some(v),
            Value::Forward(v) => v,
        }
    }

    /// Value for sizing in the first pass.
    pub fn or_placeholder(self) -> u16 {
        self.get().unwrap_or(0)
    }
}

/// Symbol lookup as seen from one source line.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    pub labels: &'a Labels,
    pub line: usize,
    /// Unknown labels are errors rather than placeholders.
    pub resolve: bool,
}

impl<'a> Scope<'a> {
    pub fn new(labels: &'a Labels, line: usize) -> Self {
        Scope {
            labels,
            line,
            resolve: false,
        }
    }

    pub fn final_pass(labels: &'a Labels, line: usize) -> Self {
        Scope {
            labels,
            line,
            resolve: true,
        }
    }

    fn lookup(&self, name: &str) -> Value {
        match self.labels.get(name) {
            Some(sym) if sym.line <= self.line => Value::Symbol(sym.address),
            Some(sym) => Value::Forward(Some(sym.address)),
            None => Value::Forward(None),
        }
    }
}

fn radix(text: &str) -> Option<(&str, u32)> {
    let upper = text.to_ascii_uppercase();
    if let Some(rest) = text.strip_prefix('$') {
        Some((rest, 16))
    } else if let Some(rest) = text.strip_prefix('%') {
        Some((rest, 2))
    } else if upper.starts_with("0X") {
        Some((&text[2..], 16))
    } else if upper.starts_with("0B") {
        Some((&text[2..], 2))
    } else {
        None
    }
}

fn digits(text: &str, digits: &str, base: u32) -> Result<u16, NumberError> {
    if digits.is_empty() {
        return Err(NumberError::Incomplete(text.to_string()));
    }
    if !digits.chars().all(|c| c.is_digit(base)) {
        return Err(NumberError::InvalidDigit {
            text: text.to_string(),
            base,
        });
    }
    u32::from_str_radix(digits, base)
        .ok()
        .and_then(|v| u16::try_from(v).ok())
        .ok_or_else(|| NumberError::Overflow(text.to_string()))
}

/// Parse `$hex`, `0xhex`, `%bin`, `0bbin`, decimal, or a label name.
pub fn parse_value(text: &str, scope: &Scope) -> Result<Value, NumberError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(NumberError::Empty);
    }
    if let Some((rest, base)) = radix(text) {
        return digits(text, rest, base).map(Value::Literal);
    }
    if text.starts_with('-') {
        return Err(NumberError::Negative(text.to_string()));
    }
    if text.starts_with(|c: char| c.is_ascii_digit()) {
        return digits(text, text, 10).map(Value::Literal);
    }
    if is_valid_label(text) {
        return Ok(scope.lookup(text));
    }
    Err(NumberError::Invalid(text.to_string()))
}

/// Like [`parse_value`], with unknown labels read as zero.
pub fn parse_number(text: &str, labels: &Labels) -> Result<u16, NumberError> {
    let scope = Scope::new(labels, usize::MAX);
    parse_value(text, &scope).map(Value::or_placeholder)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> Labels {
        let mut labels = Labels::new();
        labels.insert("START", 0x1000, 1).unwrap();
        labels.insert("later", 0x1234, 10).unwrap();
        labels
    }

    macro_rules! test_number {
        ($name:ident, $text:expr => $val:expr) => {
            #[test]
            fn $name() {
                assert_eq!(parse_number($text, &labels()), $val);
            }
        };
    }

    test_number!(hex_dollar, "$FF" => Ok(0xFF));
    test_number!(hex_lower, "$ff" => Ok(0xFF));
    test_number!(hex_0x, "0x1234" => Ok(0x1234));
    test_number!(hex_0x_upper, "0X1F" => Ok(0x1F));
    test_number!(bin_percent, "%1010" => Ok(10));
    test_number!(bin_0b, "0b11" => Ok(3));
    test_number!(decimal, "42" => Ok(42));
    test_number!(zero, "0" => Ok(0));
    test_number!(max, "65535" => Ok(0xFFFF));
    test_number!(symbol, "start" => Ok(0x1000));
    test_number!(unknown_symbol, "NOWHERE" => Ok(0));
    test_number!(empty, "  " => Err(NumberError::Empty));
    test_number!(prefix_only, "$" => Err(NumberError::Incomplete("$".into())));
    test_number!(bad_hex, "$GG" => Err(NumberError::InvalidDigit { text: "$GG".into(), base: 16 }));
    test_number!(bad_bin, "%102" => Err(NumberError::InvalidDigit { text: "%102".into(), base: 2 }));
    test_number!(bad_decimal, "12AB" => Err(NumberError::InvalidDigit { text: "12AB".into(), base: 10 }));
    test_number!(negative, "-5" => Err(NumberError::Negative("-5".into())));
    test_number!(overflow, "$10000" => Err(NumberError::Overflow("$10000".into())));
    test_number!(overflow_decimal, "70000" => Err(NumberError::Overflow("70000".into())));
    test_number!(garbage, "A+1" => Err(NumberError::Invalid("A+1".into())));

    #[test]
    fn forward_references() {
        let labels = labels();
        let scope = Scope::new(&labels, 5);
        assert_eq!(parse_value("START", &scope), Ok(Value::Symbol(0x1000)));
        assert_eq!(parse_value("LATER", &scope), Ok(Value::Forward(Some(0x1234))));
        assert_eq!(parse_value("NONE", &scope), Ok(Value::Forward(None)));
        assert_eq!(parse_value("$12", &scope), Ok(Value::Literal(0x12)));
    }
}
