use crate::label::is_valid_label;
use m68arch::{reg::Acc, table, Mnemonic};

// ----------------------------------------------------------------------------
// Statement

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    /// `ORG addr` / `.ORG addr`
    Org(Option<String>),
    /// `END` / `.END`
    End,
    /// `.BYTE value`
    Byte(Option<String>),
    /// Mnemonic with whitespace separated operand tokens. Aliases such as
    /// `LDAA` arrive here as their base mnemonic with the register first.
    Inst {
        mnemonic: Mnemonic,
        operands: Vec<String>,
    },
    Unknown(String),
}

fn directive(word: &str) -> Option<&'static str> {
    match word.to_uppercase().as_str() {
        "ORG" | ".ORG" => Some("ORG"),
        "END" | ".END" => Some("END"),
        ".BYTE" => Some(".BYTE"),
        _ => None,
    }
}

/// Mnemonic, alias or directive.
pub fn is_keyword(word: &str) -> bool {
    Mnemonic::parse(word).is_ok() || table::is_alias(word) || directive(word).is_some()
}

impl Stmt {
    fn parse(words: &[&str]) -> Option<Stmt> {
        let (head, args) = words.split_first()?;
        let rest = || args.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        if let Some(d) = directive(head) {
            return Some(match d {
                "ORG" => Stmt::Org(args.first().map(|s| s.to_string())),
                "END" => Stmt::End,
                _ => Stmt::Byte(args.first().map(|s| s.to_string())),
            });
        }
        if let Ok(mnemonic) = Mnemonic::parse(head) {
            return Some(Stmt::Inst {
                mnemonic,
                operands: rest(),
            });
        }
        if let Some((mnemonic, acc)) = table::resolve_alias(head) {
            let mut operands = vec![acc.to_string()];
            operands.extend(rest());
            return Some(Stmt::Inst { mnemonic, operands });
        }
        Some(Stmt::Unknown(head.to_uppercase()))
    }
}

// ----------------------------------------------------------------------------
// Line

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// 1-based line number.
    pub number: usize,
    /// Source text without the comment, trimmed.
    pub source: String,
    pub label: Option<String>,
    pub stmt: Option<Stmt>,
}

impl Line {
    pub fn parse(number: usize, raw: &str) -> Line {
        let code = match raw.find(';') {
            Some(i) => &raw[..i],
            None => raw,
        };
        let at_column0 = !code.starts_with(char::is_whitespace);
        let (label, body) = split_label(code.trim(), at_column0);
        let words: Vec<&str> = body.split_whitespace().collect();
        Line {
            number,
            source: code.trim().to_string(),
            label: label.map(|l| l.to_uppercase()),
            stmt: Stmt::parse(&words),
        }
    }
}

/// Separate a leading label from the statement.
///
/// `NAME:` is always a label. Without a colon, an identifier is a label when
/// a keyword follows it, or when it stands alone starting in column 0.
fn split_label(code: &str, at_column0: bool) -> (Option<&str>, &str) {
    if let Some((head, tail)) = code.split_once(':') {
        let head = head.trim();
        if is_valid_label(head) && !is_keyword(head) {
            return (Some(head), tail.trim());
        }
    }
    let mut words = code.split_whitespace();
    let (first, second) = (words.next(), words.next());
    match (first, second) {
        (Some(f), Some(s)) if is_valid_label(f) && !is_keyword(f) && is_keyword(s) => {
            (Some(f), code[f.len()..].trim())
        }
        (Some(f), None) if at_column0 && is_valid_label(f) && !is_keyword(f) => (Some(f), ""),
        _ => (None, code),
    }
}

/// Split a register prefix (`A` or `B`) from the operand tokens. A lone
/// register token is left in place as an inherent operand.
pub fn split_register(operands: &[String]) -> (Option<Acc>, &[String]) {
    match operands.split_first() {
        Some((first, rest)) if !rest.is_empty() => match Acc::parse(first) {
            Ok(acc) => (Some(acc), rest),
            Err(_) => (None, operands),
        },
        _ => (None, operands),
    }
}

/// Split bit-manipulation operands on commas, keeping `,X` with its offset.
pub fn split_bit_operands(text: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for piece in text.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match out.last_mut() {
            Some(prev) if piece.eq_ignore_ascii_case("X") && !prev.contains(',') => {
                prev.push_str(",X")
            }
            _ => out.push(piece.to_string()),
        }
    }
    out
}
