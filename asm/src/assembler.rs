use crate::{
    code::Code,
    error::{Diagnostic, Error},
    label::Labels,
    number::{parse_value, Scope, Value},
    object::{AssembledLine, Assembly},
    parser::{Line, Stmt},
};

/// Load address used until the first `ORG`.
pub const DEFAULT_ORIGIN: u16 = 0x1000;

/// Two-pass assembler. Each call to [`Assembler::assemble`] starts from a
/// clean state.
#[derive(Debug, Default)]
pub struct Assembler {
    labels: Labels,
    origin: Option<u16>,
    lines: Vec<AssembledLine>,
    errors: Vec<Diagnostic>,
    messages: Vec<String>,
}

impl Assembler {
    pub fn new() -> Self {
        Assembler::default()
    }

    pub fn assemble(&mut self, source: &str) -> Assembly {
        *self = Assembler::new();
        let lines: Vec<(Line, &str)> = source
            .lines()
            .enumerate()
            .map(|(idx, raw)| (Line::parse(idx + 1, raw), raw))
            .collect();

        self.first_pass(&lines);
        if self.errors.is_empty() {
            self.second_pass(&lines);
        }

        Assembly {
            success: self.errors.is_empty(),
            origin: self.origin.unwrap_or(DEFAULT_ORIGIN),
            lines: std::mem::take(&mut self.lines),
            errors: std::mem::take(&mut self.errors),
            messages: std::mem::take(&mut self.messages),
            labels: self.labels.to_map(),
        }
    }

    fn error(&mut self, line: usize, error: Error) {
        self.errors.push(Diagnostic { line, error });
    }

    /// `ORG` operand: a literal or an already defined label.
    fn org(&self, arg: &Option<String>, line: usize) -> Result<u16, Error> {
        let text = arg.as_deref().ok_or_else(|| Error::MissingOperand("ORG".into()))?;
        match parse_value(text, &Scope::new(&self.labels, line)) {
            Ok(Value::Literal(v)) | Ok(Value::Symbol(v)) => Ok(v),
            _ => Err(Error::InvalidOrg(text.to_string())),
        }
    }

    /// Bind labels and size every line.
    fn first_pass(&mut self, lines: &[(Line, &str)]) {
        let mut addr = DEFAULT_ORIGIN;
        for (line, _) in lines {
            let n = line.number;
            if let Some(label) = &line.label {
                if let Err(e) = self.labels.insert(label, addr, n) {
                    self.error(n, e);
                }
            }
            match &line.stmt {
                None | Some(Stmt::Unknown(_)) => {}
                Some(Stmt::End) => break,
                Some(Stmt::Org(arg)) => match self.org(arg, n) {
                    Ok(v) => {
                        addr = v;
                        self.origin.get_or_insert(v);
                        self.messages
                            .push(format!("Line {n}: Origin set to ${v:04X}"));
                    }
                    Err(e) => self.error(n, e),
                },
                Some(Stmt::Byte(_)) => addr = addr.wrapping_add(1),
                Some(Stmt::Inst { mnemonic, operands }) => {
                    // Encoding errors surface in the second pass.
                    let scope = Scope::new(&self.labels, n);
                    if let Ok(code) = Code::prepare(*mnemonic, operands, &scope) {
                        addr = addr.wrapping_add(code.size() as u16);
                    }
                }
            }
        }
    }

    /// Encode every line against the complete symbol table.
    fn second_pass(&mut self, lines: &[(Line, &str)]) {
        let mut addr = DEFAULT_ORIGIN;
        for (line, raw) in lines {
            let n = line.number;
            let bytes = match &line.stmt {
                None => continue,
                Some(Stmt::End) => break,
                Some(Stmt::Org(arg)) => {
                    if let Ok(v) = self.org(arg, n) {
                        addr = v;
                    }
                    continue;
                }
                Some(Stmt::Unknown(name)) => Err(Error::Encode(
                    m68arch::EncodeError::UnknownInstruction(name.clone()),
                )),
                Some(Stmt::Byte(arg)) => self.byte(arg, n),
                Some(Stmt::Inst { mnemonic, operands }) => {
                    let scope = Scope::final_pass(&self.labels, n);
                    Code::prepare(*mnemonic, operands, &scope).and_then(|code| code.emit(addr))
                }
            };
            match bytes {
                Ok(bytes) => {
                    let len = bytes.len() as u16;
                    self.lines.push(AssembledLine {
                        line: n,
                        address: addr,
                        bytes,
                        source: raw.trim().to_string(),
                    });
                    addr = addr.wrapping_add(len);
                }
                Err(e) => self.error(n, e),
            }
        }
    }

    fn byte(&self, arg: &Option<String>, line: usize) -> Result<Vec<u8>, Error> {
        let text = arg.as_deref().ok_or_else(|| Error::MissingOperand(".BYTE".into()))?;
        let text = text.strip_prefix('#').unwrap_or(text);
        let value = match parse_value(text, &Scope::final_pass(&self.labels, line))? {
            Value::Forward(None) => return Err(Error::UndefinedLabel(text.to_uppercase())),
            v => v.or_placeholder(),
        };
        u8::try_from(value)
            .map(|b| vec![b])
            .map_err(|_| Error::ByteOutOfRange(value))
    }
}

/// Assemble `source` with a fresh [`Assembler`].
pub fn assemble(source: &str) -> Assembly {
    Assembler::new().assemble(source)
}
