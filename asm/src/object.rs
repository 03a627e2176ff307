use crate::error::Diagnostic;
use indexmap::IndexMap;
use m68arch::ObjectImage;
use std::collections::BTreeMap;

/// Bytes emitted for one source line in the second pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledLine {
    pub line: usize,
    pub address: u16,
    pub bytes: Vec<u8>,
    pub source: String,
}

impl AssembledLine {
    pub fn hex(&self) -> String {
        let hex: Vec<String> = self.bytes.iter().map(|b| format!("{b:02X}")).collect();
        hex.join(" ")
    }
}

/// Line to address mapping as presented to tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    pub line: usize,
    pub address: String,
    pub object_code: String,
    pub assembly: String,
}

impl From<&AssembledLine> for Mapping {
    fn from(l: &AssembledLine) -> Self {
        Mapping {
            line: l.line,
            address: format!("${:04X}", l.address),
            object_code: l.hex(),
            assembly: l.source.clone(),
        }
    }
}

/// Result of one `assemble` call.
#[derive(Debug, Clone, Default)]
pub struct Assembly {
    pub success: bool,
    pub origin: u16,
    pub lines: Vec<AssembledLine>,
    pub errors: Vec<Diagnostic>,
    pub messages: Vec<String>,
    pub labels: IndexMap<String, u16>,
}

impl Assembly {
    /// Address to byte map. Empty unless the assembly succeeded.
    pub fn object_data(&self) -> BTreeMap<u16, u8> {
        if !self.success {
            return BTreeMap::new();
        }
        let mut data = BTreeMap::new();
        for line in &self.lines {
            for (i, byte) in line.bytes.iter().enumerate() {
                data.insert(line.address.wrapping_add(i as u16), *byte);
            }
        }
        data
    }

    pub fn image(&self) -> ObjectImage {
        ObjectImage::new(self.origin, self.object_data())
    }

    pub fn mappings(&self) -> Vec<Mapping> {
        self.lines.iter().map(Mapping::from).collect()
    }

    /// Errors rendered as `Line N: message`.
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.to_string()).collect()
    }

    /// Hex dump in emission order: a new row starts at every address
    /// discontinuity and after 16 bytes.
    pub fn object_code(&self) -> String {
        if !self.success || self.lines.is_empty() {
            return String::new();
        }
        let mut rows = vec![
            "Motorola 6800 Object Code".to_string(),
            "=".repeat(50),
            format!("Origin Address: ${:04X}", self.origin),
            String::new(),
        ];
        let mut row: Option<(u16, Vec<String>)> = None;
        let mut next = 0u16;
        for line in &self.lines {
            for (i, byte) in line.bytes.iter().enumerate() {
                let addr = line.address.wrapping_add(i as u16);
                let hex = format!("{byte:02X}");
                let extend = matches!(&row, Some((_, bytes)) if addr == next && bytes.len() < 16);
                if extend {
                    if let Some((_, bytes)) = row.as_mut() {
                        bytes.push(hex);
                    }
                } else if let Some((start, bytes)) = row.replace((addr, vec![hex])) {
                    rows.push(format!("{start:04X}: {}", bytes.join(" ")));
                }
                next = addr.wrapping_add(1);
            }
        }
        if let Some((start, hex)) = row {
            rows.push(format!("{start:04X}: {}", hex.join(" ")));
        }
        rows.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(line: usize, address: u16, bytes: &[u8]) -> AssembledLine {
        AssembledLine {
            line,
            address,
            bytes: bytes.to_vec(),
            source: String::new(),
        }
    }

    #[test]
    fn rows_break_on_gaps_and_width() {
        let asm = Assembly {
            success: true,
            origin: 0x1000,
            lines: vec![
                line(1, 0x1000, &[0x01; 10]),
                line(2, 0x100A, &[0x02; 10]),
                line(3, 0x2000, &[0x86, 0x55]),
            ],
            ..Default::default()
        };
        let text = asm.object_code();
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(rows[2], "Origin Address: $1000");
        assert_eq!(
            &rows[4..],
            &[
                "1000: 01 01 01 01 01 01 01 01 01 01 02 02 02 02 02 02",
                "1010: 02 02 02 02",
                "2000: 86 55",
            ]
        );
        assert_eq!(asm.object_data().len(), 22);
    }

    #[test]
    fn failed_assembly_has_no_output() {
        let asm = Assembly {
            success: false,
            lines: vec![line(1, 0x1000, &[0x01])],
            ..Default::default()
        };
        assert!(asm.object_code().is_empty());
        assert!(asm.object_data().is_empty());
    }

    #[test]
    fn mapping_format() {
        let mut l = line(4, 0x1002, &[0xB7, 0x20, 0x00]);
        l.source = "STA $2000".into();
        let m = Mapping::from(&l);
        assert_eq!(m.address, "$1002");
        assert_eq!(m.object_code, "B7 20 00");
        assert_eq!(m.assembly, "STA $2000");
    }
}
