use crate::error::Error;
use indexmap::IndexMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol {
    pub address: u16,
    /// 1-based line of the definition.
    pub line: usize,
}

/// Symbol table. Names are stored uppercase, in definition order.
#[derive(Debug, Clone, Default)]
pub struct Labels {
    labels: IndexMap<String, Symbol>,
}

impl Labels {
    pub fn new() -> Self {
        Labels {
            labels: IndexMap::new(),
        }
    }

    pub fn insert(&mut self, name: &str, address: u16, line: usize) -> Result<(), Error> {
        let key = name.to_uppercase();
        if let Some(prev) = self.labels.get(&key) {
            return Err(Error::DuplicateLabel {
                name: key,
                line: prev.line,
            });
        }
        self.labels.insert(key, Symbol { address, line });
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.labels.get(&name.to_uppercase())
    }

    pub fn get_val(&self, name: &str) -> Option<u16> {
        self.get(name).map(|s| s.address)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn to_map(&self) -> IndexMap<String, u16> {
        self.labels
            .iter()
            .map(|(k, s)| (k.clone(), s.address))
            .collect()
    }
}

/// Letter or underscore followed by letters, digits or underscores.
pub fn is_valid_label(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
