use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Assembled bytes keyed by address, as handed from the assembler to the
/// simulator and stored in object files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectImage {
    pub origin: u16,
    pub data: BTreeMap<u16, u8>,
}

impl ObjectImage {
    pub fn new(origin: u16, data: BTreeMap<u16, u8>) -> Self {
        ObjectImage { origin, data }
    }

    /// Lowest programmed address.
    pub fn start(&self) -> Option<u16> {
        self.data.keys().next().copied()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Maximal runs of consecutive addresses.
    pub fn runs(&self) -> Vec<(u16, Vec<u8>)> {
        let mut runs: Vec<(u16, Vec<u8>)> = Vec::new();
        for (&addr, &byte) in &self.data {
            match runs.last_mut() {
                Some((start, bytes)) if *start as usize + bytes.len() == addr as usize => {
                    bytes.push(byte)
                }
                _ => runs.push((addr, vec![byte])),
            }
        }
        runs
    }
}
