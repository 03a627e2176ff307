use m68arch::Instruction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;

use super::Hook;
use crate::error::Error;
use crate::model::{CpuState, INITIAL_SP};

/// Register and memory dumps at configured program counters.
#[derive(Debug, Default)]
pub struct Dump {
    file: Option<String>,
    all: bool,
    list: List,
}

/// PC → what to print when execution reaches it.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct List(pub HashMap<u16, Config>);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "yes")]
    pub registers: bool,
    #[serde(default)]
    pub stack: bool,
    #[serde(default)]
    pub memory: Vec<u16>,
}

fn yes() -> bool {
    true
}

impl Dump {
    pub fn arg(file: Option<String>, all: bool) -> Result<Self, Error> {
        let list = match &file {
            Some(path) => {
                let reader = File::open(path).map_err(|source| Error::Open {
                    path: path.clone(),
                    source,
                })?;
                serde_yaml::from_reader(BufReader::new(reader)).map_err(|source| Error::Yaml {
                    path: path.clone(),
                    source,
                })?
            }
            None => List::default(),
        };
        Ok(Dump { file, all, list })
    }

    fn get(&self, pc: u16) -> Option<&Config> {
        self.list.0.get(&pc)
    }
}

impl Hook for Dump {
    fn init(&mut self, state: CpuState) -> CpuState {
        if self.all {
            println!(" * Dump all");
        }
        if let Some(fname) = &self.file {
            println!(" * Dump[{}] {:?}", self.list.0.len(), fname);
        }
        state
    }

    fn exec(&mut self, _time: u64, addr: u16, _inst: &Instruction, cpu: CpuState) -> CpuState {
        if let Some(cfg) = self.get(addr) {
            println!("{}", dump_text(addr, cfg, &cpu));
        } else if self.all {
            println!("{}", registers_text(&cpu));
        }
        cpu
    }
}

const RULE: &str = " +------------+------------+------------+---------+";

fn registers_text(cpu: &CpuState) -> String {
    [
        RULE.to_string(),
        format!(
            " |    A: {:02X}   |    B: {:02X}   |   CC: {:02X}   |         |",
            cpu.a,
            cpu.b,
            cpu.cc()
        ),
        format!(
            " |  X: {:04X}   |  Y: {:04X}   | SP: {:04X}   | PC:{:04X} |",
            cpu.x, cpu.y, cpu.sp, cpu.pc
        ),
        RULE.to_string(),
    ]
    .join("\n")
}

/// Text printed when execution reaches a configured PC.
pub fn dump_text(addr: u16, cfg: &Config, cpu: &CpuState) -> String {
    let mut lines = vec![format!(" Dump at ${addr:04X}")];
    if cfg.registers {
        lines.push(registers_text(cpu));
    }
    if cfg.stack {
        // Pushed bytes live above SP, up to the reset value.
        let mut sp = cpu.sp.wrapping_add(1);
        while sp <= INITIAL_SP && sp > cpu.sp {
            lines.push(format!(" | stack {:04X} : {:02X}", sp, cpu.get(sp)));
            sp = sp.wrapping_add(1);
        }
    }
    for m in &cfg.memory {
        lines.push(format!(" | mem   {:04X} : {:02X}", m, cpu.get(*m)));
    }
    lines.join("\n")
}
