//! Two-pass assembler for the 6800/6801/6811 family.

pub mod assembler;
pub mod code;
pub mod error;
pub mod label;
pub mod number;
pub mod object;
pub mod parser;
pub mod util;

pub use assembler::{assemble, Assembler, DEFAULT_ORIGIN};
pub use error::{Diagnostic, Error};
pub use object::{AssembledLine, Assembly, Mapping};
