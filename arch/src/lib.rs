//! Instruction set description for the Motorola 6800 family, including the
//! 6801 and 68HC11 extensions.
//!
//! Both the assembler and the simulator read from the tables in this crate,
//! so an opcode is only ever written down once.

pub mod alu;
pub mod cc;
pub mod error;
pub mod image;
pub mod inst;
pub mod mode;
pub mod op;
pub mod reference;
pub mod reg;
pub mod table;

pub use cc::{Flag, Flags, Width};
pub use error::EncodeError;
pub use image::ObjectImage;
pub use inst::Instruction;
pub use mode::Mode;
pub use op::Mnemonic;
pub use reg::{Acc, Reg};
pub use table::{Encoding, OpKey, Opcode};
