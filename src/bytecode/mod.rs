pub mod compile;
pub mod compile_error;
pub mod disasm;
pub mod ir;
pub mod op;
pub mod symbol;

pub use compile::{Compiler, compile};
pub use compile_error::CompileError;
pub use ir::{CodeBuffer, PatchSite, ProgramBc};
pub use op::{DecodeError, Op, Opcode};
pub use symbol::SymbolTable;
