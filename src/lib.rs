//! # Picolin compiler
//!
//! Compiles Picolin source text into the flat bytecode consumed by the
//! Picolin stack virtual machine.
//!
//! - `frontend` turns text into tokens (ordered first-match rules).
//! - `bytecode` holds the instruction set, the single-pass compiler that
//!   emits while it parses, the variable table and a disassembler.
//!
//! The output has no header: it is the instruction stream, terminated by
//! one HALT byte.

pub mod bytecode;
pub mod frontend;

pub use bytecode::{CompileError, Compiler, ProgramBc, SymbolTable};

/// Compiles source text into a finished, HALT-terminated instruction stream.
pub fn compile(source: &str) -> Result<Vec<u8>, CompileError> {
    compile_program(source).map(|program| program.code)
}

/// Like [`compile`], but also returns the variable table.
pub fn compile_program(source: &str) -> Result<ProgramBc, CompileError> {
    let tokens = frontend::tokenize(source)?;
    Compiler::new(tokens).compile()
}
