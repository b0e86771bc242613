use serde::{Deserialize, Serialize};

use crate::bytecode::{Op, Opcode, SymbolTable, compile_error::CompileError};

/// Largest program the reference virtual machine loads.
pub const VM_MAX_PROGRAM_SIZE: usize = 4096;

/// Variable slots available in the reference virtual machine.
pub const VM_GLOBAL_SLOTS: usize = 256;

/// Width of every patchable operand.
const PATCH_WIDTH: usize = 4;

/// A compiled program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramBc {
    /// The HALT-terminated instruction stream, exactly as written to disk.
    pub code: Vec<u8>,

    /// Variable slots assigned while compiling `code`.
    pub symbols: SymbolTable,
}

impl ProgramBc {
    /// Limits of the reference virtual machine this program exceeds.
    /// The bytes stay valid; the warnings are advisory.
    pub fn limit_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.code.len() > VM_MAX_PROGRAM_SIZE {
            warnings.push(format!(
                "program is {} bytes, the virtual machine loads at most {}",
                self.code.len(),
                VM_MAX_PROGRAM_SIZE
            ));
        }

        if self.symbols.len() > VM_GLOBAL_SLOTS {
            warnings.push(format!(
                "program uses {} variables, the virtual machine has {} slots",
                self.symbols.len(),
                VM_GLOBAL_SLOTS
            ));
        }

        warnings
    }

    /// Encodes the variable table for a `.sym` sidecar.
    pub fn symbols_to_bytes(&self) -> postcard::Result<Vec<u8>> {
        postcard::to_allocvec(&self.symbols)
    }

    /// Rebuilds a program from raw code and an optional `.sym` sidecar.
    pub fn from_parts(code: Vec<u8>, sidecar: Option<&[u8]>) -> postcard::Result<Self> {
        let symbols = match sidecar {
            Some(bytes) => postcard::from_bytes(bytes)?,
            None => SymbolTable::new(),
        };
        Ok(ProgramBc { code, symbols })
    }
}

/// Handle to a 4-byte placeholder operand awaiting its value.
///
/// Sites are consumed by [`CodeBuffer::patch`], so none can be written twice.
#[must_use = "a patch site must be patched before the buffer is finished"]
#[derive(Debug, PartialEq, Eq)]
pub struct PatchSite {
    at: usize,
}

impl PatchSite {
    /// Position of the placeholder's first byte.
    pub fn position(&self) -> usize {
        self.at
    }

    /// Position just past the placeholder, where a jump's offset is measured from.
    pub fn end(&self) -> usize {
        self.at + PATCH_WIDTH
    }
}

/// Append-only instruction stream with backpatching.
#[derive(Debug, Default)]
pub struct CodeBuffer {
    bytes: Vec<u8>,
    outstanding: usize,
}

impl CodeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current length, i.e. where the next byte lands.
    pub fn position(&self) -> usize {
        self.bytes.len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn emit(&mut self, op: Op) {
        op.encode(&mut self.bytes);
    }

    /// Emits `opcode` followed by a zero placeholder operand.
    pub fn emit_jump(&mut self, opcode: Opcode) -> PatchSite {
        debug_assert!(opcode.is_jump(), "{} takes no offset", opcode);
        self.bytes.push(opcode.byte());
        let at = self.position();
        self.bytes.extend_from_slice(&0i32.to_le_bytes());
        self.outstanding += 1;
        PatchSite { at }
    }

    /// Overwrites the placeholder at `site` with `value`.
    pub fn patch(&mut self, site: PatchSite, value: i32) {
        self.bytes[site.at..site.end()].copy_from_slice(&value.to_le_bytes());
        self.outstanding -= 1;
    }

    /// Patches `site` with the offset from just past it to `target`.
    pub fn patch_to(&mut self, site: PatchSite, target: usize) -> Result<(), CompileError> {
        let offset = target as i64 - site.end() as i64;
        let offset = i32::try_from(offset)
            .map_err(|_| CompileError::internal(format!("jump offset {} out of range", offset)))?;
        self.patch(site, offset);
        Ok(())
    }

    /// Hands over the finished bytes. Fails if any placeholder was left
    /// unpatched.
    pub fn finish(self) -> Result<Vec<u8>, CompileError> {
        if self.outstanding != 0 {
            return Err(CompileError::internal(format!(
                "{} jump placeholder(s) left unpatched",
                self.outstanding
            )));
        }
        Ok(self.bytes)
    }
}
