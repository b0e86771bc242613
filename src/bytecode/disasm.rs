use std::fmt::Write;

use crate::bytecode::{DecodeError, Op, ProgramBc, SymbolTable};

/// Decodes a whole instruction stream into `(byte offset, op)` pairs.
pub fn disassemble(code: &[u8]) -> Result<Vec<(usize, Op)>, DecodeError> {
    let mut ops = Vec::new();
    let mut at = 0;

    while at < code.len() {
        let (op, len) = Op::decode(code, at)?;
        ops.push((at, op));
        at += len;
    }

    Ok(ops)
}

/// Print disassembly of a bytecode program
pub fn print_bc(bc: &ProgramBc) -> Result<(), DecodeError> {
    print!("{}", format_bc(bc)?);
    Ok(())
}

/// Render a program as one line per instruction, with a banner.
pub fn format_bc(bc: &ProgramBc) -> Result<String, DecodeError> {
    let ops = disassemble(&bc.code)?;
    let mut out = String::new();

    // writing into a String cannot fail
    let _ = writeln!(out, "════════════════════════════════════════");
    let _ = writeln!(out, " program");
    let _ = writeln!(
        out,
        " {} instructions, {} bytes, {} variables",
        ops.len(),
        bc.code.len(),
        bc.symbols.len()
    );
    let _ = writeln!(out, "════════════════════════════════════════");
    disassemble_ops(&mut out, &ops, &bc.symbols);

    Ok(out)
}

fn disassemble_ops(out: &mut String, ops: &[(usize, Op)], symbols: &SymbolTable) {
    let jump_targets = collect_jump_targets(ops);

    for (at, op) in ops {
        let is_target = jump_targets.contains(&(*at as isize));
        if is_target {
            let _ = writeln!(out, "      ┌──────────────────────────────────");
        }

        let marker = if is_target { "► " } else { "  " };
        let _ = writeln!(out, "{:04} {}{}", at, marker, format_op(op, *at, symbols));
    }
}

fn collect_jump_targets(ops: &[(usize, Op)]) -> Vec<isize> {
    let mut targets = Vec::new();

    for (at, op) in ops {
        if let Some(target) = op.jump_target(*at) {
            if !targets.contains(&target) {
                targets.push(target);
            }
        }
    }

    targets
}

fn format_op(op: &Op, at: usize, symbols: &SymbolTable) -> String {
    let mnemonic = op.opcode().mnemonic();

    match *op {
        Op::Push(value) => format!("{:<14}{}", mnemonic, value),

        Op::Store(slot) | Op::Load(slot) => {
            let name = u32::try_from(slot).ok().and_then(|i| symbols.name(i));
            match name {
                Some(name) => format!("{:<14}{} ({})", mnemonic, slot, name),
                None => format!("{:<14}{}", mnemonic, slot),
            }
        }

        Op::Vector(count) => format!("{:<14}{}    ; ( x1 .. x{} -- vec )", mnemonic, count, count),

        Op::Jump(offset) | Op::JumpIfFalse(offset) => {
            let target = op.jump_target(at).unwrap_or_default();
            let direction = if offset < 0 { "↑" } else { "↓" };
            format!("{:<14}{:+} {} (→ {:04})", mnemonic, offset, direction, target)
        }

        Op::Dot => format!("{:<14}; ( vec vec -- n )", mnemonic),
        Op::Relu => format!("{:<14}; ( n -- max(0, n) )", mnemonic),
        Op::Rand => format!("{:<14}; ( -- n )", mnemonic),
        Op::Input => format!("{:<14}; ( -- n )", mnemonic),
        Op::Print => format!("{:<14}; ( value -- )", mnemonic),

        _ => mnemonic.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::compile::Compiler;
    use crate::frontend::lexer::tokenize;

    fn program(source: &str) -> ProgramBc {
        Compiler::new(tokenize(source).unwrap()).compile().unwrap()
    }

    #[test]
    fn test_disassemble_offsets() {
        let ops = disassemble(&program("x <- 1 print x").code).unwrap();
        let offsets: Vec<usize> = ops.iter().map(|(at, _)| *at).collect();
        assert_eq!(offsets, vec![0, 9, 14, 19, 20]);
        assert_eq!(ops[4].1, Op::Halt);
    }

    #[test]
    fn test_disassemble_rejects_garbage() {
        assert_eq!(
            disassemble(&[20, 99]),
            Err(DecodeError::UnknownOpcode { byte: 99, at: 1 })
        );
    }

    #[test]
    fn test_format_names_variables() {
        let text = format_bc(&program("speed <- 3")).unwrap();
        assert!(text.contains("STORE         0 (speed)"), "{}", text);
        assert!(text.contains("3 instructions, 15 bytes, 1 variables"), "{}", text);
    }

    #[test]
    fn test_format_without_symbols() {
        let bc = ProgramBc::from_parts(program("a <- 1").code, None).unwrap();
        let text = format_bc(&bc).unwrap();
        assert!(text.contains("STORE         0\n"), "{}", text);
    }

    #[test]
    fn test_format_marks_jump_targets() {
        let text = format_bc(&program("while x x <- x - 1 end")).unwrap();
        assert!(text.contains("0000 ► LOAD"), "{}", text);
        assert!(text.contains("JUMP_IF_FALSE +"), "{}", text);
        assert!(text.contains("↑ (→ 0000)"), "{}", text);
        assert_eq!(text.matches('┌').count(), 2);
    }
}
