// Shared helpers for integration tests.

#![allow(dead_code)]

use picolin::bytecode::{Op, disasm::disassemble};

/// Upper bound on executed instructions, so a bad jump fails instead of hanging.
const STEP_LIMIT: usize = 100_000;

/// Value on the reference machine's stack. Vectors live in a side table and
/// are referenced by index, as in the reference machine.
pub type Value = f64;

/// Outcome of running a program.
#[derive(Debug, Default, PartialEq)]
pub struct Run {
    pub printed: Vec<Value>,
    pub globals: Vec<Value>,
}

/// Executes `code` with the stack semantics of the reference virtual machine.
///
/// `inputs` feeds INPUT; RAND always yields 0.5. SAVE_FILE and LOAD_FILE
/// are no-ops here.
pub fn execute(code: &[u8], inputs: &[Value]) -> Result<Run, String> {
    let ops = disassemble(code).map_err(|e| e.to_string())?;
    let index_of = |at: isize| -> Result<usize, String> {
        ops.iter()
            .position(|(p, _)| *p as isize == at)
            .ok_or_else(|| format!("jump to byte {} is not an instruction boundary", at))
    };

    let mut stack: Vec<Value> = Vec::new();
    let mut globals = vec![0.0; 256];
    let mut vectors: Vec<Vec<Value>> = Vec::new();
    let mut printed = Vec::new();
    let mut inputs = inputs.iter().copied();
    let mut pc = 0;

    let pop = |stack: &mut Vec<Value>| stack.pop().ok_or("stack underflow".to_string());

    for _ in 0..STEP_LIMIT {
        let (at, op) = *ops.get(pc).ok_or("ran off the end without HALT")?;
        pc += 1;

        match op {
            Op::Push(v) => stack.push(v),
            Op::Add | Op::Sub | Op::Mul | Op::Div | Op::Gt | Op::Lt | Op::Eq => {
                let b = pop(&mut stack)?;
                let a = pop(&mut stack)?;
                stack.push(match op {
                    Op::Add => a + b,
                    Op::Sub => a - b,
                    Op::Mul => a * b,
                    Op::Div => a / b,
                    Op::Gt => f64::from(u8::from(a > b)),
                    Op::Lt => f64::from(u8::from(a < b)),
                    _ => f64::from(u8::from((a - b).abs() < 1e-9)),
                });
            }
            Op::Print => printed.push(pop(&mut stack)?),
            Op::Store(slot) => globals[slot as usize] = pop(&mut stack)?,
            Op::Load(slot) => stack.push(globals[slot as usize]),
            Op::Vector(n) => {
                let split = stack
                    .len()
                    .checked_sub(n as usize)
                    .ok_or("not enough values for vector")?;
                vectors.push(stack.split_off(split));
                stack.push((vectors.len() - 1) as Value);
            }
            Op::Dot => {
                let b = &vectors[pop(&mut stack)? as usize];
                let a = &vectors[pop(&mut stack)? as usize];
                stack.push(a.iter().zip(b).map(|(x, y)| x * y).sum());
            }
            Op::Relu => {
                let v = pop(&mut stack)?;
                stack.push(v.max(0.0));
            }
            Op::JumpIfFalse(_) => {
                if pop(&mut stack)? == 0.0 {
                    pc = index_of(op.jump_target(at).unwrap_or_default())?;
                }
            }
            Op::Jump(_) => pc = index_of(op.jump_target(at).unwrap_or_default())?,
            Op::Rand => stack.push(0.5),
            Op::Input => stack.push(inputs.next().ok_or("input exhausted")?),
            Op::SaveFile | Op::LoadFile => {}
            Op::Halt => {
                globals.truncate(16);
                return Ok(Run { printed, globals });
            }
        }
    }

    Err("step limit exceeded".to_string())
}

/// Compiles and runs `source`, returning what it printed.
pub fn run_source(source: &str) -> Vec<Value> {
    let code = picolin::compile(source).expect("source should compile");
    execute(&code, &[]).expect("program should run").printed
}
