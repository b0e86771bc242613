use std::fmt;

// =============================================================================
// OPCODE - one byte per instruction, numbered as the virtual machine expects
// =============================================================================

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Push = 0,
    Add = 1,
    Sub = 2,
    Mul = 3,
    Div = 4,
    Print = 5,
    Store = 6,
    Load = 7,
    Vector = 8,
    Dot = 9,
    Relu = 10,
    Gt = 11,
    Lt = 12,
    Eq = 13,
    JumpIfFalse = 14,
    Jump = 15,
    Rand = 16,
    Input = 17,
    SaveFile = 18,
    LoadFile = 19,
    Halt = 20,
}

impl Opcode {
    pub const ALL: [Opcode; 21] = [
        Opcode::Push,
        Opcode::Add,
        Opcode::Sub,
        Opcode::Mul,
        Opcode::Div,
        Opcode::Print,
        Opcode::Store,
        Opcode::Load,
        Opcode::Vector,
        Opcode::Dot,
        Opcode::Relu,
        Opcode::Gt,
        Opcode::Lt,
        Opcode::Eq,
        Opcode::JumpIfFalse,
        Opcode::Jump,
        Opcode::Rand,
        Opcode::Input,
        Opcode::SaveFile,
        Opcode::LoadFile,
        Opcode::Halt,
    ];

    pub fn from_byte(byte: u8) -> Option<Opcode> {
        Opcode::ALL.get(usize::from(byte)).copied()
    }

    pub fn byte(self) -> u8 {
        self as u8
    }

    /// Number of operand bytes following the opcode byte.
    pub fn operand_width(self) -> usize {
        match self {
            Opcode::Push => 8,
            Opcode::Store | Opcode::Load | Opcode::Vector | Opcode::JumpIfFalse | Opcode::Jump => 4,
            _ => 0,
        }
    }

    pub fn is_jump(self) -> bool {
        matches!(self, Opcode::Jump | Opcode::JumpIfFalse)
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Push => "PUSH",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::Print => "PRINT",
            Opcode::Store => "STORE",
            Opcode::Load => "LOAD",
            Opcode::Vector => "VECTOR",
            Opcode::Dot => "DOT",
            Opcode::Relu => "RELU",
            Opcode::Gt => "GT",
            Opcode::Lt => "LT",
            Opcode::Eq => "EQ",
            Opcode::JumpIfFalse => "JUMP_IF_FALSE",
            Opcode::Jump => "JUMP",
            Opcode::Rand => "RAND",
            Opcode::Input => "INPUT",
            Opcode::SaveFile => "SAVE_FILE",
            Opcode::LoadFile => "LOAD_FILE",
            Opcode::Halt => "HALT",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

// =============================================================================
// OP - a decoded instruction with its operand
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Op {
    // literals
    Push(f64),

    // arithmetic
    Add,
    Sub,
    Mul,
    Div,

    // variables (operand is the slot index)
    Store(i32),
    Load(i32),

    // vectors
    Vector(i32), // element count
    Dot,
    Relu,

    // comparison
    Gt,
    Lt,
    Eq,

    /// Pop the condition and jump if it is 0.0. The offset is relative to
    /// the byte just past the operand.
    JumpIfFalse(i32),

    /// Unconditional jump, same offset convention as `JumpIfFalse`.
    Jump(i32),

    // I/O
    Print,
    Rand,
    Input,
    SaveFile,
    LoadFile,

    Halt,
}

/// Reasons a byte stream cannot be decoded into instructions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("unknown opcode {byte} at byte {at}")]
    UnknownOpcode { byte: u8, at: usize },

    #[error("no instruction at byte {at}")]
    OutOfBounds { at: usize },

    #[error("truncated {opcode} operand at byte {at}")]
    Truncated { opcode: Opcode, at: usize },
}

impl Op {
    pub fn opcode(&self) -> Opcode {
        match self {
            Op::Push(_) => Opcode::Push,
            Op::Add => Opcode::Add,
            Op::Sub => Opcode::Sub,
            Op::Mul => Opcode::Mul,
            Op::Div => Opcode::Div,
            Op::Store(_) => Opcode::Store,
            Op::Load(_) => Opcode::Load,
            Op::Vector(_) => Opcode::Vector,
            Op::Dot => Opcode::Dot,
            Op::Relu => Opcode::Relu,
            Op::Gt => Opcode::Gt,
            Op::Lt => Opcode::Lt,
            Op::Eq => Opcode::Eq,
            Op::JumpIfFalse(_) => Opcode::JumpIfFalse,
            Op::Jump(_) => Opcode::Jump,
            Op::Print => Opcode::Print,
            Op::Rand => Opcode::Rand,
            Op::Input => Opcode::Input,
            Op::SaveFile => Opcode::SaveFile,
            Op::LoadFile => Opcode::LoadFile,
            Op::Halt => Opcode::Halt,
        }
    }

    /// Encoded size in bytes, opcode included.
    pub fn encoded_len(&self) -> usize {
        1 + self.opcode().operand_width()
    }

    /// Appends the little-endian encoding of this instruction.
    pub fn encode(&self, out: &mut Vec<u8>) {
        out.push(self.opcode().byte());
        match *self {
            Op::Push(value) => out.extend_from_slice(&value.to_le_bytes()),
            Op::Store(n) | Op::Load(n) | Op::Vector(n) | Op::JumpIfFalse(n) | Op::Jump(n) => {
                out.extend_from_slice(&n.to_le_bytes())
            }
            _ => {}
        }
    }

    /// Decodes the instruction starting at `at`. Returns it with its length.
    pub fn decode(code: &[u8], at: usize) -> Result<(Op, usize), DecodeError> {
        let byte = *code
            .get(at)
            .ok_or(DecodeError::OutOfBounds { at })?;
        let opcode = Opcode::from_byte(byte).ok_or(DecodeError::UnknownOpcode { byte, at })?;

        let width = opcode.operand_width();
        let operand = code
            .get(at + 1..at + 1 + width)
            .ok_or(DecodeError::Truncated { opcode, at })?;

        let int = || -> i32 {
            let mut buf = [0u8; 4];
            buf.copy_from_slice(operand);
            i32::from_le_bytes(buf)
        };

        let op = match opcode {
            Opcode::Push => {
                let mut buf = [0u8; 8];
                buf.copy_from_slice(operand);
                Op::Push(f64::from_le_bytes(buf))
            }
            Opcode::Add => Op::Add,
            Opcode::Sub => Op::Sub,
            Opcode::Mul => Op::Mul,
            Opcode::Div => Op::Div,
            Opcode::Print => Op::Print,
            Opcode::Store => Op::Store(int()),
            Opcode::Load => Op::Load(int()),
            Opcode::Vector => Op::Vector(int()),
            Opcode::Dot => Op::Dot,
            Opcode::Relu => Op::Relu,
            Opcode::Gt => Op::Gt,
            Opcode::Lt => Op::Lt,
            Opcode::Eq => Op::Eq,
            Opcode::JumpIfFalse => Op::JumpIfFalse(int()),
            Opcode::Jump => Op::Jump(int()),
            Opcode::Rand => Op::Rand,
            Opcode::Input => Op::Input,
            Opcode::SaveFile => Op::SaveFile,
            Opcode::LoadFile => Op::LoadFile,
            Opcode::Halt => Op::Halt,
        };

        Ok((op, 1 + width))
    }

    /// For jumps, the absolute byte position the jump lands on when the
    /// instruction itself starts at `at`.
    pub fn jump_target(&self, at: usize) -> Option<isize> {
        match *self {
            Op::Jump(offset) | Op::JumpIfFalse(offset) => {
                Some((at + self.encoded_len()) as isize + offset as isize)
            }
            _ => None,
        }
    }
}
