use crate::{
    bytecode::{
        CodeBuffer, Op, Opcode, ProgramBc, SymbolTable,
        compile_error::{CompileError, Expected},
    },
    frontend::{Token, TokenKind},
};

/// Single-pass recursive-descent compiler.
///
/// Grammar checking and code generation happen together: every production
/// appends its bytes to the [`CodeBuffer`] as soon as it is recognised, and
/// forward jumps are backpatched once their targets are known. There is no
/// syntax tree.
///
/// Expression precedence, loosest first:
/// comparison (`>` `<` `==`), additive (`+` `-`), multiplicative
/// (`*` `/` `dot`), unary (`relu` `-`), primary.
pub struct Compiler {
    tokens: Vec<Token>,
    pos: usize,
    code: CodeBuffer,
    symbols: SymbolTable,
}

impl Compiler {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self::with_symbols(tokens, SymbolTable::new())
    }

    /// Compiles against a caller-provided table; slots already in it keep
    /// their indices.
    pub fn with_symbols(mut tokens: Vec<Token>, symbols: SymbolTable) -> Self {
        // Guarantee a trailing EOF so lookahead never runs off the end.
        if !tokens.last().is_some_and(|t| t.is(TokenKind::Eof)) {
            let end = tokens
                .last()
                .map(|t| t.offset + t.lexeme.chars().count())
                .unwrap_or(0);
            tokens.push(Token::eof(end));
        }

        Compiler {
            tokens,
            pos: 0,
            code: CodeBuffer::new(),
            symbols,
        }
    }

    /// Parses statements until EOF and terminates the stream with HALT.
    pub fn compile(mut self) -> Result<ProgramBc, CompileError> {
        while !self.check(TokenKind::Eof) {
            self.statement()?;
        }
        self.code.emit(Op::Halt);

        Ok(ProgramBc {
            code: self.code.finish()?,
            symbols: self.symbols,
        })
    }

    // -------------------------------------------------------------------------
    // Token cursor
    // -------------------------------------------------------------------------

    fn peek(&self) -> &Token {
        // The last token is EOF and is never consumed past.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().is(kind)
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !token.is(TokenKind::Eof) {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, kind: TokenKind, what: Expected) -> Result<Token, CompileError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(CompileError::expected(what, self.peek()))
        }
    }

    fn slot(&mut self, name: &str) -> Result<i32, CompileError> {
        let index = self.symbols.resolve(name);
        i32::try_from(index)
            .map_err(|_| CompileError::internal(format!("variable index {} out of range", index)))
    }

    // -------------------------------------------------------------------------
    // Statements
    // -------------------------------------------------------------------------

    fn statement(&mut self) -> Result<(), CompileError> {
        match self.peek().kind {
            TokenKind::While => self.while_statement(),
            TokenKind::If => self.if_statement(),
            TokenKind::Save => {
                self.advance();
                self.code.emit(Op::SaveFile);
                Ok(())
            }
            TokenKind::Load => {
                self.advance();
                self.code.emit(Op::LoadFile);
                Ok(())
            }
            TokenKind::Print => {
                self.advance();
                self.expression()?;
                self.code.emit(Op::Print);
                Ok(())
            }
            TokenKind::Identifier => self.assignment(),
            _ => Err(CompileError::unexpected(self.peek())),
        }
    }

    /// `name <- expr`
    fn assignment(&mut self) -> Result<(), CompileError> {
        let target = self.advance();
        let slot = self.slot(&target.lexeme)?;

        self.expect(TokenKind::Arrow, Expected::Arrow(target.lexeme))?;
        self.expression()?;
        self.code.emit(Op::Store(slot));
        Ok(())
    }

    /// ```text
    /// start: <cond>
    ///        JUMP_IF_FALSE exit
    ///        <body>
    ///        JUMP start
    /// exit:
    /// ```
    fn while_statement(&mut self) -> Result<(), CompileError> {
        self.advance(); // consume 'while'

        let loop_start = self.code.position();
        self.expression()?;
        let exit = self.code.emit_jump(Opcode::JumpIfFalse);

        while !self.check(TokenKind::End) {
            if self.check(TokenKind::Eof) {
                return Err(CompileError::expected(Expected::End, self.peek()));
            }
            self.statement()?;
        }

        let back = self.code.emit_jump(Opcode::Jump);
        self.code.patch_to(back, loop_start)?;
        let after_loop = self.code.position();
        self.code.patch_to(exit, after_loop)?;

        self.expect(TokenKind::End, Expected::End)?;
        Ok(())
    }

    /// ```text
    ///        <cond>
    ///        JUMP_IF_FALSE else      (or end, without an else block)
    ///        <then>
    ///        JUMP end                (only with an else block)
    /// else:  <else>
    /// end:
    /// ```
    fn if_statement(&mut self) -> Result<(), CompileError> {
        self.advance(); // consume 'if'

        self.expression()?;
        let skip_then = self.code.emit_jump(Opcode::JumpIfFalse);

        while !matches!(
            self.peek().kind,
            TokenKind::Else | TokenKind::End | TokenKind::Eof
        ) {
            self.statement()?;
        }

        if self.check(TokenKind::Else) {
            let skip_else = self.code.emit_jump(Opcode::Jump);
            let else_start = self.code.position();
            self.code.patch_to(skip_then, else_start)?;

            self.advance(); // consume 'else'

            while !self.check(TokenKind::End) {
                match self.peek().kind {
                    TokenKind::Eof => {
                        return Err(CompileError::expected(Expected::End, self.peek()));
                    }
                    // Loops are not accepted directly inside an else block.
                    TokenKind::While => return Err(CompileError::while_in_else(self.peek())),
                    _ => self.statement()?,
                }
            }

            let end = self.code.position();
            self.code.patch_to(skip_else, end)?;
        } else {
            let end = self.code.position();
            self.code.patch_to(skip_then, end)?;
        }

        self.expect(TokenKind::End, Expected::End)?;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Expressions
    // -------------------------------------------------------------------------

    fn expression(&mut self) -> Result<(), CompileError> {
        self.comparison()
    }

    fn comparison(&mut self) -> Result<(), CompileError> {
        self.additive()?;

        loop {
            let op = match self.peek().kind {
                TokenKind::Gt => Op::Gt,
                TokenKind::Lt => Op::Lt,
                TokenKind::Eq => Op::Eq,
                _ => return Ok(()),
            };
            self.advance();
            self.additive()?;
            self.code.emit(op);
        }
    }

    fn additive(&mut self) -> Result<(), CompileError> {
        self.multiplicative()?;

        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => Op::Add,
                TokenKind::Minus => Op::Sub,
                _ => return Ok(()),
            };
            self.advance();
            self.multiplicative()?;
            self.code.emit(op);
        }
    }

    fn multiplicative(&mut self) -> Result<(), CompileError> {
        self.unary()?;

        loop {
            let op = match self.peek().kind {
                TokenKind::Multiply => Op::Mul,
                TokenKind::Divide => Op::Div,
                TokenKind::Dot => Op::Dot,
                _ => return Ok(()),
            };
            self.advance();
            self.unary()?;
            self.code.emit(op);
        }
    }

    /// Prefix operators take a primary operand, so they do not stack.
    fn unary(&mut self) -> Result<(), CompileError> {
        match self.peek().kind {
            TokenKind::Relu => {
                self.advance();
                self.primary()?;
                self.code.emit(Op::Relu);
            }
            TokenKind::Minus => {
                self.advance();
                self.primary()?;
                // Emitted as `operand 0 SUB`, which the reference machine
                // evaluates as `operand - 0`. Kept byte-compatible.
                self.code.emit(Op::Push(0.0));
                self.code.emit(Op::Sub);
            }
            _ => self.primary()?,
        }
        Ok(())
    }

    fn primary(&mut self) -> Result<(), CompileError> {
        match self.peek().kind {
            TokenKind::Number => {
                let token = self.advance();
                let value: f64 = token
                    .lexeme
                    .parse()
                    .map_err(|_| CompileError::invalid_number(&token))?;
                self.code.emit(Op::Push(value));
            }
            TokenKind::Rand => {
                self.advance();
                self.code.emit(Op::Rand);
            }
            TokenKind::Input => {
                self.advance();
                self.code.emit(Op::Input);
            }
            TokenKind::Identifier => {
                let token = self.advance();
                let slot = self.slot(&token.lexeme)?;
                self.code.emit(Op::Load(slot));
            }
            TokenKind::LParen => {
                self.advance();
                self.expression()?;
                self.expect(TokenKind::RParen, Expected::RParen)?;
            }
            TokenKind::LBracket => self.vector()?,
            _ => return Err(CompileError::unexpected(self.peek())),
        }
        Ok(())
    }

    /// `[ e1, e2, ... ]`: element code in order, then VECTOR with the count.
    fn vector(&mut self) -> Result<(), CompileError> {
        self.advance(); // consume '['

        let mut count: usize = 0;
        if !self.check(TokenKind::RBracket) {
            self.expression()?;
            count += 1;
            while self.check(TokenKind::Comma) {
                self.advance();
                self.expression()?;
                count += 1;
            }
        }
        self.expect(TokenKind::RBracket, Expected::RBracket)?;

        let count = i32::try_from(count)
            .map_err(|_| CompileError::internal(format!("vector of {} elements", count)))?;
        self.code.emit(Op::Vector(count));
        Ok(())
    }
}

/// Compiles a token stream into a HALT-terminated instruction stream.
pub fn compile(tokens: Vec<Token>) -> Result<Vec<u8>, CompileError> {
    Compiler::new(tokens).compile().map(|program| program.code)
}
