/// Lexical category of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Literals and names
    Number,
    Identifier,

    // Assignment
    Arrow, // <-

    // Arithmetic
    Plus,
    Minus,
    Multiply,
    Divide,

    // Comparison
    Gt,
    Lt,
    Eq, // ==

    // Delimiters
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,

    // Keywords
    Print, // print / imprimir
    Dot,
    Relu,
    If,
    While,
    Else,
    End,
    Rand,
    Input,
    Save,
    Load,

    // Special
    Eof,
}

impl TokenKind {
    /// Upper-case tag used in diagnostics and token dumps.
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Number => "NUMBER",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::Arrow => "ARROW",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Multiply => "MULTIPLY",
            TokenKind::Divide => "DIVIDE",
            TokenKind::Gt => "GT",
            TokenKind::Lt => "LT",
            TokenKind::Eq => "EQ",
            TokenKind::LParen => "LPAREN",
            TokenKind::RParen => "RPAREN",
            TokenKind::LBracket => "LBRACKET",
            TokenKind::RBracket => "RBRACKET",
            TokenKind::Comma => "COMMA",
            TokenKind::Print => "PRINT",
            TokenKind::Dot => "DOT",
            TokenKind::Relu => "RELU",
            TokenKind::If => "IF",
            TokenKind::While => "WHILE",
            TokenKind::Else => "ELSE",
            TokenKind::End => "END",
            TokenKind::Rand => "RAND",
            TokenKind::Input => "INPUT",
            TokenKind::Save => "SAVE",
            TokenKind::Load => "LOAD",
            TokenKind::Eof => "EOF",
        }
    }

    /// Returns true for the reserved words of the language.
    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::Print
                | TokenKind::Dot
                | TokenKind::Relu
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Else
                | TokenKind::End
                | TokenKind::Rand
                | TokenKind::Input
                | TokenKind::Save
                | TokenKind::Load
        )
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A lexed token. `offset` is the character offset of the first character
/// of `lexeme` in the source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub offset: usize,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, offset: usize) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
            offset,
        }
    }

    pub fn eof(offset: usize) -> Self {
        Token::new(TokenKind::Eof, "", offset)
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TokenKind::Eof => write!(f, "EOF"),
            kind => write!(f, "{} '{}'", kind, self.lexeme),
        }
    }
}
