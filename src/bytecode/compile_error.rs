use thiserror::Error;

use crate::frontend::{LexError, Token, TokenKind};

/// The closing construct the parser was waiting for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expected {
    RParen,
    RBracket,
    End,
    /// `<-` after the named assignment target.
    Arrow(String),
}

impl std::fmt::Display for Expected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expected::RParen => write!(f, "')'"),
            Expected::RBracket => write!(f, "']'"),
            Expected::End => write!(f, "'end'"),
            Expected::Arrow(name) => write!(f, "'<-' after identifier '{}'", name),
        }
    }
}

/// Why a token was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxReason {
    /// The token cannot start the production being parsed.
    Unexpected,
    /// A closing construct was required here.
    Expected(Expected),
    /// `while` opening a statement of an else block.
    WhileInElse,
    /// A numeric literal that does not fit an 8-byte float.
    InvalidNumber,
}

/// A grammar violation at one token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub reason: SyntaxReason,
    pub found: TokenKind,
    pub lexeme: String,
    pub offset: usize,
}

impl SyntaxError {
    fn at(reason: SyntaxReason, token: &Token) -> Self {
        SyntaxError {
            reason,
            found: token.kind,
            lexeme: token.lexeme.clone(),
            offset: token.offset,
        }
    }

    fn found_text(&self) -> String {
        match self.found {
            TokenKind::Eof => "EOF".to_string(),
            kind => format!("{} '{}'", kind, self.lexeme),
        }
    }
}

impl std::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.reason {
            SyntaxReason::Unexpected => {
                write!(f, "unexpected token {} at position {}", self.found_text(), self.offset)
            }
            SyntaxReason::Expected(what) => write!(
                f,
                "expected {} at position {}, found {}",
                what,
                self.offset,
                self.found_text()
            ),
            SyntaxReason::WhileInElse => write!(
                f,
                "unexpected 'while' inside else block at position {}",
                self.offset
            ),
            SyntaxReason::InvalidNumber => write!(
                f,
                "invalid number literal '{}' at position {}",
                self.lexeme, self.offset
            ),
        }
    }
}

impl std::error::Error for SyntaxError {}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    /// No lexical rule matched.
    #[error("lexical error: {0}")]
    Lex(#[from] LexError),

    /// The token stream does not follow the grammar.
    #[error("syntax error: {0}")]
    Syntax(SyntaxError),

    /// Code generator bug (shouldn't happen for any input)
    #[error("internal error: {0}")]
    Internal(String),
}

impl CompileError {
    /// `token` cannot start the production being parsed.
    pub fn unexpected(token: &Token) -> Self {
        CompileError::Syntax(SyntaxError::at(SyntaxReason::Unexpected, token))
    }

    /// A closing construct was required where `token` sits.
    pub fn expected(what: Expected, token: &Token) -> Self {
        CompileError::Syntax(SyntaxError::at(SyntaxReason::Expected(what), token))
    }

    pub fn while_in_else(token: &Token) -> Self {
        CompileError::Syntax(SyntaxError::at(SyntaxReason::WhileInElse, token))
    }

    pub fn invalid_number(token: &Token) -> Self {
        CompileError::Syntax(SyntaxError::at(SyntaxReason::InvalidNumber, token))
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        CompileError::Internal(msg.into())
    }

    /// Source offset of the offending character or token, if any.
    pub fn offset(&self) -> Option<usize> {
        match self {
            CompileError::Lex(e) => Some(e.offset),
            CompileError::Syntax(e) => Some(e.offset),
            CompileError::Internal(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_display() {
        let err = CompileError::unexpected(&Token::new(TokenKind::Number, "-5", 8));

        let msg = err.to_string();
        assert!(msg.starts_with("syntax error"));
        assert!(msg.contains("unexpected token NUMBER '-5'"));
        assert!(msg.contains("position 8"));
    }

    #[test]
    fn test_expected_closer_display() {
        let err = CompileError::expected(Expected::RParen, &Token::eof(12));

        let msg = err.to_string();
        assert!(msg.contains("expected ')'"));
        assert!(msg.contains("found EOF"));
        assert_eq!(err.offset(), Some(12));
    }

    #[test]
    fn test_expected_arrow_names_target() {
        let err = CompileError::expected(
            Expected::Arrow("x".to_string()),
            &Token::new(TokenKind::Number, "1", 2),
        );

        assert!(err.to_string().contains("'<-' after identifier 'x'"));
    }

    #[test]
    fn test_while_in_else_display() {
        let err = CompileError::while_in_else(&Token::new(TokenKind::While, "while", 20));

        let msg = err.to_string();
        assert!(msg.contains("'while' inside else block"));
        assert!(msg.contains("position 20"));
    }

    #[test]
    fn test_lex_error_converts() {
        let lex = LexError {
            ch: '@',
            offset: 3,
            context: "ab @".to_string(),
        };
        let err: CompileError = lex.into();

        assert!(matches!(err, CompileError::Lex(_)));
        assert!(err.to_string().contains("'@'"));
        assert_eq!(err.offset(), Some(3));
    }

    #[test]
    fn test_internal_error_has_no_offset() {
        let err = CompileError::internal("something went wrong");

        assert!(err.to_string().contains("internal"));
        assert!(err.to_string().contains("something went wrong"));
        assert_eq!(err.offset(), None);
    }

    #[test]
    fn test_error_implements_std_error() {
        let err = CompileError::internal("test");
        let _: &dyn std::error::Error = &err;
    }

    #[test]
    fn test_syntax_error_fields() {
        let token = Token::new(TokenKind::Else, "else", 4);
        match CompileError::unexpected(&token) {
            CompileError::Syntax(e) => {
                assert_eq!(e.found, TokenKind::Else);
                assert_eq!(e.lexeme, "else");
                assert_eq!(e.reason, SyntaxReason::Unexpected);
            }
            other => panic!("expected syntax error, got {:?}", other),
        }
    }
}
