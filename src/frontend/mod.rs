//! Source text to tokens.

pub mod lexer;
pub mod token;
pub mod token_dumper;

pub use lexer::{LexError, Lexer, tokenize};
pub use token::{Token, TokenKind};
