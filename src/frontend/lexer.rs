use thiserror::Error;

use crate::frontend::token::{Token, TokenKind};

/// Characters of source shown on each side of a lexical error.
const CONTEXT_RADIUS: usize = 10;

/// No lexical rule matched at `offset`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unexpected character '{ch}' at position {offset} (context: {context:?})")]
pub struct LexError {
    pub ch: char,
    pub offset: usize,
    pub context: String,
}

/// A matcher tried at the scan cursor. Each returns the length of the match
/// in characters, or `None`.
#[derive(Debug, Clone, Copy)]
enum Pattern {
    /// `-?[0-9]+\.?[0-9]*`
    Number,
    /// Exact character sequence.
    Literal(&'static str),
    /// Whole word: the characters on both sides must not be word characters.
    Keyword(&'static str),
    /// `[A-Za-z_][A-Za-z0-9_]*`
    Identifier,
    Whitespace,
}

/// Lexical rules in priority order. The first pattern that matches at the
/// cursor wins; `None` marks input that is skipped.
///
/// Order matters: numbers come before `-` so `3-5` lexes as two literals,
/// keywords come before identifiers, and `==` comes before `>` and `<`.
const RULES: &[(Pattern, Option<TokenKind>)] = &[
    (Pattern::Number, Some(TokenKind::Number)),
    (Pattern::Literal("<-"), Some(TokenKind::Arrow)),
    (Pattern::Keyword("print"), Some(TokenKind::Print)),
    (Pattern::Keyword("imprimir"), Some(TokenKind::Print)),
    (Pattern::Keyword("dot"), Some(TokenKind::Dot)),
    (Pattern::Keyword("relu"), Some(TokenKind::Relu)),
    (Pattern::Keyword("if"), Some(TokenKind::If)),
    (Pattern::Keyword("while"), Some(TokenKind::While)),
    (Pattern::Keyword("else"), Some(TokenKind::Else)),
    (Pattern::Keyword("end"), Some(TokenKind::End)),
    (Pattern::Keyword("rand"), Some(TokenKind::Rand)),
    (Pattern::Keyword("input"), Some(TokenKind::Input)),
    (Pattern::Keyword("save"), Some(TokenKind::Save)),
    (Pattern::Keyword("load"), Some(TokenKind::Load)),
    (Pattern::Identifier, Some(TokenKind::Identifier)),
    (Pattern::Literal("+"), Some(TokenKind::Plus)),
    (Pattern::Literal("-"), Some(TokenKind::Minus)),
    (Pattern::Literal("*"), Some(TokenKind::Multiply)),
    (Pattern::Literal("/"), Some(TokenKind::Divide)),
    (Pattern::Literal("=="), Some(TokenKind::Eq)),
    (Pattern::Literal(">"), Some(TokenKind::Gt)),
    (Pattern::Literal("<"), Some(TokenKind::Lt)),
    (Pattern::Literal("("), Some(TokenKind::LParen)),
    (Pattern::Literal(")"), Some(TokenKind::RParen)),
    (Pattern::Literal("["), Some(TokenKind::LBracket)),
    (Pattern::Literal("]"), Some(TokenKind::RBracket)),
    (Pattern::Literal(","), Some(TokenKind::Comma)),
    (Pattern::Whitespace, None),
];

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

impl Pattern {
    fn match_at(self, source: &[char], at: usize) -> Option<usize> {
        let rest = &source[at..];
        match self {
            Pattern::Number => {
                let mut len = 0;
                if rest.first() == Some(&'-') {
                    len += 1;
                }
                let int_start = len;
                while rest.get(len).is_some_and(|c| c.is_ascii_digit()) {
                    len += 1;
                }
                if len == int_start {
                    return None;
                }
                if rest.get(len) == Some(&'.') {
                    len += 1;
                    while rest.get(len).is_some_and(|c| c.is_ascii_digit()) {
                        len += 1;
                    }
                }
                Some(len)
            }
            Pattern::Literal(text) => {
                let len = text.chars().count();
                let hit = rest.len() >= len && text.chars().zip(rest).all(|(a, &b)| a == b);
                hit.then_some(len)
            }
            Pattern::Keyword(word) => {
                if at > 0 && is_word_char(source[at - 1]) {
                    return None;
                }
                let len = Pattern::Literal(word).match_at(source, at)?;
                match rest.get(len) {
                    Some(&next) if is_word_char(next) => None,
                    _ => Some(len),
                }
            }
            Pattern::Identifier => {
                let first = *rest.first()?;
                if !(first.is_ascii_alphabetic() || first == '_') {
                    return None;
                }
                let tail = rest[1..]
                    .iter()
                    .take_while(|c| c.is_ascii_alphanumeric() || **c == '_')
                    .count();
                Some(1 + tail)
            }
            Pattern::Whitespace => {
                let len = rest.iter().take_while(|c| c.is_whitespace()).count();
                (len > 0).then_some(len)
            }
        }
    }
}

/// Replaces everything from `#` to the end of its line with spaces.
///
/// Blanking instead of truncating keeps token offsets pointing into the
/// caller's text.
fn blank_comments(source: &str) -> Vec<char> {
    let mut in_comment = false;
    source
        .chars()
        .map(|ch| match ch {
            '\n' => {
                in_comment = false;
                ch
            }
            '#' => {
                in_comment = true;
                ' '
            }
            _ if in_comment => ' ',
            _ => ch,
        })
        .collect()
}

/// Ordered first-match scanner over comment-free source.
pub struct Lexer {
    source: Vec<char>,
    pos: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Lexer {
            source: blank_comments(source),
            pos: 0,
        }
    }

    fn error(&self) -> LexError {
        let start = self.pos.saturating_sub(CONTEXT_RADIUS);
        let end = (self.pos + CONTEXT_RADIUS).min(self.source.len());
        LexError {
            ch: self.source[self.pos],
            offset: self.pos,
            context: self.source[start..end].iter().collect(),
        }
    }

    /// Scans the whole source. The returned list always ends with exactly one
    /// `Eof` token positioned at the end of the source.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        while self.pos < self.source.len() {
            let (len, kind) = RULES
                .iter()
                .find_map(|&(pattern, kind)| {
                    pattern.match_at(&self.source, self.pos).map(|len| (len, kind))
                })
                .ok_or_else(|| self.error())?;

            if let Some(kind) = kind {
                let lexeme: String = self.source[self.pos..self.pos + len].iter().collect();
                tokens.push(Token::new(kind, lexeme, self.pos));
            }
            self.pos += len;
        }

        tokens.push(Token::eof(self.pos));
        Ok(tokens)
    }
}

/// Tokenizes `source` in one call.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).tokenize()
}
