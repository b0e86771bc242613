use std::fmt::Write;

use crate::frontend::token::{Token, TokenKind};

pub struct TokenDumper {
    pub color: bool,
    pub show_debug_repr: bool, // if false, prints only the lexeme for most tokens
}

impl Default for TokenDumper {
    fn default() -> Self {
        Self {
            color: true,
            show_debug_repr: true,
        }
    }
}

impl TokenDumper {
    // ANSI colors
    const RESET: &'static str = "\x1b[0m";
    const DIM: &'static str = "\x1b[2m";
    const YEL: &'static str = "\x1b[33m";
    const CYN: &'static str = "\x1b[36m";
    const MAG: &'static str = "\x1b[35m";
    const BLU: &'static str = "\x1b[34m";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn no_color(mut self) -> Self {
        self.color = false;
        self
    }

    pub fn pretty(mut self) -> Self {
        self.show_debug_repr = false;
        self
    }

    pub fn dump(&self, tokens: &[Token]) {
        print!("{}", self.render(tokens));
    }

    pub fn render(&self, tokens: &[Token]) -> String {
        let mut out = String::new();
        for t in tokens {
            self.render_one(&mut out, t);
        }
        out
    }

    fn render_one(&self, out: &mut String, t: &Token) {
        let category = self.category(t.kind);
        let colr = if self.color { self.color(t.kind) } else { "" };
        let reset = if self.color { Self::RESET } else { "" };

        // writing into a String cannot fail
        let _ = if self.show_debug_repr {
            writeln!(
                out,
                "[{:04}] {}{:<8} {:<10} {:?}{}",
                t.offset,
                colr,
                category,
                t.kind.name(),
                t.lexeme,
                reset
            )
        } else {
            match t.kind {
                TokenKind::Eof => writeln!(out, "[{:04}] {}{:<8} EOF{}", t.offset, colr, category, reset),
                _ => writeln!(
                    out,
                    "[{:04}] {}{:<8} {}{}",
                    t.offset, colr, category, t.lexeme, reset
                ),
            }
        };
    }

    fn category(&self, kind: TokenKind) -> &'static str {
        use TokenKind::*;
        match kind {
            Eof => "EOF",
            Number => "NUM",
            Identifier => "IDENT",
            Arrow => "ASSIGN",
            LParen | RParen | LBracket | RBracket | Comma => "DELIM",
            Plus | Minus | Multiply | Divide => "OP",
            Gt | Lt | Eq => "CMP",
            Print | Dot | Relu | If | While | Else | End | Rand | Input | Save | Load => "KEYWORD",
        }
    }

    fn color(&self, kind: TokenKind) -> &'static str {
        use TokenKind::*;
        match kind {
            Eof => Self::DIM,
            Number => Self::CYN,
            Identifier => Self::YEL,
            Plus | Minus | Multiply | Divide | Gt | Lt | Eq | Arrow => Self::MAG,
            k if k.is_keyword() => Self::BLU,
            _ => Self::RESET,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::lexer::tokenize;

    #[test]
    fn test_plain_render() {
        let tokens = tokenize("x <- 1").unwrap();
        let out = TokenDumper::new().no_color().render(&tokens);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("[0000] IDENT"));
        assert!(lines[0].contains("IDENTIFIER"));
        assert!(lines[0].ends_with("\"x\""));
        assert!(lines[1].contains("ASSIGN"));
        assert!(lines[3].starts_with("[0006] EOF"));
        assert!(!out.contains('\x1b'));
    }

    #[test]
    fn test_pretty_render_shows_lexemes() {
        let tokens = tokenize("print 2").unwrap();
        let out = TokenDumper::new().no_color().pretty().render(&tokens);
        assert_eq!(out, "[0000] KEYWORD  print\n[0006] NUM      2\n[0007] EOF      EOF\n");
    }

    #[test]
    fn test_color_render_resets() {
        let tokens = tokenize("y").unwrap();
        let out = TokenDumper::new().render(&tokens);
        assert!(out.contains(TokenDumper::YEL));
        assert!(out.contains(TokenDumper::RESET));
    }
}
