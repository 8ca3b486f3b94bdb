//! String literal lexing (spec.md §4.1).
//!
//! No escape sequences: every byte between the quotes is taken literally,
//! including newlines (the cursor's line counter advances through them).
//! Reaching end of input before the closing quote is a scanning error.

use crate::lexer::core::Lexer;
use crate::token::{Token, TokenKind};

impl<'a> Lexer<'a> {
    pub(crate) fn lex_string(&mut self) -> Token {
        self.cursor().advance(); // opening quote

        while self.cursor().current_char() != '"' && !self.cursor().is_at_end() {
            self.cursor().advance();
        }

        if self.cursor().is_at_end() {
            self.report_error("unterminated string literal");
            return self.make(TokenKind::Illegal);
        }

        self.cursor().advance(); // closing quote
        self.make(TokenKind::StringLiteral)
    }
}
