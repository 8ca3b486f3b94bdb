//! Numeric literal lexing (spec.md §4.1).
//!
//! Stoc has no underscore digit separators and no hex/binary/octal
//! prefixes: a numeric literal is a run of ASCII digits, optionally
//! followed by a single `.` and another run of digits. A literal with a
//! fractional part lexes as a float; without one, as an int.

use crate::lexer::core::Lexer;
use crate::token::{Token, TokenKind};

impl<'a> Lexer<'a> {
    pub(crate) fn lex_number(&mut self) -> Token {
        while self.cursor().current_char().is_ascii_digit() {
            self.cursor().advance();
        }

        let mut is_float = false;
        if self.cursor().current_char() == '.' && self.cursor().peek_char(1).is_ascii_digit() {
            is_float = true;
            self.cursor().advance();
            while self.cursor().current_char().is_ascii_digit() {
                self.cursor().advance();
            }
        }

        self.make(if is_float { TokenKind::FloatLiteral } else { TokenKind::IntLiteral })
    }
}
