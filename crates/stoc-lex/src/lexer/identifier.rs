//! Identifier and keyword lexing (spec.md §4.1).

use crate::lexer::core::{is_ident_continue, Lexer};
use crate::token::{keyword_kind, Token, TokenKind};

impl<'a> Lexer<'a> {
    pub(crate) fn lex_identifier(&mut self) -> Token {
        while is_ident_continue(self.cursor().current_char()) {
            self.cursor().advance();
        }
        let token = self.make(TokenKind::Identifier);
        match keyword_kind(&token.lexeme) {
            Some(kind) => self.make(kind),
            None => token,
        }
    }
}
