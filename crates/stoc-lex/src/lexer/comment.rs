//! Comment skipping (spec.md §4.1). Stoc only has line comments: `//`
//! through the end of the line.

use crate::lexer::core::Lexer;

impl<'a> Lexer<'a> {
    pub(crate) fn skip_line_comment(&mut self) {
        while self.cursor().current_char() != '\n' && !self.cursor().is_at_end() {
            self.cursor().advance();
        }
    }
}
