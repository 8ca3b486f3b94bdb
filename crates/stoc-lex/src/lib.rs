//! stoc-lex - the scanning phase of the stoc compiler (spec.md §4.1).
//!
//! Turns a source file into a stream of [`Token`]s. Whitespace and line
//! comments are insignificant and never produce a token; everything else
//! the scanner meets becomes exactly one token, `Illegal` included, so a
//! single pass always reaches end of file.

mod cursor;
mod lexer;
mod token;

pub use lexer::Lexer;
pub use token::{keyword_kind, Token, TokenKind};

/// Scans the entire source into a `Vec<Token>`, ending with one `Eof`
/// token. Used by `--tokens-dump` and by the parser's token buffer.
pub fn tokenize(source: &str, handler: &mut stoc_util::Handler) -> Vec<Token> {
    let mut lexer = Lexer::new(source, handler);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token();
        let is_eof = token.kind == TokenKind::Eof;
        tokens.push(token);
        if is_eof {
            break;
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use stoc_util::Handler;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut handler = Handler::new("test.stoc");
        tokenize(source, &mut handler).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn skips_whitespace_and_line_comments() {
        assert_eq!(
            kinds("  // a comment\n  42  "),
            vec![TokenKind::IntLiteral, TokenKind::Eof]
        );
    }

    #[test]
    fn lexes_keywords_distinctly_from_identifiers() {
        assert_eq!(
            kinds("var x func foo"),
            vec![
                TokenKind::Var,
                TokenKind::Identifier,
                TokenKind::Func,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lexes_int_and_float_literals() {
        let mut handler = Handler::new("test.stoc");
        let tokens = tokenize("42 3.14 7.", &mut handler);
        assert_eq!(tokens[0].kind, TokenKind::IntLiteral);
        assert_eq!(tokens[0].lexeme, "42");
        assert_eq!(tokens[1].kind, TokenKind::FloatLiteral);
        assert_eq!(tokens[1].lexeme, "3.14");
        // no digit after '.' means the dot is not part of the literal
        assert_eq!(tokens[2].kind, TokenKind::IntLiteral);
        assert_eq!(tokens[2].lexeme, "7");
    }

    #[test]
    fn lexes_two_character_operators_greedily() {
        assert_eq!(
            kinds("== != <= >= && ||"),
            vec![
                TokenKind::EqualEqual,
                TokenKind::NotEqual,
                TokenKind::LessEqual,
                TokenKind::GreaterEqual,
                TokenKind::AndAnd,
                TokenKind::OrOr,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lone_ampersand_and_pipe_are_illegal() {
        let mut handler = Handler::new("test.stoc");
        let tokens = tokenize("& |", &mut handler);
        assert_eq!(tokens[0].kind, TokenKind::Illegal);
        assert_eq!(tokens[1].kind, TokenKind::Illegal);
        assert!(handler.has_errors());
    }

    #[test]
    fn string_literal_with_no_escapes() {
        let mut handler = Handler::new("test.stoc");
        let tokens = tokenize("\"hello world\"", &mut handler);
        assert_eq!(tokens[0].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[0].lexeme, "\"hello world\"");
        assert!(!handler.has_errors());
    }

    #[test]
    fn unterminated_string_is_reported() {
        let mut handler = Handler::new("test.stoc");
        let tokens = tokenize("\"abc", &mut handler);
        assert_eq!(tokens[0].kind, TokenKind::Illegal);
        assert!(handler.has_errors());
    }

    #[test]
    fn unrecognized_byte_is_reported() {
        let mut handler = Handler::new("test.stoc");
        let tokens = tokenize("#", &mut handler);
        assert_eq!(tokens[0].kind, TokenKind::Illegal);
        assert!(handler.has_errors());
    }
}
