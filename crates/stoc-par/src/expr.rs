//! Pratt expression parsing (spec.md §4.2.3).
//!
//! `parse_expr` calls `parse_binary(OR)`. `parse_binary(min_prec)` parses a
//! unary expression, then while the current token's precedence is at least
//! `min_prec` it consumes the operator and recurses with `prec + 1`,
//! building a left-associative tree. Comparisons do not chain: all six sit
//! at one `EQUALITY` level, so `a == b == c` requires parentheses.

use stoc_lex::TokenKind;
use stoc_util::{Span, Symbol};

use crate::ast::{BinaryExpr, BinOp, CallExpr, Decoration, Expr, IdentExpr, Literal, LiteralExpr, UnaryExpr, UnOp};
use crate::Parser;

const OR: u8 = 1;
const AND: u8 = 2;
const EQUALITY: u8 = 3;
const TERM: u8 = 4;
const FACTOR: u8 = 5;

fn precedence(kind: TokenKind) -> Option<u8> {
    match kind {
        TokenKind::OrOr => Some(OR),
        TokenKind::AndAnd => Some(AND),
        TokenKind::EqualEqual
        | TokenKind::NotEqual
        | TokenKind::Less
        | TokenKind::Greater
        | TokenKind::LessEqual
        | TokenKind::GreaterEqual => Some(EQUALITY),
        TokenKind::Plus | TokenKind::Minus => Some(TERM),
        TokenKind::Star | TokenKind::Slash => Some(FACTOR),
        _ => None,
    }
}

fn to_binop(kind: TokenKind) -> BinOp {
    match kind {
        TokenKind::Plus => BinOp::Add,
        TokenKind::Minus => BinOp::Sub,
        TokenKind::Star => BinOp::Mul,
        TokenKind::Slash => BinOp::Div,
        TokenKind::EqualEqual => BinOp::Eq,
        TokenKind::NotEqual => BinOp::Ne,
        TokenKind::Less => BinOp::Lt,
        TokenKind::Greater => BinOp::Gt,
        TokenKind::LessEqual => BinOp::Le,
        TokenKind::GreaterEqual => BinOp::Ge,
        TokenKind::AndAnd => BinOp::And,
        TokenKind::OrOr => BinOp::Or,
        other => unreachable!("{other:?} is not a binary operator token"),
    }
}

impl<'a> Parser<'a> {
    pub fn parse_expr(&mut self) -> Expr {
        self.parse_binary(OR)
    }

    fn parse_binary(&mut self, min_prec: u8) -> Expr {
        let mut left = self.parse_unary();

        while let Some(prec) = precedence(self.current().kind) {
            if prec < min_prec {
                break;
            }
            let op_token = self.advance();
            let op = to_binop(op_token.kind);
            let right = self.parse_binary(prec + 1);
            let span = left.span().to(right.span());
            left = Expr::Binary(BinaryExpr {
                left: Box::new(left),
                op,
                right: Box::new(right),
                span,
                decoration: Decoration::default(),
            });
        }

        left
    }

    fn parse_unary(&mut self) -> Expr {
        let kind = self.current().kind;
        let op = match kind {
            TokenKind::Plus => UnOp::Plus,
            TokenKind::Minus => UnOp::Neg,
            TokenKind::Bang => UnOp::Not,
            _ => return self.parse_primary(),
        };
        let op_token = self.advance();
        let operand = self.parse_unary();
        let span = op_token.span.to(operand.span());
        Expr::Unary(UnaryExpr {
            op,
            operand: Box::new(operand),
            span,
            decoration: Decoration::default(),
        })
    }

    fn parse_primary(&mut self) -> Expr {
        let tok = self.current().clone();
        match tok.kind {
            TokenKind::True => {
                self.advance();
                Expr::Literal(LiteralExpr { value: Literal::Bool(true), span: tok.span, decoration: Decoration::default() })
            },
            TokenKind::False => {
                self.advance();
                Expr::Literal(LiteralExpr { value: Literal::Bool(false), span: tok.span, decoration: Decoration::default() })
            },
            TokenKind::IntLiteral => {
                self.advance();
                let value = tok.lexeme.parse::<i64>().unwrap_or(0);
                Expr::Literal(LiteralExpr { value: Literal::Int(value), span: tok.span, decoration: Decoration::default() })
            },
            TokenKind::FloatLiteral => {
                self.advance();
                let value = tok.lexeme.parse::<f64>().unwrap_or(0.0);
                Expr::Literal(LiteralExpr { value: Literal::Float(value), span: tok.span, decoration: Decoration::default() })
            },
            TokenKind::StringLiteral => {
                self.advance();
                let text = tok.lexeme.trim_start_matches('"').trim_end_matches('"');
                Expr::Literal(LiteralExpr {
                    value: Literal::String(Symbol::intern(text)),
                    span: tok.span,
                    decoration: Decoration::default(),
                })
            },
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr();
                self.expect(TokenKind::RParen, "expected ')'");
                inner
            },
            TokenKind::Identifier => {
                self.advance();
                let name = Symbol::intern(&tok.lexeme);
                if self.check(TokenKind::LParen) {
                    self.parse_call(name, tok.span)
                } else {
                    Expr::Identifier(IdentExpr {
                        name,
                        span: tok.span,
                        decoration: Decoration::default(),
                        binding: Default::default(),
                    })
                }
            },
            _ => {
                self.error_here(format!("expected expression, found '{}'", tok.lexeme));
                self.synchronize();
                Expr::Literal(LiteralExpr { value: Literal::Int(0), span: tok.span, decoration: Decoration::default() })
            },
        }
    }

    fn parse_call(&mut self, callee: Symbol, callee_span: Span) -> Expr {
        self.expect(TokenKind::LParen, "expected '('");
        let mut args = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                args.push(self.parse_expr());
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }
        let end = self.expect(TokenKind::RParen, "expected ')'");
        let span = callee_span.to(end.span);
        Expr::Call(CallExpr {
            callee,
            callee_span,
            args,
            span,
            decoration: Decoration::default(),
            binding: Default::default(),
        })
    }
}
