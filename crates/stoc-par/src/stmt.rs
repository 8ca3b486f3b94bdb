//! Statement parsing (spec.md §4.2.2).

use stoc_lex::TokenKind;

use crate::ast::{AssignStmt, Block, ForStmt, IfStmt, ReturnStmt, Stmt, WhileStmt};
use crate::Parser;

impl<'a> Parser<'a> {
    pub(crate) fn parse_block(&mut self) -> Block {
        let start = self.expect(TokenKind::LBrace, "expected '{'");
        let mut stmts = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.check(TokenKind::Eof) {
            stmts.push(self.parse_stmt());
        }
        let end = self.expect(TokenKind::RBrace, "expected '}'");
        Block { stmts, span: start.span.to(end.span) }
    }

    fn parse_stmt(&mut self) -> Stmt {
        match self.current().kind {
            TokenKind::LBrace => Stmt::Block(self.parse_block()),
            TokenKind::If => self.parse_if_stmt(),
            TokenKind::For => self.parse_for_stmt(),
            TokenKind::While => self.parse_while_stmt(),
            TokenKind::Return => self.parse_return_stmt(),
            _ => self.parse_simple_stmt(true),
        }
    }

    fn parse_if_stmt(&mut self) -> Stmt {
        let start = self.advance(); // `if`
        let cond = self.parse_expr();
        let then_block = self.parse_block();
        let mut span = start.span.to(then_block.span);
        let else_branch = if self.match_token(TokenKind::Else) {
            let branch = if self.check(TokenKind::If) {
                self.parse_if_stmt()
            } else {
                Stmt::Block(self.parse_block())
            };
            span = start.span.to(branch_span(&branch, span));
            Some(Box::new(branch))
        } else {
            None
        };
        Stmt::If(IfStmt { cond, then_block, else_branch, span })
    }

    fn parse_for_stmt(&mut self) -> Stmt {
        let start = self.advance(); // `for`
        let init = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(Box::new(self.parse_simple_stmt(true)))
        };
        if init.is_none() {
            self.expect(TokenKind::Semicolon, "expected ';'");
        }
        let cond = if self.check(TokenKind::Semicolon) { None } else { Some(self.parse_expr()) };
        self.expect(TokenKind::Semicolon, "expected ';'");
        let post = if self.check(TokenKind::LBrace) {
            None
        } else {
            Some(Box::new(self.parse_simple_stmt(false)))
        };
        let body = self.parse_block();
        let span = start.span.to(body.span);
        Stmt::For(ForStmt { init, cond, post, body, span })
    }

    fn parse_while_stmt(&mut self) -> Stmt {
        let start = self.advance(); // `while`
        let cond = self.parse_expr();
        let body = self.parse_block();
        let span = start.span.to(body.span);
        Stmt::While(WhileStmt { cond, body, span })
    }

    fn parse_return_stmt(&mut self) -> Stmt {
        let start = self.advance(); // `return`
        let value = if self.check(TokenKind::Semicolon) { None } else { Some(self.parse_expr()) };
        let end = self.expect(TokenKind::Semicolon, "expected ';'");
        Stmt::Return(ReturnStmt { value, span: start.span.to(end.span) })
    }

    /// A simple statement: a declaration, an assignment `expr = expr`, or
    /// an expression statement. `require_semicolon` is false only for the
    /// `for` loop's post-position (spec.md §4.2.2).
    fn parse_simple_stmt(&mut self, require_semicolon: bool) -> Stmt {
        if matches!(self.current().kind, TokenKind::Var | TokenKind::Const) {
            return Stmt::Decl(self.parse_decl_without_semicolon_check(require_semicolon));
        }

        let expr = self.parse_expr();
        let stmt = if self.match_token(TokenKind::Equal) {
            let value = self.parse_expr();
            let span = expr.span().to(value.span());
            Stmt::Assignment(AssignStmt { target: expr, value, span })
        } else {
            Stmt::Expr(expr)
        };

        if require_semicolon {
            self.expect(TokenKind::Semicolon, "expected ';'");
        }
        stmt
    }

    /// `parse_decl` always consumes its own trailing `;`; when a var/const
    /// declaration appears as a `for`-loop initializer that's exactly what
    /// we want, since the loop's own `;` immediately follows it.
    fn parse_decl_without_semicolon_check(&mut self, _require_semicolon: bool) -> crate::ast::Decl {
        self.parse_decl()
    }
}

fn branch_span(stmt: &Stmt, fallback: stoc_util::Span) -> stoc_util::Span {
    match stmt {
        Stmt::If(s) => s.span,
        Stmt::Block(b) => b.span,
        _ => fallback,
    }
}
