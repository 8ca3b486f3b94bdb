//! Declaration parsing (spec.md §4.2.1): var-decl, const-decl, param-decl,
//! func-decl.

use std::cell::{Cell, RefCell};

use stoc_lex::TokenKind;
use stoc_util::Symbol;

use crate::ast::{ConstDecl, Decl, FuncDecl, Param, TypeName, VarDecl};
use crate::Parser;

impl<'a> Parser<'a> {
    pub(crate) fn parse_decl(&mut self) -> Decl {
        match self.current().kind {
            TokenKind::Var => self.parse_var_decl(),
            TokenKind::Const => self.parse_const_decl(),
            TokenKind::Func => self.parse_func_decl(),
            _ => {
                let span = self.current_span();
                let found = self.current().lexeme.clone();
                self.error_here(format!("expected a declaration, found '{found}'"));
                self.synchronize();
                Decl::Error(span)
            },
        }
    }

    fn parse_var_decl(&mut self) -> Decl {
        let start = self.advance(); // `var`
        let ty = self.parse_type_name();
        let name_tok = self.expect(TokenKind::Identifier, "expected identifier");
        let name = Symbol::intern(&name_tok.lexeme);
        self.expect(TokenKind::Equal, "expected '='");
        let init = self.parse_expr();
        let end = self.expect(TokenKind::Semicolon, "expected ';'");
        Decl::Var(VarDecl {
            ty,
            name,
            init,
            span: start.span.to(end.span),
            resolved_ty: Cell::new(None),
            is_global: Cell::new(false),
        })
    }

    fn parse_const_decl(&mut self) -> Decl {
        let start = self.advance(); // `const`
        let ty = self.parse_type_name();
        let name_tok = self.expect(TokenKind::Identifier, "expected identifier");
        let name = Symbol::intern(&name_tok.lexeme);
        self.expect(TokenKind::Equal, "expected '='");
        let init = self.parse_expr();
        let end = self.expect(TokenKind::Semicolon, "expected ';'");
        Decl::Const(ConstDecl {
            ty,
            name,
            init,
            span: start.span.to(end.span),
            resolved_ty: Cell::new(None),
            is_global: Cell::new(false),
        })
    }

    fn parse_func_decl(&mut self) -> Decl {
        let start = self.advance(); // `func`
        let name_tok = self.expect(TokenKind::Identifier, "expected function name");
        let name = Symbol::intern(&name_tok.lexeme);
        self.expect(TokenKind::LParen, "expected '('");
        let params = self.parse_param_list();
        self.expect(TokenKind::RParen, "expected ')'");
        let ret_type = if self.is_type_token(self.current().kind) { Some(self.parse_type_name()) } else { None };
        let body = self.parse_block();
        let span = start.span.to(body.span);
        Decl::Func(FuncDecl {
            name,
            params,
            ret_type,
            body,
            span,
            signature: RefCell::new(None),
            mangled_name: RefCell::new(None),
        })
    }

    fn parse_param_list(&mut self) -> Vec<Param> {
        let mut params = Vec::new();
        if self.check(TokenKind::RParen) {
            return params;
        }
        loop {
            params.push(self.parse_param());
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        params
    }

    /// param-decl: `var` type identifier (spec.md §4.2.1).
    fn parse_param(&mut self) -> Param {
        let start = self.expect(TokenKind::Var, "expected 'var'");
        let ty = self.parse_type_name();
        let name_tok = self.expect(TokenKind::Identifier, "expected parameter name");
        let name = Symbol::intern(&name_tok.lexeme);
        Param { ty, name, span: start.span.to(name_tok.span) }
    }

    pub(crate) fn is_type_token(&self, kind: TokenKind) -> bool {
        matches!(kind, TokenKind::Bool | TokenKind::Int | TokenKind::Float | TokenKind::String)
    }

    fn parse_type_name(&mut self) -> TypeName {
        let tok = self.current().clone();
        match tok.kind {
            TokenKind::Bool => {
                self.advance();
                TypeName::Bool
            },
            TokenKind::Int => {
                self.advance();
                TypeName::Int
            },
            TokenKind::Float => {
                self.advance();
                TypeName::Float
            },
            TokenKind::String => {
                self.advance();
                TypeName::String
            },
            _ => {
                self.error_here(format!("expected a type, found '{}'", tok.lexeme));
                TypeName::Int
            },
        }
    }
}
