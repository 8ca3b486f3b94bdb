//! Pretty-prints the decorated tree for `--ast-dump` (spec.md §6.3).
//!
//! Grounded on `original_source/src/AST/ASTPrinter.cpp`'s recursive
//! `pre`-string walk, generalized so the branch character actually reflects
//! whether a node is the last child of its parent (`|` otherwise, a
//! backtick for the last), rather than always using a backtick the way the
//! original's single-case visitor did.

use stoc_par::ast::{Block, Decl, Expr, Literal, Program, Stmt};

pub fn print_program(program: &Program) {
    let mut printer = Printer::default();
    let children: Vec<_> = program.iter().map(Child::Decl).collect();
    printer.print_children(children);
}

enum Child<'a> {
    Decl(&'a Decl),
    Stmt(&'a Stmt),
    Block(&'a Block),
    Expr(&'a Expr),
}

#[derive(Default)]
struct Printer {
    prefix: String,
}

impl Printer {
    fn line(&self, is_last: bool, text: &str) {
        let branch = if is_last { "`-" } else { "|-" };
        println!("{}{}{}", self.prefix, branch, text);
    }

    fn with_child<F: FnOnce(&mut Self)>(&mut self, is_last: bool, f: F) {
        let saved_len = self.prefix.len();
        self.prefix.push_str(if is_last { "  " } else { "| " });
        f(self);
        self.prefix.truncate(saved_len);
    }

    fn print_children(&mut self, children: Vec<Child>) {
        let last_index = children.len().saturating_sub(1);
        for (i, child) in children.into_iter().enumerate() {
            let is_last = i == last_index;
            match child {
                Child::Decl(d) => self.print_decl(d, is_last),
                Child::Stmt(s) => self.print_stmt(s, is_last),
                Child::Block(b) => self.print_block(b, is_last),
                Child::Expr(e) => self.print_expr(e, is_last),
            }
        }
    }

    fn print_decl(&mut self, decl: &Decl, is_last: bool) {
        match decl {
            Decl::Var(v) => {
                self.line(is_last, &format!("VarDecl '{}' {:?} <{}>", v.name.as_str(), v.ty, v.span));
                self.with_child(is_last, |p| p.print_children(vec![Child::Expr(&v.init)]));
            }
            Decl::Const(c) => {
                self.line(is_last, &format!("ConstDecl '{}' {:?} <{}>", c.name.as_str(), c.ty, c.span));
                self.with_child(is_last, |p| p.print_children(vec![Child::Expr(&c.init)]));
            }
            Decl::Func(f) => {
                let signature = f
                    .signature
                    .borrow()
                    .as_ref()
                    .map(|s| format!(" ({})->{}", fmt_params(&s.params), s.result))
                    .unwrap_or_default();
                self.line(is_last, &format!("FuncDecl '{}'{} <{}>", f.name.as_str(), signature, f.span));
                self.with_child(is_last, |p| p.print_children(vec![Child::Block(&f.body)]));
            }
            Decl::Error(span) => self.line(is_last, &format!("Decl::Error <{span}>")),
        }
    }

    fn print_block(&mut self, block: &Block, is_last: bool) {
        self.line(is_last, &format!("Block <{}>", block.span));
        self.with_child(is_last, |p| {
            let children: Vec<_> = block.stmts.iter().map(Child::Stmt).collect();
            p.print_children(children);
        });
    }

    fn print_stmt(&mut self, stmt: &Stmt, is_last: bool) {
        match stmt {
            Stmt::Decl(d) => self.print_decl(d, is_last),
            Stmt::Expr(e) => {
                self.line(is_last, &format!("ExprStmt <{}>", e.span()));
                self.with_child(is_last, |p| p.print_children(vec![Child::Expr(e)]));
            }
            Stmt::Block(b) => self.print_block(b, is_last),
            Stmt::If(s) => {
                self.line(is_last, &format!("IfStmt <{}>", s.span));
                self.with_child(is_last, |p| {
                    let mut children = vec![Child::Expr(&s.cond), Child::Block(&s.then_block)];
                    if let Some(else_stmt) = &s.else_branch {
                        children.push(Child::Stmt(else_stmt));
                    }
                    p.print_children(children);
                });
            }
            Stmt::For(s) => {
                self.line(is_last, &format!("ForStmt <{}>", s.span));
                self.with_child(is_last, |p| {
                    let mut children = Vec::new();
                    if let Some(init) = &s.init {
                        children.push(Child::Stmt(init));
                    }
                    if let Some(cond) = &s.cond {
                        children.push(Child::Expr(cond));
                    }
                    if let Some(post) = &s.post {
                        children.push(Child::Stmt(post));
                    }
                    children.push(Child::Block(&s.body));
                    p.print_children(children);
                });
            }
            Stmt::While(s) => {
                self.line(is_last, &format!("WhileStmt <{}>", s.span));
                self.with_child(is_last, |p| {
                    p.print_children(vec![Child::Expr(&s.cond), Child::Block(&s.body)]);
                });
            }
            Stmt::Assignment(s) => {
                self.line(is_last, &format!("AssignStmt <{}>", s.span));
                self.with_child(is_last, |p| {
                    p.print_children(vec![Child::Expr(&s.target), Child::Expr(&s.value)]);
                });
            }
            Stmt::Return(s) => {
                self.line(is_last, &format!("ReturnStmt <{}>", s.span));
                if let Some(value) = &s.value {
                    self.with_child(is_last, |p| p.print_children(vec![Child::Expr(value)]));
                }
            }
            Stmt::Error(span) => self.line(is_last, &format!("Stmt::Error <{span}>")),
        }
    }

    fn print_expr(&mut self, expr: &Expr, is_last: bool) {
        match expr {
            Expr::Literal(e) => {
                let text = match &e.value {
                    Literal::Bool(b) => b.to_string(),
                    Literal::Int(i) => i.to_string(),
                    Literal::Float(f) => f.to_string(),
                    Literal::String(s) => format!("{:?}", s.as_str()),
                };
                self.line(is_last, &format!("LiteralExpr '{}' {} <{}>", text, resolved_ty(expr), e.span));
            }
            Expr::Identifier(e) => {
                self.line(is_last, &format!("IdentExpr '{}' {} <{}>", e.name.as_str(), resolved_ty(expr), e.span));
            }
            Expr::Unary(e) => {
                self.line(is_last, &format!("UnaryExpr '{:?}' {} <{}>", e.op, resolved_ty(expr), e.span));
                self.with_child(is_last, |p| p.print_children(vec![Child::Expr(&e.operand)]));
            }
            Expr::Binary(e) => {
                self.line(is_last, &format!("BinaryExpr '{:?}' {} <{}>", e.op, resolved_ty(expr), e.span));
                self.with_child(is_last, |p| {
                    p.print_children(vec![Child::Expr(&e.left), Child::Expr(&e.right)]);
                });
            }
            Expr::Call(e) => {
                self.line(is_last, &format!("CallExpr '{}' {} <{}>", e.callee.as_str(), resolved_ty(expr), e.span));
                self.with_child(is_last, |p| {
                    let children: Vec<_> = e.args.iter().map(Child::Expr).collect();
                    p.print_children(children);
                });
            }
        }
    }
}

/// The resolved type if analysis has run, else a placeholder - `--ast-dump`
/// still works (with blank types) on a tree that failed analysis.
fn resolved_ty(expr: &Expr) -> String {
    match expr.decoration().ty.get() {
        Some(ty) => ty.to_string(),
        None => "<unresolved>".to_string(),
    }
}

fn fmt_params(params: &[stoc_util::BasicType]) -> String {
    params.iter().map(|t| t.to_string()).collect::<Vec<_>>().join(",")
}
