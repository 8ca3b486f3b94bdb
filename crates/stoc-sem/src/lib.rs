//! stoc-sem - the semantic analysis phase of the stoc compiler (spec.md §4.3).
//!
//! Decorates the parse tree with resolved types, value categories, and
//! declaration bindings; assigns mangled identifiers to functions; reports
//! semantic diagnostics. Runs as a single sequential pass over the
//! declaration list (spec.md §5): a function's own identifier is bound
//! into scope before its body is checked, so recursive calls resolve, but
//! a call to a function declared later in the file will not.

mod mangle;
mod scope;

use stoc_par::ast::{
    AssignStmt, Binding, CallExpr, Decl, Expr, ForStmt, FuncDecl, IdentExpr, IfStmt, Literal,
    Param, Program, ReturnStmt, Stmt, UnaryExpr, BinaryExpr, VarDecl, ConstDecl, WhileStmt,
};
use stoc_par::ast::{BinOp, UnOp};
use stoc_util::{BasicType, Diagnostic, Handler, Phase, Signature, Span, Symbol, ValueCategory};

use scope::{InsertError, ScopeStack, SemSymbol, SymbolKind};

const BUILTIN_TYPES: [BasicType; 4] = [BasicType::Bool, BasicType::Int, BasicType::Float, BasicType::String];

pub struct Analyzer<'a> {
    handler: &'a mut Handler,
    scopes: ScopeStack,
    /// The enclosing function's declared result type, or `None` at the top
    /// level (used to validate `return` statements, spec.md §4.3.4).
    current_function_result: Option<BasicType>,
}

impl<'a> Analyzer<'a> {
    pub fn new(handler: &'a mut Handler) -> Self {
        let mut scopes = ScopeStack::new();
        seed_builtins(&mut scopes);
        Self { handler, scopes, current_function_result: None }
    }

    /// Runs the analyzer over a whole program (spec.md §4.3.7).
    pub fn analyze(&mut self, program: &Program) {
        for decl in program {
            self.analyze_decl(decl);
        }
        if self.scopes.lookup(Symbol::intern("main")).is_none() {
            self.handler.report(Diagnostic::global_error(Phase::Semantic, "missing main function"));
        }
    }

    fn analyze_decl(&mut self, decl: &Decl) {
        match decl {
            Decl::Var(v) => self.analyze_var_decl(v),
            Decl::Const(c) => self.analyze_const_decl(c),
            Decl::Func(f) => self.analyze_func_decl(f),
            Decl::Error(_) => {},
        }
    }

    fn analyze_var_decl(&mut self, v: &VarDecl) {
        let init_ty = self.analyze_expr(&v.init);
        let declared = v.ty.to_basic();

        if init_ty != BasicType::Invalid && declared != init_ty {
            self.error(v.span, format!("type checking: different types {declared} and {init_ty}"));
        }

        let is_global = self.scopes.at_global_scope();
        v.resolved_ty.set(Some(declared));
        v.is_global.set(is_global);

        let name_str = v.name.as_str();
        let symbol = SemSymbol {
            name: v.name,
            kind: SymbolKind::Variable,
            ty: declared,
            signature: None,
            mangled_name: name_str.clone(),
        };
        if self.scopes.declare_value(symbol).is_err() {
            self.error(v.span, format!("redefinition of '{name_str}'"));
        }
    }

    fn analyze_const_decl(&mut self, c: &ConstDecl) {
        let init_ty = self.analyze_expr(&c.init);
        let declared = c.ty.to_basic();

        if init_ty != BasicType::Invalid && declared != init_ty {
            self.error(c.span, format!("type checking: different types {declared} and {init_ty}"));
        }

        let is_global = self.scopes.at_global_scope();
        c.resolved_ty.set(Some(declared));
        c.is_global.set(is_global);

        let name_str = c.name.as_str();
        let symbol = SemSymbol {
            name: c.name,
            kind: SymbolKind::Constant,
            ty: declared,
            signature: None,
            mangled_name: name_str.clone(),
        };
        if self.scopes.declare_value(symbol).is_err() {
            self.error(c.span, format!("redefinition of '{name_str}'"));
        }
    }

    fn analyze_func_decl(&mut self, f: &FuncDecl) {
        let params: Vec<BasicType> = f.params.iter().map(|p| p.ty.to_basic()).collect();
        let result = f.ret_type.map(|t| t.to_basic()).unwrap_or(BasicType::Void);
        let signature = Signature::new(params, result);
        let name_str = f.name.as_str();
        let mangled = mangle::mangle(&name_str, &signature);

        let symbol = SemSymbol {
            name: f.name,
            kind: SymbolKind::Function,
            ty: BasicType::Void,
            signature: Some(signature.clone()),
            mangled_name: mangled.clone(),
        };
        if let Err(err) = self.scopes.declare_function(symbol) {
            match err {
                InsertError::AlreadyBound => {
                    self.error(f.span, format!("redefinition of '{name_str}'"));
                },
                InsertError::OverloadClash => {
                    self.error(
                        f.span,
                        format!("redefinition of function '{name_str}' with the same parameter types"),
                    );
                },
            }
        }

        *f.signature.borrow_mut() = Some(signature.clone());
        *f.mangled_name.borrow_mut() = Some(mangled);

        self.scopes.push_scope();
        for param in &f.params {
            self.declare_param(param);
        }
        let previous_result = self.current_function_result.replace(result);
        self.analyze_stmts(&f.body.stmts);
        self.current_function_result = previous_result;
        self.scopes.pop_scope();
    }

    fn declare_param(&mut self, param: &Param) {
        let ty = param.ty.to_basic();
        let name_str = param.name.as_str();
        let symbol = SemSymbol {
            name: param.name,
            kind: SymbolKind::Parameter,
            ty,
            signature: None,
            mangled_name: name_str.clone(),
        };
        if self.scopes.declare_value(symbol).is_err() {
            self.error(param.span, format!("redefinition of parameter '{name_str}'"));
        }
    }

    /// Analyzes a statement list as one unreachable-code-checking unit
    /// (spec.md §4.3.4): a statement after a `return` in the same block is
    /// flagged. Does NOT push a scope; callers that need one push it
    /// themselves (functions, `for`, plain blocks all do this differently).
    fn analyze_stmts(&mut self, stmts: &[Stmt]) {
        let mut returned = false;
        for stmt in stmts {
            if returned {
                self.error(stmt.span(), "statement after return statement");
            }
            if self.analyze_stmt(stmt) {
                returned = true;
            }
        }
    }

    /// Returns true iff `stmt` was a `return` (used by `analyze_stmts` to
    /// flag dead code, mirroring the original's per-block sticky flag).
    fn analyze_stmt(&mut self, stmt: &Stmt) -> bool {
        match stmt {
            Stmt::Decl(d) => {
                self.analyze_decl(d);
                false
            },
            Stmt::Expr(e) => {
                self.analyze_expr(e);
                false
            },
            Stmt::Block(b) => {
                self.scopes.push_scope();
                self.analyze_stmts(&b.stmts);
                self.scopes.pop_scope();
                false
            },
            Stmt::If(i) => {
                self.analyze_if(i);
                false
            },
            Stmt::For(f) => {
                self.analyze_for(f);
                false
            },
            Stmt::While(w) => {
                self.analyze_while(w);
                false
            },
            Stmt::Assignment(a) => {
                self.analyze_assignment(a);
                false
            },
            Stmt::Return(r) => {
                self.analyze_return(r);
                true
            },
            Stmt::Error(_) => false,
        }
    }

    fn analyze_if(&mut self, i: &IfStmt) {
        self.check_condition(&i.cond, "if");
        self.scopes.push_scope();
        self.analyze_stmts(&i.then_block.stmts);
        self.scopes.pop_scope();
        if let Some(else_branch) = &i.else_branch {
            self.analyze_stmt(else_branch);
        }
    }

    fn analyze_for(&mut self, f: &ForStmt) {
        self.scopes.push_scope();
        if let Some(init) = &f.init {
            self.analyze_stmt(init);
        }
        if let Some(cond) = &f.cond {
            self.check_condition(cond, "for");
        }
        if let Some(post) = &f.post {
            self.analyze_stmt(post);
        }
        self.analyze_stmts(&f.body.stmts);
        self.scopes.pop_scope();
    }

    fn analyze_while(&mut self, w: &WhileStmt) {
        self.check_condition(&w.cond, "while");
        self.scopes.push_scope();
        self.analyze_stmts(&w.body.stmts);
        self.scopes.pop_scope();
    }

    fn check_condition(&mut self, cond: &Expr, stmt_name: &str) {
        let ty = self.analyze_expr(cond);
        if ty != BasicType::Invalid && ty != BasicType::Bool {
            self.error(
                cond.span(),
                format!("type checking: type of condition in {stmt_name} statement should be 'bool' but found {ty}"),
            );
        }
    }

    fn analyze_assignment(&mut self, a: &AssignStmt) {
        let target_ty = self.analyze_expr(&a.target);
        let value_ty = self.analyze_expr(&a.value);
        match a.target.decoration().value_category.get() {
            Some(ValueCategory::ModifiableLValue) => {},
            Some(ValueCategory::NonModifiableLValue) => {
                self.error(a.span, "expression is not assignable (constant)");
            },
            _ => {
                self.error(a.span, "expression is not assignable");
            },
        }
        if target_ty != BasicType::Invalid && value_ty != BasicType::Invalid && target_ty != value_ty {
            self.error(a.span, format!("type checking: cannot assign type {value_ty} to type {target_ty}"));
        }
    }

    fn analyze_return(&mut self, r: &ReturnStmt) {
        let Some(result_ty) = self.current_function_result else {
            self.error(r.span, "return statement outside function body");
            if let Some(value) = &r.value {
                self.analyze_expr(value);
            }
            return;
        };
        let value_ty = match &r.value {
            Some(value) => self.analyze_expr(value),
            None => BasicType::Void,
        };
        if value_ty != BasicType::Invalid && result_ty != BasicType::Invalid && value_ty != result_ty {
            self.error(
                r.span,
                format!(
                    "type checking: different types of returned value of type {value_ty} and function return value of type {result_ty}"
                ),
            );
        }
    }

    fn analyze_expr(&mut self, expr: &Expr) -> BasicType {
        match expr {
            Expr::Literal(l) => {
                let ty = match &l.value {
                    Literal::Bool(_) => BasicType::Bool,
                    Literal::Int(_) => BasicType::Int,
                    Literal::Float(_) => BasicType::Float,
                    Literal::String(_) => BasicType::String,
                };
                l.decoration.set(ty, ValueCategory::RValue);
                ty
            },
            Expr::Identifier(id) => self.analyze_identifier(id),
            Expr::Unary(u) => self.analyze_unary(u),
            Expr::Binary(b) => self.analyze_binary(b),
            Expr::Call(c) => self.analyze_call(c),
        }
    }

    fn analyze_identifier(&mut self, id: &IdentExpr) -> BasicType {
        let Some(symbols) = self.scopes.lookup(id.name) else {
            self.error(id.span, format!("undefined reference to {}", id.name.as_str()));
            id.decoration.set(BasicType::Invalid, ValueCategory::RValue);
            return BasicType::Invalid;
        };
        let head = &symbols[0];
        if head.is_function() {
            self.error(id.span, format!("'{}' is a function and must be called", id.name.as_str()));
            id.decoration.set(BasicType::Invalid, ValueCategory::RValue);
            return BasicType::Invalid;
        }

        let category = match head.kind {
            SymbolKind::Constant => ValueCategory::NonModifiableLValue,
            _ => ValueCategory::ModifiableLValue,
        };
        let ty = head.ty;
        let mangled_name = head.mangled_name.clone();
        *id.binding.borrow_mut() = Some(match head.kind {
            SymbolKind::Variable => Binding::Variable { mangled_name },
            SymbolKind::Constant => Binding::Constant { mangled_name },
            SymbolKind::Parameter => Binding::Parameter { mangled_name },
            SymbolKind::Function => unreachable!("function head handled above"),
        });
        id.decoration.set(ty, category);
        ty
    }

    fn analyze_call(&mut self, call: &CallExpr) -> BasicType {
        let symbols = self.scopes.lookup(call.callee).map(<[_]>::to_vec);
        let arg_types: Vec<BasicType> = call.args.iter().map(|a| self.analyze_expr(a)).collect();
        let name_str = call.callee.as_str();

        let Some(symbols) = symbols else {
            self.error(call.callee_span, format!("undefined reference to {name_str}"));
            call.decoration.set(BasicType::Invalid, ValueCategory::RValue);
            return BasicType::Invalid;
        };

        if symbols.iter().any(|s| !s.is_function()) {
            self.error(call.callee_span, format!("'{name_str}' is not a function"));
            call.decoration.set(BasicType::Invalid, ValueCategory::RValue);
            return BasicType::Invalid;
        }

        let matched = symbols.iter().find(|s| {
            let sig = s.signature.as_ref().expect("function symbol carries a signature");
            sig.params.len() == arg_types.len() && sig.params.iter().zip(&arg_types).all(|(p, a)| *p == *a)
        });

        match matched {
            Some(sym) => {
                let sig = sym.signature.clone().expect("function symbol carries a signature");
                let result = sig.result;
                *call.binding.borrow_mut() = Some(Binding::Function { mangled_name: sym.mangled_name.clone(), signature: sig });
                call.decoration.set(result, ValueCategory::RValue);
                result
            },
            None => {
                self.error(call.callee_span, format!("undefined reference to {name_str}"));
                call.decoration.set(BasicType::Invalid, ValueCategory::RValue);
                BasicType::Invalid
            },
        }
    }

    fn analyze_unary(&mut self, u: &UnaryExpr) -> BasicType {
        let operand_ty = self.analyze_expr(&u.operand);
        if operand_ty == BasicType::Invalid {
            u.decoration.set(BasicType::Invalid, ValueCategory::RValue);
            return BasicType::Invalid;
        }

        let (valid, result_ty) = match u.op {
            UnOp::Plus | UnOp::Neg => (operand_ty.is_numeric(), operand_ty),
            UnOp::Not => (operand_ty.is_boolean(), BasicType::Bool),
        };
        if !valid {
            self.error(u.span, format!("operator not supported for unary expression of type {operand_ty}"));
        }
        u.decoration.set(result_ty, ValueCategory::RValue);
        result_ty
    }

    fn analyze_binary(&mut self, b: &BinaryExpr) -> BasicType {
        let left_ty = self.analyze_expr(&b.left);
        let right_ty = self.analyze_expr(&b.right);

        if left_ty == BasicType::Invalid || right_ty == BasicType::Invalid {
            b.decoration.set(BasicType::Invalid, ValueCategory::RValue);
            return BasicType::Invalid;
        }

        if left_ty != right_ty {
            self.error(b.span, format!("type checking: different types {left_ty} and {right_ty}"));
        }

        let (valid, result_ty) = binary_op_requirement(b.op, right_ty);
        if !valid {
            self.error(b.span, format!("operator not supported for binary expression of type {right_ty}"));
        }
        b.decoration.set(result_ty, ValueCategory::RValue);
        result_ty
    }

    fn error(&mut self, span: Span, message: impl Into<String>) {
        self.handler.report(Diagnostic::error(Phase::Semantic, message, span));
    }
}

/// Binary operator requirement table (spec.md §4.3.3).
fn binary_op_requirement(op: BinOp, operand_ty: BasicType) -> (bool, BasicType) {
    match op {
        BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div => (operand_ty.is_numeric(), operand_ty),
        BinOp::Eq | BinOp::Ne => (operand_ty.is_comparable(), BasicType::Bool),
        BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge => (operand_ty.is_ordered(), BasicType::Bool),
        BinOp::And | BinOp::Or => (operand_ty.is_boolean(), BasicType::Bool),
    }
}

/// Pre-seeds the global scope with `print`/`println`, each overloaded once
/// per basic type (spec.md §3.4). Built-ins are never mangled (SPEC_FULL.md
/// §3.4, spec.md §9).
fn seed_builtins(scopes: &mut ScopeStack) {
    for name in ["print", "println"] {
        for ty in BUILTIN_TYPES {
            let signature = Signature::new(vec![ty], BasicType::Void);
            let symbol = SemSymbol {
                name: Symbol::intern(name),
                kind: SymbolKind::Function,
                ty: BasicType::Void,
                signature: Some(signature),
                mangled_name: name.to_string(),
            };
            scopes.declare_function(symbol).expect("builtin overloads never clash with each other");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stoc_lex::tokenize;
    use stoc_par::Parser;

    fn analyze(source: &str) -> bool {
        let mut handler = Handler::new("test.stoc");
        let tokens = tokenize(source, &mut handler);
        let mut parser = Parser::new(tokens, &mut handler);
        let program = parser.parse_program();
        let mut analyzer = Analyzer::new(&mut handler);
        analyzer.analyze(&program);
        handler.has_errors()
    }

    #[test]
    fn minimal_main_is_accepted() {
        assert!(!analyze("func main() { println(42); }"));
    }

    #[test]
    fn missing_main_is_reported() {
        assert!(analyze("func f() { }"));
    }

    #[test]
    fn overload_by_parameter_type_is_accepted() {
        assert!(!analyze(
            "func add(var int a, var int b) int { return a + b; } \
             func add(var float a, var float b) float { return a + b; } \
             func main() { println(add(1, 2)); println(add(1.5, 2.5)); }"
        ));
    }

    #[test]
    fn assignment_to_constant_is_rejected() {
        assert!(analyze(
            "func main() { const int k = 1; { var int k = 2; k = 3; } k = 4; }"
        ));
    }

    #[test]
    fn non_bool_condition_is_rejected() {
        assert!(analyze("func main() { if 1 { } }"));
    }

    #[test]
    fn call_with_no_matching_overload_is_undefined_reference() {
        assert!(analyze("func f(var int a) int { return a; } func main() { f(1.0); }"));
    }

    #[test]
    fn redefinition_in_same_scope_is_rejected() {
        assert!(analyze("func main() { var int a = 1; var int a = 2; }"));
    }

    #[test]
    fn statement_after_return_is_rejected() {
        assert!(analyze("func main() { return; println(1); }"));
    }
}
