//! Tree-to-LLVM-IR lowering (spec.md §4.4).
//!
//! Lowering dispatches directly on the decorated [`Decl`]/[`Stmt`]/[`Expr`]
//! node kind rather than through a shared visitor trait - unlike the
//! lexer/parser/analyzer phases, several of these methods need to return
//! an IR value, which a single exhaustive match expresses more directly
//! than a dispatch trait would.
//!
//! There is no MIR/LIR step between the decorated tree and LLVM IR: Stoc's
//! language is small enough that a direct lowering is both simpler and
//! easier to verify than an intermediate linear form would be, and Stoc
//! programs never allocate on a managed heap, so there is no GC runtime to
//! hook into module setup.

use std::collections::HashMap;

use inkwell::basic_block::BasicBlock;
use inkwell::context::Context;
use inkwell::module::{Linkage, Module};
use inkwell::targets::{CodeModel, RelocMode, Target, TargetMachine, TargetTriple};
use inkwell::types::BasicType as _;
use inkwell::values::{
    BasicValue, BasicValueEnum, FunctionValue, PointerValue,
};
use inkwell::{builder::Builder, AddressSpace, FloatPredicate, IntPredicate, OptimizationLevel};

use stoc_par::ast::{
    AssignStmt, Binding, BinOp, Block, CallExpr, Decl, ForStmt, FuncDecl, IfStmt, Literal,
    Program, ReturnStmt, Stmt, UnOp, VarDecl, WhileStmt,
};
use stoc_util::BasicType;

use crate::error::{CodeGenError, Result};
use crate::types::TypeMapper;

/// Lowers a whole program into one LLVM module (spec.md §4.4.1).
///
/// One `LlvmBackend` is built per compilation; `locals` is cleared and
/// rebuilt for every function, `globals` accumulates for the module's
/// lifetime, and `global_ctors` collects every `_global_var_init`
/// function so `llvm.global_ctors` can be emitted once at the end.
pub struct LlvmBackend<'ctx> {
    context: &'ctx Context,
    module: Module<'ctx>,
    builder: Builder<'ctx>,
    type_mapper: TypeMapper<'ctx>,
    globals: HashMap<String, PointerValue<'ctx>>,
    locals: HashMap<String, PointerValue<'ctx>>,
    global_ctors: Vec<FunctionValue<'ctx>>,
    string_cache: HashMap<&'static str, PointerValue<'ctx>>,
    /// Set while lowering a function body; `None` at module scope.
    return_slot: Option<PointerValue<'ctx>>,
    exit_block: Option<BasicBlock<'ctx>>,
}

impl<'ctx> LlvmBackend<'ctx> {
    pub fn new(context: &'ctx Context, module_name: &str) -> Result<Self> {
        let module = context.create_module(module_name);

        let triple = TargetMachine::get_default_triple();
        module.set_triple(&triple);
        if let Some(data_layout) = default_data_layout(&triple) {
            module.set_data_layout(&data_layout);
        }

        let mut backend = Self {
            context,
            module,
            builder: context.create_builder(),
            type_mapper: TypeMapper::new(context),
            globals: HashMap::new(),
            locals: HashMap::new(),
            global_ctors: Vec::new(),
            string_cache: HashMap::new(),
            return_slot: None,
            exit_block: None,
        };
        backend.declare_externs();
        Ok(backend)
    }

    fn declare_externs(&mut self) {
        let ptr_ty = self.context.ptr_type(AddressSpace::default());
        let i32_ty = self.context.i32_type();

        let printf_ty = i32_ty.fn_type(&[ptr_ty.into()], true);
        self.module.add_function("printf", printf_ty, Some(Linkage::External));

        // strcmp -> i64 per the externally-visible contract (spec.md
        // §4.4.1, §6.5), not C's actual `int strcmp(...)` signature.
        let i64_ty = self.context.i64_type();
        let strcmp_ty = i64_ty.fn_type(&[ptr_ty.into(), ptr_ty.into()], false);
        self.module.add_function("strcmp", strcmp_ty, Some(Linkage::External));
    }

    /// Lowers every top-level declaration in source order, then appends
    /// `llvm.global_ctors` and verifies the finished module.
    pub fn emit_program(&mut self, program: &Program) -> Result<()> {
        for decl in program {
            self.emit_decl(decl)?;
        }
        self.finalize_global_ctors();
        self.module
            .verify()
            .map_err(|e| CodeGenError::VerificationFailed(e.to_string()))
    }

    pub fn module(&self) -> &Module<'ctx> {
        &self.module
    }

    fn is_terminated(&self) -> bool {
        self.builder
            .get_insert_block()
            .expect("builder always has an insert point while lowering a function body")
            .get_terminator()
            .is_some()
    }

    // ---- declarations (spec.md §4.4.3, §4.4.4, §4.4.5) ----

    fn emit_decl(&mut self, decl: &Decl) -> Result<()> {
        match decl {
            Decl::Var(v) => self.emit_var_or_const(v.name.as_str(), v.resolved_ty.get(), v.is_global.get(), &v.init, false),
            Decl::Const(c) => self.emit_var_or_const(c.name.as_str(), c.resolved_ty.get(), c.is_global.get(), &c.init, true),
            Decl::Func(f) => self.emit_func_decl(f),
            Decl::Error(_) => Ok(()),
        }
    }

    fn emit_var_or_const(
        &mut self,
        name: String,
        resolved_ty: Option<BasicType>,
        is_global: bool,
        init: &stoc_par::ast::Expr,
        is_const: bool,
    ) -> Result<()> {
        let ty = resolved_ty
            .ok_or_else(|| CodeGenError::Internal(format!("'{name}' lowered before type resolution")))?;
        if is_global {
            self.emit_global_decl(&name, ty, init, is_const)
        } else {
            self.emit_local_decl(&name, ty, init)
        }
    }

    fn emit_global_decl(&mut self, name: &str, ty: BasicType, init: &stoc_par::ast::Expr, is_const: bool) -> Result<()> {
        let llvm_ty = self.type_mapper.basic_type(ty);
        let zero = self.type_mapper.zero_value(ty);
        let global = self.module.add_global(llvm_ty, None, name);
        global.set_initializer(&zero);
        global.set_linkage(Linkage::Private);
        global.set_constant(is_const);

        let ptr = global.as_pointer_value();
        self.globals.insert(name.to_string(), ptr);
        self.emit_global_var_init(name, ptr, init)
    }

    /// Builds the `_global_var_init` constructor function for one global
    /// (spec.md §4.4.3). Initializers are not constant-folded, so every
    /// global needs its own function run at program startup.
    fn emit_global_var_init(&mut self, name: &str, target: PointerValue<'ctx>, init: &stoc_par::ast::Expr) -> Result<()> {
        let fn_type = self.context.void_type().fn_type(&[], false);
        let function = self.module.add_function(
            &format!("_global_var_init.{name}"),
            fn_type,
            Some(Linkage::Internal),
        );
        let entry = self.context.append_basic_block(function, "entry");
        self.builder.position_at_end(entry);

        self.locals.clear();
        let value = self.emit_expr(init)?;
        self.build_store(target, value)?;
        self.builder
            .build_return(None)
            .map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))?;

        self.global_ctors.push(function);
        Ok(())
    }

    fn emit_local_decl(&mut self, name: &str, ty: BasicType, init: &stoc_par::ast::Expr) -> Result<()> {
        let llvm_ty = self.type_mapper.basic_type(ty);
        let alloca = self
            .builder
            .build_alloca(llvm_ty, name)
            .map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))?;
        let value = self.emit_expr(init)?;
        self.build_store(alloca, value)?;
        self.locals.insert(name.to_string(), alloca);
        Ok(())
    }

    /// Appends `llvm.global_ctors`, the priority-0 list the runtime's
    /// startup code walks before `main` (spec.md §4.4.3).
    fn finalize_global_ctors(&mut self) {
        if self.global_ctors.is_empty() {
            return;
        }
        let i32_ty = self.context.i32_type();
        let ptr_ty = self.context.ptr_type(AddressSpace::default());
        let ctor_ty = self.context.struct_type(&[i32_ty.into(), ptr_ty.into(), ptr_ty.into()], false);

        let entries: Vec<_> = self
            .global_ctors
            .iter()
            .map(|f| {
                ctor_ty.const_named_struct(&[
                    i32_ty.const_int(0, false).into(),
                    f.as_global_value().as_pointer_value().into(),
                    ptr_ty.const_null().into(),
                ])
            })
            .collect();

        let array_ty = ctor_ty.array_type(entries.len() as u32);
        let array = array_ty.const_array(&entries);
        let global = self.module.add_global(array.get_type(), None, "llvm.global_ctors");
        global.set_initializer(&array);
        global.set_linkage(Linkage::Appending);
    }

    fn emit_func_decl(&mut self, f: &FuncDecl) -> Result<()> {
        let signature = f
            .signature
            .borrow()
            .clone()
            .ok_or_else(|| CodeGenError::Internal(format!("'{}' lowered before signature resolution", f.name)))?;
        let mangled = f
            .mangled_name
            .borrow()
            .clone()
            .ok_or_else(|| CodeGenError::Internal(format!("'{}' lowered before mangling", f.name)))?;

        let param_types: Vec<_> = signature.params.iter().map(|t| self.type_mapper.basic_type(*t).into()).collect();
        let has_result = !matches!(signature.result, BasicType::Void);
        let fn_type = if has_result {
            self.type_mapper.basic_type(signature.result).fn_type(&param_types, false)
        } else {
            self.context.void_type().fn_type(&param_types, false)
        };

        let function = self.module.add_function(&mangled, fn_type, Some(Linkage::External));
        for (param, arg) in f.params.iter().zip(function.get_param_iter()) {
            arg.set_name(&param.name.as_str());
        }

        let entry = self.context.append_basic_block(function, "entry");
        self.builder.position_at_end(entry);

        // Allocated up front (but not populated until the body falls
        // through or returns) so `return` statements anywhere in the body
        // can branch to it, guaranteeing a single `ret` (spec.md §4.4.5,
        // invariant 8). Attached right after `entry`; final position in
        // the block list is cosmetic and does not affect validity.
        self.exit_block = has_result.then(|| self.context.append_basic_block(function, "exit"));

        self.locals.clear();
        for (param, arg) in f.params.iter().zip(function.get_param_iter()) {
            let param_name = param.name.as_str();
            let alloca = self
                .builder
                .build_alloca(self.type_mapper.basic_type(param.ty.to_basic()), &param_name)
                .map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))?;
            self.build_store(alloca, arg)?;
            self.locals.insert(param_name, alloca);
        }

        self.return_slot = if has_result {
            let slot = self
                .builder
                .build_alloca(self.type_mapper.basic_type(signature.result), "return")
                .map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))?;
            Some(slot)
        } else {
            None
        };

        self.emit_block(&f.body)?;

        if !self.is_terminated() {
            match (self.return_slot, self.exit_block) {
                (Some(_), Some(exit)) => {
                    self.builder
                        .build_unconditional_branch(exit)
                        .map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))?;
                }
                _ => {
                    self.builder
                        .build_return(None)
                        .map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))?;
                }
            }
        }

        if let (Some(slot), Some(exit)) = (self.return_slot, self.exit_block) {
            self.builder.position_at_end(exit);
            let loaded = self
                .builder
                .build_load(self.type_mapper.basic_type(signature.result), slot, "retval")
                .map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))?;
            self.builder
                .build_return(Some(&loaded))
                .map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))?;
        }

        self.return_slot = None;
        self.exit_block = None;
        Ok(())
    }

    fn build_store(&self, ptr: PointerValue<'ctx>, value: impl BasicValue<'ctx>) -> Result<()> {
        self.builder
            .build_store(ptr, value)
            .map(|_| ())
            .map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))
    }

    // ---- statements (spec.md §4.4.6) ----

    fn emit_block(&mut self, block: &Block) -> Result<()> {
        for stmt in &block.stmts {
            self.emit_stmt(stmt)?;
            if self.is_terminated() {
                break;
            }
        }
        Ok(())
    }

    fn emit_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Decl(d) => self.emit_decl(d),
            Stmt::Expr(e) => self.emit_expr(e).map(|_| ()),
            Stmt::Block(b) => self.emit_block(b),
            Stmt::If(s) => self.emit_if(s),
            Stmt::For(s) => self.emit_for(s),
            Stmt::While(s) => self.emit_while(s),
            Stmt::Assignment(s) => self.emit_assignment(s),
            Stmt::Return(s) => self.emit_return(s),
            Stmt::Error(_) => Ok(()),
        }
    }

    fn current_function(&self) -> FunctionValue<'ctx> {
        self.builder
            .get_insert_block()
            .expect("builder has an insert point while lowering a function body")
            .get_parent()
            .expect("every basic block belongs to a function")
    }

    fn emit_if(&mut self, s: &IfStmt) -> Result<()> {
        let cond = self.emit_expr(&s.cond)?.into_int_value();
        let function = self.current_function();

        let then_bb = self.context.append_basic_block(function, "then");
        match &s.else_branch {
            None => {
                let merge_bb = self.context.append_basic_block(function, "continuationif");
                self.builder
                    .build_conditional_branch(cond, then_bb, merge_bb)
                    .map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))?;

                self.builder.position_at_end(then_bb);
                self.emit_block(&s.then_block)?;
                if !self.is_terminated() {
                    self.builder
                        .build_unconditional_branch(merge_bb)
                        .map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))?;
                }
                self.builder.position_at_end(merge_bb);
            }
            Some(else_stmt) => {
                let else_bb = self.context.append_basic_block(function, "else");
                let merge_bb = self.context.append_basic_block(function, "continuationif");
                self.builder
                    .build_conditional_branch(cond, then_bb, else_bb)
                    .map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))?;

                self.builder.position_at_end(then_bb);
                self.emit_block(&s.then_block)?;
                if !self.is_terminated() {
                    self.builder
                        .build_unconditional_branch(merge_bb)
                        .map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))?;
                }

                self.builder.position_at_end(else_bb);
                self.emit_stmt(else_stmt)?;
                if !self.is_terminated() {
                    self.builder
                        .build_unconditional_branch(merge_bb)
                        .map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))?;
                }

                self.builder.position_at_end(merge_bb);
            }
        }
        Ok(())
    }

    fn emit_while(&mut self, s: &WhileStmt) -> Result<()> {
        let function = self.current_function();
        let cond_bb = self.context.append_basic_block(function, "conditionwhile");
        let body_bb = self.context.append_basic_block(function, "bodywhile");
        let cont_bb = self.context.append_basic_block(function, "continuationwhile");

        self.builder
            .build_unconditional_branch(cond_bb)
            .map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))?;

        self.builder.position_at_end(cond_bb);
        let cond = self.emit_expr(&s.cond)?.into_int_value();
        self.builder
            .build_conditional_branch(cond, body_bb, cont_bb)
            .map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))?;

        self.builder.position_at_end(body_bb);
        self.emit_block(&s.body)?;
        if !self.is_terminated() {
            self.builder
                .build_unconditional_branch(cond_bb)
                .map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))?;
        }

        self.builder.position_at_end(cont_bb);
        Ok(())
    }

    fn emit_for(&mut self, s: &ForStmt) -> Result<()> {
        let function = self.current_function();
        if let Some(init) = &s.init {
            self.emit_stmt(init)?;
        }

        let cond_bb = self.context.append_basic_block(function, "conditionfor");
        let body_bb = self.context.append_basic_block(function, "bodyfor");
        let post_bb = self.context.append_basic_block(function, "postfor");
        let cont_bb = self.context.append_basic_block(function, "continuationfor");

        self.builder
            .build_unconditional_branch(cond_bb)
            .map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))?;

        self.builder.position_at_end(cond_bb);
        let cond = match &s.cond {
            Some(expr) => self.emit_expr(expr)?.into_int_value(),
            None => self.context.bool_type().const_int(1, false),
        };
        self.builder
            .build_conditional_branch(cond, body_bb, cont_bb)
            .map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))?;

        self.builder.position_at_end(body_bb);
        self.emit_block(&s.body)?;
        if !self.is_terminated() {
            self.builder
                .build_unconditional_branch(post_bb)
                .map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))?;
        }

        self.builder.position_at_end(post_bb);
        if let Some(post) = &s.post {
            self.emit_stmt(post)?;
        }
        self.builder
            .build_unconditional_branch(cond_bb)
            .map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))?;

        self.builder.position_at_end(cont_bb);
        Ok(())
    }

    fn emit_assignment(&mut self, s: &AssignStmt) -> Result<()> {
        let value = self.emit_expr(&s.value)?;
        let name = match &s.target {
            stoc_par::ast::Expr::Identifier(id) => self.binding_name(&id.binding)?,
            _ => return Err(CodeGenError::Internal("assignment target is not an identifier".into())),
        };
        let ptr = self.lookup(&name)?;
        self.build_store(ptr, value)
    }

    fn emit_return(&mut self, s: &ReturnStmt) -> Result<()> {
        match (&s.value, self.return_slot, self.exit_block) {
            (Some(expr), Some(slot), Some(exit)) => {
                let value = self.emit_expr(expr)?;
                self.build_store(slot, value)?;
                self.builder
                    .build_unconditional_branch(exit)
                    .map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))?;
            }
            (None, None, None) => {
                self.builder
                    .build_return(None)
                    .map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))?;
            }
            _ => return Err(CodeGenError::Internal("return statement does not match function result".into())),
        }
        Ok(())
    }

    // ---- expressions (spec.md §4.4.7, §4.4.8) ----

    fn lookup(&self, name: &str) -> Result<PointerValue<'ctx>> {
        self.locals
            .get(name)
            .or_else(|| self.globals.get(name))
            .copied()
            .ok_or_else(|| CodeGenError::UndefinedReference(name.to_string()))
    }

    fn binding_name(&self, binding: &std::cell::RefCell<Option<Binding>>) -> Result<String> {
        match &*binding.borrow() {
            Some(Binding::Variable { mangled_name })
            | Some(Binding::Parameter { mangled_name })
            | Some(Binding::Constant { mangled_name }) => Ok(mangled_name.clone()),
            Some(Binding::Function { .. }) => {
                Err(CodeGenError::Internal("function identifier used as a value".into()))
            }
            None => Err(CodeGenError::Internal("identifier lowered before binding resolution".into())),
        }
    }

    fn emit_expr(&mut self, expr: &stoc_par::ast::Expr) -> Result<BasicValueEnum<'ctx>> {
        use stoc_par::ast::Expr;
        match expr {
            Expr::Literal(lit) => self.emit_literal(&lit.value),
            Expr::Identifier(id) => {
                let name = self.binding_name(&id.binding)?;
                let ptr = self.lookup(&name)?;
                let ty = self.type_mapper.basic_type(id.decoration.ty());
                self.builder
                    .build_load(ty, ptr, "loadtmp")
                    .map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))
            }
            Expr::Unary(u) => self.emit_unary(u),
            Expr::Binary(b) => self.emit_binary(b),
            Expr::Call(c) => self.emit_call(c),
        }
    }

    fn emit_literal(&mut self, lit: &Literal) -> Result<BasicValueEnum<'ctx>> {
        Ok(match lit {
            Literal::Bool(b) => self.context.bool_type().const_int(*b as u64, false).into(),
            Literal::Int(i) => self.context.i64_type().const_int(*i as u64, true).into(),
            Literal::Float(f) => self.context.f64_type().const_float(*f).into(),
            Literal::String(sym) => self.emit_string_literal(&sym.as_str()).into(),
        })
    }

    /// A global byte array holding the literal plus its NUL terminator.
    /// With opaque pointers the global's own address already is the
    /// pointer-to-first-element an older LLVM would need a GEP for.
    fn emit_string_literal(&mut self, text: &str) -> PointerValue<'ctx> {
        let data = self.context.const_string(text.as_bytes(), true);
        let global = self.module.add_global(data.get_type(), None, "str");
        global.set_initializer(&data);
        global.set_constant(true);
        global.set_linkage(Linkage::Private);
        global.as_pointer_value()
    }

    fn get_or_create_cstring(&mut self, key: &'static str, text: &str) -> PointerValue<'ctx> {
        if let Some(ptr) = self.string_cache.get(key) {
            return *ptr;
        }
        let ptr = self.emit_string_literal(text);
        self.string_cache.insert(key, ptr);
        ptr
    }

    fn emit_unary(&mut self, u: &stoc_par::ast::UnaryExpr) -> Result<BasicValueEnum<'ctx>> {
        let operand = self.emit_expr(&u.operand)?;
        let ty = u.operand.decoration().ty();
        match (u.op, ty) {
            (UnOp::Plus, BasicType::Int) | (UnOp::Plus, BasicType::Float) => Ok(operand),
            (UnOp::Neg, BasicType::Int) => self
                .builder
                .build_int_neg(operand.into_int_value(), "negtmp")
                .map(Into::into)
                .map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string())),
            (UnOp::Neg, BasicType::Float) => self
                .builder
                .build_float_neg(operand.into_float_value(), "negtmp")
                .map(Into::into)
                .map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string())),
            (UnOp::Not, BasicType::Bool) => self
                .builder
                .build_not(operand.into_int_value(), "nottmp")
                .map(Into::into)
                .map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string())),
            _ => Err(CodeGenError::Internal(format!("unary operator not valid for type {ty}"))),
        }
    }

    fn emit_binary(&mut self, b: &stoc_par::ast::BinaryExpr) -> Result<BasicValueEnum<'ctx>> {
        let lhs = self.emit_expr(&b.left)?;
        let rhs = self.emit_expr(&b.right)?;
        // Operand types match after analysis; either side's type names
        // which lowering table applies (spec.md §4.4.7).
        let ty = b.left.decoration().ty();
        match ty {
            BasicType::Int => self.emit_binary_int(b.op, lhs.into_int_value(), rhs.into_int_value()),
            BasicType::Float => self.emit_binary_float(b.op, lhs.into_float_value(), rhs.into_float_value()),
            BasicType::Bool => self.emit_binary_bool(b.op, lhs.into_int_value(), rhs.into_int_value()),
            BasicType::String => self.emit_binary_string(b.op, lhs.into_pointer_value(), rhs.into_pointer_value()),
            _ => Err(CodeGenError::Internal(format!("binary operator not valid for type {ty}"))),
        }
    }

    fn emit_binary_int(&self, op: BinOp, lhs: inkwell::values::IntValue<'ctx>, rhs: inkwell::values::IntValue<'ctx>) -> Result<BasicValueEnum<'ctx>> {
        let b = &self.builder;
        let result = match op {
            BinOp::Add => b.build_int_add(lhs, rhs, "addtmp").map(Into::into),
            BinOp::Sub => b.build_int_sub(lhs, rhs, "subtmp").map(Into::into),
            BinOp::Mul => b.build_int_mul(lhs, rhs, "multmp").map(Into::into),
            BinOp::Div => b.build_int_signed_div(lhs, rhs, "divtmp").map(Into::into),
            BinOp::Eq => b.build_int_compare(IntPredicate::EQ, lhs, rhs, "eqtmp").map(Into::into),
            BinOp::Ne => b.build_int_compare(IntPredicate::NE, lhs, rhs, "netmp").map(Into::into),
            BinOp::Lt => b.build_int_compare(IntPredicate::SLT, lhs, rhs, "lttmp").map(Into::into),
            BinOp::Gt => b.build_int_compare(IntPredicate::SGT, lhs, rhs, "gttmp").map(Into::into),
            BinOp::Le => b.build_int_compare(IntPredicate::SLE, lhs, rhs, "letmp").map(Into::into),
            BinOp::Ge => b.build_int_compare(IntPredicate::SGE, lhs, rhs, "getmp").map(Into::into),
            BinOp::And | BinOp::Or => {
                return Err(CodeGenError::Internal("logical operator not valid for int".into()))
            }
        };
        result.map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))
    }

    fn emit_binary_float(&self, op: BinOp, lhs: inkwell::values::FloatValue<'ctx>, rhs: inkwell::values::FloatValue<'ctx>) -> Result<BasicValueEnum<'ctx>> {
        let b = &self.builder;
        let result = match op {
            BinOp::Add => b.build_float_add(lhs, rhs, "addtmp").map(Into::into),
            BinOp::Sub => b.build_float_sub(lhs, rhs, "subtmp").map(Into::into),
            BinOp::Mul => b.build_float_mul(lhs, rhs, "multmp").map(Into::into),
            BinOp::Div => b.build_float_div(lhs, rhs, "divtmp").map(Into::into),
            BinOp::Eq => b.build_float_compare(FloatPredicate::OEQ, lhs, rhs, "eqtmp").map(Into::into),
            BinOp::Ne => b.build_float_compare(FloatPredicate::ONE, lhs, rhs, "netmp").map(Into::into),
            BinOp::Lt => b.build_float_compare(FloatPredicate::OLT, lhs, rhs, "lttmp").map(Into::into),
            BinOp::Gt => b.build_float_compare(FloatPredicate::OGT, lhs, rhs, "gttmp").map(Into::into),
            BinOp::Le => b.build_float_compare(FloatPredicate::OLE, lhs, rhs, "letmp").map(Into::into),
            BinOp::Ge => b.build_float_compare(FloatPredicate::OGE, lhs, rhs, "getmp").map(Into::into),
            BinOp::And | BinOp::Or => {
                return Err(CodeGenError::Internal("logical operator not valid for float".into()))
            }
        };
        result.map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))
    }

    fn emit_binary_bool(&self, op: BinOp, lhs: inkwell::values::IntValue<'ctx>, rhs: inkwell::values::IntValue<'ctx>) -> Result<BasicValueEnum<'ctx>> {
        let b = &self.builder;
        let result = match op {
            BinOp::Eq => b.build_int_compare(IntPredicate::EQ, lhs, rhs, "eqtmp").map(Into::into),
            BinOp::Ne => b.build_int_compare(IntPredicate::NE, lhs, rhs, "netmp").map(Into::into),
            BinOp::And => b.build_and(lhs, rhs, "andtmp").map(Into::into),
            BinOp::Or => b.build_or(lhs, rhs, "ortmp").map(Into::into),
            _ => return Err(CodeGenError::Internal("arithmetic operator not valid for bool".into())),
        };
        result.map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))
    }

    fn emit_binary_string(&mut self, op: BinOp, lhs: PointerValue<'ctx>, rhs: PointerValue<'ctx>) -> Result<BasicValueEnum<'ctx>> {
        if !matches!(op, BinOp::Eq | BinOp::Ne) {
            return Err(CodeGenError::Internal("only ==/!= are valid for string".into()));
        }
        let strcmp = self
            .module
            .get_function("strcmp")
            .ok_or_else(|| CodeGenError::Internal("strcmp not declared".into()))?;
        let call = self
            .builder
            .build_call(strcmp, &[lhs.into(), rhs.into()], "strcmptmp")
            .map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))?;
        let cmp_result = call
            .try_as_basic_value()
            .left()
            .ok_or_else(|| CodeGenError::Internal("strcmp produced no value".into()))?
            .into_int_value();
        let zero = self.context.i64_type().const_zero();
        let predicate = if matches!(op, BinOp::Eq) { IntPredicate::EQ } else { IntPredicate::NE };
        self.builder
            .build_int_compare(predicate, cmp_result, zero, "strcmptest")
            .map(Into::into)
            .map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))
    }

    // ---- calls, including the `print`/`println` builtins (spec.md §4.4.8) ----

    fn emit_call(&mut self, call: &CallExpr) -> Result<BasicValueEnum<'ctx>> {
        let name = call.callee.as_str();
        match name.as_str() {
            "print" => self.emit_print_call(&call.args[0], false),
            "println" => self.emit_print_call(&call.args[0], true),
            _ => self.emit_user_call(call),
        }
    }

    fn emit_user_call(&mut self, call: &CallExpr) -> Result<BasicValueEnum<'ctx>> {
        let mangled = match &*call.binding.borrow() {
            Some(Binding::Function { mangled_name, .. }) => mangled_name.clone(),
            _ => return Err(CodeGenError::Internal(format!("call to '{}' missing resolved binding", call.callee))),
        };
        let callee = self
            .module
            .get_function(&mangled)
            .ok_or_else(|| CodeGenError::UndefinedReference(mangled.clone()))?;

        let mut args = Vec::with_capacity(call.args.len());
        for arg in &call.args {
            args.push(self.emit_expr(arg)?.into());
        }
        let call_val = self
            .builder
            .build_call(callee, &args, "calltmp")
            .map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))?;

        Ok(call_val
            .try_as_basic_value()
            .left()
            .unwrap_or_else(|| self.context.i32_type().const_zero().into()))
    }

    /// Selects a `printf` format string by the argument's decorated type
    /// and, for `bool`, selects between literal `"true"`/`"false"`
    /// strings at runtime (spec.md §4.4.8).
    fn emit_print_call(&mut self, arg: &stoc_par::ast::Expr, newline: bool) -> Result<BasicValueEnum<'ctx>> {
        let ty = arg.decoration().ty();
        let (key, text): (&'static str, &'static str) = match (ty, newline) {
            (BasicType::Int, false) => ("fmt.d", "%d"),
            (BasicType::Int, true) => ("fmt.d.nl", "%d\n"),
            (BasicType::Float, false) => ("fmt.f", "%f"),
            (BasicType::Float, true) => ("fmt.f.nl", "%f\n"),
            (BasicType::Bool, false) | (BasicType::String, false) => ("fmt.s", "%s"),
            (BasicType::Bool, true) | (BasicType::String, true) => ("fmt.s.nl", "%s\n"),
            _ => return Err(CodeGenError::Internal(format!("print/println not supported for type {ty}"))),
        };
        let fmt_ptr = self.get_or_create_cstring(key, text);
        let value = self.emit_expr(arg)?;

        let printed_value: BasicValueEnum = if matches!(ty, BasicType::Bool) {
            let true_ptr = self.get_or_create_cstring("str.true", "true");
            let false_ptr = self.get_or_create_cstring("str.false", "false");
            let is_true = self
                .builder
                .build_int_compare(IntPredicate::NE, value.into_int_value(), self.context.bool_type().const_zero(), "booltest")
                .map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))?;
            self.builder
                .build_select(is_true, true_ptr, false_ptr, "boolstr")
                .map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))?
        } else {
            value
        };

        let printf = self
            .module
            .get_function("printf")
            .ok_or_else(|| CodeGenError::Internal("printf not declared".into()))?;
        let call = self
            .builder
            .build_call(printf, &[fmt_ptr.into(), printed_value.into()], "calltmp")
            .map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))?;

        Ok(call
            .try_as_basic_value()
            .left()
            .unwrap_or_else(|| self.context.i32_type().const_zero().into()))
    }
}

fn default_data_layout(triple: &TargetTriple) -> Option<String> {
    Target::initialize_native(&inkwell::targets::InitializationConfig::default()).ok()?;
    let target = Target::from_triple(triple).ok()?;
    let machine = target.create_target_machine(
        triple,
        "generic",
        "",
        OptimizationLevel::Default,
        RelocMode::Default,
        CodeModel::Default,
    )?;
    Some(machine.get_target_data().get_data_layout().as_str().to_string_lossy().into_owned())
}
