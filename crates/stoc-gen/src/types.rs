//! Mapping from [`BasicType`] to LLVM IR types (spec.md §4.4.2).

use inkwell::context::Context;
use inkwell::types::BasicTypeEnum;
use inkwell::values::BasicValueEnum;
use inkwell::AddressSpace;

use stoc_util::BasicType;

/// Maps Stoc's four scalar types onto LLVM types: `bool`->i1, `int`->i64,
/// `float`->double, `string`->an opaque pointer to the first byte of a
/// NUL-terminated byte buffer. `void` only ever appears as a function
/// result and has no [`BasicTypeEnum`] representation.
pub struct TypeMapper<'ctx> {
    context: &'ctx Context,
}

impl<'ctx> TypeMapper<'ctx> {
    pub fn new(context: &'ctx Context) -> Self {
        Self { context }
    }

    pub fn basic_type(&self, ty: BasicType) -> BasicTypeEnum<'ctx> {
        match ty {
            BasicType::Bool => self.context.bool_type().into(),
            BasicType::Int => self.context.i64_type().into(),
            BasicType::Float => self.context.f64_type().into(),
            BasicType::String => self.context.ptr_type(AddressSpace::default()).into(),
            BasicType::Void | BasicType::Invalid => {
                unreachable!("void/invalid never name a value's storage type")
            }
        }
    }

    /// The zero value stored in a global before its `_global_var_init`
    /// constructor runs (spec.md §4.4.3).
    pub fn zero_value(&self, ty: BasicType) -> BasicValueEnum<'ctx> {
        match ty {
            BasicType::Bool => self.context.bool_type().const_zero().into(),
            BasicType::Int => self.context.i64_type().const_zero().into(),
            BasicType::Float => self.context.f64_type().const_zero().into(),
            BasicType::String => self
                .context
                .ptr_type(AddressSpace::default())
                .const_null()
                .into(),
            BasicType::Void | BasicType::Invalid => {
                unreachable!("void/invalid never name a value's storage type")
            }
        }
    }
}
