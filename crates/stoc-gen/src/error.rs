//! Error types for LLVM code generation (spec.md §4.4, §7).

use thiserror::Error;

/// Errors raised while lowering a checked tree to LLVM IR.
///
/// Every variant here corresponds to a condition the semantic analyzer is
/// supposed to have already ruled out for a well-formed program. A
/// well-typed tree never triggers one; seeing one means analysis let
/// something through, or the tree was handed to code generation without
/// first running analysis. [`CodeGenError::Internal`] is the catch-all
/// "this should be unreachable" sentinel (spec.md §7): it unwinds out of a
/// deeply nested lowering call via `?` without a panic, so the driver can
/// report a diagnostic and move on to the next top-level declaration
/// instead of aborting the whole compilation.
#[derive(Debug, Error)]
pub enum CodeGenError {
    /// A name the analyzer should have bound had no corresponding LLVM
    /// value or function registered at code generation time.
    #[error("undefined reference to '{0}' during code generation")]
    UndefinedReference(String),

    /// Module verification failed after emitting every declaration.
    #[error("module verification failed: {0}")]
    VerificationFailed(String),

    /// An `inkwell` builder call returned an error.
    #[error("LLVM operation failed: {0}")]
    LlvmOperationFailed(String),

    /// `llc` or the system C compiler could not be invoked, or exited
    /// with a non-zero status.
    #[error("linking failed: {0}")]
    LinkFailed(String),

    /// A condition that a well-typed tree can never produce (e.g. a
    /// binary operator applied to a type the analyzer should have
    /// rejected already).
    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, CodeGenError>;
