//! stoc-util - core utilities shared by every phase of the stoc compiler.
//!
//! Provides the source-position model ([`Span`], [`SourceFile`]), identifier
//! interning ([`Symbol`]), and the diagnostic reporting infrastructure
//! ([`Handler`], [`Diagnostic`]) that the lexer, parser, semantic analyzer,
//! and IR emitter all build on.

mod diagnostic;
mod span;
mod symbol;
mod types;

pub use diagnostic::{Diagnostic, Handler, Level, Phase};
pub use span::{SourceFile, Span};
pub use symbol::Symbol;
pub use types::{BasicType, Signature, ValueCategory};
