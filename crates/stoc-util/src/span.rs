//! Source location tracking: byte spans and the source file aggregate (spec.md §3.5).

use std::fmt;
use std::path::{Path, PathBuf};

/// A half-open byte range into a [`SourceFile`], plus the 1-based line/column
/// of its first byte.
///
/// Spans are cheap `Copy` values threaded through every token and tree node
/// so diagnostics can point back at source text without borrowing it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub const DUMMY: Span = Span { start: 0, end: 0, line: 0, column: 0 };

    pub const fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self { start, end, line, column }
    }

    /// Span covering from `self`'s start through `other`'s end, keeping
    /// `self`'s line/column as the reported location.
    pub fn to(&self, other: Span) -> Span {
        Span::new(self.start, other.end, self.line, self.column)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "l{}:c{}", self.line, self.column)
    }
}

/// An immutable source buffer plus derived path metadata (spec.md §3.5).
///
/// Every later phase borrows positions into `source`; nothing mutates it
/// after construction.
#[derive(Debug, Clone)]
pub struct SourceFile {
    path: PathBuf,
    source: String,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, source: String) -> Self {
        Self { path: path.into(), source }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name used in diagnostics (spec.md §6.2's `<filename:...>` prefix).
    pub fn filename(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.to_string_lossy().into_owned())
    }

    pub fn directory(&self) -> Option<&Path> {
        self.path.parent()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }
}
