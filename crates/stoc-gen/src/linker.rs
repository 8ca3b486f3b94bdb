//! Invokes `llc` and a system C compiler to turn emitted IR into an
//! executable (spec.md §4.4.9, §6.5).
//!
//! The original pipeline this is grounded on writes `output.bc`/`output.o`
//! next to the working directory and never removes them; every temporary
//! file here is cleaned up on both the success and the error path.

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

use crate::error::{CodeGenError, Result};

pub struct Linker {
    /// Name of the system C compiler invoked for the final link step.
    cc: String,
}

impl Linker {
    pub fn new() -> Self {
        let cc = if cfg!(target_os = "macos") { "cc" } else { "gcc" };
        Self { cc: cc.to_string() }
    }

    /// Writes `bitcode` to a scratch directory, runs `llc -filetype=obj`,
    /// then links the resulting object file into `output` with the
    /// system C compiler (for `printf`/`strcmp`). The scratch directory
    /// and everything in it is removed once this returns, success or not.
    pub fn link_bitcode(&self, bitcode: &[u8], output: &Path) -> Result<()> {
        let scratch = TempDir::new().map_err(|e| CodeGenError::LinkFailed(e.to_string()))?;
        let bc_path = scratch.path().join("output.bc");
        let obj_path = scratch.path().join("output.o");

        std::fs::write(&bc_path, bitcode).map_err(|e| CodeGenError::LinkFailed(e.to_string()))?;
        self.run_llc(&bc_path, &obj_path)?;
        self.run_cc(&obj_path, output)?;
        Ok(())
        // `scratch` is dropped here, removing output.bc/output.o regardless
        // of which step above returned an error (the `?`s above still ran
        // the drop via early return, since `scratch` owns the directory).
    }

    fn run_llc(&self, bc_path: &Path, obj_path: &Path) -> Result<()> {
        let status = Command::new("llc")
            .arg(bc_path)
            .arg("-filetype=obj")
            .arg("-addrsig")
            .arg("-o")
            .arg(obj_path)
            .status()
            .map_err(|e| CodeGenError::LinkFailed(format!("could not invoke llc: {e}")))?;
        if !status.success() {
            return Err(CodeGenError::LinkFailed(format!("llc exited with {status}")));
        }
        Ok(())
    }

    fn run_cc(&self, obj_path: &Path, output: &Path) -> Result<()> {
        let status = Command::new(&self.cc)
            .arg("-no-pie")
            .arg(obj_path)
            .arg("-o")
            .arg(output)
            .status()
            .map_err(|e| CodeGenError::LinkFailed(format!("could not invoke {}: {e}", self.cc)))?;
        if !status.success() {
            return Err(CodeGenError::LinkFailed(format!("{} exited with {status}", self.cc)));
        }
        Ok(())
    }
}

impl Default for Linker {
    fn default() -> Self {
        Self::new()
    }
}
