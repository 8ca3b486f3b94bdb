//! stocc - the command-line driver binary wiring the stoc compiler phases
//! together (spec.md §5, §6.1), grounded on `faxc-drv`'s `Config`/`Session`
//! split and on `faxt`'s `clap` derive CLI style (both from the teacher
//! codebase).

mod ast_printer;

use std::path::PathBuf;

use clap::Parser as ClapParser;
use thiserror::Error;

use stoc_gen::{CodeGenError, Linker, LlvmBackend};
use stoc_par::Parser as StocParser;
use stoc_sem::Analyzer;
use stoc_util::{Diagnostic, Handler, Phase, SourceFile};

/// Command-line surface (spec.md §6.1). A positional input path, an
/// optional positional output path, and three mutually-compatible dump
/// flags, each of which stops the pipeline before producing an executable.
#[derive(ClapParser, Debug)]
#[command(name = "stocc")]
#[command(author, version, about = "Ahead-of-time compiler for the stoc language", long_about = None)]
pub struct Cli {
    /// Path to a `.stoc` source file.
    pub input: PathBuf,

    /// Path to write the linked executable (defaults to `a.out`).
    pub output: Option<PathBuf>,

    /// Print the token stream and stop before parsing.
    #[arg(long)]
    pub tokens_dump: bool,

    /// Print the decorated tree and stop before code generation.
    #[arg(long)]
    pub ast_dump: bool,

    /// Print the emitted LLVM IR and stop before linking.
    #[arg(long)]
    pub emit_llvm: bool,
}

/// Errors surfaced at the driver boundary. `main.rs` wraps these in
/// `anyhow` and exits 1, matching `faxc-drv::CompileError`'s role.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("could not read '{0}': {1}")]
    Io(PathBuf, std::io::Error),
    #[error("compilation failed")]
    CompilationFailed,
}

/// Runs one compilation end to end, at the `anyhow`-wrapped boundary
/// `main.rs` prints and exits 1 on, matching `faxc-drv`'s use of `anyhow`
/// at the binary boundary.
pub fn run(cli: &Cli) -> anyhow::Result<()> {
    compile(cli).map_err(Into::into)
}

/// Read, lex, parse, analyze, emit, (optionally) link. Stops immediately
/// after any phase whose [`Handler`] reports an error, per spec.md §5's
/// sequential pipeline and §7's "driver stops if the previous phase's
/// error flag is set" policy.
fn compile(cli: &Cli) -> Result<(), DriverError> {
    let source = std::fs::read_to_string(&cli.input).map_err(|e| DriverError::Io(cli.input.clone(), e))?;
    let file = SourceFile::new(cli.input.clone(), source);
    let mut handler = Handler::new(file.filename());

    let tokens = stoc_lex::tokenize(file.source(), &mut handler);
    if cli.tokens_dump {
        print_tokens(&tokens);
        return finish(&handler);
    }
    if handler.has_errors() {
        return Err(DriverError::CompilationFailed);
    }

    let mut parser = StocParser::new(tokens, &mut handler);
    let program = parser.parse_program();
    if handler.has_errors() {
        return Err(DriverError::CompilationFailed);
    }

    let mut analyzer = Analyzer::new(&mut handler);
    analyzer.analyze(&program);
    if cli.ast_dump {
        ast_printer::print_program(&program);
        return finish(&handler);
    }
    if handler.has_errors() {
        return Err(DriverError::CompilationFailed);
    }

    let context = inkwell::context::Context::create();
    let mut backend = match LlvmBackend::new(&context, &file.filename()) {
        Ok(backend) => backend,
        Err(e) => {
            report_codegen_error(&mut handler, e);
            return Err(DriverError::CompilationFailed);
        }
    };
    if let Err(e) = backend.emit_program(&program) {
        report_codegen_error(&mut handler, e);
        return Err(DriverError::CompilationFailed);
    }

    if cli.emit_llvm {
        print!("{}", backend.module().print_to_string());
        return Ok(());
    }

    let output = cli.output.clone().unwrap_or_else(|| PathBuf::from("a.out"));
    let bitcode = backend.module().write_bitcode_to_memory();
    let linker = Linker::new();
    if let Err(e) = linker.link_bitcode(bitcode.as_slice(), &output) {
        report_codegen_error(&mut handler, e);
        return Err(DriverError::CompilationFailed);
    }

    finish(&handler)
}

fn finish(handler: &Handler) -> Result<(), DriverError> {
    if handler.has_errors() {
        Err(DriverError::CompilationFailed)
    } else {
        Ok(())
    }
}

fn report_codegen_error(handler: &mut Handler, err: CodeGenError) {
    handler.report(Diagnostic::global_error(Phase::CodeGen, err.to_string()));
}

fn print_tokens(tokens: &[stoc_lex::Token]) {
    for token in tokens {
        println!("{}\t{}\t{}\t{}", token.span.line, token.span.column, token.lexeme, token.kind.name());
    }
}
