//! cloxvm: a single-pass bytecode compiler and stack virtual machine for arithmetic
//! expressions.
//!
//! Source text is scanned on demand, compiled straight into a [`Chunk`] by a Pratt
//! parser and executed by [`Vm`]. The entry points here tie the phases together and
//! report outcomes the way the `clox` binary does.

#![allow(clippy::result_large_err)]
#![allow(clippy::new_without_default)]

pub mod bytecode;
pub mod config;
pub mod error;
pub mod lexer;
pub mod repl;
pub mod span;

use std::io::{self, Write};

use colored::Colorize;

pub use bytecode::{Chunk, Value, Vm};
pub use config::Config;
use error::{CloxError, CompileError};

/// Outcome of interpreting one piece of source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpretResult {
    Ok,
    CompileError,
    RuntimeError,
}

impl InterpretResult {
    /// Process exit status for this outcome (sysexits).
    pub fn exit_code(self) -> i32 {
        match self {
            InterpretResult::Ok => 0,
            InterpretResult::CompileError => 65,
            InterpretResult::RuntimeError => 70,
        }
    }
}

/// Compile source code into a fresh chunk.
pub fn compile(source: &str) -> Result<Chunk, CompileError> {
    let mut chunk = Chunk::new();
    bytecode::compile(source, &mut chunk)?;
    Ok(chunk)
}

/// Compile source code and return its disassembly.
pub fn disassemble(source: &str) -> Result<String, CompileError> {
    let chunk = compile(source)?;
    Ok(bytecode::disassemble_chunk(&chunk, "code"))
}

/// Compile and execute source code, returning the result value.
///
/// Debug listings and traces requested by `config` are written to `out`.
pub fn run_with_config(source: &str, config: &Config, out: &mut dyn Write) -> Result<Value, CloxError> {
    let chunk = compile(source)?;

    if config.print_code {
        out.write_all(bytecode::disassemble_chunk(&chunk, "code").as_bytes())?;
    }

    let mut vm = Vm::new();
    let value = if config.trace_execution {
        vm.interpret_traced(&chunk, out)?
    } else {
        vm.interpret(&chunk)?
    };
    Ok(value)
}

/// Interpret source code with the environment's configuration, printing the result to
/// stdout and diagnostics to stderr.
pub fn interpret(source: &str) -> InterpretResult {
    let config = Config::from_env();
    let stdout = io::stdout();
    let stderr = io::stderr();
    interpret_with(source, &config, &mut stdout.lock(), &mut stderr.lock())
}

/// Interpret source code, printing the result to `out` and diagnostics to `err`.
pub fn interpret_with(
    source: &str,
    config: &Config,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> InterpretResult {
    let outcome = run_with_config(source, config, out).and_then(|value| {
        writeln!(out, "{}", value)?;
        Ok(())
    });

    match outcome {
        Ok(()) => InterpretResult::Ok,
        Err(CloxError::Compile(e)) => {
            let _ = writeln!(err, "{}", e.to_string().red());
            InterpretResult::CompileError
        }
        Err(CloxError::Runtime(e)) => {
            let _ = writeln!(err, "{}", e.to_string().red());
            let _ = writeln!(err, "[line {}] in script", e.line());
            InterpretResult::RuntimeError
        }
        Err(CloxError::Io(e)) => {
            let _ = writeln!(err, "{}", format!("IO error: {}", e).red());
            InterpretResult::RuntimeError
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn run(source: &str, config: Config) -> (InterpretResult, String, String) {
        colored::control::set_override(false);
        let mut out = Vec::new();
        let mut err = Vec::new();
        let result = interpret_with(source, &config, &mut out, &mut err);
        (
            result,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn test_prints_result() {
        let (result, out, err) = run("1 + 2", Config::default());
        assert_eq!(result, InterpretResult::Ok);
        assert_eq!(out, "3\n");
        assert_eq!(err, "");
    }

    #[test]
    fn test_compile_error() {
        let (result, out, err) = run("1 +", Config::default());
        assert_eq!(result, InterpretResult::CompileError);
        assert_eq!(result.exit_code(), 65);
        assert_eq!(out, "");
        assert_eq!(err, "[line 1] Error at end: Expect expression.\n");
    }

    #[test]
    fn test_runtime_error() {
        let (result, out, err) = run("1 / 0", Config::default());
        assert_eq!(result, InterpretResult::RuntimeError);
        assert_eq!(result.exit_code(), 70);
        assert_eq!(out, "");
        assert_eq!(err, "Division by zero.\n[line 1] in script\n");
    }

    #[test]
    fn test_deep_nesting_is_a_compile_error() {
        let source = format!("{}1", "-".repeat(1_000_000));
        let (result, out, err) = run(&source, Config::default());
        assert_eq!(result, InterpretResult::CompileError);
        assert_eq!(out, "");
        assert_eq!(err, "[line 1] Error at '-': Expression nested too deeply.\n");
    }

    #[test]
    fn test_print_code() {
        let config = Config::default().with_print_code(true);
        let (result, out, _) = run("-2", config);
        assert_eq!(result, InterpretResult::Ok);
        assert_eq!(
            out,
            "== code ==\n\
             0000    1 OP_CONSTANT         0 '2'\n\
             0002    | OP_NEGATE\n\
             0003    | OP_RETURN\n\
             -2\n"
        );
    }

    #[test]
    fn test_trace_execution() {
        let config = Config::default().with_trace_execution(true);
        let (result, out, _) = run("7", config);
        assert_eq!(result, InterpretResult::Ok);
        assert_eq!(
            out,
            "stack: \n\
             0000    1 OP_CONSTANT         0 '7'\nstack: [ 7 ]\n\
             0002    | OP_RETURN\n\
             7\n"
        );
    }

    #[test]
    fn test_disassemble() {
        let listing = disassemble("1 * 2").unwrap();
        assert!(listing.starts_with("== code ==\n"));
        assert_eq!(listing.lines().count(), 5);
        assert!(disassemble("(").is_err());
    }
}
