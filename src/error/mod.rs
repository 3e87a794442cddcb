//! Error types for all compilation and execution phases.

use std::fmt;

use crate::bytecode::instruction::OpCode;
use crate::span::Span;
use thiserror::Error;

/// Lexer errors.
///
/// The display text is the message the compiler reports for the offending token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexerError {
    #[error("Unexpected character.")]
    UnexpectedChar(char, Span),

    #[error("Unterminated string.")]
    UnterminatedString(Span),
}

impl LexerError {
    pub fn unexpected_char(c: char, span: Span) -> Self {
        Self::UnexpectedChar(c, span)
    }

    pub fn unterminated_string(span: Span) -> Self {
        Self::UnterminatedString(span)
    }

    pub fn span(&self) -> Span {
        match self {
            Self::UnexpectedChar(_, span) => *span,
            Self::UnterminatedString(span) => *span,
        }
    }
}

/// Where a compile diagnostic points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorLocation {
    /// At a concrete token, carrying its lexeme.
    At(String),
    /// At the end of the input.
    End,
    /// At a token the scanner could not produce; the message says why.
    Lexical,
}

/// A single compile-time diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub location: ErrorLocation,
    pub message: String,
}

impl Diagnostic {
    pub fn new(line: usize, location: ErrorLocation, message: impl Into<String>) -> Self {
        Self {
            line,
            location,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[line {}] Error", self.line)?;
        match &self.location {
            ErrorLocation::At(lexeme) => write!(f, " at '{}'", lexeme)?,
            ErrorLocation::End => write!(f, " at end")?,
            ErrorLocation::Lexical => {}
        }
        write!(f, ": {}", self.message)
    }
}

/// Bytecode compilation failure.
///
/// Holds every diagnostic reported during the run. Panic mode keeps this to a single
/// entry for the current grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    pub diagnostics: Vec<Diagnostic>,
}

impl CompileError {
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, diagnostic) in self.diagnostics.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", diagnostic)?;
        }
        Ok(())
    }
}

impl std::error::Error for CompileError {}

/// Faults found while decoding instruction bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BytecodeError {
    #[error("Unknown opcode {byte} at offset {offset}")]
    UnknownOpcode { byte: u8, offset: usize },

    #[error("Truncated {opcode:?} instruction at offset {offset}")]
    Truncated { opcode: OpCode, offset: usize },

    #[error("Offset {0} is past the end of the chunk")]
    OutOfBounds(usize),
}

/// Runtime errors raised by the virtual machine.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Stack overflow.")]
    StackOverflow(Span),

    #[error("Stack underflow.")]
    StackUnderflow(Span),

    #[error("Division by zero.")]
    DivisionByZero(Span),

    #[error("Constant index {index} is out of range.")]
    InvalidConstant { index: u8, span: Span },

    #[error("{error}")]
    Bytecode { error: BytecodeError, span: Span },

    #[error("Reached the end of the chunk without a return.")]
    MissingReturn(Span),

    #[error("Failed to write trace output: {0}")]
    Io(#[from] std::io::Error),
}

impl RuntimeError {
    pub fn stack_overflow(span: Span) -> Self {
        Self::StackOverflow(span)
    }

    pub fn stack_underflow(span: Span) -> Self {
        Self::StackUnderflow(span)
    }

    pub fn division_by_zero(span: Span) -> Self {
        Self::DivisionByZero(span)
    }

    pub fn invalid_constant(index: u8, span: Span) -> Self {
        Self::InvalidConstant { index, span }
    }

    pub fn bytecode(error: BytecodeError, span: Span) -> Self {
        Self::Bytecode { error, span }
    }

    pub fn missing_return(span: Span) -> Self {
        Self::MissingReturn(span)
    }

    pub fn span(&self) -> Span {
        match self {
            Self::StackOverflow(span) => *span,
            Self::StackUnderflow(span) => *span,
            Self::DivisionByZero(span) => *span,
            Self::InvalidConstant { span, .. } => *span,
            Self::Bytecode { span, .. } => *span,
            Self::MissingReturn(span) => *span,
            Self::Io(_) => Span::default(),
        }
    }

    /// Source line of the faulting instruction.
    pub fn line(&self) -> usize {
        self.span().line
    }
}

/// A unified error type for all phases.
#[derive(Debug, Error)]
pub enum CloxError {
    #[error("{0}")]
    Compile(#[from] CompileError),

    #[error("{0}")]
    Runtime(#[from] RuntimeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_at_token() {
        let diagnostic = Diagnostic::new(3, ErrorLocation::At("+".into()), "Expect expression.");
        assert_eq!(
            diagnostic.to_string(),
            "[line 3] Error at '+': Expect expression."
        );
    }

    #[test]
    fn test_diagnostic_at_end() {
        let diagnostic = Diagnostic::new(1, ErrorLocation::End, "Expect expression.");
        assert_eq!(diagnostic.to_string(), "[line 1] Error at end: Expect expression.");
    }

    #[test]
    fn test_diagnostic_lexical() {
        let error = LexerError::unexpected_char('#', Span::at_line(2));
        let diagnostic = Diagnostic::new(2, ErrorLocation::Lexical, error.to_string());
        assert_eq!(diagnostic.to_string(), "[line 2] Error: Unexpected character.");
    }

    #[test]
    fn test_runtime_error_line() {
        let error = RuntimeError::division_by_zero(Span::at_line(7));
        assert_eq!(error.line(), 7);
        assert_eq!(error.to_string(), "Division by zero.");
    }
}
