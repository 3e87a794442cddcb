//! Stack-based virtual machine.
//!
//! Executes one [`Chunk`] from offset zero until `RETURN`, which pops the final value
//! and hands it back. Every stack access is checked: overflow, underflow and malformed
//! bytecode surface as [`RuntimeError`]s instead of reading past the stack.

use std::io;

use crate::bytecode::chunk::Chunk;
use crate::bytecode::disassembler::{disassemble_instruction, trace_stack};
use crate::bytecode::instruction::OpCode;
use crate::bytecode::value::Value;
use crate::error::{BytecodeError, RuntimeError};
use crate::span::Span;

/// Maximum number of values on the stack.
pub const STACK_MAX: usize = 256;

/// Result type for VM operations.
pub type VmResult<T> = Result<T, RuntimeError>;

/// The virtual machine.
#[derive(Debug)]
pub struct Vm {
    stack: Vec<Value>,
    ip: usize,
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}

impl Vm {
    /// Create a new VM.
    pub fn new() -> Self {
        Self {
            stack: Vec::with_capacity(STACK_MAX),
            ip: 0,
        }
    }

    /// Execute `chunk` and return the value popped by its `RETURN`.
    pub fn interpret(&mut self, chunk: &Chunk) -> VmResult<Value> {
        self.run(chunk, None)
    }

    /// Like [`Vm::interpret`], but writes the stack and the disassembled instruction to
    /// `trace` before every instruction.
    pub fn interpret_traced(&mut self, chunk: &Chunk, trace: &mut dyn io::Write) -> VmResult<Value> {
        self.run(chunk, Some(trace))
    }

    /// Current stack contents, bottom first.
    pub fn stack(&self) -> &[Value] {
        &self.stack
    }

    fn run(&mut self, chunk: &Chunk, trace: Option<&mut dyn io::Write>) -> VmResult<Value> {
        self.stack.clear();
        self.ip = 0;

        let result = self.execute(chunk, trace);
        if let Err(err) = &result {
            tracing::debug!(line = err.line(), error = %err, "runtime error");
            self.stack.clear();
        }
        result
    }

    /// Main execution loop.
    fn execute(&mut self, chunk: &Chunk, mut trace: Option<&mut dyn io::Write>) -> VmResult<Value> {
        loop {
            let offset = self.ip;
            if offset >= chunk.len() {
                let line = chunk.line_at(offset.saturating_sub(1));
                return Err(RuntimeError::missing_return(Span::at_line(line)));
            }

            if let Some(out) = trace.as_deref_mut() {
                let mut listing = String::new();
                disassemble_instruction(chunk, offset, &mut listing);
                writeln!(out, "{}", trace_stack(&self.stack))?;
                out.write_all(listing.as_bytes())?;
            }

            let span = Span::at_line(chunk.line_at(offset));
            let (opcode, width) = chunk
                .instruction_at(offset)
                .map_err(|err| RuntimeError::bytecode(err, span))?;
            self.ip += width;

            tracing::trace!(offset, op = opcode.mnemonic(), depth = self.stack.len());

            match opcode {
                OpCode::Constant => {
                    let index = chunk.read_byte(offset + 1).ok_or_else(|| {
                        RuntimeError::bytecode(BytecodeError::Truncated { opcode, offset }, span)
                    })?;
                    let value = chunk
                        .constant(index)
                        .ok_or_else(|| RuntimeError::invalid_constant(index, span))?;
                    self.push(value, span)?;
                }

                OpCode::Negate => {
                    let value = self.pop(span)?;
                    self.push(-value, span)?;
                }

                OpCode::Add => self.binary_op(span, |a, b| a + b)?,
                OpCode::Subtract => self.binary_op(span, |a, b| a - b)?,
                OpCode::Multiply => self.binary_op(span, |a, b| a * b)?,

                OpCode::Divide => {
                    let b = self.pop(span)?;
                    let a = self.pop(span)?;
                    if b.is_zero() {
                        return Err(RuntimeError::division_by_zero(span));
                    }
                    self.push(a / b, span)?;
                }

                OpCode::Return => return self.pop(span),
            }
        }
    }

    fn push(&mut self, value: Value, span: Span) -> VmResult<()> {
        if self.stack.len() >= STACK_MAX {
            return Err(RuntimeError::stack_overflow(span));
        }
        self.stack.push(value);
        Ok(())
    }

    fn pop(&mut self, span: Span) -> VmResult<Value> {
        self.stack
            .pop()
            .ok_or_else(|| RuntimeError::stack_underflow(span))
    }

    /// Pops the right operand first, then the left one.
    fn binary_op<F>(&mut self, span: Span, op: F) -> VmResult<()>
    where
        F: FnOnce(Value, Value) -> Value,
    {
        let b = self.pop(span)?;
        let a = self.pop(span)?;
        self.push(op(a, b), span)
    }
}
