//! Bytecode disassembler for debugging.

use crate::bytecode::chunk::Chunk;
use crate::bytecode::instruction::OpCode;
use crate::bytecode::value::Value;
use crate::error::BytecodeError;
use std::fmt::Write;

/// Disassemble a whole chunk under a `== name ==` header.
pub fn disassemble_chunk(chunk: &Chunk, name: &str) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "== {} ==", name);

    let mut offset = 0;
    while offset < chunk.len() {
        offset = disassemble_instruction(chunk, offset, &mut output);
    }

    output
}

/// Disassemble a single instruction, returning the offset of the next one.
pub fn disassemble_instruction(chunk: &Chunk, offset: usize, output: &mut String) -> usize {
    let _ = write!(output, "{:04} ", offset);

    // Print line number (or | if same as previous)
    let line = chunk.line_at(offset);
    if offset > 0 && line == chunk.line_at(offset - 1) {
        output.push_str("   | ");
    } else {
        let _ = write!(output, "{:4} ", line);
    }

    match chunk.instruction_at(offset) {
        Ok((OpCode::Constant, width)) => {
            constant_instruction(chunk, offset, output);
            offset + width
        }
        Ok((op, width)) => {
            let _ = writeln!(output, "{}", op.mnemonic());
            offset + width
        }
        Err(BytecodeError::UnknownOpcode { byte, .. }) => {
            let _ = writeln!(output, "Unknown opcode {}", byte);
            offset + 1
        }
        Err(BytecodeError::Truncated { opcode, .. }) => {
            let _ = writeln!(output, "{} <truncated>", opcode.mnemonic());
            chunk.len()
        }
        Err(BytecodeError::OutOfBounds(_)) => {
            output.push('\n');
            chunk.len()
        }
    }
}

fn constant_instruction(chunk: &Chunk, offset: usize, output: &mut String) {
    let index = chunk.read_byte(offset + 1).unwrap_or(0);
    let _ = write!(output, "{:<16} {:4} ", OpCode::Constant.mnemonic(), index);
    match chunk.constant(index) {
        Some(value) => {
            let _ = writeln!(output, "'{}'", value);
        }
        None => output.push_str("<invalid>\n"),
    }
}

/// Render the value stack the way the execution trace shows it, bottom first.
pub fn trace_stack(stack: &[Value]) -> String {
    let mut output = String::from("stack: ");
    for value in stack {
        let _ = write!(output, "[ {} ]", value);
    }
    output
}
