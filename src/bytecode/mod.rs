//! Bytecode compiler and virtual machine for arithmetic expressions.
//!
//! # Architecture
//!
//! - `instruction`: OpCode definitions for the bytecode instruction set
//! - `value`: the number type every instruction works on
//! - `chunk`: Bytecode chunks with line information and a constant pool
//! - `precedence`: binding strength of operators
//! - `compiler`: Single-pass Pratt compiler from tokens to bytecode
//! - `vm`: Stack-based virtual machine for executing bytecode
//! - `disassembler`: Debug output for bytecode inspection

pub mod chunk;
pub mod compiler;
pub mod disassembler;
pub mod instruction;
pub mod precedence;
pub mod value;
pub mod vm;

#[cfg(test)]
mod tests;

pub use chunk::Chunk;
pub use compiler::{compile, Compiler};
pub use disassembler::{disassemble_chunk, disassemble_instruction};
pub use instruction::OpCode;
pub use precedence::Precedence;
pub use value::Value;
pub use vm::{Vm, STACK_MAX};
