//! Bytecode chunk containing instructions, line information and constants.

use crate::bytecode::instruction::OpCode;
use crate::bytecode::value::Value;
use crate::error::BytecodeError;

/// Smallest capacity the code and line buffers grow to.
pub const MIN_CAPACITY: usize = 8;

/// Constants addressable by a one-byte operand.
pub const MAX_CONSTANTS: usize = u8::MAX as usize + 1;

/// A chunk of bytecode.
///
/// `code` and `lines` always have the same length: `lines[i]` is the source line that
/// produced `code[i]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chunk {
    code: Vec<u8>,
    lines: Vec<usize>,
    constants: Vec<Value>,
}

/// Capacity doubles, starting from `MIN_CAPACITY`.
fn grow_capacity(capacity: usize) -> usize {
    if capacity < MIN_CAPACITY {
        MIN_CAPACITY
    } else {
        capacity * 2
    }
}

impl Chunk {
    pub fn new() -> Self {
        Self {
            code: Vec::new(),
            lines: Vec::new(),
            constants: Vec::new(),
        }
    }

    /// Write a raw byte to the chunk.
    pub fn write_byte(&mut self, byte: u8, line: usize) {
        if self.code.len() == self.code.capacity() {
            let target = grow_capacity(self.code.capacity());
            self.code.reserve_exact(target - self.code.len());
            self.lines.reserve_exact(target - self.lines.len());
        }
        self.code.push(byte);
        self.lines.push(line);
    }

    /// Write an opcode to the chunk.
    pub fn write_op(&mut self, op: OpCode, line: usize) {
        self.write_byte(op.into(), line);
    }

    /// Add a constant to the pool and return its index.
    ///
    /// The index is not range-checked here; callers emitting `CONSTANT` must make sure
    /// it fits in a byte.
    pub fn add_constant(&mut self, value: Value) -> usize {
        self.constants.push(value);
        self.constants.len() - 1
    }

    /// Decode the instruction starting at `offset`, returning its opcode and encoded
    /// width.
    pub fn instruction_at(&self, offset: usize) -> Result<(OpCode, usize), BytecodeError> {
        let byte = *self
            .code
            .get(offset)
            .ok_or(BytecodeError::OutOfBounds(offset))?;
        let opcode =
            OpCode::from_u8(byte).ok_or(BytecodeError::UnknownOpcode { byte, offset })?;
        let width = opcode.width();
        if offset + width > self.code.len() {
            return Err(BytecodeError::Truncated { opcode, offset });
        }
        Ok((opcode, width))
    }

    pub fn read_byte(&self, offset: usize) -> Option<u8> {
        self.code.get(offset).copied()
    }

    pub fn constant(&self, index: u8) -> Option<Value> {
        self.constants.get(index as usize).copied()
    }

    /// Get the line number at a given offset.
    pub fn line_at(&self, offset: usize) -> usize {
        self.lines.get(offset).copied().unwrap_or(0)
    }

    pub fn code(&self) -> &[u8] {
        &self.code
    }

    pub fn lines(&self) -> &[usize] {
        &self.lines
    }

    pub fn constants(&self) -> &[Value] {
        &self.constants
    }

    /// Number of code bytes written.
    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Allocated room in the code buffer.
    pub fn capacity(&self) -> usize {
        self.code.capacity()
    }
}
