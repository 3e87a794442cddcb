//! Bytecode instruction definitions.

/// Opcodes for the bytecode virtual machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OpCode {
    /// Pop the result and stop execution
    Return = 0,
    /// Negate a value: -a
    Negate,
    /// Add two values: a + b
    Add,
    /// Subtract two values: a - b
    Subtract,
    /// Multiply two values: a * b
    Multiply,
    /// Divide two values: a / b
    Divide,
    /// Load a constant from the constant pool: CONSTANT <index:u8>
    Constant,
}

impl OpCode {
    /// Every opcode, in encoding order.
    pub const ALL: [OpCode; 7] = [
        OpCode::Return,
        OpCode::Negate,
        OpCode::Add,
        OpCode::Subtract,
        OpCode::Multiply,
        OpCode::Divide,
        OpCode::Constant,
    ];

    /// Get the number of operand bytes for this opcode.
    pub fn operand_size(self) -> usize {
        match self {
            OpCode::Return
            | OpCode::Negate
            | OpCode::Add
            | OpCode::Subtract
            | OpCode::Multiply
            | OpCode::Divide => 0,

            OpCode::Constant => 1,
        }
    }

    /// Encoded width in bytes, opcode included.
    pub fn width(self) -> usize {
        1 + self.operand_size()
    }

    /// Convert from u8 to OpCode.
    pub fn from_u8(byte: u8) -> Option<OpCode> {
        Self::ALL.get(byte as usize).copied()
    }

    /// Name used in disassembly listings.
    pub fn mnemonic(self) -> &'static str {
        match self {
            OpCode::Return => "OP_RETURN",
            OpCode::Negate => "OP_NEGATE",
            OpCode::Add => "OP_ADD",
            OpCode::Subtract => "OP_SUBTRACT",
            OpCode::Multiply => "OP_MULTIPLY",
            OpCode::Divide => "OP_DIVIDE",
            OpCode::Constant => "OP_CONSTANT",
        }
    }
}

impl From<OpCode> for u8 {
    fn from(op: OpCode) -> u8 {
        op as u8
    }
}

impl TryFrom<u8> for OpCode {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        OpCode::from_u8(byte).ok_or(byte)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_roundtrip() {
        for op in OpCode::ALL {
            assert_eq!(OpCode::from_u8(op as u8), Some(op));
        }
    }

    #[test]
    fn test_invalid_opcode() {
        assert!(OpCode::from_u8(OpCode::ALL.len() as u8).is_none());
        assert_eq!(OpCode::try_from(255), Err(255));
    }

    #[test]
    fn test_widths() {
        assert_eq!(OpCode::Constant.width(), 2);
        assert_eq!(OpCode::Return.width(), 1);
        assert_eq!(OpCode::Divide.width(), 1);
    }
}
