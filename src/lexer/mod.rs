//! Lexer module.

pub mod scanner;
pub mod token;

pub use scanner::{Scanner, TokenSource};
pub use token::{Token, TokenKind};
