//! Single-pass source-to-bytecode compiler.
//!
//! Tokens are pulled straight from a [`TokenSource`] and compiled into a [`Chunk`] with
//! operator-precedence (Pratt) parsing: each token kind maps to an optional prefix
//! handler, an optional infix handler and a binding precedence. No syntax tree is built.
//!
//! Errors do not unwind. The first one is recorded and switches the compiler into panic
//! mode, which silences the cascade that usually follows; scanning still runs to the
//! end of input and the result is reported once compilation finishes.

use crate::bytecode::chunk::{Chunk, MAX_CONSTANTS};
use crate::bytecode::instruction::OpCode;
use crate::bytecode::precedence::Precedence;
use crate::bytecode::value::Value;
use crate::error::{CompileError, Diagnostic, ErrorLocation, LexerError};
use crate::lexer::{Scanner, Token, TokenKind, TokenSource};

/// Deepest nesting of prefix operators and groups a single expression may use.
pub const MAX_NESTING_DEPTH: usize = 512;

/// Result type for compilation.
pub type CompileResult<T> = Result<T, CompileError>;

/// Handlers a parse rule can dispatch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseFn {
    Grouping,
    Unary,
    Binary,
    Number,
}

/// How a token kind behaves in prefix and infix position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseRule {
    pub prefix: Option<ParseFn>,
    pub infix: Option<ParseFn>,
    pub precedence: Precedence,
}

impl ParseRule {
    const fn new(prefix: Option<ParseFn>, infix: Option<ParseFn>, precedence: Precedence) -> Self {
        Self {
            prefix,
            infix,
            precedence,
        }
    }

    const fn none() -> Self {
        Self::new(None, None, Precedence::None)
    }
}

/// The parse rule table.
pub fn get_rule(kind: TokenKind) -> ParseRule {
    use ParseFn::*;

    match kind {
        TokenKind::LeftParen => ParseRule::new(Some(Grouping), None, Precedence::None),
        TokenKind::Minus => ParseRule::new(Some(Unary), Some(Binary), Precedence::Term),
        TokenKind::Plus => ParseRule::new(None, Some(Binary), Precedence::Term),
        TokenKind::Slash => ParseRule::new(None, Some(Binary), Precedence::Factor),
        TokenKind::Star => ParseRule::new(None, Some(Binary), Precedence::Factor),
        TokenKind::Number => ParseRule::new(Some(Number), None, Precedence::None),

        TokenKind::RightParen
        | TokenKind::LeftBrace
        | TokenKind::RightBrace
        | TokenKind::Comma
        | TokenKind::Dot
        | TokenKind::Semicolon
        | TokenKind::Bang
        | TokenKind::BangEqual
        | TokenKind::Equal
        | TokenKind::EqualEqual
        | TokenKind::Greater
        | TokenKind::GreaterEqual
        | TokenKind::Less
        | TokenKind::LessEqual
        | TokenKind::Identifier
        | TokenKind::String
        | TokenKind::And
        | TokenKind::Class
        | TokenKind::Else
        | TokenKind::False
        | TokenKind::For
        | TokenKind::Fun
        | TokenKind::If
        | TokenKind::Nil
        | TokenKind::Or
        | TokenKind::Print
        | TokenKind::Return
        | TokenKind::Super
        | TokenKind::This
        | TokenKind::True
        | TokenKind::Var
        | TokenKind::While
        | TokenKind::Eof => ParseRule::none(),
    }
}

/// Compile `source` into `chunk`.
pub fn compile(source: &str, chunk: &mut Chunk) -> CompileResult<()> {
    Compiler::new(Scanner::new(source), chunk).compile()
}

/// The compiler: parser state for one compilation unit plus the chunk it writes to.
pub struct Compiler<'src, 'c, S: TokenSource<'src>> {
    tokens: S,
    chunk: &'c mut Chunk,
    previous: Token<'src>,
    current: Token<'src>,
    had_error: bool,
    panic_mode: bool,
    depth: usize,
    diagnostics: Vec<Diagnostic>,
}

impl<'src, 'c, S: TokenSource<'src>> Compiler<'src, 'c, S> {
    pub fn new(tokens: S, chunk: &'c mut Chunk) -> Self {
        Self {
            tokens,
            chunk,
            previous: Token::eof(0, 1, 1),
            current: Token::eof(0, 1, 1),
            had_error: false,
            panic_mode: false,
            depth: 0,
            diagnostics: Vec::new(),
        }
    }

    /// Compile a single expression followed by end of input.
    ///
    /// A trailing `RETURN` is always emitted. On failure the chunk still holds whatever
    /// was written and must not be executed.
    pub fn compile(mut self) -> CompileResult<()> {
        self.advance();
        self.expression();
        self.consume(TokenKind::Eof, "Expect end of expression.");
        while self.current.kind != TokenKind::Eof {
            self.advance();
        }
        self.end_compiler();

        tracing::debug!(
            bytes = self.chunk.len(),
            constants = self.chunk.constants().len(),
            errors = self.diagnostics.len(),
            "compilation finished"
        );

        if self.had_error {
            Err(CompileError::new(self.diagnostics))
        } else {
            Ok(())
        }
    }

    // --- Token handling ---

    fn advance(&mut self) {
        self.previous = self.current;

        loop {
            match self.tokens.scan_token() {
                Ok(token) => {
                    self.current = token;
                    return;
                }
                Err(err) => self.lexer_error(&err),
            }
        }
    }

    fn consume(&mut self, kind: TokenKind, message: &str) {
        if self.current.kind == kind {
            self.advance();
            return;
        }

        self.error_at_current(message);
    }

    // --- Grammar ---

    fn expression(&mut self) {
        self.parse_precedence(Precedence::Assignment);
    }

    /// Every nested group or prefix operator recurses through here, so the nesting
    /// limit is enforced at this point.
    fn parse_precedence(&mut self, precedence: Precedence) {
        if self.depth >= MAX_NESTING_DEPTH {
            self.error_at_current("Expression nested too deeply.");
            return;
        }

        self.depth += 1;
        self.parse_operand(precedence);
        self.depth -= 1;
    }

    fn parse_operand(&mut self, precedence: Precedence) {
        self.advance();
        let Some(prefix) = get_rule(self.previous.kind).prefix else {
            self.error("Expect expression.");
            return;
        };
        self.dispatch(prefix);

        while precedence <= get_rule(self.current.kind).precedence {
            self.advance();
            if let Some(infix) = get_rule(self.previous.kind).infix {
                self.dispatch(infix);
            }
        }
    }

    fn dispatch(&mut self, handler: ParseFn) {
        match handler {
            ParseFn::Grouping => self.grouping(),
            ParseFn::Unary => self.unary(),
            ParseFn::Binary => self.binary(),
            ParseFn::Number => self.number(),
        }
    }

    fn number(&mut self) {
        // The scanner only hands out digit lexemes, so a parse failure cannot happen
        // for scanned input.
        let value = self.previous.lexeme.parse::<f64>().unwrap_or(0.0);
        self.emit_constant(Value(value));
    }

    fn grouping(&mut self) {
        self.expression();
        self.consume(TokenKind::RightParen, "Expect ')' after expression.");
    }

    fn unary(&mut self) {
        let operator = self.previous.kind;

        self.parse_precedence(Precedence::Unary);

        if operator == TokenKind::Minus {
            self.emit_op(OpCode::Negate);
        }
    }

    fn binary(&mut self) {
        let operator = self.previous.kind;
        let rule = get_rule(operator);
        self.parse_precedence(rule.precedence.next());

        match operator {
            TokenKind::Plus => self.emit_op(OpCode::Add),
            TokenKind::Minus => self.emit_op(OpCode::Subtract),
            TokenKind::Star => self.emit_op(OpCode::Multiply),
            TokenKind::Slash => self.emit_op(OpCode::Divide),
            _ => {}
        }
    }

    // --- Chunk helpers ---

    fn emit_byte(&mut self, byte: u8) {
        self.chunk.write_byte(byte, self.previous.line());
    }

    fn emit_op(&mut self, op: OpCode) {
        self.emit_byte(op.into());
    }

    fn emit_constant(&mut self, value: Value) {
        let index = self.make_constant(value);
        self.emit_op(OpCode::Constant);
        self.emit_byte(index);
    }

    fn make_constant(&mut self, value: Value) -> u8 {
        let index = self.chunk.add_constant(value);
        if index >= MAX_CONSTANTS {
            self.error("Too many constants in one chunk.");
            return 0;
        }
        index as u8
    }

    fn end_compiler(&mut self) {
        self.emit_op(OpCode::Return);
    }

    // --- Error reporting ---

    fn error(&mut self, message: &str) {
        let token = self.previous;
        self.error_at(&token, message);
    }

    fn error_at_current(&mut self, message: &str) {
        let token = self.current;
        self.error_at(&token, message);
    }

    fn error_at(&mut self, token: &Token<'src>, message: &str) {
        let location = match token.kind {
            TokenKind::Eof => ErrorLocation::End,
            _ => ErrorLocation::At(token.lexeme.to_string()),
        };
        self.report(Diagnostic::new(token.line(), location, message));
    }

    fn lexer_error(&mut self, err: &LexerError) {
        let diagnostic = Diagnostic::new(err.span().line, ErrorLocation::Lexical, err.to_string());
        self.report(diagnostic);
    }

    /// Panic mode is never cleared: an expression has no boundary to resynchronize at,
    /// so only the first error of a compilation is reported.
    fn report(&mut self, diagnostic: Diagnostic) {
        if self.panic_mode {
            return;
        }
        self.panic_mode = true;
        self.had_error = true;
        tracing::debug!(%diagnostic, "compile error");
        self.diagnostics.push(diagnostic);
    }
}
