//! Lexer/Scanner for source text.
//!
//! Tokens are produced lazily, one per call, so the compiler can pull them on demand.

use crate::error::LexerError;
use crate::lexer::token::{Token, TokenKind};
use crate::span::Span;

/// A pull-based producer of tokens.
///
/// Once the input is exhausted every further call must return an `Eof` token.
pub trait TokenSource<'src> {
    fn scan_token(&mut self) -> Result<Token<'src>, LexerError>;
}

/// The lexer transforms source code into a stream of tokens.
pub struct Scanner<'src> {
    source: &'src str,
    chars: std::iter::Peekable<std::str::CharIndices<'src>>,
    current_pos: usize,
    line: usize,
    column: usize,
    start_pos: usize,
    start_line: usize,
    start_column: usize,
}

impl<'src> Scanner<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            current_pos: 0,
            line: 1,
            column: 1,
            start_pos: 0,
            start_line: 1,
            start_column: 1,
        }
    }

    /// Scan all tokens from the source, stopping at the first lexical error.
    pub fn scan_tokens(&mut self) -> Result<Vec<Token<'src>>, LexerError> {
        let mut tokens = Vec::new();

        loop {
            let token = self.scan_token()?;
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        Ok(tokens)
    }

    /// Scan the next token.
    pub fn scan_token(&mut self) -> Result<Token<'src>, LexerError> {
        self.skip_whitespace_and_comments();
        self.mark_start();

        let Some((_, c)) = self.advance() else {
            return Ok(Token::eof(self.current_pos, self.line, self.column));
        };

        match c {
            // Single-character tokens
            '(' => Ok(self.make_token(TokenKind::LeftParen)),
            ')' => Ok(self.make_token(TokenKind::RightParen)),
            '{' => Ok(self.make_token(TokenKind::LeftBrace)),
            '}' => Ok(self.make_token(TokenKind::RightBrace)),
            ';' => Ok(self.make_token(TokenKind::Semicolon)),
            ',' => Ok(self.make_token(TokenKind::Comma)),
            '.' => Ok(self.make_token(TokenKind::Dot)),
            '-' => Ok(self.make_token(TokenKind::Minus)),
            '+' => Ok(self.make_token(TokenKind::Plus)),
            '/' => Ok(self.make_token(TokenKind::Slash)),
            '*' => Ok(self.make_token(TokenKind::Star)),

            // Two-character tokens
            '!' => {
                if self.match_char('=') {
                    Ok(self.make_token(TokenKind::BangEqual))
                } else {
                    Ok(self.make_token(TokenKind::Bang))
                }
            }
            '=' => {
                if self.match_char('=') {
                    Ok(self.make_token(TokenKind::EqualEqual))
                } else {
                    Ok(self.make_token(TokenKind::Equal))
                }
            }
            '<' => {
                if self.match_char('=') {
                    Ok(self.make_token(TokenKind::LessEqual))
                } else {
                    Ok(self.make_token(TokenKind::Less))
                }
            }
            '>' => {
                if self.match_char('=') {
                    Ok(self.make_token(TokenKind::GreaterEqual))
                } else {
                    Ok(self.make_token(TokenKind::Greater))
                }
            }

            '"' => self.scan_string(),

            c if c.is_ascii_digit() => Ok(self.scan_number()),

            c if c.is_ascii_alphabetic() || c == '_' => Ok(self.scan_identifier()),

            _ => Err(LexerError::unexpected_char(c, self.current_span())),
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(' ' | '\t' | '\r') => {
                    self.advance();
                }
                Some('\n') => {
                    self.advance();
                    self.line += 1;
                    self.column = 1;
                }
                Some('/') if self.peek_next() == Some('/') => {
                    while self.peek().is_some() && self.peek() != Some('\n') {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    /// Strings may span lines; the token keeps the line it started on.
    fn scan_string(&mut self) -> Result<Token<'src>, LexerError> {
        loop {
            match self.peek() {
                None => {
                    return Err(LexerError::unterminated_string(self.current_span()));
                }
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('\n') => {
                    self.advance();
                    self.line += 1;
                    self.column = 1;
                }
                Some(_) => {
                    self.advance();
                }
            }
        }

        Ok(self.make_token(TokenKind::String))
    }

    /// A trailing `.` belongs to the number even without fraction digits.
    fn scan_number(&mut self) -> Token<'src> {
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }

        if self.peek() == Some('.') {
            self.advance();
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.advance();
            }
        }

        self.make_token(TokenKind::Number)
    }

    fn scan_identifier(&mut self) -> Token<'src> {
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            self.advance();
        }

        let text = &self.source[self.start_pos..self.current_pos];
        let kind = TokenKind::keyword(text).unwrap_or(TokenKind::Identifier);
        self.make_token(kind)
    }

    fn advance(&mut self) -> Option<(usize, char)> {
        let next = self.chars.next();
        if let Some((pos, c)) = next {
            self.current_pos = pos + c.len_utf8();
            self.column += 1;
        }
        next
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn peek_next(&self) -> Option<char> {
        let mut iter = self.source[self.current_pos..].chars();
        iter.next();
        iter.next()
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn mark_start(&mut self) {
        self.start_pos = self.current_pos;
        self.start_line = self.line;
        self.start_column = self.column;
    }

    fn current_span(&self) -> Span {
        Span::new(
            self.start_pos,
            self.current_pos,
            self.start_line,
            self.start_column,
        )
    }

    fn make_token(&self, kind: TokenKind) -> Token<'src> {
        Token::new(
            kind,
            &self.source[self.start_pos..self.current_pos],
            self.current_span(),
        )
    }
}

impl<'src> TokenSource<'src> for Scanner<'src> {
    fn scan_token(&mut self) -> Result<Token<'src>, LexerError> {
        Scanner::scan_token(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scan(source: &str) -> Vec<TokenKind> {
        Scanner::new(source)
            .scan_tokens()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_arithmetic_tokens() {
        assert_eq!(
            scan("(1 + 2) * -3 / 4"),
            vec![
                TokenKind::LeftParen,
                TokenKind::Number,
                TokenKind::Plus,
                TokenKind::Number,
                TokenKind::RightParen,
                TokenKind::Star,
                TokenKind::Minus,
                TokenKind::Number,
                TokenKind::Slash,
                TokenKind::Number,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_number_lexemes() {
        let tokens = Scanner::new("42 3.14 7.").scan_tokens().unwrap();
        let lexemes: Vec<&str> = tokens.iter().map(|t| t.lexeme).collect();
        assert_eq!(lexemes, vec!["42", "3.14", "7.", ""]);
    }

    #[test]
    fn test_two_char_operators() {
        assert_eq!(
            scan("! != = == < <= > >="),
            vec![
                TokenKind::Bang,
                TokenKind::BangEqual,
                TokenKind::Equal,
                TokenKind::EqualEqual,
                TokenKind::Less,
                TokenKind::LessEqual,
                TokenKind::Greater,
                TokenKind::GreaterEqual,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(
            scan("var x = nil or fortune"),
            vec![
                TokenKind::Var,
                TokenKind::Identifier,
                TokenKind::Equal,
                TokenKind::Nil,
                TokenKind::Or,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comments_and_lines() {
        let tokens = Scanner::new("1 // one\n+\n2").scan_tokens().unwrap();
        let lines: Vec<usize> = tokens.iter().map(|t| t.line()).collect();
        assert_eq!(lines, vec![1, 2, 3, 3]);
    }

    #[test]
    fn test_multiline_string_keeps_start_line() {
        let tokens = Scanner::new("\"a\nb\" 1").scan_tokens().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].lexeme, "\"a\nb\"");
        assert_eq!(tokens[0].line(), 1);
        assert_eq!(tokens[1].line(), 2);
    }

    #[test]
    fn test_unterminated_string() {
        let err = Scanner::new("\"abc").scan_tokens().unwrap_err();
        assert!(matches!(err, LexerError::UnterminatedString(_)));
    }

    #[test]
    fn test_unexpected_char_then_continue() {
        let mut scanner = Scanner::new("# 1");
        assert!(matches!(
            scanner.scan_token(),
            Err(LexerError::UnexpectedChar('#', _))
        ));
        assert_eq!(scanner.scan_token().unwrap().kind, TokenKind::Number);
    }

    #[test]
    fn test_eof_is_idempotent() {
        let mut scanner = Scanner::new("1");
        assert_eq!(scanner.scan_token().unwrap().kind, TokenKind::Number);
        for _ in 0..3 {
            assert_eq!(scanner.scan_token().unwrap().kind, TokenKind::Eof);
        }
    }
}
