//! Pull-based scanner over the logos token automaton

use log::trace;
use logos::Logos;

use super::token::{Token, TokenKind};
use crate::common::Span;

/// Scanner for MiniC source code.
///
/// Hands out one token per call and never fails: malformed lexemes come back
/// as [`TokenKind::Invalid`] tokens, leaving the error policy to the caller.
pub struct Scanner<'a> {
    source: &'a str,
    inner: logos::Lexer<'a, TokenKind>,
    /// Byte offset up to which newlines have been counted
    cursor: usize,
    line: usize,
}

impl<'a> Scanner<'a> {
    /// Create a new scanner for the given source code
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            inner: TokenKind::lexer(source),
            cursor: 0,
            line: 1,
        }
    }

    /// Get the next token, or an `Eof` token once the input is exhausted
    pub fn next_token(&mut self) -> Token {
        let Some(result) = self.inner.next() else {
            self.count_lines_to(self.source.len());
            return Token::eof(self.line, self.source.len());
        };

        let span = Span::from(self.inner.span());
        self.count_lines_to(span.start);
        let line = self.line;
        self.count_lines_to(span.end);

        let text = self.inner.slice();
        let token = match result {
            Ok(kind) => Token::new(kind, text, line, span),
            Err(fault) => Token::error(fault, text, line, span),
        };
        trace!("line {}: {:?} {:?}", token.line, token.kind, token.text);
        token
    }

    fn count_lines_to(&mut self, offset: usize) {
        if offset > self.cursor {
            self.line += self.source[self.cursor..offset].matches('\n').count();
            self.cursor = offset;
        }
    }

    /// Byte offset just past the last token handed out
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Rewind (or skip) to a position previously obtained from [`Scanner::position`]
    pub fn set_position(&mut self, position: usize) {
        let position = position.min(self.source.len());
        self.inner = TokenKind::lexer(self.source);
        self.inner.bump(position);
        self.cursor = position;
    }

    /// Line the scanner is currently on
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn set_line(&mut self, line: usize) {
        self.line = line;
    }

    /// Tokenize the entire source and return all tokens, `Eof` included
    pub fn tokenize_all(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = matches!(token.kind, TokenKind::Eof);
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }
}
