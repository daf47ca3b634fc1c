//! Lexer implementation using logos

mod token;

pub use token::{LexError, Token, TokenKind};

use crate::ast::{PositionTracker, Span};
use crate::error::{Result, SyntaxError};
use logos::Logos;

/// Pull-based lexer over one source buffer.
///
/// Hands out one token per call. Once the input is exhausted every further
/// call yields an `Eof` token at the end of the buffer.
pub struct Lexer<'src> {
    inner: logos::Lexer<'src, TokenKind>,
    tracker: PositionTracker<'src>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            inner: TokenKind::lexer(source),
            tracker: PositionTracker::new(source),
        }
    }

    /// Produce the next significant token, skipping whitespace and comments.
    pub fn next_token(&mut self) -> Result<Token> {
        loop {
            let Some(result) = self.inner.next() else {
                let end = self.tracker.seek(self.inner.source().len());
                return Ok(Token::new(TokenKind::Eof, "", Span::new(end, end)));
            };

            let range = self.inner.span();
            let start = self.tracker.seek(range.start);
            let end = self.tracker.seek(range.end);
            let span = Span::new(start, end);

            match result {
                Ok(TokenKind::BlockComment) => continue,
                Ok(kind) => return Ok(Token::new(kind, self.inner.slice(), span)),
                Err(err) => return Err(SyntaxError::lexer(err.message(self.inner.slice()), span)),
            }
        }
    }
}

/// Tokenize source code, stopping before `Eof`
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        if token.kind == TokenKind::Eof {
            break;
        }
        tokens.push(token);
    }
    tracing::trace!(count = tokens.len(), "tokenized");
    Ok(tokens)
}
