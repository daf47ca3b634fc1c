//! Source location tracking

use serde::{Deserialize, Serialize};

/// A point in a source buffer.
///
/// `offset` is a byte offset; `line` and `column` are 0-based and count
/// characters, so they stay meaningful for non-ASCII text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub const fn new(offset: usize, line: usize, column: usize) -> Self {
        Self { offset, line, column }
    }

    /// The position one character further along the same line.
    pub fn next_column(self, ch: char) -> Self {
        Self {
            offset: self.offset + ch.len_utf8(),
            line: self.line,
            column: self.column + 1,
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

/// A span in the source code
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Byte range, as consumed by `ariadne`.
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start.offset..self.end.offset
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

impl From<Span> for std::ops::Range<usize> {
    fn from(span: Span) -> Self {
        span.range()
    }
}

/// A value with source location
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }

    pub fn start(&self) -> Position {
        self.span.start
    }
}

/// Walks a source buffer character by character and reports positions.
///
/// Offsets handed to [`PositionTracker::seek`] must be non-decreasing;
/// the lexer only ever moves forward.
#[derive(Debug, Clone)]
pub struct PositionTracker<'src> {
    source: &'src str,
    position: Position,
}

impl<'src> PositionTracker<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            position: Position::default(),
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Step over one character, moving to the next line after a newline.
    pub fn advance(&mut self) -> Option<char> {
        let ch = self.source[self.position.offset..].chars().next()?;
        self.position = if ch == '\n' {
            Position::new(self.position.offset + 1, self.position.line + 1, 0)
        } else {
            self.position.next_column(ch)
        };
        Some(ch)
    }

    /// Advance until the tracker sits at byte `offset` and return that position.
    pub fn seek(&mut self, offset: usize) -> Position {
        debug_assert!(offset >= self.position.offset, "position tracker moved backwards");
        while self.position.offset < offset {
            if self.advance().is_none() {
                break;
            }
        }
        self.position
    }
}
