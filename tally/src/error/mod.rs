//! Error types and reporting

use crate::ast::Span;
use crate::interp::RuntimeError;
use std::io;
use thiserror::Error;

/// Result type alias for the lexing and parsing stages
pub type Result<T> = std::result::Result<T, SyntaxError>;

/// Fatal error raised while turning text into a syntax tree.
///
/// The first one aborts the whole parse: nothing is evaluated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyntaxError {
    #[error("Lexer error at {span}: {message}")]
    Lexer { message: String, span: Span },

    #[error("Parser error at {span}: {message}")]
    Parser { message: String, span: Span },
}

impl SyntaxError {
    pub fn lexer(message: impl Into<String>, span: Span) -> Self {
        Self::Lexer {
            message: message.into(),
            span,
        }
    }

    pub fn parser(message: impl Into<String>, span: Span) -> Self {
        Self::Parser {
            message: message.into(),
            span,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::Lexer { span, .. } | Self::Parser { span, .. } => *span,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Lexer { message, .. } | Self::Parser { message, .. } => message,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Lexer { .. } => "Lexer",
            Self::Parser { .. } => "Parser",
        }
    }
}

/// Anything `evaluate` can fail with
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl Error {
    pub fn as_runtime(&self) -> Option<&RuntimeError> {
        match self {
            Error::Runtime(err) => Some(err),
            Error::Syntax(_) => None,
        }
    }

    pub fn as_syntax(&self) -> Option<&SyntaxError> {
        match self {
            Error::Syntax(err) => Some(err),
            Error::Runtime(_) => None,
        }
    }
}

/// Report a syntax error with ariadne
pub fn report_syntax_error(
    filename: &str,
    source: &str,
    error: &SyntaxError,
    out: impl io::Write,
) -> io::Result<()> {
    use ariadne::{Color, Config, IndexType, Label, Report, ReportKind, Source};

    let mut range = error.span().range();
    if range.is_empty() && range.start < source.len() {
        range.end = range.start + 1;
    }

    Report::build(ReportKind::Error, (filename, range.clone()))
        .with_config(Config::default().with_index_type(IndexType::Byte).with_color(false))
        .with_message(format!("{} error", error.kind()))
        .with_label(
            Label::new((filename, range))
                .with_message(error.message())
                .with_color(Color::Red),
        )
        .finish()
        .write((filename, Source::from(source)), out)
}
