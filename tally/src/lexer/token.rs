//! Token definitions

use crate::ast::Span;
use logos::Logos;
use std::fmt;

/// Why the token table rejected some input
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LexError {
    #[default]
    UnexpectedCharacter,
    UnterminatedString,
    UnterminatedComment,
    InvalidEscape(String),
}

impl LexError {
    /// Human-readable message; `slice` is the offending source text.
    pub fn message(&self, slice: &str) -> String {
        match self {
            LexError::UnexpectedCharacter => format!("unexpected character: {slice:?}"),
            LexError::UnterminatedString => "unterminated string literal".to_string(),
            LexError::UnterminatedComment => "unclosed block comment".to_string(),
            LexError::InvalidEscape(esc) => format!("invalid escape sequence: \\{esc}"),
        }
    }
}

/// Tally token kinds
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(error = LexError)]
#[logos(skip r"\s+")]
#[logos(skip r"//[^\n]*")]
pub enum TokenKind {
    // Literals
    /// Decimal text with `_` separators removed
    #[regex(r"[0-9][0-9_]*(\.[0-9_]*)?", |lex| lex.slice().replace('_', ""))]
    Number(String),
    /// Unicode letters, decimal digits and `_`; never starts with a digit
    #[regex(r"[\p{L}_][\p{L}\p{Nd}_]*", |lex| lex.slice().to_string())]
    Ident(String),
    /// String literal with escapes already resolved
    #[token("\"", lex_string)]
    Str(String),

    /// `/* ... */`; the lexer drops these before the parser sees them
    #[token("/*", skip_block_comment)]
    BlockComment,

    // Arithmetic
    #[token("+")]
    Plus,
    #[token("++")]
    PlusPlus,
    #[token("-")]
    Minus,
    #[token("--")]
    MinusMinus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,

    // Assignment and comparison
    #[token("=")]
    Eq,
    #[token("==")]
    EqEq,
    /// No prefix `!` in the grammar; the parser reports it as unexpected
    #[token("!")]
    Bang,
    #[token("!=")]
    NotEq,
    #[token(">")]
    Gt,
    #[token(">=")]
    GtEq,
    #[token("<")]
    Lt,
    #[token("<=")]
    LtEq,

    // Logical and bitwise
    #[token("&&")]
    AmpAmp,
    #[token("&")]
    Amp,
    #[token("||")]
    PipePipe,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("~")]
    Tilde,
    #[token("<<")]
    LtLt,
    #[token(">>")]
    GtGt,

    // Delimiters
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,

    // Punctuation
    #[token(";")]
    Semi,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token(":")]
    Colon,

    /// End of input, repeated forever once the source is exhausted
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Number(n) => write!(f, "number '{n}'"),
            TokenKind::Ident(name) => write!(f, "identifier '{name}'"),
            TokenKind::Str(s) => write!(f, "string {s:?}"),
            TokenKind::BlockComment => write!(f, "comment"),
            TokenKind::Eof => write!(f, "end of input"),
            other => write!(f, "'{}'", other.symbol()),
        }
    }
}

impl TokenKind {
    /// Source spelling of a fixed token
    pub fn symbol(&self) -> &'static str {
        match self {
            TokenKind::Plus => "+",
            TokenKind::PlusPlus => "++",
            TokenKind::Minus => "-",
            TokenKind::MinusMinus => "--",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Eq => "=",
            TokenKind::EqEq => "==",
            TokenKind::Bang => "!",
            TokenKind::NotEq => "!=",
            TokenKind::Gt => ">",
            TokenKind::GtEq => ">=",
            TokenKind::Lt => "<",
            TokenKind::LtEq => "<=",
            TokenKind::AmpAmp => "&&",
            TokenKind::Amp => "&",
            TokenKind::PipePipe => "||",
            TokenKind::Pipe => "|",
            TokenKind::Caret => "^",
            TokenKind::Tilde => "~",
            TokenKind::LtLt => "<<",
            TokenKind::GtGt => ">>",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Semi => ";",
            TokenKind::Comma => ",",
            TokenKind::Dot => ".",
            TokenKind::Colon => ":",
            TokenKind::Number(_)
            | TokenKind::Ident(_)
            | TokenKind::Str(_)
            | TokenKind::BlockComment
            | TokenKind::Eof => "",
        }
    }

    /// True for an identifier spelled exactly `word`
    pub fn is_keyword(&self, word: &str) -> bool {
        matches!(self, TokenKind::Ident(name) if name == word)
    }
}

/// A token with its raw source text and location
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }
}

/// Scan the body of a string literal after the opening quote.
fn lex_string(lex: &mut logos::Lexer<TokenKind>) -> Result<String, LexError> {
    let rest = lex.remainder();
    let mut out = String::new();
    let mut chars = rest.char_indices().peekable();

    while let Some((i, ch)) = chars.next() {
        match ch {
            '"' => {
                lex.bump(i + 1);
                return Ok(out);
            }
            '\\' => {
                let Some((esc_at, esc)) = chars.next() else {
                    break;
                };
                let resolved = match esc {
                    'n' => Some('\n'),
                    'r' => Some('\r'),
                    't' => Some('\t'),
                    'b' => Some('\u{8}'),
                    'a' => Some('\u{7}'),
                    'f' => Some('\u{c}'),
                    'v' => Some('\u{b}'),
                    '\\' => Some('\\'),
                    '"' => Some('"'),
                    '\'' => Some('\''),
                    '0' => Some('\0'),
                    'x' | 'u' => {
                        let max_digits = if esc == 'x' { 2 } else { 4 };
                        let mut hex = String::new();
                        while hex.len() < max_digits {
                            match chars.peek() {
                                Some(&(_, c)) if c.is_ascii_hexdigit() => {
                                    hex.push(c);
                                    chars.next();
                                }
                                _ => break,
                            }
                        }
                        let decoded = u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32);
                        if decoded.is_none() {
                            lex.bump(esc_at + esc.len_utf8() + hex.len());
                            return Err(LexError::InvalidEscape(format!("{esc}{hex}")));
                        }
                        decoded
                    }
                    _ => None,
                };
                match resolved {
                    Some(c) => out.push(c),
                    None => {
                        lex.bump(esc_at + esc.len_utf8());
                        return Err(LexError::InvalidEscape(esc.to_string()));
                    }
                }
            }
            c => out.push(c),
        }
    }

    lex.bump(rest.len());
    Err(LexError::UnterminatedString)
}

/// Consume a block comment through its closing `*/`.
fn skip_block_comment(lex: &mut logos::Lexer<TokenKind>) -> Result<(), LexError> {
    let rest = lex.remainder();
    match rest.find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            Ok(())
        }
        None => {
            lex.bump(rest.len());
            Err(LexError::UnterminatedComment)
        }
    }
}
