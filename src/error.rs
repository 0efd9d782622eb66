use crate::position::Position;
use std::fmt;
use thiserror::Error;

/// Programmer-error class: an internal invariant was violated (empty
/// `Alts`, an out-of-range mark, ...). Per spec.md §7 these are not
/// recoverable parse outcomes; callers are expected to treat them as bugs.
#[derive(Debug, Error)]
#[error("internal invariant violated in {what}: {message}")]
pub struct ImplementationError {
    pub what: &'static str,
    pub message: String,
}

impl ImplementationError {
    pub fn new(what: &'static str, message: impl Into<String>) -> Self {
        Self {
            what,
            message: message.into(),
        }
    }
}

/// The upstream token producer failed. Propagated unchanged, never
/// swallowed by memoization (spec.md §5, §7).
#[derive(Debug, Error)]
#[error("tokenizer error at {position}: {message}")]
pub struct LexError {
    pub position: Position,
    pub message: String,
}

impl LexError {
    pub fn new(position: Position, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }
}

/// A syntax error surfaced from either the meta-grammar parser or a
/// generated parser, reported at the furthest-consumed token (spec.md §6/§7).
#[derive(Debug, Error)]
pub struct SyntaxError {
    pub filename: String,
    pub position: Position,
    pub line_text: String,
    pub message: String,
}

impl SyntaxError {
    pub fn new(
        filename: impl Into<String>,
        position: Position,
        line_text: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            filename: filename.into(),
            position,
            line_text: line_text.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:{}: {}", self.filename, self.position, self.message)?;
        writeln!(f, "    {}", self.line_text)?;
        write!(
            f,
            "    {}^",
            " ".repeat(self.position.column.saturating_sub(1))
        )
    }
}

/// Unified crate error. `Lex` covers both a genuine tokenizer failure and an
/// unbalanced-brace failure from the curly-stuff pre-filter (spec.md §7
/// treats the latter as a tokenizer error).
#[derive(Debug, Error)]
pub enum PegError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Internal(#[from] ImplementationError),
    #[error(transparent)]
    Format(#[from] fmt::Error),
}
