use crate::position::Position;
use std::fmt::{self, Display};

/// The fixed set of token kinds the runtime and grammar parser understand.
///
/// `CurlyStuff` is synthetic: it never comes out of a physical scanner, only
/// out of the [`curly_filter`](crate::grammar::curly_filter) pre-filter that
/// folds a balanced `{ ... }` semantic-action region into one token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Identifier,
    Number,
    String,
    Newline,
    Indent,
    Dedent,
    Operator,
    CurlyStuff,
    EndMarker,
    /// Blank-line NL; dropped by the token cursor's filter policy.
    BlankLine,
    Comment,
}

impl TokenKind {
    /// The name used both in `expect("NEWLINE")`-style calls and as the
    /// `tok_name` pegen.py prints in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Identifier => "NAME",
            TokenKind::Number => "NUMBER",
            TokenKind::String => "STRING",
            TokenKind::Newline => "NEWLINE",
            TokenKind::Indent => "INDENT",
            TokenKind::Dedent => "DEDENT",
            TokenKind::Operator => "OP",
            TokenKind::CurlyStuff => "CURLY_STUFF",
            TokenKind::EndMarker => "ENDMARKER",
            TokenKind::BlankLine => "NL",
            TokenKind::Comment => "COMMENT",
        }
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One immutable lexical element: kind, source text, and the span it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub start: Position,
    pub end: Position,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, start: Position, end: Position) -> Self {
        Self {
            kind,
            text: text.into(),
            start,
            end,
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:?}:{:?}", self.start, self.kind, self.text)
    }
}
