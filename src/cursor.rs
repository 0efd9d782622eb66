//! The token cursor (component A): a lazy, caching, rewindable view over a
//! token producer. Grounded in the teacher's `filtered_stream.rs` (an
//! append-only view with index-based lookups) generalized to spec.md §4.1's
//! mark/reset contract.

use crate::error::LexError;
use crate::token::{Token, TokenKind};

/// An opaque, cheap handle to a cursor position. A mark obtained at any
/// point remains valid for the cursor's whole lifetime; `reset` never
/// invalidates a mark taken earlier (the buffer only grows).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Mark(pub usize);

/// Supplies tokens one at a time. Implemented by the physical tokenizer
/// (`grammar::lexer`) and, when parsing a meta-grammar, by the curly-stuff
/// pre-filter layered on top of it. Expected to keep yielding `EndMarker`
/// once input is exhausted rather than erroring.
pub trait TokenProducer {
    fn next_token(&mut self) -> Result<Token, LexError>;
}

/// Lazy, caching, rewindable cursor over a [`TokenProducer`].
///
/// Tokens of kind [`TokenKind::BlankLine`] and [`TokenKind::Comment`] are
/// dropped while filling the buffer (spec.md §4.1's filter policy); every
/// other kind, including significant newlines and indent/dedent, is kept.
pub struct TokenCursor<P> {
    producer: P,
    buffer: Vec<Token>,
    index: usize,
}

impl<P: TokenProducer> TokenCursor<P> {
    pub fn new(producer: P) -> Self {
        Self {
            producer,
            buffer: Vec::new(),
            index: 0,
        }
    }

    fn fill_to(&mut self, index: usize) -> Result<(), LexError> {
        while self.buffer.len() <= index {
            let tok = self.producer.next_token()?;
            match tok.kind {
                TokenKind::BlankLine | TokenKind::Comment => continue,
                _ => self.buffer.push(tok),
            }
        }
        Ok(())
    }

    /// Return the token at the current position without advancing.
    pub fn peek(&mut self) -> Result<&Token, LexError> {
        self.fill_to(self.index)?;
        Ok(&self.buffer[self.index])
    }

    /// Return the token at the current position and advance past it.
    pub fn getnext(&mut self) -> Result<Token, LexError> {
        self.fill_to(self.index)?;
        let tok = self.buffer[self.index].clone();
        self.index += 1;
        Ok(tok)
    }

    pub fn mark(&self) -> Mark {
        Mark(self.index)
    }

    /// Number of tokens buffered so far; exposed purely for the resource
    /// diagnostics in spec.md §5/§6 (`Driver::cache_stats`).
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Precondition: `0 <= mark.0 <= buffer.len()`, i.e. `mark` was
    /// previously returned by `self.mark()`.
    pub fn reset(&mut self, mark: Mark) {
        debug_assert!(mark.0 <= self.buffer.len());
        self.index = mark.0;
    }

    /// The furthest token ever buffered, for error reporting — *not* the
    /// token at the current (possibly rewound) position: a failed rule
    /// resets `index` back toward the start, but the buffer it filled while
    /// probing is still there, and that high-water mark is exactly the
    /// "furthest-consumed token" spec.md §6/§7 wants reported. Mirrors
    /// pegen.py's `Tokenizer.diagnose`, which returns `self._tokens[-1]`
    /// regardless of `self._index`.
    pub fn diagnose(&mut self) -> Result<&Token, LexError> {
        if self.buffer.is_empty() {
            self.fill_to(0)?;
        }
        Ok(self.buffer.last().expect("just filled"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;

    struct Scripted(std::vec::IntoIter<Token>);

    impl TokenProducer for Scripted {
        fn next_token(&mut self) -> Result<Token, LexError> {
            Ok(self.0.next().unwrap_or_else(|| {
                Token::new(
                    TokenKind::EndMarker,
                    "",
                    Position::new(1, 1),
                    Position::new(1, 1),
                )
            }))
        }
    }

    fn tok(kind: TokenKind, text: &str) -> Token {
        Token::new(kind, text, Position::new(1, 1), Position::new(1, 1))
    }

    fn cursor(tokens: Vec<Token>) -> TokenCursor<Scripted> {
        TokenCursor::new(Scripted(tokens.into_iter()))
    }

    #[test]
    fn mark_reset_round_trip() {
        let mut c = cursor(vec![
            tok(TokenKind::Identifier, "a"),
            tok(TokenKind::Identifier, "b"),
        ]);
        let m = c.mark();
        assert_eq!(c.getnext().unwrap().text, "a");
        c.reset(m);
        assert_eq!(c.peek().unwrap().text, "a");
        assert_eq!(c.getnext().unwrap().text, "a");
        assert_eq!(c.getnext().unwrap().text, "b");
    }

    #[test]
    fn peek_is_idempotent() {
        let mut c = cursor(vec![tok(TokenKind::Identifier, "only")]);
        assert_eq!(c.peek().unwrap().text, "only");
        assert_eq!(c.peek().unwrap().text, "only");
        assert_eq!(c.mark(), Mark(0));
    }

    #[test]
    fn filter_drops_blank_lines_and_comments() {
        let mut c = cursor(vec![
            tok(TokenKind::Comment, "# hi"),
            tok(TokenKind::BlankLine, "\n"),
            tok(TokenKind::Identifier, "real"),
        ]);
        assert_eq!(c.getnext().unwrap().text, "real");
    }

    #[test]
    fn buffer_only_grows() {
        let mut c = cursor(vec![
            tok(TokenKind::Identifier, "a"),
            tok(TokenKind::Identifier, "b"),
        ]);
        c.getnext().unwrap();
        c.getnext().unwrap();
        let end = c.mark();
        c.reset(Mark(0));
        c.reset(end);
        assert_eq!(c.buffer.len(), 2);
    }

    #[test]
    fn diagnose_reports_the_furthest_token_even_after_a_reset() {
        let mut c = cursor(vec![
            tok(TokenKind::Identifier, "a"),
            tok(TokenKind::Identifier, "b"),
            tok(TokenKind::Identifier, "c"),
        ]);
        let start = c.mark();
        c.getnext().unwrap();
        c.getnext().unwrap();
        c.getnext().unwrap();
        c.reset(start);
        assert_eq!(c.diagnose().unwrap().text, "c");
    }
}
