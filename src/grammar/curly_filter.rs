//! The `{ ... }` semantic-action pre-filter (spec.md §4.4), grounded in
//! pegen.py's `grammar_tokenizer` generator: it watches the underlying token
//! stream for a `{`, then folds everything up to the matching `}` into one
//! `CURLY_STUFF` token, counting nesting so an action containing its own
//! braces (a literal `{}` in target code, say) doesn't close early.

use crate::cursor::TokenProducer;
use crate::error::LexError;
use crate::token::{Token, TokenKind};

/// Wraps a [`TokenProducer`] — normally [`Lexer`](crate::grammar::lexer::Lexer)
/// — and rewrites any `{ ... }` run into a single [`TokenKind::CurlyStuff`]
/// token whose text is the enclosed tokens' text joined by single spaces.
pub struct CurlyFilter<P> {
    inner: P,
}

impl<P> CurlyFilter<P> {
    pub fn new(inner: P) -> Self {
        Self { inner }
    }
}

impl<P: TokenProducer> TokenProducer for CurlyFilter<P> {
    fn next_token(&mut self) -> Result<Token, LexError> {
        let open = self.inner.next_token()?;
        if !(open.kind == TokenKind::Operator && open.text == "{") {
            return Ok(open);
        }

        let start = open.start;
        let mut nesting = 1i32;
        let mut pieces = vec![open.text];
        loop {
            let tok = self.inner.next_token()?;
            if tok.kind == TokenKind::EndMarker {
                return Err(LexError::new(
                    start,
                    "unbalanced braces in semantic action: reached end of input before '}'",
                ));
            }
            let is_open = tok.kind == TokenKind::Operator && tok.text == "{";
            let is_close = tok.kind == TokenKind::Operator && tok.text == "}";
            let end = tok.end;
            pieces.push(tok.text);
            if is_open {
                nesting += 1;
            } else if is_close {
                nesting -= 1;
                if nesting == 0 {
                    return Ok(Token::new(TokenKind::CurlyStuff, pieces.join(" "), start, end));
                }
            }
        }
    }
}
