//! The physical tokenizer for meta-grammar source text. Grounded in the
//! teacher's `lexeme::Pattern` (regex-driven token classes) and
//! `lexeme::Punctuations` (longest-match literal lookup, built by sorting
//! candidates by length); reworked from the teacher's byte-buffer scanning
//! into a single `Lexer` that implements [`TokenProducer`] directly, since
//! spec.md's grammar has no nested lexer states to dispatch between.

use crate::cursor::TokenProducer;
use crate::error::LexError;
use crate::position::Position;
use crate::token::{Token, TokenKind};
use regex::Regex;

/// Punctuation recognized in meta-grammar source, longest-first so `::`
/// (were it ever added) would never be shadowed by a single `:` entry.
/// `{` / `}` are included so [`curly_filter`](crate::grammar::curly_filter)
/// can detect them as ordinary operator tokens (spec.md §4.4).
const PUNCTUATION: &[&str] = &[":", "|", "=", "[", "]", "(", ")", "?", "*", "+", "{", "}"];

/// Scans one `.peg`-style grammar source into a stream of [`Token`]s.
///
/// Distinguishes significant [`TokenKind::Newline`] (ends a rule) from
/// insignificant [`TokenKind::BlankLine`] (a line with no content before the
/// newline) the way Python's `tokenize` module distinguishes `NEWLINE` from
/// `NL`: a newline is significant only if the current physical line already
/// produced some other token.
pub struct Lexer<'s> {
    text: &'s str,
    pos: usize,
    line: usize,
    col: usize,
    line_has_content: bool,
    exhausted_at: Option<Position>,
    name_pattern: Regex,
}

impl<'s> Lexer<'s> {
    pub fn new(text: &'s str) -> Self {
        Self {
            text,
            pos: 0,
            line: 1,
            col: 1,
            line_has_content: false,
            exhausted_at: None,
            name_pattern: Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*").unwrap(),
        }
    }

    fn rest(&self) -> &'s str {
        &self.text[self.pos..]
    }

    fn here(&self) -> Position {
        Position::new(self.line, self.col)
    }

    fn advance(&mut self, n: usize) -> Position {
        let start = self.here();
        for ch in self.rest()[..n].chars() {
            if ch == '\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
        }
        self.pos += n;
        start
    }

    fn skip_spaces(&mut self) {
        let n = self
            .rest()
            .chars()
            .take_while(|c| *c == ' ' || *c == '\t' || *c == '\r')
            .map(|c| c.len_utf8())
            .sum();
        if n > 0 {
            self.advance(n);
        }
    }

    fn scan_string(&mut self) -> Result<Token, LexError> {
        let quote = self.rest().chars().next().unwrap();
        let mut len = quote.len_utf8();
        let mut escaped = false;
        for ch in self.rest()[len..].chars() {
            let ch_len = ch.len_utf8();
            if escaped {
                escaped = false;
                len += ch_len;
                continue;
            }
            if ch == '\\' {
                escaped = true;
                len += ch_len;
                continue;
            }
            if ch == '\n' {
                return Err(LexError::new(self.here(), "unterminated string literal"));
            }
            len += ch_len;
            if ch == quote {
                let start = self.advance(len);
                let text = &self.text[self.pos - len..self.pos];
                return Ok(Token::new(TokenKind::String, text, start, self.here()));
            }
        }
        Err(LexError::new(self.here(), "unterminated string literal"))
    }

    fn scan_comment(&mut self) {
        let n = self.rest().chars().take_while(|c| *c != '\n').count();
        self.advance(n);
    }
}

impl<'s> TokenProducer for Lexer<'s> {
    fn next_token(&mut self) -> Result<Token, LexError> {
        loop {
            self.skip_spaces();
            if self.pos >= self.text.len() {
                let at = self.exhausted_at.unwrap_or_else(|| self.here());
                self.exhausted_at = Some(at);
                return Ok(Token::new(TokenKind::EndMarker, "", at, at));
            }
            let c = self.rest().chars().next().unwrap();

            if c == '#' {
                self.scan_comment();
                continue;
            }

            if c == '\n' {
                let start = self.advance(1);
                let kind = if self.line_has_content {
                    TokenKind::Newline
                } else {
                    TokenKind::BlankLine
                };
                self.line_has_content = false;
                return Ok(Token::new(kind, "\n", start, self.here()));
            }

            self.line_has_content = true;

            if c == '\'' || c == '"' {
                return self.scan_string();
            }

            if c.is_ascii_digit() {
                let n = self.rest().chars().take_while(|c| c.is_ascii_digit()).count();
                let start = self.advance(n);
                let text = &self.text[self.pos - n..self.pos];
                return Ok(Token::new(TokenKind::Number, text, start, self.here()));
            }

            if let Some(m) = self.name_pattern.find(self.rest()) {
                let n = m.end();
                let start = self.advance(n);
                let text = &self.text[self.pos - n..self.pos];
                return Ok(Token::new(TokenKind::Identifier, text, start, self.here()));
            }

            if let Some(p) = PUNCTUATION.iter().find(|p| self.rest().starts_with(**p)) {
                let n = p.len();
                let start = self.advance(n);
                let text = &self.text[self.pos - n..self.pos];
                return Ok(Token::new(TokenKind::Operator, text, start, self.here()));
            }

            return Err(LexError::new(
                self.here(),
                format!("unexpected character {:?}", c),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> Vec<Token> {
        let mut lex = Lexer::new(text);
        let mut out = Vec::new();
        loop {
            let t = lex.next_token().unwrap();
            let done = t.kind == TokenKind::EndMarker;
            out.push(t);
            if done {
                break;
            }
        }
        out
    }

    #[test]
    fn scans_a_simple_rule() {
        let toks = tokens("start: NAME ENDMARKER\n");
        let kinds: Vec<TokenKind> = toks.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Identifier,
                TokenKind::Operator,
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::Newline,
                TokenKind::EndMarker,
            ]
        );
    }

    #[test]
    fn blank_line_is_insignificant_but_content_line_is_not() {
        let toks = tokens("a: b\n\nc: d\n");
        let newline_kinds: Vec<TokenKind> = toks
            .iter()
            .filter(|t| matches!(t.kind, TokenKind::Newline | TokenKind::BlankLine))
            .map(|t| t.kind)
            .collect();
        assert_eq!(
            newline_kinds,
            vec![TokenKind::Newline, TokenKind::BlankLine, TokenKind::Newline]
        );
    }

    #[test]
    fn comment_is_skipped_without_ending_the_line() {
        let toks = tokens("a: b # trailing note\n");
        assert!(!toks.iter().any(|t| t.text.contains("trailing")));
        assert_eq!(toks.last().unwrap().kind, TokenKind::EndMarker);
    }

    #[test]
    fn string_literal_keeps_its_quotes() {
        let toks = tokens("a: '+'\n");
        let s = toks.iter().find(|t| t.kind == TokenKind::String).unwrap();
        assert_eq!(s.text, "'+'");
    }

    #[test]
    fn string_supports_backslash_escapes() {
        let source = "a: '\\''\n";
        let toks = tokens(source);
        let s = toks.iter().find(|t| t.kind == TokenKind::String).unwrap();
        assert_eq!(s.text, "'\\''");
    }

    #[test]
    fn end_marker_repeats_without_advancing() {
        let mut lex = Lexer::new("a\n");
        let _ = lex.next_token().unwrap();
        let _ = lex.next_token().unwrap();
        let first_end = lex.next_token().unwrap();
        let second_end = lex.next_token().unwrap();
        assert_eq!(first_end.kind, TokenKind::EndMarker);
        assert_eq!(first_end.start, second_end.start);
    }
}
