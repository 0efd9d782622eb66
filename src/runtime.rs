//! Parser runtime primitives (component B, behavior half): the
//! `mark`/`reset` discipline, terminal matchers, and the two memoization
//! combinators spec.md §4.2 specifies. `Parser<P, V>` is instantiated twice
//! in this crate: as `grammar::value::MetaParser` (`V = GrammarValue`) for
//! the hand-written meta-grammar parser (component D), and — textually, in
//! whatever a generated parser's source imports — as the runtime a
//! generated rule method's `self.memoize(...)` call targets. That reuse is
//! the "bootstrap" spec.md §1 calls out.

use crate::cache::Cache;
use crate::cursor::{Mark, TokenCursor, TokenProducer};
use crate::error::LexError;
use crate::token::{Token, TokenKind};

/// Diagnostic snapshot of cache occupancy, the Rust analogue of pegen.py's
/// `-v` cache-size printout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub tokens_buffered: usize,
    pub rule_cache_entries: usize,
    pub terminal_cache_entries: usize,
}

/// Every generated parser instance — and the meta-grammar parser — holds
/// one of these: a token cursor, the two memoization caches, a
/// recursion-depth counter (diagnostics only, per spec.md §4.2), and the
/// cache-clearing switch discussed in spec.md §5/§9.
pub struct Parser<P, V: Clone> {
    cursor: TokenCursor<P>,
    rule_cache: Cache<V>,
    term_cache: Cache<Token>,
    depth: usize,
    clear_caches: bool,
}

impl<P: TokenProducer, V: Clone> Parser<P, V> {
    pub fn new(producer: P) -> Self {
        Self::with_options(producer, false)
    }

    /// `clear_caches` enables the optional optimization from spec.md §5/§9:
    /// after each successful terminal match, both caches are dropped
    /// together (never just one, which would break the "as-if" semantics
    /// memoization promises). Disabled by default, matching pegen.py's own
    /// commented-out call site.
    pub fn with_options(producer: P, clear_caches: bool) -> Self {
        Self {
            cursor: TokenCursor::new(producer),
            rule_cache: Cache::new(),
            term_cache: Cache::new(),
            depth: 0,
            clear_caches,
        }
    }

    pub fn mark(&self) -> Mark {
        self.cursor.mark()
    }

    pub fn reset(&mut self, mark: Mark) {
        self.cursor.reset(mark);
    }

    pub fn peek(&mut self) -> Result<&Token, LexError> {
        self.cursor.peek()
    }

    pub fn getnext(&mut self) -> Result<Token, LexError> {
        self.cursor.getnext()
    }

    pub fn diagnose(&mut self) -> Result<&Token, LexError> {
        self.cursor.diagnose()
    }

    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            tokens_buffered: self.cursor.buffered_len(),
            rule_cache_entries: self.rule_cache.len(),
            terminal_cache_entries: self.term_cache.len(),
        }
    }

    fn clear_caches_if_enabled(&mut self) {
        if self.clear_caches {
            self.rule_cache.clear();
            self.term_cache.clear();
        }
    }

    /// Shared contract for every terminal matcher: memoized on
    /// `(mark, key)`, same success/failure-entry shape as rule memoization
    /// (spec.md §4.2, "Memoization — terminal").
    fn terminal(
        &mut self,
        key: &'static str,
        matches: impl FnOnce(&Token) -> bool,
    ) -> Result<Option<Token>, LexError> {
        let mark = self.mark();
        if let Some((tok, end)) = self.term_cache.get(mark, key) {
            log::trace!("terminal {key} cache hit at {mark:?}");
            if tok.is_some() {
                self.reset(end);
            }
            return Ok(tok);
        }
        let matched = if matches(self.peek()?) {
            Some(self.getnext()?)
        } else {
            None
        };
        let end = if matched.is_some() { self.mark() } else { mark };
        self.term_cache.put(mark, key, (matched.clone(), end));
        if matched.is_some() {
            self.clear_caches_if_enabled();
        }
        Ok(matched)
    }

    pub fn name(&mut self) -> Result<Option<Token>, LexError> {
        self.terminal("NAME", |t| t.kind == TokenKind::Identifier)
    }

    pub fn number(&mut self) -> Result<Option<Token>, LexError> {
        self.terminal("NUMBER", |t| t.kind == TokenKind::Number)
    }

    pub fn string(&mut self) -> Result<Option<Token>, LexError> {
        self.terminal("STRING", |t| t.kind == TokenKind::String)
    }

    pub fn curly_stuff(&mut self) -> Result<Option<Token>, LexError> {
        self.terminal("CURLY_STUFF", |t| t.kind == TokenKind::CurlyStuff)
    }

    /// Matches either by exact text (operators, keywords) or by token-kind
    /// name (`NEWLINE`, `INDENT`, `DEDENT`, `ENDMARKER`), per spec.md §4.2.
    pub fn expect(&mut self, spec: &'static str) -> Result<Option<Token>, LexError> {
        self.terminal(spec, move |t| {
            if t.text == spec {
                return true;
            }
            match spec {
                "NEWLINE" => t.kind == TokenKind::Newline,
                "INDENT" => t.kind == TokenKind::Indent,
                "DEDENT" => t.kind == TokenKind::Dedent,
                "ENDMARKER" => t.kind == TokenKind::EndMarker,
                _ => false,
            }
        })
    }

    /// Standard (non-recursive) packrat memoization, spec.md §4.2.
    pub fn memoize(
        &mut self,
        rule: &'static str,
        body: impl FnOnce(&mut Self) -> Result<Option<V>, LexError>,
    ) -> Result<Option<V>, LexError> {
        let mark = self.mark();
        if let Some((value, end)) = self.rule_cache.get(mark, rule) {
            log::trace!("rule {rule} cache hit at {mark:?}");
            return match value {
                Some(v) => {
                    self.reset(end);
                    Ok(Some(v))
                }
                None => Ok(None),
            };
        }
        self.depth += 1;
        log::trace!("{}-> {rule} at {mark:?}", "  ".repeat(self.depth));
        let outcome = body(self);
        self.depth -= 1;
        let value = outcome?;
        let end = if value.is_some() {
            self.mark()
        } else {
            self.reset(mark);
            mark
        };
        self.rule_cache.put(mark, rule, (value.clone(), end));
        Ok(value)
    }

    /// Warth-style seed-and-grow memoization for directly left-recursive
    /// rules, spec.md §4.2. The recursive self-calls a rule body makes
    /// re-enter this same function; they hit the cache-lookup fast path
    /// above (the entry primed by this very call) instead of recursing into
    /// another seed-and-grow loop.
    pub fn memoize_left_rec(
        &mut self,
        rule: &'static str,
        mut body: impl FnMut(&mut Self) -> Result<Option<V>, LexError>,
    ) -> Result<Option<V>, LexError> {
        let mark = self.mark();
        if let Some((value, end)) = self.rule_cache.get(mark, rule) {
            return match value {
                Some(v) => {
                    self.reset(end);
                    Ok(Some(v))
                }
                None => Ok(None),
            };
        }

        // Seed with failure so the first recursive self-call bottoms out.
        self.rule_cache.put(mark, rule, (None, mark));

        let mut last_value: Option<V> = None;
        let mut last_end = mark;
        let mut depth = 0u32;
        loop {
            self.reset(mark);
            let result = body(self)?;
            let end = self.mark();
            depth += 1;
            log::trace!("{rule} grow depth {depth} at {mark:?} -> {end:?}");
            match result {
                None => break,
                Some(value) => {
                    if end <= last_end {
                        break;
                    }
                    last_value = Some(value);
                    last_end = end;
                    self.rule_cache.put(mark, rule, (last_value.clone(), last_end));
                }
            }
        }

        self.reset(last_end);
        let final_end = if last_value.is_some() { last_end } else { mark };
        self.rule_cache.put(mark, rule, (last_value.clone(), final_end));
        Ok(last_value)
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

    fn parser(tokens: Vec<Token>) -> Parser<Scripted, Token> {
        Parser::new(Scripted(tokens.into_iter()))
    }

    #[test]
    fn name_matches_identifier_and_advances() {
        let mut p = parser(vec![tok(TokenKind::Identifier, "hello")]);
        let got = p.name().unwrap().unwrap();
        assert_eq!(got.text, "hello");
        assert_eq!(p.mark(), Mark(1));
    }

    #[test]
    fn name_fails_without_advancing_on_mismatch() {
        let mut p = parser(vec![tok(TokenKind::Number, "1")]);
        assert!(p.name().unwrap().is_none());
        assert_eq!(p.mark(), Mark(0));
    }

    #[test]
    fn expect_matches_exact_text_operator() {
        let mut p = parser(vec![tok(TokenKind::Operator, "+")]);
        assert_eq!(p.expect("+").unwrap().unwrap().text, "+");
    }

    #[test]
    fn expect_matches_by_kind_name() {
        let mut p = parser(vec![tok(TokenKind::Newline, "\n")]);
        assert!(p.expect("NEWLINE").unwrap().is_some());
    }

    #[test]
    fn terminal_cache_is_equivalent_whether_or_not_prepopulated() {
        let mut fresh = parser(vec![tok(TokenKind::Identifier, "x")]);
        let fresh_result = fresh.name().unwrap();
        let fresh_mark = fresh.mark();

        let mut primed = parser(vec![tok(TokenKind::Identifier, "x")]);
        let mark = primed.mark();
        // Prime then immediately query again, same as a cache hit would.
        let _ = primed.name().unwrap();
        primed.reset(mark);
        let primed_result = primed.name().unwrap();
        let primed_mark = primed.mark();

        assert_eq!(fresh_result.map(|t| t.text), primed_result.map(|t| t.text));
        assert_eq!(fresh_mark, primed_mark);
    }

    #[test]
    fn memoize_returns_cached_value_on_second_call() {
        let mut p = parser(vec![tok(TokenKind::Identifier, "x")]);
        let mark = p.mark();
        let first = p
            .memoize("name_rule", |p| p.name().map(|t| t.map(|t| t)))
            .unwrap();
        p.reset(mark);
        let second = p
            .memoize("name_rule", |_| panic!("body should not run on cache hit"))
            .unwrap();
        assert_eq!(first.map(|t| t.text), second.map(|t| t.text));
    }

    #[test]
    fn memoize_left_rec_grows_then_stops_without_regressing() {
        // Simulates `expr: expr '+' NUMBER | NUMBER` over `1 + 2 + 3`.
        let mut p: Parser<Scripted, Vec<Token>> = Parser::new(Scripted(
            vec![
                tok(TokenKind::Number, "1"),
                tok(TokenKind::Operator, "+"),
                tok(TokenKind::Number, "2"),
                tok(TokenKind::Operator, "+"),
                tok(TokenKind::Number, "3"),
            ]
            .into_iter(),
        ));

        fn expr(p: &mut Parser<Scripted, Vec<Token>>) -> Result<Option<Vec<Token>>, LexError> {
            p.memoize_left_rec("expr", |p| {
                let mark = p.mark();
                if let Some(mut left) = expr(p)? {
                    if let Some(plus) = p.expect("+")? {
                        if let Some(num) = p.number()? {
                            left.push(plus);
                            left.push(num);
                            return Ok(Some(left));
                        }
                    }
                }
                p.reset(mark);
                if let Some(num) = p.number()? {
                    return Ok(Some(vec![num]));
                }
                Ok(None)
            })
        }

        let result = expr(&mut p).unwrap().expect("should parse");
        let texts: Vec<&str> = result.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["1", "+", "2", "+", "3"]);
    }

    /// spec.md §9's Open Question on the commented-out cache-clearing
    /// optimization asks that the suite be able to run with and without it;
    /// since both caches are always cleared together (never just one), a
    /// parse's observable result must be identical either way.
    #[test]
    fn clear_caches_option_does_not_change_the_parsed_result() {
        fn tokens() -> Vec<Token> {
            vec![
                tok(TokenKind::Identifier, "hello"),
                tok(TokenKind::Operator, "+"),
                tok(TokenKind::Number, "1"),
            ]
        }

        let mut without_clearing: Parser<Scripted, Token> =
            Parser::with_options(Scripted(tokens().into_iter()), false);
        let a_name = without_clearing.name().unwrap().map(|t| t.text);
        let a_op = without_clearing.expect("+").unwrap().map(|t| t.text);
        let a_num = without_clearing.number().unwrap().map(|t| t.text);

        let mut with_clearing: Parser<Scripted, Token> =
            Parser::with_options(Scripted(tokens().into_iter()), true);
        let b_name = with_clearing.name().unwrap().map(|t| t.text);
        let b_op = with_clearing.expect("+").unwrap().map(|t| t.text);
        let b_num = with_clearing.number().unwrap().map(|t| t.text);

        assert_eq!(a_name, b_name);
        assert_eq!(a_op, b_op);
        assert_eq!(a_num, b_num);
        assert_eq!(without_clearing.mark(), with_clearing.mark());
        assert_eq!(with_clearing.cache_stats().terminal_cache_entries, 0);
        assert!(without_clearing.cache_stats().terminal_cache_entries > 0);
    }
}
