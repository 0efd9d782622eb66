//! The hand-written meta-grammar parser (component D): one
//! [`runtime::Parser`] instance whose rule methods mirror pegen.py's
//! `GrammarParser.start` / `.rule` / `.alternatives` / `.alternative` /
//! `.named_item` / `.item` / `.atom`, each wrapped in `self.memoize(...)`
//! exactly as pegen.py wraps them in `@memoize`. None of these rules are
//! left-recursive, so `memoize_left_rec` is never needed here — it only
//! appears in parsers *generated* by this crate (spec.md §4.3, §4.5).
//!
//! Where pegen.py chains `if (x := self.foo()):` down a single `if`
//! ladder with early returns, the rule methods below nest `if let Some(x) =
//! ...` instead — the walrus operator's closest stable-Rust idiom.

use crate::ast::{Alt, Alts, Item, NamedItem, Rule};
use crate::cursor::TokenProducer;
use crate::error::{LexError, PegError, SyntaxError};
use crate::position::Source;
use crate::runtime::{CacheStats, Parser};

use super::value::GrammarValue;

pub type MetaParser<P> = Parser<P, GrammarValue>;

/// Parses a complete meta-grammar source, returning the rule list in
/// declaration order plus a snapshot of the memoization caches used to
/// produce it (spec.md §5's resource diagnostics), or a [`SyntaxError`]
/// pointing at the furthest token the parser managed to reach (spec.md
/// §6/§7's "report at the point of furthest progress" requirement).
pub fn parse_grammar<P: TokenProducer>(
    producer: P,
    filename: &str,
    source: &Source,
) -> Result<(Vec<Rule>, CacheStats), PegError> {
    let mut p = MetaParser::new(producer);
    if let Some(value) = start(&mut p)? {
        let stats = p.cache_stats();
        return Ok((value.into_rules(), stats));
    }
    let tok = p.diagnose()?;
    let line_text = source.line_text(tok.start.line).to_string();
    Err(SyntaxError::new(
        filename,
        tok.start,
        line_text,
        format!("invalid syntax at {:?}", tok.text),
    )
    .into())
}

fn start<P: TokenProducer>(p: &mut MetaParser<P>) -> Result<Option<GrammarValue>, LexError> {
    p.memoize("start", |p| {
        let mark = p.mark();
        let mut rules = Vec::new();
        while let Some(r) = rule(p)? {
            rules.push(r.into_rule());
        }
        if rules.is_empty() || p.expect("ENDMARKER")?.is_none() {
            p.reset(mark);
            return Ok(None);
        }
        Ok(Some(GrammarValue::Rules(rules)))
    })
}

fn rule<P: TokenProducer>(p: &mut MetaParser<P>) -> Result<Option<GrammarValue>, LexError> {
    p.memoize("rule", |p| {
        let mark = p.mark();
        if let Some(name) = p.name()? {
            if p.expect(":")?.is_some() {
                if let Some(alts) = alternatives(p)? {
                    if p.expect("NEWLINE")?.is_some() {
                        return Ok(Some(GrammarValue::Rule(Rule::new(
                            name.text,
                            alts.into_alts(),
                        ))));
                    }
                }
            }
        }
        p.reset(mark);
        Ok(None)
    })
}

fn alternatives<P: TokenProducer>(p: &mut MetaParser<P>) -> Result<Option<GrammarValue>, LexError> {
    p.memoize("alternatives", |p| {
        let mark = p.mark();
        if let Some(first) = alternative(p)? {
            let mut alts = vec![first.into_alt()];
            loop {
                let loop_mark = p.mark();
                if p.expect("|")?.is_some() {
                    if let Some(next) = alternative(p)? {
                        alts.push(next.into_alt());
                        continue;
                    }
                }
                p.reset(loop_mark);
                break;
            }
            return Ok(Some(GrammarValue::Alts(Alts::new(alts))));
        }
        p.reset(mark);
        Ok(None)
    })
}

fn alternative<P: TokenProducer>(p: &mut MetaParser<P>) -> Result<Option<GrammarValue>, LexError> {
    p.memoize("alternative", |p| {
        let mark = p.mark();
        let mut items = Vec::new();
        while let Some(it) = named_item(p)? {
            items.push(it.into_named_item());
        }
        if items.is_empty() {
            p.reset(mark);
            return Ok(None);
        }
        let action = p.curly_stuff()?.map(|t| t.text);
        Ok(Some(GrammarValue::Alt(Alt::new(items, action))))
    })
}

fn named_item<P: TokenProducer>(p: &mut MetaParser<P>) -> Result<Option<GrammarValue>, LexError> {
    p.memoize("named_item", |p| {
        let mark = p.mark();
        if let Some(name) = p.name()? {
            if p.expect("=")?.is_some() {
                if let Some(it) = item(p)? {
                    return Ok(Some(GrammarValue::NamedItem(NamedItem::new(
                        Some(name.text),
                        it.into_item(),
                    ))));
                }
            }
        }
        p.reset(mark);
        if let Some(it) = item(p)? {
            return Ok(Some(GrammarValue::NamedItem(NamedItem::new(
                None,
                it.into_item(),
            ))));
        }
        p.reset(mark);
        Ok(None)
    })
}

fn item<P: TokenProducer>(p: &mut MetaParser<P>) -> Result<Option<GrammarValue>, LexError> {
    p.memoize("item", |p| {
        let mark = p.mark();
        if p.expect("[")?.is_some() {
            if let Some(alts) = alternatives(p)? {
                if p.expect("]")?.is_some() {
                    return Ok(Some(GrammarValue::Item(Item::opt(Item::group(
                        alts.into_alts(),
                    )))));
                }
            }
            p.reset(mark);
        }

        if let Some(a) = atom(p)? {
            let atom_item = a.into_item();
            if p.expect("?")?.is_some() {
                return Ok(Some(GrammarValue::Item(Item::opt(atom_item))));
            }
            if p.expect("*")?.is_some() {
                return Ok(Some(GrammarValue::Item(Item::repeat0(atom_item))));
            }
            if p.expect("+")?.is_some() {
                return Ok(Some(GrammarValue::Item(Item::repeat1(atom_item))));
            }
            return Ok(Some(GrammarValue::Item(atom_item)));
        }
        p.reset(mark);
        Ok(None)
    })
}

fn atom<P: TokenProducer>(p: &mut MetaParser<P>) -> Result<Option<GrammarValue>, LexError> {
    p.memoize("atom", |p| {
        let mark = p.mark();
        if p.expect("(")?.is_some() {
            if let Some(alts) = alternatives(p)? {
                if p.expect(")")?.is_some() {
                    return Ok(Some(GrammarValue::Item(Item::group(alts.into_alts()))));
                }
            }
            p.reset(mark);
        }

        if let Some(name) = p.name()? {
            return Ok(Some(GrammarValue::Item(Item::leaf_name(name.text))));
        }
        if let Some(s) = p.string()? {
            return Ok(Some(GrammarValue::Item(Item::leaf_str(s.text))));
        }
        p.reset(mark);
        Ok(None)
    })
}
