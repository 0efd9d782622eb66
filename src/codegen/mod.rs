//! The code generator (component E): translates a [`Rule`] list into the
//! source text of a recursive-descent, packrat-memoized parser module.
//!
//! Grounded in pegen.py's `ParserGenerator`: a `todo`/`done` worklist drives
//! emission so that a rule discovered mid-generation (a parenthesized group
//! or a repetition, both turned into a synthesized helper rule) is itself
//! emitted before the pass ends, and `name_node`/`name_loop` hand out the
//! `_tmp_N` / `_loop_N` names spec.md §3 reserves for them. Left recursion
//! is detected the same way `ast::Alts::is_recursive` already checks it for
//! the hand-written grammar parser; only the *direct* case is supported
//! (spec.md's resolved Open Question — mutual left recursion across rules
//! is documented as unsupported, not detected).

use std::collections::HashSet;
use std::fmt::Write as _;

use crate::ast::{Alt, Alts, Item, Leaf, NamedItem, Rule};

const TMP_PREFIX: &str = crate::ast::TMP_PREFIX;
const LOOP_PREFIX: &str = crate::ast::LOOP_PREFIX;

const TERMINAL_NAMES: &[&str] = &[
    "NAME",
    "NUMBER",
    "STRING",
    "CURLY_STUFF",
    "NEWLINE",
    "INDENT",
    "DEDENT",
    "ENDMARKER",
];

enum Pending {
    Rule(Rule),
    Loop {
        name: String,
        inner: Item,
        at_least_one: bool,
    },
}

impl Pending {
    fn name(&self) -> &str {
        match self {
            Pending::Rule(r) => &r.name,
            Pending::Loop { name, .. } => name,
        }
    }
}

/// Drives emission of one generated parser module from a grammar's rule list.
pub struct Generator {
    todo: Vec<Pending>,
    emitted_names: HashSet<String>,
    counter: u32,
    entry_name: String,
    out: Vec<String>,
}

impl Generator {
    pub fn new(grammar: Vec<Rule>) -> Self {
        let entry_name = grammar
            .first()
            .map(|r| r.name.clone())
            .unwrap_or_else(|| "start".to_string());
        Self {
            todo: grammar.into_iter().map(Pending::Rule).collect(),
            emitted_names: HashSet::new(),
            counter: 0,
            entry_name,
            out: Vec::new(),
        }
    }

    /// Runs the worklist to a fixed point and renders the complete module.
    pub fn generate(mut self) -> String {
        let mut i = 0;
        while i < self.todo.len() {
            // Indexing (not draining an iterator) lets `gen_pending` push new
            // entries onto `self.todo` mid-loop and have them picked up by
            // this same pass, mirroring pegen.py's `while self.todo:` loop.
            let name = self.todo[i].name().to_string();
            i += 1;
            if !self.emitted_names.insert(name) {
                continue;
            }
            let pending = std::mem::replace(&mut self.todo[i - 1], Pending::Loop {
                name: String::new(),
                inner: Item::leaf_str("''"),
                at_least_one: false,
            });
            let body = match pending {
                Pending::Rule(rule) => self.gen_rule(&rule),
                Pending::Loop {
                    name,
                    inner,
                    at_least_one,
                } => self.gen_loop(&name, &inner, at_least_one),
            };
            self.out.push(body);
        }
        self.render()
    }

    fn fresh_counter(&mut self) -> u32 {
        self.counter += 1;
        self.counter
    }

    /// Registers a synthesized `_tmp_N: alts` helper rule and returns its name.
    fn name_node(&mut self, alts: Alts) -> String {
        let name = format!("{TMP_PREFIX}{}", self.fresh_counter());
        self.todo.push(Pending::Rule(Rule::new(name.clone(), alts)));
        name
    }

    /// Registers a synthesized `_loop_N` repetition helper and returns its name.
    fn name_loop(&mut self, inner: Item, at_least_one: bool) -> String {
        let name = format!("{LOOP_PREFIX}{}", self.fresh_counter());
        self.todo.push(Pending::Loop {
            name: name.clone(),
            inner,
            at_least_one,
        });
        name
    }

    fn gen_rule(&mut self, rule: &Rule) -> String {
        let left_recursive = rule.alts.is_recursive(&rule.name);
        let effective_alts = flatten_trivial_group(rule);
        let mut body = String::new();
        for alt in &effective_alts.alts {
            self.gen_alt(&mut body, alt);
        }
        body.push_str("        Ok(None)\n");

        let memo_call = if left_recursive {
            "memoize_left_rec"
        } else {
            "memoize"
        };
        let mut out = String::new();
        writeln!(
            out,
            "fn {name}<P: TokenProducer>(p: &mut Parser<P, Value>) -> Result<Option<Value>, LexError> {{",
            name = rule.name
        )
        .unwrap();
        writeln!(out, "    p.{memo_call}(\"{}\", |p| {{", rule.name).unwrap();
        out.push_str(&body);
        out.push_str("    })\n}\n");
        out
    }

    /// `_loop_N` helpers aren't part of the `Rule`/`Alts` grammar AST (there
    /// is no ordered choice to make) so they get their own small template
    /// instead of going through `gen_alt`: repeatedly parse `inner`,
    /// collecting into a `Vec`, until it stops matching.
    fn gen_loop(&mut self, name: &str, inner: &Item, at_least_one: bool) -> String {
        let call = self.call_expr(inner);
        let mut out = String::new();
        writeln!(
            out,
            "fn {name}<P: TokenProducer>(p: &mut Parser<P, Value>) -> Result<Option<Value>, LexError> {{",
        )
        .unwrap();
        writeln!(out, "    p.memoize(\"{name}\", |p| {{").unwrap();
        out.push_str("        let mut items = Vec::new();\n");
        writeln!(out, "        while let Some(item) = {call} {{").unwrap();
        out.push_str("            items.push(item);\n");
        out.push_str("        }\n");
        if at_least_one {
            out.push_str("        if items.is_empty() {\n");
            out.push_str("            return Ok(None);\n");
            out.push_str("        }\n");
        }
        out.push_str("        Ok(Some(Value::List(items)))\n");
        out.push_str("    })\n}\n");
        out
    }

    fn gen_alt(&mut self, out: &mut String, alt: &Alt) {
        out.push_str("        let mark = p.mark();\n");
        let (binders, depth) = self.bind_items(out, &alt.items, 2);
        let indent = "    ".repeat(depth);
        let action = match &alt.action {
            Some(action) => action
                .trim_start_matches('{')
                .trim_end_matches('}')
                .trim()
                .to_string(),
            None => self.default_action(&alt.items, &binders),
        };
        let _ = writeln!(out, "{indent}return Ok(Some({action}));");
        for d in (2..depth).rev() {
            let close_indent = "    ".repeat(d);
            out.push_str(&close_indent);
            out.push_str("}\n");
        }
        out.push_str("        p.reset(mark);\n");
    }

    /// Emits the nested binder pyramid for one alternative's items, opening
    /// an `if let Some(name) = ...` per mandatory item (or a plain `let` for
    /// an optional one, since an absent optional must not fail the whole
    /// alternative — it opens no brace, so it doesn't deepen the nesting).
    /// Returns the binder names in item order alongside the resulting
    /// indentation depth of the innermost line, for `gen_alt` to close out.
    fn bind_items(
        &mut self,
        out: &mut String,
        items: &[NamedItem],
        base_depth: usize,
    ) -> (Vec<String>, usize) {
        let mut binders = Vec::with_capacity(items.len());
        let mut used: HashSet<String> = HashSet::new();
        let mut depth = base_depth;
        for (i, named) in items.iter().enumerate() {
            let indent = "    ".repeat(depth);
            let base_binder = match &named.name {
                Some(n) => n.clone(),
                // spec.md §4.5's per-item table gives `StringLeaf(s)` the
                // default name `string`, not "no name" — it still needs a
                // binder because the default action includes it.
                None if is_bare_literal(&named.item) => "string".to_string(),
                None => format!("_{}", i + 1),
            };
            // Duplicate binder names within one alternative (typically two
            // explicit `x=...` bindings to the same name) are disambiguated
            // by suffixing `_1`, `_2`, ... against names already used in
            // this same alternative (spec.md §4.5's NamedItem emission rule).
            let binder = if used.insert(base_binder.clone()) {
                base_binder
            } else {
                let mut n = 1;
                loop {
                    let candidate = format!("{base_binder}_{n}");
                    if used.insert(candidate.clone()) {
                        break candidate;
                    }
                    n += 1;
                }
            };
            let call = self.call_expr(&named.item);
            if matches!(named.item, Item::Opt(_)) {
                let _ = writeln!(out, "{indent}let {binder} = {call};");
            } else {
                let _ = writeln!(out, "{indent}if let Some({binder}) = {call} {{");
                depth += 1;
            }
            binders.push(binder);
        }
        (binders, depth)
    }

    /// spec.md §4.5: "the default is a list literal of the bound names in
    /// order" — every item, including unnamed literals (bound to `string`
    /// per the §4.5 per-item table), contributes its binder; there is no
    /// carve-out for bare literals (pegen.py's `Alt.gen_block`/`dedupe`
    /// appends every item's bound name into the default-action list).
    fn default_action(&self, items: &[NamedItem], binders: &[String]) -> String {
        let included: Vec<(String, bool)> = items
            .iter()
            .zip(binders)
            .map(|(named, binder)| (binder.clone(), matches!(named.item, Item::Opt(_))))
            .collect();

        match included.as_slice() {
            [] => "Value::Unit".to_string(),
            [(only, is_opt)] => {
                if *is_opt {
                    format!("Value::Opt(Box::new({only}))")
                } else {
                    only.clone()
                }
            }
            many => {
                let rendered: Vec<String> = many
                    .iter()
                    .map(|(name, is_opt)| {
                        if *is_opt {
                            format!("Value::Opt(Box::new({name}))")
                        } else {
                            name.clone()
                        }
                    })
                    .collect();
                format!("Value::List(vec![{}])", rendered.join(", "))
            }
        }
    }

    /// The expression that parses one item and yields `Option<Value>`
    /// (after the trailing `?` propagates a tokenizer error). Every case
    /// ultimately bottoms out at a `Parser` method or a named function call,
    /// never at raw cursor manipulation — item-level code never needs to
    /// know about marks directly.
    fn call_expr(&mut self, item: &Item) -> String {
        match item {
            Item::Leaf(Leaf::Name(name)) if TERMINAL_NAMES.contains(&name.as_str()) => {
                terminal_call(name)
            }
            Item::Leaf(Leaf::Name(name)) => format!("{name}(p)?"),
            Item::Leaf(Leaf::Str(literal)) => {
                let bare = literal.trim_matches(|c| c == '\'' || c == '"');
                format!("p.expect({bare:?})?.map(Value::Token)")
            }
            Item::Group(alts) => {
                if let Some(inlined) = inline_singleton(alts) {
                    self.call_expr(&inlined)
                } else {
                    let name = self.name_node((**alts).clone());
                    format!("{name}(p)?")
                }
            }
            Item::Opt(inner) => self.call_expr(inner),
            Item::Repeat0(inner) => {
                let name = self.name_loop((**inner).clone(), false);
                format!("{name}(p)?")
            }
            Item::Repeat1(inner) => {
                let name = self.name_loop((**inner).clone(), true);
                format!("{name}(p)?")
            }
        }
    }

    fn render(self) -> String {
        let mut out = String::new();
        out.push_str(PRELUDE);
        out.push('\n');
        for rule_src in &self.out {
            out.push_str(rule_src);
            out.push('\n');
        }
        let _ = writeln!(
            out,
            "/// Parses a token stream starting from `{entry}`, the grammar's first rule.",
            entry = self.entry_name
        );
        out.push_str("pub fn parse<P: TokenProducer>(producer: P) -> Result<Option<Value>, LexError> {\n");
        out.push_str("    let mut p = Parser::new(producer);\n");
        let _ = writeln!(out, "    {}(&mut p)", self.entry_name);
        out.push_str("}\n");
        out
    }
}

fn terminal_call(name: &str) -> String {
    match name {
        "NAME" => "p.name()?.map(Value::Token)".to_string(),
        "NUMBER" => "p.number()?.map(Value::Token)".to_string(),
        "STRING" => "p.string()?.map(Value::Token)".to_string(),
        "CURLY_STUFF" => "p.curly_stuff()?.map(Value::Token)".to_string(),
        other => format!("p.expect({other:?})?.map(Value::Token)"),
    }
}

fn is_bare_literal(item: &Item) -> bool {
    matches!(item, Item::Leaf(Leaf::Str(_)))
}

/// A parenthesized group that wraps exactly one alternative of exactly one
/// unnamed item is redundant punctuation, not a real choice point — pegen.py
/// skips generating a `_tmp_N` helper for it and inlines the inner item
/// directly (spec.md §9's single-parenthesized-group optimization).
fn inline_singleton(alts: &Alts) -> Option<Item> {
    if alts.alts.len() != 1 {
        return None;
    }
    let alt = &alts.alts[0];
    if alt.action.is_some() || alt.items.len() != 1 {
        return None;
    }
    let only = &alt.items[0];
    if only.name.is_some() {
        return None;
    }
    Some(only.item.clone())
}

/// Rule-level flattening (spec.md §4.5 step 2, pegen.py's `Rule.flatten`):
/// a non-loop rule whose entire right-hand side is one `Alt` holding one
/// `NamedItem` that wraps a `Group` is pure parenthesization — the rule's
/// effective alternatives become the group's own `Alts` directly, so the
/// generated function tries the group's alternatives itself instead of
/// delegating through a trivial single-branch body. Unlike
/// [`inline_singleton`] (an item-level collapse applied when a group's
/// *inner* `Alts` also has just one alternative), this fires even when the
/// group contains multiple alternatives.
fn flatten_trivial_group(rule: &Rule) -> &Alts {
    if rule.is_loop_helper() {
        return &rule.alts;
    }
    if rule.alts.alts.len() != 1 {
        return &rule.alts;
    }
    let alt = &rule.alts.alts[0];
    if alt.items.len() != 1 {
        return &rule.alts;
    }
    match &alt.items[0].item {
        Item::Group(inner) => inner,
        _ => &rule.alts,
    }
}

const PRELUDE: &str = r#"// Generated parser module. Do not edit by hand.
use lang_peg::cursor::TokenProducer;
use lang_peg::error::LexError;
use lang_peg::runtime::Parser;
use lang_peg::token::Token;

/// Semantic value produced by this grammar. `List`/`Opt` are the shapes a
/// default (action-less) alternative builds; an explicit `{ ... }` action is
/// copied in verbatim and is expected to evaluate to a `Value` itself.
#[derive(Debug, Clone)]
pub enum Value {
    Token(Token),
    List(Vec<Value>),
    Opt(Box<Option<Value>>),
    Unit,
}
"#;
