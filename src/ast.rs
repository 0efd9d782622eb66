//! The grammar AST (component C): the bridge between the meta-grammar
//! parser (component D) and the code generator (component E). Closed
//! variant hierarchy per spec.md §3, grounded in `pegen.py`'s `Rule` /
//! `Alts` / `Alt` / `NamedItem` / leaf classes but expressed as an
//! exhaustive Rust enum instead of Python's duck-typed class hierarchy —
//! the "Closed variant for `Item`" design note in spec.md §9.

use std::fmt::{self, Display};

/// Reserved name prefixes the generator uses for synthesized helper rules;
/// user rule names must not collide with them (spec.md §3 invariant).
pub const TMP_PREFIX: &str = "_tmp_";
pub const LOOP_PREFIX: &str = "_loop_";

/// One production: `name: alts`.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub name: String,
    pub alts: Alts,
}

impl Rule {
    pub fn new(name: impl Into<String>, alts: Alts) -> Self {
        Self {
            name: name.into(),
            alts,
        }
    }

    pub fn is_loop_helper(&self) -> bool {
        self.name.starts_with(LOOP_PREFIX)
    }
}

impl Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.alts)
    }
}

/// Ordered choice: first success wins (PEG semantics). Always non-empty;
/// the meta-grammar parser never constructs an empty one because `alts` is
/// built by a `while` loop requiring at least one successful `alternative`.
#[derive(Debug, Clone, PartialEq)]
pub struct Alts {
    pub alts: Vec<Alt>,
}

impl Alts {
    pub fn new(alts: Vec<Alt>) -> Self {
        debug_assert!(!alts.is_empty(), "Alts must have at least one Alt");
        Self { alts }
    }

    /// True if `alts` is recursive through the first position of any
    /// alternative, transitively through groups (spec.md §4.5 step 1).
    pub fn is_recursive(&self, rule: &str) -> bool {
        self.alts.iter().any(|alt| alt.is_recursive(rule))
    }
}

impl Display for Alts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.alts.iter().map(|a| a.to_string()).collect();
        write!(f, "{}", rendered.join(" | "))
    }
}

/// A concatenation of named items with an optional semantic action.
#[derive(Debug, Clone, PartialEq)]
pub struct Alt {
    pub items: Vec<NamedItem>,
    /// When present, a string of the form `"{ ... }"`; the interior is a
    /// target-language code fragment copied opaquely (spec.md §3).
    pub action: Option<String>,
}

impl Alt {
    pub fn new(items: Vec<NamedItem>, action: Option<String>) -> Self {
        debug_assert!(!items.is_empty(), "Alt must have at least one NamedItem");
        if let Some(a) = &action {
            debug_assert!(a.starts_with('{') && a.ends_with('}'));
        }
        Self { items, action }
    }

    pub fn is_recursive(&self, rule: &str) -> bool {
        self.items
            .first()
            .map(|item| item.is_recursive(rule))
            .unwrap_or(false)
    }
}

impl Display for Alt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core: Vec<String> = self.items.iter().map(|i| i.to_string()).collect();
        match &self.action {
            Some(action) => write!(f, "{} {}", core.join(" "), action),
            None => write!(f, "{}", core.join(" ")),
        }
    }
}

/// One concatenation element, optionally bound to a name used in the
/// semantic action.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedItem {
    pub name: Option<String>,
    pub item: Item,
}

impl NamedItem {
    pub fn new(name: Option<String>, item: Item) -> Self {
        Self { name, item }
    }

    pub fn is_recursive(&self, rule: &str) -> bool {
        self.item.is_recursive(rule)
    }
}

impl Display for NamedItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}={}", name, self.item),
            None => write!(f, "{}", self.item),
        }
    }
}

/// An atom: either a rule/terminal-class reference or a literal string.
#[derive(Debug, Clone, PartialEq)]
pub enum Leaf {
    /// A rule reference or terminal class name. Uppercased names that match
    /// a fixed terminal-class name (`NAME`, `NUMBER`, `STRING`,
    /// `CURLY_STUFF`, `NEWLINE`, `INDENT`, `DEDENT`, `ENDMARKER`) refer to
    /// terminal matchers in the generated parser; any other name refers to
    /// another rule.
    Name(String),
    /// A literal operator/keyword, matched by exact text. Quotes are kept
    /// so they can be emitted verbatim into `expect(...)`.
    Str(String),
}

impl Display for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Leaf::Name(n) => write!(f, "{}", n),
            Leaf::Str(s) => write!(f, "{}", s),
        }
    }
}

/// One grammar item: a leaf, a parenthesized group, or a quantified form of
/// one of those. Closed (exhaustive) so `is_recursive`/`make_call` case
/// analysis is checked at compile time (spec.md §9).
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Leaf(Leaf),
    /// `(alts)` — parenthesized sub-expression.
    Group(Box<Alts>),
    /// `[x]` or `x?` — both produce this same variant (spec.md §4.3).
    Opt(Box<Item>),
    /// `x*` — zero-or-more.
    Repeat0(Box<Item>),
    /// `x+` — one-or-more.
    Repeat1(Box<Item>),
}

impl Item {
    pub fn leaf_name(name: impl Into<String>) -> Self {
        Item::Leaf(Leaf::Name(name.into()))
    }

    pub fn leaf_str(s: impl Into<String>) -> Self {
        Item::Leaf(Leaf::Str(s.into()))
    }

    pub fn group(alts: Alts) -> Self {
        Item::Group(Box::new(alts))
    }

    pub fn opt(inner: Item) -> Self {
        Item::Opt(Box::new(inner))
    }

    pub fn repeat0(inner: Item) -> Self {
        Item::Repeat0(Box::new(inner))
    }

    pub fn repeat1(inner: Item) -> Self {
        Item::Repeat1(Box::new(inner))
    }

    /// True exactly when `self` is a `NameLeaf` naming `rule` (pegen.py's
    /// `NameLeaf.is_recursive`); every other variant recurses structurally
    /// or returns `false`, matching `StringLeaf`/`Opt`/`Repeat`'s originals.
    pub fn is_recursive(&self, rule: &str) -> bool {
        match self {
            Item::Leaf(Leaf::Name(n)) => n == rule,
            Item::Leaf(Leaf::Str(_)) => false,
            Item::Group(alts) => alts.is_recursive(rule),
            Item::Opt(_) | Item::Repeat0(_) | Item::Repeat1(_) => false,
        }
    }
}

impl Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Item::Leaf(leaf) => write!(f, "{}", leaf),
            Item::Group(alts) => write!(f, "({})", alts),
            Item::Opt(inner) => write!(f, "{}?", inner),
            Item::Repeat0(inner) => write!(f, "({})*", inner),
            Item::Repeat1(inner) => write!(f, "({})+", inner),
        }
    }
}
