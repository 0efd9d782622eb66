//! `GrammarValue` instantiates `runtime::Parser`'s generic `V` for the
//! hand-written meta-grammar parser (component D). pegen.py's own
//! `GrammarParser` has no analogous type — its rule methods just return
//! whatever Python object the grammar module's classes construct — so this
//! enum exists purely to let one `Parser<P, V>` carry every node shape the
//! meta-grammar's rule methods build, matching spec.md §9's "Closed variant
//! for `Item`" note extended to the parser's return values.

use crate::ast::{Alt, Alts, Item, NamedItem, Rule};

#[derive(Debug, Clone, PartialEq)]
pub enum GrammarValue {
    Rules(Vec<Rule>),
    Rule(Rule),
    Alts(Alts),
    Alt(Alt),
    NamedItem(NamedItem),
    Item(Item),
}

/// Failure message shared by every accessor below: these only fire if a rule
/// method in `grammar::parser` mismatches the shape it builds from, which is
/// a bug in that rule method, not a property of the input grammar text.
macro_rules! accessor {
    ($name:ident, $variant:ident, $out:ty) => {
        pub fn $name(self) -> $out {
            match self {
                GrammarValue::$variant(v) => v,
                other => panic!(
                    concat!("GrammarValue: expected ", stringify!($variant), ", found {:?}"),
                    other
                ),
            }
        }
    };
}

impl GrammarValue {
    accessor!(into_rules, Rules, Vec<Rule>);
    accessor!(into_rule, Rule, Rule);
    accessor!(into_alts, Alts, Alts);
    accessor!(into_alt, Alt, Alt);
    accessor!(into_named_item, NamedItem, NamedItem);
    accessor!(into_item, Item, Item);
}
