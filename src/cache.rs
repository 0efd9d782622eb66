//! The memoization fabric (component B, data half). One `Cache<V>` shape
//! serves two distinct roles in `runtime::Parser`: rule memoization (`V` is
//! whatever semantic value type the parser produces) and terminal
//! memoization (`V = Token`), exactly as spec.md §3 describes: "two maps
//! keyed on `(Mark, rule-identity)` and `(Mark, terminal-spec)`
//! respectively, each storing a `(result, endmark)` pair." Grounded in the
//! teacher's `cache.rs`, generalized from its `(CacheKey, usize)` wrapper to
//! a plain `(usize, &'static str)` key since rule/terminal identity here is
//! just the generated method name or terminal spec text.

use crate::cursor::Mark;
use std::collections::HashMap;

/// A memoized outcome: `Some(value)` on success (cursor left at `end`), or
/// `None` on failure (cursor left at the rule's starting mark, so
/// `end == <the mark the call started at>`).
pub type CacheEntry<V> = (Option<V>, Mark);

/// Packrat cache keyed on `(Mark, key)`, where `key` is a rule name like
/// `"expr"` / `"_tmp_3"` or a terminal spec like `"NAME"` / `"'+'"`.
#[derive(Debug)]
pub struct Cache<V: Clone> {
    entries: HashMap<(usize, &'static str), CacheEntry<V>>,
}

impl<V: Clone> Default for Cache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> Cache<V> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn get(&self, mark: Mark, key: &'static str) -> Option<CacheEntry<V>> {
        self.entries.get(&(mark.0, key)).cloned()
    }

    pub fn put(&mut self, mark: Mark, key: &'static str, entry: CacheEntry<V>) {
        self.entries.insert((mark.0, key), entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
