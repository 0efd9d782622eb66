use once_cell::unsync::OnceCell;
use std::fmt::{Display, Formatter};

/// A 1-based line/column pair identifying a point in the original source text.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Owns the grammar (or generated-parser input) text and lazily computes
/// line-break offsets so error reporting can recover `Position` and the
/// offending source line without rescanning on every call.
pub struct Source<'s> {
    pub text: &'s str,
    line_breaks: OnceCell<Vec<usize>>,
}

impl<'s> From<&'s str> for Source<'s> {
    fn from(text: &'s str) -> Self {
        Source::new(text)
    }
}

impl<'s> Source<'s> {
    pub fn new(text: &'s str) -> Self {
        Self {
            text,
            line_breaks: OnceCell::new(),
        }
    }

    fn line_breaks(&self) -> &Vec<usize> {
        self.line_breaks.get_or_init(|| {
            self.text
                .bytes()
                .enumerate()
                .filter_map(|(i, b)| if b == b'\n' { Some(i) } else { None })
                .collect()
        })
    }

    /// Compute the `Position` of a byte offset into `text`.
    pub fn position_at(&self, offset: usize) -> Position {
        let breaks = self.line_breaks();
        let line_index = match breaks.binary_search(&offset) {
            Ok(i) | Err(i) => i,
        };
        if line_index == 0 {
            Position::new(1, offset + 1)
        } else {
            let line_start = breaks[line_index - 1] + 1;
            Position::new(line_index + 1, offset - line_start + 1)
        }
    }

    /// The raw text of the `line`'th (1-based) line, used to print the
    /// offending line alongside a syntax error per spec.md §6.
    pub fn line_text(&self, line: usize) -> &'s str {
        self.text.lines().nth(line - 1).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_at_start() {
        let src = Source::new("abc\ndef");
        assert_eq!(src.position_at(0), Position::new(1, 1));
    }

    #[test]
    fn position_after_newline() {
        let src = Source::new("abc\ndef");
        assert_eq!(src.position_at(4), Position::new(2, 1));
        assert_eq!(src.position_at(5), Position::new(2, 2));
    }

    #[test]
    fn line_text_recovers_offending_line() {
        let src = Source::new("start: NAME NAME ENDMARKER\n");
        assert_eq!(src.line_text(1), "start: NAME NAME ENDMARKER");
    }
}
