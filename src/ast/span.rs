use std::fmt::Display;

/// Represents a source code position with line and column
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourcePos {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed, in characters)
    pub column: usize,
}

impl Display for SourcePos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Represents a span in the source code
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Span {
    /// Start byte offset
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
}

impl Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Zero-width span at `offset`; used for virtual layout tokens.
    pub fn point(offset: usize) -> Self {
        Self { start: offset, end: offset }
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Convert byte offsets to 1-based line/column positions.
    ///
    /// Returns `None` when the span does not lie on character boundaries of
    /// `source`.
    pub fn to_pos(&self, source: &str) -> Option<(SourcePos, SourcePos)> {
        if self.end > source.len()
            || self.start > self.end
            || !source.is_char_boundary(self.start)
            || !source.is_char_boundary(self.end)
        {
            return None;
        }
        let start = pos_at(source, self.start);
        let end = pos_at(source, self.end);
        Some((start, end))
    }
}

fn pos_at(source: &str, offset: usize) -> SourcePos {
    let before = &source[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |nl| nl + 1);
    let column = source[line_start..offset].chars().count() + 1;
    SourcePos { line, column }
}

/// A value with associated span information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_pos_is_one_based() {
        let source = "data Nat\n  zero";
        let span = Span::new(11, 15);
        let (start, end) = span.to_pos(source).unwrap();
        assert_eq!(start, SourcePos { line: 2, column: 3 });
        assert_eq!(end, SourcePos { line: 2, column: 7 });
    }

    #[test]
    fn to_pos_counts_characters_not_bytes() {
        let source = "λ x";
        let span = Span::new(3, 4);
        let (start, _) = span.to_pos(source).unwrap();
        assert_eq!(start.column, 3);
    }

    #[test]
    fn to_pos_rejects_out_of_bounds() {
        assert!(Span::new(0, 10).to_pos("abc").is_none());
    }

    #[test]
    fn merge_covers_both() {
        let merged = Span::new(4, 6).merge(Span::new(1, 2));
        assert_eq!(merged, Span::new(1, 6));
        assert!(merged.contains(Span::new(4, 6)));
    }
}
