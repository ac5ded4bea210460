//! Internal source positions and spans

use std::path::PathBuf;

/// Zero-based position inside a file. `col` counts UTF-16 code units,
/// matching the LSP wire convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColRow {
    pub row: u32,
    pub col: u32,
}

impl ColRow {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

impl std::fmt::Display for ColRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.row, self.col)
    }
}

/// Half-open span within a single file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: ColRow,
    pub end: ColRow,
}

impl Span {
    pub fn new(start: ColRow, end: ColRow) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, position: ColRow) -> bool {
        (self.start.row, self.start.col) <= (position.row, position.col)
            && (position.row, position.col) < (self.end.row, self.end.col)
    }
}

/// A span tied to the file it was found in. Always refers to on-disk or
/// synchronized text, never to a transient buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpan {
    pub file: PathBuf,
    pub start: ColRow,
    pub end: ColRow,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_contains_is_half_open() {
        let span = Span::new(ColRow::new(1, 4), ColRow::new(1, 8));

        assert!(!span.contains(ColRow::new(1, 3)));
        assert!(span.contains(ColRow::new(1, 4)));
        assert!(span.contains(ColRow::new(1, 7)));
        assert!(!span.contains(ColRow::new(1, 8)));
    }

    #[test]
    fn span_contains_handles_multi_line_spans() {
        let span = Span::new(ColRow::new(0, 10), ColRow::new(2, 2));

        assert!(span.contains(ColRow::new(1, 0)));
        assert!(span.contains(ColRow::new(2, 1)));
        assert!(!span.contains(ColRow::new(2, 2)));
        assert!(!span.contains(ColRow::new(0, 9)));
    }
}
