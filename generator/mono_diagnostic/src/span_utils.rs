//! Span utility functions for diagnostic rendering.
//!
//! Provides line and column lookup from byte offsets, used when printing
//! diagnostics and when sorting a batch report by source position.

use mono_ir::Span;

/// Pre-computed line offset table for efficient line/column lookup.
///
/// Scans the source once, then answers lookups with a binary search.
/// Worth it because a batch report resolves many labels against the same
/// template.
#[derive(Clone, Debug, Default)]
pub struct LineOffsetTable {
    /// Byte offset of each line start; offsets[0] = 0.
    offsets: Vec<u32>,
}

impl LineOffsetTable {
    /// Build a line offset table from source text.
    pub fn build(source: &str) -> Self {
        let mut offsets = vec![0u32];
        for (i, byte) in source.as_bytes().iter().enumerate() {
            if *byte == b'\n' {
                offsets.push((i + 1) as u32);
            }
        }
        LineOffsetTable { offsets }
    }

    /// Get the 1-based line number containing a byte offset.
    #[inline]
    pub fn line_from_offset(&self, offset: u32) -> u32 {
        let line_idx = match self.offsets.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert) => insert.saturating_sub(1),
        };
        (line_idx as u32) + 1
    }

    /// Get 1-based (line, column) from a byte offset.
    ///
    /// The column counts characters (not bytes) from the line start.
    pub fn offset_to_line_col(&self, source: &str, offset: u32) -> (u32, u32) {
        let line = self.line_from_offset(offset);
        let line_start = self.offsets.get((line - 1) as usize).copied().unwrap_or(0) as usize;
        let offset = (offset as usize).min(source.len());
        let col = u32::try_from(source[line_start..offset].chars().count())
            .unwrap_or(u32::MAX - 1)
            + 1;
        (line, col)
    }

    /// Position of a span's start, for report sorting.
    pub fn span_position(&self, source: &str, span: Span) -> (u32, u32) {
        self.offset_to_line_col(source, span.start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_lookup() {
        let source = "line1\nline2\nline3";
        let table = LineOffsetTable::build(source);
        assert_eq!(table.offset_to_line_col(source, 0), (1, 1));
        assert_eq!(table.offset_to_line_col(source, 6), (2, 1));
        assert_eq!(table.offset_to_line_col(source, 12), (3, 1));
        assert_eq!(table.offset_to_line_col(source, 14), (3, 3));
    }

    #[test]
    fn test_offset_at_newline_belongs_to_line() {
        let source = "ab\ncd";
        let table = LineOffsetTable::build(source);
        assert_eq!(table.line_from_offset(2), 1);
        assert_eq!(table.line_from_offset(3), 2);
    }

    #[test]
    fn test_span_position() {
        let source = "class KTypeFoo {\n  KType x;\n}";
        let table = LineOffsetTable::build(source);
        let (line, col) = table.span_position(source, Span::new(19, 24));
        assert_eq!((line, col), (2, 3));
    }
}
