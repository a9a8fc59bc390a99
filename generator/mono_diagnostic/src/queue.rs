//! Diagnostic queue for collecting and ordering a batch report.
//!
//! The driver runs every (template, assignment) unit and reports all
//! failures at once rather than stopping at the first. The queue keeps
//! the consolidated report deterministic: diagnostics sort by source
//! position, then by insertion order.

use crate::span_utils::LineOffsetTable;
use crate::Diagnostic;

/// Collected diagnostics for one template batch.
#[derive(Default)]
pub struct DiagnosticQueue {
    entries: Vec<QueuedDiagnostic>,
}

struct QueuedDiagnostic {
    diagnostic: Diagnostic,
    line: u32,
    column: u32,
    sequence: usize,
}

impl DiagnosticQueue {
    pub fn new() -> Self {
        DiagnosticQueue::default()
    }

    /// Add a diagnostic, resolving its primary span against the source
    /// for positional sorting.
    pub fn push(&mut self, diagnostic: Diagnostic, table: &LineOffsetTable, source: &str) {
        let (line, column) = diagnostic
            .primary_span()
            .map(|span| table.span_position(source, span))
            .unwrap_or((0, 0));
        let sequence = self.entries.len();
        self.entries.push(QueuedDiagnostic {
            diagnostic,
            line,
            column,
            sequence,
        });
    }

    /// Add a diagnostic with no positional context (sorts first).
    pub fn push_unpositioned(&mut self, diagnostic: Diagnostic) {
        let sequence = self.entries.len();
        self.entries.push(QueuedDiagnostic {
            diagnostic,
            line: 0,
            column: 0,
            sequence,
        });
    }

    pub fn error_count(&self) -> usize {
        self.entries.iter().filter(|e| e.diagnostic.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.entries.len() - self.error_count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Drain into a position-sorted report.
    pub fn into_sorted(mut self) -> Vec<Diagnostic> {
        self.entries
            .sort_by_key(|e| (e.line, e.column, e.sequence));
        self.entries.into_iter().map(|e| e.diagnostic).collect()
    }
}
