//! Diagnostic queue for collecting, deduplicating, and ordering diagnostics.
//!
//! Passes push diagnostics as they go; the driver flushes the queue once,
//! at the end of the run. Flushing orders by location (diagnostics without
//! one first) and keeps insertion order within a location, so reruns over
//! the same model print the same report.

use rustc_hash::FxHashSet;

use crate::{Diagnostic, Severity};

/// Configuration for diagnostic processing.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticConfig {
    /// Drop a diagnostic identical to one already queued.
    pub deduplicate: bool,
    /// Keep `Note` diagnostics (renames, escapes).
    pub include_notes: bool,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        DiagnosticConfig {
            deduplicate: true,
            include_notes: false,
        }
    }
}

impl DiagnosticConfig {
    /// Keep everything, notes included.
    pub fn verbose() -> Self {
        DiagnosticConfig {
            deduplicate: true,
            include_notes: true,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct DiagnosticQueue {
    diagnostics: Vec<Diagnostic>,
    seen: FxHashSet<Diagnostic>,
    error_count: usize,
    warning_count: usize,
    config: DiagnosticConfig,
}

impl DiagnosticQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DiagnosticConfig) -> Self {
        DiagnosticQueue {
            config,
            ..Self::default()
        }
    }

    /// Add a diagnostic.
    ///
    /// Returns `true` if the diagnostic was added, `false` if it was filtered.
    pub fn add(&mut self, diag: Diagnostic) -> bool {
        if diag.severity == Severity::Note && !self.config.include_notes {
            return false;
        }
        if self.config.deduplicate && !self.seen.insert(diag.clone()) {
            return false;
        }
        match diag.severity {
            Severity::Error => self.error_count += 1,
            Severity::Warning => self.warning_count += 1,
            Severity::Note => {}
        }
        self.diagnostics.push(diag);
        true
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Queued diagnostics in insertion order, without draining.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Take every queued diagnostic in report order and reset the queue.
    pub fn flush(&mut self) -> Vec<Diagnostic> {
        let mut diagnostics = std::mem::take(&mut self.diagnostics);
        diagnostics.sort_by(|a, b| a.location.cmp(&b.location));
        self.seen.clear();
        self.error_count = 0;
        self.warning_count = 0;
        diagnostics
    }
}
