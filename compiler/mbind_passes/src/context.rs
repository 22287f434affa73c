//! Per-run pipeline state.

use mbind_diagnostic::{Diagnostic, DiagnosticConfig, DiagnosticQueue};
use mbind_ir::{DeclId, Insertion, Model};
use mbind_types::{Dialect, DialectCaps, TypePrinter};
use rustc_hash::FxHashMap;

/// State threaded through every pass of one run.
///
/// Nothing here outlives the run, so generating bindings for several
/// assemblies in one process only needs one context per assembly.
pub struct PipelineContext {
    dialect: Dialect,
    separator: String,
    /// Array wrappers by element key.
    array_cache: FxHashMap<String, DeclId>,
    /// Placement requests of the pass currently running.
    pending: Vec<Insertion>,
    diagnostics: DiagnosticQueue,
}

impl PipelineContext {
    pub fn new(dialect: Dialect, separator: impl Into<String>) -> Self {
        Self::with_diagnostics(dialect, separator, DiagnosticConfig::default())
    }

    pub fn with_diagnostics(
        dialect: Dialect,
        separator: impl Into<String>,
        config: DiagnosticConfig,
    ) -> Self {
        PipelineContext {
            dialect,
            separator: separator.into(),
            array_cache: FxHashMap::default(),
            pending: Vec::new(),
            diagnostics: DiagnosticQueue::with_config(config),
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn caps(&self) -> DialectCaps {
        self.dialect.caps()
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn printer<'a>(&'a self, model: &'a Model) -> TypePrinter<'a> {
        TypePrinter::new(model, self.dialect, &self.separator)
    }

    // Array wrapper cache

    pub fn cached_array(&self, key: &str) -> Option<DeclId> {
        self.array_cache.get(key).copied()
    }

    pub fn cache_array(&mut self, key: String, wrapper: DeclId) {
        self.array_cache.insert(key, wrapper);
    }

    pub fn array_count(&self) -> usize {
        self.array_cache.len()
    }

    // Insertions

    pub fn queue_insertion(&mut self, insertion: Insertion) {
        self.pending.push(insertion);
    }

    /// Place every queued declaration. Called once a producing pass has
    /// finished traversing the model.
    pub fn splice_pending(&mut self, model: &mut Model) {
        let pending = std::mem::take(&mut self.pending);
        model.splice(&pending);
    }

    // Diagnostics

    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.add(diagnostic);
    }

    pub fn diagnostics(&self) -> &DiagnosticQueue {
        &self.diagnostics
    }

    pub fn diagnostics_mut(&mut self) -> &mut DiagnosticQueue {
        &mut self.diagnostics
    }
}
