//! Shared fixtures for pass tests. Only compiled in test builds.

use mbind_diagnostic::{DiagnosticConfig, ErrorCode};
use mbind_ir::{DeclId, FrozenModel, Model};
use mbind_types::Dialect;

use crate::{run_pipeline, PipelineContext};

/// A context that keeps notes, so tests can see renames and escapes.
pub(crate) fn ctx(dialect: Dialect) -> PipelineContext {
    PipelineContext::with_diagnostics(dialect, "_", DiagnosticConfig::verbose())
}

/// Run the whole pipeline; panics on a fatal error.
pub(crate) fn run(model: Model, dialect: Dialect) -> (FrozenModel, PipelineContext) {
    let mut ctx = ctx(dialect);
    match run_pipeline(model, &mut ctx) {
        Ok(frozen) => (frozen, ctx),
        Err(e) => panic!("pipeline failed: {e}"),
    }
}

/// Emitted names of the bound methods and constructors of `decl`, in
/// member order.
pub(crate) fn emitted_names(model: &Model, decl: DeclId) -> Vec<String> {
    model
        .emitted_members_of(decl)
        .filter(|(_, m)| m.is_method() || m.is_constructor())
        .map(|(_, m)| m.emitted_name().to_string())
        .collect()
}

/// Codes of every queued diagnostic, in insertion order.
pub(crate) fn codes(ctx: &PipelineContext) -> Vec<ErrorCode> {
    ctx.diagnostics().iter().map(|d| d.code).collect()
}
