//! Pipeline driver.

use mbind_ir::{FrozenModel, Model, ModelIntegrityError};
use thiserror::Error;

use crate::{
    escape_keywords, lower_accessors, resolve_names, synthesize_array_wrappers,
    synthesize_object_reprs, synthesize_proxies, validate, PipelineContext,
};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Integrity(#[from] ModelIntegrityError),

    #[error("model `{0}` declares no types")]
    EmptyModel(String),
}

/// Run every pass in order and freeze the result.
///
/// A [`ModelIntegrityError`] aborts the run before any transformation.
/// Everything else is recorded in the context's diagnostics and the run
/// continues.
pub fn run_pipeline(
    mut model: Model,
    ctx: &mut PipelineContext,
) -> Result<FrozenModel, PipelineError> {
    let _span = tracing::debug_span!(
        "pipeline",
        assembly = model.assembly_name(),
        dialect = %ctx.dialect(),
    )
    .entered();

    if model.emission_order().is_empty() {
        return Err(PipelineError::EmptyModel(model.assembly_name().to_string()));
    }

    validate(&mut model, ctx)?;
    escape_keywords(&mut model, ctx);
    lower_accessors(&mut model, ctx);
    synthesize_object_reprs(&mut model, ctx);
    synthesize_array_wrappers(&mut model, ctx);
    synthesize_proxies(&mut model, ctx);
    resolve_names(&mut model, ctx);

    tracing::debug!(
        decls = model.emission_order().len(),
        warnings = ctx.diagnostics().warning_count(),
        "pipeline finished"
    );
    Ok(model.freeze())
}
