//! One generator run: model in, output units and diagnostics out.

use std::io;
use std::path::{Path, PathBuf};

use mbind_codegen::{CodegenError, OutputUnit};
use mbind_diagnostic::{Diagnostic, DiagnosticConfig};
use mbind_ir::Model;
use mbind_passes::{run_pipeline, PipelineContext, PipelineError};
use thiserror::Error;

use crate::GeneratorOptions;

/// The result of a successful run.
#[derive(Debug)]
pub struct Generated {
    pub units: Vec<OutputUnit>,
    /// Warnings and notes collected by the pipeline, in report order.
    pub diagnostics: Vec<Diagnostic>,
}

impl Generated {
    pub fn warning_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_warning()).count()
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }
}

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("cannot read `{}`: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("`{}` is not a valid model: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Codegen(#[from] CodegenError),

    #[error("cannot write `{}`: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
}

impl GenerateError {
    /// The coded diagnostic for structural model errors; `None` for I/O and
    /// other failures, which are reported as plain errors.
    pub fn diagnostic(&self) -> Option<Diagnostic> {
        match self {
            GenerateError::Pipeline(PipelineError::Integrity(err)) => Some(Diagnostic::from(err)),
            _ => None,
        }
    }
}

/// Parse a model from its JSON form.
pub fn parse_model(text: &str) -> Result<Model, serde_json::Error> {
    serde_json::from_str(text)
}

/// Read and parse a model file.
pub fn load_model(path: &Path) -> Result<Model, GenerateError> {
    let text = std::fs::read_to_string(path).map_err(|source| GenerateError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let model = parse_model(&text).map_err(|source| GenerateError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(
        path = %path.display(),
        assembly = model.assembly_name(),
        decls = model.decl_count(),
        "loaded model"
    );
    Ok(model)
}

/// Run the pipeline over `model` and generate the units of one dialect.
pub fn generate(model: Model, options: &GeneratorOptions) -> Result<Generated, GenerateError> {
    let _span = tracing::debug_span!(
        "generate",
        assembly = model.assembly_name(),
        dialect = %options.dialect,
    )
    .entered();

    let config = if options.notes {
        DiagnosticConfig::verbose()
    } else {
        DiagnosticConfig::default()
    };
    let mut ctx = PipelineContext::with_diagnostics(
        options.dialect,
        options.separator.clone(),
        config,
    );
    let codegen_options = options.codegen_options(model.assembly_name());

    let frozen = run_pipeline(model, &mut ctx)?;
    let units = mbind_codegen::generate(&frozen, &codegen_options)?;
    let diagnostics = ctx.diagnostics_mut().flush();

    tracing::debug!(
        units = units.len(),
        diagnostics = diagnostics.len(),
        "generation finished"
    );
    Ok(Generated { units, diagnostics })
}

#[cfg(test)]
mod tests;
