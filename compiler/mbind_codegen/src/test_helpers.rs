//! Shared fixtures for codegen tests. Only compiled in test builds.

use mbind_ir::{DeclId, FrozenModel, MemberId, Model};
use mbind_passes::{run_pipeline, PipelineContext};
use mbind_types::Dialect;

use crate::CodegenOptions;

/// Run the pass pipeline; panics on a fatal error.
pub(crate) fn frozen(model: Model, dialect: Dialect) -> FrozenModel {
    let mut ctx = PipelineContext::new(dialect, "_");
    match run_pipeline(model, &mut ctx) {
        Ok(frozen) => frozen,
        Err(e) => panic!("pipeline failed: {e}"),
    }
}

pub(crate) fn options(dialect: Dialect) -> CodegenOptions {
    CodegenOptions::new(dialect, "Lib")
}

/// The emitted member of `decl` named `emitted`.
pub(crate) fn member(model: &FrozenModel, decl: DeclId, emitted: &str) -> MemberId {
    match model
        .emitted_members_of(decl)
        .find(|(_, m)| m.emitted_name() == emitted)
    {
        Some((id, _)) => id,
        None => panic!("no member `{emitted}`"),
    }
}

/// Assert that `text` contains every line of `expected`, in order.
pub(crate) fn assert_lines_in_order(text: &str, expected: &[&str]) {
    let mut rest = text;
    for line in expected {
        match rest.find(line) {
            Some(pos) => rest = &rest[pos + line.len()..],
            None => panic!("`{line}` missing or out of order in:\n{text}"),
        }
    }
}
