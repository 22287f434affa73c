use pretty_assertions::assert_eq;

use std::path::Path;

use mbind_diagnostic::{ErrorCode, Severity};
use mbind_ir::{Model, ModelBuilder, Param, RefDirection, TypeExpr};
use mbind_passes::PipelineError;
use mbind_types::Dialect;

use super::{generate, load_model, parse_model, GenerateError};
use crate::GeneratorOptions;

fn overloaded() -> Model {
    let mut b = ModelBuilder::new("Lib");
    let foo = b.class("NS", "Foo");
    b.method(foo, "Go", vec![], TypeExpr::Void);
    b.method(foo, "Go", vec![Param::new("a", TypeExpr::INT)], TypeExpr::Void);
    b.build()
}

// Loading

#[test]
fn parse_rejects_malformed_json() {
    assert!(parse_model("{ not json").is_err());
}

#[test]
fn missing_file_is_a_read_error() {
    let err = load_model(Path::new("/nonexistent/model.json"));
    assert!(matches!(err, Err(GenerateError::Read { .. })));
}

#[test]
fn malformed_file_is_a_parse_error() {
    let dir = match tempfile::tempdir() {
        Ok(dir) => dir,
        Err(e) => panic!("tempdir: {e}"),
    };
    let path = dir.path().join("model.json");
    if let Err(e) = std::fs::write(&path, "[1, 2") {
        panic!("write: {e}");
    }
    match load_model(&path) {
        Err(GenerateError::Parse { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected a parse error, got {other:?}"),
    }
}

// Diagnostics

#[test]
fn notes_are_dropped_by_default() {
    let generated = match generate(overloaded(), &GeneratorOptions::new(Dialect::C)) {
        Ok(generated) => generated,
        Err(e) => panic!("generation failed: {e}"),
    };
    assert!(generated.diagnostics.is_empty());
    assert_eq!(generated.units.len(), 2);
}

#[test]
fn notes_are_kept_on_request() {
    let options = GeneratorOptions::new(Dialect::C).with_notes(true);
    let generated = match generate(overloaded(), &options) {
        Ok(generated) => generated,
        Err(e) => panic!("generation failed: {e}"),
    };
    let notes: Vec<_> = generated
        .diagnostics
        .iter()
        .map(|d| (d.code, d.severity, d.location.clone()))
        .collect();
    assert_eq!(
        notes,
        vec![(ErrorCode::E3001, Severity::Note, Some("NS.Foo::Go".to_string()))]
    );
    assert_eq!(generated.warning_count(), 0);
    assert_eq!(generated.error_count(), 0);
}

// Errors

#[test]
fn integrity_errors_map_to_coded_diagnostics() {
    let mut b = ModelBuilder::new("Lib");
    let foo = b.class("NS", "Foo");
    let nested = TypeExpr::by_ref(
        TypeExpr::by_ref(TypeExpr::INT, RefDirection::InOut),
        RefDirection::InOut,
    );
    b.method(foo, "Bad", vec![Param::new("x", nested)], TypeExpr::Void);

    let err = match generate(b.build(), &GeneratorOptions::default()) {
        Ok(_) => panic!("nested by-ref must abort the run"),
        Err(e) => e,
    };
    let diag = match err.diagnostic() {
        Some(diag) => diag,
        None => panic!("no diagnostic for {err}"),
    };
    assert_eq!(diag.code, ErrorCode::E1001);
    assert!(diag.is_error());
    assert!(diag.message.contains("NS.Foo::Bad"));
}

#[test]
fn empty_model_has_no_coded_diagnostic() {
    let err = match generate(Model::new("Empty"), &GeneratorOptions::default()) {
        Ok(_) => panic!("an empty model must be rejected"),
        Err(e) => e,
    };
    assert!(matches!(
        err,
        GenerateError::Pipeline(PipelineError::EmptyModel(ref name)) if name == "Empty"
    ));
    assert_eq!(err.diagnostic(), None);
}
