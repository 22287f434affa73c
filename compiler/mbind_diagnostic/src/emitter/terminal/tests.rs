#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use super::*;
use crate::ErrorCode;

fn sample_diagnostic() -> Diagnostic {
    Diagnostic::warning(ErrorCode::E2001)
        .with_message("unsupported type `decimal`")
        .at("NS.Shop::Price")
        .with_note("the member is skipped")
}

fn render(mode: ColorMode, f: impl FnOnce(&mut TerminalEmitter<&mut Vec<u8>>)) -> String {
    let mut output = Vec::new();
    let mut emitter = TerminalEmitter::with_color_mode(&mut output, mode, false);
    f(&mut emitter);
    emitter.flush();
    String::from_utf8(output).unwrap()
}

#[test]
fn plain_output_layout() {
    let text = render(ColorMode::Never, |e| e.emit(&sample_diagnostic()));
    assert_eq!(
        text,
        "warning[E2001]: unsupported type `decimal`\n  --> NS.Shop::Price\n  = note: the member is skipped\n\n"
    );
}

#[test]
fn colored_output_has_escapes() {
    let text = render(ColorMode::Always, |e| e.emit(&sample_diagnostic()));
    assert!(text.contains("\x1b["));
    assert!(text.contains("E2001"));
}

#[test]
fn emit_all_writes_each() {
    let text = render(ColorMode::Never, |e| {
        e.emit_all(&[
            Diagnostic::error(ErrorCode::E1001).with_message("error 1"),
            Diagnostic::warning(ErrorCode::E2001).with_message("warning 1"),
        ]);
    });
    assert!(text.contains("error[E1001]: error 1"));
    assert!(text.contains("warning[E2001]: warning 1"));
}

// Summary

#[test]
fn summary_errors_and_warnings() {
    let text = render(ColorMode::Never, |e| e.emit_summary(2, 1));
    assert_eq!(
        text,
        "error: no bindings generated due to 2 errors; 1 warning emitted\n"
    );
}

#[test]
fn summary_single_error() {
    let text = render(ColorMode::Never, |e| e.emit_summary(1, 0));
    assert_eq!(text, "error: no bindings generated due to 1 error\n");
}

#[test]
fn summary_warnings_only() {
    let text = render(ColorMode::Never, |e| e.emit_summary(0, 3));
    assert_eq!(text, "warning: 3 warnings emitted\n");
}

#[test]
fn summary_empty_when_clean() {
    let text = render(ColorMode::Never, |e| e.emit_summary(0, 0));
    assert!(text.is_empty());
}

#[test]
fn color_mode_resolution() {
    assert!(ColorMode::Auto.should_use_colors(true));
    assert!(!ColorMode::Auto.should_use_colors(false));
    assert!(ColorMode::Always.should_use_colors(false));
    assert!(!ColorMode::Never.should_use_colors(true));
    assert_eq!(ColorMode::default(), ColorMode::Auto);
}
