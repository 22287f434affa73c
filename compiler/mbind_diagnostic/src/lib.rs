//! Diagnostic system for the binding generator.
//!
//! Problems found while transforming the model fall in two classes:
//! - **Degrading** problems (an unsupported parameter type, an ambiguous
//!   collision) are recorded here and generation continues.
//! - **Structural** problems abort the run through
//!   [`mbind_ir::ModelIntegrityError`]; they are converted to a
//!   diagnostic only for reporting.
//!
//! Everything is collected in a [`DiagnosticQueue`] and reported once at
//! the end of the run, so the emitted files and the diagnostics are both
//! complete artifacts of the same run.

mod diagnostic;
pub mod emitter;
mod error_code;
pub mod queue;

pub use diagnostic::{Diagnostic, Severity};
pub use error_code::ErrorCode;
pub use queue::{DiagnosticConfig, DiagnosticQueue};
