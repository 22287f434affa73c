//! Core diagnostic types.
//!
//! The generator has no source text to point into, so a diagnostic is
//! located by the dotted path of the declaration or member it concerns
//! (`NS.Foo::Bar`) instead of a span.

use std::fmt;

use crate::ErrorCode;

/// Severity level for diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[must_use = "diagnostics should be reported or returned, not silently dropped"]
pub struct Diagnostic {
    /// Error code for searchability.
    pub code: ErrorCode,
    pub severity: Severity,
    /// Main message.
    pub message: String,
    /// Path of the declaration or member concerned.
    pub location: Option<String>,
    /// Additional notes providing context.
    pub notes: Vec<String>,
}

impl Diagnostic {
    fn new_with_severity(code: ErrorCode, severity: Severity) -> Self {
        Diagnostic {
            code,
            severity,
            message: String::new(),
            location: None,
            notes: Vec::new(),
        }
    }

    /// Create a new error diagnostic.
    #[cold]
    pub fn error(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Error)
    }

    /// Create a new warning diagnostic.
    #[cold]
    pub fn warning(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Warning)
    }

    /// Create a new note diagnostic.
    pub fn note(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Note)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Attach the path of the declaration or member concerned.
    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.code, self.message)?;
        if let Some(location) = &self.location {
            write!(f, " (at `{location}`)")?;
        }
        Ok(())
    }
}

/// A fatal model error always reports as an error.
impl From<&mbind_ir::ModelIntegrityError> for Diagnostic {
    fn from(err: &mbind_ir::ModelIntegrityError) -> Self {
        Diagnostic::error(ErrorCode::from(err)).with_message(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_parts() {
        let diag = Diagnostic::warning(ErrorCode::E2001)
            .with_message("unsupported type `decimal`")
            .at("NS.Foo::Price")
            .with_note("member skipped");

        assert!(diag.is_warning());
        assert!(!diag.is_error());
        assert_eq!(diag.location.as_deref(), Some("NS.Foo::Price"));
        assert_eq!(diag.notes, vec!["member skipped".to_string()]);
        assert_eq!(
            diag.to_string(),
            "warning[E2001]: unsupported type `decimal` (at `NS.Foo::Price`)"
        );
    }

    #[test]
    fn integrity_errors_convert_to_errors() {
        let err = mbind_ir::ModelIntegrityError::NestedByRef {
            member: "NS.Foo::Bar".to_string(),
        };
        let diag = Diagnostic::from(&err);
        assert!(diag.is_error());
        assert_eq!(diag.code, ErrorCode::E1001);
        assert!(diag.message.contains("NS.Foo::Bar"));
    }
}
