//! Generator configuration and command-line parsing.

use std::path::PathBuf;

use mbind_codegen::{CodegenOptions, ExceptionMode, LookupStrategy, UnknownSetting};
use mbind_diagnostic::emitter::ColorMode;
use mbind_types::{Dialect, UnknownDialect};
use thiserror::Error;

/// Settings of one generator run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratorOptions {
    pub dialect: Dialect,
    /// Assembly file the emitted code loads, without extension. Defaults to
    /// the model's assembly name.
    pub library: Option<String>,
    /// Separator used when flattening qualified names.
    pub separator: String,
    pub lookup: LookupStrategy,
    pub exceptions: ExceptionMode,
    /// Stem of the emitted file names. Defaults to the library name.
    pub base_name: Option<String>,
    /// Keep note diagnostics (renames, escapes) in the report.
    pub notes: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        GeneratorOptions {
            dialect: Dialect::C,
            library: None,
            separator: "_".to_string(),
            lookup: LookupStrategy::default(),
            exceptions: ExceptionMode::default(),
            base_name: None,
            notes: false,
        }
    }
}

impl GeneratorOptions {
    pub fn new(dialect: Dialect) -> Self {
        GeneratorOptions {
            dialect,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_library(mut self, library: impl Into<String>) -> Self {
        self.library = Some(library.into());
        self
    }

    #[must_use]
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    #[must_use]
    pub fn with_lookup(mut self, lookup: LookupStrategy) -> Self {
        self.lookup = lookup;
        self
    }

    #[must_use]
    pub fn with_exceptions(mut self, exceptions: ExceptionMode) -> Self {
        self.exceptions = exceptions;
        self
    }

    #[must_use]
    pub fn with_base_name(mut self, base_name: impl Into<String>) -> Self {
        self.base_name = Some(base_name.into());
        self
    }

    #[must_use]
    pub fn with_notes(mut self, notes: bool) -> Self {
        self.notes = notes;
        self
    }

    /// Codegen settings for a model loaded from `assembly`.
    pub fn codegen_options(&self, assembly: &str) -> CodegenOptions {
        let library = self.library.as_deref().unwrap_or(assembly);
        let mut options = CodegenOptions::new(self.dialect, library)
            .with_separator(self.separator.clone())
            .with_lookup(self.lookup)
            .with_exceptions(self.exceptions);
        if let Some(base) = &self.base_name {
            options = options.with_base_name(base.clone());
        }
        options
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum OptionsError {
    #[error(transparent)]
    Dialect(#[from] UnknownDialect),

    #[error(transparent)]
    Setting(#[from] UnknownSetting),

    #[error("unknown color mode `{0}` (expected `auto`, `always` or `never`)")]
    Color(String),

    #[error("the name separator must not be empty")]
    EmptySeparator,

    #[error("unknown option `{0}`")]
    UnknownFlag(String),

    #[error("missing model file")]
    MissingInput,
}

/// Everything the command line selects.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CliArgs {
    pub input: PathBuf,
    pub out_dir: PathBuf,
    pub color: ColorMode,
    pub options: GeneratorOptions,
}

/// Parse `<model.json> [--key=value ..]`, in any order.
pub fn parse_args(args: &[String]) -> Result<CliArgs, OptionsError> {
    let mut options = GeneratorOptions::default();
    let mut input = None;
    let mut out_dir = PathBuf::from(".");
    let mut color = ColorMode::Auto;

    for arg in args {
        if let Some(dialect) = arg.strip_prefix("--dialect=") {
            options.dialect = dialect.parse()?;
        } else if let Some(library) = arg.strip_prefix("--library=") {
            options.library = Some(library.to_string());
        } else if let Some(separator) = arg.strip_prefix("--separator=") {
            if separator.is_empty() {
                return Err(OptionsError::EmptySeparator);
            }
            options.separator = separator.to_string();
        } else if let Some(lookup) = arg.strip_prefix("--lookup=") {
            options.lookup = lookup.parse()?;
        } else if let Some(mode) = arg.strip_prefix("--exceptions=") {
            options.exceptions = mode.parse()?;
        } else if let Some(base) = arg.strip_prefix("--base-name=") {
            options.base_name = Some(base.to_string());
        } else if let Some(dir) = arg.strip_prefix("--out-dir=") {
            out_dir = PathBuf::from(dir);
        } else if let Some(mode) = arg.strip_prefix("--color=") {
            color = match mode {
                "auto" => ColorMode::Auto,
                "always" => ColorMode::Always,
                "never" => ColorMode::Never,
                other => return Err(OptionsError::Color(other.to_string())),
            };
        } else if arg == "--notes" || arg == "-v" || arg == "--verbose" {
            options.notes = true;
        } else if arg.starts_with('-') {
            return Err(OptionsError::UnknownFlag(arg.clone()));
        } else if input.is_none() {
            input = Some(PathBuf::from(arg));
        } else {
            return Err(OptionsError::UnknownFlag(arg.clone()));
        }
    }

    Ok(CliArgs {
        input: input.ok_or(OptionsError::MissingInput)?,
        out_dir,
        color,
        options,
    })
}
