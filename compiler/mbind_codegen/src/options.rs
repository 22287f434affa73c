//! Generation-time settings that shape every emitted body.

use std::fmt;
use std::str::FromStr;

use mbind_types::Dialect;

/// How emitted code finds classes, methods and fields at run time.
///
/// Decided once per run: every lookup site takes the same branch.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum LookupStrategy {
    /// By metadata token. Only valid when the assembly is not rewritten
    /// after generation (no linker or obfuscator reshuffling tables).
    Token,
    /// By fully qualified name and signature.
    #[default]
    Name,
}

impl LookupStrategy {
    pub const fn as_str(self) -> &'static str {
        match self {
            LookupStrategy::Token => "token",
            LookupStrategy::Name => "name",
        }
    }
}

/// What an emitted body does when the managed call throws.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ExceptionMode {
    /// Raise a caller-visible failure, then return the default value.
    #[default]
    Throw,
    /// Return the default value silently.
    Ignore,
}

impl ExceptionMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            ExceptionMode::Throw => "throw",
            ExceptionMode::Ignore => "ignore",
        }
    }
}

impl fmt::Display for LookupStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ExceptionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown {what} `{value}`")]
pub struct UnknownSetting {
    pub what: &'static str,
    pub value: String,
}

impl FromStr for LookupStrategy {
    type Err = UnknownSetting;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "token" => Ok(LookupStrategy::Token),
            "name" => Ok(LookupStrategy::Name),
            _ => Err(UnknownSetting {
                what: "lookup strategy",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for ExceptionMode {
    type Err = UnknownSetting;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "throw" => Ok(ExceptionMode::Throw),
            "ignore" => Ok(ExceptionMode::Ignore),
            _ => Err(UnknownSetting {
                what: "exception mode",
                value: s.to_string(),
            }),
        }
    }
}

/// Settings for one codegen run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodegenOptions {
    pub dialect: Dialect,
    /// Managed assembly file the emitted code loads, without extension.
    pub library: String,
    /// Separator used when flattening qualified names; must match the one
    /// the pipeline ran with.
    pub separator: String,
    pub lookup: LookupStrategy,
    pub exceptions: ExceptionMode,
    /// Stem of the emitted file names.
    pub base_name: String,
}

impl CodegenOptions {
    pub fn new(dialect: Dialect, library: impl Into<String>) -> Self {
        let library = library.into();
        CodegenOptions {
            dialect,
            base_name: library.clone(),
            library,
            separator: "_".to_string(),
            lookup: LookupStrategy::default(),
            exceptions: ExceptionMode::default(),
        }
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
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    #[must_use]
    pub fn with_base_name(mut self, base_name: impl Into<String>) -> Self {
        self.base_name = base_name.into();
        self
    }

    /// Identifier-safe form of the library name, used to prefix public
    /// support symbols.
    pub fn symbol_prefix(&self) -> String {
        self.library
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect()
    }
}
