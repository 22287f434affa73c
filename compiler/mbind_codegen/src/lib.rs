//! mbind codegen - native source emission.
//!
//! Turns a [`FrozenModel`](mbind_ir::FrozenModel) into one header and one
//! implementation unit for the chosen dialect. The emitted code calls into
//! the embedded runtime to find classes and methods, marshal arguments,
//! invoke and convert results back.
//!
//! # Architecture
//!
//! - [`generate`]: walks the emission order and assembles the units
//! - `member`: one body per method, constructor or accessor, built in
//!   fixed [`Stage`]s
//! - `marshal`: native ↔ managed conversions, written once against
//!   [`Target`]
//! - `target`: everything spelled differently per dialect
//!
//! Codegen never mutates the model and never decides names: everything it
//! prints was settled by the pass pipeline.

mod code;
mod context;
mod literal;
mod marshal;
mod member;
pub mod mono;
mod options;
mod target;
mod unit;

#[cfg(test)]
mod test_helpers;

use mbind_types::UnsupportedType;

pub use code::Code;
pub use context::CodegenContext;
pub use member::{generate_member, MemberBody, Stage};
pub use options::{CodegenOptions, ExceptionMode, LookupStrategy, UnknownSetting};
pub use target::{for_dialect, CTarget, CppTarget, ObjCTarget, Target};
pub use unit::{generate, OutputUnit, UnitKind};

/// A type reached codegen without a native mapping.
///
/// The validation pass suppresses members whose signatures cannot be
/// expressed, so this only fires on a model that bypassed it.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CodegenError {
    #[error("`{member}`: {source}")]
    Member {
        member: String,
        source: UnsupportedType,
    },

    #[error("`{decl}`: {source}")]
    Declaration {
        decl: String,
        source: UnsupportedType,
    },
}
