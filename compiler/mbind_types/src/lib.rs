//! Target dialects and the type printer.
//!
//! Everything dialect-specific that is a pure function of the model lives
//! here:
//! - [`Dialect`] and its capability table ([`DialectCaps`])
//! - reserved words per dialect
//! - [`TypePrinter`]: type expression to native spelling, stable
//!   cross-language names, flattened declaration names
//! - [`base_name`]: the name members are grouped by for collision
//!   resolution

mod dialect;
mod keywords;
mod names;
mod printer;

pub use dialect::{Dialect, DialectCaps, ReprStrategy, UnknownDialect};
pub use names::{base_name, flatten, ACCESSOR_PREFIXES};
pub use printer::{TypePrinter, UnsupportedType};
