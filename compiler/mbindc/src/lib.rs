//! mbindc - driver for the mbind binding generator.
//!
//! Reads a declaration model, runs the pass pipeline, generates the units
//! of one dialect and collects every diagnostic of the run:
//!
//! ```text
//! model.json ──► load_model ──► run_pipeline ──► codegen::generate ──► write_units
//!                                     │
//!                                     └──► diagnostics (reported at the end)
//! ```

mod generate;
mod options;
mod output;
mod tracing_setup;

pub use generate::{generate, load_model, parse_model, GenerateError, Generated};
pub use options::{parse_args, CliArgs, GeneratorOptions, OptionsError};
pub use output::write_units;
pub use tracing_setup::init_tracing;
