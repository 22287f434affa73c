//! The pass pipeline.
//!
//! Passes run in a fixed order over a mutable [`Model`](mbind_ir::Model)
//! and are each called exactly once per run:
//!
//! 0. [`validate`]: integrity checks (fatal) and unsupported-type
//!    suppression (warnings)
//! 1. [`escape_keywords`]: reserved words get a `_` prefix
//! 2. [`lower_accessors`]: fields and properties become `get_`/`set_`
//!    methods
//! 3. [`synthesize_object_reprs`]: handle holders per bound class
//! 4. [`synthesize_array_wrappers`]: one shared wrapper per element type
//! 5. [`synthesize_proxies`]: forwarding classes for interfaces that cross
//!    the boundary
//! 6. [`resolve_names`]: collision-free emitted names
//!
//! All per-run state (caches, pending insertions, diagnostics) lives in the
//! [`PipelineContext`] threaded through every pass.

mod arrays;
mod context;
mod escape;
mod lower;
mod object_repr;
mod pipeline;
mod proxy;
mod resolve;
mod validate;

pub use arrays::synthesize_array_wrappers;
pub use context::PipelineContext;
pub use escape::escape_keywords;
pub use lower::lower_accessors;
pub use object_repr::synthesize_object_reprs;
pub use pipeline::{run_pipeline, PipelineError};
pub use proxy::synthesize_proxies;
pub use resolve::resolve_names;
pub use validate::validate;

#[cfg(test)]
mod test_helpers;
