//! Structural model errors.
//!
//! These are the only fatal errors of a run: a pass that observes one cannot
//! repair it locally, so generation aborts rather than emit code whose
//! invariants nobody checked.

use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ModelIntegrityError {
    #[error("`{member}`: by-ref type wraps another by-ref type")]
    NestedByRef { member: String },

    #[error("`{member}`: by-ref type outside a parameter position")]
    MisplacedByRef { member: String },

    #[error("`{owner}`: reference to unknown declaration #{index}")]
    DanglingDecl { owner: String, index: u32 },

    #[error("`{owner}`: member #{index} is declared by another type")]
    ForeignMember { owner: String, index: u32 },

    #[error("`{owner}`: enum backing type `{backing}` is not an integer type")]
    InvalidEnumBacking { owner: String, backing: String },

    #[error("`{owner}`: inheritance cycle through `{through}`")]
    InheritanceCycle { owner: String, through: String },

    #[error("`{assembly}`: declaration #{index} appears twice in the emission order")]
    DuplicateEmission { assembly: String, index: u32 },
}
