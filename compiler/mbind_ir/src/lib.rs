//! mbind IR - the declaration model.
//!
//! This crate holds the in-memory description of a managed library that the
//! rest of the generator works on:
//! - Type declarations (classes, value types, enums, interfaces) and the
//!   types the pipeline synthesizes (array wrappers, object
//!   representations, interface proxies)
//! - Members (methods, constructors, properties, fields) and parameters
//! - Type expressions used in member signatures
//!
//! # Design
//!
//! - **Arenas, not pointers**: declarations and members are addressed by
//!   `DeclId(u32)` / `MemberId(u32)`.
//! - **Closed variants**: [`TypeExpr`] and [`DeclKind`] are matched
//!   exhaustively; a new type shape is a new variant.
//! - **Additive mutation**: passes add, rename and suppress; nothing is
//!   removed, so diagnostics can always name the member they refer to.

mod builder;
mod decl;
mod error;
mod ids;
mod member;
mod model;
mod ty;

pub use builder::ModelBuilder;
pub use decl::{
    Access, ArrayWrapperDecl, ClassDecl, ClassFlags, DeclKind, EnumDecl, EnumItem, InterfaceDecl,
    ObjectReprDecl, Origin, TypeDecl,
};
pub use error::ModelIntegrityError;
pub use ids::{DeclId, MemberId};
pub use member::{
    native_spelling, Accessor, Constructor, Field, Member, MemberKind, MemberOrigin, Method, Param,
    Property, Suppression,
};
pub use model::{FrozenModel, Insertion, Model};
pub use ty::{ConstantValue, PrimitiveKind, RefDirection, TypeExpr};
