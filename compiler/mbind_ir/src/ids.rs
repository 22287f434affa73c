//! Arena indices for declarations and members.
//!
//! The model stores declarations and members in flat `Vec` arenas and links
//! them with `u32` indices instead of references or boxes:
//! - `DeclId(u32)` indexes the declaration arena
//! - `MemberId(u32)` indexes the member arena
//!
//! Indices stay valid for the life of the model because neither arena ever
//! removes entries; suppression only flags a member.

use std::fmt;

/// Index into the declaration arena.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct DeclId(u32);

impl DeclId {
    /// Create a new `DeclId`.
    #[inline]
    pub const fn new(index: u32) -> Self {
        DeclId(index)
    }

    /// Get the index into the arena.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Get the raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for DeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeclId({})", self.0)
    }
}

/// Index into the member arena.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct MemberId(u32);

impl MemberId {
    /// Create a new `MemberId`.
    #[inline]
    pub const fn new(index: u32) -> Self {
        MemberId(index)
    }

    /// Get the index into the arena.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Get the raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MemberId({})", self.0)
    }
}
