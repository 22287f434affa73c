//! Type declarations.
//!
//! Declared kinds come from the metadata loader; `ArrayWrapper` and
//! `ObjectRepr` only ever appear as synthesized declarations, and proxy
//! classes are synthesized `Class` declarations with `proxy_of` set.

use bitflags::bitflags;

use crate::{DeclId, MemberId, PrimitiveKind, TypeExpr};

/// Managed accessibility.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Access {
    #[default]
    Public,
    Protected,
    Internal,
    Private,
}

impl Access {
    pub const fn is_private(self) -> bool {
        matches!(self, Access::Private)
    }
}

/// Where a declaration or member came from.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Origin {
    /// Supplied by the metadata loader.
    #[default]
    Declared,
    /// Created by a pipeline pass.
    Synthesized,
}

bitflags! {
    /// Shape flags of a class declaration.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ClassFlags: u8 {
        /// A struct: marshaled by copy, never behind a handle.
        const VALUE_TYPE = 1 << 0;
        /// `static class`: no instances, no handle.
        const STATIC = 1 << 1;
        const ABSTRACT = 1 << 2;
        const SEALED = 1 << 3;
    }
}

/// A class or value type.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassDecl {
    /// Fields, properties, methods and constructors in declaration order.
    pub members: Vec<MemberId>,
    pub base: Option<DeclId>,
    pub interfaces: Vec<DeclId>,
    pub flags: ClassFlags,
    /// Set on synthesized proxy classes.
    pub proxy_of: Option<DeclId>,
    /// The injected handle field (embedded-field strategy).
    pub handle_field: Option<MemberId>,
    /// The synthesized handle holder (opaque-typedef strategy).
    pub object_repr: Option<DeclId>,
}

impl ClassDecl {
    pub fn is_value_type(&self) -> bool {
        self.flags.contains(ClassFlags::VALUE_TYPE)
    }

    pub fn is_static(&self) -> bool {
        self.flags.contains(ClassFlags::STATIC)
    }

    pub fn is_abstract(&self) -> bool {
        self.flags.contains(ClassFlags::ABSTRACT)
    }

    /// Whether instances cross the boundary behind a handle.
    pub fn needs_handle(&self) -> bool {
        !self.is_value_type() && !self.is_static()
    }
}

/// An enum item. `value` is `None` when the item continues from the
/// previous one.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnumItem {
    pub name: String,
    /// Escaped spelling; starts out equal to `name`.
    pub native_name: String,
    pub value: Option<i128>,
}

impl EnumItem {
    pub fn new(name: impl Into<String>, value: Option<i128>) -> Self {
        let name = name.into();
        EnumItem {
            native_name: name.clone(),
            name,
            value,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnumDecl {
    pub backing: PrimitiveKind,
    pub items: Vec<EnumItem>,
    /// `[Flags]` enums keep their item values; Objective-C declares them
    /// with `NS_OPTIONS` instead of `NS_ENUM`.
    pub is_flags: bool,
}

impl EnumDecl {
    /// Item values with implicit items resolved: an item without an explicit
    /// value is one more than its predecessor, and the first defaults to 0.
    /// Counting stops at `i128::MAX`.
    pub fn resolved_values(&self) -> Vec<i128> {
        let mut next = 0i128;
        self.items
            .iter()
            .map(|item| {
                let value = item.value.unwrap_or(next);
                next = value.saturating_add(1);
                value
            })
            .collect()
    }

    /// Whether the backing type differs from the runtime's default `int`.
    pub fn has_default_backing(&self) -> bool {
        self.backing == PrimitiveKind::I32
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InterfaceDecl {
    pub members: Vec<MemberId>,
    pub bases: Vec<DeclId>,
}

/// Shared native container type for "array of `element`".
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArrayWrapperDecl {
    pub element: TypeExpr,
    /// Canonical native spelling of `element`; the cache key.
    pub key: String,
}

/// Opaque handle holder for a class in dialects without native classes.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectReprDecl {
    pub class: DeclId,
    /// The typedef name callers see; the declaration's own name is the
    /// struct tag.
    pub typedef_name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DeclKind {
    Class(ClassDecl),
    Enum(EnumDecl),
    Interface(InterfaceDecl),
    ArrayWrapper(ArrayWrapperDecl),
    ObjectRepr(ObjectReprDecl),
}

/// A type declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeDecl {
    /// Dotted namespace; empty for the global namespace and synthesized types.
    pub namespace: String,
    pub name: String,
    /// Enclosing type of a nested type.
    pub declaring_type: Option<DeclId>,
    pub access: Access,
    /// Metadata token (`0x02xxxxxx`), used by token-based class lookup.
    pub token: u32,
    pub kind: DeclKind,
    pub origin: Origin,
    /// Set when the whole type is dropped from emission.
    pub suppressed: bool,
}

impl TypeDecl {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, kind: DeclKind) -> Self {
        TypeDecl {
            namespace: namespace.into(),
            name: name.into(),
            declaring_type: None,
            access: Access::Public,
            token: 0,
            kind,
            origin: Origin::Declared,
            suppressed: false,
        }
    }

    /// A pass-created declaration in the global namespace.
    pub fn synthesized(name: impl Into<String>, kind: DeclKind) -> Self {
        TypeDecl {
            origin: Origin::Synthesized,
            ..TypeDecl::new(String::new(), name, kind)
        }
    }

    /// Members of a class or interface; empty for every other kind.
    pub fn members(&self) -> &[MemberId] {
        match &self.kind {
            DeclKind::Class(class) => &class.members,
            DeclKind::Interface(iface) => &iface.members,
            DeclKind::Enum(_) | DeclKind::ArrayWrapper(_) | DeclKind::ObjectRepr(_) => &[],
        }
    }

    pub fn as_class(&self) -> Option<&ClassDecl> {
        match &self.kind {
            DeclKind::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn as_class_mut(&mut self) -> Option<&mut ClassDecl> {
        match &mut self.kind {
            DeclKind::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumDecl> {
        match &self.kind {
            DeclKind::Enum(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_interface(&self) -> Option<&InterfaceDecl> {
        match &self.kind {
            DeclKind::Interface(iface) => Some(iface),
            _ => None,
        }
    }

    pub fn is_interface(&self) -> bool {
        matches!(self.kind, DeclKind::Interface(_))
    }

    pub fn is_value_type(&self) -> bool {
        self.as_class().is_some_and(ClassDecl::is_value_type)
    }

    /// Whether values of this type are managed references (handles).
    pub fn is_reference_type(&self) -> bool {
        match &self.kind {
            DeclKind::Class(class) => !class.is_value_type(),
            DeclKind::Interface(_) => true,
            DeclKind::Enum(_) | DeclKind::ArrayWrapper(_) | DeclKind::ObjectRepr(_) => false,
        }
    }

    pub fn is_synthesized(&self) -> bool {
        self.origin == Origin::Synthesized
    }
}
