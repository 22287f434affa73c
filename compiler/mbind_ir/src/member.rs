//! Members: methods, constructors, properties and fields.

use crate::{Access, ConstantValue, DeclId, MemberId, TypeExpr};

/// A method or constructor parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Param {
    pub name: String,
    pub ty: TypeExpr,
    pub default: Option<ConstantValue>,
    /// Zero-based ordinal position.
    pub position: u32,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: TypeExpr) -> Self {
        Param {
            name: name.into(),
            ty,
            default: None,
            position: 0,
        }
    }

    #[must_use]
    pub fn with_default(mut self, value: ConstantValue) -> Self {
        self.default = Some(value);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Method {
    pub params: Vec<Param>,
    pub return_type: TypeExpr,
    pub is_virtual: bool,
    pub is_abstract: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Constructor {
    pub params: Vec<Param>,
}

/// A property accessor as it exists in metadata.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Accessor {
    pub token: u32,
    pub access: Access,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Property {
    pub ty: TypeExpr,
    /// Indexer parameters; empty for ordinary properties.
    pub params: Vec<Param>,
    pub getter: Option<Accessor>,
    pub setter: Option<Accessor>,
    pub is_virtual: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Field {
    pub ty: TypeExpr,
    pub is_readonly: bool,
    /// `const` field; has no storage and is never writable.
    pub is_literal: bool,
}

impl Field {
    pub fn is_writable(&self) -> bool {
        !self.is_readonly && !self.is_literal
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MemberKind {
    Method(Method),
    Constructor(Constructor),
    Property(Property),
    Field(Field),
}

/// Why a member was synthesized, or `Declared`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MemberOrigin {
    #[default]
    Declared,
    /// Getter lowered from the property or field `of`.
    Getter { of: MemberId },
    /// Setter lowered from the property or field `of`.
    Setter { of: MemberId },
    /// Injected handle field (embedded-field strategy).
    HandleField,
    /// Proxy override forwarding to the interface method `target`.
    ProxyForward { target: MemberId },
    /// Proxy accessor exposing the underlying handle.
    ProxyHandle,
}

impl MemberOrigin {
    /// The property or field an accessor was lowered from.
    pub fn accessor_of(self) -> Option<MemberId> {
        match self {
            MemberOrigin::Getter { of } | MemberOrigin::Setter { of } => Some(of),
            _ => None,
        }
    }
}

/// Why a member is excluded from emission.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Suppression {
    /// Replaced by synthesized accessor methods.
    Lowered,
    /// A parameter or return type has no native mapping.
    UnsupportedType,
    /// A constructor of an abstract class.
    AbstractConstructor,
    /// A private field; not part of the bound surface.
    Private,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Member {
    pub declaring: DeclId,
    /// Managed name; used for name-based runtime lookup and diagnostics.
    pub declared_name: String,
    /// Spelling before collision resolution (keyword-escaped, accessor
    /// prefixed).
    pub native_name: String,
    /// Final spelling, assigned by collision resolution.
    pub emitted_name: Option<String>,
    pub access: Access,
    pub is_static: bool,
    /// Metadata token, used by token-based method/field lookup.
    pub token: u32,
    pub kind: MemberKind,
    pub origin: MemberOrigin,
    pub suppressed: Option<Suppression>,
}

impl Member {
    pub fn new(declaring: DeclId, name: impl Into<String>, kind: MemberKind) -> Self {
        let declared_name = name.into();
        Member {
            declaring,
            native_name: native_spelling(&declared_name).to_string(),
            declared_name,
            emitted_name: None,
            access: Access::Public,
            is_static: false,
            token: 0,
            kind,
            origin: MemberOrigin::Declared,
            suppressed: None,
        }
    }

    /// Name to print: the resolved name once assigned, else the native name.
    pub fn emitted_name(&self) -> &str {
        self.emitted_name.as_deref().unwrap_or(&self.native_name)
    }

    pub fn params(&self) -> &[Param] {
        match &self.kind {
            MemberKind::Method(m) => &m.params,
            MemberKind::Constructor(c) => &c.params,
            MemberKind::Property(p) => &p.params,
            MemberKind::Field(_) => &[],
        }
    }

    /// Return type for methods, value type for properties and fields,
    /// `void` for constructors.
    pub fn value_type(&self) -> &TypeExpr {
        const VOID: &TypeExpr = &TypeExpr::Void;
        match &self.kind {
            MemberKind::Method(m) => &m.return_type,
            MemberKind::Constructor(_) => VOID,
            MemberKind::Property(p) => &p.ty,
            MemberKind::Field(f) => &f.ty,
        }
    }

    pub fn as_method(&self) -> Option<&Method> {
        match &self.kind {
            MemberKind::Method(m) => Some(m),
            _ => None,
        }
    }

    pub fn is_method(&self) -> bool {
        matches!(self.kind, MemberKind::Method(_))
    }

    pub fn is_constructor(&self) -> bool {
        matches!(self.kind, MemberKind::Constructor(_))
    }

    pub fn is_virtual(&self) -> bool {
        match &self.kind {
            MemberKind::Method(m) => m.is_virtual,
            MemberKind::Property(p) => p.is_virtual,
            MemberKind::Constructor(_) | MemberKind::Field(_) => false,
        }
    }

    /// Whether the member was produced by field/property lowering.
    pub fn is_accessor(&self) -> bool {
        self.origin.accessor_of().is_some()
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed.is_some()
    }

    /// Every type mentioned by the signature: parameters, then the value
    /// type.
    pub fn signature_types(&self) -> impl Iterator<Item = &TypeExpr> {
        self.params()
            .iter()
            .map(|p| &p.ty)
            .chain(std::iter::once(self.value_type()))
    }
}

/// Drop an explicit-interface qualification (`NS.IFoo.Bar` -> `Bar`).
pub fn native_spelling(name: &str) -> &str {
    name.rsplit_once('.').map_or(name, |(_, last)| last)
}
