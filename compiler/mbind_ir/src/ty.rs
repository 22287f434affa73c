//! Type expressions.
//!
//! A [`TypeExpr`] is a closed tagged variant over every type shape a member
//! signature can mention. Named types (classes, value types, enums,
//! interfaces) are referenced by [`DeclId`]; their structure lives on the
//! declaration.

use std::fmt;

use crate::DeclId;

/// Managed primitive kinds.
///
/// `Decimal` and `DateTime` are modeled so the loader can describe them,
/// but they have no native mapping.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PrimitiveKind {
    Bool,
    /// UTF-16 code unit.
    Char,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    Decimal,
    DateTime,
}

impl PrimitiveKind {
    /// All primitive kinds, in declaration order.
    pub const ALL: [PrimitiveKind; 14] = [
        PrimitiveKind::Bool,
        PrimitiveKind::Char,
        PrimitiveKind::I8,
        PrimitiveKind::U8,
        PrimitiveKind::I16,
        PrimitiveKind::U16,
        PrimitiveKind::I32,
        PrimitiveKind::U32,
        PrimitiveKind::I64,
        PrimitiveKind::U64,
        PrimitiveKind::F32,
        PrimitiveKind::F64,
        PrimitiveKind::Decimal,
        PrimitiveKind::DateTime,
    ];

    /// Whether the kind has a native mapping at all.
    pub const fn is_supported(self) -> bool {
        !matches!(self, PrimitiveKind::Decimal | PrimitiveKind::DateTime)
    }

    /// Whether the kind is an integer type usable as an enum backing type.
    pub const fn is_integral(self) -> bool {
        matches!(
            self,
            PrimitiveKind::I8
                | PrimitiveKind::U8
                | PrimitiveKind::I16
                | PrimitiveKind::U16
                | PrimitiveKind::I32
                | PrimitiveKind::U32
                | PrimitiveKind::I64
                | PrimitiveKind::U64
        )
    }

    /// Whether the kind is a signed integer.
    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            PrimitiveKind::I8 | PrimitiveKind::I16 | PrimitiveKind::I32 | PrimitiveKind::I64
        )
    }

    /// The name the runtime's method-description syntax uses for this kind.
    pub const fn managed_name(self) -> &'static str {
        match self {
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::Char => "char",
            PrimitiveKind::I8 => "sbyte",
            PrimitiveKind::U8 => "byte",
            PrimitiveKind::I16 => "int16",
            PrimitiveKind::U16 => "uint16",
            PrimitiveKind::I32 => "int",
            PrimitiveKind::U32 => "uint",
            PrimitiveKind::I64 => "long",
            PrimitiveKind::U64 => "ulong",
            PrimitiveKind::F32 => "single",
            PrimitiveKind::F64 => "double",
            PrimitiveKind::Decimal => "decimal",
            PrimitiveKind::DateTime => "System.DateTime",
        }
    }

    /// Language-neutral name used to build synthesized type names.
    pub const fn stable_name(self) -> &'static str {
        match self {
            PrimitiveKind::Bool => "Bool",
            PrimitiveKind::Char => "Char",
            PrimitiveKind::I8 => "SByte",
            PrimitiveKind::U8 => "Byte",
            PrimitiveKind::I16 => "Int16",
            PrimitiveKind::U16 => "UInt16",
            PrimitiveKind::I32 => "Int32",
            PrimitiveKind::U32 => "UInt32",
            PrimitiveKind::I64 => "Int64",
            PrimitiveKind::U64 => "UInt64",
            PrimitiveKind::F32 => "Single",
            PrimitiveKind::F64 => "Double",
            PrimitiveKind::Decimal => "Decimal",
            PrimitiveKind::DateTime => "DateTime",
        }
    }
}

/// Direction of a by-ref parameter.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RefDirection {
    /// `in T`: passed by reference, never reassigned by the callee.
    In,
    /// `out T`: written by the callee, never read.
    Out,
    /// `ref T`: read and possibly reassigned by the callee.
    InOut,
}

impl RefDirection {
    /// Whether the callee may store a new value through the reference.
    pub const fn writes_back(self) -> bool {
        matches!(self, RefDirection::Out | RefDirection::InOut)
    }

    /// Whether the caller's value is meaningful on entry.
    pub const fn reads_in(self) -> bool {
        matches!(self, RefDirection::In | RefDirection::InOut)
    }
}

/// A type expression as it appears in a member signature.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TypeExpr {
    Void,
    Primitive(PrimitiveKind),
    String,
    /// A class, value type, enum or interface declared in the model.
    Decl(DeclId),
    /// Single-dimensional, zero-based array.
    Array(Box<TypeExpr>),
    /// Never wraps another `ByRef`.
    ByRef(Box<TypeExpr>, RefDirection),
    /// A managed type the loader could not express (generic instances,
    /// pointers, delegates); carries the managed name for diagnostics.
    Unsupported(String),
}

impl TypeExpr {
    pub const BOOL: TypeExpr = TypeExpr::Primitive(PrimitiveKind::Bool);
    pub const CHAR: TypeExpr = TypeExpr::Primitive(PrimitiveKind::Char);
    pub const INT: TypeExpr = TypeExpr::Primitive(PrimitiveKind::I32);
    pub const LONG: TypeExpr = TypeExpr::Primitive(PrimitiveKind::I64);
    pub const DOUBLE: TypeExpr = TypeExpr::Primitive(PrimitiveKind::F64);

    /// `T[]`.
    pub fn array(element: TypeExpr) -> Self {
        TypeExpr::Array(Box::new(element))
    }

    /// `ref T` / `out T` / `in T`.
    pub fn by_ref(inner: TypeExpr, direction: RefDirection) -> Self {
        TypeExpr::ByRef(Box::new(inner), direction)
    }

    /// Whether this is the `void` return type.
    pub fn is_void(&self) -> bool {
        matches!(self, TypeExpr::Void)
    }

    /// Split off one level of by-ref decoration.
    pub fn strip_by_ref(&self) -> (&TypeExpr, Option<RefDirection>) {
        match self {
            TypeExpr::ByRef(inner, dir) => (inner, Some(*dir)),
            other => (other, None),
        }
    }

    /// The referenced declaration, looking through one by-ref level.
    pub fn decl(&self) -> Option<DeclId> {
        match self.strip_by_ref().0 {
            TypeExpr::Decl(id) => Some(*id),
            _ => None,
        }
    }

    /// Visit this type and every type nested inside it, outermost first.
    pub fn walk(&self, f: &mut impl FnMut(&TypeExpr)) {
        f(self);
        match self {
            TypeExpr::Array(inner) | TypeExpr::ByRef(inner, _) => inner.walk(f),
            TypeExpr::Void
            | TypeExpr::Primitive(_)
            | TypeExpr::String
            | TypeExpr::Decl(_)
            | TypeExpr::Unsupported(_) => {}
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Void => write!(f, "void"),
            TypeExpr::Primitive(kind) => write!(f, "{}", kind.managed_name()),
            TypeExpr::String => write!(f, "string"),
            TypeExpr::Decl(id) => write!(f, "#{}", id.raw()),
            TypeExpr::Array(inner) => write!(f, "{inner}[]"),
            TypeExpr::ByRef(inner, RefDirection::In) => write!(f, "in {inner}"),
            TypeExpr::ByRef(inner, RefDirection::Out) => write!(f, "out {inner}"),
            TypeExpr::ByRef(inner, RefDirection::InOut) => write!(f, "ref {inner}"),
            TypeExpr::Unsupported(name) => write!(f, "{name}"),
        }
    }
}

/// A compile-time constant: parameter defaults and literal field values.
///
/// Floats are stored as their bit pattern so the type stays `Eq + Hash`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConstantValue {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(u64),
    Char(u16),
    String(String),
    Null,
}

impl ConstantValue {
    /// Build a float constant from its value.
    pub fn float(value: f64) -> Self {
        ConstantValue::Float(value.to_bits())
    }

    /// Recover the value of a float constant.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConstantValue::Float(bits) => Some(f64::from_bits(*bits)),
            _ => None,
        }
    }
}
