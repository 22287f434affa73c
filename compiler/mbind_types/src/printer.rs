//! Type printer: type expressions to native spellings.
//!
//! Printing is a pure function of the type, the dialect and the frozen
//! shape of the model. Array wrapper names are computed from the element's
//! stable name, so printing never depends on which wrappers a pass has
//! already synthesized.

use mbind_ir::{DeclId, DeclKind, Model, PrimitiveKind, RefDirection, TypeExpr};

use crate::{flatten, Dialect};

/// A type with no native mapping. Carries the managed spelling.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("type `{0}` has no native mapping")]
pub struct UnsupportedType(pub String);

#[derive(Copy, Clone)]
pub struct TypePrinter<'a> {
    model: &'a Model,
    dialect: Dialect,
    separator: &'a str,
}

impl<'a> TypePrinter<'a> {
    pub fn new(model: &'a Model, dialect: Dialect, separator: &'a str) -> Self {
        TypePrinter {
            model,
            dialect,
            separator,
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn model(&self) -> &'a Model {
        self.model
    }

    // Declaration names

    /// The flattened native name of a declaration: namespace segments and
    /// the nesting chain joined with the separator. Synthesized
    /// declarations are already named natively.
    pub fn flat_name(&self, decl: DeclId) -> String {
        let d = self.model.decl(decl);
        if d.is_synthesized() {
            return d.name.clone();
        }
        let ns = self.model.namespace_of(decl);
        flatten(
            std::iter::once(ns).chain(self.model.nesting_chain(decl)),
            self.separator,
        )
    }

    /// Name of the proxy class synthesized for an interface.
    pub fn proxy_name(&self, iface: DeclId) -> String {
        format!("{}{}Proxy", self.flat_name(iface), self.separator)
    }

    // Type spelling

    pub fn primitive(&self, kind: PrimitiveKind) -> Result<&'static str, UnsupportedType> {
        let spelling = match (kind, self.dialect) {
            (PrimitiveKind::Bool, Dialect::C | Dialect::Cpp) => "bool",
            (PrimitiveKind::Bool, Dialect::ObjC) => "BOOL",
            (PrimitiveKind::Char, Dialect::C) => "gunichar2",
            (PrimitiveKind::Char, Dialect::Cpp) => "char16_t",
            (PrimitiveKind::Char, Dialect::ObjC) => "unichar",
            (PrimitiveKind::I8, _) => "int8_t",
            (PrimitiveKind::U8, _) => "uint8_t",
            (PrimitiveKind::I16, _) => "int16_t",
            (PrimitiveKind::U16, _) => "uint16_t",
            (PrimitiveKind::I32, _) => "int32_t",
            (PrimitiveKind::U32, _) => "uint32_t",
            (PrimitiveKind::I64, _) => "int64_t",
            (PrimitiveKind::U64, _) => "uint64_t",
            (PrimitiveKind::F32, _) => "float",
            (PrimitiveKind::F64, _) => "double",
            (PrimitiveKind::Decimal | PrimitiveKind::DateTime, _) => {
                return Err(UnsupportedType(kind.managed_name().to_string()));
            }
        };
        Ok(spelling)
    }

    /// Native spelling of a string passed by value.
    pub fn string(&self) -> &'static str {
        match self.dialect {
            Dialect::C => "const char*",
            Dialect::Cpp => "std::string",
            Dialect::ObjC => "NSString*",
        }
    }

    /// Native spelling of a by-ref string.
    pub fn string_by_ref(&self, direction: RefDirection) -> &'static str {
        match (self.dialect, direction.writes_back()) {
            (Dialect::C, false) => "const char**",
            (Dialect::C, true) => "GString*",
            (Dialect::Cpp, _) => "std::string&",
            (Dialect::ObjC, false) => "NSString**",
            (Dialect::ObjC, true) => "NSMutableString*",
        }
    }

    /// Native spelling of `ty`.
    pub fn print(&self, ty: &TypeExpr) -> Result<String, UnsupportedType> {
        match ty {
            TypeExpr::Void => Ok("void".to_string()),
            TypeExpr::Primitive(kind) => self.primitive(*kind).map(str::to_string),
            TypeExpr::String => Ok(self.string().to_string()),
            TypeExpr::Decl(id) => Ok(self.print_decl(*id)),
            TypeExpr::Array(element) => {
                let wrapper = self.array_wrapper_name(element)?;
                Ok(match self.dialect {
                    Dialect::Cpp => wrapper,
                    Dialect::C | Dialect::ObjC => format!("{wrapper}*"),
                })
            }
            TypeExpr::ByRef(inner, direction) => match inner.as_ref() {
                TypeExpr::String => Ok(self.string_by_ref(*direction).to_string()),
                TypeExpr::ByRef(..) | TypeExpr::Void => Err(self.unsupported(ty)),
                other => {
                    let inner = self.print(other)?;
                    Ok(format!("{inner}{}", self.dialect.caps().by_ref_marker))
                }
            },
            TypeExpr::Unsupported(name) => Err(UnsupportedType(name.clone())),
        }
    }

    fn print_decl(&self, id: DeclId) -> String {
        let decl = self.model.decl(id);
        let flat = self.flat_name(id);
        match &decl.kind {
            DeclKind::Enum(_) => flat,
            DeclKind::Class(class) if class.is_value_type() => flat,
            DeclKind::Class(_) | DeclKind::ArrayWrapper(_) => format!("{flat}*"),
            DeclKind::Interface(_) => match self.dialect {
                Dialect::ObjC => format!("id<{flat}>"),
                Dialect::C | Dialect::Cpp => format!("{flat}*"),
            },
            DeclKind::ObjectRepr(repr) => format!("{}*", repr.typedef_name),
        }
    }

    /// Spelling of `ty` where a by-ref parameter is dereferenced: the
    /// storage type of the referenced value.
    pub fn print_storage(&self, ty: &TypeExpr) -> Result<String, UnsupportedType> {
        self.print(ty.strip_by_ref().0)
    }

    // Arrays

    /// Language-neutral name used to build synthesized type names.
    pub fn stable_name(&self, ty: &TypeExpr) -> Result<String, UnsupportedType> {
        match ty {
            TypeExpr::Primitive(kind) if kind.is_supported() => Ok(kind.stable_name().to_string()),
            TypeExpr::String => Ok("String".to_string()),
            TypeExpr::Decl(id) => Ok(self.flat_name(*id)),
            TypeExpr::Array(element) => Ok(format!("{}Array", self.stable_name(element)?)),
            TypeExpr::Primitive(_)
            | TypeExpr::Void
            | TypeExpr::ByRef(..)
            | TypeExpr::Unsupported(_) => Err(self.unsupported(ty)),
        }
    }

    /// Name of the shared wrapper for arrays of `element`.
    pub fn array_wrapper_name(&self, element: &TypeExpr) -> Result<String, UnsupportedType> {
        Ok(format!("{}Array", self.stable_name(element)?))
    }

    /// Cache key of the wrapper for arrays of `element`: the element's
    /// canonical native spelling.
    pub fn array_key(&self, element: &TypeExpr) -> Result<String, UnsupportedType> {
        match element {
            TypeExpr::Void | TypeExpr::ByRef(..) => Err(self.unsupported(element)),
            other => self.print(other),
        }
    }

    /// The native growable container a wrapper holds.
    pub fn container_type(&self, element: &TypeExpr) -> Result<String, UnsupportedType> {
        match self.dialect {
            Dialect::C | Dialect::ObjC => Ok("GArray*".to_string()),
            Dialect::Cpp => Ok(format!("std::vector<{}>", self.array_key(element)?)),
        }
    }

    // Managed spelling

    /// Managed spelling for diagnostics, e.g. `ref NS.Foo[]`.
    pub fn managed_spelling(&self, ty: &TypeExpr) -> String {
        match ty {
            TypeExpr::Decl(id) if self.model.contains_decl(*id) => {
                self.model.qualified_name(*id)
            }
            TypeExpr::Array(element) => format!("{}[]", self.managed_spelling(element)),
            TypeExpr::ByRef(inner, direction) => {
                let keyword = match direction {
                    RefDirection::In => "in",
                    RefDirection::Out => "out",
                    RefDirection::InOut => "ref",
                };
                format!("{keyword} {}", self.managed_spelling(inner))
            }
            other => other.to_string(),
        }
    }

    fn unsupported(&self, ty: &TypeExpr) -> UnsupportedType {
        UnsupportedType(self.managed_spelling(ty))
    }
}

#[cfg(test)]
mod tests;
