//! Target dialects and what each one can express.

use std::fmt;
use std::str::FromStr;

use crate::keywords;

/// How a class's managed handle is carried on the native side.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ReprStrategy {
    /// A forward-declared struct behind a typedef distinct from the class
    /// name. For dialects without a class construct.
    OpaqueTypedef,
    /// A private handle field injected into the native class.
    EmbeddedField,
}

/// Capability table of a dialect. Passes and codegen branch on these
/// flags, never on the dialect itself, except for the spelling tables.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct DialectCaps {
    pub repr: ReprStrategy,
    /// Same-name methods may differ by arity or parameter types.
    pub overloading: bool,
    /// A static and an instance member may share a name.
    pub static_instance_sharing: bool,
    /// Appended to a type to pass it by reference.
    pub by_ref_marker: &'static str,
    /// Selector that is itself the constructor; never escaped.
    pub ctor_marker: Option<&'static str>,
    pub header_ext: &'static str,
    pub impl_ext: &'static str,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Dialect {
    #[default]
    C,
    Cpp,
    ObjC,
}

impl Dialect {
    pub const ALL: [Dialect; 3] = [Dialect::C, Dialect::Cpp, Dialect::ObjC];

    pub const fn caps(self) -> DialectCaps {
        match self {
            Dialect::C => DialectCaps {
                repr: ReprStrategy::OpaqueTypedef,
                overloading: false,
                static_instance_sharing: false,
                by_ref_marker: "*",
                ctor_marker: None,
                header_ext: "h",
                impl_ext: "c",
            },
            Dialect::Cpp => DialectCaps {
                repr: ReprStrategy::EmbeddedField,
                overloading: true,
                static_instance_sharing: false,
                by_ref_marker: "&",
                ctor_marker: None,
                header_ext: "h",
                impl_ext: "cpp",
            },
            Dialect::ObjC => DialectCaps {
                repr: ReprStrategy::EmbeddedField,
                overloading: false,
                static_instance_sharing: true,
                by_ref_marker: "*",
                ctor_marker: Some("init"),
                header_ext: "h",
                impl_ext: "m",
            },
        }
    }

    /// Whether `name` is reserved in this dialect.
    pub fn is_keyword(self, name: &str) -> bool {
        let extra: &[&str] = match self {
            Dialect::C => &[],
            Dialect::Cpp => keywords::CPP,
            Dialect::ObjC => keywords::OBJC,
        };
        keywords::C.contains(&name) || extra.contains(&name)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Dialect::C => "c",
            Dialect::Cpp => "cpp",
            Dialect::ObjC => "objc",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown dialect `{0}` (expected `c`, `cpp` or `objc`)")]
pub struct UnknownDialect(pub String);

impl FromStr for Dialect {
    type Err = UnknownDialect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "c" => Ok(Dialect::C),
            "cpp" | "c++" | "cxx" => Ok(Dialect::Cpp),
            "objc" | "objective-c" => Ok(Dialect::ObjC),
            _ => Err(UnknownDialect(s.to_string())),
        }
    }
}
