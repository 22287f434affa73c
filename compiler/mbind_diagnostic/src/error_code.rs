//! Error codes for all generator diagnostics.
//!
//! The first digit names the phase:
//! - E1xxx: Model integrity (fatal)
//! - E2xxx: Unsupported types (member or type suppressed)
//! - E3xxx: Name resolution

use std::fmt;

use mbind_ir::ModelIntegrityError;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Model integrity (E1xxx)
    /// By-ref type wrapping another by-ref type
    E1001,
    /// By-ref type outside a parameter position
    E1002,
    /// Reference to an unknown declaration
    E1003,
    /// Member listed by a type that does not declare it
    E1004,
    /// Enum backed by a non-integer type
    E1005,
    /// Inheritance cycle
    E1006,
    /// Declaration listed twice in the emission order
    E1007,

    // Unsupported types (E2xxx)
    /// Parameter or return type has no native mapping
    E2001,
    /// Value type whose fields cannot be copied by layout
    E2002,
    /// Constructor of an abstract class
    E2003,

    // Name resolution (E3xxx)
    /// Member renamed to resolve a collision
    E3001,
    /// Collision group matched more than one resolution rule
    E3002,
    /// Identifier escaped because it is a reserved word
    E3003,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 13] = [
        ErrorCode::E1001,
        ErrorCode::E1002,
        ErrorCode::E1003,
        ErrorCode::E1004,
        ErrorCode::E1005,
        ErrorCode::E1006,
        ErrorCode::E1007,
        ErrorCode::E2001,
        ErrorCode::E2002,
        ErrorCode::E2003,
        ErrorCode::E3001,
        ErrorCode::E3002,
        ErrorCode::E3003,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E1006 => "E1006",
            ErrorCode::E1007 => "E1007",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E3003 => "E3003",
        }
    }

    /// One-line description, used by `--explain`.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "by-ref type wraps another by-ref type",
            ErrorCode::E1002 => "by-ref type outside a parameter position",
            ErrorCode::E1003 => "reference to an unknown declaration",
            ErrorCode::E1004 => "member listed by a type that does not declare it",
            ErrorCode::E1005 => "enum backed by a non-integer type",
            ErrorCode::E1006 => "inheritance cycle",
            ErrorCode::E1007 => "declaration emitted twice",
            ErrorCode::E2001 => "type has no native mapping; member skipped",
            ErrorCode::E2002 => "value type cannot be copied by layout; type skipped",
            ErrorCode::E2003 => "abstract class constructor skipped",
            ErrorCode::E3001 => "member renamed to resolve a name collision",
            ErrorCode::E3002 => "collision resolved by more than one rule",
            ErrorCode::E3003 => "reserved word escaped",
        }
    }

    /// Whether diagnostics with this code abort the run.
    pub fn is_fatal(&self) -> bool {
        self.as_str().starts_with("E1")
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parse an error code string like `"E2001"`. Case-insensitive.
impl std::str::FromStr for ErrorCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ErrorCode::ALL
            .iter()
            .find(|code| code.as_str().eq_ignore_ascii_case(s))
            .copied()
            .ok_or(())
    }
}

impl From<&ModelIntegrityError> for ErrorCode {
    fn from(err: &ModelIntegrityError) -> Self {
        match err {
            ModelIntegrityError::NestedByRef { .. } => ErrorCode::E1001,
            ModelIntegrityError::MisplacedByRef { .. } => ErrorCode::E1002,
            ModelIntegrityError::DanglingDecl { .. } => ErrorCode::E1003,
            ModelIntegrityError::ForeignMember { .. } => ErrorCode::E1004,
            ModelIntegrityError::InvalidEnumBacking { .. } => ErrorCode::E1005,
            ModelIntegrityError::InheritanceCycle { .. } => ErrorCode::E1006,
            ModelIntegrityError::DuplicateEmission { .. } => ErrorCode::E1007,
        }
    }
}
