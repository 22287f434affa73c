//! The embedding API surface emitted code calls.
//!
//! Emitted code never varies the call shape of these functions; only the
//! lookup functions differ between the two lookup strategies.

use mbind_ir::{DeclKind, FrozenModel, MemberId, Model, PrimitiveKind, TypeExpr};

pub const DOMAIN: &str = "mono_domain_get()";

// Lookup
pub const CLASS_FROM_NAME: &str = "mono_class_from_name";
pub const CLASS_FROM_TOKEN: &str = "mono_class_get";
pub const METHOD_FROM_TOKEN: &str = "mono_get_method";
pub const METHOD_DESC_NEW: &str = "mono_method_desc_new";
pub const METHOD_DESC_SEARCH: &str = "mono_method_desc_search_in_class";
pub const METHOD_DESC_FREE: &str = "mono_method_desc_free";
pub const FIELD_FROM_NAME: &str = "mono_class_get_field_from_name";
pub const FIELD_FROM_TOKEN: &str = "mono_class_get_field";

// Invocation
pub const INVOKE: &str = "mono_runtime_invoke";
pub const VIRTUAL_METHOD: &str = "mono_object_get_virtual_method";
pub const OBJECT_NEW: &str = "mono_object_new";
pub const UNBOX: &str = "mono_object_unbox";
pub const VALUE_BOX: &str = "mono_value_box";

// Fields
pub const FIELD_GET: &str = "mono_field_get_value";
pub const FIELD_SET: &str = "mono_field_set_value";
pub const STATIC_FIELD_GET: &str = "mono_field_static_get_value";
pub const STATIC_FIELD_SET: &str = "mono_field_static_set_value";
pub const CLASS_VTABLE: &str = "mono_class_vtable";

// Handles
pub const HANDLE_NEW: &str = "mono_gchandle_new";
pub const HANDLE_TARGET: &str = "mono_gchandle_get_target";
pub const HANDLE_FREE: &str = "mono_gchandle_free";

// Strings and arrays
pub const STRING_NEW: &str = "mono_string_new";
pub const STRING_TO_UTF8: &str = "mono_string_to_utf8";
pub const FREE: &str = "mono_free";
pub const ARRAY_NEW: &str = "mono_array_new";
pub const ARRAY_LENGTH: &str = "mono_array_length";
pub const ARRAY_CLASS: &str = "mono_array_class_get";
pub const ARRAY_GET: &str = "mono_array_get";
pub const ARRAY_SET: &str = "mono_array_set";
pub const ARRAY_SETREF: &str = "mono_array_setref";

/// Headers every implementation unit includes.
pub const INCLUDES: [&str; 5] = [
    "mono/jit/jit.h",
    "mono/metadata/assembly.h",
    "mono/metadata/object.h",
    "mono/metadata/debug-helpers.h",
    "mono/metadata/appdomain.h",
];

/// File-local function returning the cached image of the bound assembly.
pub const IMAGE_FN: &str = "mbind_image";
/// File-local function raising a managed exception to the caller.
pub const RAISE_FN: &str = "mbind_raise";

/// File-local cached class-handle getter of a declaration.
pub fn class_fn(flat: &str) -> String {
    format!("mbind_class_{flat}")
}

/// C wrapping helper of a class with an opaque representation.
pub fn wrap_fn(flat: &str) -> String {
    format!("mbind_wrap_{flat}")
}

/// Raw storage type of a managed value: what `mono_field_get_value`, array
/// elements and unboxed results hold.
pub fn storage_type(model: &Model, native: &str, ty: &TypeExpr) -> String {
    match ty {
        TypeExpr::Primitive(PrimitiveKind::Bool) => "MonoBoolean".to_string(),
        TypeExpr::Primitive(PrimitiveKind::Char) => "mono_unichar2".to_string(),
        TypeExpr::String => "MonoString*".to_string(),
        TypeExpr::Array(_) => "MonoArray*".to_string(),
        TypeExpr::Decl(id) => match &model.decl(*id).kind {
            DeclKind::Enum(e) => primitive_storage(e.backing).to_string(),
            DeclKind::Class(c) if c.is_value_type() => native.to_string(),
            _ => "MonoObject*".to_string(),
        },
        _ => native.to_string(),
    }
}

fn primitive_storage(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::I8 => "int8_t",
        PrimitiveKind::U8 => "uint8_t",
        PrimitiveKind::I16 => "int16_t",
        PrimitiveKind::U16 => "uint16_t",
        PrimitiveKind::U32 => "uint32_t",
        PrimitiveKind::I64 => "int64_t",
        PrimitiveKind::U64 => "uint64_t",
        _ => "int32_t",
    }
}

/// The runtime's built-in class of a primitive or string element.
pub fn builtin_class(ty: &TypeExpr) -> Option<&'static str> {
    let class = match ty {
        TypeExpr::String => "mono_get_string_class()",
        TypeExpr::Primitive(kind) => match kind {
            PrimitiveKind::Bool => "mono_get_boolean_class()",
            PrimitiveKind::Char => "mono_get_char_class()",
            PrimitiveKind::I8 => "mono_get_sbyte_class()",
            PrimitiveKind::U8 => "mono_get_byte_class()",
            PrimitiveKind::I16 => "mono_get_int16_class()",
            PrimitiveKind::U16 => "mono_get_uint16_class()",
            PrimitiveKind::I32 => "mono_get_int32_class()",
            PrimitiveKind::U32 => "mono_get_uint32_class()",
            PrimitiveKind::I64 => "mono_get_int64_class()",
            PrimitiveKind::U64 => "mono_get_uint64_class()",
            PrimitiveKind::F32 => "mono_get_single_class()",
            PrimitiveKind::F64 => "mono_get_double_class()",
            PrimitiveKind::Decimal | PrimitiveKind::DateTime => return None,
        },
        _ => return None,
    };
    Some(class)
}

/// Type name in the runtime's method-description syntax.
pub fn desc_type(model: &Model, ty: &TypeExpr) -> String {
    match ty {
        TypeExpr::Void => "void".to_string(),
        TypeExpr::Primitive(kind) => kind.managed_name().to_string(),
        TypeExpr::String => "string".to_string(),
        TypeExpr::Decl(id) => {
            let ns = model.namespace_of(*id);
            let chain = model.nesting_chain(*id).join("/");
            if ns.is_empty() {
                chain
            } else {
                format!("{ns}.{chain}")
            }
        }
        TypeExpr::Array(inner) => format!("{}[]", desc_type(model, inner)),
        TypeExpr::ByRef(inner, _) => format!("{}&", desc_type(model, inner)),
        TypeExpr::Unsupported(name) => name.clone(),
    }
}

/// Full method description, e.g. `NS.Foo:DoIt(int,string)`.
pub fn method_desc(model: &FrozenModel, class: mbind_ir::DeclId, member: MemberId) -> String {
    let m = model.member(member);
    let params: Vec<String> = m
        .params()
        .iter()
        .map(|p| desc_type(model, &p.ty))
        .collect();
    format!(
        "{}:{}({})",
        desc_type(model, &TypeExpr::Decl(class)),
        m.declared_name,
        params.join(",")
    )
}
