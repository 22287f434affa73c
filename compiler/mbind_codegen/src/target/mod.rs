//! Per-dialect emission.
//!
//! Marshaling and member bodies are written once against the [`Target`]
//! trait; each dialect supplies the spellings that differ: string and
//! container handling, object wrapping, declaration syntax and the
//! function heads and prologues around a member body.

mod c;
mod cpp;
mod objc;

use mbind_ir::{DeclId, DeclKind, Member, MemberId, MemberKind, MemberOrigin, Model, RefDirection, TypeExpr};
use mbind_types::{Dialect, UnsupportedType};

use crate::code::Code;
use crate::context::CodegenContext;
use crate::literal;

pub use c::CTarget;
pub use cpp::CppTarget;
pub use objc::ObjCTarget;

/// Dialect-specific half of code generation.
pub trait Target: Sync {
    fn dialect(&self) -> Dialect;

    /// Null pointer literal.
    fn null(&self) -> &'static str;

    fn bool_literal(&self, value: bool) -> &'static str;

    /// Convert `expr` to the native type `ty`.
    fn cast(&self, ty: &str, expr: &str) -> String {
        format!("({ty}){expr}")
    }

    /// Whether native enums are declared with the width of their backing
    /// type. Where they are not, struct fields spell the backing primitive.
    fn sized_enums(&self) -> bool {
        true
    }

    // Strings

    /// Declare `var` holding the native copy of the `MonoString*` `mono`.
    fn decode_string(&self, mono: &str, var: &str) -> Code;

    /// `MonoString*` expression for the native string `native`.
    fn encode_string(&self, native: &str) -> String;

    /// Native string expression read through a by-ref string parameter.
    fn string_ref_contents(&self, param: &str, direction: RefDirection) -> String;

    /// Statement storing the UTF-8 buffer `utf8` through a by-ref string
    /// parameter.
    fn write_string_ref(&self, param: &str, utf8: &str) -> String;

    // Objects

    /// Handle of `object`, a native instance of an interface, read through
    /// the interface's proxy.
    fn interface_handle(&self, cx: &CodegenContext<'_>, proxy: DeclId, object: &str) -> String;

    /// Native object owning the new handle `handle`.
    fn wrap(&self, cx: &CodegenContext<'_>, class: DeclId, handle: &str) -> String;

    /// Statement releasing a native object of type `ty` the callee replaced.
    fn release(&self, cx: &CodegenContext<'_>, ty: &TypeExpr, object: &str) -> Option<String>;

    /// Lvalue of the value a by-ref parameter refers to.
    fn deref(&self, param: &str) -> String;

    /// Pointer to the value a by-ref parameter refers to.
    fn address_of_ref(&self, param: &str) -> String;

    // Containers

    fn container_declare(&self, var: &str, wrapper: &str) -> String;

    fn container_alloc(&self, var: &str, wrapper: &str, element: &str, len: &str) -> Code;

    fn container_len(&self, container: &str) -> String;

    fn container_get(&self, container: &str, element: &str, index: &str) -> String;

    fn container_push(&self, container: &str, element: &str, value: &str) -> Code;

    /// Whether an array value may be null on the native side.
    fn container_nullable(&self) -> bool;

    /// Value returned when a call fails.
    fn default_value(&self, cx: &CodegenContext<'_>, ty: &TypeExpr) -> Result<String, UnsupportedType>;

    // Units

    fn header_prelude(&self, cx: &CodegenContext<'_>) -> Code;

    fn header_epilogue(&self, cx: &CodegenContext<'_>) -> Code;

    /// Declarations every later declaration may refer to.
    fn forward_declarations(&self, cx: &CodegenContext<'_>) -> Code;

    fn declare_enum(&self, cx: &CodegenContext<'_>, decl: DeclId) -> Code;

    /// Header declaration of a class, interface or array wrapper.
    fn declare(&self, cx: &CodegenContext<'_>, decl: DeclId) -> Result<Code, UnsupportedType>;

    /// Includes at the top of the implementation unit.
    fn impl_prelude(&self, cx: &CodegenContext<'_>) -> Code;

    /// Definition of the file-local function raising managed exceptions.
    fn raise_function(&self, cx: &CodegenContext<'_>) -> Code;

    /// Support code every member body may rely on, emitted before any body.
    fn impl_support(&self, cx: &CodegenContext<'_>, decl: DeclId) -> Code;

    /// Implementation of `decl` around its member bodies.
    fn define(&self, cx: &CodegenContext<'_>, decl: DeclId, bodies: Vec<Code>) -> Code;

    // Members

    /// Definition head of a member body, without the opening brace.
    fn function_head(&self, cx: &CodegenContext<'_>, member: MemberId) -> Result<Code, UnsupportedType>;

    /// Handle of the receiver inside an instance member of `decl`.
    fn self_handle(&self, cx: &CodegenContext<'_>, decl: DeclId) -> String;

    /// Pointer to the receiver inside an instance member of a value type.
    fn self_value(&self) -> &'static str;

    /// Prologue of a reference-type constructor, before the managed object
    /// exists.
    fn construct_begin(&self, cx: &CodegenContext<'_>, decl: DeclId) -> Code;

    /// Epilogue of a successful constructor. Value-type constructors find
    /// the unboxed result behind `__instance`.
    fn construct_finish(&self, cx: &CodegenContext<'_>, decl: DeclId) -> Code;

    /// Exit of a constructor whose managed call threw.
    fn construct_abort(&self, cx: &CodegenContext<'_>, decl: DeclId) -> Code;
}

static C: CTarget = CTarget;
static CPP: CppTarget = CppTarget;
static OBJC: ObjCTarget = ObjCTarget;

pub fn for_dialect(dialect: Dialect) -> &'static dyn Target {
    match dialect {
        Dialect::C => &C,
        Dialect::Cpp => &CPP,
        Dialect::ObjC => &OBJC,
    }
}

// Shared helpers

/// Members that get a native function: methods (declared, lowered or
/// synthesized) and constructors.
pub(crate) fn callables(model: &Model, decl: DeclId) -> Vec<MemberId> {
    model
        .emitted_members_of(decl)
        .filter(|(_, m)| m.is_method() || m.is_constructor())
        .map(|(id, _)| id)
        .collect()
}

/// Instance fields that make up a value type's native layout, suppressed
/// ones included.
pub(crate) fn layout_fields(model: &Model, decl: DeclId) -> impl Iterator<Item = &Member> {
    model.members_of(decl).map(|(_, m)| m).filter(|m| match &m.kind {
        MemberKind::Field(f) => {
            !m.is_static && !f.is_literal && m.origin != MemberOrigin::HandleField
        }
        _ => false,
    })
}

/// The class whose handle holder is `decl` itself.
pub(crate) fn owns_handle(model: &Model, decl: DeclId) -> bool {
    model.handle_owner(decl) == Some(decl)
}

/// Whether instances of `decl` are created from a managed handle.
pub(crate) fn needs_handle(model: &Model, decl: DeclId) -> bool {
    model
        .decl(decl)
        .as_class()
        .is_some_and(mbind_ir::ClassDecl::needs_handle)
}

/// The bound base class of `decl`, skipping a suppressed base.
pub(crate) fn bound_base(model: &Model, decl: DeclId) -> Option<DeclId> {
    let base = model.decl(decl).as_class()?.base?;
    (model.contains_decl(base) && !model.decl(base).suppressed).then_some(base)
}

/// The concrete class whose instances stand for values of `decl`: the
/// proxy for interfaces, the class itself otherwise.
pub(crate) fn concrete_class(cx: &CodegenContext<'_>, decl: DeclId) -> Result<DeclId, UnsupportedType> {
    if cx.model.decl(decl).is_interface() {
        cx.model
            .proxy_for(decl)
            .ok_or_else(|| UnsupportedType(cx.model.qualified_name(decl)))
    } else {
        Ok(decl)
    }
}

/// Name of the proxy's handle accessor as emitted.
pub(crate) fn handle_accessor_name(cx: &CodegenContext<'_>, proxy: DeclId) -> String {
    cx.model
        .proxy_handle_accessor(proxy)
        .map_or_else(|| "GetHandle".to_string(), |id| cx.model.member(id).emitted_name().to_string())
}

/// Include guard derived from the unit base name.
pub(crate) fn include_guard(cx: &CodegenContext<'_>) -> String {
    let stem: String = cx
        .options
        .base_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect();
    format!("{stem}_H")
}

/// `(T a, U b)` parameter declarations of a member.
pub(crate) fn param_decls(cx: &CodegenContext<'_>, member: &Member) -> Result<Vec<String>, UnsupportedType> {
    member
        .params()
        .iter()
        .map(|p| Ok(format!("{} {}", cx.print(&p.ty)?, p.name)))
        .collect()
}

/// Enum items as `NAME = value` lines, named by `item_name`.
pub(crate) fn enum_items(
    cx: &CodegenContext<'_>,
    decl: DeclId,
    item_name: impl Fn(&str) -> String,
) -> Code {
    let mut items = Code::new();
    let Some(e) = cx.model.decl(decl).as_enum() else {
        return items;
    };
    for (item, value) in e.items.iter().zip(e.resolved_values()) {
        items.line(format!(
            "{} = {},",
            item_name(&item.native_name),
            literal::integer(value, e.backing)
        ));
    }
    items
}

// Flat functions: C, and ObjC value types

/// Prototype of a member as a free function: `R NS_Foo_Bar(NS_Foo* self, ..)`.
pub(crate) fn flat_signature(cx: &CodegenContext<'_>, member: MemberId) -> Result<String, UnsupportedType> {
    let m = cx.model.member(member);
    let decl = m.declaring;
    let is_value = cx.model.decl(decl).is_value_type();
    let ret = if m.is_constructor() {
        if is_value {
            cx.flat_name(decl)
        } else {
            format!("{}*", cx.self_type(decl))
        }
    } else {
        cx.print(m.value_type())?
    };
    let mut params = Vec::with_capacity(m.params().len() + 1);
    if !m.is_static && !m.is_constructor() {
        params.push(format!("{}* self", cx.self_type(decl)));
    }
    params.extend(param_decls(cx, m)?);
    let params = if params.is_empty() {
        "void".to_string()
    } else {
        params.join(", ")
    };
    Ok(format!("{ret} {}({params})", cx.function_name(member)))
}

/// Prototypes of every callable member of `decl`.
pub(crate) fn flat_prototypes(cx: &CodegenContext<'_>, decl: DeclId) -> Result<Code, UnsupportedType> {
    let mut code = Code::new();
    for member in callables(cx.model, decl) {
        code.line(format!("{};", flat_signature(cx, member)?));
    }
    Ok(code)
}

/// `struct NS_Point { .. };` for a value type whose typedef was forward
/// declared.
pub(crate) fn value_struct(cx: &CodegenContext<'_>, decl: DeclId) -> Result<Code, UnsupportedType> {
    let flat = cx.flat_name(decl);
    let mut fields = Code::new();
    for field in layout_fields(cx.model, decl) {
        fields.line(format!("{} {};", field_type(cx, field.value_type())?, field.native_name));
    }
    if fields.is_empty() {
        fields.line("uint8_t _reserved;");
    }
    let mut code = Code::new();
    code.block(format!("struct {flat} {{"), fields, "};");
    Ok(code)
}

/// Spelling of a struct field of type `ty`. The struct is copied bit for bit
/// from the managed value, so an enum field must keep its backing width.
fn field_type(cx: &CodegenContext<'_>, ty: &TypeExpr) -> Result<String, UnsupportedType> {
    if let TypeExpr::Decl(id) = ty {
        if let DeclKind::Enum(e) = &cx.model.decl(*id).kind {
            if !e.has_default_backing() && !cx.target().sized_enums() {
                return Ok(cx.printer().primitive(e.backing)?.to_string());
            }
        }
    }
    cx.print(ty)
}

/// Epilogue of a value-type constructor written as a free function.
pub(crate) fn flat_value_return(cx: &CodegenContext<'_>, decl: DeclId) -> Code {
    Code::single(format!("return *({}*)__instance;", cx.flat_name(decl)))
}

/// Failure value of a C-style declaration: `0`, a cast enum, a null pointer
/// or a zeroed struct.
pub(crate) fn c_like_default(
    cx: &CodegenContext<'_>,
    ty: &TypeExpr,
    target: &dyn Target,
) -> Result<String, UnsupportedType> {
    let value = match ty {
        TypeExpr::Void => String::new(),
        TypeExpr::Primitive(mbind_ir::PrimitiveKind::Bool) => target.bool_literal(false).to_string(),
        TypeExpr::Primitive(kind) => {
            cx.printer().primitive(*kind)?;
            "0".to_string()
        }
        TypeExpr::String | TypeExpr::Array(_) => target.null().to_string(),
        TypeExpr::Decl(id) => match &cx.model.decl(*id).kind {
            DeclKind::Enum(_) => target.cast(&cx.flat_name(*id), "0"),
            DeclKind::Class(c) if c.is_value_type() => format!("({}){{0}}", cx.flat_name(*id)),
            _ => target.null().to_string(),
        },
        TypeExpr::ByRef(..) | TypeExpr::Unsupported(_) => {
            return Err(UnsupportedType(cx.printer().managed_spelling(ty)));
        }
    };
    Ok(value)
}

#[cfg(test)]
mod tests;
