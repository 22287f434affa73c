//! Marshaling between native values and the runtime's representation.
//!
//! Every conversion is a code fragment declaring one variable. Names of
//! the temporaries a conversion needs are derived from that variable
//! (`{var}_len`, `{var}_i`, ..), so nested conversions never collide and
//! the output is stable across runs.
//!
//! Invoke arguments are pointers: value-like types (primitives, enums,
//! value types) pass the address of their storage, references pass the
//! object itself.

use mbind_ir::{DeclKind, Model, Param, PrimitiveKind, RefDirection, TypeExpr};
use mbind_types::{Dialect, UnsupportedType};

use crate::code::Code;
use crate::context::CodegenContext;
use crate::mono;
use crate::target::concrete_class;

/// Where a managed value comes from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Source<'s> {
    /// A `MonoObject*` as returned by invoke; value types arrive boxed.
    Boxed(&'s str),
    /// A value in its raw storage type (field values, array elements).
    Raw(&'s str),
}

/// One invoke argument: code before the call, the `void*` slot passed in
/// the argument array, and code after the call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Marshaled {
    pub pre: Code,
    pub slot: String,
    pub post: Code,
}

/// Whether the runtime passes `ty` by value.
pub fn is_value_like(model: &Model, ty: &TypeExpr) -> bool {
    match ty {
        TypeExpr::Primitive(_) => true,
        TypeExpr::Decl(id) => match &model.decl(*id).kind {
            DeclKind::Enum(_) => true,
            DeclKind::Class(c) => c.is_value_type(),
            _ => false,
        },
        _ => false,
    }
}

fn unsupported(cx: &CodegenContext<'_>, ty: &TypeExpr) -> UnsupportedType {
    UnsupportedType(cx.printer().managed_spelling(ty))
}

/// Raw storage type of `ty`.
pub fn storage(cx: &CodegenContext<'_>, ty: &TypeExpr) -> Result<String, UnsupportedType> {
    let native = cx.print(ty)?;
    Ok(mono::storage_type(cx.model, &native, ty))
}

/// The runtime class of array elements of type `ty`.
pub fn element_class(cx: &CodegenContext<'_>, ty: &TypeExpr) -> Result<String, UnsupportedType> {
    match ty {
        TypeExpr::Decl(id) => Ok(format!("{}()", mono::class_fn(&cx.flat_name(*id)))),
        TypeExpr::Array(inner) => Ok(format!("{}({}, 1)", mono::ARRAY_CLASS, element_class(cx, inner)?)),
        other => mono::builtin_class(other)
            .map(str::to_string)
            .ok_or_else(|| unsupported(cx, other)),
    }
}

/// Handle of the native instance `object` of the class or interface `decl`.
pub fn handle_of(
    cx: &CodegenContext<'_>,
    decl: mbind_ir::DeclId,
    object: &str,
) -> Result<String, UnsupportedType> {
    if cx.model.decl(decl).is_interface() {
        let proxy = concrete_class(cx, decl)?;
        Ok(cx.target().interface_handle(cx, proxy, object))
    } else {
        Ok(format!("{object}->_handle"))
    }
}

fn raw_value(cx: &CodegenContext<'_>, ty: &TypeExpr, source: Source<'_>) -> Result<String, UnsupportedType> {
    Ok(match source {
        Source::Raw(expr) => expr.to_string(),
        Source::Boxed(expr) => format!("*({}*){}({expr})", storage(cx, ty)?, mono::UNBOX),
    })
}

// Managed to native

/// Declare `var` holding the native form of a managed value.
pub fn to_native(
    cx: &CodegenContext<'_>,
    ty: &TypeExpr,
    source: Source<'_>,
    var: &str,
) -> Result<Code, UnsupportedType> {
    let target = cx.target();
    let mut code = Code::new();
    match ty {
        TypeExpr::Primitive(kind) => {
            let native = cx.printer().primitive(*kind)?;
            let raw = raw_value(cx, ty, source)?;
            let value = match (kind, cx.dialect()) {
                (PrimitiveKind::Bool, Dialect::ObjC) => format!("{raw} ? YES : NO"),
                (PrimitiveKind::Bool, Dialect::C | Dialect::Cpp) => format!("{raw} != 0"),
                _ => raw,
            };
            code.line(format!("{native} {var} = {value};"));
        }
        TypeExpr::String => {
            let mono_str = match source {
                Source::Boxed(expr) => format!("(MonoString*){expr}"),
                Source::Raw(expr) => expr.to_string(),
            };
            code.append(target.decode_string(&mono_str, var));
        }
        TypeExpr::Decl(id) => {
            let native = cx.print(ty)?;
            match &cx.model.decl(*id).kind {
                DeclKind::Enum(_) => {
                    let raw = raw_value(cx, ty, source)?;
                    code.line(format!("{native} {var} = {};", target.cast(&native, &raw)));
                }
                DeclKind::Class(c) if c.is_value_type() => {
                    code.line(format!("{native} {var} = {};", raw_value(cx, ty, source)?));
                }
                DeclKind::Class(_) | DeclKind::Interface(_) => {
                    let (Source::Boxed(object) | Source::Raw(object)) = source;
                    let class = concrete_class(cx, *id)?;
                    let handle = format!("{}({object}, 0)", mono::HANDLE_NEW);
                    code.line(format!("{native} {var} = {};", target.null()));
                    code.braced(
                        &format!("if ({object})"),
                        Code::single(format!("{var} = {};", target.wrap(cx, class, &handle))),
                    );
                }
                DeclKind::ArrayWrapper(_) | DeclKind::ObjectRepr(_) => {
                    return Err(unsupported(cx, ty));
                }
            }
        }
        TypeExpr::Array(element) => {
            code.append(array_to_native(cx, element, source, var)?);
        }
        TypeExpr::Void | TypeExpr::ByRef(..) | TypeExpr::Unsupported(_) => {
            return Err(unsupported(cx, ty));
        }
    }
    Ok(code)
}

fn array_to_native(
    cx: &CodegenContext<'_>,
    element: &TypeExpr,
    source: Source<'_>,
    var: &str,
) -> Result<Code, UnsupportedType> {
    let target = cx.target();
    let wrapper = cx.printer().array_wrapper_name(element)?;
    let native_element = cx.print(element)?;
    let storage = storage(cx, element)?;
    let (arr, len, i, raw, item) = (
        format!("{var}_arr"),
        format!("{var}_len"),
        format!("{var}_i"),
        format!("{var}_s"),
        format!("{var}_e"),
    );

    let mut each = Code::new();
    each.line(format!(
        "{storage} {raw} = {}({arr}, {storage}, {i});",
        mono::ARRAY_GET
    ));
    each.append(to_native(cx, element, Source::Raw(&raw), &item)?);
    each.append(target.container_push(var, &native_element, &item));

    let mut fill = Code::new();
    fill.line(format!("uintptr_t {len} = {}({arr});", mono::ARRAY_LENGTH));
    fill.append(target.container_alloc(var, &wrapper, &native_element, &len));
    fill.braced(&format!("for (uintptr_t {i} = 0; {i} < {len}; {i}++)"), each);

    let source = match source {
        Source::Boxed(expr) => format!("(MonoArray*){expr}"),
        Source::Raw(expr) => expr.to_string(),
    };
    let mut code = Code::new();
    code.line(format!("MonoArray* {arr} = {source};"));
    code.line(target.container_declare(var, &wrapper));
    code.braced(&format!("if ({arr})"), fill);
    Ok(code)
}

// Native to managed

/// Declare `var` holding the raw managed form of the native value `native`.
pub fn to_managed(
    cx: &CodegenContext<'_>,
    ty: &TypeExpr,
    native: &str,
    var: &str,
) -> Result<Code, UnsupportedType> {
    let target = cx.target();
    let mut code = Code::new();
    match ty {
        TypeExpr::Primitive(PrimitiveKind::Bool) => {
            code.line(format!("MonoBoolean {var} = {native} ? 1 : 0;"));
        }
        TypeExpr::Primitive(kind) => {
            cx.printer().primitive(*kind)?;
            code.line(format!("{} {var} = {native};", storage(cx, ty)?));
        }
        TypeExpr::String => {
            code.line(format!("MonoString* {var} = {};", target.encode_string(native)));
        }
        TypeExpr::Decl(id) => match &cx.model.decl(*id).kind {
            DeclKind::Enum(_) => {
                let storage = storage(cx, ty)?;
                code.line(format!("{storage} {var} = {};", target.cast(&storage, native)));
            }
            DeclKind::Class(c) if c.is_value_type() => {
                code.line(format!("{} {var} = {native};", cx.print(ty)?));
            }
            DeclKind::Class(_) | DeclKind::Interface(_) => {
                let handle = handle_of(cx, *id, native)?;
                code.line(format!(
                    "MonoObject* {var} = {native} ? {}({handle}) : NULL;",
                    mono::HANDLE_TARGET
                ));
            }
            DeclKind::ArrayWrapper(_) | DeclKind::ObjectRepr(_) => {
                return Err(unsupported(cx, ty));
            }
        },
        TypeExpr::Array(element) => {
            code.append(array_to_managed(cx, element, native, var)?);
        }
        TypeExpr::Void | TypeExpr::ByRef(..) | TypeExpr::Unsupported(_) => {
            return Err(unsupported(cx, ty));
        }
    }
    Ok(code)
}

fn array_to_managed(
    cx: &CodegenContext<'_>,
    element: &TypeExpr,
    native: &str,
    var: &str,
) -> Result<Code, UnsupportedType> {
    let target = cx.target();
    let native_element = cx.print(element)?;
    let storage = storage(cx, element)?;
    let (len, i, value, item) = (
        format!("{var}_len"),
        format!("{var}_i"),
        format!("{var}_n"),
        format!("{var}_e"),
    );

    let mut each = Code::new();
    each.line(format!(
        "{native_element} {value} = {};",
        target.container_get(native, &native_element, &i)
    ));
    each.append(to_managed(cx, element, &value, &item)?);
    if is_value_like(cx.model, element) {
        each.line(format!("{}({var}, {storage}, {i}, {item});", mono::ARRAY_SET));
    } else {
        each.line(format!("{}({var}, {i}, {item});", mono::ARRAY_SETREF));
    }

    let mut fill = Code::new();
    fill.line(format!("uintptr_t {len} = {};", target.container_len(native)));
    fill.line(format!(
        "{var} = {}({}, {}, {len});",
        mono::ARRAY_NEW,
        mono::DOMAIN,
        element_class(cx, element)?
    ));
    fill.braced(&format!("for (uintptr_t {i} = 0; {i} < {len}; {i}++)"), each);

    let mut code = Code::new();
    code.line(format!("MonoArray* {var} = NULL;"));
    if target.container_nullable() {
        code.braced(&format!("if ({native})"), fill);
    } else {
        code.append(fill);
    }
    Ok(code)
}

// Parameters

/// Marshal one parameter into an invoke argument named after its position.
pub fn param_to_managed(cx: &CodegenContext<'_>, param: &Param) -> Result<Marshaled, UnsupportedType> {
    let arg = format!("__arg{}", param.position);
    match param.ty.strip_by_ref() {
        (inner, None) => {
            let pre = to_managed(cx, inner, &param.name, &arg)?;
            let slot = if is_value_like(cx.model, inner) {
                format!("&{arg}")
            } else {
                arg
            };
            Ok(Marshaled {
                pre,
                slot,
                post: Code::new(),
            })
        }
        (inner, Some(direction)) => by_ref_to_managed(cx, inner, direction, &param.name, &arg),
    }
}

fn by_ref_to_managed(
    cx: &CodegenContext<'_>,
    inner: &TypeExpr,
    direction: RefDirection,
    name: &str,
    arg: &str,
) -> Result<Marshaled, UnsupportedType> {
    let target = cx.target();
    let referent = target.deref(name);
    let mut out = Marshaled {
        slot: format!("&{arg}"),
        ..Marshaled::default()
    };

    match inner {
        TypeExpr::Primitive(kind) => {
            cx.printer().primitive(*kind)?;
            out.slot = target.address_of_ref(name);
        }
        TypeExpr::Decl(id) => match &cx.model.decl(*id).kind {
            DeclKind::Enum(e) if !e.has_default_backing() => {
                // The native enum may be wider than its managed backing.
                let storage = storage(cx, inner)?;
                let initial = if direction.reads_in() {
                    target.cast(&storage, &referent)
                } else {
                    "0".to_string()
                };
                out.pre.line(format!("{storage} {arg} = {initial};"));
                if direction.writes_back() {
                    let native = cx.print(inner)?;
                    out.post.line(format!("{referent} = {};", target.cast(&native, arg)));
                }
            }
            DeclKind::Enum(_) => out.slot = target.address_of_ref(name),
            DeclKind::Class(c) if c.is_value_type() => out.slot = target.address_of_ref(name),
            DeclKind::Class(_) | DeclKind::Interface(_) => {
                let class = concrete_class(cx, *id)?;
                if direction.reads_in() {
                    out.pre.append(to_managed(cx, inner, &referent, arg)?);
                } else {
                    out.pre.line(format!("MonoObject* {arg} = NULL;"));
                }
                if direction.writes_back() {
                    let mut rebind = Code::new();
                    if direction == RefDirection::InOut {
                        if let Some(release) = target.release(cx, inner, &referent) {
                            rebind.line(release);
                        }
                    }
                    rebind.line(format!("{referent} = {};", target.null()));
                    let handle = format!("{}({arg}, 0)", mono::HANDLE_NEW);
                    rebind.braced(
                        &format!("if ({arg})"),
                        Code::single(format!("{referent} = {};", target.wrap(cx, class, &handle))),
                    );
                    out.post = replaced_only(&mut out.pre, "MonoObject*", arg, direction, rebind);
                }
            }
            DeclKind::ArrayWrapper(_) | DeclKind::ObjectRepr(_) => {
                return Err(unsupported(cx, inner));
            }
        },
        TypeExpr::String => {
            let initial = if direction.reads_in() {
                target.encode_string(&target.string_ref_contents(name, direction))
            } else {
                "NULL".to_string()
            };
            out.pre.line(format!("MonoString* {arg} = {initial};"));
            if direction.writes_back() {
                let utf8 = format!("{arg}_utf8");
                let mut store = Code::new();
                store.line(format!("char* {utf8} = {}({arg});", mono::STRING_TO_UTF8));
                store.line(target.write_string_ref(name, &utf8));
                store.line(format!("{}({utf8});", mono::FREE));
                out.post.braced(&format!("if ({arg})"), store);
            }
        }
        TypeExpr::Array(_) => {
            if direction.reads_in() {
                out.pre.append(to_managed(cx, inner, &referent, arg)?);
            } else {
                out.pre.line(format!("MonoArray* {arg} = NULL;"));
            }
            if direction.writes_back() {
                let converted = format!("{arg}_n");
                let mut rebind = Code::new();
                if direction == RefDirection::InOut {
                    if let Some(release) = target.release(cx, inner, &referent) {
                        rebind.line(release);
                    }
                }
                rebind.append(to_native(cx, inner, Source::Raw(arg), &converted)?);
                rebind.line(format!("{referent} = {converted};"));
                out.post = replaced_only(&mut out.pre, "MonoArray*", arg, direction, rebind);
            }
        }
        TypeExpr::Void | TypeExpr::ByRef(..) | TypeExpr::Unsupported(_) => {
            return Err(unsupported(cx, inner));
        }
    }
    Ok(out)
}

/// For `ref` parameters, run `rebind` only when the callee stored a
/// different object; `out` parameters always rebind.
fn replaced_only(pre: &mut Code, ty: &str, arg: &str, direction: RefDirection, rebind: Code) -> Code {
    if direction != RefDirection::InOut {
        return rebind;
    }
    pre.line(format!("{ty} {arg}_old = {arg};"));
    let mut post = Code::new();
    post.braced(&format!("if ({arg} != {arg}_old)"), rebind);
    post
}

/// Declare `__ret` from the boxed invoke result.
pub fn return_to_native(cx: &CodegenContext<'_>, ty: &TypeExpr, result: &str) -> Result<Code, UnsupportedType> {
    to_native(cx, ty, Source::Boxed(result), "__ret")
}
