//! Objective-C: `NSObject` subclasses under ARC, protocols for interfaces.
//! Value types stay C structs with free functions.

use mbind_ir::{DeclId, DeclKind, Member, MemberId, RefDirection, TypeExpr};
use mbind_types::{Dialect, UnsupportedType};

use super::{
    bound_base, c_like_default, callables, flat_prototypes, flat_signature, flat_value_return,
    handle_accessor_name, include_guard, needs_handle, owns_handle, value_struct, Target,
};
use crate::code::Code;
use crate::context::CodegenContext;
use crate::mono;

pub struct ObjCTarget;

impl ObjCTarget {
    fn selector(cx: &CodegenContext<'_>, m: &Member) -> Result<String, UnsupportedType> {
        let name = m.emitted_name();
        if m.params().is_empty() {
            return Ok(name.to_string());
        }
        let mut parts = Vec::with_capacity(m.params().len());
        for (i, p) in m.params().iter().enumerate() {
            let label = if i == 0 { name } else { p.name.as_str() };
            parts.push(format!("{label}:({}){}", cx.print(&p.ty)?, p.name));
        }
        Ok(parts.join(" "))
    }

    fn method_signature(cx: &CodegenContext<'_>, id: MemberId) -> Result<String, UnsupportedType> {
        let m = cx.model.member(id);
        let ret = if m.is_constructor() {
            "instancetype".to_string()
        } else {
            cx.print(m.value_type())?
        };
        let kind = if m.is_static { '+' } else { '-' };
        Ok(format!("{kind} ({ret}){}", Self::selector(cx, m)?))
    }

    fn method_declarations(cx: &CodegenContext<'_>, decl: DeclId) -> Result<Code, UnsupportedType> {
        let mut code = Code::new();
        for id in callables(cx.model, decl) {
            code.line(format!("{};", Self::method_signature(cx, id)?));
        }
        Ok(code)
    }

    fn declare_class(cx: &CodegenContext<'_>, decl: DeclId) -> Result<Code, UnsupportedType> {
        let flat = cx.flat_name(decl);
        let class = cx.model.decl(decl).as_class();
        let mut head = match bound_base(cx.model, decl) {
            Some(base) => format!("@interface {flat} : {}", cx.flat_name(base)),
            None => format!("@interface {flat} : NSObject"),
        };
        if let Some(iface) = class.and_then(|c| c.proxy_of) {
            head.push_str(&format!(" <{}>", cx.flat_name(iface)));
        }

        let mut code = Code::new();
        if owns_handle(cx.model, decl) {
            code.line(format!("{head} {{"));
            code.line("@public");
            code.nest(Code::single("uint32_t _handle;"));
            code.line("}");
            code.line("- (instancetype)initWithHandle:(uint32_t)handle;");
        } else {
            code.line(head);
        }
        code.append(Self::method_declarations(cx, decl)?);
        code.line("@end");
        Ok(code)
    }

    fn declare_protocol(cx: &CodegenContext<'_>, decl: DeclId) -> Result<Code, UnsupportedType> {
        let mut adopted = vec!["NSObject".to_string()];
        if let Some(iface) = cx.model.decl(decl).as_interface() {
            adopted.extend(iface.bases.iter().map(|&b| cx.flat_name(b)));
        }
        let mut code = Code::new();
        code.line(format!("@protocol {} <{}>", cx.flat_name(decl), adopted.join(", ")));
        code.append(Self::method_declarations(cx, decl)?);
        code.line("@end");
        Ok(code)
    }

    fn is_value_type(cx: &CodegenContext<'_>, decl: DeclId) -> bool {
        cx.model.decl(decl).is_value_type()
    }
}

/// Object pointers cannot live in C memory under ARC; containers hold them
/// as retained `void*`.
fn is_object(element: &str) -> bool {
    element.ends_with('*') || element.starts_with("id<")
}

impl Target for ObjCTarget {
    fn dialect(&self) -> Dialect {
        Dialect::ObjC
    }

    fn null(&self) -> &'static str {
        "nil"
    }

    fn bool_literal(&self, value: bool) -> &'static str {
        if value {
            "YES"
        } else {
            "NO"
        }
    }

    // Strings

    fn decode_string(&self, mono_str: &str, var: &str) -> Code {
        let mut convert = Code::new();
        convert.line(format!("char* {var}_utf8 = {}({mono_str});", mono::STRING_TO_UTF8));
        convert.line(format!("{var} = [NSString stringWithUTF8String:{var}_utf8];"));
        convert.line(format!("{}({var}_utf8);", mono::FREE));
        let mut code = Code::new();
        code.line(format!("NSString* {var} = nil;"));
        code.braced(&format!("if ({mono_str})"), convert);
        code
    }

    fn encode_string(&self, native: &str) -> String {
        format!(
            "{native} ? {}({}, [{native} UTF8String]) : NULL",
            mono::STRING_NEW,
            mono::DOMAIN
        )
    }

    fn string_ref_contents(&self, param: &str, direction: RefDirection) -> String {
        if direction.writes_back() {
            param.to_string()
        } else {
            format!("(*{param})")
        }
    }

    fn write_string_ref(&self, param: &str, utf8: &str) -> String {
        format!("[{param} setString:[NSString stringWithUTF8String:{utf8}]];")
    }

    // Objects

    fn interface_handle(&self, cx: &CodegenContext<'_>, proxy: DeclId, object: &str) -> String {
        format!(
            "[({}*){object} {}]",
            cx.flat_name(proxy),
            handle_accessor_name(cx, proxy)
        )
    }

    fn wrap(&self, cx: &CodegenContext<'_>, class: DeclId, handle: &str) -> String {
        format!("[[{} alloc] initWithHandle:{handle}]", cx.flat_name(class))
    }

    fn release(&self, _cx: &CodegenContext<'_>, _ty: &TypeExpr, _object: &str) -> Option<String> {
        None
    }

    fn deref(&self, param: &str) -> String {
        format!("(*{param})")
    }

    fn address_of_ref(&self, param: &str) -> String {
        param.to_string()
    }

    // Containers

    fn container_declare(&self, var: &str, wrapper: &str) -> String {
        format!("{wrapper}* {var} = nil;")
    }

    fn container_alloc(&self, var: &str, wrapper: &str, element: &str, len: &str) -> Code {
        let slot = if is_object(element) { "void*" } else { element };
        let mut code = Code::new();
        code.line(format!("{var} = [[{wrapper} alloc] init];"));
        code.line(format!(
            "{var}->array = g_array_sized_new(FALSE, FALSE, sizeof({slot}), (guint){len});"
        ));
        code
    }

    fn container_len(&self, container: &str) -> String {
        format!("{container}->array->len")
    }

    fn container_get(&self, container: &str, element: &str, index: &str) -> String {
        if is_object(element) {
            format!("(__bridge {element})g_array_index({container}->array, void*, {index})")
        } else {
            format!("g_array_index({container}->array, {element}, {index})")
        }
    }

    fn container_push(&self, container: &str, element: &str, value: &str) -> Code {
        let mut code = Code::new();
        if is_object(element) {
            code.line(format!("void* {value}_ref = (__bridge_retained void*){value};"));
            code.line(format!("g_array_append_val({container}->array, {value}_ref);"));
        } else {
            code.line(format!("g_array_append_val({container}->array, {value});"));
        }
        code
    }

    fn container_nullable(&self) -> bool {
        true
    }

    fn default_value(&self, cx: &CodegenContext<'_>, ty: &TypeExpr) -> Result<String, UnsupportedType> {
        c_like_default(cx, ty, self)
    }

    // Units

    fn header_prelude(&self, cx: &CodegenContext<'_>) -> Code {
        let guard = include_guard(cx);
        let mut code = Code::new();
        code.line(format!("#ifndef {guard}"));
        code.line(format!("#define {guard}"));
        code.blank();
        code.line("#import <Foundation/Foundation.h>");
        code.line("#include <stdint.h>");
        code.line("#include <glib.h>");
        code
    }

    fn header_epilogue(&self, cx: &CodegenContext<'_>) -> Code {
        Code::single(format!("#endif /* {} */", include_guard(cx)))
    }

    fn forward_declarations(&self, cx: &CodegenContext<'_>) -> Code {
        let mut code = Code::new();
        for &decl in cx.model.emission_order() {
            let d = cx.model.decl(decl);
            if d.suppressed {
                continue;
            }
            let flat = cx.flat_name(decl);
            match &d.kind {
                DeclKind::Class(c) if c.is_value_type() => {
                    code.line(format!("typedef struct {flat} {flat};"));
                }
                DeclKind::Class(_) | DeclKind::ArrayWrapper(_) => {
                    code.line(format!("@class {flat};"));
                }
                DeclKind::Interface(_) => {
                    code.line(format!("@protocol {flat};"));
                }
                DeclKind::Enum(_) | DeclKind::ObjectRepr(_) => {}
            }
        }
        code
    }

    fn declare_enum(&self, cx: &CodegenContext<'_>, decl: DeclId) -> Code {
        let flat = cx.flat_name(decl);
        let sep = &cx.options.separator;
        let Some(e) = cx.model.decl(decl).as_enum() else {
            return Code::new();
        };
        let backing = cx.printer().primitive(e.backing).unwrap_or("int32_t");
        let macro_name = if e.is_flags { "NS_OPTIONS" } else { "NS_ENUM" };
        let items = super::enum_items(cx, decl, |item| format!("{flat}{sep}{item}"));
        let mut code = Code::new();
        code.block(format!("typedef {macro_name}({backing}, {flat}) {{"), items, "};");
        code
    }

    fn declare(&self, cx: &CodegenContext<'_>, decl: DeclId) -> Result<Code, UnsupportedType> {
        match &cx.model.decl(decl).kind {
            DeclKind::ArrayWrapper(_) => {
                let mut code = Code::new();
                code.line(format!("@interface {} : NSObject {{", cx.flat_name(decl)));
                code.line("@public");
                code.nest(Code::single("GArray* array;"));
                code.line("}");
                code.line("@end");
                Ok(code)
            }
            DeclKind::Interface(_) => Self::declare_protocol(cx, decl),
            DeclKind::Class(c) if c.is_value_type() => {
                let mut code = value_struct(cx, decl)?;
                code.append(flat_prototypes(cx, decl)?);
                Ok(code)
            }
            DeclKind::Class(_) => Self::declare_class(cx, decl),
            DeclKind::Enum(_) | DeclKind::ObjectRepr(_) => Ok(Code::new()),
        }
    }

    fn impl_prelude(&self, cx: &CodegenContext<'_>) -> Code {
        let mut code = Code::new();
        code.line(format!("#import \"{}.h\"", cx.options.base_name));
        code.blank();
        code.line("#include <stdlib.h>");
        for header in mono::INCLUDES {
            code.line(format!("#include <{header}>"));
        }
        code
    }

    fn raise_function(&self, _cx: &CodegenContext<'_>) -> Code {
        let mut convert = Code::new();
        convert.line(format!("char* utf8 = {}(text);", mono::STRING_TO_UTF8));
        convert.line("reason = [NSString stringWithUTF8String:utf8];");
        convert.line(format!("{}(utf8);", mono::FREE));

        let mut body = Code::new();
        body.line("MonoString* text = mono_object_to_string(exception, NULL);");
        body.line("NSString* reason = nil;");
        body.braced("if (text)", convert);
        body.line(
            "@throw [NSException exceptionWithName:@\"ManagedException\" reason:reason userInfo:nil];",
        );

        let mut code = Code::new();
        code.line(format!("static void {}(MonoObject* exception)", mono::RAISE_FN));
        code.block("{", body, "}");
        code
    }

    fn impl_support(&self, _cx: &CodegenContext<'_>, _decl: DeclId) -> Code {
        Code::new()
    }

    fn define(&self, cx: &CodegenContext<'_>, decl: DeclId, bodies: Vec<Code>) -> Code {
        let mut code = Code::new();
        match &cx.model.decl(decl).kind {
            DeclKind::ArrayWrapper(w) => {
                let element = cx.printer().array_key(&w.element).unwrap_or_default();
                let mut release = Code::new();
                if is_object(&element) {
                    release.braced(
                        "for (guint i = 0; i < array->len; i++)",
                        Code::single("CFBridgingRelease(g_array_index(array, void*, i));"),
                    );
                }
                release.line("g_array_free(array, TRUE);");
                release.line("array = NULL;");
                let mut body = Code::new();
                body.braced("if (array)", release);
                code.line(format!("@implementation {}", cx.flat_name(decl)));
                code.blank();
                code.line("- (void)dealloc");
                code.block("{", body, "}");
                code.blank();
                code.line("@end");
                return code;
            }
            DeclKind::Class(c) if !c.is_value_type() => {}
            _ => {
                for body in bodies {
                    if !code.is_empty() {
                        code.blank();
                    }
                    code.append(body);
                }
                return code;
            }
        }

        code.line(format!("@implementation {}", cx.flat_name(decl)));
        if needs_handle(cx.model, decl) && owns_handle(cx.model, decl) {
            let mut init = Code::new();
            init.line("self = [super init];");
            init.braced("if (self)", Code::single("_handle = handle;"));
            init.line("return self;");
            code.blank();
            code.line("- (instancetype)initWithHandle:(uint32_t)handle");
            code.block("{", init, "}");

            let mut release = Code::new();
            release.line(format!("{}(_handle);", mono::HANDLE_FREE));
            release.line("_handle = 0;");
            let mut dealloc = Code::new();
            dealloc.braced("if (_handle)", release);
            code.blank();
            code.line("- (void)dealloc");
            code.block("{", dealloc, "}");
        }
        for body in bodies {
            code.blank();
            code.append(body);
        }
        code.blank();
        code.line("@end");
        code
    }

    // Members

    fn function_head(&self, cx: &CodegenContext<'_>, member: MemberId) -> Result<Code, UnsupportedType> {
        let declaring = cx.model.member(member).declaring;
        if Self::is_value_type(cx, declaring) {
            Ok(Code::single(flat_signature(cx, member)?))
        } else {
            Ok(Code::single(Self::method_signature(cx, member)?))
        }
    }

    fn self_handle(&self, _cx: &CodegenContext<'_>, _decl: DeclId) -> String {
        "_handle".to_string()
    }

    fn self_value(&self) -> &'static str {
        "self"
    }

    fn construct_begin(&self, cx: &CodegenContext<'_>, decl: DeclId) -> Code {
        let mut code = Code::new();
        if owns_handle(cx.model, decl) {
            code.line("self = [super init];");
        } else {
            code.line("self = [super initWithHandle:0];");
        }
        code.braced("if (!self)", Code::single("return nil;"));
        code
    }

    fn construct_finish(&self, cx: &CodegenContext<'_>, decl: DeclId) -> Code {
        if Self::is_value_type(cx, decl) {
            flat_value_return(cx, decl)
        } else {
            Code::single("return self;")
        }
    }

    fn construct_abort(&self, cx: &CodegenContext<'_>, decl: DeclId) -> Code {
        if Self::is_value_type(cx, decl) {
            Code::single(format!("return ({}){{0}};", cx.flat_name(decl)))
        } else {
            Code::single("return nil;")
        }
    }
}
