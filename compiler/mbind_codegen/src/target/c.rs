//! C: opaque handle structs behind typedefs and free functions.

use mbind_ir::{DeclId, DeclKind, MemberId, RefDirection, TypeExpr};
use mbind_types::{Dialect, UnsupportedType};

use super::{
    c_like_default, flat_prototypes, flat_signature, flat_value_return, include_guard,
    needs_handle, value_struct, Target,
};
use crate::code::Code;
use crate::context::CodegenContext;
use crate::mono;
use crate::options::ExceptionMode;

pub struct CTarget;

impl CTarget {
    fn destroy_fn(cx: &CodegenContext<'_>, decl: DeclId) -> String {
        format!("{}{}destroy", cx.flat_name(decl), cx.options.separator)
    }

    fn handler_type(cx: &CodegenContext<'_>) -> String {
        format!("{}_ExceptionHandler", cx.options.symbol_prefix())
    }
}

impl Target for CTarget {
    fn dialect(&self) -> Dialect {
        Dialect::C
    }

    fn null(&self) -> &'static str {
        "NULL"
    }

    fn sized_enums(&self) -> bool {
        false
    }

    fn bool_literal(&self, value: bool) -> &'static str {
        if value {
            "true"
        } else {
            "false"
        }
    }

    // Strings

    fn decode_string(&self, mono_str: &str, var: &str) -> Code {
        let mut code = Code::new();
        code.line(format!("const char* {var} = NULL;"));
        code.braced(
            &format!("if ({mono_str})"),
            Code::single(format!("{var} = {}({mono_str});", mono::STRING_TO_UTF8)),
        );
        code
    }

    fn encode_string(&self, native: &str) -> String {
        format!("{native} ? {}({}, {native}) : NULL", mono::STRING_NEW, mono::DOMAIN)
    }

    fn string_ref_contents(&self, param: &str, direction: RefDirection) -> String {
        if direction.writes_back() {
            format!("{param}->str")
        } else {
            format!("(*{param})")
        }
    }

    fn write_string_ref(&self, param: &str, utf8: &str) -> String {
        format!("g_string_assign({param}, {utf8});")
    }

    // Objects

    fn interface_handle(&self, _cx: &CodegenContext<'_>, _proxy: DeclId, object: &str) -> String {
        format!("{object}->_handle")
    }

    fn wrap(&self, cx: &CodegenContext<'_>, class: DeclId, handle: &str) -> String {
        format!("{}({handle})", mono::wrap_fn(&cx.flat_name(class)))
    }

    fn release(&self, cx: &CodegenContext<'_>, ty: &TypeExpr, object: &str) -> Option<String> {
        match ty {
            TypeExpr::Decl(id) => {
                let class = super::concrete_class(cx, *id).ok()?;
                Some(format!("{}({object});", Self::destroy_fn(cx, class)))
            }
            TypeExpr::Array(element) => {
                let wrapper = cx.printer().array_wrapper_name(element).ok()?;
                Some(format!("{wrapper}{}destroy({object});", cx.options.separator))
            }
            _ => None,
        }
    }

    fn deref(&self, param: &str) -> String {
        format!("(*{param})")
    }

    fn address_of_ref(&self, param: &str) -> String {
        param.to_string()
    }

    // Containers

    fn container_declare(&self, var: &str, wrapper: &str) -> String {
        format!("{wrapper}* {var} = NULL;")
    }

    fn container_alloc(&self, var: &str, wrapper: &str, element: &str, len: &str) -> Code {
        let mut code = Code::new();
        code.line(format!("{var} = ({wrapper}*)malloc(sizeof({wrapper}));"));
        code.line(format!(
            "{var}->array = g_array_sized_new(FALSE, FALSE, sizeof({element}), (guint){len});"
        ));
        code
    }

    fn container_len(&self, container: &str) -> String {
        format!("{container}->array->len")
    }

    fn container_get(&self, container: &str, element: &str, index: &str) -> String {
        format!("g_array_index({container}->array, {element}, {index})")
    }

    fn container_push(&self, container: &str, _element: &str, value: &str) -> Code {
        Code::single(format!("g_array_append_val({container}->array, {value});"))
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
        code.line("#include <stdbool.h>");
        code.line("#include <stdint.h>");
        code.line("#include <glib.h>");
        code.line("#include <mono/metadata/object.h>");
        code.blank();
        code.line("#ifdef __cplusplus");
        code.line("extern \"C\" {");
        code.line("#endif");
        if cx.options.exceptions == ExceptionMode::Throw {
            let handler = Self::handler_type(cx);
            code.blank();
            code.line(format!("typedef void (*{handler})(MonoObject* exception);"));
            code.line(format!(
                "void {}_set_exception_handler({handler} handler);",
                cx.options.symbol_prefix()
            ));
        }
        code
    }

    fn header_epilogue(&self, cx: &CodegenContext<'_>) -> Code {
        let mut code = Code::new();
        code.line("#ifdef __cplusplus");
        code.line("}");
        code.line("#endif");
        code.blank();
        code.line(format!("#endif /* {} */", include_guard(cx)));
        code
    }

    fn forward_declarations(&self, cx: &CodegenContext<'_>) -> Code {
        let mut code = Code::new();
        for &decl in cx.model.emission_order() {
            let d = cx.model.decl(decl);
            if d.suppressed {
                continue;
            }
            match &d.kind {
                DeclKind::ObjectRepr(repr) => {
                    code.line(format!("typedef struct {} {};", d.name, repr.typedef_name));
                }
                DeclKind::ArrayWrapper(_) => {
                    code.line(format!("typedef struct {0} {0};", d.name));
                }
                DeclKind::Class(c) if c.is_value_type() => {
                    code.line(format!("typedef struct {0} {0};", cx.flat_name(decl)));
                }
                DeclKind::Class(_) | DeclKind::Interface(_) | DeclKind::Enum(_) => {}
            }
        }
        code
    }

    fn declare_enum(&self, cx: &CodegenContext<'_>, decl: DeclId) -> Code {
        let flat = cx.flat_name(decl);
        let sep = &cx.options.separator;
        let items = super::enum_items(cx, decl, |item| format!("{flat}{sep}{item}"));
        let mut code = Code::new();
        code.block(format!("typedef enum {flat} {{"), items, &format!("}} {flat};"));
        code
    }

    fn declare(&self, cx: &CodegenContext<'_>, decl: DeclId) -> Result<Code, UnsupportedType> {
        let mut code = Code::new();
        match &cx.model.decl(decl).kind {
            DeclKind::ArrayWrapper(_) => {
                let name = cx.flat_name(decl);
                code.block(
                    format!("struct {name} {{"),
                    Code::single("GArray* array;"),
                    "};",
                );
                code.line(format!("void {}({name}* array);", Self::destroy_fn(cx, decl)));
            }
            DeclKind::Class(c) => {
                if c.is_value_type() {
                    code.append(value_struct(cx, decl)?);
                }
                code.append(flat_prototypes(cx, decl)?);
                if c.needs_handle() {
                    code.line(format!(
                        "void {}({}* self);",
                        Self::destroy_fn(cx, decl),
                        cx.self_type(decl)
                    ));
                }
            }
            DeclKind::Interface(_) | DeclKind::Enum(_) | DeclKind::ObjectRepr(_) => {}
        }
        Ok(code)
    }

    fn impl_prelude(&self, cx: &CodegenContext<'_>) -> Code {
        let mut code = Code::new();
        code.line(format!("#include \"{}.h\"", cx.options.base_name));
        code.blank();
        code.line("#include <stdlib.h>");
        for header in mono::INCLUDES {
            code.line(format!("#include <{header}>"));
        }
        code
    }

    fn raise_function(&self, cx: &CodegenContext<'_>) -> Code {
        let handler = Self::handler_type(cx);
        let mut code = Code::new();
        code.line(format!("static {handler} mbind_exception_handler = NULL;"));
        code.blank();
        code.line(format!(
            "void {}_set_exception_handler({handler} handler)",
            cx.options.symbol_prefix()
        ));
        code.block("{", Code::single("mbind_exception_handler = handler;"), "}");
        code.blank();

        let mut dispatch = Code::new();
        dispatch.braced(
            "if (mbind_exception_handler)",
            Code::single("mbind_exception_handler(exception);"),
        );
        dispatch.braced(
            "else",
            Code::single("mono_print_unhandled_exception(exception);"),
        );
        code.line(format!("static void {}(MonoObject* exception)", mono::RAISE_FN));
        code.block("{", dispatch, "}");
        code
    }

    fn impl_support(&self, cx: &CodegenContext<'_>, decl: DeclId) -> Code {
        let mut code = Code::new();
        match &cx.model.decl(decl).kind {
            DeclKind::ObjectRepr(_) => {
                code.block(
                    format!("struct {} {{", cx.model.decl(decl).name),
                    Code::single("uint32_t _handle;"),
                    "};",
                );
            }
            DeclKind::Class(c) if c.needs_handle() => {
                let ty = cx.self_type(decl);
                let mut body = Code::new();
                body.line(format!("{ty}* object = ({ty}*)malloc(sizeof({ty}));"));
                body.braced("if (object)", Code::single("object->_handle = handle;"));
                body.line("return object;");
                code.line(format!(
                    "static {ty}* {}(uint32_t handle)",
                    mono::wrap_fn(&cx.flat_name(decl))
                ));
                code.block("{", body, "}");
            }
            _ => {}
        }
        code
    }

    fn define(&self, cx: &CodegenContext<'_>, decl: DeclId, bodies: Vec<Code>) -> Code {
        let mut code = Code::new();
        match &cx.model.decl(decl).kind {
            DeclKind::ArrayWrapper(_) => {
                let name = cx.flat_name(decl);
                let mut release = Code::new();
                release.line("g_array_free(array->array, TRUE);");
                release.line("free(array);");
                code.line(format!("void {}({name}* array)", Self::destroy_fn(cx, decl)));
                code.block("{", braced_if("array", release), "}");
            }
            DeclKind::Class(_) if needs_handle(cx.model, decl) => {
                let mut release = Code::new();
                release.braced("if (self->_handle)", Code::single(format!("{}(self->_handle);", mono::HANDLE_FREE)));
                release.line("free(self);");
                code.line(format!(
                    "void {}({}* self)",
                    Self::destroy_fn(cx, decl),
                    cx.self_type(decl)
                ));
                code.block("{", braced_if("self", release), "}");
            }
            _ => {}
        }
        for body in bodies {
            if !code.is_empty() {
                code.blank();
            }
            code.append(body);
        }
        code
    }

    // Members

    fn function_head(&self, cx: &CodegenContext<'_>, member: MemberId) -> Result<Code, UnsupportedType> {
        Ok(Code::single(flat_signature(cx, member)?))
    }

    fn self_handle(&self, _cx: &CodegenContext<'_>, _decl: DeclId) -> String {
        "self->_handle".to_string()
    }

    fn self_value(&self) -> &'static str {
        "self"
    }

    fn construct_begin(&self, cx: &CodegenContext<'_>, decl: DeclId) -> Code {
        let ty = cx.self_type(decl);
        let mut code = Code::new();
        code.line(format!("{ty}* self = ({ty}*)malloc(sizeof({ty}));"));
        code.braced("if (!self)", Code::single("return NULL;"));
        code.line("self->_handle = 0;");
        code
    }

    fn construct_finish(&self, cx: &CodegenContext<'_>, decl: DeclId) -> Code {
        if cx.model.decl(decl).is_value_type() {
            flat_value_return(cx, decl)
        } else {
            Code::single("return self;")
        }
    }

    fn construct_abort(&self, cx: &CodegenContext<'_>, decl: DeclId) -> Code {
        let mut code = Code::new();
        if cx.model.decl(decl).is_value_type() {
            code.line(format!("return ({}){{0}};", cx.flat_name(decl)));
        } else {
            code.line("free(self);");
            code.line("return NULL;");
        }
        code
    }
}

fn braced_if(condition: &str, body: Code) -> Code {
    let mut code = Code::new();
    code.braced(&format!("if ({condition})"), body);
    code
}
