//! C++: classes owning their handle, exceptions as C++ exceptions.

use mbind_ir::{DeclId, DeclKind, Member, MemberId, RefDirection, TypeExpr};
use mbind_types::{Dialect, UnsupportedType};

use super::{
    bound_base, callables, handle_accessor_name, include_guard, layout_fields, needs_handle,
    owns_handle, param_decls, Target,
};
use crate::code::Code;
use crate::context::CodegenContext;
use crate::{literal, mono};

pub struct CppTarget;

impl CppTarget {
    /// Parameter list with default arguments on the trailing run of
    /// parameters whose constant has a spelling.
    fn params_with_defaults(cx: &CodegenContext<'_>, member: &Member) -> Result<String, UnsupportedType> {
        let mut decls = param_decls(cx, member)?;
        let defaults: Vec<Option<String>> = member
            .params()
            .iter()
            .map(|p| {
                p.default
                    .as_ref()
                    .and_then(|value| literal::default_argument(cx.printer(), value, &p.ty))
            })
            .collect();
        let first = defaults
            .iter()
            .rposition(Option::is_none)
            .map_or(0, |last_missing| last_missing + 1);
        for (decl, default) in decls.iter_mut().zip(&defaults).skip(first) {
            if let Some(value) = default {
                decl.push_str(" = ");
                decl.push_str(value);
            }
        }
        Ok(decls.join(", "))
    }

    fn member_declaration(cx: &CodegenContext<'_>, id: MemberId) -> Result<String, UnsupportedType> {
        let m = cx.model.member(id);
        let params = Self::params_with_defaults(cx, m)?;
        if m.is_constructor() {
            return Ok(format!("{}({params});", cx.flat_name(m.declaring)));
        }
        let ret = cx.print(m.value_type())?;
        let name = m.emitted_name();
        let line = if m.is_static {
            format!("static {ret} {name}({params});")
        } else if cx.model.decl(m.declaring).is_interface() {
            format!("virtual {ret} {name}({params}) = 0;")
        } else if cx.model.is_proxy(m.declaring) && m.is_virtual() {
            format!("{ret} {name}({params}) override;")
        } else {
            format!("{ret} {name}({params});")
        };
        Ok(line)
    }

    fn declare_interface(cx: &CodegenContext<'_>, decl: DeclId) -> Result<Code, UnsupportedType> {
        let flat = cx.flat_name(decl);
        let bases: Vec<String> = cx
            .model
            .decl(decl)
            .as_interface()
            .map(|i| i.bases.iter().map(|&b| format!("public virtual {}", cx.flat_name(b))).collect())
            .unwrap_or_default();
        let head = if bases.is_empty() {
            format!("class {flat} {{")
        } else {
            format!("class {flat} : {} {{", bases.join(", "))
        };
        let mut body = Code::new();
        body.line(format!("virtual ~{flat}() = default;"));
        for id in callables(cx.model, decl) {
            body.line(Self::member_declaration(cx, id)?);
        }
        let mut code = Code::new();
        code.line(head);
        code.line("public:");
        code.nest(body);
        code.line("};");
        Ok(code)
    }

    fn declare_class(cx: &CodegenContext<'_>, decl: DeclId) -> Result<Code, UnsupportedType> {
        let flat = cx.flat_name(decl);
        let class = cx.model.decl(decl).as_class();
        let base = bound_base(cx.model, decl)
            .map(|b| cx.flat_name(b))
            .or_else(|| class.and_then(|c| c.proxy_of).map(|i| cx.flat_name(i)));
        let head = match base {
            Some(base) => format!("class {flat} : public {base} {{"),
            None => format!("class {flat} {{"),
        };

        let mut body = Code::new();
        if needs_handle(cx.model, decl) {
            body.line(format!("explicit {flat}(mbind::handle handle);"));
            if owns_handle(cx.model, decl) {
                body.line(format!("virtual ~{flat}();"));
            }
            body.line(format!("{flat}(const {flat}&) = delete;"));
            body.line(format!("{flat}& operator=(const {flat}&) = delete;"));
        } else {
            body.line(format!("{flat}() = delete;"));
        }
        let members = callables(cx.model, decl);
        if !members.is_empty() {
            body.blank();
        }
        for id in members {
            body.line(Self::member_declaration(cx, id)?);
        }
        if owns_handle(cx.model, decl) {
            body.blank();
            body.line("uint32_t _handle;");
        }

        let mut code = Code::new();
        code.line(head);
        code.line("public:");
        code.nest(body);
        code.line("};");
        Ok(code)
    }

    fn declare_value_type(cx: &CodegenContext<'_>, decl: DeclId) -> Result<Code, UnsupportedType> {
        let flat = cx.flat_name(decl);
        let mut body = Code::new();
        for field in layout_fields(cx.model, decl) {
            body.line(format!("{} {};", cx.print(field.value_type())?, field.native_name));
        }
        let members = callables(cx.model, decl);
        let has_default_ctor = members.iter().any(|&id| {
            let m = cx.model.member(id);
            m.is_constructor() && m.params().is_empty()
        });
        body.blank();
        if !has_default_ctor {
            body.line(format!("{flat}() = default;"));
        }
        for id in members {
            body.line(Self::member_declaration(cx, id)?);
        }
        let mut code = Code::new();
        code.block(format!("struct {flat} {{"), body, "};");
        Ok(code)
    }
}

impl Target for CppTarget {
    fn dialect(&self) -> Dialect {
        Dialect::Cpp
    }

    fn null(&self) -> &'static str {
        "nullptr"
    }

    fn bool_literal(&self, value: bool) -> &'static str {
        if value {
            "true"
        } else {
            "false"
        }
    }

    fn cast(&self, ty: &str, expr: &str) -> String {
        format!("static_cast<{ty}>({expr})")
    }

    // Strings

    fn decode_string(&self, mono_str: &str, var: &str) -> Code {
        let mut convert = Code::new();
        convert.line(format!("char* {var}_utf8 = {}({mono_str});", mono::STRING_TO_UTF8));
        convert.line(format!("{var} = {var}_utf8;"));
        convert.line(format!("{}({var}_utf8);", mono::FREE));
        let mut code = Code::new();
        code.line(format!("std::string {var};"));
        code.braced(&format!("if ({mono_str})"), convert);
        code
    }

    fn encode_string(&self, native: &str) -> String {
        format!("{}({}, {native}.c_str())", mono::STRING_NEW, mono::DOMAIN)
    }

    fn string_ref_contents(&self, param: &str, _direction: RefDirection) -> String {
        param.to_string()
    }

    fn write_string_ref(&self, param: &str, utf8: &str) -> String {
        format!("{param} = {utf8};")
    }

    // Objects

    fn interface_handle(&self, cx: &CodegenContext<'_>, proxy: DeclId, object: &str) -> String {
        format!(
            "static_cast<{}*>({object})->{}()",
            cx.flat_name(proxy),
            handle_accessor_name(cx, proxy)
        )
    }

    fn wrap(&self, cx: &CodegenContext<'_>, class: DeclId, handle: &str) -> String {
        format!("new {}(mbind::handle{{{handle}}})", cx.flat_name(class))
    }

    fn release(&self, _cx: &CodegenContext<'_>, ty: &TypeExpr, object: &str) -> Option<String> {
        match ty {
            TypeExpr::Decl(_) => Some(format!("delete {object};")),
            _ => None,
        }
    }

    fn deref(&self, param: &str) -> String {
        param.to_string()
    }

    fn address_of_ref(&self, param: &str) -> String {
        format!("&{param}")
    }

    // Containers

    fn container_declare(&self, var: &str, wrapper: &str) -> String {
        format!("{wrapper} {var};")
    }

    fn container_alloc(&self, var: &str, _wrapper: &str, _element: &str, len: &str) -> Code {
        Code::single(format!("{var}.array.reserve({len});"))
    }

    fn container_len(&self, container: &str) -> String {
        format!("{container}.array.size()")
    }

    fn container_get(&self, container: &str, _element: &str, index: &str) -> String {
        format!("{container}.array[{index}]")
    }

    fn container_push(&self, container: &str, _element: &str, value: &str) -> Code {
        Code::single(format!("{container}.array.push_back({value});"))
    }

    fn container_nullable(&self) -> bool {
        false
    }

    fn default_value(&self, cx: &CodegenContext<'_>, ty: &TypeExpr) -> Result<String, UnsupportedType> {
        let value = match ty {
            TypeExpr::Void => String::new(),
            TypeExpr::Primitive(mbind_ir::PrimitiveKind::Bool) => "false".to_string(),
            TypeExpr::Primitive(kind) => {
                cx.printer().primitive(*kind)?;
                "0".to_string()
            }
            TypeExpr::String => "std::string()".to_string(),
            TypeExpr::Array(_) => format!("{}()", cx.print(ty)?),
            TypeExpr::Decl(id) => match &cx.model.decl(*id).kind {
                DeclKind::Enum(_) => self.cast(&cx.flat_name(*id), "0"),
                DeclKind::Class(c) if c.is_value_type() => format!("{}()", cx.flat_name(*id)),
                _ => "nullptr".to_string(),
            },
            TypeExpr::ByRef(..) | TypeExpr::Unsupported(_) => {
                return Err(UnsupportedType(cx.printer().managed_spelling(ty)));
            }
        };
        Ok(value)
    }

    // Units

    fn header_prelude(&self, cx: &CodegenContext<'_>) -> Code {
        let guard = include_guard(cx);
        let mut code = Code::new();
        code.line(format!("#ifndef {guard}"));
        code.line(format!("#define {guard}"));
        code.blank();
        for header in ["cstdint", "limits", "stdexcept", "string", "vector"] {
            code.line(format!("#include <{header}>"));
        }
        code.blank();
        code.line("#ifndef MBIND_SUPPORT_DEFINED");
        code.line("#define MBIND_SUPPORT_DEFINED");
        code.line("namespace mbind {");
        code.blank();
        code.block("struct handle {", Code::single("uint32_t value;"), "};");
        code.blank();
        let mut exception = Code::new();
        exception.line("explicit managed_exception(const std::string& message)");
        exception.line("    : std::runtime_error(message) {}");
        code.line("class managed_exception : public std::runtime_error {");
        code.line("public:");
        code.nest(exception);
        code.line("};");
        code.blank();
        code.line("} // namespace mbind");
        code.line("#endif");
        code
    }

    fn header_epilogue(&self, cx: &CodegenContext<'_>) -> Code {
        Code::single(format!("#endif // {}", include_guard(cx)))
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
                    code.line(format!("struct {flat};"));
                }
                DeclKind::Class(_) | DeclKind::Interface(_) => {
                    code.line(format!("class {flat};"));
                }
                DeclKind::ArrayWrapper(_) => {
                    code.line(format!("struct {flat};"));
                }
                DeclKind::Enum(_) | DeclKind::ObjectRepr(_) => {}
            }
        }
        code
    }

    fn declare_enum(&self, cx: &CodegenContext<'_>, decl: DeclId) -> Code {
        let flat = cx.flat_name(decl);
        let backing = cx
            .model
            .decl(decl)
            .as_enum()
            .and_then(|e| cx.printer().primitive(e.backing).ok())
            .unwrap_or("int32_t");
        let items = super::enum_items(cx, decl, str::to_string);
        let mut code = Code::new();
        code.block(format!("enum class {flat} : {backing} {{"), items, "};");
        code
    }

    fn declare(&self, cx: &CodegenContext<'_>, decl: DeclId) -> Result<Code, UnsupportedType> {
        match &cx.model.decl(decl).kind {
            DeclKind::ArrayWrapper(w) => {
                let mut code = Code::new();
                code.block(
                    format!("struct {} {{", cx.flat_name(decl)),
                    Code::single(format!("{} array;", cx.printer().container_type(&w.element)?)),
                    "};",
                );
                Ok(code)
            }
            DeclKind::Interface(_) => Self::declare_interface(cx, decl),
            DeclKind::Class(c) if c.is_value_type() => Self::declare_value_type(cx, decl),
            DeclKind::Class(_) => Self::declare_class(cx, decl),
            DeclKind::Enum(_) | DeclKind::ObjectRepr(_) => Ok(Code::new()),
        }
    }

    fn impl_prelude(&self, cx: &CodegenContext<'_>) -> Code {
        let mut code = Code::new();
        code.line(format!("#include \"{}.h\"", cx.options.base_name));
        code.blank();
        code.line("#include <cstdlib>");
        for header in mono::INCLUDES {
            code.line(format!("#include <{header}>"));
        }
        code
    }

    fn raise_function(&self, _cx: &CodegenContext<'_>) -> Code {
        let mut convert = Code::new();
        convert.line(format!("char* utf8 = {}(text);", mono::STRING_TO_UTF8));
        convert.line("message = utf8;");
        convert.line(format!("{}(utf8);", mono::FREE));

        let mut body = Code::new();
        body.line("MonoString* text = mono_object_to_string(exception, nullptr);");
        body.line("std::string message;");
        body.braced("if (text)", convert);
        body.line("throw mbind::managed_exception(message);");

        let mut code = Code::new();
        code.line(format!("[[noreturn]] static void {}(MonoObject* exception)", mono::RAISE_FN));
        code.block("{", body, "}");
        code
    }

    fn impl_support(&self, _cx: &CodegenContext<'_>, _decl: DeclId) -> Code {
        Code::new()
    }

    fn define(&self, cx: &CodegenContext<'_>, decl: DeclId, bodies: Vec<Code>) -> Code {
        let mut code = Code::new();
        if needs_handle(cx.model, decl) {
            let flat = cx.flat_name(decl);
            code.line(format!("{flat}::{flat}(mbind::handle handle)"));
            match bound_base(cx.model, decl) {
                Some(base) if !owns_handle(cx.model, decl) => {
                    code.line(format!("    : {}(handle)", cx.flat_name(base)));
                }
                _ => {
                    code.line("    : _handle(handle.value)");
                }
            }
            code.line("{");
            code.line("}");

            if owns_handle(cx.model, decl) {
                let mut release = Code::new();
                release.line(format!("{}(_handle);", mono::HANDLE_FREE));
                release.line("_handle = 0;");
                let mut body = Code::new();
                body.braced("if (_handle)", release);
                code.blank();
                code.line(format!("{flat}::~{flat}()"));
                code.block("{", body, "}");
            }
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
        let m = cx.model.member(member);
        let owner = cx.flat_name(m.declaring);
        let params = param_decls(cx, m)?.join(", ");
        let mut code = Code::new();
        if m.is_constructor() {
            code.line(format!("{owner}::{owner}({params})"));
            if needs_handle(cx.model, m.declaring) {
                match bound_base(cx.model, m.declaring) {
                    Some(base) if !owns_handle(cx.model, m.declaring) => {
                        code.line(format!("    : {}(mbind::handle{{0}})", cx.flat_name(base)));
                    }
                    _ => {
                        code.line("    : _handle(0)");
                    }
                }
            }
        } else {
            let ret = cx.print(m.value_type())?;
            code.line(format!("{ret} {owner}::{}({params})", m.emitted_name()));
        }
        Ok(code)
    }

    fn self_handle(&self, _cx: &CodegenContext<'_>, _decl: DeclId) -> String {
        "_handle".to_string()
    }

    fn self_value(&self) -> &'static str {
        "this"
    }

    fn construct_begin(&self, _cx: &CodegenContext<'_>, _decl: DeclId) -> Code {
        Code::new()
    }

    fn construct_finish(&self, cx: &CodegenContext<'_>, decl: DeclId) -> Code {
        if cx.model.decl(decl).is_value_type() {
            Code::single(format!("*this = *({}*)__instance;", cx.flat_name(decl)))
        } else {
            Code::new()
        }
    }

    fn construct_abort(&self, _cx: &CodegenContext<'_>, _decl: DeclId) -> Code {
        Code::single("return;")
    }
}
