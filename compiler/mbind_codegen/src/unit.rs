//! Output units: one header and one implementation per run.

use std::fmt;

use mbind_ir::{DeclId, DeclKind, FrozenModel};

use crate::code::Code;
use crate::context::CodegenContext;
use crate::member::generate_member;
use crate::options::{CodegenOptions, ExceptionMode, LookupStrategy};
use crate::target::callables;
use crate::{literal, mono, CodegenError};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnitKind {
    Header,
    Implementation,
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitKind::Header => f.write_str("header"),
            UnitKind::Implementation => f.write_str("implementation"),
        }
    }
}

/// One generated file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputUnit {
    /// File name, e.g. `Lib.h`.
    pub name: String,
    pub kind: UnitKind,
    pub text: String,
}

/// Generate the header and implementation units of a frozen model.
pub fn generate(model: &FrozenModel, options: &CodegenOptions) -> Result<Vec<OutputUnit>, CodegenError> {
    let _span = tracing::debug_span!(
        "codegen",
        dialect = %options.dialect,
        lookup = %options.lookup,
        exceptions = %options.exceptions,
    )
    .entered();

    let mut cx = CodegenContext::new(model, options);
    let caps = options.dialect.caps();

    let header = OutputUnit {
        name: format!("{}.{}", options.base_name, caps.header_ext),
        kind: UnitKind::Header,
        text: header_text(&mut cx)?,
    };
    tracing::debug!(unit = %header.name, bytes = header.text.len(), "emitted unit");

    let implementation = OutputUnit {
        name: format!("{}.{}", options.base_name, caps.impl_ext),
        kind: UnitKind::Implementation,
        text: implementation_text(&mut cx)?,
    };
    tracing::debug!(
        unit = %implementation.name,
        bytes = implementation.text.len(),
        "emitted unit"
    );

    Ok(vec![header, implementation])
}

/// Declarations that reach the output, in emission order.
fn emitted(model: &FrozenModel) -> Vec<DeclId> {
    model
        .emission_order()
        .iter()
        .copied()
        .filter(|&id| !model.decl(id).suppressed)
        .collect()
}

fn header_text(cx: &mut CodegenContext<'_>) -> Result<String, CodegenError> {
    let target = cx.target();
    let decls = emitted(cx.model);

    let prelude = target.header_prelude(cx);
    cx.write_code(&prelude);
    cx.newline();

    let forward = target.forward_declarations(cx);
    if !forward.is_empty() {
        cx.write_code(&forward);
        cx.newline();
    }

    // Enums depend on nothing and are hoisted so every later declaration
    // can name them.
    for &decl in &decls {
        if matches!(cx.model.decl(decl).kind, DeclKind::Enum(_)) {
            let code = target.declare_enum(cx, decl);
            cx.write_code(&code);
            cx.newline();
        }
    }

    for &decl in &decls {
        let code = target
            .declare(cx, decl)
            .map_err(|source| CodegenError::Declaration {
                decl: cx.model.qualified_name(decl),
                source,
            })?;
        if !code.is_empty() {
            cx.write_code(&code);
            cx.newline();
        }
    }

    let epilogue = target.header_epilogue(cx);
    cx.write_code(&epilogue);
    Ok(cx.take_output())
}

fn implementation_text(cx: &mut CodegenContext<'_>) -> Result<String, CodegenError> {
    let target = cx.target();
    let decls = emitted(cx.model);

    let prelude = target.impl_prelude(cx);
    cx.write_code(&prelude);
    cx.newline();

    if !cx.has_helper(mono::IMAGE_FN) {
        let image = image_function(cx);
        cx.write_code(&image);
        cx.newline();
        cx.mark_helper(mono::IMAGE_FN);
    }
    if cx.options.exceptions == ExceptionMode::Throw && !cx.has_helper(mono::RAISE_FN) {
        let raise = target.raise_function(cx);
        cx.write_code(&raise);
        cx.newline();
        cx.mark_helper(mono::RAISE_FN);
    }

    for &decl in &decls {
        let d = cx.model.decl(decl);
        let declared = !d.is_synthesized()
            && matches!(d.kind, DeclKind::Class(_) | DeclKind::Interface(_) | DeclKind::Enum(_));
        let getter = mono::class_fn(&cx.flat_name(decl));
        if declared && !cx.has_helper(&getter) {
            let code = class_getter(cx, decl);
            cx.write_code(&code);
            cx.newline();
            cx.mark_helper(getter);
        }
    }

    for &decl in &decls {
        let support = target.impl_support(cx, decl);
        if !support.is_empty() {
            cx.write_code(&support);
            cx.newline();
        }
    }

    for &decl in &decls {
        let d = cx.model.decl(decl);
        if d.is_interface() || matches!(d.kind, DeclKind::Enum(_) | DeclKind::ObjectRepr(_)) {
            continue;
        }
        let mut bodies = Vec::new();
        for member in callables(cx.model, decl) {
            bodies.push(generate_member(cx, member)?.code);
        }
        let code = target.define(cx, decl, bodies);
        if !code.is_empty() {
            cx.write_code(&code);
            cx.newline();
        }
    }

    Ok(cx.take_output())
}

/// `mbind_image()`: the bound assembly's image, loaded on first use.
fn image_function(cx: &CodegenContext<'_>) -> Code {
    let assembly = literal::string(&format!("{}.dll", cx.options.library), mbind_types::Dialect::C);
    let mut load = Code::new();
    load.line(format!(
        "MonoAssembly* assembly = mono_domain_assembly_open({}, {assembly});",
        mono::DOMAIN
    ));
    load.line("image = assembly ? mono_assembly_get_image(assembly) : NULL;");

    let mut body = Code::new();
    body.line("static MonoImage* image = NULL;");
    body.braced("if (!image)", load);
    body.line("return image;");

    let mut code = Code::new();
    code.line(format!("static MonoImage* {}(void)", mono::IMAGE_FN));
    code.block("{", body, "}");
    code
}

/// Cached class-handle getter of a declared type.
fn class_getter(cx: &CodegenContext<'_>, decl: DeclId) -> Code {
    let find = match cx.options.lookup {
        LookupStrategy::Token => format!(
            "klass = {}({}(), 0x{:08X});",
            mono::CLASS_FROM_TOKEN,
            mono::IMAGE_FN,
            cx.model.decl(decl).token
        ),
        LookupStrategy::Name => {
            let namespace = cx.model.namespace_of(decl);
            let name = cx.model.nesting_chain(decl).join("/");
            format!(
                "klass = {}({}(), {}, {});",
                mono::CLASS_FROM_NAME,
                mono::IMAGE_FN,
                literal::string(namespace, mbind_types::Dialect::C),
                literal::string(&name, mbind_types::Dialect::C)
            )
        }
    };
    let mut body = Code::new();
    body.line("static MonoClass* klass = NULL;");
    body.braced("if (!klass)", Code::single(find));
    body.line("return klass;");

    let mut code = Code::new();
    code.line(format!(
        "static MonoClass* {}(void)",
        mono::class_fn(&cx.flat_name(decl))
    ));
    code.block("{", body, "}");
    code
}

#[cfg(test)]
mod tests;
