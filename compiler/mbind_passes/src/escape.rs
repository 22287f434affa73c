//! Keyword escaping.
//!
//! A member, parameter or enum item whose name is reserved in the target
//! dialect is spelled with a leading `_`. A name equal to the dialect's
//! constructor marker is left alone: there it already is the constructor
//! selector.

use mbind_diagnostic::{Diagnostic, ErrorCode};
use mbind_ir::{DeclKind, MemberKind, Model};
use mbind_types::Dialect;

use crate::PipelineContext;

pub fn escape_keywords(model: &mut Model, ctx: &mut PipelineContext) {
    let dialect = ctx.dialect();
    let mut escaped = Vec::new();
    let decls: Vec<_> = model.emission_order().to_vec();

    for decl in decls {
        let members: Vec<_> = model.decl(decl).members().to_vec();
        for id in members {
            let member = model.member_mut(id);
            if let Some(name) = escape(dialect, &member.native_name) {
                escaped.push((id, std::mem::replace(&mut member.native_name, name)));
            }
            let params = match &mut member.kind {
                MemberKind::Method(m) => &mut m.params,
                MemberKind::Constructor(c) => &mut c.params,
                MemberKind::Property(p) => &mut p.params,
                MemberKind::Field(_) => continue,
            };
            for param in params {
                if let Some(name) = escape(dialect, &param.name) {
                    param.name = name;
                }
            }
        }
        if let DeclKind::Enum(e) = &mut model.decl_mut(decl).kind {
            for item in &mut e.items {
                if let Some(name) = escape(dialect, &item.native_name) {
                    item.native_name = name;
                }
            }
        }
    }

    for (id, old) in &escaped {
        let path = model.member_path(*id);
        ctx.report(
            Diagnostic::note(ErrorCode::E3003)
                .with_message(format!(
                    "`{old}` is reserved; emitted as `{}`",
                    model.member(*id).native_name
                ))
                .at(path),
        );
    }
    tracing::debug!(members = escaped.len(), "escaped reserved words");
}

/// The escaped spelling of `name`, or `None` if it needs none.
fn escape(dialect: Dialect, name: &str) -> Option<String> {
    if dialect.caps().ctor_marker == Some(name) {
        return None;
    }
    dialect.is_keyword(name).then(|| format!("_{name}"))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use mbind_ir::{ModelBuilder, Param, PrimitiveKind, TypeExpr};
    use mbind_types::Dialect;

    use super::escape_keywords;
    use crate::PipelineContext;

    #[test]
    fn escapes_members_params_and_items() {
        let mut b = ModelBuilder::new("Lib");
        let foo = b.class("NS", "Foo");
        let m = b.method(
            foo,
            "delete",
            vec![Param::new("class", TypeExpr::INT), Param::new("x", TypeExpr::INT)],
            TypeExpr::Void,
        );
        let keep = b.method(foo, "Run", vec![], TypeExpr::Void);
        let e = b.enumeration("NS", "Op", PrimitiveKind::I32, &[("new", None), ("Old", None)]);
        let mut model = b.build();

        let mut ctx = PipelineContext::new(Dialect::Cpp, "_");
        escape_keywords(&mut model, &mut ctx);

        let member = model.member(m);
        assert_eq!(member.native_name, "_delete");
        assert_eq!(member.declared_name, "delete");
        assert_eq!(member.params()[0].name, "_class");
        assert_eq!(member.params()[1].name, "x");
        assert_eq!(model.member(keep).native_name, "Run");
        let items: Vec<_> = model.decl(e).as_enum().map_or_else(Vec::new, |e| {
            e.items.iter().map(|i| i.native_name.clone()).collect()
        });
        assert_eq!(items, vec!["_new".to_string(), "Old".to_string()]);
    }

    #[test]
    fn reserved_words_depend_on_dialect() {
        let mut b = ModelBuilder::new("Lib");
        let foo = b.class("NS", "Foo");
        let m = b.method(foo, "class", vec![], TypeExpr::Void);
        let model = b.build();

        let mut c_model = model.clone();
        escape_keywords(&mut c_model, &mut PipelineContext::new(Dialect::C, "_"));
        assert_eq!(c_model.member(m).native_name, "class");

        let mut objc_model = model;
        escape_keywords(&mut objc_model, &mut PipelineContext::new(Dialect::ObjC, "_"));
        assert_eq!(objc_model.member(m).native_name, "_class");
    }

    #[test]
    fn constructor_marker_is_not_escaped() {
        let mut b = ModelBuilder::new("Lib");
        let foo = b.class("NS", "Foo");
        let init = b.method(foo, "init", vec![], TypeExpr::Void);
        let alloc = b.method(foo, "alloc", vec![], TypeExpr::Void);
        let mut model = b.build();

        escape_keywords(&mut model, &mut PipelineContext::new(Dialect::ObjC, "_"));

        assert_eq!(model.member(init).native_name, "init");
        assert_eq!(model.member(alloc).native_name, "_alloc");
    }
}
