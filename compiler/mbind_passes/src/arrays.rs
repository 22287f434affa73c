//! Array-wrapper synthesis.
//!
//! Scans member signatures in emission order. The first `T[]` met for a
//! given element key creates the wrapper, placed right before the
//! declaration that referenced it; every later `T[]` reuses the cached
//! one. For `T[][]` the inner wrapper is created first so it precedes the
//! outer one.

use mbind_ir::{ArrayWrapperDecl, DeclId, DeclKind, Insertion, Model, TypeDecl, TypeExpr};

use crate::PipelineContext;

pub fn synthesize_array_wrappers(model: &mut Model, ctx: &mut PipelineContext) {
    let decls: Vec<DeclId> = model.emission_order().to_vec();
    let before = ctx.array_count();

    for decl in decls {
        if model.decl(decl).suppressed {
            continue;
        }
        let types: Vec<TypeExpr> = model
            .emitted_members_of(decl)
            .flat_map(|(_, m)| m.signature_types().cloned().collect::<Vec<_>>())
            .collect();
        for ty in &types {
            visit(model, ctx, ty, decl);
        }
    }
    ctx.splice_pending(model);

    tracing::debug!(
        wrappers = ctx.array_count() - before,
        "synthesized array wrappers"
    );
}

fn visit(model: &mut Model, ctx: &mut PipelineContext, ty: &TypeExpr, anchor: DeclId) {
    match ty {
        TypeExpr::Array(element) => ensure_wrapper(model, ctx, element, anchor),
        TypeExpr::ByRef(inner, _) => visit(model, ctx, inner, anchor),
        TypeExpr::Void
        | TypeExpr::Primitive(_)
        | TypeExpr::String
        | TypeExpr::Decl(_)
        | TypeExpr::Unsupported(_) => {}
    }
}

fn ensure_wrapper(model: &mut Model, ctx: &mut PipelineContext, element: &TypeExpr, anchor: DeclId) {
    if let TypeExpr::Array(inner) = element {
        ensure_wrapper(model, ctx, inner, anchor);
    }
    let printer = ctx.printer(model);
    let (Ok(key), Ok(name)) = (printer.array_key(element), printer.array_wrapper_name(element))
    else {
        return;
    };
    if ctx.cached_array(&key).is_some() {
        return;
    }
    let wrapper = TypeDecl::synthesized(
        name,
        DeclKind::ArrayWrapper(ArrayWrapperDecl {
            element: element.clone(),
            key: key.clone(),
        }),
    );
    let id = model.add_synthesized_decl(wrapper);
    ctx.cache_array(key, id);
    ctx.queue_insertion(Insertion {
        decl: id,
        before: Some(anchor),
    });
}
