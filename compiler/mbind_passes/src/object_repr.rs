//! Object-representation synthesis.
//!
//! Every bound reference class gets exactly one way of carrying its
//! managed handle, picked by the dialect:
//! - opaque typedef: a synthesized `struct _NS_Foo` behind
//!   `typedef ... NS_Foo`, placed right before the class
//! - embedded field: a private `_handle` field in the root-most bound
//!   class of the inheritance chain; derived classes inherit it
//!
//! Value types and static classes get nothing. Interfaces get nothing
//! either: they cross the boundary through their proxy, which receives a
//! representation when the proxy pass creates it.

use mbind_ir::{
    Access, DeclId, DeclKind, Field, Insertion, Member, MemberKind, MemberOrigin, Model,
    ObjectReprDecl, PrimitiveKind, TypeDecl, TypeExpr,
};
use mbind_types::ReprStrategy;

use crate::PipelineContext;

/// Name of the injected handle field.
pub(crate) const HANDLE_FIELD: &str = "_handle";

pub fn synthesize_object_reprs(model: &mut Model, ctx: &mut PipelineContext) {
    let classes: Vec<DeclId> = model
        .emission_order()
        .iter()
        .copied()
        .filter(|&id| {
            let decl = model.decl(id);
            !decl.suppressed && decl.as_class().is_some_and(|c| c.needs_handle())
        })
        .collect();

    let mut attached = 0;
    for class in classes {
        let typedef_name = ctx.printer(model).flat_name(class);
        if attach_repr(model, ctx, class, typedef_name, Some(class)) {
            attached += 1;
        }
    }
    ctx.splice_pending(model);

    tracing::debug!(
        strategy = ?ctx.caps().repr,
        attached,
        "synthesized object representations"
    );
}

/// Give `class` the dialect's handle holder. Returns `false` when the
/// class inherits one instead.
///
/// `typedef_name` is the name callers use for the class; `anchor` is
/// where a synthesized typedef is placed.
pub(crate) fn attach_repr(
    model: &mut Model,
    ctx: &mut PipelineContext,
    class: DeclId,
    typedef_name: String,
    anchor: Option<DeclId>,
) -> bool {
    match ctx.caps().repr {
        ReprStrategy::OpaqueTypedef => {
            let repr = TypeDecl::synthesized(
                format!("_{typedef_name}"),
                DeclKind::ObjectRepr(ObjectReprDecl {
                    class,
                    typedef_name,
                }),
            );
            let id = model.add_synthesized_decl(repr);
            if let Some(c) = model.decl_mut(class).as_class_mut() {
                c.object_repr = Some(id);
            }
            ctx.queue_insertion(Insertion {
                decl: id,
                before: anchor,
            });
            true
        }
        ReprStrategy::EmbeddedField => {
            if has_bound_base(model, class) {
                return false;
            }
            let mut field = Member::new(
                class,
                HANDLE_FIELD,
                MemberKind::Field(Field {
                    ty: TypeExpr::Primitive(PrimitiveKind::U32),
                    is_readonly: false,
                    is_literal: false,
                }),
            );
            field.access = Access::Private;
            field.origin = MemberOrigin::HandleField;
            let id = model.add_member(field);
            if let Some(c) = model.decl_mut(class).as_class_mut() {
                c.handle_field = Some(id);
            }
            true
        }
    }
}

fn has_bound_base(model: &Model, class: DeclId) -> bool {
    model.base_chain(class).into_iter().any(|base| {
        let decl = model.decl(base);
        !decl.suppressed && decl.as_class().is_some_and(|c| c.needs_handle())
    })
}

#[cfg(test)]
mod tests;
