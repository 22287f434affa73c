//! Field and property lowering.
//!
//! Every bound field and property becomes a getter method (`get_X`) and,
//! when writable, a setter method (`set_X`) placed right after the
//! original in member order. The original is suppressed as `Lowered`.
//!
//! Instance fields of value types are the struct's layout and stay as
//! they are; private fields are suppressed without accessors.

use mbind_ir::{
    DeclId, Member, MemberId, MemberKind, MemberOrigin, Method, Model, Param,
    Suppression, TypeExpr,
};

use crate::PipelineContext;

/// What to synthesize for one field or property.
struct Plan {
    source: MemberId,
    value_ty: TypeExpr,
    index_params: Vec<Param>,
    getter: Option<u32>,
    setter: Option<u32>,
    is_virtual: bool,
}

pub fn lower_accessors(model: &mut Model, _ctx: &mut PipelineContext) {
    let mut getters = 0;
    let mut setters = 0;
    let decls: Vec<DeclId> = model.emission_order().to_vec();

    for decl in decls {
        if model.decl(decl).suppressed {
            continue;
        }
        let is_value_type = model.decl(decl).is_value_type();
        let mut plans = Vec::new();
        let mut private = Vec::new();

        for (id, member) in model.members_of(decl) {
            if member.is_suppressed() {
                continue;
            }
            match &member.kind {
                MemberKind::Field(field) => {
                    if member.access.is_private() {
                        private.push(id);
                        continue;
                    }
                    if is_value_type && !member.is_static && !field.is_literal {
                        continue;
                    }
                    plans.push(Plan {
                        source: id,
                        value_ty: field.ty.clone(),
                        index_params: Vec::new(),
                        getter: Some(member.token),
                        setter: field.is_writable().then_some(member.token),
                        is_virtual: false,
                    });
                }
                MemberKind::Property(prop) => {
                    let usable = |a: &Option<mbind_ir::Accessor>| {
                        a.filter(|a| !a.access.is_private()).map(|a| a.token)
                    };
                    plans.push(Plan {
                        source: id,
                        value_ty: prop.ty.clone(),
                        index_params: prop.params.clone(),
                        getter: usable(&prop.getter),
                        setter: usable(&prop.setter),
                        is_virtual: prop.is_virtual,
                    });
                }
                MemberKind::Method(_) | MemberKind::Constructor(_) => {}
            }
        }

        for id in private {
            model.suppress_member(id, Suppression::Private);
        }
        for plan in plans {
            let mut anchor = plan.source;
            if let Some(token) = plan.getter {
                anchor = add_accessor(model, &plan, anchor, token, false);
                getters += 1;
            }
            if let Some(token) = plan.setter {
                add_accessor(model, &plan, anchor, token, true);
                setters += 1;
            }
            model.suppress_member(plan.source, Suppression::Lowered);
        }
    }

    tracing::debug!(getters, setters, "lowered fields and properties");
}

fn add_accessor(
    model: &mut Model,
    plan: &Plan,
    anchor: MemberId,
    token: u32,
    is_setter: bool,
) -> MemberId {
    let source = model.member(plan.source);
    let prefix = if is_setter { "set_" } else { "get_" };

    // `NS.IFoo.Count` -> `NS.IFoo.get_Count`, the accessor's managed name.
    let declared_name = match source.declared_name.rsplit_once('.') {
        Some((qualifier, name)) => format!("{qualifier}.{prefix}{name}"),
        None => format!("{prefix}{}", source.declared_name),
    };

    let mut params = plan.index_params.clone();
    let return_type = if is_setter {
        params.push(Param::new("value", plan.value_ty.clone()));
        TypeExpr::Void
    } else {
        plan.value_ty.clone()
    };
    for (position, param) in (0u32..).zip(params.iter_mut()) {
        param.position = position;
    }

    let mut accessor = Member::new(
        source.declaring,
        declared_name,
        MemberKind::Method(Method {
            params,
            return_type,
            is_virtual: plan.is_virtual,
            is_abstract: false,
        }),
    );
    accessor.native_name = format!("{prefix}{}", source.native_name);
    accessor.access = source.access;
    accessor.is_static = source.is_static;
    accessor.token = token;
    accessor.origin = if is_setter {
        MemberOrigin::Setter { of: plan.source }
    } else {
        MemberOrigin::Getter { of: plan.source }
    };
    model.insert_member_after(anchor, accessor)
}

#[cfg(test)]
mod tests;
