//! Model validation.
//!
//! Runs before any transformation. Structural problems (dangling ids,
//! nested or misplaced by-ref types, inheritance cycles) abort the run with
//! a [`ModelIntegrityError`]. Types with no native mapping only degrade the
//! bound surface: the member, or the value type, is suppressed and a
//! warning is recorded.

use mbind_diagnostic::{Diagnostic, ErrorCode};
use mbind_ir::{
    DeclId, DeclKind, MemberId, MemberKind, Model, ModelIntegrityError, Suppression, TypeExpr,
};
use rustc_hash::FxHashSet;

use crate::PipelineContext;

/// Check integrity, then suppress what cannot be bound.
pub fn validate(model: &mut Model, ctx: &mut PipelineContext) -> Result<(), ModelIntegrityError> {
    check_declarations(model)?;
    check_members(model)?;
    let types = suppress_unlayoutable_value_types(model, ctx);
    let members = suppress_unsupported_members(model, ctx);
    tracing::debug!(
        suppressed_types = types,
        suppressed_members = members,
        "validated model"
    );
    Ok(())
}

// Integrity

fn check_declarations(model: &Model) -> Result<(), ModelIntegrityError> {
    // Every other query trusts the emission order, so it is checked first.
    let mut listed = FxHashSet::default();
    for &id in model.emission_order() {
        if !model.contains_decl(id) {
            return Err(ModelIntegrityError::DanglingDecl {
                owner: model.assembly_name().to_string(),
                index: id.raw(),
            });
        }
        if !listed.insert(id) {
            return Err(ModelIntegrityError::DuplicateEmission {
                assembly: model.assembly_name().to_string(),
                index: id.raw(),
            });
        }
    }
    for (_, decl) in model.decls() {
        if let Some(outer) = decl.declaring_type {
            if !model.contains_decl(outer) {
                return Err(ModelIntegrityError::DanglingDecl {
                    owner: decl.name.clone(),
                    index: outer.raw(),
                });
            }
        }
    }
    for (id, decl) in model.decls() {
        let owner = || model.qualified_name(id);
        for &member in decl.members() {
            if !model.contains_member(member) || model.member(member).declaring != id {
                return Err(ModelIntegrityError::ForeignMember {
                    owner: owner(),
                    index: member.raw(),
                });
            }
        }
        match &decl.kind {
            DeclKind::Class(class) => {
                if let Some(base) = class.base {
                    if !model.contains_decl(base) || model.decl(base).as_class().is_none() {
                        return Err(ModelIntegrityError::DanglingDecl {
                            owner: owner(),
                            index: base.raw(),
                        });
                    }
                    check_base_cycle(model, id, base)?;
                }
                for &iface in &class.interfaces {
                    check_interface_ref(model, id, iface)?;
                }
                for related in [class.proxy_of, class.object_repr].into_iter().flatten() {
                    check_decl_ref(model, id, related)?;
                }
                if let Some(field) = class.handle_field {
                    if !model.contains_member(field) {
                        return Err(ModelIntegrityError::ForeignMember {
                            owner: owner(),
                            index: field.raw(),
                        });
                    }
                }
            }
            DeclKind::Interface(iface) => {
                for &base in &iface.bases {
                    check_interface_ref(model, id, base)?;
                }
            }
            DeclKind::Enum(e) => {
                if !e.backing.is_integral() {
                    return Err(ModelIntegrityError::InvalidEnumBacking {
                        owner: owner(),
                        backing: e.backing.managed_name().to_string(),
                    });
                }
            }
            DeclKind::ObjectRepr(repr) => check_decl_ref(model, id, repr.class)?,
            DeclKind::ArrayWrapper(_) => {}
        }
    }
    Ok(())
}

fn check_decl_ref(model: &Model, owner: DeclId, target: DeclId) -> Result<(), ModelIntegrityError> {
    if model.contains_decl(target) {
        Ok(())
    } else {
        Err(ModelIntegrityError::DanglingDecl {
            owner: model.qualified_name(owner),
            index: target.raw(),
        })
    }
}

fn check_interface_ref(model: &Model, owner: DeclId, iface: DeclId) -> Result<(), ModelIntegrityError> {
    if model.contains_decl(iface) && model.decl(iface).is_interface() {
        Ok(())
    } else {
        Err(ModelIntegrityError::DanglingDecl {
            owner: model.qualified_name(owner),
            index: iface.raw(),
        })
    }
}

fn check_base_cycle(model: &Model, class: DeclId, base: DeclId) -> Result<(), ModelIntegrityError> {
    let mut current = Some(base);
    let mut steps = 0;
    while let Some(next) = current {
        if next == class {
            return Err(ModelIntegrityError::InheritanceCycle {
                owner: model.qualified_name(class),
                through: model.qualified_name(base),
            });
        }
        steps += 1;
        if steps > model.decl_count() {
            break;
        }
        current = model.decl(next).as_class().and_then(|c| c.base);
    }
    Ok(())
}

fn check_members(model: &Model) -> Result<(), ModelIntegrityError> {
    for (_, decl) in model.decls() {
        for &id in decl.members() {
            let member = model.member(id);
            for param in member.params() {
                check_type(model, id, &param.ty, true)?;
            }
            check_type(model, id, member.value_type(), false)?;
        }
    }
    Ok(())
}

/// `by_ref_allowed` holds only for the outermost type of a parameter.
fn check_type(
    model: &Model,
    member: MemberId,
    ty: &TypeExpr,
    by_ref_allowed: bool,
) -> Result<(), ModelIntegrityError> {
    match ty {
        TypeExpr::ByRef(inner, _) => {
            if matches!(inner.as_ref(), TypeExpr::ByRef(..)) {
                return Err(ModelIntegrityError::NestedByRef {
                    member: model.member_path(member),
                });
            }
            if !by_ref_allowed {
                return Err(ModelIntegrityError::MisplacedByRef {
                    member: model.member_path(member),
                });
            }
            check_type(model, member, inner, false)
        }
        TypeExpr::Array(element) => check_type(model, member, element, false),
        TypeExpr::Decl(id) if !model.contains_decl(*id) => Err(ModelIntegrityError::DanglingDecl {
            owner: model.member_path(member),
            index: id.raw(),
        }),
        TypeExpr::Void
        | TypeExpr::Primitive(_)
        | TypeExpr::String
        | TypeExpr::Decl(_)
        | TypeExpr::Unsupported(_) => Ok(()),
    }
}

// Suppression

/// Value types cross the boundary by copy, so every instance field must be
/// a primitive, an enum, or another copyable value type.
fn suppress_unlayoutable_value_types(model: &mut Model, ctx: &mut PipelineContext) -> usize {
    let candidates: Vec<DeclId> = model
        .emission_order()
        .iter()
        .copied()
        .filter(|&id| model.decl(id).is_value_type())
        .collect();
    let mut suppressed = 0;
    for id in candidates {
        let mut visiting = FxHashSet::default();
        if let Some(field_ty) = first_uncopyable_field(model, id, &mut visiting) {
            let spelling = ctx.printer(model).managed_spelling(&field_ty);
            let path = model.qualified_name(id);
            tracing::warn!(decl = %path, field = %spelling, "value type cannot be copied by layout");
            ctx.report(
                Diagnostic::warning(ErrorCode::E2002)
                    .with_message(format!(
                        "value type has a field of type `{spelling}` that cannot be copied by layout"
                    ))
                    .at(path)
                    .with_note("the type and every member using it are skipped"),
            );
            model.decl_mut(id).suppressed = true;
            suppressed += 1;
        }
    }
    suppressed
}

fn first_uncopyable_field(
    model: &Model,
    id: DeclId,
    visiting: &mut FxHashSet<DeclId>,
) -> Option<TypeExpr> {
    if !visiting.insert(id) {
        // A value type cannot contain itself by value.
        return Some(TypeExpr::Decl(id));
    }
    for (_, member) in model.members_of(id) {
        let MemberKind::Field(field) = &member.kind else {
            continue;
        };
        if member.is_static || field.is_literal {
            continue;
        }
        let copyable = match &field.ty {
            TypeExpr::Primitive(kind) => kind.is_supported(),
            TypeExpr::Decl(inner) => match &model.decl(*inner).kind {
                DeclKind::Enum(_) => true,
                DeclKind::Class(class) if class.is_value_type() => {
                    !model.decl(*inner).suppressed
                        && first_uncopyable_field(model, *inner, visiting).is_none()
                }
                _ => false,
            },
            _ => false,
        };
        if !copyable {
            return Some(field.ty.clone());
        }
    }
    visiting.remove(&id);
    None
}

fn suppress_unsupported_members(model: &mut Model, ctx: &mut PipelineContext) -> usize {
    let mut found: Vec<(MemberId, Suppression, Option<TypeExpr>)> = Vec::new();
    for &decl in model.emission_order() {
        if model.decl(decl).suppressed {
            continue;
        }
        let is_abstract = model
            .decl(decl)
            .as_class()
            .is_some_and(mbind_ir::ClassDecl::is_abstract);
        for (id, member) in model.members_of(decl) {
            if member.is_suppressed() {
                continue;
            }
            if member.is_constructor() && is_abstract {
                found.push((id, Suppression::AbstractConstructor, None));
                continue;
            }
            let unsupported = member
                .params()
                .iter()
                .find_map(|p| unsupported_type(model, &p.ty, false))
                .or_else(|| unsupported_type(model, member.value_type(), true));
            if let Some(ty) = unsupported {
                found.push((id, Suppression::UnsupportedType, Some(ty)));
            }
        }
    }

    let count = found.len();
    for (id, reason, ty) in found {
        let path = model.member_path(id);
        match ty {
            Some(ty) => {
                let spelling = ctx.printer(model).managed_spelling(&ty);
                tracing::warn!(member = %path, ty = %spelling, "suppressed member with unsupported type");
                ctx.report(
                    Diagnostic::warning(ErrorCode::E2001)
                        .with_message(format!("type `{spelling}` has no native mapping"))
                        .at(path)
                        .with_note("the member is skipped"),
                );
            }
            None => ctx.report(
                Diagnostic::note(ErrorCode::E2003)
                    .with_message("constructor of an abstract class is not bound")
                    .at(path),
            ),
        }
        model.suppress_member(id, reason);
    }
    count
}

/// The innermost offending type, if `ty` cannot be bound. `void` is only
/// acceptable as a whole return type.
fn unsupported_type(model: &Model, ty: &TypeExpr, void_allowed: bool) -> Option<TypeExpr> {
    match ty {
        TypeExpr::Void if void_allowed => None,
        TypeExpr::Void | TypeExpr::Unsupported(_) => Some(ty.clone()),
        TypeExpr::Primitive(kind) => (!kind.is_supported()).then(|| ty.clone()),
        TypeExpr::String => None,
        TypeExpr::Decl(id) => {
            let decl = model.decl(*id);
            let bindable = !decl.suppressed
                && match &decl.kind {
                    DeclKind::Class(class) => !class.is_static(),
                    DeclKind::Enum(_) | DeclKind::Interface(_) => true,
                    DeclKind::ArrayWrapper(_) | DeclKind::ObjectRepr(_) => false,
                };
            (!bindable).then(|| ty.clone())
        }
        TypeExpr::Array(element) | TypeExpr::ByRef(element, _) => {
            unsupported_type(model, element, false)
        }
    }
}

#[cfg(test)]
mod tests;
