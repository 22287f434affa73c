//! Interface-proxy synthesis.
//!
//! An interface that crosses the boundary (as a return type, a parameter
//! type, or an array element) needs a concrete native class wrapping the
//! managed object that implements it. The proxy forwards every method of
//! the interface and of its base interfaces, and exposes its handle through
//! a `GetHandle` accessor so the value can be marshaled back.

use mbind_ir::{
    ClassDecl, ClassFlags, DeclId, DeclKind, Insertion, Member, MemberId, MemberKind,
    MemberOrigin, Method, Model, PrimitiveKind, TypeDecl, TypeExpr,
};
use rustc_hash::FxHashSet;

use crate::object_repr::attach_repr;
use crate::PipelineContext;

/// Name of the proxy's handle accessor.
pub(crate) const HANDLE_ACCESSOR: &str = "GetHandle";

pub fn synthesize_proxies(model: &mut Model, ctx: &mut PipelineContext) {
    let mut created = 0;
    for iface in used_interfaces(model) {
        if model.proxy_for(iface).is_some() {
            continue;
        }
        let printer = ctx.printer(model);
        let name = printer.proxy_name(iface);
        let typedef_name = printer.flat_name(iface);

        let proxy = model.add_synthesized_decl(TypeDecl::synthesized(
            name,
            DeclKind::Class(ClassDecl {
                interfaces: vec![iface],
                flags: ClassFlags::SEALED,
                proxy_of: Some(iface),
                ..ClassDecl::default()
            }),
        ));

        for target in interface_methods(model, iface) {
            let mut forwarder = model.member(target).clone();
            forwarder.declaring = proxy;
            forwarder.origin = MemberOrigin::ProxyForward { target };
            forwarder.emitted_name = None;
            if let MemberKind::Method(m) = &mut forwarder.kind {
                m.is_virtual = true;
                m.is_abstract = false;
            }
            model.add_member(forwarder);
        }

        let mut handle = Member::new(
            proxy,
            HANDLE_ACCESSOR,
            MemberKind::Method(Method {
                params: Vec::new(),
                return_type: TypeExpr::Primitive(PrimitiveKind::U32),
                is_virtual: false,
                is_abstract: false,
            }),
        );
        handle.origin = MemberOrigin::ProxyHandle;
        model.add_member(handle);

        // The proxy goes right after its interface.
        let anchor = next_in_order(model, iface);
        attach_repr(model, ctx, proxy, typedef_name, anchor);
        ctx.queue_insertion(Insertion {
            decl: proxy,
            before: anchor,
        });
        created += 1;
    }
    ctx.splice_pending(model);

    tracing::debug!(proxies = created, "synthesized interface proxies");
}

/// Interfaces mentioned anywhere in a bound signature, in first-use order.
fn used_interfaces(model: &Model) -> Vec<DeclId> {
    let mut seen = FxHashSet::default();
    let mut used = Vec::new();
    for &decl in model.emission_order() {
        if model.decl(decl).suppressed {
            continue;
        }
        for (_, member) in model.emitted_members_of(decl) {
            for ty in member.signature_types() {
                ty.walk(&mut |t| {
                    if let TypeExpr::Decl(id) = t {
                        let d = model.decl(*id);
                        if d.is_interface() && !d.suppressed && seen.insert(*id) {
                            used.push(*id);
                        }
                    }
                });
            }
        }
    }
    used
}

/// Bound methods of `iface` and its base interfaces, the interface's own
/// first.
fn interface_methods(model: &Model, iface: DeclId) -> Vec<MemberId> {
    let mut visited = FxHashSet::default();
    let mut queue = vec![iface];
    let mut methods = Vec::new();
    let mut i = 0;
    while let Some(&current) = queue.get(i) {
        i += 1;
        if !visited.insert(current) {
            continue;
        }
        methods.extend(
            model
                .emitted_members_of(current)
                .filter(|(_, m)| m.is_method())
                .map(|(id, _)| id),
        );
        if let Some(decl) = model.decl(current).as_interface() {
            queue.extend(decl.bases.iter().copied());
        }
    }
    methods
}

fn next_in_order(model: &Model, decl: DeclId) -> Option<DeclId> {
    let order = model.emission_order();
    order
        .iter()
        .position(|&id| id == decl)
        .and_then(|pos| order.get(pos + 1).copied())
}
