use pretty_assertions::assert_eq;

use mbind_ir::{DeclKind, MemberOrigin, Model, ModelBuilder};
use mbind_types::Dialect;

use super::{synthesize_object_reprs, HANDLE_FIELD};
use crate::test_helpers::ctx;

fn hierarchy() -> (Model, [mbind_ir::DeclId; 5]) {
    let mut b = ModelBuilder::new("Lib");
    let root = b.class("NS", "Animal");
    let derived = b.class("NS", "Dog");
    b.set_base(derived, root);
    let point = b.value_type("NS", "Point");
    let util = b.static_class("NS", "Util");
    let iface = b.interface("NS", "IPet");
    (b.build(), [root, derived, point, util, iface])
}

#[test]
fn opaque_typedef_per_reference_class() {
    let (mut model, [root, derived, point, util, iface]) = hierarchy();
    synthesize_object_reprs(&mut model, &mut ctx(Dialect::C));

    let repr_of = |id| model.decl(id).as_class().and_then(|c| c.object_repr);
    let root_repr = repr_of(root);
    let derived_repr = repr_of(derived);
    assert!(root_repr.is_some());
    assert!(derived_repr.is_some());
    assert_eq!(repr_of(point), None);
    assert_eq!(repr_of(util), None);

    let Some(root_repr) = root_repr else { return };
    let decl = model.decl(root_repr);
    assert_eq!(decl.name, "_NS_Animal");
    match &decl.kind {
        DeclKind::ObjectRepr(r) => {
            assert_eq!(r.typedef_name, "NS_Animal");
            assert_eq!(r.class, root);
        }
        other => panic!("unexpected {other:?}"),
    }

    // Each typedef is placed right before its class.
    let order = model.emission_order();
    let pos = |id| order.iter().position(|&d| d == id);
    assert_eq!(pos(root_repr).map(|p| p + 1), pos(root));
    assert_eq!(derived_repr.and_then(pos).map(|p| p + 1), pos(derived));
    assert!(model.decl(iface).as_interface().is_some());
    assert_eq!(order.len(), 7);
}

#[test]
fn embedded_field_only_in_root_class() {
    for dialect in [Dialect::Cpp, Dialect::ObjC] {
        let (mut model, [root, derived, point, util, _]) = hierarchy();
        synthesize_object_reprs(&mut model, &mut ctx(dialect));

        let field_of = |id| model.decl(id).as_class().and_then(|c| c.handle_field);
        let Some(field) = field_of(root) else {
            panic!("root class has no handle field");
        };
        assert_eq!(model.member(field).native_name, HANDLE_FIELD);
        assert_eq!(model.member(field).origin, MemberOrigin::HandleField);
        assert!(model.member(field).access.is_private());
        assert_eq!(field_of(derived), None);
        assert_eq!(field_of(point), None);
        assert_eq!(field_of(util), None);
        assert_eq!(model.handle_owner(derived), Some(root));
        assert_eq!(model.emission_order().len(), 5);
    }
}

#[test]
fn suppressed_base_does_not_hold_the_handle() {
    let (mut model, [root, derived, ..]) = hierarchy();
    model.decl_mut(root).suppressed = true;
    synthesize_object_reprs(&mut model, &mut ctx(Dialect::Cpp));

    assert!(model
        .decl(derived)
        .as_class()
        .is_some_and(|c| c.handle_field.is_some()));
}
