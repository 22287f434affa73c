use pretty_assertions::assert_eq;

use mbind_ir::{
    Access, Accessor, MemberId, MemberKind, MemberOrigin, Model, ModelBuilder, Param,
    Suppression, TypeExpr,
};
use mbind_types::Dialect;

use super::lower_accessors;
use crate::test_helpers::ctx;

fn lower(model: &mut Model) {
    lower_accessors(model, &mut ctx(Dialect::C));
}

fn accessors_of(model: &Model, of: MemberId) -> (usize, usize) {
    let decl = model.member(of).declaring;
    let mut getters = 0;
    let mut setters = 0;
    for (_, m) in model.emitted_members_of(decl) {
        match m.origin {
            MemberOrigin::Getter { of: o } if o == of => getters += 1,
            MemberOrigin::Setter { of: o } if o == of => setters += 1,
            _ => {}
        }
    }
    (getters, setters)
}

// Accessor completeness

#[test]
fn properties_yield_accessors_by_capability() {
    let mut b = ModelBuilder::new("Lib");
    let foo = b.class("NS", "Foo");
    let read_only = b.property(foo, "Size", TypeExpr::INT, true, false);
    let read_write = b.property(foo, "Name", TypeExpr::String, true, true);
    let write_only = b.property(foo, "Sink", TypeExpr::INT, false, true);
    let mut model = b.build();

    lower(&mut model);

    assert_eq!(accessors_of(&model, read_only), (1, 0));
    assert_eq!(accessors_of(&model, read_write), (1, 1));
    assert_eq!(accessors_of(&model, write_only), (0, 1));
    for id in [read_only, read_write, write_only] {
        assert_eq!(model.member(id).suppressed, Some(Suppression::Lowered));
    }
}

#[test]
fn accessors_take_the_original_position() {
    let mut b = ModelBuilder::new("Lib");
    let foo = b.class("NS", "Foo");
    b.method(foo, "Before", vec![], TypeExpr::Void);
    b.property(foo, "Name", TypeExpr::String, true, true);
    b.method(foo, "After", vec![], TypeExpr::Void);
    let mut model = b.build();

    lower(&mut model);

    let names: Vec<_> = model
        .emitted_members_of(foo)
        .map(|(_, m)| m.native_name.clone())
        .collect();
    assert_eq!(names, vec!["Before", "get_Name", "set_Name", "After"]);
}

#[test]
fn accessor_signatures() {
    let mut b = ModelBuilder::new("Lib");
    let foo = b.class("NS", "Foo");
    b.static_property(foo, "Count", TypeExpr::INT, true, true);
    let mut model = b.build();

    lower(&mut model);

    let members: Vec<_> = model.emitted_members_of(foo).map(|(_, m)| m.clone()).collect();
    let [getter, setter] = members.as_slice() else {
        panic!("expected two accessors");
    };
    assert_eq!(getter.declared_name, "get_Count");
    assert!(getter.is_static);
    assert!(getter.params().is_empty());
    assert_eq!(getter.value_type(), &TypeExpr::INT);
    assert_eq!(setter.declared_name, "set_Count");
    assert_eq!(setter.params().len(), 1);
    assert_eq!(setter.params()[0].name, "value");
    assert_eq!(setter.params()[0].ty, TypeExpr::INT);
    assert_eq!(setter.value_type(), &TypeExpr::Void);
}

#[test]
fn indexer_parameters_come_first() {
    let mut b = ModelBuilder::new("Lib");
    let list = b.class("NS", "List");
    let item = b.property(list, "Item", TypeExpr::String, true, true);
    if let MemberKind::Property(p) = &mut b.member_mut(item).kind {
        p.params.push(Param::new("index", TypeExpr::INT));
    }
    let mut model = b.build();

    lower(&mut model);

    let setter = model
        .emitted_members_of(list)
        .map(|(_, m)| m)
        .find(|m| m.native_name == "set_Item")
        .map(|m| m.params().iter().map(|p| (p.name.clone(), p.position)).collect::<Vec<_>>());
    assert_eq!(
        setter,
        Some(vec![("index".to_string(), 0), ("value".to_string(), 1)])
    );
}

#[test]
fn private_setter_is_not_lowered() {
    let mut b = ModelBuilder::new("Lib");
    let foo = b.class("NS", "Foo");
    let p = b.property(foo, "Id", TypeExpr::INT, true, true);
    if let MemberKind::Property(prop) = &mut b.member_mut(p).kind {
        prop.setter = Some(Accessor {
            token: 0x0600_0099,
            access: Access::Private,
        });
    }
    let mut model = b.build();

    lower(&mut model);
    assert_eq!(accessors_of(&model, p), (1, 0));
}

#[test]
fn explicit_interface_accessors_keep_qualification() {
    let mut b = ModelBuilder::new("Lib");
    let foo = b.class("NS", "Foo");
    b.property(foo, "NS.ISized.Size", TypeExpr::INT, true, false);
    let mut model = b.build();

    lower(&mut model);

    let getter = model.emitted_members_of(foo).map(|(_, m)| m.clone()).next();
    let getter = getter.map(|m| (m.declared_name, m.native_name));
    assert_eq!(
        getter,
        Some(("NS.ISized.get_Size".to_string(), "get_Size".to_string()))
    );
}

// Fields

#[test]
fn fields_by_mutability() {
    let mut b = ModelBuilder::new("Lib");
    let foo = b.class("NS", "Foo");
    let plain = b.field(foo, "Plain", TypeExpr::INT);
    let readonly = b.field(foo, "Fixed", TypeExpr::INT);
    let literal = b.static_field(foo, "Max", TypeExpr::INT);
    let hidden = b.field(foo, "secret", TypeExpr::INT);
    if let MemberKind::Field(f) = &mut b.member_mut(readonly).kind {
        f.is_readonly = true;
    }
    if let MemberKind::Field(f) = &mut b.member_mut(literal).kind {
        f.is_literal = true;
    }
    b.member_mut(hidden).access = Access::Private;
    let mut model = b.build();

    lower(&mut model);

    assert_eq!(accessors_of(&model, plain), (1, 1));
    assert_eq!(accessors_of(&model, readonly), (1, 0));
    assert_eq!(accessors_of(&model, literal), (1, 0));
    assert_eq!(accessors_of(&model, hidden), (0, 0));
    assert_eq!(model.member(hidden).suppressed, Some(Suppression::Private));
}

#[test]
fn value_type_instance_fields_stay_layout() {
    let mut b = ModelBuilder::new("Lib");
    let point = b.value_type("NS", "Point");
    let x = b.field(point, "X", TypeExpr::INT);
    let origin = b.static_field(point, "Zero", TypeExpr::Decl(point));
    let mut model = b.build();

    lower(&mut model);

    assert!(!model.member(x).is_suppressed());
    assert_eq!(accessors_of(&model, x), (0, 0));
    assert_eq!(accessors_of(&model, origin), (1, 1));
}
