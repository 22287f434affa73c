use pretty_assertions::assert_eq;

use mbind_diagnostic::ErrorCode;
use mbind_ir::{
    DeclId, Insertion, ModelBuilder, ModelIntegrityError, Param, PrimitiveKind, RefDirection,
    Suppression, TypeExpr,
};
use mbind_types::Dialect;

use super::validate;
use crate::test_helpers::{codes, ctx};

fn validate_err(model: &mut mbind_ir::Model) -> ModelIntegrityError {
    match validate(model, &mut ctx(Dialect::C)) {
        Err(e) => e,
        Ok(()) => panic!("expected an integrity error"),
    }
}

// Integrity

#[test]
fn nested_by_ref_is_fatal() {
    let mut b = ModelBuilder::new("Lib");
    let foo = b.class("NS", "Foo");
    let inner = TypeExpr::by_ref(TypeExpr::INT, RefDirection::InOut);
    b.method(
        foo,
        "Bad",
        vec![Param::new("x", TypeExpr::by_ref(inner, RefDirection::InOut))],
        TypeExpr::Void,
    );
    let mut model = b.build();

    assert_eq!(
        validate_err(&mut model),
        ModelIntegrityError::NestedByRef {
            member: "NS.Foo::Bad".to_string()
        }
    );
}

#[test]
fn by_ref_return_is_misplaced() {
    let mut b = ModelBuilder::new("Lib");
    let foo = b.class("NS", "Foo");
    b.method(
        foo,
        "Get",
        vec![],
        TypeExpr::by_ref(TypeExpr::INT, RefDirection::InOut),
    );
    let mut model = b.build();

    assert!(matches!(
        validate_err(&mut model),
        ModelIntegrityError::MisplacedByRef { .. }
    ));
}

#[test]
fn by_ref_array_element_is_misplaced() {
    let mut b = ModelBuilder::new("Lib");
    let foo = b.class("NS", "Foo");
    let element = TypeExpr::by_ref(TypeExpr::INT, RefDirection::In);
    b.method(
        foo,
        "Take",
        vec![Param::new("xs", TypeExpr::array(element))],
        TypeExpr::Void,
    );
    let mut model = b.build();

    assert!(matches!(
        validate_err(&mut model),
        ModelIntegrityError::MisplacedByRef { .. }
    ));
}

#[test]
fn dangling_type_reference_is_fatal() {
    let mut b = ModelBuilder::new("Lib");
    let foo = b.class("NS", "Foo");
    b.method(
        foo,
        "Get",
        vec![],
        TypeExpr::Decl(mbind_ir::DeclId::new(99)),
    );
    let mut model = b.build();

    assert_eq!(
        validate_err(&mut model),
        ModelIntegrityError::DanglingDecl {
            owner: "NS.Foo::Get".to_string(),
            index: 99
        }
    );
}

#[test]
fn emission_order_past_the_arena_is_fatal() {
    let mut b = ModelBuilder::new("Lib");
    b.class("NS", "Foo");
    let mut model = b.build();
    model.splice(&[Insertion {
        decl: DeclId::new(42),
        before: None,
    }]);

    assert_eq!(
        validate_err(&mut model),
        ModelIntegrityError::DanglingDecl {
            owner: "Lib".to_string(),
            index: 42
        }
    );
}

#[test]
fn declaration_listed_twice_is_fatal() {
    let mut b = ModelBuilder::new("Lib");
    let foo = b.class("NS", "Foo");
    let mut model = b.build();
    model.splice(&[Insertion {
        decl: foo,
        before: None,
    }]);

    assert_eq!(
        validate_err(&mut model),
        ModelIntegrityError::DuplicateEmission {
            assembly: "Lib".to_string(),
            index: foo.raw()
        }
    );
}

#[test]
fn inheritance_cycle_is_fatal() {
    let mut b = ModelBuilder::new("Lib");
    let x = b.class("NS", "X");
    let y = b.class("NS", "Y");
    b.set_base(x, y);
    b.set_base(y, x);
    let mut model = b.build();

    assert!(matches!(
        validate_err(&mut model),
        ModelIntegrityError::InheritanceCycle { .. }
    ));
}

#[test]
fn non_integer_enum_backing_is_fatal() {
    let mut b = ModelBuilder::new("Lib");
    b.enumeration("NS", "Odd", PrimitiveKind::F64, &[("A", None)]);
    let mut model = b.build();

    assert_eq!(
        validate_err(&mut model),
        ModelIntegrityError::InvalidEnumBacking {
            owner: "NS.Odd".to_string(),
            backing: "double".to_string()
        }
    );
}

// Suppression

#[test]
fn unsupported_types_suppress_members() {
    let mut b = ModelBuilder::new("Lib");
    let foo = b.class("NS", "Foo");
    let price = b.method(
        foo,
        "Price",
        vec![],
        TypeExpr::Primitive(PrimitiveKind::Decimal),
    );
    let when = b.method(
        foo,
        "At",
        vec![Param::new(
            "t",
            TypeExpr::array(TypeExpr::Primitive(PrimitiveKind::DateTime)),
        )],
        TypeExpr::Void,
    );
    let generic = b.method(
        foo,
        "Items",
        vec![],
        TypeExpr::Unsupported("List`1<int>".into()),
    );
    let fine = b.method(foo, "Run", vec![], TypeExpr::Void);
    let mut model = b.build();

    let mut ctx = ctx(Dialect::C);
    assert_eq!(validate(&mut model, &mut ctx), Ok(()));

    for id in [price, when, generic] {
        assert_eq!(model.member(id).suppressed, Some(Suppression::UnsupportedType));
    }
    assert!(!model.member(fine).is_suppressed());
    assert_eq!(codes(&ctx), vec![ErrorCode::E2001; 3]);
    let first = ctx.diagnostics().iter().next().map(|d| d.message.clone());
    assert_eq!(
        first.as_deref(),
        Some("type `decimal` has no native mapping")
    );
}

#[test]
fn void_parameter_is_unsupported() {
    let mut b = ModelBuilder::new("Lib");
    let foo = b.class("NS", "Foo");
    let m = b.method(foo, "Odd", vec![Param::new("v", TypeExpr::Void)], TypeExpr::Void);
    let mut model = b.build();

    assert_eq!(validate(&mut model, &mut ctx(Dialect::C)), Ok(()));
    assert!(model.member(m).is_suppressed());
}

#[test]
fn value_type_with_reference_field_is_suppressed() {
    let mut b = ModelBuilder::new("Lib");
    let named = b.value_type("NS", "Named");
    b.field(named, "Name", TypeExpr::String);
    let point = b.value_type("NS", "Point");
    b.field(point, "X", TypeExpr::INT);
    b.field(point, "Y", TypeExpr::INT);
    let holder = b.value_type("NS", "Holder");
    b.field(holder, "Inner", TypeExpr::Decl(named));
    let user = b.class("NS", "User");
    let uses = b.method(user, "Get", vec![], TypeExpr::Decl(named));
    let ok = b.method(user, "Origin", vec![], TypeExpr::Decl(point));
    let mut model = b.build();

    let mut ctx = ctx(Dialect::C);
    assert_eq!(validate(&mut model, &mut ctx), Ok(()));

    assert!(model.decl(named).suppressed);
    assert!(model.decl(holder).suppressed);
    assert!(!model.decl(point).suppressed);
    assert!(model.member(uses).is_suppressed());
    assert!(!model.member(ok).is_suppressed());
    assert_eq!(
        codes(&ctx),
        vec![ErrorCode::E2002, ErrorCode::E2002, ErrorCode::E2001]
    );
}

#[test]
fn static_fields_do_not_affect_layout() {
    let mut b = ModelBuilder::new("Lib");
    let point = b.value_type("NS", "Point");
    b.field(point, "X", TypeExpr::INT);
    b.static_field(point, "Label", TypeExpr::String);
    let mut model = b.build();

    assert_eq!(validate(&mut model, &mut ctx(Dialect::C)), Ok(()));
    assert!(!model.decl(point).suppressed);
}

#[test]
fn abstract_constructors_and_static_class_params_are_skipped() {
    let mut b = ModelBuilder::new("Lib");
    let shape = b.class_with("NS", "Shape", mbind_ir::ClassFlags::ABSTRACT);
    let ctor = b.constructor(shape, vec![]);
    let util = b.static_class("NS", "Util");
    let user = b.class("NS", "User");
    let m = b.method(user, "Take", vec![Param::new("u", TypeExpr::Decl(util))], TypeExpr::Void);
    let mut model = b.build();

    let mut ctx = ctx(Dialect::C);
    assert_eq!(validate(&mut model, &mut ctx), Ok(()));
    assert_eq!(
        model.member(ctor).suppressed,
        Some(Suppression::AbstractConstructor)
    );
    assert_eq!(model.member(m).suppressed, Some(Suppression::UnsupportedType));
}
