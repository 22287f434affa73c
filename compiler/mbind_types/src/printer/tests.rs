use pretty_assertions::assert_eq;

use mbind_ir::{Model, ModelBuilder, PrimitiveKind, RefDirection, TypeExpr};

use crate::{Dialect, TypePrinter, UnsupportedType};

struct Fixture {
    model: Model,
    class: TypeExpr,
    point: TypeExpr,
    color: TypeExpr,
    iface: TypeExpr,
    nested: TypeExpr,
}

fn fixture() -> Fixture {
    let mut b = ModelBuilder::new("Lib");
    let class = b.class("NS", "Foo");
    let point = b.value_type("NS", "Point");
    let color = b.enumeration("NS", "Color", PrimitiveKind::I32, &[("Red", None)]);
    let iface = b.interface("NS", "IShape");
    let outer = b.class("Company.Product", "Outer");
    let inner = b.class("Company.Product", "Inner");
    b.nest(inner, outer);
    Fixture {
        model: b.build(),
        class: TypeExpr::Decl(class),
        point: TypeExpr::Decl(point),
        color: TypeExpr::Decl(color),
        iface: TypeExpr::Decl(iface),
        nested: TypeExpr::Decl(inner),
    }
}

fn print(model: &Model, dialect: Dialect, ty: &TypeExpr) -> String {
    TypePrinter::new(model, dialect, "_")
        .print(ty)
        .unwrap_or_else(|e| panic!("{e}"))
}

// Primitives

#[test]
fn primitive_table_per_dialect() {
    let f = fixture();
    let rows = [
        (PrimitiveKind::Bool, ["bool", "bool", "BOOL"]),
        (PrimitiveKind::Char, ["gunichar2", "char16_t", "unichar"]),
        (PrimitiveKind::I8, ["int8_t"; 3]),
        (PrimitiveKind::U8, ["uint8_t"; 3]),
        (PrimitiveKind::I16, ["int16_t"; 3]),
        (PrimitiveKind::U16, ["uint16_t"; 3]),
        (PrimitiveKind::I32, ["int32_t"; 3]),
        (PrimitiveKind::U32, ["uint32_t"; 3]),
        (PrimitiveKind::I64, ["int64_t"; 3]),
        (PrimitiveKind::U64, ["uint64_t"; 3]),
        (PrimitiveKind::F32, ["float"; 3]),
        (PrimitiveKind::F64, ["double"; 3]),
    ];
    for (kind, expected) in rows {
        for (dialect, want) in Dialect::ALL.into_iter().zip(expected) {
            assert_eq!(print(&f.model, dialect, &TypeExpr::Primitive(kind)), want);
        }
    }
}

#[test]
fn decimal_and_datetime_are_unsupported() {
    let f = fixture();
    let printer = TypePrinter::new(&f.model, Dialect::C, "_");
    assert_eq!(
        printer.print(&TypeExpr::Primitive(PrimitiveKind::Decimal)),
        Err(UnsupportedType("decimal".to_string()))
    );
    assert!(printer
        .print(&TypeExpr::array(TypeExpr::Primitive(PrimitiveKind::DateTime)))
        .is_err());
    assert!(printer.print(&TypeExpr::Unsupported("List`1".into())).is_err());
}

// Strings

#[test]
fn strings_switch_to_builders_only_when_written_back() {
    let f = fixture();
    let cases = [
        (TypeExpr::String, ["const char*", "std::string", "NSString*"]),
        (
            TypeExpr::by_ref(TypeExpr::String, RefDirection::In),
            ["const char**", "std::string&", "NSString**"],
        ),
        (
            TypeExpr::by_ref(TypeExpr::String, RefDirection::Out),
            ["GString*", "std::string&", "NSMutableString*"],
        ),
        (
            TypeExpr::by_ref(TypeExpr::String, RefDirection::InOut),
            ["GString*", "std::string&", "NSMutableString*"],
        ),
    ];
    for (ty, expected) in cases {
        for (dialect, want) in Dialect::ALL.into_iter().zip(expected) {
            assert_eq!(print(&f.model, dialect, &ty), want, "{dialect} {ty}");
        }
    }
}

// Declarations

#[test]
fn declarations_print_flattened() {
    let f = fixture();
    assert_eq!(print(&f.model, Dialect::C, &f.class), "NS_Foo*");
    assert_eq!(print(&f.model, Dialect::Cpp, &f.point), "NS_Point");
    assert_eq!(print(&f.model, Dialect::ObjC, &f.color), "NS_Color");
    assert_eq!(
        print(&f.model, Dialect::C, &f.nested),
        "Company_Product_Outer_Inner*"
    );
}

#[test]
fn interfaces_per_dialect() {
    let f = fixture();
    assert_eq!(print(&f.model, Dialect::C, &f.iface), "NS_IShape*");
    assert_eq!(print(&f.model, Dialect::Cpp, &f.iface), "NS_IShape*");
    assert_eq!(print(&f.model, Dialect::ObjC, &f.iface), "id<NS_IShape>");
}

#[test]
fn by_ref_appends_marker() {
    let f = fixture();
    let int_ref = TypeExpr::by_ref(TypeExpr::INT, RefDirection::InOut);
    let class_out = TypeExpr::by_ref(f.class.clone(), RefDirection::Out);
    assert_eq!(print(&f.model, Dialect::C, &int_ref), "int32_t*");
    assert_eq!(print(&f.model, Dialect::Cpp, &int_ref), "int32_t&");
    assert_eq!(print(&f.model, Dialect::ObjC, &class_out), "NS_Foo**");
    assert_eq!(print(&f.model, Dialect::Cpp, &class_out), "NS_Foo*&");
}

#[test]
fn custom_separator() {
    let f = fixture();
    let printer = TypePrinter::new(&f.model, Dialect::Cpp, "__");
    assert_eq!(printer.print(&f.nested), Ok("Company__Product__Outer__Inner*".to_string()));
}

// Arrays

#[test]
fn array_wrappers_are_named_by_stable_name() {
    let f = fixture();
    let printer = TypePrinter::new(&f.model, Dialect::C, "_");
    let name = |ty: &TypeExpr| printer.array_wrapper_name(ty).unwrap_or_default();
    assert_eq!(name(&TypeExpr::INT), "Int32Array");
    assert_eq!(name(&TypeExpr::String), "StringArray");
    assert_eq!(name(&f.class), "NS_FooArray");
    assert_eq!(name(&TypeExpr::array(TypeExpr::INT)), "Int32ArrayArray");
}

#[test]
fn arrays_print_as_wrappers() {
    let f = fixture();
    let ints = TypeExpr::array(TypeExpr::INT);
    assert_eq!(print(&f.model, Dialect::C, &ints), "Int32Array*");
    assert_eq!(print(&f.model, Dialect::Cpp, &ints), "Int32Array");
    assert_eq!(print(&f.model, Dialect::ObjC, &ints), "Int32Array*");
}

#[test]
fn array_keys_and_containers() {
    let f = fixture();
    let c = TypePrinter::new(&f.model, Dialect::C, "_");
    let cpp = TypePrinter::new(&f.model, Dialect::Cpp, "_");
    assert_eq!(c.array_key(&TypeExpr::INT), Ok("int32_t".to_string()));
    assert_eq!(c.container_type(&TypeExpr::INT), Ok("GArray*".to_string()));
    assert_eq!(
        cpp.container_type(&TypeExpr::String),
        Ok("std::vector<std::string>".to_string())
    );
    assert_eq!(
        cpp.container_type(&TypeExpr::array(TypeExpr::INT)),
        Ok("std::vector<Int32Array>".to_string())
    );
    assert!(c.array_key(&TypeExpr::Void).is_err());
}

#[test]
fn managed_spelling_for_diagnostics() {
    let f = fixture();
    let printer = TypePrinter::new(&f.model, Dialect::C, "_");
    let ty = TypeExpr::by_ref(TypeExpr::array(f.class.clone()), RefDirection::InOut);
    assert_eq!(printer.managed_spelling(&ty), "ref NS.Foo[]");
}
