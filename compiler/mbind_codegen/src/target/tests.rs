use pretty_assertions::assert_eq;

use mbind_ir::{ConstantValue, DeclId, FrozenModel, ModelBuilder, Param, PrimitiveKind, TypeExpr};
use mbind_types::Dialect;

use super::{for_dialect, include_guard};
use crate::test_helpers::{frozen, options};
use crate::{CodegenContext, CodegenOptions};

fn colors(dialect: Dialect, backing: PrimitiveKind) -> (FrozenModel, DeclId) {
    let mut b = ModelBuilder::new("Lib");
    let color = b.enumeration("NS", "Color", backing, &[("Red", None), ("Green", Some(4))]);
    (frozen(b.build(), dialect), color)
}

fn declared(model: &FrozenModel, options: &CodegenOptions, decl: DeclId) -> String {
    let cx = CodegenContext::new(model, options);
    match cx.target().declare(&cx, decl) {
        Ok(code) => code.to_string(),
        Err(e) => panic!("{e}"),
    }
}

// Enums

#[test]
fn c_enums_prefix_their_items() {
    let (model, color) = colors(Dialect::C, PrimitiveKind::I32);
    let options = options(Dialect::C);
    let cx = CodegenContext::new(&model, &options);
    let expected = [
        "typedef enum NS_Color {",
        "    NS_Color_Red = 0,",
        "    NS_Color_Green = 4,",
        "} NS_Color;",
        "",
    ];
    assert_eq!(
        cx.target().declare_enum(&cx, color).to_string(),
        expected.join("\n")
    );
}

#[test]
fn cpp_enums_are_scoped_with_their_backing() {
    let (model, color) = colors(Dialect::Cpp, PrimitiveKind::U8);
    let options = options(Dialect::Cpp);
    let cx = CodegenContext::new(&model, &options);
    let expected = [
        "enum class NS_Color : uint8_t {",
        "    Red = 0u,",
        "    Green = 4u,",
        "};",
        "",
    ];
    assert_eq!(
        cx.target().declare_enum(&cx, color).to_string(),
        expected.join("\n")
    );
}

#[test]
fn objc_enums_use_the_foundation_macros() {
    let (model, color) = colors(Dialect::ObjC, PrimitiveKind::I32);
    let options = options(Dialect::ObjC);
    let cx = CodegenContext::new(&model, &options);
    let text = cx.target().declare_enum(&cx, color).to_string();
    assert!(text.starts_with("typedef NS_ENUM(int32_t, NS_Color) {\n"));
    assert!(text.contains("    NS_Color_Green = 4,\n"));
}

// Declarations

#[test]
fn cpp_defaults_only_on_the_trailing_run() {
    let mut b = ModelBuilder::new("Lib");
    let calc = b.class("NS", "Calc");
    b.method(
        calc,
        "Add",
        vec![
            Param::new("a", TypeExpr::INT).with_default(ConstantValue::Int(1)),
            Param::new("b", TypeExpr::INT),
            Param::new("c", TypeExpr::INT).with_default(ConstantValue::Int(3)),
        ],
        TypeExpr::INT,
    );
    let model = frozen(b.build(), Dialect::Cpp);
    let text = declared(&model, &options(Dialect::Cpp), calc);
    let expected = [
        "class NS_Calc {",
        "public:",
        "    explicit NS_Calc(mbind::handle handle);",
        "    virtual ~NS_Calc();",
        "    NS_Calc(const NS_Calc&) = delete;",
        "    NS_Calc& operator=(const NS_Calc&) = delete;",
        "",
        "    int32_t Add(int32_t a, int32_t b, int32_t c = 3);",
        "",
        "    uint32_t _handle;",
        "};",
        "",
    ];
    assert_eq!(text, expected.join("\n"));
}

#[test]
fn cpp_static_classes_cannot_be_constructed() {
    let mut b = ModelBuilder::new("Lib");
    let util = b.static_class("NS", "Util");
    b.static_method(util, "Ping", vec![], TypeExpr::Void);
    let model = frozen(b.build(), Dialect::Cpp);
    let text = declared(&model, &options(Dialect::Cpp), util);
    assert!(text.contains("    NS_Util() = delete;\n"));
    assert!(text.contains("    static void Ping();\n"));
    assert!(!text.contains("_handle"));
}

#[test]
fn objc_selectors_label_every_parameter() {
    let mut b = ModelBuilder::new("Lib");
    let calc = b.class("NS", "Calc");
    b.method(
        calc,
        "Add",
        vec![Param::new("a", TypeExpr::INT), Param::new("b", TypeExpr::INT)],
        TypeExpr::INT,
    );
    let model = frozen(b.build(), Dialect::ObjC);
    let text = declared(&model, &options(Dialect::ObjC), calc);
    let expected = [
        "@interface NS_Calc : NSObject {",
        "@public",
        "    uint32_t _handle;",
        "}",
        "- (instancetype)initWithHandle:(uint32_t)handle;",
        "- (int32_t)Add:(int32_t)a b:(int32_t)b;",
        "@end",
        "",
    ];
    assert_eq!(text, expected.join("\n"));
}

#[test]
fn c_value_types_are_plain_structs() {
    let mut b = ModelBuilder::new("Lib");
    let point = b.value_type("NS", "Point");
    b.field(point, "X", TypeExpr::INT);
    b.field(point, "Y", TypeExpr::DOUBLE);
    let model = frozen(b.build(), Dialect::C);
    let text = declared(&model, &options(Dialect::C), point);
    assert!(text.starts_with("struct NS_Point {\n    int32_t X;\n    double Y;\n};\n"));
    assert!(!text.contains("get_X"));
    assert!(!text.contains("_destroy"));
}

#[test]
fn value_type_enum_fields_keep_their_width() {
    let mut b = ModelBuilder::new("Lib");
    let small = b.enumeration("NS", "Small", PrimitiveKind::U8, &[("A", None), ("B", None)]);
    let wide = b.enumeration("NS", "Wide", PrimitiveKind::I32, &[("X", None)]);
    let cell = b.value_type("NS", "Cell");
    b.field(cell, "Kind", TypeExpr::Decl(small));
    b.field(cell, "Shape", TypeExpr::Decl(wide));
    b.field(cell, "Tag", TypeExpr::Primitive(PrimitiveKind::U8));
    let model = b.build();

    let c = frozen(model.clone(), Dialect::C);
    let text = declared(&c, &options(Dialect::C), cell);
    assert!(text.starts_with(
        "struct NS_Cell {\n    uint8_t Kind;\n    NS_Wide Shape;\n    uint8_t Tag;\n};\n"
    ));
    assert!(!text.contains("NS_Small Kind;"));

    // Foundation enums carry their backing type already.
    let objc = frozen(model, Dialect::ObjC);
    let text = declared(&objc, &options(Dialect::ObjC), cell);
    assert!(text.contains("NS_Small Kind;"));
}

// Values

#[test]
fn default_values_per_dialect() {
    let mut b = ModelBuilder::new("Lib");
    let point = b.value_type("NS", "Point");
    let color = b.enumeration("NS", "Color", PrimitiveKind::I32, &[("Red", None)]);
    let model = b.build();

    let c = frozen(model.clone(), Dialect::C);
    let c_options = options(Dialect::C);
    let cx = CodegenContext::new(&c, &c_options);
    let default = |ty: TypeExpr| cx.target().default_value(&cx, &ty).ok();
    assert_eq!(default(TypeExpr::Decl(point)).as_deref(), Some("(NS_Point){0}"));
    assert_eq!(default(TypeExpr::Decl(color)).as_deref(), Some("(NS_Color)0"));
    assert_eq!(default(TypeExpr::String).as_deref(), Some("NULL"));
    assert_eq!(default(TypeExpr::Void).as_deref(), Some(""));

    let objc = frozen(model.clone(), Dialect::ObjC);
    let objc_options = options(Dialect::ObjC);
    let cx = CodegenContext::new(&objc, &objc_options);
    assert_eq!(cx.target().default_value(&cx, &TypeExpr::BOOL).ok().as_deref(), Some("NO"));
    assert_eq!(cx.target().default_value(&cx, &TypeExpr::String).ok().as_deref(), Some("nil"));

    let cpp = frozen(model, Dialect::Cpp);
    let cpp_options = options(Dialect::Cpp);
    let cx = CodegenContext::new(&cpp, &cpp_options);
    assert_eq!(
        cx.target().default_value(&cx, &TypeExpr::Decl(color)).ok().as_deref(),
        Some("static_cast<NS_Color>(0)")
    );
    assert_eq!(
        cx.target().default_value(&cx, &TypeExpr::String).ok().as_deref(),
        Some("std::string()")
    );
}

#[test]
fn include_guard_is_identifier_safe() {
    let model = frozen(ModelBuilder::new("Lib").build(), Dialect::C);
    let options = options(Dialect::C).with_base_name("My.Lib");
    let cx = CodegenContext::new(&model, &options);
    assert_eq!(include_guard(&cx), "MY_LIB_H");
}

// Containers

#[test]
fn objc_containers_bridge_object_elements() {
    let objc = for_dialect(Dialect::ObjC);
    assert_eq!(
        objc.container_get("v", "NSString*", "i"),
        "(__bridge NSString*)g_array_index(v->array, void*, i)"
    );
    assert_eq!(
        objc.container_get("v", "int32_t", "i"),
        "g_array_index(v->array, int32_t, i)"
    );
    assert_eq!(
        objc.container_push("v", "id<NS_IShape>", "e").to_string(),
        "void* e_ref = (__bridge_retained void*)e;\ng_array_append_val(v->array, e_ref);\n"
    );
}

#[test]
fn targets_report_their_dialect() {
    for dialect in [Dialect::C, Dialect::Cpp, Dialect::ObjC] {
        assert_eq!(for_dialect(dialect).dialect(), dialect);
    }
    assert!(!for_dialect(Dialect::Cpp).container_nullable());
    assert_eq!(for_dialect(Dialect::Cpp).cast("int32_t", "x"), "static_cast<int32_t>(x)");
    assert_eq!(for_dialect(Dialect::C).cast("int32_t", "x"), "(int32_t)x");
}
