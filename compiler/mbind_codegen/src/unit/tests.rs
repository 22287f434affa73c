use pretty_assertions::assert_eq;

use mbind_ir::{Model, ModelBuilder, Param, PrimitiveKind, TypeExpr};
use mbind_types::Dialect;

use super::{generate, OutputUnit, UnitKind};
use crate::test_helpers::{assert_lines_in_order, frozen, options};
use crate::{CodegenOptions, ExceptionMode, LookupStrategy};

fn run(model: Model, options: &CodegenOptions) -> Vec<OutputUnit> {
    let model = frozen(model, options.dialect);
    match generate(&model, options) {
        Ok(units) => units,
        Err(e) => panic!("codegen failed: {e}"),
    }
}

/// Header and implementation text.
fn texts(model: Model, options: &CodegenOptions) -> (String, String) {
    let mut units = run(model, options).into_iter();
    match (units.next(), units.next()) {
        (Some(header), Some(implementation)) => (header.text, implementation.text),
        _ => panic!("expected two units"),
    }
}

fn counter() -> Model {
    let mut b = ModelBuilder::new("Lib");
    let foo = b.class("NS", "Counter");
    b.constructor(foo, vec![]);
    b.method(foo, "Increment", vec![Param::new("by", TypeExpr::INT)], TypeExpr::INT);
    b.build()
}

// Units

#[test]
fn one_header_and_one_implementation() {
    let cases = [
        (Dialect::C, "Lib.c"),
        (Dialect::Cpp, "Lib.cpp"),
        (Dialect::ObjC, "Lib.m"),
    ];
    for (dialect, implementation) in cases {
        let units = run(counter(), &options(dialect));
        let names: Vec<(&str, UnitKind)> = units.iter().map(|u| (u.name.as_str(), u.kind)).collect();
        assert_eq!(
            names,
            vec![("Lib.h", UnitKind::Header), (implementation, UnitKind::Implementation)]
        );
    }
}

#[test]
fn base_name_names_the_files() {
    let options = options(Dialect::C).with_base_name("bindings");
    let units = run(counter(), &options);
    assert_eq!(units[0].name, "bindings.h");
    assert_eq!(units[1].name, "bindings.c");
    assert!(units[0].text.starts_with("#ifndef BINDINGS_H\n#define BINDINGS_H\n"));
    assert!(units[1].text.contains("bindings.h"));
}

#[test]
fn output_is_deterministic() {
    for dialect in [Dialect::C, Dialect::Cpp, Dialect::ObjC] {
        let options = options(dialect);
        assert_eq!(run(counter(), &options), run(counter(), &options));
    }
}

// Header layout

#[test]
fn c_header_typedefs_precede_prototypes() {
    let (header, _) = texts(counter(), &options(Dialect::C));
    assert_lines_in_order(
        &header,
        &[
            "#ifndef LIB_H",
            "typedef struct _NS_Counter NS_Counter;",
            "NS_Counter* NS_Counter_new(void);",
            "int32_t NS_Counter_Increment(NS_Counter* self, int32_t by);",
            "void NS_Counter_destroy(NS_Counter* self);",
            "#endif",
        ],
    );
}

#[test]
fn enums_are_hoisted_above_their_users() {
    let mut b = ModelBuilder::new("Lib");
    let canvas = b.class("NS", "Canvas");
    let color = b.enumeration("NS", "Color", PrimitiveKind::I32, &[("Red", None)]);
    b.method(canvas, "Paint", vec![Param::new("c", TypeExpr::Decl(color))], TypeExpr::Void);
    let model = b.build();

    let (header, _) = texts(model.clone(), &options(Dialect::C));
    assert_lines_in_order(&header, &["typedef enum NS_Color {", "void NS_Canvas_Paint("]);

    let (header, _) = texts(model, &options(Dialect::Cpp));
    assert_lines_in_order(
        &header,
        &["enum class NS_Color : int32_t {", "class NS_Canvas {", "void Paint(NS_Color c);"],
    );
}

#[test]
fn cpp_handle_lives_in_the_root_class_only() {
    let mut b = ModelBuilder::new("Lib");
    let animal = b.class("NS", "Animal");
    let dog = b.class("NS", "Dog");
    b.set_base(dog, animal);
    let (header, implementation) = texts(b.build(), &options(Dialect::Cpp));

    assert_eq!(header.matches("uint32_t _handle;").count(), 1);
    assert!(header.contains("class NS_Dog : public NS_Animal {"));
    assert_lines_in_order(
        &implementation,
        &[
            "NS_Animal::NS_Animal(mbind::handle handle)",
            ": _handle(handle.value)",
            "NS_Animal::~NS_Animal()",
            "NS_Dog::NS_Dog(mbind::handle handle)",
            ": NS_Animal(handle)",
        ],
    );
    assert!(!implementation.contains("NS_Dog::~NS_Dog()"));
}

#[test]
fn suppressed_declarations_are_not_emitted() {
    let mut b = ModelBuilder::new("Lib");
    b.class("NS", "Visible");
    let hidden = b.class("NS", "Hidden");
    b.decl_mut(hidden).suppressed = true;
    let model = b.build();
    for dialect in [Dialect::C, Dialect::Cpp, Dialect::ObjC] {
        let (header, implementation) = texts(model.clone(), &options(dialect));
        assert!(header.contains("NS_Visible"));
        assert!(!header.contains("NS_Hidden"));
        assert!(!implementation.contains("NS_Hidden"));
    }
}

// Implementation layout

#[test]
fn exception_support_follows_the_mode() {
    let (header, implementation) = texts(counter(), &options(Dialect::C));
    assert!(header.contains("typedef void (*Lib_ExceptionHandler)(MonoObject* exception);"));
    assert!(header.contains("void Lib_set_exception_handler(Lib_ExceptionHandler handler);"));
    assert!(implementation.contains("static void mbind_raise(MonoObject* exception)"));

    let ignore = options(Dialect::C).with_exceptions(ExceptionMode::Ignore);
    let (header, implementation) = texts(counter(), &ignore);
    assert!(!header.contains("ExceptionHandler"));
    assert!(!implementation.contains("mbind_raise"));
}

#[test]
fn class_getters_follow_the_lookup_strategy() {
    let (_, implementation) = texts(counter(), &options(Dialect::C));
    assert_lines_in_order(
        &implementation,
        &[
            "static MonoImage* mbind_image(void)",
            "mono_domain_assembly_open(mono_domain_get(), \"Lib.dll\");",
            "static MonoClass* mbind_class_NS_Counter(void)",
            "klass = mono_class_from_name(mbind_image(), \"NS\", \"Counter\");",
        ],
    );

    let token = options(Dialect::C).with_lookup(LookupStrategy::Token);
    let (_, implementation) = texts(counter(), &token);
    assert!(implementation.contains("klass = mono_class_get(mbind_image(), 0x02000001);"));
}

#[test]
fn nested_types_are_found_by_their_path() {
    let mut b = ModelBuilder::new("Lib");
    let outer = b.class("NS", "Outer");
    let inner = b.class("NS", "Inner");
    b.nest(inner, outer);
    let (_, implementation) = texts(b.build(), &options(Dialect::Cpp));
    assert!(implementation.contains("mono_class_from_name(mbind_image(), \"NS\", \"Outer/Inner\");"));
}

#[test]
fn c_wrap_helpers_precede_member_bodies() {
    let (_, implementation) = texts(counter(), &options(Dialect::C));
    assert_lines_in_order(
        &implementation,
        &[
            "struct _NS_Counter {",
            "static NS_Counter* mbind_wrap_NS_Counter(uint32_t handle)",
            "void NS_Counter_destroy(NS_Counter* self)",
            "NS_Counter* NS_Counter_new(void)",
            "int32_t NS_Counter_Increment(NS_Counter* self, int32_t by)",
        ],
    );
}

#[test]
fn objc_classes_get_an_implementation_block() {
    let (header, implementation) = texts(counter(), &options(Dialect::ObjC));
    assert_lines_in_order(
        &header,
        &[
            "@interface NS_Counter : NSObject {",
            "- (instancetype)initWithHandle:(uint32_t)handle;",
            "- (instancetype)init;",
            "- (int32_t)Increment:(int32_t)by;",
            "@end",
        ],
    );
    assert_lines_in_order(
        &implementation,
        &[
            "@implementation NS_Counter",
            "- (instancetype)initWithHandle:(uint32_t)handle",
            "- (void)dealloc",
            "- (instancetype)init",
            "- (int32_t)Increment:(int32_t)by",
            "@end",
        ],
    );
}
