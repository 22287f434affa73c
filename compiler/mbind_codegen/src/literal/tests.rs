use pretty_assertions::assert_eq;

use mbind_ir::{ConstantValue, ModelBuilder, PrimitiveKind, TypeExpr};
use mbind_types::{Dialect, TypePrinter};

use super::{char16, default_argument, escape, float, integer, string};

// Integers

#[test]
fn signed_minimums_avoid_overflowing_literals() {
    assert_eq!(
        integer(i128::from(i64::MIN), PrimitiveKind::I64),
        "(-INT64_C(9223372036854775807) - 1)"
    );
    assert_eq!(integer(i128::from(i32::MIN), PrimitiveKind::I32), "(-2147483647 - 1)");
    assert_eq!(integer(-128, PrimitiveKind::I8), "-128");
    assert_eq!(integer(5, PrimitiveKind::I32), "5");
}

#[test]
fn unsigned_literals_carry_suffixes() {
    assert_eq!(integer(4_000_000_000, PrimitiveKind::U32), "4000000000u");
    assert_eq!(
        integer(i128::from(u64::MAX), PrimitiveKind::U64),
        "UINT64_C(18446744073709551615)"
    );
    assert_eq!(integer(7, PrimitiveKind::U8), "7u");
    assert_eq!(integer(-3, PrimitiveKind::I64), "INT64_C(-3)");
}

// Floats and chars

#[test]
fn float_spellings() {
    assert_eq!(float(1.5, PrimitiveKind::F64, Dialect::C), "1.5");
    assert_eq!(float(1.5, PrimitiveKind::F32, Dialect::Cpp), "1.5f");
    assert_eq!(float(2.0, PrimitiveKind::F32, Dialect::Cpp), "2.0f");
    assert_eq!(float(f64::INFINITY, PrimitiveKind::F64, Dialect::C), "INFINITY");
    assert_eq!(
        float(f64::NEG_INFINITY, PrimitiveKind::F32, Dialect::Cpp),
        "-std::numeric_limits<float>::infinity()"
    );
    assert_eq!(float(f64::NAN, PrimitiveKind::F64, Dialect::ObjC), "NAN");
}

#[test]
fn char16_spellings() {
    assert_eq!(char16(u16::from(b'a'), Dialect::Cpp), "u'a'");
    assert_eq!(char16(u16::from(b'\''), Dialect::Cpp), "u'\\''");
    assert_eq!(char16(0x00e9, Dialect::Cpp), "u'\\u00E9'");
    assert_eq!(char16(0xd800, Dialect::Cpp), "char16_t(0xD800)");
    assert_eq!(char16(0x41, Dialect::C), "(gunichar2)0x0041");
    assert_eq!(char16(0x41, Dialect::ObjC), "(unichar)0x0041");
}

// Strings

#[test]
fn strings_are_escaped() {
    assert_eq!(escape("a\"b\\c\n"), "a\\\"b\\\\c\\n");
    assert_eq!(escape("\u{0}1"), "\\0001");
    assert_eq!(escape("what??!"), "what?\\?!");
    assert_eq!(string("hi", Dialect::ObjC), "@\"hi\"");
    assert_eq!(string("hi", Dialect::Cpp), "\"hi\"");
}

// Default arguments

#[test]
fn default_arguments_follow_the_parameter_type() {
    let mut b = ModelBuilder::new("Lib");
    let color = b.enumeration("NS", "Color", PrimitiveKind::U8, &[("Red", None)]);
    let foo = b.class("NS", "Foo");
    let point = b.value_type("NS", "Point");
    let model = b.build();
    let printer = TypePrinter::new(&model, Dialect::Cpp, "_");
    let arg = |value: ConstantValue, ty: TypeExpr| default_argument(&printer, &value, &ty);

    assert_eq!(arg(ConstantValue::Int(3), TypeExpr::INT), Some("3".to_string()));
    assert_eq!(
        arg(ConstantValue::Int(2), TypeExpr::Decl(color)),
        Some("static_cast<NS_Color>(2u)".to_string())
    );
    assert_eq!(
        arg(ConstantValue::float(0.5), TypeExpr::Primitive(PrimitiveKind::F32)),
        Some("0.5f".to_string())
    );
    assert_eq!(arg(ConstantValue::Bool(true), TypeExpr::BOOL), Some("true".to_string()));
    assert_eq!(
        arg(ConstantValue::String("x".into()), TypeExpr::String),
        Some("\"x\"".to_string())
    );
    assert_eq!(arg(ConstantValue::Null, TypeExpr::Decl(foo)), Some("nullptr".to_string()));
    assert_eq!(
        arg(ConstantValue::Null, TypeExpr::Decl(point)),
        Some("NS_Point()".to_string())
    );
    assert_eq!(
        arg(ConstantValue::Null, TypeExpr::array(TypeExpr::INT)),
        Some("Int32Array()".to_string())
    );
    assert_eq!(arg(ConstantValue::String("x".into()), TypeExpr::INT), None);
}

// === Property tests ===

#[allow(
    clippy::disallowed_types,
    reason = "proptest macros internally use Arc"
)]
mod proptest_literals {
    use mbind_ir::PrimitiveKind;
    use proptest::prelude::*;

    use super::super::{escape, integer};

    /// Undo [`escape`] the way a C compiler reads the literal body.
    fn unescape(text: &str) -> String {
        let mut out = String::new();
        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            if c != '\\' {
                out.push(c);
                continue;
            }
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('r') => out.push('\r'),
                Some('t') => out.push('\t'),
                Some(d @ '0'..='7') => {
                    let mut value = d.to_digit(8).unwrap_or(0);
                    for _ in 0..2 {
                        if let Some(next) = chars.peek().and_then(|n| n.to_digit(8)) {
                            value = value * 8 + next;
                            chars.next();
                        }
                    }
                    out.push(char::from_u32(value).unwrap_or('\u{fffd}'));
                }
                Some(other) => out.push(other),
                None => {}
            }
        }
        out
    }

    proptest! {
        #[test]
        fn escaped_strings_read_back(text in "[ -~\\n\\t\\x00-\\x1f]{0,40}") {
            let escaped = escape(&text);
            prop_assert!(!escaped.contains('\n'));
            prop_assert!(!escaped.contains("??"));
            prop_assert_eq!(unescape(&escaped), text);
        }

        #[test]
        fn i64_literals_never_overflow(value in any::<i64>()) {
            let text = integer(i128::from(value), PrimitiveKind::I64);
            prop_assert!(!text.contains("9223372036854775808"));
        }

        #[test]
        fn i32_literals_never_overflow(value in any::<i32>()) {
            let text = integer(i128::from(value), PrimitiveKind::I32);
            prop_assert!(!text.contains("2147483648"));
        }
    }
}
