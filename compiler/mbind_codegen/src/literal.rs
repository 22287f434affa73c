//! Literal spelling: enum item values and default arguments.
//!
//! Integer literals never spell a value the target parses as an
//! overflowing positive (`-9223372036854775808` is unary minus applied to
//! an out-of-range constant), so the minimum of each signed width is
//! written as `(-MAX - 1)`.

use mbind_ir::{ConstantValue, DeclKind, PrimitiveKind, TypeExpr};
use mbind_types::{Dialect, TypePrinter};

/// Integer literal of `kind`'s width.
pub fn integer(value: i128, kind: PrimitiveKind) -> String {
    match kind {
        PrimitiveKind::I64 if value == i128::from(i64::MIN) => {
            "(-INT64_C(9223372036854775807) - 1)".to_string()
        }
        PrimitiveKind::I64 => format!("INT64_C({value})"),
        PrimitiveKind::U64 => format!("UINT64_C({value})"),
        PrimitiveKind::I32 if value == i128::from(i32::MIN) => "(-2147483647 - 1)".to_string(),
        PrimitiveKind::U8 | PrimitiveKind::U16 | PrimitiveKind::U32 => format!("{value}u"),
        _ => value.to_string(),
    }
}

/// Floating-point literal; `F32` gets the `f` suffix.
pub fn float(value: f64, kind: PrimitiveKind, dialect: Dialect) -> String {
    let is_single = kind == PrimitiveKind::F32;
    if value.is_nan() || value.is_infinite() {
        let sign = if value.is_sign_negative() && value.is_infinite() { "-" } else { "" };
        return match dialect {
            Dialect::Cpp => {
                let ty = if is_single { "float" } else { "double" };
                let what = if value.is_nan() { "quiet_NaN" } else { "infinity" };
                format!("{sign}std::numeric_limits<{ty}>::{what}()")
            }
            Dialect::C | Dialect::ObjC => {
                let what = if value.is_nan() { "NAN" } else { "INFINITY" };
                format!("{sign}{what}")
            }
        };
    }
    #[expect(
        clippy::cast_possible_truncation,
        reason = "single-precision constants are stored widened"
    )]
    let mut text = if is_single {
        format!("{:?}", value as f32)
    } else {
        format!("{value:?}")
    };
    if is_single {
        if !text.contains(['.', 'e']) {
            text.push_str(".0");
        }
        text.push('f');
    }
    text
}

/// A UTF-16 code unit.
pub fn char16(value: u16, dialect: Dialect) -> String {
    match dialect {
        Dialect::Cpp => match value {
            0x27 => "u'\\''".to_string(),
            0x5c => "u'\\\\'".to_string(),
            0x20..=0x7e => format!("u'{}'", char::from(u8::try_from(value).unwrap_or(b'?'))),
            0xd800..=0xdfff => format!("char16_t(0x{value:04X})"),
            _ => format!("u'\\u{value:04X}'"),
        },
        Dialect::C => format!("(gunichar2)0x{value:04X}"),
        Dialect::ObjC => format!("(unichar)0x{value:04X}"),
    }
}

/// Body of a double-quoted literal. Control characters become three-digit
/// octal escapes so a following digit can never extend them; `??` is
/// broken up so it cannot start a trigraph.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    let mut previous = '\0';
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '?' if previous == '?' => out.push_str("\\?"),
            c if u32::from(c) < 0x20 || c == '\u{7f}' => {
                out.push_str(&format!("\\{:03o}", u32::from(c)));
            }
            c => out.push(c),
        }
        previous = c;
    }
    out
}

/// A string literal in the dialect's string-constant form.
pub fn string(text: &str, dialect: Dialect) -> String {
    match dialect {
        Dialect::ObjC => format!("@\"{}\"", escape(text)),
        Dialect::C | Dialect::Cpp => format!("\"{}\"", escape(text)),
    }
}

/// C++ default-argument spelling of `value` for a parameter of type `ty`.
/// `None` when the constant does not fit the parameter type.
pub fn default_argument(
    printer: &TypePrinter<'_>,
    value: &ConstantValue,
    ty: &TypeExpr,
) -> Option<String> {
    let dialect = printer.dialect();
    match (value, ty) {
        (ConstantValue::Bool(b), TypeExpr::Primitive(PrimitiveKind::Bool)) => {
            Some(b.to_string())
        }
        (ConstantValue::Int(_) | ConstantValue::UInt(_), TypeExpr::Primitive(kind)) => {
            let wide = integral_value(value)?;
            match kind {
                k if k.is_integral() => Some(integer(wide, *k)),
                PrimitiveKind::F32 | PrimitiveKind::F64 => {
                    Some(float(widen(wide), *kind, dialect))
                }
                PrimitiveKind::Bool => Some((wide != 0).to_string()),
                PrimitiveKind::Char => u16::try_from(wide).ok().map(|c| char16(c, dialect)),
                _ => None,
            }
        }
        (ConstantValue::Int(_) | ConstantValue::UInt(_), TypeExpr::Decl(id)) => {
            let decl = printer.model().decl(*id);
            let DeclKind::Enum(e) = &decl.kind else {
                return None;
            };
            let raw = integer(integral_value(value)?, e.backing);
            Some(format!("static_cast<{}>({raw})", printer.flat_name(*id)))
        }
        (ConstantValue::Float(_), TypeExpr::Primitive(kind @ (PrimitiveKind::F32 | PrimitiveKind::F64))) => {
            value.as_f64().map(|v| float(v, *kind, dialect))
        }
        (ConstantValue::Char(c), TypeExpr::Primitive(PrimitiveKind::Char)) => {
            Some(char16(*c, dialect))
        }
        (ConstantValue::String(s), TypeExpr::String) => Some(string(s, dialect)),
        (ConstantValue::Null, TypeExpr::String) => Some("std::string()".to_string()),
        (ConstantValue::Null, TypeExpr::Array(_)) => printer.print(ty).ok().map(|w| format!("{w}()")),
        (ConstantValue::Null, TypeExpr::Decl(id)) => {
            let decl = printer.model().decl(*id);
            if decl.is_reference_type() {
                Some("nullptr".to_string())
            } else {
                Some(format!("{}()", printer.flat_name(*id)))
            }
        }
        _ => None,
    }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "integral defaults of float parameters are small"
)]
fn widen(value: i128) -> f64 {
    value as f64
}

fn integral_value(value: &ConstantValue) -> Option<i128> {
    match value {
        ConstantValue::Int(v) => Some(i128::from(*v)),
        ConstantValue::UInt(v) => Some(i128::from(*v)),
        _ => None,
    }
}

#[cfg(test)]
mod tests;
