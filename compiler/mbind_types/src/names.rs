//! Name normalization shared by the passes and codegen.

/// Prefixes given to lowered property and field accessors.
pub const ACCESSOR_PREFIXES: [&str; 2] = ["get_", "set_"];

/// The name a member is grouped by for collision purposes: explicit
/// interface qualification and accessor prefixes removed.
///
/// ```text
/// get_Count            -> Count
/// NS.IRunner.Run       -> Run
/// NS.IList.get_Count   -> Count
/// ```
pub fn base_name(name: &str) -> &str {
    let name = mbind_ir::native_spelling(name);
    ACCESSOR_PREFIXES
        .iter()
        .find_map(|prefix| name.strip_prefix(prefix))
        .filter(|rest| !rest.is_empty())
        .unwrap_or(name)
}

/// Join dotted name segments with `separator`.
pub fn flatten<'a>(segments: impl IntoIterator<Item = &'a str>, separator: &str) -> String {
    let mut out = String::new();
    for segment in segments {
        for part in segment.split('.').filter(|p| !p.is_empty()) {
            if !out.is_empty() {
                out.push_str(separator);
            }
            out.push_str(part);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_name_strips_prefixes() {
        assert_eq!(base_name("get_Count"), "Count");
        assert_eq!(base_name("set_Count"), "Count");
        assert_eq!(base_name("DoIt"), "DoIt");
        assert_eq!(base_name("NS.IRunner.Run"), "Run");
        assert_eq!(base_name("NS.IList.get_Count"), "Count");
    }

    #[test]
    fn bare_prefix_is_its_own_base() {
        assert_eq!(base_name("get_"), "get_");
    }

    #[test]
    fn flatten_joins_namespace_and_nesting() {
        assert_eq!(flatten(["Company.Product", "Outer", "Inner"], "_"), "Company_Product_Outer_Inner");
        assert_eq!(flatten(["", "Foo"], "_"), "Foo");
        assert_eq!(flatten(["A.B", "C"], "::"), "A::B::C");
    }
}
