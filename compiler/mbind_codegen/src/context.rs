//! Code generation context and state.
//!
//! The `CodegenContext` holds everything one unit's generation reads (the
//! frozen model, the options, the type printer) and the unit's output
//! buffer.

use mbind_ir::{DeclId, DeclKind, FrozenModel, MemberId, MemberOrigin, TypeExpr};
use mbind_types::{Dialect, TypePrinter, UnsupportedType};
use rustc_hash::FxHashSet;

use crate::code::Code;
use crate::options::CodegenOptions;
use crate::target::{self, Target};

/// Code generation context.
pub struct CodegenContext<'a> {
    pub model: &'a FrozenModel,
    pub options: &'a CodegenOptions,
    printer: TypePrinter<'a>,
    target: &'static dyn Target,
    /// Current indentation level.
    indent: usize,
    /// Generated code output.
    output: String,
    /// Support functions already written to the current unit.
    generated_helpers: FxHashSet<String>,
}

impl<'a> CodegenContext<'a> {
    pub fn new(model: &'a FrozenModel, options: &'a CodegenOptions) -> Self {
        CodegenContext {
            model,
            options,
            printer: TypePrinter::new(model, options.dialect, &options.separator),
            target: target::for_dialect(options.dialect),
            indent: 0,
            output: String::with_capacity(4096),
            generated_helpers: FxHashSet::default(),
        }
    }

    #[inline]
    pub fn dialect(&self) -> Dialect {
        self.options.dialect
    }

    #[inline]
    pub fn printer(&self) -> &TypePrinter<'a> {
        &self.printer
    }

    #[inline]
    pub fn target(&self) -> &'static dyn Target {
        self.target
    }

    // Names

    /// Native spelling of a type.
    pub fn print(&self, ty: &TypeExpr) -> Result<String, UnsupportedType> {
        self.printer.print(ty)
    }

    pub fn flat_name(&self, decl: DeclId) -> String {
        self.printer.flat_name(decl)
    }

    /// The name callers use for instances of `decl`: the opaque typedef in
    /// dialects that have one, otherwise the flattened class name.
    pub fn self_type(&self, decl: DeclId) -> String {
        let repr = self
            .model
            .decl(decl)
            .as_class()
            .and_then(|c| c.object_repr)
            .map(|id| &self.model.decl(id).kind);
        match repr {
            Some(DeclKind::ObjectRepr(r)) => r.typedef_name.clone(),
            _ => self.flat_name(decl),
        }
    }

    /// Free-function name of a member: `NS_Foo_Bar`.
    pub fn function_name(&self, member: MemberId) -> String {
        let m = self.model.member(member);
        format!(
            "{}{}{}",
            self.flat_name(m.declaring),
            self.options.separator,
            m.emitted_name()
        )
    }

    /// The declaration the runtime knows a member by. Proxy forwarders are
    /// looked up on the interface that declares their target.
    pub fn lookup_decl(&self, member: MemberId) -> DeclId {
        let m = self.model.member(member);
        match m.origin {
            MemberOrigin::ProxyForward { target } => self.model.member(target).declaring,
            _ => m.declaring,
        }
    }

    // Output

    /// Increase indentation level.
    pub fn indent(&mut self) {
        self.indent += 1;
    }

    /// Decrease indentation level.
    pub fn dedent(&mut self) {
        debug_assert!(self.indent > 0, "dedent called with zero indent");
        self.indent = self.indent.saturating_sub(1);
    }

    /// Write a line to output (with indentation and newline).
    pub fn writeln(&mut self, s: &str) {
        for _ in 0..self.indent {
            self.output.push_str("    ");
        }
        self.output.push_str(s);
        self.output.push('\n');
    }

    /// Write a fragment at the current indentation.
    pub fn write_code(&mut self, code: &Code) {
        self.output.push_str(&code.render(self.indent));
    }

    /// Write a newline.
    pub fn newline(&mut self) {
        self.output.push('\n');
    }

    /// Take the generated output, leaving the context ready for the next
    /// unit.
    pub fn take_output(&mut self) -> String {
        self.generated_helpers.clear();
        self.indent = 0;
        std::mem::take(&mut self.output)
    }

    /// Check if a helper function has been generated.
    pub fn has_helper(&self, name: &str) -> bool {
        self.generated_helpers.contains(name)
    }

    /// Mark a helper function as generated.
    pub fn mark_helper(&mut self, name: impl Into<String>) {
        self.generated_helpers.insert(name.into());
    }
}
