//! Member bodies.
//!
//! Every body walks the same stages in order; a stage may be skipped but
//! never revisited:
//!
//! ```text
//! Init → ClassResolved → MethodResolved → InstanceResolved
//!      → ArgumentsMarshaled → Dispatched → ExceptionChecked
//!      → ReturnMarshaled → Done
//! ```
//!
//! Class and method handles are cached in function-local statics, so the
//! lookup cost is paid on the first call only.

use mbind_ir::{MemberId, MemberKind, MemberOrigin, Param, TypeExpr};
use mbind_types::{Dialect, UnsupportedType};

use crate::code::Code;
use crate::context::CodegenContext;
use crate::marshal::{self, Source};
use crate::options::{ExceptionMode, LookupStrategy};
use crate::{literal, mono, CodegenError};

/// Progress of a body through generation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Init,
    ClassResolved,
    MethodResolved,
    InstanceResolved,
    ArgumentsMarshaled,
    Dispatched,
    ExceptionChecked,
    ReturnMarshaled,
    Done,
}

/// A generated member definition and the stages it went through.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberBody {
    pub code: Code,
    pub stages: Vec<Stage>,
}

struct BodyBuilder {
    stage: Stage,
    stages: Vec<Stage>,
    code: Code,
}

impl BodyBuilder {
    fn new() -> Self {
        BodyBuilder {
            stage: Stage::Init,
            stages: vec![Stage::Init],
            code: Code::new(),
        }
    }

    fn enter(&mut self, stage: Stage) {
        debug_assert!(
            stage > self.stage,
            "stage {stage:?} entered after {:?}",
            self.stage
        );
        self.stage = stage;
        self.stages.push(stage);
    }

    fn finish(mut self, head: Code) -> MemberBody {
        self.enter(Stage::Done);
        let mut code = head;
        code.block("{", self.code, "}");
        MemberBody {
            code,
            stages: self.stages,
        }
    }
}

/// Generate the definition of one member.
pub fn generate_member(cx: &CodegenContext<'_>, id: MemberId) -> Result<MemberBody, CodegenError> {
    let m = cx.model.member(id);
    tracing::trace!(member = %cx.model.member_path(id), "generating member");

    let field_source = m
        .origin
        .accessor_of()
        .filter(|&of| matches!(cx.model.member(of).kind, MemberKind::Field(_)));
    let result = if m.origin == MemberOrigin::ProxyHandle {
        handle_accessor(cx, id)
    } else if field_source.is_some() {
        field_accessor(cx, id)
    } else if m.is_constructor() {
        constructor(cx, id)
    } else {
        method(cx, id)
    };
    result.map_err(|source| CodegenError::Member {
        member: cx.model.member_path(id),
        source,
    })
}

fn handle_accessor(cx: &CodegenContext<'_>, id: MemberId) -> Result<MemberBody, UnsupportedType> {
    let decl = cx.model.member(id).declaring;
    let mut b = BodyBuilder::new();
    b.code
        .line(format!("return {};", cx.target().self_handle(cx, decl)));
    Ok(b.finish(cx.target().function_head(cx, id)?))
}

// Shared stages

fn resolve_class(cx: &CodegenContext<'_>, b: &mut BodyBuilder, id: MemberId) {
    b.enter(Stage::ClassResolved);
    let lookup = cx.lookup_decl(id);
    b.code.line(format!(
        "MonoClass* __klass = {}();",
        mono::class_fn(&cx.flat_name(lookup))
    ));
}

fn resolve_method(cx: &CodegenContext<'_>, b: &mut BodyBuilder, id: MemberId) {
    b.enter(Stage::MethodResolved);
    let m = cx.model.member(id);
    let mut find = Code::new();
    match cx.options.lookup {
        LookupStrategy::Token => {
            find.line(format!(
                "__method = {}({}(), 0x{:08X}, __klass);",
                mono::METHOD_FROM_TOKEN,
                mono::IMAGE_FN,
                m.token
            ));
        }
        LookupStrategy::Name => {
            let desc = mono::method_desc(cx.model, cx.lookup_decl(id), id);
            find.line(format!(
                "MonoMethodDesc* __desc = {}({}, 1);",
                mono::METHOD_DESC_NEW,
                literal::string(&desc, Dialect::C)
            ));
            find.line(format!(
                "__method = {}(__desc, __klass);",
                mono::METHOD_DESC_SEARCH
            ));
            find.line(format!("{}(__desc);", mono::METHOD_DESC_FREE));
        }
    }
    b.code.line("static MonoMethod* __method = NULL;");
    b.code.braced("if (!__method)", find);
}

/// Marshal every parameter. Returns the argument-array expression and the
/// post-call steps in parameter order.
fn marshal_arguments(
    cx: &CodegenContext<'_>,
    b: &mut BodyBuilder,
    params: &[Param],
) -> Result<(&'static str, Vec<Code>), UnsupportedType> {
    b.enter(Stage::ArgumentsMarshaled);
    if params.is_empty() {
        return Ok(("NULL", Vec::new()));
    }
    let mut slots = Vec::with_capacity(params.len());
    let mut posts = Vec::with_capacity(params.len());
    for param in params {
        let marshaled = marshal::param_to_managed(cx, param)?;
        b.code.append(marshaled.pre);
        slots.push(marshaled.slot);
        posts.push(marshaled.post);
    }
    b.code.line(format!("void* __args[{}];", params.len()));
    for (i, slot) in slots.iter().enumerate() {
        b.code.line(format!("__args[{i}] = {slot};"));
    }
    Ok(("__args", posts))
}

fn dispatch(b: &mut BodyBuilder, method: &str, instance: &str, args: &str, returns: bool) {
    b.enter(Stage::Dispatched);
    b.code.line("MonoObject* __exception = NULL;");
    let call = format!("{}({method}, {instance}, {args}, &__exception)", mono::INVOKE);
    if returns {
        b.code.line(format!("MonoObject* __result = {call};"));
    } else {
        b.code.line(format!("{call};"));
    }
}

fn check_exception(cx: &CodegenContext<'_>, b: &mut BodyBuilder, cleanup: Code, exit: Code) {
    b.enter(Stage::ExceptionChecked);
    let mut fail = cleanup;
    if cx.options.exceptions == ExceptionMode::Throw {
        fail.line(format!("{}(__exception);", mono::RAISE_FN));
    }
    fail.append(exit);
    b.code.braced("if (__exception)", fail);
}

fn return_default(cx: &CodegenContext<'_>, ty: &TypeExpr) -> Result<Code, UnsupportedType> {
    let value = cx.target().default_value(cx, ty)?;
    Ok(if value.is_empty() {
        Code::single("return;")
    } else {
        Code::single(format!("return {value};"))
    })
}

// Methods

fn method(cx: &CodegenContext<'_>, id: MemberId) -> Result<MemberBody, UnsupportedType> {
    let target = cx.target();
    let m = cx.model.member(id);
    let decl = m.declaring;
    let is_value = cx.model.decl(decl).is_value_type();
    let ret = m.value_type();
    let returns = !ret.is_void();

    let mut b = BodyBuilder::new();
    resolve_class(cx, &mut b, id);
    resolve_method(cx, &mut b, id);

    let instance = if m.is_static {
        "NULL"
    } else {
        b.enter(Stage::InstanceResolved);
        if is_value {
            b.code.line(format!(
                "MonoObject* __boxed = {}({}, __klass, {});",
                mono::VALUE_BOX,
                mono::DOMAIN,
                target.self_value()
            ));
            b.code.line(format!("void* __instance = {}(__boxed);", mono::UNBOX));
        } else {
            b.code.line(format!(
                "MonoObject* __instance = {}({});",
                mono::HANDLE_TARGET,
                target.self_handle(cx, decl)
            ));
        }
        "__instance"
    };

    let (args, posts) = marshal_arguments(cx, &mut b, m.params())?;

    let virtual_call = m.is_virtual() && !m.is_static && !is_value;
    if virtual_call {
        b.code.line(format!(
            "MonoMethod* __virtual = {}(__instance, __method);",
            mono::VIRTUAL_METHOD
        ));
    }
    let callee = if virtual_call { "__virtual" } else { "__method" };
    dispatch(&mut b, callee, instance, args, returns);
    check_exception(cx, &mut b, Code::new(), return_default(cx, ret)?);

    b.enter(Stage::ReturnMarshaled);
    if is_value && !m.is_static {
        b.code.line(format!(
            "*{} = *({}*){}(__boxed);",
            target.self_value(),
            cx.flat_name(decl),
            mono::UNBOX
        ));
    }
    if returns {
        b.code.append(marshal::return_to_native(cx, ret, "__result")?);
    }
    for post in posts {
        b.code.append(post);
    }
    if returns {
        b.code.line("return __ret;");
    }
    Ok(b.finish(target.function_head(cx, id)?))
}

// Constructors

fn constructor(cx: &CodegenContext<'_>, id: MemberId) -> Result<MemberBody, UnsupportedType> {
    let target = cx.target();
    let m = cx.model.member(id);
    let decl = m.declaring;
    let is_value = cx.model.decl(decl).is_value_type();
    let handle = target.self_handle(cx, decl);

    let mut b = BodyBuilder::new();
    if !is_value {
        b.code.append(target.construct_begin(cx, decl));
    }
    resolve_class(cx, &mut b, id);
    resolve_method(cx, &mut b, id);

    b.enter(Stage::InstanceResolved);
    if is_value {
        b.code.line(format!(
            "MonoObject* __object = {}({}, __klass);",
            mono::OBJECT_NEW,
            mono::DOMAIN
        ));
        b.code.line(format!("void* __instance = {}(__object);", mono::UNBOX));
    } else {
        b.code.line(format!(
            "MonoObject* __instance = {}({}, __klass);",
            mono::OBJECT_NEW,
            mono::DOMAIN
        ));
        b.code
            .line(format!("{handle} = {}(__instance, 0);", mono::HANDLE_NEW));
    }

    let (args, posts) = marshal_arguments(cx, &mut b, m.params())?;
    dispatch(&mut b, "__method", "__instance", args, false);

    let mut cleanup = Code::new();
    if !is_value {
        cleanup.line(format!("{}({handle});", mono::HANDLE_FREE));
        cleanup.line(format!("{handle} = 0;"));
    }
    check_exception(cx, &mut b, cleanup, target.construct_abort(cx, decl));

    b.enter(Stage::ReturnMarshaled);
    for post in posts {
        b.code.append(post);
    }
    b.code.append(target.construct_finish(cx, decl));
    Ok(b.finish(target.function_head(cx, id)?))
}

// Field accessors

fn field_accessor(cx: &CodegenContext<'_>, id: MemberId) -> Result<MemberBody, UnsupportedType> {
    let target = cx.target();
    let m = cx.model.member(id);
    let is_setter = matches!(m.origin, MemberOrigin::Setter { .. });
    let field_name = m
        .origin
        .accessor_of()
        .map_or(m.declared_name.as_str(), |of| {
            cx.model.member(of).declared_name.as_str()
        });

    let mut b = BodyBuilder::new();
    resolve_class(cx, &mut b, id);

    b.enter(Stage::MethodResolved);
    let mut find = Code::new();
    match cx.options.lookup {
        LookupStrategy::Token => {
            find.line(format!(
                "__field = {}(__klass, 0x{:08X});",
                mono::FIELD_FROM_TOKEN,
                m.token
            ));
        }
        LookupStrategy::Name => {
            find.line(format!(
                "__field = {}(__klass, {});",
                mono::FIELD_FROM_NAME,
                literal::string(field_name, Dialect::C)
            ));
        }
    }
    b.code.line("static MonoClassField* __field = NULL;");
    b.code.braced("if (!__field)", find);

    b.enter(Stage::InstanceResolved);
    if m.is_static {
        b.code.line(format!(
            "MonoVTable* __vtable = {}({}, __klass);",
            mono::CLASS_VTABLE,
            mono::DOMAIN
        ));
    } else {
        b.code.line(format!(
            "MonoObject* __instance = {}({});",
            mono::HANDLE_TARGET,
            target.self_handle(cx, m.declaring)
        ));
    }
    let owner = if m.is_static { "__vtable" } else { "__instance" };

    if is_setter {
        let value = m
            .params()
            .last()
            .ok_or_else(|| UnsupportedType(cx.model.member_path(id)))?;
        b.enter(Stage::ArgumentsMarshaled);
        let marshaled = marshal::param_to_managed(cx, value)?;
        b.code.append(marshaled.pre);

        b.enter(Stage::Dispatched);
        let setter = if m.is_static {
            mono::STATIC_FIELD_SET
        } else {
            mono::FIELD_SET
        };
        b.code
            .line(format!("{setter}({owner}, __field, {});", marshaled.slot));
    } else {
        let ty = m.value_type();
        b.enter(Stage::Dispatched);
        let getter = if m.is_static {
            mono::STATIC_FIELD_GET
        } else {
            mono::FIELD_GET
        };
        b.code
            .line(format!("{} __value;", marshal::storage(cx, ty)?));
        b.code.line(format!("{getter}({owner}, __field, &__value);"));

        b.enter(Stage::ReturnMarshaled);
        b.code
            .append(marshal::to_native(cx, ty, Source::Raw("__value"), "__ret")?);
        b.code.line("return __ret;");
    }
    Ok(b.finish(target.function_head(cx, id)?))
}
