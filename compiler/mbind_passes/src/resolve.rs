//! Duplicate-name resolution.
//!
//! Members of each class are grouped by [`base_name`]. Within a group the
//! rename unit is a method, a constructor, or the getter/setter pair of one
//! field or property (both halves get the same suffix). Groups of one are
//! left alone; larger groups go through these rules in order:
//!
//! 1. Dialects that cannot share a name between static and instance
//!    members: if both kinds are present, every unit of the smaller kind
//!    is renamed (static on a tie).
//! 2. If what remains mixes methods with lowered accessors, all of it is
//!    renamed.
//! 3. Dialects without overloading rename every remaining unit but the
//!    first. Overloading dialects rename only units whose parameter types
//!    repeat an earlier unit's.
//!
//! Suffixes are `_1`, `_2`, ... per group in rename order, skipping names
//! already taken in the class.
//!
//! Interfaces are resolved before classes, base interfaces first, and an
//! interface's own methods are renamed around the names its base
//! interfaces already settled. Proxy forwarders then take the emitted name
//! of the member they forward, so a proxy sees the whole interface closure
//! without collisions.

use mbind_diagnostic::{Diagnostic, ErrorCode};
use mbind_ir::{DeclId, MemberId, MemberKind, MemberOrigin, Model, TypeExpr};
use mbind_types::{base_name, Dialect, DialectCaps};
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use crate::PipelineContext;

/// Constructor base name for flat dialects without a constructor marker.
const DEFAULT_CTOR_NAME: &str = "new";

struct Unit {
    /// Members and their names before resolution.
    names: SmallVec<[(MemberId, String); 2]>,
    base: String,
    is_static: bool,
    is_accessor: bool,
    /// Name fixed by the interface member a proxy forwarder overrides, or
    /// by a base interface.
    pinned: Option<String>,
    /// A base-interface method; only occupies its name.
    inherited: bool,
    params: Vec<TypeExpr>,
}

pub fn resolve_names(model: &mut Model, ctx: &mut PipelineContext) {
    let (interfaces, classes): (Vec<DeclId>, Vec<DeclId>) = model
        .emission_order()
        .iter()
        .copied()
        .filter(|&id| {
            let decl = model.decl(id);
            !decl.suppressed && (decl.is_interface() || decl.as_class().is_some())
        })
        .partition(|&id| model.decl(id).is_interface());

    let mut renamed = 0;
    for decl in bases_first(model, &interfaces).into_iter().chain(classes) {
        renamed += resolve_decl(model, ctx, decl);
    }
    tracing::debug!(renamed, "resolved member names");
}

/// Rules for `decl`. Objective-C value types are emitted as plain C
/// functions and follow C's rules.
fn caps_for(model: &Model, ctx: &PipelineContext, decl: DeclId) -> DialectCaps {
    if ctx.dialect() == Dialect::ObjC && model.decl(decl).is_value_type() {
        Dialect::C.caps()
    } else {
        ctx.caps()
    }
}

/// `interfaces` reordered so every base interface precedes the interfaces
/// deriving from it.
fn bases_first(model: &Model, interfaces: &[DeclId]) -> Vec<DeclId> {
    fn place(
        model: &Model,
        iface: DeclId,
        wanted: &FxHashSet<DeclId>,
        visited: &mut FxHashSet<DeclId>,
        ordered: &mut Vec<DeclId>,
    ) {
        if !visited.insert(iface) {
            return;
        }
        if let Some(decl) = model.decl(iface).as_interface() {
            for &base in &decl.bases {
                place(model, base, wanted, visited, ordered);
            }
        }
        if wanted.contains(&iface) {
            ordered.push(iface);
        }
    }

    let wanted: FxHashSet<DeclId> = interfaces.iter().copied().collect();
    let mut visited = FxHashSet::default();
    let mut ordered = Vec::with_capacity(interfaces.len());
    for &iface in interfaces {
        place(model, iface, &wanted, &mut visited, &mut ordered);
    }
    ordered
}

/// Emitted methods of every base interface of `iface`, transitively.
fn inherited_methods(model: &Model, iface: DeclId) -> Vec<MemberId> {
    let mut visited = FxHashSet::default();
    visited.insert(iface);
    let mut queue: Vec<DeclId> = model
        .decl(iface)
        .as_interface()
        .map(|d| d.bases.clone())
        .unwrap_or_default();
    let mut methods = Vec::new();
    let mut i = 0;
    while let Some(&current) = queue.get(i) {
        i += 1;
        if !visited.insert(current) || model.decl(current).suppressed {
            continue;
        }
        methods.extend(
            model
                .emitted_members_of(current)
                .filter(|(_, m)| m.is_method())
                .map(|(id, _)| id),
        );
        if let Some(decl) = model.decl(current).as_interface() {
            queue.extend(decl.bases.iter().copied());
        }
    }
    methods
}

fn resolve_decl(model: &mut Model, ctx: &mut PipelineContext, decl: DeclId) -> usize {
    let caps = caps_for(model, ctx, decl);
    let mut units = inherited_units(model, decl);
    units.extend(collect_units(model, decl, caps));

    let mut taken: FxHashSet<String> = FxHashSet::default();
    for unit in &units {
        match &unit.pinned {
            Some(name) => {
                taken.insert(name.clone());
            }
            None => taken.extend(unit.names.iter().map(|(_, n)| n.clone())),
        }
    }

    let mut order: Vec<&str> = Vec::new();
    let mut groups: FxHashMap<&str, Vec<usize>> = FxHashMap::default();
    for (i, unit) in units.iter().enumerate() {
        let group = groups.entry(unit.base.as_str()).or_insert_with(|| {
            order.push(unit.base.as_str());
            Vec::new()
        });
        group.push(i);
    }

    let mut final_names: Vec<Option<u32>> = vec![None; units.len()];
    for base in order {
        let group = &groups[base];
        if group.len() < 2 {
            continue;
        }
        let (to_rename, ambiguous) = select_renames(&units, group, caps);
        if ambiguous {
            let location = format!("{}::{base}", model.qualified_name(decl));
            tracing::warn!(group = %location, "collision matched several rename rules");
            ctx.report(
                Diagnostic::warning(ErrorCode::E3002)
                    .with_message(format!(
                        "`{base}` collides across static and instance members and mixes methods with accessors"
                    ))
                    .at(location)
                    .with_note("static/instance split applied first, then method/accessor mixing"),
            );
        }
        let mut counter = 1u32;
        for unit in to_rename {
            let suffix = loop {
                let n = counter;
                counter += 1;
                let free = units[unit]
                    .names
                    .iter()
                    .all(|(_, name)| !taken.contains(&format!("{name}_{n}")));
                if free {
                    break n;
                }
            };
            for (_, name) in &units[unit].names {
                taken.insert(format!("{name}_{suffix}"));
            }
            final_names[unit] = Some(suffix);
        }
    }

    let mut renamed = 0;
    for (unit, suffix) in units.iter().zip(final_names) {
        if unit.inherited {
            continue;
        }
        for (id, name) in &unit.names {
            let emitted = match (&unit.pinned, suffix) {
                (Some(pinned), _) => pinned.clone(),
                (None, Some(n)) => {
                    renamed += 1;
                    let emitted = format!("{name}_{n}");
                    let path = model.member_path(*id);
                    ctx.report(
                        Diagnostic::note(ErrorCode::E3001)
                            .with_message(format!("`{name}` emitted as `{emitted}`"))
                            .at(path),
                    );
                    emitted
                }
                (None, None) => name.clone(),
            };
            model.rename_member(*id, emitted);
        }
    }
    renamed
}

/// Already-resolved methods of the base interfaces of an interface, as
/// pinned units.
fn inherited_units(model: &Model, decl: DeclId) -> Vec<Unit> {
    if !model.decl(decl).is_interface() {
        return Vec::new();
    }
    inherited_methods(model, decl)
        .into_iter()
        .map(|id| {
            let member = model.member(id);
            let emitted = member.emitted_name().to_string();
            Unit {
                base: base_name(&member.native_name).to_string(),
                names: SmallVec::from_iter([(id, member.native_name.clone())]),
                is_static: false,
                is_accessor: member.is_accessor(),
                pinned: Some(emitted),
                inherited: true,
                params: member.params().iter().map(|p| p.ty.clone()).collect(),
            }
        })
        .collect()
}

fn collect_units(model: &Model, decl: DeclId, caps: DialectCaps) -> Vec<Unit> {
    let mut units: Vec<Unit> = Vec::new();
    let mut accessor_units: FxHashMap<MemberId, usize> = FxHashMap::default();
    let mut pinned_names: Vec<(String, Vec<TypeExpr>)> = Vec::new();

    for (id, member) in model.emitted_members_of(decl) {
        let name = match &member.kind {
            MemberKind::Field(_) | MemberKind::Property(_) => continue,
            MemberKind::Constructor(_) if caps.overloading => continue,
            MemberKind::Constructor(_) => caps.ctor_marker.unwrap_or(DEFAULT_CTOR_NAME).to_string(),
            MemberKind::Method(_) => member.native_name.clone(),
        };
        if let Some(of) = member.origin.accessor_of() {
            if let Some(&unit) = accessor_units.get(&of) {
                units[unit].names.push((id, name));
                continue;
            }
            accessor_units.insert(of, units.len());
        }
        let params: Vec<TypeExpr> = member.params().iter().map(|p| p.ty.clone()).collect();
        let pinned = match member.origin {
            MemberOrigin::ProxyForward { target } => {
                let emitted = model.member(target).emitted_name().to_string();
                // Forwarders from sibling interfaces can arrive with the same
                // name; only the first keeps it unless overloading tells
                // them apart.
                let clash = pinned_names
                    .iter()
                    .any(|(n, p)| *n == emitted && (!caps.overloading || *p == params));
                if clash {
                    None
                } else {
                    pinned_names.push((emitted.clone(), params.clone()));
                    Some(emitted)
                }
            }
            _ => None,
        };
        units.push(Unit {
            base: base_name(&name).to_string(),
            names: SmallVec::from_iter([(id, name)]),
            is_static: member.is_static || member.is_constructor(),
            is_accessor: member.is_accessor(),
            pinned,
            inherited: false,
            params,
        });
    }
    units
}

/// Units of `group` to rename, in suffix order, and whether more than
/// one rule fired.
fn select_renames(units: &[Unit], group: &[usize], caps: DialectCaps) -> (Vec<usize>, bool) {
    let (pinned, mut remaining): (Vec<usize>, Vec<usize>) =
        group.iter().partition(|&&u| units[u].pinned.is_some());
    if !pinned.is_empty() {
        // Pinned names never move; the rest of the group moves around them.
        if !caps.overloading {
            return (remaining, false);
        }
        let mut seen: Vec<&[TypeExpr]> =
            pinned.iter().map(|&u| units[u].params.as_slice()).collect();
        let mut rename = Vec::new();
        for u in remaining {
            let params = units[u].params.as_slice();
            if seen.contains(&params) {
                rename.push(u);
            } else {
                seen.push(params);
            }
        }
        return (rename, false);
    }

    let mut rename = Vec::new();
    let mut split = false;
    if !caps.static_instance_sharing {
        let (statics, instances): (Vec<usize>, Vec<usize>) =
            remaining.iter().partition(|&&u| units[u].is_static);
        if !statics.is_empty() && !instances.is_empty() {
            let (smaller, larger) = if statics.len() <= instances.len() {
                (statics, instances)
            } else {
                (instances, statics)
            };
            rename.extend(smaller);
            remaining = larger;
            split = true;
        }
    }

    let has_accessor = remaining.iter().any(|&u| units[u].is_accessor);
    let has_method = remaining.iter().any(|&u| !units[u].is_accessor);
    if has_accessor && has_method {
        rename.extend(remaining);
        return (rename, split);
    }

    if caps.overloading {
        let mut seen: Vec<&[TypeExpr]> = Vec::new();
        for u in remaining {
            let params = units[u].params.as_slice();
            if seen.contains(&params) {
                rename.push(u);
            } else {
                seen.push(params);
            }
        }
    } else {
        rename.extend(remaining.into_iter().skip(1));
    }
    (rename, false)
}
