//! The declaration model.
//!
//! Declarations and members live in append-only arenas. The emission order
//! is a separate list: declared types are appended as they are added, and
//! synthesized types enter it only through [`Model::splice`], once the pass
//! that produced them has finished.
//!
//! # Lifecycle
//!
//! ```text
//! loader/ModelBuilder ──► Model ──(passes mutate)──► Model::freeze ──► FrozenModel
//!                                                                        │
//!                                              codegen reads only ◄──────┘
//! ```

use std::ops::Deref;

use rustc_hash::FxHashMap;

use crate::{
    ClassDecl, DeclId, DeclKind, Member, MemberId, Suppression, TypeDecl,
};

/// Request to place a synthesized declaration in the emission order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Insertion {
    pub decl: DeclId,
    /// Place immediately before this declaration; append when `None`.
    pub before: Option<DeclId>,
}

/// The in-memory declaration model of one assembly.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Model {
    assembly: String,
    decls: Vec<TypeDecl>,
    members: Vec<Member>,
    order: Vec<DeclId>,
}

impl Model {
    pub fn new(assembly: impl Into<String>) -> Self {
        Model {
            assembly: assembly.into(),
            ..Model::default()
        }
    }

    /// Name of the assembly the model was loaded from.
    pub fn assembly_name(&self) -> &str {
        &self.assembly
    }

    // Queries

    #[inline]
    pub fn decl(&self, id: DeclId) -> &TypeDecl {
        &self.decls[id.index()]
    }

    #[inline]
    pub fn member(&self, id: MemberId) -> &Member {
        &self.members[id.index()]
    }

    /// Whether `id` indexes the declaration arena.
    pub fn contains_decl(&self, id: DeclId) -> bool {
        id.index() < self.decls.len()
    }

    /// Whether `id` indexes the member arena.
    pub fn contains_member(&self, id: MemberId) -> bool {
        id.index() < self.members.len()
    }

    pub fn decl_count(&self) -> usize {
        self.decls.len()
    }

    /// Every declaration in the arena, declared and synthesized, in
    /// creation order.
    pub fn decls(&self) -> impl Iterator<Item = (DeclId, &TypeDecl)> {
        self.decls.iter().enumerate().map(|(i, d)| (decl_id(i), d))
    }

    /// Declarations in emission order.
    pub fn emission_order(&self) -> &[DeclId] {
        &self.order
    }

    /// Members of a class or interface, in declaration order.
    pub fn members_of(&self, decl: DeclId) -> impl Iterator<Item = (MemberId, &Member)> {
        self.decl(decl)
            .members()
            .iter()
            .map(move |&id| (id, self.member(id)))
    }

    /// Members of a class or interface that survive into emission.
    pub fn emitted_members_of(&self, decl: DeclId) -> impl Iterator<Item = (MemberId, &Member)> {
        self.members_of(decl).filter(|(_, m)| !m.is_suppressed())
    }

    /// Bound base classes, nearest first. Stops at the first repeat, so a
    /// malformed cyclic chain still terminates.
    pub fn base_chain(&self, decl: DeclId) -> Vec<DeclId> {
        let mut chain = Vec::new();
        let mut current = self.decl(decl).as_class().and_then(|c| c.base);
        while let Some(base) = current {
            if base == decl || chain.contains(&base) || !self.contains_decl(base) {
                break;
            }
            chain.push(base);
            current = self.decl(base).as_class().and_then(|c| c.base);
        }
        chain
    }

    /// The class that carries the handle field for `class`: itself or the
    /// nearest base holding one.
    pub fn handle_owner(&self, class: DeclId) -> Option<DeclId> {
        std::iter::once(class)
            .chain(self.base_chain(class))
            .find(|&id| {
                self.decl(id)
                    .as_class()
                    .is_some_and(|c| c.handle_field.is_some())
            })
    }

    pub fn is_array_wrapper(&self, decl: DeclId) -> bool {
        matches!(self.decl(decl).kind, DeclKind::ArrayWrapper(_))
    }

    pub fn is_object_repr(&self, decl: DeclId) -> bool {
        matches!(self.decl(decl).kind, DeclKind::ObjectRepr(_))
    }

    pub fn is_proxy(&self, decl: DeclId) -> bool {
        self.decl(decl)
            .as_class()
            .is_some_and(|c| c.proxy_of.is_some())
    }

    /// The synthesized array wrapper keyed by `key`, if any.
    pub fn array_wrapper(&self, key: &str) -> Option<DeclId> {
        self.decls().find_map(|(id, d)| match &d.kind {
            DeclKind::ArrayWrapper(w) if w.key == key => Some(id),
            _ => None,
        })
    }

    /// The synthesized proxy class of an interface, if any.
    pub fn proxy_for(&self, iface: DeclId) -> Option<DeclId> {
        self.decls().find_map(|(id, d)| match &d.kind {
            DeclKind::Class(ClassDecl {
                proxy_of: Some(of), ..
            }) if *of == iface => Some(id),
            _ => None,
        })
    }

    /// The handle accessor of a proxy class.
    pub fn proxy_handle_accessor(&self, proxy: DeclId) -> Option<MemberId> {
        self.members_of(proxy)
            .find(|(_, m)| m.origin == crate::MemberOrigin::ProxyHandle)
            .map(|(id, _)| id)
    }

    /// Type names from the outermost enclosing type down to `decl`.
    pub fn nesting_chain(&self, decl: DeclId) -> Vec<&str> {
        let mut chain = vec![self.decl(decl).name.as_str()];
        let mut current = self.decl(decl).declaring_type;
        while let Some(outer) = current {
            if chain.len() > self.decls.len() {
                break;
            }
            chain.push(self.decl(outer).name.as_str());
            current = self.decl(outer).declaring_type;
        }
        chain.reverse();
        chain
    }

    /// The namespace of the outermost enclosing type.
    pub fn namespace_of(&self, decl: DeclId) -> &str {
        let mut current = decl;
        let mut steps = 0;
        while let Some(outer) = self.decl(current).declaring_type {
            steps += 1;
            if steps > self.decls.len() {
                break;
            }
            current = outer;
        }
        &self.decl(current).namespace
    }

    /// Dotted managed name, e.g. `NS.Outer.Inner`.
    pub fn qualified_name(&self, decl: DeclId) -> String {
        let ns = self.namespace_of(decl);
        let chain = self.nesting_chain(decl).join(".");
        if ns.is_empty() {
            chain
        } else {
            format!("{ns}.{chain}")
        }
    }

    /// `NS.Type::Member`, for diagnostics.
    pub fn member_path(&self, member: MemberId) -> String {
        let m = self.member(member);
        format!("{}::{}", self.qualified_name(m.declaring), m.declared_name)
    }

    /// Find a declared type by namespace and simple name.
    pub fn find_decl(&self, namespace: &str, name: &str) -> Option<DeclId> {
        self.decls()
            .find(|(_, d)| d.namespace == namespace && d.name == name)
            .map(|(id, _)| id)
    }

    // Mutation (loader and pipeline only)

    /// Add a declared type; it is appended to the emission order.
    pub fn add_decl(&mut self, decl: TypeDecl) -> DeclId {
        let id = self.push_decl(decl);
        self.order.push(id);
        id
    }

    /// Add a synthesized type to the arena. It is not emitted until a
    /// [`Model::splice`] places it.
    pub fn add_synthesized_decl(&mut self, decl: TypeDecl) -> DeclId {
        self.push_decl(decl)
    }

    fn push_decl(&mut self, decl: TypeDecl) -> DeclId {
        let id = decl_id(self.decls.len());
        self.decls.push(decl);
        id
    }

    /// Add a member and append it to its declaring type's member list.
    pub fn add_member(&mut self, member: Member) -> MemberId {
        let id = member_id(self.members.len());
        let owner = member.declaring;
        self.members.push(member);
        match &mut self.decls[owner.index()].kind {
            DeclKind::Class(class) => class.members.push(id),
            DeclKind::Interface(iface) => iface.members.push(id),
            DeclKind::Enum(_) | DeclKind::ArrayWrapper(_) | DeclKind::ObjectRepr(_) => {}
        }
        id
    }

    /// Add a member and place it right after `anchor` in the declaring
    /// type's member list; appended when `anchor` is not listed there.
    pub fn insert_member_after(&mut self, anchor: MemberId, member: Member) -> MemberId {
        let id = member_id(self.members.len());
        let owner = member.declaring;
        self.members.push(member);
        let list = match &mut self.decls[owner.index()].kind {
            DeclKind::Class(class) => &mut class.members,
            DeclKind::Interface(iface) => &mut iface.members,
            DeclKind::Enum(_) | DeclKind::ArrayWrapper(_) | DeclKind::ObjectRepr(_) => return id,
        };
        match list.iter().position(|&m| m == anchor) {
            Some(pos) => list.insert(pos + 1, id),
            None => list.push(id),
        }
        id
    }

    pub fn decl_mut(&mut self, id: DeclId) -> &mut TypeDecl {
        &mut self.decls[id.index()]
    }

    pub fn member_mut(&mut self, id: MemberId) -> &mut Member {
        &mut self.members[id.index()]
    }

    /// Assign the final emitted name of a member.
    pub fn rename_member(&mut self, id: MemberId, emitted: impl Into<String>) {
        self.members[id.index()].emitted_name = Some(emitted.into());
    }

    /// Exclude a member from emission. The member stays in the model so
    /// diagnostics can still name it. The first reason recorded wins.
    pub fn suppress_member(&mut self, id: MemberId, reason: Suppression) {
        let member = &mut self.members[id.index()];
        if member.suppressed.is_none() {
            member.suppressed = Some(reason);
        }
    }

    /// Place synthesized declarations in the emission order.
    ///
    /// Insertions anchored to the same declaration keep their relative
    /// order. Unanchored insertions, and insertions whose anchor is not in
    /// the order, are appended.
    pub fn splice(&mut self, insertions: &[Insertion]) {
        if insertions.is_empty() {
            return;
        }
        let mut anchored: FxHashMap<DeclId, Vec<DeclId>> = FxHashMap::default();
        let mut trailing = Vec::new();
        for ins in insertions {
            match ins.before {
                Some(anchor) if self.order.contains(&anchor) => {
                    anchored.entry(anchor).or_default().push(ins.decl);
                }
                _ => trailing.push(ins.decl),
            }
        }
        let mut order = Vec::with_capacity(self.order.len() + insertions.len());
        for &id in &self.order {
            if let Some(before) = anchored.remove(&id) {
                order.extend(before);
            }
            order.push(id);
        }
        order.extend(trailing);
        self.order = order;
    }

    /// End the mutation phase.
    pub fn freeze(self) -> FrozenModel {
        FrozenModel(self)
    }
}

/// A model after the pipeline has run. Only read access remains.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrozenModel(Model);

impl Deref for FrozenModel {
    type Target = Model;

    fn deref(&self) -> &Model {
        &self.0
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "arena sizes always fit u32"
)]
fn decl_id(index: usize) -> DeclId {
    DeclId::new(index as u32)
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "arena sizes always fit u32"
)]
fn member_id(index: usize) -> MemberId {
    MemberId::new(index as u32)
}
