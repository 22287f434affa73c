//! Convenience construction of models.
//!
//! Metadata loaders and tests describe types through `ModelBuilder` instead
//! of filling arena structs by hand. Tokens are assigned in metadata-table
//! order per table, the way a compiler would lay them out.

use crate::{
    Accessor, ClassDecl, ClassFlags, Constructor, DeclId, DeclKind, EnumDecl, EnumItem, Field,
    InterfaceDecl, Member, MemberId, MemberKind, Method, Model, Param, PrimitiveKind, Property,
    TypeDecl, TypeExpr,
};

const TYPEDEF_TABLE: u32 = 0x0200_0000;
const FIELD_TABLE: u32 = 0x0400_0000;
const METHOD_TABLE: u32 = 0x0600_0000;
const PROPERTY_TABLE: u32 = 0x1700_0000;

pub struct ModelBuilder {
    model: Model,
    next_type: u32,
    next_field: u32,
    next_method: u32,
    next_property: u32,
}

impl ModelBuilder {
    pub fn new(assembly: impl Into<String>) -> Self {
        ModelBuilder {
            model: Model::new(assembly),
            next_type: 1,
            next_field: 1,
            next_method: 1,
            next_property: 1,
        }
    }

    fn type_token(&mut self) -> u32 {
        let token = TYPEDEF_TABLE | self.next_type;
        self.next_type += 1;
        token
    }

    fn method_token(&mut self) -> u32 {
        let token = METHOD_TABLE | self.next_method;
        self.next_method += 1;
        token
    }

    fn add_type(&mut self, namespace: &str, name: &str, kind: DeclKind) -> DeclId {
        let mut decl = TypeDecl::new(namespace, name, kind);
        decl.token = self.type_token();
        self.model.add_decl(decl)
    }

    // Types

    pub fn class(&mut self, namespace: &str, name: &str) -> DeclId {
        self.class_with(namespace, name, ClassFlags::empty())
    }

    pub fn class_with(&mut self, namespace: &str, name: &str, flags: ClassFlags) -> DeclId {
        let class = ClassDecl {
            flags,
            ..ClassDecl::default()
        };
        self.add_type(namespace, name, DeclKind::Class(class))
    }

    pub fn value_type(&mut self, namespace: &str, name: &str) -> DeclId {
        self.class_with(namespace, name, ClassFlags::VALUE_TYPE | ClassFlags::SEALED)
    }

    pub fn static_class(&mut self, namespace: &str, name: &str) -> DeclId {
        self.class_with(
            namespace,
            name,
            ClassFlags::STATIC | ClassFlags::ABSTRACT | ClassFlags::SEALED,
        )
    }

    pub fn interface(&mut self, namespace: &str, name: &str) -> DeclId {
        self.add_type(namespace, name, DeclKind::Interface(InterfaceDecl::default()))
    }

    /// Add an enum. Items are `(name, explicit value)` pairs.
    pub fn enumeration(
        &mut self,
        namespace: &str,
        name: &str,
        backing: PrimitiveKind,
        items: &[(&str, Option<i128>)],
    ) -> DeclId {
        let decl = EnumDecl {
            backing,
            items: items
                .iter()
                .map(|&(item, value)| EnumItem::new(item, value))
                .collect(),
            is_flags: false,
        };
        self.add_type(namespace, name, DeclKind::Enum(decl))
    }

    /// Nest `inner` inside `outer`.
    pub fn nest(&mut self, inner: DeclId, outer: DeclId) {
        let decl = self.model.decl_mut(inner);
        decl.declaring_type = Some(outer);
        decl.namespace.clear();
    }

    pub fn set_base(&mut self, class: DeclId, base: DeclId) {
        if let Some(c) = self.model.decl_mut(class).as_class_mut() {
            c.base = Some(base);
        }
    }

    pub fn implement(&mut self, class: DeclId, iface: DeclId) {
        match &mut self.model.decl_mut(class).kind {
            DeclKind::Class(c) => c.interfaces.push(iface),
            DeclKind::Interface(i) => i.bases.push(iface),
            DeclKind::Enum(_) | DeclKind::ArrayWrapper(_) | DeclKind::ObjectRepr(_) => {}
        }
    }

    // Members

    fn add_member(&mut self, mut member: Member, token: u32) -> MemberId {
        member.token = token;
        self.model.add_member(member)
    }

    pub fn method(
        &mut self,
        owner: DeclId,
        name: &str,
        params: Vec<Param>,
        return_type: TypeExpr,
    ) -> MemberId {
        let is_abstract = self.model.decl(owner).is_interface();
        let kind = MemberKind::Method(Method {
            params: number(params),
            return_type,
            is_virtual: is_abstract,
            is_abstract,
        });
        let token = self.method_token();
        self.add_member(Member::new(owner, name, kind), token)
    }

    pub fn static_method(
        &mut self,
        owner: DeclId,
        name: &str,
        params: Vec<Param>,
        return_type: TypeExpr,
    ) -> MemberId {
        let id = self.method(owner, name, params, return_type);
        self.model.member_mut(id).is_static = true;
        id
    }

    pub fn virtual_method(
        &mut self,
        owner: DeclId,
        name: &str,
        params: Vec<Param>,
        return_type: TypeExpr,
    ) -> MemberId {
        let id = self.method(owner, name, params, return_type);
        if let MemberKind::Method(m) = &mut self.model.member_mut(id).kind {
            m.is_virtual = true;
        }
        id
    }

    pub fn constructor(&mut self, owner: DeclId, params: Vec<Param>) -> MemberId {
        let kind = MemberKind::Constructor(Constructor {
            params: number(params),
        });
        let token = self.method_token();
        self.add_member(Member::new(owner, ".ctor", kind), token)
    }

    /// Add a property with the given accessors.
    pub fn property(
        &mut self,
        owner: DeclId,
        name: &str,
        ty: TypeExpr,
        readable: bool,
        writable: bool,
    ) -> MemberId {
        let is_virtual = self.model.decl(owner).is_interface();
        let getter = readable.then(|| Accessor {
            token: self.method_token(),
            access: crate::Access::Public,
        });
        let setter = writable.then(|| Accessor {
            token: self.method_token(),
            access: crate::Access::Public,
        });
        let kind = MemberKind::Property(Property {
            ty,
            params: Vec::new(),
            getter,
            setter,
            is_virtual,
        });
        let token = PROPERTY_TABLE | self.next_property;
        self.next_property += 1;
        self.add_member(Member::new(owner, name, kind), token)
    }

    pub fn static_property(
        &mut self,
        owner: DeclId,
        name: &str,
        ty: TypeExpr,
        readable: bool,
        writable: bool,
    ) -> MemberId {
        let id = self.property(owner, name, ty, readable, writable);
        self.model.member_mut(id).is_static = true;
        id
    }

    pub fn field(&mut self, owner: DeclId, name: &str, ty: TypeExpr) -> MemberId {
        let kind = MemberKind::Field(Field {
            ty,
            is_readonly: false,
            is_literal: false,
        });
        let token = FIELD_TABLE | self.next_field;
        self.next_field += 1;
        self.add_member(Member::new(owner, name, kind), token)
    }

    pub fn static_field(&mut self, owner: DeclId, name: &str, ty: TypeExpr) -> MemberId {
        let id = self.field(owner, name, ty);
        self.model.member_mut(id).is_static = true;
        id
    }

    /// Direct access for adjustments the helpers do not cover.
    pub fn member_mut(&mut self, id: MemberId) -> &mut Member {
        self.model.member_mut(id)
    }

    pub fn decl_mut(&mut self, id: DeclId) -> &mut TypeDecl {
        self.model.decl_mut(id)
    }

    pub fn build(self) -> Model {
        self.model
    }
}

/// Assign ordinal positions in list order.
fn number(params: Vec<Param>) -> Vec<Param> {
    params
        .into_iter()
        .zip(0u32..)
        .map(|(mut p, position)| {
            p.position = position;
            p
        })
        .collect()
}
