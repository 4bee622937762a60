//! Declaration payloads.

use serde::{Deserialize, Serialize};

use crate::{Name, NodeId};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    #[default]
    Private,
    Protected,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Public => "pub",
            Visibility::Private => "sec",
            Visibility::Protected => "pro",
        }
    }
}

/// `type name = ty;`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Typedef {
    pub name: Name,
    pub ty: NodeId,
}

/// Prototype without a body. `ty` is an `FnTy`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FnDecl {
    pub name: Name,
    pub ty: NodeId,
    pub visibility: Visibility,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capture {
    pub name: Name,
    pub by_ref: bool,
}

/// Function definition with optional `req { in ...; out ...; }` contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FnDef {
    pub name: Name,
    pub ty: NodeId,
    pub visibility: Visibility,
    pub captures: Vec<Capture>,
    pub body: NodeId,
    pub precond: NodeId,
    pub postcond: NodeId,
}

/// Body of `struct`, `region`, `group` and `union` definitions.
///
/// `fields` hold `CompositeField` nodes; both method lists hold `Fn` or
/// `FnDecl` nodes. `tags` is the sorted `impl [...]` list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeDef {
    pub name: Name,
    pub visibility: Visibility,
    pub fields: Vec<NodeId>,
    pub methods: Vec<NodeId>,
    pub static_methods: Vec<NodeId>,
    pub tags: Vec<Name>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeField {
    pub name: Name,
    pub ty: NodeId,
    pub value: NodeId,
    pub visibility: Visibility,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumItem {
    pub name: Name,
    pub value: NodeId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDef {
    pub name: Name,
    pub member: NodeId,
    pub items: Vec<EnumItem>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subsystem {
    pub name: Name,
    pub body: NodeId,
    pub deps: Vec<Name>,
    pub tags: Vec<Name>,
}

/// `pub "abi" { ... }`. An empty `abi` means the default ABI.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Export {
    pub abi: Name,
    pub body: NodeId,
}
