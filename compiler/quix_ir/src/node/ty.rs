//! Type constructor payloads.

use serde::{Deserialize, Serialize};

use crate::{Name, NodeId};

/// Single element type: `*T`, `!T`, `[T]`, `{T}`, `T?`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemTy {
    pub item: NodeId,
}

/// `[T; size]`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrayTy {
    pub item: NodeId,
    pub size: NodeId,
}

/// `[K -> V]`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapTy {
    pub key: NodeId,
    pub value: NodeId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumTy {
    pub name: Name,
    pub member: NodeId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructTyField {
    pub name: Name,
    pub ty: NodeId,
}

#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StructTy {
    pub fields: Vec<StructTyField>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Purity {
    #[default]
    ImpureThreadUnsafe,
    ImpureThreadSafe,
    Pure,
    Quasipure,
    Retropure,
}

impl Purity {
    pub fn as_str(self) -> &'static str {
        match self {
            Purity::ImpureThreadUnsafe => "impure",
            Purity::ImpureThreadSafe => "impure_tsafe",
            Purity::Pure => "pure",
            Purity::Quasipure => "quasipure",
            Purity::Retropure => "retropure",
        }
    }

    pub fn is_thread_safe(self) -> bool {
        !matches!(self, Purity::ImpureThreadUnsafe)
    }
}

/// Function properties gathered from the keywords after `fn`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FnProps {
    pub purity: Purity,
    pub variadic: bool,
    pub foreign: bool,
    pub crashpoint: bool,
    pub noexcept: bool,
    pub noreturn: bool,
    pub inline: bool,
}

/// `name: ty [= default]`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FnParam {
    pub name: Name,
    pub ty: NodeId,
    pub default: NodeId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FnTy {
    pub params: Vec<FnParam>,
    pub ret: NodeId,
    pub props: FnProps,
}
