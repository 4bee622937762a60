//! Expression payloads.

use serde::{Deserialize, Serialize};

use crate::{Name, NodeId, Operator};

/// `lhs op rhs`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binary {
    pub op: Operator,
    pub lhs: NodeId,
    pub rhs: NodeId,
}

/// `op rhs`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unary {
    pub op: Operator,
    pub rhs: NodeId,
}

/// `lhs op`, for `++` and `--`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostUnary {
    pub op: Operator,
    pub lhs: NodeId,
}

/// `cond ? lhs : rhs`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ternary {
    pub cond: NodeId,
    pub lhs: NodeId,
    pub rhs: NodeId,
}

/// Integer, float or string literal text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Literal {
    pub value: Name,
}

/// One call argument. Positional arguments are named `__0`, `__1`, ...
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallArg {
    pub name: Name,
    pub value: NodeId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    pub func: NodeId,
    pub args: Vec<CallArg>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplCall {
    pub func: NodeId,
    pub template_args: Vec<CallArg>,
    pub args: Vec<CallArg>,
}

/// Ordered node list: list literals, sequence points, blocks and
/// positional aggregate types.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct List {
    pub items: Vec<NodeId>,
}

/// `key: value` inside `{...}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assoc {
    pub key: NodeId,
    pub value: NodeId,
}

/// `base.field`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub base: NodeId,
    pub field: Name,
}

/// `base[index]`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    pub base: NodeId,
    pub index: NodeId,
}

/// `base[start:end]`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slice {
    pub base: NodeId,
    pub start: NodeId,
    pub end: NodeId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FStringPart {
    Text(Name),
    Expr(NodeId),
}

#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FString {
    pub parts: Vec<FStringPart>,
}

/// Named reference: identifiers, opaque and unresolved type names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Named {
    pub name: Name,
}

/// Single-slot wrapper: expression statements, `volatile` statements,
/// statement-as-expression and type-as-expression.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wrap {
    pub inner: NodeId,
}
