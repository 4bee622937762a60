//! Statement payloads.

use serde::{Deserialize, Serialize};

use crate::{Name, NodeId};

/// `let`, `var` and `const`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Local {
    pub name: Name,
    pub ty: NodeId,
    pub value: NodeId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsmOperand {
    pub constraint: Name,
    pub value: NodeId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineAsm {
    pub code: Name,
    pub outputs: Vec<AsmOperand>,
    pub inputs: Vec<AsmOperand>,
    pub clobbers: Vec<Name>,
}

/// `ret [value];`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Return {
    pub value: NodeId,
}

/// `retif value, cond;` and `retz value, cond;`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CondReturn {
    pub cond: NodeId,
    pub value: NodeId,
}

/// `retv cond;`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetV {
    pub cond: NodeId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct If {
    pub cond: NodeId,
    pub then: NodeId,
    pub otherwise: NodeId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct While {
    pub cond: NodeId,
    pub body: NodeId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct For {
    pub init: NodeId,
    pub cond: NodeId,
    pub step: NodeId,
    pub body: NodeId,
}

/// `form (max_jobs) (index, value in iter) body`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Form {
    pub index: Name,
    pub value: Name,
    pub iter: NodeId,
    pub max_jobs: NodeId,
    pub body: NodeId,
}

/// `foreach (index, value in iter) body`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Foreach {
    pub index: Name,
    pub value: Name,
    pub iter: NodeId,
    pub body: NodeId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
    pub cond: NodeId,
    pub body: NodeId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Switch {
    pub cond: NodeId,
    pub cases: Vec<NodeId>,
    pub default: NodeId,
}
