//! Compact tree rendering for parser tests.
//!
//! Operators print as their symbol, `(+ a (* b c))`. Leaves print as their
//! text, empty slots as `_`. Every other node prints as `(Kind children..)`,
//! with `Kind:name` for nodes that carry a name.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fmt::Write;
use std::io;

use quix_diagnostic::Ticket;
use quix_ir::node::expr::FStringPart;
use quix_ir::{Name, NodeArena, NodeData, NodeId, StringLookup};

use crate::Module;

pub(crate) type TextModule = Module<io::Cursor<Vec<u8>>>;

/// Parse `text`, keeping whatever was recovered.
pub(crate) fn parse(text: &str) -> TextModule {
    let mut module = Module::from_text(text, "test.q");
    let _ = module.parse();
    module
}

/// Each top-level statement of `text`, rendered. Fails the test on any
/// diagnostic.
pub(crate) fn stmts(text: &str) -> Vec<String> {
    let module = parse(text);
    assert_eq!(errors(&module), Vec::<String>::new(), "source: {text}");
    top_level(&module)
}

/// The single expression statement in `text`, rendered.
pub(crate) fn expr(text: &str) -> String {
    let out = stmts(&format!("{text};"));
    assert_eq!(out.len(), 1);
    let inner = out[0]
        .strip_prefix("(ExprStmt ")
        .and_then(|s| s.strip_suffix(')'))
        .unwrap();
    inner.to_string()
}

pub(crate) fn top_level(module: &TextModule) -> Vec<String> {
    let root = module.root().unwrap();
    let NodeData::Block(block) = module.arena().get(root) else {
        panic!("root is not a block");
    };
    block.items.iter().map(|&id| tree(module, id)).collect()
}

/// Diagnostic subjects, in push order.
pub(crate) fn errors(module: &TextModule) -> Vec<String> {
    module
        .diagnostics()
        .messages(Ticket::ALL)
        .iter()
        .map(|m| m.subject.clone())
        .collect()
}

pub(crate) fn tree(module: &TextModule, id: NodeId) -> String {
    let mut out = String::new();
    Render {
        arena: module.arena(),
        strings: module.strings(),
        out: &mut out,
    }
    .node(id);
    out
}

struct Render<'a> {
    arena: &'a NodeArena,
    strings: &'a dyn StringLookup,
    out: &'a mut String,
}

impl Render<'_> {
    fn text(&self, name: Name) -> String {
        self.strings.lookup(name).to_string()
    }

    fn node(&mut self, id: NodeId) {
        if !id.is_valid() {
            self.out.push('_');
            return;
        }
        let data = self.arena.get(id);
        let leaf = match data {
            NodeData::Int(l) | NodeData::Float(l) => Some(self.text(l.value)),
            NodeData::Str(l) => Some(format!("{:?}", self.text(l.value))),
            NodeData::Char(c) => Some(format!("{c:?}")),
            NodeData::Bool(b) => Some(b.to_string()),
            NodeData::Null => Some("null".to_string()),
            NodeData::Undef => Some("undef".to_string()),
            NodeData::Ident(n) | NodeData::UnresTy(n) => Some(self.text(n.name)),
            NodeData::U1 => Some("u1".to_string()),
            NodeData::U8 => Some("u8".to_string()),
            NodeData::U16 => Some("u16".to_string()),
            NodeData::U32 => Some("u32".to_string()),
            NodeData::U64 => Some("u64".to_string()),
            NodeData::U128 => Some("u128".to_string()),
            NodeData::I8 => Some("i8".to_string()),
            NodeData::I16 => Some("i16".to_string()),
            NodeData::I32 => Some("i32".to_string()),
            NodeData::I64 => Some("i64".to_string()),
            NodeData::I128 => Some("i128".to_string()),
            NodeData::F32 => Some("f32".to_string()),
            NodeData::F64 => Some("f64".to_string()),
            NodeData::VoidTy => Some("void".to_string()),
            NodeData::StringTy => Some("string".to_string()),
            _ => None,
        };
        if let Some(leaf) = leaf {
            self.out.push_str(&leaf);
            return;
        }

        let data = data.clone();
        self.out.push('(');
        match &data {
            NodeData::Binary(b) => {
                write!(self.out, "{} ", b.op).unwrap();
                self.node(b.lhs);
                self.out.push(' ');
                self.node(b.rhs);
            }
            NodeData::Unary(u) => {
                write!(self.out, "{} ", u.op).unwrap();
                self.node(u.rhs);
            }
            NodeData::PostUnary(u) => {
                write!(self.out, "post{} ", u.op).unwrap();
                self.node(u.lhs);
            }
            NodeData::Call(c) => {
                self.out.push_str("call ");
                self.node(c.func);
                for arg in &c.args {
                    write!(self.out, " {}=", self.text(arg.name)).unwrap();
                    self.node(arg.value);
                }
            }
            NodeData::Field(f) => {
                self.out.push_str(". ");
                self.node(f.base);
                write!(self.out, " {}", self.text(f.field)).unwrap();
            }
            NodeData::FString(f) => {
                self.out.push_str("FString");
                for part in &f.parts {
                    self.out.push(' ');
                    match *part {
                        FStringPart::Text(t) => write!(self.out, "{:?}", self.text(t)).unwrap(),
                        FStringPart::Expr(e) => self.node(e),
                    }
                }
            }
            NodeData::FnTy(f) => {
                self.out.push_str("FnTy");
                for param in &f.params {
                    write!(self.out, " {}:", self.text(param.name)).unwrap();
                    self.node(param.ty);
                    if param.default.is_valid() {
                        self.out.push('=');
                        self.node(param.default);
                    }
                }
                if f.props.variadic {
                    self.out.push_str(" ...");
                }
                self.out.push_str(" -> ");
                self.node(f.ret);
            }
            NodeData::InlineAsm(a) => {
                write!(self.out, "InlineAsm {:?}", self.text(a.code)).unwrap();
                for op in a.outputs.iter().chain(&a.inputs) {
                    write!(self.out, " {}=", self.text(op.constraint)).unwrap();
                    self.node(op.value);
                }
                for clobber in &a.clobbers {
                    write!(self.out, " {:?}", self.text(*clobber)).unwrap();
                }
            }
            other => {
                self.out.push_str(other.kind().name());
                if let Some(label) = self.label(other) {
                    write!(self.out, ":{label}").unwrap();
                }
                for slot in other.slots() {
                    self.out.push(' ');
                    self.node(slot);
                }
            }
        }
        self.out.push(')');
    }

    fn label(&self, data: &NodeData) -> Option<String> {
        let name = match data {
            NodeData::Let(l) | NodeData::Var(l) | NodeData::Const(l) => l.name,
            NodeData::Typedef(t) => t.name,
            NodeData::FnDecl(f) => f.name,
            NodeData::Fn(f) => f.name,
            NodeData::Struct(c) | NodeData::Region(c) | NodeData::Group(c) | NodeData::Union(c) => {
                c.name
            }
            NodeData::CompositeField(f) => f.name,
            NodeData::Enum(e) => e.name,
            NodeData::Subsystem(s) => s.name,
            NodeData::Export(e) => e.abi,
            NodeData::OpaqueTy(n) => n.name,
            NodeData::Foreach(f) => {
                return Some(format!("{},{}", self.text(f.index), self.text(f.value)));
            }
            NodeData::Form(f) => {
                return Some(format!("{},{}", self.text(f.index), self.text(f.value)));
            }
            _ => return None,
        };
        Some(self.text(name)).filter(|s| !s.is_empty())
    }
}
