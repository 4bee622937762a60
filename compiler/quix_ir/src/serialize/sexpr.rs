//! Textual s-expression form.
//!
//! Output has two parts. The preamble binds every aggregate definition and
//! aggregate type in the tree to an alias `%N`, one line each, deduplicated
//! by content hash. The body then prints the tree, referring to those nodes
//! by alias.
//!
//! Empty slots print `{?}`. A node reached a second time prints `{...}`.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use quix_stack::ensure_sufficient_stack;

use crate::hash::hash_subtree;
use crate::node::decl::{CompositeDef, Visibility};
use crate::node::expr::{CallArg, FStringPart};
use crate::node::stmt::AsmOperand;
use crate::{Name, NodeArena, NodeData, NodeFlags, NodeId, NodeKind, StringLookup};

/// Layout knobs for [`to_sexpr`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SexprOptions {
    /// Single line, no indentation.
    pub minify: bool,
    /// Spaces per nesting level.
    pub indent: usize,
}

impl Default for SexprOptions {
    fn default() -> Self {
        SexprOptions {
            minify: false,
            indent: 2,
        }
    }
}

/// Render the tree under `root`.
pub fn to_sexpr(
    arena: &NodeArena,
    strings: &dyn StringLookup,
    root: NodeId,
    options: SexprOptions,
) -> String {
    let mut writer = Writer {
        arena,
        strings,
        options,
        out: String::new(),
        depth: 0,
        aliases: FxHashMap::default(),
        defs: Vec::new(),
        visited: FxHashSet::default(),
        defining: None,
    };
    writer.collect_aliases(root);
    writer.preamble();
    writer.node(root);
    writer.out
}

fn is_hoisted(kind: NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::Struct
            | NodeKind::Region
            | NodeKind::Group
            | NodeKind::Union
            | NodeKind::Enum
            | NodeKind::StructTy
            | NodeKind::GroupTy
            | NodeKind::RegionTy
            | NodeKind::UnionTy
    )
}

/// Quote and escape `text`.
pub fn escape_string(text: &str) -> String {
    escape_with(text, '"')
}

fn escape_with(text: &str, quote: char) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push(quote);
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_ascii() && !c.is_ascii_control() => out.push(c),
            c if c.is_ascii() => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Positional arguments are named `__<index>`.
fn is_positional(name: &str) -> bool {
    name.strip_prefix("__")
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
}

struct Writer<'a> {
    arena: &'a NodeArena,
    strings: &'a dyn StringLookup,
    options: SexprOptions,
    out: String,
    depth: usize,
    aliases: FxHashMap<NodeId, usize>,
    defs: Vec<NodeId>,
    visited: FxHashSet<NodeId>,
    defining: Option<NodeId>,
}

impl Writer<'_> {
    fn collect_aliases(&mut self, root: NodeId) {
        let mut by_hash: FxHashMap<u64, usize> = FxHashMap::default();
        let mut seen = FxHashSet::default();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if !id.is_valid() || !seen.insert(id) {
                continue;
            }
            if is_hoisted(self.arena.kind(id)) {
                let hash = hash_subtree(self.arena, self.strings, id);
                let alias = *by_hash.entry(hash).or_insert_with(|| {
                    self.defs.push(id);
                    self.defs.len() - 1
                });
                self.aliases.insert(id, alias);
            }
            stack.extend(self.arena.get(id).slots().into_iter().rev());
        }
    }

    fn preamble(&mut self) {
        if self.defs.is_empty() {
            return;
        }
        for (alias, id) in self.defs.clone().into_iter().enumerate() {
            self.out.push_str(&format!("%{alias} = "));
            self.defining = Some(id);
            self.visited.clear();
            self.node(id);
            self.out.push('\n');
        }
        self.defining = None;
        self.visited.clear();
        self.out.push('\n');
    }

    fn text(&self, name: Name) -> Arc<str> {
        self.strings.lookup(name)
    }

    fn push(&mut self, s: &str) {
        self.out.push_str(s);
    }

    fn push_name(&mut self, name: Name) {
        let text = self.text(name);
        self.out.push_str(&text);
    }

    fn push_quoted(&mut self, name: Name) {
        let text = escape_string(&self.text(name));
        self.out.push_str(&text);
    }

    fn newline(&mut self) {
        if self.options.minify {
            return;
        }
        self.out.push('\n');
        let width = self.depth * self.options.indent;
        self.out.push_str(&" ".repeat(width));
    }

    fn node(&mut self, id: NodeId) {
        if !id.is_valid() {
            self.push("{?}");
            return;
        }
        if let Some(&alias) = self.aliases.get(&id) {
            if self.defining != Some(id) {
                self.push(&format!("%{alias}"));
                return;
            }
        }
        if !self.visited.insert(id) {
            self.push("{...}");
            return;
        }

        let flags = self.arena.flags(id);
        if flags.contains(NodeFlags::CONST) {
            self.push("const ");
        }
        if flags.contains(NodeFlags::VOLATILE) {
            self.push("volatile ");
        }
        if flags.contains(NodeFlags::UNSAFE) {
            self.push("unsafe ");
        }

        ensure_sufficient_stack(|| self.payload(id));
    }

    /// `open item, item close`, one item per line unless minified.
    fn block<I>(&mut self, open: &str, items: I, close: &str)
    where
        I: IntoIterator<Item = NodeId>,
    {
        self.push(open);
        let items: Vec<NodeId> = items.into_iter().collect();
        if items.is_empty() {
            self.push(close);
            return;
        }
        self.depth += 1;
        let last = items.len() - 1;
        for (i, item) in items.into_iter().enumerate() {
            self.newline();
            self.node(item);
            if i != last {
                self.push(",");
            }
        }
        self.depth -= 1;
        self.newline();
        self.push(close);
    }

    /// Comma-separated inline list.
    fn inline_list(&mut self, items: &[NodeId]) {
        for (i, &item) in items.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.node(item);
        }
    }

    fn args(&mut self, args: &[CallArg]) {
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            let name = self.text(arg.name);
            if !is_positional(&name) {
                self.push(&name);
                self.push(": ");
            }
            self.node(arg.value);
        }
    }

    fn operands(&mut self, ops: &[AsmOperand]) {
        self.push("{");
        for (i, op) in ops.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.push_quoted(op.constraint);
            self.push(": ");
            self.node(op.value);
        }
        self.push("}");
    }

    fn visibility(&mut self, vis: Visibility) {
        self.push(vis.as_str());
        self.push(" ");
    }

    fn composite(&mut self, keyword: &str, def: &CompositeDef) {
        self.visibility(def.visibility);
        self.push(keyword);
        self.push(" ");
        self.push_name(def.name);
        if !def.tags.is_empty() {
            self.push(" impl [");
            for (i, &tag) in def.tags.iter().enumerate() {
                if i > 0 {
                    self.push(", ");
                }
                self.push_name(tag);
            }
            self.push("]");
        }
        self.push(" ");
        self.push("{");
        self.depth += 1;
        for &id in def.fields.iter().chain(&def.methods) {
            self.newline();
            self.node(id);
            self.push(",");
        }
        for &id in &def.static_methods {
            self.newline();
            self.push("static ");
            self.node(id);
            self.push(",");
        }
        self.depth -= 1;
        self.newline();
        self.push("}");
    }

    fn payload(&mut self, id: NodeId) {
        let arena = self.arena;
        match arena.get(id) {
            NodeData::Binary(b) => {
                self.push("(");
                self.node(b.lhs);
                self.push(&format!(" {} ", b.op));
                self.node(b.rhs);
                self.push(")");
            }
            NodeData::Unary(u) => {
                self.push(&format!("({}(", u.op));
                self.node(u.rhs);
                self.push("))");
            }
            NodeData::PostUnary(u) => {
                self.push("(");
                self.node(u.lhs);
                self.push(&format!("{})", u.op));
            }
            NodeData::Ternary(t) => {
                self.push("(");
                self.node(t.cond);
                self.push(" ? ");
                self.node(t.lhs);
                self.push(" : ");
                self.node(t.rhs);
                self.push(")");
            }
            NodeData::Int(l) | NodeData::Float(l) => self.push_name(l.value),
            NodeData::Str(l) => self.push_quoted(l.value),
            NodeData::Char(c) => {
                let text = escape_with(&c.to_string(), '\'');
                self.push(&text);
            }
            NodeData::Bool(b) => self.push(if *b { "true" } else { "false" }),
            NodeData::Null => self.push("null"),
            NodeData::Undef => self.push("undef"),
            NodeData::Call(c) => {
                self.node(c.func);
                self.push("(");
                self.args(&c.args);
                self.push(")");
            }
            NodeData::TemplCall(c) => {
                self.node(c.func);
                self.push("<");
                self.args(&c.template_args);
                self.push(">(");
                self.args(&c.args);
                self.push(")");
            }
            NodeData::List(l) => {
                self.push("[");
                self.inline_list(&l.items);
                self.push("]");
            }
            NodeData::Assoc(a) => {
                self.push("{");
                self.node(a.key);
                self.push(": ");
                self.node(a.value);
                self.push("}");
            }
            NodeData::Field(f) => {
                self.node(f.base);
                self.push(".");
                self.push_name(f.field);
            }
            NodeData::Index(i) => {
                self.node(i.base);
                self.push("[");
                self.node(i.index);
                self.push("]");
            }
            NodeData::Slice(s) => {
                self.node(s.base);
                self.push("[");
                self.node(s.start);
                self.push(":");
                self.node(s.end);
                self.push("]");
            }
            NodeData::FString(f) => {
                self.push("fstring [");
                for (i, part) in f.parts.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    match *part {
                        FStringPart::Text(text) => self.push_quoted(text),
                        FStringPart::Expr(expr) => self.node(expr),
                    }
                }
                self.push("]");
            }
            NodeData::Ident(n) | NodeData::UnresTy(n) => self.push_name(n.name),
            NodeData::SeqPoint(l) => {
                self.push("(");
                self.inline_list(&l.items);
                self.push(")");
            }
            NodeData::StmtExpr(w) => {
                self.push("stmt(");
                self.node(w.inner);
                self.push(")");
            }
            NodeData::TypeExpr(w) => {
                self.push("type(");
                self.node(w.inner);
                self.push(")");
            }

            NodeData::MutTy(t) => {
                self.push("!");
                self.node(t.item);
            }
            NodeData::U1 => self.push("u1"),
            NodeData::U8 => self.push("u8"),
            NodeData::U16 => self.push("u16"),
            NodeData::U32 => self.push("u32"),
            NodeData::U64 => self.push("u64"),
            NodeData::U128 => self.push("u128"),
            NodeData::I8 => self.push("i8"),
            NodeData::I16 => self.push("i16"),
            NodeData::I32 => self.push("i32"),
            NodeData::I64 => self.push("i64"),
            NodeData::I128 => self.push("i128"),
            NodeData::F32 => self.push("f32"),
            NodeData::F64 => self.push("f64"),
            NodeData::VoidTy => self.push("void"),
            NodeData::StringTy => self.push("string"),
            NodeData::PtrTy(t) => {
                self.push("*");
                self.node(t.item);
            }
            NodeData::OpaqueTy(n) => {
                self.push("opaque(");
                self.push_name(n.name);
                self.push(")");
            }
            NodeData::EnumTy(e) => {
                self.push("enum ");
                self.push_name(e.name);
                self.push(": ");
                self.node(e.member);
            }
            NodeData::StructTy(s) => {
                self.push("struct {");
                for (i, field) in s.fields.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.push_name(field.name);
                    self.push(": ");
                    self.node(field.ty);
                }
                self.push("}");
            }
            NodeData::GroupTy(l) => {
                self.push("group {");
                self.inline_list(&l.items);
                self.push("}");
            }
            NodeData::RegionTy(l) => {
                self.push("region {");
                self.inline_list(&l.items);
                self.push("}");
            }
            NodeData::UnionTy(l) => {
                self.push("union {");
                self.inline_list(&l.items);
                self.push("}");
            }
            NodeData::ArrayTy(a) => {
                self.push("[");
                self.node(a.item);
                self.push("; ");
                self.node(a.size);
                self.push("]");
            }
            NodeData::VectorTy(t) => {
                self.push("[");
                self.node(t.item);
                self.push("]");
            }
            NodeData::MapTy(m) => {
                self.push("[");
                self.node(m.key);
                self.push(" -> ");
                self.node(m.value);
                self.push("]");
            }
            NodeData::TupleTy(l) => {
                self.push("(");
                self.inline_list(&l.items);
                self.push(")");
            }
            NodeData::SetTy(t) => {
                self.push("{");
                self.node(t.item);
                self.push("}");
            }
            NodeData::OptionalTy(t) => {
                self.node(t.item);
                self.push("?");
            }
            NodeData::FnTy(f) => {
                self.push("fn ");
                if f.props.purity.is_thread_safe() {
                    self.push(f.props.purity.as_str());
                    self.push(" ");
                }
                for (flag, word) in [
                    (f.props.foreign, "foreign "),
                    (f.props.noexcept, "noexcept "),
                    (f.props.inline, "inline "),
                    (f.props.crashpoint, "crashpoint "),
                ] {
                    if flag {
                        self.push(word);
                    }
                }
                self.push("(");
                for (i, param) in f.params.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.push_name(param.name);
                    self.push(": ");
                    self.node(param.ty);
                    if param.default.is_valid() {
                        self.push(" = ");
                        self.node(param.default);
                    }
                }
                if f.props.variadic {
                    self.push(if f.params.is_empty() { "..." } else { ", ..." });
                }
                self.push("): ");
                self.node(f.ret);
            }

            NodeData::Typedef(t) => {
                self.push("type ");
                self.push_name(t.name);
                self.push(" = ");
                self.node(t.ty);
            }
            NodeData::FnDecl(f) => {
                self.visibility(f.visibility);
                self.push("decl ");
                self.push_name(f.name);
                self.push(" ");
                self.node(f.ty);
            }
            NodeData::Fn(f) => {
                self.visibility(f.visibility);
                self.push("def ");
                self.push_name(f.name);
                if !f.captures.is_empty() {
                    self.push(" [");
                    for (i, cap) in f.captures.iter().enumerate() {
                        if i > 0 {
                            self.push(", ");
                        }
                        if cap.by_ref {
                            self.push("&");
                        }
                        self.push_name(cap.name);
                    }
                    self.push("]");
                }
                self.push(" ");
                self.node(f.ty);
                if f.precond.is_valid() || f.postcond.is_valid() {
                    self.push(" req(");
                    self.node(f.precond);
                    self.push(", ");
                    self.node(f.postcond);
                    self.push(")");
                }
                self.push(" ");
                self.node(f.body);
            }
            NodeData::Struct(c) => self.composite("struct", c),
            NodeData::Region(c) => self.composite("region", c),
            NodeData::Group(c) => self.composite("group", c),
            NodeData::Union(c) => self.composite("union", c),
            NodeData::Enum(e) => {
                self.push("enum ");
                self.push_name(e.name);
                self.push(": ");
                self.node(e.member);
                self.push(" {");
                for (i, item) in e.items.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.push_name(item.name);
                    if item.value.is_valid() {
                        self.push(" = ");
                        self.node(item.value);
                    }
                }
                self.push("}");
            }
            NodeData::Subsystem(s) => {
                self.push("subsystem ");
                self.push_name(s.name);
                if !s.deps.is_empty() {
                    self.push(": [");
                    for (i, &dep) in s.deps.iter().enumerate() {
                        if i > 0 {
                            self.push(", ");
                        }
                        self.push_name(dep);
                    }
                    self.push("]");
                }
                self.push(" ");
                self.node(s.body);
            }
            NodeData::Export(e) => {
                self.push("extern ");
                self.push_quoted(e.abi);
                self.push(" ");
                self.node(e.body);
            }
            NodeData::CompositeField(f) => {
                self.visibility(f.visibility);
                self.push_name(f.name);
                self.push(": ");
                self.node(f.ty);
                if f.value.is_valid() {
                    self.push(" = ");
                    self.node(f.value);
                }
            }

            NodeData::Block(l) => self.block("seq {", l.items.iter().copied(), "}"),
            NodeData::Const(l) | NodeData::Var(l) | NodeData::Let(l) => {
                let keyword = match arena.kind(id) {
                    NodeKind::Const => "const ",
                    NodeKind::Var => "var ",
                    _ => "let ",
                };
                self.push(keyword);
                self.push_name(l.name);
                if l.ty.is_valid() {
                    self.push(": ");
                    self.node(l.ty);
                }
                if l.value.is_valid() {
                    self.push(" = ");
                    self.node(l.value);
                }
            }
            NodeData::InlineAsm(a) => {
                self.push("asm(");
                self.push_quoted(a.code);
                self.push(", ");
                self.operands(&a.outputs);
                self.push(", ");
                self.operands(&a.inputs);
                self.push(", [");
                for (i, &clobber) in a.clobbers.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.push_quoted(clobber);
                }
                self.push("])");
            }
            NodeData::Return(r) => {
                self.push("ret");
                if r.value.is_valid() {
                    self.push(" ");
                    self.node(r.value);
                }
            }
            NodeData::RetIf(r) | NodeData::RetZ(r) => {
                let keyword = if arena.kind(id) == NodeKind::RetIf {
                    "retif "
                } else {
                    "retz "
                };
                self.push(keyword);
                self.node(r.value);
                self.push(", ");
                self.node(r.cond);
            }
            NodeData::RetV(r) => {
                self.push("retv ");
                self.node(r.cond);
            }
            NodeData::Break => self.push("brk"),
            NodeData::Continue => self.push("cont"),
            NodeData::If(i) => {
                self.push("if (");
                self.node(i.cond);
                self.push(") then ");
                self.node(i.then);
                self.push(" else ");
                self.node(i.otherwise);
            }
            NodeData::While(w) => {
                self.push("while (");
                self.node(w.cond);
                self.push(") ");
                self.node(w.body);
            }
            NodeData::For(f) => {
                self.push("for (");
                self.node(f.init);
                self.push("; ");
                self.node(f.cond);
                self.push("; ");
                self.node(f.step);
                self.push(") ");
                self.node(f.body);
            }
            NodeData::Form(f) => {
                self.push("form (");
                self.node(f.max_jobs);
                self.push(") (");
                self.push_name(f.index);
                self.push("; ");
                self.push_name(f.value);
                self.push("; ");
                self.node(f.iter);
                self.push(") ");
                self.node(f.body);
            }
            NodeData::Foreach(f) => {
                self.push("foreach (");
                self.push_name(f.index);
                self.push("; ");
                self.push_name(f.value);
                self.push("; ");
                self.node(f.iter);
                self.push(") ");
                self.node(f.body);
            }
            NodeData::Case(c) => {
                self.push("case ");
                self.node(c.cond);
                self.push(": ");
                self.node(c.body);
            }
            NodeData::Switch(s) => {
                self.push("switch (");
                self.node(s.cond);
                self.push(") {");
                self.depth += 1;
                for &case in &s.cases {
                    self.newline();
                    self.node(case);
                    self.push(",");
                }
                if s.default.is_valid() {
                    self.newline();
                    self.push("default: ");
                    self.node(s.default);
                }
                self.depth -= 1;
                self.newline();
                self.push("}");
            }
            NodeData::ExprStmt(w) => self.node(w.inner),
            NodeData::VolStmt(w) => {
                self.push("volatile ");
                self.node(w.inner);
            }
        }
    }
}
