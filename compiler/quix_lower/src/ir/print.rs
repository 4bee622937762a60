//! One-line s-expression form of lowered IR.

use quix_ir::serialize::escape_string;
use quix_ir::{Name, StringLookup};
use quix_stack::ensure_sufficient_stack;
use rustc_hash::FxHashSet;

use super::{IrArena, IrArg, IrFlags, IrId, IrKind, IrParam};

/// Render the subtree under `root`.
///
/// Absent optional parts print `_`, ids outside the arena print `{?}` and
/// a node reached again below itself prints `{...}`.
pub fn render(arena: &IrArena, strings: &dyn StringLookup, root: IrId) -> String {
    let mut printer = Printer {
        arena,
        strings,
        out: String::new(),
        path: FxHashSet::default(),
    };
    printer.node(root);
    printer.out
}

struct Printer<'a> {
    arena: &'a IrArena,
    strings: &'a dyn StringLookup,
    out: String,
    path: FxHashSet<IrId>,
}

impl Printer<'_> {
    fn text(&mut self, name: Name) {
        let text = self.strings.lookup(name);
        self.out.push_str(&text);
    }

    fn quoted(&mut self, name: Name) {
        let text = self.strings.lookup(name);
        self.out.push_str(&escape_string(&text));
    }

    fn node(&mut self, id: IrId) {
        if !id.is_valid() {
            self.out.push('_');
            return;
        }
        if !self.arena.contains(id) {
            self.out.push_str("{?}");
            return;
        }
        if !self.path.insert(id) {
            self.out.push_str("{...}");
            return;
        }
        if self.arena.flags(id).contains(IrFlags::VOLATILE) {
            self.out.push_str("volatile ");
        }
        ensure_sufficient_stack(|| self.kind(id));
        self.path.remove(&id);
    }

    /// `(head a b c)`
    fn list(&mut self, head: &str, items: &[IrId]) {
        self.out.push('(');
        self.out.push_str(head);
        for &item in items {
            self.out.push(' ');
            self.node(item);
        }
        self.out.push(')');
    }

    fn args(&mut self, args: &[IrArg]) {
        for arg in args {
            self.out.push(' ');
            let name = self.strings.lookup(arg.name);
            if !is_positional(&name) {
                self.out.push_str(&name);
                self.out.push('=');
            }
            self.node(arg.value);
        }
    }

    fn operands(&mut self, operands: &[IrArg]) {
        self.out.push_str(" (");
        for (i, op) in operands.iter().enumerate() {
            if i > 0 {
                self.out.push(' ');
            }
            self.quoted(op.name);
            self.out.push('=');
            self.node(op.value);
        }
        self.out.push(')');
    }

    fn params(&mut self, params: &[IrParam], variadic: bool) {
        self.out.push('(');
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                self.out.push(' ');
            }
            self.text(param.name);
            self.out.push(':');
            self.node(param.ty);
            if param.default.is_valid() {
                self.out.push('=');
                self.node(param.default);
            }
        }
        if variadic {
            if !params.is_empty() {
                self.out.push(' ');
            }
            self.out.push_str("...");
        }
        self.out.push(')');
    }

    fn kind(&mut self, id: IrId) {
        let arena = self.arena;
        match arena.kind(id) {
            IrKind::Int { value, ty } => {
                self.text(*value);
                if ty.is_valid() {
                    self.out.push(':');
                    self.node(*ty);
                }
            }
            IrKind::Float(value) | IrKind::Ident(value) | IrKind::Named(value) => {
                self.text(*value);
            }
            IrKind::Str(value) => self.quoted(*value),
            IrKind::Undef => self.out.push_str("undef"),
            IrKind::Binary { op, lhs, rhs } => self.list(op.as_str(), &[*lhs, *rhs]),
            IrKind::Unary { op, rhs } => self.list(op.as_str(), &[*rhs]),
            IrKind::PostUnary { op, lhs } => {
                let head = format!("post{op}");
                self.list(&head, &[*lhs]);
            }
            IrKind::Call { func, args } => {
                self.out.push_str("(call ");
                self.node(*func);
                self.args(args);
                self.out.push(')');
            }
            IrKind::List(items) => {
                self.out.push('[');
                for (i, &item) in items.iter().enumerate() {
                    if i > 0 {
                        self.out.push(' ');
                    }
                    self.node(item);
                }
                self.out.push(']');
            }
            IrKind::Field { base, field } => {
                self.out.push_str("(. ");
                self.node(*base);
                self.out.push(' ');
                self.text(*field);
                self.out.push(')');
            }
            IrKind::Index { base, index } => self.list("index", &[*base, *index]),
            IrKind::Slice { base, start, end } => self.list("slice", &[*base, *start, *end]),
            IrKind::Seq(items) => self.list("seq", items),
            IrKind::If {
                cond,
                then,
                otherwise,
            } => self.list("if", &[*cond, *then, *otherwise]),
            IrKind::While { cond, body } => self.list("while", &[*cond, *body]),
            IrKind::For {
                init,
                cond,
                step,
                body,
            } => self.list("for", &[*init, *cond, *step, *body]),
            IrKind::Form {
                index,
                value,
                max_jobs,
                iter,
                body,
            } => {
                self.out.push_str("(form ");
                self.text(*index);
                self.out.push(' ');
                self.text(*value);
                for part in [*max_jobs, *iter, *body] {
                    self.out.push(' ');
                    self.node(part);
                }
                self.out.push(')');
            }
            IrKind::Foreach {
                index,
                value,
                iter,
                body,
            } => {
                self.out.push_str("(foreach ");
                self.text(*index);
                self.out.push(' ');
                self.text(*value);
                for part in [*iter, *body] {
                    self.out.push(' ');
                    self.node(part);
                }
                self.out.push(')');
            }
            IrKind::Case { cond, body } => self.list("case", &[*cond, *body]),
            IrKind::Switch {
                cond,
                cases,
                default,
            } => {
                let mut parts = Vec::with_capacity(cases.len() + 2);
                parts.push(*cond);
                parts.extend_from_slice(cases);
                parts.push(*default);
                self.list("switch", &parts);
            }
            IrKind::Ret(value) => self.list("ret", &[*value]),
            IrKind::Brk => self.out.push_str("brk"),
            IrKind::Cont => self.out.push_str("cont"),
            IrKind::Asm {
                code,
                outputs,
                inputs,
                clobbers,
            } => {
                self.out.push_str("(asm ");
                self.quoted(*code);
                self.operands(outputs);
                self.operands(inputs);
                self.out.push_str(" (");
                for (i, reg) in clobbers.iter().enumerate() {
                    if i > 0 {
                        self.out.push(' ');
                    }
                    self.quoted(*reg);
                }
                self.out.push_str("))");
            }
            IrKind::Local { name, ty, value } => {
                let head = if arena.flags(id).contains(IrFlags::CONST) {
                    "(const "
                } else {
                    "(let "
                };
                self.out.push_str(head);
                self.text(*name);
                for part in [*ty, *value] {
                    self.out.push(' ');
                    self.node(part);
                }
                self.out.push(')');
            }
            IrKind::Fn {
                name,
                params,
                ret,
                variadic,
                body,
            } => {
                self.out.push_str("(fn ");
                self.text(*name);
                self.out.push(' ');
                self.params(params, *variadic);
                for part in [*ret, *body] {
                    self.out.push(' ');
                    self.node(part);
                }
                self.out.push(')');
            }
            IrKind::Typedef { name, ty } => {
                self.out.push_str("(type ");
                self.text(*name);
                self.out.push(' ');
                self.node(*ty);
                self.out.push(')');
            }
            IrKind::Extern { abi, body } => {
                self.out.push_str("(extern ");
                self.quoted(*abi);
                self.out.push(' ');
                self.node(*body);
                self.out.push(')');
            }
            IrKind::U1 => self.out.push_str("u1"),
            IrKind::U8 => self.out.push_str("u8"),
            IrKind::U16 => self.out.push_str("u16"),
            IrKind::U32 => self.out.push_str("u32"),
            IrKind::U64 => self.out.push_str("u64"),
            IrKind::U128 => self.out.push_str("u128"),
            IrKind::I8 => self.out.push_str("i8"),
            IrKind::I16 => self.out.push_str("i16"),
            IrKind::I32 => self.out.push_str("i32"),
            IrKind::I64 => self.out.push_str("i64"),
            IrKind::I128 => self.out.push_str("i128"),
            IrKind::F32 => self.out.push_str("f32"),
            IrKind::F64 => self.out.push_str("f64"),
            IrKind::Void => self.out.push_str("void"),
            IrKind::Ptr(item) => self.list("ptr", &[*item]),
            IrKind::Mut(item) => self.list("mut", &[*item]),
            IrKind::Opaque(name) => {
                self.out.push_str("(opaque ");
                self.text(*name);
                self.out.push(')');
            }
            IrKind::StringTy => self.out.push_str("string"),
            IrKind::Struct { fields, packed } => {
                self.list(if *packed { "packed" } else { "struct" }, fields);
            }
            IrKind::Union(fields) => self.list("union", fields),
            IrKind::Array { item, size } => self.list("array", &[*item, *size]),
            IrKind::ListTy(item) => self.list("list", &[*item]),
            IrKind::MapTy { key, value } => self.list("map", &[*key, *value]),
            IrKind::SetTy(item) => self.list("set", &[*item]),
            IrKind::OptionalTy(item) => self.list("optional", &[*item]),
            IrKind::FnTy {
                params,
                ret,
                variadic,
            } => {
                self.out.push_str("(fnty (");
                for (i, &param) in params.iter().enumerate() {
                    if i > 0 {
                        self.out.push(' ');
                    }
                    self.node(param);
                }
                if *variadic {
                    if !params.is_empty() {
                        self.out.push(' ');
                    }
                    self.out.push_str("...");
                }
                self.out.push_str(") ");
                self.node(*ret);
                self.out.push(')');
            }
        }
    }
}

/// Parser-assigned names of positional arguments: `__0`, `__1`, ...
fn is_positional(name: &str) -> bool {
    name.strip_prefix("__")
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}
