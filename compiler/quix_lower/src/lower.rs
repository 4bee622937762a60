//! Parse tree to IR lowering.
//!
//! One recursive walk from the root. Each parse node becomes one IR node
//! except where the IR has no direct counterpart:
//! - derived returns and ternaries become `If`
//! - compound assignments and `^^` are spelled out with their operands
//!   lowered again
//! - fstrings become a `+` chain of `as string` casts
//! - contracts become checks at the top of the body and before each return
//! - composites become a `Typedef` followed by their methods
//!
//! Declarations outside functions get their subsystem and owner prefixed to
//! their name (`app::Point::len`).

mod decl;
mod expr;
mod ty;

use std::io::{Read, Seek};
use std::mem;
use std::sync::Arc;

use quix_diagnostic::{DiagMessage, Ticket};
use quix_ir::node::stmt::{
    AsmOperand, CondReturn, For, Foreach, Form, If, InlineAsm, Local, Switch,
};
use quix_ir::{
    Name, NodeArena, NodeData, NodeFlags, NodeId, NodeKind, SharedInterner, Span, StringLookup,
};
use quix_parse::Module;
use quix_stack::DepthLimit;
use rustc_hash::FxHashMap;

use crate::ir::{IrArena, IrArg, IrFlags, IrId, IrKind, IrModule, IrOp};
use crate::LowerError;

type LowerResult<T> = Result<T, LowerError>;

/// Lowering limits.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LowerConfig {
    /// Deepest parse-tree nesting lowered before giving up.
    pub max_depth: u32,
}

impl Default for LowerConfig {
    fn default() -> Self {
        LowerConfig { max_depth: 10_000 }
    }
}

/// Parse `module` if needed and lower it with the default limits.
pub fn lower<R: Read + Seek + Send>(module: &mut Module<R>) -> Result<IrModule, LowerError> {
    lower_with(module, LowerConfig::default())
}

/// Parse `module` if needed and lower it.
///
/// A parse failure is returned as is; the parser has already reported it.
/// Any other failure is also reported under [`Ticket::CONVERT`].
#[tracing::instrument(level = "debug", skip_all, fields(file = %module.filename()))]
pub fn lower_with<R: Read + Seek + Send>(
    module: &mut Module<R>,
    config: LowerConfig,
) -> Result<IrModule, LowerError> {
    let root = module.parse()?;
    let interner = Arc::clone(module.interner());
    match lower_tree(module.arena(), &interner, root, config) {
        Ok(ir) => {
            tracing::debug!(nodes = ir.arena.len(), "lowered module");
            Ok(ir)
        }
        Err(err) => {
            tracing::debug!(error = %err, "lowering failed");
            module
                .diagnostics_mut()
                .scoped(Ticket::CONVERT)
                .emit(DiagMessage::error(err.code(), err.to_string()).at(err.span()));
            Err(err)
        }
    }
}

/// Lower the tree under `root` without touching any diagnostics.
pub fn lower_tree(
    arena: &NodeArena,
    interner: &SharedInterner,
    root: NodeId,
    config: LowerConfig,
) -> Result<IrModule, LowerError> {
    if !arena.contains(root) {
        return Err(LowerError::Malformed {
            kind: NodeKind::Block,
            what: "a root node",
            span: Span::DUMMY,
        });
    }
    let mut lowerer = Lowerer::new(arena, interner, config);
    let ir_root = lowerer.lower(root)?;
    Ok(IrModule {
        arena: lowerer.out,
        root: ir_root,
        strings: Arc::clone(interner),
    })
}

/// State for one lowering walk.
struct Lowerer<'a> {
    src: &'a NodeArena,
    strings: &'a SharedInterner,
    out: IrArena,
    limit: DepthLimit,
    depth: u32,
    /// Subsystem and owner names enclosing the current declaration.
    namespace: Vec<String>,
    /// Function bodies entered; names are only qualified at zero.
    fn_depth: u32,
    /// Postcondition of the innermost function, with the function node.
    postcond: Option<(NodeId, NodeId)>,

    // Pre-interned names for rewritten operators and contract checks.
    name_first_arg: Name,
    name_is: Name,
    name_has: Name,
    name_ceil: Name,
    name_typeof: Name,
    name_precond_fail: Name,
    name_postcond_fail: Name,
    name_zero: Name,
    name_one: Name,
    name_eight: Name,
}

impl<'a> Lowerer<'a> {
    fn new(src: &'a NodeArena, strings: &'a SharedInterner, config: LowerConfig) -> Self {
        Lowerer {
            src,
            strings,
            out: IrArena::with_capacity(src.len()),
            limit: DepthLimit::new(config.max_depth),
            depth: 0,
            namespace: Vec::new(),
            fn_depth: 0,
            postcond: None,
            name_first_arg: strings.intern("__0"),
            name_is: strings.intern("__is"),
            name_has: strings.intern("has"),
            name_ceil: strings.intern("__ceil"),
            name_typeof: strings.intern("__typeof"),
            name_precond_fail: strings.intern("__quix_precond_fail"),
            name_postcond_fail: strings.intern("__quix_postcond_fail"),
            name_zero: strings.intern("0"),
            name_one: strings.intern("1"),
            name_eight: strings.intern("8"),
        }
    }

    fn intern(&self, text: &str) -> Name {
        self.strings.intern(text)
    }

    fn lookup(&self, name: Name) -> Arc<str> {
        self.strings.lookup(name)
    }

    #[inline]
    fn emit(&mut self, kind: IrKind, span: Span) -> IrId {
        self.out.push(kind, span)
    }

    /// The void placeholder for an absent value or branch.
    fn void(&mut self, span: Span) -> IrId {
        self.emit(IrKind::Void, span)
    }

    fn int(&mut self, value: Name, ty: IrId, span: Span) -> IrId {
        self.emit(IrKind::Int { value, ty }, span)
    }

    fn call(&mut self, func: Name, args: Vec<IrId>, span: Span) -> IrId {
        let func = self.emit(IrKind::Ident(func), span);
        let args = args
            .into_iter()
            .enumerate()
            .map(|(i, value)| IrArg {
                name: if i == 0 {
                    self.name_first_arg
                } else {
                    self.strings.intern(&format!("__{i}"))
                },
                value,
            })
            .collect();
        self.emit(IrKind::Call { func, args }, span)
    }

    fn not(&mut self, rhs: IrId, span: Span) -> IrId {
        self.emit(
            IrKind::Unary {
                op: IrOp::LogicNot,
                rhs,
            },
            span,
        )
    }

    /// Lower one node and everything below it.
    fn lower(&mut self, id: NodeId) -> LowerResult<IrId> {
        let limit = self.limit;
        let span = self.src.span(id);
        let entered = limit.enter(self.depth + 1, |depth| {
            let outer = mem::replace(&mut self.depth, depth);
            let lowered = self.dispatch(id);
            self.depth = outer;
            lowered
        });
        let lowered = match entered {
            Ok(lowered) => lowered?,
            Err(source) => return Err(LowerError::TooDeep { source, span }),
        };
        let flags = self.src.flags(id);
        if flags.contains(NodeFlags::CONST) {
            self.out.set_flag(lowered, IrFlags::CONST, true);
        }
        if flags.contains(NodeFlags::VOLATILE) {
            self.out.set_flag(lowered, IrFlags::VOLATILE, true);
        }
        Ok(lowered)
    }

    /// Lower a slot the parent cannot do without.
    fn required(
        &mut self,
        parent: NodeId,
        child: NodeId,
        what: &'static str,
    ) -> LowerResult<IrId> {
        if !child.is_valid() || !self.src.contains(child) {
            return Err(self.malformed(parent, what));
        }
        self.lower(child)
    }

    /// Lower a slot that may be empty. A dangling id is still malformed.
    fn optional(
        &mut self,
        parent: NodeId,
        child: NodeId,
        what: &'static str,
    ) -> LowerResult<Option<IrId>> {
        if !child.is_valid() {
            return Ok(None);
        }
        self.required(parent, child, what).map(Some)
    }

    /// Optional slot, with `INVALID` standing in for an empty one.
    fn optional_id(
        &mut self,
        parent: NodeId,
        child: NodeId,
        what: &'static str,
    ) -> LowerResult<IrId> {
        Ok(self.optional(parent, child, what)?.unwrap_or(IrId::INVALID))
    }

    /// Optional slot, with void standing in for an empty one.
    fn optional_or_void(
        &mut self,
        parent: NodeId,
        child: NodeId,
        what: &'static str,
    ) -> LowerResult<IrId> {
        match self.optional(parent, child, what)? {
            Some(id) => Ok(id),
            None => Ok(self.void(self.src.span(parent))),
        }
    }

    fn malformed(&self, parent: NodeId, what: &'static str) -> LowerError {
        LowerError::Malformed {
            kind: self.src.kind(parent),
            what,
            span: self.src.span(parent),
        }
    }

    fn unsupported(&self, what: String, id: NodeId) -> LowerError {
        LowerError::Unsupported {
            what,
            span: self.src.span(id),
        }
    }

    /// `name` with the enclosing namespace prefixed, outside function bodies.
    fn qualify(&self, name: Name) -> Name {
        if self.namespace.is_empty() || self.fn_depth > 0 {
            return name;
        }
        let mut text = self.namespace.join("::");
        text.push_str("::");
        text.push_str(&self.lookup(name));
        self.intern(&text)
    }

    /// Run `f` with `name` pushed onto the namespace.
    fn in_namespace<T>(&mut self, name: Name, f: impl FnOnce(&mut Self) -> T) -> T {
        let text = self.lookup(name).to_string();
        self.namespace.push(text);
        let out = f(self);
        self.namespace.pop();
        out
    }

    /// Run `f` as the body of a function with the given postcondition.
    fn in_function<T>(
        &mut self,
        postcond: Option<(NodeId, NodeId)>,
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        let outer = mem::replace(&mut self.postcond, postcond);
        self.fn_depth += 1;
        let out = f(self);
        self.fn_depth -= 1;
        self.postcond = outer;
        out
    }

    /// `body` as a `Seq`, wrapping it when it lowered to anything else.
    fn ensure_seq(&mut self, body: IrId) -> IrId {
        if matches!(self.out.kind(body), IrKind::Seq(_)) {
            body
        } else {
            let span = self.out.span(body);
            self.emit(IrKind::Seq(vec![body]), span)
        }
    }

    /// Lower every id in `items`.
    fn all(
        &mut self,
        parent: NodeId,
        items: &[NodeId],
        what: &'static str,
    ) -> LowerResult<Vec<IrId>> {
        items
            .iter()
            .map(|&item| self.required(parent, item, what))
            .collect()
    }

    /// Lower list items. A node repeated by `[e; n]` is lowered once and
    /// shared.
    fn list_items(&mut self, parent: NodeId, items: &[NodeId]) -> LowerResult<Vec<IrId>> {
        let mut done: FxHashMap<NodeId, IrId> = FxHashMap::default();
        items
            .iter()
            .map(|&item| match done.get(&item) {
                Some(&lowered) => Ok(lowered),
                None => {
                    let lowered = self.required(parent, item, "a list item")?;
                    done.insert(item, lowered);
                    Ok(lowered)
                }
            })
            .collect()
    }

    fn dispatch(&mut self, id: NodeId) -> LowerResult<IrId> {
        let src = self.src;
        let span = src.span(id);
        match src.get(id) {
            // Expressions
            NodeData::Binary(b) => self.binary(id, b),
            NodeData::Unary(u) => self.unary(id, u),
            NodeData::PostUnary(u) => self.post_unary(id, u),
            NodeData::Ternary(t) => {
                let cond = self.required(id, t.cond, "a condition")?;
                let then = self.required(id, t.lhs, "a true branch")?;
                let otherwise = self.required(id, t.rhs, "a false branch")?;
                Ok(self.emit(
                    IrKind::If {
                        cond,
                        then,
                        otherwise,
                    },
                    span,
                ))
            }
            NodeData::Int(lit) => Ok(self.int(lit.value, IrId::INVALID, span)),
            NodeData::Float(lit) => Ok(self.emit(IrKind::Float(lit.value), span)),
            NodeData::Str(lit) => Ok(self.emit(IrKind::Str(lit.value), span)),
            NodeData::Char(c) => Ok(self.char_literal(*c, span)),
            NodeData::Bool(b) => Ok(self.bool_literal(*b, span)),
            NodeData::Null => Ok(self.null_literal(span)),
            NodeData::Undef => Ok(self.emit(IrKind::Undef, span)),
            NodeData::Call(c) => {
                let func = self.required(id, c.func, "a callee")?;
                let args = self.args(id, &c.args)?;
                Ok(self.emit(IrKind::Call { func, args }, span))
            }
            NodeData::TemplCall(c) => {
                let func = self.required(id, c.func, "a callee")?;
                let mut args = self.args(id, &c.template_args)?;
                args.extend(self.args(id, &c.args)?);
                Ok(self.emit(IrKind::Call { func, args }, span))
            }
            NodeData::List(l) => {
                let items = self.list_items(id, &l.items)?;
                Ok(self.emit(IrKind::List(items), span))
            }
            NodeData::Assoc(a) => {
                let key = self.required(id, a.key, "a key")?;
                let value = self.required(id, a.value, "a value")?;
                Ok(self.emit(IrKind::List(vec![key, value]), span))
            }
            NodeData::Field(f) => {
                let base = self.required(id, f.base, "a base")?;
                Ok(self.emit(
                    IrKind::Field {
                        base,
                        field: f.field,
                    },
                    span,
                ))
            }
            NodeData::Index(i) => {
                let base = self.required(id, i.base, "a base")?;
                let index = self.required(id, i.index, "an index")?;
                Ok(self.emit(IrKind::Index { base, index }, span))
            }
            NodeData::Slice(s) => {
                let base = self.required(id, s.base, "a base")?;
                let start = self.optional_id(id, s.start, "a start bound")?;
                let end = self.optional_id(id, s.end, "an end bound")?;
                Ok(self.emit(IrKind::Slice { base, start, end }, span))
            }
            NodeData::FString(f) => self.fstring(id, &f.parts),
            NodeData::Ident(n) => Ok(self.emit(IrKind::Ident(n.name), span)),
            NodeData::SeqPoint(l) => {
                let items = self.all(id, &l.items, "an expression")?;
                Ok(self.emit(IrKind::Seq(items), span))
            }
            NodeData::StmtExpr(w) => self.required(id, w.inner, "a statement"),
            NodeData::TypeExpr(w) => self.ty(id, w.inner, "a type"),

            // Types
            NodeData::MutTy(_)
            | NodeData::U1
            | NodeData::U8
            | NodeData::U16
            | NodeData::U32
            | NodeData::U64
            | NodeData::U128
            | NodeData::I8
            | NodeData::I16
            | NodeData::I32
            | NodeData::I64
            | NodeData::I128
            | NodeData::F32
            | NodeData::F64
            | NodeData::VoidTy
            | NodeData::PtrTy(_)
            | NodeData::OpaqueTy(_)
            | NodeData::StringTy
            | NodeData::EnumTy(_)
            | NodeData::StructTy(_)
            | NodeData::GroupTy(_)
            | NodeData::RegionTy(_)
            | NodeData::UnionTy(_)
            | NodeData::ArrayTy(_)
            | NodeData::VectorTy(_)
            | NodeData::MapTy(_)
            | NodeData::TupleTy(_)
            | NodeData::SetTy(_)
            | NodeData::OptionalTy(_)
            | NodeData::FnTy(_)
            | NodeData::UnresTy(_) => self.type_node(id),

            // Declarations
            NodeData::Typedef(t) => {
                let name = self.qualify(t.name);
                let ty = self.ty(id, t.ty, "a type")?;
                Ok(self.emit(IrKind::Typedef { name, ty }, span))
            }
            NodeData::FnDecl(f) => self.fn_decl(id, f),
            NodeData::Struct(c) | NodeData::Group(c) => self.composite(id, c, Composite::Struct),
            NodeData::Region(c) => self.composite(id, c, Composite::Packed),
            NodeData::Union(c) => self.composite(id, c, Composite::Union),
            NodeData::Enum(e) => self.enum_def(id, e),
            NodeData::Fn(f) => self.fn_def(id, f),
            NodeData::Subsystem(s) => {
                self.in_namespace(s.name, |this| this.required(id, s.body, "a body"))
            }
            NodeData::Export(e) => {
                let body = self.required(id, e.body, "a body")?;
                Ok(self.emit(IrKind::Extern { abi: e.abi, body }, span))
            }
            NodeData::CompositeField(_) => Err(self.malformed(id, "an enclosing composite")),

            // Statements
            NodeData::Block(l) => {
                let items = self.all(id, &l.items, "a statement")?;
                Ok(self.emit(IrKind::Seq(items), span))
            }
            NodeData::Const(l) => self.local(id, l, true),
            NodeData::Var(l) | NodeData::Let(l) => self.local(id, l, false),
            NodeData::InlineAsm(a) => self.inline_asm(id, a),
            NodeData::Return(r) => {
                let value = self.optional_or_void(id, r.value, "a return value")?;
                self.ret(value, span)
            }
            NodeData::RetIf(r) => self.cond_return(id, r, false),
            NodeData::RetZ(r) => self.cond_return(id, r, true),
            NodeData::RetV(r) => {
                let cond = self.required(id, r.cond, "a condition")?;
                let value = self.void(span);
                let then = self.ret(value, span)?;
                let otherwise = self.void(span);
                Ok(self.emit(
                    IrKind::If {
                        cond,
                        then,
                        otherwise,
                    },
                    span,
                ))
            }
            NodeData::Break => Ok(self.emit(IrKind::Brk, span)),
            NodeData::Continue => Ok(self.emit(IrKind::Cont, span)),
            NodeData::If(i) => self.if_stmt(id, i),
            NodeData::While(w) => {
                let cond = match self.optional(id, w.cond, "a condition")? {
                    Some(cond) => cond,
                    None => self.int(self.name_one, IrId::INVALID, span),
                };
                let body = self.required(id, w.body, "a body")?;
                Ok(self.emit(IrKind::While { cond, body }, span))
            }
            NodeData::For(f) => self.for_stmt(id, f),
            NodeData::Form(f) => self.form(id, f),
            NodeData::Foreach(f) => self.foreach(id, f),
            NodeData::Case(c) => {
                let cond = self.required(id, c.cond, "a case value")?;
                let body = self.required(id, c.body, "a body")?;
                Ok(self.emit(IrKind::Case { cond, body }, span))
            }
            NodeData::Switch(s) => self.switch(id, s),
            NodeData::ExprStmt(w) => self.required(id, w.inner, "an expression"),
            NodeData::VolStmt(w) => {
                let inner = self.required(id, w.inner, "a statement")?;
                self.out.set_flag(inner, IrFlags::VOLATILE, true);
                Ok(inner)
            }
        }
    }

    // Statements

    fn local(&mut self, id: NodeId, local: &Local, constant: bool) -> LowerResult<IrId> {
        if !local.ty.is_valid() && !local.value.is_valid() {
            return Err(self.malformed(id, "a type or an initializer"));
        }
        if constant && !local.value.is_valid() {
            return Err(self.malformed(id, "an initializer"));
        }
        let name = self.qualify(local.name);
        let ty = if local.ty.is_valid() {
            self.ty(id, local.ty, "a type")?
        } else {
            IrId::INVALID
        };
        let value = self.optional_id(id, local.value, "an initializer")?;
        let lowered = self.emit(IrKind::Local { name, ty, value }, self.src.span(id));
        if constant {
            self.out.set_flag(lowered, IrFlags::CONST, true);
        }
        Ok(lowered)
    }

    fn inline_asm(&mut self, id: NodeId, asm: &InlineAsm) -> LowerResult<IrId> {
        let outputs = self.asm_operands(id, &asm.outputs)?;
        let inputs = self.asm_operands(id, &asm.inputs)?;
        Ok(self.emit(
            IrKind::Asm {
                code: asm.code,
                outputs,
                inputs,
                clobbers: asm.clobbers.clone(),
            },
            self.src.span(id),
        ))
    }

    fn asm_operands(&mut self, id: NodeId, operands: &[AsmOperand]) -> LowerResult<Vec<IrArg>> {
        operands
            .iter()
            .map(|op| {
                let value = self.required(id, op.value, "an operand")?;
                Ok(IrArg {
                    name: op.constraint,
                    value,
                })
            })
            .collect()
    }

    /// `Ret(value)`, preceded by the postcondition check when one is active.
    fn ret(&mut self, value: IrId, span: Span) -> LowerResult<IrId> {
        let ret = self.emit(IrKind::Ret(value), span);
        match self.postcond {
            Some((func, cond)) => {
                let check = self.postcond_check(func, cond)?;
                Ok(self.emit(IrKind::Seq(vec![check, ret]), span))
            }
            None => Ok(ret),
        }
    }

    fn cond_return(&mut self, id: NodeId, r: &CondReturn, negate: bool) -> LowerResult<IrId> {
        let span = self.src.span(id);
        let mut cond = self.required(id, r.cond, "a condition")?;
        if negate {
            cond = self.not(cond, span);
        }
        let value = self.required(id, r.value, "a return value")?;
        let then = self.ret(value, span)?;
        let otherwise = self.void(span);
        Ok(self.emit(
            IrKind::If {
                cond,
                then,
                otherwise,
            },
            span,
        ))
    }

    fn if_stmt(&mut self, id: NodeId, i: &If) -> LowerResult<IrId> {
        let cond = self.required(id, i.cond, "a condition")?;
        let then = self.required(id, i.then, "a body")?;
        let otherwise = self.optional_or_void(id, i.otherwise, "an else branch")?;
        Ok(self.emit(
            IrKind::If {
                cond,
                then,
                otherwise,
            },
            self.src.span(id),
        ))
    }

    fn for_stmt(&mut self, id: NodeId, f: &For) -> LowerResult<IrId> {
        let span = self.src.span(id);
        let init = self.optional_or_void(id, f.init, "an initializer")?;
        let cond = match self.optional(id, f.cond, "a condition")? {
            Some(cond) => cond,
            None => self.int(self.name_one, IrId::INVALID, span),
        };
        let step = self.optional_or_void(id, f.step, "a step")?;
        let body = self.required(id, f.body, "a body")?;
        Ok(self.emit(
            IrKind::For {
                init,
                cond,
                step,
                body,
            },
            span,
        ))
    }

    fn form(&mut self, id: NodeId, f: &Form) -> LowerResult<IrId> {
        let max_jobs = self.required(id, f.max_jobs, "a job limit")?;
        let iter = self.required(id, f.iter, "an iterable")?;
        let body = self.required(id, f.body, "a body")?;
        let body = self.ensure_seq(body);
        Ok(self.emit(
            IrKind::Form {
                index: f.index,
                value: f.value,
                max_jobs,
                iter,
                body,
            },
            self.src.span(id),
        ))
    }

    fn foreach(&mut self, id: NodeId, f: &Foreach) -> LowerResult<IrId> {
        let iter = self.required(id, f.iter, "an iterable")?;
        let body = self.required(id, f.body, "a body")?;
        let body = self.ensure_seq(body);
        Ok(self.emit(
            IrKind::Foreach {
                index: f.index,
                value: f.value,
                iter,
                body,
            },
            self.src.span(id),
        ))
    }

    fn switch(&mut self, id: NodeId, s: &Switch) -> LowerResult<IrId> {
        let cond = self.required(id, s.cond, "a condition")?;
        let cases = self.all(id, &s.cases, "a case")?;
        let default = self.optional_or_void(id, s.default, "a default branch")?;
        Ok(self.emit(
            IrKind::Switch {
                cond,
                cases,
                default,
            },
            self.src.span(id),
        ))
    }
}

/// Which IR aggregate a composite definition becomes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Composite {
    Struct,
    Packed,
    Union,
}

#[cfg(test)]
mod tests;
