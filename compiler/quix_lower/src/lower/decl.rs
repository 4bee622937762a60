//! Functions, composites and enums.

use quix_ir::node::decl::{CompositeDef, EnumDef, FnDecl, FnDef};
use quix_ir::node::ty::FnTy;
use quix_ir::{Name, NodeData, NodeId, Span};

use super::{Composite, LowerResult, Lowerer};
use crate::ir::{IrFlags, IrId, IrKind, IrOp, IrParam};

/// Lowered function signature.
struct Signature {
    params: Vec<IrParam>,
    ret: IrId,
    variadic: bool,
}

impl<'a> Lowerer<'a> {
    /// The `FnTy` in a declaration's type slot.
    fn fn_type(&self, id: NodeId, ty: NodeId) -> LowerResult<(NodeId, &'a FnTy)> {
        let src = self.src;
        match src.try_get(ty) {
            Some(NodeData::FnTy(f)) => Ok((ty, f)),
            _ => Err(self.malformed(id, "a function type")),
        }
    }

    pub(super) fn return_ty(&mut self, id: NodeId, f: &FnTy) -> LowerResult<IrId> {
        if f.ret.is_valid() {
            self.ty(id, f.ret, "a return type")
        } else {
            Ok(self.void(self.src.span(id)))
        }
    }

    fn signature(&mut self, id: NodeId, ty: NodeId) -> LowerResult<Signature> {
        let (ty, f) = self.fn_type(id, ty)?;
        let params = f
            .params
            .iter()
            .map(|param| {
                Ok(IrParam {
                    name: param.name,
                    ty: self.ty(ty, param.ty, "a parameter type")?,
                    default: self.optional_id(ty, param.default, "a default value")?,
                })
            })
            .collect::<LowerResult<_>>()?;
        Ok(Signature {
            params,
            ret: self.return_ty(ty, f)?,
            variadic: f.props.variadic,
        })
    }

    pub(super) fn fn_decl(&mut self, id: NodeId, f: &FnDecl) -> LowerResult<IrId> {
        let name = self.qualify(f.name);
        let sig = self.signature(id, f.ty)?;
        Ok(self.emit(
            IrKind::Fn {
                name,
                params: sig.params,
                ret: sig.ret,
                variadic: sig.variadic,
                body: IrId::INVALID,
            },
            self.src.span(id),
        ))
    }

    pub(super) fn fn_def(&mut self, id: NodeId, f: &FnDef) -> LowerResult<IrId> {
        let name = self.qualify(f.name);
        let sig = self.signature(id, f.ty)?;
        let postcond = f.postcond.is_valid().then_some((id, f.postcond));
        let body = self.in_function(postcond, |this| this.fn_body(id, f))?;
        Ok(self.emit(
            IrKind::Fn {
                name,
                params: sig.params,
                ret: sig.ret,
                variadic: sig.variadic,
                body,
            },
            self.src.span(id),
        ))
    }

    /// The body with the precondition checked first and the postcondition
    /// checked last. Returns inside the body check the postcondition on
    /// their own.
    fn fn_body(&mut self, id: NodeId, f: &FnDef) -> LowerResult<IrId> {
        let body = self.required(id, f.body, "a body")?;
        let body = self.ensure_seq(body);
        if f.precond.is_valid() {
            let cond = self.required(id, f.precond, "a precondition")?;
            let check = self.contract_check(cond, self.name_precond_fail, self.src.span(id));
            if let IrKind::Seq(items) = self.out.kind_mut(body) {
                items.insert(0, check);
            }
        }
        if let Some((func, cond)) = self.postcond {
            let check = self.postcond_check(func, cond)?;
            if let IrKind::Seq(items) = self.out.kind_mut(body) {
                items.push(check);
            }
        }
        Ok(body)
    }

    /// `if !cond { fail() }`
    fn contract_check(&mut self, cond: IrId, fail: Name, span: Span) -> IrId {
        let cond = self.not(cond, span);
        let then = self.call(fail, Vec::new(), span);
        let otherwise = self.void(span);
        self.emit(
            IrKind::If {
                cond,
                then,
                otherwise,
            },
            span,
        )
    }

    /// A fresh check of the postcondition `cond` of function `func`.
    pub(super) fn postcond_check(&mut self, func: NodeId, cond: NodeId) -> LowerResult<IrId> {
        let cond = self.required(func, cond, "a postcondition")?;
        Ok(self.contract_check(cond, self.name_postcond_fail, self.src.span(func)))
    }

    fn composite_field(&mut self, parent: NodeId, field: NodeId) -> LowerResult<IrId> {
        let src = self.src;
        match src.try_get(field) {
            Some(NodeData::CompositeField(f)) => self.ty(field, f.ty, "a field type"),
            _ => Err(self.malformed(parent, "a field")),
        }
    }

    /// `Typedef` of the field layout, then the methods named `Owner::method`.
    /// Field defaults are dropped.
    pub(super) fn composite(
        &mut self,
        id: NodeId,
        def: &CompositeDef,
        shape: Composite,
    ) -> LowerResult<IrId> {
        let span = self.src.span(id);
        let name = self.qualify(def.name);
        let fields = def
            .fields
            .iter()
            .map(|&field| self.composite_field(id, field))
            .collect::<LowerResult<Vec<_>>>()?;
        let layout = match shape {
            Composite::Struct => IrKind::Struct {
                fields,
                packed: false,
            },
            Composite::Packed => IrKind::Struct {
                fields,
                packed: true,
            },
            Composite::Union => IrKind::Union(fields),
        };
        let ty = self.emit(layout, span);
        let mut items = vec![self.emit(IrKind::Typedef { name, ty }, span)];
        let methods = self.in_namespace(def.name, |this| -> LowerResult<Vec<IrId>> {
            let mut methods = this.all(id, &def.methods, "a method")?;
            methods.extend(this.all(id, &def.static_methods, "a static method")?);
            Ok(methods)
        })?;
        items.extend(methods);
        Ok(self.emit(IrKind::Seq(items), span))
    }

    /// One constant per item, named `Enum::Item`. An item without a value
    /// is one more than the item before it, or zero when it is first.
    pub(super) fn enum_def(&mut self, id: NodeId, def: &EnumDef) -> LowerResult<IrId> {
        let span = self.src.span(id);
        let prefix = self.lookup(self.qualify(def.name));
        let mut items = Vec::with_capacity(def.items.len());
        let mut prev = None;
        for item in &def.items {
            let name = self.intern(&format!("{prefix}::{}", self.lookup(item.name)));
            let ty = if def.member.is_valid() {
                self.ty(id, def.member, "a member type")?
            } else {
                IrId::INVALID
            };
            let value = match (self.optional(id, item.value, "an item value")?, prev) {
                (Some(value), _) => value,
                (None, Some(prev)) => {
                    let lhs = self.emit(IrKind::Ident(prev), span);
                    let rhs = self.int(self.name_one, IrId::INVALID, span);
                    self.emit(
                        IrKind::Binary {
                            op: IrOp::Plus,
                            lhs,
                            rhs,
                        },
                        span,
                    )
                }
                (None, None) => self.int(self.name_zero, IrId::INVALID, span),
            };
            let local = self.emit(IrKind::Local { name, ty, value }, span);
            self.out.set_flag(local, IrFlags::CONST, true);
            items.push(local);
            prev = Some(name);
        }
        Ok(self.emit(IrKind::Seq(items), span))
    }
}
