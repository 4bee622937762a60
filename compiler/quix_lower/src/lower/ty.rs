//! Type constructors.

use quix_ir::node::ty::StructTyField;
use quix_ir::{NodeCategory, NodeData, NodeId};

use super::{LowerResult, Lowerer};
use crate::ir::{IrId, IrKind};
use crate::LowerError;

impl Lowerer<'_> {
    /// Lower a slot that must hold a type, looking through `TypeExpr`.
    pub(super) fn ty(
        &mut self,
        parent: NodeId,
        child: NodeId,
        what: &'static str,
    ) -> LowerResult<IrId> {
        let src = self.src;
        if !child.is_valid() || !src.contains(child) {
            return Err(self.malformed(parent, what));
        }
        match src.get(child) {
            NodeData::TypeExpr(wrap) => self.ty(child, wrap.inner, what),
            data if data.kind().category() == NodeCategory::Type => self.lower(child),
            data => Err(LowerError::NotAType {
                found: data.kind(),
                span: src.span(child),
            }),
        }
    }

    fn item_ty(&mut self, id: NodeId, item: NodeId) -> LowerResult<IrId> {
        self.ty(id, item, "an item type")
    }

    fn field_types(&mut self, id: NodeId, items: &[NodeId]) -> LowerResult<Vec<IrId>> {
        items
            .iter()
            .map(|&item| self.ty(id, item, "a field type"))
            .collect()
    }

    fn struct_fields(&mut self, id: NodeId, fields: &[StructTyField]) -> LowerResult<Vec<IrId>> {
        fields
            .iter()
            .map(|field| self.ty(id, field.ty, "a field type"))
            .collect()
    }

    /// Lower a node from the type category.
    pub(super) fn type_node(&mut self, id: NodeId) -> LowerResult<IrId> {
        let src = self.src;
        let span = src.span(id);
        let kind = match src.get(id) {
            NodeData::U1 => IrKind::U1,
            NodeData::U8 => IrKind::U8,
            NodeData::U16 => IrKind::U16,
            NodeData::U32 => IrKind::U32,
            NodeData::U64 => IrKind::U64,
            NodeData::U128 => IrKind::U128,
            NodeData::I8 => IrKind::I8,
            NodeData::I16 => IrKind::I16,
            NodeData::I32 => IrKind::I32,
            NodeData::I64 => IrKind::I64,
            NodeData::I128 => IrKind::I128,
            NodeData::F32 => IrKind::F32,
            NodeData::F64 => IrKind::F64,
            NodeData::VoidTy => IrKind::Void,
            NodeData::StringTy => IrKind::StringTy,
            NodeData::MutTy(t) => IrKind::Mut(self.item_ty(id, t.item)?),
            NodeData::PtrTy(t) => IrKind::Ptr(self.item_ty(id, t.item)?),
            NodeData::VectorTy(t) => IrKind::ListTy(self.item_ty(id, t.item)?),
            NodeData::SetTy(t) => IrKind::SetTy(self.item_ty(id, t.item)?),
            NodeData::OptionalTy(t) => IrKind::OptionalTy(self.item_ty(id, t.item)?),
            NodeData::OpaqueTy(n) => IrKind::Opaque(n.name),
            NodeData::UnresTy(n) => IrKind::Named(n.name),
            NodeData::EnumTy(e) => {
                if e.member.is_valid() {
                    return self.ty(id, e.member, "a member type");
                }
                IrKind::Named(e.name)
            }
            NodeData::StructTy(s) => IrKind::Struct {
                fields: self.struct_fields(id, &s.fields)?,
                packed: false,
            },
            NodeData::GroupTy(l) | NodeData::TupleTy(l) => IrKind::Struct {
                fields: self.field_types(id, &l.items)?,
                packed: false,
            },
            NodeData::RegionTy(l) => IrKind::Struct {
                fields: self.field_types(id, &l.items)?,
                packed: true,
            },
            NodeData::UnionTy(l) => IrKind::Union(self.field_types(id, &l.items)?),
            NodeData::ArrayTy(a) => {
                let item = self.item_ty(id, a.item)?;
                let size = self.required(id, a.size, "a size")?;
                IrKind::Array { item, size }
            }
            NodeData::MapTy(m) => {
                let key = self.ty(id, m.key, "a key type")?;
                let value = self.ty(id, m.value, "a value type")?;
                IrKind::MapTy { key, value }
            }
            NodeData::FnTy(f) => {
                let params = f
                    .params
                    .iter()
                    .map(|param| self.ty(id, param.ty, "a parameter type"))
                    .collect::<LowerResult<_>>()?;
                IrKind::FnTy {
                    params,
                    ret: self.return_ty(id, f)?,
                    variadic: f.props.variadic,
                }
            }
            data => {
                return Err(LowerError::NotAType {
                    found: data.kind(),
                    span,
                })
            }
        };
        Ok(self.emit(kind, span))
    }
}
