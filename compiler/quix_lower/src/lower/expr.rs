//! Expressions: operators, literals, calls and fstrings.

use quix_ir::node::expr::{Binary, CallArg, FStringPart, PostUnary, Unary};
use quix_ir::{Name, NodeId, Operator, Span};

use super::{LowerResult, Lowerer};
use crate::ir::{IrArg, IrId, IrKind, IrOp};

/// Binary operators with a one-to-one IR counterpart.
fn plain_binary(op: Operator) -> Option<IrOp> {
    Some(match op {
        Operator::Plus => IrOp::Plus,
        Operator::Minus => IrOp::Minus,
        Operator::Times => IrOp::Times,
        Operator::Slash => IrOp::Slash,
        Operator::Percent => IrOp::Percent,
        Operator::BitAnd => IrOp::BitAnd,
        Operator::BitOr => IrOp::BitOr,
        Operator::BitXor => IrOp::BitXor,
        Operator::LogicAnd => IrOp::LogicAnd,
        Operator::LogicOr => IrOp::LogicOr,
        Operator::LShift => IrOp::LShift,
        Operator::RShift => IrOp::RShift,
        Operator::Rotr => IrOp::Rotr,
        Operator::Rotl => IrOp::Rotl,
        Operator::Set => IrOp::Set,
        Operator::Lt => IrOp::Lt,
        Operator::Gt => IrOp::Gt,
        Operator::Le => IrOp::Le,
        Operator::Ge => IrOp::Ge,
        Operator::Eq => IrOp::Eq,
        Operator::Ne => IrOp::Ne,
        _ => return None,
    })
}

/// Compound assignments, by the operator they apply before storing.
fn compound(op: Operator) -> Option<IrOp> {
    Some(match op {
        Operator::PlusSet => IrOp::Plus,
        Operator::MinusSet => IrOp::Minus,
        Operator::TimesSet => IrOp::Times,
        Operator::SlashSet => IrOp::Slash,
        Operator::PercentSet => IrOp::Percent,
        Operator::BitAndSet => IrOp::BitAnd,
        Operator::BitOrSet => IrOp::BitOr,
        Operator::BitXorSet => IrOp::BitXor,
        Operator::LogicAndSet => IrOp::LogicAnd,
        Operator::LogicOrSet => IrOp::LogicOr,
        Operator::LShiftSet => IrOp::LShift,
        Operator::RShiftSet => IrOp::RShift,
        Operator::RotrSet => IrOp::Rotr,
        Operator::RotlSet => IrOp::Rotl,
        _ => return None,
    })
}

fn plain_unary(op: Operator) -> Option<IrOp> {
    Some(match op {
        Operator::Plus => IrOp::Plus,
        Operator::Minus => IrOp::Minus,
        Operator::Times => IrOp::Times,
        Operator::BitAnd => IrOp::BitAnd,
        Operator::BitXor => IrOp::BitXor,
        Operator::BitNot => IrOp::BitNot,
        Operator::LogicNot => IrOp::LogicNot,
        Operator::Inc => IrOp::Inc,
        Operator::Dec => IrOp::Dec,
        Operator::Alignof => IrOp::Alignof,
        Operator::Offsetof => IrOp::Offsetof,
        Operator::Bitsizeof => IrOp::Bitsizeof,
        _ => return None,
    })
}

impl Lowerer<'_> {
    fn binary_node(&mut self, op: IrOp, lhs: IrId, rhs: IrId, span: Span) -> IrId {
        self.emit(IrKind::Binary { op, lhs, rhs }, span)
    }

    pub(super) fn binary(&mut self, id: NodeId, b: &Binary) -> LowerResult<IrId> {
        let span = self.src.span(id);
        if let Some(op) = plain_binary(b.op) {
            let lhs = self.required(id, b.lhs, "a left operand")?;
            let rhs = self.required(id, b.rhs, "a right operand")?;
            return Ok(self.binary_node(op, lhs, rhs, span));
        }
        if let Some(op) = compound(b.op) {
            // The target is read and written, so it appears twice.
            let target = self.required(id, b.lhs, "a left operand")?;
            let lhs = self.required(id, b.lhs, "a left operand")?;
            let rhs = self.required(id, b.rhs, "a right operand")?;
            let value = self.binary_node(op, lhs, rhs, span);
            return Ok(self.binary_node(IrOp::Set, target, value, span));
        }
        match b.op {
            Operator::LogicXor => self.logic_xor(id, b),
            Operator::LogicXorSet => {
                let target = self.required(id, b.lhs, "a left operand")?;
                let value = self.logic_xor(id, b)?;
                Ok(self.binary_node(IrOp::Set, target, value, span))
            }
            Operator::As | Operator::BitcastAs => {
                let op = if b.op == Operator::As {
                    IrOp::CastAs
                } else {
                    IrOp::BitcastAs
                };
                let lhs = self.required(id, b.lhs, "a left operand")?;
                let ty = self.ty(id, b.rhs, "a target type")?;
                Ok(self.binary_node(op, lhs, ty, span))
            }
            Operator::Is => {
                let lhs = self.required(id, b.lhs, "a left operand")?;
                let rhs = self.required(id, b.rhs, "a right operand")?;
                Ok(self.call(self.name_is, vec![lhs, rhs], span))
            }
            Operator::In => {
                // `a in b` asks the container: `b.has(a)`.
                let needle = self.required(id, b.lhs, "a left operand")?;
                let haystack = self.required(id, b.rhs, "a right operand")?;
                let func = self.emit(
                    IrKind::Field {
                        base: haystack,
                        field: self.name_has,
                    },
                    span,
                );
                let args = vec![IrArg {
                    name: self.name_first_arg,
                    value: needle,
                }];
                Ok(self.emit(IrKind::Call { func, args }, span))
            }
            op => Err(self.unsupported(format!("binary '{op}'"), id)),
        }
    }

    /// `(a || b) && !(a && b)`, with both operands lowered twice.
    fn logic_xor(&mut self, id: NodeId, b: &Binary) -> LowerResult<IrId> {
        let span = self.src.span(id);
        let pair = |this: &mut Self, op| -> LowerResult<IrId> {
            let lhs = this.required(id, b.lhs, "a left operand")?;
            let rhs = this.required(id, b.rhs, "a right operand")?;
            Ok(this.binary_node(op, lhs, rhs, span))
        };
        let either = pair(self, IrOp::LogicOr)?;
        let both = pair(self, IrOp::LogicAnd)?;
        let not_both = self.not(both, span);
        Ok(self.binary_node(IrOp::LogicAnd, either, not_both, span))
    }

    pub(super) fn unary(&mut self, id: NodeId, u: &Unary) -> LowerResult<IrId> {
        let span = self.src.span(id);
        if let Some(op) = plain_unary(u.op) {
            let rhs = self.required(id, u.rhs, "an operand")?;
            return Ok(self.emit(IrKind::Unary { op, rhs }, span));
        }
        match u.op {
            Operator::Sizeof => {
                // Bytes, rounded up from the bit size.
                let rhs = self.required(id, u.rhs, "an operand")?;
                let bits = self.emit(
                    IrKind::Unary {
                        op: IrOp::Bitsizeof,
                        rhs,
                    },
                    span,
                );
                let eight = self.int(self.name_eight, IrId::INVALID, span);
                let bytes = self.binary_node(IrOp::Slash, bits, eight, span);
                Ok(self.call(self.name_ceil, vec![bytes], span))
            }
            Operator::Typeof => {
                let rhs = self.required(id, u.rhs, "an operand")?;
                Ok(self.call(self.name_typeof, vec![rhs], span))
            }
            op => Err(self.unsupported(format!("unary '{op}'"), id)),
        }
    }

    pub(super) fn post_unary(&mut self, id: NodeId, u: &PostUnary) -> LowerResult<IrId> {
        let op = match u.op {
            Operator::Inc => IrOp::Inc,
            Operator::Dec => IrOp::Dec,
            op => return Err(self.unsupported(format!("postfix '{op}'"), id)),
        };
        let lhs = self.required(id, u.lhs, "an operand")?;
        Ok(self.emit(IrKind::PostUnary { op, lhs }, self.src.span(id)))
    }

    pub(super) fn args(&mut self, id: NodeId, args: &[CallArg]) -> LowerResult<Vec<IrArg>> {
        args.iter()
            .map(|arg| {
                let value = self.required(id, arg.value, "an argument")?;
                Ok(IrArg {
                    name: arg.name,
                    value,
                })
            })
            .collect()
    }

    pub(super) fn bool_literal(&mut self, value: bool, span: Span) -> IrId {
        let ty = self.emit(IrKind::U1, span);
        let value = if value { self.name_one } else { self.name_zero };
        self.int(value, ty, span)
    }

    pub(super) fn char_literal(&mut self, value: char, span: Span) -> IrId {
        let ty = self.emit(IrKind::U8, span);
        let value = self.intern(&u32::from(value).to_string());
        self.int(value, ty, span)
    }

    pub(super) fn null_literal(&mut self, span: Span) -> IrId {
        let void = self.void(span);
        let ty = self.emit(IrKind::Ptr(void), span);
        self.int(self.name_zero, ty, span)
    }

    fn cast_to_string(&mut self, value: IrId, span: Span) -> IrId {
        let string = self.emit(IrKind::StringTy, span);
        self.binary_node(IrOp::CastAs, value, string, span)
    }

    /// Concatenation of the parts, each hole cast to a string.
    pub(super) fn fstring(&mut self, id: NodeId, parts: &[FStringPart]) -> LowerResult<IrId> {
        let span = self.src.span(id);
        match parts {
            [] => return Ok(self.emit(IrKind::Str(Name::EMPTY), span)),
            [FStringPart::Text(text)] => return Ok(self.emit(IrKind::Str(*text), span)),
            [FStringPart::Expr(hole)] => {
                let value = self.required(id, *hole, "an fstring hole")?;
                return Ok(self.cast_to_string(value, span));
            }
            _ => {}
        }
        let mut acc = self.emit(IrKind::Str(Name::EMPTY), span);
        for part in parts {
            let piece = match part {
                FStringPart::Text(text) => self.emit(IrKind::Str(*text), span),
                FStringPart::Expr(hole) => {
                    let value = self.required(id, *hole, "an fstring hole")?;
                    self.cast_to_string(value, span)
                }
            };
            acc = self.binary_node(IrOp::Plus, acc, piece, span);
        }
        Ok(acc)
    }
}
