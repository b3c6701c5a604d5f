//! Unary operators: increment/decrement, negate, logical not, bit not.

use lanec_core::{CompileError, Span, TypeId};

use crate::convert::convert_expr;
use crate::ctx::SemaContext;
use crate::expr::{Expr, UnaryOp};
use crate::value::ConstValue;

pub(super) fn type_of(op: UnaryOp, operand: &Expr, cx: &SemaContext<'_>) -> Option<TypeId> {
    let ty = operand.type_of(cx)?;
    // Logical not returns a bool of the operand's shape; everything else
    // keeps the operand's type.
    match op {
        UnaryOp::LogicalNot => Some(cx.types.matching_bool_type(ty)),
        _ => Some(ty),
    }
}

pub(super) fn type_check(
    op: UnaryOp,
    operand: Expr,
    pos: Span,
    cx: &SemaContext<'_>,
) -> Option<Expr> {
    let t = cx.types;
    let mut operand = operand.type_check(cx)?;
    let mut ty = operand.type_of(cx)?;

    if matches!(
        op,
        UnaryOp::PreInc | UnaryOp::PreDec | UnaryOp::PostInc | UnaryOp::PostDec
    ) {
        if t.is_const(ty) {
            cx.diags.report(&CompileError::AssignToConst {
                lhs: t.display(ty),
                span: pos,
            });
            return None;
        }
        if t.is_numeric(ty) {
            return Some(Expr::unary(op, operand, pos));
        }
        if !t.is_pointer(ty) {
            cx.diags.error(
                operand.pos,
                format!(
                    "Can only pre/post increment numeric and pointer types, not \"{}\".",
                    t.display(ty)
                ),
            );
            return None;
        }
        if t.is_void_pointer(ty) {
            cx.diags.error(
                operand.pos,
                format!("Illegal to pre/post increment \"{}\" type.", t.display(ty)),
            );
            return None;
        }
        return Some(Expr::unary(op, operand, pos));
    }

    if t.is_reference(ty) {
        let p = operand.pos;
        operand = Expr::deref(operand, p);
        ty = operand.type_of(cx)?;
    }

    match op {
        UnaryOp::Negate => {
            if !t.is_numeric(ty) {
                cx.diags.error(
                    operand.pos,
                    format!(
                        "Negate not allowed for non-numeric type \"{}\".",
                        t.display(ty)
                    ),
                );
                return None;
            }
        }
        UnaryOp::LogicalNot => {
            let bool_ty = t.matching_bool_type(ty);
            operand = convert_expr(cx, operand, bool_ty, "logical not")?;
        }
        UnaryOp::BitNot => {
            if !t.is_int(ty) {
                cx.diags.error(
                    operand.pos,
                    format!(
                        "~ operator can only be used with integer types, not \"{}\".",
                        t.display(ty)
                    ),
                );
                return None;
            }
        }
        _ => unreachable!("inc/dec handled above"),
    }
    Some(Expr::unary(op, operand, pos))
}

pub(super) fn optimize(
    op: UnaryOp,
    operand: Expr,
    pos: Span,
    cx: &SemaContext<'_>,
) -> Option<Expr> {
    let operand = operand.optimize(cx)?;
    let Some((value, ty)) = operand.constant_parts() else {
        return Some(Expr::unary(op, operand, pos));
    };

    let folded = match op {
        // Modifying a constant is an error reported by the type checker;
        // nothing to fold here.
        UnaryOp::PreInc | UnaryOp::PreDec | UnaryOp::PostInc | UnaryOp::PostDec => None,
        UnaryOp::Negate => fold_negate(value),
        UnaryOp::BitNot => fold_bit_not(value),
        UnaryOp::LogicalNot => match value {
            ConstValue::Bool(v) => Some(ConstValue::Bool(v.iter().map(|b| !b).collect())),
            _ => None,
        },
    };

    match folded {
        Some(result) => Some(Expr::constant(result, ty, pos)),
        None => Some(Expr::unary(op, operand, pos)),
    }
}

fn fold_negate(value: &ConstValue) -> Option<ConstValue> {
    Some(match value {
        ConstValue::Int8(v) => ConstValue::Int8(v.iter().map(|x| x.wrapping_neg()).collect()),
        ConstValue::UInt8(v) => ConstValue::UInt8(v.iter().map(|x| x.wrapping_neg()).collect()),
        ConstValue::Int16(v) => ConstValue::Int16(v.iter().map(|x| x.wrapping_neg()).collect()),
        ConstValue::UInt16(v) => {
            ConstValue::UInt16(v.iter().map(|x| x.wrapping_neg()).collect())
        }
        ConstValue::Int32(v) => ConstValue::Int32(v.iter().map(|x| x.wrapping_neg()).collect()),
        ConstValue::UInt32(v) => {
            ConstValue::UInt32(v.iter().map(|x| x.wrapping_neg()).collect())
        }
        ConstValue::Int64(v) => ConstValue::Int64(v.iter().map(|x| x.wrapping_neg()).collect()),
        ConstValue::UInt64(v) => {
            ConstValue::UInt64(v.iter().map(|x| x.wrapping_neg()).collect())
        }
        ConstValue::Float(v) => ConstValue::Float(v.iter().map(|x| -x).collect()),
        ConstValue::Double(v) => ConstValue::Double(v.iter().map(|x| -x).collect()),
        ConstValue::Bool(_) => return None,
    })
}

fn fold_bit_not(value: &ConstValue) -> Option<ConstValue> {
    Some(match value {
        ConstValue::Int8(v) => ConstValue::Int8(v.iter().map(|x| !x).collect()),
        ConstValue::UInt8(v) => ConstValue::UInt8(v.iter().map(|x| !x).collect()),
        ConstValue::Int16(v) => ConstValue::Int16(v.iter().map(|x| !x).collect()),
        ConstValue::UInt16(v) => ConstValue::UInt16(v.iter().map(|x| !x).collect()),
        ConstValue::Int32(v) => ConstValue::Int32(v.iter().map(|x| !x).collect()),
        ConstValue::UInt32(v) => ConstValue::UInt32(v.iter().map(|x| !x).collect()),
        ConstValue::Int64(v) => ConstValue::Int64(v.iter().map(|x| !x).collect()),
        ConstValue::UInt64(v) => ConstValue::UInt64(v.iter().map(|x| !x).collect()),
        _ => return None,
    })
}
