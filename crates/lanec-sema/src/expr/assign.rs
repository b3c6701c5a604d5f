//! Assignment and compound assignment.

use lanec_core::{CompileError, Span, TypeId};

use crate::convert::convert_expr;
use crate::ctx::SemaContext;
use crate::expr::{AssignOp, Expr, ExprKind};
use crate::overload;

pub(super) fn type_check(
    op: AssignOp,
    lhs: Expr,
    rhs: Expr,
    pos: Span,
    cx: &SemaContext<'_>,
) -> Option<Expr> {
    let t = cx.types;
    let mut lhs = lhs.type_check(cx)?;
    let mut rhs = rhs.type_check(cx)?;

    if t.is_reference(lhs.type_of(cx)?) {
        let p = lhs.pos;
        lhs = Expr::deref(lhs, p);
    }

    // Assigning an overloaded function name to a function pointer: the
    // pointer's parameter list picks the overload.
    if matches!(rhs.kind, ExprKind::FunctionSymbol { .. }) {
        let lhs_ty = lhs.type_of(cx)?;
        let fn_ty = t
            .pointee(lhs_ty)
            .filter(|&pointee| t.is_function(pointee));
        let Some(fn_ty) = fn_ty else {
            cx.diags.error(
                pos,
                format!(
                    "Can't assign function pointer to type \"{}\".",
                    t.display(lhs_ty)
                ),
            );
            return None;
        };
        let (_, params, _, _) = t.function_signature(fn_ty).expect("function type");
        let rhs_pos = rhs.pos;
        if !overload::resolve_overload(cx, &mut rhs, rhs_pos, &params, None) {
            cx.diags.error(
                pos,
                "Unable to find overloaded function for function pointer assignment.".to_string(),
            );
            return None;
        }
    }

    if lhs.base_symbol().is_none() {
        cx.diags.report(&CompileError::NotAssignable { span: lhs.pos });
        return None;
    }

    let lhs_ty = lhs.type_of(cx)?;
    if t.is_pointer(lhs_ty) {
        match op {
            AssignOp::AddAssign | AssignOp::SubAssign => {
                if t.is_void_pointer(lhs_ty) {
                    cx.diags.report(&CompileError::VoidPointerArithmetic {
                        ty: t.display(lhs_ty),
                        span: pos,
                    });
                    return None;
                }
                let delta = cx.pointer_offset_type(t.is_varying(lhs_ty));
                rhs = convert_expr(cx, rhs, delta, op.token())?;
            }
            AssignOp::Assign => {
                rhs = convert_expr(cx, rhs, lhs_ty, "assignment")?;
            }
            _ => {
                cx.diags.error(
                    pos,
                    format!(
                        "Assignment operator \"{}\" is illegal with pointer types.",
                        op.token()
                    ),
                );
                return None;
            }
        }
    } else if t.is_array(lhs_ty) {
        cx.diags.error(
            pos,
            format!("Illegal to assign to array type \"{}\".", t.display(lhs_ty)),
        );
        return None;
    } else {
        rhs = convert_expr(cx, rhs, lhs_ty, op.token())?;
    }

    if t.is_const(lhs_ty) {
        cx.diags.report(&CompileError::AssignToConst {
            lhs: t.display(lhs_ty),
            span: pos,
        });
        return None;
    }

    // Whole-struct assignment is rejected when any member, transitively, is
    // const.
    if t.is_struct(lhs_ty) && report_const_member(cx, lhs_ty, pos) {
        return None;
    }

    Some(Expr::assign(op, lhs, rhs, pos))
}

/// Walk a struct type (and its nested structs) looking for a const member;
/// report and return true if one is found.
fn report_const_member(cx: &SemaContext<'_>, struct_ty: TypeId, pos: Span) -> bool {
    let t = cx.types;
    let count = t.element_count(struct_ty).unwrap_or(0);
    for i in 0..count as usize {
        let Some(member_ty) = t.element_type(struct_ty, i) else {
            continue;
        };
        if t.is_const(member_ty) {
            cx.diags.report(&CompileError::ConstStructMember {
                struct_type: t.display(struct_ty),
                member: t.struct_member_name(struct_ty, i).unwrap_or_default(),
                member_type: t.display(member_ty),
                span: pos,
            });
            return true;
        }
        if t.is_struct(member_ty) && report_const_member(cx, member_ty, pos) {
            return true;
        }
    }
    false
}
