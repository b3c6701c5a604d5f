//! Address-of, dereference, and reference nodes.

use lanec_core::{Span, TypeId, Variability};

use crate::ctx::SemaContext;
use crate::expr::Expr;

/// `&expr`: a pointer to the designated storage. Taking the address of a
/// reference gives a uniform pointer to the reference's target.
pub(super) fn address_of_type(operand: &Expr, cx: &SemaContext<'_>) -> Option<TypeId> {
    let ty = operand.type_of(cx)?;
    if cx.types.is_reference(ty) {
        Some(
            cx.types
                .pointer(cx.types.reference_target(ty), Variability::Uniform),
        )
    } else {
        operand.lvalue_type(cx)
    }
}

/// `*expr`: the pointee, varying when loaded through a varying pointer.
pub(super) fn deref_type(operand: &Expr, cx: &SemaContext<'_>) -> Option<TypeId> {
    let t = cx.types;
    let ty = operand.type_of(cx)?;
    if t.is_reference(ty) {
        return Some(t.reference_target(ty));
    }
    let pointee = t.pointee(ty)?;
    if t.is_uniform(ty) {
        Some(pointee)
    } else {
        Some(t.as_varying(pointee))
    }
}

pub(super) fn deref_type_check(operand: Expr, pos: Span, cx: &SemaContext<'_>) -> Option<Expr> {
    let operand = operand.type_check(cx)?;
    let ty = operand.type_of(cx)?;
    if !cx.types.is_pointer(ty) && !cx.types.is_reference(ty) {
        cx.diags.error(
            operand.pos,
            format!(
                "Illegal to dereference non-pointer type \"{}\".",
                cx.types.display(ty)
            ),
        );
        return None;
    }
    Some(Expr::deref(operand, pos))
}
