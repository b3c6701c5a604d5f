//! The ternary select operator.

use lanec_core::{Span, TypeId};

use crate::convert::convert_expr;
use crate::ctx::SemaContext;
use crate::expr::Expr;

fn vector_size(cx: &SemaContext<'_>, ty: TypeId) -> u32 {
    if cx.types.is_vector(ty) {
        cx.types.element_count(ty).unwrap_or(0)
    } else {
        0
    }
}

pub(super) fn type_of(
    test: &Expr,
    if_true: &Expr,
    if_false: &Expr,
    cx: &SemaContext<'_>,
) -> Option<TypeId> {
    let t = cx.types;
    let test_ty = test.type_of(cx)?;
    let true_ty = if_true.type_of(cx)?;
    let false_ty = if_false.type_of(cx)?;

    let becomes_varying =
        t.is_varying(test_ty) || t.is_varying(true_ty) || t.is_varying(false_ty);
    let vec_size = vector_size(cx, test_ty).max(vector_size(cx, true_ty));
    t.more_general_type(
        true_ty,
        false_ty,
        if_true.pos.union(if_false.pos),
        "select expression",
        becomes_varying,
        vec_size,
        cx.diags,
    )
}

pub(super) fn type_check(
    test: Expr,
    if_true: Expr,
    if_false: Expr,
    pos: Span,
    cx: &SemaContext<'_>,
) -> Option<Expr> {
    let t = cx.types;
    let test = test.type_check(cx)?;
    let if_true = if_true.type_check(cx)?;
    let if_false = if_false.type_check(cx)?;

    let true_ty = if_true.type_of(cx)?;
    let false_ty = if_false.type_of(cx)?;
    for (ty, pos) in [(true_ty, if_true.pos), (false_ty, if_false.pos)] {
        if t.is_array(ty) {
            cx.diags.error(
                pos,
                format!(
                    "Array type \"{}\" can't be used in select expression.",
                    t.display(ty)
                ),
            );
            return None;
        }
    }

    let test_ty = test.type_of(cx)?;
    let test = convert_expr(cx, test, t.matching_bool_type(test_ty), "select")?;
    let test_ty = test.type_of(cx)?;

    let promoted = t.more_general_type(
        true_ty,
        false_ty,
        if_true.pos.union(if_false.pos),
        "select expression",
        t.is_varying(test_ty),
        vector_size(cx, test_ty),
        cx.diags,
    )?;
    let if_true = convert_expr(cx, if_true, promoted, "select")?;
    let if_false = convert_expr(cx, if_false, promoted, "select")?;
    Some(Expr::select(test, if_true, if_false, pos))
}

pub(super) fn optimize(
    test: Expr,
    if_true: Expr,
    if_false: Expr,
    pos: Span,
    cx: &SemaContext<'_>,
) -> Option<Expr> {
    let test = test.optimize(cx)?;
    let if_true = if_true.optimize(cx)?;
    let if_false = if_false.optimize(cx)?;

    // A uniform constant test picks its branch at compile time.
    if let Some((value, ty)) = test.constant_parts() {
        if cx.types.is_bool(ty) && cx.types.is_uniform(ty) && value.lane_count() == 1 {
            return Some(if value.lane_as_bool(0) { if_true } else { if_false });
        }
    }
    Some(Expr::select(test, if_true, if_false, pos))
}
