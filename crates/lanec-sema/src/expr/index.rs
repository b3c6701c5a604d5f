//! Indexing into arrays, short vectors, and pointers.

use lanec_core::{BasicType, Span, TypeId, Variability};

use crate::convert::convert_expr;
use crate::ctx::SemaContext;
use crate::expr::Expr;

pub(super) fn type_of(base: &Expr, index: &Expr, cx: &SemaContext<'_>) -> Option<TypeId> {
    let t = cx.types;
    let base_ty = base.type_of(cx)?;
    let index_ty = index.type_of(cx)?;

    let (element, base_varying) = if let Some(pointee) = t.pointee(base_ty) {
        (pointee, t.is_varying(base_ty))
    } else {
        let seq = t.reference_target(base_ty);
        (t.element_type(seq, 0)?, false)
    };

    // A varying index (or a varying pointer base) makes the loaded value
    // varying even when the element type is uniform.
    if t.is_varying(index_ty) || base_varying {
        Some(t.as_varying(element))
    } else {
        Some(element)
    }
}

pub(super) fn lvalue_type(base: &Expr, index: &Expr, cx: &SemaContext<'_>) -> Option<TypeId> {
    let t = cx.types;
    let mut base_lv = base.lvalue_type(cx)?;
    let index_ty = index.type_of(cx)?;

    if t.is_reference(base_lv) {
        base_lv = t.pointer(t.reference_target(base_lv), Variability::Uniform);
    }
    let inner = t.pointee(base_lv)?;

    let element = if t.is_sequential(inner) {
        t.element_type(inner, 0)?
    } else {
        t.pointee(inner)?
    };
    let variability = if t.is_uniform(base_lv) && t.is_uniform(index_ty) {
        Variability::Uniform
    } else {
        Variability::Varying
    };
    Some(t.pointer(element, variability))
}

pub(super) fn type_check(base: Expr, index: Expr, pos: Span, cx: &SemaContext<'_>) -> Option<Expr> {
    let t = cx.types;
    let base = base.type_check(cx)?;
    let index = index.type_check(cx)?;
    let base_ty = base.type_of(cx)?;
    let index_ty = index.type_of(cx)?;

    if !t.is_sequential(t.reference_target(base_ty)) && !t.is_pointer(base_ty) {
        cx.diags.error(
            pos,
            format!(
                "Trying to index into non-array, vector, or pointer type \"{}\".",
                t.display(base_ty)
            ),
        );
        return None;
    }

    // Constant indexes into a sequence of known size get a bounds check,
    // before conversion wraps the literal in a cast.
    let seq = t.reference_target(base_ty);
    if let (Some(count), Some((value, _))) = (t.element_count(seq), index.constant_parts()) {
        if t.is_sequential(seq) && count > 0 {
            for i in 0..value.lane_count() {
                let idx = value.lane_as_i64(i);
                if idx < 0 || idx >= count as i64 {
                    cx.diags.warning(
                        index.pos,
                        format!(
                            "Array index \"{}\" may be out of bounds for {} element array.",
                            idx, count
                        ),
                    );
                }
            }
        }
    }

    let uniform_index = t.is_uniform(index_ty) && !cx.opt.disable_uniform_memory_optimizations;
    let want = if uniform_index {
        t.uniform(BasicType::Int32)
    } else {
        t.varying(BasicType::Int32)
    };
    let index = convert_expr(cx, index, want, "array index")?;

    Some(Expr::index(base, index, pos))
}
