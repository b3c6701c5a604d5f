//! Binary operators: arithmetic, comparisons, bit operations, shifts,
//! short-circuit logic, pointer arithmetic, and the comma operator.

use lanec_core::{BasicType, CompileError, Span, TypeId};

use crate::convert::convert_expr;
use crate::ctx::SemaContext;
use crate::expr::{array_to_pointer, BinaryOp, Expr};
use crate::value::ConstValue;

pub(super) fn type_of(
    op: BinaryOp,
    lhs: &Expr,
    rhs: &Expr,
    pos: Span,
    cx: &SemaContext<'_>,
) -> Option<TypeId> {
    let t = cx.types;
    let t0 = lhs.type_of(cx)?;
    let t1 = rhs.type_of(cx)?;

    if op == BinaryOp::Comma {
        return Some(t1);
    }

    if t.is_pointer(t0) {
        if op == BinaryOp::Add {
            // ptr + int -> ptr
            return Some(t0);
        }
        if op == BinaryOp::Sub {
            if t.is_pointer(t1) {
                // ptr - ptr -> pointer-width int
                return Some(cx.pointer_offset_type(t.is_varying(t0) || t.is_varying(t1)));
            }
            // ptr - int -> ptr
            return Some(t0);
        }
        // Comparisons fall through to the promotion below.
    }

    let promoted = t.more_general_type(t0, t1, pos, op.token(), false, 0, cx.diags)?;
    match op {
        BinaryOp::Add
        | BinaryOp::Sub
        | BinaryOp::Mul
        | BinaryOp::Div
        | BinaryOp::Mod
        | BinaryOp::BitAnd
        | BinaryOp::BitXor
        | BinaryOp::BitOr => Some(promoted),
        BinaryOp::Lt
        | BinaryOp::Gt
        | BinaryOp::Le
        | BinaryOp::Ge
        | BinaryOp::Equal
        | BinaryOp::NotEqual
        | BinaryOp::LogicalAnd
        | BinaryOp::LogicalOr => Some(t.matching_bool_type(promoted)),
        // Shifts keep the left operand's type, made varying by a varying
        // shift amount.
        BinaryOp::Shl | BinaryOp::Shr => {
            if t.is_varying(t1) {
                Some(t.as_varying(t0))
            } else {
                Some(t0)
            }
        }
        BinaryOp::Comma => Some(t1),
    }
}

pub(super) fn type_check(
    op: BinaryOp,
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
    if t.is_reference(rhs.type_of(cx)?) {
        let p = rhs.pos;
        rhs = Expr::deref(rhs, p);
    }

    if t.is_array(lhs.type_of(cx)?) {
        lhs = array_to_pointer(lhs, cx)?;
    }
    if t.is_array(rhs.type_of(cx)?) {
        rhs = array_to_pointer(rhs, cx)?;
    }

    let mut t0 = lhs.type_of(cx)?;
    let mut t1 = rhs.type_of(cx)?;

    // Pointer difference.
    if t.is_pointer(t0) && t.is_pointer(t1) && op == BinaryOp::Sub {
        for ty in [t0, t1] {
            if t.is_void_pointer(ty) {
                cx.diags.report(&CompileError::VoidPointerArithmetic {
                    ty: t.display(ty),
                    span: pos,
                });
                return None;
            }
        }
        let common = t.more_general_type(t0, t1, pos, "-", false, 0, cx.diags)?;
        let lhs = convert_expr(cx, lhs, common, "pointer subtraction")?;
        let rhs = convert_expr(cx, rhs, common, "pointer subtraction")?;
        return Some(Expr::binary(op, lhs, rhs, pos));
    }

    // Pointer offsetting: ptr + int, int + ptr, ptr - int.
    if ((t.is_pointer(t0) || t.is_pointer(t1)) && op == BinaryOp::Add)
        || (t.is_pointer(t0) && op == BinaryOp::Sub)
    {
        if t.is_pointer(t0) && t.is_pointer(t1) {
            cx.diags.error(
                pos,
                format!(
                    "Illegal to add two pointer types \"{}\" and \"{}\".",
                    t.display(t0),
                    t.display(t1)
                ),
            );
            return None;
        }
        if t.is_pointer(t1) {
            // Canonical order puts the pointer first.
            std::mem::swap(&mut lhs, &mut rhs);
            std::mem::swap(&mut t0, &mut t1);
        }
        if t.is_void_pointer(t0) {
            cx.diags.report(&CompileError::VoidPointerArithmetic {
                ty: t.display(t0),
                span: pos,
            });
            return None;
        }
        if t.is_varying(t1) && t.is_uniform(t0) {
            lhs = convert_expr(cx, lhs, t.as_varying(t0), "pointer addition")?;
            t0 = lhs.type_of(cx)?;
        }
        let offset = cx.pointer_offset_type(t.is_varying(t0));
        let rhs = convert_expr(cx, rhs, offset, op.token())?;
        return Some(Expr::binary(op, lhs, rhs, pos));
    }

    match op {
        BinaryOp::Shl | BinaryOp::Shr | BinaryOp::BitAnd | BinaryOp::BitXor | BinaryOp::BitOr => {
            // Integer or bool operands only; no implicit conversions from
            // floats here.
            for (ty, operand_pos, which) in [(t0, lhs.pos, "First"), (t1, rhs.pos, "Second")] {
                if !t.is_int(ty) && !t.is_bool(ty) {
                    cx.diags.error(
                        operand_pos,
                        format!(
                            "{} operand to binary operator \"{}\" must be an integer or bool.",
                            which,
                            op.token()
                        ),
                    );
                    return None;
                }
            }
            if matches!(op, BinaryOp::Shl | BinaryOp::Shr) {
                if t.is_varying(t1) && t.is_uniform(t0) {
                    lhs = convert_expr(cx, lhs, t.as_varying(t0), "shift operator")?;
                    t0 = lhs.type_of(cx)?;
                }
                let rhs = convert_expr(cx, rhs, t0, "shift operator")?;
                Some(Expr::binary(op, lhs, rhs, pos))
            } else {
                let promoted =
                    t.more_general_type(t0, t1, lhs.pos, "binary bit op", false, 0, cx.diags)?;
                let lhs = convert_expr(cx, lhs, promoted, "binary bit op")?;
                let rhs = convert_expr(cx, rhs, promoted, "binary bit op")?;
                Some(Expr::binary(op, lhs, rhs, pos))
            }
        }
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
            // Numeric operands; modulo rejects floats.
            for (ty, operand_pos) in [(t0, lhs.pos), (t1, rhs.pos)] {
                let bad_mod = op == BinaryOp::Mod && t.is_float(ty);
                if !numeric_shape(cx, ty) || bad_mod {
                    cx.diags.error(
                        operand_pos,
                        format!(
                            "Operand to binary operator \"{}\" is of invalid type \"{}\".",
                            op.token(),
                            t.display(ty)
                        ),
                    );
                    return None;
                }
            }
            let promoted = t.more_general_type(t0, t1, lhs.pos, op.token(), false, 0, cx.diags)?;
            let lhs = convert_expr(cx, lhs, promoted, op.token())?;
            let rhs = convert_expr(cx, rhs, promoted, op.token())?;
            Some(Expr::binary(op, lhs, rhs, pos))
        }
        BinaryOp::Lt
        | BinaryOp::Gt
        | BinaryOp::Le
        | BinaryOp::Ge
        | BinaryOp::Equal
        | BinaryOp::NotEqual => {
            // A literal zero against a pointer operand is a null pointer.
            if t.is_pointer(t0) && rhs.is_all_int_zeros(cx) {
                rhs = Expr::null_pointer(rhs.pos);
                t1 = rhs.type_of(cx)?;
            } else if t.is_pointer(t1) && lhs.is_all_int_zeros(cx) {
                lhs = Expr::null_pointer(lhs.pos);
                t0 = lhs.type_of(cx)?;
            }

            if !t.is_pointer(t0) && !t.is_pointer(t1) {
                for (ty, operand_pos, which) in [(t0, lhs.pos, "First"), (t1, rhs.pos, "Second")] {
                    if !t.is_bool(ty) && !numeric_shape(cx, ty) {
                        cx.diags.error(
                            operand_pos,
                            format!(
                                "{} operand to operator \"{}\" is of non-comparable type \"{}\".",
                                which,
                                op.token(),
                                t.display(ty)
                            ),
                        );
                        return None;
                    }
                }
            }
            let promoted = t.more_general_type(t0, t1, lhs.pos, op.token(), false, 0, cx.diags)?;
            let lhs = convert_expr(cx, lhs, promoted, op.token())?;
            let rhs = convert_expr(cx, rhs, promoted, op.token())?;
            Some(Expr::binary(op, lhs, rhs, pos))
        }
        BinaryOp::LogicalAnd | BinaryOp::LogicalOr => {
            // Convert both sides to a bool of the more general shape.
            let vec0 = t.is_vector(t0).then(|| t.element_count(t0)).flatten();
            let vec1 = t.is_vector(t1).then(|| t.element_count(t1)).flatten();
            let bool_base = if t.is_uniform(t0) && t.is_uniform(t1) {
                t.uniform(BasicType::Bool)
            } else {
                t.varying(BasicType::Bool)
            };
            let dest = match (vec0, vec1) {
                (Some(n0), Some(n1)) => {
                    if n0 != n1 {
                        cx.diags.error(
                            pos,
                            format!(
                                "Can't do logical operation \"{}\" between vector types of different sizes ({} vs. {}).",
                                op.token(),
                                n0,
                                n1
                            ),
                        );
                        return None;
                    }
                    t.vector(bool_base, n0)
                }
                (Some(n), None) | (None, Some(n)) => t.vector(bool_base, n),
                (None, None) => bool_base,
            };
            let lhs = convert_expr(cx, lhs, dest, op.token())?;
            let rhs = convert_expr(cx, rhs, dest, op.token())?;
            Some(Expr::binary(op, lhs, rhs, pos))
        }
        BinaryOp::Comma => Some(Expr::binary(op, lhs, rhs, pos)),
    }
}

/// Numeric for binary-operator purposes: numeric scalars and short vectors
/// of numeric scalars.
fn numeric_shape(cx: &SemaContext<'_>, ty: TypeId) -> bool {
    let t = cx.types;
    if t.is_numeric(ty) {
        return true;
    }
    t.is_vector(ty)
        && t.element_type(ty, 0)
            .is_some_and(|e| t.is_numeric(e))
}

pub(super) fn optimize(
    op: BinaryOp,
    lhs: Expr,
    rhs: Expr,
    pos: Span,
    cx: &SemaContext<'_>,
) -> Option<Expr> {
    let t = cx.types;
    let lhs = lhs.optimize(cx)?;
    let rhs = rhs.optimize(cx)?;

    if cx.opt.fast_math && op == BinaryOp::Div {
        // x / constant -> x * (1/constant).
        if let Some((value, ty)) = rhs.constant_parts() {
            if let ConstValue::Float(lanes) = value {
                let inv = ConstValue::Float(lanes.iter().map(|f| 1.0 / f).collect());
                let inv = Expr::constant(inv, ty, rhs.pos);
                let product = Expr::binary(BinaryOp::Mul, lhs, inv, pos);
                return product.type_check(cx)?.optimize(cx);
            }
        }
        // x / y -> x * rcp(y) when the standard library provides rcp.
        if rhs.constant_parts().is_none() {
            let rhs_ty = rhs.type_of(cx)?;
            if t.atomic_basic(rhs_ty) == Some(BasicType::Float) && t.is_atomic(rhs_ty) {
                let rcp_overloads = cx.symtab.lookup_function_any("rcp");
                if rcp_overloads.is_empty() {
                    cx.diags.performance_warning(
                        pos,
                        "rcp() not found from stdlib. Can't apply fast-math rcp optimization.",
                    );
                } else {
                    let rcp_pos = rhs.pos;
                    let callee = Expr::function_symbol("rcp", rcp_overloads, pos);
                    let call = Expr::call(callee, vec![rhs], rcp_pos);
                    let call = call.type_check(cx)?.optimize(cx)?;
                    let product = Expr::binary(BinaryOp::Mul, lhs, call, pos);
                    return product.type_check(cx)?.optimize(cx);
                }
            }
        }
    }

    let (Some((va, ty)), Some((vb, _))) = (lhs.constant_parts(), rhs.constant_parts()) else {
        // Short-circuit folding when the left side alone decides.
        if let Some((va, _)) = lhs.constant_parts() {
            if let Some(folded) = fold_short_circuit(op, va, &lhs, &rhs, pos, cx) {
                return Some(folded);
            }
        }
        return Some(Expr::binary(op, lhs, rhs, pos));
    };

    match fold_constants(op, va, vb, ty, cx) {
        Some((value, result_ty)) => Some(Expr::constant(value, result_ty, pos)),
        None => Some(Expr::binary(op, lhs, rhs, pos)),
    }
}

/// `false && x` is false and `true || x` is true, for scalar bool results.
fn fold_short_circuit(
    op: BinaryOp,
    lhs_value: &ConstValue,
    lhs: &Expr,
    rhs: &Expr,
    pos: Span,
    cx: &SemaContext<'_>,
) -> Option<Expr> {
    let t = cx.types;
    let result_ty = type_of(op, lhs, rhs, pos, cx)?;
    if !t.is_bool(result_ty) || !t.is_atomic(result_ty) {
        return None;
    }
    let lanes = if t.is_varying(result_ty) { cx.lanes() } else { 1 };
    match op {
        BinaryOp::LogicalAnd if lhs_value.all_false() => Some(Expr::constant(
            ConstValue::Bool(vec![false; lanes]),
            result_ty,
            pos,
        )),
        BinaryOp::LogicalOr if lhs_value.all_true() => Some(Expr::constant(
            ConstValue::Bool(vec![true; lanes]),
            result_ty,
            pos,
        )),
        _ => None,
    }
}

/// Lane-wise folding of two equal-typed constants. Integer arithmetic wraps
/// two's-complement; floating point goes through a double-precision
/// intermediate and narrows at the end; division by a zero lane and shifts
/// by at least the operand width are left unfolded.
fn fold_constants(
    op: BinaryOp,
    a: &ConstValue,
    b: &ConstValue,
    ty: TypeId,
    cx: &SemaContext<'_>,
) -> Option<(ConstValue, TypeId)> {
    use BinaryOp::*;
    let bool_ty = cx.types.matching_bool_type(ty);

    macro_rules! lanes {
        ($x:expr, $y:expr, $f:expr) => {
            $x.iter().zip($y.iter()).map($f).collect()
        };
    }

    macro_rules! int_arm {
        ($variant:ident, $x:expr, $y:expr, $ty:ty) => {{
            let x = $x;
            let y = $y;
            let width = (std::mem::size_of::<$ty>() * 8) as u64;
            let value = match op {
                Add => ConstValue::$variant(lanes!(x, y, |(p, q)| p.wrapping_add(*q))),
                Sub => ConstValue::$variant(lanes!(x, y, |(p, q)| p.wrapping_sub(*q))),
                Mul => ConstValue::$variant(lanes!(x, y, |(p, q)| p.wrapping_mul(*q))),
                Div => {
                    if y.iter().any(|q| *q == 0) {
                        return None;
                    }
                    ConstValue::$variant(lanes!(x, y, |(p, q)| p.wrapping_div(*q)))
                }
                Mod => {
                    if y.iter().any(|q| *q == 0) {
                        return None;
                    }
                    ConstValue::$variant(lanes!(x, y, |(p, q)| p.wrapping_rem(*q)))
                }
                Shl | Shr => {
                    // Shift by at least the width is unspecified; leave it
                    // to the emitter.
                    if y.iter().any(|q| (*q as u64) >= width) {
                        return None;
                    }
                    if op == Shl {
                        ConstValue::$variant(lanes!(x, y, |(p, q)| p.wrapping_shl(*q as u32)))
                    } else {
                        ConstValue::$variant(lanes!(x, y, |(p, q)| p.wrapping_shr(*q as u32)))
                    }
                }
                BitAnd => ConstValue::$variant(lanes!(x, y, |(p, q)| p & q)),
                BitXor => ConstValue::$variant(lanes!(x, y, |(p, q)| p ^ q)),
                BitOr => ConstValue::$variant(lanes!(x, y, |(p, q)| p | q)),
                Lt => return Some((ConstValue::Bool(lanes!(x, y, |(p, q)| p < q)), bool_ty)),
                Gt => return Some((ConstValue::Bool(lanes!(x, y, |(p, q)| p > q)), bool_ty)),
                Le => return Some((ConstValue::Bool(lanes!(x, y, |(p, q)| p <= q)), bool_ty)),
                Ge => return Some((ConstValue::Bool(lanes!(x, y, |(p, q)| p >= q)), bool_ty)),
                Equal => return Some((ConstValue::Bool(lanes!(x, y, |(p, q)| p == q)), bool_ty)),
                NotEqual => {
                    return Some((ConstValue::Bool(lanes!(x, y, |(p, q)| p != q)), bool_ty))
                }
                _ => return None,
            };
            Some((value, ty))
        }};
    }

    macro_rules! float_arm {
        ($variant:ident, $x:expr, $y:expr, $narrow:ty) => {{
            let x = $x;
            let y = $y;
            let value = match op {
                Add => ConstValue::$variant(lanes!(x, y, |(p, q)| ((*p as f64) + (*q as f64)) as $narrow)),
                Sub => ConstValue::$variant(lanes!(x, y, |(p, q)| ((*p as f64) - (*q as f64)) as $narrow)),
                Mul => ConstValue::$variant(lanes!(x, y, |(p, q)| ((*p as f64) * (*q as f64)) as $narrow)),
                Div => ConstValue::$variant(lanes!(x, y, |(p, q)| ((*p as f64) / (*q as f64)) as $narrow)),
                Lt => return Some((ConstValue::Bool(lanes!(x, y, |(p, q)| p < q)), bool_ty)),
                Gt => return Some((ConstValue::Bool(lanes!(x, y, |(p, q)| p > q)), bool_ty)),
                Le => return Some((ConstValue::Bool(lanes!(x, y, |(p, q)| p <= q)), bool_ty)),
                Ge => return Some((ConstValue::Bool(lanes!(x, y, |(p, q)| p >= q)), bool_ty)),
                Equal => return Some((ConstValue::Bool(lanes!(x, y, |(p, q)| p == q)), bool_ty)),
                NotEqual => {
                    return Some((ConstValue::Bool(lanes!(x, y, |(p, q)| p != q)), bool_ty))
                }
                _ => return None,
            };
            Some((value, ty))
        }};
    }

    match (a, b) {
        (ConstValue::Int8(x), ConstValue::Int8(y)) => int_arm!(Int8, x, y, i8),
        (ConstValue::UInt8(x), ConstValue::UInt8(y)) => int_arm!(UInt8, x, y, u8),
        (ConstValue::Int16(x), ConstValue::Int16(y)) => int_arm!(Int16, x, y, i16),
        (ConstValue::UInt16(x), ConstValue::UInt16(y)) => int_arm!(UInt16, x, y, u16),
        (ConstValue::Int32(x), ConstValue::Int32(y)) => int_arm!(Int32, x, y, i32),
        (ConstValue::UInt32(x), ConstValue::UInt32(y)) => int_arm!(UInt32, x, y, u32),
        (ConstValue::Int64(x), ConstValue::Int64(y)) => int_arm!(Int64, x, y, i64),
        (ConstValue::UInt64(x), ConstValue::UInt64(y)) => int_arm!(UInt64, x, y, u64),
        (ConstValue::Float(x), ConstValue::Float(y)) => float_arm!(Float, x, y, f32),
        (ConstValue::Double(x), ConstValue::Double(y)) => float_arm!(Double, x, y, f64),
        (ConstValue::Bool(x), ConstValue::Bool(y)) => {
            let value = match op {
                BitAnd => ConstValue::Bool(lanes!(x, y, |(p, q)| p & q)),
                BitXor => ConstValue::Bool(lanes!(x, y, |(p, q)| p ^ q)),
                BitOr => ConstValue::Bool(lanes!(x, y, |(p, q)| p | q)),
                LogicalAnd => ConstValue::Bool(lanes!(x, y, |(p, q)| *p && *q)),
                LogicalOr => ConstValue::Bool(lanes!(x, y, |(p, q)| *p || *q)),
                Lt => ConstValue::Bool(lanes!(x, y, |(p, q)| p < q)),
                Gt => ConstValue::Bool(lanes!(x, y, |(p, q)| p > q)),
                Le => ConstValue::Bool(lanes!(x, y, |(p, q)| p <= q)),
                Ge => ConstValue::Bool(lanes!(x, y, |(p, q)| p >= q)),
                Equal => ConstValue::Bool(lanes!(x, y, |(p, q)| p == q)),
                NotEqual => ConstValue::Bool(lanes!(x, y, |(p, q)| p != q)),
                _ => return None,
            };
            Some((value, ty))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::Module;
    use crate::symbol::{StorageClass, Symbol, SymbolId};
    use lanec_core::Variability;

    fn var(m: &mut Module, name: &str, ty: TypeId) -> SymbolId {
        m.symtab
            .add_variable(Symbol::new(name, Span::new(1, 1), ty, StorageClass::Auto), &m.diags)
            .unwrap()
    }

    fn int_const(m: &Module, v: i32) -> Expr {
        Expr::constant(
            ConstValue::Int32(vec![v]),
            m.types.as_const(m.types.uniform(BasicType::Int32)),
            Span::new(1, 1),
        )
    }

    fn float_const(m: &Module, v: f32) -> Expr {
        Expr::constant(
            ConstValue::Float(vec![v]),
            m.types.as_const(m.types.uniform(BasicType::Float)),
            Span::new(1, 1),
        )
    }

    fn fold(m: &Module, e: Expr) -> ConstValue {
        let folded = m.check_and_optimize(e).expect("checks and folds");
        folded.constant_parts().expect("folded to a constant").0.clone()
    }

    #[test]
    fn integer_arithmetic_wraps() {
        let m = Module::default();
        let e = Expr::binary(
            BinaryOp::Add,
            int_const(&m, i32::MAX),
            int_const(&m, 1),
            Span::new(1, 1),
        );
        assert_eq!(fold(&m, e), ConstValue::Int32(vec![i32::MIN]));

        let e = Expr::binary(
            BinaryOp::Mul,
            int_const(&m, 1 << 20),
            int_const(&m, 1 << 20),
            Span::new(1, 1),
        );
        assert_eq!(fold(&m, e), ConstValue::Int32(vec![0]));
    }

    #[test]
    fn mixed_types_promote_before_folding() {
        let m = Module::default();
        let cx = m.context();
        let e = Expr::binary(
            BinaryOp::Add,
            int_const(&m, 1),
            float_const(&m, 0.5),
            Span::new(1, 1),
        );
        let folded = m.check_and_optimize(e).unwrap();
        let (value, ty) = folded.constant_parts().unwrap();
        assert_eq!(*value, ConstValue::Float(vec![1.5]));
        assert!(m.types.is_float(ty));
        let _ = cx;
    }

    #[test]
    fn division_by_zero_lane_is_left_alone() {
        let m = Module::default();
        let e = Expr::binary(BinaryOp::Div, int_const(&m, 5), int_const(&m, 0), Span::new(1, 1));
        let folded = m.check_and_optimize(e).unwrap();
        assert!(folded.constant_parts().is_none());
    }

    #[test]
    fn shift_by_width_is_left_alone() {
        let m = Module::default();
        let e = Expr::binary(BinaryOp::Shl, int_const(&m, 1), int_const(&m, 32), Span::new(1, 1));
        let folded = m.check_and_optimize(e).unwrap();
        assert!(folded.constant_parts().is_none());

        let e = Expr::binary(BinaryOp::Shl, int_const(&m, 1), int_const(&m, 4), Span::new(1, 1));
        assert_eq!(fold(&m, e), ConstValue::Int32(vec![16]));
    }

    #[test]
    fn comparisons_fold_to_bool_of_matching_shape() {
        let m = Module::default();
        let cx = m.context();
        let e = Expr::binary(BinaryOp::Lt, int_const(&m, 1), int_const(&m, 2), Span::new(1, 1));
        let folded = m.check_and_optimize(e).unwrap();
        let (value, ty) = folded.constant_parts().unwrap();
        assert_eq!(*value, ConstValue::Bool(vec![true]));
        assert!(m.types.is_bool(ty));
        assert!(m.types.is_uniform(ty));
        let _ = cx;
    }

    #[test]
    fn short_circuit_folds_with_non_constant_rhs() {
        let mut m = Module::default();
        let b_ty = m.types.uniform(BasicType::Bool);
        let b = var(&mut m, "b", b_ty);
        let f = Expr::constant(
            ConstValue::Bool(vec![false]),
            m.types.as_const(m.types.uniform(BasicType::Bool)),
            Span::new(1, 1),
        );
        let e = Expr::binary(
            BinaryOp::LogicalAnd,
            f,
            Expr::symbol(b, Span::new(1, 10)),
            Span::new(1, 1),
        );
        assert_eq!(fold(&m, e), ConstValue::Bool(vec![false]));
    }

    #[test]
    fn modulo_on_float_is_rejected() {
        let m = Module::default();
        let cx = m.context();
        let e = Expr::binary(
            BinaryOp::Mod,
            float_const(&m, 1.0),
            float_const(&m, 2.0),
            Span::new(1, 1),
        );
        assert!(e.type_check(&cx).is_none());
        assert_eq!(m.diags.error_count(), 1);
    }

    #[test]
    fn bit_ops_reject_floats() {
        let m = Module::default();
        let cx = m.context();
        let e = Expr::binary(
            BinaryOp::BitAnd,
            float_const(&m, 1.0),
            int_const(&m, 2),
            Span::new(1, 1),
        );
        assert!(e.type_check(&cx).is_none());
        assert_eq!(m.diags.error_count(), 1);
    }

    #[test]
    fn varying_operand_makes_the_result_varying() {
        let mut m = Module::default();
        let v_ty = m.types.varying(BasicType::Int32);
        let v = var(&mut m, "v", v_ty);
        let cx = m.context();
        let e = Expr::binary(
            BinaryOp::Add,
            int_const(&m, 1),
            Expr::symbol(v, Span::new(1, 5)),
            Span::new(1, 1),
        );
        let checked = e.type_check(&cx).unwrap();
        assert_eq!(checked.type_of(&cx), Some(m.types.varying(BasicType::Int32)));
    }

    #[test]
    fn pointer_difference_type_tracks_addressing() {
        let mut m = Module::default();
        let ptr = m.types.pointer(m.types.uniform(BasicType::Float), Variability::Uniform);
        let p = var(&mut m, "p", ptr);
        let q = var(&mut m, "q", ptr);
        let cx = m.context();
        let e = Expr::binary(
            BinaryOp::Sub,
            Expr::symbol(p, Span::new(1, 1)),
            Expr::symbol(q, Span::new(1, 5)),
            Span::new(1, 1),
        );
        let checked = e.type_check(&cx).unwrap();
        assert_eq!(checked.type_of(&cx), Some(m.types.uniform(BasicType::Int64)));

        let mut m32 = Module::new(
            lanec_core::TargetInfo::new_32_bit(8),
            lanec_core::OptFlags::default(),
        );
        let ptr = m32.types.pointer(m32.types.uniform(BasicType::Float), Variability::Uniform);
        let p = var(&mut m32, "p", ptr);
        let q = var(&mut m32, "q", ptr);
        let cx32 = m32.context();
        let e = Expr::binary(
            BinaryOp::Sub,
            Expr::symbol(p, Span::new(1, 1)),
            Expr::symbol(q, Span::new(1, 5)),
            Span::new(1, 1),
        );
        let checked = e.type_check(&cx32).unwrap();
        assert_eq!(checked.type_of(&cx32), Some(m32.types.uniform(BasicType::Int32)));
    }

    #[test]
    fn adding_two_pointers_is_illegal() {
        let mut m = Module::default();
        let ptr = m.types.pointer(m.types.uniform(BasicType::Float), Variability::Uniform);
        let p = var(&mut m, "p", ptr);
        let q = var(&mut m, "q", ptr);
        let cx = m.context();
        let e = Expr::binary(
            BinaryOp::Add,
            Expr::symbol(p, Span::new(1, 1)),
            Expr::symbol(q, Span::new(1, 5)),
            Span::new(1, 1),
        );
        assert!(e.type_check(&cx).is_none());
        assert!(m.diags.entries()[0].message.contains("add two pointer types"));
    }

    #[test]
    fn void_pointer_arithmetic_is_illegal() {
        let mut m = Module::default();
        let p_ty = m.types.void_pointer();
        let p = var(&mut m, "p", p_ty);
        let cx = m.context();
        let e = Expr::binary(
            BinaryOp::Add,
            Expr::symbol(p, Span::new(1, 1)),
            int_const(&m, 1),
            Span::new(1, 1),
        );
        assert!(e.type_check(&cx).is_none());
        assert!(m.diags.entries()[0].message.contains("pointer arithmetic"));
    }

    #[test]
    fn int_plus_pointer_is_canonicalized() {
        let mut m = Module::default();
        let ptr = m.types.pointer(m.types.uniform(BasicType::Float), Variability::Uniform);
        let p = var(&mut m, "p", ptr);
        let cx = m.context();
        let e = Expr::binary(
            BinaryOp::Add,
            int_const(&m, 2),
            Expr::symbol(p, Span::new(1, 5)),
            Span::new(1, 1),
        );
        let checked = e.type_check(&cx).unwrap();
        assert_eq!(checked.type_of(&cx), Some(ptr));
        let crate::expr::ExprKind::Binary { lhs, .. } = &checked.kind else {
            panic!("stays a binary node");
        };
        assert_eq!(lhs.type_of(&cx), Some(ptr));
    }

    #[test]
    fn pointer_comparison_against_zero_literal() {
        let mut m = Module::default();
        let ptr = m.types.pointer(m.types.uniform(BasicType::Float), Variability::Uniform);
        let p = var(&mut m, "p", ptr);
        let cx = m.context();
        let e = Expr::binary(
            BinaryOp::NotEqual,
            Expr::symbol(p, Span::new(1, 1)),
            int_const(&m, 0),
            Span::new(1, 1),
        );
        let checked = e.type_check(&cx).unwrap();
        assert_eq!(checked.type_of(&cx), Some(m.types.uniform(BasicType::Bool)));
        assert_eq!(m.diags.error_count(), 0);
    }

    #[test]
    fn comma_takes_the_right_type() {
        let m = Module::default();
        let cx = m.context();
        let e = Expr::binary(
            BinaryOp::Comma,
            int_const(&m, 1),
            float_const(&m, 2.0),
            Span::new(1, 1),
        );
        let checked = e.type_check(&cx).unwrap();
        assert_eq!(
            checked.type_of(&cx),
            Some(m.types.as_const(m.types.uniform(BasicType::Float)))
        );
    }

    #[test]
    fn fast_math_rewrites_division_by_constant() {
        let m = Module::new(
            lanec_core::TargetInfo::default(),
            lanec_core::OptFlags {
                fast_math: true,
                ..Default::default()
            },
        );
        let e = Expr::binary(
            BinaryOp::Div,
            float_const(&m, 3.0),
            float_const(&m, 4.0),
            Span::new(1, 1),
        );
        // Both operands are constants, so the rewrite folds all the way to
        // 3 * (1/4).
        assert_eq!(fold(&m, e), ConstValue::Float(vec![0.75]));
    }

    #[test]
    fn fast_math_without_rcp_warns_once() {
        let mut m = Module::new(
            lanec_core::TargetInfo::default(),
            lanec_core::OptFlags {
                fast_math: true,
                ..Default::default()
            },
        );
        let y_ty = m.types.varying(BasicType::Float);
        let y = var(&mut m, "y", y_ty);
        let cx = m.context();
        let e = Expr::binary(
            BinaryOp::Div,
            float_const(&m, 1.0),
            Expr::symbol(y, Span::new(1, 5)),
            Span::new(1, 1),
        );
        let checked = e.type_check(&cx).unwrap();
        let result = checked.optimize(&cx).unwrap();
        // Left as a division, with one performance warning.
        assert!(matches!(
            result.kind,
            crate::expr::ExprKind::Binary { op: BinaryOp::Div, .. }
        ));
        assert_eq!(m.diags.warning_count(), 1);
        assert!(m.diags.entries()[0].message.contains("rcp() not found"));
    }

    #[test]
    fn fast_math_uses_rcp_when_available() {
        let mut m = Module::new(
            lanec_core::TargetInfo::default(),
            lanec_core::OptFlags {
                fast_math: true,
                ..Default::default()
            },
        );
        let f32v = m.types.varying(BasicType::Float);
        let rcp_ty = m.types.function(f32v, vec![f32v], vec![false], false);
        m.add_function("rcp", rcp_ty, vec![None], Span::new(1, 1)).unwrap();
        let y = var(&mut m, "y", f32v);

        let cx = m.context();
        let e = Expr::binary(
            BinaryOp::Div,
            float_const(&m, 1.0),
            Expr::symbol(y, Span::new(1, 5)),
            Span::new(1, 1),
        );
        let checked = e.type_check(&cx).unwrap();
        let result = checked.optimize(&cx).unwrap();
        // Rewritten to a multiply whose right side calls rcp.
        let crate::expr::ExprKind::Binary { op, rhs, .. } = &result.kind else {
            panic!("rewritten to a binary node");
        };
        assert_eq!(*op, BinaryOp::Mul);
        assert!(matches!(rhs.kind, crate::expr::ExprKind::Call { .. }));
        assert_eq!(m.diags.warning_count(), 0);
    }
}
