//! Explicit (and checker-inserted) type casts.

use lanec_core::{BasicType, Span, TypeId};

use crate::convert::check_convert;
use crate::ctx::SemaContext;
use crate::expr::Expr;

/// Strip const at the pointer spine: the cast legality rules compare types
/// modulo const at every pointer level.
fn deconstify(cx: &SemaContext<'_>, ty: TypeId) -> TypeId {
    let t = cx.types;
    match t.pointee(ty) {
        Some(pointee) => {
            let variability = t.variability(ty);
            t.pointer(deconstify(cx, pointee), variability)
        }
        None => t.as_mutable(ty),
    }
}

pub(super) fn type_check(
    to: TypeId,
    operand: Expr,
    preserve_uniformity: bool,
    pos: Span,
    cx: &SemaContext<'_>,
) -> Option<Expr> {
    let t = cx.types;
    let operand = operand.type_check(cx)?;
    let from_full = operand.type_of(cx)?;

    // A checker-inserted cast that must not smear: retarget the destination
    // to its uniform rendition and recheck.
    if preserve_uniformity && t.is_uniform(from_full) && t.is_varying(to) {
        return type_check(t.as_uniform(to), operand, false, pos, cx);
    }

    let from = deconstify(cx, from_full);
    let to_checked = deconstify(cx, to);

    if t.is_varying(from) && t.is_uniform(to_checked) {
        cx.diags.error(
            pos,
            format!(
                "Can't type cast from varying type \"{}\" to uniform type \"{}\".",
                t.display(from),
                t.display(to_checked)
            ),
        );
        return None;
    }

    // Explicit-only conversions first.
    if t.is_pointer(from) && t.is_pointer(to_checked) {
        return Some(Expr::cast(to, operand, pos));
    }
    let scalarish = |ty: TypeId| t.is_atomic(ty) || t.is_enum(ty);
    if scalarish(from) && scalarish(to_checked) {
        return Some(Expr::cast(to, operand, pos));
    }
    if t.is_pointer(from) && t.is_int(to_checked) && t.is_atomic(to_checked) {
        let basic = t.atomic_basic(to_checked).expect("atomic has a basic type");
        let mut safe = matches!(basic, BasicType::Int64 | BasicType::UInt64);
        if cx.target.is_32_bit {
            safe |= matches!(basic, BasicType::Int32 | BasicType::UInt32);
        }
        if !safe {
            cx.diags.warning(
                pos,
                format!(
                    "Pointer type cast of type \"{}\" to integer type \"{}\" may lose information.",
                    t.display(from),
                    t.display(to_checked)
                ),
            );
        }
        return Some(Expr::cast(to, operand, pos));
    }
    if t.is_int(from) && t.is_atomic(from) && t.is_pointer(to_checked) {
        return Some(Expr::cast(to, operand, pos));
    }

    // Otherwise the cast must be one of the implicit conversions.
    if !check_convert(cx, from, to_checked, "type cast expression", pos) {
        return None;
    }
    Some(Expr::cast(to, operand, pos))
}

pub(super) fn optimize(
    to: TypeId,
    operand: Expr,
    preserve_uniformity: bool,
    pos: Span,
    cx: &SemaContext<'_>,
) -> Option<Expr> {
    let t = cx.types;
    let operand = operand.optimize(cx)?;
    let Some((value, _)) = operand.constant_parts() else {
        return Some(rebuild(to, operand, preserve_uniformity, pos));
    };

    // Constants exist only for atomic and enum types; a cast to anything
    // else (vectors, pointers) is left for the emitter.
    let Some(basic) = t.atomic_basic(to) else {
        return Some(rebuild(to, operand, preserve_uniformity, pos));
    };
    if basic == BasicType::Void {
        return Some(rebuild(to, operand, preserve_uniformity, pos));
    }
    let broadcast = t.is_varying(to).then_some(cx.lanes());
    let converted = value.convert(basic, broadcast);
    Some(Expr::constant(converted, to, pos))
}

fn rebuild(to: TypeId, operand: Expr, preserve_uniformity: bool, pos: Span) -> Expr {
    if preserve_uniformity {
        Expr::cast_preserving_uniformity(to, operand, pos)
    } else {
        Expr::cast(to, operand, pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::Module;
    use crate::symbol::{StorageClass, Symbol, SymbolId};
    use crate::value::ConstValue;
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

    #[test]
    fn cast_folds_constants_lanewise() {
        let m = Module::default();
        let cx = m.context();
        let e = Expr::cast(m.types.uniform(BasicType::Float), int_const(&m, 3), Span::new(1, 1));
        let folded = m.check_and_optimize(e).unwrap();
        let (value, ty) = folded.constant_parts().unwrap();
        assert_eq!(*value, ConstValue::Float(vec![3.0]));
        assert_eq!(ty, m.types.uniform(BasicType::Float));
        let _ = cx;
    }

    #[test]
    fn cast_to_varying_broadcasts() {
        let m = Module::default();
        let e = Expr::cast(m.types.varying(BasicType::Int32), int_const(&m, 7), Span::new(1, 1));
        let folded = m.check_and_optimize(e).unwrap();
        let (value, ty) = folded.constant_parts().unwrap();
        assert_eq!(value.lane_count(), 8);
        assert_eq!(value.lane_as_i64(5), 7);
        assert_eq!(ty, m.types.varying(BasicType::Int32));
    }

    #[test]
    fn varying_to_uniform_cast_is_an_error() {
        let mut m = Module::default();
        let v_ty = m.types.varying(BasicType::Int32);
        let v = var(&mut m, "v", v_ty);
        let cx = m.context();
        let e = Expr::cast(
            m.types.uniform(BasicType::Int32),
            Expr::symbol(v, Span::new(2, 1)),
            Span::new(2, 1),
        );
        assert!(e.type_check(&cx).is_none());
        assert_eq!(m.diags.error_count(), 1);
    }

    #[test]
    fn pointer_to_pointer_casts_are_explicitly_allowed() {
        let mut m = Module::default();
        let fp = m.types.pointer(m.types.uniform(BasicType::Float), Variability::Uniform);
        let ip = m.types.pointer(m.types.uniform(BasicType::Int32), Variability::Uniform);
        let p = var(&mut m, "p", fp);
        let cx = m.context();
        let e = Expr::cast(ip, Expr::symbol(p, Span::new(2, 1)), Span::new(2, 1));
        assert!(e.type_check(&cx).is_some());
        assert_eq!(m.diags.error_count(), 0);
    }

    #[test]
    fn pointer_to_narrow_int_warns() {
        let mut m = Module::default();
        let fp = m.types.pointer(m.types.uniform(BasicType::Float), Variability::Uniform);
        let p = var(&mut m, "p", fp);
        let cx = m.context();
        let e = Expr::cast(
            m.types.uniform(BasicType::Int32),
            Expr::symbol(p, Span::new(2, 1)),
            Span::new(2, 1),
        );
        assert!(e.type_check(&cx).is_some());
        assert_eq!(m.diags.warning_count(), 1);

        // To a 64-bit integer there is no warning on a 64-bit target.
        let e = Expr::cast(
            m.types.uniform(BasicType::Int64),
            Expr::symbol(p, Span::new(3, 1)),
            Span::new(3, 1),
        );
        assert!(e.type_check(&cx).is_some());
        assert_eq!(m.diags.warning_count(), 1);
    }

    #[test]
    fn enum_and_int_cast_both_ways() {
        let mut m = Module::default();
        let season = m.types.enum_type("Season", vec![("Winter".into(), 0)]);
        let s = var(&mut m, "s", season);
        let i_ty = m.types.uniform(BasicType::Int32);
        let i = var(&mut m, "i", i_ty);
        let cx = m.context();
        let e = Expr::cast(
            m.types.uniform(BasicType::Int32),
            Expr::symbol(s, Span::new(2, 1)),
            Span::new(2, 1),
        );
        assert!(e.type_check(&cx).is_some());
        let e = Expr::cast(season, Expr::symbol(i, Span::new(3, 1)), Span::new(3, 1));
        assert!(e.type_check(&cx).is_some());
        assert_eq!(m.diags.error_count(), 0);
    }

    #[test]
    fn preserve_uniformity_retargets_to_uniform() {
        let m = Module::default();
        let cx = m.context();
        let e = Expr::cast_preserving_uniformity(
            m.types.varying(BasicType::Float),
            int_const(&m, 2),
            Span::new(1, 1),
        );
        let checked = e.type_check(&cx).unwrap();
        assert_eq!(checked.type_of(&cx), Some(m.types.uniform(BasicType::Float)));
    }
}
