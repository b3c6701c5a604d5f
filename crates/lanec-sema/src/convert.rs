//! The implicit conversion engine.
//!
//! One ordered case analysis decides whether a value of one type can flow
//! into a slot of another, and rewrites the expression when it can. The
//! cases are tried first-match-wins; their order is load-bearing (the array
//! decay must run before the varying-to-uniform check, the zero-to-null
//! rewrite before the atomic rules, and so on).
//!
//! Every acceptance except exact equality wraps the expression in a cast
//! node carrying the destination type. The same analysis runs in probe mode
//! (no expression, no diagnostics) for overload resolution's dry runs.

use lanec_core::{BasicType, CompileError, Span, TypeId};

use crate::ctx::SemaContext;
use crate::expr::{array_to_pointer, Expr, ExprKind};

/// Whether `from` can implicitly convert to `to`. Emits no diagnostics.
pub fn can_convert(cx: &SemaContext<'_>, from: TypeId, to: TypeId) -> bool {
    do_conv(cx, from, to, None, true, "", Span::default()).is_ok()
}

/// Like [`can_convert`], but reports the failure. Used where a conversion is
/// validated without rewriting an expression (explicit casts).
pub fn check_convert(
    cx: &SemaContext<'_>,
    from: TypeId,
    to: TypeId,
    ctx_msg: &str,
    pos: Span,
) -> bool {
    do_conv(cx, from, to, None, false, ctx_msg, pos).is_ok()
}

/// Convert `expr` to `to`, inserting whatever cast, dereference,
/// reference-of, or decay nodes the conversion needs. On failure, reports
/// one diagnostic citing `ctx_msg` and returns `None`.
pub fn convert_expr(cx: &SemaContext<'_>, expr: Expr, to: TypeId, ctx_msg: &str) -> Option<Expr> {
    let from = expr.type_of(cx)?;
    let pos = expr.pos;
    match do_conv(cx, from, to, Some(expr), false, ctx_msg, pos) {
        Ok(converted) => converted,
        Err(()) => None,
    }
}

/// The ordered case analysis. `expr` is `None` in probe mode; `failure_ok`
/// suppresses diagnostics. `Ok(None)` is a successful probe.
fn do_conv(
    cx: &SemaContext<'_>,
    from: TypeId,
    to: TypeId,
    expr: Option<Expr>,
    failure_ok: bool,
    ctx_msg: &str,
    pos: Span,
) -> Result<Option<Expr>, ()> {
    let t = cx.types;
    let fail = |err: CompileError| {
        if !failure_ok {
            cx.diags.report(&err);
        }
        Err(())
    };
    let accept = |expr: Option<Expr>| Ok(expr.map(|e| Expr::cast(to, e, pos)));

    // The types are equal; there's nothing to do.
    if t.equal(to, from) {
        return Ok(expr);
    }

    if t.is_void(from) || t.is_void(to) {
        return fail(CompileError::VoidConversion {
            from: t.display(from),
            to: t.display(to),
            context: ctx_msg.to_string(),
            span: pos,
        });
    }

    // Array decay to a pointer to the element type. Runs before the
    // variability check: "float foo[10]" into "float * uniform" looks like a
    // varying-to-uniform conversion but isn't one.
    if t.is_array(from) && t.is_pointer(to) {
        let mut elem = t.element_type(from, 0).expect("arrays have an element type");
        let to_pointee = t.pointee(to).expect("pointers have a pointee");
        if t.is_const(to_pointee) {
            elem = t.as_const(elem);
        }
        if t.equal(to_pointee, elem) {
            let expr = match expr {
                Some(e) => Some(array_to_pointer(e, cx).ok_or(())?),
                None => None,
            };
            return accept(expr);
        }
        return fail(CompileError::ArrayToPointer {
            from: t.display(from),
            to: t.display(to),
            context: ctx_msg.to_string(),
            span: pos,
        });
    }

    if t.is_uniform(to) && t.is_varying(from) {
        return fail(CompileError::VaryingToUniform {
            from: t.display(from),
            to: t.display(to),
            context: ctx_msg.to_string(),
            span: pos,
        });
    }

    if t.is_pointer(from) {
        // A pointer tests as "is it non-null".
        if t.is_bool(to) {
            return accept(expr);
        }
        if t.is_array(to) {
            let from_pointee = t.pointee(from).expect("pointers have a pointee");
            let to_elem = t.element_type(to, 0).expect("arrays have an element type");
            if t.equal(from_pointee, to_elem) {
                return accept(expr);
            }
        }
        if !t.is_pointer(to) {
            return fail(CompileError::PointerToNonPointer {
                from: t.display(from),
                to: t.display(to),
                context: ctx_msg.to_string(),
                span: pos,
            });
        }
        let from_pointee = t.pointee(from).expect("pointers have a pointee");
        let to_pointee = t.pointee(to).expect("pointers have a pointee");
        if t.is_void_pointer(to) {
            return accept(expr);
        }
        let is_null_literal = matches!(
            expr.as_ref().map(|e| &e.kind),
            Some(ExprKind::NullPointer)
        );
        if t.is_void_pointer(from) && is_null_literal {
            return accept(expr);
        }
        if !t.equal(from_pointee, to_pointee) && !t.equal(t.as_const(from_pointee), to_pointee) {
            return fail(CompileError::IncompatiblePointers {
                from: t.display(from),
                to: t.display(to),
                context: ctx_msg.to_string(),
                span: pos,
            });
        }
        if t.is_varying(to) && t.is_uniform(from) {
            return accept(expr);
        }
        // Same target modulo const at the same variability: nothing to do.
        return Ok(expr);
    }

    // A compile-time all-zero integer is also a null pointer literal.
    if t.is_pointer(to) && t.is_int(from) && t.is_atomic(from) {
        if let Some(e) = &expr {
            if e.is_all_int_zeros(cx) {
                let null = Expr::null_pointer(pos);
                return do_conv(cx, t.void_pointer(), to, Some(null), failure_ok, ctx_msg, pos);
            }
        }
    }

    // T -> const T.
    if t.equal(to, t.as_const(from)) {
        return accept(expr);
    }

    if t.is_reference(from) {
        if t.is_reference(to) {
            let from_target = t.reference_target(from);
            let to_target = t.reference_target(to);
            // Adding const to the target is fine, as is a reference to an
            // array of the same element type with a different count.
            if t.equal(to_target, t.as_const(from_target)) {
                return accept(expr);
            }
            if t.is_array(from_target) && t.is_array(to_target) {
                let fe = t.element_type(from_target, 0).expect("arrays have an element type");
                let te = t.element_type(to_target, 0).expect("arrays have an element type");
                if t.equal(fe, te) {
                    return accept(expr);
                }
            }
            return fail(CompileError::IncompatibleReferences {
                from: t.display(from),
                to: t.display(to),
                context: ctx_msg.to_string(),
                span: pos,
            });
        }
        // reference T -> T: insert a dereference and retry.
        return match expr {
            Some(e) => {
                let deref = Expr::deref(e, pos);
                let new_from = deref.type_of(cx).ok_or(())?;
                do_conv(cx, new_from, to, Some(deref), failure_ok, ctx_msg, pos)
            }
            None => do_conv(
                cx,
                t.reference_target(from),
                to,
                None,
                failure_ok,
                ctx_msg,
                pos,
            ),
        };
    }
    if t.is_reference(to) {
        // T -> reference T: insert a reference-of and retry.
        return match expr {
            Some(e) => {
                let r = Expr::reference_to(e, pos);
                let new_from = r.type_of(cx).ok_or(())?;
                do_conv(cx, new_from, to, Some(r), failure_ok, ctx_msg, pos)
            }
            None => do_conv(cx, t.reference(from), to, None, failure_ok, ctx_msg, pos),
        };
    }

    // const T -> T.
    if t.equal(to, t.as_mutable(from)) {
        return accept(expr);
    }

    if t.is_array(from) && t.is_array(to) {
        let fe = t.element_type(from, 0).expect("arrays have an element type");
        let te = t.element_type(to, 0).expect("arrays have an element type");
        if t.equal(te, fe) || t.equal(te, t.as_const(fe)) {
            let fc = t.element_count(from).unwrap_or(0);
            let tc = t.element_count(to).unwrap_or(0);
            if fc != 0 && tc != 0 && fc != tc && !failure_ok {
                cx.diags.warning(
                    pos,
                    format!(
                        "Converting from array type \"{}\" to array type \"{}\" with different element counts for {}.",
                        t.display(from),
                        t.display(to),
                        ctx_msg
                    ),
                );
            }
            return accept(expr);
        }
        return fail(CompileError::IncompatibleArrays {
            from: t.display(from),
            to: t.display(to),
            context: ctx_msg.to_string(),
            span: pos,
        });
    }

    if t.is_vector(from) && t.is_vector(to) {
        if t.element_count(from) != t.element_count(to) {
            return fail(CompileError::VectorSizeMismatch {
                from: t.display(from),
                to: t.display(to),
                context: ctx_msg.to_string(),
                span: pos,
            });
        }
        // Element types are atomic and atomics interconvert.
        return accept(expr);
    }

    if t.is_struct(from) && t.is_struct(to) {
        let canon = |id: TypeId| t.as_const(t.as_uniform(id));
        if t.equal(canon(from), canon(to)) {
            return accept(expr);
        }
        return fail(CompileError::DifferentStructs {
            from: t.display(from),
            to: t.display(to),
            context: ctx_msg.to_string(),
            span: pos,
        });
    }

    if t.is_enum(from) && t.is_enum(to) {
        if t.equal_ignoring_const(t.as_uniform(from), t.as_uniform(to)) {
            return accept(expr);
        }
        return fail(CompileError::DifferentEnums {
            from: t.display(from),
            to: t.display(to),
            context: ctx_msg.to_string(),
            span: pos,
        });
    }

    // enum -> integer (or enum smeared into a vector).
    if t.is_enum(from) && (t.is_atomic(to) || t.is_vector(to)) {
        return accept(expr);
    }

    let no_conversion = CompileError::NoConversion {
        from: t.display(from),
        to: t.display(to),
        context: ctx_msg.to_string(),
        span: pos,
    };

    if !t.is_atomic(from) {
        return fail(no_conversion);
    }

    // Scalar broadcast into a short vector.
    if t.is_vector(to) {
        return accept(expr);
    }

    if !t.is_atomic(to) {
        return fail(no_conversion);
    }

    // Scalar to scalar. This is where precision warnings come from.
    if !failure_ok {
        maybe_precision_warning(cx, from, to, expr.as_ref(), ctx_msg, pos);
    }
    accept(expr)
}

/// Warn when an atomic conversion can lose information: the destination
/// ranks below the source on the promotion ladder and isn't bool, excluding
/// the same-width signed/unsigned pairs. A constant whose every lane is
/// exactly representable in the destination never warns.
fn maybe_precision_warning(
    cx: &SemaContext<'_>,
    from: TypeId,
    to: TypeId,
    expr: Option<&Expr>,
    ctx_msg: &str,
    pos: Span,
) {
    let t = cx.types;
    let (Some(fb), Some(tb)) = (t.atomic_basic(from), t.atomic_basic(to)) else {
        return;
    };
    let (Some(fr), Some(tr)) = (fb.rank(), tb.rank()) else {
        return;
    };
    let same_width_resign = matches!(
        (tb, fb),
        (BasicType::Int8, BasicType::UInt8)
            | (BasicType::Int16, BasicType::UInt16)
            | (BasicType::Int32, BasicType::UInt32)
            | (BasicType::Int64, BasicType::UInt64)
    );
    if tr >= fr || tb == BasicType::Bool || same_width_resign {
        return;
    }
    if let Some((value, _)) = expr.and_then(|e| e.constant_parts()) {
        if value.fits_in(tb) {
            return;
        }
    }
    cx.diags.warning(
        pos,
        format!(
            "Conversion from type \"{}\" to type \"{}\" for {} may lose information.",
            t.display(from),
            t.display(to),
            ctx_msg
        ),
    );
}
