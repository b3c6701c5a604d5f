//! Overload resolution.
//!
//! Resolution runs a sequence of tiers, each a predicate that maps a
//! (caller type, formal type) pair to a per-argument cost or rejects it.
//! Within a tier, every candidate with compatible arity is scored as the sum
//! of its per-argument costs; the unique minimum wins. A tie is an ambiguity
//! error and stops resolution; an empty tier falls through to the next.
//! Each tier's predicate subsumes the previous tiers, so a candidate that
//! matched earlier keeps matching (at its earlier, cheaper cost).
//!
//! Function names beginning with two underscores are internal builtins and
//! are dispatched strictly: only the exact-match tier applies.

use lanec_core::{BasicType, CompileError, Span, TypeId};

use crate::convert::can_convert;
use crate::ctx::SemaContext;
use crate::expr::{Expr, ExprKind};
use crate::symbol::SymbolId;

/// A tier predicate: per-argument cost, or `None` for no match.
type MatchPredicate = fn(&SemaContext<'_>, TypeId, TypeId) -> Option<u32>;

/// The ranked tiers, in resolution order.
const TIERS: &[MatchPredicate] = &[
    exact_match,
    match_ignoring_references,
    match_with_type_widening,
    match_ignoring_uniform,
    match_with_conv_same_variability,
    match_with_conv,
];

/// Bind the best overload into a `FunctionSymbol` expression.
///
/// `arg_could_be_null[i]` is true when argument `i` is a compile-time
/// all-zero integer, which matches any pointer formal at no cost. Returns
/// whether a unique match was bound; failure has already been reported.
pub fn resolve_overload(
    cx: &SemaContext<'_>,
    func: &mut Expr,
    arg_pos: Span,
    arg_types: &[TypeId],
    arg_could_be_null: Option<&[bool]>,
) -> bool {
    let pos = func.pos;
    let ExprKind::FunctionSymbol {
        name,
        candidates,
        matching,
        tried_to_resolve,
    } = &mut func.kind
    else {
        cx.diags.report(&CompileError::Internal {
            message: "overload resolution applied to a non-function expression".to_string(),
            span: pos,
        });
        return false;
    };
    *tried_to_resolve = true;

    match resolve(cx, name, candidates, pos, arg_pos, arg_types, arg_could_be_null) {
        Ok(id) => {
            *matching = Some(id);
            true
        }
        Err(()) => false,
    }
}

/// Tier-by-tier resolution over a candidate list. On `Err` a diagnostic has
/// been emitted.
pub(crate) fn resolve(
    cx: &SemaContext<'_>,
    name: &str,
    candidates: &[SymbolId],
    pos: Span,
    arg_pos: Span,
    arg_types: &[TypeId],
    arg_could_be_null: Option<&[bool]>,
) -> Result<SymbolId, ()> {
    let exact_match_only = name.starts_with("__");
    let tiers: &[MatchPredicate] = if exact_match_only {
        &TIERS[..1]
    } else {
        TIERS
    };

    for &predicate in tiers {
        match try_tier(cx, predicate, candidates, arg_types, arg_could_be_null) {
            TierOutcome::Unique(id) => return Ok(id),
            TierOutcome::Ambiguous(tied) => {
                cx.diags.report(&CompileError::AmbiguousOverload {
                    name: name.to_string(),
                    candidates: render_candidates(cx, &tied, arg_types),
                    span: pos,
                });
                return Err(());
            }
            TierOutcome::NoMatch => {}
        }
    }

    cx.diags.report(&CompileError::NoMatchingOverload {
        name: name.to_string(),
        exact_only: exact_match_only,
        candidates: render_candidates(cx, candidates, arg_types),
        span: arg_pos,
    });
    Err(())
}

enum TierOutcome {
    Unique(SymbolId),
    Ambiguous(Vec<SymbolId>),
    NoMatch,
}

/// Score every arity-compatible candidate under one predicate and pick the
/// unique cheapest. Candidates are visited in declaration order, which keeps
/// resolution deterministic.
fn try_tier(
    cx: &SemaContext<'_>,
    predicate: MatchPredicate,
    candidates: &[SymbolId],
    arg_types: &[TypeId],
    arg_could_be_null: Option<&[bool]>,
) -> TierOutcome {
    let mut matches: Vec<(u32, SymbolId)> = Vec::new();

    'candidates: for &candidate in candidates {
        let fty = cx.symtab.symbol(candidate).ty;
        let Some((_, params, has_default, _)) = cx.types.function_signature(fty) else {
            continue;
        };

        // Can't match when the caller passes more arguments than the
        // candidate takes; fewer is fine if the rest have defaults.
        if arg_types.len() > params.len() {
            continue;
        }
        if arg_types.len() < params.len() && !has_default[arg_types.len()] {
            continue;
        }

        let mut cost = 0u32;
        for (i, (&arg, &param)) in arg_types.iter().zip(params.iter()).enumerate() {
            if cx.types.is_function(arg) {
                continue 'candidates;
            }
            match predicate(cx, arg, param) {
                Some(c) => cost += c,
                None => {
                    let null_ok = arg_could_be_null
                        .is_some_and(|flags| flags.get(i).copied().unwrap_or(false));
                    if null_ok && cx.types.is_pointer(param) {
                        // A literal zero converts to the null value of any
                        // pointer formal.
                        continue;
                    }
                    continue 'candidates;
                }
            }
        }
        matches.push((cost, candidate));
    }

    if matches.is_empty() {
        return TierOutcome::NoMatch;
    }
    let min_cost = matches.iter().map(|&(c, _)| c).min().expect("nonempty");
    let best: Vec<SymbolId> = matches
        .iter()
        .filter(|&&(c, _)| c == min_cost)
        .map(|&(_, id)| id)
        .collect();
    if best.len() == 1 {
        TierOutcome::Unique(best[0])
    } else {
        TierOutcome::Ambiguous(best)
    }
}

fn render_candidates(cx: &SemaContext<'_>, candidates: &[SymbolId], arg_types: &[TypeId]) -> String {
    let mut out = String::new();
    for &id in candidates {
        let sym = cx.symtab.symbol(id);
        out.push_str(&format!(
            "Candidate function: {} {}\n",
            sym.name,
            cx.types.display(sym.ty)
        ));
    }
    let passed = arg_types
        .iter()
        .map(|&t| cx.types.display(t))
        .collect::<Vec<_>>()
        .join(", ");
    out.push_str(&format!("Passed types: ({})", passed));
    out
}

// ----------------------------------------------------------------------
// Tier predicates. Each one defers to its predecessor first, so the cost of
// an argument is the cost of the *best* tier that accepts it.
// ----------------------------------------------------------------------

/// Exact type match, modulo adding a reference on the caller side (and
/// dropping the caller's top-level const).
fn exact_match(cx: &SemaContext<'_>, call: TypeId, formal: TypeId) -> Option<u32> {
    let t = cx.types;
    let mut call = call;
    if !t.is_reference(call) {
        call = t.as_mutable(call);
    }
    if t.is_reference(formal) && !t.is_reference(call) {
        call = t.reference(call);
    }
    t.equal(call, formal).then_some(0)
}

/// Equal after stripping references from both sides.
fn match_ignoring_references(cx: &SemaContext<'_>, call: TypeId, formal: TypeId) -> Option<u32> {
    if let Some(cost) = exact_match(cx, call, formal) {
        return Some(cost);
    }
    let t = cx.types;
    let mut call = t.reference_target(call);
    if t.is_const(t.reference_target(formal)) {
        call = t.as_const(call);
    }
    t.equal(call, t.reference_target(formal)).then_some(1)
}

/// Conversions that can't lose information: bool widens to any numeric,
/// signed to wider signed, unsigned to wider unsigned or strictly wider
/// signed, float to double. Variability must already agree.
fn match_with_type_widening(cx: &SemaContext<'_>, call: TypeId, formal: TypeId) -> Option<u32> {
    if let Some(cost) = match_ignoring_references(cx, call, formal) {
        return Some(cost);
    }
    let t = cx.types;
    if !(t.is_atomic(call) || t.is_enum(call)) || !(t.is_atomic(formal) || t.is_enum(formal)) {
        return None;
    }
    if t.is_uniform(call) != t.is_uniform(formal) {
        return None;
    }
    // An enum participates as its underlying uint32, so enum -> uint32 is a
    // widening match, never an exact one.
    let from = t.atomic_basic(call)?;
    let to = t.atomic_basic(formal)?;
    if t.is_enum(call) && t.is_atomic(formal) && from == to {
        return Some(1);
    }
    widens_without_loss(from, to).then_some(1)
}

fn widens_without_loss(from: BasicType, to: BasicType) -> bool {
    use BasicType::*;
    if from == Bool {
        return to.is_numeric();
    }
    if from == Float {
        return to == Double;
    }
    if from.is_signed_int() {
        return to.is_signed_int() && to.bit_width() > from.bit_width();
    }
    if from.is_unsigned() {
        return (to.is_unsigned() && to.bit_width() > from.bit_width())
            || (to.is_signed_int() && to.bit_width() > from.bit_width());
    }
    false
}

/// A uniform-to-varying promotion of an otherwise identical type.
fn match_ignoring_uniform(cx: &SemaContext<'_>, call: TypeId, formal: TypeId) -> Option<u32> {
    if let Some(cost) = match_with_type_widening(cx, call, formal) {
        return Some(cost);
    }
    let t = cx.types;
    let mut call = call;
    if !t.is_reference(call) {
        call = t.as_mutable(call);
    }
    (t.is_uniform(call) && t.is_varying(formal) && t.equal(t.as_varying(call), formal))
        .then_some(1)
}

/// Any implicit conversion that keeps the caller's variability.
fn match_with_conv_same_variability(
    cx: &SemaContext<'_>,
    call: TypeId,
    formal: TypeId,
) -> Option<u32> {
    if let Some(cost) = match_ignoring_uniform(cx, call, formal) {
        return Some(cost);
    }
    let t = cx.types;
    (can_convert(cx, call, formal) && t.is_uniform(call) == t.is_uniform(formal)).then_some(1)
}

/// The baseline: anything implicitly convertible.
fn match_with_conv(cx: &SemaContext<'_>, call: TypeId, formal: TypeId) -> Option<u32> {
    if let Some(cost) = match_with_conv_same_variability(cx, call, formal) {
        return Some(cost);
    }
    can_convert(cx, call, formal).then_some(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::Module;
    use crate::symbol::{StorageClass, Symbol};
    use lanec_core::BasicType;

    fn add_fn(m: &mut Module, name: &str, params: &[TypeId]) -> SymbolId {
        let fty = m.types.function(
            m.types.void(),
            params.to_vec(),
            vec![false; params.len()],
            false,
        );
        m.add_function(name, fty, vec![None; params.len()], Span::default())
            .expect("distinct signature")
    }

    #[test]
    fn exact_match_wins_over_conversions() {
        let mut m = Module::default();
        let i32u = m.types.uniform(BasicType::Int32);
        let f32u = m.types.uniform(BasicType::Float);
        let f_float = add_fn(&mut m, "f", &[f32u]);
        let f_int = add_fn(&mut m, "f", &[i32u]);
        let _ = f_float;

        let cx = m.context();
        let got = resolve(
            &cx,
            "f",
            &cx.symtab.lookup_function_any("f"),
            Span::default(),
            Span::default(),
            &[i32u],
            None,
        );
        assert_eq!(got, Ok(f_int));
        assert_eq!(m.diags.error_count(), 0);
    }

    #[test]
    fn widening_tier_prefers_int64_over_float() {
        let mut m = Module::default();
        let i64u = m.types.uniform(BasicType::Int64);
        let f32u = m.types.uniform(BasicType::Float);
        let i16u = m.types.uniform(BasicType::Int16);
        let f_float = add_fn(&mut m, "f", &[f32u]);
        let f_i64 = add_fn(&mut m, "f", &[i64u]);
        let _ = f_float;

        let cx = m.context();
        // int16 widens losslessly to int64 but not to float, so the widening
        // tier decides before the general-conversion tiers see the float
        // overload at all.
        let got = resolve(
            &cx,
            "f",
            &cx.symtab.lookup_function_any("f"),
            Span::default(),
            Span::default(),
            &[i16u],
            None,
        );
        assert_eq!(got, Ok(f_i64));
        assert_eq!(m.diags.error_count(), 0);
    }

    #[test]
    fn uniform_to_varying_tier() {
        let mut m = Module::default();
        let i32u = m.types.uniform(BasicType::Int32);
        let i32v = m.types.varying(BasicType::Int32);
        let f32v = m.types.varying(BasicType::Float);
        let f_varying_int = add_fn(&mut m, "g", &[i32v]);
        let _f_varying_float = add_fn(&mut m, "g", &[f32v]);

        let cx = m.context();
        let got = resolve(
            &cx,
            "g",
            &cx.symtab.lookup_function_any("g"),
            Span::default(),
            Span::default(),
            &[i32u],
            None,
        );
        assert_eq!(got, Ok(f_varying_int));
    }

    #[test]
    fn ambiguity_is_reported_and_stops() {
        let mut m = Module::default();
        let i16u = m.types.uniform(BasicType::Int16);
        let i32u = m.types.uniform(BasicType::Int32);
        let i8u = m.types.uniform(BasicType::Int8);
        add_fn(&mut m, "h", &[i16u]);
        add_fn(&mut m, "h", &[i32u]);

        let cx = m.context();
        // int8 widens losslessly to both int16 and int32 at equal cost.
        let got = resolve(
            &cx,
            "h",
            &cx.symtab.lookup_function_any("h"),
            Span::default(),
            Span::default(),
            &[i8u],
            None,
        );
        assert!(got.is_err());
        assert_eq!(m.diags.error_count(), 1);
        assert!(m.diags.entries()[0]
            .message
            .contains("Multiple overloaded instances of function \"h\" matched."));
    }

    #[test]
    fn no_match_lists_candidates() {
        let mut m = Module::default();
        let i32u = m.types.uniform(BasicType::Int32);
        let sptr = m
            .types
            .pointer(m.types.uniform(BasicType::Float), lanec_core::Variability::Uniform);
        add_fn(&mut m, "k", &[sptr]);

        let cx = m.context();
        let got = resolve(
            &cx,
            "k",
            &cx.symtab.lookup_function_any("k"),
            Span::default(),
            Span::default(),
            &[i32u, i32u],
            None,
        );
        assert!(got.is_err());
        let msg = &m.diags.entries()[0].message;
        assert!(msg.contains("Unable to find matching overload for call to function \"k\""));
        assert!(msg.contains("Candidate function: k"));
        assert!(msg.contains("Passed types: (uniform int32, uniform int32)"));
    }

    #[test]
    fn null_literal_matches_pointer_formal_free() {
        let mut m = Module::default();
        let int_ptr = m
            .types
            .pointer(m.types.uniform(BasicType::Int32), lanec_core::Variability::Uniform);
        let target = add_fn(&mut m, "p", &[int_ptr]);

        let cx = m.context();
        let i32u = m.types.uniform(BasicType::Int32);
        let got = resolve(
            &cx,
            "p",
            &cx.symtab.lookup_function_any("p"),
            Span::default(),
            Span::default(),
            &[i32u],
            Some(&[true]),
        );
        assert_eq!(got, Ok(target));
    }

    #[test]
    fn default_arguments_extend_arity() {
        let mut m = Module::default();
        let i32u = m.types.uniform(BasicType::Int32);
        let fty = m
            .types
            .function(m.types.void(), vec![i32u, i32u], vec![false, true], false);
        let id = m
            .add_function(
                "d",
                fty,
                vec![
                    None,
                    Some(Expr::constant(
                        crate::value::ConstValue::Int32(vec![10]),
                        m.types.as_const(i32u),
                        Span::default(),
                    )),
                ],
                Span::default(),
            )
            .unwrap();

        let cx = m.context();
        let got = resolve(
            &cx,
            "d",
            &cx.symtab.lookup_function_any("d"),
            Span::default(),
            Span::default(),
            &[i32u],
            None,
        );
        assert_eq!(got, Ok(id));

        // Too few for the non-defaulted prefix.
        let got = resolve(
            &cx,
            "d",
            &cx.symtab.lookup_function_any("d"),
            Span::default(),
            Span::default(),
            &[],
            None,
        );
        assert!(got.is_err());
    }

    #[test]
    fn double_underscore_names_demand_exact_match() {
        let mut m = Module::default();
        let i64u = m.types.uniform(BasicType::Int64);
        add_fn(&mut m, "__builtin_thing", &[i64u]);

        let cx = m.context();
        let i32u = m.types.uniform(BasicType::Int32);
        // int32 would widen to int64, but builtins skip the widening tiers.
        let got = resolve(
            &cx,
            "__builtin_thing",
            &cx.symtab.lookup_function_any("__builtin_thing"),
            Span::default(),
            Span::default(),
            &[i32u],
            None,
        );
        assert!(got.is_err());
        assert!(m.diags.entries()[0]
            .message
            .contains("only considering exact matches"));

        let got = resolve(
            &cx,
            "__builtin_thing",
            &cx.symtab.lookup_function_any("__builtin_thing"),
            Span::default(),
            Span::default(),
            &[i64u],
            None,
        );
        assert!(got.is_ok());
    }

    #[test]
    fn enum_argument_widens_to_uint32() {
        let mut m = Module::default();
        let u32u = m.types.uniform(BasicType::UInt32);
        let f64u = m.types.uniform(BasicType::Double);
        let season = m.types.enum_type("Season", vec![("Winter".into(), 0)]);
        let f_u32 = add_fn(&mut m, "e", &[u32u]);
        let _f_double = add_fn(&mut m, "e", &[f64u]);

        let cx = m.context();
        // enum -> uint32 is a widening match (cost 1), decided before the
        // general-conversion tiers would make this ambiguous.
        let got = resolve(
            &cx,
            "e",
            &cx.symtab.lookup_function_any("e"),
            Span::default(),
            Span::default(),
            &[season],
            None,
        );
        assert_eq!(got, Ok(f_u32));
    }

    #[test]
    fn resolution_is_deterministic() {
        let mut m = Module::default();
        let i32u = m.types.uniform(BasicType::Int32);
        let f64u = m.types.uniform(BasicType::Double);
        add_fn(&mut m, "r", &[i32u]);
        add_fn(&mut m, "r", &[f64u]);

        let cx = m.context();
        let first = resolve(
            &cx,
            "r",
            &cx.symtab.lookup_function_any("r"),
            Span::default(),
            Span::default(),
            &[i32u],
            None,
        );
        for _ in 0..10 {
            let again = resolve(
                &cx,
                "r",
                &cx.symtab.lookup_function_any("r"),
                Span::default(),
                Span::default(),
                &[i32u],
                None,
            );
            assert_eq!(again, first);
        }
    }

    #[test]
    fn caller_const_is_erased_for_exact_match() {
        let mut m = Module::default();
        let i32u = m.types.uniform(BasicType::Int32);
        let id = add_fn(&mut m, "c", &[i32u]);

        let cx = m.context();
        let const_arg = m.types.as_const(i32u);
        let got = resolve(
            &cx,
            "c",
            &cx.symtab.lookup_function_any("c"),
            Span::default(),
            Span::default(),
            &[const_arg],
            None,
        );
        assert_eq!(got, Ok(id));
    }

    #[test]
    fn reference_formal_matches_value_argument_exactly() {
        let mut m = Module::default();
        let i32u = m.types.uniform(BasicType::Int32);
        let r = m.types.reference(i32u);
        let id = add_fn(&mut m, "rf", &[r]);

        let cx = m.context();
        let got = resolve(
            &cx,
            "rf",
            &cx.symtab.lookup_function_any("rf"),
            Span::default(),
            Span::default(),
            &[i32u],
            None,
        );
        assert_eq!(got, Ok(id));
    }

    #[test]
    fn unused_symbols_do_not_leak_into_resolution() {
        // A variable with the same name as a function must not confuse the
        // overload set.
        let mut m = Module::default();
        let i32u = m.types.uniform(BasicType::Int32);
        add_fn(&mut m, "v", &[i32u]);
        let var = Symbol::new("v", Span::default(), i32u, StorageClass::Auto);
        let _ = m.symtab.add_variable(var, &m.diags);

        let cx = m.context();
        let set = cx.symtab.lookup_function_any("v");
        assert_eq!(set.len(), 1);
        assert!(resolve(&cx, "v", &set, Span::default(), Span::default(), &[i32u], None).is_ok());
    }
}
