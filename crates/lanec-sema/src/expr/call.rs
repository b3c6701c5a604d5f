//! Function calls, including `launch` of task functions and calls through
//! function pointers.

use lanec_core::{BasicType, CompileError, Span, TypeId};

use crate::convert::{can_convert, convert_expr};
use crate::ctx::SemaContext;
use crate::expr::{Expr, ExprKind};
use crate::overload;

/// The function type behind a callee expression, which after resolution is
/// always a pointer to a function.
fn function_type(cx: &SemaContext<'_>, func: &Expr) -> Option<TypeId> {
    let ty = func.type_of(cx)?;
    let pointee = cx.types.pointee(ty)?;
    cx.types.is_function(pointee).then_some(pointee)
}

pub(super) fn type_of(func: &Expr, cx: &SemaContext<'_>) -> Option<TypeId> {
    let fty = function_type(cx, func)?;
    let (ret, _, _, _) = cx.types.function_signature(fty)?;
    Some(ret)
}

pub(super) fn type_check(
    func: Expr,
    args: Vec<Expr>,
    launch_count: Option<Expr>,
    pos: Span,
    cx: &SemaContext<'_>,
) -> Option<Expr> {
    let t = cx.types;
    let mut func = func;
    let args = args
        .into_iter()
        .map(|a| a.type_check(cx))
        .collect::<Option<Vec<_>>>()?;

    let mut arg_types = Vec::with_capacity(args.len());
    let mut arg_could_be_null = Vec::with_capacity(args.len());
    for arg in &args {
        arg_types.push(arg.type_of(cx)?);
        arg_could_be_null.push(arg.is_all_int_zeros(cx));
    }

    let is_named_function = matches!(func.kind, ExprKind::FunctionSymbol { .. });
    if is_named_function {
        if !overload::resolve_overload(cx, &mut func, pos, &arg_types, Some(&arg_could_be_null)) {
            return None;
        }
    }
    let func = func.type_check(cx)?;

    let Some(fty) = function_type(cx, &func) else {
        cx.diags.error(
            pos,
            "Valid function name must be used for function call.".to_string(),
        );
        return None;
    };
    let (ret, params, has_default, is_task) = t.function_signature(fty)?;

    // Arity. Resolution already guaranteed this for named calls; calls
    // through pointers check it here.
    if args.len() > params.len() {
        cx.diags.error(
            pos,
            format!(
                "Too many parameter values provided in function call ({} provided, {} expected).",
                args.len(),
                params.len()
            ),
        );
        return None;
    }
    if args.len() < params.len() && !has_default[args.len()] {
        cx.diags.error(
            pos,
            format!(
                "Too few parameter values provided in function call ({} provided, {} expected).",
                args.len(),
                params.len()
            ),
        );
        return None;
    }

    if !is_named_function {
        // A call through a function pointer has no overload set to filter
        // out incompatible arguments; validate each one here.
        for (i, arg_ty) in arg_types.iter().enumerate() {
            let param = params[i];
            let null_ok = arg_could_be_null[i] && t.is_pointer(param);
            if !null_ok && !can_convert(cx, *arg_ty, param) {
                cx.diags.error(
                    args[i].pos,
                    format!(
                        "Can't convert argument of type \"{}\" to type \"{}\" for function call argument.",
                        t.display(*arg_ty),
                        t.display(param)
                    ),
                );
                return None;
            }
        }
        let fptr_ty = func.type_of(cx)?;
        if t.is_varying(fptr_ty) && t.is_uniform(ret) && !t.is_void(ret) {
            cx.diags.error(
                pos,
                "Illegal to call a varying function pointer that points to a function with a uniform return type.".to_string(),
            );
            return None;
        }
    }

    // Convert the provided arguments to the formal parameter types. Literal
    // zeros against pointer formals become null pointers inside the
    // conversion engine.
    let mut converted = Vec::with_capacity(args.len());
    for (i, arg) in args.into_iter().enumerate() {
        converted.push(convert_expr(cx, arg, params[i], "function call argument")?);
    }

    let launch_count = match (is_task, launch_count) {
        (true, Some(count)) => {
            let count = count.type_check(cx)?;
            Some(convert_expr(
                cx,
                count,
                t.uniform(BasicType::Int32),
                "task launch count",
            )?)
        }
        (true, None) => {
            cx.diags.report(&CompileError::TaskWithoutLaunch { span: pos });
            return None;
        }
        (false, Some(_)) => {
            cx.diags.report(&CompileError::LaunchNonTask { span: pos });
            return None;
        }
        (false, None) => None,
    };

    Some(match launch_count {
        Some(count) => Expr::launch(func, converted, count, pos),
        None => Expr::call(func, converted, pos),
    })
}
