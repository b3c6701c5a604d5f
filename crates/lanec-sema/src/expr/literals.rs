//! Constant literals and initializer lists.
//!
//! Constant nodes are created fully typed and need no checking. Initializer
//! lists have no type of their own; their elements are checked individually
//! and the declaration code matches them against the declared shape.

use lanec_core::Span;

use crate::ctx::SemaContext;
use crate::expr::Expr;

pub(super) fn type_check_list(
    exprs: Vec<Expr>,
    pos: Span,
    cx: &SemaContext<'_>,
) -> Option<Expr> {
    let exprs = exprs
        .into_iter()
        .map(|e| e.type_check(cx))
        .collect::<Option<Vec<_>>>()?;
    Some(Expr::list(exprs, pos))
}
