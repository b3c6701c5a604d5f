//! Member access on structs and short vectors.
//!
//! `.` projects a member out of a struct or vector value; `->` does the same
//! through a pointer to a struct. Using one where the other is needed gets a
//! targeted "did you mean" diagnostic, and unknown struct members get
//! edit-distance suggestions over the member names.

use lanec_core::{CompileError, Span, TypeId, Variability};

use crate::ctx::SemaContext;
use crate::expr::Expr;
use crate::symtab::{edit_distance, suggestion_text};

/// Map single-letter element names to vector lanes. Supports the xyzw,
/// rgba, and uv conventions.
fn vector_element_index(name: &str) -> Option<usize> {
    let mut chars = name.chars();
    let c = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    match c {
        'x' | 'r' | 'u' => Some(0),
        'y' | 'g' | 'v' => Some(1),
        'z' | 'b' => Some(2),
        'w' | 'a' => Some(3),
        _ => None,
    }
}

/// The struct or vector type the member is looked up in, plus whether the
/// base is reached through a varying pointer. The checker has already
/// policed `.` against `->`, so this just looks through references and
/// pointers.
fn inner_type(base: &Expr, cx: &SemaContext<'_>) -> Option<(TypeId, bool)> {
    let t = cx.types;
    let ty = t.reference_target(base.type_of(cx)?);
    if t.is_pointer(ty) {
        Some((t.pointee(ty)?, t.is_varying(ty)))
    } else {
        Some((ty, false))
    }
}

pub(super) fn type_of(
    base: &Expr,
    member: &str,
    _arrow: bool,
    cx: &SemaContext<'_>,
) -> Option<TypeId> {
    let t = cx.types;
    let (inner, varying_ptr) = inner_type(base, cx)?;
    let elem = if t.is_struct(inner) {
        let i = t.struct_member_index(inner, member)?;
        t.element_type(inner, i)?
    } else if t.is_vector(inner) {
        vector_element_index(member)?;
        t.element_type(inner, 0)?
    } else {
        return None;
    };
    if varying_ptr {
        Some(t.as_varying(elem))
    } else {
        Some(elem)
    }
}

pub(super) fn lvalue_type(
    base: &Expr,
    member: &str,
    arrow: bool,
    cx: &SemaContext<'_>,
) -> Option<TypeId> {
    let t = cx.types;
    // Through a pointer, the base's value is the storage address; otherwise
    // the base must itself designate storage.
    let base_lv = if arrow {
        base.type_of(cx)?
    } else {
        base.lvalue_type(cx)?
    };
    let elem = type_of(base, member, arrow, cx)?;
    let variability = if t.is_uniform(base_lv) {
        Variability::Uniform
    } else {
        Variability::Varying
    };
    Some(t.pointer(elem, variability))
}

pub(super) fn type_check(
    base: Expr,
    member: String,
    member_pos: Span,
    arrow: bool,
    pos: Span,
    cx: &SemaContext<'_>,
) -> Option<Expr> {
    let t = cx.types;
    let mut base = base.type_check(cx)?;
    let mut ty = base.type_of(cx)?;

    if t.is_reference(ty) {
        let p = base.pos;
        base = Expr::deref(base, p);
        ty = base.type_of(cx)?;
    }

    let is_pointer = t.is_pointer(ty);
    if arrow && !is_pointer {
        if t.is_struct(t.reference_target(ty)) {
            cx.diags.error(
                pos,
                format!(
                    "Dereference operator \"->\" can't be applied to non-pointer type \"{}\".  Did you mean to use \".\"?",
                    t.display(ty)
                ),
            );
        } else {
            cx.diags.error(
                pos,
                format!(
                    "Dereference operator \"->\" can't be applied to non-struct pointer type \"{}\".",
                    t.display(ty)
                ),
            );
        }
        return None;
    }
    if !arrow && is_pointer && t.pointee(ty).is_some_and(|p| t.is_struct(p)) {
        cx.diags.error(
            pos,
            format!(
                "Member operator \".\" can't be applied to pointer type \"{}\".  Did you mean to use \"->\"?",
                t.display(ty)
            ),
        );
        return None;
    }

    let inner = if is_pointer {
        t.pointee(ty).expect("pointers have a pointee")
    } else {
        ty
    };

    if t.is_struct(inner) {
        if t.struct_member_index(inner, &member).is_none() {
            let names = t.struct_member_names(inner);
            let mut near: Vec<String> = names
                .iter()
                .filter(|n| edit_distance(&member, n, 2).is_some())
                .cloned()
                .collect();
            near.sort_unstable();
            cx.diags.report(&CompileError::UnknownMember {
                member: member.clone(),
                struct_type: t.display(inner),
                suggestions: suggestion_text(&near),
                span: member_pos,
            });
            return None;
        }
    } else if t.is_vector(inner) {
        match vector_element_index(&member) {
            Some(i) if (i as u32) < t.element_count(inner).unwrap_or(0) => {}
            _ => {
                cx.diags.error(
                    member_pos,
                    format!(
                        "Vector element identifier \"{}\" unknown for type \"{}\".",
                        member,
                        t.display(inner)
                    ),
                );
                return None;
            }
        }
    } else {
        cx.diags.error(
            pos,
            format!(
                "Member operator \"{}\" can't be used with expression of \"{}\" type.",
                if arrow { "->" } else { "." },
                t.display(ty)
            ),
        );
        return None;
    }

    Some(Expr::member(base, member, member_pos, arrow, pos))
}
