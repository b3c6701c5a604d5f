//! Structured errors for semantic analysis.
//!
//! Each variant corresponds to one class of user-visible failure: lookup,
//! shape mismatch, variability violation, constness violation, overload
//! failure, arithmetic misuse, or an internal invariant. Engine-level code
//! (the conversion engine, the overload resolver, the symbol table) builds
//! these; the pass layer renders each one into the diagnostics sink exactly
//! once and then propagates `None` upward.
//!
//! Type names inside messages are the display strings produced by
//! `TypeStore::display`, already resolved by the caller so this module stays
//! independent of the interner.

use thiserror::Error;

use crate::span::Span;

/// A semantic error with its source position.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    /// Unknown variable or function name, with near-miss suggestions.
    #[error("Undeclared symbol \"{name}\".{suggestions}")]
    UnknownSymbol {
        name: String,
        suggestions: String,
        span: Span,
    },

    /// Unknown type name, with near-miss suggestions.
    #[error("Undeclared type \"{name}\".{suggestions}")]
    UnknownType {
        name: String,
        suggestions: String,
        span: Span,
    },

    /// Unknown struct member, with near-miss suggestions.
    #[error("Member \"{member}\" not found in struct type \"{struct_type}\".{suggestions}")]
    UnknownMember {
        member: String,
        struct_type: String,
        suggestions: String,
        span: Span,
    },

    /// Redeclaration of a variable in the same scope.
    #[error("Ignoring redeclaration of symbol \"{name}\".")]
    Redeclaration { name: String, span: Span },

    /// Redefinition of a type alias in the same scope.
    #[error("Ignoring redefinition of type \"{name}\".")]
    TypeRedefinition { name: String, span: Span },

    /// Implicit conversion of a varying value to a uniform type.
    #[error("Can't convert from varying type \"{from}\" to uniform type \"{to}\" for {context}.")]
    VaryingToUniform {
        from: String,
        to: String,
        context: String,
        span: Span,
    },

    /// Conversion to or from `void`.
    #[error("Can't convert between type \"{from}\" and \"{to}\" for {context}.")]
    VoidConversion {
        from: String,
        to: String,
        context: String,
        span: Span,
    },

    /// Array whose element type is incompatible with the pointer target.
    #[error(
        "Can't convert from incompatible array type \"{from}\" to pointer type \"{to}\" for {context}."
    )]
    ArrayToPointer {
        from: String,
        to: String,
        context: String,
        span: Span,
    },

    /// Pointer converted to a non-pointer, non-bool type.
    #[error("Can't convert from pointer type \"{from}\" to non-pointer type \"{to}\" for {context}.")]
    PointerToNonPointer {
        from: String,
        to: String,
        context: String,
        span: Span,
    },

    /// Pointers with incompatible targets.
    #[error("Can't convert between incompatible pointer types \"{from}\" and \"{to}\" for {context}.")]
    IncompatiblePointers {
        from: String,
        to: String,
        context: String,
        span: Span,
    },

    /// References with incompatible targets.
    #[error(
        "Can't convert between incompatible reference types \"{from}\" and \"{to}\" for {context}."
    )]
    IncompatibleReferences {
        from: String,
        to: String,
        context: String,
        span: Span,
    },

    /// Arrays with different element types.
    #[error("Array type \"{from}\" can't be converted to type \"{to}\" for {context}.")]
    IncompatibleArrays {
        from: String,
        to: String,
        context: String,
        span: Span,
    },

    /// Short vectors with different element counts.
    #[error(
        "Can't convert between differently sized vector types \"{from}\" and \"{to}\" for {context}."
    )]
    VectorSizeMismatch {
        from: String,
        to: String,
        context: String,
        span: Span,
    },

    /// Structurally different struct types.
    #[error("Can't convert between different struct types \"{from}\" and \"{to}\" for {context}.")]
    DifferentStructs {
        from: String,
        to: String,
        context: String,
        span: Span,
    },

    /// Two distinct enum types never convert implicitly.
    #[error("Can't convert between different enum types \"{from}\" and \"{to}\" for {context}.")]
    DifferentEnums {
        from: String,
        to: String,
        context: String,
        span: Span,
    },

    /// Fallback for conversions with no rule at all.
    #[error("Can't convert from type \"{from}\" to type \"{to}\" for {context}.")]
    NoConversion {
        from: String,
        to: String,
        context: String,
        span: Span,
    },

    /// No overload accepted the given argument types.
    #[error(
        "Unable to find matching overload for call to function \"{name}\"{}.\n{candidates}",
        if *.exact_only { " only considering exact matches" } else { "" }
    )]
    NoMatchingOverload {
        name: String,
        exact_only: bool,
        /// Pre-rendered candidate signatures and passed argument types.
        candidates: String,
        span: Span,
    },

    /// Several overloads tied at the minimum conversion cost.
    #[error("Multiple overloaded instances of function \"{name}\" matched.\n{candidates}")]
    AmbiguousOverload {
        name: String,
        candidates: String,
        span: Span,
    },

    /// Assignment (or increment/decrement) of a const lvalue.
    #[error("Can't assign to type \"{lhs}\" on left-hand side of expression.")]
    AssignToConst { lhs: String, span: Span },

    /// Whole-struct assignment where some member is const.
    #[error(
        "Illegal to assign to type \"{struct_type}\" due to element \"{member}\" with type \"{member_type}\"."
    )]
    ConstStructMember {
        struct_type: String,
        member: String,
        member_type: String,
        span: Span,
    },

    /// The left side of an assignment does not designate storage.
    #[error("Left hand side of assignment expression can't be assigned to.")]
    NotAssignable { span: Span },

    /// Arithmetic on `void *`.
    #[error("Illegal to perform pointer arithmetic on \"{ty}\" type.")]
    VoidPointerArithmetic { ty: String, span: Span },

    /// `launch` applied to a function without the `task` qualifier.
    #[error("\"launch\" expression illegal with non-task-qualified function.")]
    LaunchNonTask { span: Span },

    /// A `task` function called without `launch`.
    #[error("\"launch\" expression needed to call function with \"task\" qualifier.")]
    TaskWithoutLaunch { span: Span },

    /// Internal invariant violation; reported as fatal.
    #[error("internal error: {message}")]
    Internal { message: String, span: Span },
}

impl CompileError {
    /// The source position this error is anchored to.
    pub fn span(&self) -> Span {
        match self {
            CompileError::UnknownSymbol { span, .. }
            | CompileError::UnknownType { span, .. }
            | CompileError::UnknownMember { span, .. }
            | CompileError::Redeclaration { span, .. }
            | CompileError::TypeRedefinition { span, .. }
            | CompileError::VaryingToUniform { span, .. }
            | CompileError::VoidConversion { span, .. }
            | CompileError::ArrayToPointer { span, .. }
            | CompileError::PointerToNonPointer { span, .. }
            | CompileError::IncompatiblePointers { span, .. }
            | CompileError::IncompatibleReferences { span, .. }
            | CompileError::IncompatibleArrays { span, .. }
            | CompileError::VectorSizeMismatch { span, .. }
            | CompileError::DifferentStructs { span, .. }
            | CompileError::DifferentEnums { span, .. }
            | CompileError::NoConversion { span, .. }
            | CompileError::NoMatchingOverload { span, .. }
            | CompileError::AmbiguousOverload { span, .. }
            | CompileError::AssignToConst { span, .. }
            | CompileError::ConstStructMember { span, .. }
            | CompileError::NotAssignable { span }
            | CompileError::VoidPointerArithmetic { span, .. }
            | CompileError::LaunchNonTask { span }
            | CompileError::TaskWithoutLaunch { span }
            | CompileError::Internal { span, .. } => *span,
        }
    }
}
