//! Semantic analysis for the lanec SPMD kernel language.
//!
//! This crate gives meaning to parsed programs: the scoped symbol table with
//! its overload sets, the expression AST with its two passes (type checking
//! and constant folding), the implicit conversion engine, and the tiered
//! overload resolver. The interesting part of the language is the
//! interaction of two type axes, width (uniform vs. varying across SIMD
//! lanes) and shape (atomic, vector, struct, array, pointer, reference),
//! and most of the code here exists to get that interaction right.
//!
//! The entry points are [`Module::add_function`] for declaration processing,
//! [`Module::check_and_optimize`] for expressions, and
//! [`Module::resolve_overload`] for standalone overload binding. Everything
//! downstream (code emission, task scheduling) consumes the checked trees
//! produced here.

pub mod convert;
pub mod ctx;
pub mod expr;
pub mod module;
pub mod overload;
pub mod symbol;
pub mod symtab;
pub mod value;

pub use convert::{can_convert, convert_expr};
pub use ctx::SemaContext;
pub use expr::{AssignOp, BinaryOp, Expr, ExprKind, UnaryOp};
pub use module::Module;
pub use overload::resolve_overload;
pub use symbol::{StorageClass, Symbol, SymbolId};
pub use symtab::SymbolTable;
pub use value::ConstValue;
