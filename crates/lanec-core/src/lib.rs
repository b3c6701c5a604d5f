//! Foundation crate for the lanec SPMD kernel language front end.
//!
//! Hosts the pieces every other crate depends on: source positions, the
//! diagnostics sink, the structured error taxonomy, target/optimization
//! configuration, and the interning type system with its uniform/varying
//! variability model.

pub mod diag;
pub mod error;
pub mod span;
pub mod target;
pub mod types;

pub use diag::{Diagnostic, Diagnostics, Severity};
pub use error::CompileError;
pub use span::Span;
pub use target::{OptFlags, TargetInfo};
pub use types::{BasicType, StructMember, TypeData, TypeId, TypeStore, Variability};
