//! The semantic context threaded through every pass.
//!
//! Bundles the read-only collaborators a pass needs: the type store, the
//! symbol table, target and optimization configuration, and the diagnostics
//! sink. There is no global state; a `Module` constructs one of these per
//! pass invocation.

use lanec_core::{BasicType, Diagnostics, OptFlags, TargetInfo, TypeId, TypeStore, Variability};

/// Shared, read-only view of the compilation state during a pass.
#[derive(Clone, Copy)]
pub struct SemaContext<'a> {
    pub types: &'a TypeStore,
    pub symtab: &'a crate::symtab::SymbolTable,
    pub target: &'a TargetInfo,
    pub opt: &'a OptFlags,
    pub diags: &'a Diagnostics,
}

impl<'a> SemaContext<'a> {
    /// The integer type of a pointer difference or offset: int32 when the
    /// target is 32-bit or 32-bit addressing is forced, else int64.
    pub fn pointer_offset_type(&self, varying: bool) -> TypeId {
        let basic = if self.target.is_32_bit || self.opt.force_32_bit_addressing {
            BasicType::Int32
        } else {
            BasicType::Int64
        };
        let v = if varying {
            Variability::Varying
        } else {
            Variability::Uniform
        };
        self.types.atomic(basic, v)
    }

    /// The result type of `sizeof`: unsigned, pointer-width.
    pub fn size_type(&self) -> TypeId {
        let basic = if self.target.is_32_bit || self.opt.force_32_bit_addressing {
            BasicType::UInt32
        } else {
            BasicType::UInt64
        };
        self.types.uniform(basic)
    }

    /// Lane count for varying constants on this target.
    pub fn lanes(&self) -> usize {
        self.target.vector_width as usize
    }
}
