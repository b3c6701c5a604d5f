//! Compilation target and optimization configuration.
//!
//! These are plain-data records provided by the driver and threaded through
//! the semantic context. The front end never mutates them.

use crate::types::BasicType;

/// Read-only description of the compilation target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetInfo {
    /// Number of SIMD lanes in a gang; the lane count of every varying value.
    pub vector_width: u32,
    /// Whether the target uses 32-bit addressing.
    pub is_32_bit: bool,
    /// Integer type wide enough to hold a pointer on this target.
    pub pointer_int_type: BasicType,
}

impl TargetInfo {
    /// A 64-bit target with the given gang width.
    pub fn new(vector_width: u32) -> Self {
        Self {
            vector_width,
            is_32_bit: false,
            pointer_int_type: BasicType::UInt64,
        }
    }

    /// A 32-bit target with the given gang width.
    pub fn new_32_bit(vector_width: u32) -> Self {
        Self {
            vector_width,
            is_32_bit: true,
            pointer_int_type: BasicType::UInt32,
        }
    }
}

impl Default for TargetInfo {
    fn default() -> Self {
        Self::new(8)
    }
}

/// Optimization switches that affect semantic analysis.
///
/// Only `fast_math`, `force_32_bit_addressing`, and
/// `disable_uniform_memory_optimizations` change the checked tree; the rest
/// are recorded here for the code emitter and round-trip through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OptFlags {
    pub fast_math: bool,
    pub force_32_bit_addressing: bool,
    pub disable_masked_store_to_store: bool,
    pub disable_mask_all_on_optimizations: bool,
    pub disable_uniform_memory_optimizations: bool,
}
