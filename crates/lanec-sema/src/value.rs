//! Compile-time constant values.
//!
//! A [`ConstValue`] holds one value per lane: a single value for uniform
//! constants, or one per SIMD lane for varying constants (all lanes equal
//! after a broadcast, but folding can in principle produce distinct lanes).
//! Lane-wise conversions follow the same rules the code emitter applies at
//! run time, so folding a cast and emitting one agree.

use lanec_core::BasicType;

/// Lanes of a compile-time constant, typed by its basic type.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    Bool(Vec<bool>),
    Int8(Vec<i8>),
    UInt8(Vec<u8>),
    Int16(Vec<i16>),
    UInt16(Vec<u16>),
    Int32(Vec<i32>),
    UInt32(Vec<u32>),
    Int64(Vec<i64>),
    UInt64(Vec<u64>),
    Float(Vec<f32>),
    Double(Vec<f64>),
}

macro_rules! for_each_lane_variant {
    ($value:expr, $lanes:pat => $body:expr) => {
        match $value {
            ConstValue::Bool($lanes) => $body,
            ConstValue::Int8($lanes) => $body,
            ConstValue::UInt8($lanes) => $body,
            ConstValue::Int16($lanes) => $body,
            ConstValue::UInt16($lanes) => $body,
            ConstValue::Int32($lanes) => $body,
            ConstValue::UInt32($lanes) => $body,
            ConstValue::Int64($lanes) => $body,
            ConstValue::UInt64($lanes) => $body,
            ConstValue::Float($lanes) => $body,
            ConstValue::Double($lanes) => $body,
        }
    };
}

impl ConstValue {
    /// The basic type these lanes are stored as.
    pub fn basic(&self) -> BasicType {
        match self {
            ConstValue::Bool(_) => BasicType::Bool,
            ConstValue::Int8(_) => BasicType::Int8,
            ConstValue::UInt8(_) => BasicType::UInt8,
            ConstValue::Int16(_) => BasicType::Int16,
            ConstValue::UInt16(_) => BasicType::UInt16,
            ConstValue::Int32(_) => BasicType::Int32,
            ConstValue::UInt32(_) => BasicType::UInt32,
            ConstValue::Int64(_) => BasicType::Int64,
            ConstValue::UInt64(_) => BasicType::UInt64,
            ConstValue::Float(_) => BasicType::Float,
            ConstValue::Double(_) => BasicType::Double,
        }
    }

    /// Number of lanes held (1 for uniform constants).
    pub fn lane_count(&self) -> usize {
        for_each_lane_variant!(self, lanes => lanes.len())
    }

    /// Whether this is an integer constant with every lane zero. Used to
    /// treat literal zeros as null-pointer candidates.
    pub fn is_all_int_zero(&self) -> bool {
        match self {
            ConstValue::Int8(v) => v.iter().all(|&x| x == 0),
            ConstValue::UInt8(v) => v.iter().all(|&x| x == 0),
            ConstValue::Int16(v) => v.iter().all(|&x| x == 0),
            ConstValue::UInt16(v) => v.iter().all(|&x| x == 0),
            ConstValue::Int32(v) => v.iter().all(|&x| x == 0),
            ConstValue::UInt32(v) => v.iter().all(|&x| x == 0),
            ConstValue::Int64(v) => v.iter().all(|&x| x == 0),
            ConstValue::UInt64(v) => v.iter().all(|&x| x == 0),
            _ => false,
        }
    }

    /// Whether every lane is "true" under the C truth rule (nonzero).
    pub fn all_true(&self) -> bool {
        (0..self.lane_count()).all(|i| self.lane_as_bool(i))
    }

    /// Whether every lane is "false".
    pub fn all_false(&self) -> bool {
        (0..self.lane_count()).all(|i| !self.lane_as_bool(i))
    }

    /// Lane `i` widened to `f64`.
    pub fn lane_as_f64(&self, i: usize) -> f64 {
        match self {
            ConstValue::Bool(v) => v[i] as u8 as f64,
            ConstValue::Int8(v) => v[i] as f64,
            ConstValue::UInt8(v) => v[i] as f64,
            ConstValue::Int16(v) => v[i] as f64,
            ConstValue::UInt16(v) => v[i] as f64,
            ConstValue::Int32(v) => v[i] as f64,
            ConstValue::UInt32(v) => v[i] as f64,
            ConstValue::Int64(v) => v[i] as f64,
            ConstValue::UInt64(v) => v[i] as f64,
            ConstValue::Float(v) => v[i] as f64,
            ConstValue::Double(v) => v[i],
        }
    }

    /// Lane `i` converted to `i64` with C cast semantics.
    pub fn lane_as_i64(&self, i: usize) -> i64 {
        match self {
            ConstValue::Bool(v) => v[i] as i64,
            ConstValue::Int8(v) => v[i] as i64,
            ConstValue::UInt8(v) => v[i] as i64,
            ConstValue::Int16(v) => v[i] as i64,
            ConstValue::UInt16(v) => v[i] as i64,
            ConstValue::Int32(v) => v[i] as i64,
            ConstValue::UInt32(v) => v[i] as i64,
            ConstValue::Int64(v) => v[i],
            ConstValue::UInt64(v) => v[i] as i64,
            ConstValue::Float(v) => v[i] as i64,
            ConstValue::Double(v) => v[i] as i64,
        }
    }

    /// Lane `i` converted to `u64` with C cast semantics.
    pub fn lane_as_u64(&self, i: usize) -> u64 {
        match self {
            ConstValue::Bool(v) => v[i] as u64,
            ConstValue::Int8(v) => v[i] as u64,
            ConstValue::UInt8(v) => v[i] as u64,
            ConstValue::Int16(v) => v[i] as u64,
            ConstValue::UInt16(v) => v[i] as u64,
            ConstValue::Int32(v) => v[i] as u64,
            ConstValue::UInt32(v) => v[i] as u64,
            ConstValue::Int64(v) => v[i] as u64,
            ConstValue::UInt64(v) => v[i],
            ConstValue::Float(v) => v[i] as u64,
            ConstValue::Double(v) => v[i] as u64,
        }
    }

    /// Lane `i` under the C truth rule.
    pub fn lane_as_bool(&self, i: usize) -> bool {
        match self {
            ConstValue::Bool(v) => v[i],
            ConstValue::Float(v) => v[i] != 0.0,
            ConstValue::Double(v) => v[i] != 0.0,
            _ => self.lane_as_u64(i) != 0,
        }
    }

    /// Convert every lane to `to`, optionally broadcasting a single lane out
    /// to `broadcast_to` lanes first (uniform constant cast to varying).
    pub fn convert(&self, to: BasicType, broadcast_to: Option<usize>) -> ConstValue {
        let count = match broadcast_to {
            Some(n) if self.lane_count() == 1 => n,
            _ => self.lane_count(),
        };
        let lane = |i: usize| {
            if self.lane_count() == 1 {
                0
            } else {
                i
            }
        };

        macro_rules! signed_lanes {
            ($ctor:ident, $t:ty) => {
                ConstValue::$ctor(
                    (0..count)
                        .map(|i| match self {
                            ConstValue::Float(v) => v[lane(i)] as $t,
                            ConstValue::Double(v) => v[lane(i)] as $t,
                            ConstValue::UInt64(v) => v[lane(i)] as $t,
                            other => other.lane_as_i64(lane(i)) as $t,
                        })
                        .collect(),
                )
            };
        }
        macro_rules! unsigned_lanes {
            ($ctor:ident, $t:ty) => {
                ConstValue::$ctor(
                    (0..count)
                        .map(|i| match self {
                            ConstValue::Float(v) => v[lane(i)] as $t,
                            ConstValue::Double(v) => v[lane(i)] as $t,
                            other => other.lane_as_u64(lane(i)) as $t,
                        })
                        .collect(),
                )
            };
        }

        match to {
            BasicType::Bool => {
                ConstValue::Bool((0..count).map(|i| self.lane_as_bool(lane(i))).collect())
            }
            BasicType::Int8 => signed_lanes!(Int8, i8),
            BasicType::Int16 => signed_lanes!(Int16, i16),
            BasicType::Int32 => signed_lanes!(Int32, i32),
            BasicType::Int64 => signed_lanes!(Int64, i64),
            BasicType::UInt8 => unsigned_lanes!(UInt8, u8),
            BasicType::UInt16 => unsigned_lanes!(UInt16, u16),
            BasicType::UInt32 => unsigned_lanes!(UInt32, u32),
            BasicType::UInt64 => unsigned_lanes!(UInt64, u64),
            BasicType::Float => {
                ConstValue::Float((0..count).map(|i| self.lane_as_f64(lane(i)) as f32).collect())
            }
            BasicType::Double => {
                ConstValue::Double((0..count).map(|i| self.lane_as_f64(lane(i))).collect())
            }
            BasicType::Void => unreachable!("no constant has type void"),
        }
    }

    /// Whether converting to `to` and back reproduces this value exactly.
    /// Used to suppress precision warnings for constants that fit.
    pub fn fits_in(&self, to: BasicType) -> bool {
        if to == BasicType::Void {
            return false;
        }
        let round_trip = self.convert(to, None).convert(self.basic(), None);
        round_trip == *self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lane_count_and_basic() {
        let v = ConstValue::Int32(vec![1, 2, 3, 4]);
        assert_eq!(v.lane_count(), 4);
        assert_eq!(v.basic(), BasicType::Int32);
    }

    #[test]
    fn zero_detection_is_integer_only() {
        assert!(ConstValue::Int32(vec![0]).is_all_int_zero());
        assert!(ConstValue::UInt64(vec![0, 0]).is_all_int_zero());
        assert!(!ConstValue::Int32(vec![0, 1]).is_all_int_zero());
        assert!(!ConstValue::Float(vec![0.0]).is_all_int_zero());
        assert!(!ConstValue::Bool(vec![false]).is_all_int_zero());
    }

    #[test]
    fn conversion_truncates_like_a_cast() {
        let v = ConstValue::Double(vec![3.7]);
        assert_eq!(v.convert(BasicType::Int32, None), ConstValue::Int32(vec![3]));

        let neg = ConstValue::Int32(vec![-1]);
        assert_eq!(
            neg.convert(BasicType::UInt8, None),
            ConstValue::UInt8(vec![255])
        );

        let wide = ConstValue::Int32(vec![0x1_23]);
        assert_eq!(
            wide.convert(BasicType::Int8, None),
            ConstValue::Int8(vec![0x23])
        );
    }

    #[test]
    fn conversion_to_bool_uses_truth_rule() {
        let v = ConstValue::Int32(vec![0, 5]);
        assert_eq!(
            v.convert(BasicType::Bool, None),
            ConstValue::Bool(vec![false, true])
        );
        let f = ConstValue::Float(vec![0.0, -2.5]);
        assert_eq!(
            f.convert(BasicType::Bool, None),
            ConstValue::Bool(vec![false, true])
        );
    }

    #[test]
    fn broadcast_smears_one_lane() {
        let v = ConstValue::Int32(vec![7]);
        assert_eq!(
            v.convert(BasicType::Int32, Some(4)),
            ConstValue::Int32(vec![7, 7, 7, 7])
        );
    }

    #[test]
    fn fits_in_detects_lossless_constants() {
        assert!(ConstValue::Int32(vec![100]).fits_in(BasicType::Int8));
        assert!(!ConstValue::Int32(vec![1000]).fits_in(BasicType::Int8));
        assert!(ConstValue::Double(vec![0.5]).fits_in(BasicType::Float));
        assert!(!ConstValue::Double(vec![0.1]).fits_in(BasicType::Float));
        assert!(ConstValue::Int32(vec![1 << 20]).fits_in(BasicType::Float));
        assert!(!ConstValue::Int32(vec![(1 << 24) + 1]).fits_in(BasicType::Float));
        assert!(!ConstValue::Int32(vec![-1]).fits_in(BasicType::UInt32));
    }

    #[test]
    fn truth_queries() {
        assert!(ConstValue::Bool(vec![true, true]).all_true());
        assert!(!ConstValue::Bool(vec![true, false]).all_true());
        assert!(ConstValue::Int32(vec![0, 0]).all_false());
    }
}
