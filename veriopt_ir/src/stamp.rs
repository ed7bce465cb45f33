//! Stamps: the abstract value a node is known to produce.
//!
//! A stamp bounds a value node's possible results. Integer stamps carry a
//! bit width, signed bounds and known-bit masks; object stamps carry a
//! declared type and nullness; pointer stamps only nullness.

/// Abstract value descriptor attached to every node.
#[derive(Debug, Clone, PartialEq)]
pub enum Stamp {
    Integer(IntegerStamp),
    Float(FloatStamp),
    Object(ObjectStamp),
    Pointer(PointerStamp),
    Void,
    /// No value; the stamp of control and state nodes.
    Illegal,
}

impl Stamp {
    /// Integer stamp of `bits` width spanning `[lower, upper]`.
    pub fn int_range(bits: u32, lower: i64, upper: i64) -> Self {
        Stamp::Integer(IntegerStamp::new(bits, lower, upper))
    }

    /// The exact stamp of a 32-bit constant.
    pub fn int_constant(v: i32) -> Self {
        Stamp::int_range(32, v as i64, v as i64)
    }

    /// Unrestricted stamp of the given width.
    pub fn int(bits: u32) -> Self {
        Stamp::Integer(IntegerStamp::unrestricted(bits))
    }

    /// Object stamp of declared type `ty`, not exact, maybe null.
    pub fn object(ty: impl Into<String>) -> Self {
        Stamp::Object(ObjectStamp {
            type_name: Some(ty.into()),
            exact: false,
            non_null: false,
            always_null: false,
        })
    }

    /// Stamp of a freshly allocated `ty`: exact and non-null.
    pub fn allocated(ty: impl Into<String>) -> Self {
        Stamp::Object(ObjectStamp {
            type_name: Some(ty.into()),
            exact: true,
            non_null: true,
            always_null: false,
        })
    }

    /// Stamp of the null constant.
    pub fn null() -> Self {
        Stamp::Object(ObjectStamp {
            type_name: None,
            exact: false,
            non_null: false,
            always_null: true,
        })
    }

    pub fn is_value(&self) -> bool {
        !matches!(self, Stamp::Illegal | Stamp::Void)
    }

    /// Short variant name used in diagnostics.
    pub fn kind_name(&self) -> &str {
        match self {
            Stamp::Integer(_) => "IntegerStamp",
            Stamp::Float(_) => "FloatStamp",
            Stamp::Object(_) => "ObjectStamp",
            Stamp::Pointer(p) => p.kind.name(),
            Stamp::Void => "VoidStamp",
            Stamp::Illegal => "IllegalStamp",
        }
    }
}

impl Default for Stamp {
    fn default() -> Self {
        Stamp::Illegal
    }
}

// =============================================================================
// Integer Stamps
// =============================================================================

/// Width, signed bounds and known bits of an integer value.
///
/// `must_be_set` and `may_be_set` are confined to the low `bits` bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntegerStamp {
    pub bits: u32,
    pub lower: i64,
    pub upper: i64,
    pub must_be_set: u64,
    pub may_be_set: u64,
}

/// Mask covering the low `bits` bits.
pub const fn width_mask(bits: u32) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

/// Smallest signed value representable in `bits` bits.
pub const fn min_signed(bits: u32) -> i64 {
    if bits >= 64 {
        i64::MIN
    } else {
        -(1i64 << (bits - 1))
    }
}

/// Largest signed value representable in `bits` bits.
pub const fn max_signed(bits: u32) -> i64 {
    if bits >= 64 {
        i64::MAX
    } else {
        (1i64 << (bits - 1)) - 1
    }
}

impl IntegerStamp {
    /// Stamp for `[lower, upper]` with known bits derived from the bounds.
    ///
    /// When both bounds share a sign, every value in between shares the
    /// bits above their highest differing bit.
    pub fn new(bits: u32, lower: i64, upper: i64) -> Self {
        debug_assert!((1..=64).contains(&bits));
        let mask = width_mask(bits);
        let (must_be_set, may_be_set) = if (lower >= 0) == (upper >= 0) {
            let diff = ((lower ^ upper) as u64) & mask;
            if diff == 0 {
                let exact = (lower as u64) & mask;
                (exact, exact)
            } else {
                let highest = 63 - diff.leading_zeros();
                let low_bits = width_mask(highest + 1);
                let common = (lower as u64) & mask & !low_bits;
                (common, common | (low_bits & mask))
            }
        } else {
            (0, mask)
        };
        Self {
            bits,
            lower,
            upper,
            must_be_set,
            may_be_set,
        }
    }

    /// Stamp with explicitly supplied known-bit masks.
    pub fn with_masks(bits: u32, lower: i64, upper: i64, must_be_set: u64, may_be_set: u64) -> Self {
        let mask = width_mask(bits);
        Self {
            bits,
            lower,
            upper,
            must_be_set: must_be_set & mask,
            may_be_set: may_be_set & mask,
        }
    }

    /// Every value of the width.
    pub fn unrestricted(bits: u32) -> Self {
        Self::new(bits, min_signed(bits), max_signed(bits))
    }

    pub fn is_constant(&self) -> bool {
        self.lower == self.upper
    }
}

// =============================================================================
// Other Stamps
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatStamp {
    pub bits: u32,
    pub lower: f64,
    pub upper: f64,
}

impl FloatStamp {
    pub fn new(bits: u32, lower: f64, upper: f64) -> Self {
        Self { bits, lower, upper }
    }

    pub fn unrestricted(bits: u32) -> Self {
        Self::new(bits, f64::NEG_INFINITY, f64::INFINITY)
    }
}

/// Declared type and nullness of a reference.
///
/// `non_null` and `always_null` are independent; both false means "maybe null".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectStamp {
    pub type_name: Option<String>,
    pub exact: bool,
    pub non_null: bool,
    pub always_null: bool,
}

/// Family of a raw pointer stamp.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PointerKind {
    Klass,
    MethodCounters,
    MethodPointers,
    Raw,
    /// Any other pointer-like stamp, by class name.
    Other(String),
}

impl PointerKind {
    pub fn name(&self) -> &str {
        match self {
            PointerKind::Klass => "KlassPointerStamp",
            PointerKind::MethodCounters => "MethodCountersPointerStamp",
            PointerKind::MethodPointers => "MethodPointersStamp",
            PointerKind::Raw => "RawPointerStamp",
            PointerKind::Other(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PointerStamp {
    pub kind: PointerKind,
    pub non_null: bool,
    pub always_null: bool,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_constant_masks_are_exact() {
        let s = IntegerStamp::new(32, 5, 5);
        assert_eq!(s.must_be_set, 5);
        assert_eq!(s.may_be_set, 5);

        let neg = IntegerStamp::new(32, -1, -1);
        assert_eq!(neg.must_be_set, 0xffff_ffff);
        assert_eq!(neg.may_be_set, 0xffff_ffff);
    }

    #[test]
    fn test_mixed_sign_range_knows_nothing() {
        let s = IntegerStamp::new(32, -5, 5);
        assert_eq!(s.must_be_set, 0);
        assert_eq!(s.may_be_set, 0xffff_ffff);
    }

    #[test]
    fn test_positive_range_shares_high_bits() {
        // 0b1000..0b1011
        let s = IntegerStamp::new(8, 8, 11);
        assert_eq!(s.must_be_set, 0b1000);
        assert_eq!(s.may_be_set, 0b1011);
    }

    #[test]
    fn test_unrestricted_bounds() {
        let b = IntegerStamp::unrestricted(8);
        assert_eq!((b.lower, b.upper), (-128, 127));
        let l = IntegerStamp::unrestricted(64);
        assert_eq!((l.lower, l.upper), (i64::MIN, i64::MAX));
        assert_eq!(l.may_be_set, u64::MAX);
        let z = IntegerStamp::unrestricted(1);
        assert_eq!((z.lower, z.upper), (-1, 0));
    }

    #[test]
    fn test_with_masks_truncates_to_width() {
        let s = IntegerStamp::with_masks(16, 0, 10, u64::MAX, u64::MAX);
        assert_eq!(s.must_be_set, 0xffff);
    }

    #[test]
    fn test_stamp_helpers() {
        assert!(Stamp::int(32).is_value());
        assert!(!Stamp::Illegal.is_value());
        assert_eq!(Stamp::null().kind_name(), "ObjectStamp");
        let p = Stamp::Pointer(PointerStamp {
            kind: PointerKind::Klass,
            non_null: true,
            always_null: false,
        });
        assert_eq!(p.kind_name(), "KlassPointerStamp");
    }

    proptest! {
        #[test]
        fn test_masks_cover_every_value_in_range(
            (lo, hi, v) in (any::<i32>(), any::<i32>()).prop_flat_map(|(a, b)| {
                let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
                (Just(lo), Just(hi), lo..=hi)
            })
        ) {
            let s = IntegerStamp::new(32, lo as i64, hi as i64);
            let bits = (v as i64 as u64) & width_mask(32);
            prop_assert_eq!(bits & s.must_be_set, s.must_be_set);
            prop_assert_eq!(bits & !s.may_be_set, 0);
        }
    }
}
