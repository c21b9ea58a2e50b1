use proc_bitfield::bitfield;
use serde::{Deserialize, Serialize};

pub const EXPONENT_BIAS: i32 = 16383;
pub const EXPONENT_MAX: u16 = 0x7FFF;

bitfield! {
    /// Raw bit representation of the 80-bit extended-precision real format
    ///
    /// Unlike the IEEE 754 single/double formats, the integer bit of the
    /// significand is explicit (bit 63). A normal value therefore always has
    /// bit 63 set; encodings with a non-zero, non-maximal exponent and a
    /// clear integer bit ("unnormals") are unsupported operands.
    #[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
    pub struct Float80(pub u128): Debug, FromStorage, IntoStorage, DerefStorage {
        /// f (fraction, excluding the integer bit)
        pub frac: u64 @ 0..=62,

        /// j (explicit integer bit)
        pub j: bool @ 63,

        /// Full 64-bit significand (f + j)
        pub sig: u64 @ 0..=63,

        /// e (biased exponent)
        pub exp: u16 @ 64..=78,

        /// s (sign bit)
        pub sign: bool @ 79,
    }
}

impl Float80 {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(0x3FFF_8000_0000_0000_0000);
    pub const NEG_ONE: Self = Self(0xBFFF_8000_0000_0000_0000);
    pub const INFINITY: Self = Self(0x7FFF_8000_0000_0000_0000);
    pub const NEG_INFINITY: Self = Self(0xFFFF_8000_0000_0000_0000);

    /// The "indefinite" QNaN produced by invalid operations
    pub const DEFAULT_NAN: Self = Self(0xFFFF_C000_0000_0000_0000);

    pub fn pack(sign: bool, exp: u16, sig: u64) -> Self {
        Self::default().with_sign(sign).with_exp(exp).with_sig(sig)
    }

    pub fn zero(sign: bool) -> Self {
        Self::default().with_sign(sign)
    }

    pub fn inf(sign: bool) -> Self {
        if sign { Self::NEG_INFINITY } else { Self::INFINITY }
    }

    /// Largest representable finite magnitude
    pub fn max_finite(sign: bool) -> Self {
        Self::pack(sign, EXPONENT_MAX - 1, u64::MAX)
    }

    pub fn is_zero(self) -> bool {
        self.exp() == 0 && self.sig() == 0
    }

    /// Denormal operand (includes the pseudo-denormal encoding with the
    /// integer bit set, which is still accepted as an operand)
    pub fn is_denormal(self) -> bool {
        self.exp() == 0 && self.sig() != 0
    }

    pub fn is_inf(self) -> bool {
        self.exp() == EXPONENT_MAX && self.sig() == 1 << 63
    }

    pub fn is_nan(self) -> bool {
        self.exp() == EXPONENT_MAX && (self.sig() << 1) != 0
    }

    pub fn is_signaling_nan(self) -> bool {
        self.exp() == EXPONENT_MAX && (self.sig() >> 62) == 0b10 && (self.sig() << 2) != 0
    }

    /// Unsupported encodings: unnormals and the pseudo-NaN/pseudo-infinity
    /// forms with a clear integer bit. Every operation treats these as an
    /// invalid operand.
    pub fn is_unsupported(self) -> bool {
        self.exp() != 0 && !self.j()
    }

    pub fn is_finite(self) -> bool {
        self.exp() != EXPONENT_MAX
    }

    /// Unbiased exponent
    pub fn exp_unbiased(self) -> i32 {
        i32::from(self.exp()) - EXPONENT_BIAS
    }

    /// Absolute value; clears the sign bit and never touches the significand
    pub fn abs(self) -> Self {
        self.with_sign(false)
    }

    /// Change sign; flips the sign bit and never touches the significand
    pub fn chs(self) -> Self {
        self.with_sign(!self.sign())
    }

    /// Converts a signaling NaN into its quiet form
    pub fn quieted(self) -> Self {
        Self(self.0 | (1 << 62))
    }
}

/// Normalizes the significand of a denormal operand, returning the biased
/// exponent (which drops to zero or below) the value actually carries.
pub(crate) fn norm_subnormal(sig: u64) -> (i32, u64) {
    debug_assert_ne!(sig, 0);
    let shift = sig.leading_zeros();
    (1 - shift as i32, sig << shift)
}

/// Shared NaN propagation for two-operand functions: a signaling NaN always
/// raises invalid; when both operands are NaN the first operand's (quieted)
/// payload propagates.
pub(crate) fn propagate_nan(
    a: Float80,
    b: Float80,
    st: &mut crate::status::FpuStatus,
) -> Float80 {
    if a.is_signaling_nan() || b.is_signaling_nan() {
        st.raise_invalid();
    }
    if a.is_nan() { a.quieted() } else { b.quieted() }
}

/// Single-operand variant of [`propagate_nan`]
pub(crate) fn propagate_nan1(a: Float80, st: &mut crate::status::FpuStatus) -> Float80 {
    if a.is_signaling_nan() {
        st.raise_invalid();
    }
    a.quieted()
}
