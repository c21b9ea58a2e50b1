//! Internal extended-range float with a 128-bit significand.
//!
//! Every transcendental kernel evaluates in this format and rounds exactly
//! once when packing back to [`Float80`]. Arithmetic here truncates (with a
//! sticky bit jammed into the lsb), which keeps each operation within one
//! unit of the 128-bit significand; the series carry well over 100
//! significant bits into the final rounding.

use std::cmp::Ordering;

use crate::float80::{norm_subnormal, Float80, EXPONENT_BIAS, EXPONENT_MAX};
use crate::status::{FpuStatus, RoundingMode};

/// Value is `sig * 2^(exp - 127)` with `sig` normalized to bit 127, or zero
/// when `sig == 0`. Infinities and NaNs never enter this format; the
/// special-case ladders handle them on the [`Float80`] side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Float128 {
    sign: bool,
    exp: i32,
    sig: u128,
}

impl Float128 {
    pub const ZERO: Self = Self {
        sign: false,
        exp: 0,
        sig: 0,
    };
    pub const ONE: Self = Self {
        sign: false,
        exp: 0,
        sig: 1 << 127,
    };

    /// Constructs from parts that are already normalized (bit 127 set)
    pub const fn raw(sign: bool, exp: i32, sig: u128) -> Self {
        Self { sign, exp, sig }
    }

    /// Constructs from an arbitrary (possibly unnormalized) significand
    pub fn new(sign: bool, exp: i32, sig: u128) -> Self {
        if sig == 0 {
            return Self::zero(sign);
        }
        let shift = sig.leading_zeros() as i32;
        Self {
            sign,
            exp: exp - shift,
            sig: sig << shift,
        }
    }

    pub const fn zero(sign: bool) -> Self {
        Self {
            sign,
            exp: 0,
            sig: 0,
        }
    }

    pub fn from_u32(v: u32) -> Self {
        Self::new(false, 31, u128::from(v) << 96)
    }

    pub fn from_i32(v: i32) -> Self {
        Self::new(v < 0, 31, u128::from(v.unsigned_abs()) << 96)
    }

    /// Seeds from a finite, normal f64 (used for Newton iteration starts)
    pub fn from_f64(v: f64) -> Self {
        let bits = v.to_bits();
        let exp = ((bits >> 52) & 0x7FF) as i32 - 1023;
        debug_assert!((-1022..=1023).contains(&exp), "normal f64 expected");
        let sig = (bits & ((1 << 52) - 1)) | (1 << 52);
        Self::raw(bits >> 63 != 0, exp, u128::from(sig) << 75)
    }

    /// Converts a finite Float80 operand; denormals and pseudo-denormals are
    /// normalized losslessly.
    pub fn from_float80(f: Float80) -> Self {
        let sign = f.sign();
        let mut exp = i32::from(f.exp());
        let mut sig = f.sig();
        if exp == 0 {
            if sig == 0 {
                return Self::zero(sign);
            }
            (exp, sig) = norm_subnormal(sig);
        }
        Self::raw(sign, exp - EXPONENT_BIAS, u128::from(sig) << 64)
    }

    pub const fn is_zero(self) -> bool {
        self.sig == 0
    }

    pub const fn sign(self) -> bool {
        self.sign
    }

    pub const fn exp(self) -> i32 {
        self.exp
    }

    pub const fn sig(self) -> u128 {
        self.sig
    }

    pub const fn neg(self) -> Self {
        Self {
            sign: !self.sign,
            ..self
        }
    }

    /// Exact scaling by a power of two
    pub const fn scaled(self, delta: i32) -> Self {
        if self.sig == 0 {
            self
        } else {
            Self {
                exp: self.exp + delta,
                ..self
            }
        }
    }

    pub fn gt_abs(self, rhs: Self) -> bool {
        cmp_abs(self, rhs) == Ordering::Greater
    }

    pub fn add(self, rhs: Self) -> Self {
        if self.sig == 0 {
            return rhs;
        }
        if rhs.sig == 0 {
            return self;
        }
        if self.sign == rhs.sign {
            return mag_add(self, rhs, self.sign);
        }
        match cmp_abs(self, rhs) {
            Ordering::Greater => mag_sub(self, rhs, self.sign),
            Ordering::Less => mag_sub(rhs, self, rhs.sign),
            Ordering::Equal => Self::ZERO,
        }
    }

    pub fn sub(self, rhs: Self) -> Self {
        self.add(rhs.neg())
    }

    pub fn mul(self, rhs: Self) -> Self {
        if self.sig == 0 || rhs.sig == 0 {
            return Self::zero(self.sign ^ rhs.sign);
        }
        let (ah, al) = (self.sig >> 64, self.sig & u128::from(u64::MAX));
        let (bh, bl) = (rhs.sig >> 64, rhs.sig & u128::from(u64::MAX));

        // 256-bit product from four 64x64 partials
        let ll = al * bl;
        let (mid, mid_carry) = (ah * bl).overflowing_add(al * bh);
        let (lo, lo_carry) = ll.overflowing_add(mid << 64);
        let mut hi = ah * bh + (mid >> 64) + (u128::from(mid_carry) << 64) + u128::from(lo_carry);

        let mut exp = self.exp + rhs.exp + 1;
        let sticky;
        if hi >> 127 == 0 {
            hi = (hi << 1) | (lo >> 127);
            exp -= 1;
            sticky = (lo << 1) != 0;
        } else {
            sticky = lo != 0;
        }
        Self {
            sign: self.sign ^ rhs.sign,
            exp,
            sig: hi | u128::from(sticky),
        }
    }

    pub fn div(self, rhs: Self) -> Self {
        debug_assert_ne!(rhs.sig, 0);
        if self.sig == 0 {
            return Self::zero(self.sign ^ rhs.sign);
        }
        let mut exp = self.exp - rhs.exp;
        // when the dividend significand is smaller the quotient needs a full
        // 128 bits to come out normalized
        let (mut r, mut q, steps) = if self.sig >= rhs.sig {
            (self.sig - rhs.sig, 1u128, 127)
        } else {
            exp -= 1;
            (self.sig, 0u128, 128)
        };
        // restoring long division, one quotient bit per step
        for _ in 0..steps {
            let carry = r >> 127 != 0;
            r = r.wrapping_shl(1);
            if carry || r >= rhs.sig {
                r = r.wrapping_sub(rhs.sig);
                q = (q << 1) | 1;
            } else {
                q <<= 1;
            }
        }
        Self {
            sign: self.sign ^ rhs.sign,
            exp,
            sig: q | u128::from(r != 0),
        }
    }

    /// Rounds to Float80 under the context's rounding mode, raising
    /// overflow/underflow/inexact as side effects. Tininess is detected
    /// before rounding; exact results never raise a flag.
    pub fn to_float80(self, st: &mut FpuStatus) -> Float80 {
        if self.sig == 0 {
            return Float80::zero(self.sign);
        }
        let mut exp = self.exp + EXPONENT_BIAS;
        let mut sig = self.sig;
        let tiny = exp <= 0;
        if tiny {
            sig = shr_sticky(sig, (1 - exp) as u32);
            exp = 0;
        }
        let mut hi = (sig >> 64) as u64;
        let rem = sig as u64;
        let inexact = rem != 0;
        let round_up = match st.rounding {
            RoundingMode::NearestEven => {
                rem > 1 << 63 || (rem == 1 << 63 && hi & 1 != 0)
            }
            RoundingMode::Zero => false,
            RoundingMode::Down => self.sign && inexact,
            RoundingMode::Up => !self.sign && inexact,
        };
        if round_up {
            hi = hi.wrapping_add(1);
            if hi == 0 {
                hi = 1 << 63;
                exp += 1;
            }
        }
        // rounding a subnormal up into the smallest normal binade
        if exp == 0 && hi >> 63 != 0 {
            exp = 1;
        }
        if exp >= i32::from(EXPONENT_MAX) {
            st.raise_overflow();
            st.raise_inexact();
            return overflow_result(self.sign, st.rounding);
        }
        if inexact {
            st.raise_inexact();
            if tiny {
                st.raise_underflow();
            }
        }
        Float80::pack(self.sign, exp as u16, hi)
    }

    #[cfg(test)]
    pub fn to_f64(self) -> f64 {
        if self.sig == 0 {
            return 0.0;
        }
        let hi = (self.sig >> 64) as u64;
        let v = hi as f64 * 2.0f64.powi(self.exp - 63);
        if self.sign { -v } else { v }
    }
}

fn cmp_abs(a: Float128, b: Float128) -> Ordering {
    (a.exp, a.sig).cmp(&(b.exp, b.sig))
}

/// Right shift that ors shifted-out bits into the lsb
fn shr_sticky(v: u128, shift: u32) -> u128 {
    if shift == 0 {
        v
    } else if shift < 128 {
        (v >> shift) | u128::from(v << (128 - shift) != 0)
    } else {
        u128::from(v != 0)
    }
}

fn mag_add(a: Float128, b: Float128, sign: bool) -> Float128 {
    let (a, b) = if a.exp >= b.exp { (a, b) } else { (b, a) };
    let bs = shr_sticky(b.sig, (a.exp - b.exp) as u32);
    let (sum, carry) = a.sig.overflowing_add(bs);
    if carry {
        Float128 {
            sign,
            exp: a.exp + 1,
            sig: (1 << 127) | (sum >> 1) | (sum & 1),
        }
    } else {
        Float128 {
            sign,
            exp: a.exp,
            sig: sum,
        }
    }
}

/// Requires |a| > |b|
fn mag_sub(a: Float128, b: Float128, sign: bool) -> Float128 {
    let bs = shr_sticky(b.sig, (a.exp - b.exp) as u32);
    Float128::new(sign, a.exp, a.sig - bs)
}

fn overflow_result(sign: bool, rm: RoundingMode) -> Float80 {
    match rm {
        RoundingMode::NearestEven => Float80::inf(sign),
        RoundingMode::Zero => Float80::max_finite(sign),
        RoundingMode::Down => {
            if sign {
                Float80::NEG_INFINITY
            } else {
                Float80::max_finite(false)
            }
        }
        RoundingMode::Up => {
            if sign {
                Float80::max_finite(true)
            } else {
                Float80::INFINITY
            }
        }
    }
}
