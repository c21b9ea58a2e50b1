//! y·log2(x) and y·log2(1 + x), sharing one artanh-based log2 kernel.
//!
//! log2 m for m in [√½, √2) is computed as (2/ln 2)·artanh u with
//! u = (m − 1)/(m + 1); folding the significand at √2 keeps |u| below
//! 0.172 so the series converges fast and k + log2 m never cancels badly.

use crate::consts::{table, SQRT2_SIG_HI};
use crate::float128::Float128;
use crate::float80::{propagate_nan, Float80, EXPONENT_BIAS};
use crate::poly::odd_poly;
use crate::status::FpuStatus;

/// log2 of a positive finite value, exact when the input is a power of two
fn log2_kernel(x: Float128) -> Float128 {
    let c = table();
    let mut k = x.exp();
    let mut m = Float128::raw(false, 0, x.sig());
    if (x.sig() >> 64) as u64 >= SQRT2_SIG_HI {
        m = m.scaled(-1);
        k += 1;
    }
    let u = m.sub(Float128::ONE).div(m.add(Float128::ONE));
    let log2_m = odd_poly(u, &c.artanh).mul(c.log2_scale);
    Float128::from_i32(k).add(log2_m)
}

pub fn fyl2x(x: Float80, y: Float80, st: &mut FpuStatus) -> Float80 {
    if x.is_unsupported() || y.is_unsupported() {
        st.raise_invalid();
        return Float80::DEFAULT_NAN;
    }
    if x.is_nan() || y.is_nan() {
        return propagate_nan(x, y, st);
    }
    if x.is_denormal() || y.is_denormal() {
        st.raise_denormal();
    }
    if x.sign() && !x.is_zero() {
        // logarithm of a negative value (including −∞)
        st.raise_invalid();
        return Float80::DEFAULT_NAN;
    }
    if x.is_zero() {
        // log2(0) is a pole and an invalid y·log2 product at once
        st.raise_zero_divide();
        st.raise_invalid();
        return Float80::DEFAULT_NAN;
    }
    if x.is_inf() {
        if y.is_zero() {
            st.raise_invalid();
            return Float80::DEFAULT_NAN;
        }
        return Float80::inf(y.sign());
    }
    if y.is_inf() {
        if x == Float80::ONE {
            // ±∞ · 0
            st.raise_invalid();
            return Float80::DEFAULT_NAN;
        }
        let log_negative = i32::from(x.exp()) < EXPONENT_BIAS;
        return Float80::inf(y.sign() ^ log_negative);
    }
    if x == Float80::ONE {
        // y · (+0), exact
        return Float80::zero(y.sign());
    }
    if y.is_zero() {
        let log_negative = i32::from(x.exp()) < EXPONENT_BIAS;
        return Float80::zero(y.sign() ^ log_negative);
    }

    let log2_x = log2_kernel(Float128::from_float80(x));
    log2_x.mul(Float128::from_float80(y)).to_float80(st)
}

pub fn fyl2xp1(x: Float80, y: Float80, st: &mut FpuStatus) -> Float80 {
    if x.is_unsupported() || y.is_unsupported() {
        st.raise_invalid();
        return Float80::DEFAULT_NAN;
    }
    if x.is_nan() || y.is_nan() {
        return propagate_nan(x, y, st);
    }
    if x.is_denormal() || y.is_denormal() {
        st.raise_denormal();
    }
    if x.is_inf() {
        if x.sign() {
            // log2 of a negative value
            st.raise_invalid();
            return Float80::DEFAULT_NAN;
        }
        if y.is_zero() {
            st.raise_invalid();
            return Float80::DEFAULT_NAN;
        }
        return Float80::inf(y.sign());
    }
    if y.is_inf() {
        if x.is_zero() {
            // log2(1 + 0) = 0, and 0 · ±∞ is invalid
            st.raise_invalid();
            return Float80::DEFAULT_NAN;
        }
        // log2(1 + x) carries the sign of x
        return Float80::inf(y.sign() ^ x.sign());
    }
    if x.is_zero() || y.is_zero() {
        // exact zero; the product rule fixes the sign
        return Float80::zero(x.sign() ^ y.sign());
    }
    if x.sign() {
        if x == Float80::NEG_ONE {
            // log2(0): a true pole this time
            st.raise_zero_divide();
            return Float80::inf(!y.sign());
        }
        if i32::from(x.exp()) >= EXPONENT_BIAS {
            // x < −1: 1 + x is negative
            st.raise_invalid();
            return Float80::DEFAULT_NAN;
        }
    }

    let fx = Float128::from_float80(x);
    let log2_1px = if i32::from(x.exp()) < EXPONENT_BIAS - 1 {
        // |x| < ½: artanh form on u = x/(2 + x) avoids forming 1 + x
        let c = table();
        let u = fx.div(fx.add(Float128::from_u32(2)));
        odd_poly(u, &c.artanh).mul(c.log2_scale)
    } else {
        // 1 + x is safely away from 1; fall back to the full kernel
        log2_kernel(fx.add(Float128::ONE))
    };
    log2_1px.mul(Float128::from_float80(y)).to_float80(st)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f80(v: f64) -> Float80 {
        let mut st = FpuStatus::new();
        Float128::from_f64(v).to_float80(&mut st)
    }

    #[test]
    fn exact_powers_of_two() {
        // log2(8)·y and log2(¼)·y are exact; no flags at all
        let mut st = FpuStatus::new();
        assert_eq!(fyl2x(f80(8.0), f80(5.0), &mut st), f80(15.0));
        assert_eq!(fyl2x(f80(0.25), f80(3.0), &mut st), f80(-6.0));
        assert_eq!(fyl2x(f80(2.0), f80(-1.5), &mut st), f80(-1.5));
        assert!(!st.flags.any());
    }

    #[test]
    fn log2_of_one() {
        // y·log2(1) is an exact zero with the sign of y
        let mut st = FpuStatus::new();
        let r = fyl2x(Float80::ONE, f80(7.5), &mut st);
        assert!(r.is_zero() && !r.sign());
        let r = fyl2x(Float80::ONE, f80(-7.5), &mut st);
        assert!(r.is_zero() && r.sign());
        assert!(!st.flags.any());
    }

    #[test]
    fn generic_value() {
        // 3·log2(10) = 9.96578428466...
        let mut st = FpuStatus::new();
        let r = fyl2x(f80(10.0), f80(3.0), &mut st);
        assert!(st.flags.inexact());
        assert_eq!(r.exp_unbiased(), 3);
        // 9.96578428466... = 0x9.F73DA... · 2^0
        assert_eq!(r.sig() >> 40, 0x9F_73DA);
    }

    #[test]
    fn x_zero_is_pole_and_invalid() {
        let mut st = FpuStatus::new();
        let r = fyl2x(Float80::ZERO, f80(2.0), &mut st);
        assert_eq!(r, Float80::DEFAULT_NAN);
        assert!(st.flags.zero_divide());
        assert!(st.flags.invalid());
    }

    #[test]
    fn negative_x_invalid() {
        let mut st = FpuStatus::new();
        assert_eq!(fyl2x(f80(-2.0), f80(1.0), &mut st), Float80::DEFAULT_NAN);
        assert!(st.flags.invalid());
        let mut st = FpuStatus::new();
        assert_eq!(
            fyl2x(Float80::NEG_INFINITY, f80(1.0), &mut st),
            Float80::DEFAULT_NAN
        );
        assert!(st.flags.invalid());
    }

    #[test]
    fn nan_beats_domain_checks() {
        // a quiet NaN in y propagates before the negative-x ladder runs
        let mut st = FpuStatus::new();
        let r = fyl2x(f80(-2.0), Float80::DEFAULT_NAN, &mut st);
        assert!(r.is_nan());
        assert!(!st.flags.invalid());
        let r = fyl2xp1(f80(-1.5), Float80::DEFAULT_NAN, &mut st);
        assert!(r.is_nan());
        assert!(!st.flags.invalid());
    }

    #[test]
    fn infinity_rules() {
        let mut st = FpuStatus::new();
        assert_eq!(fyl2x(Float80::INFINITY, f80(2.0), &mut st), Float80::INFINITY);
        assert_eq!(
            fyl2x(Float80::INFINITY, f80(-2.0), &mut st),
            Float80::NEG_INFINITY
        );
        assert!(!st.flags.any());
        // ∞·0
        assert_eq!(
            fyl2x(Float80::INFINITY, Float80::ZERO, &mut st),
            Float80::DEFAULT_NAN
        );
        assert!(st.flags.invalid());

        // y = ∞ with log2(x) of either sign
        let mut st = FpuStatus::new();
        assert_eq!(fyl2x(f80(4.0), Float80::INFINITY, &mut st), Float80::INFINITY);
        assert_eq!(
            fyl2x(f80(0.5), Float80::INFINITY, &mut st),
            Float80::NEG_INFINITY
        );
        assert_eq!(
            fyl2x(Float80::ONE, Float80::INFINITY, &mut st),
            Float80::DEFAULT_NAN
        );
        assert!(st.flags.invalid());
    }

    #[test]
    fn p1_small_arguments() {
        // log2(1 + 1) = 1 through the kernel path
        let mut st = FpuStatus::new();
        assert_eq!(fyl2xp1(Float80::ONE, f80(3.0), &mut st), f80(3.0));

        // tiny x: log2(1+x) ≈ x/ln2, well below the direct-series split
        let x = Float80::pack(false, (EXPONENT_BIAS - 40) as u16, 1 << 63);
        let mut st = FpuStatus::new();
        let r = fyl2xp1(x, Float80::ONE, &mut st);
        assert!(st.flags.inexact());
        assert_eq!(r.exp_unbiased(), -40);
        // leading bits of 1/ln2 = 1.4426950408889634...
        assert_eq!(r.sig() >> 32, 0xB8AA_3B29);
    }

    #[test]
    fn p1_zero_and_sign() {
        let mut st = FpuStatus::new();
        let r = fyl2xp1(Float80::ZERO, f80(5.0), &mut st);
        assert!(r.is_zero() && !r.sign());
        let r = fyl2xp1(Float80::ZERO.chs(), f80(5.0), &mut st);
        assert!(r.is_zero() && r.sign());
        let r = fyl2xp1(Float80::ZERO, f80(-5.0), &mut st);
        assert!(r.is_zero() && r.sign());
        assert!(!st.flags.any());
    }

    #[test]
    fn p1_domain_edges() {
        // x = −1: pole, signed infinity
        let mut st = FpuStatus::new();
        let r = fyl2xp1(Float80::NEG_ONE, f80(2.0), &mut st);
        assert_eq!(r, Float80::NEG_INFINITY);
        assert!(st.flags.zero_divide());
        assert!(!st.flags.invalid());

        // x < −1: invalid
        let mut st = FpuStatus::new();
        assert_eq!(fyl2xp1(f80(-1.5), f80(2.0), &mut st), Float80::DEFAULT_NAN);
        assert!(st.flags.invalid());

        // x in (−1, −½): kernel fallback path
        let mut st = FpuStatus::new();
        let r = fyl2xp1(f80(-0.75), Float80::ONE, &mut st);
        // log2(0.25) = −2 exactly
        assert_eq!(r, f80(-2.0));
    }
}
