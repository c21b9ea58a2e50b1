//! sin/cos/tan with exact fixed-point argument reduction modulo π/2.
//!
//! The reduction treats the 128-bit π/2 significand as an integer and
//! computes the operand's significand modulo it at matched scale, so the
//! reduced argument inherits the constant's full precision. Arguments at
//! least 2^63 times π/2 are handled by one bounded partial step per call:
//! the operand is replaced by a partial remainder and
//! [`Completion::PartialReductionNeeded`] tells the caller to re-issue the
//! instruction. Each step removes at least 32 binades, so the retry loop
//! is short even for the largest finite operands.

use log::trace;

use crate::consts::{table, PI_SIG};
use crate::float128::Float128;
use crate::float80::{norm_subnormal, propagate_nan1, Float80, EXPONENT_BIAS, EXPONENT_MAX};
use crate::poly::{even_poly, odd_poly};
use crate::status::{Completion, FpuStatus};

/// Exponent gap (operand vs π/2) at which reduction goes partial
const REDUCTION_THRESHOLD: i32 = 63;

/// Below 2^-68 the series collapse to sin x = x, cos x = 1
const TINY_EXP: i32 = -68;

enum Prepared {
    /// NaN input; carries the propagation result
    Nan(Float80),
    /// Infinity or unsupported encoding; invalid was raised
    Invalid,
    /// Exact ±0 input
    Zero,
    /// |x| < 2^-68; sin x = x and cos x = 1 after rounding
    Tiny,
    /// One partial reduction step was taken; carries the partial remainder
    Partial(Float80),
    /// In range: |x| reduced to t in [0, π/4] with quadrant bits
    Reduced {
        t: Float128,
        quadrant: u8,
        t_neg: bool,
    },
}

/// Classification and argument reduction shared by all four instructions
fn prepare(a: Float80, st: &mut FpuStatus) -> Prepared {
    if a.is_unsupported() {
        st.raise_invalid();
        return Prepared::Invalid;
    }
    let sign = a.sign();
    let mut exp = i32::from(a.exp());
    let mut sig = a.sig();
    if exp == i32::from(EXPONENT_MAX) {
        if (sig << 1) != 0 {
            return Prepared::Nan(propagate_nan1(a, st));
        }
        // trig of ±∞
        st.raise_invalid();
        return Prepared::Invalid;
    }
    if exp == 0 {
        if sig == 0 {
            return Prepared::Zero;
        }
        st.raise_denormal();
        (exp, sig) = norm_subnormal(sig);
    }

    let exp_diff = exp - EXPONENT_BIAS;
    if exp_diff >= REDUCTION_THRESHOLD {
        // peel off between 32 and 63 binades worth of π/2 multiples
        let n = 32 | (exp_diff & 31);
        let (_, r) = pi_half_mod(u128::from(sig) << n);
        trace!("trig partial step: exp_diff {} n {}", exp_diff, n);
        st.raise_inexact();
        let partial = Float128::new(sign, exp_diff - n, r);
        return Prepared::Partial(partial.to_float80(st));
    }
    if exp_diff <= TINY_EXP {
        st.raise_inexact();
        return Prepared::Tiny;
    }
    st.raise_inexact();
    if exp_diff < -1 {
        // |x| < π/4 needs no reduction at all
        return Prepared::Reduced {
            t: Float128::raw(false, exp_diff, u128::from(sig) << 64),
            quadrant: 0,
            t_neg: false,
        };
    }

    // fixed-point reduction: operand significand scaled against PI_SIG
    let (mut q, mut r) = if exp_diff < 0 {
        (0, u128::from(sig) << 63)
    } else {
        pi_half_mod(u128::from(sig) << exp_diff)
    };
    // fold [0, π/2) into [-π/4, π/4]; PI_SIG is odd so there is no tie
    let mut t_neg = false;
    if r > PI_SIG >> 1 {
        q += 1;
        r = PI_SIG - r;
        t_neg = true;
    }
    Prepared::Reduced {
        t: Float128::new(false, 0, r),
        quadrant: (q & 3) as u8,
        t_neg,
    }
}

/// d·2^64 divided by the integer PI_SIG: quotient and remainder.
/// Needs d < 2^127; the estimate from the high halves is off by at most a
/// few units, fixed up below.
fn pi_half_mod(d: u128) -> (u64, u128) {
    debug_assert!(d >> 127 == 0);
    let pi_hi = PI_SIG >> 64;
    let pi_lo = PI_SIG & u128::from(u64::MAX);
    let mut q = d / pi_hi;
    // r = (d − q·pi_hi)·2^64 − q·pi_lo, kept non-negative by construction
    let t = (d - q * pi_hi) << 64;
    let m = q * pi_lo;
    let mut r;
    if t >= m {
        r = t - m;
    } else {
        // estimate was high
        let mut deficit = m - t;
        while deficit > PI_SIG {
            q -= 1;
            deficit -= PI_SIG;
        }
        q -= 1;
        r = PI_SIG - deficit;
    }
    while r >= PI_SIG {
        q += 1;
        r -= PI_SIG;
    }
    (q as u64, r)
}

/// sin|x| and cos|x| from the reduced argument and quadrant
fn sin_cos_reduced(t: Float128, quadrant: u8, t_neg: bool) -> (Float128, Float128) {
    let c = table();
    let s = odd_poly(t, &c.sin);
    let k = even_poly(t, &c.cos);
    let s = if t_neg { s.neg() } else { s };
    match quadrant {
        0 => (s, k),
        1 => (k, s.neg()),
        2 => (s.neg(), k.neg()),
        3 => (k.neg(), s),
        _ => unreachable!(),
    }
}

/// x87 FSIN: replaces the operand with its sine
pub fn fsin(a: &mut Float80, st: &mut FpuStatus) -> Completion {
    match prepare(*a, st) {
        Prepared::Nan(r) => {
            *a = r;
            Completion::Invalid
        }
        Prepared::Invalid => {
            *a = Float80::DEFAULT_NAN;
            Completion::Invalid
        }
        // sin x = x for zero and tiny arguments
        Prepared::Zero | Prepared::Tiny => Completion::Complete,
        Prepared::Partial(r) => {
            *a = r;
            Completion::PartialReductionNeeded
        }
        Prepared::Reduced { t, quadrant, t_neg } => {
            let (s, _) = sin_cos_reduced(t, quadrant, t_neg);
            let s = if a.sign() { s.neg() } else { s };
            *a = s.to_float80(st);
            Completion::Complete
        }
    }
}

/// x87 FCOS: replaces the operand with its cosine
pub fn fcos(a: &mut Float80, st: &mut FpuStatus) -> Completion {
    match prepare(*a, st) {
        Prepared::Nan(r) => {
            *a = r;
            Completion::Invalid
        }
        Prepared::Invalid => {
            *a = Float80::DEFAULT_NAN;
            Completion::Invalid
        }
        Prepared::Zero | Prepared::Tiny => {
            *a = Float80::ONE;
            Completion::Complete
        }
        Prepared::Partial(r) => {
            *a = r;
            Completion::PartialReductionNeeded
        }
        Prepared::Reduced { t, quadrant, t_neg } => {
            // cosine is even; the operand sign drops out
            let (_, k) = sin_cos_reduced(t, quadrant, t_neg);
            *a = k.to_float80(st);
            Completion::Complete
        }
    }
}

/// x87 FSINCOS: operand becomes the sine, `cos_out` receives the cosine.
/// On a partial reduction the operand holds the partial remainder and
/// `cos_out` is left untouched.
pub fn fsincos(a: &mut Float80, cos_out: &mut Float80, st: &mut FpuStatus) -> Completion {
    match prepare(*a, st) {
        Prepared::Nan(r) => {
            *a = r;
            *cos_out = r;
            Completion::Invalid
        }
        Prepared::Invalid => {
            *a = Float80::DEFAULT_NAN;
            *cos_out = Float80::DEFAULT_NAN;
            Completion::Invalid
        }
        Prepared::Zero | Prepared::Tiny => {
            *cos_out = Float80::ONE;
            Completion::Complete
        }
        Prepared::Partial(r) => {
            *a = r;
            Completion::PartialReductionNeeded
        }
        Prepared::Reduced { t, quadrant, t_neg } => {
            let (s, k) = sin_cos_reduced(t, quadrant, t_neg);
            let s = if a.sign() { s.neg() } else { s };
            *a = s.to_float80(st);
            *cos_out = k.to_float80(st);
            Completion::Complete
        }
    }
}

/// x87 FPTAN's quotient: replaces the operand with its tangent
pub fn ftan(a: &mut Float80, st: &mut FpuStatus) -> Completion {
    match prepare(*a, st) {
        Prepared::Nan(r) => {
            *a = r;
            Completion::Invalid
        }
        Prepared::Invalid => {
            *a = Float80::DEFAULT_NAN;
            Completion::Invalid
        }
        // tan x = x for zero and tiny arguments
        Prepared::Zero | Prepared::Tiny => Completion::Complete,
        Prepared::Partial(r) => {
            *a = r;
            Completion::PartialReductionNeeded
        }
        Prepared::Reduced { t, quadrant, t_neg } => {
            let (s, k) = sin_cos_reduced(t, quadrant, t_neg);
            if k.is_zero() {
                // exact odd multiple of π/2 after reduction
                st.raise_zero_divide();
                *a = Float80::inf(s.sign() ^ a.sign());
                return Completion::Complete;
            }
            let r = s.div(k);
            let r = if a.sign() { r.neg() } else { r };
            *a = r.to_float80(st);
            Completion::Complete
        }
    }
}
