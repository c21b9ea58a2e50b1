//! Partial remainder: the truncating legacy form and the IEEE 754
//! round-to-nearest form, sharing one exact significand-division core.
//!
//! The remainder itself is always exact, so the only flags these can raise
//! are invalid (bad operands) and denormal. When the exponent gap is too
//! wide for a single exact division the operand is reduced by a bounded
//! partial step and [`Completion::PartialReductionNeeded`] is returned;
//! each step closes the gap by at least 32 binades, so the caller's retry
//! loop terminates quickly.

use log::trace;

use crate::float128::Float128;
use crate::float80::{norm_subnormal, propagate_nan, Float80, EXPONENT_BIAS};
use crate::status::{Completion, FpuStatus};

/// Exponent gap above which a single exact division step cannot finish
const REDUCTION_THRESHOLD: i32 = 64;

#[derive(Clone, Copy, PartialEq, Eq)]
enum QuotientRounding {
    /// Truncated quotient, remainder in [0, |b|) (x87 FPREM)
    Truncate,
    /// Nearest-even quotient, remainder in [−|b|/2, |b|/2] (FPREM1)
    NearestEven,
}

/// x87 FPREM: `a` becomes the partial remainder of a / b with a truncated
/// quotient; the low quotient bits land in `quotient`.
pub fn fprem(
    a: &mut Float80,
    b: Float80,
    quotient: &mut u64,
    st: &mut FpuStatus,
) -> Completion {
    do_fprem(a, b, quotient, QuotientRounding::Truncate, st)
}

/// IEEE 754 remainder (x87 FPREM1): like [`fprem`] with the quotient
/// rounded to nearest-even, so the remainder magnitude never exceeds |b|/2.
pub fn fprem1(
    a: &mut Float80,
    b: Float80,
    quotient: &mut u64,
    st: &mut FpuStatus,
) -> Completion {
    do_fprem(a, b, quotient, QuotientRounding::NearestEven, st)
}

fn do_fprem(
    a: &mut Float80,
    b: Float80,
    quotient: &mut u64,
    rounding: QuotientRounding,
    st: &mut FpuStatus,
) -> Completion {
    *quotient = 0;
    let a_in = *a;
    if a_in.is_unsupported() || b.is_unsupported() {
        st.raise_invalid();
        *a = Float80::DEFAULT_NAN;
        return Completion::Invalid;
    }
    if a_in.is_nan() || b.is_nan() {
        *a = propagate_nan(a_in, b, st);
        return Completion::Invalid;
    }
    if a_in.is_inf() || b.is_zero() {
        st.raise_invalid();
        *a = Float80::DEFAULT_NAN;
        return Completion::Invalid;
    }
    if b.is_inf() {
        // remainder of a finite value by infinity is the value itself
        if a_in.is_denormal() {
            st.raise_denormal();
        }
        return Completion::Complete;
    }
    if a_in.is_zero() {
        return Completion::Complete;
    }

    let sign = a_in.sign();
    let (mut a_exp, mut a_sig) = (i32::from(a_in.exp()), a_in.sig());
    let (mut b_exp, mut b_sig) = (i32::from(b.exp()), b.sig());
    if a_in.is_denormal() {
        st.raise_denormal();
        (a_exp, a_sig) = norm_subnormal(a_sig);
    }
    if b.is_denormal() {
        st.raise_denormal();
        (b_exp, b_sig) = norm_subnormal(b_sig);
    }
    let exp_diff = a_exp - b_exp;

    if exp_diff >= REDUCTION_THRESHOLD {
        // Too far apart for one exact division; peel off between 32 and 63
        // binades and hand the partial remainder back.
        let n = 32 | (exp_diff & 31);
        let dividend = u128::from(a_sig) << n;
        let divisor = u128::from(b_sig);
        let q = dividend / divisor;
        let r = dividend % divisor;
        trace!("fprem partial step: exp_diff {} n {}", exp_diff, n);
        *quotient = q as u64;
        let packed = Float128::new(sign, a_exp - EXPONENT_BIAS - n + 64, r);
        *a = packed.to_float80(st);
        return Completion::PartialReductionNeeded;
    }
    if exp_diff < -1 {
        // |a| < |b|/2: a is already the remainder
        return Completion::Complete;
    }

    // One exact division of the significands covers quotients up to 2^64.
    let shift = (exp_diff + 1) as u32;
    let dividend = u128::from(a_sig) << shift;
    let divisor = u128::from(b_sig) << 1;
    let mut q = dividend / divisor;
    let mut r = dividend % divisor;
    let mut r_sign = sign;
    if rounding == QuotientRounding::NearestEven {
        let twice = r << 1;
        if twice > divisor || (twice == divisor && q & 1 != 0) {
            q += 1;
            r = divisor - r;
            r_sign = !sign;
        }
    }
    *quotient = q as u64;
    let packed = Float128::new(r_sign, b_exp - EXPONENT_BIAS + 63, r);
    *a = packed.to_float80(st);
    Completion::Complete
}
