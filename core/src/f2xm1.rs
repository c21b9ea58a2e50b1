//! 2^x − 1, evaluated as expm1(x·ln 2) with a 128-bit e^w − 1 series.
//!
//! The operand range of the hardware instruction is [−1, 1], but the
//! series converges for any |w| that survives the range check, so inputs
//! outside the architectural range simply produce the mathematically
//! correct (if unspecified-on-hardware) value.

use crate::consts::table;
use crate::float128::Float128;
use crate::float80::{norm_subnormal, propagate_nan1, Float80, EXPONENT_BIAS, EXPONENT_MAX};
use crate::poly::poly_eval;
use crate::status::FpuStatus;

/// Exponent below which 2^x − 1 collapses to x·ln 2 at extended precision
const TINY_EXP: i32 = -68;

pub fn f2xm1(a: Float80, st: &mut FpuStatus) -> Float80 {
    if a.is_unsupported() {
        st.raise_invalid();
        return Float80::DEFAULT_NAN;
    }
    let mut exp = i32::from(a.exp());
    let mut sig = a.sig();
    if exp == i32::from(EXPONENT_MAX) {
        if (sig << 1) != 0 {
            return propagate_nan1(a, st);
        }
        // 2^+∞ − 1 = +∞, 2^−∞ − 1 = −1
        return if a.sign() { Float80::NEG_ONE } else { a };
    }
    if exp == 0 {
        if sig == 0 {
            // 2^±0 − 1 is an exact, correctly signed zero
            return a;
        }
        st.raise_denormal();
        (exp, sig) = norm_subnormal(sig);
    }

    let c = table();
    let x = Float128::raw(a.sign(), exp - EXPONENT_BIAS, u128::from(sig) << 64);
    st.raise_inexact();
    if exp - EXPONENT_BIAS < TINY_EXP {
        return x.mul(c.ln2).to_float80(st);
    }
    let w = x.mul(c.ln2);
    w.mul(poly_eval(w, &c.expm1)).to_float80(st)
}
