//! Two-argument arctangent with full quadrant and special-value handling.
//!
//! The kernel works on t = |y/x| folded into [0, 1] via the reciprocal
//! identity, then into [−tan(π/12), tan(π/12)] via the π/6 rotation
//! u = (√3·t − 1)/(t + √3), where the alternating odd series converges
//! comfortably at 128-bit precision.

use crate::consts::table;
use crate::float128::Float128;
use crate::float80::{propagate_nan, Float80};
use crate::poly::odd_poly;
use crate::status::FpuStatus;

/// atan t for t in [0, 1]
fn atan_kernel(t: Float128) -> Float128 {
    let c = table();
    if t.gt_abs(c.atan_split) {
        let u = c
            .sqrt3
            .mul(t)
            .sub(Float128::ONE)
            .div(t.add(c.sqrt3));
        c.pi_sixth.add(odd_poly(u, &c.atan))
    } else {
        odd_poly(t, &c.atan)
    }
}

pub fn fpatan(y: Float80, x: Float80, st: &mut FpuStatus) -> Float80 {
    if y.is_unsupported() || x.is_unsupported() {
        st.raise_invalid();
        return Float80::DEFAULT_NAN;
    }
    if y.is_nan() || x.is_nan() {
        return propagate_nan(y, x, st);
    }
    if y.is_denormal() || x.is_denormal() {
        st.raise_denormal();
    }
    let c = table();
    if y.is_inf() {
        let angle = if x.is_inf() {
            // ±π/4 or ±3π/4
            if x.sign() {
                c.pi.sub(c.pi_quarter)
            } else {
                c.pi_quarter
            }
        } else {
            c.pi_half
        };
        let signed = if y.sign() { angle.neg() } else { angle };
        return signed.to_float80(st);
    }
    if x.is_inf() {
        // y finite
        if x.sign() {
            let signed = if y.sign() { c.pi.neg() } else { c.pi };
            return signed.to_float80(st);
        }
        return Float80::zero(y.sign());
    }
    if y.is_zero() {
        if x.is_zero() {
            st.raise_invalid();
            return Float80::DEFAULT_NAN;
        }
        if x.sign() {
            let signed = if y.sign() { c.pi.neg() } else { c.pi };
            return signed.to_float80(st);
        }
        // angle zero, exact
        return Float80::zero(y.sign());
    }
    if x.is_zero() {
        let signed = if y.sign() { c.pi_half.neg() } else { c.pi_half };
        return signed.to_float80(st);
    }

    let ty = Float128::from_float80(y.abs());
    let tx = Float128::from_float80(x.abs());
    let t = ty.div(tx);
    let mut phi = if t.gt_abs(Float128::ONE) {
        c.pi_half.sub(atan_kernel(Float128::ONE.div(t)))
    } else {
        atan_kernel(t)
    };
    if x.sign() {
        phi = c.pi.sub(phi);
    }
    st.raise_inexact();
    let signed = if y.sign() { phi.neg() } else { phi };
    signed.to_float80(st)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PI_2_F80: Float80 = Float80(0x3FFF_C90F_DAA2_2168_C235);
    const PI_F80: Float80 = Float80(0x4000_C90F_DAA2_2168_C235);

    fn f80(v: f64) -> Float80 {
        let mut st = FpuStatus::new();
        Float128::from_f64(v).to_float80(&mut st)
    }

    #[test]
    fn quarter_axis_angles() {
        // atan2(1, 0) is π/2 to extended precision, bit-exact
        let mut st = FpuStatus::new();
        assert_eq!(fpatan(Float80::ONE, Float80::ZERO, &mut st), PI_2_F80);
        assert!(st.flags.inexact());
        assert_eq!(
            fpatan(Float80::NEG_ONE, Float80::ZERO, &mut st),
            PI_2_F80.chs()
        );
        // y = 0, x < 0: ±π with the sign of y
        assert_eq!(fpatan(Float80::ZERO, f80(-3.0), &mut st), PI_F80);
        assert_eq!(fpatan(Float80::ZERO.chs(), f80(-3.0), &mut st), PI_F80.chs());
    }

    #[test]
    fn exact_zero_angles() {
        let mut st = FpuStatus::new();
        let r = fpatan(Float80::ZERO, f80(2.0), &mut st);
        assert!(r.is_zero() && !r.sign());
        let r = fpatan(Float80::ZERO.chs(), f80(2.0), &mut st);
        assert!(r.is_zero() && r.sign());
        // finite y over +∞ is an exact signed zero too
        let r = fpatan(f80(-5.0), Float80::INFINITY, &mut st);
        assert!(r.is_zero() && r.sign());
        assert!(!st.flags.any());
    }

    #[test]
    fn origin_is_invalid() {
        let mut st = FpuStatus::new();
        assert_eq!(
            fpatan(Float80::ZERO, Float80::ZERO, &mut st),
            Float80::DEFAULT_NAN
        );
        assert!(st.flags.invalid());
    }

    #[test]
    fn infinite_operands() {
        let mut st = FpuStatus::new();
        // both infinite: ±π/4, ±3π/4
        let q = fpatan(Float80::INFINITY, Float80::INFINITY, &mut st);
        assert_eq!(q.exp_unbiased(), -1);
        assert_eq!(q.sig(), PI_2_F80.sig());
        let q3 = fpatan(Float80::INFINITY, Float80::NEG_INFINITY, &mut st);
        assert_eq!(q3.exp_unbiased(), 1);
        let q3n = fpatan(Float80::NEG_INFINITY, Float80::NEG_INFINITY, &mut st);
        assert!(q3n.sign());
        // y infinite, x finite: ±π/2
        assert_eq!(fpatan(Float80::INFINITY, f80(123.0), &mut st), PI_2_F80);
        assert_eq!(fpatan(Float80::NEG_INFINITY, f80(-123.0), &mut st), PI_2_F80.chs());
        // x = −∞, y finite: ±π
        assert_eq!(fpatan(f80(1.0), Float80::NEG_INFINITY, &mut st), PI_F80);
    }

    #[test]
    fn diagonal() {
        // atan2(1, 1) = π/4
        let mut st = FpuStatus::new();
        let r = fpatan(Float80::ONE, Float80::ONE, &mut st);
        assert_eq!(r.exp_unbiased(), -1);
        assert_eq!(r.sig(), PI_2_F80.sig());
        assert!(st.flags.inexact());
    }

    #[test]
    fn generic_slope() {
        // atan(1/2) = 0.46364760900080611621...
        let mut st = FpuStatus::new();
        let r = fpatan(Float80::ONE, f80(2.0), &mut st);
        assert_eq!(r.exp_unbiased(), -2);
        assert_eq!(r.sig() >> 48, 0xED63);

        // atan(2) = π/2 − atan(1/2), through the reciprocal fold
        let r = fpatan(f80(2.0), Float80::ONE, &mut st);
        assert_eq!(r.exp_unbiased(), 0);
        // 1.1071487177940905... = 0x8DB7_0D6B... · 2^-63
        assert_eq!(r.sig() >> 48, 0x8DB7);
    }

    #[test]
    fn quadrants() {
        let mut st = FpuStatus::new();
        // second quadrant: atan2(1, −1) = 3π/4 = 0x96CB_E3F9... · 2^-62
        let r = fpatan(Float80::ONE, Float80::NEG_ONE, &mut st);
        assert!(!r.sign());
        assert_eq!(r.exp_unbiased(), 1);
        assert_eq!(r.sig() >> 48, 0x96CB);
        // third quadrant: atan2(−1, −1) = −3π/4
        let r = fpatan(Float80::NEG_ONE, Float80::NEG_ONE, &mut st);
        assert!(r.sign());
        assert_eq!(r.exp_unbiased(), 1);
    }

    #[test]
    fn nan_and_unsupported() {
        let mut st = FpuStatus::new();
        let qnan = Float80::DEFAULT_NAN;
        assert_eq!(fpatan(qnan, Float80::ONE, &mut st), qnan);
        assert!(!st.flags.invalid());
        let unnormal = Float80::pack(false, 0x2000, 1);
        assert_eq!(fpatan(Float80::ONE, unnormal, &mut st), Float80::DEFAULT_NAN);
        assert!(st.flags.invalid());
    }

    #[test]
    fn denormal_y() {
        // atan2(denormal, 1) ≈ y, flagged denormal
        let y = Float80::pack(false, 0, 1 << 30);
        let mut st = FpuStatus::new();
        let r = fpatan(y, Float80::ONE, &mut st);
        assert!(st.flags.denormal());
        assert!(st.flags.inexact());
        assert_eq!(r.exp(), 0, "result stays subnormal");
        assert!(st.flags.underflow());
    }
}
