//! Process-wide constant table: split 128-bit π, ln 2 and the polynomial
//! coefficient sets. Only the two transcendental significands are written
//! out by hand; everything else derives from them (or from small integers)
//! at first use.

use std::sync::OnceLock;

use crate::float128::Float128;

/// 128-bit significand of π/2; π and π/4 are exact scalings of it
pub const PI_SIG: u128 = 0xC90F_DAA2_2168_C234_C4C6_628B_80DC_1CD1;

/// 128-bit significand of ln 2
pub const LN2_SIG: u128 = 0xB172_17F7_D1CF_79AB_C9E3_B398_03F2_F6AF;

/// High 64 bits of the √2 significand; the fyl2x kernel folds operand
/// significands at this threshold so that m stays in [√½, √2)
pub const SQRT2_SIG_HI: u64 = 0xB504_F333_F9DE_6484;

pub const SIN_TERMS: usize = 16;
pub const COS_TERMS: usize = 16;
pub const ATAN_TERMS: usize = 30;
pub const LOG_TERMS: usize = 24;
pub const EXP_TERMS: usize = 30;

pub struct Constants {
    pub pi: Float128,
    pub pi_half: Float128,
    pub pi_quarter: Float128,
    pub pi_sixth: Float128,
    pub ln2: Float128,
    /// 2/ln 2, converts the artanh series sum into a base-2 logarithm
    pub log2_scale: Float128,
    pub sqrt3: Float128,
    /// tan(π/12) = 2 − √3, the atan range-split threshold
    pub atan_split: Float128,
    /// sin t = t·Σ sin[k]·t^2k, sin[k] = (−1)^k/(2k+1)!
    pub sin: [Float128; SIN_TERMS],
    /// cos t = Σ cos[k]·t^2k, cos[k] = (−1)^k/(2k)!
    pub cos: [Float128; COS_TERMS],
    /// atan t = t·Σ atan[j]·t^2j, atan[j] = (−1)^j/(2j+1), |t| ≤ tan(π/12)
    pub atan: [Float128; ATAN_TERMS],
    /// artanh u = u·Σ artanh[j]·u^2j, artanh[j] = 1/(2j+1)
    pub artanh: [Float128; LOG_TERMS],
    /// e^w − 1 = w·Σ expm1[k]·w^k, expm1[k] = 1/(k+1)!
    pub expm1: [Float128; EXP_TERMS],
}

pub fn table() -> &'static Constants {
    static TABLE: OnceLock<Constants> = OnceLock::new();
    TABLE.get_or_init(Constants::build)
}

impl Constants {
    fn build() -> Self {
        let pi_half = Float128::raw(false, 0, PI_SIG);
        let ln2 = Float128::raw(false, -1, LN2_SIG);
        let sqrt3 = newton_sqrt3();

        let mut sin = [Float128::ONE; SIN_TERMS];
        let mut cos = [Float128::ONE; COS_TERMS];
        for k in 1..SIN_TERMS {
            let k = k as u32;
            sin[k as usize] = sin[k as usize - 1]
                .div(Float128::from_u32(2 * k * (2 * k + 1)))
                .neg();
        }
        for k in 1..COS_TERMS {
            let k = k as u32;
            cos[k as usize] = cos[k as usize - 1]
                .div(Float128::from_u32((2 * k - 1) * (2 * k)))
                .neg();
        }

        let mut atan = [Float128::ONE; ATAN_TERMS];
        for (j, c) in atan.iter_mut().enumerate().skip(1) {
            let recip = Float128::ONE.div(Float128::from_u32(2 * j as u32 + 1));
            *c = if j % 2 == 1 { recip.neg() } else { recip };
        }

        let mut artanh = [Float128::ONE; LOG_TERMS];
        for (j, c) in artanh.iter_mut().enumerate().skip(1) {
            *c = Float128::ONE.div(Float128::from_u32(2 * j as u32 + 1));
        }

        let mut expm1 = [Float128::ONE; EXP_TERMS];
        for k in 1..EXP_TERMS {
            expm1[k] = expm1[k - 1].div(Float128::from_u32(k as u32 + 1));
        }

        Self {
            pi: pi_half.scaled(1),
            pi_half,
            pi_quarter: pi_half.scaled(-1),
            pi_sixth: pi_half.scaled(1).div(Float128::from_u32(6)),
            ln2,
            log2_scale: Float128::ONE.div(ln2).scaled(1),
            sqrt3,
            atan_split: Float128::from_u32(2).sub(sqrt3),
            sin,
            cos,
            atan,
            artanh,
            expm1,
        }
    }
}

/// √3 by Newton iteration from an f64 seed; each step doubles the correct
/// bits, so three steps saturate the 128-bit significand.
fn newton_sqrt3() -> Float128 {
    let three = Float128::from_u32(3);
    let mut s = Float128::from_f64(3f64.sqrt());
    for _ in 0..3 {
        s = s.add(three.div(s)).scaled(-1);
    }
    s
}
