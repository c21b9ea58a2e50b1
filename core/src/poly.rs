//! Horner evaluation over [`Float128`] for the series kernels

use crate::float128::Float128;

/// Σ coeffs[k]·x^k with coeffs in ascending power order
pub fn poly_eval(x: Float128, coeffs: &[Float128]) -> Float128 {
    let mut acc = *coeffs.last().unwrap();
    for c in coeffs.iter().rev().skip(1) {
        acc = acc.mul(x).add(*c);
    }
    acc
}

/// x·Σ coeffs[k]·x^2k, the shape of the sin/atan/artanh series
pub fn odd_poly(x: Float128, coeffs: &[Float128]) -> Float128 {
    x.mul(poly_eval(x.mul(x), coeffs))
}

/// Σ coeffs[k]·x^2k, the shape of the cos series
pub fn even_poly(x: Float128, coeffs: &[Float128]) -> Float128 {
    poly_eval(x.mul(x), coeffs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::table;

    fn near(a: f64, b: f64) {
        assert!((a - b).abs() <= b.abs().max(1e-30) * 1e-13, "{a} != {b}");
    }

    #[test]
    fn horner_small_poly() {
        // 2 + 3x + 4x^2 at x = 1.5
        let coeffs = [
            Float128::from_u32(2),
            Float128::from_u32(3),
            Float128::from_u32(4),
        ];
        near(poly_eval(Float128::from_f64(1.5), &coeffs).to_f64(), 15.5);
    }

    #[test]
    fn series_match_f64() {
        let c = table();
        let x = Float128::from_f64(0.5);
        near(odd_poly(x, &c.sin).to_f64(), 0.5f64.sin());
        near(even_poly(x, &c.cos).to_f64(), 0.5f64.cos());
        near(odd_poly(x, &c.artanh).to_f64(), 0.5f64.atanh());

        let t = Float128::from_f64(0.25);
        near(odd_poly(t, &c.atan).to_f64(), 0.25f64.atan());
    }
}
