//! Polynomial gcd (subresultant PRS), extended gcd, squarefree part.

use super::Poly;
use crate::num::QRat;

/// Monic gcd of two polynomials over Q\[x\] via the subresultant
/// polynomial remainder sequence, which avoids the coefficient blowup of
/// the naive Euclidean algorithm.
pub fn poly_gcd(a: &Poly, b: &Poly) -> Poly {
    if a.is_zero() {
        return b.make_monic();
    }
    if b.is_zero() {
        return a.make_monic();
    }
    if a.is_constant() || b.is_constant() {
        return Poly::one();
    }

    let (mut f, mut g) = if a.degree() >= b.degree() {
        (a.primitive_part(), b.primitive_part())
    } else {
        (b.primitive_part(), a.primitive_part())
    };

    let mut psi = QRat::from(-1);
    let mut first = true;

    loop {
        if g.is_zero() {
            return f.primitive_part().make_monic();
        }
        if g.is_constant() {
            return Poly::one();
        }

        let deg_f = f.degree().unwrap();
        let deg_g = g.degree().unwrap();
        if deg_f < deg_g {
            std::mem::swap(&mut f, &mut g);
            continue;
        }
        let delta = deg_f - deg_g;

        let h = f.pseudo_rem(&g);
        let neg_lc_f = -&f.leading_coeff().unwrap();

        let beta = if first {
            if delta % 2 == 0 {
                QRat::from(-1)
            } else {
                QRat::one()
            }
        } else {
            &neg_lc_f * &psi.pow_i64(delta as i64)
        };

        // Update psi for the next round.
        if delta >= 1 {
            let num = neg_lc_f.pow_i64(delta as i64);
            let den = psi.pow_i64(delta as i64 - 1);
            psi = &num / &den;
        }
        first = false;

        f = g;
        g = if h.is_zero() { h } else { h.scalar_div(&beta) };
    }
}

/// Extended gcd over Q\[x\]: returns `(g, s, t)` with `s*a + t*b = g` and
/// `g` monic (or zero when both inputs are zero).
pub fn poly_xgcd(a: &Poly, b: &Poly) -> (Poly, Poly, Poly) {
    let mut r0 = a.clone();
    let mut r1 = b.clone();
    let mut s0 = Poly::one();
    let mut s1 = Poly::zero();
    let mut t0 = Poly::zero();
    let mut t1 = Poly::one();

    while !r1.is_zero() {
        let (q, r) = r0.div_rem(&r1);
        let s = &s0 - &(&q * &s1);
        let t = &t0 - &(&q * &t1);
        r0 = r1;
        r1 = r;
        s0 = s1;
        s1 = s;
        t0 = t1;
        t1 = t;
    }

    match r0.leading_coeff() {
        None => (Poly::zero(), Poly::zero(), Poly::zero()),
        Some(lc) => (
            r0.scalar_div(&lc),
            s0.scalar_div(&lc),
            t0.scalar_div(&lc),
        ),
    }
}

/// The squarefree part p / gcd(p, p').
pub fn squarefree_part(p: &Poly) -> Poly {
    if p.is_zero() || p.is_constant() {
        return p.make_monic();
    }
    let g = poly_gcd(p, &p.derivative());
    p.exact_div(&g).make_monic()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poly_from_roots(roots: &[i64]) -> Poly {
        let mut result = Poly::one();
        for &r in roots {
            result = &result * &Poly::from_i64_coeffs(&[-r, 1]);
        }
        result
    }

    #[test]
    fn gcd_of_coprime_is_one() {
        let a = Poly::from_i64_coeffs(&[-1, 1]);
        let b = Poly::from_i64_coeffs(&[-2, 1]);
        assert!(poly_gcd(&a, &b).is_one());
    }

    #[test]
    fn gcd_finds_common_factor() {
        let a = poly_from_roots(&[1, 2]);
        let b = poly_from_roots(&[1, 3]);
        assert_eq!(poly_gcd(&a, &b), Poly::from_i64_coeffs(&[-1, 1]));
    }

    #[test]
    fn gcd_large_degree() {
        let common = poly_from_roots(&[1, 2, 3]);
        let a = &common * &poly_from_roots(&[4, 5, 6, 7]);
        let b = &common * &poly_from_roots(&[8, 9, 10, 11]);
        assert_eq!(poly_gcd(&a, &b), common.make_monic());
    }

    #[test]
    fn xgcd_bezout_identity() {
        let a = poly_from_roots(&[1, 2]);
        let b = poly_from_roots(&[3]);
        let (g, s, t) = poly_xgcd(&a, &b);
        assert_eq!(&(&s * &a) + &(&t * &b), g);
        assert!(g.is_one());
    }

    #[test]
    fn squarefree_part_removes_multiplicity() {
        let p = &poly_from_roots(&[1, 1, 2]) * &Poly::one();
        let sq = squarefree_part(&p);
        assert_eq!(sq, poly_from_roots(&[1, 2]).make_monic());
    }
}
