//! Number-field element arithmetic.
//!
//! An `NfElem` is the residue of a rational polynomial modulo the monic
//! minimal polynomial of the field generator: a dense coefficient vector
//! of degree below the field degree. Elements that happen to be rational
//! are *not* stored here; condensation demotes them to the rational
//! representation first.

use crate::ball::CBall;
use crate::num::QRat;
use crate::poly::{poly_xgcd, Poly};

/// Element of Q(alpha), reduced modulo the monic minimal polynomial.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NfElem(Poly);

impl NfElem {
    /// Reduce an arbitrary polynomial into the field.
    pub fn from_poly(p: &Poly, monic_minpoly: &Poly) -> Self {
        let (_, r) = p.div_rem(monic_minpoly);
        NfElem(r)
    }

    pub fn from_qrat(q: &QRat) -> Self {
        NfElem(Poly::constant(q.clone()))
    }

    /// The generator alpha itself.
    pub fn gen() -> Self {
        NfElem(Poly::x())
    }

    pub fn zero() -> Self {
        NfElem(Poly::zero())
    }

    pub fn poly(&self) -> &Poly {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// True when the element is exactly the generator.
    pub fn is_gen(&self) -> bool {
        self.0.is_x()
    }

    /// `Some(q)` when the element is a rational constant.
    pub fn as_qrat(&self) -> Option<QRat> {
        if self.0.is_constant() {
            Some(self.0.coeff(0))
        } else {
            None
        }
    }

    pub fn neg(&self) -> Self {
        NfElem(-&self.0)
    }

    pub fn add(&self, other: &Self) -> Self {
        NfElem(&self.0 + &other.0)
    }

    pub fn sub(&self, other: &Self) -> Self {
        NfElem(&self.0 - &other.0)
    }

    pub fn add_qrat(&self, q: &QRat) -> Self {
        self.add(&Self::from_qrat(q))
    }

    pub fn mul_qrat(&self, q: &QRat) -> Self {
        NfElem(self.0.scalar_mul(q))
    }

    pub fn mul(&self, other: &Self, monic_minpoly: &Poly) -> Self {
        let prod = &self.0 * &other.0;
        Self::from_poly(&prod, monic_minpoly)
    }

    /// Inverse modulo the minimal polynomial. Panics on zero.
    pub fn inv(&self, monic_minpoly: &Poly) -> Self {
        assert!(!self.is_zero(), "NfElem::inv of zero");
        let (g, s, _) = poly_xgcd(&self.0, monic_minpoly);
        // The minimal polynomial is irreducible, so the gcd is 1.
        assert!(g.is_one(), "NfElem::inv: generator polynomial not irreducible");
        Self::from_poly(&s, monic_minpoly)
    }

    pub fn div(&self, other: &Self, monic_minpoly: &Poly) -> Self {
        self.mul(&other.inv(monic_minpoly), monic_minpoly)
    }

    pub fn pow_i64(&self, exp: i64, monic_minpoly: &Poly) -> Self {
        if exp == 0 {
            return Self::from_qrat(&QRat::one());
        }
        let base = if exp < 0 {
            self.inv(monic_minpoly)
        } else {
            self.clone()
        };
        let mut result = Self::from_qrat(&QRat::one());
        let mut b = base;
        let mut e = exp.unsigned_abs();
        loop {
            if e & 1 == 1 {
                result = result.mul(&b, monic_minpoly);
            }
            e >>= 1;
            if e == 0 {
                break;
            }
            b = b.mul(&b.clone(), monic_minpoly);
        }
        result
    }

    /// Evaluate on an enclosure of the generator.
    pub fn eval_cball(&self, alpha: &CBall, prec: u32) -> CBall {
        self.0.eval_cball(alpha, prec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sqrt2_minpoly() -> Poly {
        // monic: x^2 - 2
        Poly::from_i64_coeffs(&[-2, 0, 1])
    }

    #[test]
    fn gen_squared_reduces() {
        let f = sqrt2_minpoly();
        let a = NfElem::gen();
        let sq = a.mul(&a, &f);
        assert_eq!(sq.as_qrat(), Some(QRat::from(2)));
    }

    #[test]
    fn inverse_of_generator() {
        // 1/sqrt2 = sqrt2 / 2
        let f = sqrt2_minpoly();
        let a = NfElem::gen();
        let i = a.inv(&f);
        assert_eq!(i, a.mul_qrat(&QRat::from((1, 2))));
        assert!(a.mul(&i, &f).as_qrat().is_some_and(|q| q.is_one()));
    }

    #[test]
    fn arithmetic_in_quadratic_field() {
        // (1 + sqrt2)(1 - sqrt2) = -1
        let f = sqrt2_minpoly();
        let one = NfElem::from_qrat(&QRat::one());
        let p = one.add(&NfElem::gen());
        let m = one.sub(&NfElem::gen());
        let prod = p.mul(&m, &f);
        assert_eq!(prod.as_qrat(), Some(QRat::from(-1)));
    }

    #[test]
    fn pow_in_gaussian_field() {
        // i^4 = 1 in Q(i)
        let f = Poly::from_i64_coeffs(&[1, 0, 1]);
        let i = NfElem::gen();
        assert_eq!(i.pow_i64(4, &f).as_qrat(), Some(QRat::one()));
        assert_eq!(i.pow_i64(2, &f).as_qrat(), Some(QRat::from(-1)));
    }
}
