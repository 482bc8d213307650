//! Multivariate rational functions num/den over Z with auto-reduction.
//!
//! Invariants: the denominator is nonzero, gcd(num, den) is a unit, and
//! the denominator's leading (lex) coefficient is positive. These make
//! the representation canonical, so derived equality is representational
//! equality.

use super::gcd::mpoly_gcd;
use super::{Exps, MPoly};
use crate::ball::CBall;
use crate::num::{QInt, QRat};
use std::cmp::Ordering;

/// A rational function in the generators of a Multi field.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MRatFunc {
    num: MPoly,
    den: MPoly,
}

impl MRatFunc {
    /// Construct and normalize. Panics when `den` is zero.
    pub fn new(num: MPoly, den: MPoly) -> Self {
        assert!(!den.is_zero(), "MRatFunc denominator cannot be zero");
        assert_eq!(num.nvars(), den.nvars());
        if num.is_zero() {
            return MRatFunc {
                num,
                den: MPoly::one(den.nvars()),
            };
        }
        let g = mpoly_gcd(&num, &den);
        let mut num = num.div_exact(&g);
        let mut den = den.div_exact(&g);
        if den
            .leading_term()
            .is_some_and(|(_, c)| c.is_negative())
        {
            num = num.neg();
            den = den.neg();
        }
        MRatFunc { num, den }
    }

    pub fn from_mpoly(p: MPoly) -> Self {
        let nvars = p.nvars();
        MRatFunc {
            num: p,
            den: MPoly::one(nvars),
        }
    }

    pub fn from_qrat(nvars: usize, q: &QRat) -> Self {
        MRatFunc {
            num: MPoly::constant(nvars, q.numer()),
            den: MPoly::constant(nvars, q.denom()),
        }
    }

    pub fn zero(nvars: usize) -> Self {
        MRatFunc {
            num: MPoly::zero(nvars),
            den: MPoly::one(nvars),
        }
    }

    pub fn one(nvars: usize) -> Self {
        MRatFunc {
            num: MPoly::one(nvars),
            den: MPoly::one(nvars),
        }
    }

    pub fn gen(nvars: usize, i: usize) -> Self {
        MRatFunc {
            num: MPoly::gen(nvars, i),
            den: MPoly::one(nvars),
        }
    }

    // ---- Queries ----

    pub fn nvars(&self) -> usize {
        self.num.nvars()
    }

    pub fn numer(&self) -> &MPoly {
        &self.num
    }

    pub fn denom(&self) -> &MPoly {
        &self.den
    }

    pub fn is_zero(&self) -> bool {
        self.num.is_zero()
    }

    pub fn is_one(&self) -> bool {
        self.num.is_one() && self.den.is_one()
    }

    /// `Some(q)` when both numerator and denominator are constants.
    pub fn as_qrat(&self) -> Option<QRat> {
        let n = self.num.as_constant()?;
        let d = self.den.as_constant()?;
        Some(&QRat::from(n) / &QRat::from(d))
    }

    /// True when the value is exactly the generator `i`.
    pub fn is_gen(&self, i: usize) -> bool {
        self.den.is_one() && self.num == MPoly::gen(self.nvars(), i)
    }

    /// Variables used by numerator or denominator.
    pub fn vars_used(&self) -> Vec<bool> {
        let mut used = self.num.vars_used();
        for (i, u) in self.den.vars_used().into_iter().enumerate() {
            used[i] = used[i] || u;
        }
        used
    }

    // ---- Arithmetic ----

    pub fn neg(&self) -> Self {
        MRatFunc {
            num: self.num.neg(),
            den: self.den.clone(),
        }
    }

    pub fn add(&self, other: &Self) -> Self {
        let num = self
            .num
            .mul(&other.den)
            .add(&self.den.mul(&other.num));
        let den = self.den.mul(&other.den);
        Self::new(num, den)
    }

    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }

    pub fn mul(&self, other: &Self) -> Self {
        // Cross-cancel before multiplying to limit growth.
        let g1 = mpoly_gcd(&self.num, &other.den);
        let g2 = mpoly_gcd(&other.num, &self.den);
        let n1 = self.num.div_exact(&g1);
        let d2 = other.den.div_exact(&g1);
        let n2 = other.num.div_exact(&g2);
        let d1 = self.den.div_exact(&g2);
        Self::new(n1.mul(&n2), d1.mul(&d2))
    }

    /// Reciprocal. Panics on zero (callers dispatch specials first).
    pub fn inv(&self) -> Self {
        assert!(!self.is_zero(), "MRatFunc::inv of zero");
        Self::new(self.den.clone(), self.num.clone())
    }

    pub fn div(&self, other: &Self) -> Self {
        self.mul(&other.inv())
    }

    pub fn add_qrat(&self, q: &QRat) -> Self {
        self.add(&Self::from_qrat(self.nvars(), q))
    }

    pub fn mul_qrat(&self, q: &QRat) -> Self {
        if q.is_zero() {
            return Self::zero(self.nvars());
        }
        Self::new(
            self.num.mul_scalar(&q.numer()),
            self.den.mul_scalar(&q.denom()),
        )
    }

    pub fn pow_i64(&self, exp: i64) -> Self {
        if exp == 0 {
            return Self::one(self.nvars());
        }
        let base = if exp < 0 { self.inv() } else { self.clone() };
        let e = exp.unsigned_abs();
        MRatFunc {
            num: base.num.pow_u32(e as u32),
            den: base.den.pow_u32(e as u32),
        }
    }

    /// Reduce numerator and denominator modulo the ideal, reconciling the
    /// two quasi-division scale factors into the fraction.
    pub fn reduce_ideal(&self, ideal: &[MPoly]) -> Self {
        if ideal.is_empty() || self.is_zero() {
            return self.clone();
        }
        let (rn, sn) = self.num.quasi_reduce(ideal);
        let (rd, sd) = self.den.quasi_reduce(ideal);
        // sn * num = rn, sd * den = rd  =>  num/den = (rn * sd) / (rd * sn)
        if rd.is_zero() {
            // The ideal revealed a zero denominator representation; keep
            // the original form rather than produce nonsense.
            return self.clone();
        }
        Self::new(rn.mul_scalar(&sd), rd.mul_scalar(&sn))
    }

    /// Rename variables into a larger ring.
    pub fn compose_vars(&self, map: &[usize], new_nvars: usize) -> Self {
        MRatFunc {
            num: self.num.compose_vars(map, new_nvars),
            den: self.den.compose_vars(map, new_nvars),
        }
    }

    pub fn eval_cball(&self, xs: &[CBall], prec: u32) -> CBall {
        let n = self.num.eval_cball(xs, prec);
        let d = self.den.eval_cball(xs, prec);
        n.div(&d, prec)
    }

    /// Structural ordering (denominator first, as in the representational
    /// comparator of elements).
    pub fn cmp_structural(&self, other: &Self) -> Ordering {
        match self.den.cmp_structural(&other.den) {
            Ordering::Equal => self.num.cmp_structural(&other.num),
            other => other,
        }
    }

    /// Replace a denominator that is divisible by a generator known to be
    /// algebraic by multiplying through with a cofactor and re-reducing.
    /// Accepted only when the new denominator is strictly simpler.
    pub fn simplify_fraction_ideal(&self, ideal: &[MPoly]) -> Self {
        let mut current = self.clone();
        for _ in 0..4 {
            let mut improved = false;
            for var in 0..current.nvars() {
                let min_deg = current.den.min_degree_in(var);
                if min_deg == 0 || current.den.is_one() {
                    continue;
                }
                // Find the ideal relation that is univariate in this
                // variable (a minimal polynomial of the generator).
                let Some(rel) = ideal
                    .iter()
                    .find(|g| g.univariate_var() == Some(var))
                else {
                    continue;
                };
                let deg = rel.degree_in(var);
                if deg == 0 {
                    continue;
                }
                // Multiply by x^(deg - 1) so the reduction can clear the
                // generator out of the denominator.
                let mut shift = Exps::from_elem(0, current.nvars());
                shift[var] = deg.saturating_sub(1).max(1);
                let num = current.num.mul_monomial(&shift, &QInt::one());
                let den = current.den.mul_monomial(&shift, &QInt::one());
                let candidate = Self::new(num, den).reduce_ideal(ideal);
                if candidate.den.num_terms() < current.den.num_terms()
                    || (candidate.den.num_terms() == current.den.num_terms()
                        && candidate.den.degree_in(var) < current.den.degree_in(var))
                {
                    current = candidate;
                    improved = true;
                }
            }
            if !improved {
                break;
            }
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> MRatFunc {
        MRatFunc::gen(2, 0)
    }

    fn y() -> MRatFunc {
        MRatFunc::gen(2, 1)
    }

    #[test]
    fn add_and_cancel() {
        let s = x().add(&y());
        let z = s.sub(&x()).sub(&y());
        assert!(z.is_zero());
    }

    #[test]
    fn difference_of_squares_reduces() {
        // (x^2 - y^2)/(x - y) = x + y
        let num = x().mul(&x()).sub(&y().mul(&y()));
        let den = x().sub(&y());
        let q = num.div(&den);
        assert_eq!(q, x().add(&y()));
    }

    #[test]
    fn as_qrat_on_constants() {
        let half = MRatFunc::from_qrat(2, &QRat::from((1, 2)));
        assert_eq!(half.as_qrat(), Some(QRat::from((1, 2))));
        assert_eq!(x().as_qrat(), None);
    }

    #[test]
    fn inv_swaps_and_normalizes_sign() {
        let v = x().neg();
        let i = v.inv();
        // 1 / (-x) = -1 / x with positive denominator.
        assert_eq!(i.denom(), &MPoly::gen(2, 0));
    }

    #[test]
    fn reduce_ideal_sqrt2() {
        // In Q(sqrt2): (x^2 + x) reduces to (x + 2) modulo x^2 - 2.
        let rel = MPoly::gen(1, 0)
            .pow_u32(2)
            .sub(&MPoly::constant(1, QInt::from(2i64)));
        let v = MRatFunc::from_mpoly(
            MPoly::gen(1, 0).pow_u32(2).add(&MPoly::gen(1, 0)),
        );
        let r = v.reduce_ideal(&[rel]);
        let expected = MRatFunc::from_mpoly(
            MPoly::gen(1, 0).add(&MPoly::constant(1, QInt::from(2i64))),
        );
        assert_eq!(r, expected);
    }

    #[test]
    fn simplify_denominator_by_relation() {
        // 1/x modulo x^2 - 2 becomes x/2.
        let rel = MPoly::gen(1, 0)
            .pow_u32(2)
            .sub(&MPoly::constant(1, QInt::from(2i64)));
        let v = MRatFunc::one(1).div(&MRatFunc::gen(1, 0));
        let s = v.simplify_fraction_ideal(&[rel.clone()]);
        let expected = MRatFunc::new(
            MPoly::gen(1, 0),
            MPoly::constant(1, QInt::from(2i64)),
        );
        assert_eq!(s, expected);
    }
}
