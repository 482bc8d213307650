//! Dense univariate polynomials over `QRat`.
//!
//! `Poly` stores coefficients in ascending degree order. Invariant: the
//! vector is either empty (zero polynomial) or its last element is
//! nonzero. Minimal polynomials of algebraic numbers are carried as
//! `Poly` values with integer coefficients, content 1 and positive
//! leading coefficient.

pub mod cyclotomic;
pub mod factor;
pub mod gcd;
pub mod roots;

pub use cyclotomic::cyclotomic_poly;
pub use factor::{factor, is_cyclotomic, PolyFactors};
pub use gcd::{poly_gcd, poly_xgcd, squarefree_part};
pub use roots::{isolate_roots, refine_root};

use crate::ball::{CBall, RBall};
use crate::num::{QInt, QRat};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

/// A dense univariate polynomial with `QRat` coefficients.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Poly {
    coeffs: Vec<QRat>,
}

impl Poly {
    /// Strip trailing zero coefficients to maintain the canonical form.
    fn normalize(&mut self) {
        while self.coeffs.last().is_some_and(|c| c.is_zero()) {
            self.coeffs.pop();
        }
    }

    // ---- Constructors ----

    pub fn zero() -> Self {
        Poly { coeffs: Vec::new() }
    }

    pub fn one() -> Self {
        Poly {
            coeffs: vec![QRat::one()],
        }
    }

    pub fn constant(c: QRat) -> Self {
        if c.is_zero() {
            Self::zero()
        } else {
            Poly { coeffs: vec![c] }
        }
    }

    /// The indeterminate x.
    pub fn x() -> Self {
        Poly {
            coeffs: vec![QRat::zero(), QRat::one()],
        }
    }

    pub fn monomial(c: QRat, deg: usize) -> Self {
        if c.is_zero() {
            return Self::zero();
        }
        let mut coeffs = vec![QRat::zero(); deg + 1];
        coeffs[deg] = c;
        Poly { coeffs }
    }

    pub fn from_vec(coeffs: Vec<QRat>) -> Self {
        let mut p = Poly { coeffs };
        p.normalize();
        p
    }

    pub fn from_i64_coeffs(coeffs: &[i64]) -> Self {
        Self::from_vec(coeffs.iter().map(|&c| QRat::from(c)).collect())
    }

    pub fn from_qint_coeffs(coeffs: &[QInt]) -> Self {
        Self::from_vec(coeffs.iter().map(|c| QRat::from(c.clone())).collect())
    }

    // ---- Queries ----

    pub fn degree(&self) -> Option<usize> {
        if self.coeffs.is_empty() {
            None
        } else {
            Some(self.coeffs.len() - 1)
        }
    }

    pub fn leading_coeff(&self) -> Option<QRat> {
        self.coeffs.last().cloned()
    }

    pub fn coeff(&self, i: usize) -> QRat {
        self.coeffs.get(i).cloned().unwrap_or_else(QRat::zero)
    }

    pub fn coeffs(&self) -> &[QRat] {
        &self.coeffs
    }

    pub fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }

    pub fn is_constant(&self) -> bool {
        self.degree().is_none_or(|d| d == 0)
    }

    pub fn is_one(&self) -> bool {
        self.coeffs.len() == 1 && self.coeffs[0].is_one()
    }

    /// True when the polynomial is exactly x.
    pub fn is_x(&self) -> bool {
        self.coeffs.len() == 2 && self.coeffs[0].is_zero() && self.coeffs[1].is_one()
    }

    pub fn has_integer_coeffs(&self) -> bool {
        self.coeffs.iter().all(|c| c.is_integer())
    }

    // ---- Content / primitive part ----

    /// Content: gcd of numerators divided by lcm of denominators; zero
    /// for the zero polynomial. The primitive part `self / content` has
    /// coprime integer coefficients.
    pub fn content(&self) -> QRat {
        if self.coeffs.is_empty() {
            return QRat::zero();
        }
        let mut numer_gcd = QInt::zero();
        let mut denom_lcm = QInt::one();
        for c in &self.coeffs {
            numer_gcd = numer_gcd.gcd(&c.numer().abs());
            denom_lcm = denom_lcm.lcm(&c.denom());
        }
        &QRat::from(numer_gcd) / &QRat::from(denom_lcm)
    }

    /// Primitive integer form: coprime integer coefficients, sign of the
    /// leading coefficient preserved.
    pub fn primitive_part(&self) -> Poly {
        if self.is_zero() {
            return Poly::zero();
        }
        self.scalar_div(&self.content())
    }

    /// Primitive integer form with positive leading coefficient, plus the
    /// rational factor taken out: `self = scale * poly`.
    pub fn to_int_primitive(&self) -> (QRat, Poly) {
        if self.is_zero() {
            return (QRat::zero(), Poly::zero());
        }
        let mut scale = self.content();
        let mut prim = self.scalar_div(&scale);
        if prim.leading_coeff().is_some_and(|lc| lc.is_negative()) {
            scale = -scale;
            prim = -&prim;
        }
        (scale, prim)
    }

    /// Integer coefficient vector of a polynomial whose coefficients are
    /// already integral. Panics otherwise.
    pub fn int_coeffs(&self) -> Vec<QInt> {
        self.coeffs
            .iter()
            .map(|c| {
                c.to_qint()
                    .unwrap_or_else(|| panic!("Poly::int_coeffs on non-integral polynomial"))
            })
            .collect()
    }

    pub fn make_monic(&self) -> Poly {
        match self.leading_coeff() {
            None => Poly::zero(),
            Some(lc) => {
                if lc.is_one() {
                    self.clone()
                } else {
                    self.scalar_div(&lc)
                }
            }
        }
    }

    // ---- Scalar operations ----

    pub fn scalar_mul(&self, c: &QRat) -> Poly {
        if c.is_zero() {
            return Poly::zero();
        }
        Poly {
            coeffs: self.coeffs.iter().map(|a| a * c).collect(),
        }
    }

    pub fn scalar_div(&self, c: &QRat) -> Poly {
        assert!(!c.is_zero(), "Poly scalar division by zero");
        let inv = c.inv();
        self.scalar_mul(&inv)
    }

    // ---- Structural operations ----

    pub fn derivative(&self) -> Poly {
        if self.coeffs.len() <= 1 {
            return Poly::zero();
        }
        let coeffs = self
            .coeffs
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, c)| c * &QRat::from(i as i64))
            .collect();
        Poly::from_vec(coeffs)
    }

    pub fn pow_u32(&self, exp: u32) -> Poly {
        let mut result = Poly::one();
        let mut base = self.clone();
        let mut e = exp;
        while e > 0 {
            if e & 1 == 1 {
                result = &result * &base;
            }
            e >>= 1;
            if e > 0 {
                base = &base * &base;
            }
        }
        result
    }

    /// Substitute: self(q(x)).
    pub fn compose(&self, q: &Poly) -> Poly {
        let mut result = Poly::zero();
        for c in self.coeffs.iter().rev() {
            result = &(&result * q) + &Poly::constant(c.clone());
        }
        result
    }

    /// self(x^2), cheap special case of substitution.
    pub fn compose_x_squared(&self) -> Poly {
        let mut coeffs = vec![QRat::zero(); self.coeffs.len().saturating_mul(2)];
        for (i, c) in self.coeffs.iter().enumerate() {
            coeffs[2 * i] = c.clone();
        }
        Poly::from_vec(coeffs)
    }

    /// self(-x).
    pub fn compose_neg_x(&self) -> Poly {
        let coeffs = self
            .coeffs
            .iter()
            .enumerate()
            .map(|(i, c)| if i % 2 == 1 { -c } else { c.clone() })
            .collect();
        Poly::from_vec(coeffs)
    }

    /// x^deg * self(1/x): coefficient reversal.
    pub fn reverse(&self) -> Poly {
        let mut coeffs = self.coeffs.clone();
        coeffs.reverse();
        Poly::from_vec(coeffs)
    }

    /// self(c * x).
    pub fn scale_arg(&self, c: &QRat) -> Poly {
        let mut pow = QRat::one();
        let coeffs = self
            .coeffs
            .iter()
            .map(|a| {
                let r = a * &pow;
                pow = &pow * c;
                r
            })
            .collect();
        Poly::from_vec(coeffs)
    }

    /// self(x + c).
    pub fn shift_arg(&self, c: &QRat) -> Poly {
        self.compose(&Poly::from_vec(vec![c.clone(), QRat::one()]))
    }

    // ---- Division ----

    /// Quotient and remainder over Q. Panics when dividing by zero.
    pub fn div_rem(&self, divisor: &Poly) -> (Poly, Poly) {
        assert!(!divisor.is_zero(), "Poly division by zero");
        let d_deg = divisor.degree().unwrap();
        let d_lc = divisor.leading_coeff().unwrap();
        let mut rem = self.clone();
        let mut quot_coeffs = vec![
            QRat::zero();
            self.degree().map_or(0, |n| n.saturating_sub(d_deg) + 1)
        ];
        while let Some(r_deg) = rem.degree() {
            if r_deg < d_deg {
                break;
            }
            let factor = &rem.leading_coeff().unwrap() / &d_lc;
            let shift = r_deg - d_deg;
            quot_coeffs[shift] = factor.clone();
            let sub = divisor.scalar_mul(&factor);
            let mut new_coeffs = rem.coeffs.clone();
            for (i, c) in sub.coeffs.iter().enumerate() {
                new_coeffs[i + shift] = &new_coeffs[i + shift] - c;
            }
            rem = Poly::from_vec(new_coeffs);
            if rem.degree().is_none_or(|d| d < r_deg) {
                continue;
            }
            // Leading term must have cancelled.
            unreachable!("Poly::div_rem failed to reduce degree");
        }
        (Poly::from_vec(quot_coeffs), rem)
    }

    /// Exact division. Panics when the remainder is nonzero.
    pub fn exact_div(&self, divisor: &Poly) -> Poly {
        let (q, r) = self.div_rem(divisor);
        assert!(r.is_zero(), "Poly::exact_div with nonzero remainder");
        q
    }

    /// Pseudo-remainder: rem of lc(g)^(deg f - deg g + 1) * f by g, which
    /// keeps all intermediate arithmetic denominator-free.
    pub fn pseudo_rem(&self, g: &Poly) -> Poly {
        assert!(!g.is_zero(), "Poly pseudo-remainder by zero");
        let f_deg = match self.degree() {
            Some(d) => d,
            None => return Poly::zero(),
        };
        let g_deg = g.degree().unwrap();
        if f_deg < g_deg {
            return self.clone();
        }
        let lc = g.leading_coeff().unwrap();
        let scaled = self.scalar_mul(&lc.pow_i64((f_deg - g_deg + 1) as i64));
        let (_, r) = scaled.div_rem(g);
        r
    }

    // ---- Evaluation ----

    pub fn eval_qrat(&self, x: &QRat) -> QRat {
        let mut acc = QRat::zero();
        for c in self.coeffs.iter().rev() {
            acc = &(&acc * x) + c;
        }
        acc
    }

    pub fn eval_rball(&self, x: &RBall, prec: u32) -> RBall {
        let mut acc = RBall::exact_zero();
        for c in self.coeffs.iter().rev() {
            acc = acc.mul(x, prec).add(&RBall::from_qrat(c, prec), prec);
        }
        acc
    }

    pub fn eval_cball(&self, x: &CBall, prec: u32) -> CBall {
        let mut acc = CBall::exact_zero();
        for c in self.coeffs.iter().rev() {
            acc = acc.mul(x, prec).add(&CBall::from_qrat(c, prec), prec);
        }
        acc
    }
}

// ---- Operator impls ----

impl<'a> Add<&'a Poly> for &'a Poly {
    type Output = Poly;
    fn add(self, rhs: &'a Poly) -> Poly {
        let n = self.coeffs.len().max(rhs.coeffs.len());
        let mut coeffs = Vec::with_capacity(n);
        for i in 0..n {
            coeffs.push(&self.coeff(i) + &rhs.coeff(i));
        }
        Poly::from_vec(coeffs)
    }
}

impl<'a> Sub<&'a Poly> for &'a Poly {
    type Output = Poly;
    fn sub(self, rhs: &'a Poly) -> Poly {
        let n = self.coeffs.len().max(rhs.coeffs.len());
        let mut coeffs = Vec::with_capacity(n);
        for i in 0..n {
            coeffs.push(&self.coeff(i) - &rhs.coeff(i));
        }
        Poly::from_vec(coeffs)
    }
}

impl<'a> Mul<&'a Poly> for &'a Poly {
    type Output = Poly;
    fn mul(self, rhs: &'a Poly) -> Poly {
        if self.is_zero() || rhs.is_zero() {
            return Poly::zero();
        }
        let mut coeffs = vec![QRat::zero(); self.coeffs.len() + rhs.coeffs.len() - 1];
        for (i, a) in self.coeffs.iter().enumerate() {
            if a.is_zero() {
                continue;
            }
            for (j, b) in rhs.coeffs.iter().enumerate() {
                coeffs[i + j] = &coeffs[i + j] + &(a * b);
            }
        }
        Poly::from_vec(coeffs)
    }
}

impl<'a> Neg for &'a Poly {
    type Output = Poly;
    fn neg(self) -> Poly {
        Poly {
            coeffs: self.coeffs.iter().map(|c| -c).collect(),
        }
    }
}

impl fmt::Display for Poly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }
        let mut first = true;
        for i in (0..self.coeffs.len()).rev() {
            let c = &self.coeffs[i];
            if c.is_zero() {
                continue;
            }
            let sign = if first {
                if c.is_negative() { "-" } else { "" }
            } else if c.is_negative() {
                " - "
            } else {
                " + "
            };
            let abs = c.abs();
            first = false;
            match i {
                0 => write!(f, "{sign}{abs}")?,
                1 if abs.is_one() => write!(f, "{sign}x")?,
                1 => write!(f, "{sign}{abs}*x")?,
                _ if abs.is_one() => write!(f, "{sign}x^{i}")?,
                _ => write!(f, "{sign}{abs}*x^{i}")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_trailing_zeros() {
        let p = Poly::from_i64_coeffs(&[1, 2, 0, 0]);
        assert_eq!(p.degree(), Some(1));
    }

    #[test]
    fn mul_and_divide_roundtrip() {
        let a = Poly::from_i64_coeffs(&[-1, 1]); // x - 1
        let b = Poly::from_i64_coeffs(&[2, 3, 1]); // x^2 + 3x + 2
        let prod = &a * &b;
        assert_eq!(prod.exact_div(&a), b);
        assert_eq!(prod.exact_div(&b), a);
    }

    #[test]
    fn div_rem_basic() {
        let f = Poly::from_i64_coeffs(&[-2, 0, 1]); // x^2 - 2
        let g = Poly::from_i64_coeffs(&[1, 1]); // x + 1
        let (q, r) = f.div_rem(&g);
        assert_eq!(&(&q * &g) + &r, f);
        assert_eq!(r, Poly::from_i64_coeffs(&[-1]));
    }

    #[test]
    fn content_and_primitive() {
        let p = Poly::from_vec(vec![
            QRat::from((2, 3)),
            QRat::from((4, 3)),
        ]);
        let (scale, prim) = p.to_int_primitive();
        assert_eq!(prim, Poly::from_i64_coeffs(&[1, 2]));
        assert_eq!(scale, QRat::from((2, 3)));
    }

    #[test]
    fn eval_horner() {
        let p = Poly::from_i64_coeffs(&[1, 0, 1]); // x^2 + 1
        assert_eq!(p.eval_qrat(&QRat::from(3)), QRat::from(10));
    }

    #[test]
    fn compose_x_squared_matches_compose() {
        let p = Poly::from_i64_coeffs(&[-2, 0, 1]);
        let x2 = Poly::from_i64_coeffs(&[0, 0, 1]);
        assert_eq!(p.compose_x_squared(), p.compose(&x2));
    }

    #[test]
    fn derivative_of_cubic() {
        let p = Poly::from_i64_coeffs(&[5, -1, 0, 2]); // 2x^3 - x + 5
        assert_eq!(p.derivative(), Poly::from_i64_coeffs(&[-1, 0, 6]));
    }

    #[test]
    fn eval_ball_contains_exact_value() {
        let p = Poly::from_i64_coeffs(&[1, -3, 1]); // x^2 - 3x + 1
        let x = RBall::from_qrat(&QRat::from((1, 2)), 64);
        let v = p.eval_rball(&x, 64);
        assert!(v.may_contain_qrat(&p.eval_qrat(&QRat::from((1, 2)))));
    }
}
