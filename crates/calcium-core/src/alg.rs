//! Exact algebraic numbers.
//!
//! An `Alg` is a primitive integer minimal polynomial (irreducible,
//! positive leading coefficient, content 1) together with a complex box
//! isolating one of its roots. Equality is decidable: same polynomial
//! plus progressive refinement until the boxes either separate or nest.
//!
//! Binary operations run through the tensor algebra Q[a] (x) Q[b]:
//! powers of the combination are collected until the first linear
//! dependency, the resulting annihilator is factored over Q, and the
//! correct irreducible factor and root are selected by shrinking the
//! numerical enclosure. Work is capped by a degree limit supplied by the
//! caller; an overrun reports `None` and the caller falls back to
//! `Unknown`.

use crate::ball::{CBall, RBall};
use crate::linalg::DependencyFinder;
use crate::num::{QInt, QRat};
use crate::poly::{factor, is_cyclotomic, isolate_roots, refine_root, Poly};
use std::cmp::Ordering;
use std::ops::Neg;

const REFINE_CAP: u32 = 1 << 20;

/// An exact algebraic number.
#[derive(Clone, Debug)]
pub struct Alg {
    minpoly: Poly,
    encl: CBall,
}

impl Alg {
    // ---- Constructors ----

    /// Internal: `encl` must isolate a single root of the irreducible
    /// primitive `minpoly`.
    fn from_root_unchecked(minpoly: Poly, encl: CBall) -> Self {
        Alg { minpoly, encl }
    }

    /// Construct from an isolating box previously produced by
    /// `poly::isolate_roots` on the same irreducible polynomial.
    pub(crate) fn from_isolating_box(minpoly: Poly, encl: CBall) -> Self {
        Alg::from_root_unchecked(minpoly, encl)
    }

    pub fn from_qrat(q: &QRat) -> Self {
        let minpoly = Poly::from_qint_coeffs(&[-&q.numer(), q.denom()]);
        Alg {
            minpoly,
            encl: CBall::from_qrat(q, 64),
        }
    }

    pub fn from_qint(n: &QInt) -> Self {
        Self::from_qrat(&QRat::from(n.clone()))
    }

    pub fn zero() -> Self {
        Self::from_qrat(&QRat::zero())
    }

    pub fn one() -> Self {
        Self::from_qrat(&QRat::one())
    }

    /// The imaginary unit.
    pub fn i() -> Self {
        Alg {
            minpoly: Poly::from_i64_coeffs(&[1, 0, 1]),
            encl: CBall::i(64),
        }
    }

    /// The golden ratio (1 + sqrt 5)/2.
    pub fn phi() -> Self {
        let minpoly = Poly::from_i64_coeffs(&[-1, -1, 1]);
        select_root_by(&minpoly, |r| r.re.is_positive())
    }

    /// The tribonacci constant, the real root of x^3 - x^2 - x - 1.
    pub fn tribonacci() -> Self {
        let minpoly = Poly::from_i64_coeffs(&[-1, -1, -1, 1]);
        select_root_by(&minpoly, |r| r.im.contains_zero() && r.re.is_positive())
    }

    /// The tetranacci constant, the real root > 1 of x^4 - x^3 - x^2 - x - 1.
    pub fn tetranacci() -> Self {
        let minpoly = Poly::from_i64_coeffs(&[-1, -1, -1, -1, 1]);
        select_root_by(&minpoly, |r| r.im.contains_zero() && r.re.is_positive())
    }

    /// e^(i pi p / q). The denominator must be positive.
    pub fn root_of_unity(p: i64, q: i64) -> Self {
        assert!(q > 0, "root_of_unity: denominator must be positive");
        // e^(i pi p/q) = e^(2 pi i p / (2q)); reduce p/(2q) = j/n.
        let mut j = p.rem_euclid(2 * q);
        let mut n = 2 * q;
        let g = gcd_i64(j, n);
        if g > 1 {
            j /= g;
            n /= g;
        }
        if n == 1 {
            return Self::one();
        }
        if n == 2 {
            return Self::from_qrat(&QRat::from(-1));
        }
        let minpoly = crate::poly::cyclotomic_poly(n as usize);
        select_root(&minpoly, |prec| unit_circle_point(j, n, prec))
            .expect("cyclotomic root selection cannot fail")
    }

    // ---- Queries ----

    pub fn minpoly(&self) -> &Poly {
        &self.minpoly
    }

    pub fn degree(&self) -> usize {
        self.minpoly.degree().unwrap_or(1)
    }

    /// Enclosure refined to roughly `prec` bits.
    pub fn refined(&self, prec: u32) -> CBall {
        refine_root(&self.minpoly, &self.encl, prec)
    }

    pub fn enclosure(&self) -> &CBall {
        &self.encl
    }

    pub fn to_qrat(&self) -> Option<QRat> {
        if self.degree() == 1 {
            let c0 = self.minpoly.coeff(0);
            let c1 = self.minpoly.coeff(1);
            Some(&(-&c0) / &c1)
        } else {
            None
        }
    }

    pub fn is_rational(&self) -> bool {
        self.degree() == 1
    }

    pub fn to_qint(&self) -> Option<QInt> {
        self.to_qrat().and_then(|q| q.to_qint())
    }

    pub fn is_zero(&self) -> bool {
        self.to_qrat().is_some_and(|q| q.is_zero())
    }

    pub fn is_one(&self) -> bool {
        self.to_qrat().is_some_and(|q| q.is_one())
    }

    /// Decide identity with another root of the same minimal polynomial.
    fn same_root(&self, other: &Alg) -> bool {
        if self.minpoly != other.minpoly {
            return false;
        }
        if self.is_rational() {
            return true; // unique root
        }
        let fixed = other.refined(64);
        let mut prec = 64u32;
        loop {
            let mine = self.refined(prec);
            if !mine.overlaps(&fixed) {
                return false;
            }
            if box_inside(&mine, &fixed) {
                return true;
            }
            prec *= 2;
            assert!(prec <= REFINE_CAP, "Alg::same_root failed to converge");
        }
    }

    pub fn conj(&self) -> Alg {
        Alg {
            minpoly: self.minpoly.clone(),
            encl: self.encl.conj(),
        }
    }

    pub fn is_real(&self) -> bool {
        if self.is_rational() {
            return true;
        }
        if !self.encl.im.contains_zero() {
            return false;
        }
        self.same_root(&self.conj())
    }

    /// Exact sign of the real part.
    pub fn sgn_re(&self) -> i32 {
        if let Some(q) = self.to_qrat() {
            return q.sign();
        }
        // Re = 0 exactly when the value equals the negated conjugate; the
        // negated conjugate has minimal polynomial f(-x) normalized.
        let neg_conj = self.conj().neg();
        let re_zero_possible = neg_conj.minpoly == self.minpoly;
        if re_zero_possible && self.same_root(&neg_conj) {
            return 0;
        }
        let mut prec = 64u32;
        loop {
            let b = self.refined(prec);
            if b.re.is_positive() {
                return 1;
            }
            if b.re.is_negative() {
                return -1;
            }
            prec *= 2;
            assert!(prec <= REFINE_CAP, "Alg::sgn_re failed to converge");
        }
    }

    /// Exact sign of the imaginary part.
    pub fn sgn_im(&self) -> i32 {
        if self.is_real() {
            return 0;
        }
        let mut prec = 64u32;
        loop {
            let b = self.refined(prec);
            if b.im.is_positive() {
                return 1;
            }
            if b.im.is_negative() {
                return -1;
            }
            prec *= 2;
            assert!(prec <= REFINE_CAP, "Alg::sgn_im failed to converge");
        }
    }

    /// Complex sign: sign of Re, with the imaginary axis tiebreak.
    pub fn csgn(&self) -> i32 {
        match self.sgn_re() {
            0 => self.sgn_im(),
            s => s,
        }
    }

    /// Compare real parts. The operands may have different minimal
    /// polynomials.
    pub fn cmp_re(&self, other: &Alg) -> Ordering {
        if self.minpoly == other.minpoly {
            if self.same_root(other) || self.same_root(&other.conj()) {
                return Ordering::Equal;
            }
        } else if let (Some(a), Some(b)) = (self.to_qrat(), other.to_qrat()) {
            return a.0.cmp(&b.0);
        }
        let mut prec = 64u32;
        loop {
            let a = self.refined(prec);
            let b = other.refined(prec);
            if a.re.disjoint(&b.re) {
                return if a.re.mid() < b.re.mid() {
                    Ordering::Less
                } else {
                    Ordering::Greater
                };
            }
            prec *= 2;
            if prec > REFINE_CAP {
                // Distinct algebraic numbers with equal real parts that
                // are not conjugate: decide exactly via Re(a - b).
                let diff = self
                    .sub(other, 1 << 16)
                    .expect("exact real-part comparison");
                return match diff.sgn_re() {
                    0 => Ordering::Equal,
                    s if s < 0 => Ordering::Less,
                    _ => Ordering::Greater,
                };
            }
        }
    }

    /// Compare imaginary parts.
    pub fn cmp_im(&self, other: &Alg) -> Ordering {
        if self.minpoly == other.minpoly && self.same_root(other) {
            return Ordering::Equal;
        }
        if self.is_real() && other.is_real() {
            return Ordering::Equal;
        }
        let mut prec = 64u32;
        loop {
            let a = self.refined(prec);
            let b = other.refined(prec);
            if a.im.disjoint(&b.im) {
                return if a.im.mid() < b.im.mid() {
                    Ordering::Less
                } else {
                    Ordering::Greater
                };
            }
            prec *= 2;
            if prec > REFINE_CAP {
                let diff = self
                    .sub(other, 1 << 16)
                    .expect("exact imaginary-part comparison");
                return match diff.sgn_im() {
                    0 => Ordering::Equal,
                    s if s < 0 => Ordering::Less,
                    _ => Ordering::Greater,
                };
            }
        }
    }

    /// Total comparison of real algebraic numbers (callers ensure both
    /// are real).
    pub fn cmp_real(&self, other: &Alg) -> Ordering {
        self.cmp_re(other)
    }

    /// Floor of a real algebraic number.
    pub fn floor(&self) -> QInt {
        if let Some(q) = self.to_qrat() {
            return q.floor();
        }
        // An irrational value cannot sit on an integer boundary, so the
        // interval eventually resolves.
        let mut prec = 64u32;
        loop {
            let b = self.refined(prec);
            if let Some(n) = b.re.unique_floor() {
                return n;
            }
            prec *= 2;
            assert!(prec <= REFINE_CAP, "Alg::floor failed to converge");
        }
    }

    pub fn ceil(&self) -> QInt {
        (&self.neg().floor()).neg()
    }

    // ---- Exact unary transforms ----

    pub fn neg(&self) -> Alg {
        let (_, minpoly) = self.minpoly.compose_neg_x().to_int_primitive();
        Alg {
            minpoly,
            encl: self.encl.neg(),
        }
    }

    /// Scalar shift by a rational.
    pub fn add_qrat(&self, r: &QRat) -> Alg {
        if r.is_zero() {
            return self.clone();
        }
        if let Some(q) = self.to_qrat() {
            return Alg::from_qrat(&(&q + r));
        }
        let (_, minpoly) = self.minpoly.shift_arg(&-r).to_int_primitive();
        select_root(&minpoly, |prec| {
            self.refined(prec).add(&CBall::from_qrat(r, prec), prec)
        })
        .expect("rational shift root selection cannot fail")
    }

    /// Scalar multiplication by a rational.
    pub fn mul_qrat(&self, r: &QRat) -> Alg {
        if r.is_zero() {
            return Alg::zero();
        }
        if r.is_one() {
            return self.clone();
        }
        if let Some(q) = self.to_qrat() {
            return Alg::from_qrat(&(&q * r));
        }
        let (_, minpoly) = self.minpoly.scale_arg(&r.inv()).to_int_primitive();
        select_root(&minpoly, |prec| {
            self.refined(prec).mul(&CBall::from_qrat(r, prec), prec)
        })
        .expect("rational scale root selection cannot fail")
    }

    /// Reciprocal. Panics on zero.
    pub fn inv(&self) -> Alg {
        assert!(!self.is_zero(), "Alg::inv of zero");
        if let Some(q) = self.to_qrat() {
            return Alg::from_qrat(&q.inv());
        }
        let (_, minpoly) = self.minpoly.reverse().to_int_primitive();
        select_root(&minpoly, |prec| self.refined(prec).inv(prec))
            .expect("inverse root selection cannot fail")
    }

    // ---- Binary arithmetic ----

    pub fn add(&self, other: &Alg, deg_limit: usize) -> Option<Alg> {
        if let Some(q) = self.to_qrat() {
            return Some(other.add_qrat(&q));
        }
        if let Some(q) = other.to_qrat() {
            return Some(self.add_qrat(&q));
        }
        binop(BinOp::Add, self, other, deg_limit)
    }

    pub fn sub(&self, other: &Alg, deg_limit: usize) -> Option<Alg> {
        self.add(&other.neg(), deg_limit)
    }

    pub fn mul(&self, other: &Alg, deg_limit: usize) -> Option<Alg> {
        if let Some(q) = self.to_qrat() {
            return Some(other.mul_qrat(&q));
        }
        if let Some(q) = other.to_qrat() {
            return Some(self.mul_qrat(&q));
        }
        binop(BinOp::Mul, self, other, deg_limit)
    }

    /// Division; `None` when the divisor is zero or limits are exceeded.
    pub fn div(&self, other: &Alg, deg_limit: usize) -> Option<Alg> {
        if other.is_zero() {
            return None;
        }
        self.mul(&other.inv(), deg_limit)
    }

    pub fn pow_i64(&self, exp: i64, deg_limit: usize) -> Option<Alg> {
        if exp == 0 {
            return Some(Alg::one());
        }
        if self.is_zero() {
            return if exp > 0 { Some(Alg::zero()) } else { None };
        }
        let base = if exp < 0 { self.inv() } else { self.clone() };
        let mut result = Alg::one();
        let mut b = base;
        let mut e = exp.unsigned_abs();
        loop {
            if e & 1 == 1 {
                result = result.mul(&b, deg_limit)?;
            }
            e >>= 1;
            if e == 0 {
                break;
            }
            b = b.mul(&b.clone(), deg_limit)?;
        }
        Some(result)
    }

    /// Principal square root.
    pub fn sqrt(&self, deg_limit: usize) -> Option<Alg> {
        if let Some(q) = self.to_qrat() {
            if q.is_zero() {
                return Some(Alg::zero());
            }
            // Perfect squares of rationals stay rational.
            if !q.is_negative() {
                if let (Some(n), Some(d)) =
                    (q.numer().sqrt_exact(), q.denom().sqrt_exact())
                {
                    return Some(Alg::from_qrat(
                        &(&QRat::from(n) / &QRat::from(d)),
                    ));
                }
            }
        }
        if 2 * self.degree() > deg_limit {
            return None;
        }
        let ann = self.minpoly.compose_x_squared();
        let real = self.is_real();
        let sign = if real { self.sgn_re() } else { 0 };
        let target = |prec: u32| -> CBall {
            let b = self.refined(prec);
            principal_sqrt_ball(&b, real, sign, prec)
        };
        select_factor_root(&ann, target)
    }

    /// Principal q-th root (q >= 1).
    pub fn root_q(&self, q: u32, deg_limit: usize) -> Option<Alg> {
        assert!(q >= 1);
        if q == 1 {
            return Some(self.clone());
        }
        if q == 2 {
            return self.sqrt(deg_limit);
        }
        if self.is_zero() {
            return Some(Alg::zero());
        }
        if self.degree().saturating_mul(q as usize) > deg_limit {
            return None;
        }
        let mut ann_coeffs = vec![QRat::zero(); self.degree() * q as usize + 1];
        for (i, c) in self.minpoly.coeffs().iter().enumerate() {
            ann_coeffs[i * q as usize] = c.clone();
        }
        let ann = Poly::from_vec(ann_coeffs);
        let real = self.is_real();
        let sign = if real { self.sgn_re() } else { 0 };
        let target = |prec: u32| -> CBall {
            let b = self.refined(prec);
            principal_root_ball(&b, q, real, sign, prec)
        };
        select_factor_root(&ann, target)
    }

    /// x^(p/q) as (x^(1/q))^p.
    pub fn pow_rational(&self, p: i64, q: u32, deg_limit: usize) -> Option<Alg> {
        let root = self.root_q(q, deg_limit)?;
        root.pow_i64(p, deg_limit)
    }

    /// |x| = sqrt(x * conj(x)).
    pub fn abs(&self, deg_limit: usize) -> Option<Alg> {
        if self.is_real() {
            return Some(if self.sgn_re() < 0 {
                self.neg()
            } else {
                self.clone()
            });
        }
        let norm = binop(BinOp::Mul, self, &self.conj(), deg_limit)?;
        norm.sqrt(deg_limit)
    }

    /// If the value is a root of unity e^(i pi p/q), return the reduced
    /// (p, q) with q > 0 and p in (-q, q].
    pub fn log_pi_i(&self) -> Option<(i64, i64)> {
        if self.is_one() {
            return Some((0, 1));
        }
        if self.to_qrat().is_some_and(|q| q == QRat::from(-1)) {
            return Some((1, 1));
        }
        let n = is_cyclotomic(&self.minpoly)? as i64;
        // The value is e^(2 pi i j / n) for some j coprime to n; find j
        // by shrinking the enclosure against the candidate points.
        let mut candidates: Vec<i64> = (0..n).filter(|&j| gcd_i64(j, n) == 1).collect();
        let mut prec = 64u32;
        loop {
            let b = self.refined(prec);
            candidates.retain(|&j| unit_circle_point(j, n, prec).overlaps(&b));
            match candidates.len() {
                0 => return None,
                1 => break,
                _ => {
                    prec *= 2;
                    if prec > REFINE_CAP {
                        return None;
                    }
                }
            }
        }
        let mut j = candidates[0];
        // e^(2 pi i j/n) = e^(i pi (2j)/n); normalize 2j/n to (-1, 1].
        if 2 * j > n {
            j -= n;
        }
        let g = gcd_i64(2 * j, n);
        Some(((2 * j) / g, n / g))
    }

    /// Evaluate a rational polynomial at this number: the value
    /// `coords(self)` as an exact algebraic number. The result's degree
    /// divides the degree of `self`, so no limit applies.
    pub fn eval_poly(&self, coords: &Poly) -> Alg {
        if coords.is_constant() {
            return Alg::from_qrat(&coords.coeff(0));
        }
        if let Some(q) = self.to_qrat() {
            return Alg::from_qrat(&coords.eval_qrat(&q));
        }
        let m = self.degree();
        let monic = self.minpoly.make_monic();
        let value = {
            let (_, r) = coords.div_rem(&monic);
            r
        };
        // Powers of the value in Q[a]/f until dependency.
        let mut finder = DependencyFinder::new(m);
        let mut pow = Poly::one();
        let ann = loop {
            let vec = poly_to_vec(&pow, m);
            if let Some(combo) = finder.offer(vec) {
                break Poly::from_vec(combo);
            }
            pow = {
                let (_, r) = (&pow * &value).div_rem(&monic);
                r
            };
        };
        let target = |prec: u32| -> CBall {
            let b = self.refined(prec);
            value.eval_cball(&b, prec)
        };
        select_factor_root(&ann, target).expect("eval_poly within degree bound")
    }
}

impl PartialEq for Alg {
    fn eq(&self, other: &Self) -> bool {
        self.minpoly == other.minpoly && self.same_root(other)
    }
}

impl Eq for Alg {}

impl std::hash::Hash for Alg {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        // Equal values share a minimal polynomial; the enclosure cannot
        // participate without breaking the Hash/Eq contract.
        self.minpoly.hash(state);
    }
}

// ---------------------------------------------------------------------------
// Root and factor selection
// ---------------------------------------------------------------------------

fn gcd_i64(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a.abs(), b.abs());
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

fn box_inside(inner: &CBall, outer: &CBall) -> bool {
    interval_inside(&inner.re, &outer.re) && interval_inside(&inner.im, &outer.im)
}

fn interval_inside(inner: &RBall, outer: &RBall) -> bool {
    if outer.is_indeterminate() {
        return true;
    }
    if inner.is_indeterminate() {
        return false;
    }
    inner.lower(64) >= outer.lower(64) && inner.upper(64) <= outer.upper(64)
}

/// The point e^(2 pi i j / n) as a small box.
fn unit_circle_point(j: i64, n: i64, prec: u32) -> CBall {
    use rug::float::Constant;
    use rug::Float;
    let mut theta = Float::with_val(prec, Constant::Pi);
    theta *= 2u32;
    theta *= Float::with_val(prec, j);
    theta /= Float::with_val(prec, n);
    let c = Float::with_val(prec, theta.cos_ref());
    let s = Float::with_val(prec, theta.sin_ref());
    CBall::new(RBall::from_float(c, prec), RBall::from_float(s, prec))
}

/// Select the root of the irreducible polynomial that the shrinking
/// target enclosure pins down. The target's exact value must be a root.
fn select_root(minpoly: &Poly, target: impl Fn(u32) -> CBall) -> Option<Alg> {
    let roots = isolate_roots(minpoly, 64);
    if roots.len() == 1 {
        return Some(Alg::from_root_unchecked(minpoly.clone(), roots[0].clone()));
    }
    let mut prec = 64u32;
    loop {
        let tb = target(prec);
        if !tb.is_indeterminate() {
            let hits: Vec<&CBall> = roots.iter().filter(|r| r.overlaps(&tb)).collect();
            if hits.len() == 1 {
                return Some(Alg::from_root_unchecked(
                    minpoly.clone(),
                    hits[0].clone(),
                ));
            }
        }
        prec *= 2;
        if prec > REFINE_CAP {
            return None;
        }
    }
}

/// Pick a root of an irreducible polynomial by a predicate on the
/// isolating boxes (used for named constants with a known position).
fn select_root_by(minpoly: &Poly, pred: impl Fn(&CBall) -> bool) -> Alg {
    let roots = isolate_roots(minpoly, 64);
    let hit = roots
        .into_iter()
        .find(|r| pred(r))
        .expect("select_root_by: no root matches");
    Alg::from_root_unchecked(minpoly.clone(), hit)
}

/// Given an annihilating polynomial of the target value, find the value's
/// minimal polynomial among the irreducible factors and isolate its root.
fn select_factor_root(ann: &Poly, target: impl Fn(u32) -> CBall) -> Option<Alg> {
    let facs = factor(ann);
    let mut survivors: Vec<Poly> = facs.factors.into_iter().map(|(f, _)| f).collect();
    if survivors.is_empty() {
        return None;
    }
    let mut prec = 64u32;
    while survivors.len() > 1 {
        let tb = target(prec);
        if !tb.is_indeterminate() {
            survivors.retain(|f| f.eval_cball(&tb, prec).contains_zero());
        }
        prec *= 2;
        if prec > REFINE_CAP {
            return None;
        }
    }
    let minpoly = survivors.pop()?;
    select_root(&minpoly, target)
}

/// Principal square root of an enclosure of an exact value with known
/// realness/sign information.
fn principal_sqrt_ball(b: &CBall, real: bool, sign: i32, prec: u32) -> CBall {
    if real {
        if sign >= 0 {
            CBall::from_rball(b.re.abs_ball().sqrt(prec))
        } else {
            CBall::new(RBall::exact_zero(), b.re.neg().abs_ball().sqrt(prec))
        }
    } else if b.im.contains_zero() {
        // Not yet refined enough to avoid the branch cut.
        CBall::indeterminate()
    } else {
        b.sqrt(prec)
    }
}

/// Principal q-th root of an enclosure, same contract as above.
fn principal_root_ball(b: &CBall, q: u32, real: bool, sign: i32, prec: u32) -> CBall {
    let inv_q = QRat::from((1, q as i64));
    if real {
        let magnitude = b.re.abs_ball().ln(prec).mul(&RBall::from_qrat(&inv_q, prec), prec).exp(prec);
        if sign >= 0 {
            CBall::from_rball(magnitude)
        } else {
            // exp(i pi / q) * |x|^(1/q)
            let phase = unit_circle_point(1, 2 * q as i64, prec);
            phase.mul(&CBall::from_rball(magnitude), prec)
        }
    } else if b.im.contains_zero() {
        CBall::indeterminate()
    } else {
        let log = b.log(prec);
        log.mul(&CBall::from_qrat(&inv_q, prec), prec).exp(prec)
    }
}

fn poly_to_vec(p: &Poly, dim: usize) -> Vec<QRat> {
    let mut v = vec![QRat::zero(); dim];
    for (i, c) in p.coeffs().iter().enumerate() {
        v[i] = c.clone();
    }
    v
}

// ---------------------------------------------------------------------------
// Tensor algebra Q[a] (x) Q[b]
// ---------------------------------------------------------------------------

enum BinOp {
    Add,
    Mul,
}

struct Tensor {
    m: usize,
    n: usize,
    /// Reduction rows: a^k (k in m..=2m-2) expressed in powers < m.
    red_a: Vec<Vec<QRat>>,
    red_b: Vec<Vec<QRat>>,
}

fn reduction_table(monic: &Poly) -> Vec<Vec<QRat>> {
    let m = monic.degree().unwrap();
    // a^m = -(c_0 + ... + c_{m-1} a^{m-1})
    let base: Vec<QRat> = (0..m).map(|i| -&monic.coeff(i)).collect();
    let mut table = vec![base];
    for _ in m + 1..=2 * m.max(1) {
        let prev = table.last().unwrap().clone();
        // Multiply by a: shift, then fold the overflow through a^m.
        let mut next = vec![QRat::zero(); m];
        let overflow = prev[m - 1].clone();
        for i in (1..m).rev() {
            next[i] = prev[i - 1].clone();
        }
        for (i, c) in table[0].iter().enumerate() {
            let delta = &overflow * c;
            next[i] = &next[i] + &delta;
        }
        table.push(next);
    }
    table
}

impl Tensor {
    fn new(fa: &Poly, fb: &Poly) -> Self {
        let fa = fa.make_monic();
        let fb = fb.make_monic();
        let m = fa.degree().unwrap();
        let n = fb.degree().unwrap();
        Tensor {
            m,
            n,
            red_a: reduction_table(&fa),
            red_b: reduction_table(&fb),
        }
    }

    fn dim(&self) -> usize {
        self.m * self.n
    }

    /// Product of two elements in the a^i b^j basis.
    fn mul(&self, u: &[QRat], v: &[QRat]) -> Vec<QRat> {
        let (m, n) = (self.m, self.n);
        let rows = 2 * m - 1;
        let cols = 2 * n - 1;
        let mut t = vec![vec![QRat::zero(); cols]; rows];
        for i1 in 0..m {
            for j1 in 0..n {
                let a = &u[i1 * n + j1];
                if a.is_zero() {
                    continue;
                }
                for i2 in 0..m {
                    for j2 in 0..n {
                        let b = &v[i2 * n + j2];
                        if b.is_zero() {
                            continue;
                        }
                        let prod = a * b;
                        t[i1 + i2][j1 + j2] = &t[i1 + i2][j1 + j2] + &prod;
                    }
                }
            }
        }
        // Fold a-powers >= m.
        for k in (m..rows).rev() {
            for col in 0..cols {
                if t[k][col].is_zero() {
                    continue;
                }
                let c = std::mem::replace(&mut t[k][col], QRat::zero());
                for (d, r) in self.red_a[k - m].iter().enumerate() {
                    let delta = &c * r;
                    t[d][col] = &t[d][col] + &delta;
                }
            }
        }
        // Fold b-powers >= n.
        for row in t.iter_mut().take(m) {
            for l in (n..cols).rev() {
                if row[l].is_zero() {
                    continue;
                }
                let c = std::mem::replace(&mut row[l], QRat::zero());
                for (d, r) in self.red_b[l - n].iter().enumerate() {
                    let delta = &c * r;
                    row[d] = &row[d] + &delta;
                }
            }
        }
        let mut out = vec![QRat::zero(); m * n];
        for (i, row) in t.iter().enumerate().take(m) {
            for (j, c) in row.iter().enumerate().take(n) {
                out[i * n + j] = c.clone();
            }
        }
        out
    }
}

fn binop(op: BinOp, a: &Alg, b: &Alg, deg_limit: usize) -> Option<Alg> {
    let m = a.degree();
    let n = b.degree();
    if m.checked_mul(n)? > deg_limit {
        return None;
    }
    let tensor = Tensor::new(&a.minpoly, &b.minpoly);
    let dim = tensor.dim();

    // The combination element in the tensor basis.
    let mut s = vec![QRat::zero(); dim];
    match op {
        BinOp::Add => {
            // a + b = a^1 b^0 + a^0 b^1.
            s[n] = QRat::one();
            s[1] = &s[1] + &QRat::one();
        }
        BinOp::Mul => {
            // a * b = a^1 b^1.
            s[n + 1] = QRat::one();
        }
    }

    let mut finder = DependencyFinder::new(dim);
    let mut pow = vec![QRat::zero(); dim];
    pow[0] = QRat::one();
    let ann = loop {
        if let Some(combo) = finder.offer(pow.clone()) {
            break Poly::from_vec(combo);
        }
        pow = tensor.mul(&pow, &s);
    };

    let target = |prec: u32| -> CBall {
        let ab = a.refined(prec);
        let bb = b.refined(prec);
        match op {
            BinOp::Add => ab.add(&bb, prec),
            BinOp::Mul => ab.mul(&bb, prec),
        }
    };
    select_factor_root(&ann, target)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIM: usize = 64;

    fn sqrt_int(n: i64) -> Alg {
        Alg::from_qint(&QInt::from(n)).sqrt(LIM).unwrap()
    }

    #[test]
    fn sqrt2_has_right_minpoly() {
        let r = sqrt_int(2);
        assert_eq!(r.minpoly(), &Poly::from_i64_coeffs(&[-2, 0, 1]));
        assert_eq!(r.sgn_re(), 1);
    }

    #[test]
    fn sqrt_of_square_is_rational() {
        let r = sqrt_int(49);
        assert_eq!(r.to_qrat(), Some(QRat::from(7)));
    }

    #[test]
    fn sqrt_of_negative_is_imaginary() {
        // sqrt(-4) = 2i
        let r = sqrt_int(-4);
        assert_eq!(r.minpoly(), &Poly::from_i64_coeffs(&[4, 0, 1]));
        assert_eq!(r.sgn_im(), 1);
        assert!(!r.is_real());
        // (2i)^2 = -4
        let sq = r.mul(&r, LIM).unwrap();
        assert_eq!(sq.to_qrat(), Some(QRat::from(-4)));
    }

    #[test]
    fn sqrt8_is_twice_sqrt2() {
        let a = sqrt_int(8);
        let b = sqrt_int(2).mul_qrat(&QRat::from(2));
        assert_eq!(a, b);
    }

    #[test]
    fn add_sqrt2_sqrt3_degree_four() {
        let s = sqrt_int(2).add(&sqrt_int(3), LIM).unwrap();
        assert_eq!(s.degree(), 4);
        assert_eq!(s.minpoly(), &Poly::from_i64_coeffs(&[1, 0, -10, 0, 1]));
    }

    #[test]
    fn sqrt2_times_sqrt2() {
        let p = sqrt_int(2).mul(&sqrt_int(2), LIM).unwrap();
        assert_eq!(p.to_qrat(), Some(QRat::from(2)));
    }

    #[test]
    fn sum_with_negation_is_zero() {
        let r = sqrt_int(2);
        let z = r.add(&r.neg(), LIM).unwrap();
        assert!(z.is_zero());
    }

    #[test]
    fn inverse_of_sqrt2() {
        let r = sqrt_int(2);
        let i = r.inv();
        let p = r.mul(&i, LIM).unwrap();
        assert!(p.is_one());
    }

    #[test]
    fn i_squared_is_minus_one() {
        let i = Alg::i();
        let sq = i.mul(&i, LIM).unwrap();
        assert_eq!(sq.to_qrat(), Some(QRat::from(-1)));
        assert_eq!(i.csgn(), 1);
        assert_eq!(Alg::i().neg().csgn(), -1);
    }

    #[test]
    fn root_of_unity_twelfth() {
        // e^(i pi / 6): a primitive 12th root of unity.
        let z = Alg::root_of_unity(1, 6);
        assert_eq!(z.degree(), 4);
        assert_eq!(z.log_pi_i(), Some((1, 6)));
        // Its 12th power is 1.
        let p = z.pow_i64(12, LIM).unwrap();
        assert!(p.is_one());
    }

    #[test]
    fn log_pi_i_of_minus_i() {
        let z = Alg::i().neg();
        assert_eq!(z.log_pi_i(), Some((-1, 2)));
    }

    #[test]
    fn floor_of_sqrt2() {
        assert_eq!(sqrt_int(2).floor(), QInt::from(1i64));
        assert_eq!(sqrt_int(2).neg().floor(), QInt::from(-2i64));
        assert_eq!(sqrt_int(2).ceil(), QInt::from(2i64));
    }

    #[test]
    fn phi_satisfies_identity() {
        // phi^2 = phi + 1
        let phi = Alg::phi();
        let sq = phi.mul(&phi, LIM).unwrap();
        let rhs = phi.add_qrat(&QRat::one());
        assert_eq!(sq, rhs);
    }

    #[test]
    fn cmp_real_ordering() {
        assert_eq!(sqrt_int(2).cmp_real(&sqrt_int(3)), Ordering::Less);
        assert_eq!(sqrt_int(3).cmp_real(&sqrt_int(2)), Ordering::Greater);
        assert_eq!(sqrt_int(2).cmp_real(&sqrt_int(2)), Ordering::Equal);
    }

    #[test]
    fn eval_poly_in_field() {
        // (sqrt2)^2 + sqrt2 - 2 evaluated as a polynomial: sqrt2.
        let r = sqrt_int(2);
        let p = Poly::from_i64_coeffs(&[-2, 1, 1]);
        let v = r.eval_poly(&p);
        assert_eq!(v, r);
    }

    #[test]
    fn abs_of_complex() {
        // |3 + 4i| = 5
        let v = Alg::i()
            .mul_qrat(&QRat::from(4))
            .add_qrat(&QRat::from(3));
        let a = v.abs(LIM).unwrap();
        assert_eq!(a.to_qrat(), Some(QRat::from(5)));
    }
}
