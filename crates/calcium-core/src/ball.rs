//! Rigorous midpoint/radius enclosures over `rug::Float`.
//!
//! `RBall` is a real interval `mid +/- rad`, `CBall` a rectangular complex
//! box. Every operation widens the radius by a first-order propagation
//! term plus rounding slack, so the output interval always contains the
//! exact image of the inputs. The bounds are conservative rather than
//! tight; the predicate engine only ever uses them to *exclude* values,
//! so looseness costs precision, never soundness.
//!
//! An enclosure with infinite radius is "indeterminate": it carries no
//! information and every containment query answers true.

use crate::num::{QInt, QRat};
use rug::float::{Constant, Round, Special};
use rug::Float;
use std::cmp::Ordering;

/// Precision used for radius bookkeeping. Radii only need a couple of
/// correct leading bits.
const RAD_PREC: u32 = 32;

fn rad_zero() -> Float {
    Float::new(RAD_PREC)
}

fn rad_inf() -> Float {
    Float::with_val(RAD_PREC, Special::Infinity)
}

/// Upper bound on the rounding error of a value computed at `prec` bits.
fn eps_for(mid: &Float, prec: u32) -> Float {
    match mid.get_exp() {
        Some(e) => {
            let shift = e.saturating_sub(prec as i32).saturating_add(2);
            Float::with_val(RAD_PREC, Float::i_exp(1, shift))
        }
        // Zero is produced exactly by MPFR when the result is exact.
        None => rad_zero(),
    }
}

/// A real interval `mid +/- rad`.
#[derive(Clone, Debug)]
pub struct RBall {
    mid: Float,
    rad: Float,
}

impl RBall {
    // ---- Constructors ----

    pub fn exact_zero() -> Self {
        RBall {
            mid: Float::new(RAD_PREC),
            rad: rad_zero(),
        }
    }

    pub fn indeterminate() -> Self {
        RBall {
            mid: Float::new(RAD_PREC),
            rad: rad_inf(),
        }
    }

    /// A point interval around a computed float, padded by its rounding error.
    pub fn from_float(mid: Float, prec: u32) -> Self {
        if !mid.is_finite() {
            return RBall::indeterminate();
        }
        let rad = eps_for(&mid, prec);
        RBall { mid, rad }
    }

    /// Interval with an explicit radius, padded by the midpoint's
    /// rounding error.
    pub fn with_radius(mid: Float, rad: Float) -> Self {
        if !mid.is_finite() || rad.is_nan() || rad.is_sign_negative() {
            return RBall::indeterminate();
        }
        let prec = mid.prec();
        let eps = eps_for(&mid, prec);
        let rad = Float::with_val(RAD_PREC, &rad + &eps);
        RBall::make(mid, rad)
    }

    /// Exact point interval (no rounding pad). Caller asserts exactness.
    pub fn exact(mid: Float) -> Self {
        if !mid.is_finite() {
            return RBall::indeterminate();
        }
        RBall {
            mid,
            rad: rad_zero(),
        }
    }

    pub fn from_qint(v: &QInt, prec: u32) -> Self {
        let mid = Float::with_val(prec, &v.0);
        RBall::from_float(mid, prec)
    }

    pub fn from_qrat(v: &QRat, prec: u32) -> Self {
        let mid = Float::with_val(prec, &v.0);
        RBall::from_float(mid, prec)
    }

    pub fn from_i64(v: i64, prec: u32) -> Self {
        let mid = Float::with_val(prec, v);
        RBall::from_float(mid, prec)
    }

    pub fn pi(prec: u32) -> Self {
        let mid = Float::with_val(prec, Constant::Pi);
        RBall::from_float(mid, prec)
    }

    pub fn euler(prec: u32) -> Self {
        let mid = Float::with_val(prec, Constant::Euler);
        RBall::from_float(mid, prec)
    }

    fn make(mid: Float, rad: Float) -> Self {
        if !mid.is_finite() || rad.is_nan() {
            return RBall::indeterminate();
        }
        // One part in 2^16 of slack absorbs the nearest-rounding of the
        // radius bookkeeping itself.
        let slack = Float::with_val(RAD_PREC, 1.0000152587890625f64);
        let rad = Float::with_val(RAD_PREC, &rad * &slack);
        RBall { mid, rad }
    }

    // ---- Queries ----

    pub fn mid(&self) -> &Float {
        &self.mid
    }

    pub fn rad(&self) -> &Float {
        &self.rad
    }

    pub fn is_indeterminate(&self) -> bool {
        self.rad.is_infinite() || self.mid.is_nan()
    }

    pub fn is_exact_zero(&self) -> bool {
        self.mid.is_zero() && self.rad.is_zero()
    }

    /// Lower endpoint, rounded outward.
    pub fn lower(&self, prec: u32) -> Float {
        let (v, _) = Float::with_val_round(prec, &self.mid - &self.rad, Round::Down);
        v
    }

    /// Upper endpoint, rounded outward.
    pub fn upper(&self, prec: u32) -> Float {
        let (v, _) = Float::with_val_round(prec, &self.mid + &self.rad, Round::Up);
        v
    }

    pub fn contains_zero(&self) -> bool {
        if self.is_indeterminate() {
            return true;
        }
        // Round |mid| down so a borderline value is never excluded.
        let (abs_mid, _) =
            Float::with_val_round(RAD_PREC, self.mid.abs_ref(), Round::Down);
        abs_mid <= self.rad
    }

    pub fn is_nonzero(&self) -> bool {
        !self.contains_zero()
    }

    pub fn is_positive(&self) -> bool {
        !self.is_indeterminate() && self.mid.is_sign_positive() && !self.contains_zero()
    }

    pub fn is_negative(&self) -> bool {
        !self.is_indeterminate() && self.mid.is_sign_negative() && !self.contains_zero()
    }

    /// True when the interval certainly contains `q` is *possible*, i.e.
    /// `q` has not been excluded.
    pub fn may_contain_qrat(&self, q: &QRat) -> bool {
        if self.is_indeterminate() {
            return true;
        }
        let prec = self.mid.prec().max(64);
        let qf = Float::with_val(prec, &q.0);
        let mut diff = Float::with_val(prec, &self.mid - &qf);
        diff.abs_mut();
        // Pad by the rounding error of the comparison itself.
        let pad = eps_for(&diff, prec);
        let bound = Float::with_val(RAD_PREC, &self.rad + &pad);
        diff <= bound
    }

    /// |mid| + rad, an upper bound for |x|.
    pub fn abs_upper(&self) -> Float {
        if self.is_indeterminate() {
            return rad_inf();
        }
        let (abs_mid, _) =
            Float::with_val_round(RAD_PREC, self.mid.abs_ref(), Round::Up);
        let (up, _) =
            Float::with_val_round(RAD_PREC, &abs_mid + &self.rad, Round::Up);
        up
    }

    /// max(0, |mid| - rad), a lower bound for |x|.
    pub fn abs_lower(&self) -> Float {
        if self.is_indeterminate() {
            return rad_zero();
        }
        let (abs_mid, _) =
            Float::with_val_round(RAD_PREC, self.mid.abs_ref(), Round::Down);
        let (lo, _) =
            Float::with_val_round(RAD_PREC, &abs_mid - &self.rad, Round::Down);
        if lo.is_sign_negative() {
            rad_zero()
        } else {
            lo
        }
    }

    pub fn to_f64(&self) -> f64 {
        self.mid.to_f64()
    }

    /// The unique integer in the interval, if there is exactly one.
    pub fn unique_integer(&self) -> Option<QInt> {
        if self.is_indeterminate() {
            return None;
        }
        let prec = self.mid.prec().max(64);
        let lo = self.lower(prec);
        let hi = self.upper(prec);
        let (lo_ceil, _) = lo.to_integer_round(Round::Up)?;
        let (hi_floor, _) = hi.to_integer_round(Round::Down)?;
        if lo_ceil == hi_floor {
            Some(QInt(lo_ceil))
        } else {
            None
        }
    }

    /// The floor of every point in the interval, when it is constant.
    pub fn unique_floor(&self) -> Option<QInt> {
        if self.is_indeterminate() {
            return None;
        }
        let prec = self.mid.prec().max(64);
        let lo = self.lower(prec);
        let hi = self.upper(prec);
        let (lo_floor, _) = lo.to_integer_round(Round::Down)?;
        let (hi_floor, _) = hi.to_integer_round(Round::Down)?;
        if lo_floor == hi_floor {
            Some(QInt(lo_floor))
        } else {
            None
        }
    }

    // ---- Arithmetic ----

    pub fn neg(&self) -> Self {
        RBall {
            mid: Float::with_val(self.mid.prec(), -&self.mid),
            rad: self.rad.clone(),
        }
    }

    pub fn add(&self, other: &RBall, prec: u32) -> Self {
        if self.is_indeterminate() || other.is_indeterminate() {
            return RBall::indeterminate();
        }
        let mid = Float::with_val(prec, &self.mid + &other.mid);
        let eps = eps_for(&mid, prec);
        let rad = Float::with_val(RAD_PREC, &self.rad + &other.rad) + eps;
        RBall::make(mid, rad)
    }

    pub fn sub(&self, other: &RBall, prec: u32) -> Self {
        self.add(&other.neg(), prec)
    }

    pub fn mul(&self, other: &RBall, prec: u32) -> Self {
        if self.is_indeterminate() || other.is_indeterminate() {
            return RBall::indeterminate();
        }
        let mid = Float::with_val(prec, &self.mid * &other.mid);
        let eps = eps_for(&mid, prec);
        let a = Float::with_val(RAD_PREC, self.mid.abs_ref());
        let b = Float::with_val(RAD_PREC, other.mid.abs_ref());
        let mut rad = Float::with_val(RAD_PREC, &a * &other.rad);
        rad += Float::with_val(RAD_PREC, &b * &self.rad);
        rad += Float::with_val(RAD_PREC, &self.rad * &other.rad);
        rad += eps;
        RBall::make(mid, rad)
    }

    pub fn inv(&self, prec: u32) -> Self {
        if self.contains_zero() {
            return RBall::indeterminate();
        }
        // Monotone on a sign-definite interval: hull of endpoint inverses.
        let lo = self.lower(prec);
        let hi = self.upper(prec);
        let inv_lo = Float::with_val(prec, hi.recip_ref());
        let inv_hi = Float::with_val(prec, lo.recip_ref());
        RBall::hull(inv_lo, inv_hi, prec)
    }

    pub fn div(&self, other: &RBall, prec: u32) -> Self {
        self.mul(&other.inv(prec), prec)
    }

    /// Hull of two computed endpoint values, padded by their rounding error.
    fn hull(a: Float, b: Float, prec: u32) -> Self {
        if !a.is_finite() || !b.is_finite() {
            return RBall::indeterminate();
        }
        let mut mid = Float::with_val(prec, &a + &b);
        mid /= 2u32;
        let mut half = Float::with_val(RAD_PREC, &b - &a);
        half.abs_mut();
        let half = half / 2u32;
        let rad = half + eps_for(&a, prec) + eps_for(&b, prec) + eps_for(&mid, prec);
        RBall::make(mid, rad)
    }

    /// Apply a monotone function to both endpoints and take the hull.
    fn monotone_hull<F: Fn(&Float) -> Float>(&self, prec: u32, f: F) -> Self {
        if self.is_indeterminate() {
            return RBall::indeterminate();
        }
        let lo = self.lower(prec);
        let hi = self.upper(prec);
        RBall::hull(f(&lo), f(&hi), prec)
    }

    pub fn sqrt(&self, prec: u32) -> Self {
        if self.is_indeterminate() {
            return RBall::indeterminate();
        }
        let lo = self.lower(prec);
        if lo.is_sign_negative() && !lo.is_zero() {
            return RBall::indeterminate();
        }
        self.monotone_hull(prec, |x| {
            if x.is_sign_negative() {
                Float::new(prec)
            } else {
                Float::with_val(prec, x.sqrt_ref())
            }
        })
    }

    pub fn square(&self, prec: u32) -> Self {
        if self.is_indeterminate() {
            return RBall::indeterminate();
        }
        if self.contains_zero() {
            // Hull is [0, max(|lo|, |hi|)^2].
            let m = self.abs_upper();
            let hi = Float::with_val(prec, &m * &m);
            RBall::hull(Float::new(prec), hi, prec)
        } else {
            self.mul(self, prec)
        }
    }

    pub fn abs_ball(&self) -> Self {
        if self.is_indeterminate() {
            return RBall::indeterminate();
        }
        if self.contains_zero() {
            let hi = self.abs_upper();
            let prec = self.mid.prec();
            let half = Float::with_val(prec, &hi / 2u32);
            let rad = Float::with_val(RAD_PREC, &hi / 2u32) + eps_for(&half, prec);
            RBall::make(half, rad)
        } else if self.mid.is_sign_negative() {
            self.neg()
        } else {
            self.clone()
        }
    }

    pub fn exp(&self, prec: u32) -> Self {
        self.monotone_hull(prec, |x| Float::with_val(prec, x.exp_ref()))
    }

    pub fn ln(&self, prec: u32) -> Self {
        if self.is_indeterminate() {
            return RBall::indeterminate();
        }
        let lo = self.lower(prec);
        if !(lo.is_sign_positive() && !lo.is_zero()) {
            return RBall::indeterminate();
        }
        self.monotone_hull(prec, |x| Float::with_val(prec, x.ln_ref()))
    }

    /// Lipschitz-1 propagation used for sine and cosine.
    fn lipschitz1<F: Fn(&Float) -> Float>(&self, prec: u32, f: F) -> Self {
        if self.is_indeterminate() {
            return RBall::indeterminate();
        }
        let mid = f(&self.mid);
        let eps = eps_for(&mid, prec);
        let rad = Float::with_val(RAD_PREC, &self.rad + &eps);
        RBall::make(mid, rad)
    }

    pub fn sin(&self, prec: u32) -> Self {
        self.lipschitz1(prec, |x| Float::with_val(prec, x.sin_ref()))
    }

    pub fn cos(&self, prec: u32) -> Self {
        self.lipschitz1(prec, |x| Float::with_val(prec, x.cos_ref()))
    }

    pub fn atan(&self, prec: u32) -> Self {
        self.monotone_hull(prec, |x| Float::with_val(prec, x.atan_ref()))
    }

    pub fn sinh(&self, prec: u32) -> Self {
        self.monotone_hull(prec, |x| Float::with_val(prec, x.sinh_ref()))
    }

    pub fn cosh(&self, prec: u32) -> Self {
        if self.is_indeterminate() {
            return RBall::indeterminate();
        }
        if self.contains_zero() {
            let m = self.abs_upper();
            let big = Float::with_val(prec, m.cosh_ref());
            RBall::hull(Float::with_val(prec, 1), big, prec)
        } else {
            self.monotone_hull(prec, |x| Float::with_val(prec, x.cosh_ref()))
        }
    }

    pub fn pow_u32(&self, exp: u32, prec: u32) -> Self {
        let mut result = RBall::from_i64(1, prec);
        let mut base = self.clone();
        let mut e = exp;
        while e > 0 {
            if e & 1 == 1 {
                result = result.mul(&base, prec);
            }
            e >>= 1;
            if e > 0 {
                base = base.square(prec);
            }
        }
        result
    }

    pub fn union(&self, other: &RBall, prec: u32) -> Self {
        if self.is_indeterminate() || other.is_indeterminate() {
            return RBall::indeterminate();
        }
        let lo_a = self.lower(prec);
        let lo_b = other.lower(prec);
        let hi_a = self.upper(prec);
        let hi_b = other.upper(prec);
        let lo = if lo_a < lo_b { lo_a } else { lo_b };
        let hi = if hi_a > hi_b { hi_a } else { hi_b };
        RBall::hull(lo, hi, prec)
    }

    /// True when the two intervals have no common point.
    pub fn disjoint(&self, other: &RBall) -> bool {
        if self.is_indeterminate() || other.is_indeterminate() {
            return false;
        }
        let prec = self.mid.prec().max(other.mid.prec()).max(64);
        let gap = self.sub(other, prec);
        gap.is_nonzero()
    }

    // ---- Special functions (real line only) ----

    /// Gamma on a pole-free interval where monotonicity is certified by
    /// the digamma sign at both endpoints; indeterminate otherwise.
    pub fn gamma(&self, prec: u32) -> Self {
        if self.is_indeterminate() {
            return RBall::indeterminate();
        }
        let lo = self.lower(prec);
        let hi = self.upper(prec);
        if !(lo.is_sign_positive() && !lo.is_zero()) {
            // Left of the origin the interval may straddle a pole.
            return RBall::indeterminate();
        }
        let psi_lo = Float::with_val(prec, lo.digamma_ref());
        let psi_hi = Float::with_val(prec, hi.digamma_ref());
        if psi_lo.is_sign_positive() == psi_hi.is_sign_positive() {
            self.monotone_hull(prec, |x| Float::with_val(prec, x.gamma_ref()))
        } else {
            // The interval spans the minimum of gamma on (0, inf).
            let g_lo = Float::with_val(prec, lo.gamma_ref());
            let g_hi = Float::with_val(prec, hi.gamma_ref());
            let top = if g_lo > g_hi { g_lo } else { g_hi };
            // Global minimum of gamma on the positive axis is above 0.885.
            let bottom = Float::with_val(prec, 0.885);
            RBall::hull(bottom, top, prec)
        }
    }

    /// Riemann zeta, monotone decreasing on (1, inf).
    pub fn zeta(&self, prec: u32) -> Self {
        if self.is_indeterminate() {
            return RBall::indeterminate();
        }
        let lo = self.lower(prec);
        if lo <= 1u32 {
            return RBall::indeterminate();
        }
        self.monotone_hull(prec, |x| Float::with_val(prec, x.zeta_ref()))
    }

    pub fn erf(&self, prec: u32) -> Self {
        self.monotone_hull(prec, |x| Float::with_val(prec, x.erf_ref()))
    }

    pub fn erfc(&self, prec: u32) -> Self {
        self.monotone_hull(prec, |x| Float::with_val(prec, x.erfc_ref()))
    }

    /// Complete elliptic integral K(m) = pi / (2 agm(1, sqrt(1-m))) for
    /// real m in [0, 1), monotone increasing.
    pub fn elliptic_k(&self, prec: u32) -> Self {
        if self.is_indeterminate() {
            return RBall::indeterminate();
        }
        let lo = self.lower(prec);
        let hi = self.upper(prec);
        if lo.is_sign_negative() || hi >= 1u32 {
            return RBall::indeterminate();
        }
        let k_at = |m: &Float| -> Float {
            let one = Float::with_val(prec, 1);
            let t = Float::with_val(prec, &one - m);
            let s = Float::with_val(prec, t.sqrt_ref());
            let a = Float::with_val(prec, one.agm_ref(&s));
            let pi = Float::with_val(prec, Constant::Pi);
            Float::with_val(prec, &pi / &(a * 2u32))
        };
        RBall::hull(k_at(&lo), k_at(&hi), prec)
    }
}

/// A rectangular complex enclosure.
#[derive(Clone, Debug)]
pub struct CBall {
    pub re: RBall,
    pub im: RBall,
}

impl CBall {
    // ---- Constructors ----

    pub fn new(re: RBall, im: RBall) -> Self {
        CBall { re, im }
    }

    pub fn from_rball(re: RBall) -> Self {
        CBall {
            re,
            im: RBall::exact_zero(),
        }
    }

    pub fn exact_zero() -> Self {
        CBall::from_rball(RBall::exact_zero())
    }

    pub fn indeterminate() -> Self {
        CBall {
            re: RBall::indeterminate(),
            im: RBall::indeterminate(),
        }
    }

    pub fn from_qrat(v: &QRat, prec: u32) -> Self {
        CBall::from_rball(RBall::from_qrat(v, prec))
    }

    pub fn from_i64(v: i64, prec: u32) -> Self {
        CBall::from_rball(RBall::from_i64(v, prec))
    }

    pub fn i(prec: u32) -> Self {
        CBall::new(RBall::exact_zero(), RBall::from_i64(1, prec))
    }

    pub fn pi(prec: u32) -> Self {
        CBall::from_rball(RBall::pi(prec))
    }

    // ---- Queries ----

    pub fn is_indeterminate(&self) -> bool {
        self.re.is_indeterminate() || self.im.is_indeterminate()
    }

    pub fn contains_zero(&self) -> bool {
        self.re.contains_zero() && self.im.contains_zero()
    }

    pub fn is_nonzero(&self) -> bool {
        !self.contains_zero()
    }

    /// True when the two boxes share at least one point (or either is
    /// indeterminate).
    pub fn overlaps(&self, other: &CBall) -> bool {
        !(self.re.disjoint(&other.re) || self.im.disjoint(&other.im))
    }

    pub fn may_contain_qrat(&self, q: &QRat) -> bool {
        self.re.may_contain_qrat(q) && self.im.contains_zero()
    }

    pub fn to_f64_pair(&self) -> (f64, f64) {
        (self.re.to_f64(), self.im.to_f64())
    }

    // ---- Arithmetic ----

    pub fn neg(&self) -> Self {
        CBall::new(self.re.neg(), self.im.neg())
    }

    pub fn conj(&self) -> Self {
        CBall::new(self.re.clone(), self.im.neg())
    }

    pub fn add(&self, other: &CBall, prec: u32) -> Self {
        CBall::new(self.re.add(&other.re, prec), self.im.add(&other.im, prec))
    }

    pub fn sub(&self, other: &CBall, prec: u32) -> Self {
        CBall::new(self.re.sub(&other.re, prec), self.im.sub(&other.im, prec))
    }

    pub fn mul(&self, other: &CBall, prec: u32) -> Self {
        let re = self
            .re
            .mul(&other.re, prec)
            .sub(&self.im.mul(&other.im, prec), prec);
        let im = self
            .re
            .mul(&other.im, prec)
            .add(&self.im.mul(&other.re, prec), prec);
        CBall::new(re, im)
    }

    pub fn inv(&self, prec: u32) -> Self {
        // 1/z = conj(z) / |z|^2.
        let norm = self
            .re
            .square(prec)
            .add(&self.im.square(prec), prec);
        if norm.contains_zero() {
            return CBall::indeterminate();
        }
        let inv_norm = norm.inv(prec);
        CBall::new(
            self.re.mul(&inv_norm, prec),
            self.im.neg().mul(&inv_norm, prec),
        )
    }

    pub fn div(&self, other: &CBall, prec: u32) -> Self {
        self.mul(&other.inv(prec), prec)
    }

    pub fn abs_ball(&self, prec: u32) -> RBall {
        if self.im.is_exact_zero() {
            return self.re.abs_ball();
        }
        if self.re.is_exact_zero() {
            return self.im.abs_ball();
        }
        self.re
            .square(prec)
            .add(&self.im.square(prec), prec)
            .sqrt(prec)
    }

    pub fn square(&self, prec: u32) -> Self {
        self.mul(self, prec)
    }

    pub fn pow_i64(&self, exp: i64, prec: u32) -> Self {
        if exp == 0 {
            return CBall::from_i64(1, prec);
        }
        let base = if exp < 0 { self.inv(prec) } else { self.clone() };
        let mut result = CBall::from_i64(1, prec);
        let mut b = base;
        let mut e = exp.unsigned_abs();
        while e > 0 {
            if e & 1 == 1 {
                result = result.mul(&b, prec);
            }
            e >>= 1;
            if e > 0 {
                b = b.square(prec);
            }
        }
        result
    }

    pub fn exp(&self, prec: u32) -> Self {
        let r = self.re.exp(prec);
        if self.im.is_exact_zero() {
            return CBall::from_rball(r);
        }
        let c = self.im.cos(prec);
        let s = self.im.sin(prec);
        CBall::new(r.mul(&c, prec), r.mul(&s, prec))
    }

    /// Argument of the box, indeterminate when the box meets the branch
    /// cut (the closed negative real axis) or the origin.
    pub fn arg(&self, prec: u32) -> RBall {
        if self.is_indeterminate() {
            return RBall::indeterminate();
        }
        if self.im.is_exact_zero() {
            if self.re.is_positive() {
                return RBall::exact_zero();
            }
            if self.re.is_negative() {
                return RBall::pi(prec);
            }
            return RBall::indeterminate();
        }
        if self.re.is_positive() {
            return self.im.div(&self.re, prec).atan(prec);
        }
        let pi_half = {
            let pi = RBall::pi(prec);
            pi.mul(&RBall::from_qrat(&QRat::from((1, 2)), prec), prec)
        };
        if self.im.is_positive() {
            // arg = pi/2 - atan(re / im), valid on the upper half plane.
            let t = self.re.div(&self.im, prec).atan(prec);
            return pi_half.sub(&t, prec);
        }
        if self.im.is_negative() {
            let t = self.re.div(&self.im, prec).atan(prec);
            return pi_half.neg().sub(&t, prec);
        }
        // Box touches the negative real axis with both signs of Im possible.
        RBall::indeterminate()
    }

    /// Principal logarithm.
    pub fn log(&self, prec: u32) -> Self {
        let modulus = self.abs_ball(prec);
        let re = modulus.ln(prec);
        let im = self.arg(prec);
        CBall::new(re, im)
    }

    /// Principal square root via exp(log(z)/2); indeterminate across the cut.
    pub fn sqrt(&self, prec: u32) -> Self {
        if self.im.is_exact_zero() && !self.re.contains_zero() && self.re.is_positive() {
            return CBall::from_rball(self.re.sqrt(prec));
        }
        if self.im.is_exact_zero() && self.re.is_negative() {
            // Principal sqrt of a negative interval is purely imaginary.
            return CBall::new(RBall::exact_zero(), self.re.neg().sqrt(prec));
        }
        let half = CBall::from_qrat(&QRat::from((1, 2)), prec);
        self.log(prec).mul(&half, prec).exp(prec)
    }

    pub fn sin(&self, prec: u32) -> Self {
        if self.im.is_exact_zero() {
            return CBall::from_rball(self.re.sin(prec));
        }
        // sin(x + iy) = sin x cosh y + i cos x sinh y
        let sx = self.re.sin(prec);
        let cx = self.re.cos(prec);
        let shy = self.im.sinh(prec);
        let chy = self.im.cosh(prec);
        CBall::new(sx.mul(&chy, prec), cx.mul(&shy, prec))
    }

    pub fn cos(&self, prec: u32) -> Self {
        if self.im.is_exact_zero() {
            return CBall::from_rball(self.re.cos(prec));
        }
        // cos(x + iy) = cos x cosh y - i sin x sinh y
        let sx = self.re.sin(prec);
        let cx = self.re.cos(prec);
        let shy = self.im.sinh(prec);
        let chy = self.im.cosh(prec);
        CBall::new(cx.mul(&chy, prec), sx.mul(&shy, prec).neg())
    }

    /// atan via the logarithmic representation
    /// atan(z) = (i/2) (log(1 - iz) - log(1 + iz)).
    pub fn atan(&self, prec: u32) -> Self {
        if self.im.is_exact_zero() {
            return CBall::from_rball(self.re.atan(prec));
        }
        let iz = CBall::new(self.im.neg(), self.re.clone());
        let one = CBall::from_i64(1, prec);
        let a = one.sub(&iz, prec).log(prec);
        let b = one.add(&iz, prec).log(prec);
        let diff = a.sub(&b, prec);
        // (i/2) * diff
        let half = RBall::from_qrat(&QRat::from((1, 2)), prec);
        CBall::new(
            diff.im.neg().mul(&half, prec),
            diff.re.mul(&half, prec),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rational_enclosure_contains_value() {
        let x = RBall::from_qrat(&QRat::from((1, 3)), 64);
        assert!(x.may_contain_qrat(&QRat::from((1, 3))));
        assert!(!x.contains_zero());
    }

    #[test]
    fn add_excludes_zero() {
        let a = RBall::from_qrat(&QRat::from((1, 3)), 64);
        let b = RBall::from_qrat(&QRat::from((1, 4)), 64);
        let s = a.add(&b, 64);
        assert!(s.is_positive());
    }

    #[test]
    fn sub_of_equal_contains_zero() {
        let a = RBall::from_qrat(&QRat::from((1, 3)), 64);
        let b = RBall::from_qrat(&QRat::from((1, 3)), 64);
        assert!(a.sub(&b, 64).contains_zero());
    }

    #[test]
    fn inv_through_zero_is_indeterminate() {
        let a = RBall::from_i64(0, 64);
        assert!(a.inv(64).is_indeterminate());
    }

    #[test]
    fn sqrt_two_squares_back() {
        let two = RBall::from_i64(2, 128);
        let r = two.sqrt(128);
        let sq = r.square(128);
        assert!(sq.may_contain_qrat(&QRat::from(2)));
    }

    #[test]
    fn pi_between_3_and_4() {
        let pi = RBall::pi(64);
        assert!(pi.sub(&RBall::from_i64(3, 64), 64).is_positive());
        assert!(pi.sub(&RBall::from_i64(4, 64), 64).is_negative());
    }

    #[test]
    fn complex_mul_i_squared() {
        let i = CBall::i(64);
        let m = i.mul(&i, 64);
        assert!(m.may_contain_qrat(&QRat::from(-1)));
    }

    #[test]
    fn complex_exp_log_roundtrip() {
        let z = CBall::new(RBall::from_i64(1, 128), RBall::from_i64(1, 128));
        let w = z.log(128).exp(128);
        assert!(w.overlaps(&z));
    }

    #[test]
    fn unique_integer_detection() {
        let x = RBall::from_qrat(&QRat::from((10, 7)), 64);
        // 10/7 is about 1.43; the only integer candidate interval is empty.
        assert_eq!(x.unique_integer(), None);
        assert_eq!(x.unique_floor(), Some(QInt::from(1i64)));
    }

    #[test]
    fn arg_of_negative_real_is_pi() {
        let z = CBall::from_i64(-2, 64);
        let a = z.arg(64);
        assert!(a.may_contain_qrat(&QRat::from_f64(std::f64::consts::PI).unwrap())
            || a.sub(&RBall::pi(64), 64).contains_zero());
    }

    #[test]
    fn gamma_of_half_interval() {
        // Gamma(0.5) = sqrt(pi) ~ 1.7724
        let x = RBall::from_qrat(&QRat::from((1, 2)), 64);
        let g = x.gamma(64);
        assert!(!g.is_indeterminate());
        assert!(g.sub(&RBall::from_i64(1, 64), 64).is_positive());
        assert!(g.sub(&RBall::from_i64(2, 64), 64).is_negative());
    }
}
