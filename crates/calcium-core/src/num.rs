//! Wrapper types around `rug::Integer` and `rug::Rational` with guaranteed `Hash`.
//!
//! These newtypes ensure interning compatibility: `a == b` implies
//! `hash(a) == hash(b)`, which the extension/field caches rely on.

use rug::integer::Order;
use rug::ops::{DivRounding, Pow};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Hash an integer through its canonical digit string (most significant
/// first) plus its sign, so equal values hash equally no matter how they
/// were computed.
fn hash_integer<H: Hasher>(v: &rug::Integer, state: &mut H) {
    v.to_digits::<u8>(Order::Msf).hash(state);
    v.cmp0().hash(state);
}

/// Owned and by-reference binary operator impls, deferring to `rug`'s
/// incomplete-computation values for the actual arithmetic.
macro_rules! wrapped_binop {
    ($wrapper:ident, $inner:ty, $trait:ident, $method:ident) => {
        impl<'a, 'b> $trait<&'b $wrapper> for &'a $wrapper {
            type Output = $wrapper;
            fn $method(self, rhs: &'b $wrapper) -> $wrapper {
                $wrapper(<$inner>::from($trait::$method(&self.0, &rhs.0)))
            }
        }

        impl $trait for $wrapper {
            type Output = $wrapper;
            fn $method(self, rhs: $wrapper) -> $wrapper {
                $trait::$method(&self, &rhs)
            }
        }
    };
}

macro_rules! wrapped_neg {
    ($wrapper:ident, $inner:ty) => {
        impl<'a> Neg for &'a $wrapper {
            type Output = $wrapper;
            fn neg(self) -> $wrapper {
                $wrapper(<$inner>::from(-&self.0))
            }
        }

        impl Neg for $wrapper {
            type Output = $wrapper;
            fn neg(self) -> $wrapper {
                -&self
            }
        }
    };
}

/// Arbitrary-precision integer wrapper around `rug::Integer`.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct QInt(pub rug::Integer);

impl Hash for QInt {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_integer(&self.0, state);
    }
}

impl fmt::Display for QInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for QInt {
    fn from(val: i64) -> Self {
        QInt(rug::Integer::from(val))
    }
}

impl From<i32> for QInt {
    fn from(val: i32) -> Self {
        QInt(rug::Integer::from(val))
    }
}

impl From<u64> for QInt {
    fn from(val: u64) -> Self {
        QInt(rug::Integer::from(val))
    }
}

impl From<rug::Integer> for QInt {
    fn from(val: rug::Integer) -> Self {
        QInt(val)
    }
}

wrapped_binop!(QInt, rug::Integer, Add, add);
wrapped_binop!(QInt, rug::Integer, Sub, sub);
wrapped_binop!(QInt, rug::Integer, Mul, mul);
wrapped_neg!(QInt, rug::Integer);

impl QInt {
    pub fn zero() -> Self {
        QInt(rug::Integer::from(0))
    }

    pub fn one() -> Self {
        QInt(rug::Integer::from(1))
    }

    pub fn is_zero(&self) -> bool {
        self.0.cmp0() == Ordering::Equal
    }

    pub fn is_one(&self) -> bool {
        self.0 == 1
    }

    pub fn is_negative(&self) -> bool {
        self.0.cmp0() == Ordering::Less
    }

    /// Sign as -1, 0 or 1.
    pub fn sign(&self) -> i32 {
        match self.0.cmp0() {
            Ordering::Less => -1,
            Ordering::Equal => 0,
            Ordering::Greater => 1,
        }
    }

    pub fn abs(&self) -> Self {
        QInt(rug::Integer::from(self.0.abs_ref()))
    }

    /// Nonnegative greatest common divisor.
    pub fn gcd(&self, other: &QInt) -> Self {
        QInt(rug::Integer::from(self.0.gcd_ref(&other.0)))
    }

    pub fn lcm(&self, other: &QInt) -> Self {
        QInt(rug::Integer::from(self.0.lcm_ref(&other.0)))
    }

    /// Exact quotient. Panics when `rhs` does not divide `self`.
    pub fn div_exact(&self, rhs: &QInt) -> Self {
        assert!(!rhs.is_zero(), "QInt division by zero");
        let (q, r) = rug::Integer::from(&self.0).div_rem(rug::Integer::from(&rhs.0));
        assert!(r.cmp0() == Ordering::Equal, "QInt inexact division");
        QInt(q)
    }

    /// Euclidean remainder with nonnegative result.
    pub fn rem_euclid(&self, modulus: &QInt) -> Self {
        assert!(!modulus.is_zero(), "QInt remainder by zero");
        let mut r = rug::Integer::from(&self.0 % &modulus.0);
        if r.cmp0() == Ordering::Less {
            r += rug::Integer::from(modulus.0.abs_ref());
        }
        QInt(r)
    }

    pub fn pow_u32(&self, exp: u32) -> Self {
        QInt(rug::Integer::from(Pow::pow(&self.0, exp)))
    }

    pub fn to_i64(&self) -> Option<i64> {
        self.0.to_i64()
    }

    /// Truncated square root together with an exactness flag.
    pub fn sqrt_exact(&self) -> Option<QInt> {
        if self.is_negative() {
            return None;
        }
        if self.0.is_perfect_square() {
            Some(QInt(rug::Integer::from(self.0.sqrt_ref())))
        } else {
            None
        }
    }

    /// Number of significant bits of |self|.
    pub fn bits(&self) -> u32 {
        self.0.significant_bits()
    }
}

/// Arbitrary-precision rational wrapper around `rug::Rational`.
///
/// `rug::Rational` keeps values in lowest terms with positive
/// denominator, so the representation is canonical by construction.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct QRat(pub rug::Rational);

impl Hash for QRat {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_integer(self.0.numer(), state);
        hash_integer(self.0.denom(), state);
    }
}

impl fmt::Display for QRat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<(i64, i64)> for QRat {
    fn from((num, den): (i64, i64)) -> Self {
        QRat(rug::Rational::from((
            rug::Integer::from(num),
            rug::Integer::from(den),
        )))
    }
}

impl From<i64> for QRat {
    fn from(val: i64) -> Self {
        QRat(rug::Rational::from(val))
    }
}

impl From<rug::Rational> for QRat {
    fn from(val: rug::Rational) -> Self {
        QRat(val)
    }
}

impl From<QInt> for QRat {
    fn from(val: QInt) -> Self {
        QRat(rug::Rational::from(val.0))
    }
}

wrapped_binop!(QRat, rug::Rational, Add, add);
wrapped_binop!(QRat, rug::Rational, Sub, sub);
wrapped_binop!(QRat, rug::Rational, Mul, mul);
wrapped_neg!(QRat, rug::Rational);

// Division carries the zero check, so it stays outside the macro.
impl<'a, 'b> Div<&'b QRat> for &'a QRat {
    type Output = QRat;
    fn div(self, rhs: &'b QRat) -> QRat {
        assert!(rhs.0.cmp0() != Ordering::Equal, "QRat division by zero");
        QRat(rug::Rational::from(&self.0 / &rhs.0))
    }
}

impl Div for QRat {
    type Output = QRat;
    fn div(self, rhs: QRat) -> QRat {
        &self / &rhs
    }
}

impl QRat {
    pub fn zero() -> Self {
        QRat(rug::Rational::from(0))
    }

    pub fn one() -> Self {
        QRat(rug::Rational::from(1))
    }

    pub fn is_zero(&self) -> bool {
        self.0.cmp0() == Ordering::Equal
    }

    pub fn is_one(&self) -> bool {
        self.0 == 1
    }

    pub fn is_negative(&self) -> bool {
        self.0.cmp0() == Ordering::Less
    }

    /// Sign as -1, 0 or 1.
    pub fn sign(&self) -> i32 {
        match self.0.cmp0() {
            Ordering::Less => -1,
            Ordering::Equal => 0,
            Ordering::Greater => 1,
        }
    }

    pub fn numer(&self) -> QInt {
        QInt(rug::Integer::from(self.0.numer()))
    }

    pub fn denom(&self) -> QInt {
        QInt(rug::Integer::from(self.0.denom()))
    }

    pub fn is_integer(&self) -> bool {
        *self.0.denom() == 1
    }

    pub fn to_qint(&self) -> Option<QInt> {
        if self.is_integer() {
            Some(self.numer())
        } else {
            None
        }
    }

    pub fn abs(&self) -> Self {
        QRat(rug::Rational::from(self.0.abs_ref()))
    }

    /// Multiplicative inverse. Panics on zero.
    pub fn inv(&self) -> Self {
        assert!(!self.is_zero(), "QRat inverse of zero");
        QRat(rug::Rational::from(self.0.recip_ref()))
    }

    /// Integer power with signed exponent. Panics for `0^n` with n < 0.
    pub fn pow_i64(&self, exp: i64) -> Self {
        if exp == 0 {
            return QRat::one();
        }
        let base = if exp < 0 { self.inv() } else { self.clone() };
        let e = exp.unsigned_abs();
        let mut result = QRat::one();
        let mut b = base;
        let mut e = e;
        while e > 0 {
            if e & 1 == 1 {
                result = &result * &b;
            }
            e >>= 1;
            if e > 0 {
                b = &b.clone() * &b;
            }
        }
        result
    }

    /// Largest integer not exceeding the value.
    pub fn floor(&self) -> QInt {
        let n = rug::Integer::from(self.0.numer());
        let d = rug::Integer::from(self.0.denom());
        QInt(n.div_floor(d))
    }

    /// Smallest integer not below the value.
    pub fn ceil(&self) -> QInt {
        let n = rug::Integer::from(self.0.numer());
        let d = rug::Integer::from(self.0.denom());
        QInt(n.div_ceil(d))
    }

    /// Exact conversion from an IEEE double. `None` for NaN or infinity.
    pub fn from_f64(val: f64) -> Option<QRat> {
        rug::Rational::from_f64(val).map(QRat)
    }

    pub fn to_f64(&self) -> f64 {
        self.0.to_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of<T: Hash>(val: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        val.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn qint_hash_invariant() {
        let a = QInt::from(42i64);
        let b = QInt::from(42i64);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn qrat_auto_reduces() {
        let a = QRat::from((6, 4));
        let b = QRat::from((3, 2));
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn qrat_floor_ceil() {
        let x = QRat::from((7, 2));
        assert_eq!(x.floor(), QInt::from(3i64));
        assert_eq!(x.ceil(), QInt::from(4i64));
        let y = QRat::from((-7, 2));
        assert_eq!(y.floor(), QInt::from(-4i64));
        assert_eq!(y.ceil(), QInt::from(-3i64));
    }

    #[test]
    fn qrat_pow_negative_exponent() {
        let x = QRat::from((2, 3));
        assert_eq!(x.pow_i64(-2), QRat::from((9, 4)));
    }

    #[test]
    fn qrat_from_f64_exact() {
        assert_eq!(QRat::from_f64(0.5), Some(QRat::from((1, 2))));
        assert_eq!(QRat::from_f64(f64::NAN), None);
        assert_eq!(QRat::from_f64(f64::INFINITY), None);
    }

    #[test]
    fn qint_sqrt_exact() {
        assert_eq!(QInt::from(49i64).sqrt_exact(), Some(QInt::from(7i64)));
        assert_eq!(QInt::from(50i64).sqrt_exact(), None);
        assert_eq!(QInt::from(-4i64).sqrt_exact(), None);
    }
}
