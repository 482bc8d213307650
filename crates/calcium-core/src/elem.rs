//! The element type `Ca`.
//!
//! An element is either finite, carrying a field handle and a payload in
//! the representation of that field, or one of the special non-finite
//! values. Condensation keeps the representation canonical: a finite
//! value representable in a smaller field variant is always demoted, so
//! derived equality is representational equality.

use crate::field::FieldRef;
use crate::mpoly::MRatFunc;
use crate::nf::NfElem;
use crate::num::{QInt, QRat};

/// A Calcium element.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Ca {
    /// A rational number; the field is implicitly Q.
    Rational(QRat),
    /// An element of a number field, never itself rational.
    NfElem(FieldRef, NfElem),
    /// An element of a Multi field: a reduced multivariate rational
    /// function of the generators.
    MPolyQ(FieldRef, MRatFunc),
    /// Formally undefined (0/0, oo - oo, ...).
    Undefined,
    /// Not determined within the configured limits.
    Unknown,
    /// The single point at infinity on the Riemann sphere.
    UnsignedInfinity,
    /// Directed infinity: the payload is a finite nonzero element whose
    /// complex sign is the direction.
    SignedInfinity(Box<Ca>),
}

impl Ca {
    // ---- Constructors ----

    pub fn zero() -> Ca {
        Ca::Rational(QRat::zero())
    }

    pub fn one() -> Ca {
        Ca::Rational(QRat::one())
    }

    pub fn neg_one() -> Ca {
        Ca::Rational(QRat::from(-1))
    }

    pub fn from_i64(v: i64) -> Ca {
        Ca::Rational(QRat::from(v))
    }

    pub fn from_u64(v: u64) -> Ca {
        Ca::Rational(QRat::from(QInt::from(v)))
    }

    pub fn from_qint(v: &QInt) -> Ca {
        Ca::Rational(QRat::from(v.clone()))
    }

    pub fn from_qrat(v: &QRat) -> Ca {
        Ca::Rational(v.clone())
    }

    pub fn from_rational(num: i64, den: i64) -> Ca {
        assert!(den != 0, "Ca::from_rational with zero denominator");
        Ca::Rational(QRat::from((num, den)))
    }

    /// Exact conversion from an IEEE double. NaN is rejected; the
    /// infinities map to the signed infinite elements.
    pub fn from_f64(v: f64) -> Option<Ca> {
        if v.is_nan() {
            return None;
        }
        if v.is_infinite() {
            return Some(if v > 0.0 { Ca::pos_inf() } else { Ca::neg_inf() });
        }
        QRat::from_f64(v).map(Ca::Rational)
    }

    pub fn undefined() -> Ca {
        Ca::Undefined
    }

    pub fn unknown() -> Ca {
        Ca::Unknown
    }

    pub fn uinf() -> Ca {
        Ca::UnsignedInfinity
    }

    pub fn pos_inf() -> Ca {
        Ca::SignedInfinity(Box::new(Ca::one()))
    }

    pub fn neg_inf() -> Ca {
        Ca::SignedInfinity(Box::new(Ca::neg_one()))
    }

    /// Directed infinity along `direction` (a finite nonzero element).
    pub fn signed_inf(direction: Ca) -> Ca {
        debug_assert!(direction.is_finite());
        Ca::SignedInfinity(Box::new(direction))
    }

    // ---- Structural queries ----

    /// True for the four non-finite states.
    pub fn is_special(&self) -> bool {
        matches!(
            self,
            Ca::Undefined | Ca::Unknown | Ca::UnsignedInfinity | Ca::SignedInfinity(_)
        )
    }

    pub fn is_finite(&self) -> bool {
        !self.is_special()
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Ca::Undefined)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Ca::Unknown)
    }

    pub fn is_uinf(&self) -> bool {
        matches!(self, Ca::UnsignedInfinity)
    }

    pub fn is_signed_inf(&self) -> bool {
        matches!(self, Ca::SignedInfinity(_))
    }

    pub fn is_any_inf(&self) -> bool {
        self.is_uinf() || self.is_signed_inf()
    }

    /// Direction of a signed infinity.
    pub fn inf_direction(&self) -> Option<&Ca> {
        match self {
            Ca::SignedInfinity(d) => Some(d),
            _ => None,
        }
    }

    /// The field handle of a finite element (`None` for Q means the
    /// rational field itself).
    pub fn field_ref(&self) -> Option<FieldRef> {
        match self {
            Ca::NfElem(k, _) => Some(*k),
            Ca::MPolyQ(k, _) => Some(*k),
            _ => None,
        }
    }

    pub fn as_rational(&self) -> Option<&QRat> {
        match self {
            Ca::Rational(q) => Some(q),
            _ => None,
        }
    }

    pub fn is_zero_repr(&self) -> bool {
        self.as_rational().is_some_and(QRat::is_zero)
    }

    pub fn is_one_repr(&self) -> bool {
        self.as_rational().is_some_and(QRat::is_one)
    }

    /// Representational equality: identical field handle and payload.
    /// Never interprets values; `equal_repr(x, y)` implies semantic
    /// equality but not conversely.
    pub fn equal_repr(&self, other: &Ca) -> bool {
        self == other
    }
}
