//! Field objects.
//!
//! A field is Q, a number field Q(alpha) with alpha an interned
//! algebraic extension, or a Multi field: an ordered tuple of extensions
//! together with a reduction ideal in the corresponding multivariate
//! polynomial ring over Z. Fields are interned in the `Context` and
//! compared by handle identity.

use crate::ext::ExtRef;
use crate::mpoly::MPoly;
use crate::poly::Poly;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle to an interned field.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Debug, Serialize, Deserialize)]
pub struct FieldRef(pub(crate) u32);

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field#{}", self.0)
    }
}

/// An interned field description.
#[derive(Clone, Debug)]
pub enum Field {
    /// The rational numbers.
    Rational,
    /// A number field Q(alpha). The monic minimal polynomial is cached
    /// for element arithmetic.
    Algebraic { ext: ExtRef, monic: Poly },
    /// A multivariate field with one variable per generator and a
    /// reduction ideal applied after multiplicative operations.
    Multi { gens: Vec<ExtRef>, ideal: Vec<MPoly> },
}

impl Field {
    /// Generators in canonical order (empty for Q).
    pub fn gens(&self) -> Vec<ExtRef> {
        match self {
            Field::Rational => vec![],
            Field::Algebraic { ext, .. } => vec![*ext],
            Field::Multi { gens, .. } => gens.clone(),
        }
    }

    pub fn nvars(&self) -> usize {
        match self {
            Field::Rational => 0,
            Field::Algebraic { .. } => 1,
            Field::Multi { gens, .. } => gens.len(),
        }
    }

    pub fn ideal(&self) -> &[MPoly] {
        match self {
            Field::Multi { ideal, .. } => ideal,
            _ => &[],
        }
    }

    pub fn is_rational(&self) -> bool {
        matches!(self, Field::Rational)
    }
}
