//! Extension objects: the symbolic generators of fields.
//!
//! An extension is either an exact algebraic number or an application of
//! a builtin function head to previously constructed elements. Extension
//! objects are interned in the `Context`; `ExtRef` identity is structural
//! identity.

use crate::alg::Alg;
use crate::ball::CBall;
use crate::elem::Ca;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle to an interned extension. Plain index into the context arena.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Debug, Serialize, Deserialize)]
pub struct ExtRef(pub(crate) u32);

impl fmt::Display for ExtRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ext#{}", self.0)
    }
}

/// Builtin symbolic function heads.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Debug, Serialize, Deserialize)]
pub enum FuncHead {
    Pi,
    Euler,
    Exp,
    Log,
    Pow,
    Sqrt,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sign,
    Abs,
    Re,
    Im,
    Conjugate,
    Arg,
    Floor,
    Ceil,
    Gamma,
    Erf,
    Erfc,
    Erfi,
    RiemannZeta,
    EllipticK,
    EllipticE,
    EllipticPi,
}

impl FuncHead {
    pub fn name(self) -> &'static str {
        match self {
            FuncHead::Pi => "Pi",
            FuncHead::Euler => "Euler",
            FuncHead::Exp => "Exp",
            FuncHead::Log => "Log",
            FuncHead::Pow => "Pow",
            FuncHead::Sqrt => "Sqrt",
            FuncHead::Sin => "Sin",
            FuncHead::Cos => "Cos",
            FuncHead::Tan => "Tan",
            FuncHead::Asin => "Asin",
            FuncHead::Acos => "Acos",
            FuncHead::Atan => "Atan",
            FuncHead::Sign => "Sign",
            FuncHead::Abs => "Abs",
            FuncHead::Re => "Re",
            FuncHead::Im => "Im",
            FuncHead::Conjugate => "Conjugate",
            FuncHead::Arg => "Arg",
            FuncHead::Floor => "Floor",
            FuncHead::Ceil => "Ceil",
            FuncHead::Gamma => "Gamma",
            FuncHead::Erf => "Erf",
            FuncHead::Erfc => "Erfc",
            FuncHead::Erfi => "Erfi",
            FuncHead::RiemannZeta => "RiemannZeta",
            FuncHead::EllipticK => "EllipticK",
            FuncHead::EllipticE => "EllipticE",
            FuncHead::EllipticPi => "EllipticPi",
        }
    }

    /// Small interning integer used by the canonical ordering.
    pub fn order_key(self) -> u32 {
        self as u32
    }
}

impl fmt::Display for FuncHead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The payload of an extension.
#[derive(Clone, Debug)]
pub enum ExtKind {
    /// An exact algebraic number.
    Algebraic(Alg),
    /// A symbolic function applied to element arguments. The arguments
    /// reference strictly earlier extensions, so the extension graph is
    /// a DAG by construction.
    Function { head: FuncHead, args: Vec<Ca> },
}

/// An interned extension together with its cached low-precision
/// enclosure.
#[derive(Clone, Debug)]
pub struct Ext {
    pub kind: ExtKind,
    pub encl: CBall,
}

impl Ext {
    pub fn is_algebraic(&self) -> bool {
        matches!(self.kind, ExtKind::Algebraic(_))
    }

    pub fn as_algebraic(&self) -> Option<&Alg> {
        match &self.kind {
            ExtKind::Algebraic(a) => Some(a),
            ExtKind::Function { .. } => None,
        }
    }

    pub fn as_function(&self) -> Option<(FuncHead, &[Ca])> {
        match &self.kind {
            ExtKind::Algebraic(_) => None,
            ExtKind::Function { head, args } => Some((*head, args.as_slice())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn head_order_keys_are_distinct() {
        let heads = [
            FuncHead::Pi,
            FuncHead::Exp,
            FuncHead::Log,
            FuncHead::Sqrt,
            FuncHead::Gamma,
        ];
        for (i, a) in heads.iter().enumerate() {
            for b in heads.iter().skip(i + 1) {
                assert_ne!(a.order_key(), b.order_key());
            }
        }
    }
}
