//! Calcium core: exact arithmetic over the complex numbers.
//!
//! A value is a formal element of a finitely generated field
//! Q(a1, ..., an), where each generator is either an exact algebraic
//! number or a symbolic transcendental (pi, exp(x), log(x), ...).
//! Field elements are stored as rational functions in the generators
//! modulo a reduction ideal, arithmetic is closed inside a fixed field,
//! and equality questions that leave a field are answered by a
//! three-valued predicate engine combining rigorous numerical
//! enclosures, algebraic-number fallbacks, and targeted rewriting.

pub mod alg;
pub mod arith;
pub mod ball;
pub mod cafactor;
pub mod check;
pub mod ctx;
pub mod elem;
pub mod ext;
pub mod field;
pub mod func;
pub mod linalg;
pub mod mpoly;
pub mod nf;
pub mod num;
pub mod poly;
pub mod sym;
pub mod truth;

// Re-export key types at crate root for convenience.
pub use ctx::{Context, Options, TrigForm};
pub use elem::Ca;
pub use ext::{ExtRef, FuncHead};
pub use field::FieldRef;
pub use num::{QInt, QRat};
pub use truth::Truth;
