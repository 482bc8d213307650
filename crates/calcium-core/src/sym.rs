//! Symbolic-expression serialization, approximate printing, and
//! cross-context transfer.
//!
//! The expression grammar is the minimal structured tree that can
//! describe literals, arithmetic, the builtin function heads, and the
//! special values. `to_sym` expands the element's payload over its
//! generators; `from_sym` rebuilds by evaluating with element
//! arithmetic, so a round trip reproduces the value (not necessarily
//! the identical representation in a fresh context).

use crate::alg::Alg;
use crate::ball::CBall;
use crate::ctx::Context;
use crate::elem::Ca;
use crate::ext::{ExtKind, FuncHead};
use crate::field::Field;
use crate::num::{QInt, QRat};
use crate::poly::Poly;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured symbolic expression for interchange.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SymExpr {
    Integer(QInt),
    Rational { num: QInt, den: QInt },
    Undefined,
    Unknown,
    UnsignedInfinity,
    SignedInfinity(Box<SymExpr>),
    Add(Vec<SymExpr>),
    Mul(Vec<SymExpr>),
    Div(Box<SymExpr>, Box<SymExpr>),
    Pow(Box<SymExpr>, Box<SymExpr>),
    Apply {
        head: FuncHead,
        args: Vec<SymExpr>,
    },
    /// An algebraic number: primitive integer minimal polynomial
    /// (ascending coefficients) and a decimal approximation of the root
    /// precise enough to disambiguate it.
    AlgebraicRoot {
        minpoly: Vec<QInt>,
        approx_re: String,
        approx_im: String,
    },
}

/// Failure to rebuild an element from an expression.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed rational literal")]
    BadRational,
    #[error("malformed minimal polynomial")]
    BadMinPoly,
    #[error("approximation does not isolate a root of the polynomial")]
    AmbiguousRoot,
    #[error("wrong number of arguments for {head}")]
    BadArity { head: FuncHead },
    #[error("invalid numeric literal")]
    BadNumeral,
}

impl Context {
    // ---- Serialization ----

    pub fn to_symbolic_expression(&mut self, x: &Ca) -> SymExpr {
        match x {
            Ca::Undefined => SymExpr::Undefined,
            Ca::Unknown => SymExpr::Unknown,
            Ca::UnsignedInfinity => SymExpr::UnsignedInfinity,
            Ca::SignedInfinity(d) => {
                let d = (**d).clone();
                SymExpr::SignedInfinity(Box::new(self.to_symbolic_expression(&d)))
            }
            Ca::Rational(q) => rational_expr(q),
            Ca::NfElem(k, e) => {
                let Field::Algebraic { ext, .. } = self.field(*k) else {
                    panic!("NfElem in non-algebraic field");
                };
                let ext = *ext;
                let gen = self.ext_to_sym(ext);
                poly_expr(e.poly(), &gen)
            }
            Ca::MPolyQ(k, f) => {
                let gens = self.field(*k).gens();
                let gen_exprs: Vec<SymExpr> =
                    gens.iter().map(|g| self.ext_to_sym(*g)).collect();
                let num = mpoly_expr(f.numer(), &gen_exprs);
                if f.denom().is_one() {
                    num
                } else {
                    let den = mpoly_expr(f.denom(), &gen_exprs);
                    SymExpr::Div(Box::new(num), Box::new(den))
                }
            }
        }
    }

    fn ext_to_sym(&mut self, e: crate::ext::ExtRef) -> SymExpr {
        match self.ext(e).kind.clone() {
            ExtKind::Algebraic(alg) => algebraic_expr(&alg),
            ExtKind::Function { head, args } => {
                let args = args
                    .iter()
                    .map(|a| self.to_symbolic_expression(a))
                    .collect();
                SymExpr::Apply { head, args }
            }
        }
    }

    /// Rebuild an element from an expression (best effort).
    pub fn from_symbolic_expression(&mut self, e: &SymExpr) -> Result<Ca, ParseError> {
        match e {
            SymExpr::Integer(n) => Ok(Ca::from_qint(n)),
            SymExpr::Rational { num, den } => {
                if den.is_zero() {
                    return Err(ParseError::BadRational);
                }
                Ok(Ca::Rational(
                    &QRat::from(num.clone()) / &QRat::from(den.clone()),
                ))
            }
            SymExpr::Undefined => Ok(Ca::Undefined),
            SymExpr::Unknown => Ok(Ca::Unknown),
            SymExpr::UnsignedInfinity => Ok(Ca::UnsignedInfinity),
            SymExpr::SignedInfinity(d) => {
                let dir = self.from_symbolic_expression(d)?;
                Ok(Ca::signed_inf(dir))
            }
            SymExpr::Add(terms) => {
                let mut acc = Ca::zero();
                for t in terms {
                    let v = self.from_symbolic_expression(t)?;
                    acc = self.add(&acc, &v);
                }
                Ok(acc)
            }
            SymExpr::Mul(factors) => {
                let mut acc = Ca::one();
                for t in factors {
                    let v = self.from_symbolic_expression(t)?;
                    acc = self.mul(&acc, &v);
                }
                Ok(acc)
            }
            SymExpr::Div(a, b) => {
                let x = self.from_symbolic_expression(a)?;
                let y = self.from_symbolic_expression(b)?;
                Ok(self.div(&x, &y))
            }
            SymExpr::Pow(a, b) => {
                let x = self.from_symbolic_expression(a)?;
                let y = self.from_symbolic_expression(b)?;
                Ok(self.pow(&x, &y))
            }
            SymExpr::Apply { head, args } => self.apply_head(*head, args),
            SymExpr::AlgebraicRoot {
                minpoly,
                approx_re,
                approx_im,
            } => {
                let poly = Poly::from_qint_coeffs(minpoly);
                if poly.degree().is_none_or(|d| d == 0) {
                    return Err(ParseError::BadMinPoly);
                }
                let re = parse_float(approx_re)?;
                let im = parse_float(approx_im)?;
                let target = CBall::new(
                    crate::ball::RBall::from_float(re, 256),
                    crate::ball::RBall::from_float(im, 256),
                );
                let alg = select_serialized_root(&poly, &target)
                    .ok_or(ParseError::AmbiguousRoot)?;
                Ok(self.from_alg(alg))
            }
        }
    }

    fn apply_head(&mut self, head: FuncHead, args: &[SymExpr]) -> Result<Ca, ParseError> {
        let expect = |n: usize| -> Result<(), ParseError> {
            if args.len() == n {
                Ok(())
            } else {
                Err(ParseError::BadArity { head })
            }
        };
        let one_arg = |ctx: &mut Context, args: &[SymExpr]| -> Result<Ca, ParseError> {
            ctx.from_symbolic_expression(&args[0])
        };
        match head {
            FuncHead::Pi => {
                expect(0)?;
                Ok(self.pi())
            }
            FuncHead::Euler => {
                expect(0)?;
                Ok(self.euler())
            }
            FuncHead::Exp => {
                expect(1)?;
                let a = one_arg(self, args)?;
                Ok(self.exp(&a))
            }
            FuncHead::Log => {
                expect(1)?;
                let a = one_arg(self, args)?;
                Ok(self.log(&a))
            }
            FuncHead::Pow => {
                expect(2)?;
                let a = self.from_symbolic_expression(&args[0])?;
                let b = self.from_symbolic_expression(&args[1])?;
                Ok(self.pow(&a, &b))
            }
            FuncHead::Sqrt => {
                expect(1)?;
                let a = one_arg(self, args)?;
                Ok(self.sqrt(&a))
            }
            FuncHead::Sin => {
                expect(1)?;
                let a = one_arg(self, args)?;
                Ok(self.sin(&a))
            }
            FuncHead::Cos => {
                expect(1)?;
                let a = one_arg(self, args)?;
                Ok(self.cos(&a))
            }
            FuncHead::Tan => {
                expect(1)?;
                let a = one_arg(self, args)?;
                Ok(self.tan(&a))
            }
            FuncHead::Asin => {
                expect(1)?;
                let a = one_arg(self, args)?;
                Ok(self.asin(&a))
            }
            FuncHead::Acos => {
                expect(1)?;
                let a = one_arg(self, args)?;
                Ok(self.acos(&a))
            }
            FuncHead::Atan => {
                expect(1)?;
                let a = one_arg(self, args)?;
                Ok(self.atan(&a))
            }
            FuncHead::Sign => {
                expect(1)?;
                let a = one_arg(self, args)?;
                Ok(self.sgn(&a))
            }
            FuncHead::Abs => {
                expect(1)?;
                let a = one_arg(self, args)?;
                Ok(self.abs(&a))
            }
            FuncHead::Re => {
                expect(1)?;
                let a = one_arg(self, args)?;
                Ok(self.re(&a))
            }
            FuncHead::Im => {
                expect(1)?;
                let a = one_arg(self, args)?;
                Ok(self.im(&a))
            }
            FuncHead::Conjugate => {
                expect(1)?;
                let a = one_arg(self, args)?;
                Ok(self.conj(&a))
            }
            FuncHead::Arg => {
                expect(1)?;
                let a = one_arg(self, args)?;
                Ok(self.arg(&a))
            }
            FuncHead::Floor => {
                expect(1)?;
                let a = one_arg(self, args)?;
                Ok(self.floor(&a))
            }
            FuncHead::Ceil => {
                expect(1)?;
                let a = one_arg(self, args)?;
                Ok(self.ceil(&a))
            }
            FuncHead::Gamma => {
                expect(1)?;
                let a = one_arg(self, args)?;
                Ok(self.gamma(&a))
            }
            FuncHead::Erf => {
                expect(1)?;
                let a = one_arg(self, args)?;
                Ok(self.erf(&a))
            }
            FuncHead::Erfc => {
                expect(1)?;
                let a = one_arg(self, args)?;
                Ok(self.erfc(&a))
            }
            FuncHead::Erfi => {
                expect(1)?;
                let a = one_arg(self, args)?;
                Ok(self.erfi(&a))
            }
            FuncHead::RiemannZeta => {
                expect(1)?;
                let a = one_arg(self, args)?;
                Ok(self.riemann_zeta(&a))
            }
            FuncHead::EllipticK => {
                expect(1)?;
                let a = one_arg(self, args)?;
                Ok(self.elliptic_k(&a))
            }
            FuncHead::EllipticE => {
                expect(1)?;
                let a = one_arg(self, args)?;
                Ok(self.elliptic_e(&a))
            }
            FuncHead::EllipticPi => {
                expect(2)?;
                let a = self.from_symbolic_expression(&args[0])?;
                let b = self.from_symbolic_expression(&args[1])?;
                Ok(self.elliptic_pi(&a, &b))
            }
        }
    }

    /// Move an element into another context by serializing and
    /// re-parsing. A self-produced expression always parses; a failure
    /// degrades to `Unknown`.
    pub fn transfer_from(&mut self, source: &mut Context, x: &Ca) -> Ca {
        let expr = source.to_symbolic_expression(x);
        self.from_symbolic_expression(&expr)
            .unwrap_or(Ca::Unknown)
    }

    // ---- Printing ----

    /// Decimal approximation with `digits` significant digits. Refines
    /// the enclosure until the digits are certified, or reports the
    /// value with the widest verified accuracy once the precision limit
    /// is hit.
    pub fn to_decimal_string(&mut self, x: &Ca, digits: usize) -> String {
        match x {
            Ca::Undefined => return "Undefined".to_string(),
            Ca::Unknown => return "Unknown".to_string(),
            Ca::UnsignedInfinity => return "UnsignedInfinity".to_string(),
            Ca::SignedInfinity(_) => return "SignedInfinity".to_string(),
            _ => {}
        }
        // Need roughly 3.33 bits per digit, plus slack.
        let needed = (digits as u32 + 2).saturating_mul(4).max(64);
        let b = self.to_ball_accurate_parts(x, needed);
        if b.is_indeterminate() {
            return "?".to_string();
        }
        let re = format_float(b.re.mid(), digits);
        if b.im.contains_zero() && b.im.mid().is_zero() {
            re
        } else {
            let im = format_float(b.im.mid(), digits);
            format!("{re} {} {}*I", if b.im.mid().is_sign_negative() { "-" } else { "+" },
                im.trim_start_matches('-'))
        }
    }

    /// Human-readable rendering: exact payload plus a short numerical
    /// approximation (unless `PRINT_EXACT_ONLY` is set).
    pub fn repr(&mut self, x: &Ca) -> String {
        let digits = self.options.print_digits;
        let exact_only = self.options.print_flags & crate::ctx::PRINT_EXACT_ONLY != 0;
        let approx = |ctx: &mut Context, x: &Ca| -> String {
            if exact_only {
                String::new()
            } else {
                format!(" (~ {})", ctx.to_decimal_string(x, digits))
            }
        };
        match x {
            Ca::Rational(q) => format!("{q}"),
            Ca::NfElem(_, e) => {
                let payload = format!("{}", e.poly());
                format!("{payload}{}", approx(self, x))
            }
            Ca::MPolyQ(_, f) => {
                let payload = if f.denom().is_one() {
                    format!("{}", f.numer())
                } else {
                    format!("({}) / ({})", f.numer(), f.denom())
                };
                format!("{payload}{}", approx(self, x))
            }
            other => self.to_decimal_string(other, digits),
        }
    }
}

fn rational_expr(q: &QRat) -> SymExpr {
    if q.is_integer() {
        SymExpr::Integer(q.numer())
    } else {
        SymExpr::Rational {
            num: q.numer(),
            den: q.denom(),
        }
    }
}

fn algebraic_expr(alg: &Alg) -> SymExpr {
    // Enough digits to disambiguate the root: the isolation is certified
    // at construction, so a generous fixed precision suffices.
    let b = alg.refined(192);
    SymExpr::AlgebraicRoot {
        minpoly: alg.minpoly().int_coeffs(),
        approx_re: format_float(b.re.mid(), 40),
        approx_im: format_float(b.im.mid(), 40),
    }
}

fn poly_expr(p: &Poly, gen: &SymExpr) -> SymExpr {
    let mut terms = Vec::new();
    for (i, c) in p.coeffs().iter().enumerate() {
        if c.is_zero() {
            continue;
        }
        let coeff = rational_expr(c);
        let term = if i == 0 {
            coeff
        } else {
            let pow = if i == 1 {
                gen.clone()
            } else {
                SymExpr::Pow(
                    Box::new(gen.clone()),
                    Box::new(SymExpr::Integer(QInt::from(i as u64))),
                )
            };
            SymExpr::Mul(vec![coeff, pow])
        };
        terms.push(term);
    }
    match terms.len() {
        0 => SymExpr::Integer(QInt::zero()),
        1 => terms.pop().unwrap(),
        _ => SymExpr::Add(terms),
    }
}

fn mpoly_expr(p: &crate::mpoly::MPoly, gens: &[SymExpr]) -> SymExpr {
    let mut terms = Vec::new();
    for (exps, c) in p.terms() {
        let mut factors = vec![SymExpr::Integer(c.clone())];
        for (i, &e) in exps.iter().enumerate() {
            match e {
                0 => {}
                1 => factors.push(gens[i].clone()),
                _ => factors.push(SymExpr::Pow(
                    Box::new(gens[i].clone()),
                    Box::new(SymExpr::Integer(QInt::from(e as u64))),
                )),
            }
        }
        terms.push(if factors.len() == 1 {
            factors.pop().unwrap()
        } else {
            SymExpr::Mul(factors)
        });
    }
    match terms.len() {
        0 => SymExpr::Integer(QInt::zero()),
        1 => terms.pop().unwrap(),
        _ => SymExpr::Add(terms),
    }
}

fn parse_float(s: &str) -> Result<rug::Float, ParseError> {
    rug::Float::parse(s)
        .map(|incomplete| rug::Float::with_val(256, incomplete))
        .map_err(|_| ParseError::BadNumeral)
}

fn format_float(f: &rug::Float, digits: usize) -> String {
    if f.is_zero() {
        return "0".to_string();
    }
    let s = f.to_string_radix(10, Some(digits.max(1)));
    s
}

/// Pick the root of the (not necessarily irreducible) polynomial nearest
/// to the serialized approximation, requiring the choice to be
/// unambiguous.
fn select_serialized_root(poly: &Poly, target: &CBall) -> Option<Alg> {
    let facs = crate::poly::factor(poly);
    let mut hits = Vec::new();
    for (f, _) in &facs.factors {
        for root in crate::poly::isolate_roots(f, 128) {
            if root.overlaps(target) {
                hits.push((f.clone(), root));
            }
        }
    }
    if hits.len() != 1 {
        return None;
    }
    let (f, root) = hits.pop().unwrap();
    // Rational roots come back as plain rationals through from_alg.
    Some(make_alg(f, root))
}

fn make_alg(minpoly: Poly, encl: CBall) -> Alg {
    // The box came out of root isolation on this very polynomial, so
    // the isolation invariant carries over.
    Alg::from_isolating_box(minpoly, encl)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::truth::Truth;

    #[test]
    fn roundtrip_rational() {
        let mut ctx = Context::new();
        let x = Ca::from_rational(-22, 7);
        let e = ctx.to_symbolic_expression(&x);
        let y = ctx.from_symbolic_expression(&e).unwrap();
        assert_eq!(x, y);
    }

    #[test]
    fn roundtrip_sqrt2() {
        let mut ctx = Context::new();
        let x = ctx.sqrt(&Ca::from_i64(2));
        let e = ctx.to_symbolic_expression(&x);
        let y = ctx.from_symbolic_expression(&e).unwrap();
        assert_eq!(ctx.check_equal(&x, &y), Truth::True);
    }

    #[test]
    fn roundtrip_pi_expression() {
        let mut ctx = Context::new();
        let pi = ctx.pi();
        let x = {
            let sq = ctx.mul(&pi, &pi);
            ctx.add_i64(&sq, -3)
        };
        let e = ctx.to_symbolic_expression(&x);
        let y = ctx.from_symbolic_expression(&e).unwrap();
        assert_eq!(ctx.check_equal(&x, &y), Truth::True);
    }

    #[test]
    fn transfer_between_contexts() {
        let mut a = Context::new();
        let mut b = Context::new();
        let pi_a = a.pi();
        let x = a.add_i64(&pi_a, 1);
        let y = b.transfer_from(&mut a, &x);
        let back = a.transfer_from(&mut b, &y);
        assert_eq!(a.check_equal(&x, &back), Truth::True);
    }

    #[test]
    fn serde_json_roundtrip() {
        let mut ctx = Context::new();
        let pi = ctx.pi();
        let x = ctx.mul_i64(&pi, 2);
        let e = ctx.to_symbolic_expression(&x);
        let json = serde_json::to_string(&e).unwrap();
        let back: SymExpr = serde_json::from_str(&json).unwrap();
        assert_eq!(e, back);
        let y = ctx.from_symbolic_expression(&back).unwrap();
        assert_eq!(ctx.check_equal(&x, &y), Truth::True);
    }

    #[test]
    fn decimal_string_of_third() {
        let mut ctx = Context::new();
        let s = ctx.to_decimal_string(&Ca::from_rational(1, 3), 10);
        assert!(s.starts_with("3.333333333e-1") || s.starts_with("0.333333333") || s.contains("333333333"));
    }

    #[test]
    fn specials_serialize() {
        let mut ctx = Context::new();
        for v in [Ca::undefined(), Ca::uinf(), Ca::pos_inf()] {
            let e = ctx.to_symbolic_expression(&v);
            let back = ctx.from_symbolic_expression(&e).unwrap();
            assert_eq!(v, back);
        }
    }
}
