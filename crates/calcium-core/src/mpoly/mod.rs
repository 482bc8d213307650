//! Sparse multivariate polynomials over Z with lexicographic term order.
//!
//! Terms are kept sorted in strictly descending lex order with nonzero
//! coefficients; every exponent vector has length `nvars`. This is the
//! coefficient ring underlying field elements: an element of a generated
//! field Q(a1, ..., ak) is a quotient of two of these (see `ratfunc`).

pub mod gcd;
pub mod ratfunc;

pub use gcd::mpoly_gcd;
pub use ratfunc::MRatFunc;

use crate::ball::CBall;
use crate::num::QInt;
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// Exponent vector. Arity above 8 spills to the heap.
pub type Exps = SmallVec<[u32; 8]>;

/// Lexicographic comparison of exponent vectors of equal arity.
pub fn cmp_exps(a: &Exps, b: &Exps) -> Ordering {
    debug_assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(b.iter()) {
        match x.cmp(y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

fn exp_divides(a: &Exps, b: &Exps) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| x <= y)
}

fn exp_add(a: &Exps, b: &Exps) -> Exps {
    a.iter().zip(b.iter()).map(|(x, y)| x + y).collect()
}

fn exp_sub(a: &Exps, b: &Exps) -> Exps {
    a.iter().zip(b.iter()).map(|(x, y)| x - y).collect()
}

/// A multivariate polynomial over Z.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MPoly {
    nvars: usize,
    terms: Vec<(Exps, QInt)>,
}

impl MPoly {
    // ---- Constructors ----

    pub fn zero(nvars: usize) -> Self {
        MPoly {
            nvars,
            terms: Vec::new(),
        }
    }

    pub fn constant(nvars: usize, c: QInt) -> Self {
        if c.is_zero() {
            return Self::zero(nvars);
        }
        MPoly {
            nvars,
            terms: vec![(Exps::from_elem(0, nvars), c)],
        }
    }

    pub fn one(nvars: usize) -> Self {
        Self::constant(nvars, QInt::one())
    }

    /// The i-th generator as a polynomial.
    pub fn gen(nvars: usize, i: usize) -> Self {
        assert!(i < nvars, "MPoly::gen index out of range");
        let mut e = Exps::from_elem(0, nvars);
        e[i] = 1;
        MPoly {
            nvars,
            terms: vec![(e, QInt::one())],
        }
    }

    pub fn monomial(nvars: usize, exps: Exps, c: QInt) -> Self {
        assert_eq!(exps.len(), nvars);
        if c.is_zero() {
            return Self::zero(nvars);
        }
        MPoly {
            nvars,
            terms: vec![(exps, c)],
        }
    }

    /// Normalize a term list: merge equal monomials, drop zeros, sort
    /// descending.
    pub fn from_terms(nvars: usize, terms: Vec<(Exps, QInt)>) -> Self {
        let mut map: BTreeMap<Exps, QInt> = BTreeMap::new();
        for (e, c) in terms {
            assert_eq!(e.len(), nvars);
            let entry = map.entry(e).or_insert_with(QInt::zero);
            *entry = &*entry + &c;
        }
        let mut out: Vec<(Exps, QInt)> = map
            .into_iter()
            .filter(|(_, c)| !c.is_zero())
            .collect();
        out.reverse();
        MPoly { nvars, terms: out }
    }

    // ---- Queries ----

    pub fn nvars(&self) -> usize {
        self.nvars
    }

    pub fn terms(&self) -> &[(Exps, QInt)] {
        &self.terms
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn is_one(&self) -> bool {
        self.as_constant().is_some_and(|c| c.is_one())
    }

    /// `Some(c)` when the polynomial is the constant c (including zero).
    pub fn as_constant(&self) -> Option<QInt> {
        match self.terms.len() {
            0 => Some(QInt::zero()),
            1 if self.terms[0].0.iter().all(|&e| e == 0) => Some(self.terms[0].1.clone()),
            _ => None,
        }
    }

    pub fn leading_term(&self) -> Option<&(Exps, QInt)> {
        self.terms.first()
    }

    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    pub fn vars_used(&self) -> Vec<bool> {
        let mut used = vec![false; self.nvars];
        for (e, _) in &self.terms {
            for (i, &x) in e.iter().enumerate() {
                if x > 0 {
                    used[i] = true;
                }
            }
        }
        used
    }

    /// Index of the only variable appearing, when there is exactly one.
    pub fn univariate_var(&self) -> Option<usize> {
        let used = self.vars_used();
        let mut found = None;
        for (i, u) in used.into_iter().enumerate() {
            if u {
                if found.is_some() {
                    return None;
                }
                found = Some(i);
            }
        }
        found
    }

    pub fn degree_in(&self, var: usize) -> u32 {
        self.terms.iter().map(|(e, _)| e[var]).max().unwrap_or(0)
    }

    pub fn min_degree_in(&self, var: usize) -> u32 {
        self.terms.iter().map(|(e, _)| e[var]).min().unwrap_or(0)
    }

    /// Integer coefficient vector in ascending degree, valid only when at
    /// most `var` is used.
    pub fn to_univariate_int(&self, var: usize) -> Vec<QInt> {
        let deg = self.degree_in(var) as usize;
        let mut out = vec![QInt::zero(); deg + 1];
        for (e, c) in &self.terms {
            debug_assert!(e
                .iter()
                .enumerate()
                .all(|(i, &x)| i == var || x == 0));
            out[e[var] as usize] = c.clone();
        }
        out
    }

    pub fn from_univariate_int(coeffs: &[QInt], var: usize, nvars: usize) -> Self {
        let terms = coeffs
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_zero())
            .map(|(i, c)| {
                let mut e = Exps::from_elem(0, nvars);
                e[var] = i as u32;
                (e, c.clone())
            })
            .collect();
        Self::from_terms(nvars, terms)
    }

    /// Rename variables: old index i maps to `map[i]` in an arity
    /// `new_nvars` ring. Distinct used variables must stay distinct.
    pub fn compose_vars(&self, map: &[usize], new_nvars: usize) -> MPoly {
        assert_eq!(map.len(), self.nvars);
        let terms = self
            .terms
            .iter()
            .map(|(e, c)| {
                let mut ne = Exps::from_elem(0, new_nvars);
                for (i, &x) in e.iter().enumerate() {
                    if x > 0 {
                        ne[map[i]] += x;
                    }
                }
                (ne, c.clone())
            })
            .collect();
        Self::from_terms(new_nvars, terms)
    }

    // ---- Arithmetic ----

    pub fn neg(&self) -> MPoly {
        MPoly {
            nvars: self.nvars,
            terms: self
                .terms
                .iter()
                .map(|(e, c)| (e.clone(), -c))
                .collect(),
        }
    }

    pub fn add(&self, other: &MPoly) -> MPoly {
        assert_eq!(self.nvars, other.nvars);
        let mut terms = self.terms.clone();
        terms.extend(other.terms.iter().cloned());
        Self::from_terms(self.nvars, terms)
    }

    pub fn sub(&self, other: &MPoly) -> MPoly {
        self.add(&other.neg())
    }

    pub fn mul(&self, other: &MPoly) -> MPoly {
        assert_eq!(self.nvars, other.nvars);
        if self.is_zero() || other.is_zero() {
            return Self::zero(self.nvars);
        }
        let mut map: BTreeMap<Exps, QInt> = BTreeMap::new();
        for (ea, ca) in &self.terms {
            for (eb, cb) in &other.terms {
                let e = exp_add(ea, eb);
                let entry = map.entry(e).or_insert_with(QInt::zero);
                *entry = &*entry + &(ca * cb);
            }
        }
        let mut out: Vec<(Exps, QInt)> = map
            .into_iter()
            .filter(|(_, c)| !c.is_zero())
            .collect();
        out.reverse();
        MPoly {
            nvars: self.nvars,
            terms: out,
        }
    }

    pub fn mul_scalar(&self, c: &QInt) -> MPoly {
        if c.is_zero() {
            return Self::zero(self.nvars);
        }
        MPoly {
            nvars: self.nvars,
            terms: self
                .terms
                .iter()
                .map(|(e, a)| (e.clone(), a * c))
                .collect(),
        }
    }

    /// Divide every coefficient by `c` exactly.
    pub fn divexact_scalar(&self, c: &QInt) -> MPoly {
        MPoly {
            nvars: self.nvars,
            terms: self
                .terms
                .iter()
                .map(|(e, a)| (e.clone(), a.div_exact(c)))
                .collect(),
        }
    }

    pub fn mul_monomial(&self, exps: &Exps, c: &QInt) -> MPoly {
        if c.is_zero() {
            return Self::zero(self.nvars);
        }
        MPoly {
            nvars: self.nvars,
            terms: self
                .terms
                .iter()
                .map(|(e, a)| (exp_add(e, exps), a * c))
                .collect(),
        }
    }

    pub fn pow_u32(&self, exp: u32) -> MPoly {
        let mut result = Self::one(self.nvars);
        let mut base = self.clone();
        let mut e = exp;
        while e > 0 {
            if e & 1 == 1 {
                result = result.mul(&base);
            }
            e >>= 1;
            if e > 0 {
                base = base.mul(&base);
            }
        }
        result
    }

    /// Positive gcd of all coefficients; zero for the zero polynomial.
    pub fn content(&self) -> QInt {
        let mut g = QInt::zero();
        for (_, c) in &self.terms {
            g = g.gcd(c);
        }
        g
    }

    pub fn primitive(&self) -> MPoly {
        let c = self.content();
        if c.is_zero() || c.is_one() {
            return self.clone();
        }
        self.divexact_scalar(&c)
    }

    /// Exact division by `d`; panics when the division does not come out
    /// even (which would indicate a broken invariant upstream).
    pub fn div_exact(&self, d: &MPoly) -> MPoly {
        assert_eq!(self.nvars, d.nvars);
        assert!(!d.is_zero(), "MPoly::div_exact by zero");
        let (dle, dlc) = d.leading_term().unwrap().clone();
        let mut r = self.clone();
        let mut q_terms: Vec<(Exps, QInt)> = Vec::new();
        while let Some((rle, rlc)) = r.leading_term().cloned() {
            assert!(
                exp_divides(&dle, &rle),
                "MPoly::div_exact: leading monomial not divisible"
            );
            let qe = exp_sub(&rle, &dle);
            let qc = rlc.div_exact(&dlc);
            r = r.sub(&d.mul_monomial(&qe, &qc));
            q_terms.push((qe, qc));
        }
        Self::from_terms(self.nvars, q_terms)
    }

    /// Reduce modulo a set of polynomials, denominator-free: returns
    /// `(r, scale)` with `scale * self = r  (mod ideal)` and `scale` a
    /// positive integer.
    pub fn quasi_reduce(&self, ideal: &[MPoly]) -> (MPoly, QInt) {
        let mut r = self.clone();
        let mut scale = QInt::one();
        if ideal.is_empty() {
            return (r, scale);
        }
        'outer: loop {
            for idx in 0..r.terms.len() {
                let (te, tc) = r.terms[idx].clone();
                for g in ideal {
                    let Some((ge, gc)) = g.leading_term() else {
                        continue;
                    };
                    if !exp_divides(ge, &te) {
                        continue;
                    }
                    let d = tc.gcd(gc);
                    let mult_r = gc.div_exact(&d);
                    let mult_g = tc.div_exact(&d);
                    // Sign convention: keep the scale positive.
                    let (mult_r, mult_g) = if mult_r.is_negative() {
                        (-&mult_r, -&mult_g)
                    } else {
                        (mult_r, mult_g)
                    };
                    let shift = exp_sub(&te, ge);
                    r = r
                        .mul_scalar(&mult_r)
                        .sub(&g.mul_monomial(&shift, &mult_g));
                    scale = scale * mult_r;
                    continue 'outer;
                }
            }
            break;
        }
        (r, scale)
    }

    /// Evaluate on complex enclosures of the generators.
    pub fn eval_cball(&self, xs: &[CBall], prec: u32) -> CBall {
        assert_eq!(xs.len(), self.nvars);
        let mut acc = CBall::exact_zero();
        for (e, c) in &self.terms {
            let mut term = CBall::from_qrat(&crate::num::QRat::from(c.clone()), prec);
            for (i, &x) in e.iter().enumerate() {
                if x > 0 {
                    term = term.mul(&xs[i].pow_i64(x as i64, prec), prec);
                }
            }
            acc = acc.add(&term, prec);
        }
        acc
    }

    /// Structural ordering: term count, then exponents, then coefficients.
    pub fn cmp_structural(&self, other: &MPoly) -> Ordering {
        match self.terms.len().cmp(&other.terms.len()) {
            Ordering::Equal => {}
            other => return other,
        }
        for ((ea, _), (eb, _)) in self.terms.iter().zip(other.terms.iter()) {
            match cmp_exps(ea, eb) {
                Ordering::Equal => {}
                other => return other,
            }
        }
        for ((_, ca), (_, cb)) in self.terms.iter().zip(other.terms.iter()) {
            match ca.cmp(cb) {
                Ordering::Equal => {}
                other => return other,
            }
        }
        Ordering::Equal
    }
}

impl fmt::Display for MPoly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }
        let mut first = true;
        for (e, c) in &self.terms {
            let sign = if first {
                if c.is_negative() { "-" } else { "" }
            } else if c.is_negative() {
                " - "
            } else {
                " + "
            };
            first = false;
            let abs = c.abs();
            let mut parts = Vec::new();
            if !abs.is_one() || e.iter().all(|&x| x == 0) {
                parts.push(format!("{abs}"));
            }
            for (i, &x) in e.iter().enumerate() {
                match x {
                    0 => {}
                    1 => parts.push(format!("x{i}")),
                    _ => parts.push(format!("x{i}^{x}")),
                }
            }
            write!(f, "{sign}{}", parts.join("*"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x(n: usize) -> MPoly {
        MPoly::gen(n, 0)
    }

    fn y(n: usize) -> MPoly {
        MPoly::gen(n, 1)
    }

    #[test]
    fn add_cancels() {
        let p = x(2).add(&y(2));
        let q = p.sub(&p);
        assert!(q.is_zero());
    }

    #[test]
    fn mul_binomial() {
        // (x + y)^2 = x^2 + 2xy + y^2
        let p = x(2).add(&y(2));
        let sq = p.mul(&p);
        assert_eq!(sq.num_terms(), 3);
        assert_eq!(sq, p.pow_u32(2));
    }

    #[test]
    fn div_exact_roundtrip() {
        let p = x(2).add(&y(2));
        let q = x(2).sub(&y(2));
        let prod = p.mul(&q);
        assert_eq!(prod.div_exact(&p), q);
        assert_eq!(prod.div_exact(&q), p);
    }

    #[test]
    fn quasi_reduce_square_root_relation() {
        // Reduce x^2 modulo x^2 - 2: expect the constant 2.
        let rel = x(1).pow_u32(2).sub(&MPoly::constant(1, QInt::from(2i64)));
        let (r, scale) = x(1).pow_u32(2).quasi_reduce(&[rel]);
        assert!(scale.is_one());
        assert_eq!(r, MPoly::constant(1, QInt::from(2i64)));
    }

    #[test]
    fn quasi_reduce_with_scale() {
        // Reduce x modulo 2x - 1: 2*x = 1, so scale 2, remainder 1.
        let rel = x(1).mul_scalar(&QInt::from(2i64)).sub(&MPoly::one(1));
        let (r, scale) = x(1).quasi_reduce(&[rel]);
        assert_eq!(scale, QInt::from(2i64));
        assert_eq!(r, MPoly::one(1));
    }

    #[test]
    fn compose_vars_renames() {
        // x0 * x1 in 2 vars -> x1 * x3 in 4 vars
        let p = x(2).mul(&y(2));
        let q = p.compose_vars(&[1, 3], 4);
        assert_eq!(q.degree_in(1), 1);
        assert_eq!(q.degree_in(3), 1);
        assert_eq!(q.degree_in(0), 0);
    }

    #[test]
    fn univariate_extraction() {
        let p = x(3).pow_u32(2).mul_scalar(&QInt::from(3i64));
        assert_eq!(p.univariate_var(), Some(0));
        let coeffs = p.to_univariate_int(0);
        assert_eq!(coeffs.len(), 3);
        assert_eq!(coeffs[2], QInt::from(3i64));
        assert_eq!(MPoly::from_univariate_int(&coeffs, 0, 3), p);
    }
}
