//! Multiplicative factorization of elements.
//!
//! `factor_elem` splits an element into a list of (base, exponent)
//! pairs whose product reproduces it representationally. Users: square
//! root simplification, generic simplification, and zero testing of
//! products.

use crate::ctx::Context;
use crate::elem::Ca;
use crate::mpoly::{MPoly, MRatFunc};
use crate::num::{QInt, QRat};
use crate::poly::{factor as poly_factor, Poly};

/// How hard to factor the rational content.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZzMode {
    None,
    /// Trial division up to the smooth limit.
    Smooth,
    /// Smooth pass plus primality certification of the remainder.
    Full,
}

/// How hard to factor the polynomial content.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PolyMode {
    None,
    /// Extract rational and monomial content only.
    Content,
    /// Content plus squarefree split of univariate parts.
    Squarefree,
    /// Content plus full univariate irreducible factorization.
    Full,
}

#[derive(Clone, Copy, Debug)]
pub struct FactorOptions {
    pub zz: ZzMode,
    pub poly: PolyMode,
}

impl FactorOptions {
    /// Profile used by sqrt and generic simplification.
    pub fn for_simplification() -> Self {
        FactorOptions {
            zz: ZzMode::Smooth,
            poly: PolyMode::Full,
        }
    }

    /// Profile used by the zero-test cascade.
    pub fn for_zero_testing() -> Self {
        FactorOptions {
            zz: ZzMode::None,
            poly: PolyMode::Full,
        }
    }
}

/// A multiplicative decomposition: the product of base^exponent over all
/// items equals the original element.
#[derive(Clone, Debug)]
pub struct CaFactor {
    pub items: Vec<(Ca, Ca)>,
}

impl CaFactor {
    fn single(x: &Ca) -> Self {
        CaFactor {
            items: vec![(x.clone(), Ca::one())],
        }
    }

    fn push(&mut self, base: Ca, exp: i64) {
        if exp != 0 {
            self.items.push((base, Ca::from_i64(exp)));
        }
    }

    /// Multiply the factorization back together.
    pub fn expand(&self, ctx: &mut Context) -> Ca {
        let mut acc = Ca::one();
        for (base, exp) in &self.items {
            let p = ctx.pow(base, exp);
            acc = ctx.mul(&acc, &p);
        }
        acc
    }
}

impl Context {
    pub fn factor_elem(&mut self, x: &Ca, opts: &FactorOptions) -> CaFactor {
        match x {
            Ca::Rational(q) => self.factor_rational(q, opts),
            Ca::MPolyQ(k, f) => {
                if opts.poly == PolyMode::None {
                    return CaFactor::single(x);
                }
                let k = *k;
                let f = f.clone();
                self.factor_mpolyq(k, &f, opts)
            }
            _ => CaFactor::single(x),
        }
    }

    fn factor_rational(&mut self, q: &QRat, opts: &FactorOptions) -> CaFactor {
        if q.is_zero() || opts.zz == ZzMode::None {
            return CaFactor::single(&Ca::Rational(q.clone()));
        }
        let mut out = CaFactor { items: Vec::new() };
        if q.is_negative() {
            out.push(Ca::neg_one(), 1);
        }
        for (base, exp) in factor_qint(&q.numer().abs(), opts.zz, self.options.smooth_limit)
        {
            out.push(Ca::from_qint(&base), exp as i64);
        }
        for (base, exp) in factor_qint(&q.denom(), opts.zz, self.options.smooth_limit) {
            out.push(Ca::from_qint(&base), -(exp as i64));
        }
        out
    }

    fn factor_mpolyq(
        &mut self,
        k: crate::field::FieldRef,
        f: &MRatFunc,
        opts: &FactorOptions,
    ) -> CaFactor {
        let nvars = f.nvars();
        let mut out = CaFactor { items: Vec::new() };

        // Rational content of the fraction.
        let num_content = f.numer().content();
        let den_content = f.denom().content();
        let content = &QRat::from(num_content.clone()) / &QRat::from(den_content.clone());
        if !content.is_one() {
            let rat = self.factor_rational(&content, opts);
            out.items.extend(rat.items);
        }

        for (part, sign) in [
            (f.numer().divexact_scalar(&num_content), 1i64),
            (f.denom().divexact_scalar(&den_content), -1i64),
        ] {
            if part.is_one() {
                continue;
            }
            // Monomial content: powers of single generators.
            let mut stripped = part.clone();
            for var in 0..nvars {
                let m = stripped.min_degree_in(var);
                if m > 0 {
                    let gens = self.field(k).gens();
                    let g = self.make_gen_element(gens[var]);
                    out.push(g, sign * m as i64);
                    let mut shift = crate::mpoly::Exps::from_elem(0, nvars);
                    shift[var] = m;
                    let mono = MPoly::monomial(nvars, shift, QInt::one());
                    stripped = stripped.div_exact(&mono);
                }
            }
            if stripped.is_one() {
                continue;
            }
            // Univariate part: hand over to the polynomial factorizer.
            if opts.poly != PolyMode::Content {
                if let Some(var) = stripped.univariate_var() {
                    let uni = Poly::from_qint_coeffs(&stripped.to_univariate_int(var));
                    let handled = self.factor_univariate_part(
                        k, var, nvars, &uni, sign, opts, &mut out,
                    );
                    if handled {
                        continue;
                    }
                }
            }
            let base = self.condense(Ca::MPolyQ(
                k,
                MRatFunc::from_mpoly(stripped),
            ));
            out.push(base, sign);
        }

        if out.items.is_empty() {
            return CaFactor::single(&self.condense(Ca::MPolyQ(k, f.clone())));
        }
        out
    }

    fn factor_univariate_part(
        &mut self,
        k: crate::field::FieldRef,
        var: usize,
        nvars: usize,
        uni: &Poly,
        sign: i64,
        opts: &FactorOptions,
        out: &mut CaFactor,
    ) -> bool {
        if uni.degree().is_none_or(|d| d == 0) {
            return false;
        }
        let facs = poly_factor(uni);
        if !facs.content.is_one() {
            let rat = self.factor_rational(&facs.content.clone(), opts);
            if sign > 0 {
                out.items.extend(rat.items);
            } else {
                for (b, e) in rat.items {
                    let ne = self.neg(&e);
                    out.items.push((b, ne));
                }
            }
        }
        for (poly, mult) in &facs.factors {
            let coeffs = poly.int_coeffs();
            let mp = MPoly::from_univariate_int(&coeffs, var, nvars);
            let base = self.condense(Ca::MPolyQ(k, MRatFunc::from_mpoly(mp)));
            out.push(base, sign * *mult as i64);
        }
        true
    }
}

/// Trial-division factorization with a smoothness bound; in `Full` mode
/// a composite remainder is reported as a single base but certified
/// primes are split off.
fn factor_qint(n: &QInt, mode: ZzMode, smooth_limit: u64) -> Vec<(QInt, u32)> {
    let mut out = Vec::new();
    if n.is_one() || n.is_zero() {
        return out;
    }
    let mut rem = n.clone();
    let mut p = 2u64;
    while p <= smooth_limit {
        let pq = QInt::from(p);
        if &pq * &pq > rem {
            break;
        }
        let mut count = 0u32;
        loop {
            let (quot, r) = rug::Integer::from(&rem.0)
                .div_rem(rug::Integer::from(p));
            if r.cmp0() != std::cmp::Ordering::Equal {
                break;
            }
            rem = QInt(quot);
            count += 1;
        }
        if count > 0 {
            out.push((pq, count));
        }
        p = if p == 2 { 3 } else { p + 2 };
    }
    if !rem.is_one() {
        if mode == ZzMode::Full {
            use rug::integer::IsPrime;
            if rem.0.is_probably_prime(40) != IsPrime::No {
                out.push((rem, 1));
                return out;
            }
        }
        out.push((rem, 1));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::truth::Truth;

    #[test]
    fn factor_rational_smooth() {
        let mut ctx = Context::new();
        let opts = FactorOptions::for_simplification();
        let f = ctx.factor_elem(&Ca::from_rational(-12, 35), &opts);
        let back = f.expand(&mut ctx);
        assert_eq!(back, Ca::from_rational(-12, 35));
        // -1, 2^2, 3, 5^-1, 7^-1
        assert!(f.items.len() >= 4);
    }

    #[test]
    fn factor_extracts_monomial_content() {
        let mut ctx = Context::new();
        let pi = ctx.pi();
        let sq = ctx.mul(&pi, &pi);
        let v = ctx.mul_i64(&sq, 4);
        let opts = FactorOptions::for_simplification();
        let f = ctx.factor_elem(&v, &opts);
        let back = f.expand(&mut ctx);
        assert_eq!(ctx.check_equal(&back, &v), Truth::True);
        // Contains pi^2.
        assert!(f
            .items
            .iter()
            .any(|(b, e)| b.equal_repr(&pi) && e.equal_repr(&Ca::from_i64(2))));
    }

    #[test]
    fn factor_univariate_payload() {
        // pi^2 - 1 factors as (pi - 1)(pi + 1).
        let mut ctx = Context::new();
        let pi = ctx.pi();
        let sq = ctx.mul(&pi, &pi);
        let v = ctx.sub_i64(&sq, 1);
        let opts = FactorOptions::for_zero_testing();
        let f = ctx.factor_elem(&v, &opts);
        assert_eq!(f.items.len(), 2);
        let back = f.expand(&mut ctx);
        assert_eq!(ctx.check_equal(&back, &v), Truth::True);
    }
}
