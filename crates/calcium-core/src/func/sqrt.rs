//! Square roots: inert, no-factor and factoring modes.

use crate::cafactor::FactorOptions;
use crate::ctx::Context;
use crate::elem::Ca;
use crate::ext::FuncHead;
use crate::truth::Truth;

impl Context {
    /// Default square root (factoring mode).
    pub fn sqrt(&mut self, x: &Ca) -> Ca {
        self.sqrt_factor(x)
    }

    /// Always introduce an inert Sqrt extension.
    pub fn sqrt_inert(&mut self, x: &Ca) -> Ca {
        if x.is_special() {
            return self.sqrt_special(x);
        }
        let e = self.ext_function(FuncHead::Sqrt, vec![x.clone()]);
        self.make_gen_element(e)
    }

    /// Exact algebraic square root when the degree stays within
    /// max(2, deg x); otherwise an inert extension in a field that knows
    /// t^2 = x.
    pub fn sqrt_nofactor(&mut self, x: &Ca) -> Ca {
        if x.is_special() {
            return self.sqrt_special(x);
        }
        if let Some(alg) = self.eval_qqbar(x) {
            let deg = alg.degree();
            let limit = self.options.qqbar_deg_limit.max(2 * deg);
            if let Some(r) = alg.sqrt(limit) {
                if r.degree() <= deg.max(2) {
                    return self.from_alg(r);
                }
            }
        }
        // Inert, but merged with the argument so the reduction ideal
        // carries t^2 - x.
        let e = self.ext_function(FuncHead::Sqrt, vec![x.clone()]);
        let y = self.make_gen_element(e);
        let (_, y2) = self.merge_fields(x, &y);
        self.condense(y2)
    }

    /// Factoring mode: extract square factors multiplicatively, recurse,
    /// and reconcile the sign of the composition against the principal
    /// branch by enclosure comparison.
    pub fn sqrt_factor(&mut self, x: &Ca) -> Ca {
        if x.is_special() {
            return self.sqrt_special(x);
        }
        if self.eval_qqbar(x).is_some() {
            // Exact algebraic path, including rationals.
            return self.sqrt_nofactor(x);
        }

        let factors = self.factor_elem(x, &FactorOptions::for_simplification());
        let mut outside = Ca::one();
        let mut inside = Ca::one();
        for (base, exponent) in &factors.items {
            let n = exponent
                .as_rational()
                .filter(|e| e.is_integer())
                .and_then(|e| e.numer().to_i64());
            let Some(n) = n else {
                let p = self.pow(base, exponent);
                inside = self.mul(&inside, &p);
                continue;
            };
            let k = n.div_euclid(2);
            let r = n.rem_euclid(2);
            if k != 0 {
                let p = self.pow_i64_elem(base, k);
                outside = self.mul(&outside, &p);
            }
            if r == 1 {
                inside = self.mul(&inside, base);
            }
        }

        if outside.is_one_repr() {
            return self.sqrt_nofactor(x);
        }

        let root_rest = self.sqrt_nofactor(&inside);
        let candidate = self.mul(&outside, &root_rest);

        // Sign reconciliation: the true principal root is +/- candidate.
        let mut prec = 64u32;
        loop {
            let xb = self.elem_enclosure(x, prec);
            let target = xb.sqrt(prec);
            let cb = self.elem_enclosure(&candidate, prec);
            if !target.is_indeterminate() && !cb.is_indeterminate() {
                let ncb = cb.neg();
                let pos_hit = cb.overlaps(&target);
                let neg_hit = ncb.overlaps(&target);
                match (pos_hit, neg_hit) {
                    (true, false) => return candidate,
                    (false, true) => return self.neg(&candidate),
                    _ => {}
                }
            }
            prec *= 2;
            if prec > self.options.prec_limit {
                // Both signs stayed consistent; keep the inert form.
                return self.sqrt_nofactor(x);
            }
        }
    }

    fn sqrt_special(&mut self, x: &Ca) -> Ca {
        match x {
            Ca::Undefined => Ca::Undefined,
            Ca::Unknown => Ca::Unknown,
            Ca::UnsignedInfinity => Ca::UnsignedInfinity,
            Ca::SignedInfinity(d) => {
                let d = (**d).clone();
                let s = self.sgn(&d);
                if s.is_special() {
                    return Ca::Unknown;
                }
                let r = self.sqrt_nofactor(&s);
                if r.is_finite() {
                    Ca::signed_inf(r)
                } else {
                    Ca::Unknown
                }
            }
            _ => unreachable!(),
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqrt_of_four_is_two() {
        let mut ctx = Context::new();
        let v = ctx.sqrt(&Ca::from_i64(4));
        assert_eq!(v, Ca::from_i64(2));
    }

    #[test]
    fn sqrt_of_two_squares_back() {
        let mut ctx = Context::new();
        let r = ctx.sqrt(&Ca::from_i64(2));
        let sq = ctx.mul(&r, &r);
        assert_eq!(sq, Ca::from_i64(2));
    }

    #[test]
    fn sqrt_of_minus_four_is_two_i() {
        let mut ctx = Context::new();
        let v = ctx.sqrt(&Ca::from_i64(-4));
        let i = ctx.i();
        let expected = ctx.mul_i64(&i, 2);
        assert_eq!(v, expected);
        assert_eq!(ctx.check_equal(&v, &expected), Truth::True);
    }

    #[test]
    fn sqrt_eight_condenses_against_sqrt_two() {
        let mut ctx = Context::new();
        let s8 = ctx.sqrt(&Ca::from_i64(8));
        let s2 = ctx.sqrt(&Ca::from_i64(2));
        let twice = ctx.mul_i64(&s2, 2);
        // Both exact: sqrt(8) - 2 sqrt(2) = 0.
        let diff = ctx.sub(&s8, &twice);
        assert_eq!(ctx.check_is_zero(&diff), Truth::True);
    }

    #[test]
    fn sqrt_special_values() {
        let mut ctx = Context::new();
        assert_eq!(ctx.sqrt(&Ca::undefined()), Ca::Undefined);
        assert_eq!(ctx.sqrt(&Ca::uinf()), Ca::UnsignedInfinity);
        assert_eq!(ctx.sqrt(&Ca::pos_inf()), Ca::pos_inf());
    }

    #[test]
    fn sqrt_factor_extracts_square_of_pi() {
        // sqrt(4 pi^2) = 2 pi
        let mut ctx = Context::new();
        let pi = ctx.pi();
        let sq = ctx.mul(&pi, &pi);
        let v4 = ctx.mul_i64(&sq, 4);
        let r = ctx.sqrt(&v4);
        let expected = ctx.mul_i64(&pi, 2);
        assert_eq!(ctx.check_equal(&r, &expected), Truth::True);
    }
}
