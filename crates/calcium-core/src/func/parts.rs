//! Real/imaginary parts, conjugation, absolute value, signs, floor and
//! ceiling.

use crate::ctx::Context;
use crate::elem::Ca;
use crate::ext::FuncHead;
use crate::num::QRat;
use crate::truth::Truth;
use rustc_hash::FxHashMap;

impl Context {
    pub fn conj(&mut self, x: &Ca) -> Ca {
        match x {
            Ca::Undefined => Ca::Undefined,
            Ca::Unknown => Ca::Unknown,
            Ca::UnsignedInfinity => Ca::UnsignedInfinity,
            Ca::SignedInfinity(d) => {
                let d = (**d).clone();
                let cd = self.conj(&d);
                if cd.is_finite() {
                    Ca::signed_inf(cd)
                } else {
                    Ca::Unknown
                }
            }
            Ca::Rational(_) => x.clone(),
            _ => {
                if self.elem_known_real(x) {
                    return x.clone();
                }
                if let Some(alg) = self.eval_qqbar(x) {
                    return self.from_alg(alg.conj());
                }
                if let Some(res) = self.conj_by_substitution(x) {
                    return res;
                }
                let e = self.ext_function(FuncHead::Conjugate, vec![x.clone()]);
                self.make_gen_element(e)
            }
        }
    }

    /// Conjugation by substituting i -> -i when every other generator is
    /// known real.
    fn conj_by_substitution(&mut self, x: &Ca) -> Option<Ca> {
        let k = x.field_ref()?;
        let gens = self.field(k).gens();
        let mut subs = FxHashMap::default();
        for g in gens {
            if g == self.ext_i() {
                let ni = self.neg_i();
                subs.insert(g, ni);
            } else if !self.ext_known_real(g) {
                return None;
            }
        }
        Some(self.eval_payload_subst(x, &subs))
    }

    pub fn re(&mut self, x: &Ca) -> Ca {
        if x.is_special() {
            return self.parts_special(x);
        }
        if let Ca::Rational(_) = x {
            return x.clone();
        }
        if self.elem_known_real(x) {
            return x.clone();
        }
        // Re x = (x + conj x)/2 whenever conjugation resolves.
        let c = self.conj_resolved(x);
        if let Some(c) = c {
            let s = self.add(x, &c);
            return self.mul_qrat_elem(&s, &QRat::from((1, 2)));
        }
        let e = self.ext_function(FuncHead::Re, vec![x.clone()]);
        self.make_gen_element(e)
    }

    pub fn im(&mut self, x: &Ca) -> Ca {
        if x.is_special() {
            return self.parts_special(x);
        }
        if let Ca::Rational(_) = x {
            return Ca::zero();
        }
        if self.elem_known_real(x) {
            return Ca::zero();
        }
        // Im x = (x - conj x) / (2i).
        let c = self.conj_resolved(x);
        if let Some(c) = c {
            let d = self.sub(x, &c);
            let i = self.i();
            let two_i = self.mul_i64(&i, 2);
            return self.div(&d, &two_i);
        }
        let e = self.ext_function(FuncHead::Im, vec![x.clone()]);
        self.make_gen_element(e)
    }

    /// Conjugate only when it has a closed form (no inert extension).
    fn conj_resolved(&mut self, x: &Ca) -> Option<Ca> {
        if self.elem_known_real(x) {
            return Some(x.clone());
        }
        if let Some(alg) = self.eval_qqbar(x) {
            return Some(self.from_alg(alg.conj()));
        }
        self.conj_by_substitution(x)
    }

    pub fn abs(&mut self, x: &Ca) -> Ca {
        match x {
            Ca::Undefined => Ca::Undefined,
            Ca::Unknown => Ca::Unknown,
            Ca::UnsignedInfinity | Ca::SignedInfinity(_) => Ca::pos_inf(),
            Ca::Rational(q) => Ca::Rational(q.abs()),
            _ => {
                if let Some(alg) = self.eval_qqbar(x) {
                    if let Some(a) = alg.abs(self.options.qqbar_deg_limit) {
                        return self.from_alg(a);
                    }
                }
                if self.elem_known_real(x) {
                    match self.real_sign_by_enclosure(x) {
                        Some(s) if s >= 0 => return x.clone(),
                        Some(_) => return self.neg(x),
                        None => {}
                    }
                }
                let e = self.ext_function(FuncHead::Abs, vec![x.clone()]);
                self.make_gen_element(e)
            }
        }
    }

    /// Complex sign x/|x| (0 at the origin).
    pub fn sgn(&mut self, x: &Ca) -> Ca {
        match x {
            Ca::Undefined => Ca::Undefined,
            Ca::Unknown => Ca::Unknown,
            Ca::UnsignedInfinity => Ca::Undefined,
            Ca::SignedInfinity(d) => (**d).clone(),
            Ca::Rational(q) => Ca::Rational(QRat::from(q.sign() as i64)),
            _ => {
                if let Some(alg) = self.eval_qqbar(x) {
                    if alg.is_zero() {
                        return Ca::zero();
                    }
                    if alg.is_real() {
                        return Ca::from_i64(alg.sgn_re() as i64);
                    }
                    if let Some(a) = alg.abs(self.options.qqbar_deg_limit) {
                        if let Some(s) =
                            alg.div(&a, self.options.qqbar_deg_limit)
                        {
                            return self.from_alg(s);
                        }
                    }
                }
                if self.elem_known_real(x) {
                    if let Some(s) = self.real_sign_by_enclosure(x) {
                        return Ca::from_i64(s as i64);
                    }
                }
                match self.check_is_zero(x) {
                    Truth::True => return Ca::zero(),
                    Truth::Unknown => return Ca::Unknown,
                    Truth::False => {}
                }
                let e = self.ext_function(FuncHead::Sign, vec![x.clone()]);
                self.make_gen_element(e)
            }
        }
    }

    /// Real sign (csgn): +1 in the right half plane or on the positive
    /// imaginary axis, -1 mirrored, 0 at the origin.
    pub fn csgn(&mut self, x: &Ca) -> Ca {
        if x.is_special() {
            return match x {
                Ca::Unknown => Ca::Unknown,
                Ca::SignedInfinity(d) => {
                    let d = (**d).clone();
                    self.csgn(&d)
                }
                _ => Ca::Undefined,
            };
        }
        if let Ca::Rational(q) = x {
            return Ca::from_i64(q.sign() as i64);
        }
        if let Some(alg) = self.eval_qqbar(x) {
            return Ca::from_i64(alg.csgn() as i64);
        }
        match self.check_is_zero(x) {
            Truth::True => return Ca::zero(),
            Truth::Unknown => return Ca::Unknown,
            Truth::False => {}
        }
        let mut prec = 64u32;
        while prec <= self.options.prec_limit {
            let b = self.elem_enclosure(x, prec);
            if b.re.is_positive() {
                return Ca::one();
            }
            if b.re.is_negative() {
                return Ca::neg_one();
            }
            if b.re.is_exact_zero() || b.re.contains_zero() {
                // Could sit on the imaginary axis; decide by Im if Re is
                // provably zero (exactly-real zero intervals only).
                if b.re.is_exact_zero() {
                    if b.im.is_positive() {
                        return Ca::one();
                    }
                    if b.im.is_negative() {
                        return Ca::neg_one();
                    }
                }
            }
            prec *= 2;
        }
        Ca::Unknown
    }

    pub fn arg(&mut self, x: &Ca) -> Ca {
        match x {
            Ca::Undefined | Ca::UnsignedInfinity => Ca::Undefined,
            Ca::Unknown => Ca::Unknown,
            Ca::SignedInfinity(d) => {
                let d = (**d).clone();
                self.arg(&d)
            }
            Ca::Rational(q) => {
                if q.is_negative() {
                    self.pi()
                } else {
                    Ca::zero()
                }
            }
            _ => {
                // arg x = Im(log(sgn x)); for the resolvable sign cases
                // the logarithm collapses to a rational multiple of pi.
                let s = self.sgn(x);
                if s.is_special() {
                    return Ca::Unknown;
                }
                if let Some(alg) = self.eval_qqbar(&s) {
                    if let Some((p, q)) = alg.log_pi_i() {
                        let pi = self.pi();
                        return self.mul_qrat_elem(&pi, &QRat::from((p, q)));
                    }
                }
                let l = self.log(&s);
                self.im(&l)
            }
        }
    }

    pub fn floor(&mut self, x: &Ca) -> Ca {
        if x.is_special() {
            return self.floor_ceil_special(x);
        }
        if let Ca::Rational(q) = x {
            return Ca::from_qint(&q.floor());
        }
        if let Some(alg) = self.eval_qqbar(x) {
            if alg.is_real() {
                return Ca::from_qint(&alg.floor());
            }
            let re = alg.add(&alg.conj(), 1 << 16).map(|s| s.mul_qrat(&QRat::from((1, 2))));
            if let Some(re) = re {
                return Ca::from_qint(&re.floor());
            }
        }
        if let Some(n) = self.integer_near(x, false) {
            return n;
        }
        let e = self.ext_function(FuncHead::Floor, vec![x.clone()]);
        self.make_gen_element(e)
    }

    pub fn ceil(&mut self, x: &Ca) -> Ca {
        if x.is_special() {
            return self.floor_ceil_special(x);
        }
        if let Ca::Rational(q) = x {
            return Ca::from_qint(&q.ceil());
        }
        if let Some(alg) = self.eval_qqbar(x) {
            if alg.is_real() {
                return Ca::from_qint(&alg.ceil());
            }
        }
        if let Some(n) = self.integer_near(x, true) {
            return n;
        }
        let e = self.ext_function(FuncHead::Ceil, vec![x.clone()]);
        self.make_gen_element(e)
    }

    /// Enclosure-driven floor (or ceiling) of the real part, with an
    /// exact equality check when the value hugs an integer boundary.
    fn integer_near(&mut self, x: &Ca, ceiling: bool) -> Option<Ca> {
        let mut prec = 64u32;
        while prec <= self.options.prec_limit {
            let b = self.elem_enclosure(x, prec);
            if b.is_indeterminate() {
                return None;
            }
            let re = if ceiling { b.re.neg() } else { b.re.clone() };
            if let Some(n) = re.unique_floor() {
                let result = if ceiling { -&n } else { n };
                return Some(Ca::from_qint(&result));
            }
            // The interval may straddle an integer; test that integer
            // exactly.
            if let Some(n) = b.re.unique_integer() {
                let cand = Ca::from_qint(&n);
                let im_zero = b.im.contains_zero();
                if im_zero && self.check_equal(x, &cand) == Truth::True {
                    return Some(cand);
                }
            }
            prec *= 2;
        }
        None
    }

    fn parts_special(&mut self, x: &Ca) -> Ca {
        match x {
            Ca::Unknown => Ca::Unknown,
            _ => Ca::Undefined,
        }
    }

    fn floor_ceil_special(&mut self, x: &Ca) -> Ca {
        match x {
            Ca::Unknown => Ca::Unknown,
            Ca::SignedInfinity(d) => {
                let d = (**d).clone();
                match self.check_equal(&d, &Ca::one()) {
                    Truth::True => return Ca::pos_inf(),
                    Truth::Unknown => return Ca::Unknown,
                    Truth::False => {}
                }
                match self.check_equal(&d, &Ca::neg_one()) {
                    Truth::True => Ca::neg_inf(),
                    _ => Ca::Unknown,
                }
            }
            _ => Ca::Undefined,
        }
    }

    /// Certain sign of a known-real element by enclosure refinement;
    /// `None` when the budget runs out without a decision.
    pub(crate) fn real_sign_by_enclosure(&mut self, x: &Ca) -> Option<i32> {
        let mut prec = 64u32;
        while prec <= self.options.prec_limit {
            let b = self.elem_enclosure(x, prec);
            if b.re.is_positive() {
                return Some(1);
            }
            if b.re.is_negative() {
                return Some(-1);
            }
            if let Truth::True = self.check_is_zero(x) {
                return Some(0);
            }
            prec *= 2;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parts_of_gaussian_rational() {
        let mut ctx = Context::new();
        // 3 + 4i
        let i = ctx.i();
        let four_i = ctx.mul_i64(&i, 4);
        let z = ctx.add_i64(&four_i, 3);
        assert_eq!(ctx.re(&z), Ca::from_i64(3));
        assert_eq!(ctx.im(&z), Ca::from_i64(4));
        let c = ctx.conj(&z);
        let neg_four_i = ctx.mul_i64(&i, -4);
        let expected = ctx.add_i64(&neg_four_i, 3);
        assert_eq!(c, expected);
    }

    #[test]
    fn abs_of_negative_rational() {
        let mut ctx = Context::new();
        assert_eq!(ctx.abs(&Ca::from_i64(-7)), Ca::from_i64(7));
        assert_eq!(ctx.abs(&Ca::neg_inf()), Ca::pos_inf());
    }

    #[test]
    fn abs_of_three_four_i() {
        let mut ctx = Context::new();
        let i = ctx.i();
        let four_i = ctx.mul_i64(&i, 4);
        let z = ctx.add_i64(&four_i, 3);
        assert_eq!(ctx.abs(&z), Ca::from_i64(5));
    }

    #[test]
    fn sgn_of_reals_and_imaginaries() {
        let mut ctx = Context::new();
        assert_eq!(ctx.sgn(&Ca::from_i64(-3)), Ca::neg_one());
        assert_eq!(ctx.sgn(&Ca::zero()), Ca::zero());
        let i = ctx.i();
        let minus_2i = ctx.mul_i64(&i, -2);
        let s = ctx.sgn(&minus_2i);
        let ni = ctx.neg_i();
        assert_eq!(s, ni);
    }

    #[test]
    fn csgn_values() {
        let mut ctx = Context::new();
        assert_eq!(ctx.csgn(&Ca::from_i64(5)), Ca::one());
        assert_eq!(ctx.csgn(&Ca::from_i64(-5)), Ca::neg_one());
        assert_eq!(ctx.csgn(&Ca::zero()), Ca::zero());
        let i = ctx.i();
        assert_eq!(ctx.csgn(&i), Ca::one());
        let ni = ctx.neg_i();
        assert_eq!(ctx.csgn(&ni), Ca::neg_one());
    }

    #[test]
    fn re_of_pi_is_pi() {
        let mut ctx = Context::new();
        let pi = ctx.pi();
        assert_eq!(ctx.re(&pi), pi);
        assert_eq!(ctx.im(&pi), Ca::zero());
    }

    #[test]
    fn floor_of_pi() {
        let mut ctx = Context::new();
        let pi = ctx.pi();
        assert_eq!(ctx.floor(&pi), Ca::from_i64(3));
        assert_eq!(ctx.ceil(&pi), Ca::from_i64(4));
    }

    #[test]
    fn arg_of_negative_real() {
        let mut ctx = Context::new();
        let a = ctx.arg(&Ca::from_i64(-2));
        let pi = ctx.pi();
        assert_eq!(a, pi);
        assert_eq!(ctx.arg(&Ca::from_i64(9)), Ca::zero());
    }

    #[test]
    fn arg_of_i() {
        let mut ctx = Context::new();
        let i = ctx.i();
        let a = ctx.arg(&i);
        let pi = ctx.pi();
        let expected = ctx.mul_qrat_elem(&pi, &QRat::from((1, 2)));
        assert_eq!(a, expected);
    }
}
