//! Exponential and logarithm.

use crate::ctx::Context;
use crate::elem::Ca;
use crate::ext::FuncHead;
use crate::num::{QInt, QRat};
use crate::truth::Truth;

impl Context {
    pub fn exp(&mut self, x: &Ca) -> Ca {
        if x.is_special() {
            return self.exp_special(x);
        }
        if x.is_zero_repr() {
            return Ca::one();
        }

        // exp(log(z)) = z.
        if let Some(e) = self.is_gen_as_ext(x) {
            if let Some((FuncHead::Log, args)) =
                self.ext(e).as_function().map(|(h, a)| (h, a.to_vec()))
            {
                return args[0].clone();
            }
        }

        // exp(r pi i): a root of unity, evaluated exactly when the degree
        // stays within budget.
        if let Some(r) = self.as_rational_multiple_of_pi_i(x) {
            if let (Some(p), Some(q)) = (r.numer().to_i64(), r.denom().to_i64()) {
                let order = 2 * q.unsigned_abs();
                if crate::poly::cyclotomic::euler_phi(order as usize)
                    <= self.options.qqbar_deg_limit
                {
                    let alg = crate::alg::Alg::root_of_unity(p, q);
                    return self.from_alg(alg);
                }
            }
        }

        // Split off monomials that are a single logarithm generator to
        // the first power: exp(sum a_j log z_j + S) = prod z_j^(a_j) exp(S).
        if let Some(res) = self.exp_extract_logs(x) {
            return res;
        }

        let e = self.ext_function(FuncHead::Exp, vec![x.clone()]);
        self.make_gen_element(e)
    }

    fn exp_special(&mut self, x: &Ca) -> Ca {
        match x {
            Ca::Undefined | Ca::UnsignedInfinity => Ca::Undefined,
            Ca::Unknown => Ca::Unknown,
            Ca::SignedInfinity(d) => {
                let d = (**d).clone();
                match self.check_equal(&d, &Ca::one()) {
                    Truth::True => return Ca::pos_inf(),
                    Truth::False => {}
                    Truth::Unknown => return Ca::Unknown,
                }
                match self.check_equal(&d, &Ca::neg_one()) {
                    Truth::True => Ca::zero(),
                    _ => Ca::Unknown,
                }
            }
            _ => unreachable!(),
        }
    }

    /// The log-extraction rule of the exponential: pick out numerator
    /// monomials that are exactly one Log generator to the first power
    /// over a constant denominator.
    fn exp_extract_logs(&mut self, x: &Ca) -> Option<Ca> {
        let Ca::MPolyQ(k, f) = x else {
            return None;
        };
        let den = f.denom().as_constant()?;
        let logs = self.log_generators(x);
        if logs.is_empty() {
            return None;
        }
        let nvars = self.field(*k).nvars();

        let mut extracted: Vec<(Ca, QRat)> = Vec::new();
        let mut rest = crate::mpoly::MPoly::zero(nvars);
        'terms: for (exps, c) in f.numer().terms() {
            for (j, _, z) in &logs {
                let pure_linear = exps
                    .iter()
                    .enumerate()
                    .all(|(i, &e)| if i == *j { e == 1 } else { e == 0 });
                if pure_linear {
                    let a = &QRat::from(c.clone()) / &QRat::from(den.clone());
                    extracted.push((z.clone(), a));
                    continue 'terms;
                }
            }
            rest = rest.add(&crate::mpoly::MPoly::monomial(
                nvars,
                exps.clone(),
                c.clone(),
            ));
        }
        if extracted.is_empty() {
            return None;
        }

        let rest_elem = {
            let fr = crate::mpoly::MRatFunc::new(
                rest,
                crate::mpoly::MPoly::constant(nvars, den),
            );
            self.condense(Ca::MPolyQ(*k, fr))
        };
        let mut result = self.exp(&rest_elem);
        for (z, a) in extracted {
            let expo = Ca::Rational(a);
            let p = self.pow(&z, &expo);
            result = self.mul(&result, &p);
        }
        Some(result)
    }

    pub fn log(&mut self, x: &Ca) -> Ca {
        if x.is_special() {
            return match x {
                Ca::Undefined => Ca::Undefined,
                Ca::Unknown => Ca::Unknown,
                Ca::UnsignedInfinity | Ca::SignedInfinity(_) => Ca::pos_inf(),
                _ => unreachable!(),
            };
        }
        match self.check_is_zero(x) {
            Truth::True => return Ca::neg_inf(),
            Truth::Unknown => return Ca::Unknown,
            Truth::False => {}
        }
        if x.is_one_repr() {
            return Ca::zero();
        }

        if let Some(e) = self.is_gen_as_ext(x) {
            if let Some((head, args)) =
                self.ext(e).as_function().map(|(h, a)| (h, a.to_vec()))
            {
                match head {
                    FuncHead::Exp => return self.log_exp(&args[0]),
                    FuncHead::Pow => {
                        if self.check_is_zero(&args[0]) == Truth::False {
                            return self.log_pow(&args[0], &args[1]);
                        }
                    }
                    FuncHead::Sqrt => {
                        if self.check_is_zero(&args[0]) == Truth::False {
                            let half = Ca::Rational(QRat::from((1, 2)));
                            return self.log_pow(&args[0], &half);
                        }
                    }
                    _ => {}
                }
            }
        }

        if let Some(alg) = self.eval_qqbar(x) {
            // Roots of unity: log(e^(i pi p/q)) = (p/q) pi i.
            if let Some((p, q)) = alg.log_pi_i() {
                let pi_i = self.pi_i();
                return self.mul_qrat_elem(&pi_i, &QRat::from((p, q)));
            }
            // Negative real argument: log(-r) = log(r) + pi i.
            if alg.is_real() && alg.sgn_re() < 0 {
                let pos = self.neg(x);
                let l = self.log(&pos);
                let pi_i = self.pi_i();
                return self.add(&l, &pi_i);
            }
        }

        let e = self.ext_function(FuncHead::Log, vec![x.clone()]);
        self.make_gen_element(e)
    }

    /// pi * i as an element of Q(i, pi).
    pub fn pi_i(&mut self) -> Ca {
        let pi = self.pi();
        let i = self.i();
        self.mul(&pi, &i)
    }

    /// log(exp(z)): subtract the 2 pi i multiple that moves the value to
    /// the principal branch.
    fn log_exp(&mut self, z: &Ca) -> Ca {
        match self.branch_index(z) {
            Some(t) if t.is_zero() => z.clone(),
            Some(t) => {
                let pi_i = self.pi_i();
                let shift = self.mul_qrat_elem(&pi_i, &QRat::from(QInt::from(2i64) * t));
                self.sub(z, &shift)
            }
            None => {
                let inner = self.clone_exp_of(z);
                let e = self.ext_function(FuncHead::Log, vec![inner]);
                self.make_gen_element(e)
            }
        }
    }

    fn clone_exp_of(&mut self, z: &Ca) -> Ca {
        let e = self.ext_function(FuncHead::Exp, vec![z.clone()]);
        self.make_gen_element(e)
    }

    /// log(z^a) = a log z - 2 pi i k on the principal branch.
    fn log_pow(&mut self, z: &Ca, a: &Ca) -> Ca {
        let lz = self.log(z);
        let u = self.mul(&lz, a);
        match self.branch_index(&u) {
            Some(t) if t.is_zero() => u,
            Some(t) => {
                let pi_i = self.pi_i();
                let shift = self.mul_qrat_elem(&pi_i, &QRat::from(QInt::from(2i64) * t));
                self.sub(&u, &shift)
            }
            None => {
                // Cannot settle the branch: keep the inert logarithm.
                let base = self.pow(z, a);
                let e = self.ext_function(FuncHead::Log, vec![base]);
                self.make_gen_element(e)
            }
        }
    }

    /// k = ceil((Im(u)/pi - 1)/2), the branch shift count, decided by
    /// enclosure refinement.
    fn branch_index(&mut self, u: &Ca) -> Option<QInt> {
        let mut prec = 64u32;
        loop {
            let b = self.elem_enclosure(u, prec);
            if b.is_indeterminate() {
                return None;
            }
            let pi = crate::ball::RBall::pi(prec);
            let t = b.im.div(&pi, prec);
            // ceil((t - 1)/2)
            let half = crate::ball::RBall::from_qrat(&QRat::from((1, 2)), prec);
            let shifted = t
                .sub(&crate::ball::RBall::from_i64(1, prec), prec)
                .mul(&half, prec);
            if let Some(n) = shifted.neg().unique_floor() {
                return Some(-&n);
            }
            prec *= 2;
            if prec > self.options.prec_limit {
                return None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exp_zero_is_one() {
        let mut ctx = Context::new();
        assert_eq!(ctx.exp(&Ca::zero()), Ca::one());
    }

    #[test]
    fn exp_log_roundtrip_on_generator() {
        let mut ctx = Context::new();
        let pi = ctx.pi();
        let l = ctx.log(&pi);
        let e = ctx.exp(&l);
        assert!(e.equal_repr(&pi));
    }

    #[test]
    fn log_one_is_zero() {
        let mut ctx = Context::new();
        assert_eq!(ctx.log(&Ca::one()), Ca::zero());
    }

    #[test]
    fn log_zero_is_negative_infinity() {
        let mut ctx = Context::new();
        assert_eq!(ctx.log(&Ca::zero()), Ca::neg_inf());
    }

    #[test]
    fn exp_pi_i_is_minus_one() {
        let mut ctx = Context::new();
        let pi_i = ctx.pi_i();
        let v = ctx.exp(&pi_i);
        assert_eq!(v, Ca::neg_one());
    }

    #[test]
    fn exp_half_pi_i_is_i() {
        let mut ctx = Context::new();
        let pi_i = ctx.pi_i();
        let half = ctx.mul_qrat_elem(&pi_i, &QRat::from((1, 2)));
        let v = ctx.exp(&half);
        let i = ctx.i();
        assert!(v.equal_repr(&i));
    }

    #[test]
    fn log_of_i_is_half_pi_i() {
        let mut ctx = Context::new();
        let i = ctx.i();
        let l = ctx.log(&i);
        let pi_i = ctx.pi_i();
        let expected = ctx.mul_qrat_elem(&pi_i, &QRat::from((1, 2)));
        assert_eq!(l, expected);
    }

    #[test]
    fn log_of_negative_rational() {
        // log(-3) = log(3) + pi i
        let mut ctx = Context::new();
        let v = ctx.log(&Ca::from_i64(-3));
        let three = Ca::from_i64(3);
        let l3 = ctx.log(&three);
        let pi_i = ctx.pi_i();
        let expected = ctx.add(&l3, &pi_i);
        assert_eq!(v, expected);
    }

    #[test]
    fn exp_sum_with_log_extracts_base() {
        // exp(log(pi) * 2) = pi^2
        let mut ctx = Context::new();
        let pi = ctx.pi();
        let l = ctx.log(&pi);
        let twice = ctx.mul_i64(&l, 2);
        let v = ctx.exp(&twice);
        let sq = ctx.mul(&pi, &pi);
        assert_eq!(v, sq);
    }
}
