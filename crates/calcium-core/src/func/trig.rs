//! Trigonometric and inverse trigonometric functions.
//!
//! The representation policy follows the `TRIG_FORM` option: direct
//! (inert extensions), exponential (rewrite through exp/log, the
//! default), or half-angle tangent.

use crate::ctx::{Context, TrigForm};
use crate::elem::Ca;
use crate::ext::FuncHead;
use crate::num::QRat;
use crate::truth::Truth;

impl Context {
    pub fn sin(&mut self, x: &Ca) -> Ca {
        self.sin_cos(x).0
    }

    pub fn cos(&mut self, x: &Ca) -> Ca {
        self.sin_cos(x).1
    }

    /// Joint sine and cosine (shares the exponential work).
    pub fn sin_cos(&mut self, x: &Ca) -> (Ca, Ca) {
        if x.is_special() {
            let v = self.trig_special(x);
            return (v.clone(), v);
        }
        if x.is_zero_repr() {
            return (Ca::zero(), Ca::one());
        }
        match self.options.trig_form {
            TrigForm::Direct => {
                let s = self.ext_function(FuncHead::Sin, vec![x.clone()]);
                let c = self.ext_function(FuncHead::Cos, vec![x.clone()]);
                (self.make_gen_element(s), self.make_gen_element(c))
            }
            TrigForm::Exponential => {
                // sin x = (e^(ix) - e^(-ix)) / (2i), cos the even mate.
                let i = self.i();
                let ix = self.mul(&i, x);
                let a = self.exp(&ix);
                let b = self.inv(&a);
                let diff = self.sub(&a, &b);
                let sum = self.add(&a, &b);
                let half = QRat::from((1, 2));
                let neg_half_i = {
                    let h = self.mul_qrat_elem(&i, &half);
                    self.neg(&h)
                };
                let s = self.mul(&diff, &neg_half_i);
                let c = self.mul_qrat_elem(&sum, &half);
                (s, c)
            }
            TrigForm::Tangent => {
                // t = tan(x/2): sin = 2t/(1+t^2), cos = (1-t^2)/(1+t^2).
                let half_x = self.mul_qrat_elem(x, &QRat::from((1, 2)));
                let t = {
                    let e = self.ext_function(FuncHead::Tan, vec![half_x]);
                    self.make_gen_element(e)
                };
                let t2 = self.mul(&t, &t);
                let one_plus = self.add_i64(&t2, 1);
                let one_minus = {
                    let neg = self.neg(&t2);
                    self.add_i64(&neg, 1)
                };
                let two_t = self.mul_i64(&t, 2);
                let s = self.div(&two_t, &one_plus);
                let c = self.div(&one_minus, &one_plus);
                (s, c)
            }
        }
    }

    pub fn tan(&mut self, x: &Ca) -> Ca {
        if x.is_special() {
            return self.trig_special(x);
        }
        let (s, c) = self.sin_cos(x);
        self.div(&s, &c)
    }

    pub fn atan(&mut self, x: &Ca) -> Ca {
        if x.is_special() {
            return self.atan_special(x);
        }
        if x.is_zero_repr() {
            return Ca::zero();
        }
        // Poles at +/- i.
        let i = self.i();
        if self.check_equal(x, &i) == Truth::True {
            return self.pos_i_inf();
        }
        let ni = self.neg_i();
        if self.check_equal(x, &ni) == Truth::True {
            return self.neg_i_inf();
        }
        if self.options.trig_form == TrigForm::Direct {
            let e = self.ext_function(FuncHead::Atan, vec![x.clone()]);
            return self.make_gen_element(e);
        }
        // atan x = -(i/2) log((1 + ix)/(1 - ix)) away from the upper
        // branch cut; the mirrored form handles Im(x) beyond it.
        let ix = self.mul(&i, x);
        let upper_ok = {
            let b = self.elem_enclosure(x, 64);
            let one = crate::ball::RBall::from_i64(1, 64);
            b.im.sub(&one, 64).is_negative() || b.im.is_indeterminate()
        };
        let one = Ca::one();
        let value = if upper_ok {
            let num = self.add(&one, &ix);
            let den = self.sub(&one, &ix);
            let q = self.div(&num, &den);
            let l = self.log(&q);
            let half_i = {
                let h = self.mul_qrat_elem(&i, &QRat::from((1, 2)));
                self.neg(&h)
            };
            self.mul(&l, &half_i)
        } else {
            let num = self.sub(&one, &ix);
            let den = self.add(&one, &ix);
            let q = self.div(&num, &den);
            let l = self.log(&q);
            let half_i = self.mul_qrat_elem(&i, &QRat::from((1, 2)));
            self.mul(&l, &half_i)
        };
        value
    }

    pub fn asin(&mut self, x: &Ca) -> Ca {
        if x.is_special() {
            return self.trig_special(x);
        }
        if x.is_zero_repr() {
            return Ca::zero();
        }
        if self.options.trig_form == TrigForm::Direct {
            let e = self.ext_function(FuncHead::Asin, vec![x.clone()]);
            return self.make_gen_element(e);
        }
        // asin x = -i log(ix + sqrt(1 - x^2)).
        let i = self.i();
        let ix = self.mul(&i, x);
        let x2 = self.mul(x, x);
        let one_minus = {
            let neg = self.neg(&x2);
            self.add_i64(&neg, 1)
        };
        let root = self.sqrt(&one_minus);
        let w = self.add(&ix, &root);
        let l = self.log(&w);
        let neg_i = self.neg_i();
        self.mul(&l, &neg_i)
    }

    pub fn acos(&mut self, x: &Ca) -> Ca {
        if x.is_special() {
            return self.trig_special(x);
        }
        // acos x = pi/2 - asin x.
        let asin = self.asin(x);
        let pi = self.pi();
        let half_pi = self.mul_qrat_elem(&pi, &QRat::from((1, 2)));
        self.sub(&half_pi, &asin)
    }

    fn trig_special(&mut self, x: &Ca) -> Ca {
        match x {
            Ca::Undefined | Ca::UnsignedInfinity => Ca::Undefined,
            Ca::Unknown => Ca::Unknown,
            Ca::SignedInfinity(d) => {
                // No limit along the real directions; other directions
                // are left undecided.
                let d = (**d).clone();
                let re_dir = self.check_equal(&d, &Ca::one()).or(
                    self.check_equal(&d, &Ca::neg_one()),
                );
                match re_dir {
                    Truth::True => Ca::Undefined,
                    _ => Ca::Unknown,
                }
            }
            _ => unreachable!(),
        }
    }

    fn atan_special(&mut self, x: &Ca) -> Ca {
        match x {
            Ca::Undefined | Ca::UnsignedInfinity => Ca::Undefined,
            Ca::Unknown => Ca::Unknown,
            Ca::SignedInfinity(d) => {
                // atan(+/- oo) = +/- pi/2 along the real directions.
                let d = (**d).clone();
                let sign = match self.check_equal(&d, &Ca::one()) {
                    Truth::True => 1,
                    _ => match self.check_equal(&d, &Ca::neg_one()) {
                        Truth::True => -1,
                        _ => return Ca::Unknown,
                    },
                };
                let pi = self.pi();
                self.mul_qrat_elem(&pi, &QRat::from((sign, 2)))
            }
            _ => unreachable!(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sin_zero_cos_zero() {
        let mut ctx = Context::new();
        let (s, c) = ctx.sin_cos(&Ca::zero());
        assert_eq!(s, Ca::zero());
        assert_eq!(c, Ca::one());
    }

    #[test]
    fn sin_pi_over_six_is_half() {
        let mut ctx = Context::new();
        let pi = ctx.pi();
        let x = ctx.mul_qrat_elem(&pi, &QRat::from((1, 6)));
        let s = ctx.sin(&x);
        let diff = ctx.sub(&s, &Ca::from_rational(1, 2));
        assert_eq!(ctx.check_is_zero(&diff), Truth::True);
    }

    #[test]
    fn cos_pi_is_minus_one() {
        let mut ctx = Context::new();
        let pi = ctx.pi();
        let c = ctx.cos(&pi);
        assert_eq!(ctx.check_equal(&c, &Ca::neg_one()), Truth::True);
    }

    #[test]
    fn sin_squared_plus_cos_squared() {
        let mut ctx = Context::new();
        // At the transcendental point pi/5 the identity must still hold
        // exactly through the exponential representation.
        let pi = ctx.pi();
        let x = ctx.mul_qrat_elem(&pi, &QRat::from((1, 5)));
        let (s, c) = ctx.sin_cos(&x);
        let s2 = ctx.mul(&s, &s);
        let c2 = ctx.mul(&c, &c);
        let sum = ctx.add(&s2, &c2);
        assert_eq!(ctx.check_equal(&sum, &Ca::one()), Truth::True);
    }

    #[test]
    fn atan_at_poles() {
        let mut ctx = Context::new();
        let i = ctx.i();
        let v = ctx.atan(&i);
        let expected = ctx.pos_i_inf();
        assert_eq!(v, expected);
    }

    #[test]
    fn atan_of_infinity() {
        let mut ctx = Context::new();
        let v = ctx.atan(&Ca::pos_inf());
        let pi = ctx.pi();
        let expected = ctx.mul_qrat_elem(&pi, &QRat::from((1, 2)));
        assert_eq!(ctx.check_equal(&v, &expected), Truth::True);
    }

    #[test]
    fn asin_half_is_pi_over_six() {
        let mut ctx = Context::new();
        let v = ctx.asin(&Ca::from_rational(1, 2));
        let pi = ctx.pi();
        let expected = ctx.mul_qrat_elem(&pi, &QRat::from((1, 6)));
        assert_eq!(ctx.check_equal(&v, &expected), Truth::True);
    }
}
