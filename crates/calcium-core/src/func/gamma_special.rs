//! Gamma and the other named special functions (erf family, zeta,
//! complete elliptic integrals).
//!
//! Gamma gets the factorial and half-integer closed forms; the rest
//! simplify only at distinguished points and otherwise stay inert.

use crate::ctx::Context;
use crate::elem::Ca;
use crate::ext::FuncHead;
use crate::num::{QInt, QRat};
use crate::truth::Truth;

impl Context {
    pub fn gamma(&mut self, x: &Ca) -> Ca {
        if x.is_special() {
            return match x {
                Ca::Unknown => Ca::Unknown,
                Ca::SignedInfinity(d) => {
                    let d = (**d).clone();
                    match self.check_equal(&d, &Ca::one()) {
                        Truth::True => Ca::pos_inf(),
                        Truth::Unknown => Ca::Unknown,
                        Truth::False => Ca::Unknown,
                    }
                }
                _ => Ca::Undefined,
            };
        }
        if let Ca::Rational(q) = x {
            let q = q.clone();
            if q.is_integer() {
                let n = q.numer();
                if n.sign() <= 0 {
                    // Poles at the nonpositive integers.
                    return Ca::uinf();
                }
                if let Some(n) = n.to_i64() {
                    if (n as u64) < self.options.prec_limit as u64 {
                        return Ca::from_qint(&factorial(n - 1));
                    }
                }
            } else if q.denom() == QInt::from(2i64) {
                // Gamma(n + 1/2) = c * sqrt(pi) through the recurrence
                // from Gamma(1/2).
                if let Some(c) = half_integer_gamma_coeff(&q, self.options.prec_limit) {
                    let pi = self.pi();
                    let root = self.sqrt(&pi);
                    return self.mul_qrat_elem(&root, &c);
                }
            }
        }
        let e = self.ext_function(FuncHead::Gamma, vec![x.clone()]);
        self.make_gen_element(e)
    }

    pub fn erf(&mut self, x: &Ca) -> Ca {
        if let Some(v) = self.erf_like_special(x, 0) {
            return v;
        }
        let e = self.ext_function(FuncHead::Erf, vec![x.clone()]);
        self.make_gen_element(e)
    }

    pub fn erfc(&mut self, x: &Ca) -> Ca {
        if let Some(v) = self.erf_like_special(x, 1) {
            return v;
        }
        let e = self.ext_function(FuncHead::Erfc, vec![x.clone()]);
        self.make_gen_element(e)
    }

    pub fn erfi(&mut self, x: &Ca) -> Ca {
        if let Some(v) = self.erf_like_special(x, 2) {
            return v;
        }
        let e = self.ext_function(FuncHead::Erfi, vec![x.clone()]);
        self.make_gen_element(e)
    }

    /// Shared limits of the erf family: value at zero, limits at the
    /// real infinities. `which`: 0 = erf, 1 = erfc, 2 = erfi.
    fn erf_like_special(&mut self, x: &Ca, which: u8) -> Option<Ca> {
        if x.is_special() {
            return Some(match x {
                Ca::Unknown => Ca::Unknown,
                Ca::SignedInfinity(d) => {
                    let d = (**d).clone();
                    let sign = match self.check_equal(&d, &Ca::one()) {
                        Truth::True => 1,
                        _ => match self.check_equal(&d, &Ca::neg_one()) {
                            Truth::True => -1,
                            _ => return Some(Ca::Unknown),
                        },
                    };
                    match (which, sign) {
                        (0, s) => Ca::from_i64(s),
                        (1, 1) => Ca::zero(),
                        (1, -1) => Ca::from_i64(2),
                        (2, _) => Ca::SignedInfinity(Box::new(Ca::from_i64(sign))),
                        _ => Ca::Unknown,
                    }
                }
                _ => Ca::Undefined,
            });
        }
        if x.is_zero_repr() {
            return Some(match which {
                1 => Ca::one(),
                _ => Ca::zero(),
            });
        }
        None
    }

    pub fn riemann_zeta(&mut self, x: &Ca) -> Ca {
        if x.is_special() {
            return match x {
                Ca::Unknown => Ca::Unknown,
                Ca::SignedInfinity(d) => {
                    let d = (**d).clone();
                    match self.check_equal(&d, &Ca::one()) {
                        Truth::True => Ca::one(),
                        _ => Ca::Unknown,
                    }
                }
                _ => Ca::Undefined,
            };
        }
        if let Ca::Rational(q) = x {
            if q.is_one() {
                return Ca::uinf();
            }
            if q.is_zero() {
                return Ca::from_rational(-1, 2);
            }
            if let Some(n) = q.to_qint().and_then(|n| n.to_i64()) {
                // Trivial zeros and the small closed forms.
                if n < 0 && n % 2 == 0 {
                    return Ca::zero();
                }
                if n == -1 {
                    return Ca::from_rational(-1, 12);
                }
                if n == -3 {
                    return Ca::from_rational(1, 120);
                }
                if n == 2 {
                    let pi = self.pi();
                    let sq = self.mul(&pi, &pi);
                    return self.mul_qrat_elem(&sq, &QRat::from((1, 6)));
                }
                if n == 4 {
                    let pi = self.pi();
                    let sq = self.mul(&pi, &pi);
                    let p4 = self.mul(&sq, &sq);
                    return self.mul_qrat_elem(&p4, &QRat::from((1, 90)));
                }
            }
        }
        let e = self.ext_function(FuncHead::RiemannZeta, vec![x.clone()]);
        self.make_gen_element(e)
    }

    pub fn elliptic_k(&mut self, x: &Ca) -> Ca {
        if x.is_special() {
            return match x {
                Ca::Unknown => Ca::Unknown,
                _ => Ca::Undefined,
            };
        }
        if x.is_zero_repr() {
            let pi = self.pi();
            return self.mul_qrat_elem(&pi, &QRat::from((1, 2)));
        }
        if x.is_one_repr() {
            return Ca::uinf();
        }
        let e = self.ext_function(FuncHead::EllipticK, vec![x.clone()]);
        self.make_gen_element(e)
    }

    pub fn elliptic_e(&mut self, x: &Ca) -> Ca {
        if x.is_special() {
            return match x {
                Ca::Unknown => Ca::Unknown,
                _ => Ca::Undefined,
            };
        }
        if x.is_zero_repr() {
            let pi = self.pi();
            return self.mul_qrat_elem(&pi, &QRat::from((1, 2)));
        }
        if x.is_one_repr() {
            return Ca::one();
        }
        let e = self.ext_function(FuncHead::EllipticE, vec![x.clone()]);
        self.make_gen_element(e)
    }

    pub fn elliptic_pi(&mut self, n: &Ca, m: &Ca) -> Ca {
        if n.is_special() || m.is_special() {
            if n.is_unknown() || m.is_unknown() {
                return Ca::Unknown;
            }
            return Ca::Undefined;
        }
        let e = self.ext_function(FuncHead::EllipticPi, vec![n.clone(), m.clone()]);
        self.make_gen_element(e)
    }
}

fn factorial(n: i64) -> QInt {
    let mut acc = QInt::one();
    for k in 2..=n {
        acc = acc * QInt::from(k);
    }
    acc
}

/// Gamma(q) / sqrt(pi) for half-integer q, via the recurrence
/// Gamma(x + 1) = x Gamma(x) starting from Gamma(1/2) = sqrt(pi).
fn half_integer_gamma_coeff(q: &QRat, step_limit: u32) -> Option<QRat> {
    let n = (q - &QRat::from((1, 2))).to_qint()?;
    let steps = n.to_i64()?;
    if steps.unsigned_abs() > step_limit as u64 {
        return None;
    }
    let mut coeff = QRat::one();
    if steps >= 0 {
        let mut x = QRat::from((1, 2));
        for _ in 0..steps {
            coeff = &coeff * &x;
            x = &x + &QRat::one();
        }
    } else {
        let mut x = QRat::from((1, 2));
        for _ in 0..(-steps) {
            x = &x - &QRat::one();
            coeff = &coeff / &x;
        }
    }
    Some(coeff)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gamma_of_ten_is_factorial() {
        let mut ctx = Context::new();
        let v = ctx.gamma(&Ca::from_i64(10));
        assert_eq!(v, Ca::from_i64(362880));
    }

    #[test]
    fn gamma_pole_at_nonpositive_integers() {
        let mut ctx = Context::new();
        assert_eq!(ctx.gamma(&Ca::zero()), Ca::uinf());
        assert_eq!(ctx.gamma(&Ca::from_i64(-3)), Ca::uinf());
    }

    #[test]
    fn gamma_half_is_sqrt_pi() {
        let mut ctx = Context::new();
        let v = ctx.gamma(&Ca::from_rational(1, 2));
        let pi = ctx.pi();
        let expected = ctx.sqrt(&pi);
        assert_eq!(ctx.check_equal(&v, &expected), Truth::True);
    }

    #[test]
    fn gamma_three_halves() {
        // Gamma(3/2) = sqrt(pi)/2
        let mut ctx = Context::new();
        let v = ctx.gamma(&Ca::from_rational(3, 2));
        let pi = ctx.pi();
        let root = ctx.sqrt(&pi);
        let expected = ctx.mul_qrat_elem(&root, &QRat::from((1, 2)));
        assert_eq!(ctx.check_equal(&v, &expected), Truth::True);
    }

    #[test]
    fn zeta_two_is_pi_squared_over_six() {
        let mut ctx = Context::new();
        let v = ctx.riemann_zeta(&Ca::from_i64(2));
        let pi = ctx.pi();
        let sq = ctx.mul(&pi, &pi);
        let expected = ctx.mul_qrat_elem(&sq, &QRat::from((1, 6)));
        assert_eq!(ctx.check_equal(&v, &expected), Truth::True);
    }

    #[test]
    fn erf_fixed_points() {
        let mut ctx = Context::new();
        assert_eq!(ctx.erf(&Ca::zero()), Ca::zero());
        assert_eq!(ctx.erfc(&Ca::zero()), Ca::one());
        assert_eq!(ctx.erf(&Ca::pos_inf()), Ca::one());
        assert_eq!(ctx.erfc(&Ca::neg_inf()), Ca::from_i64(2));
    }

    #[test]
    fn elliptic_k_at_zero() {
        let mut ctx = Context::new();
        let v = ctx.elliptic_k(&Ca::zero());
        let pi = ctx.pi();
        let expected = ctx.mul_qrat_elem(&pi, &QRat::from((1, 2)));
        assert_eq!(v, expected);
    }
}
