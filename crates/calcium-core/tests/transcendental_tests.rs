//! The transcendental front-end: closed forms, branch corrections, and
//! the extension fallbacks.

use calcium_core::{Ca, Context, QRat, Truth};

mod common;

#[test]
fn log_exp_within_principal_strip() {
    common::init_logger();
    // |Im| <= pi: log(exp(3 + i)) = 3 + i.
    let mut ctx = Context::new();
    let i = ctx.i();
    let z = ctx.add_i64(&i, 3);
    let e = ctx.exp(&z);
    let l = ctx.log(&e);
    assert_eq!(ctx.check_equal(&l, &z), Truth::True);
}

#[test]
fn log_exp_reduces_to_principal_branch() {
    common::init_logger();
    // Im = 4 > pi: log(exp(3 + 4i)) = 3 + 4i - 2 pi i.
    let mut ctx = Context::new();
    let i = ctx.i();
    let four_i = ctx.mul_i64(&i, 4);
    let z = ctx.add_i64(&four_i, 3);
    let e = ctx.exp(&z);
    let l = ctx.log(&e);
    let pi_i = ctx.pi_i();
    let shift = ctx.mul_i64(&pi_i, 2);
    let expected = ctx.sub(&z, &shift);
    assert_eq!(ctx.check_equal(&l, &expected), Truth::True);
    // And it differs from the naive z.
    assert_eq!(ctx.check_equal(&l, &z), Truth::False);
}

#[test]
fn sin_pi_over_six() {
    common::init_logger();
    let mut ctx = Context::new();
    let pi = ctx.pi();
    let x = ctx.div_i64(&pi, 6);
    let s = ctx.sin(&x);
    let diff = ctx.sub(&s, &Ca::from_rational(1, 2));
    assert_eq!(ctx.check_is_zero(&diff), Truth::True);
}

#[test]
fn cos_pi_over_three() {
    common::init_logger();
    let mut ctx = Context::new();
    let pi = ctx.pi();
    let x = ctx.div_i64(&pi, 3);
    let c = ctx.cos(&x);
    assert_eq!(ctx.check_equal(&c, &Ca::from_rational(1, 2)), Truth::True);
}

#[test]
fn tan_pi_over_four() {
    common::init_logger();
    let mut ctx = Context::new();
    let pi = ctx.pi();
    let x = ctx.div_i64(&pi, 4);
    let t = ctx.tan(&x);
    assert_eq!(ctx.check_equal(&t, &Ca::one()), Truth::True);
}

#[test]
fn sqrt_squares_back_to_argument() {
    common::init_logger();
    let mut ctx = Context::new();
    for v in [Ca::from_i64(7), Ca::from_i64(-3), Ca::from_rational(2, 5)] {
        let r = ctx.sqrt(&v);
        let sq = ctx.mul(&r, &r);
        assert_eq!(ctx.check_equal(&sq, &v), Truth::True, "sqrt({v:?})^2");
    }
    // Transcendental argument through the inert path.
    let pi = ctx.pi();
    let r = ctx.sqrt(&pi);
    let sq = ctx.mul(&r, &r);
    assert_eq!(ctx.check_equal(&sq, &pi), Truth::True);
}

#[test]
fn sqrt_matches_algebraic_sqrt() {
    common::init_logger();
    let mut ctx = Context::new();
    let r = ctx.sqrt(&Ca::from_i64(12));
    // 2 sqrt(3)
    let s3 = ctx.sqrt(&Ca::from_i64(3));
    let expected = ctx.mul_i64(&s3, 2);
    assert_eq!(ctx.check_equal(&r, &expected), Truth::True);
}

#[test]
fn exp_log_power_extraction() {
    common::init_logger();
    // exp((2/3) log(5)) = 5^(2/3)
    let mut ctx = Context::new();
    let five = Ca::from_i64(5);
    let l = ctx.log(&five);
    let x = ctx.mul_qrat_elem(&l, &QRat::from((2, 3)));
    let v = ctx.exp(&x);
    let p = ctx.pow(&five, &Ca::from_rational(2, 3));
    assert_eq!(ctx.check_equal(&v, &p), Truth::True);
}

#[test]
fn log_of_exp_of_log_identity() {
    common::init_logger();
    // log(z^2) = 2 log(z) for positive real z (here z = 3).
    let mut ctx = Context::new();
    let three = Ca::from_i64(3);
    let nine = ctx.pow(&three, &Ca::from_i64(2));
    let l9 = ctx.log(&nine);
    let l3 = ctx.log(&three);
    let twice = ctx.mul_i64(&l3, 2);
    assert_eq!(ctx.check_equal(&l9, &twice), Truth::True);
}

#[test]
fn gamma_closed_forms() {
    common::init_logger();
    let mut ctx = Context::new();
    assert_eq!(ctx.gamma(&Ca::from_i64(6)), Ca::from_i64(120));
    assert_eq!(ctx.gamma(&Ca::from_i64(-2)), Ca::uinf());
    // Gamma(5/2) = (3/2)(1/2) sqrt(pi) = (3/4) sqrt(pi)
    let g = ctx.gamma(&Ca::from_rational(5, 2));
    let pi = ctx.pi();
    let root = ctx.sqrt(&pi);
    let expected = ctx.mul_qrat_elem(&root, &QRat::from((3, 4)));
    assert_eq!(ctx.check_equal(&g, &expected), Truth::True);
}

#[test]
fn asin_acos_complementary() {
    common::init_logger();
    // asin(1/2) + acos(1/2) = pi/2
    let mut ctx = Context::new();
    let h = Ca::from_rational(1, 2);
    let a = ctx.asin(&h);
    let b = ctx.acos(&h);
    let sum = ctx.add(&a, &b);
    let pi = ctx.pi();
    let half_pi = ctx.div_i64(&pi, 2);
    assert_eq!(ctx.check_equal(&sum, &half_pi), Truth::True);
}

#[test]
fn abs_sgn_re_im_consistency() {
    common::init_logger();
    let mut ctx = Context::new();
    let i = ctx.i();
    let three_i = ctx.mul_i64(&i, 3);
    let z = ctx.add_i64(&three_i, -4); // -4 + 3i
    assert_eq!(ctx.abs(&z), Ca::from_i64(5));
    assert_eq!(ctx.re(&z), Ca::from_i64(-4));
    assert_eq!(ctx.im(&z), Ca::from_i64(3));
    let s = ctx.sgn(&z);
    let five = Ca::from_i64(5);
    let expected = ctx.div(&z, &five);
    assert_eq!(ctx.check_equal(&s, &expected), Truth::True);
}

#[test]
fn floor_ceil_of_transcendental() {
    common::init_logger();
    let mut ctx = Context::new();
    let pi = ctx.pi();
    let neg_pi = ctx.neg(&pi);
    assert_eq!(ctx.floor(&pi), Ca::from_i64(3));
    assert_eq!(ctx.floor(&neg_pi), Ca::from_i64(-4));
    assert_eq!(ctx.ceil(&neg_pi), Ca::from_i64(-3));
}

#[test]
fn zeta_and_elliptic_fixed_points() {
    common::init_logger();
    let mut ctx = Context::new();
    assert_eq!(ctx.riemann_zeta(&Ca::from_i64(1)), Ca::uinf());
    assert_eq!(ctx.riemann_zeta(&Ca::from_i64(-2)), Ca::zero());
    let k0 = ctx.elliptic_k(&Ca::zero());
    let e0 = ctx.elliptic_e(&Ca::zero());
    assert_eq!(ctx.check_equal(&k0, &e0), Truth::True);
    assert_eq!(ctx.elliptic_e(&Ca::one()), Ca::one());
}

#[test]
fn inert_extension_for_hard_arguments() {
    common::init_logger();
    // gamma at a transcendental point stays symbolic but keeps a usable
    // enclosure.
    let mut ctx = Context::new();
    let pi = ctx.pi();
    let g = ctx.gamma(&pi);
    assert!(g.is_finite());
    let b = ctx.to_ball(&g, 64);
    // Gamma(pi) ~ 2.2880...
    assert!(!b.is_indeterminate());
    let two = ctx.sub_i64(&g, 2);
    assert_eq!(ctx.check_is_zero(&two), Truth::False);
}

#[test]
fn conj_of_mixed_element() {
    common::init_logger();
    let mut ctx = Context::new();
    let i = ctx.i();
    let pi = ctx.pi();
    let ipi = ctx.mul(&i, &pi);
    let z = ctx.add_i64(&ipi, 2); // 2 + pi i
    let c = ctx.conj(&z);
    let neg_ipi = ctx.neg(&ipi);
    let expected = ctx.add_i64(&neg_ipi, 2);
    assert_eq!(ctx.check_equal(&c, &expected), Truth::True);
}
