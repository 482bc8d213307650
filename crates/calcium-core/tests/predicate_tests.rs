//! The three-valued predicate engine on the canonical scenarios.

use calcium_core::{Ca, Context, Truth};

mod common;

#[test]
fn sqrt8_minus_twice_sqrt2_is_zero() {
    common::init_logger();
    let mut ctx = Context::new();
    let x = ctx.sqrt(&Ca::from_i64(2));
    let y = ctx.sqrt(&Ca::from_i64(8));
    let twice = ctx.mul_i64(&x, 2);
    let diff = ctx.sub(&y, &twice);
    assert_eq!(ctx.check_is_zero(&diff), Truth::True);
}

#[test]
fn sqrt_of_minus_four_equals_two_i() {
    common::init_logger();
    let mut ctx = Context::new();
    let x = ctx.sqrt(&Ca::from_i64(-4));
    let i = ctx.i();
    let two_i = ctx.mul_i64(&i, 2);
    assert_eq!(ctx.check_equal(&x, &two_i), Truth::True);
}

#[test]
fn gamma_ten_minus_factorial_is_zero() {
    common::init_logger();
    let mut ctx = Context::new();
    let g = ctx.gamma(&Ca::from_i64(10));
    let x = ctx.sub_i64(&g, 362880);
    assert_eq!(ctx.check_is_zero(&x), Truth::True);
}

#[test]
fn e_and_pi_are_provably_distinct() {
    common::init_logger();
    // The constants are numerically separable, so equality is decided
    // negatively rather than left unknown.
    let mut ctx = Context::new();
    let e = ctx.exp(&Ca::one());
    let pi = ctx.pi();
    assert_eq!(ctx.check_equal(&e, &pi), Truth::False);
}

#[test]
fn e_plus_pi_vs_pi_plus_e() {
    common::init_logger();
    let mut ctx = Context::new();
    let e = ctx.exp(&Ca::one());
    let pi = ctx.pi();
    let a = ctx.add(&e, &pi);
    let b = ctx.add(&pi, &e);
    assert_eq!(ctx.check_equal(&a, &b), Truth::True);
    assert!(a.equal_repr(&b));
}

#[test]
fn machin_formula_is_zero() {
    common::init_logger();
    // 4 atan(1/5) - atan(1/239) - pi/4 = 0
    let mut ctx = Context::new();
    let a = ctx.atan(&Ca::from_rational(1, 5));
    let b = ctx.atan(&Ca::from_rational(1, 239));
    let four_a = ctx.mul_i64(&a, 4);
    let pi = ctx.pi();
    let quarter_pi = ctx.div_i64(&pi, 4);
    let mut x = ctx.sub(&four_a, &b);
    x = ctx.sub(&x, &quarter_pi);
    assert_eq!(ctx.check_is_zero(&x), Truth::True);
}

#[test]
fn exp_product_law() {
    common::init_logger();
    // exp(a + b) = exp(a) exp(b) with a = pi, b = 1 - pi.
    let mut ctx = Context::new();
    let pi = ctx.pi();
    let a = pi.clone();
    let b = {
        let neg = ctx.neg(&pi);
        ctx.add_i64(&neg, 1)
    };
    let sum = ctx.add(&a, &b);
    let lhs = ctx.exp(&sum);
    let ea = ctx.exp(&a);
    let eb = ctx.exp(&b);
    let rhs = ctx.mul(&ea, &eb);
    let diff = ctx.sub(&lhs, &rhs);
    assert_ne!(ctx.check_is_zero(&diff), Truth::False);
    assert_eq!(ctx.check_equal(&lhs, &rhs), Truth::True);
}

#[test]
fn equality_of_signed_infinities_compares_directions() {
    common::init_logger();
    let mut ctx = Context::new();
    assert_eq!(ctx.check_equal(&Ca::pos_inf(), &Ca::pos_inf()), Truth::True);
    assert_eq!(ctx.check_equal(&Ca::pos_inf(), &Ca::neg_inf()), Truth::False);
    let ii = ctx.pos_i_inf();
    assert_eq!(ctx.check_equal(&Ca::pos_inf(), &ii), Truth::False);
    assert_eq!(ctx.check_equal(&Ca::uinf(), &Ca::uinf()), Truth::True);
    assert_eq!(ctx.check_equal(&Ca::uinf(), &Ca::pos_inf()), Truth::False);
}

#[test]
fn repr_equality_implies_semantic_equality() {
    common::init_logger();
    let mut ctx = Context::new();
    let r1 = ctx.sqrt(&Ca::from_i64(5));
    let r2 = ctx.sqrt(&Ca::from_i64(5));
    assert!(r1.equal_repr(&r2));
    assert_eq!(ctx.check_equal(&r1, &r2), Truth::True);
}

#[test]
fn zero_test_soundness_on_nonzero() {
    common::init_logger();
    // check_is_zero = False must come with a separating enclosure.
    let mut ctx = Context::new();
    let pi = ctx.pi();
    let x = ctx.sub_i64(&pi, 3);
    assert_eq!(ctx.check_is_zero(&x), Truth::False);
    let b = ctx.to_ball(&x, 128);
    assert!(b.is_nonzero());
}

#[test]
fn zero_test_soundness_on_zero() {
    common::init_logger();
    // check_is_zero = True: every enclosure must contain zero.
    let mut ctx = Context::new();
    let r = ctx.sqrt(&Ca::from_i64(3));
    let sq = ctx.mul(&r, &r);
    let x = ctx.sub_i64(&sq, 3);
    assert_eq!(ctx.check_is_zero(&x), Truth::True);
    for prec in [64, 256, 1024] {
        let b = ctx.to_ball(&x, prec);
        assert!(b.contains_zero());
    }
}

#[test]
fn comparisons_of_algebraic_numbers() {
    common::init_logger();
    let mut ctx = Context::new();
    let r2 = ctx.sqrt(&Ca::from_i64(2));
    let r3 = ctx.sqrt(&Ca::from_i64(3));
    assert_eq!(ctx.check_lt(&r2, &r3), Truth::True);
    assert_eq!(ctx.check_le(&r2, &r2), Truth::True);
    assert_eq!(ctx.check_gt(&r2, &r3), Truth::False);
    // Complex values are never ordered.
    let i = ctx.i();
    assert_eq!(ctx.check_le(&i, &r3), Truth::False);
}

#[test]
fn half_is_rational_but_not_integer() {
    common::init_logger();
    let mut ctx = Context::new();
    let h = Ca::from_rational(1, 2);
    assert_eq!(ctx.check_is_rational(&h), Truth::True);
    assert_eq!(ctx.check_is_integer(&h), Truth::False);
    assert_eq!(ctx.check_is_algebraic(&h), Truth::True);
    assert_eq!(ctx.check_is_real(&h), Truth::True);
}

#[test]
fn sqrt2_properties() {
    common::init_logger();
    let mut ctx = Context::new();
    let r = ctx.sqrt(&Ca::from_i64(2));
    assert_eq!(ctx.check_is_real(&r), Truth::True);
    assert_eq!(ctx.check_is_rational(&r), Truth::False);
    assert_eq!(ctx.check_is_positive_real(&r), Truth::True);
    assert_eq!(ctx.check_is_imaginary(&r), Truth::False);
}

#[test]
fn special_value_recognizers() {
    common::init_logger();
    let mut ctx = Context::new();
    assert_eq!(ctx.check_is_number(&Ca::from_i64(4)), Truth::True);
    assert_eq!(ctx.check_is_number(&Ca::pos_inf()), Truth::False);
    assert_eq!(ctx.check_is_number(&Ca::unknown()), Truth::Unknown);
    assert_eq!(ctx.check_is_infinity(&Ca::uinf()), Truth::True);
    assert_eq!(ctx.check_is_undefined(&Ca::undefined()), Truth::True);
    assert_eq!(ctx.check_is_undefined(&Ca::zero()), Truth::False);
}

#[test]
fn is_one_and_friends() {
    common::init_logger();
    let mut ctx = Context::new();
    assert_eq!(ctx.check_is_one(&Ca::one()), Truth::True);
    assert_eq!(ctx.check_is_neg_one(&Ca::neg_one()), Truth::True);
    let i = ctx.i();
    assert_eq!(ctx.check_is_i(&i), Truth::True);
    let ni = ctx.neg_i();
    assert_eq!(ctx.check_is_neg_i(&ni), Truth::True);
    assert_eq!(ctx.check_is_i(&ni), Truth::False);
}
