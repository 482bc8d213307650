//! Ring arithmetic: dispatch, specials algebra, condensation, and the
//! algebraic laws on randomized small inputs.

use calcium_core::{Ca, Context, Truth};
use proptest::prelude::*;

mod common;

#[test]
fn division_by_zero_is_unsigned_infinity() {
    common::init_logger();
    let mut ctx = Context::new();
    let x = ctx.div(&Ca::one(), &Ca::zero());
    assert_eq!(x, Ca::uinf());
}

#[test]
fn zero_over_zero_is_undefined() {
    common::init_logger();
    let mut ctx = Context::new();
    let x = ctx.div(&Ca::zero(), &Ca::zero());
    assert_eq!(x, Ca::undefined());
}

#[test]
fn opposite_infinities_sum_to_undefined() {
    common::init_logger();
    let mut ctx = Context::new();
    let x = ctx.add(&Ca::pos_inf(), &Ca::neg_inf());
    assert_eq!(x, Ca::undefined());
}

#[test]
fn same_direction_infinities_absorb() {
    common::init_logger();
    let mut ctx = Context::new();
    assert_eq!(ctx.add(&Ca::pos_inf(), &Ca::pos_inf()), Ca::pos_inf());
    assert_eq!(ctx.add(&Ca::pos_inf(), &Ca::from_i64(17)), Ca::pos_inf());
    assert_eq!(ctx.add(&Ca::uinf(), &Ca::from_i64(17)), Ca::uinf());
    assert_eq!(ctx.add(&Ca::uinf(), &Ca::uinf()), Ca::uinf());
    assert_eq!(ctx.add(&Ca::uinf(), &Ca::pos_inf()), Ca::undefined());
}

#[test]
fn undefined_absorbs_everything() {
    common::init_logger();
    let mut ctx = Context::new();
    assert_eq!(ctx.add(&Ca::undefined(), &Ca::pos_inf()), Ca::undefined());
    assert_eq!(ctx.mul(&Ca::undefined(), &Ca::zero()), Ca::undefined());
    assert_eq!(ctx.sub(&Ca::unknown(), &Ca::one()), Ca::unknown());
}

#[test]
fn zero_times_infinity_is_undefined() {
    common::init_logger();
    let mut ctx = Context::new();
    assert_eq!(ctx.mul(&Ca::zero(), &Ca::uinf()), Ca::undefined());
    assert_eq!(ctx.mul(&Ca::zero(), &Ca::pos_inf()), Ca::undefined());
    assert_eq!(ctx.mul(&Ca::from_i64(-2), &Ca::pos_inf()), Ca::neg_inf());
}

#[test]
fn inverse_of_infinities_is_zero() {
    common::init_logger();
    let mut ctx = Context::new();
    assert_eq!(ctx.inv(&Ca::uinf()), Ca::zero());
    assert_eq!(ctx.inv(&Ca::pos_inf()), Ca::zero());
}

#[test]
fn field_arithmetic_in_sqrt2() {
    common::init_logger();
    let mut ctx = Context::new();
    let r = ctx.sqrt(&Ca::from_i64(2));
    // (1 + sqrt2)(sqrt2 - 1) = 1
    let a = ctx.add_i64(&r, 1);
    let b = ctx.sub_i64(&r, 1);
    let p = ctx.mul(&a, &b);
    assert_eq!(p, Ca::one());
}

#[test]
fn mixed_field_addition_condenses() {
    common::init_logger();
    let mut ctx = Context::new();
    let r = ctx.sqrt(&Ca::from_i64(2));
    let x = ctx.add(&r, &Ca::from_rational(1, 2));
    let y = ctx.sub(&x, &r);
    assert_eq!(y, Ca::from_rational(1, 2));
}

#[test]
fn condensation_is_idempotent() {
    common::init_logger();
    let mut ctx = Context::new();
    let pi = ctx.pi();
    let r = ctx.sqrt(&Ca::from_i64(2));
    let sum = ctx.add(&pi, &r);
    let once = ctx.condense(sum.clone());
    assert_eq!(once, sum);
    let twice = ctx.condense(once.clone());
    assert_eq!(twice, once);
}

#[test]
fn pi_squared_minus_expansion_vanishes() {
    common::init_logger();
    // (pi + e)^2 - pi^2 - 2 pi e - e^2 = 0 exactly by polynomial
    // cancellation in Q(pi, e).
    let mut ctx = Context::new();
    let pi = ctx.pi();
    let e = ctx.exp(&Ca::one());
    let s = ctx.add(&pi, &e);
    let s2 = ctx.mul(&s, &s);
    let pi2 = ctx.mul(&pi, &pi);
    let e2 = ctx.mul(&e, &e);
    let pe = ctx.mul(&pi, &e);
    let pe2 = ctx.mul_i64(&pe, 2);
    let mut acc = ctx.sub(&s2, &pi2);
    acc = ctx.sub(&acc, &pe2);
    acc = ctx.sub(&acc, &e2);
    assert_eq!(ctx.check_is_zero(&acc), Truth::True);
    assert_eq!(acc, Ca::zero());
}

#[test]
fn inverse_multiplies_back_to_one() {
    common::init_logger();
    let mut ctx = Context::new();
    let pi = ctx.pi();
    let x = ctx.add_i64(&pi, 3);
    let ix = ctx.inv(&x);
    let p = ctx.mul(&x, &ix);
    let diff = ctx.sub(&p, &Ca::one());
    assert_eq!(ctx.check_is_zero(&diff), Truth::True);
}

#[test]
fn dot_fused_product() {
    common::init_logger();
    let mut ctx = Context::new();
    let xs = [Ca::from_i64(1), Ca::from_i64(2), Ca::from_i64(3)];
    let ys = [Ca::from_i64(4), Ca::from_i64(5), Ca::from_i64(6)];
    let d = ctx.dot(&Ca::from_i64(10), false, &xs, &ys);
    assert_eq!(d, Ca::from_i64(10 + 4 + 10 + 18));
    let d2 = ctx.dot(&Ca::zero(), true, &xs, &ys);
    assert_eq!(d2, Ca::from_i64(-32));
}

#[test]
fn pow_integer_ladder() {
    common::init_logger();
    let mut ctx = Context::new();
    let x = Ca::from_rational(2, 3);
    let y = Ca::from_i64(5);
    assert_eq!(ctx.pow(&x, &y), Ca::from_rational(32, 243));
    let z = Ca::from_i64(-2);
    assert_eq!(ctx.pow(&x, &z), Ca::from_rational(9, 4));
    let zero_pow = ctx.pow(&Ca::zero(), &Ca::zero());
    assert_eq!(zero_pow, Ca::undefined());
}

#[test]
fn pow_half_goes_through_sqrt() {
    common::init_logger();
    let mut ctx = Context::new();
    let v = ctx.pow(&Ca::from_i64(4), &Ca::from_rational(1, 2));
    assert_eq!(v, Ca::from_i64(2));
    let v = ctx.pow(&Ca::from_i64(2), &Ca::from_rational(3, 2));
    let r = ctx.sqrt(&Ca::from_i64(8));
    assert_eq!(ctx.check_equal(&v, &r), Truth::True);
}

#[test]
fn exp_pow_combination() {
    common::init_logger();
    // (e^pi)^2 = e^(2 pi)
    let mut ctx = Context::new();
    let pi = ctx.pi();
    let ep = ctx.exp(&pi);
    let sq = ctx.pow(&ep, &Ca::from_i64(2));
    let two_pi = ctx.mul_i64(&pi, 2);
    let direct = ctx.exp(&two_pi);
    assert_eq!(ctx.check_equal(&sq, &direct), Truth::True);
}

// ---- Randomized algebraic laws ----

fn small_value(ctx: &mut Context, code: u8, n: i64) -> Ca {
    let n = n % 50;
    match code % 4 {
        0 => Ca::from_i64(n),
        1 => Ca::from_rational(n, 7),
        2 => {
            let r = ctx.sqrt(&Ca::from_i64(2));
            ctx.mul_i64(&r, n)
        }
        _ => {
            let pi = ctx.pi();
            ctx.add_i64(&pi, n)
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn addition_is_associative(
        (ca, na) in (0u8..4, -20i64..20),
        (cb, nb) in (0u8..4, -20i64..20),
        (cc, nc) in (0u8..4, -20i64..20),
    ) {
        let mut ctx = Context::new();
        let x = small_value(&mut ctx, ca, na);
        let y = small_value(&mut ctx, cb, nb);
        let z = small_value(&mut ctx, cc, nc);
        let l = {
            let yz = ctx.add(&y, &z);
            ctx.add(&x, &yz)
        };
        let r = {
            let xy = ctx.add(&x, &y);
            ctx.add(&xy, &z)
        };
        let diff = ctx.sub(&l, &r);
        prop_assert_ne!(ctx.check_is_zero(&diff), Truth::False);
    }

    #[test]
    fn multiplication_commutes_and_distributes(
        (ca, na) in (0u8..4, -20i64..20),
        (cb, nb) in (0u8..4, -20i64..20),
        (cc, nc) in (0u8..4, -20i64..20),
    ) {
        let mut ctx = Context::new();
        let x = small_value(&mut ctx, ca, na);
        let y = small_value(&mut ctx, cb, nb);
        let z = small_value(&mut ctx, cc, nc);
        let xy = ctx.mul(&x, &y);
        let yx = ctx.mul(&y, &x);
        prop_assert_eq!(xy.clone(), yx);

        let yz = ctx.add(&y, &z);
        let lhs = ctx.mul(&x, &yz);
        let xz = ctx.mul(&x, &z);
        let rhs = ctx.add(&xy, &xz);
        let diff = ctx.sub(&lhs, &rhs);
        prop_assert_ne!(ctx.check_is_zero(&diff), Truth::False);
    }

    #[test]
    fn condense_is_idempotent_randomized(
        (ca, na) in (0u8..4, -20i64..20),
        (cb, nb) in (0u8..4, -20i64..20),
    ) {
        let mut ctx = Context::new();
        let x = small_value(&mut ctx, ca, na);
        let y = small_value(&mut ctx, cb, nb);
        let v = ctx.mul(&x, &y);
        let once = ctx.condense(v.clone());
        prop_assert_eq!(once.clone(), v);
        let twice = ctx.condense(once.clone());
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn inverse_cancels(
        (ca, na) in (0u8..4, 1i64..20),
    ) {
        let mut ctx = Context::new();
        let x = small_value(&mut ctx, ca, na);
        if ctx.check_is_zero(&x) == Truth::False {
            let ix = ctx.inv(&x);
            let p = ctx.mul(&x, &ix);
            let diff = ctx.sub(&p, &Ca::one());
            prop_assert_ne!(ctx.check_is_zero(&diff), Truth::False);
        }
    }
}
