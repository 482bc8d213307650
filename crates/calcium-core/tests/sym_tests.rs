//! Serialization and cross-context transfer.

use calcium_core::sym::SymExpr;
use calcium_core::{Ca, Context, Truth};

mod common;

#[test]
fn transfer_roundtrip_preserves_value() {
    common::init_logger();
    let mut a = Context::new();
    let mut b = Context::new();

    let values = {
        let pi = a.pi();
        let r2 = a.sqrt(&Ca::from_i64(2));
        let lp = a.log(&pi);
        let mix = {
            let s = a.add(&pi, &r2);
            a.mul(&s, &lp)
        };
        vec![Ca::from_rational(-7, 3), r2, pi, lp, mix]
    };

    for x in values {
        let y = b.transfer_from(&mut a, &x);
        let back = a.transfer_from(&mut b, &y);
        assert_eq!(
            a.check_equal(&x, &back),
            Truth::True,
            "transfer round trip failed for {x:?}"
        );
    }
}

#[test]
fn specials_transfer_exactly() {
    common::init_logger();
    let mut a = Context::new();
    let mut b = Context::new();
    for x in [Ca::undefined(), Ca::unknown(), Ca::uinf(), Ca::pos_inf(), Ca::neg_inf()] {
        let y = b.transfer_from(&mut a, &x);
        assert_eq!(x, y);
    }
}

#[test]
fn expression_tree_shape_for_rational() {
    common::init_logger();
    let mut ctx = Context::new();
    let e = ctx.to_symbolic_expression(&Ca::from_rational(3, 4));
    assert!(matches!(e, SymExpr::Rational { .. }));
    let e = ctx.to_symbolic_expression(&Ca::from_i64(17));
    assert!(matches!(e, SymExpr::Integer(_)));
}

#[test]
fn json_roundtrip_of_algebraic_number() {
    common::init_logger();
    let mut ctx = Context::new();
    let phi = ctx.phi();
    let e = ctx.to_symbolic_expression(&phi);
    let json = serde_json::to_string(&e).unwrap();
    let parsed: SymExpr = serde_json::from_str(&json).unwrap();
    let back = ctx.from_symbolic_expression(&parsed).unwrap();
    assert_eq!(ctx.check_equal(&phi, &back), Truth::True);
}

#[test]
fn named_constants_evaluate() {
    common::init_logger();
    let mut ctx = Context::new();
    let phi = ctx.phi();
    // phi^2 - phi - 1 = 0
    let sq = ctx.mul(&phi, &phi);
    let d1 = ctx.sub(&sq, &phi);
    let d2 = ctx.sub_i64(&d1, 1);
    assert_eq!(ctx.check_is_zero(&d2), Truth::True);

    let t = ctx.tribonacci_constant();
    // t^3 = t^2 + t + 1
    let t2 = ctx.mul(&t, &t);
    let t3 = ctx.mul(&t2, &t);
    let mut rhs = ctx.add(&t2, &t);
    rhs = ctx.add_i64(&rhs, 1);
    assert_eq!(ctx.check_equal(&t3, &rhs), Truth::True);

    let q = ctx.tetranacci_constant();
    let b = ctx.to_ball(&q, 64);
    assert!(!b.is_indeterminate());
}

#[test]
fn decimal_output_of_pi() {
    common::init_logger();
    let mut ctx = Context::new();
    let pi = ctx.pi();
    let s = ctx.to_decimal_string(&pi, 12);
    assert!(s.contains("3.14159265") || s.contains("314159265"));
}

#[test]
fn from_f64_constructor_contract() {
    common::init_logger();
    assert_eq!(Ca::from_f64(2.5), Some(Ca::from_rational(5, 2)));
    assert_eq!(Ca::from_f64(f64::NAN), None);
    assert_eq!(Ca::from_f64(f64::INFINITY), Some(Ca::pos_inf()));
}
