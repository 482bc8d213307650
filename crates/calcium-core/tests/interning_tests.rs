//! Interning invariants: structurally equal requests share handles, and
//! representational equality is decisive.

use calcium_core::{Ca, Context, Truth};

mod common;

#[test]
fn equal_function_extensions_share_identity() {
    common::init_logger();
    let mut ctx = Context::new();
    let pi = ctx.pi();
    let a = ctx.log(&pi);
    let b = ctx.log(&pi);
    assert!(a.equal_repr(&b));
    assert_eq!(a, b);
}

#[test]
fn equal_algebraic_requests_share_identity() {
    common::init_logger();
    let mut ctx = Context::new();
    // The same algebraic number interned twice is one extension.
    let a = ctx.sqrt(&Ca::from_i64(3));
    let b = ctx.sqrt(&Ca::from_i64(3));
    assert!(a.equal_repr(&b));
    // Distinct minimal polynomials stay distinct extensions even when
    // the values are commensurable; equality is still decided.
    let c = {
        let twelve = ctx.sqrt(&Ca::from_i64(12));
        ctx.div_i64(&twelve, 2)
    };
    assert_eq!(ctx.check_equal(&a, &c), Truth::True);
}

#[test]
fn fields_are_shared_between_elements() {
    common::init_logger();
    let mut ctx = Context::new();
    let pi = ctx.pi();
    let x = ctx.add_i64(&pi, 1);
    let y = ctx.add_i64(&pi, 2);
    assert_eq!(x.field_ref(), y.field_ref());
}

#[test]
fn merged_fields_are_canonical() {
    common::init_logger();
    // Merging in either order lands in the same field.
    let mut ctx = Context::new();
    let pi = ctx.pi();
    let e = ctx.exp(&Ca::one());
    let a = ctx.add(&pi, &e);
    let b = ctx.add(&e, &pi);
    assert_eq!(a.field_ref(), b.field_ref());
    assert!(a.equal_repr(&b));
}

#[test]
fn generator_recognition() {
    common::init_logger();
    let mut ctx = Context::new();
    let pi = ctx.pi();
    assert!(ctx.is_gen_as_ext(&pi).is_some());
    let x = ctx.add_i64(&pi, 1);
    assert!(ctx.is_gen_as_ext(&x).is_none());
}

#[test]
fn repr_equality_is_a_congruence_witness() {
    common::init_logger();
    let mut ctx = Context::new();
    let r = ctx.sqrt(&Ca::from_i64(2));
    let a = ctx.add_i64(&r, 1);
    let b = ctx.add_i64(&r, 1);
    assert!(a.equal_repr(&b));
    assert_eq!(ctx.check_equal(&a, &b), Truth::True);
}

#[test]
fn distinct_values_have_distinct_representations_in_one_field() {
    common::init_logger();
    let mut ctx = Context::new();
    let r = ctx.sqrt(&Ca::from_i64(2));
    let a = ctx.add_i64(&r, 1);
    let b = ctx.add_i64(&r, 2);
    assert!(!a.equal_repr(&b));
    assert_eq!(ctx.check_equal(&a, &b), Truth::False);
}
