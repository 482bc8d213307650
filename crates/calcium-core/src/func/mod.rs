//! Transcendental front-end.
//!
//! Each function first dispatches the special values, then attempts its
//! closed-form simplifications, and only then introduces an inert
//! extension and returns its generator element.

pub mod exp_log;
pub mod gamma_special;
pub mod parts;
pub mod sqrt;
pub mod trig;

use crate::ctx::Context;
use crate::elem::Ca;
use crate::ext::{ExtRef, FuncHead};
use crate::field::Field;
use crate::num::QRat;
use rustc_hash::FxHashMap;

impl Context {
    /// Detect `x = r * pi * i` with rational r: a single monomial over
    /// the generators pi and i.
    pub(crate) fn as_rational_multiple_of_pi_i(&mut self, x: &Ca) -> Option<QRat> {
        let Ca::MPolyQ(k, f) = x else {
            return None;
        };
        let den = f.denom().as_constant()?;
        let gens = self.field(*k).gens();
        if f.numer().num_terms() != 1 {
            return None;
        }
        let (exps, coeff) = &f.numer().terms()[0];
        let mut pi_pos = None;
        let mut i_pos = None;
        for (j, &g) in gens.iter().enumerate() {
            if matches!(self.ext(g).as_function(), Some((FuncHead::Pi, _))) {
                pi_pos = Some(j);
            }
            if g == self.ext_i() {
                i_pos = Some(j);
            }
        }
        let (pi_pos, i_pos) = (pi_pos?, i_pos?);
        for (j, &e) in exps.iter().enumerate() {
            let want = if j == pi_pos || j == i_pos { 1 } else { 0 };
            if e != want {
                return None;
            }
        }
        Some(&QRat::from(coeff.clone()) / &QRat::from(den))
    }

    /// The generators of `x`'s field whose head is `Log`, with positions.
    pub(crate) fn log_generators(&self, x: &Ca) -> Vec<(usize, ExtRef, Ca)> {
        let Some(k) = x.field_ref() else {
            return vec![];
        };
        let Field::Multi { gens, .. } = self.field(k) else {
            return vec![];
        };
        let mut out = Vec::new();
        for (j, &g) in gens.iter().enumerate() {
            if let Some((FuncHead::Log, args)) = self.ext(g).as_function() {
                out.push((j, g, args[0].clone()));
            }
        }
        out
    }

    /// Substitute elements for the generators of `x`'s field and
    /// re-evaluate the payload with element arithmetic.
    pub(crate) fn eval_payload_subst(
        &mut self,
        x: &Ca,
        subs: &FxHashMap<ExtRef, Ca>,
    ) -> Ca {
        match x {
            Ca::Rational(_) => x.clone(),
            Ca::NfElem(k, e) => {
                let Field::Algebraic { ext, .. } = self.field(*k) else {
                    panic!("NfElem in non-algebraic field");
                };
                let gen_value = match subs.get(ext) {
                    Some(v) => v.clone(),
                    None => return x.clone(),
                };
                let mut acc = Ca::zero();
                for c in e.poly().coeffs().iter().rev() {
                    let t = self.mul(&acc, &gen_value);
                    acc = self.add_qrat_elem(&t, c);
                }
                acc
            }
            Ca::MPolyQ(k, f) => {
                let gens = self.field(*k).gens();
                let values: Vec<Ca> = gens
                    .iter()
                    .map(|g| match subs.get(g) {
                        Some(v) => v.clone(),
                        None => self.make_gen_element(*g),
                    })
                    .collect();
                let num = self.eval_mpoly_at(f.numer(), &values);
                let den = self.eval_mpoly_at(f.denom(), &values);
                self.div(&num, &den)
            }
            other => other.clone(),
        }
    }

    /// Evaluate an integer multivariate polynomial on elements.
    pub(crate) fn eval_mpoly_at(&mut self, p: &crate::mpoly::MPoly, values: &[Ca]) -> Ca {
        let mut acc = Ca::zero();
        for (exps, c) in p.terms() {
            let mut term = Ca::from_qint(c);
            for (i, &e) in exps.iter().enumerate() {
                if e > 0 {
                    let pw = self.pow_i64_elem(&values[i], e as i64);
                    term = self.mul(&term, &pw);
                }
            }
            acc = self.add(&acc, &term);
        }
        acc
    }
}
