//! Ring arithmetic on elements.
//!
//! Dispatch order: rational fast paths,
//! the exhaustive specials algebra, the same-field payload operation
//! (with ideal reduction and denominator simplification after
//! multiplicative steps), and finally field merge plus recursion.
//! Condensation runs after every arithmetic step so the stored
//! representation is always the smallest field variant.

use crate::ctx::Context;
use crate::elem::Ca;
use crate::ext::{ExtRef, FuncHead};
use crate::field::{Field, FieldRef};
use crate::linalg::DependencyFinder;
use crate::mpoly::MRatFunc;
use crate::nf::NfElem;
use crate::num::{QInt, QRat};
use crate::poly::Poly;
use crate::truth::Truth;
use rustc_hash::FxHashMap;

impl Context {
    // ---- Negation ----

    pub fn neg(&mut self, x: &Ca) -> Ca {
        match x {
            Ca::Rational(q) => Ca::Rational(-q),
            Ca::NfElem(k, e) => Ca::NfElem(*k, e.neg()),
            Ca::MPolyQ(k, f) => Ca::MPolyQ(*k, f.neg()),
            Ca::Undefined => Ca::Undefined,
            Ca::Unknown => Ca::Unknown,
            Ca::UnsignedInfinity => Ca::UnsignedInfinity,
            Ca::SignedInfinity(d) => {
                let nd = self.neg(d);
                Ca::SignedInfinity(Box::new(nd))
            }
        }
    }

    // ---- Scalar fast paths ----

    pub fn add_qrat_elem(&mut self, x: &Ca, q: &QRat) -> Ca {
        if q.is_zero() || x.is_special() {
            return x.clone();
        }
        match x {
            Ca::Rational(a) => Ca::Rational(a + q),
            Ca::NfElem(k, e) => Ca::NfElem(*k, e.add_qrat(q)),
            Ca::MPolyQ(k, f) => {
                let sum = f.add_qrat(q);
                self.condense(Ca::MPolyQ(*k, sum))
            }
            _ => unreachable!(),
        }
    }

    pub fn mul_qrat_elem(&mut self, x: &Ca, q: &QRat) -> Ca {
        if x.is_special() {
            return match x {
                Ca::SignedInfinity(_) => {
                    if q.is_zero() {
                        Ca::Undefined
                    } else if q.is_negative() {
                        self.neg(x)
                    } else {
                        x.clone()
                    }
                }
                Ca::UnsignedInfinity => {
                    if q.is_zero() {
                        Ca::Undefined
                    } else {
                        Ca::UnsignedInfinity
                    }
                }
                _ => x.clone(),
            };
        }
        if q.is_zero() {
            return Ca::zero();
        }
        match x {
            Ca::Rational(a) => Ca::Rational(a * q),
            Ca::NfElem(k, e) => Ca::NfElem(*k, e.mul_qrat(q)),
            Ca::MPolyQ(k, f) => Ca::MPolyQ(*k, f.mul_qrat(q)),
            _ => unreachable!(),
        }
    }

    pub fn add_i64(&mut self, x: &Ca, v: i64) -> Ca {
        self.add_qrat_elem(x, &QRat::from(v))
    }

    pub fn sub_i64(&mut self, x: &Ca, v: i64) -> Ca {
        self.add_qrat_elem(x, &QRat::from(-v))
    }

    pub fn mul_i64(&mut self, x: &Ca, v: i64) -> Ca {
        self.mul_qrat_elem(x, &QRat::from(v))
    }

    pub fn div_i64(&mut self, x: &Ca, v: i64) -> Ca {
        if v == 0 {
            let y = Ca::zero();
            return self.div(x, &y);
        }
        self.mul_qrat_elem(x, &QRat::from((1, v)))
    }

    // ---- Addition ----

    pub fn add(&mut self, x: &Ca, y: &Ca) -> Ca {
        if let (Ca::Rational(a), Ca::Rational(b)) = (x, y) {
            return Ca::Rational(a + b);
        }
        if let Ca::Rational(b) = y {
            return self.add_qrat_elem(x, &b.clone());
        }
        if let Ca::Rational(a) = x {
            return self.add_qrat_elem(y, &a.clone());
        }

        if x.is_special() || y.is_special() {
            return self.add_special(x, y);
        }

        if x.field_ref() == y.field_ref() {
            let k = x.field_ref().expect("non-rational finite elements");
            return self.add_same_field(k, x, y);
        }

        let (xm, ym) = self.merge_fields(x, y);
        let sum = self.add(&xm, &ym);
        self.condense(sum)
    }

    fn add_special(&mut self, x: &Ca, y: &Ca) -> Ca {
        if x.is_undefined() || y.is_undefined() {
            return Ca::Undefined;
        }
        if x.is_unknown() || y.is_unknown() {
            return Ca::Unknown;
        }
        if !y.is_special() {
            return x.clone();
        }
        if !x.is_special() {
            return y.clone();
        }
        match (x, y) {
            (Ca::UnsignedInfinity, Ca::UnsignedInfinity) => Ca::UnsignedInfinity,
            (Ca::UnsignedInfinity, Ca::SignedInfinity(_))
            | (Ca::SignedInfinity(_), Ca::UnsignedInfinity) => Ca::Undefined,
            (Ca::SignedInfinity(dx), Ca::SignedInfinity(dy)) => {
                let dx = (**dx).clone();
                let dy = (**dy).clone();
                match self.check_equal(&dx, &dy) {
                    Truth::True => x.clone(),
                    Truth::False => {
                        let ndy = self.neg(&dy);
                        match self.check_equal(&dx, &ndy) {
                            Truth::True => Ca::Undefined,
                            _ => Ca::Unknown,
                        }
                    }
                    Truth::Unknown => Ca::Unknown,
                }
            }
            _ => unreachable!(),
        }
    }

    fn add_same_field(&mut self, k: FieldRef, x: &Ca, y: &Ca) -> Ca {
        match (x, y) {
            (Ca::NfElem(_, a), Ca::NfElem(_, b)) => {
                let sum = a.add(b);
                self.condense(Ca::NfElem(k, sum))
            }
            (Ca::MPolyQ(_, a), Ca::MPolyQ(_, b)) => {
                let sum = a.add(b);
                self.normalize_multi(k, sum)
            }
            _ => unreachable!("same field implies same payload variant"),
        }
    }

    pub fn sub(&mut self, x: &Ca, y: &Ca) -> Ca {
        let ny = self.neg(y);
        self.add(x, &ny)
    }

    // ---- Multiplication ----

    pub fn mul(&mut self, x: &Ca, y: &Ca) -> Ca {
        if let (Ca::Rational(a), Ca::Rational(b)) = (x, y) {
            return Ca::Rational(a * b);
        }
        if let Ca::Rational(b) = y {
            if x.is_finite() {
                return self.mul_qrat_elem(x, &b.clone());
            }
        }
        if let Ca::Rational(a) = x {
            if y.is_finite() {
                return self.mul_qrat_elem(y, &a.clone());
            }
        }

        if x.is_special() || y.is_special() {
            return self.mul_special(x, y);
        }

        if x.field_ref() == y.field_ref() {
            let k = x.field_ref().expect("non-rational finite elements");
            return self.mul_same_field(k, x, y);
        }

        let (xm, ym) = self.merge_fields(x, y);
        let prod = self.mul(&xm, &ym);
        self.condense(prod)
    }

    fn mul_special(&mut self, x: &Ca, y: &Ca) -> Ca {
        if x.is_undefined() || y.is_undefined() {
            return Ca::Undefined;
        }
        if x.is_unknown() || y.is_unknown() {
            return Ca::Unknown;
        }
        // uinf absorbs any infinity.
        if (x.is_uinf() && y.is_any_inf()) || (y.is_uinf() && x.is_any_inf()) {
            return Ca::UnsignedInfinity;
        }
        if x.is_uinf() || y.is_uinf() {
            let other = if x.is_uinf() { y } else { x };
            return match self.check_is_zero(other) {
                Truth::True => Ca::Undefined,
                Truth::False => Ca::UnsignedInfinity,
                Truth::Unknown => Ca::Unknown,
            };
        }
        // At least one signed infinity remains.
        let xz = self.check_is_zero(x);
        let yz = self.check_is_zero(y);
        if xz == Truth::True || yz == Truth::True {
            return Ca::Undefined;
        }
        if xz == Truth::Unknown || yz == Truth::Unknown {
            return Ca::Unknown;
        }
        let sx = self.sgn(x.inf_direction().unwrap_or(x));
        let sy = self.sgn(y.inf_direction().unwrap_or(y));
        let dir = self.mul(&sx, &sy);
        if dir.is_finite() {
            Ca::signed_inf(dir)
        } else {
            Ca::Unknown
        }
    }

    fn mul_same_field(&mut self, k: FieldRef, x: &Ca, y: &Ca) -> Ca {
        match (x, y) {
            (Ca::NfElem(_, a), Ca::NfElem(_, b)) => {
                let Field::Algebraic { monic, .. } = self.field(k) else {
                    panic!("NfElem in non-algebraic field");
                };
                let prod = a.mul(b, &monic.clone());
                self.condense(Ca::NfElem(k, prod))
            }
            (Ca::MPolyQ(_, a), Ca::MPolyQ(_, b)) => {
                let prod = a.mul(b);
                self.normalize_multi(k, prod)
            }
            _ => unreachable!("same field implies same payload variant"),
        }
    }

    // ---- Division and inversion ----

    pub fn inv(&mut self, x: &Ca) -> Ca {
        match x {
            Ca::Rational(q) => {
                if q.is_zero() {
                    Ca::UnsignedInfinity
                } else {
                    Ca::Rational(q.inv())
                }
            }
            Ca::Undefined => Ca::Undefined,
            Ca::Unknown => Ca::Unknown,
            Ca::UnsignedInfinity | Ca::SignedInfinity(_) => Ca::zero(),
            _ => match self.check_is_zero(x) {
                Truth::True => Ca::UnsignedInfinity,
                Truth::Unknown => Ca::Unknown,
                Truth::False => match x {
                    Ca::NfElem(k, e) => {
                        let Field::Algebraic { monic, .. } = self.field(*k) else {
                            panic!("NfElem in non-algebraic field");
                        };
                        let inv = e.inv(&monic.clone());
                        self.condense(Ca::NfElem(*k, inv))
                    }
                    Ca::MPolyQ(k, f) => {
                        let inv = f.inv();
                        self.normalize_multi(*k, inv)
                    }
                    _ => unreachable!(),
                },
            },
        }
    }

    pub fn div(&mut self, x: &Ca, y: &Ca) -> Ca {
        // 0/0 comes out Undefined through inv(0) = uinf and 0 * uinf.
        let iy = self.inv(y);
        self.mul(x, &iy)
    }

    // ---- Power ----

    /// `x^y` with the closed-form ladder of the front end: integer and
    /// half-integer exponents expand, exp/pow bases combine, everything
    /// else becomes a formal Pow extension.
    pub fn pow(&mut self, x: &Ca, y: &Ca) -> Ca {
        if x.is_undefined() || y.is_undefined() {
            return Ca::Undefined;
        }
        if x.is_unknown() || y.is_unknown() {
            return Ca::Unknown;
        }
        if let Ca::Rational(q) = y {
            let q = q.clone();
            return self.pow_qrat(x, &q);
        }
        if x.is_special() || y.is_special() {
            // Remaining special-base or special-exponent combinations are
            // left undecided.
            return Ca::Unknown;
        }
        // exp(a)^y = exp(a*y)
        if let Some(e) = self.is_gen_as_ext(x) {
            if let Some((FuncHead::Exp, args)) =
                self.ext(e).as_function().map(|(h, a)| (h, a.to_vec()))
            {
                let prod = self.mul(&args[0], y);
                return self.exp(&prod);
            }
            // (z^a)^y = exp(y * log(z^a)) with the principal correction
            // folded into log.
            let is_pow = matches!(self.ext(e).as_function(), Some((FuncHead::Pow, _)));
            if is_pow {
                let l = self.log(x);
                let prod = self.mul(&l, y);
                return self.exp(&prod);
            }
        }
        let e = self.ext_function(FuncHead::Pow, vec![x.clone(), y.clone()]);
        self.make_gen_element(e)
    }

    pub fn pow_i64_elem(&mut self, x: &Ca, n: i64) -> Ca {
        self.pow_qrat(x, &QRat::from(n))
    }

    fn pow_qrat(&mut self, x: &Ca, q: &QRat) -> Ca {
        if q.is_zero() {
            // 0^0 is undefined on the direct path.
            return match self.check_is_zero(x) {
                Truth::True => Ca::Undefined,
                Truth::False => Ca::one(),
                Truth::Unknown => Ca::Unknown,
            };
        }
        if x.is_special() {
            return self.pow_special_base(x, q);
        }
        if q.is_integer() {
            let n = match q.numer().to_i64() {
                Some(n) => n,
                None => {
                    let y = Ca::Rational(q.clone());
                    let e = self.ext_function(FuncHead::Pow, vec![x.clone(), y]);
                    return self.make_gen_element(e);
                }
            };
            if n == 1 {
                return x.clone();
            }
            if n == -1 {
                return self.inv(x);
            }
            if n.abs() <= self.options.pow_limit {
                return self.pow_binary(x, n);
            }
            // Large integer powers of small rationals may still be exact.
            if let Ca::Rational(base) = x {
                let bits = base.numer().bits().max(base.denom().bits()) as u64;
                if !base.is_zero()
                    && bits.saturating_mul(n.unsigned_abs()) < self.options.prec_limit as u64
                {
                    return Ca::Rational(base.pow_i64(n));
                }
            }
            let y = Ca::Rational(q.clone());
            let e = self.ext_function(FuncHead::Pow, vec![x.clone(), y]);
            return self.make_gen_element(e);
        }
        // Half-integer exponents go through sqrt.
        if q.denom() == QInt::from(2i64) {
            let p = q.numer();
            if let Some(p) = p.to_i64() {
                let r = self.sqrt(x);
                return self.pow_i64_elem(&r, p);
            }
        }
        // Rational exponent with small denominator on an algebraic base.
        if let Some(alg) = self.eval_qqbar(x) {
            if let (Some(p), Some(den)) = (q.numer().to_i64(), q.denom().to_i64()) {
                if den <= 12 {
                    let limit = self.options.qqbar_deg_limit;
                    if let Some(r) = alg.pow_rational(p, den as u32, limit) {
                        return self.from_alg(r);
                    }
                }
            }
        }
        // exp(a)^q combines as well.
        if let Some(e) = self.is_gen_as_ext(x) {
            if let Some((FuncHead::Exp, args)) =
                self.ext(e).as_function().map(|(h, a)| (h, a.to_vec()))
            {
                let prod = self.mul_qrat_elem(&args[0], q);
                return self.exp(&prod);
            }
        }
        let y = Ca::Rational(q.clone());
        let e = self.ext_function(FuncHead::Pow, vec![x.clone(), y]);
        self.make_gen_element(e)
    }

    fn pow_special_base(&mut self, x: &Ca, q: &QRat) -> Ca {
        match x {
            Ca::UnsignedInfinity => {
                if q.is_negative() {
                    Ca::zero()
                } else {
                    Ca::UnsignedInfinity
                }
            }
            Ca::SignedInfinity(_) => {
                if q.is_negative() {
                    Ca::zero()
                } else if q.is_integer() {
                    let n = q.numer();
                    let d = x.inf_direction().cloned().unwrap_or_else(Ca::one);
                    if let Some(n) = n.to_i64() {
                        let dir = self.pow_i64_elem(&d, n);
                        if dir.is_finite() {
                            return Ca::signed_inf(dir);
                        }
                    }
                    Ca::Unknown
                } else {
                    Ca::Unknown
                }
            }
            _ => Ca::Unknown,
        }
    }

    fn pow_binary(&mut self, x: &Ca, n: i64) -> Ca {
        let base = if n < 0 { self.inv(x) } else { x.clone() };
        if base.is_special() {
            // inv may have produced uinf (zero base) or specials.
            return match &base {
                Ca::UnsignedInfinity => Ca::UnsignedInfinity,
                other => other.clone(),
            };
        }
        let mut result = Ca::one();
        let mut b = base;
        let mut e = n.unsigned_abs();
        loop {
            if e & 1 == 1 {
                result = self.mul(&result, &b);
            }
            e >>= 1;
            if e == 0 {
                break;
            }
            b = {
                let bb = b.clone();
                self.mul(&bb, &b)
            };
        }
        result
    }

    // ---- Fused dot product ----

    /// `initial +/- sum_i xs[i] * ys[i]`.
    pub fn dot(&mut self, initial: &Ca, subtract: bool, xs: &[Ca], ys: &[Ca]) -> Ca {
        assert_eq!(xs.len(), ys.len(), "dot: length mismatch");
        let mut acc = initial.clone();
        for (x, y) in xs.iter().zip(ys.iter()) {
            let p = self.mul(x, y);
            acc = if subtract {
                self.sub(&acc, &p)
            } else {
                self.add(&acc, &p)
            };
        }
        acc
    }

    // ---- Ideal reduction and condensation ----

    /// Reduce a Multi payload modulo its field ideal, simplify the
    /// denominator, and condense.
    pub(crate) fn normalize_multi(&mut self, k: FieldRef, f: MRatFunc) -> Ca {
        let ideal = self.field(k).ideal().to_vec();
        let f = if ideal.is_empty() {
            f
        } else {
            f.reduce_ideal(&ideal).simplify_fraction_ideal(&ideal)
        };
        self.condense(Ca::MPolyQ(k, f))
    }

    /// Demote an element to the smallest representing field variant.
    /// Idempotent; invoked after every arithmetic step.
    pub fn condense(&mut self, x: Ca) -> Ca {
        match x {
            Ca::NfElem(k, e) => match e.as_qrat() {
                Some(q) => Ca::Rational(q),
                None => Ca::NfElem(k, e),
            },
            Ca::MPolyQ(k, f) => {
                if let Some(q) = f.as_qrat() {
                    return Ca::Rational(q);
                }
                let gens = self.field(k).gens();
                let used = f.vars_used();
                let used_count = used.iter().filter(|&&u| u).count();
                if used_count < gens.len() {
                    // Strict subset: demote into the subfield.
                    let sub_gens: Vec<ExtRef> = gens
                        .iter()
                        .zip(used.iter())
                        .filter(|(_, &u)| u)
                        .map(|(&g, _)| g)
                        .collect();
                    let mut map = vec![0usize; gens.len()];
                    let mut next = 0usize;
                    for (i, &u) in used.iter().enumerate() {
                        if u {
                            map[i] = next;
                            next += 1;
                        }
                    }
                    let sub_k = self.field_for_gens(sub_gens.clone());
                    match self.field(sub_k) {
                        Field::Algebraic { .. } => {
                            let f2 = f.compose_vars(&map, 1);
                            return self.multi_to_nf(sub_k, &f2);
                        }
                        Field::Multi { .. } => {
                            let f2 = f.compose_vars(&map, sub_gens.len());
                            let reduced = {
                                let ideal = self.field(sub_k).ideal().to_vec();
                                if ideal.is_empty() {
                                    f2
                                } else {
                                    f2.reduce_ideal(&ideal)
                                }
                            };
                            return self.condense(Ca::MPolyQ(sub_k, reduced));
                        }
                        Field::Rational => unreachable!("nonempty generator set"),
                    }
                }
                // Single algebraic generator: move to the number-field
                // representation.
                if gens.len() == 1 && self.ext(gens[0]).is_algebraic() {
                    let single = self.field_single(gens[0]);
                    return self.multi_to_nf(single, &f);
                }
                Ca::MPolyQ(k, f)
            }
            other => other,
        }
    }

    /// Convert a univariate Multi payload into the number field of its
    /// generator.
    fn multi_to_nf(&mut self, nf_field: FieldRef, f: &MRatFunc) -> Ca {
        let Field::Algebraic { monic, .. } = self.field(nf_field) else {
            panic!("multi_to_nf target is not a number field");
        };
        let monic = monic.clone();
        let num = Poly::from_qint_coeffs(&f.numer().to_univariate_int(0));
        let den = Poly::from_qint_coeffs(&f.denom().to_univariate_int(0));
        let num_e = NfElem::from_poly(&num, &monic);
        let den_e = NfElem::from_poly(&den, &monic);
        let value = num_e.div(&den_e, &monic);
        match value.as_qrat() {
            Some(q) => Ca::Rational(q),
            None => Ca::NfElem(nf_field, value),
        }
    }

    // ---- Field merge ----

    /// Rewrite two finite elements into a common field.
    pub(crate) fn merge_fields(&mut self, x: &Ca, y: &Ca) -> (Ca, Ca) {
        debug_assert!(x.is_finite() && y.is_finite());
        let mut gens: Vec<ExtRef> = Vec::new();
        for k in [x.field_ref(), y.field_ref()].into_iter().flatten() {
            gens.extend(self.field(k).gens());
        }
        gens.sort_by(|&a, &b| self.cmp_ext(a, b));
        gens.dedup();

        // Two algebraic generators: try to collapse into one number
        // field through a primitive element.
        if gens.len() == 2
            && gens.iter().all(|&g| self.ext(g).is_algebraic())
        {
            if let Some((target, maps)) = self.try_collapse(gens[0], gens[1]) {
                let xr = self.rewrite_into_nf(x, target, &maps);
                let yr = self.rewrite_into_nf(y, target, &maps);
                if let (Some(xr), Some(yr)) = (xr, yr) {
                    return (xr, yr);
                }
            }
        }

        let k = self.field_for_gens(gens.clone());
        let gens = self.field(k).gens();
        let fx = self
            .inject_payload(x, &gens)
            .expect("merge target contains all generators");
        let fy = self
            .inject_payload(y, &gens)
            .expect("merge target contains all generators");
        match self.field(k) {
            Field::Algebraic { .. } => {
                // Single algebraic generator after dedup.
                let xr = self.multi_to_nf_like(k, &fx);
                let yr = self.multi_to_nf_like(k, &fy);
                (xr, yr)
            }
            _ => (Ca::MPolyQ(k, fx), Ca::MPolyQ(k, fy)),
        }
    }

    fn multi_to_nf_like(&mut self, nf_field: FieldRef, f: &MRatFunc) -> Ca {
        self.multi_to_nf(nf_field, f)
    }

    /// Attempt a primitive-element collapse of Q(a, b) with a, b
    /// algebraic: find gamma = a + k b generating both, and return the
    /// target field plus the coordinates of each generator in Q(gamma).
    fn try_collapse(
        &mut self,
        ea: ExtRef,
        eb: ExtRef,
    ) -> Option<(FieldRef, FxHashMap<ExtRef, NfElem>)> {
        let a = self.ext(ea).as_algebraic()?.clone();
        let b = self.ext(eb).as_algebraic()?.clone();
        let limit = self.options.qqbar_deg_limit;
        if a.degree().checked_mul(b.degree())? > limit {
            return None;
        }
        for k in 1..=3i64 {
            let kb = b.mul_qrat(&QRat::from(k));
            let gamma = a.add(&kb, limit)?;
            let monic = gamma.minpoly().make_monic();
            let gdeg = gamma.degree();

            // Work in the tensor algebra: powers of gamma, then solve for
            // a and b in that span.
            let (pa, pb) = express_in_powers(&a, &b, k)?;
            let reduce = |p: &Poly| -> Poly {
                let (_, r) = p.div_rem(&monic);
                r
            };
            let ca = reduce(&pa);
            let cb = reduce(&pb);
            if ca.degree().is_some_and(|d| d >= gdeg)
                || cb.degree().is_some_and(|d| d >= gdeg)
            {
                continue;
            }
            // Verify both coordinates exactly.
            if gamma.eval_poly(&ca) != a || gamma.eval_poly(&cb) != b {
                continue;
            }
            let ext_g = self.ext_algebraic(gamma);
            let target = self.field_single(ext_g);
            let mut maps = FxHashMap::default();
            maps.insert(ea, NfElem::from_poly(&ca, &monic));
            maps.insert(eb, NfElem::from_poly(&cb, &monic));
            return Some((target, maps));
        }
        None
    }

    /// Rewrite an element into a number field given coordinates for each
    /// of its generators.
    fn rewrite_into_nf(
        &mut self,
        x: &Ca,
        target: FieldRef,
        maps: &FxHashMap<ExtRef, NfElem>,
    ) -> Option<Ca> {
        let Field::Algebraic { monic, .. } = self.field(target) else {
            panic!("rewrite target is not a number field");
        };
        let monic = monic.clone();
        match x {
            Ca::Rational(q) => Some(Ca::NfElem(target, NfElem::from_qrat(q))),
            Ca::NfElem(k, e) => {
                let Field::Algebraic { ext, .. } = self.field(*k) else {
                    panic!("NfElem in non-algebraic field");
                };
                let sub = maps.get(ext)?.clone();
                // Horner evaluation of the payload at the substitute.
                let mut acc = NfElem::zero();
                for c in e.poly().coeffs().iter().rev() {
                    acc = acc.mul(&sub, &monic).add_qrat(c);
                }
                Some(Ca::NfElem(target, acc))
            }
            Ca::MPolyQ(k, f) => {
                let gens = self.field(*k).gens();
                let subs: Vec<NfElem> = gens
                    .iter()
                    .map(|g| maps.get(g).cloned())
                    .collect::<Option<Vec<_>>>()?;
                let eval = |p: &crate::mpoly::MPoly| -> NfElem {
                    let mut acc = NfElem::zero();
                    for (exps, c) in p.terms() {
                        let mut term = NfElem::from_qrat(&QRat::from(c.clone()));
                        for (i, &e) in exps.iter().enumerate() {
                            if e > 0 {
                                let p = subs[i].pow_i64(e as i64, &monic);
                                term = term.mul(&p, &monic);
                            }
                        }
                        acc = acc.add(&term);
                    }
                    acc
                };
                let num = eval(f.numer());
                let den = eval(f.denom());
                if den.is_zero() {
                    return None;
                }
                Some(Ca::NfElem(target, num.div(&den, &monic)))
            }
            _ => None,
        }
    }
}

/// Solve for a and b as polynomials in gamma = a + k b inside the tensor
/// algebra Q[a] (x) Q[b]. Returns the (unreduced) polynomials when both
/// are in the span of the powers of gamma.
fn express_in_powers(a: &crate::alg::Alg, b: &crate::alg::Alg, k: i64) -> Option<(Poly, Poly)> {
    let m = a.degree();
    let n = b.degree();
    let dim = m * n;
    let tensor = TensorLite::new(a.minpoly(), b.minpoly());

    // gamma in the tensor basis.
    let mut gamma = vec![QRat::zero(); dim];
    gamma[n] = QRat::one();
    gamma[1] = &gamma[1] + &QRat::from(k);

    // Independent powers of gamma.
    let mut powers: Vec<Vec<QRat>> = Vec::new();
    let mut finder = DependencyFinder::new(dim);
    let mut pow = vec![QRat::zero(); dim];
    pow[0] = QRat::one();
    loop {
        if finder.offer(pow.clone()).is_some() {
            break;
        }
        powers.push(pow.clone());
        pow = tensor.mul(&pow, &gamma);
    }

    let solve = |target_index: usize| -> Option<Poly> {
        let mut f2 = DependencyFinder::new(dim);
        for p in &powers {
            if f2.offer(p.clone()).is_some() {
                return None;
            }
        }
        let mut target = vec![QRat::zero(); dim];
        target[target_index] = QRat::one();
        let combo = f2.offer(target)?;
        // combo: sum_j combo[j] * gamma^j + target = 0.
        let coeffs: Vec<QRat> = combo[..combo.len() - 1]
            .iter()
            .map(|c| -c)
            .collect();
        Some(Poly::from_vec(coeffs))
    };

    let pa = solve(n)?; // a = a^1 b^0
    let pb = solve(1)?; // b = a^0 b^1
    Some((pa, pb))
}

/// Minimal tensor-algebra multiplication used by the primitive-element
/// search (the full version lives with the algebraic kernel).
struct TensorLite {
    m: usize,
    n: usize,
    red_a: Vec<Vec<QRat>>,
    red_b: Vec<Vec<QRat>>,
}

impl TensorLite {
    fn new(fa: &Poly, fb: &Poly) -> Self {
        TensorLite {
            m: fa.degree().unwrap(),
            n: fb.degree().unwrap(),
            red_a: reduction_rows(&fa.make_monic()),
            red_b: reduction_rows(&fb.make_monic()),
        }
    }

    fn mul(&self, u: &[QRat], v: &[QRat]) -> Vec<QRat> {
        let (m, n) = (self.m, self.n);
        let rows = 2 * m - 1;
        let cols = 2 * n - 1;
        let mut t = vec![vec![QRat::zero(); cols]; rows];
        for i1 in 0..m {
            for j1 in 0..n {
                let a = &u[i1 * n + j1];
                if a.is_zero() {
                    continue;
                }
                for i2 in 0..m {
                    for j2 in 0..n {
                        let b = &v[i2 * n + j2];
                        if b.is_zero() {
                            continue;
                        }
                        let prod = a * b;
                        t[i1 + i2][j1 + j2] = &t[i1 + i2][j1 + j2] + &prod;
                    }
                }
            }
        }
        for kk in (m..rows).rev() {
            for col in 0..cols {
                if t[kk][col].is_zero() {
                    continue;
                }
                let c = std::mem::replace(&mut t[kk][col], QRat::zero());
                for (d, r) in self.red_a[kk - m].iter().enumerate() {
                    let delta = &c * r;
                    t[d][col] = &t[d][col] + &delta;
                }
            }
        }
        for row in t.iter_mut().take(m) {
            for l in (n..cols).rev() {
                if row[l].is_zero() {
                    continue;
                }
                let c = std::mem::replace(&mut row[l], QRat::zero());
                for (d, r) in self.red_b[l - n].iter().enumerate() {
                    let delta = &c * r;
                    row[d] = &row[d] + &delta;
                }
            }
        }
        let mut out = vec![QRat::zero(); m * n];
        for (i, row) in t.iter().enumerate().take(m) {
            for (j, c) in row.iter().enumerate().take(n) {
                out[i * n + j] = c.clone();
            }
        }
        out
    }
}

fn reduction_rows(monic: &Poly) -> Vec<Vec<QRat>> {
    let m = monic.degree().unwrap();
    let base: Vec<QRat> = (0..m).map(|i| -&monic.coeff(i)).collect();
    let mut table = vec![base];
    for _ in m + 1..=2 * m {
        let prev = table.last().unwrap().clone();
        let mut next = vec![QRat::zero(); m];
        let overflow = prev[m - 1].clone();
        for i in (1..m).rev() {
            next[i] = prev[i - 1].clone();
        }
        for (i, c) in table[0].iter().enumerate() {
            let delta = &overflow * c;
            next[i] = &next[i] + &delta;
        }
        table.push(next);
    }
    table
}
