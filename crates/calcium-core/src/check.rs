//! The three-valued predicate engine and exact conversions.
//!
//! Every predicate terminates within the precision budget of the
//! context options and answers `Unknown` rather than looping. Numerical
//! enclosures can only *disprove*; proofs come from structure, exact
//! algebraic evaluation, or verified rewriting.

use crate::alg::Alg;
use crate::ball::CBall;
use crate::ctx::Context;
use crate::elem::Ca;
use crate::ext::{ExtRef, FuncHead};
use crate::field::Field;
use crate::linalg::integer_relation;
use crate::num::{QInt, QRat};
use crate::truth::Truth;
use rustc_hash::FxHashMap;
use std::cmp::Ordering;

/// Depth bound for the rewriting recursion inside the zero test.
const REWRITE_DEPTH: usize = 3;

impl Context {
    // ---- Conversions ----

    /// Exact algebraic value of an element, when its field permits the
    /// computation within the degree budget.
    pub fn eval_qqbar(&mut self, x: &Ca) -> Option<Alg> {
        match x {
            Ca::Rational(q) => Some(Alg::from_qrat(q)),
            Ca::NfElem(k, e) => {
                let Field::Algebraic { ext, .. } = self.field(*k) else {
                    panic!("NfElem in non-algebraic field");
                };
                let alpha = self.ext(*ext).as_algebraic()?.clone();
                Some(alpha.eval_poly(e.poly()))
            }
            Ca::MPolyQ(k, f) => {
                let gens = self.field(*k).gens();
                let mut algs = Vec::with_capacity(gens.len());
                for g in &gens {
                    algs.push(self.ext(*g).as_algebraic()?.clone());
                }
                let limit = self.options.qqbar_deg_limit;
                let num = eval_mpoly_alg(f.numer(), &algs, limit)?;
                let den = eval_mpoly_alg(f.denom(), &algs, limit)?;
                num.div(&den, limit)
            }
            _ => None,
        }
    }

    pub fn to_qqbar(&mut self, x: &Ca) -> Option<Alg> {
        self.eval_qqbar(x)
    }

    pub fn to_rational(&self, x: &Ca) -> Option<QRat> {
        x.as_rational().cloned()
    }

    pub fn to_integer(&self, x: &Ca) -> Option<QInt> {
        x.as_rational().and_then(QRat::to_qint)
    }

    /// Rigorous enclosure at the requested precision.
    pub fn to_ball(&mut self, x: &Ca, prec: u32) -> CBall {
        self.elem_enclosure(x, prec)
    }

    /// Enclosure whose real and imaginary radii are pushed below
    /// 2^-prec (or as far as the budget allows).
    pub fn to_ball_accurate_parts(&mut self, x: &Ca, prec: u32) -> CBall {
        let target = rug::Float::with_val(32, rug::Float::i_exp(1, -(prec as i32)));
        let mut work = prec.max(64);
        let mut best = self.elem_enclosure(x, work);
        while work <= self.options.prec_limit {
            if !best.is_indeterminate()
                && *best.re.rad() < target
                && *best.im.rad() < target
            {
                break;
            }
            work *= 2;
            best = self.elem_enclosure(x, work);
        }
        best
    }

    // ---- Zero testing ----

    pub fn check_is_zero(&mut self, x: &Ca) -> Truth {
        self.check_is_zero_depth(x, 0)
    }

    pub(crate) fn check_is_zero_depth(&mut self, x: &Ca, depth: usize) -> Truth {
        match x {
            Ca::Unknown => return Truth::Unknown,
            Ca::Undefined | Ca::UnsignedInfinity | Ca::SignedInfinity(_) => {
                return Truth::False;
            }
            Ca::Rational(q) => return Truth::from(q.is_zero()),
            Ca::NfElem(_, e) => {
                // Condensed payloads are never rational, hence nonzero.
                return Truth::from(e.is_zero());
            }
            Ca::MPolyQ(_, f) => {
                if f.is_zero() {
                    return Truth::True;
                }
            }
        }
        if self.options.verbose {
            log::debug!("zero test enters the adaptive cascade");
        }

        // Denominator elimination: in a Multi field the denominator is
        // nonzero by invariant, so only the numerator matters.
        let numerator = match x {
            Ca::MPolyQ(k, f) => Ca::MPolyQ(
                *k,
                crate::mpoly::MRatFunc::from_mpoly(f.numer().clone()),
            ),
            _ => x.clone(),
        };

        // Adaptive numeric disproof with the exact algebraic fallback on
        // the first pass.
        let mut prec = 64u32;
        let mut first = true;
        while prec <= self.options.prec_limit {
            let b = self.elem_enclosure(&numerator, prec);
            if b.is_nonzero() {
                return Truth::False;
            }
            if first {
                first = false;
                if let Some(alg) = self.eval_qqbar(&numerator) {
                    return Truth::from(alg.is_zero());
                }
            }
            prec *= 2;
        }

        // Verified symbolic rewriting of logarithm/exponential relations.
        if depth < REWRITE_DEPTH {
            if let Some(rewritten) = self.rewrite_transcendental(&numerator, depth) {
                let r = self.check_is_zero_depth(&rewritten, depth + 1);
                if r != Truth::Unknown {
                    return r;
                }
            }
        }

        // Multiplicative factorization: the product is zero when one
        // factor is provably zero.
        if depth < REWRITE_DEPTH {
            let opts = crate::cafactor::FactorOptions::for_zero_testing();
            let factors = self.factor_elem(&numerator, &opts);
            if factors.items.len() > 1 {
                for (base, _) in &factors.items {
                    if self.check_is_zero_depth(base, depth + 1) == Truth::True {
                        return Truth::True;
                    }
                }
            }
        }

        Truth::Unknown
    }

    /// Step five of the zero-test cascade: discover and exactly verify a
    /// multiplicative relation among logarithm generators (with pi
    /// entering as log(-1)), or collapse commensurable exponentials.
    fn rewrite_transcendental(&mut self, x: &Ca, depth: usize) -> Option<Ca> {
        if let Some(r) = self.rewrite_log_relation(x) {
            return Some(r);
        }
        self.rewrite_exp_relation(x, depth)
    }

    fn rewrite_log_relation(&mut self, x: &Ca) -> Option<Ca> {
        let k = x.field_ref()?;
        let gens = self.field(k).gens();

        // Collect Log generators with exactly-evaluable algebraic
        // arguments, plus pi as the logarithm of -1.
        let mut entries: Vec<(Option<ExtRef>, Alg)> = Vec::new();
        let mut pi_present = false;
        for &g in &gens {
            match self.ext(g).as_function().map(|(h, a)| (h, a.to_vec())) {
                Some((FuncHead::Log, args)) => {
                    // Only logarithms of exact algebraic values take part.
                    match self.eval_qqbar(&args[0]) {
                        Some(alg) if !alg.is_zero() => entries.push((Some(g), alg)),
                        _ => {}
                    }
                }
                Some((FuncHead::Pi, _)) => pi_present = true,
                _ => {}
            }
        }
        if entries.is_empty() || entries.len() + usize::from(pi_present) < 2 {
            return None;
        }

        // Numerical relation candidate.
        let prec = 320u32;
        let mut columns: Vec<Vec<rug::Float>> = Vec::new();
        for (g, _) in &entries {
            let b = self.ext_enclosure(g.unwrap(), prec);
            columns.push(vec![b.re.mid().clone(), b.im.mid().clone()]);
        }
        if pi_present {
            let pi = crate::ball::RBall::pi(prec);
            columns.push(vec![rug::Float::new(prec), pi.mid().clone()]);
        }
        let rel = integer_relation(&columns, 240)?;

        // Exact verification: the product of the bases must be a root of
        // unity.
        let limit = self.options.qqbar_deg_limit;
        let mut w = Alg::one();
        for ((_, alg), e) in entries.iter().zip(rel.iter()) {
            let e = e.to_i64()?;
            if e != 0 {
                let p = alg.pow_i64(e, limit)?;
                w = w.mul(&p, limit)?;
            }
        }
        let e_pi = if pi_present {
            rel.last()?.to_i64()?
        } else {
            0
        };
        if e_pi != 0 {
            // pi contributes exp(e_pi * i pi) = (-1)^e_pi.
            if e_pi.rem_euclid(2) == 1 {
                w = w.mul_qrat(&QRat::from(-1));
            }
        }
        let (p, q) = w.log_pi_i()?;

        // The verified identity: sum e_j L_j + e_pi (pi i) = i pi p/q
        // + 2 pi i m. Find m from the enclosure.
        let m = {
            let mut sum = CBall::exact_zero();
            for ((g, _), e) in entries.iter().zip(rel.iter()) {
                let e = e.to_i64()?;
                if e != 0 {
                    let b = self.ext_enclosure(g.unwrap(), prec);
                    let scaled = b.mul(&CBall::from_i64(e, prec), prec);
                    sum = sum.add(&scaled, prec);
                }
            }
            if e_pi != 0 {
                let pi = crate::ball::RBall::pi(prec);
                let term = CBall::new(
                    crate::ball::RBall::exact_zero(),
                    pi.mul(&crate::ball::RBall::from_i64(e_pi, prec), prec),
                );
                sum = sum.add(&term, prec);
            }
            // m = (sum - i pi p/q) / (2 pi i)
            let pi = crate::ball::RBall::pi(prec);
            let target = pi.mul(&crate::ball::RBall::from_qrat(&QRat::from((p, q)), prec), prec);
            let diff_im = sum.im.sub(&target, prec);
            let two_pi = pi.mul(&crate::ball::RBall::from_i64(2, prec), prec);
            let m_ball = diff_im.div(&two_pi, prec);
            if !sum.re.contains_zero() {
                return None;
            }
            m_ball.unique_integer()?
        };

        // Solve the relation for one logarithm generator and substitute.
        let pivot = entries
            .iter()
            .zip(rel.iter())
            .position(|((g, _), e)| g.is_some() && !e.is_zero())?;
        let e_pivot = rel[pivot].to_i64()?;
        let pivot_ext = entries[pivot].0?;

        // L_pivot = [ (p/q + 2m - e_pi) pi i - sum_{j != pivot} e_j L_j ] / e_pivot
        let pi_i = self.pi_i();
        let coeff = {
            let base = &QRat::from((p, q)) + &QRat::from(QInt::from(2i64) * m);
            &base - &QRat::from(e_pi)
        };
        let mut replacement = self.mul_qrat_elem(&pi_i, &coeff);
        for (j, ((g, _), e)) in entries.iter().zip(rel.iter()).enumerate() {
            if j == pivot {
                continue;
            }
            let e = e.to_i64()?;
            if e == 0 {
                continue;
            }
            let Some(g) = g else { continue };
            let l = self.make_gen_element(*g);
            let t = self.mul_i64(&l, e);
            replacement = self.sub(&replacement, &t);
        }
        replacement = self.mul_qrat_elem(&replacement, &QRat::from((1, e_pivot)));

        if self.options.verbose {
            log::debug!("verified a logarithm relation; substituting generator");
        }
        let mut subs = FxHashMap::default();
        subs.insert(pivot_ext, replacement);
        Some(self.eval_payload_subst(x, &subs))
    }

    /// Discover an integer relation among the arguments of exponential
    /// generators, verify it exactly, and reduce the payload modulo the
    /// induced binomial relation  prod exp(a_i)^(e_i) = 1.
    fn rewrite_exp_relation(&mut self, x: &Ca, depth: usize) -> Option<Ca> {
        let Ca::MPolyQ(k, f) = x else {
            return None;
        };
        let k = *k;
        let f = f.clone();
        let gens = self.field(k).gens();
        let nvars = gens.len();
        let mut exps: Vec<(usize, Ca)> = Vec::new();
        for (j, &g) in gens.iter().enumerate() {
            if let Some((FuncHead::Exp, args)) =
                self.ext(g).as_function().map(|(h, a)| (h, a.to_vec()))
            {
                exps.push((j, args[0].clone()));
            }
        }
        if exps.len() < 2 {
            return None;
        }

        // Candidate relation from the argument enclosures.
        let prec = 320u32;
        let mut columns = Vec::with_capacity(exps.len());
        for (_, a) in &exps {
            let b = self.elem_enclosure(a, prec);
            if b.is_indeterminate() {
                return None;
            }
            columns.push(vec![b.re.mid().clone(), b.im.mid().clone()]);
        }
        let rel = integer_relation(&columns, 240)?;
        if rel.iter().filter(|e| !e.is_zero()).count() < 2 {
            return None;
        }

        // The combination of the arguments must be an exact multiple of
        // 2 pi i.
        let mut s = Ca::zero();
        for ((_, a), e) in exps.iter().zip(rel.iter()) {
            let e = e.to_i64()?;
            if e != 0 {
                let t = self.mul_i64(a, e);
                s = self.add(&s, &t);
            }
        }
        let m = {
            let bs = self.elem_enclosure(&s, 256);
            if !bs.re.contains_zero() {
                return None;
            }
            let two_pi = crate::ball::RBall::pi(256)
                .mul(&crate::ball::RBall::from_i64(2, 256), 256);
            bs.im.div(&two_pi, 256).unique_integer()?
        };
        let residual = if m.is_zero() {
            s
        } else {
            let pi_i = self.pi_i();
            let shift = self.mul_qrat_elem(&pi_i, &QRat::from(QInt::from(2i64) * m));
            self.sub(&s, &shift)
        };
        if self.check_is_zero_depth(&residual, depth + 1) != Truth::True {
            return None;
        }

        // Binomial relation: prod_{e>0} x^e - prod_{e<0} x^(-e).
        let mut pos = crate::mpoly::MPoly::one(nvars);
        let mut neg = crate::mpoly::MPoly::one(nvars);
        for ((j, _), e) in exps.iter().zip(rel.iter()) {
            let e = e.to_i64()?;
            if e > 0 {
                pos = pos.mul(&crate::mpoly::MPoly::gen(nvars, *j).pow_u32(e as u32));
            } else if e < 0 {
                neg = neg.mul(&crate::mpoly::MPoly::gen(nvars, *j).pow_u32((-e) as u32));
            }
        }
        let relation = pos.sub(&neg);
        if relation.is_zero() {
            return None;
        }
        if self.options.verbose {
            log::debug!("verified an exponential relation; reducing payload");
        }
        let reduced = f.reduce_ideal(&[relation]);
        if reduced == f {
            None
        } else {
            Some(self.condense(Ca::MPolyQ(k, reduced)))
        }
    }

    // ---- Equality ----

    pub fn check_equal(&mut self, x: &Ca, y: &Ca) -> Truth {
        if let (Ca::Rational(a), Ca::Rational(b)) = (x, y) {
            return Truth::from(a == b);
        }
        if x.is_special() || y.is_special() {
            if x.is_unknown() || y.is_unknown() {
                return Truth::Unknown;
            }
            if let (Ca::SignedInfinity(dx), Ca::SignedInfinity(dy)) = (x, y) {
                let dx = (**dx).clone();
                let dy = (**dy).clone();
                return self.check_equal(&dx, &dy);
            }
            // Remaining specials are equal only when identical.
            return Truth::from(
                matches!((x, y), (Ca::Undefined, Ca::Undefined))
                    || matches!((x, y), (Ca::UnsignedInfinity, Ca::UnsignedInfinity)),
            );
        }
        if x.equal_repr(y) {
            return Truth::True;
        }
        // Same number field: the representation is canonical, so
        // distinct payloads are distinct values.
        if let (Ca::NfElem(kx, _), Ca::NfElem(ky, _)) = (x, y) {
            if kx == ky {
                return Truth::False;
            }
        }
        // Quick numeric separation.
        let bx = self.elem_enclosure(x, 64);
        let by = self.elem_enclosure(y, 64);
        if !bx.overlaps(&by) {
            return Truth::False;
        }
        // An algebraic number never equals a provably non-algebraic one.
        let xa = self.check_is_algebraic(x);
        let ya = self.check_is_algebraic(y);
        if (xa == Truth::True && ya == Truth::False)
            || (xa == Truth::False && ya == Truth::True)
        {
            return Truth::False;
        }
        let diff = self.sub(x, y);
        self.check_is_zero(&diff)
    }

    // ---- Real comparisons ----

    pub fn check_le(&mut self, x: &Ca, y: &Ca) -> Truth {
        self.real_compare(x, y, CmpKind::Le)
    }

    pub fn check_lt(&mut self, x: &Ca, y: &Ca) -> Truth {
        self.real_compare(x, y, CmpKind::Lt)
    }

    pub fn check_ge(&mut self, x: &Ca, y: &Ca) -> Truth {
        self.real_compare(y, x, CmpKind::Le)
    }

    pub fn check_gt(&mut self, x: &Ca, y: &Ca) -> Truth {
        self.real_compare(y, x, CmpKind::Lt)
    }

    fn real_compare(&mut self, x: &Ca, y: &Ca, kind: CmpKind) -> Truth {
        if let (Ca::Rational(a), Ca::Rational(b)) = (x, y) {
            return Truth::from(match kind {
                CmpKind::Le => a.0 <= b.0,
                CmpKind::Lt => a.0 < b.0,
            });
        }
        let cx = self.classify_extended_real(x);
        let cy = self.classify_extended_real(y);
        use ExtendedReal::*;
        match (cx, cy) {
            (NotReal, _) | (_, NotReal) => return Truth::False,
            (Indeterminate, _) | (_, Indeterminate) => return Truth::Unknown,
            (NegInf, NegInf) | (PosInf, PosInf) => {
                return Truth::from(matches!(kind, CmpKind::Le));
            }
            (NegInf, _) | (_, PosInf) => return Truth::True,
            (PosInf, _) | (_, NegInf) => return Truth::False,
            (FiniteReal, FiniteReal) => {}
        }

        // Exact algebraic comparison when available.
        if let (Some(a), Some(b)) = (self.eval_qqbar(x), self.eval_qqbar(y)) {
            if !a.is_real() || !b.is_real() {
                return Truth::False;
            }
            return Truth::from(match (a.cmp_real(&b), kind) {
                (Ordering::Equal, CmpKind::Le) => true,
                (Ordering::Equal, CmpKind::Lt) => false,
                (Ordering::Less, _) => true,
                (Ordering::Greater, _) => false,
            });
        }

        let mut prec = 64u32;
        while prec <= self.options.prec_limit {
            let bx = self.elem_enclosure(x, prec);
            let by = self.elem_enclosure(y, prec);
            let diff = bx.re.sub(&by.re, prec);
            if diff.is_negative() {
                return Truth::True;
            }
            if diff.is_positive() {
                return Truth::False;
            }
            prec *= 2;
        }
        // The sides may be exactly equal.
        match self.check_equal(x, y) {
            Truth::True => Truth::from(matches!(kind, CmpKind::Le)),
            _ => Truth::Unknown,
        }
    }

    fn classify_extended_real(&mut self, x: &Ca) -> ExtendedReal {
        match x {
            Ca::Unknown => ExtendedReal::Indeterminate,
            Ca::Undefined | Ca::UnsignedInfinity => ExtendedReal::NotReal,
            Ca::SignedInfinity(d) => {
                let d = (**d).clone();
                match self.check_equal(&d, &Ca::one()) {
                    Truth::True => return ExtendedReal::PosInf,
                    Truth::Unknown => return ExtendedReal::Indeterminate,
                    Truth::False => {}
                }
                match self.check_equal(&d, &Ca::neg_one()) {
                    Truth::True => ExtendedReal::NegInf,
                    Truth::Unknown => ExtendedReal::Indeterminate,
                    Truth::False => ExtendedReal::NotReal,
                }
            }
            _ => match self.check_is_real(x) {
                Truth::True => ExtendedReal::FiniteReal,
                Truth::False => ExtendedReal::NotReal,
                Truth::Unknown => ExtendedReal::Indeterminate,
            },
        }
    }

    // ---- Structural reality and transcendence ----

    /// Conservative structural proof that an element is real-valued.
    pub(crate) fn elem_known_real(&mut self, x: &Ca) -> bool {
        match x {
            Ca::Rational(_) => true,
            Ca::NfElem(k, _) => {
                let Field::Algebraic { ext, .. } = self.field(*k) else {
                    return false;
                };
                let ext = *ext;
                self.ext(ext)
                    .as_algebraic()
                    .is_some_and(|a| a.clone().is_real())
            }
            Ca::MPolyQ(k, _) => {
                let gens = self.field(*k).gens();
                gens.into_iter().all(|g| self.ext_known_real(g))
            }
            _ => false,
        }
    }

    /// Conservative structural proof that an extension takes a real
    /// value.
    pub(crate) fn ext_known_real(&mut self, e: ExtRef) -> bool {
        let kind = match self.ext(e).as_function() {
            None => {
                return self
                    .ext(e)
                    .as_algebraic()
                    .is_some_and(|a| a.clone().is_real());
            }
            Some((h, args)) => (h, args.to_vec()),
        };
        let (head, args) = kind;
        match head {
            FuncHead::Pi | FuncHead::Euler => true,
            FuncHead::Exp | FuncHead::Sin | FuncHead::Cos | FuncHead::Tan
            | FuncHead::Atan | FuncHead::Erf | FuncHead::Erfc | FuncHead::Erfi => {
                self.elem_known_real(&args[0])
            }
            FuncHead::Log => {
                self.elem_known_real(&args[0]) && {
                    let b = self.elem_enclosure(&args[0], 64);
                    b.re.is_positive()
                }
            }
            FuncHead::Sqrt => {
                self.elem_known_real(&args[0]) && {
                    let b = self.elem_enclosure(&args[0], 64);
                    b.re.is_positive()
                }
            }
            FuncHead::Gamma | FuncHead::RiemannZeta => {
                self.elem_known_real(&args[0]) && {
                    let b = self.elem_enclosure(&args[0], 64);
                    b.re.is_positive()
                }
            }
            FuncHead::Abs | FuncHead::Re | FuncHead::Im | FuncHead::Arg
            | FuncHead::Floor | FuncHead::Ceil => true,
            FuncHead::Sign | FuncHead::Conjugate => self.elem_known_real(&args[0]),
            FuncHead::Asin | FuncHead::Acos => {
                self.elem_known_real(&args[0]) && {
                    let b = self.elem_enclosure(&args[0], 64);
                    let one = crate::ball::RBall::from_i64(1, 64);
                    b.re.sub(&one, 64).is_negative()
                        && b.re.add(&one, 64).is_positive()
                }
            }
            FuncHead::EllipticK | FuncHead::EllipticE => {
                self.elem_known_real(&args[0]) && {
                    let b = self.elem_enclosure(&args[0], 64);
                    let one = crate::ball::RBall::from_i64(1, 64);
                    b.re.is_positive() && b.re.sub(&one, 64).is_negative()
                }
            }
            FuncHead::Pow | FuncHead::EllipticPi => false,
        }
    }

    /// Structural proof that an extension is transcendental (over the
    /// algebraic numbers).
    fn ext_known_transcendental(&mut self, e: ExtRef) -> bool {
        let Some((head, args)) = self.ext(e).as_function().map(|(h, a)| (h, a.to_vec()))
        else {
            return false;
        };
        match head {
            FuncHead::Pi => true,
            // Lindemann-Weierstrass: e^a is transcendental for algebraic
            // a != 0, and log a for algebraic a outside {0, 1}.
            FuncHead::Exp => self
                .eval_qqbar(&args[0])
                .is_some_and(|a| !a.is_zero()),
            FuncHead::Log => self
                .eval_qqbar(&args[0])
                .is_some_and(|a| !a.is_zero() && !a.is_one()),
            _ => false,
        }
    }

    // ---- Property predicates ----

    pub fn check_is_real(&mut self, x: &Ca) -> Truth {
        match x {
            Ca::Unknown => return Truth::Unknown,
            Ca::Undefined | Ca::UnsignedInfinity | Ca::SignedInfinity(_) => {
                return Truth::False;
            }
            Ca::Rational(_) => return Truth::True,
            _ => {}
        }
        if self.elem_known_real(x) {
            return Truth::True;
        }
        if let Some(alg) = self.eval_qqbar(x) {
            return Truth::from(alg.is_real());
        }
        // Numeric disproof.
        let mut prec = 64u32;
        while prec <= self.options.prec_limit {
            let b = self.elem_enclosure(x, prec);
            if !b.im.contains_zero() {
                return Truth::False;
            }
            prec *= 2;
            if prec > 256 {
                break;
            }
        }
        // Symbolic proof through conjugation.
        let c = self.conj(x);
        if self.is_inert_conjugate(&c) {
            return Truth::Unknown;
        }
        self.check_equal(&c, x)
    }

    /// True when conj had to fall back to an inert extension, in which
    /// case comparing against it teaches us nothing.
    fn is_inert_conjugate(&self, c: &Ca) -> bool {
        self.is_gen_as_ext(c)
            .and_then(|e| self.ext(e).as_function().map(|(h, _)| h))
            == Some(FuncHead::Conjugate)
    }

    pub fn check_is_imaginary(&mut self, x: &Ca) -> Truth {
        if x.is_special() {
            return match x {
                Ca::Unknown => Truth::Unknown,
                _ => Truth::False,
            };
        }
        let i = self.i();
        let rotated = self.mul(x, &i);
        self.check_is_real(&rotated)
    }

    pub fn check_is_nonreal(&mut self, x: &Ca) -> Truth {
        self.check_is_real(x).not()
    }

    pub fn check_is_algebraic(&mut self, x: &Ca) -> Truth {
        match x {
            Ca::Unknown => return Truth::Unknown,
            Ca::Undefined | Ca::UnsignedInfinity | Ca::SignedInfinity(_) => {
                return Truth::False;
            }
            Ca::Rational(_) | Ca::NfElem(_, _) => return Truth::True,
            _ => {}
        }
        if self.eval_qqbar(x).is_some() {
            return Truth::True;
        }
        let Ca::MPolyQ(k, f) = x else {
            return Truth::Unknown;
        };
        let gens = self.field(*k).gens();
        // One transcendental generator among algebraic ones: a payload
        // that genuinely uses it takes a transcendental value.
        let mut transcendental = None;
        let mut all_accounted = true;
        for (j, &g) in gens.iter().enumerate() {
            if self.ext(g).is_algebraic() {
                continue;
            }
            if self.ext_known_transcendental(g) && transcendental.is_none() {
                transcendental = Some(j);
            } else {
                all_accounted = false;
            }
        }
        if let (Some(j), true) = (transcendental, all_accounted) {
            let uses = f.numer().degree_in(j) > 0 || f.denom().degree_in(j) > 0;
            if uses {
                return Truth::False;
            }
        }
        Truth::Unknown
    }

    pub fn check_is_rational(&mut self, x: &Ca) -> Truth {
        match x {
            Ca::Unknown => return Truth::Unknown,
            Ca::Undefined | Ca::UnsignedInfinity | Ca::SignedInfinity(_) => {
                return Truth::False;
            }
            Ca::Rational(_) => return Truth::True,
            // Condensation guarantees a number-field payload is properly
            // irrational.
            Ca::NfElem(_, _) => return Truth::False,
            _ => {}
        }
        if let Some(alg) = self.eval_qqbar(x) {
            return Truth::from(alg.is_rational());
        }
        match self.check_is_algebraic(x) {
            Truth::False => Truth::False,
            _ => Truth::Unknown,
        }
    }

    pub fn check_is_integer(&mut self, x: &Ca) -> Truth {
        match x {
            Ca::Rational(q) => return Truth::from(q.is_integer()),
            Ca::NfElem(_, _) => return Truth::False,
            _ => {}
        }
        if x.is_special() {
            return match x {
                Ca::Unknown => Truth::Unknown,
                _ => Truth::False,
            };
        }
        if let Some(alg) = self.eval_qqbar(x) {
            return Truth::from(alg.to_qint().is_some());
        }
        // An enclosure containing no integer at all is a disproof.
        let mut prec = 64u32;
        while prec <= 512.min(self.options.prec_limit) {
            let b = self.elem_enclosure(x, prec);
            if !b.im.contains_zero() {
                return Truth::False;
            }
            if !b.is_indeterminate() && excludes_all_integers(&b) {
                return Truth::False;
            }
            prec *= 2;
        }
        match self.check_is_rational(x) {
            Truth::False => Truth::False,
            _ => Truth::Unknown,
        }
    }

    pub fn check_is_positive_real(&mut self, x: &Ca) -> Truth {
        let zero = Ca::zero();
        self.check_is_real(x).and(self.check_gt(x, &zero))
    }

    pub fn check_is_negative_real(&mut self, x: &Ca) -> Truth {
        let zero = Ca::zero();
        self.check_is_real(x).and(self.check_lt(x, &zero))
    }

    // ---- Distinguished-value predicates ----

    pub fn check_is_one(&mut self, x: &Ca) -> Truth {
        self.check_equal(x, &Ca::one())
    }

    pub fn check_is_neg_one(&mut self, x: &Ca) -> Truth {
        self.check_equal(x, &Ca::neg_one())
    }

    pub fn check_is_i(&mut self, x: &Ca) -> Truth {
        let i = self.i();
        self.check_equal(x, &i)
    }

    pub fn check_is_neg_i(&mut self, x: &Ca) -> Truth {
        let ni = self.neg_i();
        self.check_equal(x, &ni)
    }

    /// Finite (a complex number, not a special value).
    pub fn check_is_number(&mut self, x: &Ca) -> Truth {
        match x {
            Ca::Unknown => Truth::Unknown,
            _ => Truth::from(x.is_finite()),
        }
    }

    pub fn check_is_infinity(&mut self, x: &Ca) -> Truth {
        match x {
            Ca::Unknown => Truth::Unknown,
            _ => Truth::from(x.is_any_inf()),
        }
    }

    pub fn check_is_uinf(&mut self, x: &Ca) -> Truth {
        match x {
            Ca::Unknown => Truth::Unknown,
            _ => Truth::from(x.is_uinf()),
        }
    }

    pub fn check_is_undefined(&mut self, x: &Ca) -> Truth {
        match x {
            Ca::Unknown => Truth::Unknown,
            _ => Truth::from(x.is_undefined()),
        }
    }

    pub fn check_is_pos_inf(&mut self, x: &Ca) -> Truth {
        self.check_signed_inf_dir(x, |_| Ca::one())
    }

    pub fn check_is_neg_inf(&mut self, x: &Ca) -> Truth {
        self.check_signed_inf_dir(x, |_| Ca::neg_one())
    }

    pub fn check_is_pos_i_inf(&mut self, x: &Ca) -> Truth {
        self.check_signed_inf_dir(x, |ctx| ctx.i())
    }

    pub fn check_is_neg_i_inf(&mut self, x: &Ca) -> Truth {
        self.check_signed_inf_dir(x, |ctx| ctx.neg_i())
    }

    fn check_signed_inf_dir(
        &mut self,
        x: &Ca,
        dir: impl FnOnce(&mut Context) -> Ca,
    ) -> Truth {
        match x {
            Ca::Unknown => Truth::Unknown,
            Ca::SignedInfinity(d) => {
                let d = (**d).clone();
                let target = dir(self);
                self.check_equal(&d, &target)
            }
            _ => Truth::False,
        }
    }
}

enum CmpKind {
    Le,
    Lt,
}

enum ExtendedReal {
    NegInf,
    PosInf,
    FiniteReal,
    NotReal,
    Indeterminate,
}

/// No integer lies inside the real interval (and the box is off the real
/// line or pinned between consecutive integers).
fn excludes_all_integers(b: &CBall) -> bool {
    let lo = b.re.lower(64);
    let hi = b.re.upper(64);
    let (Some((lo_ceil, _)), Some((hi_floor, _))) = (
        lo.to_integer_round(rug::float::Round::Up),
        hi.to_integer_round(rug::float::Round::Down),
    ) else {
        return false;
    };
    lo_ceil > hi_floor
}

/// Evaluate an integer multivariate polynomial on algebraic numbers,
/// within the degree budget.
fn eval_mpoly_alg(
    p: &crate::mpoly::MPoly,
    algs: &[Alg],
    limit: usize,
) -> Option<Alg> {
    let mut acc = Alg::zero();
    for (exps, c) in p.terms() {
        let mut term = Alg::from_qint(c);
        for (i, &e) in exps.iter().enumerate() {
            if e > 0 {
                let pw = algs[i].pow_i64(e as i64, limit)?;
                term = term.mul(&pw, limit)?;
            }
        }
        acc = acc.add(&term, limit)?;
    }
    Some(acc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_test_on_rationals() {
        let mut ctx = Context::new();
        assert_eq!(ctx.check_is_zero(&Ca::zero()), Truth::True);
        assert_eq!(ctx.check_is_zero(&Ca::from_rational(1, 3)), Truth::False);
    }

    #[test]
    fn equality_of_distinct_constants() {
        // e (as exp(1)) and pi are numerically separable.
        let mut ctx = Context::new();
        let e = ctx.exp(&Ca::one());
        let pi = ctx.pi();
        assert_eq!(ctx.check_equal(&e, &pi), Truth::False);
    }

    #[test]
    fn pi_is_not_algebraic() {
        let mut ctx = Context::new();
        let pi = ctx.pi();
        assert_eq!(ctx.check_is_algebraic(&pi), Truth::False);
        assert_eq!(ctx.check_is_rational(&pi), Truth::False);
        assert_eq!(ctx.check_is_integer(&pi), Truth::False);
    }

    #[test]
    fn euler_gamma_constant_is_unknown_algebraic() {
        let mut ctx = Context::new();
        let g = ctx.euler();
        assert_eq!(ctx.check_is_algebraic(&g), Truth::Unknown);
    }

    #[test]
    fn pi_is_real_and_positive() {
        let mut ctx = Context::new();
        let pi = ctx.pi();
        assert_eq!(ctx.check_is_real(&pi), Truth::True);
        assert_eq!(ctx.check_is_positive_real(&pi), Truth::True);
        assert_eq!(ctx.check_is_negative_real(&pi), Truth::False);
    }

    #[test]
    fn i_is_imaginary_not_real() {
        let mut ctx = Context::new();
        let i = ctx.i();
        assert_eq!(ctx.check_is_real(&i), Truth::False);
        assert_eq!(ctx.check_is_imaginary(&i), Truth::True);
        assert_eq!(ctx.check_is_algebraic(&i), Truth::True);
    }

    #[test]
    fn comparisons_between_constants() {
        let mut ctx = Context::new();
        let pi = ctx.pi();
        let e = ctx.exp(&Ca::one());
        assert_eq!(ctx.check_lt(&e, &pi), Truth::True);
        assert_eq!(ctx.check_ge(&pi, &e), Truth::True);
        assert_eq!(ctx.check_gt(&e, &pi), Truth::False);
    }

    #[test]
    fn comparison_with_nonreal_is_false() {
        let mut ctx = Context::new();
        let i = ctx.i();
        assert_eq!(ctx.check_le(&i, &Ca::zero()), Truth::False);
        assert_eq!(ctx.check_le(&Ca::uinf(), &Ca::zero()), Truth::False);
    }

    #[test]
    fn infinity_comparisons() {
        let mut ctx = Context::new();
        assert_eq!(ctx.check_le(&Ca::neg_inf(), &Ca::zero()), Truth::True);
        assert_eq!(ctx.check_le(&Ca::zero(), &Ca::pos_inf()), Truth::True);
        assert_eq!(ctx.check_le(&Ca::pos_inf(), &Ca::zero()), Truth::False);
        assert_eq!(ctx.check_le(&Ca::pos_inf(), &Ca::pos_inf()), Truth::True);
        assert_eq!(ctx.check_lt(&Ca::pos_inf(), &Ca::pos_inf()), Truth::False);
    }

    #[test]
    fn signed_infinity_recognizers() {
        let mut ctx = Context::new();
        assert_eq!(ctx.check_is_pos_inf(&Ca::pos_inf()), Truth::True);
        assert_eq!(ctx.check_is_neg_inf(&Ca::pos_inf()), Truth::False);
        let ii = ctx.pos_i_inf();
        assert_eq!(ctx.check_is_pos_i_inf(&ii), Truth::True);
        assert_eq!(ctx.check_is_pos_inf(&ii), Truth::False);
    }

    #[test]
    fn sqrt2_roundtrip_via_qqbar() {
        let mut ctx = Context::new();
        let r = ctx.sqrt(&Ca::from_i64(2));
        let alg = ctx.to_qqbar(&r).expect("sqrt(2) is algebraic");
        assert_eq!(alg.degree(), 2);
        assert_eq!(ctx.check_is_algebraic(&r), Truth::True);
        assert_eq!(ctx.check_is_rational(&r), Truth::False);
        assert_eq!(ctx.check_is_integer(&r), Truth::False);
    }

    #[test]
    fn ball_conversion_contains_value() {
        let mut ctx = Context::new();
        let third = Ca::from_rational(1, 3);
        let b = ctx.to_ball(&third, 64);
        assert!(b.may_contain_qrat(&QRat::from((1, 3))));
        let tight = ctx.to_ball_accurate_parts(&third, 100);
        assert!(!tight.is_indeterminate());
    }
}
