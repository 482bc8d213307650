//! The context: interning caches and tuning options.
//!
//! Extensions, fields and their lookup tables live here, along with the
//! option vector that budgets every adaptive procedure. Interning makes
//! structural equality of extensions and fields a handle comparison,
//! which is what lets elements compare representationally in O(1).
//!
//! A context is single-threaded; each thread owns its own and elements
//! move between contexts through `sym::transfer`.

use crate::alg::Alg;
use crate::ball::{CBall, RBall};
use crate::elem::Ca;
use crate::ext::{Ext, ExtKind, ExtRef, FuncHead};
use crate::field::{Field, FieldRef};
use crate::mpoly::{MPoly, MRatFunc};
use crate::nf::NfElem;
use crate::num::{QInt, QRat};
use crate::poly::Poly;
use rustc_hash::FxHashMap;
use std::cmp::Ordering;

/// How trigonometric functions are represented internally.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrigForm {
    /// Inert sin/cos/... extensions.
    Direct,
    /// Rewrite through complex exponentials.
    Exponential,
    /// Rewrite through the half-angle tangent.
    Tangent,
}

/// Tuning options. All adaptive procedures in the library observe these
/// budgets; none of them loops unbounded.
#[derive(Clone, Debug)]
pub struct Options {
    /// Emit diagnostic traces through `log`.
    pub verbose: bool,
    /// Maximum working precision of the adaptive predicate loops.
    pub prec_limit: u32,
    /// Precision of the cached extension enclosures.
    pub low_prec: u32,
    /// Maximum algebraic degree produced by automatic fallbacks.
    pub qqbar_deg_limit: usize,
    /// Trial-division bound in integer square-free factoring.
    pub smooth_limit: u64,
    /// Largest |n| expanded by binary exponentiation.
    pub pow_limit: i64,
    /// Representation policy for trigonometric functions.
    pub trig_form: TrigForm,
    /// Formatting bits; see `PRINT_EXACT_ONLY`.
    pub print_flags: u32,
    /// Digits shown by approximate printing.
    pub print_digits: usize,
    /// Reserved: eager Groebner reduction of ideals.
    pub use_gb: bool,
}

/// Suppress the numerical approximation in `repr`.
pub const PRINT_EXACT_ONLY: u32 = 1;

impl Default for Options {
    fn default() -> Self {
        Options {
            verbose: false,
            prec_limit: 4096,
            low_prec: 64,
            qqbar_deg_limit: 24,
            smooth_limit: 100_000,
            pow_limit: 40,
            trig_form: TrigForm::Exponential,
            print_flags: 0,
            print_digits: 10,
            use_gb: false,
        }
    }
}

/// Process-local interning store and tuning options.
pub struct Context {
    pub options: Options,
    exts: Vec<Ext>,
    /// Per-extension precision of the cached enclosure.
    ext_encl_prec: Vec<u32>,
    /// Algebraic extensions bucketed by minimal polynomial.
    alg_buckets: FxHashMap<Vec<QInt>, Vec<ExtRef>>,
    /// Function extensions keyed by (head, argument list).
    func_table: FxHashMap<(FuncHead, Vec<Ca>), ExtRef>,
    fields: Vec<Field>,
    field_table: FxHashMap<Vec<ExtRef>, FieldRef>,
    field_q: FieldRef,
    field_qi: FieldRef,
    ext_i: ExtRef,
}

impl Context {
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    pub fn with_options(options: Options) -> Self {
        let mut ctx = Context {
            options,
            exts: Vec::new(),
            ext_encl_prec: Vec::new(),
            alg_buckets: FxHashMap::default(),
            func_table: FxHashMap::default(),
            fields: Vec::new(),
            field_table: FxHashMap::default(),
            field_q: FieldRef(0),
            field_qi: FieldRef(0),
            ext_i: ExtRef(0),
        };
        // Seed the distinguished fields Q and Q(i).
        ctx.fields.push(Field::Rational);
        ctx.field_table.insert(vec![], FieldRef(0));
        ctx.field_q = FieldRef(0);
        ctx.ext_i = ctx.ext_algebraic(Alg::i());
        ctx.field_qi = ctx.field_for_gens(vec![ctx.ext_i]);
        ctx
    }

    // ---- Accessors ----

    pub fn ext(&self, r: ExtRef) -> &Ext {
        &self.exts[r.0 as usize]
    }

    pub fn field(&self, r: FieldRef) -> &Field {
        &self.fields[r.0 as usize]
    }

    pub fn field_q(&self) -> FieldRef {
        self.field_q
    }

    pub fn field_qi(&self) -> FieldRef {
        self.field_qi
    }

    pub fn ext_i(&self) -> ExtRef {
        self.ext_i
    }

    // ---- Extension interning ----

    /// Intern an algebraic number as an extension. Rational values must
    /// not reach here; they are represented directly as payloads.
    pub fn ext_algebraic(&mut self, alg: Alg) -> ExtRef {
        assert!(
            !alg.is_rational() || alg == Alg::i(),
            "rational values are not interned as extensions"
        );
        let key: Vec<QInt> = alg.minpoly().int_coeffs();
        if let Some(bucket) = self.alg_buckets.get(&key) {
            for &r in bucket {
                if let ExtKind::Algebraic(existing) = &self.exts[r.0 as usize].kind {
                    if *existing == alg {
                        return r;
                    }
                }
            }
        }
        let encl = alg.refined(self.options.low_prec);
        let r = ExtRef(self.exts.len() as u32);
        self.exts.push(Ext {
            kind: ExtKind::Algebraic(alg),
            encl,
        });
        self.ext_encl_prec.push(self.options.low_prec);
        self.alg_buckets.entry(key).or_default().push(r);
        if self.options.verbose {
            log::debug!("interned algebraic extension {r}");
        }
        r
    }

    /// Intern a symbolic function application.
    pub fn ext_function(&mut self, head: FuncHead, args: Vec<Ca>) -> ExtRef {
        debug_assert!(args.iter().all(Ca::is_finite));
        let key = (head, args.clone());
        if let Some(&r) = self.func_table.get(&key) {
            return r;
        }
        let low = self.options.low_prec;
        let encl = self.func_enclosure(head, &args, low);
        let r = ExtRef(self.exts.len() as u32);
        self.exts.push(Ext {
            kind: ExtKind::Function { head, args },
            encl,
        });
        self.ext_encl_prec.push(low);
        self.func_table.insert(key, r);
        if self.options.verbose {
            log::debug!("interned function extension {head} as {r}");
        }
        r
    }

    // ---- Field interning ----

    /// Intern the field generated by the given extensions. The list is
    /// sorted and deduplicated under the canonical ordering here.
    pub fn field_for_gens(&mut self, mut gens: Vec<ExtRef>) -> FieldRef {
        gens.sort_by(|&a, &b| self.cmp_ext(a, b));
        gens.dedup();
        if let Some(&r) = self.field_table.get(&gens) {
            return r;
        }
        let field = match gens.as_slice() {
            [] => Field::Rational,
            [single] if self.ext(*single).is_algebraic() => {
                let alg = self.ext(*single).as_algebraic().unwrap();
                Field::Algebraic {
                    ext: *single,
                    monic: alg.minpoly().make_monic(),
                }
            }
            _ => {
                let ideal = self.build_ideal(&gens);
                Field::Multi {
                    gens: gens.clone(),
                    ideal,
                }
            }
        };
        let r = FieldRef(self.fields.len() as u32);
        self.fields.push(field);
        self.field_table.insert(gens, r);
        if self.options.verbose {
            log::debug!("interned field {r}");
        }
        r
    }

    pub fn field_single(&mut self, ext: ExtRef) -> FieldRef {
        self.field_for_gens(vec![ext])
    }

    /// Reduction ideal for a Multi field: minimal polynomials of the
    /// algebraic generators, linear relations between quadratic
    /// generators sharing a squarefree core, and defining relations of
    /// square-root generators whose argument lives inside the field.
    fn build_ideal(&mut self, gens: &[ExtRef]) -> Vec<MPoly> {
        let nvars = gens.len();
        let mut ideal = Vec::new();

        for (j, &g) in gens.iter().enumerate() {
            if let Some(alg) = self.ext(g).as_algebraic() {
                let coeffs = alg.minpoly().int_coeffs();
                ideal.push(MPoly::from_univariate_int(&coeffs, j, nvars));
            }
        }

        // Pairwise linear relations between quadratic algebraic
        // generators: if beta = s + t*alpha exactly, record
        // x_j - t*x_i - s (cleared of denominators).
        for i in 0..nvars {
            for j in i + 1..nvars {
                let (Some(a), Some(b)) = (
                    self.ext(gens[i]).as_algebraic().cloned(),
                    self.ext(gens[j]).as_algebraic().cloned(),
                ) else {
                    continue;
                };
                if a.degree() != 2 || b.degree() != 2 {
                    continue;
                }
                if let Some((s, t)) = express_quadratic(&a, &b) {
                    let den = s.denom().lcm(&t.denom());
                    let den_q = QRat::from(den.clone());
                    let t_i = (&t * &den_q).to_qint().unwrap();
                    let s_i = (&s * &den_q).to_qint().unwrap();
                    let rel = MPoly::gen(nvars, j)
                        .mul_scalar(&den)
                        .sub(&MPoly::gen(nvars, i).mul_scalar(&t_i))
                        .sub(&MPoly::constant(nvars, s_i));
                    ideal.push(rel);
                }
            }
        }

        // Square-root generators: t^2 = arg whenever the argument's own
        // generators are all present in this field.
        for (j, &g) in gens.iter().enumerate() {
            let Some((FuncHead::Sqrt, args)) = self
                .ext(g)
                .as_function()
                .map(|(h, a)| (h, a.to_vec()))
            else {
                continue;
            };
            let arg = &args[0];
            if let Some(f) = self.inject_payload(arg, gens) {
                let rel = MPoly::gen(nvars, j)
                    .pow_u32(2)
                    .mul(f.denom())
                    .sub(f.numer());
                ideal.push(rel);
            }
        }

        ideal
    }

    /// Express a finite element as a rational function over the given
    /// generator list, when all of its own generators appear there.
    pub fn inject_payload(&self, x: &Ca, gens: &[ExtRef]) -> Option<MRatFunc> {
        let nvars = gens.len();
        match x {
            Ca::Rational(q) => Some(MRatFunc::from_qrat(nvars, q)),
            Ca::NfElem(k, e) => {
                let Field::Algebraic { ext, .. } = self.field(*k) else {
                    panic!("NfElem in non-algebraic field");
                };
                let pos = gens.iter().position(|g| g == ext)?;
                let mut acc = MRatFunc::zero(nvars);
                for (i, c) in e.poly().coeffs().iter().enumerate() {
                    let term = MRatFunc::gen(nvars, pos)
                        .pow_i64(i as i64)
                        .mul_qrat(c);
                    acc = acc.add(&term);
                }
                Some(acc)
            }
            Ca::MPolyQ(k, f) => {
                let field_gens = self.field(*k).gens();
                let mut map = Vec::with_capacity(field_gens.len());
                for g in &field_gens {
                    map.push(gens.iter().position(|h| h == g)?);
                }
                Some(f.compose_vars(&map, nvars))
            }
            _ => None,
        }
    }

    // ---- Canonical ordering ----

    /// Total order on extensions: algebraic numbers first (by degree,
    /// then absolute-lexicographic minimal polynomial, then position),
    /// then function applications (by head, arity, arguments).
    pub fn cmp_ext(&self, a: ExtRef, b: ExtRef) -> Ordering {
        if a == b {
            return Ordering::Equal;
        }
        match (&self.ext(a).kind, &self.ext(b).kind) {
            (ExtKind::Algebraic(x), ExtKind::Algebraic(y)) => {
                match x.degree().cmp(&y.degree()) {
                    Ordering::Equal => {}
                    other => return other,
                }
                match cmp_int_poly_abslex(x.minpoly(), y.minpoly()) {
                    Ordering::Equal => {}
                    other => return other,
                }
                match x.cmp_re(y) {
                    Ordering::Equal => x.cmp_im(y),
                    other => other,
                }
            }
            (ExtKind::Algebraic(_), ExtKind::Function { .. }) => Ordering::Less,
            (ExtKind::Function { .. }, ExtKind::Algebraic(_)) => Ordering::Greater,
            (
                ExtKind::Function { head: ha, args: xa },
                ExtKind::Function { head: hb, args: xb },
            ) => {
                match ha.order_key().cmp(&hb.order_key()) {
                    Ordering::Equal => {}
                    other => return other,
                }
                match xa.len().cmp(&xb.len()) {
                    Ordering::Equal => {}
                    other => return other,
                }
                for (u, v) in xa.iter().zip(xb.iter()) {
                    match self.cmp_repr(u, v) {
                        Ordering::Equal => {}
                        other => return other,
                    }
                }
                Ordering::Equal
            }
        }
    }

    /// Representational ordering of finite elements: field order first,
    /// then payload. Specials are a caller error.
    pub fn cmp_repr(&self, x: &Ca, y: &Ca) -> Ordering {
        assert!(
            x.is_finite() && y.is_finite(),
            "cmp_repr is not defined for special values"
        );
        let kx = self.field_key(x);
        let ky = self.field_key(y);
        match self.field_cmp(kx, ky) {
            Ordering::Equal => {}
            other => return other,
        }
        match (x, y) {
            (Ca::Rational(a), Ca::Rational(b)) => a.0.cmp(&b.0),
            (Ca::NfElem(_, a), Ca::NfElem(_, b)) => {
                let pa = a.poly();
                let pb = b.poly();
                match pa.coeffs().len().cmp(&pb.coeffs().len()) {
                    Ordering::Equal => {}
                    other => return other,
                }
                for (u, v) in pa.coeffs().iter().zip(pb.coeffs().iter()).rev() {
                    match u.cmp(v) {
                        Ordering::Equal => {}
                        other => return other,
                    }
                }
                Ordering::Equal
            }
            (Ca::MPolyQ(_, a), Ca::MPolyQ(_, b)) => a.cmp_structural(b),
            _ => unreachable!("field ordering separates payload variants"),
        }
    }

    fn field_key(&self, x: &Ca) -> FieldRef {
        x.field_ref().unwrap_or(self.field_q)
    }

    /// Total order on fields: Q < number fields < Multi fields, then by
    /// generator tuple.
    pub fn field_cmp(&self, a: FieldRef, b: FieldRef) -> Ordering {
        if a == b {
            return Ordering::Equal;
        }
        let rank = |f: &Field| match f {
            Field::Rational => 0,
            Field::Algebraic { .. } => 1,
            Field::Multi { .. } => 2,
        };
        let fa = self.field(a);
        let fb = self.field(b);
        match rank(fa).cmp(&rank(fb)) {
            Ordering::Equal => {}
            other => return other,
        }
        let ga = fa.gens();
        let gb = fb.gens();
        match ga.len().cmp(&gb.len()) {
            Ordering::Equal => {}
            other => return other,
        }
        for (&x, &y) in ga.iter().zip(gb.iter()) {
            match self.cmp_ext(x, y) {
                Ordering::Equal => {}
                other => return other,
            }
        }
        Ordering::Equal
    }

    // ---- Enclosure evaluation ----

    /// Enclosure of an extension at the requested precision, through the
    /// per-extension cache.
    pub fn ext_enclosure(&mut self, r: ExtRef, prec: u32) -> CBall {
        if self.ext_encl_prec[r.0 as usize] >= prec
            && !self.exts[r.0 as usize].encl.is_indeterminate()
        {
            return self.exts[r.0 as usize].encl.clone();
        }
        let encl = match self.exts[r.0 as usize].kind.clone() {
            ExtKind::Algebraic(alg) => alg.refined(prec),
            ExtKind::Function { head, args } => self.func_enclosure(head, &args, prec),
        };
        self.exts[r.0 as usize].encl = encl.clone();
        self.ext_encl_prec[r.0 as usize] = prec;
        encl
    }

    /// Enclosure of an element.
    pub fn elem_enclosure(&mut self, x: &Ca, prec: u32) -> CBall {
        match x {
            Ca::Rational(q) => CBall::from_qrat(q, prec),
            Ca::NfElem(k, e) => {
                let Field::Algebraic { ext, .. } = self.field(*k) else {
                    panic!("NfElem in non-algebraic field");
                };
                let alpha = self.ext_enclosure(*ext, prec);
                e.eval_cball(&alpha, prec)
            }
            Ca::MPolyQ(k, f) => {
                let gens = self.field(*k).gens();
                let mut balls = Vec::with_capacity(gens.len());
                for g in gens {
                    balls.push(self.ext_enclosure(g, prec));
                }
                f.eval_cball(&balls, prec)
            }
            _ => CBall::indeterminate(),
        }
    }

    /// Enclosure of a function application.
    pub fn func_enclosure(&mut self, head: FuncHead, args: &[Ca], prec: u32) -> CBall {
        let arg = |ctx: &mut Context, i: usize| -> CBall {
            ctx.elem_enclosure(&args[i], prec)
        };
        match head {
            FuncHead::Pi => CBall::pi(prec),
            FuncHead::Euler => CBall::from_rball(RBall::euler(prec)),
            FuncHead::Exp => arg(self, 0).exp(prec),
            FuncHead::Log => arg(self, 0).log(prec),
            FuncHead::Sqrt => arg(self, 0).sqrt(prec),
            FuncHead::Pow => {
                let x = arg(self, 0);
                let y = arg(self, 1);
                y.mul(&x.log(prec), prec).exp(prec)
            }
            FuncHead::Sin => arg(self, 0).sin(prec),
            FuncHead::Cos => arg(self, 0).cos(prec),
            FuncHead::Tan => {
                let x = arg(self, 0);
                x.sin(prec).div(&x.cos(prec), prec)
            }
            FuncHead::Atan => arg(self, 0).atan(prec),
            FuncHead::Asin => asin_ball(&arg(self, 0), prec),
            FuncHead::Acos => {
                // acos z = pi/2 - asin z
                let half_pi = CBall::pi(prec).mul(
                    &CBall::from_qrat(&QRat::from((1, 2)), prec),
                    prec,
                );
                half_pi.sub(&asin_ball(&arg(self, 0), prec), prec)
            }
            FuncHead::Sign => {
                let x = arg(self, 0);
                let m = x.abs_ball(prec);
                x.div(&CBall::from_rball(m), prec)
            }
            FuncHead::Abs => CBall::from_rball(arg(self, 0).abs_ball(prec)),
            FuncHead::Re => CBall::from_rball(arg(self, 0).re),
            FuncHead::Im => CBall::from_rball(arg(self, 0).im),
            FuncHead::Conjugate => arg(self, 0).conj(),
            FuncHead::Arg => CBall::from_rball(arg(self, 0).arg(prec)),
            FuncHead::Floor => match arg(self, 0).re.unique_floor() {
                Some(n) => CBall::from_rball(RBall::from_qint(&n, prec)),
                None => CBall::indeterminate(),
            },
            FuncHead::Ceil => {
                let b = arg(self, 0);
                match b.re.neg().unique_floor() {
                    Some(n) => {
                        CBall::from_rball(RBall::from_qint(&(-&n), prec))
                    }
                    None => CBall::indeterminate(),
                }
            }
            FuncHead::Gamma => {
                let b = arg(self, 0);
                if b.im.is_exact_zero() {
                    CBall::from_rball(b.re.gamma(prec))
                } else {
                    CBall::indeterminate()
                }
            }
            FuncHead::Erf => {
                let b = arg(self, 0);
                if b.im.is_exact_zero() {
                    CBall::from_rball(b.re.erf(prec))
                } else {
                    CBall::indeterminate()
                }
            }
            FuncHead::Erfc => {
                let b = arg(self, 0);
                if b.im.is_exact_zero() {
                    CBall::from_rball(b.re.erfc(prec))
                } else {
                    CBall::indeterminate()
                }
            }
            FuncHead::Erfi => CBall::indeterminate(),
            FuncHead::RiemannZeta => {
                let b = arg(self, 0);
                if b.im.is_exact_zero() {
                    CBall::from_rball(b.re.zeta(prec))
                } else {
                    CBall::indeterminate()
                }
            }
            FuncHead::EllipticK => {
                let b = arg(self, 0);
                if b.im.is_exact_zero() {
                    CBall::from_rball(b.re.elliptic_k(prec))
                } else {
                    CBall::indeterminate()
                }
            }
            FuncHead::EllipticE | FuncHead::EllipticPi => CBall::indeterminate(),
        }
    }

    // ---- Element constructors tied to the context ----

    /// The element that is exactly the generator of the given extension's
    /// minimal field.
    pub fn make_gen_element(&mut self, e: ExtRef) -> Ca {
        let k = self.field_single(e);
        match self.field(k) {
            Field::Algebraic { .. } => Ca::NfElem(k, NfElem::gen()),
            Field::Multi { gens, .. } => {
                let n = gens.len();
                Ca::MPolyQ(k, MRatFunc::gen(n, 0))
            }
            Field::Rational => unreachable!("generator field cannot be Q"),
        }
    }

    /// Embed an exact algebraic number as an element (condensed).
    /// Quadratic values lying in the distinguished field Q(i) land there
    /// rather than in a field of their own.
    pub fn from_alg(&mut self, alg: Alg) -> Ca {
        if let Some(q) = alg.to_qrat() {
            return Ca::Rational(q);
        }
        if alg.degree() == 2 {
            if let Some((s, t)) = express_quadratic(&Alg::i(), &alg) {
                // alg = s + t*i with t != 0.
                let e = NfElem::from_poly(
                    &Poly::from_vec(vec![s, t]),
                    &Poly::from_i64_coeffs(&[1, 0, 1]),
                );
                return Ca::NfElem(self.field_qi, e);
            }
        }
        let e = self.ext_algebraic(alg);
        self.make_gen_element(e)
    }

    /// The imaginary unit.
    pub fn i(&mut self) -> Ca {
        Ca::NfElem(self.field_qi, NfElem::gen())
    }

    pub fn neg_i(&mut self) -> Ca {
        Ca::NfElem(self.field_qi, NfElem::gen().neg())
    }

    pub fn pi(&mut self) -> Ca {
        let e = self.ext_function(FuncHead::Pi, vec![]);
        self.make_gen_element(e)
    }

    pub fn euler(&mut self) -> Ca {
        let e = self.ext_function(FuncHead::Euler, vec![]);
        self.make_gen_element(e)
    }

    pub fn phi(&mut self) -> Ca {
        self.from_alg(Alg::phi())
    }

    pub fn tribonacci_constant(&mut self) -> Ca {
        self.from_alg(Alg::tribonacci())
    }

    pub fn tetranacci_constant(&mut self) -> Ca {
        self.from_alg(Alg::tetranacci())
    }

    pub fn pos_i_inf(&mut self) -> Ca {
        let i = self.i();
        Ca::signed_inf(i)
    }

    pub fn neg_i_inf(&mut self) -> Ca {
        let i = self.neg_i();
        Ca::signed_inf(i)
    }

    /// `Some(ext)` when the element is exactly the sole generator of its
    /// field.
    pub fn is_gen_as_ext(&self, x: &Ca) -> Option<ExtRef> {
        match x {
            Ca::NfElem(k, e) if e.is_gen() => match self.field(*k) {
                Field::Algebraic { ext, .. } => Some(*ext),
                _ => None,
            },
            Ca::MPolyQ(k, f) => {
                let gens = self.field(*k).gens();
                (0..gens.len()).find(|&j| f.is_gen(j)).map(|j| gens[j])
            }
            _ => None,
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

/// Absolute-lexicographic comparison of integer minimal polynomials from
/// the leading coefficient down: absolute value first, then sign.
fn cmp_int_poly_abslex(a: &Poly, b: &Poly) -> Ordering {
    debug_assert_eq!(a.degree(), b.degree());
    let d = a.degree().unwrap_or(0);
    for i in (0..=d).rev() {
        let x = a.coeff(i);
        let y = b.coeff(i);
        if x != y {
            let c = x.abs().cmp(&y.abs());
            if c != Ordering::Equal {
                return c;
            }
            return if x.is_negative() {
                Ordering::Less
            } else {
                Ordering::Greater
            };
        }
    }
    Ordering::Equal
}

/// asin z = -i log(iz + sqrt(1 - z^2)).
fn asin_ball(z: &CBall, prec: u32) -> CBall {
    let one = CBall::from_i64(1, prec);
    let s = one.sub(&z.square(prec), prec).sqrt(prec);
    let iz = CBall::new(z.im.neg(), z.re.clone());
    let w = iz.add(&s, prec).log(prec);
    // -i * w
    CBall::new(w.im.clone(), w.re.neg())
}

/// Try to express the quadratic `b` as `s + t*a` over Q, verifying the
/// candidate exactly through algebraic arithmetic.
fn express_quadratic(a: &Alg, b: &Alg) -> Option<(QRat, QRat)> {
    // Shifted generators are pure square roots: a + A1/(2 A2) = +/-
    // sqrt(D_a)/(2 A2). The ratio of the two square roots is rational
    // exactly when D_a * D_b is a perfect square.
    let fa = a.minpoly();
    let fb = b.minpoly();
    let da = discriminant2(fa);
    let db = discriminant2(fb);
    if da.is_zero() {
        return None;
    }
    let ratio = &db / &da;
    let rn = ratio.numer().sqrt_exact()?;
    let rd = ratio.denom().sqrt_exact()?;
    let r = &QRat::from(rn) / &QRat::from(rd);
    for t in [r.clone(), -&r] {
        let shifted = b.add(&a.mul_qrat(&t).neg(), 8)?;
        if let Some(s) = shifted.to_qrat() {
            return Some((s, t));
        }
    }
    None
}

/// Discriminant of a quadratic integer polynomial.
fn discriminant2(f: &Poly) -> QRat {
    let a = f.coeff(2);
    let b = f.coeff(1);
    let c = f.coeff(0);
    &(&b * &b) - &(&(&QRat::from(4) * &a) * &c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_interning_is_idempotent() {
        let mut ctx = Context::new();
        let a = ctx.ext_algebraic(Alg::from_qint(&QInt::from(2i64)).sqrt(8).unwrap());
        let b = ctx.ext_algebraic(Alg::from_qint(&QInt::from(2i64)).sqrt(8).unwrap());
        assert_eq!(a, b);
    }

    #[test]
    fn field_interning_is_idempotent() {
        let mut ctx = Context::new();
        let pi1 = ctx.ext_function(FuncHead::Pi, vec![]);
        let pi2 = ctx.ext_function(FuncHead::Pi, vec![]);
        assert_eq!(pi1, pi2);
        let k1 = ctx.field_single(pi1);
        let k2 = ctx.field_single(pi2);
        assert_eq!(k1, k2);
    }

    #[test]
    fn canonical_order_puts_algebraic_first() {
        let mut ctx = Context::new();
        let pi = ctx.ext_function(FuncHead::Pi, vec![]);
        let i = ctx.ext_i();
        assert_eq!(ctx.cmp_ext(i, pi), Ordering::Less);
        assert_eq!(ctx.cmp_ext(pi, i), Ordering::Greater);
        let k = ctx.field_for_gens(vec![pi, i]);
        assert_eq!(ctx.field(k).gens(), vec![i, pi]);
    }

    #[test]
    fn sqrt2_sqrt8_share_a_linear_relation() {
        let mut ctx = Context::new();
        let s2 = Alg::from_qint(&QInt::from(2i64)).sqrt(8).unwrap();
        let s8 = Alg::from_qint(&QInt::from(8i64)).sqrt(8).unwrap();
        let (s, t) = express_quadratic(&s2, &s8).expect("sqrt8 = 2 sqrt2");
        assert_eq!(s, QRat::zero());
        assert_eq!(t, QRat::from(2));
    }

    #[test]
    fn multi_field_ideal_contains_minimal_polynomials() {
        let mut ctx = Context::new();
        let s2 = ctx.ext_algebraic(Alg::from_qint(&QInt::from(2i64)).sqrt(8).unwrap());
        let pi = ctx.ext_function(FuncHead::Pi, vec![]);
        let k = ctx.field_for_gens(vec![pi, s2]);
        let field = ctx.field(k);
        // One relation: the minimal polynomial of sqrt2; pi contributes
        // nothing.
        assert_eq!(field.ideal().len(), 1);
    }

    #[test]
    fn pi_enclosure_is_accurate() {
        let mut ctx = Context::new();
        let pi = ctx.pi();
        let b = ctx.elem_enclosure(&pi, 128);
        assert!(b.re.sub(&RBall::pi(128), 128).contains_zero());
        assert!(b.im.contains_zero());
    }
}
