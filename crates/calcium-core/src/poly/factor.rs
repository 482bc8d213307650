//! Factorization over Q[x].
//!
//! Pipeline: content/primitive split, Yun squarefree decomposition,
//! cyclotomic trial division for the cheap wins, then a single-big-prime
//! Cantor-Zassenhaus factorization with subset recombination. The prime
//! is chosen above twice the Landau-Mignotte bound so every integer
//! factor is the symmetric lift of a subset product of the modular
//! factors.
//!
//! The equal-degree splitting step draws "random" polynomials from a
//! splitmix generator seeded by the input polynomial, keeping the whole
//! library deterministic.

use super::cyclotomic::{cyclotomic_poly, euler_phi};
use super::gcd::poly_gcd;
use super::Poly;
use crate::num::{QInt, QRat};
use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Result of factorization over Q[x]:
/// `content * prod_i factor_i ^ multiplicity_i`, with every factor
/// irreducible, integer-primitive and positive-leading.
#[derive(Clone, Debug)]
pub struct PolyFactors {
    pub content: QRat,
    pub factors: Vec<(Poly, usize)>,
}

/// Factor a polynomial over Q into irreducible factors.
pub fn factor(poly: &Poly) -> PolyFactors {
    if poly.is_zero() {
        return PolyFactors {
            content: QRat::zero(),
            factors: vec![],
        };
    }
    if poly.is_constant() {
        return PolyFactors {
            content: poly.coeff(0),
            factors: vec![],
        };
    }

    let (_, prim) = poly.to_int_primitive();
    let mut factors: Vec<(Poly, usize)> = Vec::new();

    for (sqf, mult) in yun_squarefree(&prim) {
        let (_, sqf_prim) = sqf.to_int_primitive();
        for irr in factor_squarefree(&sqf_prim) {
            match factors.iter_mut().find(|(f, _)| *f == irr) {
                Some(entry) => entry.1 += mult,
                None => factors.push((irr, mult)),
            }
        }
    }

    factors.sort_by(|(a, _), (b, _)| cmp_poly_for_sort(a, b));

    // The content is whatever rational constant remains after dividing by
    // the primitive positive-leading factors.
    let mut prod_lc = QRat::one();
    for (f, m) in &factors {
        prod_lc = &prod_lc * &f.leading_coeff().unwrap().pow_i64(*m as i64);
    }
    let content = &poly.leading_coeff().unwrap() / &prod_lc;
    PolyFactors { content, factors }
}

fn cmp_poly_for_sort(a: &Poly, b: &Poly) -> Ordering {
    match a.degree().cmp(&b.degree()) {
        Ordering::Equal => {
            let d = a.degree().unwrap_or(0);
            for i in 0..=d {
                let c = a.coeff(i).cmp(&b.coeff(i));
                if c != Ordering::Equal {
                    return c;
                }
            }
            Ordering::Equal
        }
        other => other,
    }
}

/// Yun's squarefree decomposition over Q. Returns monically-normalized
/// squarefree parts with their multiplicities; the unit is dropped
/// (callers work with primitive parts).
fn yun_squarefree(f: &Poly) -> Vec<(Poly, usize)> {
    let f = f.make_monic();
    if f.degree().is_none_or(|d| d <= 1) {
        if f.is_constant() {
            return vec![];
        }
        return vec![(f, 1)];
    }
    let fp = f.derivative();
    let c = poly_gcd(&f, &fp);
    if c.is_one() {
        return vec![(f, 1)];
    }
    let mut out = Vec::new();
    let mut w = f.exact_div(&c);
    let mut y = fp.exact_div(&c);
    let mut z = &y - &w.derivative();
    let mut i = 1;
    while !w.is_constant() {
        let g = poly_gcd(&w, &z);
        if g.degree().is_some_and(|d| d > 0) {
            out.push((g.clone(), i));
        }
        w = w.exact_div(&g);
        y = z.exact_div(&g);
        z = &y - &w.derivative();
        i += 1;
    }
    out
}

/// Detect whether a primitive integer polynomial is the n-th cyclotomic
/// polynomial for some n, returning that n.
pub fn is_cyclotomic(p: &Poly) -> Option<usize> {
    let d = p.degree()?;
    if d == 0 {
        return None;
    }
    // phi(n) >= sqrt(n/2), so phi(n) = d forces n <= 2 d^2 (+ slack).
    let bound = 2 * d * d + 4;
    (1..=bound).find(|&n| euler_phi(n) == d && *p == cyclotomic_poly(n))
}

/// Factor a squarefree primitive integer polynomial into irreducible
/// primitive integer factors with positive leading coefficients.
fn factor_squarefree(f: &Poly) -> Vec<Poly> {
    let deg = match f.degree() {
        None | Some(0) => return vec![],
        Some(d) => d,
    };
    if deg == 1 {
        return vec![f.clone()];
    }

    let mut out = Vec::new();
    let mut remaining = f.clone();

    // Cheap pass: cyclotomic trial division, highest order first, as in
    // the classical q-series tooling.
    let max_n = 2 * deg * deg + 4;
    for n in (1..=max_n).rev() {
        let phi_deg = euler_phi(n);
        if remaining.degree().is_none_or(|d| phi_deg > d) {
            continue;
        }
        let phi_n = cyclotomic_poly(n);
        let (q, r) = remaining.div_rem(&phi_n);
        if r.is_zero() {
            out.push(phi_n);
            remaining = q;
        }
        if remaining.is_constant() {
            break;
        }
    }

    let (_, remaining) = remaining.to_int_primitive();
    if remaining.is_constant() {
        out.sort_by(cmp_poly_for_sort);
        return out;
    }
    if remaining.degree() == Some(1) {
        out.push(remaining);
        out.sort_by(cmp_poly_for_sort);
        return out;
    }

    out.extend(zassenhaus_big_prime(&remaining));
    out.sort_by(cmp_poly_for_sort);
    out
}

// ---------------------------------------------------------------------------
// Arithmetic in (Z/p)[x]
//
// A modular polynomial is a Vec<QInt> of coefficients in [0, p), trailing
// zeros stripped.
// ---------------------------------------------------------------------------

type MpPoly = Vec<QInt>;

fn mp_trim(mut v: MpPoly) -> MpPoly {
    while v.last().is_some_and(|c| c.is_zero()) {
        v.pop();
    }
    v
}

fn mp_from_poly(f: &Poly, p: &QInt) -> MpPoly {
    mp_trim(
        f.int_coeffs()
            .iter()
            .map(|c| c.rem_euclid(p))
            .collect(),
    )
}

fn mp_deg(f: &MpPoly) -> Option<usize> {
    if f.is_empty() {
        None
    } else {
        Some(f.len() - 1)
    }
}

fn mp_x() -> MpPoly {
    vec![QInt::zero(), QInt::one()]
}

fn mp_sub(a: &MpPoly, b: &MpPoly, p: &QInt) -> MpPoly {
    let n = a.len().max(b.len());
    let zero = QInt::zero();
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let x = a.get(i).unwrap_or(&zero);
        let y = b.get(i).unwrap_or(&zero);
        out.push((x - y).rem_euclid(p));
    }
    mp_trim(out)
}

fn mp_mul(a: &MpPoly, b: &MpPoly, p: &QInt) -> MpPoly {
    if a.is_empty() || b.is_empty() {
        return vec![];
    }
    let mut out = vec![QInt::zero(); a.len() + b.len() - 1];
    for (i, x) in a.iter().enumerate() {
        if x.is_zero() {
            continue;
        }
        for (j, y) in b.iter().enumerate() {
            out[i + j] = (&out[i + j] + &(x * y)).rem_euclid(p);
        }
    }
    mp_trim(out)
}

fn mp_inv_scalar(c: &QInt, p: &QInt) -> QInt {
    let inv = rug::Integer::from(&c.0)
        .invert(&p.0)
        .unwrap_or_else(|_| panic!("mp_inv_scalar: modulus not prime to input"));
    QInt(inv)
}

/// Make monic; input must be nonzero.
fn mp_monic(f: &MpPoly, p: &QInt) -> MpPoly {
    let lc = f.last().expect("mp_monic of zero");
    if lc.is_one() {
        return f.clone();
    }
    let inv = mp_inv_scalar(lc, p);
    mp_trim(f.iter().map(|c| (c * &inv).rem_euclid(p)).collect())
}

/// Remainder of `a` modulo monic `m`.
fn mp_rem(a: &MpPoly, m: &MpPoly, p: &QInt) -> MpPoly {
    let md = mp_deg(m).expect("mp_rem by zero");
    debug_assert!(m.last().unwrap().is_one(), "mp_rem divisor must be monic");
    let mut r = a.clone();
    while let Some(rd) = mp_deg(&r) {
        if rd < md {
            break;
        }
        let lead = r.last().unwrap().clone();
        let shift = rd - md;
        for (i, c) in m.iter().enumerate() {
            r[i + shift] = (&r[i + shift] - &(&lead * c)).rem_euclid(p);
        }
        r = mp_trim(r);
    }
    r
}

fn mp_divexact(a: &MpPoly, d: &MpPoly, p: &QInt) -> MpPoly {
    // Divide by a monic divisor, asserting exactness.
    let dd = mp_deg(d).expect("mp_divexact by zero");
    let d = mp_monic(d, p);
    let mut r = a.clone();
    let ad = match mp_deg(&r) {
        None => return vec![],
        Some(x) => x,
    };
    assert!(ad >= dd);
    let mut q = vec![QInt::zero(); ad - dd + 1];
    while let Some(rd) = mp_deg(&r) {
        if rd < dd {
            break;
        }
        let lead = r.last().unwrap().clone();
        let shift = rd - dd;
        q[shift] = lead.clone();
        for (i, c) in d.iter().enumerate() {
            r[i + shift] = (&r[i + shift] - &(&lead * c)).rem_euclid(p);
        }
        r = mp_trim(r);
    }
    assert!(r.is_empty(), "mp_divexact with nonzero remainder");
    mp_trim(q)
}

fn mp_gcd(a: &MpPoly, b: &MpPoly, p: &QInt) -> MpPoly {
    let mut f = a.clone();
    let mut g = b.clone();
    while !g.is_empty() {
        let gm = mp_monic(&g, p);
        let r = mp_rem(&f, &gm, p);
        f = g;
        g = r;
    }
    if f.is_empty() {
        f
    } else {
        mp_monic(&f, p)
    }
}

fn mp_derivative(f: &MpPoly, p: &QInt) -> MpPoly {
    if f.len() <= 1 {
        return vec![];
    }
    mp_trim(
        f.iter()
            .enumerate()
            .skip(1)
            .map(|(i, c)| (c * &QInt::from(i as u64)).rem_euclid(p))
            .collect(),
    )
}

/// base^exp modulo the monic polynomial `m`, exponent a nonnegative QInt.
fn mp_powmod(base: &MpPoly, exp: &QInt, m: &MpPoly, p: &QInt) -> MpPoly {
    let mut result = vec![QInt::one()];
    let mut b = mp_rem(base, m, p);
    let bits = exp.bits();
    for i in 0..bits {
        if exp.0.get_bit(i) {
            result = mp_rem(&mp_mul(&result, &b, p), m, p);
        }
        if i + 1 < bits {
            b = mp_rem(&mp_mul(&b, &b, p), m, p);
        }
    }
    result
}

// ---------------------------------------------------------------------------
// Big-prime Zassenhaus
// ---------------------------------------------------------------------------

/// Deterministic pseudo-random stream (splitmix64).
struct Splitmix(u64);

impl Splitmix {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }
}

fn seed_for(f: &Poly) -> u64 {
    let mut h = DefaultHasher::new();
    f.hash(&mut h);
    h.finish()
}

/// Landau-Mignotte-style bound: any integer factor of `f` has
/// coefficients bounded by (n+1) * 2^n * max|a_i|.
fn coefficient_bound(f: &Poly) -> QInt {
    let deg = f.degree().unwrap_or(0) as u32;
    let mut max = QInt::one();
    for c in f.int_coeffs() {
        let a = c.abs();
        if a > max {
            max = a;
        }
    }
    let two_n = QInt::from(2i64).pow_u32(deg);
    QInt::from(deg as u64 + 1) * two_n * max
}

fn next_prime_from(start: QInt) -> QInt {
    use rug::integer::IsPrime;
    let mut candidate = if start.0.is_even() {
        QInt(rug::Integer::from(&start.0 + 1u32))
    } else {
        start
    };
    loop {
        if candidate.0.is_probably_prime(40) != IsPrime::No {
            return candidate;
        }
        candidate = QInt(rug::Integer::from(&candidate.0 + 2u32));
    }
}

fn symmetric_lift(c: &QInt, p: &QInt) -> QInt {
    let half = QInt(rug::Integer::from(&p.0 >> 1u32));
    if *c > half {
        c - p
    } else {
        c.clone()
    }
}

/// Factor a squarefree primitive integer polynomial of degree >= 2 that
/// has no cyclotomic factors left. Returns primitive positive-leading
/// irreducible integer factors.
fn zassenhaus_big_prime(f: &Poly) -> Vec<Poly> {
    let lc = f.leading_coeff().unwrap().to_qint().expect("primitive poly");

    // Prime above twice the factor bound times the leading coefficient,
    // with f squarefree mod p.
    let bound = coefficient_bound(f);
    let mut p = next_prime_from(QInt::from(2i64) * bound * lc.abs() + QInt::from(3i64));
    let fm = loop {
        let fm = mp_from_poly(f, &p);
        if mp_deg(&fm) == f.degree() {
            let g = mp_gcd(&fm, &mp_derivative(&fm, &p), &p);
            if mp_deg(&g) == Some(0) {
                break fm;
            }
        }
        p = next_prime_from(QInt(rug::Integer::from(&p.0 + 2u32)));
    };

    let fm = mp_monic(&fm, &p);
    let mut rng = Splitmix(seed_for(f));
    let mut modular = factor_mod_p(&fm, &p, &mut rng);
    modular.sort_by_key(|g| g.len());

    // Subset recombination with trial division over Z.
    let mut result = Vec::new();
    let mut remaining = f.clone();
    let mut pool: Vec<MpPoly> = modular;
    let mut size = 1;
    'outer: while !pool.is_empty() {
        if size > pool.len() {
            break;
        }
        let mut indices: Vec<usize> = (0..size).collect();
        loop {
            if let Some(candidate) = try_subset(&remaining, &pool, &indices, &p) {
                let (q, r) = remaining.div_rem(&candidate);
                if r.is_zero() {
                    result.push(candidate);
                    remaining = q.to_int_primitive().1;
                    // Remove used modular factors, restart at this size.
                    for &i in indices.iter().rev() {
                        pool.remove(i);
                    }
                    continue 'outer;
                }
            }
            if !next_combination(&mut indices, pool.len()) {
                break;
            }
        }
        size += 1;
    }

    if remaining.degree().is_some_and(|d| d > 0) {
        result.push(remaining);
    }
    result
}

/// Build the integer candidate lc * prod(pool[indices]) via symmetric lift.
fn try_subset(remaining: &Poly, pool: &[MpPoly], indices: &[usize], p: &QInt) -> Option<Poly> {
    let deg_sum: usize = indices
        .iter()
        .map(|&i| mp_deg(&pool[i]).unwrap_or(0))
        .sum();
    let rem_deg = remaining.degree()?;
    if deg_sum == 0 || deg_sum > rem_deg {
        return None;
    }
    let lc = remaining.leading_coeff()?.to_qint()?;
    let mut prod = vec![lc.rem_euclid(p)];
    for &i in indices {
        prod = mp_mul(&prod, &pool[i], p);
    }
    let lifted: Vec<QInt> = prod.iter().map(|c| symmetric_lift(c, p)).collect();
    let cand = Poly::from_qint_coeffs(&lifted);
    let (_, prim) = cand.to_int_primitive();
    if prim.is_constant() {
        None
    } else {
        Some(prim)
    }
}

fn next_combination(indices: &mut [usize], n: usize) -> bool {
    let k = indices.len();
    let mut i = k;
    while i > 0 {
        i -= 1;
        if indices[i] != i + n - k {
            indices[i] += 1;
            for j in i + 1..k {
                indices[j] = indices[j - 1] + 1;
            }
            return true;
        }
    }
    false
}

/// Factor a monic squarefree polynomial modulo the odd prime `p`.
fn factor_mod_p(f: &MpPoly, p: &QInt, rng: &mut Splitmix) -> Vec<MpPoly> {
    let mut out = Vec::new();

    // Distinct-degree splitting.
    let mut h = mp_x();
    let mut v = f.clone();
    let mut d = 0usize;
    while let Some(vd) = mp_deg(&v) {
        if vd == 0 {
            break;
        }
        d += 1;
        if 2 * d > vd {
            // What is left is irreducible.
            out.push((v.clone(), vd));
            break;
        }
        h = mp_powmod(&h, p, &v, p);
        let g = mp_gcd(&mp_sub(&h, &mp_x(), p), &v, p);
        if mp_deg(&g).is_some_and(|gd| gd > 0) {
            out.push((g.clone(), d));
            v = mp_divexact(&v, &g, p);
            h = mp_rem(&h, &v, p);
        }
    }

    // Equal-degree splitting of each distinct-degree part.
    let mut irreducibles = Vec::new();
    for (part, d) in out {
        edf(&part, d, p, rng, &mut irreducibles);
    }
    irreducibles
}

/// Cantor-Zassenhaus equal-degree splitting: `f` is a monic squarefree
/// product of irreducibles all of degree `d`.
fn edf(f: &MpPoly, d: usize, p: &QInt, rng: &mut Splitmix, out: &mut Vec<MpPoly>) {
    let fd = mp_deg(f).expect("edf of zero");
    if fd == d {
        out.push(mp_monic(f, p));
        return;
    }
    // exponent (p^d - 1) / 2
    let pd = QInt(rug::Integer::from(rug::ops::Pow::pow(&p.0, d as u32)));
    let exp = QInt(rug::Integer::from(&pd.0 - 1u32) >> 1u32);

    loop {
        // Random polynomial of degree < fd.
        let mut r: MpPoly = (0..fd)
            .map(|_| {
                let mut acc = rug::Integer::from(0u32);
                // Enough 64-bit words to cover the modulus.
                let words = (p.bits() / 64 + 2) as usize;
                for _ in 0..words {
                    acc <<= 64u32;
                    acc += rug::Integer::from(rng.next());
                }
                QInt(acc).rem_euclid(p)
            })
            .collect();
        r = mp_trim(r);
        if mp_deg(&r).is_none_or(|rd| rd == 0) {
            continue;
        }
        let s = mp_powmod(&r, &exp, f, p);
        let s_minus_1 = mp_sub(&s, &vec![QInt::one()], p);
        let g = mp_gcd(&s_minus_1, f, p);
        if let Some(gd) = mp_deg(&g) {
            if gd > 0 && gd < fd {
                edf(&g, d, p, rng, out);
                edf(&mp_divexact(f, &g, p), d, p, rng, out);
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factor_product_of_linears() {
        // (x - 1)(x - 2)(x + 3)
        let p = &(&Poly::from_i64_coeffs(&[-1, 1]) * &Poly::from_i64_coeffs(&[-2, 1]))
            * &Poly::from_i64_coeffs(&[3, 1]);
        let fac = factor(&p);
        assert_eq!(fac.factors.len(), 3);
        for (f, m) in &fac.factors {
            assert_eq!(*m, 1);
            assert_eq!(f.degree(), Some(1));
        }
    }

    #[test]
    fn factor_irreducible_quadratic() {
        let p = Poly::from_i64_coeffs(&[1, 1, 1]); // x^2 + x + 1 (cyclotomic)
        let fac = factor(&p);
        assert_eq!(fac.factors.len(), 1);
        assert_eq!(fac.factors[0], (p, 1));
    }

    #[test]
    fn factor_x4_minus_4() {
        // x^4 - 4 = (x^2 - 2)(x^2 + 2)
        let p = Poly::from_i64_coeffs(&[-4, 0, 0, 0, 1]);
        let fac = factor(&p);
        assert_eq!(fac.factors.len(), 2);
        assert!(fac
            .factors
            .iter()
            .any(|(f, _)| *f == Poly::from_i64_coeffs(&[-2, 0, 1])));
        assert!(fac
            .factors
            .iter()
            .any(|(f, _)| *f == Poly::from_i64_coeffs(&[2, 0, 1])));
    }

    #[test]
    fn factor_with_multiplicity() {
        // (x - 1)^2 (x^2 + 1)
        let p = &(&Poly::from_i64_coeffs(&[-1, 1]) * &Poly::from_i64_coeffs(&[-1, 1]))
            * &Poly::from_i64_coeffs(&[1, 0, 1]);
        let fac = factor(&p);
        assert!(fac
            .factors
            .iter()
            .any(|(f, m)| *f == Poly::from_i64_coeffs(&[-1, 1]) && *m == 2));
        assert!(fac
            .factors
            .iter()
            .any(|(f, m)| *f == Poly::from_i64_coeffs(&[1, 0, 1]) && *m == 1));
    }

    #[test]
    fn factor_content_extraction() {
        let p = Poly::from_i64_coeffs(&[6, 12]); // 6(2x + 1)
        let fac = factor(&p);
        assert_eq!(fac.content, QRat::from(6));
        assert_eq!(fac.factors, vec![(Poly::from_i64_coeffs(&[1, 2]), 1)]);
    }

    #[test]
    fn factor_degree_six_mixed() {
        // (x^2 - 2)(x^3 - x - 1)(x + 5)
        let a = Poly::from_i64_coeffs(&[-2, 0, 1]);
        let b = Poly::from_i64_coeffs(&[-1, -1, 0, 1]);
        let c = Poly::from_i64_coeffs(&[5, 1]);
        let p = &(&a * &b) * &c;
        let fac = factor(&p);
        assert_eq!(fac.factors.len(), 3);
        assert!(fac.factors.iter().any(|(f, _)| *f == a));
        assert!(fac.factors.iter().any(|(f, _)| *f == b));
        assert!(fac.factors.iter().any(|(f, _)| *f == c));
    }

    #[test]
    fn cyclotomic_detection() {
        assert_eq!(is_cyclotomic(&cyclotomic_poly(12)), Some(12));
        assert_eq!(is_cyclotomic(&Poly::from_i64_coeffs(&[-2, 0, 1])), None);
    }
}
