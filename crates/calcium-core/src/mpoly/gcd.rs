//! Multivariate gcd by recursive primitive PRS.
//!
//! The polynomial is viewed as univariate in a main variable with
//! coefficients in the remaining variables; content and primitive part
//! recurse on the coefficient ring. Adequate for the modest arities and
//! degrees that field elements reach in practice.

use super::MPoly;
use crate::num::QInt;

/// Gcd of two integer multivariate polynomials, normalized to a positive
/// leading (lex) coefficient. `gcd(0, b) = +/-b`.
pub fn mpoly_gcd(a: &MPoly, b: &MPoly) -> MPoly {
    assert_eq!(a.nvars(), b.nvars());
    let g = gcd_inner(a, b);
    normalize_sign(g)
}

fn normalize_sign(p: MPoly) -> MPoly {
    match p.leading_term() {
        Some((_, c)) if c.is_negative() => p.neg(),
        _ => p,
    }
}

fn gcd_inner(a: &MPoly, b: &MPoly) -> MPoly {
    if a.is_zero() {
        return b.clone();
    }
    if b.is_zero() {
        return a.clone();
    }
    if let (Some(ca), Some(cb)) = (a.as_constant(), b.as_constant()) {
        return MPoly::constant(a.nvars(), ca.gcd(&cb));
    }
    if a.as_constant().is_some() || b.as_constant().is_some() {
        // Constant against polynomial: gcd of the constant with the content.
        let c = a.content().gcd(&b.content());
        return MPoly::constant(a.nvars(), c);
    }

    // Main variable: lowest index used by either operand.
    let used_a = a.vars_used();
    let used_b = b.vars_used();
    let v = (0..a.nvars())
        .find(|&i| used_a[i] || used_b[i])
        .expect("nonconstant polynomial uses a variable");

    let ra = to_rec(a, v);
    let rb = to_rec(b, v);

    let cont_a = rec_content(&ra);
    let cont_b = rec_content(&rb);
    let cont_gcd = gcd_inner(&cont_a, &cont_b);

    let pa = rec_divexact_coeff(&ra, &cont_a);
    let pb = rec_divexact_coeff(&rb, &cont_b);

    let prim = rec_prs_gcd(pa, pb);
    let prim = {
        let c = rec_content(&prim);
        rec_divexact_coeff(&prim, &c)
    };

    from_rec(&prim, v).mul(&cont_gcd)
}

// ---- Recursive (univariate-in-v) representation ----
//
// A `Rec` is the coefficient list in ascending powers of v; every
// coefficient is an MPoly (same arity) not involving v.

type Rec = Vec<MPoly>;

fn to_rec(p: &MPoly, v: usize) -> Rec {
    let deg = p.degree_in(v) as usize;
    let mut out = vec![MPoly::zero(p.nvars()); deg + 1];
    for (e, c) in p.terms() {
        let k = e[v] as usize;
        let mut e2 = e.clone();
        e2[v] = 0;
        let mono = MPoly::monomial(p.nvars(), e2, c.clone());
        out[k] = out[k].add(&mono);
    }
    rec_trim(out)
}

fn from_rec(r: &Rec, v: usize) -> MPoly {
    let nvars = r.first().map_or(0, MPoly::nvars);
    let mut acc = MPoly::zero(nvars);
    for (k, c) in r.iter().enumerate() {
        if c.is_zero() {
            continue;
        }
        let mut shift = super::Exps::from_elem(0, nvars);
        shift[v] = k as u32;
        acc = acc.add(&c.mul_monomial(&shift, &QInt::one()));
    }
    acc
}

fn rec_trim(mut r: Rec) -> Rec {
    while r.last().is_some_and(MPoly::is_zero) {
        r.pop();
    }
    r
}

fn rec_deg(r: &Rec) -> Option<usize> {
    if r.is_empty() {
        None
    } else {
        Some(r.len() - 1)
    }
}

fn rec_content(r: &Rec) -> MPoly {
    let nvars = r.first().map_or(0, MPoly::nvars);
    let mut g = MPoly::zero(nvars);
    for c in r {
        g = gcd_inner(&g, c);
    }
    normalize_sign(g)
}

fn rec_divexact_coeff(r: &Rec, d: &MPoly) -> Rec {
    r.iter()
        .map(|c| {
            if c.is_zero() {
                c.clone()
            } else {
                c.div_exact(d)
            }
        })
        .collect()
}

fn rec_mul_coeff(r: &Rec, m: &MPoly) -> Rec {
    rec_trim(r.iter().map(|c| c.mul(m)).collect())
}

fn rec_sub(a: &Rec, b: &Rec) -> Rec {
    let nvars = a
        .first()
        .or_else(|| b.first())
        .map_or(0, MPoly::nvars);
    let n = a.len().max(b.len());
    let zero = MPoly::zero(nvars);
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let x = a.get(i).unwrap_or(&zero);
        let y = b.get(i).unwrap_or(&zero);
        out.push(x.sub(y));
    }
    rec_trim(out)
}

/// Pseudo-remainder of `a` by `b` in the main variable: the remainder of
/// `lc(b)^(da - db + 1) * a` divided by `b`, all divisions exact.
fn rec_pseudo_rem(a: &Rec, b: &Rec) -> Rec {
    let db = rec_deg(b).expect("pseudo_rem by zero");
    let lc_b = b[db].clone();
    let mut r = a.to_vec();
    loop {
        let Some(dr) = rec_deg(&r) else {
            return r;
        };
        if dr < db {
            return r;
        }
        let lead = r[dr].clone();
        // r <- lc(b) * r - lead * v^(dr-db) * b
        let shifted: Rec = {
            let mut s = vec![MPoly::zero(lead.nvars()); dr - db];
            s.extend(b.iter().map(|c| c.mul(&lead)));
            s
        };
        r = rec_sub(&rec_mul_coeff(&r, &lc_b), &shifted);
        if rec_deg(&r).is_some_and(|d| d >= dr) {
            // Leading coefficient must have cancelled by construction.
            panic!("rec_pseudo_rem failed to reduce degree");
        }
    }
}

/// Primitive PRS gcd of two primitive recursive polynomials.
fn rec_prs_gcd(mut f: Rec, mut g: Rec) -> Rec {
    loop {
        if g.is_empty() {
            return f;
        }
        if rec_deg(&g) == Some(0) {
            // Coefficient-ring unit after content removal.
            return vec![MPoly::one(g[0].nvars())];
        }
        if rec_deg(&f) < rec_deg(&g) {
            std::mem::swap(&mut f, &mut g);
            continue;
        }
        let r = rec_pseudo_rem(&f, &g);
        let r = if r.is_empty() {
            r
        } else {
            let c = rec_content(&r);
            rec_divexact_coeff(&r, &c)
        };
        f = g;
        g = r;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> MPoly {
        MPoly::gen(2, 0)
    }

    fn y() -> MPoly {
        MPoly::gen(2, 1)
    }

    #[test]
    fn gcd_of_common_factor() {
        // gcd((x+y)(x-y), (x+y)^2) = x+y
        let s = x().add(&y());
        let d = x().sub(&y());
        let a = s.mul(&d);
        let b = s.mul(&s);
        assert_eq!(mpoly_gcd(&a, &b), s);
    }

    #[test]
    fn gcd_coprime_is_constant() {
        let a = x().add(&MPoly::one(2));
        let b = y().add(&MPoly::one(2));
        let g = mpoly_gcd(&a, &b);
        assert!(g.is_one());
    }

    #[test]
    fn gcd_includes_integer_content() {
        let a = x().mul_scalar(&QInt::from(6i64));
        let b = x().mul_scalar(&QInt::from(4i64));
        let g = mpoly_gcd(&a, &b);
        assert_eq!(g, x().mul_scalar(&QInt::from(2i64)));
    }

    #[test]
    fn gcd_with_zero() {
        let a = x().add(&y());
        assert_eq!(mpoly_gcd(&a, &MPoly::zero(2)), a);
        assert_eq!(mpoly_gcd(&MPoly::zero(2), &a), a);
    }

    #[test]
    fn gcd_univariate_case() {
        // gcd(x^2 - 1, x^2 - 2x + 1) = x - 1
        let xm1 = x().sub(&MPoly::one(2));
        let xp1 = x().add(&MPoly::one(2));
        let a = xm1.mul(&xp1);
        let b = xm1.mul(&xm1);
        assert_eq!(mpoly_gcd(&a, &b), xm1);
    }
}
