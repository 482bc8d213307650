//! Exact rational linear algebra and small-dimension integer relations.
//!
//! `DependencyFinder` feeds the annihilating-polynomial search of the
//! algebraic-number kernel: vectors are offered one at a time and the
//! first linear dependency is reported with its exact coefficients.
//!
//! `integer_relation` is a textbook LLL reduction over an embedded
//! lattice, used to *guess* integer relations among logarithm values;
//! every guess is verified exactly by the caller before being used.

use crate::num::{QInt, QRat};
use rug::Float;

/// Incremental Gaussian elimination with combination tracking.
pub struct DependencyFinder {
    dim: usize,
    /// Reduced rows with their pivot column and the combination (over the
    /// offered vectors) that produced them.
    rows: Vec<(Vec<QRat>, usize, Vec<QRat>)>,
    offered: usize,
}

impl DependencyFinder {
    pub fn new(dim: usize) -> Self {
        DependencyFinder {
            dim,
            rows: Vec::new(),
            offered: 0,
        }
    }

    /// Offer a vector. Returns `Some(c)` when it is linearly dependent on
    /// the previously offered vectors: `sum c_i v_i = 0` with `c` of
    /// length equal to the number of vectors offered so far and the last
    /// entry equal to 1.
    pub fn offer(&mut self, v: Vec<QRat>) -> Option<Vec<QRat>> {
        assert_eq!(v.len(), self.dim);
        let index = self.offered;
        self.offered += 1;

        let mut vec = v;
        let mut combo = vec![QRat::zero(); index + 1];
        combo[index] = QRat::one();

        for (row, pivot, row_combo) in &self.rows {
            if vec[*pivot].is_zero() {
                continue;
            }
            let factor = &vec[*pivot] / &row[*pivot];
            for i in 0..self.dim {
                let delta = &factor * &row[i];
                vec[i] = &vec[i] - &delta;
            }
            for (i, rc) in row_combo.iter().enumerate() {
                let delta = &factor * rc;
                combo[i] = &combo[i] - &delta;
            }
        }

        match vec.iter().position(|c| !c.is_zero()) {
            None => Some(combo),
            Some(pivot) => {
                self.rows.push((vec, pivot, combo));
                None
            }
        }
    }

    pub fn rank(&self) -> usize {
        self.rows.len()
    }
}

// ---------------------------------------------------------------------------
// LLL integer relations
// ---------------------------------------------------------------------------

fn round_qrat(q: &QRat) -> QInt {
    (q + &QRat::from((1, 2))).floor()
}

fn dot(a: &[QInt], b: &[QInt]) -> QRat {
    let mut acc = QInt::zero();
    for (x, y) in a.iter().zip(b.iter()) {
        acc = &acc + &(x * y);
    }
    QRat::from(acc)
}

fn dot_qr(a: &[QRat], b: &[QInt]) -> QRat {
    let mut acc = QRat::zero();
    for (x, y) in a.iter().zip(b.iter()) {
        acc = &acc + &(x * &QRat::from(y.clone()));
    }
    acc
}

fn dot_qq(a: &[QRat], b: &[QRat]) -> QRat {
    let mut acc = QRat::zero();
    for (x, y) in a.iter().zip(b.iter()) {
        acc = &acc + &(x * y);
    }
    acc
}

struct Gso {
    /// Orthogonalized rows.
    star: Vec<Vec<QRat>>,
    /// Squared norms of the orthogonalized rows.
    norms: Vec<QRat>,
    /// mu[i][j] for j < i.
    mu: Vec<Vec<QRat>>,
}

fn gram_schmidt(basis: &[Vec<QInt>]) -> Gso {
    let n = basis.len();
    let mut star: Vec<Vec<QRat>> = Vec::with_capacity(n);
    let mut norms = Vec::with_capacity(n);
    let mut mu: Vec<Vec<QRat>> = Vec::with_capacity(n);
    for i in 0..n {
        let mut s: Vec<QRat> = basis[i]
            .iter()
            .map(|c| QRat::from(c.clone()))
            .collect();
        let mut mu_i = Vec::with_capacity(i);
        for j in 0..i {
            let m = if norms[j] == QRat::zero() {
                QRat::zero()
            } else {
                &dot_qr(&star[j], &basis[i]) / &norms[j]
            };
            for k in 0..s.len() {
                let delta = &m * &star[j][k];
                s[k] = &s[k] - &delta;
            }
            mu_i.push(m);
        }
        norms.push(dot_qq(&s, &s));
        star.push(s);
        mu.push(mu_i);
    }
    Gso { star, norms, mu }
}

/// LLL reduction (delta = 3/4) of an integer row basis, in place.
fn lll_reduce(basis: &mut Vec<Vec<QInt>>) {
    let n = basis.len();
    if n <= 1 {
        return;
    }
    let three_quarters = QRat::from((3, 4));
    let mut k = 1;
    let mut guard = 0usize;
    while k < n {
        guard += 1;
        if guard > 10_000 {
            // Give up rather than spin; callers treat the basis as a
            // best-effort heuristic anyway.
            return;
        }
        let gso = gram_schmidt(basis);
        // Size-reduce row k.
        for j in (0..k).rev() {
            let r = round_qrat(&gso.mu[k][j]);
            if !r.is_zero() {
                for idx in 0..basis[k].len() {
                    let delta = &basis[j][idx] * &r;
                    basis[k][idx] = &basis[k][idx] - &delta;
                }
            }
        }
        let gso = gram_schmidt(basis);
        let mu_sq = &gso.mu[k][k - 1] * &gso.mu[k][k - 1];
        let threshold = &(&three_quarters - &mu_sq) * &gso.norms[k - 1];
        if gso.norms[k] >= threshold {
            k += 1;
        } else {
            basis.swap(k, k - 1);
            k = k.max(2) - 1;
        }
    }
}

/// Search for a small integer relation `sum e_i x_i = 0` among the value
/// vectors `values[i]` (each a fixed-length tuple of real coordinates,
/// e.g. (re, im)). The floats should carry about `bits` significant
/// bits. The result is a heuristic candidate; callers must verify it.
pub fn integer_relation(values: &[Vec<Float>], bits: u32) -> Option<Vec<QInt>> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let r = values[0].len();
    let scale = Float::with_val(64, Float::i_exp(1, bits as i32));

    let mut basis: Vec<Vec<QInt>> = Vec::with_capacity(n);
    for (i, v) in values.iter().enumerate() {
        assert_eq!(v.len(), r);
        let mut row = vec![QInt::zero(); n + r];
        row[i] = QInt::one();
        for (k, x) in v.iter().enumerate() {
            let scaled = Float::with_val(x.prec().max(64) + bits, x * &scale);
            let (int, _) = scaled.to_integer_round(rug::float::Round::Nearest)?;
            row[n + k] = QInt(int);
        }
        basis.push(row);
    }

    lll_reduce(&mut basis);

    // Pick the row with the smallest norm whose relation part is nonzero.
    let mut best: Option<(&Vec<QInt>, QRat)> = None;
    for row in &basis {
        if row[..n].iter().all(QInt::is_zero) {
            continue;
        }
        let norm = dot(row, row);
        if best.as_ref().is_none_or(|(_, b)| norm < *b) {
            best = Some((row, norm));
        }
    }
    let (row, _) = best?;

    // Accept only when the residual part is small compared to the scale
    // and the coefficients are modest.
    let limit = QInt::from(2i64).pow_u32(bits / 2);
    for c in &row[n..] {
        if c.abs() > limit {
            return None;
        }
    }
    let coeff_limit = QInt::from(2i64).pow_u32(20);
    let rel: Vec<QInt> = row[..n].to_vec();
    if rel.iter().any(|c| c.abs() > coeff_limit) {
        return None;
    }
    Some(rel)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dependency_of_three_vectors() {
        let mut f = DependencyFinder::new(2);
        assert!(f.offer(vec![QRat::from(1), QRat::from(0)]).is_none());
        assert!(f.offer(vec![QRat::from(0), QRat::from(1)]).is_none());
        let c = f
            .offer(vec![QRat::from(2), QRat::from(3)])
            .expect("third vector in dimension 2 must be dependent");
        assert_eq!(c.len(), 3);
        assert_eq!(c[2], QRat::one());
        assert_eq!(c[0], QRat::from(-2));
        assert_eq!(c[1], QRat::from(-3));
    }

    #[test]
    fn dependency_detects_duplicate() {
        let mut f = DependencyFinder::new(3);
        let v = vec![QRat::from(1), QRat::from(2), QRat::from(3)];
        assert!(f.offer(v.clone()).is_none());
        let c = f.offer(v).expect("duplicate vector is dependent");
        assert_eq!(c, vec![QRat::from(-1), QRat::one()]);
    }

    #[test]
    fn relation_of_commensurable_logs() {
        // log 2, log 4, log 8 satisfy  e.g. 1*log2 + 1*log4 - 1*log8 = 0.
        let prec = 128;
        let l2 = Float::with_val(prec, 2u32).ln();
        let l4 = Float::with_val(prec, 4u32).ln();
        let l8 = Float::with_val(prec, 8u32).ln();
        let rel = integer_relation(
            &[vec![l2.clone()], vec![l4.clone()], vec![l8.clone()]],
            96,
        )
        .expect("relation should be found");
        // Verify numerically: rel . (l2, l4, l8) ~ 0.
        let mut acc = Float::with_val(prec, 0);
        for (c, l) in rel.iter().zip([&l2, &l4, &l8]) {
            let term = Float::with_val(prec, l * &Float::with_val(prec, &c.0));
            acc += term;
        }
        assert!(acc.abs() < Float::with_val(prec, 1e-20));
        assert!(rel.iter().any(|c| !c.is_zero()));
    }

    #[test]
    fn round_qrat_midpoints() {
        assert_eq!(round_qrat(&QRat::from((3, 2))), QInt::from(2i64));
        assert_eq!(round_qrat(&QRat::from((-3, 2))), QInt::from(-1i64));
        assert_eq!(round_qrat(&QRat::from(5)), QInt::from(5i64));
    }
}
