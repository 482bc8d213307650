//! Complex root isolation for squarefree polynomials.
//!
//! Approximations come from Aberth-Ehrlich simultaneous iteration; each
//! approximation is then certified a posteriori with the classical
//! n*|p(z)/p'(z)| disk bound (the logarithmic derivative argument), and
//! the whole set is accepted only once the certified disks are pairwise
//! disjoint. On failure the working precision doubles and the iteration
//! restarts from the refined points.

use super::Poly;
use crate::ball::{CBall, RBall};
use rug::float::Constant;
use rug::Float;

/// Plain (non-rigorous) complex float used inside the iteration.
#[derive(Clone, Debug)]
struct CF {
    re: Float,
    im: Float,
}

impl CF {
    fn new(re: Float, im: Float) -> Self {
        CF { re, im }
    }

    fn prec(&self) -> u32 {
        self.re.prec()
    }

    fn add(&self, o: &CF) -> CF {
        let p = self.prec();
        CF::new(
            Float::with_val(p, &self.re + &o.re),
            Float::with_val(p, &self.im + &o.im),
        )
    }

    fn sub(&self, o: &CF) -> CF {
        let p = self.prec();
        CF::new(
            Float::with_val(p, &self.re - &o.re),
            Float::with_val(p, &self.im - &o.im),
        )
    }

    fn mul(&self, o: &CF) -> CF {
        let p = self.prec();
        let re = Float::with_val(p, &self.re * &o.re) - Float::with_val(p, &self.im * &o.im);
        let im = Float::with_val(p, &self.re * &o.im) + Float::with_val(p, &self.im * &o.re);
        CF::new(re, im)
    }

    fn div(&self, o: &CF) -> CF {
        let p = self.prec();
        let norm = Float::with_val(p, &o.re * &o.re) + Float::with_val(p, &o.im * &o.im);
        let re = Float::with_val(p, &self.re * &o.re) + Float::with_val(p, &self.im * &o.im);
        let im = Float::with_val(p, &self.im * &o.re) - Float::with_val(p, &self.re * &o.im);
        CF::new(
            Float::with_val(p, &re / &norm),
            Float::with_val(p, &im / &norm),
        )
    }

    fn abs(&self) -> Float {
        let p = self.prec();
        let n = Float::with_val(p, &self.re * &self.re) + Float::with_val(p, &self.im * &self.im);
        Float::with_val(p, n.sqrt_ref())
    }
}

fn eval_cf(coeffs: &[Float], z: &CF) -> CF {
    let p = z.prec();
    let mut acc = CF::new(Float::new(p), Float::new(p));
    for c in coeffs.iter().rev() {
        acc = acc.mul(z);
        acc.re += c;
    }
    acc
}

/// Certified enclosure around an approximation: a box covering the disk
/// of radius n*|p(z)/p'(z)| centered at z. `None` when the derivative
/// bound fails.
fn certify(p: &Poly, dp: &Poly, z: &CF, prec: u32) -> Option<CBall> {
    let zb = CBall::new(
        RBall::from_float(z.re.clone(), prec),
        RBall::from_float(z.im.clone(), prec),
    );
    let num = p.eval_cball(&zb, prec).abs_ball(prec).abs_upper();
    let den = dp.eval_cball(&zb, prec).abs_ball(prec).abs_lower();
    if !(den.is_sign_positive() && !den.is_zero()) {
        return None;
    }
    let n = p.degree().unwrap_or(1) as u32;
    let mut r = Float::with_val(64, &num / &den);
    r *= n;
    // Slack for the rounding of the quotient itself.
    r *= 1.0001f64;
    if !r.is_finite() {
        return None;
    }
    Some(CBall::new(
        RBall::with_radius(Float::with_val(prec, &z.re), r.clone()),
        RBall::with_radius(Float::with_val(prec, &z.im), r),
    ))
}

/// Isolate all complex roots of a squarefree polynomial. The returned
/// boxes are pairwise disjoint and each contains exactly one root.
pub fn isolate_roots(p: &Poly, prec: u32) -> Vec<CBall> {
    let n = match p.degree() {
        None | Some(0) => return vec![],
        Some(n) => n,
    };
    if n == 1 {
        let root = &(-&p.coeff(0)) / &p.coeff(1);
        return vec![CBall::from_qrat(&root, prec.max(64))];
    }

    let dp = p.derivative();
    let mut work = prec.max(64);
    let mut points: Option<Vec<CF>> = None;

    loop {
        let coeffs: Vec<Float> = p
            .coeffs()
            .iter()
            .map(|c| Float::with_val(work, &c.0))
            .collect();
        let dcoeffs: Vec<Float> = dp
            .coeffs()
            .iter()
            .map(|c| Float::with_val(work, &c.0))
            .collect();

        let mut zs: Vec<CF> = match points.take() {
            Some(prev) => prev
                .into_iter()
                .map(|z| {
                    CF::new(
                        Float::with_val(work, &z.re),
                        Float::with_val(work, &z.im),
                    )
                })
                .collect(),
            None => initial_points(p, n, work),
        };

        // Aberth-Ehrlich sweeps.
        let iterations = 32 + work as usize / 2;
        for _ in 0..iterations {
            let mut max_step = Float::with_val(64, 0);
            for k in 0..n {
                let pv = eval_cf(&coeffs, &zs[k]);
                let dv = eval_cf(&dcoeffs, &zs[k]);
                if dv.abs().is_zero() {
                    continue;
                }
                let w = pv.div(&dv);
                // Repulsion sum over the other points.
                let mut s = CF::new(Float::new(work), Float::new(work));
                for j in 0..n {
                    if j != k {
                        let d = zs[k].sub(&zs[j]);
                        if !d.abs().is_zero() {
                            s = s.add(&CF::new(Float::with_val(work, 1), Float::new(work)).div(&d));
                        }
                    }
                }
                let denom = CF::new(Float::with_val(work, 1), Float::new(work)).sub(&w.mul(&s));
                let step = if denom.abs().is_zero() { w.clone() } else { w.div(&denom) };
                let sa = Float::with_val(64, step.abs());
                if sa > max_step {
                    max_step = sa;
                }
                let next = zs[k].sub(&step);
                zs[k] = next;
            }
            let tol = Float::with_val(64, Float::i_exp(1, -(work as i32) + 8));
            if max_step < tol {
                break;
            }
        }

        // Certify and check pairwise disjointness.
        let mut balls = Vec::with_capacity(n);
        let mut ok = true;
        for z in &zs {
            match certify(p, &dp, z, work) {
                Some(b) => balls.push(b),
                None => {
                    ok = false;
                    break;
                }
            }
        }
        if ok {
            'pairs: for i in 0..balls.len() {
                for j in i + 1..balls.len() {
                    if balls[i].overlaps(&balls[j]) {
                        ok = false;
                        break 'pairs;
                    }
                }
            }
        }
        if ok {
            return balls;
        }

        points = Some(zs);
        work *= 2;
        assert!(
            work <= 1 << 24,
            "isolate_roots: failed to separate roots of a squarefree polynomial"
        );
    }
}

fn initial_points(p: &Poly, n: usize, work: u32) -> Vec<CF> {
    // Points on a circle of radius 1 + max |a_i / a_n|.
    let lc = p.leading_coeff().unwrap();
    let mut radius = Float::with_val(work, 1);
    for c in p.coeffs() {
        let q = (c / &lc).abs();
        let f = Float::with_val(work, &q.0) + Float::with_val(work, 1u32);
        if f > radius {
            radius = f;
        }
    }
    let two_pi = Float::with_val(work, Constant::Pi) * 2u32;
    (0..n)
        .map(|k| {
            let mut theta = Float::with_val(work, &two_pi * &Float::with_val(work, k as u32));
            theta /= n as u32;
            theta += Float::with_val(work, 0.4);
            let c = Float::with_val(work, theta.cos_ref());
            let s = Float::with_val(work, theta.sin_ref());
            CF::new(
                Float::with_val(work, &radius * &c),
                Float::with_val(work, &radius * &s),
            )
        })
        .collect()
}

/// Tighten an isolating box around the single root of `p` it contains.
/// Newton iteration from the midpoint, accepted only when the certified
/// box lands inside the original one; otherwise the input is returned.
pub fn refine_root(p: &Poly, approx: &CBall, prec: u32) -> CBall {
    let n = match p.degree() {
        None | Some(0) => return approx.clone(),
        Some(n) => n,
    };
    if n == 1 {
        let root = &(-&p.coeff(0)) / &p.coeff(1);
        return CBall::from_qrat(&root, prec.max(64));
    }
    let dp = p.derivative();
    let mut work = prec.max(64) + 32;

    for _ in 0..8 {
        let coeffs: Vec<Float> = p
            .coeffs()
            .iter()
            .map(|c| Float::with_val(work, &c.0))
            .collect();
        let dcoeffs: Vec<Float> = dp
            .coeffs()
            .iter()
            .map(|c| Float::with_val(work, &c.0))
            .collect();
        let mut z = CF::new(
            Float::with_val(work, approx.re.mid()),
            Float::with_val(work, approx.im.mid()),
        );
        for _ in 0..(32 + work as usize / 4) {
            let pv = eval_cf(&coeffs, &z);
            let dv = eval_cf(&dcoeffs, &z);
            if dv.abs().is_zero() {
                break;
            }
            let step = pv.div(&dv);
            z = z.sub(&step);
        }
        if let Some(b) = certify(p, &dp, &z, work) {
            let inside = contains_box(approx, &b);
            if inside {
                return b;
            }
        }
        work *= 2;
    }
    approx.clone()
}

/// True when `inner` certainly lies inside `outer`.
fn contains_box(outer: &CBall, inner: &CBall) -> bool {
    contains_interval(&outer.re, &inner.re) && contains_interval(&outer.im, &inner.im)
}

fn contains_interval(outer: &RBall, inner: &RBall) -> bool {
    if outer.is_indeterminate() {
        return true;
    }
    if inner.is_indeterminate() {
        return false;
    }
    let prec = 64;
    inner.lower(prec) >= outer.lower(prec) && inner.upper(prec) <= outer.upper(prec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::num::QRat;

    #[test]
    fn roots_of_quadratic() {
        // x^2 - 2: roots +/- sqrt(2)
        let p = Poly::from_i64_coeffs(&[-2, 0, 1]);
        let roots = isolate_roots(&p, 64);
        assert_eq!(roots.len(), 2);
        let mut has_pos = false;
        let mut has_neg = false;
        for r in &roots {
            assert!(r.im.contains_zero());
            if r.re.is_positive() {
                has_pos = true;
            }
            if r.re.is_negative() {
                has_neg = true;
            }
        }
        assert!(has_pos && has_neg);
    }

    #[test]
    fn roots_of_cyclotomic_quartic() {
        // x^4 + 1: four complex roots on the unit circle.
        let p = Poly::from_i64_coeffs(&[1, 0, 0, 0, 1]);
        let roots = isolate_roots(&p, 64);
        assert_eq!(roots.len(), 4);
        for r in &roots {
            let m = r.abs_ball(64);
            assert!(m.may_contain_qrat(&QRat::one()));
        }
    }

    #[test]
    fn refine_shrinks_enclosure() {
        let p = Poly::from_i64_coeffs(&[-2, 0, 1]);
        let roots = isolate_roots(&p, 64);
        let pos = roots.iter().find(|r| r.re.is_positive()).unwrap();
        let tight = refine_root(&p, pos, 256);
        // sqrt(2) squared stays near 2.
        let sq = tight.mul(&tight, 256);
        assert!(sq.may_contain_qrat(&QRat::from(2)));
    }
}
