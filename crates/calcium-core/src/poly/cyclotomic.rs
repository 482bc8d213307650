//! Cyclotomic polynomials.

use super::Poly;

/// Divisors of `n` in ascending order.
pub(crate) fn divisors(n: usize) -> Vec<usize> {
    if n == 0 {
        return vec![];
    }
    let mut divs = Vec::new();
    let mut i = 1;
    while i * i <= n {
        if n % i == 0 {
            divs.push(i);
            if i != n / i {
                divs.push(n / i);
            }
        }
        i += 1;
    }
    divs.sort_unstable();
    divs
}

/// Euler's totient function.
pub(crate) fn euler_phi(n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    let mut result = n;
    let mut m = n;
    let mut p = 2;
    while p * p <= m {
        if m % p == 0 {
            while m % p == 0 {
                m /= p;
            }
            result -= result / p;
        }
        p += 1;
    }
    if m > 1 {
        result -= result / m;
    }
    result
}

fn x_n_minus_1(n: usize) -> Poly {
    let mut coeffs = vec![0i64; n + 1];
    coeffs[0] = -1;
    coeffs[n] = 1;
    Poly::from_i64_coeffs(&coeffs)
}

/// The n-th cyclotomic polynomial Phi_n(x), computed by dividing x^n - 1
/// by Phi_d(x) for every proper divisor d of n.
///
/// # Panics
///
/// Panics if `n == 0`.
pub fn cyclotomic_poly(n: usize) -> Poly {
    assert!(n > 0, "cyclotomic_poly: n must be positive");

    if n == 1 {
        return Poly::from_i64_coeffs(&[-1, 1]);
    }

    let mut result = x_n_minus_1(n);
    for &d in &divisors(n) {
        if d == n {
            continue;
        }
        result = result.exact_div(&cyclotomic_poly(d));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_order_cyclotomics() {
        assert_eq!(cyclotomic_poly(1), Poly::from_i64_coeffs(&[-1, 1]));
        assert_eq!(cyclotomic_poly(2), Poly::from_i64_coeffs(&[1, 1]));
        assert_eq!(cyclotomic_poly(4), Poly::from_i64_coeffs(&[1, 0, 1]));
        assert_eq!(cyclotomic_poly(6), Poly::from_i64_coeffs(&[1, -1, 1]));
        assert_eq!(cyclotomic_poly(12), Poly::from_i64_coeffs(&[1, 0, -1, 0, 1]));
    }

    #[test]
    fn product_over_divisors_is_x_n_minus_1() {
        for n in 1..=12 {
            let mut product = Poly::one();
            for &d in &divisors(n) {
                product = &product * &cyclotomic_poly(d);
            }
            assert_eq!(product, x_n_minus_1(n));
        }
    }

    #[test]
    fn phi_values() {
        assert_eq!(euler_phi(1), 1);
        assert_eq!(euler_phi(12), 4);
        assert_eq!(euler_phi(13), 12);
    }
}
