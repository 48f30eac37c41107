//! Log-densities of the distributions that make up the BEST model.
//!
//! Every function returns the natural logarithm of the density and
//! `f64::NEG_INFINITY` outside the support, so the results can be summed
//! directly into a log-posterior.

use statrs::function::gamma::ln_gamma;
use std::f64::consts::PI;

/// Log-density of Normal(`mu`, `sigma`) at `x`.
#[must_use]
pub fn normal_ln_pdf(x: f64, mu: f64, sigma: f64) -> f64 {
    let z = (x - mu) / sigma;
    -0.5 * (2.0 * PI).ln() - sigma.ln() - 0.5 * z * z
}

/// Log-density of Uniform(`low`, `high`) at `x`.
#[must_use]
pub fn uniform_ln_pdf(x: f64, low: f64, high: f64) -> f64 {
    if x < low || x > high {
        f64::NEG_INFINITY
    } else {
        -(high - low).ln()
    }
}

/// Log-density of Exponential(`rate`) at `x`.
#[must_use]
pub fn exponential_ln_pdf(x: f64, rate: f64) -> f64 {
    if x < 0.0 {
        f64::NEG_INFINITY
    } else {
        rate.ln() - rate * x
    }
}

/// Summed log-likelihood of `data` under a Student-t with `nu` degrees of
/// freedom, location `mu` and precision `lam` (= σ⁻²).
///
/// The normalising constant is computed once for the whole sample.
#[must_use]
pub fn student_t_ln_likelihood(data: &[f64], nu: f64, mu: f64, lam: f64) -> f64 {
    if nu <= 0.0 || lam <= 0.0 {
        return f64::NEG_INFINITY;
    }
    let n = data.len() as f64;
    let norm = ln_gamma((nu + 1.0) / 2.0) - ln_gamma(nu / 2.0) + 0.5 * (lam / (PI * nu)).ln();
    let kernel: f64 = data
        .iter()
        .map(|&x| (1.0 + lam * (x - mu).powi(2) / nu).ln())
        .sum();
    n * norm - (nu + 1.0) / 2.0 * kernel
}

/// Density (not log) of the location-scale Student-t at `x`.
///
/// Used to draw posterior predictive curves over the observed data.
#[must_use]
pub fn student_t_pdf(x: f64, nu: f64, mu: f64, sigma: f64) -> f64 {
    let lam = sigma.powi(-2);
    student_t_ln_likelihood(&[x], nu, mu, lam).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_normal_at_zero() {
        let expected = -(2.0 * PI).sqrt().ln();
        assert!((normal_ln_pdf(0.0, 0.0, 1.0) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_uniform_support() {
        assert!((uniform_ln_pdf(0.5, 0.0, 2.0) - (-(2.0_f64).ln())).abs() < 1e-12);
        assert_eq!(uniform_ln_pdf(-0.1, 0.0, 2.0), f64::NEG_INFINITY);
        assert_eq!(uniform_ln_pdf(2.1, 0.0, 2.0), f64::NEG_INFINITY);
    }

    #[test]
    fn test_exponential() {
        assert!((exponential_ln_pdf(0.0, 0.5) - 0.5_f64.ln()).abs() < 1e-12);
        assert!((exponential_ln_pdf(2.0, 0.5) - (0.5_f64.ln() - 1.0)).abs() < 1e-12);
        assert_eq!(exponential_ln_pdf(-1.0, 0.5), f64::NEG_INFINITY);
    }

    #[test]
    fn test_student_t_cauchy_case() {
        // nu = 1, unit scale is the standard Cauchy: 1 / pi at zero
        let pdf = student_t_pdf(0.0, 1.0, 0.0, 1.0);
        assert!((pdf - 1.0 / PI).abs() < 1e-10);
    }

    #[test]
    fn test_student_t_approaches_normal() {
        let t = student_t_pdf(0.7, 1e6, 0.0, 1.0).ln();
        let n = normal_ln_pdf(0.7, 0.0, 1.0);
        assert!((t - n).abs() < 1e-4);
    }

    #[test]
    fn test_likelihood_is_sum_of_pointwise() {
        let data = [0.3, -1.2, 2.5];
        let joint = student_t_ln_likelihood(&data, 4.0, 0.5, 0.25);
        let pointwise: f64 = data
            .iter()
            .map(|&x| student_t_ln_likelihood(&[x], 4.0, 0.5, 0.25))
            .sum();
        assert!((joint - pointwise).abs() < 1e-10);
    }

    #[test]
    fn test_invalid_parameters() {
        assert_eq!(
            student_t_ln_likelihood(&[1.0], -1.0, 0.0, 1.0),
            f64::NEG_INFINITY
        );
        assert_eq!(
            student_t_ln_likelihood(&[1.0], 3.0, 0.0, 0.0),
            f64::NEG_INFINITY
        );
    }
}
