//! Closed-form probability density functions.
//!
//! Every function returns a finite, non-negative density. Inputs for which a
//! family is undefined (non-positive spread, zero range, `x` outside support)
//! yield 0.0.

use std::f64::consts::{E, PI};

/// Gaussian density from mean and standard deviation.
pub fn normal_pdf(x: f64, mean: f64, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }
    let z = (x - mean) / std_dev;
    finite_or_zero((1.0 / (std_dev * (2.0 * PI).sqrt())) * (-0.5 * z * z).exp())
}

/// Log-normal density, moment-matched to the sample mean and standard deviation.
///
/// `σ² = ln(1 + s²/m²)`, `μ = ln(m) - σ²/2`.
pub fn lognormal_pdf(x: f64, mean: f64, std_dev: f64) -> f64 {
    if x <= 0.0 || mean <= 0.0 || std_dev <= 0.0 {
        return 0.0;
    }
    let sigma2 = (1.0 + (std_dev * std_dev) / (mean * mean)).ln();
    let mu = mean.ln() - 0.5 * sigma2;
    let sigma = sigma2.sqrt();
    let d = x.ln() - mu;
    finite_or_zero((1.0 / (x * sigma * (2.0 * PI).sqrt())) * (-(d * d) / (2.0 * sigma2)).exp())
}

/// Triangular density over `[min, max]` peaking at `mode`.
pub fn triangular_pdf(x: f64, min: f64, max: f64, mode: f64) -> f64 {
    let range = max - min;
    if range <= 0.0 || x < min || x > max {
        return 0.0;
    }
    let density = if x == mode {
        2.0 / range
    } else if x < mode {
        2.0 * (x - min) / (range * (mode - min))
    } else {
        2.0 * (max - x) / (range * (max - mode))
    };
    finite_or_zero(density)
}

/// PERT density: a Beta distribution rescaled onto `(min, max)`.
///
/// Shape parameters `α = 1 + 4(mode-min)/range`, `β = 1 + 4(max-mode)/range`.
/// Zero at and outside the endpoints.
pub fn pert_pdf(x: f64, min: f64, max: f64, mode: f64) -> f64 {
    if x <= min || x >= max {
        return 0.0;
    }
    let range = max - min;
    let alpha = 1.0 + 4.0 * (mode - min) / range;
    let beta = 1.0 + 4.0 * (max - mode) / range;
    let z = (x - min) / range;
    let density = z.powf(alpha - 1.0) * (1.0 - z).powf(beta - 1.0) / (beta_function(alpha, beta) * range);
    finite_or_zero(density)
}

/// Weibull density with shape/scale estimated from mean and standard deviation.
///
/// Uses the rule of thumb `k = (s/m)^-1.086` and `λ = m / Γ(1 + 1/k)`.
pub fn weibull_pdf(x: f64, mean: f64, std_dev: f64) -> f64 {
    if x <= 0.0 || mean <= 0.0 || std_dev <= 0.0 {
        return 0.0;
    }
    let k = (std_dev / mean).powf(-1.086);
    let lambda = mean / stirling_gamma(1.0 + 1.0 / k);
    let ratio = x / lambda;
    finite_or_zero((k / lambda) * ratio.powf(k - 1.0) * (-ratio.powf(k)).exp())
}

/// Stirling's approximation `Γ(n) ≈ √(2π/n)·(n/e)^n`.
///
/// Low precision (about 8% low at n = 1, under 1% past n = 10). Adequate for
/// ranking fits against a histogram; not a general-purpose gamma function.
pub fn stirling_gamma(n: f64) -> f64 {
    (2.0 * PI / n).sqrt() * (n / E).powf(n)
}

/// Beta function `B(a, b) = Γ(a)Γ(b)/Γ(a+b)` via [`stirling_gamma`].
pub fn beta_function(a: f64, b: f64) -> f64 {
    stirling_gamma(a) * stirling_gamma(b) / stirling_gamma(a + b)
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 {
        v
    } else {
        0.0
    }
}
