//! General least-squares curve fitting.
//!
//! Fits a linear combination of basis functions to a dataset by solving the
//! normal equations. The basis set mirrors the functions the bench scripts
//! fit with: polynomial powers, sinusoids at a fixed frequency, square root
//! and x·ln(x) terms.

use std::f64::consts::TAU;
use std::fmt;

use nalgebra::{DMatrix, DVector, SVD};
use thiserror::Error;

/// Errors that can occur during fitting.
#[derive(Error, Debug)]
pub enum FitError {
    #[error("empty dataset")]
    EmptyData,

    #[error("x/y length mismatch: {x_len} x values, {y_len} y values")]
    LengthMismatch { x_len: usize, y_len: usize },

    #[error("no basis functions provided")]
    NoBasis,

    #[error("underdetermined fit: {points} points for {bases} basis functions")]
    Underdetermined { points: usize, bases: usize },

    #[error("singular normal matrix; basis functions are linearly dependent on this dataset")]
    Singular,
}

/// Result type for fitting operations.
pub type Result<T> = std::result::Result<T, FitError>;

/// A basis function for least-squares fitting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Basis {
    /// x^n (n = 0 is the constant term).
    Power(u32),
    /// sin(2π·freq·x).
    Sin(f64),
    /// cos(2π·freq·x).
    Cos(f64),
    /// √x.
    Sqrt,
    /// x·ln(x), taken as 0 at x = 0.
    XLogX,
}

impl Basis {
    /// Evaluate the basis function at a point.
    pub fn eval(&self, x: f64) -> f64 {
        match self {
            Basis::Power(n) => x.powi(*n as i32),
            Basis::Sin(freq) => (TAU * freq * x).sin(),
            Basis::Cos(freq) => (TAU * freq * x).cos(),
            Basis::Sqrt => x.sqrt(),
            Basis::XLogX => {
                if x == 0.0 {
                    0.0
                } else {
                    x * x.ln()
                }
            }
        }
    }
}

impl fmt::Display for Basis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Basis::Power(0) => write!(f, "1"),
            Basis::Power(1) => write!(f, "x"),
            Basis::Power(n) => write!(f, "x^{}", n),
            Basis::Sin(freq) => write!(f, "sin(2pi*{}*x)", freq),
            Basis::Cos(freq) => write!(f, "cos(2pi*{}*x)", freq),
            Basis::Sqrt => write!(f, "sqrt(x)"),
            Basis::XLogX => write!(f, "x*ln(x)"),
        }
    }
}

/// Polynomial basis functions up to the given degree, ascending:
/// `[1, x, x^2, ..., x^degree]`.
pub fn poly_basis(degree: u32) -> Vec<Basis> {
    (0..=degree).map(Basis::Power).collect()
}

/// Outcome of a least-squares fit.
#[derive(Debug, Clone)]
pub struct FitResult {
    /// Best-fit coefficient for each basis function, in input order.
    pub coefficients: Vec<f64>,
    /// Fitted value at each data point.
    pub fitted: Vec<f64>,
    /// Residual (observed minus fitted) at each data point.
    pub residuals: Vec<f64>,
    /// Coefficient of determination. Reported as 0 when y is constant.
    pub r_squared: f64,
    /// Mean squared error of the fit.
    pub mse: f64,
    bases: Vec<Basis>,
}

impl FitResult {
    /// Evaluate the fitted model at an arbitrary point.
    pub fn predict(&self, x: f64) -> f64 {
        self.bases
            .iter()
            .zip(&self.coefficients)
            .map(|(basis, c)| c * basis.eval(x))
            .sum()
    }

    /// The basis functions the model was fitted with.
    pub fn bases(&self) -> &[Basis] {
        &self.bases
    }
}

/// Compute a least-squares fit of `y` against the given basis functions.
///
/// Builds the design matrix A with one column per basis function and solves
/// the least-squares problem by singular value decomposition. A rank check
/// against a relative tolerance catches linearly dependent basis columns,
/// which rounding can slip past a normal-equations factorization.
///
/// # Arguments
///
/// * `x` - x-ordinate of each data point; `None` uses the sample indices
///   0..n, forcing a linear spacing between values
/// * `y` - observed values to fit
/// * `bases` - basis functions; the coefficients come back in the same order
///
/// # Errors
///
/// Returns an error for empty or mismatched data, an empty basis set, more
/// basis functions than points, or a singular normal matrix.
pub fn fit(x: Option<&[f64]>, y: &[f64], bases: &[Basis]) -> Result<FitResult> {
    if y.is_empty() {
        return Err(FitError::EmptyData);
    }
    if bases.is_empty() {
        return Err(FitError::NoBasis);
    }

    let n = y.len();
    let m = bases.len();

    let indices: Vec<f64>;
    let x = match x {
        Some(x) => {
            if x.len() != n {
                return Err(FitError::LengthMismatch {
                    x_len: x.len(),
                    y_len: n,
                });
            }
            x
        }
        None => {
            indices = (0..n).map(|i| i as f64).collect();
            &indices
        }
    };

    if n < m {
        return Err(FitError::Underdetermined {
            points: n,
            bases: m,
        });
    }

    // Design matrix: one row per point, one column per basis function
    let a = DMatrix::from_fn(n, m, |i, j| bases[j].eval(x[i]));
    let y_vec = DVector::from_column_slice(y);

    let svd = SVD::new(a.clone(), true, true);
    let max_singular = svd
        .singular_values
        .iter()
        .copied()
        .fold(0.0f64, f64::max);
    let tol = max_singular * f64::EPSILON * n.max(m) as f64;

    if max_singular == 0.0 || svd.rank(tol) < m {
        return Err(FitError::Singular);
    }

    let coeff = svd.solve(&y_vec, tol).map_err(|_| FitError::Singular)?;

    let fitted_vec = &a * &coeff;
    let fitted: Vec<f64> = fitted_vec.iter().copied().collect();
    let residuals: Vec<f64> = y.iter().zip(&fitted).map(|(obs, fit)| obs - fit).collect();

    let mean = y.iter().sum::<f64>() / n as f64;
    let sse: f64 = residuals.iter().map(|r| r * r).sum();
    let sse_total: f64 = y.iter().map(|v| (v - mean) * (v - mean)).sum();

    let r_squared = if sse_total > 0.0 {
        1.0 - sse / sse_total
    } else {
        0.0
    };
    let mse = sse / n as f64;

    Ok(FitResult {
        coefficients: coeff.iter().copied().collect(),
        fitted,
        residuals,
        r_squared,
        mse,
        bases: bases.to_vec(),
    })
}

/// Standardize residuals to zero mean and unit standard deviation.
///
/// Used for the residual-distribution histogram. Returns `None` when the
/// residuals have zero spread.
pub fn standardized_residuals(residuals: &[f64]) -> Option<Vec<f64>> {
    if residuals.is_empty() {
        return None;
    }

    let n = residuals.len() as f64;
    let mean = residuals.iter().sum::<f64>() / n;
    let variance = residuals.iter().map(|r| (r - mean) * (r - mean)).sum::<f64>() / n;
    let stdev = variance.sqrt();

    if stdev == 0.0 {
        return None;
    }

    Some(residuals.iter().map(|r| (r - mean) / stdev).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64, tol: f64) {
        assert!((a - b).abs() < tol, "{} != {} (tol {})", a, b, tol);
    }

    #[test]
    fn test_poly_basis_ascending() {
        let bases = poly_basis(3);
        assert_eq!(
            bases,
            vec![
                Basis::Power(0),
                Basis::Power(1),
                Basis::Power(2),
                Basis::Power(3)
            ]
        );
        assert_eq!(bases[2].eval(3.0), 9.0);
    }

    #[test]
    fn test_exact_linear_fit() {
        let x: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| 2.0 * v + 1.0).collect();

        let result = fit(Some(&x), &y, &poly_basis(1)).unwrap();

        assert_close(result.coefficients[0], 1.0, 1e-9);
        assert_close(result.coefficients[1], 2.0, 1e-9);
        assert_close(result.r_squared, 1.0, 1e-12);
        assert_close(result.mse, 0.0, 1e-12);
        assert_close(result.predict(20.0), 41.0, 1e-8);
    }

    #[test]
    fn test_quadratic_fit_with_noise() {
        let x: Vec<f64> = (0..50).map(|i| i as f64 * 0.1).collect();
        // y = 3 - x + 0.5 x^2 with a small deterministic wobble
        let y: Vec<f64> = x
            .iter()
            .enumerate()
            .map(|(i, v)| 3.0 - v + 0.5 * v * v + if i % 2 == 0 { 0.01 } else { -0.01 })
            .collect();

        let result = fit(Some(&x), &y, &poly_basis(2)).unwrap();

        assert_close(result.coefficients[0], 3.0, 0.05);
        assert_close(result.coefficients[1], -1.0, 0.05);
        assert_close(result.coefficients[2], 0.5, 0.05);
        assert!(result.r_squared > 0.99);
    }

    #[test]
    fn test_sinusoid_fit() {
        let freq = 0.25;
        let x: Vec<f64> = (0..100).map(|i| i as f64 * 0.05).collect();
        let y: Vec<f64> = x
            .iter()
            .map(|v| 1.5 * (TAU * freq * v).sin() + 0.5)
            .collect();

        let bases = vec![Basis::Sin(freq), Basis::Power(0)];
        let result = fit(Some(&x), &y, &bases).unwrap();

        assert_close(result.coefficients[0], 1.5, 1e-6);
        assert_close(result.coefficients[1], 0.5, 1e-6);
    }

    #[test]
    fn test_default_x_is_indices() {
        let y = vec![0.0, 2.0, 4.0, 6.0];
        let result = fit(None, &y, &poly_basis(1)).unwrap();
        assert_close(result.coefficients[1], 2.0, 1e-9);
    }

    #[test]
    fn test_constant_y_reports_zero_r_squared() {
        let y = vec![5.0; 8];
        let result = fit(None, &y, &poly_basis(0)).unwrap();
        assert_eq!(result.r_squared, 0.0);
        assert_close(result.coefficients[0], 5.0, 1e-9);
    }

    #[test]
    fn test_empty_data() {
        assert!(matches!(
            fit(None, &[], &poly_basis(1)),
            Err(FitError::EmptyData)
        ));
    }

    #[test]
    fn test_length_mismatch() {
        let result = fit(Some(&[0.0, 1.0]), &[1.0, 2.0, 3.0], &poly_basis(1));
        assert!(matches!(
            result,
            Err(FitError::LengthMismatch { x_len: 2, y_len: 3 })
        ));
    }

    #[test]
    fn test_underdetermined() {
        let result = fit(Some(&[0.0, 1.0]), &[1.0, 2.0], &poly_basis(3));
        assert!(matches!(
            result,
            Err(FitError::Underdetermined {
                points: 2,
                bases: 4
            })
        ));
    }

    #[test]
    fn test_singular_basis() {
        // Duplicated basis columns give a rank-deficient design matrix,
        // which rounding must not be allowed to disguise as solvable
        let x: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| v + 1.0).collect();
        let bases = vec![Basis::Power(1), Basis::Power(1)];

        assert!(matches!(
            fit(Some(&x), &y, &bases),
            Err(FitError::Singular)
        ));
    }

    #[test]
    fn test_zero_basis_column_is_singular() {
        // sin(0 * x) is identically zero, so its column carries no rank
        let x: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| v + 1.0).collect();
        let bases = vec![Basis::Power(0), Basis::Power(1), Basis::Sin(0.0)];

        assert!(matches!(
            fit(Some(&x), &y, &bases),
            Err(FitError::Singular)
        ));
    }

    #[test]
    fn test_standardized_residuals() {
        let residuals = vec![1.0, -1.0, 1.0, -1.0];
        let standardized = standardized_residuals(&residuals).unwrap();
        assert_close(standardized[0], 1.0, 1e-12);
        assert_close(standardized[1], -1.0, 1e-12);

        assert!(standardized_residuals(&[0.0, 0.0]).is_none());
        assert!(standardized_residuals(&[]).is_none());
    }
}
