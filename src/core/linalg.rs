//! Small dense solvers for the forecasting models.

use crate::utils::error::{ForecastError, Result};

/// Relative pivot size below which a system is treated as singular.
const SINGULAR_TOLERANCE: f64 = 1e-10;

/// Solves `a * x = b` by Gaussian elimination with partial pivoting.
/// `a` is row-major and square.
pub fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>> {
    let n = b.len();
    if a.len() != n || a.iter().any(|row| row.len() != n) {
        return Err(ForecastError::ProcessingError {
            message: format!("linear system is not {}x{}", n, n),
        });
    }

    let scale = a
        .iter()
        .flat_map(|row| row.iter())
        .fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if scale == 0.0 || !scale.is_finite() {
        return Err(ForecastError::NumericalFit {
            message: "normal-equation matrix is zero or non-finite".to_string(),
        });
    }

    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .unwrap_or(col);
        if a[pivot_row][col].abs() <= SINGULAR_TOLERANCE * scale {
            return Err(ForecastError::NumericalFit {
                message: format!("normal-equation matrix is singular at column {}", col),
            });
        }
        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        for row in (col + 1)..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = ((row + 1)..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }

    ensure_finite(&x)?;
    Ok(x)
}

/// Levinson-Durbin recursion for the Yule-Walker equations.
/// `autocov[0..=p]` holds lags 0 through `p`; returns `a_1..a_p`.
pub fn levinson_durbin(autocov: &[f64]) -> Result<Vec<f64>> {
    let Some((&gamma0, lags)) = autocov.split_first() else {
        return Ok(Vec::new());
    };
    let order = lags.len();
    if gamma0 <= 0.0 || !gamma0.is_finite() {
        return Err(ForecastError::NumericalFit {
            message: "autocovariance at lag 0 is not positive".to_string(),
        });
    }

    let mut coeffs: Vec<f64> = Vec::with_capacity(order);
    let mut error = gamma0;
    for k in 1..=order {
        let acc: f64 = (1..k).map(|j| coeffs[j - 1] * autocov[k - j]).sum();
        let reflection = (autocov[k] - acc) / error;
        if !reflection.is_finite() || reflection.abs() >= 1.0 {
            return Err(ForecastError::NumericalFit {
                message: format!("reflection coefficient {} at lag {} is unstable", reflection, k),
            });
        }

        let previous = coeffs.clone();
        for j in 1..k {
            coeffs[j - 1] = previous[j - 1] - reflection * previous[k - j - 1];
        }
        coeffs.push(reflection);

        error *= 1.0 - reflection * reflection;
        if error <= SINGULAR_TOLERANCE * gamma0 {
            return Err(ForecastError::NumericalFit {
                message: format!("autocovariance matrix is ill-conditioned at lag {}", k),
            });
        }
    }

    ensure_finite(&coeffs)?;
    Ok(coeffs)
}

fn ensure_finite(values: &[f64]) -> Result<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(ForecastError::NumericalFit {
            message: "solution contains non-finite values".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solve_with_pivoting() {
        // first pivot is zero, needs a row swap
        let a = vec![
            vec![0.0, 2.0, 1.0],
            vec![1.0, 1.0, 0.0],
            vec![2.0, 0.0, 3.0],
        ];
        let x = solve(a, vec![7.0, 3.0, 11.0]).unwrap();
        assert!((x[0] - 1.0).abs() < 1e-9);
        assert!((x[1] - 2.0).abs() < 1e-9);
        assert!((x[2] - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_solve_rejects_singular_matrix() {
        let a = vec![vec![1.0, 2.0], vec![2.0, 4.0]];
        let err = solve(a, vec![1.0, 2.0]).unwrap_err();
        assert!(matches!(err, ForecastError::NumericalFit { .. }));
    }

    #[test]
    fn test_solve_rejects_zero_matrix() {
        let err = solve(vec![vec![0.0]], vec![0.0]).unwrap_err();
        assert!(matches!(err, ForecastError::NumericalFit { .. }));
    }

    #[test]
    fn test_levinson_durbin_ar1() {
        // AR(1) with phi = 0.5: gamma_k = gamma_0 * 0.5^k
        let coeffs = levinson_durbin(&[1.0, 0.5, 0.25]).unwrap();
        assert!((coeffs[0] - 0.5).abs() < 1e-12);
        assert!(coeffs[1].abs() < 1e-12);
    }

    #[test]
    fn test_levinson_durbin_matches_direct_solve() {
        let autocov = [2.0, 0.8, 0.3, 0.1];
        let lr = levinson_durbin(&autocov).unwrap();

        let toeplitz: Vec<Vec<f64>> = (0..3)
            .map(|i| (0..3).map(|j| autocov[(i as i64 - j as i64).unsigned_abs() as usize]).collect())
            .collect();
        let direct = solve(toeplitz, autocov[1..].to_vec()).unwrap();

        for (a, b) in lr.iter().zip(direct.iter()) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn test_levinson_durbin_rejects_zero_variance() {
        let err = levinson_durbin(&[0.0, 0.0]).unwrap_err();
        assert!(matches!(err, ForecastError::NumericalFit { .. }));
    }
}
