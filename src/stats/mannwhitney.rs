use statrs::distribution::{ContinuousCDF, Normal};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum MannWhitneyError {
    #[error("both samples must be non-empty")]
    EmptySample,
    #[error("all observations are tied; the U statistic has zero variance")]
    ZeroVariance,
}

#[derive(Debug, Clone)]
pub struct MannWhitneyResult {
    /// U statistic of the first sample.
    pub u_statistic: f64,
    /// Two-sided p-value (normal approximation with tie and continuity
    /// corrections).
    pub p_value: f64,
    /// Rank-biserial effect size, `1 - 2U / (n1 * n2)`.
    pub effect_size: f64,
}

/// Two-sample Mann-Whitney U test comparing the distributions behind
/// `sample_a` and `sample_b`.
///
/// Ties receive average ranks; the tie correction is folded into the variance
/// of U. Non-finite observations are dropped before ranking.
pub fn mann_whitney_u(
    sample_a: &[f64],
    sample_b: &[f64],
) -> Result<MannWhitneyResult, MannWhitneyError> {
    let a: Vec<f64> = sample_a.iter().copied().filter(|v| v.is_finite()).collect();
    let b: Vec<f64> = sample_b.iter().copied().filter(|v| v.is_finite()).collect();
    if a.is_empty() || b.is_empty() {
        return Err(MannWhitneyError::EmptySample);
    }

    let n1 = a.len() as f64;
    let n2 = b.len() as f64;
    let n = n1 + n2;

    // Rank the pooled sample; `true` marks membership in sample_a.
    let mut pooled: Vec<(f64, bool)> = a
        .iter()
        .map(|&v| (v, true))
        .chain(b.iter().map(|&v| (v, false)))
        .collect();
    pooled.sort_by(|x, y| x.0.total_cmp(&y.0));

    let mut rank_sum_a = 0.0f64;
    let mut tie_term = 0.0f64;
    let mut idx = 0usize;
    while idx < pooled.len() {
        let mut run_end = idx + 1;
        while run_end < pooled.len() && pooled[run_end].0 == pooled[idx].0 {
            run_end += 1;
        }
        let run_len = (run_end - idx) as f64;
        // Average rank of the tied run, 1-based.
        let avg_rank = (idx + run_end + 1) as f64 / 2.0;
        for entry in &pooled[idx..run_end] {
            if entry.1 {
                rank_sum_a += avg_rank;
            }
        }
        if run_len > 1.0 {
            tie_term += run_len * run_len * run_len - run_len;
        }
        idx = run_end;
    }

    let u_statistic = rank_sum_a - n1 * (n1 + 1.0) / 2.0;
    let mean_u = n1 * n2 / 2.0;
    let variance = n1 * n2 / 12.0 * ((n + 1.0) - tie_term / (n * (n - 1.0)));
    if variance <= 0.0 {
        return Err(MannWhitneyError::ZeroVariance);
    }

    // Continuity correction, matching the usual large-sample two-sided form.
    let numerator = ((u_statistic - mean_u).abs() - 0.5).max(0.0);
    let z = numerator / variance.sqrt();

    let normal = Normal::new(0.0, 1.0).map_err(|_| MannWhitneyError::ZeroVariance)?;
    // sf() keeps precision for large z where 1 - cdf underflows.
    let p_value = (2.0 * normal.sf(z)).clamp(f64::MIN_POSITIVE, 1.0);

    let effect_size = 1.0 - 2.0 * u_statistic / (n1 * n2);

    Ok(MannWhitneyResult {
        u_statistic,
        p_value,
        effect_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fully_separated_samples_give_extreme_u_and_effect() {
        let result = mann_whitney_u(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]).expect("result");
        assert_eq!(result.u_statistic, 0.0);
        assert!((result.effect_size - 1.0).abs() < 1e-12);
        // z = (4.5 - 0.5) / sqrt(10.5) ≈ 1.7457, two-sided p ≈ 0.0809.
        assert!((result.p_value - 0.0809).abs() < 5e-3);

        let flipped = mann_whitney_u(&[4.0, 5.0, 6.0], &[1.0, 2.0, 3.0]).expect("result");
        assert_eq!(flipped.u_statistic, 9.0);
        assert!((flipped.effect_size + 1.0).abs() < 1e-12);
        assert!((flipped.p_value - result.p_value).abs() < 1e-12);
    }

    #[test]
    fn identical_samples_are_not_significant() {
        let result =
            mann_whitney_u(&[1.0, 2.0, 3.0, 4.0], &[1.0, 2.0, 3.0, 4.0]).expect("result");
        assert!((result.u_statistic - 8.0).abs() < 1e-12);
        assert!((result.effect_size - 0.0).abs() < 1e-12);
        assert!(result.p_value > 0.9);
    }

    #[test]
    fn ties_get_average_ranks() {
        // Pooled: [1, 2, 2, 3]; the tied 2s share rank 2.5.
        let result = mann_whitney_u(&[1.0, 2.0], &[2.0, 3.0]).expect("result");
        // R1 = 1 + 2.5 = 3.5, U1 = 3.5 - 3 = 0.5.
        assert!((result.u_statistic - 0.5).abs() < 1e-12);
    }

    #[test]
    fn empty_samples_are_rejected() {
        assert_eq!(
            mann_whitney_u(&[], &[1.0]).unwrap_err(),
            MannWhitneyError::EmptySample
        );
        assert_eq!(
            mann_whitney_u(&[1.0], &[f64::NAN]).unwrap_err(),
            MannWhitneyError::EmptySample
        );
    }

    #[test]
    fn all_tied_observations_have_zero_variance() {
        assert_eq!(
            mann_whitney_u(&[5.0, 5.0], &[5.0, 5.0]).unwrap_err(),
            MannWhitneyError::ZeroVariance
        );
    }
}
