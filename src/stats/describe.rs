/// Descriptive summary of one duration group.
///
/// `std` is the n-1 sample standard deviation and is NaN for a single
/// observation, which the text report prints as-is.
#[derive(Debug, Clone)]
pub struct GroupSummary {
    pub count: u64,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub p99: f64,
    pub max: f64,
}

/// Linear-interpolation percentile over a pre-sorted slice. `pct` in `[0, 1]`.
pub fn percentile_sorted(values: &[f64], pct: f64) -> Option<f64> {
    if values.is_empty() || !pct.is_finite() {
        return None;
    }
    let p = pct.clamp(0.0, 1.0);
    if values.len() == 1 {
        return Some(values[0]);
    }
    let pos = p * ((values.len() - 1) as f64);
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let lo_v = values.get(lo).copied()?;
    let hi_v = values.get(hi).copied()?;
    let frac = pos - (lo as f64);
    Some(lo_v + (hi_v - lo_v) * frac)
}

/// Summarizes one group. Non-finite observations are dropped first; an empty
/// group has no summary.
pub fn summarize(values: &[f64]) -> Option<GroupSummary> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));

    let n = sorted.len();
    let mean = sorted.iter().sum::<f64>() / n as f64;
    let std = if n < 2 {
        f64::NAN
    } else {
        let ss: f64 = sorted.iter().map(|v| (v - mean) * (v - mean)).sum();
        (ss / (n as f64 - 1.0)).sqrt()
    };

    Some(GroupSummary {
        count: n as u64,
        mean,
        std,
        min: sorted[0],
        p25: percentile_sorted(&sorted, 0.25)?,
        p50: percentile_sorted(&sorted, 0.50)?,
        p75: percentile_sorted(&sorted, 0.75)?,
        p90: percentile_sorted(&sorted, 0.90)?,
        p99: percentile_sorted(&sorted, 0.99)?,
        max: sorted[n - 1],
    })
}
