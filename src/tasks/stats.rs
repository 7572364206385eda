use anyhow::Result;
use log::error;

/// Percentile cut points summarised for every (trace, batch) pair.
pub const PERCENTILES: [f64; 5] = [5.0, 25.0, 50.0, 75.0, 95.0];

pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        let reason = "cannot compute the mean of an empty column";
        error!("{reason}");
        anyhow::bail!(reason);
    }

    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Percentile `p` (in [0, 100]) with linear interpolation between the two
/// closest ranks, i.e. numpy's default method.
pub fn percentile(values: &[f64], p: f64) -> Result<f64> {
    if values.is_empty() {
        let reason = format!("cannot compute the {p}-th percentile of an empty column");
        error!("{reason}");
        anyhow::bail!(reason);
    }
    if !(0.0..=100.0).contains(&p) {
        let reason = format!("percentile out of range (p={p})");
        error!("{reason}");
        anyhow::bail!(reason);
    }

    let mut sorted = values.to_owned();
    sorted.sort_unstable_by(f64::total_cmp);

    let rank = (sorted.len() - 1) as f64 * p / 100.0;
    let lo = rank.floor() as usize;
    let hi = (lo + 1).min(sorted.len() - 1);
    let frac = rank - lo as f64;

    Ok(sorted[lo] + frac * (sorted[hi] - sorted[lo]))
}

pub fn percentiles(values: &[f64]) -> Result<[f64; PERCENTILES.len()]> {
    let mut result = [0.0; PERCENTILES.len()];
    for (slot, p) in result.iter_mut().zip(PERCENTILES) {
        *slot = percentile(values, p)?;
    }

    Ok(result)
}

/// Space baseline: the theta overhead amortised over the load factor.
pub fn space_baseline(theta: f64, alpha: f64) -> f64 {
    theta / alpha
}

pub fn round4(value: f64) -> f64 {
    (value * 1e4).round() / 1e4
}
