//─────────────────────────────────────────────────────────────────────────────
// resolution-invariant metrics derived from the normalized score
//─────────────────────────────────────────────────────────────────────────────

/// PSNR (peak signal-to-noise ratio) in decibels.
/// - `mse`: mean squared error per channel
/// - `peak`: 255.0 for 8-bit images, 1.0 for normalized [0,1] range
/// higher PSNR = better quality. typical ranges:
///   - 30 dB = acceptable
///   - 35 dB = good
///   - 40+ dB = very good
#[inline]
pub fn psnr_from_mse(mse: f64, peak: f64) -> f64 {
    let mse = mse.max(1e-12);
    10.0 * ((peak * peak) / mse).log10()
}

/// percentage of the starting error removed so far (0-100, higher is better)
#[inline]
pub fn improvement_percent(baseline: f64, current: f64) -> f64 {
    let denom = if baseline > 0.0 { baseline } else { f64::EPSILON };
    ((1.0 - current / denom) * 100.0).clamp(0.0, 100.0)
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MetricsSnapshot {
    /// normalized RMSE in [0, 1]
    pub score: f64,
    /// RMSE in 8-bit units
    pub rmse: f64,
    pub psnr: f64,
}

impl MetricsSnapshot {
    #[inline]
    pub fn from_score(score: f64) -> Self {
        let rmse = score * 255.0;
        Self { score, rmse, psnr: psnr_from_mse(rmse * rmse, 255.0) }
    }
}
