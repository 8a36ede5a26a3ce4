use serde::Serialize;

/// Summary of one numeric series.
///
/// Variance is the unbiased sample variance (n - 1 denominator). Skewness
/// and kurtosis are the biased moment estimators, kurtosis in Fisher form
/// (normal = 0). Quartiles interpolate linearly between closest ranks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DescriptiveStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub variance: f64,
    pub skewness: f64,
    pub kurtosis: f64,
    pub first_quartile: f64,
    pub median: f64,
    pub third_quartile: f64,
}

/// Describe `data`. `None` for an empty series.
pub fn describe(data: &[f64]) -> Option<DescriptiveStats> {
    if data.is_empty() {
        return None;
    }
    let n = data.len() as f64;
    let mut sorted = data.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mean = data.iter().sum::<f64>() / n;
    let moment = |k: i32| data.iter().map(|x| (x - mean).powi(k)).sum::<f64>() / n;
    let m2 = moment(2);
    let m3 = moment(3);
    let m4 = moment(4);

    let variance = if data.len() > 1 { m2 * n / (n - 1.0) } else { 0.0 };
    // A constant series has no shape.
    let (skewness, kurtosis) = if m2 > 0.0 {
        (m3 / m2.powf(1.5), m4 / (m2 * m2) - 3.0)
    } else {
        (0.0, 0.0)
    };

    Some(DescriptiveStats {
        count: data.len(),
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        mean,
        variance,
        skewness,
        kurtosis,
        first_quartile: percentile(&sorted, 25.0),
        median: percentile(&sorted, 50.0),
        third_quartile: percentile(&sorted, 75.0),
    })
}

/// Score at `pct` percent of an ascending, non-empty series.
pub fn percentile(sorted: &[f64], pct: f64) -> f64 {
    let rank = pct / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}
