use contracts::dashboards::d400_monthly_sales::DescriptiveStats;

/// Summary statistics of `values` with `describe()` semantics: sample
/// standard deviation and linearly interpolated quartiles. NaN values are
/// skipped; infinities take part and propagate.
pub fn describe(values: &[f64]) -> DescriptiveStats {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let count = sorted.len();
    if count == 0 {
        return DescriptiveStats {
            count: 0,
            mean: 0.0,
            std: None,
            min: 0.0,
            q25: 0.0,
            median: 0.0,
            q75: 0.0,
            max: 0.0,
        };
    }

    let mean = sorted.iter().sum::<f64>() / count as f64;
    let std = (count > 1).then(|| {
        let ss: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
        (ss / (count - 1) as f64).sqrt()
    });

    DescriptiveStats {
        count,
        mean,
        std,
        min: sorted[0],
        q25: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q75: quantile(&sorted, 0.75),
        max: sorted[count - 1],
    }
}

/// Linear interpolation between closest ranks. `sorted` must be non-empty.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = (sorted.len() - 1) as f64 * q;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    if frac == 0.0 {
        return sorted[lower];
    }
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_even_count() {
        let stats = describe(&[4.0, 1.0, 3.0, 2.0]);
        assert_eq!(stats.count, 4);
        assert_eq!(stats.mean, 2.5);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 4.0);
        assert_eq!(stats.q25, 1.75);
        assert_eq!(stats.median, 2.5);
        assert_eq!(stats.q75, 3.25);
        let std = stats.std.unwrap();
        assert!((std - 1.290_994_448_735_805_6).abs() < 1e-12);
    }

    #[test]
    fn test_describe_single_value_has_no_std() {
        let stats = describe(&[7.0]);
        assert_eq!(stats.count, 1);
        assert_eq!(stats.std, None);
        assert_eq!(stats.q25, 7.0);
        assert_eq!(stats.q75, 7.0);
    }

    #[test]
    fn test_describe_empty() {
        let stats = describe(&[]);
        assert_eq!(stats.count, 0);
        assert_eq!(stats.std, None);
    }

    #[test]
    fn test_describe_with_infinity() {
        let stats = describe(&[f64::NAN, 200.0, f64::INFINITY, 100.0]);
        assert_eq!(stats.count, 3);
        assert_eq!(stats.min, 100.0);
        assert_eq!(stats.median, 200.0);
        assert_eq!(stats.max, f64::INFINITY);
        assert_eq!(stats.mean, f64::INFINITY);
        assert!(stats.std.unwrap().is_nan());
    }

    #[test]
    fn test_describe_sample_revenue() {
        use crate::dashboards::d400_monthly_sales::loader::load_data;
        use crate::dashboards::d400_monthly_sales::sample::SAMPLE_CSV;
        use contracts::dashboards::d400_monthly_sales::DisplayUnit;

        let table = load_data(SAMPLE_CSV, DisplayUnit::Won).unwrap();
        let stats = describe(&table.revenues());
        assert_eq!(stats.count, 12);
        assert_eq!(stats.min, 11_000_000.0);
        assert_eq!(stats.max, 25_000_000.0);
        // sorted: 11, 12, 13.5, 17.5, 18, 19, 20, 21, 22, 23, 24, 25 (millions)
        assert_eq!(stats.median, 19_500_000.0);
        assert_eq!(stats.q25, 16_500_000.0);
        assert_eq!(stats.q75, 22_250_000.0);
    }
}
