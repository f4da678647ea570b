// Descriptive statistics over dataset columns
// mean, value counts, group-by mean, histogram, kernel density estimate

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// RESULT TYPES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMean {
    pub group: String,
    pub mean: f64,
    pub count: usize,
}

/// Equal-width histogram. `edges` has one more entry than `counts`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn bin_width(&self) -> f64 {
        match (self.edges.first(), self.edges.get(1)) {
            (Some(lo), Some(hi)) => hi - lo,
            _ => 0.0,
        }
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// (lower edge, upper edge, count) per bin
    pub fn bins(&self) -> impl Iterator<Item = (f64, f64, usize)> + '_ {
        self.edges
            .windows(2)
            .zip(&self.counts)
            .map(|(edge, count)| (edge[0], edge[1], *count))
    }
}

// ============================================================================
// AGGREGATES
// ============================================================================

/// Arithmetic mean, `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator)
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(var.sqrt())
}

/// Distinct values with their counts, most frequent first.
/// Equal counts keep the order in which values first appear.
pub fn value_counts<'a, I>(cells: I) -> Vec<ValueCount>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut counts: Vec<ValueCount> = Vec::new();

    for cell in cells {
        match index.get(cell) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(cell, counts.len());
                counts.push(ValueCount {
                    value: cell.to_string(),
                    count: 1,
                });
            }
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// Share of each count in percent
pub fn percentages(counts: &[ValueCount]) -> Vec<f64> {
    let total: usize = counts.iter().map(|c| c.count).sum();
    if total == 0 {
        return vec![0.0; counts.len()];
    }
    counts
        .iter()
        .map(|c| c.count as f64 * 100.0 / total as f64)
        .collect()
}

/// Mean of `values` grouped by `keys`, highest mean first.
/// Rows with a missing value do not contribute to their group.
pub fn group_mean<'a, K>(keys: K, values: &[Option<f64>]) -> Vec<GroupMean>
where
    K: IntoIterator<Item = &'a str>,
{
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut sums: Vec<(String, f64, usize)> = Vec::new();

    for (key, value) in keys.into_iter().zip(values) {
        let Some(value) = value else { continue };
        match index.get(key) {
            Some(&i) => {
                sums[i].1 += value;
                sums[i].2 += 1;
            }
            None => {
                index.insert(key, sums.len());
                sums.push((key.to_string(), *value, 1));
            }
        }
    }

    let mut means: Vec<GroupMean> = sums
        .into_iter()
        .map(|(group, sum, count)| GroupMean {
            group,
            mean: sum / count as f64,
            count,
        })
        .collect();

    means.sort_by(|a, b| b.mean.total_cmp(&a.mean));
    means
}

/// Equal-width histogram over [min, max]; the last bin includes max.
pub fn histogram(values: &[f64], bins: usize) -> Histogram {
    if values.is_empty() || bins == 0 {
        return Histogram::default();
    }

    let mut lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }

    let width = (hi - lo) / bins as f64;
    let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();

    let mut counts = vec![0usize; bins];
    for value in values {
        let idx = (((value - lo) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }

    Histogram { edges, counts }
}

/// Gaussian kernel density estimate with Scott's bandwidth, evaluated on
/// `points` evenly spaced positions across the data range.
/// Returns (x, density) pairs; empty when the data has no spread.
pub fn kde(values: &[f64], points: usize) -> Vec<(f64, f64)> {
    let Some(std) = sample_std(values) else {
        return Vec::new();
    };
    if std == 0.0 || points < 2 {
        return Vec::new();
    }

    let n = values.len() as f64;
    let bandwidth = std * n.powf(-0.2);
    let norm = n * bandwidth * (2.0 * std::f64::consts::PI).sqrt();

    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let step = (hi - lo) / (points - 1) as f64;

    (0..points)
        .map(|i| {
            let x = lo + step * i as f64;
            let density = values
                .iter()
                .map(|v| {
                    let z = (x - v) / bandwidth;
                    (-0.5 * z * z).exp()
                })
                .sum::<f64>()
                / norm;
            (x, density)
        })
        .collect()
}

/// Days between admission and discharge for rows where both dates exist
pub fn length_of_stay(admissions: &[Option<NaiveDate>], discharges: &[Option<NaiveDate>]) -> Vec<i64> {
    admissions
        .iter()
        .zip(discharges)
        .filter_map(|(admitted, discharged)| match (admitted, discharged) {
            (Some(a), Some(d)) => Some((*d - *a).num_days()),
            _ => None,
        })
        .filter(|days| *days >= 0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), None);
        assert!(approx(mean(&[1.0, 2.0, 3.0, 4.0]).unwrap(), 2.5));
    }

    #[test]
    fn test_sample_std() {
        assert_eq!(sample_std(&[5.0]), None);
        // Var with n-1 of [2,4,4,4,5,5,7,9] is 32/7
        let std = sample_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!(approx(std, (32.0f64 / 7.0).sqrt()));
    }

    #[test]
    fn test_value_counts_sorted_with_stable_ties() {
        let counts = value_counts(["Urgent", "Elective", "Emergency", "Elective", "Urgent", "Urgent"]);

        assert_eq!(counts.len(), 3);
        assert_eq!(counts[0], ValueCount { value: "Urgent".into(), count: 3 });
        assert_eq!(counts[1], ValueCount { value: "Elective".into(), count: 2 });
        assert_eq!(counts[2].value, "Emergency");

        let ties = value_counts(["b", "a", "a", "b", "c"]);
        let order: Vec<&str> = ties.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_percentages_sum_to_hundred() {
        let counts = value_counts(["Male", "Female", "Female", "Female"]);
        let pct = percentages(&counts);

        assert!(approx(pct[0], 75.0));
        assert!(approx(pct[1], 25.0));
        assert!(approx(pct.iter().sum::<f64>(), 100.0));
        assert!(percentages(&[]).is_empty());
    }

    #[test]
    fn test_group_mean_skips_missing_values() {
        let keys = ["Aetna", "Cigna", "Aetna", "Cigna", "Medicare"];
        let values = [Some(100.0), Some(50.0), Some(300.0), None, Some(120.0)];

        let means = group_mean(keys, &values);

        assert_eq!(means.len(), 3);
        assert_eq!(means[0].group, "Aetna");
        assert!(approx(means[0].mean, 200.0));
        assert_eq!(means[0].count, 2);
        assert_eq!(means[1].group, "Medicare");
        assert_eq!(means[2].group, "Cigna");
        assert_eq!(means[2].count, 1);
    }

    #[test]
    fn test_histogram_equal_width_bins() {
        let values = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
        let hist = histogram(&values, 5);

        assert_eq!(hist.edges.len(), 6);
        assert!(approx(hist.bin_width(), 2.0));
        // Last bin is closed on the right, so 10.0 lands in it
        assert_eq!(hist.counts, vec![2, 2, 2, 2, 3]);
        assert_eq!(hist.total(), values.len());
        assert_eq!(hist.max_count(), 3);
    }

    #[test]
    fn test_histogram_constant_and_empty_input() {
        let hist = histogram(&[42.0, 42.0], 4);
        assert!(approx(hist.edges[0], 41.5));
        assert!(approx(hist.edges[4], 42.5));
        assert_eq!(hist.total(), 2);

        assert_eq!(histogram(&[], 20), Histogram::default());
    }

    #[test]
    fn test_kde_integrates_to_about_one() {
        let values: Vec<f64> = (0..200).map(|i| (i % 50) as f64).collect();
        let curve = kde(&values, 200);

        assert_eq!(curve.len(), 200);
        assert!(approx(curve[0].0, 0.0));
        assert!(approx(curve[199].0, 49.0));

        // Trapezoid over the data range; mass in the tails is cut off
        let area: f64 = curve
            .windows(2)
            .map(|w| (w[1].0 - w[0].0) * (w[0].1 + w[1].1) / 2.0)
            .sum();
        assert!(area > 0.85 && area <= 1.0, "area = {area}");
    }

    #[test]
    fn test_kde_degenerate_input() {
        assert!(kde(&[], 10).is_empty());
        assert!(kde(&[3.0], 10).is_empty());
        assert!(kde(&[3.0, 3.0, 3.0], 10).is_empty());
    }

    #[test]
    fn test_length_of_stay() {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day);
        let admissions = [d(2024, 1, 1), d(2024, 1, 10), None, d(2024, 3, 5)];
        let discharges = [d(2024, 1, 4), None, d(2024, 2, 1), d(2024, 3, 1)];

        assert_eq!(length_of_stay(&admissions, &discharges), vec![3]);
    }
}
