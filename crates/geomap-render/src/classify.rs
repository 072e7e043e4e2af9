//! Classification of numeric values into ordered bins
//!
//! Each scheme returns the upper bound of every bin, ascending; the last bound is the
//! maximum value. Fewer distinct values than classes yields one bin per distinct value.

use geomap_core::error::{GeomapError, Result};
use geomap_core::models::ClassificationScheme;
use geomap_core::stats::percentile;

/// Natural Breaks runs on at most this many sorted values
const JENKS_MAX_SAMPLE: usize = 1000;

/// Upper bin bounds for `values` under `scheme` with `k` classes
pub fn classify(values: &[f64], scheme: ClassificationScheme, k: usize) -> Result<Vec<f64>> {
    if k == 0 {
        return Err(GeomapError::InvalidInput("number of classes must be at least 1".to_string()));
    }

    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return Err(GeomapError::InvalidInput("no finite values to classify".to_string()));
    }
    sorted.sort_by(f64::total_cmp);

    let mut distinct = sorted.clone();
    distinct.dedup();
    if distinct.len() <= k {
        return Ok(distinct);
    }

    let mut bins = match scheme {
        ClassificationScheme::EqualInterval => equal_interval(&sorted, k),
        ClassificationScheme::Quantiles => quantiles(&sorted, k),
        ClassificationScheme::NaturalBreaks => natural_breaks(&sorted, k),
    };
    bins.dedup();
    Ok(bins)
}

fn equal_interval(sorted: &[f64], k: usize) -> Vec<f64> {
    let min = sorted[0];
    let max = sorted[sorted.len() - 1];
    let width = (max - min) / k as f64;
    let mut bins: Vec<f64> = (1..k).map(|i| min + width * i as f64).collect();
    bins.push(max);
    bins
}

fn quantiles(sorted: &[f64], k: usize) -> Vec<f64> {
    (1..=k).map(|i| percentile(sorted, 100.0 * i as f64 / k as f64)).collect()
}

fn natural_breaks(sorted: &[f64], k: usize) -> Vec<f64> {
    let max = sorted[sorted.len() - 1];
    let sample: Vec<f64> = if sorted.len() > JENKS_MAX_SAMPLE {
        let step = (sorted.len() - 1) as f64 / (JENKS_MAX_SAMPLE - 1) as f64;
        (0..JENKS_MAX_SAMPLE).map(|i| sorted[(i as f64 * step).round() as usize]).collect()
    } else {
        sorted.to_vec()
    };

    let mut bins = fisher_jenks(&sample, k);
    if let Some(last) = bins.last_mut() {
        *last = max;
    }
    bins
}

/// Optimal variance-minimizing breaks over sorted data (Fisher/Jenks dynamic program)
fn fisher_jenks(data: &[f64], k: usize) -> Vec<f64> {
    let n = data.len();
    let mut lower = vec![vec![0usize; k + 1]; n + 1];
    let mut variance = vec![vec![f64::INFINITY; k + 1]; n + 1];
    for class in 1..=k {
        lower[1][class] = 1;
        variance[1][class] = 0.0;
    }

    for l in 2..=n {
        let (mut sum, mut sum_sq, mut w) = (0.0, 0.0, 0.0);
        let mut v = 0.0;
        for m in 1..=l {
            let i3 = l - m + 1;
            let value = data[i3 - 1];
            sum_sq += value * value;
            sum += value;
            w += 1.0;
            v = sum_sq - (sum * sum) / w;
            let i4 = i3 - 1;
            if i4 != 0 {
                for class in 2..=k {
                    let candidate = v + variance[i4][class - 1];
                    if variance[l][class] >= candidate {
                        lower[l][class] = i3;
                        variance[l][class] = candidate;
                    }
                }
            }
        }
        lower[l][1] = 1;
        variance[l][1] = v;
    }

    let mut bounds = vec![0.0; k];
    bounds[k - 1] = data[n - 1];
    let mut end = n;
    for class in (2..=k).rev() {
        let start = lower[end][class];
        bounds[class - 2] = data[start - 2];
        end = start - 1;
    }
    bounds
}

/// Index of the bin holding `value`; values above the last bound go to the last bin
pub fn bin_of(value: f64, bins: &[f64]) -> usize {
    bins.iter().position(|upper| value <= *upper).unwrap_or(bins.len().saturating_sub(1))
}

/// Legend text for each bin: "< X" for the first, then "A - B"
pub fn legend_labels(bins: &[f64]) -> Vec<String> {
    bins.iter()
        .enumerate()
        .map(|(i, upper)| match i {
            0 => format!("< {:.2}", upper),
            _ => format!("{:.2} - {:.2}", bins[i - 1], upper),
        })
        .collect()
}

/// `n` equal-width bins between min and max, as `n + 1` edges
pub fn equal_width_edges(min: f64, max: f64, n: usize) -> Vec<f64> {
    let width = (max - min) / n as f64;
    let mut edges: Vec<f64> = (0..n).map(|i| min + width * i as f64).collect();
    edges.push(max);
    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_equal_interval() {
        let values = [0.0, 2.0, 4.0, 6.0, 8.0, 10.0];
        let bins = classify(&values, ClassificationScheme::EqualInterval, 5).unwrap();
        assert_eq!(bins, vec![2.0, 4.0, 6.0, 8.0, 10.0]);
    }

    #[test]
    fn test_quantiles() {
        let values: Vec<f64> = (1..=8).map(|v| v as f64).collect();
        let bins = classify(&values, ClassificationScheme::Quantiles, 4).unwrap();
        assert_eq!(bins, vec![2.75, 4.5, 6.25, 8.0]);
    }

    #[test]
    fn test_natural_breaks_separates_clusters() {
        let values = [1.0, 1.1, 1.2, 10.0, 10.5, 11.0, 50.0, 51.0, 52.0];
        let bins = classify(&values, ClassificationScheme::NaturalBreaks, 3).unwrap();
        assert_eq!(bins, vec![1.2, 11.0, 52.0]);
    }

    #[test]
    fn test_fewer_distinct_values_than_classes() {
        let values = [3.0, 1.0, 3.0, 1.0];
        let bins = classify(&values, ClassificationScheme::NaturalBreaks, 5).unwrap();
        assert_eq!(bins, vec![1.0, 3.0]);
    }

    #[test]
    fn test_invalid_input() {
        assert!(classify(&[], ClassificationScheme::Quantiles, 5).is_err());
        assert!(classify(&[f64::NAN], ClassificationScheme::Quantiles, 5).is_err());
        assert!(classify(&[1.0, 2.0], ClassificationScheme::Quantiles, 0).is_err());
    }

    #[test]
    fn test_bin_of_and_labels() {
        let bins = vec![10.0, 20.0, 30.0];
        assert_eq!(bin_of(5.0, &bins), 0);
        assert_eq!(bin_of(10.0, &bins), 0);
        assert_eq!(bin_of(10.5, &bins), 1);
        assert_eq!(bin_of(99.0, &bins), 2);
        assert_eq!(legend_labels(&bins), vec!["< 10.00", "10.00 - 20.00", "20.00 - 30.00"]);
    }

    #[test]
    fn test_equal_width_edges() {
        assert_eq!(equal_width_edges(0.0, 7.0, 7), vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
    }

    #[test]
    fn test_large_input_is_sampled() {
        let values: Vec<f64> = (0..5000).map(|v| (v % 97) as f64).collect();
        let bins = classify(&values, ClassificationScheme::NaturalBreaks, 5).unwrap();
        assert_eq!(bins.len(), 5);
        assert_eq!(*bins.last().unwrap(), 96.0);
    }

    proptest! {
        #[test]
        fn bins_are_sorted_and_end_at_max(
            values in prop::collection::vec(-1e6f64..1e6, 1..200),
            k in 1usize..10,
            scheme in prop::sample::select(vec![
                ClassificationScheme::NaturalBreaks,
                ClassificationScheme::EqualInterval,
                ClassificationScheme::Quantiles,
            ]),
        ) {
            let bins = classify(&values, scheme, k).unwrap();
            let max = values.iter().copied().fold(f64::MIN, f64::max);
            prop_assert!(!bins.is_empty());
            prop_assert!(bins.len() <= k.max(1));
            prop_assert!(bins.windows(2).all(|w| w[0] < w[1]));
            prop_assert_eq!(*bins.last().unwrap(), max);
            for v in &values {
                prop_assert!(bin_of(*v, &bins) < bins.len());
            }
        }
    }
}
