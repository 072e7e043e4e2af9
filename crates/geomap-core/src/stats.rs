//! Per-column descriptive statistics

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{ColumnKind, Dataset};

/// Summary numbers for a numeric column, missing values excluded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator); NaN for fewer than two values
    pub std: f64,
    pub min: f64,
    #[serde(rename = "25%")]
    pub p25: f64,
    #[serde(rename = "50%")]
    pub p50: f64,
    #[serde(rename = "75%")]
    pub p75: f64,
    pub max: f64,
}

/// Statistics for one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnStatistics {
    Summary(Summary),
    NotAvailable(String),
}

/// Describe a column of the dataset
pub fn describe(dataset: &Dataset, column: &str) -> Result<ColumnStatistics> {
    let idx = dataset.require_column(column)?;
    if dataset.columns[idx].kind != ColumnKind::Numeric {
        return Ok(ColumnStatistics::NotAvailable(format!(
            "Statistics not available for non-numeric column: {}",
            column
        )));
    }

    let mut values: Vec<f64> = dataset.values(idx).filter_map(|v| v.as_f64()).collect();
    Ok(match summarize(&mut values) {
        Some(summary) => ColumnStatistics::Summary(summary),
        None => ColumnStatistics::NotAvailable(format!("Column {} has no values", column)),
    })
}

/// Summary of a set of values. Sorts `values` in place.
pub fn summarize(values: &mut [f64]) -> Option<Summary> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);

    let n = values.len();
    let mean = values.iter().sum::<f64>() / n as f64;
    let std = if n > 1 {
        (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64).sqrt()
    } else {
        f64::NAN
    };

    Some(Summary {
        count: n,
        mean,
        std,
        min: values[0],
        p25: percentile(values, 25.0),
        p50: percentile(values, 50.0),
        p75: percentile(values, 75.0),
        max: values[n - 1],
    })
}

/// Linearly interpolated percentile of sorted values
pub fn percentile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let rank = q / 100.0 * (n - 1) as f64;
            let lo = rank.floor() as usize;
            let hi = rank.ceil() as usize;
            let frac = rank - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * frac
        }
    }
}
