//! Stats command: describe dataset columns

use anyhow::Result;
use geomap_core::stats::{describe, ColumnStatistics};
use std::collections::BTreeMap;

use super::load_dataset;
use crate::cli::StatsArgs;
use crate::output::OutputWriter;
use crate::output_types::{StatsOutput, StatsRow};

pub async fn execute(args: StatsArgs, output: &OutputWriter) -> Result<()> {
    let dataset = load_dataset(&args.dataset).await?;
    let columns = if args.column.is_empty() { dataset.column_names() } else { args.column };

    let mut statistics = BTreeMap::new();
    for column in &columns {
        statistics.insert(column.clone(), describe(&dataset, column)?);
    }

    if output.is_json() {
        return output.result(StatsOutput { dataset: dataset.name.clone(), statistics });
    }

    output.section(format!("Statistics for {}", dataset.name));
    output.table(rows(&statistics))
}

/// Table rows; columns without statistics show the reason in the Count cell
pub(super) fn rows(statistics: &BTreeMap<String, ColumnStatistics>) -> Vec<StatsRow> {
    let fmt = |v: f64| if v.is_nan() { "-".to_string() } else { format!("{:.3}", v) };
    statistics
        .iter()
        .map(|(column, stats)| match stats {
            ColumnStatistics::Summary(s) => StatsRow {
                column: column.clone(),
                count: s.count.to_string(),
                mean: fmt(s.mean),
                std: fmt(s.std),
                min: fmt(s.min),
                p25: fmt(s.p25),
                p50: fmt(s.p50),
                p75: fmt(s.p75),
                max: fmt(s.max),
            },
            ColumnStatistics::NotAvailable(reason) => StatsRow {
                column: column.clone(),
                count: reason.clone(),
                mean: String::new(),
                std: String::new(),
                min: String::new(),
                p25: String::new(),
                p50: String::new(),
                p75: String::new(),
                max: String::new(),
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geomap_core::stats::Summary;

    #[test]
    fn test_rows() {
        let mut statistics = BTreeMap::new();
        statistics.insert(
            "population".to_string(),
            ColumnStatistics::Summary(Summary {
                count: 1,
                mean: 2.0,
                std: f64::NAN,
                min: 2.0,
                p25: 2.0,
                p50: 2.0,
                p75: 2.0,
                max: 2.0,
            }),
        );
        statistics.insert("name".to_string(), ColumnStatistics::NotAvailable("not numeric".into()));

        let rows = rows(&statistics);
        assert_eq!(rows[0].column, "name");
        assert_eq!(rows[0].count, "not numeric");
        assert_eq!(rows[1].mean, "2.000");
        assert_eq!(rows[1].std, "-");
    }
}
