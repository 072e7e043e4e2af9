//! In-memory tabular/geometric dataset
//!
//! A `Dataset` is loaded wholesale from a vector file for one request. Rows carry an
//! optional geometry and one value per attribute column, in column order.

use geo::{BoundingRect, Geometry, Rect};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{GeomapError, Result};

/// Placeholder written into missing categorical cells before rendering
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// A single attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Number(n) => n.is_nan(),
            _ => false,
        }
    }

    /// Numeric view of the value, coercing booleans and numeric strings
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) if !n.is_nan() => Some(*n),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Text(s) => s.trim().parse::<f64>().ok().filter(|n| !n.is_nan()),
            _ => None,
        }
    }

    /// Text used for legends, tooltips and category matching
    pub fn label(&self) -> String {
        match self {
            Value::Null => "None".to_string(),
            Value::Bool(b) => if *b { "True" } else { "False" }.to_string(),
            Value::Number(n) => format_number(*n),
            Value::Text(s) => s.clone(),
        }
    }

    /// Convert from a JSON property value
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => n.as_f64().map(Value::Number).unwrap_or(Value::Null),
            serde_json::Value::String(s) => Value::Text(s.clone()),
            other => Value::Text(other.to_string()),
        }
    }

    /// Convert into a JSON value for GeoJSON output
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Text(s) => serde_json::Value::String(s.clone()),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Storage class of a column, inferred from its values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// Every non-missing value is a number
    Numeric,
    /// Text, booleans, mixed values, or a column with no values at all
    Categorical,
}

/// Attribute column metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

/// One feature: optional geometry plus attribute values in column order
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub geometry: Option<Geometry<f64>>,
    pub values: Vec<Value>,
}

/// Table of geometry + attribute rows
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Dataset name (file stem)
    pub name: String,

    /// CRS EPSG code of the coordinates
    pub crs: u32,

    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
}

impl Dataset {
    /// Build a dataset from named records, inferring column kinds.
    ///
    /// Column order is the order in which names first appear across records.
    pub fn from_records(
        name: impl Into<String>,
        crs: u32,
        records: Vec<(Option<Geometry<f64>>, Vec<(String, Value)>)>,
    ) -> Self {
        let mut names: Vec<String> = Vec::new();
        let mut seen = HashSet::new();
        for (_, props) in &records {
            for (key, _) in props {
                if seen.insert(key.clone()) {
                    names.push(key.clone());
                }
            }
        }

        let rows: Vec<Row> = records
            .into_iter()
            .map(|(geometry, props)| {
                let mut values = vec![Value::Null; names.len()];
                for (key, value) in props {
                    if let Some(idx) = names.iter().position(|n| *n == key) {
                        values[idx] = value;
                    }
                }
                Row { geometry, values }
            })
            .collect();

        let columns = names
            .into_iter()
            .enumerate()
            .map(|(idx, name)| Column { name, kind: infer_kind(rows.iter().map(|r| &r.values[idx])) })
            .collect();

        Self { name: name.into(), crs, columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Attribute column names in order
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Index of a column, or a `ColumnNotFound` error listing the available columns
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name).ok_or_else(|| GeomapError::ColumnNotFound {
            column: name.to_string(),
            available: self.column_names(),
        })
    }

    pub fn column_kind(&self, name: &str) -> Option<ColumnKind> {
        self.column_index(name).map(|idx| self.columns[idx].kind)
    }

    pub fn is_numeric(&self, name: &str) -> bool {
        self.column_kind(name) == Some(ColumnKind::Numeric)
    }

    /// Values of one column, in row order
    pub fn values<'a>(&'a self, idx: usize) -> impl Iterator<Item = &'a Value> + 'a {
        self.rows.iter().map(move |r| &r.values[idx])
    }

    /// Replace missing values of a numeric column with 0. Non-numeric columns are left alone.
    ///
    /// Returns the number of cells filled.
    pub fn fill_missing_numeric(&mut self, name: &str) -> Result<usize> {
        let idx = self.require_column(name)?;
        if self.columns[idx].kind != ColumnKind::Numeric {
            return Ok(0);
        }
        Ok(self.fill_missing(idx, Value::Number(0.0)))
    }

    /// Replace missing values of a categorical column with the given placeholder
    pub fn fill_missing_categorical(&mut self, name: &str, placeholder: &str) -> Result<usize> {
        let idx = self.require_column(name)?;
        if self.columns[idx].kind != ColumnKind::Categorical {
            return Ok(0);
        }
        Ok(self.fill_missing(idx, Value::Text(placeholder.to_string())))
    }

    fn fill_missing(&mut self, idx: usize, with: Value) -> usize {
        let mut filled = 0;
        for row in &mut self.rows {
            if row.values[idx].is_null() {
                row.values[idx] = with.clone();
                filled += 1;
            }
        }
        filled
    }

    /// Coerce a column to numbers: non-numeric entries become 0 and the column becomes numeric
    pub fn coerce_numeric(&mut self, name: &str) -> Result<()> {
        let idx = self.require_column(name)?;
        for row in &mut self.rows {
            let n = row.values[idx].as_f64().unwrap_or(0.0);
            row.values[idx] = Value::Number(n);
        }
        self.columns[idx].kind = ColumnKind::Numeric;
        Ok(())
    }

    /// Distinct values of a column in first-seen order (missing values included once)
    pub fn distinct_values(&self, name: &str) -> Result<Vec<Value>> {
        let idx = self.require_column(name)?;
        let mut keys = HashSet::new();
        let mut seen: Vec<Value> = Vec::new();
        for value in self.values(idx) {
            if keys.insert(ValueKey::of(value)) {
                seen.push(value.clone());
            }
        }
        Ok(seen)
    }

    /// Combined bounding box of all geometries as (min_x, min_y, max_x, max_y)
    pub fn bounds(&self) -> Option<[f64; 4]> {
        let mut acc: Option<Rect<f64>> = None;
        for rect in self.rows.iter().filter_map(|r| r.geometry.as_ref()?.bounding_rect()) {
            acc = Some(match acc {
                None => rect,
                Some(a) => Rect::new(
                    (a.min().x.min(rect.min().x), a.min().y.min(rect.min().y)),
                    (a.max().x.max(rect.max().x), a.max().y.max(rect.max().y)),
                ),
            });
        }
        acc.map(|r| [r.min().x, r.min().y, r.max().x, r.max().y])
    }
}

/// Hashable identity of a value; `0.0` and `-0.0` are the same number
#[derive(PartialEq, Eq, Hash)]
enum ValueKey<'a> {
    Null,
    Bool(bool),
    Number(u64),
    Text(&'a str),
}

impl<'a> ValueKey<'a> {
    fn of(value: &'a Value) -> Self {
        match value {
            Value::Null => ValueKey::Null,
            Value::Number(n) if n.is_nan() => ValueKey::Null,
            Value::Number(n) if *n == 0.0 => ValueKey::Number(0.0f64.to_bits()),
            Value::Number(n) => ValueKey::Number(n.to_bits()),
            Value::Bool(b) => ValueKey::Bool(*b),
            Value::Text(s) => ValueKey::Text(s),
        }
    }
}

fn infer_kind<'a>(values: impl Iterator<Item = &'a Value>) -> ColumnKind {
    let mut any = false;
    for value in values {
        match value {
            v if v.is_null() => {}
            Value::Number(_) => any = true,
            _ => return ColumnKind::Categorical,
        }
    }
    if any {
        ColumnKind::Numeric
    } else {
        ColumnKind::Categorical
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{point, Geometry};

    fn sample() -> Dataset {
        Dataset::from_records(
            "sample",
            4326,
            vec![
                (
                    Some(Geometry::Point(point!(x: 1.0, y: 2.0))),
                    vec![
                        ("name".to_string(), Value::Text("a".to_string())),
                        ("pop".to_string(), Value::Number(10.0)),
                    ],
                ),
                (
                    Some(Geometry::Point(point!(x: 3.0, y: -1.0))),
                    vec![("pop".to_string(), Value::Null), ("zone".to_string(), Value::Null)],
                ),
            ],
        )
    }

    #[test]
    fn test_column_order_and_kinds() {
        let ds = sample();
        assert_eq!(ds.column_names(), vec!["name", "pop", "zone"]);
        assert_eq!(ds.column_kind("name"), Some(ColumnKind::Categorical));
        assert_eq!(ds.column_kind("pop"), Some(ColumnKind::Numeric));
        // An all-missing column is not numeric
        assert_eq!(ds.column_kind("zone"), Some(ColumnKind::Categorical));
    }

    #[test]
    fn test_fill_missing() {
        let mut ds = sample();
        assert_eq!(ds.fill_missing_numeric("pop").unwrap(), 1);
        assert_eq!(ds.rows[1].values[1], Value::Number(0.0));

        assert_eq!(ds.fill_missing_numeric("name").unwrap(), 0);
        assert_eq!(ds.fill_missing_categorical("name", UNKNOWN_CATEGORY).unwrap(), 1);
        assert_eq!(ds.rows[1].values[0], Value::Text("Unknown".to_string()));
    }

    #[test]
    fn test_require_column_lists_available() {
        let ds = sample();
        match ds.require_column("income") {
            Err(GeomapError::ColumnNotFound { column, available }) => {
                assert_eq!(column, "income");
                assert_eq!(available, vec!["name", "pop", "zone"]);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_distinct_values_first_seen() {
        let ds = Dataset::from_records(
            "d",
            4326,
            ["b", "a", "b", "c", "a"]
                .iter()
                .map(|v| (None, vec![("k".to_string(), Value::Text(v.to_string()))]))
                .collect(),
        );
        let labels: Vec<String> = ds.distinct_values("k").unwrap().iter().map(Value::label).collect();
        assert_eq!(labels, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_distinct_values_mixed_kinds() {
        let values = vec![
            Value::Number(1.0),
            Value::Null,
            Value::Text("1".into()),
            Value::Number(-0.0),
            Value::Number(0.0),
            Value::Null,
            Value::Number(1.0),
        ];
        let ds = Dataset::from_records(
            "d",
            4326,
            values.into_iter().map(|v| (None, vec![("k".to_string(), v)])).collect(),
        );
        let distinct = ds.distinct_values("k").unwrap();
        assert_eq!(
            distinct,
            vec![Value::Number(1.0), Value::Null, Value::Text("1".into()), Value::Number(-0.0)]
        );
    }

    #[test]
    fn test_distinct_values_scales_to_many_rows() {
        let ds = Dataset::from_records(
            "d",
            4326,
            (0..100_000).map(|i| (None, vec![("k".to_string(), Value::Number(i as f64))])).collect(),
        );
        assert_eq!(ds.distinct_values("k").unwrap().len(), 100_000);
    }

    #[test]
    fn test_bounds() {
        let ds = sample();
        assert_eq!(ds.bounds(), Some([1.0, -1.0, 3.0, 2.0]));
    }

    #[test]
    fn test_value_coercion() {
        assert_eq!(Value::Text(" 12.5 ".to_string()).as_f64(), Some(12.5));
        assert_eq!(Value::Text("abc".to_string()).as_f64(), None);
        assert_eq!(Value::Null.as_f64(), None);
        assert_eq!(Value::Number(3.0).label(), "3");
    }
}
