//! GeoJSON format reader

use async_trait::async_trait;
use std::fs;
use std::path::Path;

use crate::error::{GeomapError, Result};
use crate::formats::validation::FormatValidator;
use crate::formats::{dataset_name, FormatData, FormatReader, FormatValidation};
use crate::models::{Dataset, Value};

type Record = (Option<geo::Geometry<f64>>, Vec<(String, Value)>);

/// GeoJSON format reader
pub struct GeoJsonReader;

#[async_trait]
impl FormatReader for GeoJsonReader {
    async fn read(&self, path: &Path) -> Result<FormatData> {
        let content = fs::read_to_string(path)?;

        let geojson: geojson::GeoJson = content
            .parse()
            .map_err(|e| GeomapError::format("GeoJSON", format!("Failed to parse GeoJSON: {}", e)))?;

        let (records, crs) = extract_records_and_crs(geojson)?;

        Ok(FormatData::Vector(Dataset::from_records(dataset_name(path), crs, records)))
    }

    fn supported_extensions(&self) -> &[&str] {
        &["json", "geojson"]
    }

    fn format_name(&self) -> &str {
        "GeoJSON"
    }

    async fn validate(&self, path: &Path) -> Result<FormatValidation> {
        let validation = FormatValidator::validate_file_exists(path);
        if !validation.is_valid() {
            return Ok(validation);
        }

        let json_validation = FormatValidator::validate_json_structure(path);
        Ok(FormatValidator::merge_validations(vec![validation, json_validation]))
    }
}

fn extract_records_and_crs(geojson: geojson::GeoJson) -> Result<(Vec<Record>, u32)> {
    match geojson {
        geojson::GeoJson::FeatureCollection(fc) => {
            // Legacy "crs" member, default to WGS84
            let crs = fc
                .foreign_members
                .as_ref()
                .and_then(|fm| fm.get("crs"))
                .and_then(extract_epsg_from_crs)
                .unwrap_or(4326);

            let records = fc.features.into_iter().map(convert_feature).collect::<Result<_>>()?;
            Ok((records, crs))
        }
        geojson::GeoJson::Feature(feature) => Ok((vec![convert_feature(feature)?], 4326)),
        geojson::GeoJson::Geometry(geom) => Ok((vec![(Some(convert_geometry(geom)?), Vec::new())], 4326)),
    }
}

fn convert_feature(feature: geojson::Feature) -> Result<Record> {
    let geometry = feature.geometry.map(convert_geometry).transpose()?;

    let properties = feature
        .properties
        .map(|props| props.iter().map(|(k, v)| (k.clone(), Value::from_json(v))).collect())
        .unwrap_or_default();

    Ok((geometry, properties))
}

fn convert_geometry(geometry: geojson::Geometry) -> Result<geo::Geometry<f64>> {
    geo::Geometry::<f64>::try_from(geometry)
        .map_err(|e| GeomapError::format("GeoJSON", format!("Unsupported geometry: {}", e)))
}

/// Extract EPSG code from a legacy CRS object ("EPSG:3857" or "urn:ogc:def:crs:EPSG::3857")
fn extract_epsg_from_crs(crs: &serde_json::Value) -> Option<u32> {
    let name = crs.get("properties")?.get("name")?.as_str()?;
    if name.ends_with("CRS84") {
        return Some(4326);
    }
    name.rsplit(':').next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ColumnKind;

    async fn read_str(content: &str) -> Result<Dataset> {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("regions.geojson");
        fs::write(&file_path, content).unwrap();
        GeoJsonReader.read(&file_path).await?.into_vector()
    }

    #[tokio::test]
    async fn test_feature_collection() {
        let ds = read_str(
            r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [10.0, 20.0]},
                 "properties": {"name": "A", "population": 120}},
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [11.0, 21.0]},
                 "properties": {"name": "B", "population": null}}
            ]
        }"#,
        )
        .await
        .unwrap();

        assert_eq!(ds.name, "regions");
        assert_eq!(ds.crs, 4326);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.column_names(), vec!["name", "population"]);
        assert_eq!(ds.column_kind("population"), Some(ColumnKind::Numeric));
        assert_eq!(ds.rows[1].values[1], Value::Null);
        assert!(ds.rows[0].geometry.is_some());
    }

    #[tokio::test]
    async fn test_legacy_crs_member() {
        let ds = read_str(
            r#"{
            "type": "FeatureCollection",
            "crs": {"type": "name", "properties": {"name": "urn:ogc:def:crs:EPSG::3857"}},
            "features": []
        }"#,
        )
        .await
        .unwrap();
        assert_eq!(ds.crs, 3857);
    }

    #[tokio::test]
    async fn test_bare_geometry() {
        let ds = read_str(r#"{"type": "Point", "coordinates": [1.0, 2.0]}"#).await.unwrap();
        assert_eq!(ds.len(), 1);
        assert!(ds.columns.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_json_fails_validation() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("invalid.geojson");
        fs::write(&file_path, "not valid json").unwrap();

        let validation = GeoJsonReader.validate(&file_path).await.unwrap();
        assert!(!validation.is_valid());
    }
}
