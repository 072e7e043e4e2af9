//! Shapefile format reader
//!
//! Shapefiles consist of multiple component files (.shp, .shx, .dbf, .prj).
//! The first three must be present; a missing .prj means EPSG:4326.

use async_trait::async_trait;
use geo::{Coord, Geometry, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};
use shapefile::dbase::FieldValue as DbaseFieldValue;
use shapefile::{PolygonRing, Shape};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{GeomapError, Result};
use crate::formats::validation::FormatValidator;
use crate::formats::{dataset_name, FormatData, FormatReader, FormatValidation};
use crate::models::{Dataset, Value};

const FORMAT: &str = "Shapefile";

/// Shapefile format reader
pub struct ShapefileFormatReader;

#[async_trait]
impl FormatReader for ShapefileFormatReader {
    async fn read(&self, path: &Path) -> Result<FormatData> {
        let base = shapefile_base(path)?;
        verify_components(&base)?;

        let crs = read_crs(&base)?;
        let field_order = read_field_order(&base);

        let mut reader = shapefile::Reader::from_path(path)
            .map_err(|e| GeomapError::format(FORMAT, format!("Failed to open Shapefile: {}", e)))?;

        let mut records = Vec::new();
        for result in reader.iter_shapes_and_records() {
            let (shape, record) = result
                .map_err(|e| GeomapError::format(FORMAT, format!("Failed to read feature: {}", e)))?;

            let geometry = convert_shape(shape)?;

            let mut properties: Vec<(String, Value)> = record
                .into_iter()
                .map(|(name, value)| (name, convert_dbase_value(value)))
                .collect();
            // dBase records are unordered maps; restore header order
            properties.sort_by_key(|(name, _)| {
                field_order.iter().position(|f| f == name).unwrap_or(usize::MAX)
            });

            records.push((geometry, properties));
        }

        tracing::debug!(features = records.len(), crs, "Read shapefile records");
        Ok(FormatData::Vector(Dataset::from_records(dataset_name(path), crs, records)))
    }

    fn supported_extensions(&self) -> &[&str] {
        &["shp"]
    }

    fn format_name(&self) -> &str {
        FORMAT
    }

    async fn validate(&self, path: &Path) -> Result<FormatValidation> {
        let validation = FormatValidator::validate_file_exists(path);
        if !validation.is_valid() {
            return Ok(validation);
        }

        let base = match shapefile_base(path) {
            Ok(b) => b,
            Err(e) => {
                let mut validation = validation;
                validation.errors.push(e.to_string());
                return Ok(validation);
            }
        };

        let components = FormatValidator::validate_component_files(&base, &["shp", "shx", "dbf"], &["prj"]);
        Ok(FormatValidator::merge_validations(vec![validation, components]))
    }
}

/// Path without the .shp extension
fn shapefile_base(path: &Path) -> Result<PathBuf> {
    let is_shp = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("shp"))
        .unwrap_or(false);
    if !is_shp {
        return Err(GeomapError::InvalidPath {
            path: path.to_path_buf(),
            reason: "Not a Shapefile (.shp)".to_string(),
        });
    }
    Ok(path.with_extension(""))
}

fn verify_components(base: &Path) -> Result<()> {
    let missing: Vec<String> = ["shp", "shx", "dbf"]
        .iter()
        .filter(|ext| !base.with_extension(ext).exists())
        .map(|ext| format!(".{}", ext))
        .collect();

    if !missing.is_empty() {
        return Err(GeomapError::format(
            FORMAT,
            format!("Missing required component files: {}", missing.join(", ")),
        ));
    }
    Ok(())
}

/// Field names in .dbf header order. Empty on failure; ordering is cosmetic.
fn read_field_order(base: &Path) -> Vec<String> {
    match shapefile::dbase::Reader::from_path(base.with_extension("dbf")) {
        Ok(reader) => reader
            .fields()
            .iter()
            .map(|f| f.name().to_string())
            .filter(|name| name != "DeletionFlag")
            .collect(),
        Err(e) => {
            tracing::debug!("Could not read .dbf header for field order: {}", e);
            Vec::new()
        }
    }
}

/// EPSG code from the .prj sidecar
fn read_crs(base: &Path) -> Result<u32> {
    let prj_path = base.with_extension("prj");
    if !prj_path.exists() {
        return Ok(4326);
    }

    let prj = fs::read_to_string(&prj_path)
        .map_err(|e| GeomapError::format(FORMAT, format!("Failed to read .prj file: {}", e)))?;

    Ok(epsg_from_prj(&prj).unwrap_or_else(|| {
        tracing::warn!(prj = %prj_path.display(), "Unrecognized projection, assuming EPSG:4326");
        4326
    }))
}

/// Recognize an EPSG code in ESRI or OGC WKT
pub(crate) fn epsg_from_prj(wkt: &str) -> Option<u32> {
    // The outermost AUTHORITY is the last one in the string
    if let Some(start) = wkt.rfind("AUTHORITY[\"EPSG\",") {
        let digits: String = wkt[start + 17..]
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(|c| c.is_ascii_digit())
            .collect();
        if let Ok(code) = digits.parse() {
            return Some(code);
        }
    }

    if let Some(start) = wkt.find("EPSG:") {
        let digits: String = wkt[start + 5..].chars().take_while(|c| c.is_ascii_digit()).collect();
        if let Ok(code) = digits.parse() {
            return Some(code);
        }
    }

    // ESRI .prj files usually carry names only
    let upper = wkt.to_ascii_uppercase();
    if upper.contains("WEB_MERCATOR") || upper.contains("PSEUDO-MERCATOR") || upper.contains("PSEUDO_MERCATOR") {
        return Some(3857);
    }
    if !upper.contains("PROJCS") && (upper.contains("GCS_WGS_1984") || upper.contains("\"WGS 84\"")) {
        return Some(4326);
    }

    None
}

fn coords<P>(points: &[P], xy: impl Fn(&P) -> (f64, f64)) -> Vec<Coord<f64>> {
    points
        .iter()
        .map(|p| {
            let (x, y) = xy(p);
            Coord { x, y }
        })
        .collect()
}

fn lines<P>(parts: &[Vec<P>], xy: impl Fn(&P) -> (f64, f64) + Copy) -> Geometry<f64> {
    let mut lines: Vec<LineString<f64>> =
        parts.iter().map(|part| LineString::new(coords(part, xy))).collect();
    if lines.len() == 1 {
        Geometry::LineString(lines.remove(0))
    } else {
        Geometry::MultiLineString(MultiLineString::new(lines))
    }
}

/// Outer rings start a new polygon; inner rings are holes of the last outer ring
fn polygons<P>(rings: &[PolygonRing<P>], xy: impl Fn(&P) -> (f64, f64) + Copy) -> Geometry<f64> {
    let mut polygons: Vec<(LineString<f64>, Vec<LineString<f64>>)> = Vec::new();
    for ring in rings {
        match ring {
            PolygonRing::Outer(points) => polygons.push((LineString::new(coords(points, xy)), Vec::new())),
            PolygonRing::Inner(points) => match polygons.last_mut() {
                Some((_, holes)) => holes.push(LineString::new(coords(points, xy))),
                None => polygons.push((LineString::new(coords(points, xy)), Vec::new())),
            },
        }
    }

    let mut polygons: Vec<Polygon<f64>> =
        polygons.into_iter().map(|(exterior, holes)| Polygon::new(exterior, holes)).collect();
    if polygons.len() == 1 {
        Geometry::Polygon(polygons.remove(0))
    } else {
        Geometry::MultiPolygon(MultiPolygon::new(polygons))
    }
}

fn multipoint<P>(points: &[P], xy: impl Fn(&P) -> (f64, f64)) -> Geometry<f64> {
    Geometry::MultiPoint(MultiPoint::new(coords(points, xy).into_iter().map(Point::from).collect()))
}

/// Convert a shapefile shape into a `geo` geometry. Z and M values are dropped.
fn convert_shape(shape: Shape) -> Result<Option<Geometry<f64>>> {
    let geometry = match shape {
        Shape::NullShape => return Ok(None),
        Shape::Point(p) => Geometry::Point(Point::new(p.x, p.y)),
        Shape::PointM(p) => Geometry::Point(Point::new(p.x, p.y)),
        Shape::PointZ(p) => Geometry::Point(Point::new(p.x, p.y)),
        Shape::Polyline(l) => lines(l.parts(), |p| (p.x, p.y)),
        Shape::PolylineM(l) => lines(l.parts(), |p| (p.x, p.y)),
        Shape::PolylineZ(l) => lines(l.parts(), |p| (p.x, p.y)),
        Shape::Polygon(pg) => polygons(pg.rings(), |p| (p.x, p.y)),
        Shape::PolygonM(pg) => polygons(pg.rings(), |p| (p.x, p.y)),
        Shape::PolygonZ(pg) => polygons(pg.rings(), |p| (p.x, p.y)),
        Shape::Multipoint(mp) => multipoint(mp.points(), |p| (p.x, p.y)),
        Shape::MultipointM(mp) => multipoint(mp.points(), |p| (p.x, p.y)),
        Shape::MultipointZ(mp) => multipoint(mp.points(), |p| (p.x, p.y)),
        Shape::Multipatch(_) => {
            return Err(GeomapError::format(FORMAT, "Multipatch geometry type is not supported"))
        }
    };
    Ok(Some(geometry))
}

fn convert_dbase_value(value: DbaseFieldValue) -> Value {
    match value {
        DbaseFieldValue::Character(Some(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Value::Null
            } else {
                Value::Text(trimmed.to_string())
            }
        }
        DbaseFieldValue::Numeric(Some(n)) => Value::Number(n),
        DbaseFieldValue::Float(Some(f)) => Value::Number(f as f64),
        DbaseFieldValue::Integer(i) => Value::Number(i as f64),
        DbaseFieldValue::Double(d) => Value::Number(d),
        DbaseFieldValue::Currency(c) => Value::Number(c),
        DbaseFieldValue::Logical(Some(b)) => Value::Bool(b),
        DbaseFieldValue::Date(Some(date)) => {
            Value::Text(format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day()))
        }
        DbaseFieldValue::DateTime(dt) => Value::Text(format!(
            "{:04}-{:02}-{:02}",
            dt.date().year(),
            dt.date().month(),
            dt.date().day()
        )),
        DbaseFieldValue::Memo(s) => Value::Text(s),
        DbaseFieldValue::Character(None)
        | DbaseFieldValue::Numeric(None)
        | DbaseFieldValue::Float(None)
        | DbaseFieldValue::Logical(None)
        | DbaseFieldValue::Date(None) => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epsg_from_authority() {
        let wkt = r#"PROJCS["WGS 84 / Pseudo-Mercator",GEOGCS["WGS 84",AUTHORITY["EPSG","4326"]],AUTHORITY["EPSG","3857"]]"#;
        assert_eq!(epsg_from_prj(wkt), Some(3857));
        assert_eq!(epsg_from_prj("EPSG:32748"), Some(32748));
    }

    #[test]
    fn test_epsg_from_esri_names() {
        let geographic = r#"GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]]"#;
        assert_eq!(epsg_from_prj(geographic), Some(4326));

        let mercator = r#"PROJCS["WGS_1984_Web_Mercator_Auxiliary_Sphere",GEOGCS["GCS_WGS_1984"]]"#;
        assert_eq!(epsg_from_prj(mercator), Some(3857));

        assert_eq!(epsg_from_prj(r#"PROJCS["NAD_1983_UTM_Zone_10N"]"#), None);
    }

    #[test]
    fn test_polygon_rings_grouping() {
        let ring = |pts: &[(f64, f64)]| -> Vec<shapefile::Point> {
            pts.iter().map(|&(x, y)| shapefile::Point::new(x, y)).collect()
        };
        let rings = vec![
            PolygonRing::Outer(ring(&[(0.0, 0.0), (0.0, 4.0), (4.0, 4.0), (4.0, 0.0), (0.0, 0.0)])),
            PolygonRing::Inner(ring(&[(1.0, 1.0), (2.0, 1.0), (2.0, 2.0), (1.0, 1.0)])),
            PolygonRing::Outer(ring(&[(10.0, 10.0), (10.0, 11.0), (11.0, 11.0), (10.0, 10.0)])),
        ];
        match polygons(&rings, |p| (p.x, p.y)) {
            Geometry::MultiPolygon(mp) => {
                assert_eq!(mp.0.len(), 2);
                assert_eq!(mp.0[0].interiors().len(), 1);
                assert!(mp.0[1].interiors().is_empty());
            }
            other => panic!("expected multipolygon, got {:?}", other),
        }
    }

    #[test]
    fn test_dbase_conversion() {
        assert_eq!(convert_dbase_value(DbaseFieldValue::Numeric(Some(4.5))), Value::Number(4.5));
        assert_eq!(convert_dbase_value(DbaseFieldValue::Numeric(None)), Value::Null);
        assert_eq!(convert_dbase_value(DbaseFieldValue::Integer(7)), Value::Number(7.0));
        assert_eq!(
            convert_dbase_value(DbaseFieldValue::Character(Some("  Java  ".to_string()))),
            Value::Text("Java".to_string())
        );
        assert_eq!(convert_dbase_value(DbaseFieldValue::Character(Some("   ".to_string()))), Value::Null);
    }

    #[tokio::test]
    async fn test_missing_components() {
        let temp_dir = tempfile::tempdir().unwrap();
        let shp = temp_dir.path().join("parcels.shp");
        fs::write(&shp, b"").unwrap();

        let validation = ShapefileFormatReader.validate(&shp).await.unwrap();
        assert!(!validation.is_valid());
        assert!(validation.errors.iter().any(|e| e.contains(".dbf")));

        let err = ShapefileFormatReader.read(&shp).await.unwrap_err();
        assert!(err.to_string().contains("Missing required component files"));
    }
}
