//! CRS transformation and normalization
//!
//! WGS84 <-> Web Mercator is computed analytically. Other pairs go through PROJ when the
//! `proj` feature is enabled.

use geo::{Coord, Geometry, MapCoords};
use geomap_core::error::{GeomapError, RenderMode, Result};
use geomap_core::models::Dataset;

use crate::models::GeometryExt;

pub const WGS84: u32 = 4326;
pub const WEB_MERCATOR: u32 = 3857;

/// Sphere radius used by EPSG:3857
const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Web Mercator is undefined at the poles
const MAX_MERCATOR_LAT: f64 = 85.051_128_78;

/// Project a lon/lat coordinate to Web Mercator metres
pub fn to_web_mercator(c: Coord<f64>) -> Coord<f64> {
    let lat = c.y.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
    Coord {
        x: EARTH_RADIUS_M * c.x.to_radians(),
        y: EARTH_RADIUS_M * (std::f64::consts::FRAC_PI_4 + lat / 2.0).tan().ln(),
    }
}

/// Unproject Web Mercator metres to lon/lat
pub fn from_web_mercator(c: Coord<f64>) -> Coord<f64> {
    Coord {
        x: (c.x / EARTH_RADIUS_M).to_degrees(),
        y: (2.0 * (c.y / EARTH_RADIUS_M).exp().atan() - std::f64::consts::FRAC_PI_2).to_degrees(),
    }
}

/// Reproject a geometry from one EPSG code to another
pub fn reproject_geometry(geometry: &Geometry<f64>, from: u32, to: u32) -> Result<Geometry<f64>> {
    match (from, to) {
        (a, b) if a == b => Ok(geometry.clone()),
        (WGS84, WEB_MERCATOR) => Ok(geometry.map_coords(to_web_mercator)),
        (WEB_MERCATOR, WGS84) => Ok(geometry.map_coords(from_web_mercator)),
        _ => reproject_with_proj(geometry, from, to),
    }
}

#[cfg(feature = "proj")]
fn reproject_with_proj(geometry: &Geometry<f64>, from: u32, to: u32) -> Result<Geometry<f64>> {
    use proj::Proj;

    let from_crs = format!("EPSG:{}", from);
    let to_crs = format!("EPSG:{}", to);
    let proj = Proj::new_known_crs(&from_crs, &to_crs, None).map_err(|e| GeomapError::ConfigInvalid {
        key: "crs".to_string(),
        reason: format!("Failed to create projection from {} to {}: {}", from_crs, to_crs, e),
    })?;

    geometry.try_map_coords(|c| {
        proj.convert((c.x, c.y)).map(|(x, y)| Coord { x, y }).map_err(|e| {
            GeomapError::ConfigInvalid { key: "crs".to_string(), reason: format!("Projection failed: {}", e) }
        })
    })
}

#[cfg(not(feature = "proj"))]
fn reproject_with_proj(_geometry: &Geometry<f64>, from: u32, to: u32) -> Result<Geometry<f64>> {
    Err(GeomapError::ConfigInvalid {
        key: "crs".to_string(),
        reason: format!(
            "Cannot reproject EPSG:{} to EPSG:{} without the `proj` feature",
            from, to
        ),
    })
}

/// Reproject every geometry of a dataset to WGS84 in place.
///
/// A CRS that cannot be handled leaves the coordinates and `crs` untouched and logs a
/// warning; the static renderer draws such data as-is, the web maps reject it.
pub fn normalize_to_wgs84(dataset: &mut Dataset) -> Result<()> {
    if dataset.crs == WGS84 {
        return Ok(());
    }

    let from = dataset.crs;
    let mut reprojected = Vec::with_capacity(dataset.rows.len());
    for row in &dataset.rows {
        let geometry = match &row.geometry {
            Some(g) => match reproject_geometry(g, from, WGS84) {
                Ok(g) => Some(g),
                Err(e) => {
                    tracing::warn!(
                        dataset = %dataset.name,
                        crs = from,
                        "Keeping source coordinates: {}",
                        e
                    );
                    return Ok(());
                }
            },
            None => None,
        };
        reprojected.push(geometry);
    }

    for (row, geometry) in dataset.rows.iter_mut().zip(reprojected) {
        row.geometry = geometry;
    }
    dataset.crs = WGS84;
    tracing::debug!(dataset = %dataset.name, from, "Normalized dataset to EPSG:4326");
    Ok(())
}

/// Fail with a render error unless the dataset is in EPSG:4326.
///
/// Web maps take longitude/latitude; projected coordinates left behind by
/// [`normalize_to_wgs84`] would place features off the globe.
pub fn require_wgs84(dataset: &Dataset, mode: RenderMode) -> Result<()> {
    if dataset.crs == WGS84 {
        return Ok(());
    }
    Err(GeomapError::render(
        mode,
        format!(
            "dataset '{}' is in EPSG:{} and could not be reprojected to EPSG:4326; \
             build with the `proj` feature or convert the file to WGS84",
            dataset.name, dataset.crs
        ),
    ))
}

/// Map center as `(lat, lon)`: the mean of per-row centroids taken in Web Mercator,
/// projected back to WGS84. The dataset must be in EPSG:4326.
pub fn mercator_mean_center(dataset: &Dataset) -> Option<(f64, f64)> {
    let centroids: Vec<[f64; 2]> = dataset
        .rows
        .iter()
        .filter_map(|r| r.geometry.as_ref())
        .filter_map(|g| g.map_coords(to_web_mercator).centroid_coords())
        .collect();

    if centroids.is_empty() {
        return None;
    }

    let n = centroids.len() as f64;
    let x = centroids.iter().map(|c| c[0]).sum::<f64>() / n;
    let y = centroids.iter().map(|c| c[1]).sum::<f64>() / n;
    let center = from_web_mercator(Coord { x, y });
    Some((center.y, center.x))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{point, Point};
    use geomap_core::models::Value;
    use proptest::prelude::*;

    #[test]
    fn test_known_mercator_values() {
        let c = to_web_mercator(Coord { x: 180.0, y: 0.0 });
        assert!((c.x - 20_037_508.342789244).abs() < 1e-6);
        assert!(c.y.abs() < 1e-6);

        let back = from_web_mercator(Coord { x: 0.0, y: 20_037_508.342789244 });
        assert!((back.y - MAX_MERCATOR_LAT).abs() < 1e-6);
    }

    #[test]
    fn test_same_crs_is_identity() {
        let g = Geometry::Point(point!(x: 500000.0, y: 9000000.0));
        assert_eq!(reproject_geometry(&g, 32748, 32748).unwrap(), g);
    }

    #[test]
    fn test_normalize_mercator_dataset() {
        let merc = to_web_mercator(Coord { x: 106.8, y: -6.2 });
        let mut ds = Dataset::from_records(
            "m",
            WEB_MERCATOR,
            vec![(Some(Geometry::Point(Point::from(merc))), vec![("v".to_string(), Value::Number(1.0))])],
        );

        normalize_to_wgs84(&mut ds).unwrap();
        assert_eq!(ds.crs, WGS84);
        match &ds.rows[0].geometry {
            Some(Geometry::Point(p)) => {
                assert!((p.x() - 106.8).abs() < 1e-9);
                assert!((p.y() + 6.2).abs() < 1e-9);
            }
            other => panic!("unexpected geometry {:?}", other),
        }
    }

    #[test]
    fn test_require_wgs84() {
        let mut ds = Dataset::from_records("utm", 32749, vec![]);
        let err = require_wgs84(&ds, RenderMode::Heatmap).unwrap_err();
        assert!(matches!(err, GeomapError::Render { mode: RenderMode::Heatmap, .. }));
        assert!(err.to_string().contains("EPSG:32749"));

        ds.crs = WGS84;
        assert!(require_wgs84(&ds, RenderMode::Interactive).is_ok());
    }

    #[test]
    fn test_mercator_mean_center() {
        let ds = Dataset::from_records(
            "pts",
            WGS84,
            vec![
                (Some(Geometry::Point(point!(x: -10.0, y: 0.0))), vec![]),
                (Some(Geometry::Point(point!(x: 10.0, y: 0.0))), vec![]),
                (None, vec![]),
            ],
        );
        let (lat, lon) = mercator_mean_center(&ds).unwrap();
        assert!(lat.abs() < 1e-9);
        assert!(lon.abs() < 1e-9);

        let empty = Dataset::from_records("e", WGS84, vec![]);
        assert_eq!(mercator_mean_center(&empty), None);
    }

    proptest! {
        #[test]
        fn mercator_roundtrip(lon in -180.0f64..180.0, lat in -85.0f64..85.0) {
            let back = from_web_mercator(to_web_mercator(Coord { x: lon, y: lat }));
            prop_assert!((back.x - lon).abs() < 1e-7);
            prop_assert!((back.y - lat).abs() < 1e-7);
        }
    }
}
