//! Geometry helpers over the `geo` crate.
//!
//! Adds centroid and emptiness checks used by the renderers, and conversion to
//! GeoJSON for the interactive map layers.

use geo::algorithm::centroid::Centroid;
use geo::{CoordsIter, Geometry};

/// Extension trait for `geo::Geometry` with the operations renderers need
pub trait GeometryExt {
    /// Get the centroid as `[x, y]`
    fn centroid_coords(&self) -> Option<[f64; 2]>;

    /// True when the geometry has no coordinates
    fn is_empty_geometry(&self) -> bool;

    /// Convert to a GeoJSON geometry
    fn to_geojson(&self) -> geojson::Geometry;
}

impl GeometryExt for Geometry<f64> {
    fn centroid_coords(&self) -> Option<[f64; 2]> {
        if self.is_empty_geometry() {
            return None;
        }
        self.centroid()
            .map(|p| [p.x(), p.y()])
            .filter(|[x, y]| x.is_finite() && y.is_finite())
    }

    fn is_empty_geometry(&self) -> bool {
        self.coords_count() == 0
    }

    fn to_geojson(&self) -> geojson::Geometry {
        geojson::Geometry::new(geojson::Value::from(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{point, polygon, LineString, MultiPoint};

    #[test]
    fn test_polygon_centroid() {
        let geom = Geometry::Polygon(polygon![
            (x: 0.0, y: 0.0),
            (x: 2.0, y: 0.0),
            (x: 2.0, y: 2.0),
            (x: 0.0, y: 2.0),
            (x: 0.0, y: 0.0),
        ]);
        let centroid = geom.centroid_coords().unwrap();
        assert!((centroid[0] - 1.0).abs() < 1e-10);
        assert!((centroid[1] - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_empty_geometry_has_no_centroid() {
        let empty = Geometry::MultiPoint(MultiPoint::<f64>::new(vec![]));
        assert!(empty.is_empty_geometry());
        assert_eq!(empty.centroid_coords(), None);

        let empty_line = Geometry::LineString(LineString::<f64>::new(vec![]));
        assert_eq!(empty_line.centroid_coords(), None);
    }

    #[test]
    fn test_to_geojson() {
        let geom = Geometry::Point(point!(x: 106.8, y: -6.2));
        let json = serde_json::to_value(geom.to_geojson()).unwrap();
        assert_eq!(json["type"], "Point");
        assert_eq!(json["coordinates"][0], 106.8);
    }
}
