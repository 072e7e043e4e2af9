//! Normalized-difference spectral indices (NDVI, NDWI, SAWI)

use geomap_core::error::{GeomapError, Result};
use geomap_core::models::{IndexRaster, IndexType, Raster};

/// Added to the denominator so that A + B = 0 does not divide by zero
pub const EPSILON: f64 = 1e-10;

/// Compute `(A - B) / (A + B + EPSILON)` per pixel.
///
/// `bands` are 1-based band numbers in formula order: (NIR, Red) for NDVI, (Green, NIR)
/// for NDWI, (NIR, SWIR) for SAWI. Band semantics are the caller's responsibility.
/// Results are not clamped.
pub fn compute_index(raster: &Raster, index: IndexType, bands: (u16, u16)) -> Result<IndexRaster> {
    let max_band = bands.0.max(bands.1);
    if max_band as usize > raster.band_count() {
        return Err(GeomapError::BandOutOfRange { band: max_band, band_count: raster.band_count() });
    }

    let a = raster.band(bands.0)?;
    let b = raster.band(bands.1)?;
    if a.shape() != b.shape() {
        return Err(GeomapError::BandShapeMismatch {
            first: bands.0,
            first_shape: a.shape(),
            second: bands.1,
            second_shape: b.shape(),
        });
    }

    let values = a
        .data
        .iter()
        .zip(&b.data)
        .map(|(&a, &b)| (a - b) / (a + b + EPSILON))
        .collect();

    let (first, second) = index.band_roles();
    tracing::debug!(
        index = %index,
        bands = ?bands,
        "Computed {} from band {} ({}) and band {} ({})",
        index,
        bands.0,
        first,
        bands.1,
        second
    );

    Ok(IndexRaster { index, width: a.width, height: a.height, values })
}

/// Like [`compute_index`], with the index given by name
pub fn compute_index_by_name(raster: &Raster, index: &str, bands: (u16, u16)) -> Result<IndexRaster> {
    compute_index(raster, index.parse()?, bands)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geomap_core::models::Band;
    use proptest::prelude::*;

    fn raster(bands: Vec<Vec<f64>>, width: usize) -> Raster {
        Raster::new(
            "scene",
            bands.into_iter().map(|data| Band::new(width, data.len() / width, data).unwrap()).collect(),
        )
    }

    #[test]
    fn test_identical_bands_give_zero() {
        let r = raster(vec![vec![0.3, 0.5, 0.0, 12.0], vec![0.3, 0.5, 0.0, 12.0]], 2);
        let out = compute_index(&r, IndexType::Ndvi, (1, 2)).unwrap();
        assert_eq!((out.width, out.height), (2, 2));
        assert!(out.values.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_zero_second_band_approaches_one() {
        let r = raster(vec![vec![0.8, 200.0, 1e-3], vec![0.0, 0.0, 0.0]], 3);
        let out = compute_index(&r, IndexType::Sawi, (1, 2)).unwrap();
        for v in &out.values {
            assert!(*v < 1.0);
            assert!(*v > 0.999_999);
        }
    }

    #[test]
    fn test_band_order_follows_caller() {
        let r = raster(vec![vec![0.2], vec![0.6]], 1);
        let ndwi = compute_index(&r, IndexType::Ndwi, (1, 2)).unwrap();
        assert!((ndwi.values[0] - (-0.5)).abs() < 1e-9);
        let swapped = compute_index(&r, IndexType::Ndwi, (2, 1)).unwrap();
        assert!((swapped.values[0] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_band_out_of_range() {
        let r = raster(vec![vec![1.0], vec![2.0]], 1);
        let err = compute_index(&r, IndexType::Ndvi, (4, 3)).unwrap_err();
        assert!(matches!(err, GeomapError::BandOutOfRange { band: 4, band_count: 2 }));
        assert!(compute_index(&r, IndexType::Ndvi, (0, 1)).is_err());
    }

    #[test]
    fn test_shape_mismatch() {
        let r = Raster::new(
            "mixed",
            vec![
                Band::new(2, 1, vec![1.0, 2.0]).unwrap(),
                Band::new(1, 2, vec![1.0, 2.0]).unwrap(),
            ],
        );
        let err = compute_index(&r, IndexType::Ndvi, (1, 2)).unwrap_err();
        assert!(matches!(err, GeomapError::BandShapeMismatch { first: 1, second: 2, .. }));
    }

    #[test]
    fn test_unsupported_index_name() {
        let r = raster(vec![vec![1.0], vec![2.0]], 1);
        let err = compute_index_by_name(&r, "EVI", (1, 2)).unwrap_err();
        assert!(matches!(err, GeomapError::UnsupportedIndex { .. }));
        assert!(compute_index_by_name(&r, "ndvi", (1, 2)).is_ok());
    }

    proptest! {
        #[test]
        fn non_negative_bands_stay_in_unit_range(
            pairs in prop::collection::vec((0.0f64..1e4, 0.0f64..1e4), 1..64)
        ) {
            let (a, b): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
            let width = a.len();
            let r = raster(vec![a, b], width);
            let out = compute_index(&r, IndexType::Ndvi, (1, 2)).unwrap();
            for v in out.values {
                prop_assert!((-1.0..=1.0).contains(&v));
            }
        }
    }
}
