//! Multi-band raster grids and spectral index results

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{GeomapError, Result};

/// A single band: row-major samples widened to f64
#[derive(Debug, Clone, PartialEq)]
pub struct Band {
    pub width: usize,
    pub height: usize,
    pub data: Vec<f64>,
}

impl Band {
    pub fn new(width: usize, height: usize, data: Vec<f64>) -> Result<Self> {
        if data.len() != width * height {
            return Err(GeomapError::InvalidInput(format!(
                "band has {} samples, expected {}x{}",
                data.len(),
                width,
                height
            )));
        }
        Ok(Self { width, height, data })
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }
}

/// Multi-band pixel grid. Bands are addressed 1-based.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    pub name: String,
    pub bands: Vec<Band>,
}

impl Raster {
    pub fn new(name: impl Into<String>, bands: Vec<Band>) -> Self {
        Self { name: name.into(), bands }
    }

    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    /// Band by 1-based index
    pub fn band(&self, index: u16) -> Result<&Band> {
        let idx = index as usize;
        if idx == 0 || idx > self.bands.len() {
            return Err(GeomapError::BandOutOfRange { band: index, band_count: self.bands.len() });
        }
        Ok(&self.bands[idx - 1])
    }
}

/// Supported normalized-difference indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IndexType {
    /// Vegetation: (NIR - Red) / (NIR + Red)
    Ndvi,
    /// Water: (Green - NIR) / (Green + NIR)
    Ndwi,
    /// Soil: (NIR - SWIR) / (NIR + SWIR)
    Sawi,
}

impl IndexType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexType::Ndvi => "NDVI",
            IndexType::Ndwi => "NDWI",
            IndexType::Sawi => "SAWI",
        }
    }

    /// Names of the two bands, in the order they enter the formula
    pub fn band_roles(&self) -> (&'static str, &'static str) {
        match self {
            IndexType::Ndvi => ("NIR", "Red"),
            IndexType::Ndwi => ("Green", "NIR"),
            IndexType::Sawi => ("NIR", "SWIR"),
        }
    }
}

impl FromStr for IndexType {
    type Err = GeomapError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NDVI" => Ok(IndexType::Ndvi),
            "NDWI" => Ok(IndexType::Ndwi),
            "SAWI" => Ok(IndexType::Sawi),
            _ => Err(GeomapError::UnsupportedIndex { name: s.to_string() }),
        }
    }
}

impl fmt::Display for IndexType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-pixel index values, same shape as the input bands. Not clamped.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexRaster {
    pub index: IndexType,
    pub width: usize,
    pub height: usize,
    pub values: Vec<f64>,
}

impl IndexRaster {
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.height || col >= self.width {
            return None;
        }
        self.values.get(row * self.width + col).copied()
    }

    /// Smallest and largest finite values
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.values.iter().copied().filter(|v| v.is_finite()).fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_lookup_is_one_based() {
        let raster = Raster::new(
            "r",
            vec![Band::new(1, 1, vec![1.0]).unwrap(), Band::new(1, 1, vec![2.0]).unwrap()],
        );
        assert_eq!(raster.band(1).unwrap().data, vec![1.0]);
        assert_eq!(raster.band(2).unwrap().data, vec![2.0]);
        assert!(matches!(raster.band(0), Err(GeomapError::BandOutOfRange { band: 0, band_count: 2 })));
        assert!(matches!(raster.band(3), Err(GeomapError::BandOutOfRange { band: 3, .. })));
    }

    #[test]
    fn test_band_size_checked() {
        assert!(Band::new(2, 2, vec![0.0; 3]).is_err());
    }

    #[test]
    fn test_index_type_parsing() {
        assert_eq!("ndvi".parse::<IndexType>().unwrap(), IndexType::Ndvi);
        assert_eq!("NDWI".parse::<IndexType>().unwrap(), IndexType::Ndwi);
        let err = "EVI".parse::<IndexType>().unwrap_err();
        assert!(matches!(err, GeomapError::UnsupportedIndex { ref name } if name == "EVI"));
    }
}
