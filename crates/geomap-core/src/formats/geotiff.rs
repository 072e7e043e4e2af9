//! GeoTIFF raster reader
//!
//! Reads every sample into f64 bands. Interleaved (chunky) multi-sample images yield one
//! band per sample; single-sample multi-page files yield one band per page.

use async_trait::async_trait;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};

use crate::error::{GeomapError, Result};
use crate::formats::validation::FormatValidator;
use crate::formats::{dataset_name, FormatData, FormatReader, FormatValidation};
use crate::models::{Band, Raster};

const FORMAT: &str = "GeoTIFF";

/// GeoTIFF raster reader
pub struct GeoTiffReader;

#[async_trait]
impl FormatReader for GeoTiffReader {
    async fn read(&self, path: &Path) -> Result<FormatData> {
        let file = File::open(path)?;
        let mut decoder = Decoder::new(BufReader::new(file))
            .map_err(|e| GeomapError::format(FORMAT, format!("Failed to open TIFF: {}", e)))?;

        let mut bands = read_page(&mut decoder)?;
        let (width, height) = bands
            .first()
            .map(|b| (b.width, b.height))
            .ok_or_else(|| GeomapError::format(FORMAT, "Image has no bands"))?;

        // Further single-sample pages of the same size are further bands
        let single_sample = bands.len() == 1;
        while single_sample && decoder.more_images() {
            decoder
                .next_image()
                .map_err(|e| GeomapError::format(FORMAT, format!("Failed to read next page: {}", e)))?;
            let page = read_page(&mut decoder)?;
            if page.first().map_or(true, |b| b.width != width || b.height != height) {
                tracing::debug!("Skipping TIFF page with different dimensions (overview)");
                continue;
            }
            bands.extend(page);
        }

        tracing::debug!(bands = bands.len(), width, height, "Read raster");
        Ok(FormatData::Raster(Raster::new(dataset_name(path), bands)))
    }

    fn supported_extensions(&self) -> &[&str] {
        &["tif", "tiff"]
    }

    fn format_name(&self) -> &str {
        FORMAT
    }

    async fn validate(&self, path: &Path) -> Result<FormatValidation> {
        let validation = FormatValidator::validate_file_exists(path);
        if !validation.is_valid() {
            return Ok(validation);
        }
        let header = FormatValidator::validate_tiff_header(path);
        Ok(FormatValidator::merge_validations(vec![validation, header]))
    }
}

/// Decode the current page into one band per sample
fn read_page(decoder: &mut Decoder<BufReader<File>>) -> Result<Vec<Band>> {
    let (width, height) = decoder
        .dimensions()
        .map_err(|e| GeomapError::format(FORMAT, format!("Failed to get image dimensions: {}", e)))?;
    let (width, height) = (width as usize, height as usize);

    let samples = decoder
        .read_image()
        .map_err(|e| GeomapError::format(FORMAT, format!("Failed to decode image data: {}", e)))?;
    let samples = to_f64(samples)?;

    split_interleaved(width, height, samples)
}

pub(crate) fn split_interleaved(width: usize, height: usize, samples: Vec<f64>) -> Result<Vec<Band>> {
    let pixels = width * height;
    if pixels == 0 {
        return Err(GeomapError::format(FORMAT, "Image has no pixels"));
    }
    if samples.len() % pixels != 0 {
        return Err(GeomapError::format(
            FORMAT,
            format!("{} samples do not divide into {}x{} pixels", samples.len(), width, height),
        ));
    }

    let band_count = samples.len() / pixels;
    if band_count == 0 {
        return Err(GeomapError::format(FORMAT, format!("No samples decoded for {}x{} image", width, height)));
    }
    let mut bands: Vec<Vec<f64>> = vec![Vec::with_capacity(pixels); band_count];
    for pixel in samples.chunks_exact(band_count) {
        for (band, value) in bands.iter_mut().zip(pixel) {
            band.push(*value);
        }
    }

    bands.into_iter().map(|data| Band::new(width, height, data)).collect()
}

fn to_f64(data: DecodingResult) -> Result<Vec<f64>> {
    let values = match data {
        DecodingResult::U8(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U16(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U64(v) => v.into_iter().map(|x| x as f64).collect(),
        DecodingResult::I8(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I16(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I64(v) => v.into_iter().map(|x| x as f64).collect(),
        DecodingResult::F32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::F64(v) => v,
        #[allow(unreachable_patterns)]
        _ => return Err(GeomapError::format(FORMAT, "Unsupported sample format")),
    };
    Ok(values)
}
