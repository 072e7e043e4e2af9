//! Spectral index rasters rendered as colormapped PNG images

use plotters::coord::Shift;
use plotters::prelude::*;

use geomap_core::error::{GeomapError, RenderMode, Result};
use geomap_core::models::IndexRaster;

use crate::canvas::{centered, draw_colorbar, render_png, text_style, DrawResult};
use crate::encode::PngImage;
use crate::fonts;
use crate::palette::Colormap;

const FIGURE: (u32, u32) = (1000, 800);
const TITLE_BAND_PX: u32 = 60;
const COLORBAR_BAND_PX: u32 = 110;

/// Index values are mapped over this fixed range
const VALUE_RANGE: (f64, f64) = (-1.0, 1.0);

/// Position of `value` on the colormap; `None` for values that are not drawn
fn normalize(value: f64) -> Option<f64> {
    if !value.is_finite() {
        return None;
    }
    let (lo, hi) = VALUE_RANGE;
    Some(((value - lo) / (hi - lo)).clamp(0.0, 1.0))
}

/// Largest size with the raster's aspect ratio that fits inside `area`
fn fit(width: usize, height: usize, area: (u32, u32)) -> (u32, u32) {
    let scale = (area.0 as f64 / width as f64).min(area.1 as f64 / height as f64);
    let w = ((width as f64 * scale).floor() as u32).max(1);
    let h = ((height as f64 * scale).floor() as u32).max(1);
    (w, h)
}

/// Render an index raster with its colormap, a colorbar and a title
pub fn render_index(raster: &IndexRaster) -> Result<PngImage> {
    if raster.width == 0 || raster.height == 0 || raster.values.len() != raster.width * raster.height {
        return Err(GeomapError::render(RenderMode::Raster, "index raster has no pixels to draw"));
    }

    let colormap = Colormap::for_index(raster.index);
    let png = render_png(FIGURE, RenderMode::Raster, |root| draw(root, raster, colormap))?;

    tracing::info!(
        index = raster.index.as_str(),
        colormap = colormap.name(),
        width = raster.width,
        height = raster.height,
        "Rendered index raster"
    );
    Ok(png)
}

fn draw<DB>(root: &DrawingArea<DB, Shift>, raster: &IndexRaster, colormap: Colormap) -> DrawResult<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let (_, total_h) = root.dim_in_pixel();
    let (title_area, rest) = root.split_vertically(TITLE_BAND_PX);
    let (image_area, bar_area) = rest.split_vertically(total_h - TITLE_BAND_PX - COLORBAR_BAND_PX);

    if fonts::available() {
        let (w, h) = title_area.dim_in_pixel();
        let title = format!("{} Visualization", raster.index.as_str());
        title_area.draw(&Text::new(title, (w as i32 / 2, h as i32 / 2), centered(text_style(24.0))))?;
    }

    let available = image_area.dim_in_pixel();
    let (dst_w, dst_h) = fit(raster.width, raster.height, available);
    let x_off = (available.0 - dst_w) as i32 / 2;
    let y_off = (available.1 - dst_h) as i32 / 2;

    for dy in 0..dst_h {
        let row = (dy as usize * raster.height) / dst_h as usize;
        for dx in 0..dst_w {
            let col = (dx as usize * raster.width) / dst_w as usize;
            let Some(t) = raster.get(row, col).and_then(normalize) else { continue };
            let color: RGBColor = colormap.sample(t).into();
            image_area.draw_pixel((x_off + dx as i32, y_off + dy as i32), &color)?;
        }
    }

    draw_colorbar(&bar_area, |t| colormap.sample(t), VALUE_RANGE, raster.index.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geomap_core::models::IndexType;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(-1.0), Some(0.0));
        assert_eq!(normalize(0.0), Some(0.5));
        assert_eq!(normalize(3.0), Some(1.0));
        assert_eq!(normalize(f64::NAN), None);
        assert_eq!(normalize(f64::INFINITY), None);
    }

    #[test]
    fn test_fit_keeps_aspect() {
        assert_eq!(fit(100, 50, (1000, 630)), (1000, 500));
        assert_eq!(fit(10, 20, (1000, 630)), (315, 630));
    }

    #[test]
    fn test_render_index() {
        let raster = IndexRaster {
            index: IndexType::Ndvi,
            width: 3,
            height: 2,
            values: vec![-1.0, 0.0, 1.0, 0.5, f64::NAN, 2.0],
        };
        let png = render_index(&raster).unwrap();
        assert_eq!((png.width, png.height), FIGURE);
        assert!(png.data_uri().starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_empty_raster_is_an_error() {
        let raster = IndexRaster { index: IndexType::Sawi, width: 0, height: 0, values: vec![] };
        let err = render_index(&raster).unwrap_err();
        assert!(matches!(err, GeomapError::Render { mode: RenderMode::Raster, .. }));
    }
}
