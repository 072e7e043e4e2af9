//! Bitmap drawing helpers shared by the static map and raster renderers

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontDesc, FontFamily, FontStyle};
use std::ops::Range;

use geomap_core::error::{GeomapError, RenderMode, Result};
use geomap_core::models::LegendLocation;

use crate::encode::PngImage;
use crate::fonts;
use crate::palette::Rgb;

pub(crate) type DrawResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Draw onto an in-memory RGB bitmap and encode it as PNG
pub(crate) fn render_png<F>(size: (u32, u32), mode: RenderMode, draw: F) -> Result<PngImage>
where
    F: FnOnce(&DrawingArea<BitMapBackend<'_>, Shift>) -> DrawResult<()>,
{
    let (width, height) = size;
    let mut buffer = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, size).into_drawing_area();
        root.fill(&WHITE).map_err(|e| GeomapError::render(mode, e.to_string()))?;
        draw(&root).map_err(|e| GeomapError::render(mode, e.to_string()))?;
        root.present().map_err(|e| GeomapError::render(mode, e.to_string()))?;
    }
    PngImage::from_rgb(&buffer, width, height, mode)
}

pub(crate) fn text_style(px: f64) -> TextStyle<'static> {
    FontDesc::new(FontFamily::SansSerif, px, FontStyle::Normal).color(&BLACK)
}

pub(crate) fn centered(style: TextStyle<'static>) -> TextStyle<'static> {
    style.pos(Pos::new(HPos::Center, VPos::Center))
}

/// Width of `text` in pixels, estimated from the character count when no font is loaded
pub(crate) fn text_width<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, text: &str, px: f64) -> u32 {
    if fonts::available() {
        if let Ok((w, _)) = area.estimate_text_size(text, &text_style(px)) {
            return w;
        }
    }
    (text.chars().count() as f64 * px * 0.6).ceil() as u32
}

/// Swatch legend anchored in a corner of the plot area
pub(crate) struct Legend<'a> {
    pub title: &'a str,
    pub entries: &'a [(String, Rgb)],
    pub location: LegendLocation,
    pub font_px: f64,
}

impl Legend<'_> {
    pub(crate) fn draw<DB>(&self, root: &DrawingArea<DB, Shift>, plot: (Range<i32>, Range<i32>)) -> DrawResult<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        if self.entries.is_empty() {
            return Ok(());
        }

        let with_text = fonts::available();
        let px = self.font_px;
        let row_h = (px * 1.6).round() as i32;
        let swatch = (px * 0.9).round() as i32;
        let pad = (px * 0.6).round() as i32;

        let label_w = self
            .entries
            .iter()
            .map(|(label, _)| text_width(root, label, px))
            .max()
            .unwrap_or(0) as i32;
        let title_w = text_width(root, self.title, px * 1.1) as i32;
        let box_w = (swatch + pad + label_w).max(title_w) + 2 * pad;
        let title_h = if with_text { row_h } else { 0 };
        let box_h = title_h + self.entries.len() as i32 * row_h + 2 * pad;

        let (xs, ys) = plot;
        let inset = 10;
        let x0 = match self.location {
            LegendLocation::UpperLeft | LegendLocation::LowerLeft => xs.start + inset,
            LegendLocation::UpperRight | LegendLocation::LowerRight => xs.end - inset - box_w,
        };
        let y0 = match self.location {
            LegendLocation::UpperLeft | LegendLocation::UpperRight => ys.start + inset,
            LegendLocation::LowerLeft | LegendLocation::LowerRight => ys.end - inset - box_h,
        };

        root.draw(&Rectangle::new([(x0, y0), (x0 + box_w, y0 + box_h)], WHITE.mix(0.8).filled()))?;
        root.draw(&Rectangle::new([(x0, y0), (x0 + box_w, y0 + box_h)], BLACK.mix(0.4).stroke_width(1)))?;

        let mut y = y0 + pad;
        if with_text {
            root.draw(&Text::new(self.title.to_string(), (x0 + pad, y), text_style(px * 1.1)))?;
            y += row_h;
        }

        for (label, color) in self.entries {
            let fill: RGBColor = (*color).into();
            let top = y + (row_h - swatch) / 2;
            root.draw(&Rectangle::new([(x0 + pad, top), (x0 + pad + swatch, top + swatch)], fill.filled()))?;
            root.draw(&Rectangle::new(
                [(x0 + pad, top), (x0 + pad + swatch, top + swatch)],
                BLACK.stroke_width(1),
            ))?;
            if with_text {
                let style = text_style(px).pos(Pos::new(HPos::Left, VPos::Center));
                root.draw(&Text::new(label.clone(), (x0 + 2 * pad + swatch, y + row_h / 2), style))?;
            }
            y += row_h;
        }
        Ok(())
    }
}

/// Horizontal colorbar with end and middle tick labels
pub(crate) fn draw_colorbar<DB>(
    area: &DrawingArea<DB, Shift>,
    colors: impl Fn(f64) -> Rgb,
    range: (f64, f64),
    label: &str,
) -> DrawResult<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let (w, h) = area.dim_in_pixel();
    let (w, h) = (w as i32, h as i32);
    let margin = 40;
    let bar_top = 8;
    let bar_bottom = (h / 3).max(bar_top + 8);
    let bar_w = (w - 2 * margin).max(1);

    for x in 0..bar_w {
        let t = x as f64 / (bar_w - 1).max(1) as f64;
        let color: RGBColor = colors(t).into();
        area.draw(&Rectangle::new([(margin + x, bar_top), (margin + x + 1, bar_bottom)], color.filled()))?;
    }
    area.draw(&Rectangle::new([(margin, bar_top), (margin + bar_w, bar_bottom)], BLACK.stroke_width(1)))?;

    if fonts::available() {
        let (lo, hi) = range;
        let ticks = [(0.0, lo), (0.5, (lo + hi) / 2.0), (1.0, hi)];
        for (t, value) in ticks {
            let x = margin + (t * bar_w as f64).round() as i32;
            area.draw(&PathElement::new(vec![(x, bar_bottom), (x, bar_bottom + 5)], BLACK.stroke_width(1)))?;
            let style = text_style(13.0).pos(Pos::new(HPos::Center, VPos::Top));
            area.draw(&Text::new(format!("{:.1}", value), (x, bar_bottom + 8), style))?;
        }
        area.draw(&Text::new(label.to_string(), (w / 2, bar_bottom + 34), centered(text_style(15.0))))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_png_size() {
        let png = render_png((40, 30), RenderMode::Static, |root| {
            root.draw(&Rectangle::new([(5, 5), (20, 20)], RED.filled()))?;
            Ok(())
        })
        .unwrap();
        assert_eq!((png.width, png.height), (40, 30));
        assert!(png.bytes.starts_with(b"\x89PNG"));
    }

    #[test]
    fn test_draw_failure_maps_to_render_error() {
        let err = render_png((10, 10), RenderMode::Raster, |_| Err("boom".into())).unwrap_err();
        assert_eq!(err.to_string(), "Error creating raster visualization: boom");
    }
}
