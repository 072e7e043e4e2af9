//! Static classified map rendered to PNG
//!
//! Categorical columns get a qualitative palette with one legend entry per category.
//! Numeric columns are classified into `k_classes` bins and drawn with the configured
//! sequential color scheme.

use geo::Geometry;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use geomap_core::error::{GeomapError, RenderMode, Result};
use geomap_core::models::{ColumnKind, Dataset, NorthArrowPosition, StyleConfig, UNKNOWN_CATEGORY};

use crate::canvas::{centered, render_png, text_style, DrawResult, Legend};
use crate::classify::{bin_of, classify, legend_labels};
use crate::encode::PngImage;
use crate::fonts;
use crate::palette::{qualitative, Colormap, Rgb};
use crate::style::{extract_legend_title, extract_title};

/// Pixels per figure unit; the long edge is ten units
const PX_PER_UNIT: f64 = 100.0;
const LONG_EDGE_UNITS: f64 = 10.0;

/// Smallest short edge, so the title and legend still fit on elongated extents
const MIN_SHORT_EDGE_PX: u32 = 300;

/// Legend and label text is drawn this much larger than the nominal point size
const TEXT_SCALE: f64 = 1.5;

const KM_PER_DEGREE_LON_AT_EQUATOR: f64 = 111.320;

/// Fallback scale bar length when the local degree length is unusable
const DEFAULT_SCALE_KM: f64 = 5.0;

/// Drawable pieces of a geometry, in data coordinates
enum Shape {
    Polygon { exterior: Vec<(f64, f64)>, holes: Vec<Vec<(f64, f64)>> },
    Line(Vec<(f64, f64)>),
    Point((f64, f64)),
}

fn ring(ls: &geo::LineString<f64>) -> Vec<(f64, f64)> {
    ls.coords().map(|c| (c.x, c.y)).collect()
}

fn polygon_shape(p: &geo::Polygon<f64>) -> Shape {
    Shape::Polygon { exterior: ring(p.exterior()), holes: p.interiors().iter().map(ring).collect() }
}

fn shapes(geometry: &Geometry<f64>, out: &mut Vec<Shape>) {
    match geometry {
        Geometry::Point(p) => out.push(Shape::Point((p.x(), p.y()))),
        Geometry::MultiPoint(mp) => out.extend(mp.iter().map(|p| Shape::Point((p.x(), p.y())))),
        Geometry::Line(l) => out.push(Shape::Line(vec![(l.start.x, l.start.y), (l.end.x, l.end.y)])),
        Geometry::LineString(ls) => out.push(Shape::Line(ring(ls))),
        Geometry::MultiLineString(mls) => out.extend(mls.iter().map(|ls| Shape::Line(ring(ls)))),
        Geometry::Polygon(p) => out.push(polygon_shape(p)),
        Geometry::MultiPolygon(mp) => out.extend(mp.iter().map(polygon_shape)),
        Geometry::Rect(r) => out.push(polygon_shape(&r.to_polygon())),
        Geometry::Triangle(t) => out.push(polygon_shape(&t.to_polygon())),
        Geometry::GeometryCollection(gc) => gc.iter().for_each(|g| shapes(g, out)),
    }
}

/// Bounding box with zero-size dimensions widened so the extent has an area
fn effective_bounds(bounds: [f64; 4]) -> [f64; 4] {
    let [mut x0, mut y0, mut x1, mut y1] = bounds;
    let w = x1 - x0;
    let h = y1 - y0;
    if w <= 0.0 {
        let half = if h > 0.0 { h / 2.0 } else { 0.5 };
        x0 -= half;
        x1 += half;
    }
    if h <= 0.0 {
        let half = if w > 0.0 { w / 2.0 } else { 0.5 };
        y0 -= half;
        y1 += half;
    }
    [x0, y0, x1, y1]
}

/// Pixel size with the long edge fixed and the other scaled by the extent's aspect ratio
pub fn figure_size(width: f64, height: f64) -> (u32, u32) {
    let long = LONG_EDGE_UNITS * PX_PER_UNIT;
    let aspect = width / height;
    let (w, h) = if aspect > 1.0 { (long, long / aspect) } else { (long * aspect, long) };
    ((w.round() as u32).max(MIN_SHORT_EDGE_PX), (h.round() as u32).max(MIN_SHORT_EDGE_PX))
}

/// Largest 1, 2 or 5 times a power of ten not above `km`
fn nice_length(km: f64) -> f64 {
    if !(km.is_finite() && km > 0.0) {
        return DEFAULT_SCALE_KM;
    }
    let magnitude = 10f64.powf(km.log10().floor());
    let mantissa = km / magnitude;
    let step = if mantissa >= 5.0 {
        5.0
    } else if mantissa >= 2.0 {
        2.0
    } else {
        1.0
    };
    step * magnitude
}

fn format_km(km: f64) -> String {
    if km.fract() == 0.0 {
        format!("{:.0}", km)
    } else {
        format!("{}", km)
    }
}

/// Scale bar length in kilometres and in degrees of longitude at latitude `lat`
pub fn scale_bar_length(lat: f64, width_deg: f64) -> (f64, f64) {
    let km_per_degree = KM_PER_DEGREE_LON_AT_EQUATOR * lat.to_radians().cos();
    if km_per_degree <= 1e-9 {
        return (DEFAULT_SCALE_KM, 0.05 * width_deg);
    }
    let km = nice_length(width_deg * km_per_degree / 5.0);
    (km, km / km_per_degree)
}

/// Per-row colors plus legend entries for the mapped column
struct Symbology {
    row_colors: Vec<Rgb>,
    legend: Vec<(String, Rgb)>,
}

fn categorical_symbology(dataset: &mut Dataset, column: &str) -> Result<Symbology> {
    dataset.fill_missing_categorical(column, UNKNOWN_CATEGORY)?;
    let idx = dataset.require_column(column)?;
    let categories = dataset.distinct_values(column)?;
    let palette = qualitative(categories.len());

    let color_of = |i: usize| palette[i % palette.len()];
    let row_colors = dataset
        .values(idx)
        .map(|v| {
            let label = v.label();
            let pos = categories.iter().position(|c| c.label() == label).unwrap_or(0);
            color_of(pos)
        })
        .collect();
    let legend = categories.iter().enumerate().map(|(i, c)| (c.label(), color_of(i))).collect();

    tracing::debug!(column, categories = categories.len(), palette = palette.len(), "Categorical symbology");
    Ok(Symbology { row_colors, legend })
}

fn numeric_symbology(dataset: &mut Dataset, column: &str, style: &StyleConfig) -> Result<Symbology> {
    dataset.coerce_numeric(column)?;
    let idx = dataset.require_column(column)?;
    let values: Vec<f64> = dataset.values(idx).map(|v| v.as_f64().unwrap_or(0.0)).collect();

    let bins = classify(&values, style.classification_scheme, style.k_classes)
        .map_err(|e| GeomapError::render(RenderMode::Static, e.to_string()))?;
    let colors = Colormap::for_scheme(style.color_scheme).discrete(bins.len());

    let row_colors = values.iter().map(|v| colors[bin_of(*v, &bins)]).collect();
    let legend = legend_labels(&bins).into_iter().zip(colors.iter().copied()).collect();

    tracing::debug!(
        column,
        scheme = style.classification_scheme.as_str(),
        classes = bins.len(),
        "Numeric symbology"
    );
    Ok(Symbology { row_colors, legend })
}

/// Render the static map of `column`
pub fn render(dataset: &mut Dataset, column: &str, style: &StyleConfig, user_message: &str) -> Result<PngImage> {
    let kind = dataset
        .column_kind(column)
        .ok_or_else(|| GeomapError::ColumnNotFound { column: column.to_string(), available: dataset.column_names() })?;

    let bounds = dataset
        .bounds()
        .ok_or_else(|| GeomapError::render(RenderMode::Static, "dataset has no geometries to draw"))?;

    let title = extract_title(user_message).unwrap_or_else(|| style.title_for(column));
    let legend_title = extract_legend_title(user_message).unwrap_or_else(|| style.legend_title_for(column));

    let symbology = match kind {
        ColumnKind::Categorical => categorical_symbology(dataset, column)?,
        ColumnKind::Numeric => numeric_symbology(dataset, column, style)?,
    };

    let [x0, y0, x1, y1] = effective_bounds(bounds);
    let (width, height) = (x1 - x0, y1 - y0);
    let size = figure_size(width, height);

    let plan = MapPlan {
        dataset,
        symbology: &symbology,
        style,
        title: &title,
        legend_title: &legend_title,
        extent: [x0, y0, x1, y1],
    };
    let png = render_png(size, RenderMode::Static, |root| plan.draw(root))?;

    tracing::info!(
        dataset = %plan.dataset.name,
        column,
        width = png.width,
        height = png.height,
        bytes = png.bytes.len(),
        "Rendered static map"
    );
    Ok(png)
}

struct MapPlan<'a> {
    dataset: &'a Dataset,
    symbology: &'a Symbology,
    style: &'a StyleConfig,
    title: &'a str,
    legend_title: &'a str,
    extent: [f64; 4],
}

type MapChart<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

impl MapPlan<'_> {
    fn draw<DB>(&self, root: &DrawingArea<DB, Shift>) -> DrawResult<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        let with_text = fonts::available();
        let [x0, y0, x1, y1] = self.extent;
        let (width, height) = (x1 - x0, y1 - y0);
        let pad = self.style.padding;

        let mut builder = ChartBuilder::on(root);
        builder
            .margin(20)
            .x_label_area_size(if with_text { 40 } else { 0 })
            .y_label_area_size(if with_text { 70 } else { 0 });
        if with_text {
            builder.caption(self.title, text_style(14.0 * TEXT_SCALE * 1.2));
        }
        let mut chart = builder.build_cartesian_2d(
            (x0 - pad * width)..(x1 + pad * width),
            (y0 - pad * height)..(y1 + pad * height),
        )?;

        if with_text {
            chart
                .configure_mesh()
                .disable_mesh()
                .x_labels(6)
                .y_labels(6)
                .label_style(text_style(12.0))
                .x_label_formatter(&|v| format!("{:.2}", v))
                .y_label_formatter(&|v| format!("{:.2}", v))
                .draw()?;
        }

        if self.style.grid {
            self.draw_grid(&mut chart)?;
        }
        self.draw_features(&mut chart)?;

        let plot_area = chart.plotting_area().get_pixel_range();
        root.draw(&Rectangle::new(
            [(plot_area.0.start, plot_area.1.start), (plot_area.0.end, plot_area.1.end)],
            BLACK.stroke_width(1),
        ))?;

        if self.style.scale_bar {
            self.draw_scale_bar(&mut chart)?;
        }
        draw_north_arrow(root, &plot_area, self.style.north_arrow_position)?;

        Legend {
            title: self.legend_title,
            entries: &self.symbology.legend,
            location: self.style.legend_loc,
            font_px: self.style.legend_size.font_px() as f64 * TEXT_SCALE,
        }
        .draw(root, plot_area)
    }

    fn draw_features<DB>(&self, chart: &mut MapChart<'_, DB>) -> DrawResult<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        let outline = BLACK.mix(0.6).stroke_width(1);
        let mut parts = Vec::new();

        for (row, color) in self.dataset.rows.iter().zip(&self.symbology.row_colors) {
            let Some(geometry) = &row.geometry else { continue };
            parts.clear();
            shapes(geometry, &mut parts);
            let fill: RGBColor = (*color).into();

            for part in &parts {
                match part {
                    Shape::Polygon { exterior, holes } => {
                        chart.draw_series(std::iter::once(Polygon::new(exterior.clone(), fill.filled())))?;
                        for hole in holes {
                            chart.draw_series(std::iter::once(Polygon::new(hole.clone(), WHITE.filled())))?;
                            chart.draw_series(std::iter::once(PathElement::new(hole.clone(), outline)))?;
                        }
                        chart.draw_series(std::iter::once(PathElement::new(exterior.clone(), outline)))?;
                    }
                    Shape::Line(points) => {
                        chart.draw_series(std::iter::once(PathElement::new(points.clone(), fill.stroke_width(2))))?;
                    }
                    Shape::Point(p) => {
                        chart.draw_series(std::iter::once(Circle::new(*p, 4, fill.filled())))?;
                        chart.draw_series(std::iter::once(Circle::new(*p, 4, outline)))?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Dashed lines at evenly spaced positions across the padded extent
    fn draw_grid<DB>(&self, chart: &mut MapChart<'_, DB>) -> DrawResult<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        let x_range = chart.x_range();
        let y_range = chart.y_range();
        let style = BLACK.mix(0.3).stroke_width(1);
        let lines = 6;
        let dashes = 60;

        for i in 1..lines {
            let t = i as f64 / lines as f64;
            let x = x_range.start + (x_range.end - x_range.start) * t;
            let y = y_range.start + (y_range.end - y_range.start) * t;
            for d in (0..dashes).step_by(2) {
                let a = d as f64 / dashes as f64;
                let b = (d + 1) as f64 / dashes as f64;
                let ya = y_range.start + (y_range.end - y_range.start) * a;
                let yb = y_range.start + (y_range.end - y_range.start) * b;
                let xa = x_range.start + (x_range.end - x_range.start) * a;
                let xb = x_range.start + (x_range.end - x_range.start) * b;
                chart.draw_series(std::iter::once(PathElement::new(vec![(x, ya), (x, yb)], style)))?;
                chart.draw_series(std::iter::once(PathElement::new(vec![(xa, y), (xb, y)], style)))?;
            }
        }
        Ok(())
    }

    /// Approximate linear scale bar at the bottom center of the data extent.
    /// Coordinates are taken as degrees; other CRSs get no scale bar.
    fn draw_scale_bar<DB>(&self, chart: &mut MapChart<'_, DB>) -> DrawResult<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        if self.dataset.crs != 4326 {
            tracing::debug!(crs = self.dataset.crs, "Skipping scale bar for non-geographic coordinates");
            return Ok(());
        }

        let [x0, y0, x1, y1] = self.extent;
        let (width, height) = (x1 - x0, y1 - y0);
        let (km, length) = scale_bar_length((y0 + y1) / 2.0, width);

        let start = x0 + width / 2.0 - length / 2.0;
        let y = y0 + height * 0.01;
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(start, y), (start + length, y)],
            BLACK.stroke_width(3),
        )))?;

        if fonts::available() {
            let label = format_km(km);
            let below = |style: TextStyle<'static>, h: HPos| style.pos(Pos::new(h, VPos::Top));
            chart.draw_series(std::iter::once(Text::new(
                format!("{} km", label),
                (start + length / 2.0, y - height * 0.02),
                below(text_style(10.0 * TEXT_SCALE), HPos::Center),
            )))?;
            chart.draw_series(std::iter::once(Text::new(
                "0".to_string(),
                (start, y - height * 0.04),
                below(text_style(8.0 * TEXT_SCALE), HPos::Right),
            )))?;
            chart.draw_series(std::iter::once(Text::new(
                label,
                (start + length, y - height * 0.04),
                below(text_style(8.0 * TEXT_SCALE), HPos::Left),
            )))?;
        }
        Ok(())
    }
}

/// Axes-fraction anchor of the north arrow head
fn north_arrow_anchor(position: NorthArrowPosition) -> (f64, f64) {
    match position {
        NorthArrowPosition::TopRight => (0.95, 0.95),
        NorthArrowPosition::TopLeft => (0.05, 0.95),
        NorthArrowPosition::BottomRight => (0.95, 0.15),
        NorthArrowPosition::BottomLeft => (0.05, 0.15),
    }
}

fn draw_north_arrow<DB>(
    root: &DrawingArea<DB, Shift>,
    plot: &(std::ops::Range<i32>, std::ops::Range<i32>),
    position: NorthArrowPosition,
) -> DrawResult<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let (xs, ys) = plot;
    let (fx, fy) = north_arrow_anchor(position);
    let to_px = |fx: f64, fy: f64| {
        (
            xs.start + (fx * (xs.end - xs.start) as f64).round() as i32,
            ys.end - (fy * (ys.end - ys.start) as f64).round() as i32,
        )
    };

    let head = to_px(fx, fy);
    let label = to_px(fx, fy - 0.08);
    let size = 8;

    root.draw(&PathElement::new(vec![(label.0, label.1 - 12), head], BLACK.stroke_width(2)))?;
    root.draw(&Polygon::new(
        vec![head, (head.0 - size / 2, head.1 + size), (head.0 + size / 2, head.1 + size)],
        BLACK.filled(),
    ))?;
    root.draw(&Rectangle::new([(label.0 - 10, label.1 - 11), (label.0 + 10, label.1 + 11)], WHITE.mix(0.8).filled()))?;
    root.draw(&Rectangle::new([(label.0 - 10, label.1 - 11), (label.0 + 10, label.1 + 11)], BLACK.stroke_width(1)))?;
    if fonts::available() {
        root.draw(&Text::new("N".to_string(), label, centered(text_style(18.0))))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_figure_size_keeps_aspect() {
        assert_eq!(figure_size(20.0, 10.0), (1000, 500));
        assert_eq!(figure_size(10.0, 20.0), (500, 1000));
        assert_eq!(figure_size(1.0, 1.0), (1000, 1000));
        assert_eq!(figure_size(100.0, 1.0), (1000, MIN_SHORT_EDGE_PX));
    }

    #[test]
    fn test_effective_bounds() {
        assert_eq!(effective_bounds([1.0, 2.0, 1.0, 2.0]), [0.5, 1.5, 1.5, 2.5]);
        assert_eq!(effective_bounds([0.0, 5.0, 4.0, 5.0]), [0.0, 3.0, 4.0, 7.0]);
    }

    #[test]
    fn test_nice_length() {
        assert_eq!(nice_length(7.3), 5.0);
        assert_eq!(nice_length(0.34), 0.2);
        assert_eq!(nice_length(180.0), 100.0);
        assert_eq!(nice_length(0.0), DEFAULT_SCALE_KM);
    }

    #[test]
    fn test_fifteen_categories_use_twenty_color_palette() {
        use geo::{point, Geometry};
        use geomap_core::models::Value;

        let records = (0..15)
            .map(|i| {
                let g = Geometry::Point(point!(x: i as f64, y: 0.0));
                (Some(g), vec![("kind".to_string(), Value::Text(format!("class {i}")))])
            })
            .collect();
        let mut ds = Dataset::from_records("kinds", 4326, records);
        let symbology = categorical_symbology(&mut ds, "kind").unwrap();

        assert_eq!(symbology.legend.len(), 15);
        let mut distinct: Vec<Rgb> = Vec::new();
        for (_, color) in &symbology.legend {
            if !distinct.contains(color) {
                distinct.push(*color);
            }
        }
        assert_eq!(distinct.len(), 15);
        assert_eq!(symbology.row_colors, distinct);
    }

    #[test]
    fn test_scale_bar_length() {
        let (km, deg) = scale_bar_length(0.0, 10.0);
        assert_eq!(km, 200.0);
        assert!((deg - 200.0 / 111.320).abs() < 1e-9);

        let (km, deg) = scale_bar_length(90.0, 4.0);
        assert_eq!(km, DEFAULT_SCALE_KM);
        assert!((deg - 0.2).abs() < 1e-12);
    }
}
