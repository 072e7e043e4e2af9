//! geomap render - style parsing and map rendering
//!
//! This crate turns a dataset column and a style configuration into a map: a static PNG
//! drawn with `plotters`, or a Leaflet HTML fragment (interactive choropleth or heatmap)
//! produced from `tera` templates. It also renders spectral index rasters.

pub mod classify;
pub mod encode;
pub mod fonts;
pub mod heatmap;
pub mod interactive;
pub mod palette;
pub mod raster;
pub mod response;
pub mod static_map;
pub mod style;
pub mod templates;

mod canvas;

pub use encode::PngImage;
pub use raster::render_index;
pub use response::{select_mode, wants_map, wants_statistics, MapResponse, MapResponseGenerator};
pub use style::{extract_legend_title, extract_title, parse_style_instructions};
pub use templates::TemplateEngine;
