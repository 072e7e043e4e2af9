pub mod dataset;
pub mod intent;
pub mod raster;
pub mod style;

pub use dataset::{Column, ColumnKind, Dataset, Row, Value, UNKNOWN_CATEGORY};
pub use intent::{IntentKind, QueryIntent};
pub use raster::{Band, IndexRaster, IndexType, Raster};
pub use style::{
    ClassificationScheme, ColorScheme, LegendLocation, LegendSize, NorthArrowPosition, StyleConfig,
};
