use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// geomap - ask questions about geospatial files and get maps back
#[derive(Parser, Debug)]
#[command(name = "geomap")]
#[command(about = "Conversational mapping over GeoJSON, Shapefile and GeoTIFF files", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to ./geomap.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Language model to use (overrides config and environment)
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// TrueType font for text on rendered images
    #[arg(long, global = true, value_name = "FILE")]
    pub font: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask a question about a dataset; renders a map or statistics when asked for
    Ask(AskArgs),

    /// Show the style configuration a message produces
    Style(StyleArgs),

    /// Render a map of a column without consulting the language model
    Render(RenderArgs),

    /// Compute a spectral index (NDVI, NDWI, SAWI) from a raster
    Index(IndexArgs),

    /// Describe numeric columns of a dataset
    Stats(StatsArgs),

    /// Inspect a file or the effective configuration
    Inspect(InspectArgs),
}

#[derive(Parser, Debug)]
pub struct AskArgs {
    /// Vector dataset (GeoJSON or Shapefile)
    pub dataset: PathBuf,

    /// The question or instruction, e.g. "map population, legend to right"
    pub message: String,

    /// Where to write a rendered map (defaults to map.png or map.html)
    #[arg(long, short = 'o')]
    pub out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct StyleArgs {
    /// Message containing style instructions
    pub message: String,
}

#[derive(Parser, Debug)]
pub struct RenderArgs {
    /// Vector dataset (GeoJSON or Shapefile)
    pub dataset: PathBuf,

    /// Column to map; repeat to fill missing values of further columns
    #[arg(long, short = 'c', required = true)]
    pub column: Vec<String>,

    /// Style and mode instructions ("heatmap", "interactive", "legend to left", ...)
    #[arg(long, short = 'm', default_value = "")]
    pub message: String,

    /// Where to write the map (defaults to map.png or map.html)
    #[arg(long, short = 'o')]
    pub out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct IndexArgs {
    /// Multi-band raster (GeoTIFF)
    pub raster: PathBuf,

    /// Index type: NDVI, NDWI or SAWI
    #[arg(long = "type", short = 't')]
    pub index_type: String,

    /// The two 1-based band numbers in formula order, e.g. 4,3 for NIR,Red
    #[arg(long, value_delimiter = ',', required = true)]
    pub bands: Vec<u16>,

    /// Where to write the PNG (defaults to <index>.png)
    #[arg(long, short = 'o')]
    pub out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct StatsArgs {
    /// Vector dataset (GeoJSON or Shapefile)
    pub dataset: PathBuf,

    /// Columns to describe (all columns when omitted)
    #[arg(long, short = 'c')]
    pub column: Vec<String>,
}

#[derive(Parser, Debug)]
pub struct InspectArgs {
    #[command(subcommand)]
    pub target: InspectTarget,
}

#[derive(Subcommand, Debug)]
pub enum InspectTarget {
    /// Summarize a vector or raster file
    File {
        /// File to inspect
        path: PathBuf,
    },
    /// Show configuration values and where they came from
    Config,
}
