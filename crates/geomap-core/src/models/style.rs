//! Visualization options derived from a user message
//!
//! `StyleConfig` has one field per recognized option, each with an explicit default.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Corner of the map frame holding the legend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LegendLocation {
    UpperRight,
    UpperLeft,
    #[default]
    LowerLeft,
    LowerRight,
}

impl LegendLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            LegendLocation::UpperRight => "upper right",
            LegendLocation::UpperLeft => "upper left",
            LegendLocation::LowerLeft => "lower left",
            LegendLocation::LowerRight => "lower right",
        }
    }
}

impl fmt::Display for LegendLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LegendSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl LegendSize {
    /// Legend text height in pixels
    pub fn font_px(&self) -> u32 {
        match self {
            LegendSize::Small => 11,
            LegendSize::Medium => 14,
            LegendSize::Large => 18,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LegendSize::Small => "small",
            LegendSize::Medium => "medium",
            LegendSize::Large => "large",
        }
    }
}

/// Corner of the map frame holding the north arrow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NorthArrowPosition {
    TopLeft,
    #[default]
    TopRight,
    BottomLeft,
    BottomRight,
}

impl NorthArrowPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            NorthArrowPosition::TopLeft => "top left",
            NorthArrowPosition::TopRight => "top right",
            NorthArrowPosition::BottomLeft => "bottom left",
            NorthArrowPosition::BottomRight => "bottom right",
        }
    }
}

/// Sequential color ramp used for numeric classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ColorScheme {
    #[default]
    YlGn,
    Blues,
    Reds,
    Greens,
    Purples,
}

impl ColorScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorScheme::YlGn => "YlGn",
            ColorScheme::Blues => "Blues",
            ColorScheme::Reds => "Reds",
            ColorScheme::Greens => "Greens",
            ColorScheme::Purples => "Purples",
        }
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Algorithm partitioning a numeric range into ordered bins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ClassificationScheme {
    #[default]
    NaturalBreaks,
    EqualInterval,
    Quantiles,
}

impl ClassificationScheme {
    /// Look up a scheme by name. Unknown names fall back to Natural Breaks.
    pub fn from_name(name: &str) -> Self {
        let normalized: String = name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "equalinterval" => ClassificationScheme::EqualInterval,
            "quantiles" | "quantile" => ClassificationScheme::Quantiles,
            _ => ClassificationScheme::NaturalBreaks,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClassificationScheme::NaturalBreaks => "NaturalBreaks",
            ClassificationScheme::EqualInterval => "EqualInterval",
            ClassificationScheme::Quantiles => "Quantiles",
        }
    }
}

/// Complete set of visualization options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleConfig {
    pub legend_loc: LegendLocation,
    pub legend_size: LegendSize,
    pub north_arrow_position: NorthArrowPosition,
    pub color_scheme: ColorScheme,
    pub classification_scheme: ClassificationScheme,
    pub k_classes: usize,
    pub grid: bool,
    pub scale_bar: bool,

    /// Fraction of the bounding box extent added around the data
    pub padding: f64,

    /// Map title; renderers fall back to "<column> Distribution"
    pub title: Option<String>,

    /// Legend title; renderers fall back to the column name
    pub legend_title: Option<String>,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            legend_loc: LegendLocation::default(),
            legend_size: LegendSize::default(),
            north_arrow_position: NorthArrowPosition::default(),
            color_scheme: ColorScheme::default(),
            classification_scheme: ClassificationScheme::default(),
            k_classes: 5,
            grid: false,
            scale_bar: true,
            padding: 0.1,
            title: None,
            legend_title: None,
        }
    }
}

impl StyleConfig {
    pub fn title_for(&self, column: &str) -> String {
        self.title.clone().unwrap_or_else(|| format!("{} Distribution", column))
    }

    pub fn legend_title_for(&self, column: &str) -> String {
        self.legend_title.clone().unwrap_or_else(|| column.to_string())
    }
}
