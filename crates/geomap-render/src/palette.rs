//! Color ramps and qualitative palettes

use geomap_core::models::{ColorScheme, IndexType};
use plotters::style::RGBColor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    const fn hex(v: u32) -> Self {
        Rgb((v >> 16) as u8, (v >> 8) as u8, v as u8)
    }

    /// CSS hex notation, e.g. `#1f77b4`
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }

    fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb(mix(self.0, other.0), mix(self.1, other.1), mix(self.2, other.2))
    }
}

impl From<Rgb> for RGBColor {
    fn from(c: Rgb) -> Self {
        RGBColor(c.0, c.1, c.2)
    }
}

/// Fill used for single-valued numeric layers
pub const UNIFORM_FILL: Rgb = Rgb::hex(0x1f77b4);

const YLGN: [Rgb; 9] = [
    Rgb::hex(0xffffe5),
    Rgb::hex(0xf7fcb9),
    Rgb::hex(0xd9f0a3),
    Rgb::hex(0xaddd8e),
    Rgb::hex(0x78c679),
    Rgb::hex(0x41ab5d),
    Rgb::hex(0x238443),
    Rgb::hex(0x006837),
    Rgb::hex(0x004529),
];

const BLUES: [Rgb; 9] = [
    Rgb::hex(0xf7fbff),
    Rgb::hex(0xdeebf7),
    Rgb::hex(0xc6dbef),
    Rgb::hex(0x9ecae1),
    Rgb::hex(0x6baed6),
    Rgb::hex(0x4292c6),
    Rgb::hex(0x2171b5),
    Rgb::hex(0x08519c),
    Rgb::hex(0x08306b),
];

const REDS: [Rgb; 9] = [
    Rgb::hex(0xfff5f0),
    Rgb::hex(0xfee0d2),
    Rgb::hex(0xfcbba1),
    Rgb::hex(0xfc9272),
    Rgb::hex(0xfb6a4a),
    Rgb::hex(0xef3b2c),
    Rgb::hex(0xcb181d),
    Rgb::hex(0xa50f15),
    Rgb::hex(0x67000d),
];

const GREENS: [Rgb; 9] = [
    Rgb::hex(0xf7fcf5),
    Rgb::hex(0xe5f5e0),
    Rgb::hex(0xc7e9c0),
    Rgb::hex(0xa1d99b),
    Rgb::hex(0x74c476),
    Rgb::hex(0x41ab5d),
    Rgb::hex(0x238b45),
    Rgb::hex(0x006d2c),
    Rgb::hex(0x00441b),
];

const PURPLES: [Rgb; 9] = [
    Rgb::hex(0xfcfbfd),
    Rgb::hex(0xefedf5),
    Rgb::hex(0xdadaeb),
    Rgb::hex(0xbcbddc),
    Rgb::hex(0x9e9ac8),
    Rgb::hex(0x807dba),
    Rgb::hex(0x6a51a3),
    Rgb::hex(0x54278f),
    Rgb::hex(0x3f007d),
];

const RDYLBU: [Rgb; 11] = [
    Rgb::hex(0xa50026),
    Rgb::hex(0xd73027),
    Rgb::hex(0xf46d43),
    Rgb::hex(0xfdae61),
    Rgb::hex(0xfee090),
    Rgb::hex(0xffffbf),
    Rgb::hex(0xe0f3f8),
    Rgb::hex(0xabd9e9),
    Rgb::hex(0x74add1),
    Rgb::hex(0x4575b4),
    Rgb::hex(0x313695),
];

pub const TAB10: [Rgb; 10] = [
    Rgb::hex(0x1f77b4),
    Rgb::hex(0xff7f0e),
    Rgb::hex(0x2ca02c),
    Rgb::hex(0xd62728),
    Rgb::hex(0x9467bd),
    Rgb::hex(0x8c564b),
    Rgb::hex(0xe377c2),
    Rgb::hex(0x7f7f7f),
    Rgb::hex(0xbcbd22),
    Rgb::hex(0x17becf),
];

pub const TAB20: [Rgb; 20] = [
    Rgb::hex(0x1f77b4),
    Rgb::hex(0xaec7e8),
    Rgb::hex(0xff7f0e),
    Rgb::hex(0xffbb78),
    Rgb::hex(0x2ca02c),
    Rgb::hex(0x98df8a),
    Rgb::hex(0xd62728),
    Rgb::hex(0xff9896),
    Rgb::hex(0x9467bd),
    Rgb::hex(0xc5b0d5),
    Rgb::hex(0x8c564b),
    Rgb::hex(0xc49c94),
    Rgb::hex(0xe377c2),
    Rgb::hex(0xf7b6d2),
    Rgb::hex(0x7f7f7f),
    Rgb::hex(0xc7c7c7),
    Rgb::hex(0xbcbd22),
    Rgb::hex(0xdbdb8d),
    Rgb::hex(0x17becf),
    Rgb::hex(0x9edae5),
];

const SET3: [Rgb; 12] = [
    Rgb::hex(0x8dd3c7),
    Rgb::hex(0xffffb3),
    Rgb::hex(0xbebada),
    Rgb::hex(0xfb8072),
    Rgb::hex(0x80b1d3),
    Rgb::hex(0xfdb462),
    Rgb::hex(0xb3de69),
    Rgb::hex(0xfccde5),
    Rgb::hex(0xd9d9d9),
    Rgb::hex(0xbc80bd),
    Rgb::hex(0xccebc5),
    Rgb::hex(0xffed6f),
];

/// Piecewise-linear color ramp over evenly spaced stops
#[derive(Debug, Clone, Copy)]
pub struct Colormap {
    name: &'static str,
    stops: &'static [Rgb],
}

impl Colormap {
    pub const YLGN: Colormap = Colormap { name: "YlGn", stops: &YLGN };
    pub const BLUES: Colormap = Colormap { name: "Blues", stops: &BLUES };
    pub const REDS: Colormap = Colormap { name: "Reds", stops: &REDS };
    pub const GREENS: Colormap = Colormap { name: "Greens", stops: &GREENS };
    pub const PURPLES: Colormap = Colormap { name: "Purples", stops: &PURPLES };
    pub const RDYLBU: Colormap = Colormap { name: "RdYlBu", stops: &RDYLBU };
    pub const SET3: Colormap = Colormap { name: "Set3", stops: &SET3 };

    pub fn for_scheme(scheme: ColorScheme) -> Self {
        match scheme {
            ColorScheme::YlGn => Self::YLGN,
            ColorScheme::Blues => Self::BLUES,
            ColorScheme::Reds => Self::REDS,
            ColorScheme::Greens => Self::GREENS,
            ColorScheme::Purples => Self::PURPLES,
        }
    }

    pub fn for_index(index: IndexType) -> Self {
        match index {
            IndexType::Ndvi => Self::YLGN,
            IndexType::Ndwi => Self::BLUES,
            IndexType::Sawi => Self::RDYLBU,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Color at position `t` in [0, 1]; out-of-range values are clamped and NaN maps to 0
    pub fn sample(&self, t: f64) -> Rgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let last = self.stops.len() - 1;
        let pos = t * last as f64;
        let lo = (pos.floor() as usize).min(last);
        let hi = (lo + 1).min(last);
        self.stops[lo].lerp(self.stops[hi], pos - lo as f64)
    }

    /// `n` colors spread evenly from the light to the dark end
    pub fn discrete(&self, n: usize) -> Vec<Rgb> {
        match n {
            0 => Vec::new(),
            1 => vec![self.sample(1.0)],
            _ => (0..n).map(|i| self.sample(i as f64 / (n - 1) as f64)).collect(),
        }
    }
}

/// Qualitative palette for `categories` classes: tab10 up to ten, tab20 beyond
pub fn qualitative(categories: usize) -> &'static [Rgb] {
    if categories > TAB10.len() {
        &TAB20
    } else {
        &TAB10
    }
}

/// Category colors for the interactive map: Set3 stretched over the category positions
pub fn set3_scaled(categories: usize) -> Vec<Rgb> {
    match categories {
        0 => Vec::new(),
        1 => vec![Colormap::SET3.sample(0.0)],
        n => (0..n).map(|i| Colormap::SET3.sample(i as f64 / (n - 1) as f64)).collect(),
    }
}
