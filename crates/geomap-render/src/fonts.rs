//! Font registration for text on rendered images
//!
//! Text is drawn with a TrueType font registered as the sans-serif family. The font comes
//! from the configured path or the first system font found. Without a font, images are
//! still produced, only without text.

use plotters::style::{register_font, FontStyle};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static FONT_LOADED: OnceLock<bool> = OnceLock::new();

const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Register the text font once per process. Later calls return the first outcome.
pub fn init(font_path: Option<&Path>) -> bool {
    *FONT_LOADED.get_or_init(|| load(font_path))
}

/// True when text can be drawn
pub fn available() -> bool {
    init(None)
}

fn candidates(font_path: Option<&Path>) -> Vec<PathBuf> {
    font_path
        .map(Path::to_path_buf)
        .into_iter()
        .chain(SYSTEM_FONTS.iter().map(PathBuf::from))
        .collect()
}

fn load(font_path: Option<&Path>) -> bool {
    if candidates(font_path).iter().any(|path| register(path)) {
        return true;
    }
    tracing::warn!("No usable TrueType font found; images will be rendered without text");
    false
}

/// Register one font file; false when it is missing or not a usable TrueType font
fn register(path: &Path) -> bool {
    let Ok(bytes) = std::fs::read(path) else {
        return false;
    };

    // plotters keeps registered font data for the life of the process
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
    match register_font("sans-serif", FontStyle::Normal, bytes) {
        Ok(()) => {
            tracing::debug!(font = %path.display(), "Registered text font");
            true
        }
        Err(_) => {
            tracing::warn!(font = %path.display(), "Unusable font file");
            false
        }
    }
}
