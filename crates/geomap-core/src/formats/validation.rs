//! Cheap pre-read checks shared by the format readers

use crate::formats::FormatValidation;
use std::fs;
use std::io::Read;
use std::path::Path;

/// Files above this size get a warning before being loaded wholesale
const LARGE_FILE_MB: u64 = 200;

pub struct FormatValidator;

impl FormatValidator {
    /// Validate that a file exists and is a regular file
    pub fn validate_file_exists(path: &Path) -> FormatValidation {
        let mut validation = FormatValidation::default();

        match fs::metadata(path) {
            Ok(meta) if meta.is_file() => {
                let size_mb = meta.len() / (1024 * 1024);
                if size_mb > LARGE_FILE_MB {
                    validation.warnings.push(format!(
                        "Large file ({} MB) is loaded into memory in full",
                        size_mb
                    ));
                }
            }
            Ok(_) => validation.errors.push(format!("Not a file: {}", path.display())),
            Err(_) => validation.errors.push(format!("File not found: {}", path.display())),
        }

        validation
    }

    /// Validate that required sidecar files exist for multi-file formats
    pub fn validate_component_files(
        base_path: &Path,
        required_extensions: &[&str],
        optional_extensions: &[&str],
    ) -> FormatValidation {
        let mut validation = FormatValidation::default();

        for ext in required_extensions {
            let component_path = base_path.with_extension(ext);
            if !component_path.exists() {
                validation
                    .errors
                    .push(format!("Missing required file: {}", component_path.display()));
            }
        }

        for ext in optional_extensions {
            let component_path = base_path.with_extension(ext);
            if !component_path.exists() {
                validation.warnings.push(format!(
                    "Optional file not found: {} (CRS defaults to EPSG:4326)",
                    component_path.display()
                ));
            }
        }

        validation
    }

    /// Validate JSON structure by attempting to parse
    pub fn validate_json_structure(path: &Path) -> FormatValidation {
        let mut validation = FormatValidation::default();

        match fs::read_to_string(path) {
            Ok(content) => {
                if let Err(e) = serde_json::from_str::<serde_json::Value>(&content) {
                    validation.errors.push(format!("Invalid JSON structure: {}", e));
                }
            }
            Err(e) => validation.errors.push(format!("Cannot read file: {}", e)),
        }

        validation
    }

    /// Validate the TIFF byte-order header ("II*\0" or "MM\0*", BigTIFF included)
    pub fn validate_tiff_header(path: &Path) -> FormatValidation {
        let mut validation = FormatValidation::default();

        let mut header = [0u8; 4];
        match fs::File::open(path).and_then(|mut f| f.read_exact(&mut header)) {
            Ok(()) => {
                let valid = matches!(
                    header,
                    [b'I', b'I', 42, 0] | [b'M', b'M', 0, 42] | [b'I', b'I', 43, 0] | [b'M', b'M', 0, 43]
                );
                if !valid {
                    validation.errors.push("Not a TIFF file: bad header".to_string());
                }
            }
            Err(e) => validation.errors.push(format!("Cannot read TIFF header: {}", e)),
        }

        validation
    }

    /// Merge multiple validation results
    pub fn merge_validations(validations: Vec<FormatValidation>) -> FormatValidation {
        let mut merged = FormatValidation::default();

        for validation in validations {
            merged.errors.extend(validation.errors);
            merged.warnings.extend(validation.warnings);
        }

        merged
    }
}
