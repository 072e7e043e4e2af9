use std::path::{Component, Path, PathBuf};

use geomap_core::error::{GeomapError, Result};

/// Resolve a client-supplied path under the data directory.
///
/// Only plain relative paths are accepted: absolute paths, drive prefixes and `..`
/// components are rejected.
pub fn resolve_data_path(data_dir: &Path, relative: &str) -> Result<PathBuf> {
    let candidate = Path::new(relative);
    let invalid = |reason: &str| GeomapError::InvalidPath { path: candidate.to_path_buf(), reason: reason.to_string() };

    if relative.trim().is_empty() {
        return Err(invalid("path is empty"));
    }

    let mut resolved = data_dir.to_path_buf();
    for component in candidate.components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            Component::ParentDir => return Err(invalid("parent directory references are not allowed")),
            Component::RootDir | Component::Prefix(_) => {
                return Err(invalid("path must be relative to the data directory"))
            }
        }
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_paths() {
        let dir = Path::new("/srv/uploads");
        assert_eq!(resolve_data_path(dir, "states.geojson").unwrap(), dir.join("states.geojson"));
        assert_eq!(resolve_data_path(dir, "./java/roads.shp").unwrap(), dir.join("java/roads.shp"));
    }

    #[test]
    fn test_escapes_rejected() {
        let dir = Path::new("/srv/uploads");
        for bad in ["../secrets.json", "a/../../b.tif", "/etc/passwd", ""] {
            let err = resolve_data_path(dir, bad).unwrap_err();
            assert!(matches!(err, GeomapError::InvalidPath { .. }), "{bad} should be rejected");
        }
    }
}
