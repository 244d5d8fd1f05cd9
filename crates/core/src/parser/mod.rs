mod sonar_preview;
pub mod timestamp;

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use tracing::{debug, error};

use crate::{error::LoadError, types::Preview};

pub use sonar_preview::parse_preview;

pub const DEFAULT_MAX_REPORT_BYTES: u64 = 64 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct LoadedPreview {
    pub path: PathBuf,
    pub preview: Preview,
}

/// Resolves a report location the way a resource lookup does: the location
/// itself first, then each root in order.
pub fn resolve_report_path(location: &str, roots: &[PathBuf]) -> Result<PathBuf, LoadError> {
    let direct = PathBuf::from(location);
    let mut tried = vec![direct.clone()];
    if direct.is_file() {
        return Ok(direct);
    }

    if !direct.is_absolute() {
        for root in roots {
            let candidate = root.join(location);
            if candidate.is_file() {
                return Ok(candidate);
            }
            tried.push(candidate);
        }
    }

    Err(LoadError::NotFound {
        location: location.to_string(),
        tried,
    })
}

pub fn load_preview(
    location: &str,
    roots: &[PathBuf],
    max_report_bytes: u64,
) -> Result<LoadedPreview, LoadError> {
    let path = resolve_report_path(location, roots).inspect_err(|e| error!("{e}"))?;
    let preview = read_preview_file(&path, max_report_bytes).inspect_err(|e| error!("{e}"))?;

    debug!(
        path = %path.display(),
        issues = preview.issues.len(),
        components = preview.components.len(),
        "loaded preview report"
    );

    Ok(LoadedPreview { path, preview })
}

fn read_preview_file(path: &Path, max_report_bytes: u64) -> Result<Preview, LoadError> {
    let read_err = |source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    };

    let f = File::open(path).map_err(read_err)?;
    let len = f.metadata().map_err(read_err)?.len();
    if len > max_report_bytes {
        return Err(LoadError::TooLarge {
            path: path.to_path_buf(),
            size: len,
            limit: max_report_bytes,
        });
    }

    parse_preview(BufReader::new(f)).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn resolves_relative_location_against_roots() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("sonar");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("preview.json"), "{}").unwrap();

        let roots = vec![dir.path().join("missing"), nested.clone()];
        let path = resolve_report_path("preview.json", &roots).unwrap();
        assert_eq!(path, nested.join("preview.json"));
    }

    #[test]
    fn not_found_lists_every_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let roots = vec![dir.path().to_path_buf()];
        let err = resolve_report_path("nope-preview.json", &roots).unwrap_err();
        match err {
            LoadError::NotFound { location, tried } => {
                assert_eq!(location, "nope-preview.json");
                assert_eq!(tried.len(), 2);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn oversized_report_is_rejected_before_parsing() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, r#"{{"issues":[]}}"#).unwrap();

        let location = f.path().to_str().unwrap();
        let err = load_preview(location, &[], 4).unwrap_err();
        assert!(matches!(err, LoadError::TooLarge { limit: 4, .. }));
    }

    #[test]
    fn malformed_report_is_a_parse_error() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "not json").unwrap();

        let location = f.path().to_str().unwrap();
        let err = load_preview(location, &[], DEFAULT_MAX_REPORT_BYTES).unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
    }
}
