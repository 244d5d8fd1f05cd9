use std::path::PathBuf;

/// Failure to turn a report location into a [`crate::types::Preview`].
///
/// This is an environment or configuration problem, never a gate failure.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("report {location:?} not found (tried: {})", display_paths(.tried))]
    NotFound {
        location: String,
        tried: Vec<PathBuf>,
    },

    #[error("read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("report {} is {size} bytes, over the {limit} byte limit", .path.display())]
    TooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("parse preview json {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
