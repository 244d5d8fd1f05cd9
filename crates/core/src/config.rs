use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::gate::Thresholds;

pub const CONFIG_FILE_NAME: &str = "previewgate.toml";

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub report_path: Option<String>,
    pub max_blockers: Option<u32>,
    pub max_vulnerabilities: Option<u32>,
    pub max_majors: Option<u32>,
    pub max_minors: Option<u32>,
    pub resource_dirs: Vec<PathBuf>,
    pub max_report_bytes: Option<u64>,
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents =
            std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let config: Config =
            toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
        Ok(config)
    }

    /// Loads `previewgate.toml` from the working directory when present.
    pub fn discover() -> anyhow::Result<Option<Self>> {
        Self::discover_in(Path::new("."))
    }

    pub fn discover_in(dir: &Path) -> anyhow::Result<Option<Self>> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.exists() {
            Config::load(&path).map(Some)
        } else {
            Ok(None)
        }
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            max_blockers: self.max_blockers,
            max_vulnerabilities: self.max_vulnerabilities,
            max_majors: self.max_majors,
            max_minors: self.max_minors,
        }
    }
}
