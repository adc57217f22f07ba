//! CLI configuration stored as JSON in the data directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CliError;

const CONFIG_FILE: &str = "config.json";

/// Persisted CLI settings; flags and environment variables override these.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CliConfig {
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub auth_token: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
}

impl CliConfig {
    /// Load config from `data_dir`, defaulting when the file does not exist.
    pub fn load(data_dir: &Path) -> Result<Self, CliError> {
        let path = Self::path_in(data_dir);
        match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw)
                .map_err(|error| CliError::Config(format!("invalid {}: {error}", path.display()))),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(error) => Err(error.into()),
        }
    }

    /// Persist config under `data_dir`, creating the directory if needed.
    pub fn save(&self, data_dir: &Path) -> Result<(), CliError> {
        std::fs::create_dir_all(data_dir)?;
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(Self::path_in(data_dir), raw)?;
        Ok(())
    }

    fn path_in(data_dir: &Path) -> PathBuf {
        data_dir.join(CONFIG_FILE)
    }
}

/// Resolve the data directory: flag, then `NOOK_DATA_DIR`, then the
/// platform data dir.
pub fn resolve_data_dir(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| std::env::var_os("NOOK_DATA_DIR").map(PathBuf::from))
        .unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("nook")
        })
}
