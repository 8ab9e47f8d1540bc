use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use study_engine::{AtomicFileWriter, EngineSettings, PersistError, DEFAULT_BASE_URL};
use study_logging::{study_info, study_warn};
use thiserror::Error;

pub const CONFIG_FILENAME: &str = ".study_client.ron";
pub const ENV_TOKEN: &str = "STUDY_TOKEN";
pub const ENV_BASE_URL: &str = "STUDY_BASE_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] ron::Error),
    #[error("failed to write config: {0}")]
    Write(#[from] PersistError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub log_to_file: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            log_to_file: false,
        }
    }
}

impl ClientConfig {
    /// Read `{dir}/.study_client.ron`; a missing file yields the defaults.
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILENAME);
        let content = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => return Err(ConfigError::Read { path, source }),
        };
        ron::from_str(&content).map_err(|source| ConfigError::Parse { path, source })
    }

    pub fn save(&self, dir: &Path) -> Result<(), ConfigError> {
        let content = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::new())?;
        AtomicFileWriter::new(dir.to_path_buf()).write(CONFIG_FILENAME, content.as_bytes())?;
        Ok(())
    }

    /// Environment values win over the file.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(token) = lookup(ENV_TOKEN).filter(|t| !t.trim().is_empty()) {
            self.token = Some(token);
        }
        if let Some(base_url) = lookup(ENV_BASE_URL).filter(|u| !u.trim().is_empty()) {
            self.base_url = base_url;
        }
        self
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings::with_base_url(self.base_url.clone())
    }
}

/// Drop the stored token after the server rejected it. Other settings stay.
pub fn clear_persisted_token(dir: &Path) -> Result<(), ConfigError> {
    let mut config = ClientConfig::load(dir)?;
    if config.token.take().is_none() {
        return Ok(());
    }
    config.save(dir)?;
    study_info!("cleared stored token in {:?}", dir.join(CONFIG_FILENAME));
    Ok(())
}

pub fn report_unauthorized(dir: &Path) {
    if let Err(err) = clear_persisted_token(dir) {
        study_warn!("could not clear stored token: {err}");
    }
}
