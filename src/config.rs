use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use derive_ex::Ex;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Ex)]
#[derive_ex(Default)]
#[default(Self::new())]
#[serde(default)]
pub struct RunnerConfig {
    /// Number of consecutive reruns a single trigger may cause before the pass fails.
    pub max_reruns: usize,
}
impl RunnerConfig {
    pub const fn new() -> Self {
        Self { max_reruns: 100 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Ex)]
#[derive_ex(Default)]
#[default(Self::new())]
#[serde(default)]
pub struct ServerConfig {
    /// Idle time after which [`Runtime::expire_idle`](crate::Runtime::expire_idle) drops a session.
    pub session_ttl_secs: u64,
}
impl ServerConfig {
    pub const fn new() -> Self {
        Self {
            session_ttl_secs: 3600,
        }
    }
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Ex)]
#[derive_ex(Default)]
#[default(Self::new())]
#[serde(default)]
pub struct ClientConfig {
    /// Show error messages in exception elements. When `false`, a generic message is shown.
    pub show_error_details: bool,
}
impl ClientConfig {
    pub const fn new() -> Self {
        Self {
            show_error_details: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Ex)]
#[derive_ex(Default)]
#[default(Self::new())]
#[serde(default)]
pub struct SecretsConfig {
    /// Candidate secrets files. The first one that exists is used.
    pub paths: Vec<PathBuf>,
}
impl SecretsConfig {
    pub fn new() -> Self {
        Self {
            paths: vec![PathBuf::from(".rerun/secrets.toml")],
        }
    }
}

/// Settings of an [`App`](crate::App), usually read from `.rerun/config.toml`.
///
/// Every section and every key is optional.
///
/// ```toml
/// [runner]
/// max_reruns = 100
///
/// [server]
/// session_ttl_secs = 3600
///
/// [client]
/// show_error_details = true
///
/// [secrets]
/// paths = [".rerun/secrets.toml"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub runner: RunnerConfig,
    pub server: ServerConfig,
    pub client: ClientConfig,
    pub secrets: SecretsConfig,
}

impl AppConfig {
    pub const DEFAULT_PATH: &'static str = ".rerun/config.toml";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Parse)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Loads `<root>/.rerun/config.toml`, or returns the defaults if that file does not exist.
    ///
    /// Relative secrets paths are resolved against `root`.
    pub fn discover(root: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let root = root.as_ref();
        let path = root.join(Self::DEFAULT_PATH);
        let mut config = if path.exists() {
            Self::load(&path)?
        } else {
            Self::default()
        };
        for p in &mut config.secrets.paths {
            if p.is_relative() {
                *p = root.join(&*p);
            }
        }
        Ok(config)
    }
}
