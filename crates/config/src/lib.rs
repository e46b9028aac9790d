//! Layered configuration for pulse.
//!
//! Sources, lowest precedence first:
//!
//! 1. built-in defaults,
//! 2. one configuration file (TOML, YAML or JSON): either the path given
//!    explicitly or `config.{toml,yaml,yml,json}` in the platform config
//!    directory,
//! 3. `PULSE_`-prefixed environment variables, using `__` between sections
//!    and keys (`PULSE_INDEXER__TIMEOUT_SECS=30`),
//! 4. `FIREBASE_SERVICE_ACCOUNT_PATH` and `FIREBASE_DATABASE_URL`, which the
//!    notification server has always read.

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CHANNEL: &str = "com.pulse.app/media_scanner";
pub const DEFAULT_SERVICE_ACCOUNT_PATH: &str = "./service-account-key.json";
pub const DEFAULT_DATABASE_URL: &str = "https://pulse-app-ea5be-default-rtdb.asia-southeast1.firebasedatabase.app";

const ENV_PREFIX: &str = "PULSE_";
const LEGACY_SERVICE_ACCOUNT_PATH: &str = "FIREBASE_SERVICE_ACCOUNT_PATH";
const LEGACY_DATABASE_URL: &str = "FIREBASE_DATABASE_URL";

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub bridge: BridgeConfig,
    pub indexer: IndexerConfig,
    pub push: PushConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Channel name the dispatcher is attached under (logging only).
    pub channel: String,
}
impl Default for BridgeConfig {
    fn default() -> Self {
        Self { channel: DEFAULT_CHANNEL.to_string() }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct IndexerConfig {
    /// Indexing program; discovered on `PATH` when unset.
    pub program: Option<String>,
    /// Program arguments. `{path}` is replaced by the file being scanned; the
    /// path is appended when no argument mentions it.
    pub args: Vec<String>,
    /// Seconds to wait for the indexer to report back. Waits forever when unset.
    pub timeout_secs: Option<u64>,
}
impl IndexerConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PushConfig {
    /// Service account key file (JSON) used to authenticate with the
    /// messaging provider.
    pub service_account_path: PathBuf,
    pub database_url: String,
}
impl Default for PushConfig {
    fn default() -> Self {
        Self {
            service_account_path: PathBuf::from(DEFAULT_SERVICE_ACCOUNT_PATH),
            database_url: DEFAULT_DATABASE_URL.to_string(),
        }
    }
}

impl Config {
    /// Load and validate configuration from every source.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::extract(Self::figment(explicit)?)
    }

    /// Assemble the layered sources without extracting them.
    pub fn figment(explicit: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        match explicit {
            Some(path) => {
                if !path.is_file() {
                    exn::bail!(ErrorKind::NotFound(path.to_path_buf()));
                }
                tracing::debug!(path = %path.display(), "Loading configuration file");
                figment = Self::merge_file(figment, path)?;
            },
            None => {
                if let Some(path) = Self::default_file() {
                    tracing::debug!(path = %path.display(), "Loading configuration file");
                    figment = Self::merge_file(figment, &path)?;
                }
            },
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")).merge(Self::legacy_env()))
    }

    /// Extract and validate configuration from already assembled sources.
    pub fn extract(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract().map_err(|e| ErrorKind::Extract(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Platform configuration directory (for example `~/.config/pulse`).
    pub fn default_dir() -> Option<PathBuf> {
        ProjectDirs::from("app", "pulse", "pulse").map(|dirs| dirs.config_dir().to_path_buf())
    }

    fn default_file() -> Option<PathBuf> {
        let dir = Self::default_dir()?;
        ["config.toml", "config.yaml", "config.yml", "config.json"]
            .into_iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }

    fn merge_file(figment: Figment, path: &Path) -> Result<Figment> {
        let extension = path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
        Ok(match extension.as_deref() {
            Some("toml") => figment.merge(Toml::file(path)),
            Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
            Some("json") => figment.merge(Json::file(path)),
            _ => exn::bail!(ErrorKind::UnsupportedFormat(path.to_path_buf())),
        })
    }

    fn legacy_env() -> Env {
        Env::raw().only(&[LEGACY_SERVICE_ACCOUNT_PATH, LEGACY_DATABASE_URL]).map(|key| {
            if key.as_str().eq_ignore_ascii_case(LEGACY_SERVICE_ACCOUNT_PATH) {
                "push.service_account_path".into()
            } else {
                "push.database_url".into()
            }
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.bridge.channel.trim().is_empty() {
            exn::bail!(ErrorKind::Invalid("bridge.channel", "must not be empty".to_string()));
        }
        if self.indexer.timeout_secs == Some(0) {
            exn::bail!(ErrorKind::Invalid("indexer.timeout_secs", "must be greater than zero".to_string()));
        }
        if let Some(program) = &self.indexer.program
            && program.trim().is_empty()
        {
            exn::bail!(ErrorKind::Invalid("indexer.program", "must not be empty when set".to_string()));
        }
        if self.push.service_account_path.as_os_str().is_empty() {
            exn::bail!(ErrorKind::Invalid("push.service_account_path", "must not be empty".to_string()));
        }
        Ok(())
    }
}
