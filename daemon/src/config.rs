//! Daemon configuration with TOML file support.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use transcript_render::{InstitutionProfile, PageSize};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
}

/// Configuration for a transcript daemon.
///
/// Loaded from a TOML file via [`DaemonConfig::from_toml_file`]; any field
/// left out takes its default.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Directory holding the LMDB environment.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Base of the public verification and download URLs.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,

    #[serde(default = "default_institution_name")]
    pub institution_name: String,

    #[serde(default = "default_institution_subtitle")]
    pub institution_subtitle: String,

    #[serde(default = "default_issuer_line")]
    pub issuer_line: String,

    /// Worker threads for batch decisions.
    #[serde(default = "default_batch_parallelism")]
    pub batch_parallelism: usize,

    /// Audit entries per page when the caller gives no count.
    #[serde(default = "default_audit_page")]
    pub audit_page_default: usize,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// LMDB map size in MiB.
    #[serde(default = "default_map_size_mb")]
    pub map_size_mb: usize,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./transcript_data")
}

fn default_listen_port() -> u16 {
    8080
}

fn default_public_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_institution_name() -> String {
    InstitutionProfile::default().name
}

fn default_institution_subtitle() -> String {
    InstitutionProfile::default().subtitle
}

fn default_issuer_line() -> String {
    InstitutionProfile::default().issuer_line
}

fn default_batch_parallelism() -> usize {
    4
}

fn default_audit_page() -> usize {
    50
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_map_size_mb() -> usize {
    1024
}

impl DaemonConfig {
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject values the daemon cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_parallelism == 0 {
            return Err(ConfigError::Zero {
                field: "batch_parallelism",
            });
        }
        if self.audit_page_default == 0 {
            return Err(ConfigError::Zero {
                field: "audit_page_default",
            });
        }
        if self.map_size_mb == 0 {
            return Err(ConfigError::Zero {
                field: "map_size_mb",
            });
        }
        Ok(())
    }

    pub fn map_size_bytes(&self) -> usize {
        self.map_size_mb.saturating_mul(1024 * 1024)
    }

    pub fn institution(&self) -> InstitutionProfile {
        InstitutionProfile {
            name: self.institution_name.clone(),
            subtitle: self.institution_subtitle.clone(),
            issuer_line: self.issuer_line.clone(),
            page: PageSize::A4,
        }
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            listen_port: default_listen_port(),
            public_base_url: default_public_base_url(),
            institution_name: default_institution_name(),
            institution_subtitle: default_institution_subtitle(),
            issuer_line: default_issuer_line(),
            batch_parallelism: default_batch_parallelism(),
            audit_page_default: default_audit_page(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            map_size_mb: default_map_size_mb(),
        }
    }
}
