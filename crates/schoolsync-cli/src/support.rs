use schoolsync_migrate::CollectionNames;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming the service-account credential file.
pub const CREDENTIALS_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";
pub const DEFAULT_STORE_ROOT: &str = ".schoolsync/projects";

/// Pre-flight failures: the run stops before any store access.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Set GOOGLE_APPLICATION_CREDENTIALS to a service account JSON file.")]
    MissingCredentials,

    #[error("failed to read credentials at {path}: {message}")]
    CredentialsUnreadable { path: String, message: String },

    #[error("failed to parse credentials JSON at {path}: {message}")]
    CredentialsInvalid { path: String, message: String },

    #[error("failed to read config at {path}: {message}")]
    ConfigUnreadable { path: String, message: String },

    #[error("failed to parse config TOML at {path}: {message}")]
    ConfigInvalid { path: String, message: String },
}

/// The parts of a credential file the tool looks at; other keys are ignored.
///
/// `type` is required so an unrelated JSON file is not mistaken for
/// credential material.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceAccount {
    #[serde(rename = "type")]
    pub account_type: String,
    #[serde(default)]
    pub project_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub path: PathBuf,
    pub account: ServiceAccount,
}

impl Credentials {
    /// Warning text when the credentials belong to another project.
    pub fn project_mismatch(&self, project: &str) -> Option<String> {
        let owner = self.account.project_id.as_deref()?;
        (owner != project).then(|| {
            format!(
                "credentials at {} belong to project `{owner}`, running against `{project}`",
                self.path.display()
            )
        })
    }
}

/// Optional TOML file config; every key has a default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub store_root: Option<String>,
    pub collections: CollectionNames,
}

pub fn credentials_from_env() -> Result<Credentials, ConfigError> {
    match std::env::var_os(CREDENTIALS_ENV) {
        Some(raw) if !raw.is_empty() => load_credentials(Path::new(&raw)),
        _ => Err(ConfigError::MissingCredentials),
    }
}

pub fn load_credentials(path: &Path) -> Result<Credentials, ConfigError> {
    let bytes = fs::read(path).map_err(|e| ConfigError::CredentialsUnreadable {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let invalid = |message: String| ConfigError::CredentialsInvalid {
        path: path.display().to_string(),
        message,
    };
    let account = serde_json::from_slice::<ServiceAccount>(&bytes)
        .map_err(|e| invalid(e.to_string()))?;
    if account.account_type.trim().is_empty() {
        return Err(invalid("credential `type` is empty".to_string()));
    }
    Ok(Credentials {
        path: path.to_path_buf(),
        account,
    })
}

pub fn load_config(path: Option<&str>) -> Result<FileConfig, ConfigError> {
    let Some(path) = path else {
        return Ok(FileConfig::default());
    };
    let text = fs::read_to_string(path).map_err(|e| ConfigError::ConfigUnreadable {
        path: path.to_string(),
        message: e.to_string(),
    })?;
    toml::from_str::<FileConfig>(&text).map_err(|e| ConfigError::ConfigInvalid {
        path: path.to_string(),
        message: e.to_string(),
    })
}

/// CLI flag first, then config file, then the default.
pub fn resolve_store_root(flag: Option<String>, config: &FileConfig) -> PathBuf {
    flag.or_else(|| config.store_root.clone())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_ROOT))
}

pub fn emit_error(message: impl std::fmt::Display) -> ! {
    eprintln!("error: {message}");
    std::process::exit(1);
}
