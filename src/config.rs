use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const APP_DIR: &str = "mediacenter-tui";
pub const DEFAULT_SERVER_URL: &str = "http://192.168.1.100:8600";
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 2_000;

const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub server_url: String,
    pub probe_timeout_ms: u64,
    /// Argv template for the external viewer; `{url}` and `{title}` are substituted.
    pub viewer_command: Option<Vec<String>>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_owned(),
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
            viewer_command: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn default_location() -> Result<Self> {
        Ok(Self::at(scoped_path(CONFIG_FILE)?))
    }

    #[must_use]
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<ServerConfig> {
        if !self.path.exists() {
            return Ok(ServerConfig::default());
        }

        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed reading config at {}", self.path.display()))?;
        let parsed = serde_json::from_str::<ServerConfig>(&raw)
            .with_context(|| format!("failed parsing config at {}", self.path.display()))?;
        Ok(parsed)
    }

    pub fn save(&self, config: &ServerConfig) -> Result<()> {
        ensure_parent_dir(&self.path)?;

        let payload = serde_json::to_string_pretty(config).context("failed serializing config")?;
        fs::write(&self.path, payload)
            .with_context(|| format!("failed writing config at {}", self.path.display()))?;
        log::info!("saved config to {}", self.path.display());
        Ok(())
    }

    pub fn reset(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                log::info!("removed config at {}", self.path.display());
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err)
                .with_context(|| format!("failed removing config at {}", self.path.display())),
        }
    }
}

/// Checks a user-entered base address before it is persisted.
pub fn validate_server_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("server URL must not be empty"));
    }

    let parsed =
        url::Url::parse(trimmed).with_context(|| format!("invalid server URL '{trimmed}'"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(anyhow!(
            "unsupported scheme '{}', expected http or https",
            parsed.scheme()
        ));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(anyhow!("server URL '{trimmed}' has no host"));
    }

    // Keep the user's spelling; Url::to_string would append a trailing slash
    // and the port substitution works on the raw text.
    Ok(trimmed.to_owned())
}

pub fn data_root() -> Result<PathBuf> {
    dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .context("unable to determine user data directory")
}

pub fn scoped_path(file: &str) -> Result<PathBuf> {
    Ok(data_root()?.join(APP_DIR).join(file))
}

pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed creating directory {}", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{
        ConfigStore, DEFAULT_PROBE_TIMEOUT_MS, DEFAULT_SERVER_URL, ServerConfig,
        validate_server_url,
    };

    fn temp_store() -> (tempfile::TempDir, ConfigStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ConfigStore::at(dir.path().join("nested").join("config.json"));
        (dir, store)
    }

    #[test]
    fn missing_file_loads_defaults() {
        let (_dir, store) = temp_store();
        let config = store.load().expect("load");
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
        assert_eq!(config.probe_timeout_ms, DEFAULT_PROBE_TIMEOUT_MS);
        assert!(config.viewer_command.is_none());
    }

    #[test]
    fn saved_config_is_loaded_back() {
        let (_dir, store) = temp_store();
        let config = ServerConfig {
            server_url: "http://media.lan:8600".to_owned(),
            probe_timeout_ms: 750,
            viewer_command: Some(vec!["firefox".to_owned(), "{url}".to_owned()]),
        };
        store.save(&config).expect("save");
        assert_eq!(store.load().expect("load"), config);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let (_dir, store) = temp_store();
        super::ensure_parent_dir(store.path()).expect("mkdir");
        std::fs::write(store.path(), r#"{ "server_url": "http://tv.lan:8600" }"#).expect("write");

        let config = store.load().expect("load");
        assert_eq!(config.server_url, "http://tv.lan:8600");
        assert_eq!(config.probe_timeout_ms, DEFAULT_PROBE_TIMEOUT_MS);
    }

    #[test]
    fn corrupt_file_reports_path() {
        let (_dir, store) = temp_store();
        super::ensure_parent_dir(store.path()).expect("mkdir");
        std::fs::write(store.path(), "not json").expect("write");

        let err = store.load().expect_err("corrupt config must fail");
        assert!(format!("{err:#}").contains("failed parsing config"));
    }

    #[test]
    fn reset_reverts_to_defaults_and_tolerates_missing_file() {
        let (_dir, store) = temp_store();
        store.reset().expect("reset without file");

        let config = ServerConfig {
            server_url: "http://other:8600".to_owned(),
            ..ServerConfig::default()
        };
        store.save(&config).expect("save");
        store.reset().expect("reset");
        assert_eq!(store.load().expect("load"), ServerConfig::default());
    }

    #[test]
    fn server_url_validation() {
        assert_eq!(
            validate_server_url("  http://10.0.0.5:8600  ").expect("valid"),
            "http://10.0.0.5:8600"
        );
        assert!(validate_server_url("https://media.example.com").is_ok());
        assert!(validate_server_url("").is_err());
        assert!(validate_server_url("rtsp://10.0.0.5:554").is_err());
        assert!(validate_server_url("10.0.0.5:8600").is_err());
    }
}
