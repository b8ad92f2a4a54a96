use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result, bail};
use kanban_core::SortOptions;
use kanban_store_http::{DEFAULT_BASE_URL, DEFAULT_OWNER_ID, DEFAULT_TIMEOUT, GatewayConfig};
use serde::Deserialize;
use url::Url;

const CONFIG_DIR: &str = "kanban";
const CONFIG_FILE: &str = "config.toml";

/// Environment variable overriding `api.base_url`.
pub const API_URL_ENV: &str = "KANBAN_API_URL";

/// Top-level configuration loaded from `<config dir>/kanban/config.toml`.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct ProjectConfig {
    /// Upstream connection settings.
    #[serde(default)]
    pub api: ApiConfig,
    /// Board behaviour.
    #[serde(default)]
    pub board: BoardConfig,
}

impl ProjectConfig {
    /// Load the explicit file when given, otherwise the per-user file, then
    /// apply the `KANBAN_API_URL` override.
    ///
    /// # Errors
    /// Returns an error when an explicit file is missing, a file cannot be
    /// read or parsed, or the resulting settings are invalid.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config = match explicit {
            Some(path) => {
                if !path.exists() {
                    bail!("config file {} does not exist", path.display());
                }
                Self::from_path(path)?
            }
            None => match default_config_path() {
                Some(path) => Self::from_path(&path)?,
                None => Self::default(),
            },
        };
        let config = config.with_api_url_override(env::var(API_URL_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `path`; a missing file yields defaults.
    ///
    /// # Errors
    /// Returns an error when the file cannot be read or parsed, or holds
    /// invalid settings.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
        let config: Self =
            toml::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Replace the base URL when `value` is a non-blank string.
    #[must_use]
    pub fn with_api_url_override(mut self, value: Option<String>) -> Self {
        if let Some(url) = value.map(|raw| raw.trim().to_owned()).filter(|url| !url.is_empty()) {
            self.api.base_url = url;
        }
        self
    }

    /// Check every setting that can be wrong independently of the network.
    ///
    /// # Errors
    /// Returns an error naming the offending key.
    pub fn validate(&self) -> Result<()> {
        self.api.base_url()?;
        if self.api.timeout_secs == 0 {
            bail!("api.timeout_secs must be greater than zero");
        }
        Ok(())
    }

    /// Gateway settings derived from `[api]` and `[board]`.
    ///
    /// # Errors
    /// Returns an error when `api.base_url` is invalid.
    pub fn gateway_config(&self) -> Result<GatewayConfig> {
        let mut gateway = GatewayConfig::new(self.api.base_url()?);
        gateway.timeout = self.api.timeout();
        gateway.owner_id = self.api.owner_id;
        gateway.preserve_local_fields = self.board.preserve_local_fields;
        Ok(gateway)
    }
}

/// Per-user config file location, if the platform has a config directory.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}

/// `[api]` block.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ApiConfig {
    /// Upstream root URL.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Placeholder owner id sent with created records.
    pub owner_id: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            owner_id: DEFAULT_OWNER_ID,
        }
    }
}

impl ApiConfig {
    /// Parsed base URL.
    ///
    /// # Errors
    /// Returns an error unless the value is an absolute http(s) URL.
    pub fn base_url(&self) -> Result<Url> {
        let url = Url::parse(self.base_url.trim())
            .with_context(|| format!("api.base_url '{}' is not a valid URL", self.base_url))?;
        if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
            bail!("api.base_url '{}' must be an http or https URL", self.base_url);
        }
        Ok(url)
    }

    /// Request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// `[board]` block.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BoardConfig {
    /// Keep client-only fields of creates and updates that the upstream
    /// cannot store.
    pub preserve_local_fields: bool,
    /// Sort applied at start-up and restored by clearing filters.
    pub default_sort: SortOptions,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            preserve_local_fields: true,
            default_sort: SortOptions::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kanban_core::{SortDirection, SortField};
    use std::io::Write;
    use tempfile::tempdir;

    fn write_config(dir: &Path, body: &str) -> Result<PathBuf> {
        let path = dir.join(CONFIG_FILE);
        let mut file = fs::File::create(&path)?;
        writeln!(file, "{body}")?;
        Ok(path)
    }

    #[test]
    fn missing_config_returns_defaults() -> Result<()> {
        let dir = tempdir()?;
        let cfg = ProjectConfig::from_path(dir.path().join(CONFIG_FILE))?;
        assert_eq!(cfg, ProjectConfig::default());
        assert_eq!(cfg.api.base_url, "https://dummyjson.com");
        assert_eq!(cfg.api.timeout_secs, 10);
        assert!(cfg.board.preserve_local_fields);
        assert_eq!(cfg.board.default_sort, SortOptions::default());
        Ok(())
    }

    #[test]
    fn load_full_config() -> Result<()> {
        let dir = tempdir()?;
        let path = write_config(
            dir.path(),
            "[api]\nbase_url = \"http://localhost:4000/api\"\ntimeout_secs = 3\nowner_id = 7\n\n[board]\npreserve_local_fields = false\ndefault_sort = { field = \"priority\", direction = \"desc\" }",
        )?;

        let cfg = ProjectConfig::from_path(&path)?;
        assert_eq!(cfg.api.owner_id, 7);
        assert!(!cfg.board.preserve_local_fields);
        assert_eq!(
            cfg.board.default_sort,
            SortOptions::new(SortField::Priority, SortDirection::Desc)
        );

        let gateway = cfg.gateway_config()?;
        assert_eq!(gateway.base_url.as_str(), "http://localhost:4000/api");
        assert_eq!(gateway.timeout, Duration::from_secs(3));
        assert_eq!(gateway.owner_id, 7);
        assert!(!gateway.preserve_local_fields);
        Ok(())
    }

    #[test]
    fn partial_sections_keep_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = write_config(dir.path(), "[board]\ndefault_sort = { field = \"createdAt\" }")?;

        let cfg = ProjectConfig::from_path(&path)?;
        assert_eq!(cfg.api, ApiConfig::default());
        assert!(cfg.board.preserve_local_fields);
        assert_eq!(cfg.board.default_sort, SortOptions::asc(SortField::CreatedAt));
        Ok(())
    }

    #[test]
    fn zero_timeout_is_rejected() -> Result<()> {
        let dir = tempdir()?;
        let path = write_config(dir.path(), "[api]\ntimeout_secs = 0")?;

        let Err(err) = ProjectConfig::from_path(&path) else {
            panic!("zero timeout should error");
        };
        assert!(err.to_string().contains("api.timeout_secs"));
        Ok(())
    }

    #[test]
    fn non_http_base_url_is_rejected() -> Result<()> {
        let dir = tempdir()?;
        let path = write_config(dir.path(), "[api]\nbase_url = \"ftp://example.com\"")?;

        let Err(err) = ProjectConfig::from_path(&path) else {
            panic!("ftp base url should error");
        };
        assert!(err.to_string().contains("must be an http or https URL"));
        Ok(())
    }

    #[test]
    fn malformed_toml_names_the_file() -> Result<()> {
        let dir = tempdir()?;
        let path = write_config(dir.path(), "[api\nbase_url = 1")?;

        let Err(err) = ProjectConfig::from_path(&path) else {
            panic!("malformed toml should error");
        };
        assert!(err.to_string().contains("failed to parse"));
        Ok(())
    }

    #[test]
    fn explicit_missing_file_is_an_error() -> Result<()> {
        let dir = tempdir()?;
        let missing = dir.path().join("absent.toml");
        let Err(err) = ProjectConfig::load(Some(&missing)) else {
            panic!("explicit missing file should error");
        };
        assert!(err.to_string().contains("does not exist"));
        Ok(())
    }

    #[test]
    fn url_override_ignores_blank_values() {
        let cfg = ProjectConfig::default().with_api_url_override(Some("  ".into()));
        assert_eq!(cfg.api.base_url, DEFAULT_BASE_URL);

        let cfg = cfg.with_api_url_override(Some(" http://127.0.0.1:9000 ".into()));
        assert_eq!(cfg.api.base_url, "http://127.0.0.1:9000");

        let cfg = cfg.with_api_url_override(None);
        assert_eq!(cfg.api.base_url, "http://127.0.0.1:9000");
    }
}
