//! Configuration management for Folio.
//!
//! Parses `folio.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `server.host`
//! - `database.url`
//! - `admin.token`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override database URL.
    pub database_url: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "folio.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Page module configuration.
    pub pages: PagesConfig,
    /// Admin API configuration.
    pub admin: AdminConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 7878,
        }
    }
}

/// Database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite connection URL.
    pub url: String,
    /// Maximum pool connections.
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:folio.db".to_owned(),
            max_connections: 1,
        }
    }
}

/// Page module configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PagesConfig {
    /// Whether the page module is active. Public routes are only registered when set.
    pub enabled: bool,
    /// Directory with site-specific page layouts.
    ///
    /// Relative paths are resolved against the config file directory.
    pub site_templates_dir: Option<PathBuf>,
    /// Template assigned to pages without an inherited one.
    pub default_template: String,
    /// Layout assigned to pages without an inherited one.
    pub default_layout: String,
    /// Selectable template names.
    pub templates: Vec<String>,
    /// Selectable layout names.
    pub layouts: Vec<String>,
    /// Admin list page size.
    pub page_size: u32,
}

impl Default for PagesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            site_templates_dir: None,
            default_template: "page".to_owned(),
            default_layout: "page.html".to_owned(),
            templates: vec!["page".to_owned()],
            layouts: vec!["page.html".to_owned()],
            page_size: 50,
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Bearer token required by the admin API. `None` leaves the API open.
    pub token: Option<String>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`admin.token`").
        field: String,
        /// Error message (e.g., "${`FOLIO_TOKEN`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `folio.toml` in current directory and parents.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(url) = &settings.database_url {
            self.database.url.clone_from(url);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_database()?;
        self.validate_pages()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        Ok(())
    }

    fn validate_database(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.database.url, "database.url")?;
        if self.database.max_connections == 0 {
            return Err(ConfigError::Validation(
                "database.max_connections must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }

    fn validate_pages(&self) -> Result<(), ConfigError> {
        let pages = &self.pages;
        if pages.page_size == 0 {
            return Err(ConfigError::Validation(
                "pages.page_size must be greater than 0".to_owned(),
            ));
        }
        if !pages.templates.contains(&pages.default_template) {
            return Err(ConfigError::Validation(format!(
                "pages.default_template \"{}\" is not listed in pages.templates",
                pages.default_template
            )));
        }
        if !pages.layouts.contains(&pages.default_layout) {
            return Err(ConfigError::Validation(format!(
                "pages.default_layout \"{}\" is not listed in pages.layouts",
                pages.default_layout
            )));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;
        self.database.url = expand::expand_env(&self.database.url, "database.url")?;

        if let Some(ref token) = self.admin.token {
            self.admin.token = Some(expand::expand_env(token, "admin.token")?);
        }

        Ok(())
    }

    /// Resolve relative paths against the config file directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        if let Some(dir) = self.pages.site_templates_dir.take() {
            self.pages.site_templates_dir = Some(if dir.is_absolute() {
                dir
            } else {
                config_dir.join(dir)
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 7878);
        assert_eq!(config.database.url, "sqlite:folio.db");
        assert_eq!(config.database.max_connections, 1);
        assert!(config.pages.enabled);
        assert_eq!(config.pages.default_template, "page");
        assert_eq!(config.pages.default_layout, "page.html");
        assert_eq!(config.pages.page_size, 50);
        assert!(config.admin.token.is_none());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 7878);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[server]
host = "0.0.0.0"
port = 9000

[database]
url = "sqlite:/var/lib/folio/pages.db"
max_connections = 4

[pages]
enabled = false
site_templates_dir = "site"
default_template = "landing"
default_layout = "landing.html"
templates = ["page", "landing"]
layouts = ["page.html", "landing.html"]
page_size = 25

[admin]
token = "secret"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.database.max_connections, 4);
        assert!(!config.pages.enabled);
        assert_eq!(config.pages.site_templates_dir, Some(PathBuf::from("site")));
        assert_eq!(config.pages.templates, vec!["page", "landing"]);
        assert_eq!(config.pages.page_size, 25);
        assert_eq!(config.admin.token.as_deref(), Some("secret"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_resolves_site_templates_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("folio.toml");
        std::fs::write(&path, "[pages]\nsite_templates_dir = \"site\"\n").unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(
            config.pages.site_templates_dir,
            Some(dir.path().join("site"))
        );
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load(Some(Path::new("/nonexistent/folio.toml")), None);
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default();
        config.apply_cli_settings(&CliSettings {
            host: Some("0.0.0.0".to_owned()),
            port: Some(9090),
            database_url: Some("sqlite::memory:".to_owned()),
        });
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.database.url, "sqlite::memory:");
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default();
        config.apply_cli_settings(&CliSettings::default());
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 7878);
    }

    #[test]
    fn test_expand_env_vars_admin_token_default() {
        let mut config = Config::default();
        config.admin.token = Some("${FOLIO_TEST_UNSET_TOKEN:-local}".to_owned());
        config.expand_env_vars().unwrap();
        assert_eq!(config.admin.token.as_deref(), Some("local"));
    }

    fn assert_validation_error(config: &Config, expected: &str) {
        match config.validate() {
            Err(ConfigError::Validation(msg)) => assert!(
                msg.contains(expected),
                "expected {expected:?} in {msg:?}"
            ),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_server_port_zero() {
        let mut config = Config::default();
        config.server.port = 0;
        assert_validation_error(&config, "server.port");
    }

    #[test]
    fn test_validate_database_url_empty() {
        let mut config = Config::default();
        config.database.url = String::new();
        assert_validation_error(&config, "database.url");
    }

    #[test]
    fn test_validate_page_size_zero() {
        let mut config = Config::default();
        config.pages.page_size = 0;
        assert_validation_error(&config, "pages.page_size");
    }

    #[test]
    fn test_validate_default_template_unlisted() {
        let mut config = Config::default();
        config.pages.default_template = "missing".to_owned();
        assert_validation_error(&config, "pages.default_template");
    }

    #[test]
    fn test_validate_default_layout_unlisted() {
        let mut config = Config::default();
        config.pages.default_layout = "missing.html".to_owned();
        assert_validation_error(&config, "pages.default_layout");
    }
}
