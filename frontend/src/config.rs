//! Configuration management.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use signage_types::TemplateId;

use crate::api::DEFAULT_UPLOAD_URL;

/// Backend URL used when none is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:3001";

/// Configuration structure that matches the TOML file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    api: ApiConfig,
    #[serde(default)]
    editor: EditorConfig,
    #[serde(default)]
    logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ApiConfig {
    #[serde(default = "default_api_url")]
    base_url: String,
    #[serde(default = "default_upload_url")]
    upload_url: String,
    auth_token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_url(),
            upload_url: default_upload_url(),
            auth_token: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct EditorConfig {
    /// Template opened at startup
    template_id: Option<TemplateId>,
    /// Start in full-screen TV preview
    #[serde(default)]
    tv_preview: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    /// If not set, uses RUST_LOG environment variable or defaults to "info"
    log_level: Option<String>,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_upload_url() -> String {
    DEFAULT_UPLOAD_URL.to_string()
}

/// Editor configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the REST backend
    pub api_url: String,
    /// Multipart file upload endpoint
    pub upload_url: String,
    /// Bearer token sent with every backend request
    pub auth_token: Option<String>,
    pub template_id: Option<TemplateId>,
    pub tv_preview: bool,
    /// Log level (if set, overrides RUST_LOG environment variable)
    pub log_level: Option<String>,
}

impl Config {
    /// Load configuration with full priority chain: CLI args > env vars > config files > defaults.
    ///
    /// Config files are searched in this order:
    /// 1. `.signage.toml` in current directory
    /// 2. `config.toml` in user config directory (~/.config/signage-editor/ on Linux)
    pub fn from_figment(
        api_url: Option<String>,
        upload_url: Option<String>,
        template_id: Option<String>,
        auth_token: Option<String>,
    ) -> anyhow::Result<Self> {
        let local_config = std::env::current_dir()
            .ok()
            .map(|d| d.join(".signage.toml"));
        let user_config = directories::ProjectDirs::from("", "", "signage-editor")
            .map(|dirs| dirs.config_dir().join("config.toml"));

        // Priority: defaults < user config < local config < env vars < CLI args
        let mut figment = Figment::new().merge(Serialized::defaults(ConfigFile::default()));

        if let Some(ref path) = user_config {
            if path.exists() {
                figment = figment.merge(Toml::file(path));
            }
        }

        if let Some(ref path) = local_config {
            if path.exists() {
                figment = figment.merge(Toml::file(path));
            }
        }

        // SIGNAGE_API__BASE_URL -> api.base_url
        figment = figment.merge(
            Env::prefixed("SIGNAGE_").map(|key| key.as_str().replace("__", ".").into()),
        );

        if let Some(ref url) = api_url {
            figment = figment.merge(Serialized::default("api.base_url", url));
        }
        if let Some(ref url) = upload_url {
            figment = figment.merge(Serialized::default("api.upload_url", url));
        }
        if let Some(ref token) = auth_token {
            figment = figment.merge(Serialized::default("api.auth_token", token));
        }
        if let Some(ref id) = template_id {
            figment = figment.merge(Serialized::default("editor.template_id", id));
        }

        let config_file: ConfigFile = figment.extract()?;

        Ok(Self {
            api_url: config_file.api.base_url,
            upload_url: config_file.api.upload_url,
            auth_token: config_file.api.auth_token.filter(|t| !t.is_empty()),
            template_id: config_file
                .editor
                .template_id
                .filter(|id| !id.as_str().is_empty()),
            tv_preview: config_file.editor.tv_preview,
            log_level: config_file.logging.log_level,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            upload_url: default_upload_url(),
            auth_token: None,
            template_id: None,
            tv_preview: false,
            log_level: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    const ENV_VARS: [&str; 3] = [
        "SIGNAGE_API__BASE_URL",
        "SIGNAGE_EDITOR__TEMPLATE_ID",
        "SIGNAGE_LOGGING__LOG_LEVEL",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
    }

    /// Run `f` with the working directory set to `dir`.
    fn in_dir<T>(dir: &TempDir, f: impl FnOnce() -> T) -> T {
        let original_dir = std::env::current_dir().unwrap();
        std::env::set_current_dir(dir).unwrap();
        let result = f();
        // Restore before the temp dir is dropped (ignore errors)
        let _ = std::env::set_current_dir(original_dir);
        result
    }

    #[test]
    #[serial]
    fn test_from_figment_defaults() {
        clear_env();
        let temp_dir = TempDir::new().unwrap();

        let config = in_dir(&temp_dir, || Config::from_figment(None, None, None, None)).unwrap();

        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.upload_url, DEFAULT_UPLOAD_URL);
        assert!(config.template_id.is_none());
        assert!(!config.tv_preview);
    }

    #[test]
    #[serial]
    fn test_from_figment_config_file() {
        clear_env();
        let temp_dir = TempDir::new().unwrap();
        let config_content = r#"
[api]
base_url = "https://signage.example/api"
auth_token = "secret"

[editor]
template_id = "tpl-42"
tv_preview = true

[logging]
log_level = "debug"
"#;
        fs::write(temp_dir.path().join(".signage.toml"), config_content).unwrap();

        let config = in_dir(&temp_dir, || Config::from_figment(None, None, None, None)).unwrap();

        assert_eq!(config.api_url, "https://signage.example/api");
        assert_eq!(config.auth_token.as_deref(), Some("secret"));
        assert_eq!(config.template_id, Some(TemplateId::from("tpl-42")));
        assert!(config.tv_preview);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        // Unset keys keep their defaults.
        assert_eq!(config.upload_url, DEFAULT_UPLOAD_URL);
    }

    #[test]
    #[serial]
    fn test_env_overrides_file_and_cli_overrides_env() {
        clear_env();
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(".signage.toml"),
            "[api]\nbase_url = \"http://from-file\"\n[editor]\ntemplate_id = \"file\"",
        )
        .unwrap();
        std::env::set_var("SIGNAGE_API__BASE_URL", "http://from-env");
        std::env::set_var("SIGNAGE_EDITOR__TEMPLATE_ID", "77");

        let env_only = in_dir(&temp_dir, || Config::from_figment(None, None, None, None)).unwrap();
        let with_cli = in_dir(&temp_dir, || {
            Config::from_figment(Some("http://from-cli".into()), None, Some("cli".into()), None)
        })
        .unwrap();

        clear_env();

        assert_eq!(env_only.api_url, "http://from-env");
        // Numeric ids from the environment are accepted as well.
        assert_eq!(env_only.template_id, Some(TemplateId::from("77")));
        assert_eq!(with_cli.api_url, "http://from-cli");
        assert_eq!(with_cli.template_id, Some(TemplateId::from("cli")));
    }

    #[test]
    #[serial]
    fn test_empty_token_is_ignored() {
        clear_env();
        let temp_dir = TempDir::new().unwrap();

        let config = in_dir(&temp_dir, || {
            Config::from_figment(None, None, None, Some(String::new()))
        })
        .unwrap();

        assert!(config.auth_token.is_none());
    }
}
