use crate::api::notify::DEFAULT_NOTIFY_BASE_URL;
use crate::core::error::ConfigError;
use crate::models::decision::{DeletionScope, Thresholds};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub secrets: SecretsConfig,
    #[serde(default)]
    pub aws: AwsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    pub csv_filename: Option<PathBuf>,
    #[serde(default = "default_has_header")]
    pub has_header: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PolicyConfig {
    #[serde(default)]
    pub ignore_list: String,
    #[serde(default)]
    pub deletion_scope: DeletionScope,
    #[serde(default)]
    pub dry_run: bool,
}

/// Notify credentials. Anything left unset is read from Secrets Manager.
#[derive(Debug, Clone, Deserialize)]
pub struct NotifyConfig {
    #[serde(default = "default_notify_base_url")]
    pub base_url: String,
    pub api_key: Option<String>,
    pub warning_template_id: Option<String>,
    pub deletion_template_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecretsConfig {
    #[serde(default = "default_api_key_resource_name")]
    pub api_key_resource_name: String,
    #[serde(default = "default_deletion_template_resource_name")]
    pub deletion_template_resource_name: String,
    #[serde(default = "default_warning_template_resource_name")]
    pub warning_template_resource_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AwsConfig {
    #[serde(default = "default_region")]
    pub region: String,
    /// Refuse deletions for rows whose account is not the caller's
    #[serde(default = "default_require_matching_account")]
    pub require_matching_account: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_has_header() -> bool {
    true
}

fn default_require_matching_account() -> bool {
    true
}

fn default_notify_base_url() -> String {
    DEFAULT_NOTIFY_BASE_URL.to_string()
}

fn default_api_key_resource_name() -> String {
    "ccs_user_management_notify_api_key".to_string()
}

fn default_deletion_template_resource_name() -> String {
    "ccs_user_management_notify_deletion_template".to_string()
}

fn default_warning_template_resource_name() -> String {
    "ccs_user_management_notify_warning_template".to_string()
}

fn default_region() -> String {
    "eu-west-2".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            csv_filename: None,
            has_header: default_has_header(),
        }
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            base_url: default_notify_base_url(),
            api_key: None,
            warning_template_id: None,
            deletion_template_id: None,
        }
    }
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self {
            api_key_resource_name: default_api_key_resource_name(),
            deletion_template_resource_name: default_deletion_template_resource_name(),
            warning_template_resource_name: default_warning_template_resource_name(),
        }
    }
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            require_matching_account: default_require_matching_account(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input.csv_filename.is_none() {
            return Err(ConfigError::MissingSetting("csv_filename".to_string()));
        }

        if self.notify.base_url.is_empty() {
            return Err(ConfigError::InvalidSetting("notify base_url must not be empty".to_string()));
        }

        let secrets = [
            ("api_key_resource_name", &self.secrets.api_key_resource_name),
            ("deletion_template_resource_name", &self.secrets.deletion_template_resource_name),
            ("warning_template_resource_name", &self.secrets.warning_template_resource_name),
        ];
        for (name, value) in secrets {
            if value.is_empty() {
                return Err(ConfigError::InvalidSetting(format!("{name} must not be empty")));
            }
        }

        if self.aws.region.is_empty() {
            return Err(ConfigError::InvalidSetting("aws region must not be empty".to_string()));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::InvalidSetting(format!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.logging.level
            )));
        }

        let valid_formats = ["json", "console"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(ConfigError::InvalidSetting(format!(
                "Invalid log format '{}'. Must be one of: json, console",
                self.logging.format
            )));
        }

        Ok(())
    }
}
