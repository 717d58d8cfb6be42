use crate::core::config::Config;
use crate::models::decision::DeletionScope;
use clap::Parser;
use std::path::PathBuf;

/// Warn or delete inactive IAM users listed in a CSV file
#[derive(Debug, Parser)]
#[command(name = "inactive-users", version)]
#[command(about = "Warn or delete inactive IAM users listed in a CSV file", long_about = None)]
pub struct Cli {
    /// Optional TOML config file; flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// CSV file of `account_id,username,inactivity` rows
    #[arg(long)]
    pub csv_filename: Option<PathBuf>,

    /// Comma separated usernames to leave alone
    #[arg(long)]
    pub ignore_list: Option<String>,

    /// Days of inactivity at which users are warned
    #[arg(long)]
    pub warning_threshold: Option<u32>,

    /// Days of inactivity at which users are deleted
    #[arg(long)]
    pub deletion_threshold: Option<u32>,

    /// Log decisions without deleting or emailing anyone
    #[arg(long)]
    pub dry_run: bool,

    /// Act for real even when the config file enables dry run
    #[arg(long, conflicts_with = "dry_run")]
    pub no_dry_run: bool,

    /// Treat the first CSV row as data rather than a header
    #[arg(long)]
    pub no_header: bool,

    /// Delete the whole IAM user or only their access keys
    #[arg(long, value_enum)]
    pub deletion_scope: Option<DeletionScope>,

    /// Notify API key; read from Secrets Manager when absent
    #[arg(long, env = "NOTIFY_API_KEY", hide_env_values = true)]
    pub notify_api_key: Option<String>,

    /// Notify template id for warning emails
    #[arg(long)]
    pub warning_template_id: Option<String>,

    /// Notify template id for deletion emails
    #[arg(long)]
    pub deletion_template_id: Option<String>,

    /// Secrets Manager name holding the Notify API key
    #[arg(long)]
    pub api_key_resource_name: Option<String>,

    /// Secrets Manager name holding the warning template id
    #[arg(long)]
    pub warning_template_resource_name: Option<String>,

    /// Secrets Manager name holding the deletion template id
    #[arg(long)]
    pub deletion_template_resource_name: Option<String>,

    /// AWS region for IAM and Secrets Manager
    #[arg(long)]
    pub region: Option<String>,

    #[arg(long)]
    pub log_level: Option<String>,

    /// json or console
    #[arg(long)]
    pub log_format: Option<String>,
}

impl Cli {
    /// Layer the command line over a base config
    pub fn apply(self, mut config: Config) -> Config {
        if let Some(path) = self.csv_filename {
            config.input.csv_filename = Some(path);
        }
        if self.no_header {
            config.input.has_header = false;
        }
        if let Some(ignore_list) = self.ignore_list {
            config.policy.ignore_list = ignore_list;
        }
        if let Some(warning) = self.warning_threshold {
            config.thresholds.warning = warning;
        }
        if let Some(deletion) = self.deletion_threshold {
            config.thresholds.deletion = deletion;
        }
        if self.dry_run {
            config.policy.dry_run = true;
        }
        if self.no_dry_run {
            config.policy.dry_run = false;
        }
        if let Some(scope) = self.deletion_scope {
            config.policy.deletion_scope = scope;
        }
        if let Some(api_key) = self.notify_api_key {
            config.notify.api_key = Some(api_key);
        }
        if let Some(id) = self.warning_template_id {
            config.notify.warning_template_id = Some(id);
        }
        if let Some(id) = self.deletion_template_id {
            config.notify.deletion_template_id = Some(id);
        }
        if let Some(name) = self.api_key_resource_name {
            config.secrets.api_key_resource_name = name;
        }
        if let Some(name) = self.warning_template_resource_name {
            config.secrets.warning_template_resource_name = name;
        }
        if let Some(name) = self.deletion_template_resource_name {
            config.secrets.deletion_template_resource_name = name;
        }
        if let Some(region) = self.region {
            config.aws.region = region;
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }
        config
    }
}
