// Centralized error handling for the inactive user run

use thiserror::Error;

/// Fatal configuration errors, raised before any row is processed
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    MissingSetting(String),

    #[error("Invalid setting: {0}")]
    InvalidSetting(String),

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Row-scoped errors raised while turning a CSV row into a user record
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Row has {found} columns, expected at least {expected}")]
    MissingColumn { expected: usize, found: usize },

    #[error("Username column is empty")]
    EmptyUsername,

    #[error("No digits found in inactivity value '{0}'")]
    NoDigits(String),

    #[error("Inactivity value '{0}' is not a valid day count")]
    InvalidDays(String),

    #[error("Malformed CSV row: {0}")]
    Csv(#[from] csv::Error),
}

/// Row-scoped errors raised by an external API
#[derive(Error, Debug)]
pub enum CollaboratorError {
    #[error("IAM request failed: {0}")]
    Iam(String),

    #[error("Notify request failed: {0}")]
    Notify(String),

    #[error("STS request failed: {0}")]
    Sts(String),

    #[error("Row is for AWS account {row}, credentials belong to {caller}")]
    AccountMismatch { row: String, caller: String },

    #[error("Secrets Manager request failed: {0}")]
    Secrets(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Anything that can stop a single row without stopping the run
#[derive(Error, Debug)]
pub enum RowError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
}
