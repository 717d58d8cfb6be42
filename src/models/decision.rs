use serde::{Deserialize, Serialize};
use std::fmt;

/// Inactivity boundaries, in days
///
/// `warning < deletion` is the expected shape but is not enforced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct Thresholds {
    #[serde(default = "default_warning_threshold")]
    pub warning: u32,
    #[serde(default = "default_deletion_threshold")]
    pub deletion: u32,
}

fn default_warning_threshold() -> u32 {
    80
}

fn default_deletion_threshold() -> u32 {
    90
}

impl Thresholds {
    pub fn new(warning: u32, deletion: u32) -> Self {
        Self { warning, deletion }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::new(default_warning_threshold(), default_deletion_threshold())
    }
}

/// What should happen to a single user
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionDecision {
    Ignored,
    NoAction,
    Warn,
    Delete,
}

impl fmt::Display for ActionDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActionDecision::Ignored => "ignored",
            ActionDecision::NoAction => "no_action",
            ActionDecision::Warn => "warn",
            ActionDecision::Delete => "delete",
        };
        f.write_str(s)
    }
}

/// How much of an IAM user a deletion removes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DeletionScope {
    /// Tear down every credential and attachment, then the user itself
    #[default]
    User,
    /// Only delete the user's access keys
    AccessKeys,
}

/// Result of asking the account manager to delete a user
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeletionOutcome {
    Deleted,
    NotFound,
}
