use crate::api::collaborators::{AccountManager, NotificationParams, Notifier};
use crate::core::error::CollaboratorError;
use crate::models::decision::{ActionDecision, DeletionOutcome};
use crate::models::user::UserRecord;
use std::sync::Arc;
use tracing::{error, info};

/// Notify template ids for the two kinds of email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyTemplates {
    pub warning: String,
    pub deletion: String,
}

/// Whether the deleted user was told about it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionNotice {
    Sent,
    NoEmailAddress,
    /// The user is gone but the email could not be sent
    Failed,
}

/// Side effect actually carried out for a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Ignored or below every threshold
    None,
    /// Decision logged, collaborators skipped
    DryRun,
    WarningSent,
    Deleted { notice: DeletionNotice },
    /// Deletion requested for a user that no longer exists
    NotFound,
}

/// Carries out a decision against the account and notification APIs
pub struct ActionExecutor {
    accounts: Arc<dyn AccountManager>,
    notifier: Arc<dyn Notifier>,
    templates: NotifyTemplates,
    deletion_threshold: u32,
}

impl ActionExecutor {
    pub fn new(
        accounts: Arc<dyn AccountManager>,
        notifier: Arc<dyn Notifier>,
        templates: NotifyTemplates,
        deletion_threshold: u32,
    ) -> Self {
        Self {
            accounts,
            notifier,
            templates,
            deletion_threshold,
        }
    }

    pub async fn execute(&self, user: &UserRecord, decision: ActionDecision) -> Result<Effect, CollaboratorError> {
        match decision {
            ActionDecision::Ignored | ActionDecision::NoAction => Ok(Effect::None),
            ActionDecision::Warn => self.warn(user).await,
            ActionDecision::Delete => self.delete(user).await,
        }
    }

    async fn warn(&self, user: &UserRecord) -> Result<Effect, CollaboratorError> {
        self.notifier
            .send(&user.username, &self.templates.warning, &self.params(user))
            .await?;

        info!(
            username = %user.username,
            account_id = %user.account_id,
            "Warning notification email sent"
        );
        Ok(Effect::WarningSent)
    }

    async fn delete(&self, user: &UserRecord) -> Result<Effect, CollaboratorError> {
        info!(
            username = %user.username,
            account_id = %user.account_id,
            "Proceeding with IAM account deletion"
        );

        match self.accounts.delete(&user.account_id, &user.username).await? {
            DeletionOutcome::NotFound => {
                info!(
                    username = %user.username,
                    account_id = %user.account_id,
                    "User not found, no action taken and no email sent"
                );
                Ok(Effect::NotFound)
            }
            DeletionOutcome::Deleted if user.has_email_address() => {
                // User is already gone, a failed email only changes the notice
                let notice = match self
                    .notifier
                    .send(&user.username, &self.templates.deletion, &self.params(user))
                    .await
                {
                    Ok(()) => {
                        info!(
                            username = %user.username,
                            account_id = %user.account_id,
                            "Deletion notification email sent"
                        );
                        DeletionNotice::Sent
                    }
                    Err(e) => {
                        error!(
                            username = %user.username,
                            account_id = %user.account_id,
                            error = %e,
                            "User deleted but deletion notification email failed"
                        );
                        DeletionNotice::Failed
                    }
                };
                Ok(Effect::Deleted { notice })
            }
            DeletionOutcome::Deleted => {
                info!(
                    username = %user.username,
                    "Username does not appear to be an email address, no email sent"
                );
                Ok(Effect::Deleted {
                    notice: DeletionNotice::NoEmailAddress,
                })
            }
        }
    }

    fn params(&self, user: &UserRecord) -> NotificationParams {
        NotificationParams {
            aws_account: user.account_id.clone(),
            iam_user: user.username.clone(),
            inactive_number_of_days: user.inactivity_days,
            max_number_of_days: self.deletion_threshold,
        }
    }
}
