use crate::core::error::CollaboratorError;
use crate::models::decision::DeletionOutcome;
use async_trait::async_trait;
use serde::Serialize;

/// Removes users from an AWS account
#[async_trait]
pub trait AccountManager: Send + Sync {
    /// Delete a user. A user that does not exist is reported as
    /// [`DeletionOutcome::NotFound`], not as an error.
    ///
    /// `account_id` does not pick the target account: the implementation
    /// acts wherever its credentials point. Implementations that know their
    /// own account must refuse a mismatching `account_id`.
    async fn delete(&self, account_id: &str, username: &str) -> Result<DeletionOutcome, CollaboratorError>;
}

/// Sends templated emails
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(
        &self,
        email_address: &str,
        template_id: &str,
        params: &NotificationParams,
    ) -> Result<(), CollaboratorError>;
}

/// Reads plain string secrets by name
#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn get_secret(&self, name: &str) -> Result<String, CollaboratorError>;
}

/// Template personalisation shared by the warning and deletion emails
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationParams {
    pub aws_account: String,
    pub iam_user: String,
    pub inactive_number_of_days: u32,
    pub max_number_of_days: u32,
}
