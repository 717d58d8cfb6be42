use crate::api::collaborators::SecretStore;
use crate::core::error::CollaboratorError;
use async_trait::async_trait;
use aws_sdk_secretsmanager::error::DisplayErrorContext;
use aws_sdk_secretsmanager::Client;

/// AWS Secrets Manager backed secret lookup
pub struct SecretsManagerStore {
    client: Client,
}

impl SecretsManagerStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SecretStore for SecretsManagerStore {
    async fn get_secret(&self, name: &str) -> Result<String, CollaboratorError> {
        let output = self
            .client
            .get_secret_value()
            .secret_id(name)
            .send()
            .await
            .map_err(|e| {
                CollaboratorError::Secrets(format!("GetSecretValue failed for {name}: {}", DisplayErrorContext(e)))
            })?;

        output
            .secret_string()
            .map(str::to_string)
            .ok_or_else(|| CollaboratorError::Secrets(format!("Secret {name} has no string value")))
    }
}
