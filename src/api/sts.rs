use crate::core::error::CollaboratorError;
use aws_sdk_sts::error::DisplayErrorContext;
use aws_sdk_sts::Client;

/// Account id the ambient credentials belong to, via GetCallerIdentity
pub async fn caller_account_id(client: &Client) -> Result<String, CollaboratorError> {
    let out = client
        .get_caller_identity()
        .send()
        .await
        .map_err(|e| CollaboratorError::Sts(format!("GetCallerIdentity failed: {}", DisplayErrorContext(e))))?;

    out.account()
        .map(str::to_string)
        .ok_or_else(|| CollaboratorError::Sts("GetCallerIdentity returned no account".to_string()))
}
