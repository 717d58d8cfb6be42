use crate::api::collaborators::AccountManager;
use crate::core::error::CollaboratorError;
use crate::models::decision::{DeletionOutcome, DeletionScope};
use async_trait::async_trait;
use aws_sdk_iam::error::DisplayErrorContext;
use aws_sdk_iam::Client;
use tracing::info;

/// Deletes IAM users, or just their access keys, using ambient AWS credentials
///
/// IAM calls always land in the credentials' account. With
/// [`IamAccountManager::for_account`] set, rows for any other account are
/// refused before a request is made.
pub struct IamAccountManager {
    client: Client,
    scope: DeletionScope,
    caller_account: Option<String>,
}

/// Refuse a row whose account differs from the credentials' account
pub fn check_account(caller_account: Option<&str>, row_account: &str) -> Result<(), CollaboratorError> {
    match caller_account {
        Some(caller) if caller != row_account => Err(CollaboratorError::AccountMismatch {
            row: row_account.to_string(),
            caller: caller.to_string(),
        }),
        _ => Ok(()),
    }
}

fn iam_error(action: &str, username: &str, err: impl std::error::Error) -> CollaboratorError {
    CollaboratorError::Iam(format!(
        "{action} failed for {username}: {}",
        DisplayErrorContext(err)
    ))
}

impl IamAccountManager {
    pub fn new(client: Client, scope: DeletionScope) -> Self {
        Self {
            client,
            scope,
            caller_account: None,
        }
    }

    pub fn for_account(mut self, caller_account: String) -> Self {
        self.caller_account = Some(caller_account);
        self
    }

    async fn user_exists(&self, username: &str) -> Result<bool, CollaboratorError> {
        match self.client.get_user().user_name(username).send().await {
            Ok(_) => Ok(true),
            Err(e) => {
                let service_err = e.into_service_error();
                if service_err.is_no_such_entity_exception() {
                    Ok(false)
                } else {
                    Err(iam_error("GetUser", username, service_err))
                }
            }
        }
    }

    async fn delete_login_profile(&self, username: &str) -> Result<(), CollaboratorError> {
        match self.client.delete_login_profile().user_name(username).send().await {
            Ok(_) => {
                info!(username, "Deleted login profile");
                Ok(())
            }
            Err(e) => {
                let service_err = e.into_service_error();
                if service_err.is_no_such_entity_exception() {
                    info!(username, "User has no login profile, continuing");
                    Ok(())
                } else {
                    Err(iam_error("DeleteLoginProfile", username, service_err))
                }
            }
        }
    }

    async fn delete_access_keys(&self, username: &str) -> Result<(), CollaboratorError> {
        let keys = self
            .client
            .list_access_keys()
            .user_name(username)
            .send()
            .await
            .map_err(|e| iam_error("ListAccessKeys", username, e))?;

        for key in keys.access_key_metadata() {
            if let Some(key_id) = key.access_key_id() {
                self.client
                    .delete_access_key()
                    .user_name(username)
                    .access_key_id(key_id)
                    .send()
                    .await
                    .map_err(|e| iam_error("DeleteAccessKey", username, e))?;
            }
        }

        info!(username, count = keys.access_key_metadata().len(), "Deleted access keys");
        Ok(())
    }

    async fn delete_signing_certificates(&self, username: &str) -> Result<(), CollaboratorError> {
        let certs = self
            .client
            .list_signing_certificates()
            .user_name(username)
            .send()
            .await
            .map_err(|e| iam_error("ListSigningCertificates", username, e))?;

        for cert in certs.certificates() {
            self.client
                .delete_signing_certificate()
                .user_name(username)
                .certificate_id(cert.certificate_id())
                .send()
                .await
                .map_err(|e| iam_error("DeleteSigningCertificate", username, e))?;
        }

        info!(username, count = certs.certificates().len(), "Deleted signing certificates");
        Ok(())
    }

    async fn delete_ssh_public_keys(&self, username: &str) -> Result<(), CollaboratorError> {
        let keys = self
            .client
            .list_ssh_public_keys()
            .user_name(username)
            .send()
            .await
            .map_err(|e| iam_error("ListSSHPublicKeys", username, e))?;

        for key in keys.ssh_public_keys() {
            self.client
                .delete_ssh_public_key()
                .user_name(username)
                .ssh_public_key_id(key.ssh_public_key_id())
                .send()
                .await
                .map_err(|e| iam_error("DeleteSSHPublicKey", username, e))?;
        }

        info!(username, count = keys.ssh_public_keys().len(), "Deleted SSH public keys");
        Ok(())
    }

    async fn delete_service_specific_credentials(&self, username: &str) -> Result<(), CollaboratorError> {
        let creds = self
            .client
            .list_service_specific_credentials()
            .user_name(username)
            .send()
            .await
            .map_err(|e| iam_error("ListServiceSpecificCredentials", username, e))?;

        for cred in creds.service_specific_credentials() {
            self.client
                .delete_service_specific_credential()
                .user_name(username)
                .service_specific_credential_id(cred.service_specific_credential_id())
                .send()
                .await
                .map_err(|e| iam_error("DeleteServiceSpecificCredential", username, e))?;
        }

        info!(
            username,
            count = creds.service_specific_credentials().len(),
            "Deleted service specific credentials"
        );
        Ok(())
    }

    async fn delete_inline_policies(&self, username: &str) -> Result<(), CollaboratorError> {
        let policies = self
            .client
            .list_user_policies()
            .user_name(username)
            .send()
            .await
            .map_err(|e| iam_error("ListUserPolicies", username, e))?;

        for policy_name in policies.policy_names() {
            self.client
                .delete_user_policy()
                .user_name(username)
                .policy_name(policy_name)
                .send()
                .await
                .map_err(|e| iam_error("DeleteUserPolicy", username, e))?;
        }

        info!(username, count = policies.policy_names().len(), "Deleted inline policies");
        Ok(())
    }

    async fn delete_mfa_devices(&self, username: &str) -> Result<(), CollaboratorError> {
        let devices = self
            .client
            .list_mfa_devices()
            .user_name(username)
            .send()
            .await
            .map_err(|e| iam_error("ListMFADevices", username, e))?;

        for device in devices.mfa_devices() {
            let serial = device.serial_number();
            self.client
                .deactivate_mfa_device()
                .user_name(username)
                .serial_number(serial)
                .send()
                .await
                .map_err(|e| iam_error("DeactivateMFADevice", username, e))?;
            self.client
                .delete_virtual_mfa_device()
                .serial_number(serial)
                .send()
                .await
                .map_err(|e| iam_error("DeleteVirtualMFADevice", username, e))?;
        }

        info!(username, count = devices.mfa_devices().len(), "Deleted MFA devices");
        Ok(())
    }

    async fn detach_managed_policies(&self, username: &str) -> Result<(), CollaboratorError> {
        let attached = self
            .client
            .list_attached_user_policies()
            .user_name(username)
            .send()
            .await
            .map_err(|e| iam_error("ListAttachedUserPolicies", username, e))?;

        for policy in attached.attached_policies() {
            if let Some(arn) = policy.policy_arn() {
                self.client
                    .detach_user_policy()
                    .user_name(username)
                    .policy_arn(arn)
                    .send()
                    .await
                    .map_err(|e| iam_error("DetachUserPolicy", username, e))?;
            }
        }

        info!(username, count = attached.attached_policies().len(), "Detached managed policies");
        Ok(())
    }

    async fn remove_from_groups(&self, username: &str) -> Result<(), CollaboratorError> {
        let groups = self
            .client
            .list_groups_for_user()
            .user_name(username)
            .send()
            .await
            .map_err(|e| iam_error("ListGroupsForUser", username, e))?;

        for group in groups.groups() {
            self.client
                .remove_user_from_group()
                .user_name(username)
                .group_name(group.group_name())
                .send()
                .await
                .map_err(|e| iam_error("RemoveUserFromGroup", username, e))?;
        }

        info!(username, count = groups.groups().len(), "Removed user from groups");
        Ok(())
    }

    /// IAM refuses to delete a user that still owns credentials or
    /// attachments, so everything is stripped first.
    async fn delete_user(&self, username: &str) -> Result<(), CollaboratorError> {
        self.delete_login_profile(username).await?;
        self.delete_access_keys(username).await?;
        self.delete_signing_certificates(username).await?;
        self.delete_ssh_public_keys(username).await?;
        self.delete_service_specific_credentials(username).await?;
        self.delete_inline_policies(username).await?;
        self.delete_mfa_devices(username).await?;
        self.detach_managed_policies(username).await?;
        self.remove_from_groups(username).await?;

        self.client
            .delete_user()
            .user_name(username)
            .send()
            .await
            .map_err(|e| iam_error("DeleteUser", username, e))?;

        Ok(())
    }
}

#[async_trait]
impl AccountManager for IamAccountManager {
    async fn delete(&self, account_id: &str, username: &str) -> Result<DeletionOutcome, CollaboratorError> {
        check_account(self.caller_account.as_deref(), account_id)?;

        if !self.user_exists(username).await? {
            info!(username, account_id, "Could not find user, no action taken");
            return Ok(DeletionOutcome::NotFound);
        }

        match self.scope {
            DeletionScope::User => {
                self.delete_user(username).await?;
                info!(username, account_id, "Deleted IAM user");
            }
            DeletionScope::AccessKeys => {
                self.delete_access_keys(username).await?;
                info!(username, account_id, "Deleted IAM user access keys");
            }
        }

        Ok(DeletionOutcome::Deleted)
    }
}
