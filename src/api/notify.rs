use crate::api::collaborators::{NotificationParams, Notifier};
use crate::core::error::CollaboratorError;
use async_trait::async_trait;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub const DEFAULT_NOTIFY_BASE_URL: &str = "https://api.notifications.service.gov.uk";

const UUID_LEN: usize = 36;
// "{service_id}-{secret}" at the end of every Notify API key
const KEY_SUFFIX_LEN: usize = UUID_LEN * 2 + 1;

/// GOV.UK Notify email client
pub struct NotifyClient {
    client: reqwest::Client,
    base_url: String,
    service_id: String,
    secret: String,
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    iat: i64,
}

#[derive(Debug, Serialize)]
struct EmailRequest<'a> {
    email_address: &'a str,
    template_id: &'a str,
    personalisation: &'a NotificationParams,
}

#[derive(Debug, Deserialize)]
struct EmailResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<ErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct ErrorEntry {
    error: String,
    message: String,
}

impl NotifyClient {
    pub fn new(base_url: String, api_key: &str) -> Result<Self, CollaboratorError> {
        let (service_id, secret) = split_api_key(api_key)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_id,
            secret,
        })
    }

    fn bearer_token(&self) -> Result<String, CollaboratorError> {
        let iat = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| CollaboratorError::Notify(format!("System clock error: {e}")))?
            .as_secs() as i64;

        let claims = Claims {
            iss: &self.service_id,
            iat,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| CollaboratorError::Notify(format!("Failed to sign request token: {e}")))
    }
}

#[async_trait]
impl Notifier for NotifyClient {
    async fn send(
        &self,
        email_address: &str,
        template_id: &str,
        params: &NotificationParams,
    ) -> Result<(), CollaboratorError> {
        let token = self.bearer_token()?;
        let body = EmailRequest {
            email_address,
            template_id,
            personalisation: params,
        };

        let response = self
            .client
            .post(format!("{}/v2/notifications/email", self.base_url))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .and_then(|b| b.errors.into_iter().next())
                .map(|e| format!("{}: {}", e.error, e.message))
                .unwrap_or(text);

            return Err(CollaboratorError::Notify(format!(
                "Notify returned error status {status}: {detail}"
            )));
        }

        let created = response.json::<EmailResponse>().await?;
        tracing::debug!(notification_id = %created.id, template_id, "Notify accepted email");

        Ok(())
    }
}

/// Split a Notify API key into its service id and signing secret
fn split_api_key(api_key: &str) -> Result<(String, String), CollaboratorError> {
    if !api_key.is_ascii() || api_key.len() < KEY_SUFFIX_LEN {
        return Err(CollaboratorError::Notify(
            "API key is not in the expected Notify format".to_string(),
        ));
    }

    let suffix = &api_key[api_key.len() - KEY_SUFFIX_LEN..];
    let service_id = &suffix[..UUID_LEN];
    let secret = &suffix[UUID_LEN + 1..];

    Ok((service_id.to_string(), secret.to_string()))
}
