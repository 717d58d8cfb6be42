use anyhow::{Context, Result};
use aws_config::{BehaviorVersion, Region};
use std::sync::Arc;
use tracing::info;

use crate::api::collaborators::SecretStore;
use crate::api::iam::IamAccountManager;
use crate::api::notify::NotifyClient;
use crate::api::secrets::SecretsManagerStore;
use crate::api::sts::caller_account_id;
use crate::core::config::Config;
use crate::input::csv_rows::CsvRows;
use crate::pipeline::executor::{ActionExecutor, NotifyTemplates};
use crate::pipeline::runner::{RowPipeline, RunSummary};
use crate::policy::ignore_list::IgnoreList;

/// Notify API key plus template ids, however they were sourced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyCredentials {
    pub api_key: String,
    pub templates: NotifyTemplates,
}

async fn value_or_secret(value: &Option<String>, secret_name: &str, store: &dyn SecretStore) -> Result<String> {
    match value {
        Some(v) => Ok(v.clone()),
        None => {
            info!(secret_name, "Fetching value from Secrets Manager");
            store
                .get_secret(secret_name)
                .await
                .with_context(|| format!("Failed to fetch secret '{secret_name}'"))
        }
    }
}

/// Use explicit values where configured, Secrets Manager for the rest
pub async fn resolve_notify_credentials(config: &Config, store: &dyn SecretStore) -> Result<NotifyCredentials> {
    let api_key = value_or_secret(&config.notify.api_key, &config.secrets.api_key_resource_name, store).await?;
    let warning = value_or_secret(
        &config.notify.warning_template_id,
        &config.secrets.warning_template_resource_name,
        store,
    )
    .await?;
    let deletion = value_or_secret(
        &config.notify.deletion_template_id,
        &config.secrets.deletion_template_resource_name,
        store,
    )
    .await?;

    Ok(NotifyCredentials {
        api_key,
        templates: NotifyTemplates { warning, deletion },
    })
}

/// Build the pipeline with live collaborators, or a dry one
pub async fn build_pipeline(config: &Config) -> Result<RowPipeline> {
    let ignore_list = IgnoreList::parse(&config.policy.ignore_list);

    if config.policy.dry_run {
        info!("Dry run enabled, no users will be deleted or emailed");
        return Ok(RowPipeline::dry_run(config.thresholds, ignore_list));
    }

    let shared_config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.aws.region.clone()))
        .load()
        .await;

    let store = SecretsManagerStore::new(aws_sdk_secretsmanager::Client::new(&shared_config));
    let credentials = resolve_notify_credentials(config, &store)
        .await
        .context("Failed to resolve Notify credentials")?;

    let notifier = NotifyClient::new(config.notify.base_url.clone(), &credentials.api_key)
        .context("Failed to create Notify client")?;

    let mut accounts = IamAccountManager::new(
        aws_sdk_iam::Client::new(&shared_config),
        config.policy.deletion_scope,
    );

    if config.aws.require_matching_account {
        let caller = caller_account_id(&aws_sdk_sts::Client::new(&shared_config))
            .await
            .context("Failed to look up the AWS account of the current credentials")?;
        info!(caller_account = %caller, "Deletions limited to rows for this account");
        accounts = accounts.for_account(caller);
    }

    info!(
        region = %config.aws.region,
        deletion_scope = ?config.policy.deletion_scope,
        "Collaborators initialized"
    );

    let executor = ActionExecutor::new(
        Arc::new(accounts),
        Arc::new(notifier),
        credentials.templates,
        config.thresholds.deletion,
    );

    Ok(RowPipeline::new(config.thresholds, ignore_list, executor))
}

/// One full pass over the configured CSV file
pub async fn run(config: &Config) -> Result<RunSummary> {
    let csv_filename = config
        .input
        .csv_filename
        .as_ref()
        .context("csv_filename is not configured")?;

    let rows = CsvRows::from_path(csv_filename, config.input.has_header)
        .with_context(|| format!("Failed to open CSV file '{}'", csv_filename.display()))?;

    let pipeline = build_pipeline(config).await?;

    info!(
        csv_filename = %csv_filename.display(),
        warning_threshold = config.thresholds.warning,
        deletion_threshold = config.thresholds.deletion,
        has_header = config.input.has_header,
        "Processing inactive users"
    );

    // Per-row outcomes are already logged by the pipeline
    let summary = pipeline.run(rows, |_| {}).await;
    Ok(summary)
}
