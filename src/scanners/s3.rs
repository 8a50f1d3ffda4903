//! Bucket discovery.
//!
//! Bucket names come from the `spacelift-infra-s3` stack; the per-bucket
//! configuration (versioning, encryption, lifecycle, public access block,
//! CORS) is probed directly so the converter only imports resources that
//! actually exist. S3 reports absent configuration as an error, so the
//! probes map the well-known error codes back to "not configured".

use anyhow::{Context, Result};
use aws_config::SdkConfig;
use aws_sdk_s3::error::ProvideErrorMetadata;
use aws_sdk_s3::types::{
    BucketVersioningStatus, CorsRule, ExpirationStatus, LifecycleRule, ServerSideEncryption,
};
use tracing::info;

use super::cloudformation::StackResourceLookup;
use crate::converters::s3::{BucketState, S3Terraformer};

const STACK: &str = "spacelift-infra-s3";

const BUCKET_LOGICAL_IDS: [&str; 11] = [
    "DeliveriesBucket",
    "DownloadsBucket",
    "LargeQueueMessagesBucket",
    "MetadataBucket",
    "ModulesBucket",
    "PolicyInputsBucket",
    "RunLogsBucket",
    "StatesBucket",
    "UploadsBucket",
    "UserUploadedWorkspacesBucket",
    "WorkspacesBucket",
];

pub struct S3Scanner {
    s3: aws_sdk_s3::Client,
    iam: aws_sdk_iam::Client,
    stacks: StackResourceLookup,
}

impl S3Scanner {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            s3: aws_sdk_s3::Client::new(config),
            iam: aws_sdk_iam::Client::new(config),
            stacks: StackResourceLookup::new(config),
        }
    }

    pub async fn scan(&self, terraformer: &mut S3Terraformer<'_>) -> Result<()> {
        info!("Scanning S3 resources");

        let bucket_names = self
            .stacks
            .physical_resource_ids(STACK, &BUCKET_LOGICAL_IDS)
            .await?;

        for bucket_name in &bucket_names {
            let state = self.bucket_state(bucket_name).await?;
            terraformer.s3_to_terraform(bucket_name, &state)?;
        }

        self.process_replication_role(terraformer).await
    }

    async fn bucket_state(&self, bucket: &str) -> Result<BucketState> {
        let lifecycle_rules = self.lifecycle_rules(bucket).await?;

        Ok(BucketState {
            versioning_enabled: self.versioning_enabled(bucket).await?,
            sse_enabled: self.sse_enabled(bucket).await?,
            lifecycle_enabled: lifecycle_rules
                .iter()
                .any(|rule| rule.status == ExpirationStatus::Enabled),
            public_access_blocked: self.public_access_blocked(bucket).await?,
            expiration_days: lifecycle_rules
                .iter()
                .find(|rule| {
                    rule.id
                        .as_deref()
                        .is_some_and(|id| id.starts_with("expire-after-"))
                })
                .and_then(|rule| rule.expiration.as_ref())
                .and_then(|expiration| expiration.days)
                .unwrap_or(0),
            cors_rules: self.cors_rules(bucket).await?,
        })
    }

    async fn versioning_enabled(&self, bucket: &str) -> Result<bool> {
        let response = self
            .s3
            .get_bucket_versioning()
            .bucket(bucket)
            .send()
            .await
            .with_context(|| format!("Failed to read versioning of bucket {bucket}"))?;
        Ok(response.status == Some(BucketVersioningStatus::Enabled))
    }

    /// True when default encryption uses a customer KMS key.
    async fn sse_enabled(&self, bucket: &str) -> Result<bool> {
        let response = match self.s3.get_bucket_encryption().bucket(bucket).send().await {
            Ok(response) => response,
            Err(err) if err.code() == Some("ServerSideEncryptionConfigurationNotFoundError") => {
                return Ok(false);
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to read encryption of bucket {bucket}"));
            }
        };

        let enabled = response
            .server_side_encryption_configuration
            .iter()
            .flat_map(|configuration| configuration.rules())
            .filter_map(|rule| rule.apply_server_side_encryption_by_default.as_ref())
            .any(|default| {
                default.sse_algorithm == ServerSideEncryption::AwsKms
                    && default.kms_master_key_id.is_some()
            });
        Ok(enabled)
    }

    async fn lifecycle_rules(&self, bucket: &str) -> Result<Vec<LifecycleRule>> {
        match self
            .s3
            .get_bucket_lifecycle_configuration()
            .bucket(bucket)
            .send()
            .await
        {
            Ok(response) => Ok(response.rules.unwrap_or_default()),
            Err(err) if err.code() == Some("NoSuchLifecycleConfiguration") => Ok(Vec::new()),
            Err(err) => Err(err)
                .with_context(|| format!("Failed to read lifecycle rules of bucket {bucket}")),
        }
    }

    async fn public_access_blocked(&self, bucket: &str) -> Result<bool> {
        match self
            .s3
            .get_public_access_block()
            .bucket(bucket)
            .send()
            .await
        {
            Ok(response) => Ok(response
                .public_access_block_configuration
                .and_then(|configuration| configuration.block_public_acls)
                .unwrap_or(false)),
            Err(err) if err.code() == Some("NoSuchPublicAccessBlockConfiguration") => Ok(false),
            Err(err) => Err(err).with_context(|| {
                format!("Failed to read the public access block of bucket {bucket}")
            }),
        }
    }

    async fn cors_rules(&self, bucket: &str) -> Result<Vec<CorsRule>> {
        match self.s3.get_bucket_cors().bucket(bucket).send().await {
            Ok(response) => Ok(response.cors_rules.unwrap_or_default()),
            Err(err) if err.code() == Some("NoSuchCORSConfiguration") => Ok(Vec::new()),
            Err(err) => {
                Err(err).with_context(|| format!("Failed to read CORS rules of bucket {bucket}"))
            }
        }
    }

    /// When cross-region bucket replication is configured, the replication
    /// role and policy live in the same stack and are imported as well.
    async fn process_replication_role(&self, terraformer: &mut S3Terraformer<'_>) -> Result<()> {
        let config = terraformer.config();
        if !config.s3_bucket_replication_enabled() {
            return Ok(());
        }
        let disaster_recovery = config.disaster_recovery.clone().unwrap_or_default();

        let resources = self
            .stacks
            .physical_resource_ids(STACK, &["S3ReplicationRole", "S3ReplicationPolicy"])
            .await?;
        let [role_name, policy_arn]: [String; 2] = resources
            .try_into()
            .ok()
            .context("Expected exactly the replication role and policy")?;

        let policy = self
            .iam
            .get_policy()
            .policy_arn(&policy_arn)
            .send()
            .await
            .with_context(|| format!("Failed to read IAM policy {policy_arn}"))?;
        let policy_name = policy
            .policy
            .and_then(|policy| policy.policy_name)
            .unwrap_or_default();

        terraformer.replication_role_to_terraform(&role_name, &policy_arn)?;

        info!("Replication configuration is the following:");
        info!("  - Replication role name: {role_name}");
        info!("  - Replication policy: {policy_name} ({policy_arn})");
        info!(
            "  - Replica KMS key ARN: {}",
            disaster_recovery
                .s3_bucket_replication
                .as_ref()
                .and_then(|replication| replication.replica_kms_key_arn.as_deref())
                .unwrap_or("<unset>")
        );
        info!(
            "  - Replica region: {}",
            disaster_recovery.replica_region.as_deref().unwrap_or("<unset>")
        );

        Ok(())
    }
}
