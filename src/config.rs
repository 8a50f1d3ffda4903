//! Installation configuration for the migration run.
//!
//! The operator points the tool at the same JSON configuration file used by
//! the v2 installer. Only a handful of fields influence the migration
//! (region, disaster recovery, custom VPC, custom database connection
//! string), but the whole document is parsed strictly so that typos surface
//! as errors instead of silently disabling a branch of the scan.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    pub db_cluster_identifier: Option<String>,
    pub delete_protection_enabled: Option<bool>,
    pub instance_class: Option<String>,
    pub connection_string_ssm_arn: Option<String>,
    pub connection_string_ssm_kms_arn: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TagConfig {
    pub key: Option<String>,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoadBalancerConfig {
    pub certificate_arn: Option<String>,
    pub scheme: Option<String>,
    pub ssl_policy: Option<String>,
    pub subnet_placement: Option<String>,
    pub tag: Option<TagConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProxyConfig {
    pub http_proxy: Option<String>,
    pub https_proxy: Option<String>,
    pub no_proxy: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SlackConfig {
    pub enabled: Option<bool>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub signing_secret: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OidcArgs {
    pub client_id: Option<String>,
    pub client_credentials: Option<String>,
    pub identity_provider_host: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SamlArgs {
    pub metadata: Option<String>,
    pub dynamic: Option<bool>,
    pub name_id_format: Option<String>,
    pub update_on_install: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SsoConfig {
    pub admin_login: Option<String>,
    pub sso_type: Option<String>,
    pub oidc_args: Option<OidcArgs>,
    pub saml_args: Option<SamlArgs>,
    pub update_on_install: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TlsConfig {
    pub server_certificate_secrets_manager_arn: Option<String>,
    pub ca_certificates: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VpcConfig {
    pub use_custom_vpc: Option<bool>,
    pub vpc_cidr_block: Option<String>,
    pub vpc_id: Option<String>,
    pub subnet_mask_size: Option<String>,
    pub private_subnet_ids: Option<String>,
    pub public_subnet_ids: Option<String>,
    pub drain_security_group_id: Option<String>,
    pub load_balancer_security_group_id: Option<String>,
    pub server_security_group_id: Option<String>,
    pub scheduler_security_group_id: Option<String>,
    pub installation_task_security_group_id: Option<String>,
    pub database_security_group_id: Option<String>,
    pub availability_zones: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct S3BucketReplicationConfig {
    pub enabled: Option<bool>,
    pub replica_kms_key_arn: Option<String>,
    pub states_bucket_arn: Option<String>,
    pub run_logs_bucket_arn: Option<String>,
    pub modules_bucket_arn: Option<String>,
    pub policy_inputs_bucket_arn: Option<String>,
    pub workspaces_bucket_arn: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisasterRecoveryConfig {
    pub is_dr_instance: Option<bool>,
    pub replica_region: Option<String>,
    pub encryption_primary_key_arn: Option<String>,
    pub s3_bucket_replication: Option<S3BucketReplicationConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AlertingConfig {
    pub sns_topic_arn: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct S3Config {
    pub run_logs_expiration_days: Option<i64>,
    pub deliveries_bucket_expiration_days: Option<i64>,
    pub large_queue_messages_bucket_expiration_days: Option<i64>,
    pub metadata_bucket_expiration_days: Option<i64>,
    pub policy_inputs_bucket_expiration_days: Option<i64>,
    pub uploads_bucket_expiration_days: Option<i64>,
    pub user_uploaded_workspaces_bucket_expiration_days: Option<i64>,
    pub workspaces_bucket_expiration_days: Option<i64>,
    pub access_logs_bucket_expiration_days: Option<i64>,
}

/// The installation configuration, as written by the v2 installer.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub account_name: Option<String>,
    pub aws_region: Option<String>,
    pub database: Option<DatabaseConfig>,
    pub disaster_recovery: Option<DisasterRecoveryConfig>,
    pub disable_services: Option<bool>,
    pub load_balancer: Option<LoadBalancerConfig>,
    pub proxy_config: Option<ProxyConfig>,
    pub spacelift_hostname: Option<String>,
    pub slack_config: Option<SlackConfig>,
    pub sso_config: Option<SsoConfig>,
    pub tls_config: Option<TlsConfig>,
    pub tracing_enabled: Option<bool>,
    pub vpc_config: Option<VpcConfig>,
    pub iot_broker_endpoint: Option<String>,
    pub alerting: Option<AlertingConfig>,
    pub global_resource_tags: Option<Vec<TagConfig>>,
    pub s3_config: Option<S3Config>,
    pub automatically_report_usage_data: Option<bool>,
}

impl AppConfig {
    /// A disaster-recovery instance imports replica-side resources instead
    /// of the primary-only ones (encryption key, RDS cluster).
    pub fn is_primary_region(&self) -> bool {
        !self
            .disaster_recovery
            .as_ref()
            .and_then(|dr| dr.is_dr_instance)
            .unwrap_or(false)
    }

    pub fn uses_custom_database_connection_string(&self) -> bool {
        self.database
            .as_ref()
            .and_then(|db| db.connection_string_ssm_arn.as_deref())
            .is_some_and(|arn| !arn.is_empty())
    }

    pub fn uses_custom_vpc(&self) -> bool {
        self.vpc_config
            .as_ref()
            .and_then(|vpc| vpc.use_custom_vpc)
            .unwrap_or(false)
    }

    pub fn has_custom_proxy_config(&self) -> bool {
        self.proxy_config.as_ref().is_some_and(|proxy| {
            [&proxy.http_proxy, &proxy.https_proxy, &proxy.no_proxy]
                .iter()
                .any(|value| value.as_deref().is_some_and(|v| !v.is_empty()))
        })
    }

    pub fn s3_bucket_replication_enabled(&self) -> bool {
        self.disaster_recovery
            .as_ref()
            .and_then(|dr| dr.s3_bucket_replication.as_ref())
            .and_then(|replication| replication.enabled)
            .unwrap_or(false)
    }
}

/// Load and parse the installation configuration file.
pub fn load_app_config(config_path: &Path) -> Result<AppConfig> {
    let contents = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read configuration file {}", config_path.display()))?;

    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse configuration file {}", config_path.display()))
}
