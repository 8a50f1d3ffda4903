//! AWS session plumbing and one-off lookups that sit outside the scan
//! pipeline.

use anyhow::{bail, Context, Result};
use aws_config::{BehaviorVersion, Region, SdkConfig};

use crate::converters::LOGICAL_ID_TAG;

/// SSM parameter holding the account-specific suffix embedded in legacy
/// resource names.
pub const UNIQUE_SUFFIX_PARAMETER: &str = "/spacelift/random-suffix";

/// Load the shared SDK configuration for the given region, optionally from
/// a named profile.
pub async fn create_sdk_config(region: &str, profile: Option<&str>) -> SdkConfig {
    let mut loader =
        aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region.to_string()));
    if let Some(profile) = profile {
        loader = loader.profile_name(profile);
    }
    loader.load().await
}

/// Read an SSM parameter, mapping "not found" to `None`.
pub async fn get_ssm_parameter(config: &SdkConfig, name: &str) -> Result<Option<String>> {
    let client = aws_sdk_ssm::Client::new(config);

    match client.get_parameter().name(name).send().await {
        Ok(response) => Ok(response.parameter.and_then(|parameter| parameter.value)),
        Err(err) => {
            let err = err.into_service_error();
            if err.is_parameter_not_found() {
                Ok(None)
            } else {
                Err(err).with_context(|| format!("Failed to read SSM parameter {name}"))
            }
        }
    }
}

/// Certificate ARN of the named load balancer's HTTPS (port 443) listener,
/// or `None` when the listener or certificate is missing.
pub async fn get_load_balancer_certificate_arn(
    config: &SdkConfig,
    load_balancer_name: &str,
) -> Result<Option<String>> {
    let client = aws_sdk_elasticloadbalancingv2::Client::new(config);

    let response = client
        .describe_load_balancers()
        .names(load_balancer_name)
        .send()
        .await
        .with_context(|| format!("Failed to describe load balancer {load_balancer_name}"))?;

    let Some(load_balancer_arn) = response
        .load_balancers()
        .first()
        .and_then(|lb| lb.load_balancer_arn.clone())
    else {
        return Ok(None);
    };

    let listeners = client
        .describe_listeners()
        .load_balancer_arn(&load_balancer_arn)
        .send()
        .await
        .with_context(|| {
            format!("Failed to list listeners of load balancer {load_balancer_name}")
        })?;

    for listener in listeners.listeners() {
        if listener.port == Some(443) {
            if let Some(certificate_arn) = listener
                .certificates()
                .first()
                .and_then(|certificate| certificate.certificate_arn.clone())
            {
                return Ok(Some(certificate_arn));
            }
        }
    }

    Ok(None)
}

/// Name of the (non-deleted) Secrets Manager secret carrying the database
/// connection string, found by its CloudFormation logical-id tag.
pub async fn get_db_password_secret_name(config: &SdkConfig) -> Result<String> {
    let client = aws_sdk_secretsmanager::Client::new(config);

    let response = client
        .list_secrets()
        .send()
        .await
        .context("Failed to list Secrets Manager secrets")?;

    for secret in response.secret_list() {
        if secret.deleted_date.is_some() {
            continue;
        }
        let tagged = secret.tags().iter().any(|tag| {
            tag.key.as_deref() == Some(LOGICAL_ID_TAG)
                && tag.value.as_deref() == Some("DBConnectionStringSecret")
        });
        if tagged {
            return secret
                .name
                .clone()
                .context("Matching secret has no name");
        }
    }

    bail!("Could not find secret with tag '{LOGICAL_ID_TAG}=DBConnectionStringSecret'")
}
