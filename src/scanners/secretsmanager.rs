//! Secret discovery through the `spacelift-infra` stack.

use anyhow::Result;
use aws_config::SdkConfig;
use tracing::info;

use super::cloudformation::StackResourceLookup;
use crate::converters::secretsmanager::SecretsManagerTerraformer;

const STACK: &str = "spacelift-infra";

pub struct SecretsManagerScanner {
    stacks: StackResourceLookup,
}

impl SecretsManagerScanner {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            stacks: StackResourceLookup::new(config),
        }
    }

    pub async fn scan(&self, terraformer: &mut SecretsManagerTerraformer<'_>) -> Result<()> {
        info!("Scanning Secrets Manager resources");

        let connection_string_arn = self
            .stacks
            .physical_resource_id(STACK, "DBConnectionStringSecret")
            .await?;
        terraformer.sm_to_terraform("DBConnectionStringSecret", &connection_string_arn)?;

        let slack_credentials_arn = self
            .stacks
            .physical_resource_id(STACK, "SlackCredentialsSecret")
            .await?;
        terraformer.sm_to_terraform("SlackCredentialsSecret", &slack_credentials_arn)
    }
}
