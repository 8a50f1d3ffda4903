//! Database discovery. Only primary regions with the managed connection
//! string import the cluster; the "exactly one member, exactly one
//! instance" checks guard the single-writer topology the generated module
//! call assumes.

use anyhow::{bail, Context, Result};
use aws_config::SdkConfig;
use tracing::{info, warn};

use crate::converters::rds::RdsTerraformer;

const CLUSTER_IDENTIFIER: &str = "spacelift";

pub struct RdsScanner {
    rds: aws_sdk_rds::Client,
}

impl RdsScanner {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            rds: aws_sdk_rds::Client::new(config),
        }
    }

    pub async fn scan(&self, terraformer: &mut RdsTerraformer<'_>) -> Result<()> {
        info!("Scanning RDS resources");

        if !terraformer.is_primary_region() {
            warn!(
                "Skipping RDS resource imports in secondary region. \
                 RDS resources will be untracked by the generated project!"
            );
            return Ok(());
        }

        if terraformer.uses_custom_database_connection_string() {
            warn!(
                "Skipping RDS resource imports due to custom database connection string. \
                 RDS resources will be untracked by the generated project!"
            );
            return Ok(());
        }

        let response = self
            .rds
            .describe_db_clusters()
            .db_cluster_identifier(CLUSTER_IDENTIFIER)
            .send()
            .await
            .with_context(|| format!("Failed to describe DB cluster {CLUSTER_IDENTIFIER}"))?;

        for cluster in response.db_clusters() {
            let members = cluster.db_cluster_members();
            if members.len() != 1 {
                bail!(
                    "Expected exactly one cluster member, but found {}",
                    members.len()
                );
            }
            let member_identifier = members[0]
                .db_instance_identifier
                .as_deref()
                .context("Cluster member has no instance identifier")?;

            let instance_response = self
                .rds
                .describe_db_instances()
                .db_instance_identifier(member_identifier)
                .send()
                .await
                .with_context(|| format!("Failed to describe DB instance {member_identifier}"))?;

            let instances = instance_response.db_instances();
            if instances.len() != 1 {
                bail!("Expected exactly one instance, but found {}", instances.len());
            }

            terraformer.rds_to_terraform(cluster, &instances[0])?;
        }

        Ok(())
    }
}
