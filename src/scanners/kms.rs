//! Key discovery through the `spacelift-infra-kms` stack. The in-app
//! encryption key differs by role: primary regions own the primary key,
//! disaster-recovery instances own a replica.

use anyhow::Result;
use aws_config::SdkConfig;
use tracing::info;

use super::cloudformation::StackResourceLookup;
use crate::converters::kms::KmsTerraformer;

const STACK: &str = "spacelift-infra-kms";

pub struct KmsScanner {
    stacks: StackResourceLookup,
}

impl KmsScanner {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            stacks: StackResourceLookup::new(config),
        }
    }

    pub async fn scan(&self, terraformer: &mut KmsTerraformer<'_>) -> Result<()> {
        info!("Scanning KMS resources");

        let master_key_id = self.stacks.physical_resource_id(STACK, "KMSMasterKey").await?;
        let jwt_key_id = self.stacks.physical_resource_id(STACK, "KMSJWTKey").await?;
        let backup_key_id = self
            .stacks
            .physical_resource_id(STACK, "KMSJWTBackupKey")
            .await?;
        let alias = self.stacks.physical_resource_id(STACK, "KMSJWTAlias").await?;

        if terraformer.is_primary_region() {
            let encryption_key_id = self
                .stacks
                .physical_resource_id(STACK, "KMSEncryptionPrimaryKey")
                .await?;
            terraformer.kms_to_terraform(&encryption_key_id, "KMSEncryptionPrimaryKey")?;
        } else {
            let replica_key_id = self
                .stacks
                .physical_resource_id(STACK, "KMSEncryptionReplicaKey")
                .await?;
            terraformer.kms_to_terraform(&replica_key_id, "KMSEncryptionReplicaKey")?;
        }

        terraformer.kms_to_terraform(&master_key_id, "KMSMasterKey")?;
        terraformer.kms_to_terraform(&jwt_key_id, "KMSJWTKey")?;
        terraformer.kms_to_terraform(&backup_key_id, "KMSJWTBackupKey")?;
        terraformer.kms_to_terraform(&alias, "KMSJWTAlias")
    }
}
