//! KMS key imports.
//!
//! The keys live at the top level of the generated configuration rather
//! than inside the core module, since the v3 modules take key ARNs as
//! input. A primary region imports the in-app encryption primary key; a
//! disaster-recovery instance imports the replica key instead.

use anyhow::Result;

use super::ImportWriter;
use crate::context::MigrationContext;

const MASTER_KEY: &str = "aws_kms_key.master";
const ENCRYPTION_PRIMARY_KEY: &str = "aws_kms_key.encryption_primary";
const JWT_KEY: &str = "aws_kms_key.jwt";
const JWT_ALIAS: &str = "aws_kms_alias.jwt_alias";
const JWT_BACKUP_KEY: &str = "aws_kms_key.jwt_backup_key";
const ENCRYPTION_REPLICA_KEY: &str = "aws_kms_replica_key.encryption_replica_key";

pub struct KmsTerraformer<'a> {
    imports: &'a mut ImportWriter,
    context: &'a mut MigrationContext,
}

impl<'a> KmsTerraformer<'a> {
    pub fn new(imports: &'a mut ImportWriter, context: &'a mut MigrationContext) -> Self {
        Self { imports, context }
    }

    pub fn is_primary_region(&self) -> bool {
        self.context.config.is_primary_region()
    }

    pub fn kms_to_terraform(&mut self, key_id: &str, logical_id: &str) -> Result<()> {
        match logical_id {
            "KMSMasterKey" => self.imports.write_import(MASTER_KEY, key_id),
            "KMSJWTKey" => self.imports.write_import(JWT_KEY, key_id),
            "KMSEncryptionPrimaryKey" => self.imports.write_import(ENCRYPTION_PRIMARY_KEY, key_id),
            "KMSJWTAlias" => self.imports.write_import(JWT_ALIAS, key_id),
            "KMSJWTBackupKey" => self.imports.write_import(JWT_BACKUP_KEY, key_id),
            "KMSEncryptionReplicaKey" => self.imports.write_import(ENCRYPTION_REPLICA_KEY, key_id),
            _ => Ok(()),
        }
    }
}
