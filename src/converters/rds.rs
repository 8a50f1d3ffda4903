//! Database imports. The cluster-level identifiers are fixed ("spacelift");
//! the instance import uses the discovered instance identifier. Engine
//! version, backup window and instance sizing are recorded for the module
//! call in the generated configuration.

use anyhow::{Context, Result};
use aws_sdk_rds::types::{DbCluster, DbInstance};

use super::ImportWriter;
use crate::context::MigrationContext;

const DB_SUBNET_GROUP: &str = "module.spacelift.module.rds[0].aws_db_subnet_group.db_subnet_group";
const DB_CLUSTER: &str = "module.spacelift.module.rds[0].aws_rds_cluster.db_cluster";
const DB_INSTANCE: &str =
    "module.spacelift.module.rds[0].aws_rds_cluster_instance.db_instance[\"primary\"]";
const DB_PARAMETER_GROUP: &str =
    "module.spacelift.module.rds[0].aws_rds_cluster_parameter_group.spacelift";

pub struct RdsTerraformer<'a> {
    imports: &'a mut ImportWriter,
    context: &'a mut MigrationContext,
}

impl<'a> RdsTerraformer<'a> {
    pub fn new(imports: &'a mut ImportWriter, context: &'a mut MigrationContext) -> Self {
        Self { imports, context }
    }

    pub fn is_primary_region(&self) -> bool {
        self.context.config.is_primary_region()
    }

    pub fn uses_custom_database_connection_string(&self) -> bool {
        self.context.config.uses_custom_database_connection_string()
    }

    pub fn rds_to_terraform(&mut self, cluster: &DbCluster, instance: &DbInstance) -> Result<()> {
        let engine_version = cluster
            .engine_version
            .clone()
            .context("DB cluster has no engine version")?;
        let backup_window = cluster
            .preferred_backup_window
            .clone()
            .context("DB cluster has no preferred backup window")?;
        let instance_identifier = instance
            .db_instance_identifier
            .clone()
            .context("DB instance has no identifier")?;
        let instance_class = instance
            .db_instance_class
            .clone()
            .context("DB instance has no instance class")?;

        self.context.rds_engine_version = Some(engine_version);
        self.context.rds_preferred_backup_window = Some(backup_window);
        self.context.rds_instance_class = Some(instance_class);

        self.imports.write_import(DB_SUBNET_GROUP, "spacelift")?;
        self.imports.write_import(DB_CLUSTER, "spacelift")?;
        self.imports.write_import(DB_INSTANCE, &instance_identifier)?;
        self.context.rds_instance_identifier = Some(instance_identifier);
        self.imports.write_import(DB_PARAMETER_GROUP, "spacelift")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use pretty_assertions::assert_eq;

    #[test]
    fn records_cluster_attributes_and_imports_fixed_addresses() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = ImportWriter::create(dir.path()).unwrap();
        let mut ctx = MigrationContext::new(AppConfig::default(), "eu-west-1".to_string());
        let mut terraformer = RdsTerraformer::new(&mut writer, &mut ctx);

        let cluster = DbCluster::builder()
            .engine_version("15.4")
            .preferred_backup_window("01:00-02:00")
            .build();
        let instance = DbInstance::builder()
            .db_instance_identifier("spacelift-primary")
            .db_instance_class("db.r6g.large")
            .build();

        terraformer.rds_to_terraform(&cluster, &instance).unwrap();

        assert_eq!(ctx.rds_engine_version.as_deref(), Some("15.4"));
        assert_eq!(ctx.rds_preferred_backup_window.as_deref(), Some("01:00-02:00"));
        assert_eq!(ctx.rds_instance_identifier.as_deref(), Some("spacelift-primary"));
        assert_eq!(ctx.rds_instance_class.as_deref(), Some("db.r6g.large"));

        let contents = std::fs::read_to_string(dir.path().join("imports.tf")).unwrap();
        assert!(contents.contains("aws_db_subnet_group.db_subnet_group\n  id = \"spacelift\""));
        assert!(contents.contains("aws_rds_cluster.db_cluster\n  id = \"spacelift\""));
        assert!(contents
            .contains("aws_rds_cluster_instance.db_instance[\"primary\"]\n  id = \"spacelift-primary\""));
        assert!(contents.contains("aws_rds_cluster_parameter_group.spacelift\n  id = \"spacelift\""));
    }

    #[test]
    fn missing_engine_version_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = ImportWriter::create(dir.path()).unwrap();
        let mut ctx = MigrationContext::new(AppConfig::default(), "eu-west-1".to_string());
        let mut terraformer = RdsTerraformer::new(&mut writer, &mut ctx);

        let cluster = DbCluster::builder().build();
        let instance = DbInstance::builder()
            .db_instance_identifier("spacelift-primary")
            .db_instance_class("db.r6g.large")
            .build();

        assert!(terraformer.rds_to_terraform(&cluster, &instance).is_err());
    }
}
