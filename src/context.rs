//! Shared state accumulated while scanning.
//!
//! Converters write discovered values here (bucket names, CIDR blocks,
//! route table IDs, RDS attributes) and later converters or the file
//! generator read them back. The scan order in [`crate::run`] is what makes
//! this safe: a value is always written before anything reads it.

use crate::config::AppConfig;

#[derive(Debug)]
pub struct MigrationContext {
    pub config: AppConfig,

    /// AWS region of the installation, from the configuration file.
    pub region: String,

    /// Certificate of the server load balancer's HTTPS listener.
    pub certificate_arn: Option<String>,

    // S3 bucket names
    pub binaries_bucket_name: Option<String>,
    pub deliveries_bucket_name: Option<String>,
    pub large_queue_bucket_name: Option<String>,
    pub metadata_bucket_name: Option<String>,
    pub modules_bucket_name: Option<String>,
    pub policy_bucket_name: Option<String>,
    pub run_logs_bucket_name: Option<String>,
    pub states_bucket_name: Option<String>,
    pub uploads_bucket_name: Option<String>,
    pub user_uploads_bucket_name: Option<String>,
    pub workspace_bucket_name: Option<String>,

    /// First allowed origin of the uploads bucket's CORS rule; doubles as
    /// the website endpoint in the generated configuration.
    pub cors_origin: Option<String>,

    // VPC and network configuration
    pub vpc_cidr_block: Option<String>,
    pub private_subnet_cidr_blocks: [String; 3],
    pub public_subnet_cidr_blocks: [String; 3],
    pub public_subnet_id_1: Option<String>,
    pub public_subnet_id_2: Option<String>,
    pub public_subnet_id_3: Option<String>,

    // Route tables and associations
    pub gateway1_route_table_id: Option<String>,
    pub gateway2_route_table_id: Option<String>,
    pub gateway3_route_table_id: Option<String>,
    pub gateway2_association_id: Option<String>,
    pub gateway3_association_id: Option<String>,

    // RDS configuration
    pub rds_engine_version: Option<String>,
    pub rds_preferred_backup_window: Option<String>,
    pub rds_instance_identifier: Option<String>,
    pub rds_instance_class: Option<String>,
}

impl MigrationContext {
    pub fn new(config: AppConfig, region: String) -> Self {
        Self {
            config,
            region,
            certificate_arn: None,
            binaries_bucket_name: None,
            deliveries_bucket_name: None,
            large_queue_bucket_name: None,
            metadata_bucket_name: None,
            modules_bucket_name: None,
            policy_bucket_name: None,
            run_logs_bucket_name: None,
            states_bucket_name: None,
            uploads_bucket_name: None,
            user_uploads_bucket_name: None,
            workspace_bucket_name: None,
            cors_origin: None,
            vpc_cidr_block: None,
            private_subnet_cidr_blocks: Default::default(),
            public_subnet_cidr_blocks: Default::default(),
            public_subnet_id_1: None,
            public_subnet_id_2: None,
            public_subnet_id_3: None,
            gateway1_route_table_id: None,
            gateway2_route_table_id: None,
            gateway3_route_table_id: None,
            gateway2_association_id: None,
            gateway3_association_id: None,
            rds_engine_version: None,
            rds_preferred_backup_window: None,
            rds_instance_identifier: None,
            rds_instance_class: None,
        }
    }
}
