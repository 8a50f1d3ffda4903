//! Renders the migration context into the generated Terraform project.
//!
//! Every file is rewritten from scratch on each run. `imports.tf` is not
//! written here; it is appended to by the converters while scanning.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::warn;

use crate::cli::TargetModule;
use crate::context::MigrationContext;

const CORE_MODULE_SOURCE: &str =
    "github.com/spacelift-io/terraform-aws-spacelift-selfhosted?ref=v2-v3-migration-improvements";
const ECS_SERVICES_MODULE_SOURCE: &str =
    "github.com/spacelift-io/terraform-aws-ecs-spacelift-selfhosted?ref=add-sqs-queues-and-iot";
const EKS_SERVICES_MODULE_SOURCE: &str =
    "github.com/spacelift-io/terraform-aws-eks-spacelift-selfhosted?ref=add-sqs-queues-and-iot";

/// Write the generated Terraform project next to `imports.tf`.
pub fn generate_terraform_files(
    unique_suffix: &str,
    context: &MigrationContext,
    output_dir: &Path,
    target_module: TargetModule,
) -> Result<()> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;

    let files = [
        ("first_step.sh", render_cutover_script(context)),
        ("data_sources.tf", DATA_SOURCES.to_string()),
        ("kms.tf", KMS_RESOURCES.to_string()),
        ("secrets_manager.tf", SECRET_RESOURCES.to_string()),
        ("sqs.tf", SQS_RESOURCES.to_string()),
        ("iot.tf", render_iot_resources(context)),
        (
            "main.tf",
            render_main(unique_suffix, context, target_module)?,
        ),
    ];

    for (name, contents) in files {
        let path = output_dir.join(name);
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    Ok(())
}

/// The shell script re-pointing public subnets 2 and 3 at route table 1.
/// It must run before `terraform apply`; the disassociate lines only appear
/// when the scan found the legacy associations still in place.
fn render_cutover_script(context: &MigrationContext) -> String {
    let region = &context.region;
    let mut script = String::from("#!/bin/bash\n\n");

    if let Some(association_id) = &context.gateway2_association_id {
        script.push_str(&format!(
            "aws ec2 disassociate-route-table --no-cli-pager --region {region} --association-id {association_id} --output json\n"
        ));
    }
    if let Some(association_id) = &context.gateway3_association_id {
        script.push_str(&format!(
            "aws ec2 disassociate-route-table --no-cli-pager --region {region} --association-id {association_id} --output json\n"
        ));
    }

    let route_table_id = discovered_or_blank(&context.gateway1_route_table_id, "gateway route table 1");
    let subnet_2 = discovered_or_blank(&context.public_subnet_id_2, "public subnet 2");
    let subnet_3 = discovered_or_blank(&context.public_subnet_id_3, "public subnet 3");
    script.push_str(&format!(
        "aws ec2 associate-route-table --no-cli-pager --region {region} --subnet-id {subnet_2} --route-table-id {route_table_id} --output json\n"
    ));
    script.push_str(&format!(
        "aws ec2 associate-route-table --no-cli-pager --region {region} --subnet-id {subnet_3} --route-table-id {route_table_id} --output json"
    ));

    script
}

fn render_main(
    unique_suffix: &str,
    context: &MigrationContext,
    target_module: TargetModule,
) -> Result<String> {
    Ok(format!(
        "{}{}{}{}",
        provider_block(),
        locals_block(context)?,
        core_module_block(unique_suffix, context)?,
        services_module_block(context, target_module)
    ))
}

fn provider_block() -> String {
    String::from(
        r#"# Apply this file once first_step.sh finished running

terraform {
  required_providers {
    aws = {
      source  = "hashicorp/aws"
      version = "~> 5.0"
    }
  }
}

provider "aws" {
  region = local.region
}
"#,
    )
}

fn locals_block(context: &MigrationContext) -> Result<String> {
    let website_domain = context
        .cors_origin
        .as_deref()
        .context("CORS origin was not discovered (the uploads bucket has no CORS rule)")?
        .trim_start_matches("https://");

    Ok(format!(
        r#"
locals {{
  region            = "{region}"
  spacelift_version = "v3.0.0" # TODO: This is a tag of a Docker image uploaded to the "spacelift" and "spacelift-launcher" ECRs.
  website_domain    = "{website_domain}"
  website_endpoint  = "https://${{local.website_domain}}"
  license_token     = "<TODO: you need to set this value>" # TODO: This value must be set to the license token you received from Spacelift.
}}
"#,
        region = context.region,
    ))
}

fn core_module_block(unique_suffix: &str, context: &MigrationContext) -> Result<String> {
    let buckets = [
        ("binaries", &context.binaries_bucket_name),
        ("deliveries", &context.deliveries_bucket_name),
        ("large_queue", &context.large_queue_bucket_name),
        ("metadata", &context.metadata_bucket_name),
        ("modules", &context.modules_bucket_name),
        ("policy", &context.policy_bucket_name),
        ("run_logs", &context.run_logs_bucket_name),
        ("states", &context.states_bucket_name),
        ("uploads", &context.uploads_bucket_name),
        ("user_uploads", &context.user_uploads_bucket_name),
        ("workspace", &context.workspace_bucket_name),
    ];
    let mut bucket_names = String::new();
    for (key, name) in buckets {
        let name = name
            .as_deref()
            .with_context(|| format!("The {key} bucket was not discovered during the scan"))?;
        bucket_names.push_str(&format!("    {key:<12} = \"{name}\"\n"));
    }

    Ok(format!(
        r#"
module "spacelift" {{
  source = "{source}"

  region           = local.region
  website_endpoint = local.website_endpoint
  unique_suffix    = "{unique_suffix}"
  s3_bucket_names  = {{
{bucket_names}  }}

  kms_arn                       = aws_kms_key.master.arn
  kms_master_key_multi_regional = false
  kms_jwt_key_multi_regional    = false

  vpc_cidr_block             = "{vpc_cidr_block}"
  public_subnet_cidr_blocks  = {public_subnet_cidr_blocks}
  private_subnet_cidr_blocks = {private_subnet_cidr_blocks}

  number_of_images_to_retain   = 10
  backend_ecr_repository_name  = "spacelift"
  launcher_ecr_repository_name = "spacelift-launcher"

  security_group_names = {{
    database  = "database_sg"
    drain     = "drain_sg"
    scheduler = "scheduler_sg"
    server    = "server_sg"
  }}

  rds_engine_version              = "{rds_engine_version}"
  rds_preferred_backup_window     = "{rds_preferred_backup_window}"
  rds_regional_cluster_identifier = "spacelift"
  rds_parameter_group_name        = "spacelift"
  rds_subnet_group_name           = "spacelift"
  rds_parameter_group_description = "Spacelift core product database"
  rds_password_sm_arn             = aws_secretsmanager_secret.db_pw.arn
  rds_instance_configuration      = {{
    "primary" = {{
      instance_identifier = "{rds_instance_identifier}"
      instance_class      = "{rds_instance_class}"
    }}
  }}
}}
"#,
        source = CORE_MODULE_SOURCE,
        vpc_cidr_block = discovered_or_blank(&context.vpc_cidr_block, "VPC CIDR block"),
        public_subnet_cidr_blocks = format_cidr_block_list(&context.public_subnet_cidr_blocks),
        private_subnet_cidr_blocks = format_cidr_block_list(&context.private_subnet_cidr_blocks),
        rds_engine_version =
            discovered_or_blank(&context.rds_engine_version, "RDS engine version"),
        rds_preferred_backup_window = discovered_or_blank(
            &context.rds_preferred_backup_window,
            "RDS preferred backup window"
        ),
        rds_instance_identifier =
            discovered_or_blank(&context.rds_instance_identifier, "RDS instance identifier"),
        rds_instance_class =
            discovered_or_blank(&context.rds_instance_class, "RDS instance class"),
    ))
}

fn services_module_block(context: &MigrationContext, target_module: TargetModule) -> String {
    let source = match target_module {
        TargetModule::Ecs => ECS_SERVICES_MODULE_SOURCE,
        TargetModule::Eks => EKS_SERVICES_MODULE_SOURCE,
    };
    let certificate_arn = discovered_or_blank(&context.certificate_arn, "certificate ARN");

    format!(
        r#"
# Uncomment after the above module applied successfully
#module "spacelift_services" {{
#  source = "{source}"
#
#  region        = local.region
#  unique_suffix = module.spacelift.unique_suffix
#  kms_key_arn   = module.spacelift.kms_key_arn
#  server_domain = local.website_domain
#
#  license_token = local.license_token
#
#  encryption_type        = "kms"
#  kms_encryption_key_arn = aws_kms_key.encryption_primary.arn
#  kms_signing_key_arn    = aws_kms_key.jwt.arn
#
#  database_url           = format("postgres://%s:%s@%s:5432/spacelift?statement_cache_capacity=0", module.spacelift.rds_username, module.spacelift.rds_password, module.spacelift.rds_cluster_endpoint)
#  database_read_only_url = format("postgres://%s:%s@%s:5432/spacelift?statement_cache_capacity=0", module.spacelift.rds_username, module.spacelift.rds_password, module.spacelift.rds_cluster_reader_endpoint)
#
#  backend_image      = module.spacelift.ecr_backend_repository_url
#  backend_image_tag  = local.spacelift_version
#  launcher_image     = module.spacelift.ecr_launcher_repository_url
#  launcher_image_tag = local.spacelift_version
#
#  server_log_configuration = {{
#    logDriver : "awslogs",
#    options : {{
#      "awslogs-region": local.region,
#      "awslogs-group": "/ecs/spacelift-server",
#      "awslogs-create-group": "true",
#      "awslogs-stream-prefix": "server"
#      "mode": "non-blocking"
#      "max-buffer-size": "25m"
#    }}
#  }}
#
#  drain_log_configuration = {{
#    logDriver : "awslogs",
#    options : {{
#      "awslogs-region": local.region,
#      "awslogs-group": "/ecs/spacelift-drain",
#      "awslogs-create-group": "true",
#      "awslogs-stream-prefix": "drain"
#      "mode": "non-blocking"
#      "max-buffer-size": "25m"
#    }}
#  }}
#
#  scheduler_log_configuration = {{
#    logDriver : "awslogs",
#    options : {{
#      "awslogs-region": local.region,
#      "awslogs-group": "/ecs/spacelift-scheduler",
#      "awslogs-create-group": "true",
#      "awslogs-stream-prefix": "scheduler"
#      "mode": "non-blocking"
#      "max-buffer-size": "25m"
#    }}
#  }}
#
#  vpc_id      = module.spacelift.vpc_id
#  ecs_subnets = module.spacelift.private_subnet_ids
#
#  server_lb_subnets         = module.spacelift.public_subnet_ids
#  server_security_group_id  = module.spacelift.server_security_group_id
#  server_lb_certificate_arn = "{certificate_arn}"
#
#  drain_security_group_id     = module.spacelift.drain_security_group_id
#  scheduler_security_group_id = module.spacelift.scheduler_security_group_id
#
#  mqtt_broker_type = "iotcore"
#
#  deliveries_bucket_name               = module.spacelift.deliveries_bucket_name
#  large_queue_messages_bucket_name     = module.spacelift.large_queue_messages_bucket_name
#  metadata_bucket_name                 = module.spacelift.metadata_bucket_name
#  modules_bucket_name                  = module.spacelift.modules_bucket_name
#  policy_inputs_bucket_name            = module.spacelift.policy_inputs_bucket_name
#  run_logs_bucket_name                 = module.spacelift.run_logs_bucket_name
#  states_bucket_name                   = module.spacelift.states_bucket_name
#  uploads_bucket_name                  = module.spacelift.uploads_bucket_name
#  uploads_bucket_url                   = module.spacelift.uploads_bucket_url
#  user_uploaded_workspaces_bucket_name = module.spacelift.user_uploaded_workspaces_bucket_name
#  workspace_bucket_name                = module.spacelift.workspace_bucket_name
#
#  sqs_queues = {{
#    deadletter      = aws_sqs_queue.deadletter_queue.name
#    deadletter_fifo = aws_sqs_queue.deadletter_fifo_queue.name
#    async_jobs      = aws_sqs_queue.async_jobs_queue.name
#    events_inbox    = aws_sqs_queue.events_inbox_queue.name
#    async_jobs_fifo = aws_sqs_queue.async_jobs_fifo_queue.name
#    cronjobs        = aws_sqs_queue.cronjobs_queue.name
#    webhooks        = aws_sqs_queue.webhooks_queue.name
#    iot             = aws_sqs_queue.iot_queue.name
#  }}
#}}
#
# output "load_balancer_dns_name" {{
#   value = module.spacelift_services.server_lb_dns_name
# }}
"#
    )
}

fn render_iot_resources(context: &MigrationContext) -> String {
    let role = format!(
        r#"resource "aws_iam_role" "iot_message_sender_role" {{
  name = "spacelift-iot-{region}"

  assume_role_policy = jsonencode({{
    Version = "2012-10-17"
    Statement = [
      {{
        Effect = "Allow"
        Principal = {{
          Service = "iot.amazonaws.com"
        }}
        Action = "sts:AssumeRole"
      }}
    ]
  }})

  description = "Used by the API Gateway when publishing messages to the webhooks SNS topic"
}}
"#,
        region = context.region,
    );

    format!("{role}{IOT_POLICY_AND_RULE}")
}

const IOT_POLICY_AND_RULE: &str = r#"
resource "aws_iam_role_policy" "iot_message_sender_role_policy" {
  name = "allow-iot-sqs-sending"
  role = aws_iam_role.iot_message_sender_role.id

  policy = jsonencode({
    Version = "2012-10-17"
    Statement = [
      {
        Effect = "Allow"
        Action = [
          "kms:Decrypt",
          "kms:Encrypt",
          "kms:GenerateDataKey*"
        ]
        Resource = aws_kms_key.master.arn
      },
      {
        Effect = "Allow"
        Action = "sqs:SendMessage"
        Resource = aws_sqs_queue.iot_queue.arn
      }
    ]
  })
}

resource "aws_iot_topic_rule" "iot_message_sending_rule" {
  name = "spacelift"

  sql = "SELECT *, Timestamp() as timestamp, topic(3) as worker_pool_ulid, topic(4) as worker_ulid FROM 'spacelift/writeonly/#'"
  sql_version = "2016-03-23"
  description = "Send all messages published in the spacelift namespace to the ${aws_sqs_queue.iot_queue.name}"
  enabled = true

  sqs {
    role_arn  = aws_iam_role.iot_message_sender_role.arn
    queue_url = aws_sqs_queue.iot_queue.id
    use_base64 = true
  }
}
"#;

const DATA_SOURCES: &str = r#"data "aws_partition" "current" {}
data "aws_caller_identity" "current" {}
"#;

const SECRET_RESOURCES: &str = r#"resource "aws_secretsmanager_secret" "db_pw" {
  name        = "spacelift/database"
  description = "Connection string for the Spacelift database"
  kms_key_id  = aws_kms_key.master.arn
}

resource "aws_secretsmanager_secret" "slack_credentials" {
  name        = "spacelift/slack-application"
  description = "Contains the Spacelift Slack application configuration"
  kms_key_id  = aws_kms_key.master.arn
}
"#;

const KMS_RESOURCES: &str = r#"resource "aws_kms_key" "master" {
  description         = "Spacelift master KMS key"
  enable_key_rotation = true

  policy = jsonencode({
    Version   = "2012-10-17"
    Statement = [
      {
        Effect    = "Allow"
        Principal = { AWS = "arn:${data.aws_partition.current.partition}:iam::${data.aws_caller_identity.current.account_id}:root" }
        Action    = "kms:*"
        Resource  = "*"
      },
      {
        Effect    = "Allow"
        Principal = {
          Service = "logs.${local.region}.amazonaws.com"
        }
        Action   = [
          "kms:Encrypt*",
          "kms:Decrypt*",
          "kms:ReEncrypt*",
          "kms:GenerateDataKey*",
          "kms:Describe*"
        ]
        Resource = "*"
      },
      {
        Effect    = "Allow"
        Principal = {
          Service = ["sns.amazonaws.com", "events.amazonaws.com"]
        }
        Action   = [
          "kms:Decrypt",
          "kms:GenerateDataKey"
        ]
        Resource = "*"
      }
    ]
  })
}

resource "aws_kms_key" "jwt" {
  description = "Spacelift KMS key used to sign and verify JWTs"
  key_usage   = "SIGN_VERIFY"
  customer_master_key_spec = "RSA_4096"

  policy = jsonencode({
    Version   = "2012-10-17"
    Statement = [
      {
        Effect    = "Allow"
        Principal = { AWS = "arn:${data.aws_partition.current.partition}:iam::${data.aws_caller_identity.current.account_id}:root" }
        Action    = "kms:*"
        Resource  = "*"
      }
    ]
  })
}

resource "aws_kms_key" "encryption_primary" {
  description         = "Spacelift in-app encryption primary key. Used to encrypt user data stored in the database like VCS tokens."
  enable_key_rotation = true
  multi_region        = true

  policy = jsonencode({
    Version   = "2012-10-17"
    Statement = [
      {
        Effect    = "Allow"
        Principal = { AWS = "arn:${data.aws_partition.current.partition}:iam::${data.aws_caller_identity.current.account_id}:root" }
        Action    = "kms:*"
        Resource  = "*"
      }
    ]
  })
}

resource "aws_kms_key" "jwt_backup_key" {
  description              = "Backup Spacelift KMS key used to sign and verify JWTs"
  key_usage                = "SIGN_VERIFY"
  customer_master_key_spec = "RSA_4096"

  policy = jsonencode({
    Version = "2012-10-17"
    Statement = [
      {
        Effect = "Allow"
        Action = "kms:*"
        Principal = {
          AWS = "arn:${data.aws_partition.current.partition}:iam::${data.aws_caller_identity.current.account_id}:root"
        }
        Resource = "*"
      }
    ]
  })
}

resource "aws_kms_alias" "jwt_alias" {
  name          = "alias/spacelift-jwt"
  target_key_id = aws_kms_key.jwt.key_id
}
"#;

const SQS_RESOURCES: &str = r#"resource "aws_sqs_queue" "deadletter_queue" {
  name                      = "spacelift-dlq"
  kms_master_key_id         = aws_kms_key.master.arn
  visibility_timeout_seconds = 300
}

resource "aws_sqs_queue" "deadletter_fifo_queue" {
  name                      = "spacelift-dlq.fifo"
  fifo_queue                = true
  kms_master_key_id         = aws_kms_key.master.arn
  visibility_timeout_seconds = 300
}

resource "aws_sqs_queue" "async_jobs_queue" {
  name                       = "spacelift-async-jobs"
  kms_master_key_id          = aws_kms_key.master.arn
  receive_wait_time_seconds  = 20
  visibility_timeout_seconds = 300

  redrive_policy = jsonencode({
    deadLetterTargetArn = aws_sqs_queue.deadletter_queue.arn
    maxReceiveCount     = 3
  })
}

resource "aws_sqs_queue" "events_inbox_queue" {
  name                       = "spacelift-events-inbox"
  kms_master_key_id          = aws_kms_key.master.arn
  receive_wait_time_seconds  = 20
  visibility_timeout_seconds = 300

  redrive_policy = jsonencode({
    deadLetterTargetArn = aws_sqs_queue.deadletter_queue.arn
    maxReceiveCount     = 3
  })
}

resource "aws_sqs_queue" "async_jobs_fifo_queue" {
  name                       = "spacelift-async-jobs.fifo"
  fifo_queue                 = true
  deduplication_scope        = "messageGroup"
  fifo_throughput_limit      = "perMessageGroupId"
  kms_master_key_id          = aws_kms_key.master.arn
  receive_wait_time_seconds  = 20
  visibility_timeout_seconds = 300

  redrive_policy = jsonencode({
    deadLetterTargetArn = aws_sqs_queue.deadletter_fifo_queue.arn
    maxReceiveCount     = 3
  })
}

resource "aws_sqs_queue" "cronjobs_queue" {
  name                       = "spacelift-cronjobs"
  kms_master_key_id          = aws_kms_key.master.arn
  receive_wait_time_seconds  = 20
  visibility_timeout_seconds = 300
  message_retention_seconds  = 3600

  redrive_policy = jsonencode({
    deadLetterTargetArn = aws_sqs_queue.deadletter_queue.arn
    maxReceiveCount     = 3
  })
}

resource "aws_sqs_queue" "webhooks_queue" {
  name                       = "spacelift-webhooks"
  kms_master_key_id          = aws_kms_key.master.arn
  receive_wait_time_seconds  = 20
  visibility_timeout_seconds = 600

  redrive_policy = jsonencode({
    deadLetterTargetArn = aws_sqs_queue.deadletter_queue.arn
    maxReceiveCount     = 3
  })
}

resource "aws_sqs_queue" "iot_queue" {
  name                       = "spacelift-iot"
  kms_master_key_id          = aws_kms_key.master.arn
  receive_wait_time_seconds  = 20
  visibility_timeout_seconds = 45

  redrive_policy = jsonencode({
    deadLetterTargetArn = aws_sqs_queue.deadletter_queue.arn
    maxReceiveCount     = 3
  })
}
"#;

fn format_cidr_block_list(cidr_blocks: &[String; 3]) -> String {
    let quoted: Vec<String> = cidr_blocks
        .iter()
        .map(|block| format!("\"{block}\""))
        .collect();
    format!("[{}]", quoted.join(", "))
}

fn discovered_or_blank<'a>(value: &'a Option<String>, what: &str) -> &'a str {
    match value {
        Some(value) => value,
        None => {
            warn!("{what} was not discovered; leaving it blank in the generated files");
            ""
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn populated_context() -> MigrationContext {
        let mut context =
            MigrationContext::new(crate::config::AppConfig::default(), "eu-west-1".to_string());
        context.certificate_arn =
            Some("arn:aws:acm:eu-west-1:123456789012:certificate/abc".to_string());
        context.cors_origin = Some("https://spacelift.acme.com".to_string());
        context.binaries_bucket_name = Some("acme-downloads-ab12".to_string());
        context.deliveries_bucket_name = Some("acme-deliveries-ab12".to_string());
        context.large_queue_bucket_name = Some("acme-large-queue-messages-ab12".to_string());
        context.metadata_bucket_name = Some("acme-metadata-ab12".to_string());
        context.modules_bucket_name = Some("acme-modules-ab12".to_string());
        context.policy_bucket_name = Some("acme-policy-inputs-ab12".to_string());
        context.run_logs_bucket_name = Some("acme-run-logs-ab12".to_string());
        context.states_bucket_name = Some("acme-states-ab12".to_string());
        context.uploads_bucket_name = Some("acme-uploads-ab12".to_string());
        context.user_uploads_bucket_name = Some("acme-user-uploaded-workspaces-ab12".to_string());
        context.workspace_bucket_name = Some("acme-workspaces-ab12".to_string());
        context.vpc_cidr_block = Some("10.0.0.0/16".to_string());
        context.private_subnet_cidr_blocks = [
            "10.0.1.0/24".to_string(),
            "10.0.2.0/24".to_string(),
            "10.0.3.0/24".to_string(),
        ];
        context.public_subnet_cidr_blocks = [
            "10.0.4.0/24".to_string(),
            "10.0.5.0/24".to_string(),
            "10.0.6.0/24".to_string(),
        ];
        context.public_subnet_id_2 = Some("subnet-pub2".to_string());
        context.public_subnet_id_3 = Some("subnet-pub3".to_string());
        context.gateway1_route_table_id = Some("rtb-igw1".to_string());
        context.gateway2_association_id = Some("rtbassoc-igw2".to_string());
        context.gateway3_association_id = Some("rtbassoc-igw3".to_string());
        context.rds_engine_version = Some("15.4".to_string());
        context.rds_preferred_backup_window = Some("01:00-02:00".to_string());
        context.rds_instance_identifier = Some("spacelift-primary".to_string());
        context.rds_instance_class = Some("db.r6g.large".to_string());
        context
    }

    #[test]
    fn cutover_script_disassociates_then_reassociates() {
        let context = populated_context();
        let script = render_cutover_script(&context);

        assert_eq!(
            script,
            "#!/bin/bash\n\n\
             aws ec2 disassociate-route-table --no-cli-pager --region eu-west-1 --association-id rtbassoc-igw2 --output json\n\
             aws ec2 disassociate-route-table --no-cli-pager --region eu-west-1 --association-id rtbassoc-igw3 --output json\n\
             aws ec2 associate-route-table --no-cli-pager --region eu-west-1 --subnet-id subnet-pub2 --route-table-id rtb-igw1 --output json\n\
             aws ec2 associate-route-table --no-cli-pager --region eu-west-1 --subnet-id subnet-pub3 --route-table-id rtb-igw1 --output json"
        );
    }

    #[test]
    fn cutover_script_skips_disassociation_when_already_done() {
        let mut context = populated_context();
        context.gateway2_association_id = None;
        context.gateway3_association_id = None;

        let script = render_cutover_script(&context);
        assert!(!script.contains("disassociate-route-table"));
        assert!(script.contains("associate-route-table"));
    }

    #[test]
    fn locals_block_strips_the_scheme_from_the_cors_origin() {
        let context = populated_context();
        let locals = locals_block(&context).unwrap();

        assert!(locals.contains("website_domain    = \"spacelift.acme.com\""));
        assert!(locals.contains("website_endpoint  = \"https://${local.website_domain}\""));
        assert!(locals.contains("region            = \"eu-west-1\""));
    }

    #[test]
    fn locals_block_requires_the_cors_origin() {
        let mut context = populated_context();
        context.cors_origin = None;
        assert!(locals_block(&context).is_err());
    }

    #[test]
    fn core_module_interpolates_discovered_values() {
        let context = populated_context();
        let module = core_module_block("ab12cd34", &context).unwrap();

        assert!(module.contains("unique_suffix    = \"ab12cd34\""));
        assert!(module.contains("binaries     = \"acme-downloads-ab12\""));
        assert!(module.contains("user_uploads = \"acme-user-uploaded-workspaces-ab12\""));
        assert!(module.contains(
            "public_subnet_cidr_blocks  = [\"10.0.4.0/24\", \"10.0.5.0/24\", \"10.0.6.0/24\"]"
        ));
        assert!(module.contains("rds_engine_version              = \"15.4\""));
        assert!(module.contains("instance_identifier = \"spacelift-primary\""));
    }

    #[test]
    fn core_module_requires_all_bucket_names() {
        let mut context = populated_context();
        context.metadata_bucket_name = None;
        let err = core_module_block("ab12cd34", &context).unwrap_err();
        assert!(err.to_string().contains("metadata bucket"));
    }

    #[test]
    fn services_module_source_follows_the_target() {
        let context = populated_context();

        let ecs = services_module_block(&context, TargetModule::Ecs);
        assert!(ecs.contains("terraform-aws-ecs-spacelift-selfhosted"));
        assert!(ecs.contains("server_lb_certificate_arn = \"arn:aws:acm:eu-west-1:123456789012:certificate/abc\""));

        let eks = services_module_block(&context, TargetModule::Eks);
        assert!(eks.contains("terraform-aws-eks-spacelift-selfhosted"));
    }

    #[test]
    fn iot_resources_embed_the_region() {
        let context = populated_context();
        let iot = render_iot_resources(&context);

        assert!(iot.contains("name = \"spacelift-iot-eu-west-1\""));
        assert!(iot.contains("resource \"aws_iot_topic_rule\" \"iot_message_sending_rule\""));
    }
}
