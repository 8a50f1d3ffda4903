//! One-shot migration utility that adopts a self-hosted v2 installation's
//! AWS resources into the v3 Terraform modules.
//!
//! The run is a fixed pipeline: scanners discover the known resource
//! inventory (mostly through the legacy CloudFormation stacks), converters
//! map each discovery to a Terraform address and append an `import` block,
//! and the generator renders the accompanying `.tf` files plus the cutover
//! script from the accumulated [`context::MigrationContext`].
//!
//! Scan order is load-bearing: subnets before route tables, route table 1
//! before tables 2 and 3, and everything before the generator. Reordering
//! the pipeline silently breaks the cross-references, which is why it lives
//! in one place ([`run`]) instead of being configurable.

#![warn(clippy::all, rust_2018_idioms)]

pub mod aws;
pub mod cli;
pub mod config;
pub mod context;
pub mod converters;
pub mod generator;
pub mod scanners;

use anyhow::{bail, Context, Result};
use aws_config::SdkConfig;
use tracing::info;

use cli::Cli;
use context::MigrationContext;
use converters::ec2::Ec2Terraformer;
use converters::ecr::EcrTerraformer;
use converters::iot::IotTerraformer;
use converters::kms::KmsTerraformer;
use converters::rds::RdsTerraformer;
use converters::s3::S3Terraformer;
use converters::secretsmanager::SecretsManagerTerraformer;
use converters::sqs::SqsTerraformer;
use converters::ImportWriter;
use scanners::ec2::Ec2Scanner;
use scanners::kms::KmsScanner;
use scanners::rds::RdsScanner;
use scanners::s3::S3Scanner;
use scanners::secretsmanager::SecretsManagerScanner;
use scanners::sqs::SqsScanner;

/// Name of the load balancer fronting the server service; its HTTPS
/// listener carries the certificate the generated configuration reuses.
const SERVER_LOAD_BALANCER: &str = "spacelift-server";

/// Run the whole migration: scan the account, write `imports.tf`, generate
/// the Terraform project.
pub async fn run(args: Cli) -> Result<()> {
    let config = config::load_app_config(&args.config)?;
    let region = config
        .aws_region
        .clone()
        .context("aws_region is missing from the configuration file")?;

    let sdk_config = aws::create_sdk_config(&region, args.profile.as_deref()).await;

    let unique_suffix = get_unique_suffix(&sdk_config).await?;
    let certificate_arn = get_certificate_arn(&sdk_config).await?;

    let mut context = MigrationContext::new(config, region);
    context.certificate_arn = Some(certificate_arn);

    let mut imports = ImportWriter::create(&args.output)?;

    info!("Alright, let's start scanning for resources...");

    {
        let mut terraformer = S3Terraformer::new(&mut imports, &mut context)?;
        S3Scanner::new(&sdk_config).scan(&mut terraformer).await?;
    }
    {
        let mut terraformer = KmsTerraformer::new(&mut imports, &mut context);
        KmsScanner::new(&sdk_config).scan(&mut terraformer).await?;
    }
    {
        let mut terraformer = Ec2Terraformer::new(&mut imports, &mut context);
        Ec2Scanner::new(&sdk_config).scan(&mut terraformer).await?;
    }
    {
        let mut terraformer = EcrTerraformer::new(&mut imports);
        scanners::ecr::scan_ecr_resources(&mut terraformer)?;
    }
    {
        let mut terraformer = SecretsManagerTerraformer::new(&mut imports);
        SecretsManagerScanner::new(&sdk_config)
            .scan(&mut terraformer)
            .await?;
    }
    {
        let mut terraformer = RdsTerraformer::new(&mut imports, &mut context);
        RdsScanner::new(&sdk_config).scan(&mut terraformer).await?;
    }
    {
        let mut terraformer = IotTerraformer::new(&mut imports, &mut context);
        scanners::iot::scan_iot_resources(&mut terraformer)?;
    }
    {
        let mut terraformer = SqsTerraformer::new(&mut imports);
        SqsScanner::new(&sdk_config).scan(&mut terraformer).await?;
    }

    generator::generate_terraform_files(
        &unique_suffix,
        &context,
        &args.output,
        args.target_module,
    )?;

    println!(
        "Terraform files have been generated in the following directory: {}\n\
         Everything is ready to go!",
        args.output.display()
    );

    Ok(())
}

/// The account-specific suffix embedded in legacy resource names. Required:
/// without it the generated module call cannot reproduce the names.
async fn get_unique_suffix(sdk_config: &SdkConfig) -> Result<String> {
    match aws::get_ssm_parameter(sdk_config, aws::UNIQUE_SUFFIX_PARAMETER).await? {
        Some(suffix) => {
            info!(
                "Found unique suffix in SSM Parameter Store ({}): {suffix}",
                aws::UNIQUE_SUFFIX_PARAMETER
            );
            Ok(suffix)
        }
        None => bail!(
            "SSM Parameter '{}' is required but not found. \
             Make sure it exists in the SSM Parameter Store.",
            aws::UNIQUE_SUFFIX_PARAMETER
        ),
    }
}

async fn get_certificate_arn(sdk_config: &SdkConfig) -> Result<String> {
    aws::get_load_balancer_certificate_arn(sdk_config, SERVER_LOAD_BALANCER)
        .await
        .context("Failed to get certificate ARN from load balancer")?
        .with_context(|| {
            format!("No HTTPS listener (port 443) found on the {SERVER_LOAD_BALANCER} load balancer")
        })
}
