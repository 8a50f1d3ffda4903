//! Queue discovery. CloudFormation returns queue URLs as the physical IDs;
//! the queue name is the last URL segment.

use anyhow::{bail, Result};
use aws_config::SdkConfig;
use tracing::info;

use super::cloudformation::StackResourceLookup;
use crate::converters::sqs::SqsTerraformer;

const STACK: &str = "spacelift-infra";

const QUEUE_LOGICAL_IDS: [&str; 8] = [
    "AsyncJobsFIFOQueue",
    "AsyncJobsQueue",
    "CronjobsQueue",
    "DeadletterFIFOQueue",
    "DeadletterQueue",
    "EventsInboxQueue",
    "IoTQueue",
    "WebhooksQueue",
];

pub struct SqsScanner {
    stacks: StackResourceLookup,
}

impl SqsScanner {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            stacks: StackResourceLookup::new(config),
        }
    }

    pub async fn scan(&self, terraformer: &mut SqsTerraformer<'_>) -> Result<()> {
        info!("Scanning SQS resources");

        let queue_urls = self
            .stacks
            .physical_resource_ids(STACK, &QUEUE_LOGICAL_IDS)
            .await?;

        if queue_urls.is_empty() {
            bail!("No SQS queues found");
        }

        for url in &queue_urls {
            let name = url.rsplit('/').next().unwrap_or(url);
            terraformer.sqs_to_terraform(name, url)?;
        }
        Ok(())
    }
}
