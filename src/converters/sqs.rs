//! Queue imports. Queue names are fixed; queues are imported by URL.

use anyhow::Result;

use super::ImportWriter;

const DEADLETTER: &str = "aws_sqs_queue.deadletter_queue";
const DEADLETTER_FIFO: &str = "aws_sqs_queue.deadletter_fifo_queue";
const ASYNC_JOBS: &str = "aws_sqs_queue.async_jobs_queue";
const EVENTS_INBOX: &str = "aws_sqs_queue.events_inbox_queue";
const ASYNC_JOBS_FIFO: &str = "aws_sqs_queue.async_jobs_fifo_queue";
const CRONJOBS: &str = "aws_sqs_queue.cronjobs_queue";
const WEBHOOKS: &str = "aws_sqs_queue.webhooks_queue";
const IOT: &str = "aws_sqs_queue.iot_queue";

pub struct SqsTerraformer<'a> {
    imports: &'a mut ImportWriter,
}

impl<'a> SqsTerraformer<'a> {
    pub fn new(imports: &'a mut ImportWriter) -> Self {
        Self { imports }
    }

    pub fn sqs_to_terraform(&mut self, queue_name: &str, queue_url: &str) -> Result<()> {
        match queue_name {
            "spacelift-dlq" => self.imports.write_import(DEADLETTER, queue_url),
            "spacelift-dlq.fifo" => self.imports.write_import(DEADLETTER_FIFO, queue_url),
            "spacelift-async-jobs" => self.imports.write_import(ASYNC_JOBS, queue_url),
            "spacelift-events-inbox" => self.imports.write_import(EVENTS_INBOX, queue_url),
            "spacelift-async-jobs.fifo" => self.imports.write_import(ASYNC_JOBS_FIFO, queue_url),
            "spacelift-cronjobs" => self.imports.write_import(CRONJOBS, queue_url),
            "spacelift-webhooks" => self.imports.write_import(WEBHOOKS, queue_url),
            "spacelift-iot" => self.imports.write_import(IOT, queue_url),
            _ => Ok(()),
        }
    }
}
