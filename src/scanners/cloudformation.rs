//! Logical-ID → physical-ID resolution through CloudFormation stacks.

use anyhow::{bail, Context, Result};
use aws_config::SdkConfig;
use aws_sdk_cloudformation as cfn;
use std::collections::HashMap;

/// Resolves the physical resources behind a stack's logical IDs.
pub struct StackResourceLookup {
    client: cfn::Client,
}

impl StackResourceLookup {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: cfn::Client::new(config),
        }
    }

    /// Physical resource IDs for the given logical IDs, returned in the
    /// order they were asked for. Every logical ID must exist in the stack.
    pub async fn physical_resource_ids(
        &self,
        stack_name: &str,
        logical_ids: &[&str],
    ) -> Result<Vec<String>> {
        let response = self
            .client
            .describe_stack_resources()
            .stack_name(stack_name)
            .send()
            .await
            .with_context(|| format!("Failed to describe resources of stack {stack_name}"))?;

        let resource_map: HashMap<&str, &str> = response
            .stack_resources()
            .iter()
            .filter_map(|resource| {
                Some((
                    resource.logical_resource_id.as_deref()?,
                    resource.physical_resource_id.as_deref()?,
                ))
            })
            .collect();

        let mut resource_ids = Vec::with_capacity(logical_ids.len());
        for logical_id in logical_ids {
            match resource_map.get(logical_id) {
                Some(physical_id) => resource_ids.push((*physical_id).to_string()),
                None => bail!(
                    "Missing required resource '{logical_id}' in CloudFormation stack {stack_name}"
                ),
            }
        }

        Ok(resource_ids)
    }

    /// Single-resource convenience wrapper.
    pub async fn physical_resource_id(
        &self,
        stack_name: &str,
        logical_id: &str,
    ) -> Result<String> {
        let mut ids = self
            .physical_resource_ids(stack_name, &[logical_id])
            .await?;
        Ok(ids.remove(0))
    }
}
