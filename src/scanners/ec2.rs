//! Network discovery.
//!
//! All lookups are anchored in the two legacy VPC stacks. The ordering of
//! the private scans matters: subnets must be discovered before route
//! tables (the association imports need the public subnet IDs), and route
//! table 1 before tables 2 and 3.

use anyhow::{Context, Result};
use aws_config::SdkConfig;
use aws_sdk_ec2::types::{Filter, RouteTable};
use tracing::info;

use super::cloudformation::StackResourceLookup;
use crate::converters::ec2::Ec2Terraformer;
use crate::converters::LOGICAL_ID_TAG;

const VPC_STACK: &str = "spacelift-infra-vpc";
const VPC_CONFIG_STACK: &str = "spacelift-infra-vpc-config";

pub struct Ec2Scanner {
    ec2: aws_sdk_ec2::Client,
    stacks: StackResourceLookup,
}

impl Ec2Scanner {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            ec2: aws_sdk_ec2::Client::new(config),
            stacks: StackResourceLookup::new(config),
        }
    }

    pub async fn scan(&self, terraformer: &mut Ec2Terraformer<'_>) -> Result<()> {
        info!("Scanning EC2 resources");

        if terraformer.uses_custom_vpc() {
            return Ok(());
        }

        self.scan_vpcs(terraformer).await?;
        self.scan_subnets(terraformer).await?;
        self.scan_internet_gateways(terraformer).await?;
        self.scan_route_tables(terraformer).await?;
        self.scan_elastic_ips(terraformer).await?;
        self.scan_nat_gateways(terraformer).await?;
        self.scan_security_groups(terraformer).await
    }

    async fn scan_vpcs(&self, terraformer: &mut Ec2Terraformer<'_>) -> Result<()> {
        let vpc_id = self.stacks.physical_resource_id(VPC_STACK, "VPC").await?;

        let response = self
            .ec2
            .describe_vpcs()
            .vpc_ids(&vpc_id)
            .send()
            .await
            .with_context(|| format!("Failed to describe VPC {vpc_id}"))?;
        let vpc = response
            .vpcs()
            .first()
            .with_context(|| format!("VPC {vpc_id} not found"))?;

        terraformer.vpc_to_terraform(
            vpc.vpc_id.as_deref().unwrap_or(&vpc_id),
            vpc.cidr_block
                .as_deref()
                .with_context(|| format!("VPC {vpc_id} has no CIDR block"))?,
            vpc.tags(),
        )
    }

    async fn scan_subnets(&self, terraformer: &mut Ec2Terraformer<'_>) -> Result<()> {
        let mut subnet_ids = self
            .stacks
            .physical_resource_ids(
                VPC_STACK,
                &["PrivateSubnet1", "PrivateSubnet2", "PrivateSubnet3"],
            )
            .await?;
        subnet_ids.extend(
            self.stacks
                .physical_resource_ids(
                    VPC_CONFIG_STACK,
                    &["PublicSubnet1", "PublicSubnet2", "PublicSubnet3"],
                )
                .await?,
        );

        let response = self
            .ec2
            .describe_subnets()
            .set_subnet_ids(Some(subnet_ids))
            .send()
            .await
            .context("Failed to describe subnets")?;

        for subnet in response.subnets() {
            let subnet_id = subnet.subnet_id.as_deref().context("Subnet has no ID")?;
            let cidr_block = subnet
                .cidr_block
                .as_deref()
                .with_context(|| format!("Subnet {subnet_id} has no CIDR block"))?;
            terraformer.subnet_to_terraform(subnet_id, cidr_block, subnet.tags())?;
        }
        Ok(())
    }

    async fn scan_internet_gateways(&self, terraformer: &mut Ec2Terraformer<'_>) -> Result<()> {
        let igw_id = self
            .stacks
            .physical_resource_id(VPC_CONFIG_STACK, "InternetGateway")
            .await?;
        terraformer.internet_gateway_to_terraform(&igw_id)
    }

    async fn scan_route_tables(&self, terraformer: &mut Ec2Terraformer<'_>) -> Result<()> {
        const LOGICAL_IDS: [&str; 6] = [
            "InternetGatewayRouteTable1",
            "InternetGatewayRouteTable2",
            "InternetGatewayRouteTable3",
            "NATGatewayRouteTable1",
            "NATGatewayRouteTable2",
            "NATGatewayRouteTable3",
        ];

        let route_table_ids = self
            .stacks
            .physical_resource_ids(VPC_CONFIG_STACK, &LOGICAL_IDS)
            .await?;
        let response = self
            .ec2
            .describe_route_tables()
            .set_route_table_ids(Some(route_table_ids))
            .send()
            .await
            .context("Failed to describe route tables")?;

        // Table 1 must be converted before tables 2 and 3; their
        // association imports point at its ID.
        for logical_id in LOGICAL_IDS {
            let route_table = route_table_by_logical_id(response.route_tables(), logical_id)?;
            terraformer.route_table_to_terraform(route_table, logical_id)?;
        }
        Ok(())
    }

    async fn scan_elastic_ips(&self, terraformer: &mut Ec2Terraformer<'_>) -> Result<()> {
        let public_ips = self
            .stacks
            .physical_resource_ids(
                VPC_CONFIG_STACK,
                &["NATGatewayEIP1", "NATGatewayEIP2", "NATGatewayEIP3"],
            )
            .await?;

        let response = self
            .ec2
            .describe_addresses()
            .set_public_ips(Some(public_ips))
            .send()
            .await
            .context("Failed to describe elastic IPs")?;

        for address in response.addresses() {
            let allocation_id = address
                .allocation_id
                .as_deref()
                .context("Elastic IP has no allocation ID")?;
            terraformer.elastic_ip_to_terraform(allocation_id, address.tags())?;
        }
        Ok(())
    }

    async fn scan_nat_gateways(&self, terraformer: &mut Ec2Terraformer<'_>) -> Result<()> {
        let gateway_ids = self
            .stacks
            .physical_resource_ids(
                VPC_CONFIG_STACK,
                &["NATGateway1", "NATGateway2", "NATGateway3"],
            )
            .await?;

        for (logical_id, gateway_id) in ["NATGateway1", "NATGateway2", "NATGateway3"]
            .iter()
            .zip(&gateway_ids)
        {
            terraformer.nat_gateway_to_terraform(logical_id, gateway_id)?;
        }
        Ok(())
    }

    async fn scan_security_groups(&self, terraformer: &mut Ec2Terraformer<'_>) -> Result<()> {
        let group_ids = self
            .stacks
            .physical_resource_ids(
                VPC_STACK,
                &[
                    "ServerSecurityGroup",
                    "DrainSecurityGroup",
                    "DatabaseSecurityGroup",
                    "SchedulerSecurityGroup",
                ],
            )
            .await?;

        let response = self
            .ec2
            .describe_security_groups()
            .set_group_ids(Some(group_ids))
            .send()
            .await
            .context("Failed to describe security groups")?;

        for security_group in response.security_groups() {
            let group_id = security_group
                .group_id
                .as_deref()
                .context("Security group has no ID")?;

            let rules = self
                .ec2
                .describe_security_group_rules()
                .filters(
                    Filter::builder()
                        .name("group-id")
                        .values(group_id)
                        .build(),
                )
                .send()
                .await
                .with_context(|| format!("Failed to list rules of security group {group_id}"))?;

            terraformer.security_group_to_terraform(
                group_id,
                rules.security_group_rules(),
                security_group.tags(),
            )?;
        }
        Ok(())
    }
}

fn route_table_by_logical_id<'a>(
    route_tables: &'a [RouteTable],
    logical_id: &str,
) -> Result<&'a RouteTable> {
    route_tables
        .iter()
        .find(|route_table| {
            route_table.tags().iter().any(|tag| {
                tag.key.as_deref() == Some(LOGICAL_ID_TAG)
                    && tag.value.as_deref() == Some(logical_id)
            })
        })
        .with_context(|| format!("Route table with name {logical_id} not found"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_ec2::types::Tag;

    #[test]
    fn route_tables_are_matched_by_logical_id_tag() {
        let tables = vec![
            RouteTable::builder()
                .route_table_id("rtb-1")
                .tags(
                    Tag::builder()
                        .key(LOGICAL_ID_TAG)
                        .value("InternetGatewayRouteTable1")
                        .build(),
                )
                .build(),
            RouteTable::builder()
                .route_table_id("rtb-2")
                .tags(Tag::builder().key("Name").value("something else").build())
                .build(),
        ];

        let found = route_table_by_logical_id(&tables, "InternetGatewayRouteTable1").unwrap();
        assert_eq!(found.route_table_id.as_deref(), Some("rtb-1"));

        let missing = route_table_by_logical_id(&tables, "NATGatewayRouteTable1");
        assert!(missing.is_err());
    }
}
