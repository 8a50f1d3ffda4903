//! Networking imports: VPC, subnets, gateways, route tables, security groups.
//!
//! The v2 CloudFormation templates created one route table per public
//! subnet; the v3 modules use a single internet-gateway route table. Tables
//! 2 and 3 therefore import their subnet associations *against table 1's
//! ID*, and their current association IDs are recorded so the generated
//! cutover script can re-point the subnets before `terraform apply`.

use anyhow::{bail, Context, Result};
use aws_sdk_ec2::types::{RouteTable, SecurityGroupRule, Tag};

use super::{ImportWriter, LOGICAL_ID_TAG};
use crate::context::MigrationContext;

const VPC: &str = "module.spacelift.module.network[0].aws_vpc.spacelift_vpc";

const PRIVATE_SUBNETS: [&str; 3] = [
    "module.spacelift.module.network[0].aws_subnet.private_subnets[0]",
    "module.spacelift.module.network[0].aws_subnet.private_subnets[1]",
    "module.spacelift.module.network[0].aws_subnet.private_subnets[2]",
];
const PUBLIC_SUBNETS: [&str; 3] = [
    "module.spacelift.module.network[0].aws_subnet.public_subnets[0]",
    "module.spacelift.module.network[0].aws_subnet.public_subnets[1]",
    "module.spacelift.module.network[0].aws_subnet.public_subnets[2]",
];

const INTERNET_GATEWAY: &str = "module.spacelift.module.network[0].aws_internet_gateway.main";

const INTERNET_GATEWAY_ROUTE_TABLE: &str =
    "module.spacelift.module.network[0].aws_route_table.internet_gateway";
const INTERNET_GATEWAY_ASSOCIATIONS: [&str; 3] = [
    "module.spacelift.module.network[0].aws_route_table_association.internet_gateway[0]",
    "module.spacelift.module.network[0].aws_route_table_association.internet_gateway[1]",
    "module.spacelift.module.network[0].aws_route_table_association.internet_gateway[2]",
];

const NAT_GATEWAY_ROUTE_TABLES: [&str; 3] = [
    "module.spacelift.module.network[0].aws_route_table.nat_gateway[0]",
    "module.spacelift.module.network[0].aws_route_table.nat_gateway[1]",
    "module.spacelift.module.network[0].aws_route_table.nat_gateway[2]",
];
const NAT_GATEWAY_ASSOCIATIONS: [&str; 3] = [
    "module.spacelift.module.network[0].aws_route_table_association.nat_gateway[0]",
    "module.spacelift.module.network[0].aws_route_table_association.nat_gateway[1]",
    "module.spacelift.module.network[0].aws_route_table_association.nat_gateway[2]",
];

const EIPS: [&str; 3] = [
    "module.spacelift.module.network[0].aws_eip.eips[0]",
    "module.spacelift.module.network[0].aws_eip.eips[1]",
    "module.spacelift.module.network[0].aws_eip.eips[2]",
];
const NAT_GATEWAYS: [&str; 3] = [
    "module.spacelift.module.network[0].aws_nat_gateway.nat_gateways[0]",
    "module.spacelift.module.network[0].aws_nat_gateway.nat_gateways[1]",
    "module.spacelift.module.network[0].aws_nat_gateway.nat_gateways[2]",
];

const SCHEDULER_SG: &str = "module.spacelift.module.network[0].aws_security_group.scheduler_sg";
const SCHEDULER_SG_EGRESS: &str =
    "module.spacelift.module.network[0].aws_vpc_security_group_egress_rule.scheduler_sg_egress_rule";
const DRAIN_SG: &str = "module.spacelift.module.network[0].aws_security_group.drain_sg";
const DRAIN_SG_EGRESS: &str =
    "module.spacelift.module.network[0].aws_vpc_security_group_egress_rule.drain_sg_egress_rule";
const SERVER_SG: &str = "module.spacelift.module.network[0].aws_security_group.server_sg";
const SERVER_SG_EGRESS: &str =
    "module.spacelift.module.network[0].aws_vpc_security_group_egress_rule.server_sg_egress_rule";
const DATABASE_SG: &str = "module.spacelift.module.network[0].aws_security_group.database_sg[0]";
const DATABASE_DRAIN_INGRESS: &str =
    "module.spacelift.module.network[0].aws_vpc_security_group_ingress_rule.database_drain_ingress_rule[0]";
const DATABASE_SERVER_INGRESS: &str =
    "module.spacelift.module.network[0].aws_vpc_security_group_ingress_rule.database_server_ingress_rule[0]";
const DATABASE_SCHEDULER_INGRESS: &str =
    "module.spacelift.module.network[0].aws_vpc_security_group_ingress_rule.database_scheduler_ingress_rule[0]";

pub struct Ec2Terraformer<'a> {
    imports: &'a mut ImportWriter,
    context: &'a mut MigrationContext,
}

fn has_tag(tags: &[Tag], key: &str, value: &str) -> bool {
    tags.iter()
        .any(|tag| tag.key.as_deref() == Some(key) && tag.value.as_deref() == Some(value))
}

impl<'a> Ec2Terraformer<'a> {
    pub fn new(imports: &'a mut ImportWriter, context: &'a mut MigrationContext) -> Self {
        Self { imports, context }
    }

    pub fn uses_custom_vpc(&self) -> bool {
        self.context.config.uses_custom_vpc()
    }

    pub fn vpc_to_terraform(&mut self, vpc_id: &str, cidr_block: &str, tags: &[Tag]) -> Result<()> {
        if has_tag(tags, LOGICAL_ID_TAG, "VPC") {
            self.context.vpc_cidr_block = Some(cidr_block.to_string());
            self.imports.write_import(VPC, vpc_id)?;
        }
        Ok(())
    }

    pub fn subnet_to_terraform(
        &mut self,
        subnet_id: &str,
        cidr_block: &str,
        tags: &[Tag],
    ) -> Result<()> {
        for tag in tags {
            if tag.key.as_deref() != Some("Name") {
                continue;
            }
            match tag.value.as_deref() {
                Some("Spacelift PrivateSubnet1") => {
                    self.context.private_subnet_cidr_blocks[0] = cidr_block.to_string();
                    self.imports.write_import(PRIVATE_SUBNETS[0], subnet_id)?;
                }
                Some("Spacelift PrivateSubnet2") => {
                    self.context.private_subnet_cidr_blocks[1] = cidr_block.to_string();
                    self.imports.write_import(PRIVATE_SUBNETS[1], subnet_id)?;
                }
                Some("Spacelift PrivateSubnet3") => {
                    self.context.private_subnet_cidr_blocks[2] = cidr_block.to_string();
                    self.imports.write_import(PRIVATE_SUBNETS[2], subnet_id)?;
                }
                Some("Spacelift PublicSubnet1") => {
                    self.context.public_subnet_id_1 = Some(subnet_id.to_string());
                    self.context.public_subnet_cidr_blocks[0] = cidr_block.to_string();
                    self.imports.write_import(PUBLIC_SUBNETS[0], subnet_id)?;
                }
                Some("Spacelift PublicSubnet2") => {
                    self.context.public_subnet_id_2 = Some(subnet_id.to_string());
                    self.context.public_subnet_cidr_blocks[1] = cidr_block.to_string();
                    self.imports.write_import(PUBLIC_SUBNETS[1], subnet_id)?;
                }
                Some("Spacelift PublicSubnet3") => {
                    self.context.public_subnet_id_3 = Some(subnet_id.to_string());
                    self.context.public_subnet_cidr_blocks[2] = cidr_block.to_string();
                    self.imports.write_import(PUBLIC_SUBNETS[2], subnet_id)?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    pub fn internet_gateway_to_terraform(&mut self, igw_id: &str) -> Result<()> {
        self.imports.write_import(INTERNET_GATEWAY, igw_id)
    }

    /// Import a route table discovered under the given CloudFormation
    /// logical ID, enforcing the association counts the migration relies on.
    pub fn route_table_to_terraform(
        &mut self,
        route_table: &RouteTable,
        logical_id: &str,
    ) -> Result<()> {
        let route_table_id = route_table
            .route_table_id
            .as_deref()
            .with_context(|| format!("{logical_id} has no route table ID"))?
            .to_string();
        let associations = route_table.associations();

        match logical_id {
            "InternetGatewayRouteTable1" => {
                self.context.gateway1_route_table_id = Some(route_table_id.clone());

                if associations.len() != 1 && associations.len() != 3 {
                    bail!(
                        "InternetGatewayRouteTable1 should have only one association, \
                         or three if the first_step.sh script was run"
                    );
                }
                self.imports
                    .write_import(INTERNET_GATEWAY_ROUTE_TABLE, &route_table_id)?;

                let subnet_id = self.public_subnet_id(1)?;
                self.imports.write_import(
                    INTERNET_GATEWAY_ASSOCIATIONS[0],
                    &format!("{subnet_id}/{route_table_id}"),
                )?;
            }
            "InternetGatewayRouteTable2" => {
                self.context.gateway2_route_table_id = Some(route_table_id);
                let gateway1_id = self.gateway1_route_table_id()?;
                let assoc_id =
                    format!("{}/{}", self.public_subnet_id(2)?, gateway1_id);

                // An empty association list means the cutover script already ran.
                if associations.is_empty() {
                    self.imports
                        .write_import(INTERNET_GATEWAY_ASSOCIATIONS[1], &assoc_id)?;
                    return Ok(());
                }

                if associations.len() != 1 {
                    bail!("InternetGatewayRouteTable2 should have only one association");
                }
                self.imports
                    .write_import(INTERNET_GATEWAY_ASSOCIATIONS[1], &assoc_id)?;
                self.context.gateway2_association_id = associations[0]
                    .route_table_association_id
                    .clone();
            }
            "InternetGatewayRouteTable3" => {
                self.context.gateway3_route_table_id = Some(route_table_id);
                let gateway1_id = self.gateway1_route_table_id()?;
                let assoc_id =
                    format!("{}/{}", self.public_subnet_id(3)?, gateway1_id);

                if associations.is_empty() {
                    self.imports
                        .write_import(INTERNET_GATEWAY_ASSOCIATIONS[2], &assoc_id)?;
                    return Ok(());
                }

                if associations.len() != 1 {
                    bail!("InternetGatewayRouteTable3 should have only one association");
                }
                self.imports
                    .write_import(INTERNET_GATEWAY_ASSOCIATIONS[2], &assoc_id)?;
                self.context.gateway3_association_id = associations[0]
                    .route_table_association_id
                    .clone();
            }
            "NATGatewayRouteTable1" | "NATGatewayRouteTable2" | "NATGatewayRouteTable3" => {
                let index = match logical_id {
                    "NATGatewayRouteTable1" => 0,
                    "NATGatewayRouteTable2" => 1,
                    _ => 2,
                };
                self.imports
                    .write_import(NAT_GATEWAY_ROUTE_TABLES[index], &route_table_id)?;

                if associations.len() != 1 {
                    bail!("{logical_id} should have only one association");
                }
                let subnet_id = associations[0]
                    .subnet_id
                    .as_deref()
                    .with_context(|| format!("{logical_id} association has no subnet"))?;
                self.imports.write_import(
                    NAT_GATEWAY_ASSOCIATIONS[index],
                    &format!("{subnet_id}/{route_table_id}"),
                )?;
            }
            _ => {}
        }

        Ok(())
    }

    pub fn elastic_ip_to_terraform(&mut self, allocation_id: &str, tags: &[Tag]) -> Result<()> {
        for tag in tags {
            if tag.key.as_deref() != Some(LOGICAL_ID_TAG) {
                continue;
            }
            match tag.value.as_deref() {
                Some("NATGatewayEIP1") => self.imports.write_import(EIPS[0], allocation_id)?,
                Some("NATGatewayEIP2") => self.imports.write_import(EIPS[1], allocation_id)?,
                Some("NATGatewayEIP3") => self.imports.write_import(EIPS[2], allocation_id)?,
                _ => {}
            }
        }
        Ok(())
    }

    pub fn nat_gateway_to_terraform(&mut self, logical_id: &str, gateway_id: &str) -> Result<()> {
        match logical_id {
            "NATGateway1" => self.imports.write_import(NAT_GATEWAYS[0], gateway_id),
            "NATGateway2" => self.imports.write_import(NAT_GATEWAYS[1], gateway_id),
            "NATGateway3" => self.imports.write_import(NAT_GATEWAYS[2], gateway_id),
            _ => Ok(()),
        }
    }

    pub fn security_group_to_terraform(
        &mut self,
        security_group_id: &str,
        rules: &[SecurityGroupRule],
        tags: &[Tag],
    ) -> Result<()> {
        if has_tag(tags, LOGICAL_ID_TAG, "SchedulerSecurityGroup") {
            self.simple_security_group(security_group_id, rules, SCHEDULER_SG, SCHEDULER_SG_EGRESS)?;
        }
        if has_tag(tags, LOGICAL_ID_TAG, "DrainSecurityGroup") {
            self.simple_security_group(security_group_id, rules, DRAIN_SG, DRAIN_SG_EGRESS)?;
        }
        if has_tag(tags, LOGICAL_ID_TAG, "ServerSecurityGroup") {
            self.simple_security_group(security_group_id, rules, SERVER_SG, SERVER_SG_EGRESS)?;
        }
        if has_tag(tags, LOGICAL_ID_TAG, "DatabaseSecurityGroup") {
            self.imports.write_import(DATABASE_SG, security_group_id)?;
            for rule in rules {
                if rule.is_egress == Some(true) {
                    continue;
                }
                let Some(rule_id) = rule.security_group_rule_id.as_deref() else {
                    continue;
                };
                let description = rule.description.as_deref().unwrap_or_default();
                if description.contains("from the drain") {
                    self.imports.write_import(DATABASE_DRAIN_INGRESS, rule_id)?;
                }
                if description.contains("from the server") {
                    self.imports.write_import(DATABASE_SERVER_INGRESS, rule_id)?;
                }
                if description.contains("from the scheduler") {
                    self.imports
                        .write_import(DATABASE_SCHEDULER_INGRESS, rule_id)?;
                }
            }
        }
        Ok(())
    }

    /// Group plus its single egress rule; the scheduler, drain and server
    /// groups all follow this shape.
    fn simple_security_group(
        &mut self,
        security_group_id: &str,
        rules: &[SecurityGroupRule],
        group_address: &str,
        egress_address: &str,
    ) -> Result<()> {
        self.imports.write_import(group_address, security_group_id)?;
        for rule in rules {
            if rule.is_egress == Some(true) {
                if let Some(rule_id) = rule.security_group_rule_id.as_deref() {
                    self.imports.write_import(egress_address, rule_id)?;
                }
            }
        }
        Ok(())
    }

    fn public_subnet_id(&self, number: u8) -> Result<String> {
        let subnet = match number {
            1 => &self.context.public_subnet_id_1,
            2 => &self.context.public_subnet_id_2,
            _ => &self.context.public_subnet_id_3,
        };
        subnet.clone().with_context(|| {
            format!("PublicSubnet{number} was not discovered before the route table scan")
        })
    }

    fn gateway1_route_table_id(&self) -> Result<String> {
        self.context
            .gateway1_route_table_id
            .clone()
            .context("InternetGatewayRouteTable1 was not discovered before tables 2 and 3")
    }
}
