#[cfg(test)]
mod tests {
    use aws_sdk_ec2::types::{RouteTable, RouteTableAssociation, Tag};
    use spacelift_migrator::config::AppConfig;
    use spacelift_migrator::context::MigrationContext;
    use spacelift_migrator::converters::ec2::Ec2Terraformer;
    use spacelift_migrator::converters::kms::KmsTerraformer;
    use spacelift_migrator::converters::s3::{BucketState, S3Terraformer};
    use spacelift_migrator::converters::sqs::SqsTerraformer;
    use spacelift_migrator::converters::{ImportWriter, LOGICAL_ID_TAG};

    fn logical_id_tag(value: &str) -> Tag {
        Tag::builder().key(LOGICAL_ID_TAG).value(value).build()
    }

    /// Runs several converters back to back against one writer, the way the
    /// real pipeline does, and checks the emitted file front to back.
    #[test]
    fn converters_share_one_append_only_import_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = ImportWriter::create(dir.path()).unwrap();
        let mut context = MigrationContext::new(AppConfig::default(), "eu-west-1".to_string());

        {
            let mut s3 = S3Terraformer::new(&mut writer, &mut context).unwrap();
            s3.s3_to_terraform(
                "acme-states-ab12",
                &BucketState {
                    versioning_enabled: true,
                    sse_enabled: true,
                    public_access_blocked: true,
                    ..Default::default()
                },
            )
            .unwrap();
        }
        {
            let mut kms = KmsTerraformer::new(&mut writer, &mut context);
            kms.kms_to_terraform("key-1234", "KMSMasterKey").unwrap();
        }
        {
            let mut ec2 = Ec2Terraformer::new(&mut writer, &mut context);
            ec2.vpc_to_terraform("vpc-1", "10.0.0.0/16", &[logical_id_tag("VPC")])
                .unwrap();
        }
        {
            let mut sqs = SqsTerraformer::new(&mut writer);
            sqs.sqs_to_terraform(
                "spacelift-webhooks",
                "https://sqs.eu-west-1.amazonaws.com/123456789012/spacelift-webhooks",
            )
            .unwrap();
        }

        let contents = std::fs::read_to_string(dir.path().join("imports.tf")).unwrap();

        // Section order follows converter invocation order.
        let positions: Vec<usize> = [
            "aws_s3_bucket.states",
            "aws_s3_bucket_versioning.states",
            "aws_kms_key.master",
            "aws_vpc.spacelift_vpc",
            "aws_sqs_queue.webhooks_queue",
        ]
        .iter()
        .map(|needle| contents.find(needle).expect(needle))
        .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));

        assert!(contents.starts_with("# S3 buckets\n\n"));
        // states bucket + versioning + encryption + public access block,
        // then one import each from the KMS, EC2 and SQS converters.
        assert_eq!(contents.matches("import {").count(), 7);
        assert_eq!(context.states_bucket_name.as_deref(), Some("acme-states-ab12"));
        assert_eq!(context.vpc_cidr_block.as_deref(), Some("10.0.0.0/16"));
    }

    /// The full route-table dance: table 1 first, then tables 2 and 3
    /// importing their associations against table 1, then the NAT tables.
    #[test]
    fn route_table_cross_references_resolve_through_the_context() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = ImportWriter::create(dir.path()).unwrap();
        let mut context = MigrationContext::new(AppConfig::default(), "eu-west-1".to_string());

        let mut ec2 = Ec2Terraformer::new(&mut writer, &mut context);
        for (subnet_id, name) in [
            ("subnet-pub1", "Spacelift PublicSubnet1"),
            ("subnet-pub2", "Spacelift PublicSubnet2"),
            ("subnet-pub3", "Spacelift PublicSubnet3"),
        ] {
            ec2.subnet_to_terraform(
                subnet_id,
                "10.0.0.0/24",
                &[Tag::builder().key("Name").value(name).build()],
            )
            .unwrap();
        }

        let table = |id: &str, assoc: &[(&str, &str)]| {
            let mut builder = RouteTable::builder().route_table_id(id);
            for (assoc_id, subnet_id) in assoc {
                builder = builder.associations(
                    RouteTableAssociation::builder()
                        .route_table_association_id(*assoc_id)
                        .subnet_id(*subnet_id)
                        .build(),
                );
            }
            builder.build()
        };

        ec2.route_table_to_terraform(
            &table("rtb-igw1", &[("rtbassoc-1", "subnet-pub1")]),
            "InternetGatewayRouteTable1",
        )
        .unwrap();
        ec2.route_table_to_terraform(
            &table("rtb-igw2", &[("rtbassoc-2", "subnet-pub2")]),
            "InternetGatewayRouteTable2",
        )
        .unwrap();
        ec2.route_table_to_terraform(
            &table("rtb-igw3", &[("rtbassoc-3", "subnet-pub3")]),
            "InternetGatewayRouteTable3",
        )
        .unwrap();
        ec2.route_table_to_terraform(
            &table("rtb-nat1", &[("rtbassoc-nat1", "subnet-priv1")]),
            "NATGatewayRouteTable1",
        )
        .unwrap();

        assert_eq!(context.gateway2_association_id.as_deref(), Some("rtbassoc-2"));
        assert_eq!(context.gateway3_association_id.as_deref(), Some("rtbassoc-3"));

        let contents = std::fs::read_to_string(dir.path().join("imports.tf")).unwrap();
        // Tables 2 and 3 bind their subnets to table 1's ID.
        assert!(contents.contains(
            "aws_route_table_association.internet_gateway[1]\n  id = \"subnet-pub2/rtb-igw1\""
        ));
        assert!(contents.contains(
            "aws_route_table_association.internet_gateway[2]\n  id = \"subnet-pub3/rtb-igw1\""
        ));
        // NAT tables bind to their own IDs.
        assert!(contents.contains(
            "aws_route_table_association.nat_gateway[0]\n  id = \"subnet-priv1/rtb-nat1\""
        ));
        // Only table 1 itself is imported as the internet gateway table.
        assert_eq!(contents.matches("aws_route_table.internet_gateway\n").count(), 1);
    }

    /// Subnets must be scanned before route tables; a missing cross
    /// reference is a hard error, not a silently corrupted import.
    #[test]
    fn route_tables_before_subnets_fail_fast() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = ImportWriter::create(dir.path()).unwrap();
        let mut context = MigrationContext::new(AppConfig::default(), "eu-west-1".to_string());

        let mut ec2 = Ec2Terraformer::new(&mut writer, &mut context);
        let table = RouteTable::builder()
            .route_table_id("rtb-igw1")
            .associations(
                RouteTableAssociation::builder()
                    .route_table_association_id("rtbassoc-1")
                    .subnet_id("subnet-pub1")
                    .build(),
            )
            .build();

        let err = ec2
            .route_table_to_terraform(&table, "InternetGatewayRouteTable1")
            .unwrap_err();
        assert!(err.to_string().contains("PublicSubnet1 was not discovered"));
    }
}
