//! Bucket imports.
//!
//! Buckets are matched on name substrings because the physical names carry
//! the account's unique suffix. Which per-bucket configuration resources
//! get imported (versioning, encryption, lifecycle, public access block,
//! CORS) depends on what the scan actually found on the bucket.

use anyhow::Result;
use aws_sdk_s3::types::CorsRule;

use super::ImportWriter;
use crate::config::AppConfig;
use crate::context::MigrationContext;

/// Everything the scanner learned about one bucket.
#[derive(Debug, Default)]
pub struct BucketState {
    pub versioning_enabled: bool,
    pub sse_enabled: bool,
    pub lifecycle_enabled: bool,
    pub public_access_blocked: bool,
    pub expiration_days: i32,
    pub cors_rules: Vec<CorsRule>,
}

struct BucketSpec {
    /// Substring of the physical bucket name identifying the bucket.
    name_fragment: &'static str,
    record: fn(&mut MigrationContext, String),
    bucket: &'static str,
    versioning: Option<&'static str>,
    encryption: &'static str,
    lifecycle: Option<&'static str>,
    public_access: Option<&'static str>,
    cors: Option<&'static str>,
}

// Match order matters: "user-uploaded-workspaces" must be tried before the
// bare "workspace" fragment. In v2 the binaries bucket was called
// "downloads".
const BUCKETS: &[BucketSpec] = &[
    BucketSpec {
        name_fragment: "downloads",
        record: |ctx, name| ctx.binaries_bucket_name = Some(name),
        bucket: "module.spacelift.module.s3.aws_s3_bucket.binaries",
        versioning: Some("module.spacelift.module.s3.aws_s3_bucket_versioning.binaries"),
        encryption:
            "module.spacelift.module.s3.aws_s3_bucket_server_side_encryption_configuration.binaries",
        lifecycle: None,
        public_access: None,
        cors: None,
    },
    BucketSpec {
        name_fragment: "deliveries",
        record: |ctx, name| ctx.deliveries_bucket_name = Some(name),
        bucket: "module.spacelift.module.s3.aws_s3_bucket.deliveries",
        versioning: None,
        encryption:
            "module.spacelift.module.s3.aws_s3_bucket_server_side_encryption_configuration.deliveries",
        lifecycle: Some("module.spacelift.module.s3.aws_s3_bucket_lifecycle_configuration.deliveries"),
        public_access: Some("module.spacelift.module.s3.aws_s3_bucket_public_access_block.deliveries"),
        cors: None,
    },
    BucketSpec {
        name_fragment: "large-queue",
        record: |ctx, name| ctx.large_queue_bucket_name = Some(name),
        bucket: "module.spacelift.module.s3.aws_s3_bucket.large_queue_messages",
        versioning: Some(
            "module.spacelift.module.s3.aws_s3_bucket_versioning.large_queue_messages",
        ),
        encryption:
            "module.spacelift.module.s3.aws_s3_bucket_server_side_encryption_configuration.large_queue_messages",
        lifecycle: Some(
            "module.spacelift.module.s3.aws_s3_bucket_lifecycle_configuration.large_queue_messages",
        ),
        public_access: Some(
            "module.spacelift.module.s3.aws_s3_bucket_public_access_block.large_queue_messages",
        ),
        cors: None,
    },
    BucketSpec {
        name_fragment: "metadata",
        record: |ctx, name| ctx.metadata_bucket_name = Some(name),
        bucket: "module.spacelift.module.s3.aws_s3_bucket.metadata",
        versioning: Some("module.spacelift.module.s3.aws_s3_bucket_versioning.metadata"),
        encryption:
            "module.spacelift.module.s3.aws_s3_bucket_server_side_encryption_configuration.metadata",
        lifecycle: Some("module.spacelift.module.s3.aws_s3_bucket_lifecycle_configuration.metadata"),
        public_access: Some("module.spacelift.module.s3.aws_s3_bucket_public_access_block.metadata"),
        cors: None,
    },
    BucketSpec {
        name_fragment: "modules",
        record: |ctx, name| ctx.modules_bucket_name = Some(name),
        bucket: "module.spacelift.module.s3.aws_s3_bucket.modules",
        versioning: Some("module.spacelift.module.s3.aws_s3_bucket_versioning.modules"),
        encryption:
            "module.spacelift.module.s3.aws_s3_bucket_server_side_encryption_configuration.modules",
        lifecycle: Some("module.spacelift.module.s3.aws_s3_bucket_lifecycle_configuration.modules"),
        public_access: Some("module.spacelift.module.s3.aws_s3_bucket_public_access_block.modules"),
        cors: None,
    },
    BucketSpec {
        name_fragment: "policy-inputs",
        record: |ctx, name| ctx.policy_bucket_name = Some(name),
        bucket: "module.spacelift.module.s3.aws_s3_bucket.policy_inputs",
        versioning: Some("module.spacelift.module.s3.aws_s3_bucket_versioning.policy_inputs"),
        encryption:
            "module.spacelift.module.s3.aws_s3_bucket_server_side_encryption_configuration.policy_inputs",
        lifecycle: Some(
            "module.spacelift.module.s3.aws_s3_bucket_lifecycle_configuration.policy_inputs",
        ),
        public_access: Some(
            "module.spacelift.module.s3.aws_s3_bucket_public_access_block.policy_inputs",
        ),
        cors: None,
    },
    BucketSpec {
        name_fragment: "run-logs",
        record: |ctx, name| ctx.run_logs_bucket_name = Some(name),
        bucket: "module.spacelift.module.s3.aws_s3_bucket.run_logs",
        versioning: Some("module.spacelift.module.s3.aws_s3_bucket_versioning.run_logs"),
        encryption:
            "module.spacelift.module.s3.aws_s3_bucket_server_side_encryption_configuration.run_logs",
        lifecycle: Some("module.spacelift.module.s3.aws_s3_bucket_lifecycle_configuration.run_logs"),
        public_access: Some("module.spacelift.module.s3.aws_s3_bucket_public_access_block.run_logs"),
        cors: None,
    },
    BucketSpec {
        name_fragment: "states",
        record: |ctx, name| ctx.states_bucket_name = Some(name),
        bucket: "module.spacelift.module.s3.aws_s3_bucket.states",
        versioning: Some("module.spacelift.module.s3.aws_s3_bucket_versioning.states"),
        encryption:
            "module.spacelift.module.s3.aws_s3_bucket_server_side_encryption_configuration.states",
        lifecycle: None,
        public_access: Some("module.spacelift.module.s3.aws_s3_bucket_public_access_block.states"),
        cors: None,
    },
    BucketSpec {
        name_fragment: "user-uploaded-workspaces",
        record: |ctx, name| ctx.user_uploads_bucket_name = Some(name),
        bucket: "module.spacelift.module.s3.aws_s3_bucket.user_uploads",
        versioning: Some("module.spacelift.module.s3.aws_s3_bucket_versioning.user_uploads"),
        encryption:
            "module.spacelift.module.s3.aws_s3_bucket_server_side_encryption_configuration.user_uploads",
        lifecycle: Some(
            "module.spacelift.module.s3.aws_s3_bucket_lifecycle_configuration.user_uploads",
        ),
        public_access: Some(
            "module.spacelift.module.s3.aws_s3_bucket_public_access_block.user_uploads",
        ),
        cors: None,
    },
    BucketSpec {
        name_fragment: "uploads",
        record: |ctx, name| ctx.uploads_bucket_name = Some(name),
        bucket: "module.spacelift.module.s3.aws_s3_bucket.uploads",
        versioning: Some("module.spacelift.module.s3.aws_s3_bucket_versioning.uploads"),
        encryption:
            "module.spacelift.module.s3.aws_s3_bucket_server_side_encryption_configuration.uploads",
        lifecycle: Some("module.spacelift.module.s3.aws_s3_bucket_lifecycle_configuration.uploads"),
        public_access: Some("module.spacelift.module.s3.aws_s3_bucket_public_access_block.uploads"),
        cors: Some("module.spacelift.module.s3.aws_s3_bucket_cors_configuration.uploads[0]"),
    },
    BucketSpec {
        name_fragment: "workspace",
        record: |ctx, name| ctx.workspace_bucket_name = Some(name),
        bucket: "module.spacelift.module.s3.aws_s3_bucket.workspaces",
        versioning: Some("module.spacelift.module.s3.aws_s3_bucket_versioning.workspaces"),
        encryption:
            "module.spacelift.module.s3.aws_s3_bucket_server_side_encryption_configuration.workspaces",
        lifecycle: Some("module.spacelift.module.s3.aws_s3_bucket_lifecycle_configuration.workspaces"),
        public_access: Some(
            "module.spacelift.module.s3.aws_s3_bucket_public_access_block.workspaces",
        ),
        cors: None,
    },
];

const REPLICATION_ROLE: &str = "module.spacelift.module.s3.aws_iam_role.replication[0]";
const REPLICATION_POLICY: &str = "module.spacelift.module.s3.aws_iam_policy.replication[0]";
const REPLICATION_ATTACHMENT: &str =
    "module.spacelift.module.s3.aws_iam_role_policy_attachment.replication[0]";

pub struct S3Terraformer<'a> {
    imports: &'a mut ImportWriter,
    context: &'a mut MigrationContext,
}

impl<'a> S3Terraformer<'a> {
    pub fn new(imports: &'a mut ImportWriter, context: &'a mut MigrationContext) -> Result<Self> {
        imports.write_comment("S3 buckets")?;
        Ok(Self { imports, context })
    }

    pub fn config(&self) -> &AppConfig {
        &self.context.config
    }

    pub fn s3_to_terraform(&mut self, bucket_name: &str, state: &BucketState) -> Result<()> {
        let Some(spec) = BUCKETS
            .iter()
            .find(|spec| bucket_name.contains(spec.name_fragment))
        else {
            return Ok(());
        };

        (spec.record)(self.context, bucket_name.to_string());
        self.imports.write_import(spec.bucket, bucket_name)?;

        if let Some(cors_address) = spec.cors {
            for rule in &state.cors_rules {
                let origins = rule.allowed_origins();
                if let Some(origin) = origins.first() {
                    self.context.cors_origin = Some(origin.clone());
                    self.imports.write_import(cors_address, bucket_name)?;
                }
            }
        }
        if state.versioning_enabled {
            if let Some(address) = spec.versioning {
                self.imports.write_import(address, bucket_name)?;
            }
        }
        if state.sse_enabled {
            self.imports.write_import(spec.encryption, bucket_name)?;
        }
        if state.lifecycle_enabled {
            if let Some(address) = spec.lifecycle {
                self.imports.write_import(address, bucket_name)?;
            }
        }
        if state.public_access_blocked {
            if let Some(address) = spec.public_access {
                self.imports.write_import(address, bucket_name)?;
            }
        }

        Ok(())
    }

    /// Import the cross-region replication role, its policy and the
    /// attachment between them.
    pub fn replication_role_to_terraform(
        &mut self,
        role_name: &str,
        policy_arn: &str,
    ) -> Result<()> {
        self.imports.write_import(REPLICATION_ROLE, role_name)?;
        self.imports.write_import(REPLICATION_POLICY, policy_arn)?;
        self.imports.write_import(
            REPLICATION_ATTACHMENT,
            &format!("{role_name}/{policy_arn}"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use pretty_assertions::assert_eq;

    fn context() -> MigrationContext {
        MigrationContext::new(AppConfig::default(), "eu-west-1".to_string())
    }

    fn imports_written(dir: &tempfile::TempDir) -> String {
        std::fs::read_to_string(dir.path().join("imports.tf")).unwrap()
    }

    #[test]
    fn downloads_bucket_becomes_binaries() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = ImportWriter::create(dir.path()).unwrap();
        let mut ctx = context();
        let mut terraformer = S3Terraformer::new(&mut writer, &mut ctx).unwrap();

        let state = BucketState {
            versioning_enabled: true,
            sse_enabled: true,
            ..Default::default()
        };
        terraformer
            .s3_to_terraform("010101-downloads-deadbeef", &state)
            .unwrap();

        assert_eq!(
            ctx.binaries_bucket_name.as_deref(),
            Some("010101-downloads-deadbeef")
        );
        let contents = imports_written(&dir);
        assert!(contents.contains("aws_s3_bucket.binaries"));
        assert!(contents.contains("aws_s3_bucket_versioning.binaries"));
        assert!(contents.contains("aws_s3_bucket_server_side_encryption_configuration.binaries"));
        // The binaries bucket has no lifecycle or public access block address.
        assert!(!contents.contains("lifecycle"));
        assert!(!contents.contains("public_access_block"));
    }

    #[test]
    fn conditional_imports_follow_the_discovered_state() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = ImportWriter::create(dir.path()).unwrap();
        let mut ctx = context();
        let mut terraformer = S3Terraformer::new(&mut writer, &mut ctx).unwrap();

        terraformer
            .s3_to_terraform("010101-run-logs-deadbeef", &BucketState::default())
            .unwrap();

        let contents = imports_written(&dir);
        assert!(contents.contains("aws_s3_bucket.run_logs"));
        assert!(!contents.contains("aws_s3_bucket_versioning.run_logs"));
        assert!(!contents.contains("aws_s3_bucket_public_access_block.run_logs"));
    }

    #[test]
    fn user_uploaded_workspaces_wins_over_workspace() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = ImportWriter::create(dir.path()).unwrap();
        let mut ctx = context();
        let mut terraformer = S3Terraformer::new(&mut writer, &mut ctx).unwrap();

        terraformer
            .s3_to_terraform(
                "010101-user-uploaded-workspaces-deadbeef",
                &BucketState::default(),
            )
            .unwrap();
        terraformer
            .s3_to_terraform("010101-workspaces-deadbeef", &BucketState::default())
            .unwrap();

        assert_eq!(
            ctx.user_uploads_bucket_name.as_deref(),
            Some("010101-user-uploaded-workspaces-deadbeef")
        );
        assert_eq!(
            ctx.workspace_bucket_name.as_deref(),
            Some("010101-workspaces-deadbeef")
        );
    }

    #[test]
    fn uploads_bucket_records_the_cors_origin() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = ImportWriter::create(dir.path()).unwrap();
        let mut ctx = context();
        let mut terraformer = S3Terraformer::new(&mut writer, &mut ctx).unwrap();

        let state = BucketState {
            cors_rules: vec![CorsRule::builder()
                .allowed_methods("PUT")
                .allowed_origins("https://spacelift.acme.com")
                .build()
                .unwrap()],
            ..Default::default()
        };
        terraformer
            .s3_to_terraform("010101-uploads-deadbeef", &state)
            .unwrap();

        assert_eq!(
            ctx.cors_origin.as_deref(),
            Some("https://spacelift.acme.com")
        );
        assert!(imports_written(&dir)
            .contains("aws_s3_bucket_cors_configuration.uploads[0]"));
    }

    #[test]
    fn unknown_buckets_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = ImportWriter::create(dir.path()).unwrap();
        let mut ctx = context();
        let mut terraformer = S3Terraformer::new(&mut writer, &mut ctx).unwrap();

        terraformer
            .s3_to_terraform("completely-unrelated-bucket", &BucketState::default())
            .unwrap();

        assert_eq!(imports_written(&dir), "# S3 buckets\n\n");
    }

    #[test]
    fn replication_imports_role_policy_and_attachment() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = ImportWriter::create(dir.path()).unwrap();
        let mut ctx = context();
        let mut terraformer = S3Terraformer::new(&mut writer, &mut ctx).unwrap();

        terraformer
            .replication_role_to_terraform(
                "spacelift-replication",
                "arn:aws:iam::123456789012:policy/spacelift-replication",
            )
            .unwrap();

        let contents = imports_written(&dir);
        assert!(contents.contains("aws_iam_role.replication[0]\n  id = \"spacelift-replication\""));
        assert!(contents.contains(
            "id = \"spacelift-replication/arn:aws:iam::123456789012:policy/spacelift-replication\""
        ));
    }
}
