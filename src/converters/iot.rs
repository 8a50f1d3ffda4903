//! IoT Core imports. Nothing is discovered here: the role, topic rule and
//! role policy have fixed names derived from the region.

use anyhow::Result;

use super::ImportWriter;
use crate::context::MigrationContext;

const MESSAGE_SENDER_ROLE: &str = "aws_iam_role.iot_message_sender_role";
const MESSAGE_SENDING_RULE: &str = "aws_iot_topic_rule.iot_message_sending_rule";
const MESSAGE_SENDER_ROLE_POLICY: &str = "aws_iam_role_policy.iot_message_sender_role_policy";

pub struct IotTerraformer<'a> {
    imports: &'a mut ImportWriter,
    context: &'a mut MigrationContext,
}

impl<'a> IotTerraformer<'a> {
    pub fn new(imports: &'a mut ImportWriter, context: &'a mut MigrationContext) -> Self {
        Self { imports, context }
    }

    pub fn iot_to_terraform(&mut self) -> Result<()> {
        let region = &self.context.region;
        self.imports
            .write_import(MESSAGE_SENDER_ROLE, &format!("spacelift-iot-{region}"))?;
        self.imports.write_import(MESSAGE_SENDING_RULE, "spacelift")?;
        self.imports.write_import(
            MESSAGE_SENDER_ROLE_POLICY,
            &format!("spacelift-iot-{region}:allow-iot-sqs-sending"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use pretty_assertions::assert_eq;

    #[test]
    fn imports_are_derived_from_the_region() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = ImportWriter::create(dir.path()).unwrap();
        let mut ctx = MigrationContext::new(AppConfig::default(), "us-east-2".to_string());
        let mut terraformer = IotTerraformer::new(&mut writer, &mut ctx);

        terraformer.iot_to_terraform().unwrap();

        let contents = std::fs::read_to_string(dir.path().join("imports.tf")).unwrap();
        assert_eq!(
            contents,
            "import {\n  to = aws_iam_role.iot_message_sender_role\n  id = \"spacelift-iot-us-east-2\"\n}\n\n\
             import {\n  to = aws_iot_topic_rule.iot_message_sending_rule\n  id = \"spacelift\"\n}\n\n\
             import {\n  to = aws_iam_role_policy.iot_message_sender_role_policy\n  id = \"spacelift-iot-us-east-2:allow-iot-sqs-sending\"\n}\n\n"
        );
    }
}
