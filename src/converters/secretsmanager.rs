//! Secrets Manager imports, keyed on the secrets' CloudFormation logical
//! IDs. Secrets are imported by ARN.

use anyhow::Result;

use super::ImportWriter;

const DB_PASSWORD: &str = "aws_secretsmanager_secret.db_pw";
const SLACK_CREDENTIALS: &str = "aws_secretsmanager_secret.slack_credentials";
const ADDITIONAL_ROOT_CAS: &str = "aws_secretsmanager_secret.additional_root_ca_certificates";
const EXTERNAL_VALUES: &str = "aws_secretsmanager_secret.external";
const SAML_CREDENTIALS: &str = "aws_secretsmanager_secret.saml_credentials";

pub struct SecretsManagerTerraformer<'a> {
    imports: &'a mut ImportWriter,
}

impl<'a> SecretsManagerTerraformer<'a> {
    pub fn new(imports: &'a mut ImportWriter) -> Self {
        Self { imports }
    }

    pub fn sm_to_terraform(&mut self, logical_id: &str, secret_arn: &str) -> Result<()> {
        match logical_id {
            "DBConnectionStringSecret" => self.imports.write_import(DB_PASSWORD, secret_arn),
            "SlackCredentialsSecret" => self.imports.write_import(SLACK_CREDENTIALS, secret_arn),
            "AdditionalRootCAsSecret" => self.imports.write_import(ADDITIONAL_ROOT_CAS, secret_arn),
            "ExternalValuesSecret" => self.imports.write_import(EXTERNAL_VALUES, secret_arn),
            "SAMLCredentialsSecret" => self.imports.write_import(SAML_CREDENTIALS, secret_arn),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_secrets_import_by_arn() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = ImportWriter::create(dir.path()).unwrap();
        let mut terraformer = SecretsManagerTerraformer::new(&mut writer);

        terraformer
            .sm_to_terraform(
                "DBConnectionStringSecret",
                "arn:aws:secretsmanager:eu-west-1:123456789012:secret:spacelift/database-AbCdEf",
            )
            .unwrap();
        terraformer
            .sm_to_terraform("UnknownSecret", "arn:aws:secretsmanager:eu-west-1:123:secret:x")
            .unwrap();

        let contents = std::fs::read_to_string(dir.path().join("imports.tf")).unwrap();
        assert!(contents.contains(
            "to = aws_secretsmanager_secret.db_pw\n  id = \"arn:aws:secretsmanager:eu-west-1:123456789012:secret:spacelift/database-AbCdEf\""
        ));
        assert!(!contents.contains("UnknownSecret"));
    }
}
