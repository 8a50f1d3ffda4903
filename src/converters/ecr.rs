//! Container registry imports. Repository names are fixed, so each known
//! name maps straight to its repository and lifecycle policy addresses.

use anyhow::Result;

use super::ImportWriter;

const BACKEND_REPOSITORY: &str = "module.spacelift.module.ecr.aws_ecr_repository.backend";
const BACKEND_LIFECYCLE_POLICY: &str =
    "module.spacelift.module.ecr.aws_ecr_lifecycle_policy.backend[0]";
const LAUNCHER_REPOSITORY: &str = "module.spacelift.module.ecr.aws_ecr_repository.launcher";
const LAUNCHER_LIFECYCLE_POLICY: &str =
    "module.spacelift.module.ecr.aws_ecr_lifecycle_policy.launcher[0]";

pub struct EcrTerraformer<'a> {
    imports: &'a mut ImportWriter,
}

impl<'a> EcrTerraformer<'a> {
    pub fn new(imports: &'a mut ImportWriter) -> Self {
        Self { imports }
    }

    pub fn ecr_to_terraform(&mut self, repository_name: &str) -> Result<()> {
        match repository_name {
            "spacelift" => {
                self.imports.write_import(BACKEND_REPOSITORY, repository_name)?;
                self.imports
                    .write_import(BACKEND_LIFECYCLE_POLICY, repository_name)
            }
            "spacelift-launcher" => {
                self.imports.write_import(LAUNCHER_REPOSITORY, repository_name)?;
                self.imports
                    .write_import(LAUNCHER_LIFECYCLE_POLICY, repository_name)
            }
            _ => Ok(()),
        }
    }
}
