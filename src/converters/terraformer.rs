//! The shared import emitter backing every converter.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Appends `import` blocks to `imports.tf` in the output directory.
///
/// The file is truncated once at startup; every block is appended in scan
/// order, so a run is deterministic end to end.
pub struct ImportWriter {
    file: File,
    path: PathBuf,
}

impl ImportWriter {
    /// Create the output directory and an empty `imports.tf` inside it,
    /// replacing any file left over from a previous run.
    pub fn create(output_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(output_dir).with_context(|| {
            format!("Failed to create output directory {}", output_dir.display())
        })?;

        let path = output_dir.join("imports.tf");
        let file = File::create(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;

        Ok(Self { file, path })
    }

    /// Append one import block binding a Terraform address to the real
    /// resource identifier.
    pub fn write_import(&mut self, to: &str, id: &str) -> Result<()> {
        writeln!(self.file, "import {{")?;
        writeln!(self.file, "  to = {to}")?;
        writeln!(self.file, "  id = \"{id}\"")?;
        writeln!(self.file, "}}")?;
        writeln!(self.file)?;

        self.file
            .flush()
            .with_context(|| format!("Failed to write to {}", self.path.display()))
    }

    pub fn write_comment(&mut self, text: &str) -> Result<()> {
        writeln!(self.file, "# {text}")?;
        writeln!(self.file)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn writes_import_blocks_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = ImportWriter::create(dir.path()).unwrap();

        writer.write_comment("S3 buckets").unwrap();
        writer
            .write_import("aws_kms_key.master", "1234abcd-12ab-34cd-56ef-1234567890ab")
            .unwrap();
        writer
            .write_import(
                "module.spacelift.module.network[0].aws_vpc.spacelift_vpc",
                "vpc-0a1b2c3d",
            )
            .unwrap();

        let contents = std::fs::read_to_string(dir.path().join("imports.tf")).unwrap();
        assert_eq!(
            contents,
            "# S3 buckets\n\n\
             import {\n  to = aws_kms_key.master\n  id = \"1234abcd-12ab-34cd-56ef-1234567890ab\"\n}\n\n\
             import {\n  to = module.spacelift.module.network[0].aws_vpc.spacelift_vpc\n  id = \"vpc-0a1b2c3d\"\n}\n\n"
        );
    }

    #[test]
    fn truncates_leftovers_from_a_previous_run() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("imports.tf"), "stale").unwrap();

        let writer = ImportWriter::create(dir.path()).unwrap();
        let contents = std::fs::read_to_string(writer.path()).unwrap();
        assert!(contents.is_empty());
    }
}
