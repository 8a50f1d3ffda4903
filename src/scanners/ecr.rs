//! Registry "discovery". The repository names are fixed, so there is
//! nothing to query.

use anyhow::Result;

use crate::converters::ecr::EcrTerraformer;

pub fn scan_ecr_resources(terraformer: &mut EcrTerraformer<'_>) -> Result<()> {
    for repository in ["spacelift", "spacelift-launcher"] {
        terraformer.ecr_to_terraform(repository)?;
    }
    Ok(())
}
