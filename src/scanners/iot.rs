//! IoT Core "discovery". The role, rule and policy names are fixed per
//! region, so the converter emits them without querying anything.

use anyhow::Result;
use tracing::info;

use crate::converters::iot::IotTerraformer;

pub fn scan_iot_resources(terraformer: &mut IotTerraformer<'_>) -> Result<()> {
    info!("Scanning IoT resources");
    terraformer.iot_to_terraform()
}
