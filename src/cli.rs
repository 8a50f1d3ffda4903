//! Command line interface.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Scan a v2 installation and generate the Terraform import project.
#[derive(Debug, Parser)]
#[command(name = "spacelift-migrator", version)]
pub struct Cli {
    /// Path to the configuration JSON file
    #[arg(long)]
    pub config: PathBuf,

    /// AWS profile to use
    #[arg(long)]
    pub profile: Option<String>,

    /// Output directory path for Terraform files
    #[arg(long, default_value = "dist")]
    pub output: PathBuf,

    /// Target Terraform module type
    #[arg(long, value_enum, default_value_t = TargetModule::Ecs)]
    pub target_module: TargetModule,
}

/// Which flavor of the services module the generated configuration
/// references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TargetModule {
    Ecs,
    Eks,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_is_required() {
        let result = Cli::try_parse_from(["spacelift-migrator"]);
        assert!(result.is_err());
    }

    #[test]
    fn defaults_apply() {
        let cli =
            Cli::try_parse_from(["spacelift-migrator", "--config", "config.json"]).unwrap();
        assert_eq!(cli.output, PathBuf::from("dist"));
        assert_eq!(cli.target_module, TargetModule::Ecs);
        assert!(cli.profile.is_none());
    }

    #[test]
    fn target_module_accepts_eks() {
        let cli = Cli::try_parse_from([
            "spacelift-migrator",
            "--config",
            "config.json",
            "--target-module",
            "eks",
            "--profile",
            "staging",
        ])
        .unwrap();
        assert_eq!(cli.target_module, TargetModule::Eks);
        assert_eq!(cli.profile.as_deref(), Some("staging"));
    }
}
