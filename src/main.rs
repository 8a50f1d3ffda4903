#![warn(clippy::all, rust_2018_idioms)]

use anyhow::Result;
use clap::Parser;

use spacelift_migrator::cli::Cli;

fn init_logging() {
    // RUST_LOG wins; the default keeps the AWS SDK internals quiet.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(
            "spacelift_migrator=info,aws_config=warn,aws_sigv4=warn,aws_smithy_runtime=warn,aws_smithy_runtime_api=warn,aws_smithy_http=warn,hyper=warn",
        )
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let args = Cli::parse();
    spacelift_migrator::run(args).await
}
