//! s3sift CLI binary.

use anyhow::Result;
use s3sift::cli::Cli;
use tracing_subscriber::EnvFilter;

/// Main entry point for the s3sift CLI.
///
/// Uses tokio's current_thread runtime: one request, one relay task.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries only record bytes.
    // Example: RUST_LOG=s3sift=debug,s3sift_select=trace s3sift --input ...
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("s3sift=info,s3sift_select=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Starting s3sift CLI");

    let cli = Cli::parse_args();
    cli.execute().await?;

    tracing::debug!("s3sift CLI completed successfully");
    Ok(())
}
