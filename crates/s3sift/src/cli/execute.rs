//! Command execution logic.

use anyhow::{Context, Result};
use s3sift_select::{Query, build_query};

use super::Cli;
use crate::app::App;
use crate::config::ClientConfig;

/// Build the query, then either print it or run it against the object
/// named by `--input`, streaming matches to stdout.
pub async fn execute_filter(cli: &Cli) -> Result<()> {
    let query = build_query(&cli.criteria())?;

    if cli.print_query {
        return execute_print_query(&query);
    }

    let config = load_client_config(cli).await?;
    let app = App::from_config(&config).await?;

    let mut stdout = tokio::io::stdout();
    app.filter(cli.input.clone(), query, &mut stdout)
        .await
        .with_context(|| format!("failed to filter {}", cli.input))?;

    Ok(())
}

/// Print the query that would be sent.
pub fn execute_print_query(query: &Query) -> Result<()> {
    println!("{query}");
    Ok(())
}

/// Merge the optional config file with flag overrides.
pub async fn load_client_config(cli: &Cli) -> Result<ClientConfig> {
    let base = match &cli.config {
        Some(path) => ClientConfig::load(path)
            .await
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => ClientConfig::default(),
    };
    Ok(base.merged_with(cli.client_overrides()))
}
