use anyhow::Result;
use clap::Parser;
use colored::*;
use hreflint::cli::Cli;
use hreflint::config::{Config, RunConfig};
use hreflint::run;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    // RUST_LOG, when set, replaces the verbosity default entirely
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "hreflint=info" } else { "hreflint=warn" })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn start(args: Cli) -> Result<()> {
    let args = Config::resolve(&args)?;
    init_tracing(args.verbose);

    let config = RunConfig::try_from(args)?;
    run(config).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    if let Err(e) = start(args).await {
        eprintln!("{} {}", "Error:".bright_red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
