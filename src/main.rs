use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use newswatch::cli::{commands, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = commands::load_config(cli.config.as_deref())?;
    let workers = cli.workers.unwrap_or(config.workers);

    match cli.command {
        Commands::Check { rules } => {
            commands::check(&rules, config.reference_zone()?)?;
        }
        Commands::Filter { rules, sources } => {
            commands::filter_once(&rules, &sources, config.reference_zone()?, workers).await?;
        }
        Commands::Watch {
            rules,
            interval,
            no_initial_update,
        } => {
            commands::watch(
                &config,
                rules,
                interval.as_deref(),
                !no_initial_update,
                workers,
            )
            .await?;
        }
    }

    Ok(())
}
