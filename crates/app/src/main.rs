//! orads - Oracle data source plugin command line front end
//!
//! Wires the plugin core to the file settings store and the host's query
//! API, so queries, previews and settings edits can be driven from a shell.

mod args;
mod commands;

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::args::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "orads={level},orads_application={level},orads_infrastructure={level},\
             hyper=warn,reqwest=warn,rustls=warn",
            level = cli.log_level
        ))
    });
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        config_dir = %cli.config_dir.display(),
        "starting orads"
    );

    match cli.command {
        Commands::Query(args) => commands::query(&cli.config_dir, args).await,
        Commands::Preview(args) => commands::preview(&args),
        Commands::VariableValues(args) => commands::variable_values(&cli.config_dir, args).await,
        Commands::Health => commands::health(&cli.config_dir).await,
        Commands::Configure(args) => commands::configure(&cli.config_dir, args).await,
        Commands::VariableSupport => {
            commands::variable_support();
            Ok(())
        }
    }
}
