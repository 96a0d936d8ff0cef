use anyhow::Result;
use clap::Parser;

use gazzi_chat::cli::commands::{ask, configure, providers, serve};
use gazzi_chat::cli::{Args, Command};
use gazzi_chat::logging;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    match args.command {
        Some(Command::Providers { provider }) => {
            providers::print_providers(provider.as_deref())?;
        }
        Some(Command::Configure) => {
            configure::run_configure()?;
        }
        Some(Command::Ask { question }) => {
            ask::run_ask(&args.model, question).await?;
        }
        Some(Command::Serve { bind }) => {
            serve::run_serve(&args.model, bind).await?;
        }
        None => {
            serve::run_serve(&args.model, None).await?;
        }
    }

    Ok(())
}
