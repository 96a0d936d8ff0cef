use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "gazzi")]
#[command(about = "Chat with a local language model in your browser")]
#[command(version)]
pub struct Args {
    /// Enable debug logging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub model: ModelArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Model selection shared by every subcommand.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ModelArgs {
    /// Provider name from the config file
    #[arg(short = 'p', long, global = true)]
    pub provider: Option<String>,

    /// Model name
    #[arg(short = 'm', long, global = true)]
    pub model: Option<String>,

    /// Sampling temperature (0.0 to 2.0)
    #[arg(short = 't', long, global = true)]
    pub temperature: Option<f32>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the chat web server (default)
    Serve {
        /// Listen address, e.g. 127.0.0.1:8501
        #[arg(short = 'b', long)]
        bind: Option<String>,
    },
    /// Ask a single question and print the answer
    Ask {
        /// The question (reads from stdin if not provided)
        question: Option<String>,
    },
    /// List configured providers
    Providers {
        /// Show details for a specific provider
        provider: Option<String>,
    },
    /// Configure default chat settings
    Configure,
}
