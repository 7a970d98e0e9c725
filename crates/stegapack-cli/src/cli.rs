use clap::{ArgAction, Parser, Subcommand};

use crate::commands::*;

#[derive(Parser, Debug)]
#[command(name = "stegapack", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct CliArgs {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Embed(embed::EmbedArgs),
    Extract(extract::ExtractArgs),
    Metrics(metrics::MetricsArgs),
    Bench(bench::BenchArgs),
}
