use clap::Parser;
use log::LevelFilter;

mod cli;
mod commands;

use cli::{CliArgs, Commands};
use stegapack_core::StegaError;

pub type CliResult<T> = std::result::Result<T, StegaError>;

fn main() {
    let args = CliArgs::parse();
    init_logging(args.verbose);

    if let Err(err) = handle_subcommands(args) {
        eprintln!("{err}");
        std::process::exit(err.exit_code());
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn handle_subcommands(args: CliArgs) -> CliResult<()> {
    match args.command {
        Commands::Embed(embed) => embed.run(),
        Commands::Extract(extract) => extract.run(),
        Commands::Metrics(metrics) => metrics.run(),
        Commands::Bench(bench) => bench.run(),
    }
}
