// CLI binary entry point for id3meta

use clap::Parser;
use log::LevelFilter;

mod cli;

use cli::commands::{command_comment, command_header, command_scan};
use cli::{Commands, Config, OutputFormatter};

fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    init_logging(config.verbose);

    let formatter = OutputFormatter::new(config.format, config.quiet);

    match &config.command {
        Commands::Comment { files } => command_comment(files, &formatter),
        Commands::Header { files } => command_header(files, &formatter),
        Commands::Scan { directory, pattern } => command_scan(directory, pattern, &formatter),
    }
}

fn init_logging(verbose: bool) {
    let mut builder = pretty_env_logger::formatted_builder();
    builder.filter_level(if verbose { LevelFilter::Debug } else { LevelFilter::Warn });

    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }

    builder.init();
}
