// Command-line interface for id3meta
//
// Only compiled into the binary, the library has no CLI dependencies of its own.

pub mod commands;
pub mod config;
pub mod output;

pub use config::{Commands, Config};
pub use output::{OutputFormat, OutputFormatter};

pub type CliResult<T> = anyhow::Result<T>;
