// Output formatting for CLI

use std::io::Write;

use clap::ValueEnum;
use serde::Serialize;

use id3meta::{ExtractedComment, TagHeader};

use crate::cli::CliResult;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human readable lines
    #[default]
    Pretty,
    /// One JSON object per file
    Json,
}

/// Result of extracting the comment from one file
#[derive(Debug, Serialize)]
pub struct CommentRecord<'a> {
    pub file: &'a str,
    pub comment: Option<&'a ExtractedComment>,
}

/// Tag header of one file
#[derive(Debug, Serialize)]
pub struct HeaderRecord<'a> {
    pub file: &'a str,
    pub version: String,
    #[serde(flatten)]
    pub header: &'a TagHeader,
}

/// Format and output data
pub struct OutputFormatter {
    format: OutputFormat,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    /// Output the comment of a file
    pub fn output_comment(&self, record: &CommentRecord<'_>, writer: &mut impl Write) -> CliResult<()> {
        match self.format {
            OutputFormat::Pretty => match record.comment {
                Some(comment) => writeln!(writer, "{}: {}", record.file, comment.text)?,
                None => writeln!(writer, "{}: (no comment)", record.file)?,
            },
            OutputFormat::Json => writeln!(writer, "{}", serde_json::to_string(record)?)?,
        }
        Ok(())
    }

    /// Output the tag header of a file
    pub fn output_header(&self, record: &HeaderRecord<'_>, writer: &mut impl Write) -> CliResult<()> {
        match self.format {
            OutputFormat::Pretty => {
                let flags = record.header.flags;
                writeln!(
                    writer,
                    "{}: ID3v{}, {} bytes (unsynchronisation: {}, extended header: {}, experimental: {}, footer: {})",
                    record.file,
                    record.version,
                    record.header.size,
                    flags.unsynchronisation,
                    flags.extended_header,
                    flags.experimental,
                    flags.footer
                )?;
            }
            OutputFormat::Json => writeln!(writer, "{}", serde_json::to_string(record)?)?,
        }
        Ok(())
    }

    /// Print error message
    pub fn print_error(&self, message: &str) {
        eprintln!("✗ {}", message);
    }

    /// Print info message
    pub fn print_info(&self, message: &str) {
        if !self.quiet {
            eprintln!("  {}", message);
        }
    }
}
