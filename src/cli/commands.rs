// CLI command implementations
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::Path;

use anyhow::{bail, Context};
use glob::glob;

use id3meta::TagHeader;

use crate::cli::output::{CommentRecord, HeaderRecord};
use crate::cli::{CliResult, OutputFormatter};

/// Extract comments from files.
///
/// A file that cannot be read is reported as having no metadata, the
/// remaining files are still processed.
pub fn command_comment(files: &[String], formatter: &OutputFormatter) -> CliResult<()> {
    if files.is_empty() {
        bail!("No files specified");
    }

    let mut writer = io::stdout().lock();
    for file_path in files {
        comment_for_file(file_path, formatter, &mut writer)?;
    }

    Ok(())
}

/// Show the tag header of files
pub fn command_header(files: &[String], formatter: &OutputFormatter) -> CliResult<()> {
    if files.is_empty() {
        bail!("No files specified");
    }

    let mut writer = io::stdout().lock();
    for file_path in files {
        let header = File::open(file_path)
            .map_err(id3meta::Id3Error::from)
            .and_then(|file| TagHeader::read(&mut BufReader::new(file)));

        match header {
            Ok(header) => {
                let record = HeaderRecord {
                    file: file_path,
                    version: header.version(),
                    header: &header,
                };
                formatter.output_header(&record, &mut writer)?;
            }
            Err(e) => formatter.print_error(&format!("{}: {}", file_path, e)),
        }
    }

    Ok(())
}

/// Extract comments from every file in `directory` matching `pattern`
pub fn command_scan(directory: &str, pattern: &str, formatter: &OutputFormatter) -> CliResult<()> {
    if !Path::new(directory).is_dir() {
        bail!("Not a directory: {}", directory);
    }

    // Build glob pattern
    let glob_pattern = if pattern.contains('*') || pattern.contains('?') {
        format!("{}/{}", directory, pattern)
    } else {
        format!("{}/**/{}", directory, pattern)
    };

    let mut files: Vec<String> = Vec::new();
    for entry in glob(&glob_pattern).with_context(|| format!("Invalid glob pattern: {}", glob_pattern))? {
        match entry {
            Ok(path) if path.is_file() => match path.to_str() {
                Some(path_str) => files.push(path_str.to_string()),
                None => formatter.print_error(&format!("Skipping non UTF-8 path {}", path.display())),
            },
            Ok(_) => {}
            Err(e) => formatter.print_error(&format!("Error reading path: {}", e)),
        }
    }

    if files.is_empty() {
        formatter.print_info("No files found matching pattern");
        return Ok(());
    }

    formatter.print_info(&format!("Processing {} files...", files.len()));

    let mut writer = io::stdout().lock();
    let mut with_comment = 0;
    for file_path in &files {
        if comment_for_file(file_path, formatter, &mut writer)? {
            with_comment += 1;
        }
    }

    formatter.print_info(&format!("Completed: {} of {} files have a comment", with_comment, files.len()));
    Ok(())
}

/// Returns whether a comment was found
fn comment_for_file(file_path: &str, formatter: &OutputFormatter, writer: &mut impl Write) -> CliResult<bool> {
    let comment = match id3meta::read_comment_from_path(file_path) {
        Ok(comment) => comment,
        Err(e) => {
            // Any failure means there is no metadata to show
            formatter.print_error(&format!("{}: {}", file_path, e));
            None
        }
    };

    let record = CommentRecord {
        file: file_path,
        comment: comment.as_ref(),
    };
    formatter.output_comment(&record, writer)?;

    Ok(comment.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;

    #[test]
    fn unreadable_file_has_no_comment() {
        let formatter = OutputFormatter::new(OutputFormat::Pretty, true);
        let mut out = Vec::new();

        let found = comment_for_file("does/not/exist.mp3", &formatter, &mut out).unwrap();
        assert!(!found);
        assert_eq!(String::from_utf8(out).unwrap(), "does/not/exist.mp3: (no comment)\n");
    }
}
