//! Log line formatting with ANSI colors
//!
//! Console lines are colored and aligned; file lines carry a full timestamp
//! and no escape codes.

use super::config::LoggerConfig;
use super::file::write_to_file;
use super::levels::LogLevel;
use super::tags::LogTag;
use chrono::Local;
use colored::*;
use std::io::{stdout, ErrorKind, Write};

const TAG_WIDTH: usize = 10;
const LEVEL_WIDTH: usize = 7;

pub fn format_and_log(config: &LoggerConfig, tag: LogTag, level: LogLevel, message: &str) {
    let now = Local::now();

    if config.console_enabled {
        let line = format!(
            "{} [{}] [{}] {}",
            now.format("%H:%M:%S").to_string().dimmed(),
            format_tag(&tag),
            format_level(level),
            message
        );
        print_stdout_safe(&line);
    }

    if config.file_path.is_some() {
        write_to_file(
            &plain_line(&now.format("%Y-%m-%d %H:%M:%S").to_string(), tag, level, message),
            level == LogLevel::Error,
        );
    }
}

fn plain_line(timestamp: &str, tag: LogTag, level: LogLevel, message: &str) -> String {
    format!(
        "{} [{}] [{}] {}",
        timestamp,
        tag.to_plain_string(),
        level.as_str(),
        message
    )
}

fn format_tag(tag: &LogTag) -> ColoredString {
    let label = format!("{:<width$}", tag.to_plain_string(), width = TAG_WIDTH);
    match tag {
        LogTag::System => label.bright_yellow().bold(),
        LogTag::Config => label.bright_white().bold(),
        LogTag::Store => label.bright_blue().bold(),
        LogTag::Tokens => label.bright_cyan().bold(),
        LogTag::Balances => label.bright_magenta().bold(),
        LogTag::Holders => label.bright_green().bold(),
        LogTag::Snapshot => label.bright_purple().bold(),
        LogTag::Operations => label.cyan().bold(),
        LogTag::Webserver => label.green().bold(),
    }
}

fn format_level(level: LogLevel) -> ColoredString {
    let label = format!("{:<width$}", level.as_str(), width = LEVEL_WIDTH);
    match level {
        LogLevel::Error => label.bright_red().bold(),
        LogLevel::Warning => label.yellow().bold(),
        LogLevel::Debug | LogLevel::Verbose => label.dimmed(),
        LogLevel::Info => label.white().bold(),
    }
}

/// Print to stdout, exiting quietly when the reader has gone away
fn print_stdout_safe(message: &str) {
    if let Err(e) = writeln!(stdout(), "{}", message) {
        if e.kind() == ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
        let _ = writeln!(std::io::stderr(), "Logger stdout error: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_line_has_no_escape_codes() {
        let line = plain_line("2024-01-01 00:00:00", LogTag::Holders, LogLevel::Warning, "skipped row");
        assert_eq!(line, "2024-01-01 00:00:00 [HOLDERS] [WARNING] skipped row");
        assert!(!line.contains('\x1b'));
    }
}
