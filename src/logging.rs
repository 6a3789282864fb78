//! Tracing subscriber setup shared by the binaries

use tracing_subscriber::fmt::writer::BoxMakeWriter;

/// Where log lines are written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    Stdout,
    /// Keeps stdout free for command output
    Stderr,
}

/// Install the global subscriber
///
/// `format` is `pretty` or `json` (anything else falls back to json).
pub fn init_logging(level: &str, format: &str, target: LogTarget) {
    let writer = match target {
        LogTarget::Stdout => BoxMakeWriter::new(std::io::stdout),
        LogTarget::Stderr => BoxMakeWriter::new(std::io::stderr),
    };

    match format {
        "pretty" => {
            tracing_subscriber::fmt()
                .with_env_filter(level)
                .with_writer(writer)
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(level)
                .with_writer(writer)
                .json()
                .init();
        }
    }
}
