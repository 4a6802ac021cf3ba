use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// How the report is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// One line per test plus a summary.
    Text,
    /// The full report as JSON.
    Json,
    /// The full report as YAML.
    Yaml,
}

/// Runs a bundled HTTP conformance suite against a web server
#[derive(Debug, Parser)]
#[command(name = "servertester", version, about)]
pub struct Args {
    /// Suite to run
    #[arg(short, long, default_value = "cs531a4")]
    pub suite: String,

    /// YAML settings file
    #[arg(short, long, env = "SERVERTESTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Host of the server under test
    #[arg(long)]
    pub host: Option<String>,

    /// Port of the server under test
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Per-request timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Number of tests allowed in flight at once
    #[arg(short = 'j', long)]
    pub concurrency: Option<usize>,

    /// Directory of `.http` templates loaded on top of the built-ins
    #[arg(long)]
    pub templates: Option<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    pub format: Format,

    /// List suites and their tests, then exit
    #[arg(long)]
    pub list: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["servertester"]).unwrap();
        assert_eq!(args.suite, "cs531a4");
        assert_eq!(args.format, Format::Text);
        assert_eq!(args.host, None);
        assert!(!args.list);
    }

    #[test]
    fn test_overrides() {
        let args = Args::try_parse_from([
            "servertester",
            "--host",
            "cs531.example",
            "-p",
            "8080",
            "-j",
            "4",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(args.host.as_deref(), Some("cs531.example"));
        assert_eq!(args.port, Some(8080));
        assert_eq!(args.concurrency, Some(4));
        assert_eq!(args.format, Format::Json);
    }

    #[test]
    fn test_rejects_bad_port() {
        assert!(Args::try_parse_from(["servertester", "--port", "70000"]).is_err());
    }
}
