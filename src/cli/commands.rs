//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Build and exercise configured GitLab clients
#[derive(Parser, Debug)]
#[command(name = "gitlab-factory")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Connections file (YAML or JSON)
    #[arg(short = 'C', long, global = true, default_value = "gitlab.yaml")]
    pub config: PathBuf,

    /// Connection to use (defaults to the file's default connection)
    #[arg(short, long, global = true)]
    pub connection: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the connection and describe its client
    Inspect,

    /// Send a GET request through the connection
    Get {
        /// API path, relative to /api/v4
        path: String,

        /// Query parameters (key=value, repeatable)
        #[arg(short, long = "query", value_parser = parse_key_value)]
        query: Vec<(String, String)>,
    },

    /// List supported authentication methods
    Methods,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Compact JSON
    Json,
    /// Indented JSON
    Pretty,
}

fn parse_key_value(s: &str) -> std::result::Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{s}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_get() {
        let cli = Cli::parse_from([
            "gitlab-factory",
            "-C",
            "conns.yaml",
            "--connection",
            "alt",
            "get",
            "projects",
            "-q",
            "page=2",
            "--query",
            "per_page=50",
        ]);

        assert_eq!(cli.config, PathBuf::from("conns.yaml"));
        assert_eq!(cli.connection.as_deref(), Some("alt"));
        match cli.command {
            Commands::Get { path, query } => {
                assert_eq!(path, "projects");
                assert_eq!(
                    query,
                    vec![
                        ("page".to_string(), "2".to_string()),
                        ("per_page".to_string(), "50".to_string())
                    ]
                );
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::parse_from(["gitlab-factory", "inspect"]);
        assert_eq!(cli.config, PathBuf::from("gitlab.yaml"));
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(matches!(cli.command, Commands::Inspect));
    }

    #[test]
    fn test_bad_query() {
        assert!(Cli::try_parse_from(["gitlab-factory", "get", "x", "-q", "novalue"]).is_err());
    }
}
