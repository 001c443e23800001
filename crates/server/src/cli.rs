//! Command-line interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about = "Scanned newspaper archive processor", long_about = None)]
pub struct Cli {
    /// Path to the configuration file (defaults to $PRESSROOM_CONFIG or pressroom.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Process every document under a root directory once and exit
    Run {
        /// Archive root (falls back to scan.root_dir, then ROOT_FOLDER)
        root: Option<PathBuf>,

        /// Maximum documents processed at once
        #[arg(short = 'j', long)]
        concurrency: Option<usize>,
    },
    /// Start the HTTP server
    Serve,
    /// Create the database schema and exit
    InitDb,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_with_root_and_concurrency() {
        let cli = Cli::try_parse_from(["pressroom", "run", "/archive", "-j", "3"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Run {
                root: Some(PathBuf::from("/archive")),
                concurrency: Some(3),
            }
        );
        assert!(cli.config.is_none());
        assert!(!cli.json_logs);
    }

    #[test]
    fn test_run_without_root() {
        let cli = Cli::try_parse_from(["pressroom", "run"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Run {
                root: None,
                concurrency: None,
            }
        );
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["pressroom", "serve", "--config", "/etc/p.toml", "--json-logs"])
                .unwrap();
        assert_eq!(cli.command, Command::Serve);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/p.toml")));
        assert!(cli.json_logs);
    }

    #[test]
    fn test_init_db() {
        let cli = Cli::try_parse_from(["pressroom", "init-db"]).unwrap();
        assert_eq!(cli.command, Command::InitDb);
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["pressroom"]).is_err());
    }

    #[test]
    fn test_invalid_concurrency() {
        assert!(Cli::try_parse_from(["pressroom", "run", "-j", "many"]).is_err());
    }
}
