use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "grove")]
#[command(about = "A focus session tracker for the terminal")]
#[command(long_about = "grove - A focus session tracker for the terminal

Plant a tree, stay focused, grow a grove. Each focus session is a tree:
it grows while you work and withers if you give up or switch away in
strict mode. Finished sessions are recorded so you can review your
history and statistics.

QUICK START:
  grove plant               Start a 25-minute session
  grove plant -d 50m        Start a 50-minute session
  grove plant --strict      Fail the session on focus loss
  grove history             Review recorded sessions
  grove stats               Completion statistics

OUTPUT FORMATS:
  --output pretty    Human-readable colored output (default)
  --output json      Machine-readable JSON for scripting

For more information on a specific command, run:
  grove <command> --help")]
#[command(version, propagate_version = true)]
pub struct Cli {
    /// Output format for command results
    ///
    /// Use 'pretty' for human-readable colored output (default),
    /// or 'json' for machine-readable output suitable for scripting.
    #[arg(short, long, value_enum, default_value = "pretty", global = true)]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for command results.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable colored output.
    #[default]
    Pretty,
    /// Machine-readable JSON output.
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive focus session
    ///
    /// Runs a live countdown in the terminal. The session duration comes
    /// from the --duration flag or the focus_duration config key. With
    /// --strict (or strict_mode in config), losing terminal focus fails
    /// the session.
    ///
    /// While the session runs:
    ///   p          pause the countdown
    ///   r          resume a paused countdown
    ///   g          give up (asks for confirmation)
    ///   q/Esc/^C   quit (asks for confirmation while a session is active)
    ///
    /// # Examples
    ///
    ///   grove plant
    ///   grove plant -d 50m --strict
    ///   grove plant -d 90s -n "email triage"
    #[command(alias = "p")]
    Plant(PlantArgs),

    /// List recorded sessions
    ///
    /// Shows recorded sessions, newest first.
    ///
    /// # Examples
    ///
    ///   grove history
    ///   grove history -f completed
    ///   grove history -l 50 -o json
    #[command(alias = "h")]
    History(HistoryArgs),

    /// Delete one recorded session by ID
    ///
    /// IDs are shown by 'grove history'. Deleting an unknown ID is an
    /// error, not a crash.
    ///
    /// # Examples
    ///
    ///   grove delete 1755000000000
    #[command(alias = "rm")]
    Delete {
        /// Session ID to delete
        id: i64,
    },

    /// Clear all recorded sessions
    ///
    /// Delete session history (use with caution).
    Clear {
        /// Skip confirmation
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Show completion statistics
    ///
    /// Aggregates recorded sessions over a trailing window.
    ///
    /// # Examples
    ///
    ///   grove stats
    ///   grove stats -d 7
    ///   grove stats -d 0        All time
    Stats(StatsArgs),

    /// Inspect and edit the configuration
    ///
    /// Settings live in ~/.grove/config.json. Duration keys accept raw
    /// seconds or duration strings like 25m.
    ///
    /// # Examples
    ///
    ///   grove config show
    ///   grove config get focus_duration
    ///   grove config set focus_duration 50m
    ///   grove config path
    Config(ConfigArgs),

    /// Generate shell completions
    ///
    /// Outputs completion script for the specified shell.
    /// Redirect to a file or source directly.
    ///
    /// Example: grove completions bash > ~/.bash_completion.d/grove
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        shell: String,
    },
}

/// Arguments for starting a session.
#[derive(Args)]
pub struct PlantArgs {
    /// Session duration (e.g., 25m, 1h30m, 90s; a bare number is minutes)
    #[arg(long, short = 'd')]
    pub duration: Option<String>,

    /// Fail the session if the terminal loses focus
    #[arg(long)]
    pub strict: bool,

    /// Notes for this session
    #[arg(long, short = 'n')]
    pub notes: Option<String>,
}

/// Arguments for listing history.
#[derive(Args)]
pub struct HistoryArgs {
    /// Filter by outcome (all, completed, failed)
    #[arg(long, short = 'f', default_value = "all")]
    pub filter: String,

    /// Number of sessions to show
    #[arg(long, short = 'l', default_value_t = 10)]
    pub limit: usize,
}

/// Arguments for statistics.
#[derive(Args)]
pub struct StatsArgs {
    /// Number of trailing days to include (0 = all time)
    #[arg(long, short = 'd', default_value_t = 30)]
    pub days: i64,
}

/// Arguments for configuration.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

/// Configuration subcommands.
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the full configuration
    Show,

    /// Print one configuration value
    Get {
        /// Configuration key
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,

        /// New value (duration keys also accept 25m-style strings)
        value: String,
    },

    /// Print the config file location
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parses() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_plant_defaults() {
        let cli = Cli::try_parse_from(["grove", "plant"]).unwrap();
        if let Commands::Plant(args) = cli.command {
            assert!(args.duration.is_none());
            assert!(!args.strict);
            assert!(args.notes.is_none());
        } else {
            panic!("Expected Plant command");
        }
    }

    #[test]
    fn test_cli_plant_with_flags() {
        let cli = Cli::try_parse_from([
            "grove", "plant", "-d", "50m", "--strict", "-n", "deep work",
        ])
        .unwrap();
        if let Commands::Plant(args) = cli.command {
            assert_eq!(args.duration, Some("50m".to_string()));
            assert!(args.strict);
            assert_eq!(args.notes, Some("deep work".to_string()));
        } else {
            panic!("Expected Plant command");
        }
    }

    #[test]
    fn test_cli_plant_alias() {
        let cli = Cli::try_parse_from(["grove", "p"]).unwrap();
        assert!(matches!(cli.command, Commands::Plant(_)));
    }

    #[test]
    fn test_cli_history_defaults() {
        let cli = Cli::try_parse_from(["grove", "history"]).unwrap();
        if let Commands::History(args) = cli.command {
            assert_eq!(args.filter, "all");
            assert_eq!(args.limit, 10);
        } else {
            panic!("Expected History command");
        }
    }

    #[test]
    fn test_cli_history_with_filter() {
        let cli = Cli::try_parse_from(["grove", "history", "-f", "completed", "-l", "5"]).unwrap();
        if let Commands::History(args) = cli.command {
            assert_eq!(args.filter, "completed");
            assert_eq!(args.limit, 5);
        } else {
            panic!("Expected History command");
        }
    }

    #[test]
    fn test_cli_delete() {
        let cli = Cli::try_parse_from(["grove", "delete", "1755000000000"]).unwrap();
        if let Commands::Delete { id } = cli.command {
            assert_eq!(id, 1_755_000_000_000);
        } else {
            panic!("Expected Delete command");
        }
    }

    #[test]
    fn test_cli_delete_rejects_non_numeric_id() {
        assert!(Cli::try_parse_from(["grove", "delete", "abc"]).is_err());
    }

    #[test]
    fn test_cli_clear_force() {
        let cli = Cli::try_parse_from(["grove", "clear", "--force"]).unwrap();
        if let Commands::Clear { force } = cli.command {
            assert!(force);
        } else {
            panic!("Expected Clear command");
        }
    }

    #[test]
    fn test_cli_stats_default_days() {
        let cli = Cli::try_parse_from(["grove", "stats"]).unwrap();
        if let Commands::Stats(args) = cli.command {
            assert_eq!(args.days, 30);
        } else {
            panic!("Expected Stats command");
        }
    }

    #[test]
    fn test_cli_config_set() {
        let cli =
            Cli::try_parse_from(["grove", "config", "set", "focus_duration", "50m"]).unwrap();
        if let Commands::Config(args) = cli.command {
            if let ConfigCommands::Set { key, value } = args.command {
                assert_eq!(key, "focus_duration");
                assert_eq!(value, "50m");
            } else {
                panic!("Expected Set subcommand");
            }
        } else {
            panic!("Expected Config command");
        }
    }

    #[test]
    fn test_cli_completions() {
        let cli = Cli::try_parse_from(["grove", "completions", "zsh"]).unwrap();
        if let Commands::Completions { shell } = cli.command {
            assert_eq!(shell, "zsh");
        } else {
            panic!("Expected Completions command");
        }
    }

    #[test]
    fn test_output_format_default() {
        assert!(matches!(OutputFormat::default(), OutputFormat::Pretty));
    }

    #[test]
    fn test_output_format_global_flag() {
        let cli = Cli::try_parse_from(["grove", "history", "-o", "json"]).unwrap();
        assert_eq!(cli.output, OutputFormat::Json);
    }
}
