use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "The mirsight developers",
    version,
    about = "mirsight CLI - Aligns conservation and shape reactivity tracks onto candidate microRNA binding-site tables and aggregates them into classifier features.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Number of worker threads, one candidate file each.
    /// Overrides `settings.max-cores` from the config file.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run conservation extraction, shape extraction and shape aggregation in order.
    Run(StageArgs),
    /// Append conservation window means to every candidate table.
    Conservation(StageArgs),
    /// Compute per-source shape window means for every conservation-augmented table.
    Shape(StageArgs),
    /// Fuse the per-source shape columns into `shape_seed` and `shape_sup`.
    Aggregate(StageArgs),
}

/// Arguments shared by every stage subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct StageArgs {
    /// Path to the configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Recompute every output even if it already exists.
    #[arg(long)]
    pub no_cache: bool,

    /// Require the shape and conservation tables to agree row for row when aggregating.
    #[arg(long)]
    pub strict_pairing: bool,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S directories.features=data/features
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_flags_are_accepted_after_the_subcommand() {
        let cli = Cli::try_parse_from(["mirsight", "run", "-vv", "-j", "4", "--no-cache"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.threads, Some(4));
        match cli.command {
            Commands::Run(args) => {
                assert!(args.no_cache);
                assert!(!args.strict_pairing);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn set_values_can_be_repeated() {
        let cli = Cli::try_parse_from([
            "mirsight",
            "aggregate",
            "-S",
            "settings.pairing=strict",
            "-S",
            "columns.transcript-id=tx",
        ])
        .unwrap();
        match cli.command {
            Commands::Aggregate(args) => assert_eq!(args.set_values.len(), 2),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["mirsight", "shape", "-q", "-v"]).is_err());
    }
}
