use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "relocator")]
#[command(about = "Relocate images to the locations recorded for them", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Move images from a source folder to their recorded network locations
    Relocate(RelocateArgs),
    /// List the identifying keys derived from image filenames
    Keys(KeysArgs),
    /// Show where images would go without touching them
    Resolve(ResolveArgs),
    /// Print configuration values
    PrintConfig,
}

#[derive(Debug, Args)]
pub struct RelocateArgs {
    /// Image file or folder containing the images to relocate
    pub source: PathBuf,
    /// Show what would happen without making any changes
    #[arg(long)]
    pub dry_run: bool,
    /// Write the relocation report to a CSV file
    #[arg(long, value_name = "FILE")]
    pub csv: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct KeysArgs {
    /// Image file or folder containing images
    pub path: PathBuf,
    /// Print only the keys, one per line
    #[arg(long)]
    pub quiet: bool,
    /// Print files and keys as JSON
    #[arg(long, conflicts_with = "quiet")]
    pub json: bool,
    /// Export the unique keys to a CSV file
    #[arg(long, value_name = "FILE")]
    pub csv: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Image file or folder containing images
    pub path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_relocate_dry_run() {
        let cli = Cli::try_parse_from(["relocator", "relocate", "/in", "--dry-run"]).unwrap();
        match cli.command {
            Some(Commands::Relocate(args)) => {
                assert_eq!(args.source, PathBuf::from("/in"));
                assert!(args.dry_run);
                assert!(args.csv.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_keys_quiet_conflicts_with_json() {
        assert!(Cli::try_parse_from(["relocator", "keys", "/in", "--quiet", "--json"]).is_err());
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
