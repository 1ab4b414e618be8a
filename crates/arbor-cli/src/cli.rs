use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "arbor",
    about = "Arbor — mirror object graphs into a hierarchical node store",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Synchronize a JSON document into a store
    Sync(SyncArgs),
    /// Print a subtree of a store
    Dump(DumpArgs),
}

#[derive(Args)]
pub struct SyncArgs {
    /// JSON document to persist
    pub input: PathBuf,
    /// Store snapshot file (created if missing)
    #[arg(long)]
    pub store: PathBuf,
    /// Target path; defaults to the document's `@path`
    #[arg(long)]
    pub path: Option<String>,
    /// Write only scalar properties, no child nodes
    #[arg(long)]
    pub shallow: bool,
    /// TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct DumpArgs {
    /// Store snapshot file
    #[arg(long)]
    pub store: PathBuf,
    /// Subtree to print
    #[arg(long, default_value = "/")]
    pub path: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_sync() {
        let cli = Cli::parse_from([
            "arbor", "sync", "doc.json", "--store", "tree.json", "--path", "/a", "--shallow",
        ]);
        match cli.command {
            Command::Sync(args) => {
                assert_eq!(args.input, PathBuf::from("doc.json"));
                assert_eq!(args.store, PathBuf::from("tree.json"));
                assert_eq!(args.path.as_deref(), Some("/a"));
                assert!(args.shallow);
                assert!(args.config.is_none());
            }
            Command::Dump(_) => panic!("expected sync"),
        }
    }

    #[test]
    fn dump_defaults_to_root() {
        let cli = Cli::parse_from(["arbor", "dump", "--store", "tree.json", "-v"]);
        assert!(cli.verbose);
        match cli.command {
            Command::Dump(args) => assert_eq!(args.path, "/"),
            Command::Sync(_) => panic!("expected dump"),
        }
    }
}
