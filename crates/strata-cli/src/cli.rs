use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "strata",
    about = "Layered JSON configuration: shipped defaults plus a user overlay",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration directory, or any file inside it
    #[arg(short, long, global = true, default_value = ".")]
    pub dir: PathBuf,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the effective configuration
    Show,
    /// Print the value at a dotted path
    Get(GetArgs),
    /// Set the value at a dotted path and save
    Set(SetArgs),
    /// Remove a user value, restoring the default if there is one
    Unset(UnsetArgs),
    /// List top-level keys
    Keys(KeysArgs),
    /// Show the overlay that would be written to the user file
    Diff,
}

#[derive(Args)]
pub struct GetArgs {
    /// Dotted key path, e.g. `editor.tab_width`
    pub path: String,
}

#[derive(Args)]
pub struct SetArgs {
    pub path: String,
    /// JSON value; anything that does not parse as JSON is stored as a string
    pub value: String,
}

#[derive(Args)]
pub struct UnsetArgs {
    pub path: String,
}

#[derive(Args)]
pub struct KeysArgs {
    /// Only list keys from the defaults
    #[arg(long)]
    pub defaults: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["strata", "get", "a.b", "--dir", "/tmp", "--format", "json"]).unwrap();
        assert_eq!(cli.dir, PathBuf::from("/tmp"));
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(matches!(cli.command, Command::Get(ref args) if args.path == "a.b"));
    }

    #[test]
    fn set_requires_a_value() {
        assert!(Cli::try_parse_from(["strata", "set", "a"]).is_err());
    }
}
