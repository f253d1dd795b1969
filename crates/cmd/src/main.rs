use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use cmd::commands::{render_command, show_config_command, validate_command};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "dbsql")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that task files parse and pass validation
    Validate {
        /// YAML task files
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Print the statements a task would submit, without connecting
    Render {
        /// YAML task file
        path: PathBuf,
    },
    /// Print the validated task as JSON
    ShowConfig {
        /// YAML task file
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    diagnostics::init();

    let cli = Cli::parse();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match &cli.command {
        Commands::Validate { paths } => validate_command(&mut out, paths),
        Commands::Render { path } => render_command(&mut out, path),
        Commands::ShowConfig { path } => show_config_command(&mut out, path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::try_parse_from(["dbsql", "validate", "a.yaml", "b.yaml"]).expect("parse");
        assert!(matches!(cli.command, Commands::Validate { ref paths } if paths.len() == 2));

        let cli = Cli::try_parse_from(["dbsql", "show-config", "a.yaml"]).expect("parse");
        assert!(matches!(cli.command, Commands::ShowConfig { .. }));

        assert!(Cli::try_parse_from(["dbsql", "validate"]).is_err());
    }
}
