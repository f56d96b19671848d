use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dekdek", bin_name = "dekdek", version)]
#[command(about = "Books and quotes content server", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config file (default: dekdek.toml in the OS config directory)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Run the HTTP server (default)
    Serve {
        /// Address to listen on, overriding the configuration
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },

    /// Create the catalog files, database, admin account and upload folders
    Init,

    /// Configuration helpers
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum ConfigCommands {
    /// Print a commented dekdek.toml with every setting
    Gen,
    /// Print where the default config file is looked up
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn naked_invocation_has_no_command() {
        let cli = Cli::try_parse_from(["dekdek"]).unwrap();
        assert_eq!(cli.command, None);
        assert_eq!(cli.config, None);
    }

    #[test]
    fn serve_with_bind_and_global_config() {
        let cli =
            Cli::try_parse_from(["dekdek", "serve", "--bind", "127.0.0.1:9000", "-c", "x.toml"])
                .unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Serve {
                bind: Some("127.0.0.1:9000".into())
            })
        );
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
    }

    #[test]
    fn config_gen() {
        let cli = Cli::try_parse_from(["dekdek", "config", "gen"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Config {
                action: ConfigCommands::Gen
            })
        );
    }
}
