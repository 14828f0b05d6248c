use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// More log output, repeat for even more
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render the publication list described by a configuration file
    Render {
        #[arg(value_name = "CONFIG")]
        config: PathBuf,
        /// Bibliography to read instead of the configured one
        #[arg(long, value_name = "BIB")]
        bib: Option<PathBuf>,
        /// Where to write the page instead of the configured output
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
        /// Print the page to stdout instead of writing a file
        #[arg(long, conflicts_with = "output")]
        stdout: bool,
    },
    /// List the entries of a bibliography written by any of the given authors
    Find {
        #[arg(value_name = "BIB")]
        bib: PathBuf,
        #[arg(value_name = "AUTHOR", required = true)]
        authors: Vec<String>,
    },
}

impl Cli {
    /// Default log directive for the verbosity flags. `RUST_LOG` takes precedence.
    pub fn log_level(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (true, _) => "warn",
            (false, 0) => "info",
            (false, 1) => "debug",
            (false, _) => "trace",
        }
    }
}
