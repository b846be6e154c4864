//! CLI Module
//!
//! Command-line interface for tracelight.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// tracelight - source context for runtime errors
#[derive(Parser, Debug)]
#[command(
    name = "tracelight",
    version,
    about = "Augments JavaScript/TypeScript runtime errors with source-mapped code context",
    long_about = "tracelight reconstructs a runtime error's call stack, resolves each frame \n\
                  through its source-map sidecar, and extracts the enclosing function and \n\
                  code section for the call site and the error origin."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Contextualize an error report from a JSON file
    Contextualize {
        /// Path to the error report (JSON: name, message, stack, augmentedTrace)
        report: PathBuf,

        /// Output artifact path
        #[arg(short, long, default_value = crate::config::DEFAULT_OUTPUT_FILE)]
        output: String,
    },

    /// Run the companion debug endpoint
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "TRACELIGHT_PORT", default_value_t = crate::config::DEFAULT_SERVER_PORT)]
        port: u16,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_contextualize_with_output() {
        let cli = Cli::parse_from(["tracelight", "contextualize", "report.json", "-o", "ctx.json"]);
        match cli.command {
            Commands::Contextualize { report, output } => {
                assert_eq!(report, PathBuf::from("report.json"));
                assert_eq!(output, "ctx.json");
            }
            Commands::Serve { .. } => panic!("wrong subcommand"),
        }
    }

    #[test]
    fn serve_defaults_to_port_5001() {
        let cli = Cli::parse_from(["tracelight", "serve"]);
        match cli.command {
            Commands::Serve { port } => assert_eq!(port, 5001),
            Commands::Contextualize { .. } => panic!("wrong subcommand"),
        }
    }
}
