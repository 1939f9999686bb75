#![warn(missing_docs)]
//! Command-line tools for the dynamic resource exchange.
//!
//! `drexchange solve` clears a JSON scenario through one exchange step and
//! writes the step report; `drexchange export` writes the scenario's
//! optimization program for inspection with an external solver.

use clap::Parser;
use std::{io::Write as _, path::PathBuf};

pub mod config;

mod io;
pub use io::{IOArgs, PathOrStd};

mod commands;
pub use commands::*;

mod scenario;
pub use scenario::{BidRecord, PortfolioRecord, Record, RequestRecord, Scenario, Submitter};

/// The top-level arguments: the configuration file and the subcommand to execute
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct BaseArgs {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true, env = "DRE_CONFIG")]
    pub config: Option<PathBuf>,

    /// The subcommand
    #[command(subcommand)]
    pub command: Commands,
}

impl BaseArgs {
    /// Run the chosen subcommand
    pub fn evaluate(self) -> anyhow::Result<()> {
        match self.command {
            Commands::Solve { io, lib } => {
                let mut config = config::load(self.config.as_deref())?;
                if let Some(lib) = lib {
                    lib.apply(&mut config.solver);
                }

                let report = solve(io.scenario()?, &config)?;
                let mut output = io.output()?;
                serde_json::to_writer_pretty(&mut output, &report)?;
                writeln!(output)?;
                output.flush()?;
            }
            Commands::Export { io, format } => {
                let format = if let Some(format) = format {
                    format
                } else if let Some(ext) = io.extension() {
                    ext.parse()?
                } else {
                    return Err(CliError::ExportInference)?;
                };

                let scenario = io.scenario()?;
                let mut output = io.output()?;
                format.export(scenario, &mut output)?;
                output.flush()?;
            }
        }

        Ok(())
    }
}

/// Failures of the command line itself
#[derive(thiserror::Error, Debug)]
pub enum CliError {
    /// No `--format` and no recognizable output extension
    #[error("Unable to infer export format, please specify a valid format")]
    ExportInference,
}
