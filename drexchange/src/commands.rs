use super::IOArgs;
use clap::Subcommand;

mod export;
mod solve;

pub use export::ExportFormat;
pub use solve::{SolverLib, solve};

/// The available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Clear the scenario and report the trades
    Solve {
        /// Where to read the scenario and write the report
        #[command(flatten)]
        io: IOArgs,

        /// Override the configured strategy and backend
        #[arg(short, long)]
        lib: Option<SolverLib>,
    },

    /// Construct the scenario's optimization program and export it to a standard format
    Export {
        /// Where to read the scenario and write the program
        #[command(flatten)]
        io: IOArgs,

        /// The file format to use (if omitted, will infer based on filename)
        #[arg(short, long)]
        format: Option<ExportFormat>,
    },
}
