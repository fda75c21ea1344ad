//! Command implementations for the CTD processor CLI
//!
//! Each command is implemented in its own module; shared helpers (run
//! statistics, logging, discovery) live in [`shared`].

pub mod inspect;
pub mod process;
pub mod shared;

// Re-export the main types for convenient access
pub use shared::ProcessingStats;

use crate::cli::args::{Args, Commands};
use crate::Result;

/// Main command runner
///
/// Dispatches to the appropriate subcommand handler:
/// - `process`: batch decode/convert/write workflow
/// - `inspect`: single-file header and cast report
pub async fn run(args: Args) -> Result<ProcessingStats> {
    match args.command {
        Some(Commands::Process(process_args)) => process::run_process(process_args).await,
        Some(Commands::Inspect(inspect_args)) => {
            inspect::run_inspect(inspect_args).await?;
            Ok(ProcessingStats::default())
        }
        None => Ok(ProcessingStats::default()),
    }
}
