use clap::Parser;
use ctd_processor::cli::{args::Args, commands};
use std::process;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    // Create async runtime and run the main command logic
    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        tokio::select! {
            result = commands::run(args) => result,
            _ = tokio::signal::ctrl_c() => {
                eprintln!("\nReceived CTRL+C, shutting down...");
                Err(ctd_processor::Error::processing_interrupted(
                    "processing interrupted by user".to_string(),
                ))
            }
        }
    });

    match result {
        Ok(_stats) => {
            // Success - stats have already been reported by the command
            process::exit(0);
        }
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information when no subcommand is provided
fn show_help_and_commands() {
    println!("CTD Processor - Seabird SBE 19plus V2 Hex File Converter");
    println!("========================================================");
    println!();
    println!("Decode raw CTD hex dump files into calibrated, physical-unit");
    println!("measurement tables written as CSV.");
    println!();
    println!("USAGE:");
    println!("    ctd-processor <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    process     Convert hex files into measurement CSV tables (main command)");
    println!("    inspect     Decode one hex file's header and report its casts");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Show help information");
    println!("    -V, --version    Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    # Process a data root with haul enrichment:");
    println!("    ctd-processor process --input ~/Desktop/CTD --hauls hauls.csv");
    println!();
    println!("    # Process four files at a time into a custom output directory:");
    println!("    ctd-processor process --input /data/ctd --output /data/out --workers 4");
    println!();
    println!("    # Check a single file's header and casts:");
    println!("    ctd-processor inspect PORT_CTD5048_Hauls_1to5_21May2016.hex");
    println!();
    println!("For detailed help on any command, use:");
    println!("    ctd-processor <COMMAND> --help");
}
