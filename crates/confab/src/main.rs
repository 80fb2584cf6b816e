// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Confab - a marketplace for paid, time-metered video consultations.
//!
//! This is the binary entry point for the Confab server.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use clap::{Parser, Subcommand};

mod notify;
mod seed;
mod serve;

/// Confab - a marketplace for paid, time-metered video consultations.
#[derive(Parser, Debug)]
#[command(name = "confab", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the Confab server.
    Serve,
    /// Populate the database with demo accounts for local development.
    Seed,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match confab_config::load_and_validate() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("confab: {e}");
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) | None => serve::run_serve(config).await,
        Some(Commands::Seed) => seed::run_seed(config).await,
    };

    if let Err(e) = result {
        eprintln!("confab: {e}");
        std::process::exit(1);
    }
}
