//! Arena Scanner
//!
//! Reconstructs a closed-top room mesh from wand samples captured along the
//! walls and floor of a tracked arena.
//!
//! Commands:
//! - `meshify`: run the reconstruction and write an OBJ file
//! - `inspect`: summarize a capture session
//! - `default-config`: print the default reconstruction parameters

mod app;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Arena Scanner - room mesh reconstruction from tracked wand samples
#[derive(Parser, Debug)]
#[command(name = "arena-scan")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reconstruct the arena and write it as an OBJ mesh
    Meshify {
        /// Capture session (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Output mesh path
        #[arg(short, long, default_value = "arena_unprocessed.obj")]
        output: PathBuf,

        /// Reconstruction parameters (JSON); missing fields keep their defaults
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Seed for cluster seeding; drawn at random when omitted
        #[arg(short, long)]
        seed: Option<u64>,

        /// Number of planar clusters to extract, floor included
        #[arg(long)]
        wall_count: Option<usize>,

        /// Height of the synthesized ceiling
        #[arg(long)]
        ceiling_height: Option<f64>,
    },

    /// Print a summary of a capture session
    Inspect {
        /// Capture session (JSON)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Print the default reconstruction parameters as JSON
    DefaultConfig,
}

fn main() {
    let args = Args::parse();

    app::LoggingConfig {
        level: args.log_level,
    }
    .init();

    let result = match args.command {
        Command::Meshify {
            input,
            output,
            config,
            seed,
            wall_count,
            ceiling_height,
        } => app::meshify(app::MeshifyOptions {
            input,
            output,
            config,
            seed,
            wall_count,
            ceiling_height,
        }),
        Command::Inspect { input } => app::inspect(&input),
        Command::DefaultConfig => app::print_default_config(),
    };

    if let Err(e) = result {
        eprintln!("arena-scan error: {}", e);
        std::process::exit(1);
    }
}
