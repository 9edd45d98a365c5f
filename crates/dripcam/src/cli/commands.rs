//! CLI argument definitions.

use clap::{Args, Parser, Subcommand};
use dripcam_pipeline::DEFAULT_PAGE_SIZE;
use std::path::PathBuf;

/// Dripcam - turn webcam captures into generated images.
#[derive(Parser, Debug)]
#[command(name = "dripcam")]
#[command(about = "Dripcam - webcam image generation pipeline")]
#[command(version)]
pub struct Cli {
    /// Path to a settings file
    #[arg(short, long, global = true, default_value = "dripcam.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Mark images stuck in pending/processing as failed
    MarkFailed(MarkFailedArgs),

    /// Submit a capture and wait for its generation
    Submit {
        /// JPEG file to submit
        file: PathBuf,
    },

    /// Reset an image to pending and run generation again
    Retry {
        /// Image request id
        id: i64,
    },

    /// List image requests, newest first
    List {
        /// Page number, starting at 1
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Images per page
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: usize,
    },

    /// Show record counts per status
    Status,

    /// Run the stuck-job reconciler periodically until interrupted
    Sweep {
        /// Seconds between sweeps (default from settings)
        #[arg(long)]
        interval_secs: Option<u64>,

        /// Age in hours after which a job counts as stuck (default from settings)
        #[arg(long)]
        hours: Option<u64>,
    },
}

/// Arguments for `mark-failed`.
#[derive(Args, Debug, Clone, Default)]
pub struct MarkFailedArgs {
    /// Only images older than this many hours (default from settings, 1 hour)
    #[arg(long)]
    pub hours: Option<u64>,

    /// Show what would be marked without changing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Consider every pending/processing image regardless of age
    #[arg(long)]
    pub all: bool,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}
