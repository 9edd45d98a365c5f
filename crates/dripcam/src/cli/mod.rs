//! Command-line interface for the dripcam binary.

mod commands;
mod jobs;
mod mark_failed;

pub use commands::{Cli, Commands, MarkFailedArgs};
pub use jobs::{handle_list, handle_retry, handle_status, handle_submit, handle_sweep};
pub use mark_failed::{MarkFailedOutcome, confirm, handle_mark_failed};

use crate::App;
use std::io::{BufRead, Write};

/// Run one command against a connected app.
pub async fn run<R: BufRead, W: Write>(
    command: Commands,
    app: &App,
    input: &mut R,
    output: &mut W,
) -> anyhow::Result<()> {
    match command {
        Commands::MarkFailed(args) => {
            handle_mark_failed(&app.reconciler(), app.settings(), &args, input, output).await?;
        }
        Commands::Submit { file } => handle_submit(app, &file, output).await?,
        Commands::Retry { id } => handle_retry(app, id, output).await?,
        Commands::List { page, page_size } => handle_list(app, page, page_size, output).await?,
        Commands::Status => handle_status(app, output).await?,
        Commands::Sweep {
            interval_secs,
            hours,
        } => handle_sweep(app, interval_secs, hours).await?,
    }
    Ok(())
}
