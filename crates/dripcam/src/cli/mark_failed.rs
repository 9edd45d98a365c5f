//! `mark-failed`: operator-driven stuck-job reconciliation.

use super::MarkFailedArgs;
use dripcam_core::Settings;
use dripcam_pipeline::{ReconcileScope, Reconciler};
use std::io::{BufRead, Write};
use std::time::Duration;
use tracing::{info, instrument};

/// How a `mark-failed` run ended. All of these exit successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkFailedOutcome {
    /// No stuck images matched
    NothingFound,
    /// Candidates listed, nothing changed
    DryRun(usize),
    /// Operator declined the prompt
    Cancelled,
    /// This many images were marked failed
    Marked(usize),
}

/// Ask `question` and read a yes/no answer. Anything but `y`/`yes` is no.
pub fn confirm<R: BufRead, W: Write>(
    question: &str,
    input: &mut R,
    output: &mut W,
) -> std::io::Result<bool> {
    write!(output, "{} [y/N] ", question)?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

/// List stuck images, confirm, and mark them failed.
#[instrument(skip_all, fields(hours = ?args.hours, dry_run = args.dry_run, all = args.all))]
pub async fn handle_mark_failed<R: BufRead, W: Write>(
    reconciler: &Reconciler,
    settings: &Settings,
    args: &MarkFailedArgs,
    input: &mut R,
    output: &mut W,
) -> anyhow::Result<MarkFailedOutcome> {
    let max_age = args
        .hours
        .map(|hours| Duration::from_secs(hours.saturating_mul(3600)))
        .unwrap_or_else(|| settings.reconciler.max_age());
    let scope = if args.all {
        ReconcileScope::All
    } else {
        ReconcileScope::Recent
    };

    let stuck = reconciler.find_stuck(scope, max_age).await?;
    if stuck.is_empty() {
        writeln!(output, "No stuck images found.")?;
        return Ok(MarkFailedOutcome::NothingFound);
    }

    writeln!(output, "Found {} stuck image(s):", stuck.len())?;
    for image in &stuck {
        writeln!(
            output,
            "  - Image #{} ({}, created {})",
            image.id(),
            image.status(),
            image.created_at().format("%Y-%m-%d %H:%M:%S UTC")
        )?;
    }

    if args.dry_run {
        writeln!(output, "Dry run mode - no changes made.")?;
        return Ok(MarkFailedOutcome::DryRun(stuck.len()));
    }

    if !args.yes && !confirm("Mark these images as failed?", input, output)? {
        writeln!(output, "Operation cancelled.")?;
        return Ok(MarkFailedOutcome::Cancelled);
    }

    let failed = reconciler.fail_stuck(&stuck).await?;
    info!(count = failed.len(), "Marked stuck images as failed");
    writeln!(output, "Successfully marked {} image(s) as failed.", failed.len())?;
    Ok(MarkFailedOutcome::Marked(failed.len()))
}
