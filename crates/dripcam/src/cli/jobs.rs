//! Submit, retry, list, status and sweep commands.

use crate::App;
use anyhow::Context;
use dripcam_core::{ImageRequest, ImageStatus};
use dripcam_pipeline::WorkerOutcome;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use strum::IntoEnumIterator;
use tracing::{info, instrument};

fn describe(image: &ImageRequest) -> String {
    let detail = match image.status() {
        ImageStatus::Completed => image.result_image_path().clone().unwrap_or_default(),
        ImageStatus::Failed => image.error_message().clone().unwrap_or_default(),
        _ => String::new(),
    };
    format!(
        "#{:<6} {:<10} {}  {}",
        image.id(),
        image.status().to_string(),
        image.created_at().format("%Y-%m-%d %H:%M:%S"),
        detail
    )
    .trim_end()
    .to_string()
}

fn report_outcomes<W: Write>(outcomes: &[WorkerOutcome], output: &mut W) -> std::io::Result<()> {
    for outcome in outcomes {
        match outcome {
            WorkerOutcome::Completed(image) | WorkerOutcome::Failed(image) => {
                writeln!(output, "{}", describe(image))?
            }
            WorkerOutcome::Skipped { status } => {
                writeln!(output, "Skipped: image was already {}", status)?
            }
            WorkerOutcome::Superseded => {
                writeln!(output, "Result discarded: image changed during generation")?
            }
            WorkerOutcome::Abandoned(reason) => writeln!(output, "Abandoned: {}", reason)?,
        }
    }
    Ok(())
}

/// Submit a capture file and wait for its generation.
#[instrument(skip(app, output), fields(file = %file.display()))]
pub async fn handle_submit<W: Write>(app: &App, file: &Path, output: &mut W) -> anyhow::Result<()> {
    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let (pipeline, dispatcher) = app.pipeline()?;
    let id = pipeline.submit(&bytes).await?;
    writeln!(output, "Submitted image #{}", id)?;

    report_outcomes(&dispatcher.drain().await, output)?;
    Ok(())
}

/// Retry one image and wait for the new generation.
#[instrument(skip(app, output))]
pub async fn handle_retry<W: Write>(app: &App, id: i64, output: &mut W) -> anyhow::Result<()> {
    let (pipeline, dispatcher) = app.pipeline()?;
    pipeline.retry(id).await?;
    writeln!(output, "Retrying image #{}", id)?;

    report_outcomes(&dispatcher.drain().await, output)?;
    Ok(())
}

/// Print one page of images.
pub async fn handle_list<W: Write>(
    app: &App,
    page: usize,
    page_size: usize,
    output: &mut W,
) -> anyhow::Result<()> {
    let page = app.store().page(page, page_size).await?;
    if page.items.is_empty() {
        writeln!(output, "No images.")?;
        return Ok(());
    }

    for image in &page.items {
        writeln!(output, "{}", describe(image))?;
    }
    writeln!(
        output,
        "Page {} of {} ({} total)",
        page.page,
        page.last_page(),
        page.total
    )?;
    Ok(())
}

/// Print record counts per status.
pub async fn handle_status<W: Write>(app: &App, output: &mut W) -> anyhow::Result<()> {
    let mut total = 0;
    for status in ImageStatus::iter() {
        let count = app.store().count_by_status(&[status]).await?;
        total += count;
        writeln!(output, "{:<10} {}", status.to_string(), count)?;
    }
    writeln!(output, "{:<10} {}", "total", total)?;
    Ok(())
}

/// Run the reconciler on an interval until Ctrl-C.
#[instrument(skip(app))]
pub async fn handle_sweep(
    app: &App,
    interval_secs: Option<u64>,
    hours: Option<u64>,
) -> anyhow::Result<()> {
    let settings = &app.settings().reconciler;
    let interval = interval_secs
        .map(Duration::from_secs)
        .unwrap_or_else(|| settings.interval());
    let max_age = hours
        .map(|h| Duration::from_secs(h.saturating_mul(3600)))
        .unwrap_or_else(|| settings.max_age());

    let sweeper = app.reconciler().spawn_periodic(interval, max_age);
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;

    info!("Stopping reconciler");
    sweeper.abort();
    Ok(())
}
