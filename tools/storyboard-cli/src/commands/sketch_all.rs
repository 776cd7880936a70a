//! Generate sketches for every shot that lacks one.

use std::path::PathBuf;

use storyboard_common::cancel::CancelToken;
use storyboard_common::clock::{format_timecode, RequestPacer};
use storyboard_common::config::AppConfig;
use storyboard_genai::{BatchDriver, BatchState, ImageOptions};
use storyboard_project_model::project::SavedProject;

use crate::session::Session;

pub async fn run(
    config: AppConfig,
    api_key: Option<String>,
    project: PathBuf,
    delay_ms: Option<u64>,
) -> anyhow::Result<()> {
    let mut session = Session::new(config);
    let mut saved =
        SavedProject::load(&project).map_err(|e| anyhow::anyhow!("Failed to load project: {e}"))?;

    if saved.timeline_items.is_empty() {
        anyhow::bail!("Project has no shots yet; run `storyboard analyze` first");
    }

    let client = session.client()?;
    let credentials = session.credentials(api_key)?;

    let pacer = RequestPacer::from_millis(delay_ms.unwrap_or(session.config.images.batch_delay_ms));
    let pending = saved.timeline_items.pending().count();
    println!(
        "Sketching {pending} shots (at least {} with pacing, Ctrl-C to stop)",
        format_timecode(pacer.total_wait(pending).as_secs_f64())
    );

    let cancel = CancelToken::new();
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    let options = ImageOptions::from_defaults(&session.config.images);
    let mut driver = BatchDriver::new(&client, pacer, options);
    let report = driver
        .run(
            &mut saved.timeline_items,
            &credentials,
            &cancel,
            &mut session.log,
            |p| {
                println!("  Progress: {}/{}", p.completed, p.total);
            },
        )
        .await;
    watcher.abort();
    session.print_log();

    if report.succeeded > 0 {
        saved
            .save(&project)
            .map_err(|e| anyhow::anyhow!("Failed to save project: {e}"))?;
    }

    println!();
    println!(
        "Batch {}: {} drawn, {} failed, {} of {} attempted",
        match report.state {
            BatchState::Completed => "completed",
            BatchState::Stopped => "stopped",
            BatchState::Running | BatchState::Idle => "interrupted",
        },
        report.succeeded,
        report.failed,
        report.attempted,
        report.total
    );
    if report.halted_by_credentials {
        println!("The API key was rejected. Fix it and re-run to continue where this run stopped.");
    }

    Ok(())
}
