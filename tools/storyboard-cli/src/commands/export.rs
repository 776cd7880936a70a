//! Export a project as a storyboard PDF.

use std::io::Write;
use std::path::PathBuf;

use storyboard_common::config::{AppConfig, Locale};
use storyboard_project_model::project::SavedProject;
use storyboard_render_engine::export::{export_storyboard, ExportJob, ExportProgress};

use crate::session::Session;

pub fn run(
    config: AppConfig,
    project: PathBuf,
    output: PathBuf,
    lang: Option<String>,
) -> anyhow::Result<()> {
    let mut session = Session::new(config);
    println!("Exporting project at: {}", project.display());

    let saved =
        SavedProject::load(&project).map_err(|e| anyhow::anyhow!("Failed to load project: {e}"))?;

    let mut job = ExportJob::new(output, session.config.render.clone());
    match lang.as_deref() {
        None => {}
        Some("en") => job = job.with_locale(Locale::En),
        Some("vi") => job = job.with_locale(Locale::Vi),
        Some(other) => anyhow::bail!("Unknown language: {other}. Use: en, vi"),
    }

    let progress_cb: Box<dyn Fn(ExportProgress) + Send> = Box::new(|p| {
        print!("\r  Progress: {:>3.0}% ({:?})      ", p.progress * 100.0, p.stage);
        let _ = std::io::stdout().flush();
    });

    let result = export_storyboard(&saved, &job, &mut session.log, Some(progress_cb));
    println!();
    session.print_log();

    let outcome = result?;
    println!(
        "  {} pages, {} shots, {} without sketch, {} KiB",
        outcome.summary.pages,
        outcome.summary.cards,
        outcome.summary.missing_sketches,
        outcome.bytes / 1024
    );

    Ok(())
}
