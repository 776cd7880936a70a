//! Break a project's script down into acts, scenes and shots.

use std::path::PathBuf;

use storyboard_common::config::AppConfig;
use storyboard_genai::analyze_project;
use storyboard_project_model::project::SavedProject;

use crate::session::Session;

pub async fn run(config: AppConfig, api_key: Option<String>, project: PathBuf) -> anyhow::Result<()> {
    let mut session = Session::new(config);
    let mut saved =
        SavedProject::load(&project).map_err(|e| anyhow::anyhow!("Failed to load project: {e}"))?;

    let client = session.client()?;
    let credentials = session.credentials(api_key)?;

    let result = analyze_project(&client, &mut saved, &credentials, &mut session.log).await;
    session.print_log();
    result?;

    saved
        .save(&project)
        .map_err(|e| anyhow::anyhow!("Failed to save project: {e}"))?;

    if let Some(analysis) = &saved.analysis_data {
        println!();
        println!("{} ({})", analysis.title, analysis.genre);
        for act in &analysis.acts {
            println!("  {}", act.title);
            for scene in &act.scenes {
                println!("    {} {} ({} shots)", scene.scene_number, scene.header, scene.shots.len());
            }
        }
        println!(
            "  Total: {} shots, {:.0}s",
            saved.timeline_items.len(),
            saved.timeline_items.total_duration()
        );
    }

    Ok(())
}
