//! Show project information.

use std::path::PathBuf;

use storyboard_common::clock::format_timecode;
use storyboard_project_model::project::{export_file_name, SavedProject};

pub fn run(project: PathBuf) -> anyhow::Result<()> {
    let saved =
        SavedProject::load(&project).map_err(|e| anyhow::anyhow!("Failed to load project: {e}"))?;

    println!("Project: {}", project.display());
    println!(
        "  Script: {} characters, {} lines",
        saved.script_input.chars().count(),
        saved.script_input.lines().count()
    );
    println!();

    let Some(analysis) = &saved.analysis_data else {
        println!("Not analysed yet. Run: storyboard analyze {}", project.display());
        return Ok(());
    };

    println!("Analysis:");
    println!("  Title: {}", analysis.title);
    println!("  Genre: {}", analysis.genre);
    println!("  Logline: {}", analysis.logline);
    println!(
        "  Acts: {}  Scenes: {}  Shots: {}",
        analysis.acts.len(),
        analysis.scene_count(),
        analysis.shot_count()
    );
    if !analysis.characters.is_empty() {
        println!("  Characters:");
        for c in &analysis.characters {
            println!("    {}: {}", c.name, c.description);
        }
    }
    println!();

    let timeline = &saved.timeline_items;
    println!("Timeline:");
    println!("  Length: {}", format_timecode(timeline.total_duration()));
    println!("  Sketched: {}/{}", timeline.sketched_count(), timeline.len());
    println!(
        "  Start times: {}",
        if timeline.is_contiguous() { "aligned" } else { "need reflow" }
    );
    println!();

    println!("Export:");
    println!("  File name: {}", export_file_name(&analysis.title));

    let problems = saved.validate();
    if !problems.is_empty() {
        println!();
        println!("Problems:");
        for p in &problems {
            println!("  - {p}");
        }
    }

    Ok(())
}
