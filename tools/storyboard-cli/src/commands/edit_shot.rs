//! Edit one shot's details.

use std::path::PathBuf;

use storyboard_common::clock::format_timecode;
use storyboard_project_model::project::SavedProject;
use storyboard_project_model::timeline::ShotUpdate;

pub fn run(project: PathBuf, shot_id: String, update: ShotUpdate, reflow: bool) -> anyhow::Result<()> {
    if update.is_empty() && !reflow {
        anyhow::bail!("Nothing to change; pass at least one field such as --type or --duration");
    }
    if let Some(duration) = update.duration {
        if !(duration.is_finite() && duration > 0.0) {
            anyhow::bail!("Duration must be a positive number of seconds, got {duration}");
        }
    }

    let mut saved =
        SavedProject::load(&project).map_err(|e| anyhow::anyhow!("Failed to load project: {e}"))?;

    if !saved.timeline_items.update_shot(&shot_id, &update) {
        anyhow::bail!("No shot with id {shot_id}");
    }
    if reflow {
        saved.timeline_items.reflow();
    }

    saved
        .save(&project)
        .map_err(|e| anyhow::anyhow!("Failed to save project: {e}"))?;

    if let Some(item) = saved.timeline_items.get(&shot_id) {
        println!("Updated {}:", item.id);
        println!("  Type: {}", item.data.shot_type);
        println!(
            "  Start: {}  Duration: {}s",
            format_timecode(item.start),
            item.duration
        );
        println!("  Camera: {}", item.data.camera_movement);
        println!("  Description: {}", item.data.description_local);
        println!("  Image prompt: {}", item.data.prompt_for_image);
    }
    if !saved.timeline_items.is_contiguous() {
        println!();
        println!("Start times no longer follow the durations; pass --reflow to realign them.");
    }

    Ok(())
}
